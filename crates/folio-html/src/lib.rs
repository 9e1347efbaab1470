pub mod glossary;
pub mod source;

pub use glossary::{GlossaryError, extract_glossary, extract_glossary_str};
pub use source::{HtmlSource, body_text};
