use std::path::Path;

use thiserror::Error;

pub mod glossary;
pub mod pages;
pub mod staged;

pub use glossary::{SqlOptions, chapter_reference, export_json, export_sql};
pub use pages::{PAGE_RULE_WIDTH, render_pages};
pub use staged::write_staged;

use folio_core::GlossaryEntry;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Glossary output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlossaryFormat {
    Json,
    Sql,
}

/// Render glossary entries in `format` and write them to `path`.
pub fn export_glossary(
    entries: &[GlossaryEntry],
    format: GlossaryFormat,
    options: &SqlOptions,
    path: &Path,
) -> Result<(), ReportError> {
    let content = match format {
        GlossaryFormat::Json => export_json(entries)?,
        GlossaryFormat::Sql => export_sql(entries, options),
    };
    write_staged(path, &content)?;
    Ok(())
}
