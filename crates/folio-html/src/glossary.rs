use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use folio_core::GlossaryEntry;

#[derive(Error, Debug)]
pub enum GlossaryError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Read a saved vocabulary-list page and extract its entries.
pub fn extract_glossary(path: &Path) -> Result<Vec<GlossaryEntry>, GlossaryError> {
    let bytes = std::fs::read(path).map_err(|source| GlossaryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let html = String::from_utf8_lossy(&bytes);
    Ok(extract_glossary_str(&html))
}

/// Extract vocabulary entries from the HTML of a word-list page.
///
/// An entry is an `<li>` whose class contains `entry`. It carries the
/// headword in its `word` attribute and an optional `freq`; a `learnable`
/// class marks it learnable. The definition is the first non-empty source in
/// document order: the `title` of an `<a class="word">` link or the text of a
/// `<div class="definition">`. Each `<div class="example">` gives one
/// example sentence with whitespace collapsed.
///
/// Entries without a word or a definition are skipped. Document order is
/// kept.
pub fn extract_glossary_str(html: &str) -> Vec<GlossaryEntry> {
    let document = Html::parse_document(html);
    let entry_selector = Selector::parse("li[class*='entry']").unwrap();

    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for element in document.select(&entry_selector) {
        match parse_entry(element) {
            Some(entry) => entries.push(entry),
            None => skipped += 1,
        }
    }

    tracing::debug!(entries = entries.len(), skipped, "parsed glossary entries");
    entries
}

fn parse_entry(element: ElementRef) -> Option<GlossaryEntry> {
    let definition_selector =
        Selector::parse("a[class='word'][title], div[class='definition']").unwrap();
    let example_selector = Selector::parse("div[class='example']").unwrap();

    let attrs = element.value();
    let word = attrs.attr("word").unwrap_or("").to_string();
    let class = attrs.attr("class").unwrap_or("");
    let learnable = class.contains("learnable");

    let frequency = attrs
        .attr("freq")
        .filter(|f| !f.is_empty())
        .and_then(|f| match f.trim().parse::<f64>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::debug!(word = %word, freq = f, "unparsable frequency");
                None
            }
        });

    let definition = element
        .select(&definition_selector)
        .map(|source| match source.value().attr("title") {
            Some(title) if source.value().name() == "a" => title.trim().to_string(),
            _ => source.text().collect::<String>().trim().to_string(),
        })
        .find(|t| !t.is_empty())?;

    if word.is_empty() {
        return None;
    }

    let examples = element
        .select(&example_selector)
        .map(|div| {
            let text = div.text().collect::<String>();
            WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
        })
        .filter(|t| !t.is_empty())
        .collect();

    Some(GlossaryEntry {
        word,
        frequency,
        learnable,
        definition,
        examples,
    })
}
