use once_cell::sync::Lazy;
use regex::Regex;

use folio_core::GlossaryEntry;

static CHAPTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)CHAPTER\s+([IVX]+)").unwrap());
static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Target table and provenance for the generated SQL script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlOptions {
    pub table: String,
    pub book_id: String,
    /// Book title for the header comment.
    pub title: String,
    /// Where the glossary was scraped from, for the header comment.
    pub source: String,
}

impl Default for SqlOptions {
    fn default() -> Self {
        Self {
            table: "alice_glossary".to_string(),
            book_id: "alice-in-wonderland".to_string(),
            title: "Alice's Adventures in Wonderland".to_string(),
            source: "Vocabulary.com".to_string(),
        }
    }
}

/// Pretty-printed JSON array of entries, two-space indented.
pub fn export_json(entries: &[GlossaryEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}

/// Roman chapter number cited by the first example that names one.
pub fn chapter_reference(entry: &GlossaryEntry) -> Option<String> {
    entry.examples.iter().find_map(|ex| {
        CHAPTER_RE
            .captures(ex)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// A transactional SQLite script inserting one row per entry.
///
/// Row ids are `glossary-<n>`, 1-based in entry order. `example` is the
/// first example; it and `chapter_reference` are `NULL` when absent.
/// `INSERT OR IGNORE` makes re-running the script harmless.
pub fn export_sql(entries: &[GlossaryEntry], options: &SqlOptions) -> String {
    let table = sql_identifier(&options.table);
    let book_id = sql_string(&options.book_id);

    let mut out = String::new();
    out.push_str(&format!("-- {} Glossary\n", comment_text(&options.title)));
    out.push_str(&format!("-- Extracted from {}\n", comment_text(&options.source)));
    out.push_str(&format!("-- Book ID: {}\n\n", comment_text(&options.book_id)));
    out.push_str("BEGIN TRANSACTION;\n\n");

    for (i, entry) in entries.iter().enumerate() {
        let example = entry
            .examples
            .first()
            .filter(|ex| !ex.is_empty())
            .map_or_else(|| "NULL".to_string(), |ex| sql_string(ex));
        let chapter = chapter_reference(entry).map_or_else(|| "NULL".to_string(), |c| sql_string(&c));

        out.push_str(&format!(
            "INSERT OR IGNORE INTO {} (id, book_id, term, definition, example, chapter_reference)\n",
            table
        ));
        out.push_str(&format!(
            "VALUES ('glossary-{}', {}, {}, {}, {}, {});\n",
            i + 1,
            book_id,
            sql_string(&entry.word),
            sql_string(&entry.definition),
            example,
            chapter
        ));
    }

    out.push_str("\nCOMMIT;\n");
    out
}

/// Single-quoted SQL literal with embedded quotes doubled.
fn sql_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Bare identifiers pass through; anything else is double-quoted.
fn sql_identifier(s: &str) -> String {
    if IDENTIFIER_RE.is_match(s) {
        s.to_string()
    } else {
        format!("\"{}\"", s.replace('"', "\"\""))
    }
}

/// Comment lines end at a newline, so fold any away.
fn comment_text(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(word: &str, definition: &str, examples: &[&str]) -> GlossaryEntry {
        GlossaryEntry {
            word: word.to_string(),
            frequency: None,
            learnable: false,
            definition: definition.to_string(),
            examples: examples.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_sql_header_and_footer() {
        let sql = export_sql(&[], &SqlOptions::default());
        assert_eq!(
            sql,
            "-- Alice's Adventures in Wonderland Glossary\n\
             -- Extracted from Vocabulary.com\n\
             -- Book ID: alice-in-wonderland\n\n\
             BEGIN TRANSACTION;\n\n\
             \nCOMMIT;\n"
        );
    }

    #[test]
    fn test_sql_statement_layout() {
        let entries = vec![entry(
            "curious",
            "eager to investigate",
            &["CHAPTER II. 'Curiouser and curiouser!'", "second"],
        )];
        let sql = export_sql(&entries, &SqlOptions::default());
        assert!(sql.contains(
            "INSERT OR IGNORE INTO alice_glossary (id, book_id, term, definition, example, chapter_reference)\n\
             VALUES ('glossary-1', 'alice-in-wonderland', 'curious', 'eager to investigate', \
             'CHAPTER II. ''Curiouser and curiouser!''', 'II');\n"
        ));
    }

    #[test]
    fn test_sql_nulls_for_missing_fields() {
        let entries = vec![entry("grin", "a smile", &[])];
        let sql = export_sql(&entries, &SqlOptions::default());
        assert!(sql.contains("'grin', 'a smile', NULL, NULL);"));
    }

    #[test]
    fn test_sql_quotes_doubled() {
        let entries = vec![entry("Queen's", "it's 'royal'", &["O'Brien"])];
        let sql = export_sql(&entries, &SqlOptions::default());
        assert!(sql.contains("'Queen''s', 'it''s ''royal''', 'O''Brien', NULL"));
    }

    #[test]
    fn test_ids_are_one_based_in_order() {
        let entries = vec![entry("a1", "d", &[]), entry("b2", "d", &[]), entry("c3", "d", &[])];
        let sql = export_sql(&entries, &SqlOptions::default());
        let a = sql.find("'glossary-1', 'alice-in-wonderland', 'a1'").unwrap();
        let b = sql.find("'glossary-2', 'alice-in-wonderland', 'b2'").unwrap();
        let c = sql.find("'glossary-3', 'alice-in-wonderland', 'c3'").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_custom_table_and_book() {
        let options = SqlOptions {
            table: "glossary terms".to_string(),
            book_id: "looking-glass".to_string(),
            ..SqlOptions::default()
        };
        let sql = export_sql(&[entry("x", "y", &[])], &options);
        assert!(sql.contains("INSERT OR IGNORE INTO \"glossary terms\" ("));
        assert!(sql.contains("VALUES ('glossary-1', 'looking-glass',"));
        assert!(sql.contains("-- Book ID: looking-glass\n"));
    }

    #[test]
    fn test_chapter_reference() {
        assert_eq!(
            chapter_reference(&entry("w", "d", &["no chapter", "see chapter iv here"])),
            Some("iv".to_string())
        );
        assert_eq!(chapter_reference(&entry("w", "d", &["Chapter 12"])), None);
        assert_eq!(chapter_reference(&entry("w", "d", &[])), None);
    }

    #[test]
    fn test_json_shape() -> anyhow::Result<()> {
        let mut e = entry("curious", "eager", &["ex one"]);
        e.frequency = Some(12.5);
        e.learnable = true;
        let json = export_json(&[e, entry("grin", "smile", &[])])?;

        let value: serde_json::Value = serde_json::from_str(&json)?;
        assert_eq!(value[0]["word"], "curious");
        assert_eq!(value[0]["frequency"], 12.5);
        assert_eq!(value[0]["learnable"], true);
        assert_eq!(value[0]["examples"][0], "ex one");
        assert!(value[1]["frequency"].is_null());
        assert!(json.contains("\n  {\n    \"word\": \"curious\""));
        Ok(())
    }

    #[test]
    fn test_json_empty_list() -> anyhow::Result<()> {
        assert_eq!(export_json(&[])?, "[]");
        Ok(())
    }
}
