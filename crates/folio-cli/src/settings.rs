use std::path::Path;

use folio_core::PageSource;
use folio_core::config_file::ConfigFile;
use folio_html::HtmlSource;
use folio_parsing::{ConfigError, MarkerStyle, ParsingConfig, ParsingConfigBuilder, SpanAttribution};
use folio_reporting::SqlOptions;

/// Environment variable overriding the running-header pattern.
pub const MARKER_PATTERN_ENV: &str = "FOLIO_MARKER_PATTERN";

/// Parsing-related command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ParsingFlags {
    pub no_columns: bool,
    pub straddle: bool,
    pub marker_style: Option<MarkerStyle>,
    pub marker_pattern: Option<String>,
}

/// Resolve the parsing config: flags > env > config file > defaults.
pub fn parsing_config(
    file: &ConfigFile,
    flags: &ParsingFlags,
    env_pattern: Option<String>,
) -> Result<ParsingConfig, ConfigError> {
    let parsing = file.parsing.clone().unwrap_or_default();
    let extraction = file.extraction.clone().unwrap_or_default();

    let mut builder = ParsingConfigBuilder::new();

    if let Some(n) = parsing.min_line_chars {
        builder = builder.min_line_chars(n);
    }
    if let Some(n) = parsing.garbled_min_len {
        builder = builder.garbled_min_len(n);
    }
    if let Some(r) = parsing.min_alpha_ratio {
        builder = builder.min_alpha_ratio(r);
    }
    if let Some(patterns) = parsing.noise_patterns {
        if parsing.replace_noise_patterns.unwrap_or(false) {
            builder = builder.set_noise_patterns(patterns);
        } else {
            for p in patterns {
                builder = builder.add_noise_pattern(p);
            }
        }
    }

    let marker_pattern = flags
        .marker_pattern
        .clone()
        .or(env_pattern.filter(|p| !p.trim().is_empty()))
        .or(parsing.marker_pattern);
    if let Some(pattern) = marker_pattern {
        builder = builder.marker_regex(&pattern);
    }
    if let Some(style) = flags.marker_style {
        builder = builder.marker_style(style);
    }
    if let Some(steps) = parsing.page_steps {
        builder = builder.page_steps(steps);
    }

    let attribution = if flags.straddle {
        Some(SpanAttribution::Straddle)
    } else {
        parsing
            .attribution
            .as_deref()
            .map(str::parse::<SpanAttribution>)
            .transpose()?
    };
    if let Some(attribution) = attribution {
        builder = builder.attribution(attribution);
    }
    if let Some(page) = parsing.leading_page {
        builder = builder.leading_page(page);
    }

    let column_reorder = !flags.no_columns && extraction.column_reorder.unwrap_or(true);
    builder.column_reorder(column_reorder).build()
}

/// SQL target for the glossary: flags > config file > defaults.
pub fn sql_options(file: &ConfigFile, table: Option<String>, book_id: Option<String>) -> SqlOptions {
    let section = file.glossary.clone().unwrap_or_default();
    let defaults = SqlOptions::default();
    SqlOptions {
        table: table.or(section.table).unwrap_or(defaults.table),
        book_id: book_id.or(section.book_id).unwrap_or(defaults.book_id),
        title: section.title.unwrap_or(defaults.title),
        source: section.source.unwrap_or(defaults.source),
    }
}

pub fn is_html(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

/// Pick the page source for `path` by its extension.
pub fn page_source(path: &Path, file: &ConfigFile) -> anyhow::Result<Box<dyn PageSource>> {
    if is_html(path) {
        return Ok(Box::new(HtmlSource::new()));
    }
    pdf_source(file)
}

#[cfg(feature = "pdf")]
fn pdf_source(file: &ConfigFile) -> anyhow::Result<Box<dyn PageSource>> {
    let extraction = file.extraction.clone().unwrap_or_default();
    let mut source = folio_pdf_mupdf::MupdfSource::new();
    if let Some(ratio) = extraction.header_exclusion {
        source = source.with_header_exclusion(ratio);
    }
    if let Some(ratio) = extraction.footer_exclusion {
        source = source.with_footer_exclusion(ratio);
    }
    Ok(Box::new(source))
}

#[cfg(not(feature = "pdf"))]
fn pdf_source(_file: &ConfigFile) -> anyhow::Result<Box<dyn PageSource>> {
    anyhow::bail!(
        "PDF support is not compiled in. Rebuild with: cargo install folio-cli --features pdf (or pass an .html file)"
    )
}
