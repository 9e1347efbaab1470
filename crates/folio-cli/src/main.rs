use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use folio_core::config_file::{self, ConfigFile};
use folio_core::{PageMap, PipelineEvent, RawPage};
use folio_parsing::{MarkerStyle, PageExtractor};
use folio_reporting::{GlossaryFormat, export_glossary, render_pages, write_staged};

mod output;
mod settings;

use output::ColorMode;
use settings::ParsingFlags;

const DEFAULT_PDF: &str = "alice_wonderland.pdf";
const DEFAULT_GLOSSARY_HTML: &str =
    "ALICE'S ADVENTURES IN WONDERLAND - Vocabulary List | Vocabulary.com.html";
/// Entries shown after a glossary run.
const GLOSSARY_PREVIEW: usize = 5;

/// Folio - Recover printed pages and glossary data from a two-column book
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split the book into its printed pages using the running headers
    Pages {
        /// PDF (or .html) file to read
        #[arg(default_value = DEFAULT_PDF)]
        input: PathBuf,

        /// Path of the page text file to write
        #[arg(short, long, default_value = "alice_wonderland_by_pages.txt")]
        output: PathBuf,

        /// Keep the extractor's text order instead of reading left column then right
        #[arg(long)]
        no_columns: bool,

        /// Credit text before a header to its page and text after it to the next page
        #[arg(long)]
        straddle: bool,

        /// Built-in header shape: inline or line-start
        #[arg(long)]
        marker_style: Option<MarkerStyle>,

        /// Custom header regex (first group = page, last group = next page)
        #[arg(long)]
        marker_pattern: Option<String>,

        /// List detected headers and pages without writing the output file
        #[arg(long)]
        dry_run: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Write each source page's cleaned text, numbered by source page
    Text {
        /// PDF (or .html) file to read
        #[arg(default_value = DEFAULT_PDF)]
        input: PathBuf,

        /// Path of the text file to write
        #[arg(short, long, default_value = "alice_wonderland_extracted.txt")]
        output: PathBuf,

        /// Keep the extractor's text order instead of reading left column then right
        #[arg(long)]
        no_columns: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Scrape a saved vocabulary-list page into JSON and SQL
    Glossary {
        /// Saved HTML word-list page
        #[arg(default_value = DEFAULT_GLOSSARY_HTML)]
        input: PathBuf,

        /// Path of the JSON file to write
        #[arg(long, default_value = "alice_glossary.json")]
        json: PathBuf,

        /// Path of the SQL script to write
        #[arg(long, default_value = "alice_glossary.sql")]
        sql: PathBuf,

        /// Table the SQL script inserts into
        #[arg(long)]
        table: Option<String>,

        /// Book id stored with every row
        #[arg(long)]
        book_id: Option<String>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let cli = Cli::parse();
    let file_config = config_file::load_config();

    match cli.command {
        Command::Pages {
            input,
            output,
            no_columns,
            straddle,
            marker_style,
            marker_pattern,
            dry_run,
            no_color,
        } => {
            let flags = ParsingFlags {
                no_columns,
                straddle,
                marker_style,
                marker_pattern,
            };
            pages(&input, &output, &flags, dry_run, no_color, &file_config)
        }
        Command::Text {
            input,
            output,
            no_columns,
            no_color,
        } => {
            let flags = ParsingFlags {
                no_columns,
                ..ParsingFlags::default()
            };
            text(&input, &output, &flags, no_color, &file_config)
        }
        Command::Glossary {
            input,
            json,
            sql,
            table,
            book_id,
            no_color,
        } => glossary(&input, &json, &sql, table, book_id, no_color, &file_config),
    }
}

/// Log filter from a `RUST_LOG`-style spec, `warn` when unset or invalid.
fn log_filter(spec: Option<&str>) -> EnvFilter {
    spec.filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn build_extractor(flags: &ParsingFlags, file_config: &ConfigFile) -> anyhow::Result<PageExtractor> {
    let env_pattern = std::env::var(settings::MARKER_PATTERN_ENV).ok();
    let config = settings::parsing_config(file_config, flags, env_pattern)?;
    Ok(PageExtractor::with_config(config))
}

/// Read every source page of `input`, reporting which backend is used.
fn read_source_pages(
    input: &Path,
    file_config: &ConfigFile,
    w: &mut dyn Write,
) -> anyhow::Result<Vec<RawPage>> {
    if !input.exists() {
        anyhow::bail!("File not found: {}", input.display());
    }
    let source = settings::page_source(input, file_config)?;

    writeln!(w, "Extracting text from {}...", display_name(input))?;
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}").unwrap());
    spinner.set_message(format!("Reading pages ({})", source.name()));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = source.read_pages(input);
    spinner.finish_and_clear();

    let pages = result?;
    tracing::info!(pages = pages.len(), source = source.name(), "read source pages");
    Ok(pages)
}

/// Run a pipeline step with a page progress bar, collecting its events.
fn with_page_bar<T>(
    total: usize,
    step: impl FnOnce(&dyn Fn(PipelineEvent)) -> T,
) -> (T, Vec<PipelineEvent>) {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} Processing page {pos}/{len} [{bar:40.green/dim}]")
            .unwrap()
            .progress_chars("=> "),
    );

    let events = RefCell::new(Vec::new());
    let result = step(&|event: PipelineEvent| {
        if let PipelineEvent::PageExtracted { .. } = event {
            bar.inc(1);
        }
        events.borrow_mut().push(event);
    });
    bar.finish_and_clear();

    (result, events.into_inner())
}

fn pages(
    input: &Path,
    output: &Path,
    flags: &ParsingFlags,
    dry_run: bool,
    no_color: bool,
    file_config: &ConfigFile,
) -> anyhow::Result<()> {
    let color = ColorMode(!no_color);
    let mut writer: Box<dyn Write> = Box::new(std::io::stdout());

    let extractor = build_extractor(flags, file_config)?;
    if !dry_run {
        writeln!(writer, "Output will be saved to {}\n", output.display())?;
    }

    let raw_pages = read_source_pages(input, file_config, &mut writer)?;
    let (extraction, events) =
        with_page_bar(raw_pages.len(), |on_event| extractor.extract(&raw_pages, on_event));

    writeln!(
        writer,
        "Read {} source pages ({} characters)",
        extraction.source_pages, extraction.text_len
    )?;
    output::print_fallback_summary(&mut writer, &events, color)?;
    for event in &events {
        output::print_progress(&mut writer, event, color)?;
    }

    if dry_run {
        writeln!(writer)?;
        output::print_dry_run(
            &mut writer,
            &display_name(input),
            &extraction.markers,
            &extraction.pages,
            color,
        )?;
        return Ok(());
    }

    write_staged(output, &render_pages(&extraction.pages))?;
    output::print_pages_saved(
        &mut writer,
        &extraction.pages,
        &output.display().to_string(),
        color,
    )?;
    Ok(())
}

fn text(
    input: &Path,
    output: &Path,
    flags: &ParsingFlags,
    no_color: bool,
    file_config: &ConfigFile,
) -> anyhow::Result<()> {
    let color = ColorMode(!no_color);
    let mut writer: Box<dyn Write> = Box::new(std::io::stdout());

    let extractor = build_extractor(flags, file_config)?;
    writeln!(writer, "Output will be saved to {}\n", output.display())?;

    let raw_pages = read_source_pages(input, file_config, &mut writer)?;
    let (pages, events): (PageMap, _) = with_page_bar(raw_pages.len(), |on_event| {
        extractor.split_by_source_page(&raw_pages, on_event)
    });

    output::print_fallback_summary(&mut writer, &events, color)?;
    write_staged(output, &render_pages(&pages))?;
    output::print_pages_saved(&mut writer, &pages, &output.display().to_string(), color)?;
    Ok(())
}

fn glossary(
    input: &Path,
    json: &Path,
    sql: &Path,
    table: Option<String>,
    book_id: Option<String>,
    no_color: bool,
    file_config: &ConfigFile,
) -> anyhow::Result<()> {
    use owo_colors::OwoColorize;

    let color = ColorMode(!no_color);
    let mut writer: Box<dyn Write> = Box::new(std::io::stdout());

    if !input.exists() {
        anyhow::bail!("File not found: {}", input.display());
    }

    writeln!(writer, "Reading HTML file: {}", input.display())?;
    let entries = folio_html::extract_glossary(input)?;
    if color.enabled() {
        writeln!(
            writer,
            "{} {} glossary entries",
            "Extracted".green().bold(),
            entries.len()
        )?;
    } else {
        writeln!(writer, "Extracted {} glossary entries", entries.len())?;
    }
    if entries.is_empty() {
        tracing::warn!(path = %input.display(), "no glossary entries found");
    }

    let options = settings::sql_options(file_config, table, book_id);

    export_glossary(&entries, GlossaryFormat::Json, &options, json)?;
    writeln!(writer, "JSON written: {} ({} entries)", json.display(), entries.len())?;

    export_glossary(&entries, GlossaryFormat::Sql, &options, sql)?;
    writeln!(writer, "SQL written: {} ({} entries)", sql.display(), entries.len())?;

    output::print_glossary_summary(&mut writer, &entries, GLOSSARY_PREVIEW, color)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_log_filter_honors_requested_level() {
        assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(Some("info")).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            log_filter(Some("folio_parsing=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn test_log_filter_defaults_to_warn() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(Some("  ")).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            log_filter(Some("folio_parsing=loud")).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }
}
