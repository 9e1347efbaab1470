use std::io::Write;

use folio_core::{GlossaryEntry, GlossaryStats, PageMap, PageMarker, PipelineEvent};
use owo_colors::OwoColorize;

/// How many missing page numbers are listed before eliding the rest.
const MISSING_SHOWN: usize = 10;
/// Characters of definitions and examples shown in the glossary preview.
const PREVIEW_CHARS: usize = 80;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn warn_line(w: &mut dyn Write, message: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "WARNING:".yellow(), message)
    } else {
        writeln!(w, "WARNING: {}", message)
    }
}

/// Cut `s` to at most `max` chars, appending `...` when anything was dropped.
fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

fn describe_marker(m: &PageMarker) -> String {
    if m.title.is_empty() {
        format!("{} -> {} (offset {})", m.page, m.next_page, m.start)
    } else {
        format!("{} {}. {} (offset {})", m.page, m.title, m.next_page, m.start)
    }
}

/// Print a pipeline event that deserves the user's attention.
///
/// Per-page progress is left to the progress bar; column fallbacks are
/// summarized by [`print_fallback_summary`].
pub fn print_progress(
    w: &mut dyn Write,
    event: &PipelineEvent,
    color: ColorMode,
) -> std::io::Result<()> {
    match event {
        PipelineEvent::MarkersFound { count, first, last } => {
            writeln!(w, "Found {} page markers", count)?;
            if let Some(first) = first {
                writeln!(w, "  first: {}", describe_marker(first))?;
            }
            if let Some(last) = last {
                writeln!(w, "  last:  {}", describe_marker(last))?;
            }
        }
        PipelineEvent::NoMarkers { text_len, excerpt } => {
            warn_line(
                w,
                &format!(
                    "no page markers found in {} bytes of text; everything goes to the first page",
                    text_len
                ),
                color,
            )?;
            print_excerpt(w, excerpt, color)?;
        }
        PipelineEvent::MissingPages { gaps, total } => {
            let shown: Vec<String> = gaps
                .iter()
                .cloned()
                .flatten()
                .take(MISSING_SHOWN)
                .map(|p| p.to_string())
                .collect();
            let more = if *total > MISSING_SHOWN as u64 {
                format!(" (and {} more)", total - MISSING_SHOWN as u64)
            } else {
                String::new()
            };
            warn_line(
                w,
                &format!("{} missing page(s): {}{}", total, shown.join(", "), more),
                color,
            )?;
        }
        PipelineEvent::NoPages { text_len, excerpt } => {
            warn_line(
                w,
                &format!("no pages recovered from {} bytes of text", text_len),
                color,
            )?;
            print_excerpt(w, excerpt, color)?;
        }
        PipelineEvent::PageExtracted { .. }
        | PipelineEvent::ColumnFallback { .. }
        | PipelineEvent::PageSegmented { .. } => {}
    }
    Ok(())
}

fn print_excerpt(w: &mut dyn Write, excerpt: &str, color: ColorMode) -> std::io::Result<()> {
    if excerpt.is_empty() {
        return Ok(());
    }
    writeln!(w, "First {} characters of the text:", excerpt.chars().count())?;
    if color.enabled() {
        writeln!(w, "{}", excerpt.dimmed())?;
    } else {
        writeln!(w, "{}", excerpt)?;
    }
    Ok(())
}

/// One line noting pages whose column order could not be restored.
pub fn print_fallback_summary(
    w: &mut dyn Write,
    events: &[PipelineEvent],
    color: ColorMode,
) -> std::io::Result<()> {
    let fallbacks: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::ColumnFallback { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    if fallbacks.is_empty() {
        return Ok(());
    }

    let msg = format!(
        "(Column reorder skipped on {} page(s); used plain text)",
        fallbacks.len()
    );
    if color.enabled() {
        writeln!(w, "{}", msg.dimmed())
    } else {
        writeln!(w, "{}", msg)
    }
}

/// Final line after the page file is written.
pub fn print_pages_saved(
    w: &mut dyn Write,
    pages: &PageMap,
    path: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    let range = match (pages.first_page(), pages.last_page()) {
        (Some(first), Some(last)) => format!(" (pages {}-{})", first, last),
        _ => String::new(),
    };
    if color.enabled() {
        writeln!(
            w,
            "{} {} pages{} to {}",
            "Saved".green().bold(),
            pages.len(),
            range,
            path.bold()
        )
    } else {
        writeln!(w, "Saved {} pages{} to {}", pages.len(), range, path)
    }
}

/// List markers and resulting pages without writing anything.
pub fn print_dry_run(
    w: &mut dyn Write,
    file_name: &str,
    markers: &[PageMarker],
    pages: &PageMap,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(
            w,
            "{} {} ({} markers, {} pages)\n",
            "DRY RUN:".bold().cyan(),
            file_name.bold(),
            markers.len(),
            pages.len()
        )?;
    } else {
        writeln!(
            w,
            "DRY RUN: {} ({} markers, {} pages)\n",
            file_name,
            markers.len(),
            pages.len()
        )?;
    }

    for (i, m) in markers.iter().enumerate() {
        writeln!(w, "[{}] {}", i + 1, describe_marker(m))?;
    }

    writeln!(w)?;
    for (page, text) in pages.iter() {
        let words = text.split_whitespace().count();
        writeln!(w, "PAGE {:>4}  {:>5} words", page, words)?;
    }
    Ok(())
}

/// Glossary totals followed by a preview of the first entries.
pub fn print_glossary_summary(
    w: &mut dyn Write,
    entries: &[GlossaryEntry],
    preview: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    let stats = GlossaryStats::from_entries(entries);

    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", "Summary:".bold())?;
    } else {
        writeln!(w, "Summary:")?;
    }
    writeln!(w, "  Total entries:          {}", stats.total)?;
    writeln!(w, "  Learnable entries:      {}", stats.learnable)?;
    writeln!(w, "  Entries with examples:  {}", stats.with_examples)?;
    writeln!(w, "  Total examples:         {}", stats.total_examples)?;

    if entries.is_empty() {
        return Ok(());
    }

    writeln!(w)?;
    writeln!(w, "First {} entries:", preview.min(entries.len()))?;
    for (i, entry) in entries.iter().take(preview).enumerate() {
        writeln!(w)?;
        if color.enabled() {
            writeln!(w, "{}. {}", i + 1, entry.word.bold())?;
        } else {
            writeln!(w, "{}. {}", i + 1, entry.word)?;
        }
        writeln!(
            w,
            "   Definition: {}",
            truncate(&entry.definition, PREVIEW_CHARS)
        )?;
        if let Some(example) = entry.examples.first() {
            writeln!(w, "   Example: {}", truncate(example, PREVIEW_CHARS))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: ColorMode = ColorMode(false);

    fn render(f: impl FnOnce(&mut dyn Write) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn marker(page: u32, title: &str, start: usize) -> PageMarker {
        PageMarker {
            page,
            next_page: page + 1,
            title: title.to_string(),
            start,
            end: start + 10,
        }
    }

    #[test]
    fn test_missing_pages_capped_at_ten() {
        let event = PipelineEvent::MissingPages {
            gaps: vec![3..=4, 7..=17],
            total: 13,
        };
        let out = render(|w| print_progress(w, &event, PLAIN));
        assert_eq!(
            out,
            "WARNING: 13 missing page(s): 3, 4, 7, 8, 9, 10, 11, 12, 13, 14 (and 3 more)\n"
        );
    }

    #[test]
    fn test_missing_pages_huge_gap() {
        let event = PipelineEvent::MissingPages {
            gaps: vec![3..=3_999_999_998],
            total: 3_999_999_996,
        };
        let out = render(|w| print_progress(w, &event, PLAIN));
        assert_eq!(
            out,
            "WARNING: 3999999996 missing page(s): 3, 4, 5, 6, 7, 8, 9, 10, 11, 12 (and 3999999986 more)\n"
        );
    }

    #[test]
    fn test_markers_found() {
        let event = PipelineEvent::MarkersFound {
            count: 2,
            first: Some(marker(2, "DOWN THE RABBIT-HOLE", 12)),
            last: Some(marker(3, "DOWN THE RABBIT-HOLE", 60)),
        };
        let out = render(|w| print_progress(w, &event, PLAIN));
        assert!(out.starts_with("Found 2 page markers\n"));
        assert!(out.contains("first: 2 DOWN THE RABBIT-HOLE. 3 (offset 12)"));
        assert!(out.contains("last:  3 DOWN THE RABBIT-HOLE. 4 (offset 60)"));
    }

    #[test]
    fn test_no_markers_shows_excerpt() {
        let event = PipelineEvent::NoMarkers {
            text_len: 42,
            excerpt: "Alice was beginning".to_string(),
        };
        let out = render(|w| print_progress(w, &event, PLAIN));
        assert!(out.starts_with("WARNING: no page markers found in 42 bytes"));
        assert!(out.ends_with("Alice was beginning\n"));
    }

    #[test]
    fn test_quiet_events_print_nothing() {
        let event = PipelineEvent::PageSegmented { page: 4 };
        assert_eq!(render(|w| print_progress(w, &event, PLAIN)), "");
    }

    #[test]
    fn test_fallback_summary() {
        let events = vec![
            PipelineEvent::ColumnFallback {
                index: 1,
                reason: folio_core::FallbackReason::NoLayout,
            },
            PipelineEvent::PageSegmented { page: 1 },
        ];
        let out = render(|w| print_fallback_summary(w, &events, PLAIN));
        assert_eq!(out, "(Column reorder skipped on 1 page(s); used plain text)\n");
        assert_eq!(render(|w| print_fallback_summary(w, &[], PLAIN)), "");
    }

    #[test]
    fn test_pages_saved_line() {
        let pages: PageMap = [(1, "a".to_string()), (9, "b".to_string())]
            .into_iter()
            .collect();
        let out = render(|w| print_pages_saved(w, &pages, "out.txt", PLAIN));
        assert_eq!(out, "Saved 2 pages (pages 1-9) to out.txt\n");
    }

    #[test]
    fn test_dry_run_listing() {
        let pages: PageMap = [(2, "two words".to_string())].into_iter().collect();
        let out = render(|w| {
            print_dry_run(w, "alice.pdf", &[marker(2, "", 5)], &pages, PLAIN)
        });
        assert!(out.starts_with("DRY RUN: alice.pdf (1 markers, 1 pages)\n\n"));
        assert!(out.contains("[1] 2 -> 3 (offset 5)\n"));
        assert!(out.contains("PAGE    2      2 words\n"));
    }

    #[test]
    fn test_glossary_preview_truncates() {
        let entries = vec![GlossaryEntry {
            word: "curious".into(),
            frequency: None,
            learnable: true,
            definition: "x".repeat(100),
            examples: vec!["short example".into()],
        }];
        let out = render(|w| print_glossary_summary(w, &entries, 5, PLAIN));
        assert!(out.contains("Total entries:          1"));
        assert!(out.contains("Learnable entries:      1"));
        assert!(out.contains(&format!("   Definition: {}...\n", "x".repeat(80))));
        assert!(out.contains("   Example: short example\n"));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("héllo", 2), "hé...");
        assert_eq!(truncate("hi", 5), "hi");
    }
}
