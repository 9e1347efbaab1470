use std::path::Path;

use mupdf::{Document, TextPageFlags};

use folio_core::{PageLayout, PageSource, RawPage, SourceError, TextFragment};

/// MuPDF-based implementation of [`PageSource`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// so that HTML-only builds do not transitively depend on it.
///
/// Each page yields its plain text (block by block, one line per text
/// line) and one positioned fragment per text block for column
/// reordering. Coordinates are shifted so the page origin is `(0, 0)`.
///
/// Header and footer exclusion are off by default; the running headers
/// are what page segmentation keys on.
#[derive(Debug, Clone, Default)]
pub struct MupdfSource {
    /// Fraction of page height from bottom to exclude as footer (0.0–1.0).
    footer_exclusion_ratio: Option<f32>,
    /// Fraction of page height from top to exclude as header (0.0–1.0).
    header_exclusion_ratio: Option<f32>,
}

impl MupdfSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = (ratio > 0.0).then_some(ratio);
        self
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = (ratio > 0.0).then_some(ratio);
        self
    }

    /// Vertical band `(top, bottom)` whose blocks are kept, relative to the
    /// page origin.
    fn kept_band(&self, page_height: f32) -> (Option<f32>, Option<f32>) {
        let top = self.header_exclusion_ratio.map(|r| page_height * r);
        let bottom = self.footer_exclusion_ratio.map(|r| page_height - page_height * r);
        (top, bottom)
    }
}

fn extraction_error(e: impl std::fmt::Display) -> SourceError {
    SourceError::ExtractionError(e.to_string())
}

impl PageSource for MupdfSource {
    fn name(&self) -> &str {
        "mupdf"
    }

    fn read_pages(&self, path: &Path) -> Result<Vec<RawPage>, SourceError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| SourceError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| SourceError::OpenError(e.to_string()))?;

        let mut pages = Vec::new();

        for (i, page_result) in document.pages().map_err(extraction_error)?.enumerate() {
            let index = i + 1;
            let page = page_result.map_err(extraction_error)?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(extraction_error)?;

            // Missing bounds only cost us the column pass, not the page
            let bounds = match page.bounds() {
                Ok(b) => Some(b),
                Err(e) => {
                    tracing::debug!(page = index, error = %e, "page bounds unavailable");
                    None
                }
            };

            let (origin_x, origin_y) = bounds.as_ref().map_or((0.0, 0.0), |b| (b.x0, b.y0));
            let (top, bottom) = bounds
                .as_ref()
                .map_or((None, None), |b| self.kept_band(b.y1 - b.y0));

            let mut text = String::new();
            let mut fragments = Vec::new();

            for block in text_page.blocks() {
                let block_bounds = block.bounds();
                let y0 = block_bounds.y0 - origin_y;
                let y1 = block_bounds.y1 - origin_y;

                // Skip blocks entirely within the header region
                if top.is_some_and(|t| y1 <= t) {
                    continue;
                }
                // Skip blocks whose top edge is in the footer region
                if bottom.is_some_and(|b| y0 >= b) {
                    continue;
                }

                let mut block_text = String::new();
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    text.push_str(&line_text);
                    text.push('\n');
                    if !block_text.is_empty() {
                        block_text.push('\n');
                    }
                    block_text.push_str(&line_text);
                }

                fragments.push(TextFragment::new(
                    block_text,
                    block_bounds.x0 - origin_x,
                    y0,
                    block_bounds.x1 - origin_x,
                    y1,
                ));
            }

            let layout = match &bounds {
                Some(b) => PageLayout::Positioned {
                    width: b.x1 - b.x0,
                    fragments,
                },
                None => PageLayout::Failed("page bounds unavailable".into()),
            };

            tracing::debug!(page = index, chars = text.len(), "read page");
            pages.push(RawPage {
                index,
                text,
                layout,
            });
        }

        Ok(pages)
    }
}
