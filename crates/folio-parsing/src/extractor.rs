use std::path::Path;

use folio_core::{PageMap, PageMarker, PageSource, PipelineEvent, RawPage, gap_len};

use crate::ParsingError;
use crate::columns::reorder_columns;
use crate::config::ParsingConfig;
use crate::markers::{BoundaryDetector, RunningHeaderDetector};
use crate::noise::NoiseFilter;
use crate::reflow::clean;
use crate::segment::Segmenter;

/// Chars of the full text quoted in "nothing found" diagnostics.
const EXCERPT_CHARS: usize = 500;

/// Markers and pages recovered from one full text.
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    pub markers: Vec<PageMarker>,
    pub pages: PageMap,
}

/// Result of running the whole pipeline over one document.
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    /// Pages the source reported.
    pub source_pages: usize,
    /// Length of the assembled full text, in bytes.
    pub text_len: usize,
    pub markers: Vec<PageMarker>,
    pub pages: PageMap,
}

/// Turns raw source pages into a map of physical book pages.
///
/// Pipeline:
/// 1. Column-reorder each source page (or keep its plain text)
/// 2. Join the non-empty page texts into one full text
/// 3. Find running-header markers in the full text
/// 4. Slice between markers, clean each slice and credit it to a page
pub struct PageExtractor {
    config: ParsingConfig,
    detector: Box<dyn BoundaryDetector>,
    segmenter: Segmenter,
}

impl Default for PageExtractor {
    fn default() -> Self {
        Self::with_config(ParsingConfig::default())
    }
}

impl PageExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParsingConfig) -> Self {
        let detector = Box::new(RunningHeaderDetector::from_config(&config));
        let segmenter = Segmenter::from_config(&config);
        Self {
            config,
            detector,
            segmenter,
        }
    }

    /// Replace the marker detector built from the config.
    pub fn with_detector(mut self, detector: impl BoundaryDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    /// Text of one source page in reading order.
    pub fn page_text(&self, page: &RawPage, on_event: &dyn Fn(PipelineEvent)) -> String {
        if !self.config.column_reorder {
            return page.text.clone();
        }

        let column_text = reorder_columns(page);
        if let Some(reason) = column_text.fallback_reason() {
            tracing::debug!(page = page.index, %reason, "column reorder skipped");
            on_event(PipelineEvent::ColumnFallback {
                index: page.index,
                reason: reason.clone(),
            });
        }
        column_text.into_text()
    }

    /// Join the non-empty page texts with a newline.
    pub fn assemble(&self, pages: &[RawPage], on_event: &dyn Fn(PipelineEvent)) -> String {
        let total = pages.len();
        let mut texts = Vec::with_capacity(total);
        for page in pages {
            let text = self.page_text(page, on_event);
            on_event(PipelineEvent::PageExtracted {
                index: page.index,
                total,
            });
            if !text.trim().is_empty() {
                texts.push(text);
            }
        }
        texts.join("\n")
    }

    pub fn detect_markers(&self, text: &str) -> Vec<PageMarker> {
        self.detector.detect(text)
    }

    /// Split a full text into physical pages.
    pub fn split(&self, full_text: &str, on_event: &dyn Fn(PipelineEvent)) -> Segmentation {
        let markers = self.detect_markers(full_text);

        if markers.is_empty() {
            if !full_text.trim().is_empty() {
                tracing::warn!(
                    detector = self.detector.name(),
                    text_len = full_text.len(),
                    "no page markers found; attributing all text to the leading page"
                );
                on_event(PipelineEvent::NoMarkers {
                    text_len: full_text.len(),
                    excerpt: excerpt(full_text),
                });
            }
        } else {
            tracing::debug!(count = markers.len(), "page markers found");
            on_event(PipelineEvent::MarkersFound {
                count: markers.len(),
                first: markers.first().cloned(),
                last: markers.last().cloned(),
            });
        }

        let pages = self.segmenter.segment(full_text, &markers);

        for page in pages.page_numbers() {
            on_event(PipelineEvent::PageSegmented { page });
        }

        if pages.is_empty() {
            on_event(PipelineEvent::NoPages {
                text_len: full_text.len(),
                excerpt: excerpt(full_text),
            });
        } else {
            let gaps = pages.missing_pages();
            if !gaps.is_empty() {
                let total = gap_len(&gaps);
                tracing::debug!(gaps = gaps.len(), total, "gaps in recovered page numbers");
                on_event(PipelineEvent::MissingPages { gaps, total });
            }
        }

        Segmentation { markers, pages }
    }

    /// Assemble and split already-read source pages.
    pub fn extract(&self, pages: &[RawPage], on_event: &dyn Fn(PipelineEvent)) -> PageExtraction {
        let full_text = self.assemble(pages, on_event);
        let Segmentation { markers, pages: map } = self.split(&full_text, on_event);
        PageExtraction {
            source_pages: pages.len(),
            text_len: full_text.len(),
            markers,
            pages: map,
        }
    }

    /// Read a document through `source`, then [`extract`](Self::extract) it.
    pub fn extract_via_source(
        &self,
        path: &Path,
        source: &dyn PageSource,
        on_event: &dyn Fn(PipelineEvent),
    ) -> Result<PageExtraction, ParsingError> {
        tracing::debug!(source = source.name(), path = %path.display(), "reading pages");
        let pages = source.read_pages(path)?;
        Ok(self.extract(&pages, on_event))
    }

    /// One entry per source page, keyed by its 1-based index.
    ///
    /// No marker detection: each source page is cleaned on its own. Pages
    /// that clean to nothing are omitted.
    pub fn split_by_source_page(
        &self,
        pages: &[RawPage],
        on_event: &dyn Fn(PipelineEvent),
    ) -> PageMap {
        let filter = NoiseFilter::from_config(&self.config);
        let total = pages.len();
        let mut map = PageMap::new();

        for page in pages {
            let text = self.page_text(page, on_event);
            on_event(PipelineEvent::PageExtracted {
                index: page.index,
                total,
            });
            let cleaned = clean(&text, &filter);
            if cleaned.is_empty() {
                continue;
            }
            let Ok(number) = u32::try_from(page.index) else {
                tracing::warn!(index = page.index, "source page index out of range");
                continue;
            };
            map.insert(number, cleaned);
        }

        map
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}
