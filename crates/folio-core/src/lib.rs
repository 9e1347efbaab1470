pub mod backend;
pub mod config_file;
pub mod glossary;
pub mod pages;

// Re-export for convenience
pub use backend::{PageSource, SourceError};
pub use glossary::{GlossaryEntry, GlossaryStats};
pub use pages::{PageMap, gap_len};

/// A block of text with its bounding box on the source page.
///
/// Coordinates follow the extraction library's convention: origin at the
/// top-left corner, `y` growing downwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            text: text.into(),
            x0,
            y0,
            x1,
            y1,
        }
    }

    /// Horizontal center of the bounding box.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }
}

/// Positional data reported by a [`PageSource`] for one page.
///
/// Distinguishes "the backend has no geometry" from "getting the geometry
/// failed" so callers can report the two differently.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PageLayout {
    Positioned {
        /// Page width in the same units as the fragment coordinates.
        width: f32,
        fragments: Vec<TextFragment>,
    },
    #[default]
    Unavailable,
    Failed(String),
}

/// Text extracted from a single source page, before any cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    /// 1-based page index in the source document.
    pub index: usize,
    /// Single-pass extraction text, in whatever order the backend produced it.
    pub text: String,
    pub layout: PageLayout,
}

impl RawPage {
    pub fn plain(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            layout: PageLayout::Unavailable,
        }
    }
}

/// A running-header match marking a transition between physical pages.
///
/// `start`/`end` are byte offsets into the full concatenated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMarker {
    pub page: u32,
    pub next_page: u32,
    pub title: String,
    pub start: usize,
    pub end: usize,
}

/// Why a page was not reordered by column.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// The source reported no geometry for the page.
    NoLayout,
    /// The source tried to collect geometry and failed.
    LayoutFailed(String),
    /// Geometry was present but held no non-empty fragments.
    NoFragments,
    /// Page width was zero, negative or not a number.
    InvalidWidth(f32),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::NoLayout => write!(f, "no positional data"),
            FallbackReason::LayoutFailed(e) => write!(f, "layout extraction failed: {}", e),
            FallbackReason::NoFragments => write!(f, "no text fragments"),
            FallbackReason::InvalidWidth(w) => write!(f, "invalid page width {}", w),
        }
    }
}

/// Progress events emitted while a document is processed.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    PageExtracted {
        index: usize,
        total: usize,
    },
    /// Column reordering was skipped for a page; plain text was used instead.
    ColumnFallback {
        index: usize,
        reason: FallbackReason,
    },
    MarkersFound {
        count: usize,
        first: Option<PageMarker>,
        last: Option<PageMarker>,
    },
    /// No marker was accepted; everything was attributed to the leading page.
    NoMarkers {
        text_len: usize,
        excerpt: String,
    },
    PageSegmented {
        page: u32,
    },
    /// Gaps between recovered page numbers, as inclusive runs.
    MissingPages {
        gaps: Vec<std::ops::RangeInclusive<u32>>,
        total: u64,
    },
    /// Segmentation produced nothing at all.
    NoPages {
        text_len: usize,
        excerpt: String,
    },
}
