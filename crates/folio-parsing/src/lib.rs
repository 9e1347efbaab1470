use std::path::Path;

use thiserror::Error;

pub mod columns;
pub mod config;
pub mod extractor;
pub mod markers;
pub mod noise;
pub mod reflow;
pub mod segment;

pub use columns::{ColumnText, reorder_columns};
pub use config::{
    ConfigError, ListOverride, MarkerStyle, ParsingConfig, ParsingConfigBuilder, SpanAttribution,
};
pub use extractor::{PageExtraction, PageExtractor, Segmentation};
pub use markers::{BoundaryDetector, MarkerValidator, PageStep, RunningHeaderDetector};
pub use noise::NoiseFilter;
pub use reflow::{clean, reflow};
pub use segment::Segmenter;
// Re-export domain types from core (canonical definitions live there)
pub use folio_core::{PageMap, PageMarker, PageSource, PipelineEvent, RawPage, SourceError};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Split a document into physical book pages with the default configuration.
///
/// Pipeline:
/// 1. Read raw pages via `source`
/// 2. Restore two-column reading order where geometry is available
/// 3. Locate running headers such as `"2 DOWN THE RABBIT-HOLE. 3"`
/// 4. Clean and reflow the text between headers, keyed by page number
pub fn extract_pages(path: &Path, source: &dyn PageSource) -> Result<PageExtraction, ParsingError> {
    PageExtractor::new().extract_via_source(path, source, &|_| {})
}
