use std::path::Path;

use thiserror::Error;

use crate::RawPage;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("unsupported input: {0}")]
    Unsupported(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for page text acquisition backends.
///
/// Implementors turn a document on disk into raw per-page text, optionally
/// with positioned fragments; reflow and segmentation live in
/// `folio_parsing::PageExtractor`. Any error returned here ends the run.
pub trait PageSource: Send + Sync {
    /// Short backend name used in diagnostics.
    fn name(&self) -> &str;

    /// Read every page of the document, in page order.
    fn read_pages(&self, path: &Path) -> Result<Vec<RawPage>, SourceError>;
}
