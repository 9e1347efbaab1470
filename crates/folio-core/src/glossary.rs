use serde::{Deserialize, Serialize};

/// One word from a vocabulary list page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub word: String,
    pub frequency: Option<f64>,
    pub learnable: bool,
    pub definition: String,
    pub examples: Vec<String>,
}

/// Counts printed after a glossary extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlossaryStats {
    pub total: usize,
    pub learnable: usize,
    pub with_examples: usize,
    pub total_examples: usize,
}

impl GlossaryStats {
    pub fn from_entries(entries: &[GlossaryEntry]) -> Self {
        Self {
            total: entries.len(),
            learnable: entries.iter().filter(|e| e.learnable).count(),
            with_examples: entries.iter().filter(|e| !e.examples.is_empty()).count(),
            total_examples: entries.iter().map(|e| e.examples.len()).sum(),
        }
    }
}
