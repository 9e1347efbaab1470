use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;

/// Boilerplate emitted by the e-book viewer the source PDF was printed from:
/// toolbar labels, the copyright footer, and the doubled-letter garbage the
/// extractor produces when two overlapping text layers are read together.
pub(crate) static DEFAULT_NOISE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^Fit Page",
        r"^Full Screen",
        r"^Close Book",
        r"^Navigate Control",
        r"^Internet",
        r"^Digital Interface",
        r"^BookVirtual",
        r"^U\.S\. Patent",
        r"^All Rights Reserved",
        r"^© \d{4}",
        r"DDiiggiittaall",
        r"InItnetrefrafcaec",
        r"oBookoVkiVritrutaul",
        r"SP\.a tePnatt enPte ndPeinndgi",
        r"ARllig hRtsi ghRtess erRveesde",
    ]
    .into_iter()
    .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
    .collect()
});

/// Line-level keep/drop decision.
///
/// A line is dropped when its trimmed length is under `min_line_chars`, when
/// it matches a boilerplate pattern, or when it is longer than
/// `garbled_min_len` and less than `min_alpha_ratio` of it is alphabetic.
/// Lengths are counted in chars.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    patterns: Vec<Regex>,
    min_line_chars: usize,
    garbled_min_len: usize,
    min_alpha_ratio: f64,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::from_config(&ParsingConfig::default())
    }
}

impl NoiseFilter {
    pub fn from_config(config: &ParsingConfig) -> Self {
        Self {
            patterns: config.resolved_noise_patterns(),
            min_line_chars: config.min_line_chars,
            garbled_min_len: config.garbled_min_len,
            min_alpha_ratio: config.min_alpha_ratio,
        }
    }

    pub fn is_noise(&self, line: &str) -> bool {
        let stripped = line.trim();
        let len = stripped.chars().count();

        if len < self.min_line_chars {
            return true;
        }

        // Anchored patterns see the untrimmed line
        if self.patterns.iter().any(|re| re.is_match(line)) {
            return true;
        }

        if len > self.garbled_min_len {
            let alpha = stripped.chars().filter(|c| c.is_alphabetic()).count();
            if (alpha as f64) / (len as f64) < self.min_alpha_ratio {
                return true;
            }
        }

        false
    }

    pub fn keep(&self, line: &str) -> bool {
        !self.is_noise(line)
    }

    /// Drop noise lines from multi-line text, keeping the survivors in order.
    pub fn filter(&self, text: &str) -> String {
        text.split('\n')
            .filter(|line| self.keep(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
