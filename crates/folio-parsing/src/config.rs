use std::str::FromStr;

use regex::Regex;
use thiserror::Error;

use crate::noise::DEFAULT_NOISE_PATTERNS;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),
    #[error("marker pattern {pattern:?} has {groups} capture group(s); at least 2 are required")]
    MarkerGroups { pattern: String, groups: usize },
    #[error("page step list is empty")]
    EmptyPageSteps,
    #[error("alphabetic ratio {0} is outside 0.0..=1.0")]
    InvalidRatio(f64),
    #[error("unknown attribution {0:?} (expected \"following\" or \"straddle\")")]
    UnknownAttribution(String),
    #[error("unknown marker style {0:?} (expected \"inline\" or \"line-start\")")]
    UnknownMarkerStyle(String),
}

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Which page a span of text between markers is credited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanAttribution {
    /// Text after a marker belongs to the marker's own page number.
    #[default]
    Following,
    /// Text before a marker belongs to its page number, text after it to the
    /// next page number. Later spans overwrite earlier ones.
    Straddle,
}

impl FromStr for SpanAttribution {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "following" => Ok(Self::Following),
            "straddle" => Ok(Self::Straddle),
            other => Err(ConfigError::UnknownAttribution(other.to_string())),
        }
    }
}

/// Built-in running-header pattern shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerStyle {
    /// `N TITLE. M` anywhere in the text.
    #[default]
    Inline,
    /// `N TITLE. M` at the start of a line, title up to the first period.
    LineStart,
}

impl FromStr for MarkerStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "line-start" | "line_start" => Ok(Self::LineStart),
            other => Err(ConfigError::UnknownMarkerStyle(other.to_string())),
        }
    }
}

/// Configuration for the reflow and segmentation pipeline.
///
/// Regex fields are `Option<Regex>`: `None` means "use the built-in default".
/// Use [`ParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── noise.rs ──
    /// Lines shorter than this (after trimming, in chars) are dropped.
    pub(crate) min_line_chars: usize,
    /// Lines longer than this are subject to the alphabetic-density check.
    pub(crate) garbled_min_len: usize,
    /// Minimum fraction of alphabetic chars for a long line to be kept.
    pub(crate) min_alpha_ratio: f64,
    /// Boilerplate patterns, matched case-insensitively.
    pub(crate) noise_patterns: ListOverride<Regex>,

    // ── markers.rs ──
    /// Custom running-header regex. First group = page, last group = next page.
    pub(crate) marker_re: Option<Regex>,
    pub(crate) marker_style: MarkerStyle,
    /// Accepted differences between the next page and the page of a marker.
    pub(crate) page_steps: Vec<u32>,

    // ── segment.rs ──
    pub(crate) attribution: SpanAttribution,
    /// Page credited with text before the first marker.
    pub(crate) leading_page: u32,

    // ── columns.rs ──
    pub(crate) column_reorder: bool,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            min_line_chars: 3,
            garbled_min_len: 10,
            min_alpha_ratio: 0.3,
            noise_patterns: ListOverride::Default,
            marker_re: None,
            marker_style: MarkerStyle::Inline,
            page_steps: vec![1, 2],
            attribution: SpanAttribution::Following,
            leading_page: 1,
            column_reorder: true,
        }
    }
}

impl ParsingConfig {
    pub fn attribution(&self) -> SpanAttribution {
        self.attribution
    }

    pub fn leading_page(&self) -> u32 {
        self.leading_page
    }

    pub fn column_reorder(&self) -> bool {
        self.column_reorder
    }

    pub fn page_steps(&self) -> &[u32] {
        &self.page_steps
    }

    /// Resolved boilerplate patterns (defaults plus/instead of overrides).
    pub(crate) fn resolved_noise_patterns(&self) -> Vec<Regex> {
        self.noise_patterns.resolve(&DEFAULT_NOISE_PATTERNS)
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    min_line_chars: Option<usize>,
    garbled_min_len: Option<usize>,
    min_alpha_ratio: Option<f64>,
    noise_patterns: ListOverrideBuilder,
    marker_re: Option<String>,
    marker_style: Option<MarkerStyle>,
    page_steps: Option<Vec<u32>>,
    attribution: Option<SpanAttribution>,
    leading_page: Option<u32>,
    column_reorder: Option<bool>,
}

/// Helper for building `ListOverride<Regex>` from string patterns.
#[derive(Debug, Clone, Default)]
enum ListOverrideBuilder {
    #[default]
    Default,
    Replace(Vec<String>),
    Extend(Vec<String>),
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Noise filter ──

    pub fn min_line_chars(mut self, n: usize) -> Self {
        self.min_line_chars = Some(n);
        self
    }

    pub fn garbled_min_len(mut self, n: usize) -> Self {
        self.garbled_min_len = Some(n);
        self
    }

    pub fn min_alpha_ratio(mut self, ratio: f64) -> Self {
        self.min_alpha_ratio = Some(ratio);
        self
    }

    pub fn set_noise_patterns(mut self, patterns: Vec<String>) -> Self {
        self.noise_patterns = ListOverrideBuilder::Replace(patterns);
        self
    }

    pub fn add_noise_pattern(mut self, pattern: String) -> Self {
        match &mut self.noise_patterns {
            ListOverrideBuilder::Extend(v) | ListOverrideBuilder::Replace(v) => v.push(pattern),
            ListOverrideBuilder::Default => {
                self.noise_patterns = ListOverrideBuilder::Extend(vec![pattern])
            }
        }
        self
    }

    // ── Markers ──

    pub fn marker_regex(mut self, pattern: &str) -> Self {
        self.marker_re = Some(pattern.to_string());
        self
    }

    pub fn marker_style(mut self, style: MarkerStyle) -> Self {
        self.marker_style = Some(style);
        self
    }

    pub fn page_steps(mut self, steps: Vec<u32>) -> Self {
        self.page_steps = Some(steps);
        self
    }

    // ── Segmentation ──

    pub fn attribution(mut self, attribution: SpanAttribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    pub fn leading_page(mut self, page: u32) -> Self {
        self.leading_page = Some(page);
        self
    }

    // ── Columns ──

    pub fn column_reorder(mut self, enabled: bool) -> Self {
        self.column_reorder = Some(enabled);
        self
    }

    /// Compile all string patterns and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, ConfigError> {
        let compile_noise = |patterns: Vec<String>| -> Result<Vec<Regex>, regex::Error> {
            patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){}", p)))
                .collect()
        };

        let noise_patterns = match self.noise_patterns {
            ListOverrideBuilder::Default => ListOverride::Default,
            ListOverrideBuilder::Replace(v) => ListOverride::Replace(compile_noise(v)?),
            ListOverrideBuilder::Extend(v) => ListOverride::Extend(compile_noise(v)?),
        };

        let marker_re = match self.marker_re {
            Some(pattern) => {
                let re = Regex::new(&pattern)?;
                // captures_len counts the implicit whole-match group
                let groups = re.captures_len() - 1;
                if groups < 2 {
                    return Err(ConfigError::MarkerGroups { pattern, groups });
                }
                Some(re)
            }
            None => None,
        };

        let page_steps = self.page_steps.unwrap_or_else(|| vec![1, 2]);
        if page_steps.is_empty() {
            return Err(ConfigError::EmptyPageSteps);
        }

        let min_alpha_ratio = self.min_alpha_ratio.unwrap_or(0.3);
        if !(0.0..=1.0).contains(&min_alpha_ratio) {
            return Err(ConfigError::InvalidRatio(min_alpha_ratio));
        }

        Ok(ParsingConfig {
            min_line_chars: self.min_line_chars.unwrap_or(3),
            garbled_min_len: self.garbled_min_len.unwrap_or(10),
            min_alpha_ratio,
            noise_patterns,
            marker_re,
            marker_style: self.marker_style.unwrap_or_default(),
            page_steps,
            attribution: self.attribution.unwrap_or_default(),
            leading_page: self.leading_page.unwrap_or(1),
            column_reorder: self.column_reorder.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParsingConfig::default();
        assert_eq!(config.min_line_chars, 3);
        assert_eq!(config.garbled_min_len, 10);
        assert!((config.min_alpha_ratio - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.page_steps, vec![1, 2]);
        assert_eq!(config.attribution, SpanAttribution::Following);
        assert_eq!(config.leading_page, 1);
        assert!(config.column_reorder);
    }

    #[test]
    fn test_builder_basic() {
        let config = ParsingConfigBuilder::new()
            .min_line_chars(2)
            .page_steps(vec![1])
            .attribution(SpanAttribution::Straddle)
            .leading_page(0)
            .column_reorder(false)
            .build()
            .unwrap();
        assert_eq!(config.min_line_chars, 2);
        assert_eq!(config.page_steps, vec![1]);
        assert_eq!(config.attribution, SpanAttribution::Straddle);
        assert_eq!(config.leading_page, 0);
        assert!(!config.column_reorder);
    }

    #[test]
    fn test_builder_invalid_regex() {
        let result = ParsingConfigBuilder::new().marker_regex(r"([0-9]+").build();
        assert!(matches!(result, Err(ConfigError::Regex(_))));

        let result = ParsingConfigBuilder::new()
            .add_noise_pattern("[unclosed".to_string())
            .build();
        assert!(matches!(result, Err(ConfigError::Regex(_))));
    }

    #[test]
    fn test_builder_marker_needs_two_groups() {
        let result = ParsingConfigBuilder::new()
            .marker_regex(r"([0-9]+) [A-Z]+\.")
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::MarkerGroups { groups: 1, .. })
        ));

        let ok = ParsingConfigBuilder::new()
            .marker_regex(r"([0-9]+) [A-Z]+\. ([0-9]+)")
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn test_builder_rejects_empty_steps_and_bad_ratio() {
        assert!(matches!(
            ParsingConfigBuilder::new().page_steps(vec![]).build(),
            Err(ConfigError::EmptyPageSteps)
        ));
        assert!(matches!(
            ParsingConfigBuilder::new().min_alpha_ratio(1.5).build(),
            Err(ConfigError::InvalidRatio(_))
        ));
    }

    #[test]
    fn test_noise_patterns_extend_and_replace() {
        let default_len = ParsingConfig::default().resolved_noise_patterns().len();

        let extended = ParsingConfigBuilder::new()
            .add_noise_pattern(r"^Project Gutenberg".to_string())
            .build()
            .unwrap();
        assert_eq!(extended.resolved_noise_patterns().len(), default_len + 1);

        let replaced = ParsingConfigBuilder::new()
            .set_noise_patterns(vec![r"^Project Gutenberg".to_string()])
            .build()
            .unwrap();
        let patterns = replaced.resolved_noise_patterns();
        assert_eq!(patterns.len(), 1);
        // Compiled case-insensitively
        assert!(patterns[0].is_match("PROJECT GUTENBERG EBOOK"));
    }

    #[test]
    fn test_list_override_resolve() {
        let defaults = vec!["a".to_string(), "b".to_string()];

        let d: ListOverride<String> = ListOverride::Default;
        assert_eq!(d.resolve(&defaults), defaults);

        let r: ListOverride<String> = ListOverride::Replace(vec!["x".to_string()]);
        assert_eq!(r.resolve(&defaults), vec!["x".to_string()]);

        let e: ListOverride<String> = ListOverride::Extend(vec!["c".to_string()]);
        assert_eq!(
            e.resolve(&defaults),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_parse_attribution_and_style() {
        assert_eq!(
            "Straddle".parse::<SpanAttribution>().unwrap(),
            SpanAttribution::Straddle
        );
        assert_eq!(
            "following".parse::<SpanAttribution>().unwrap(),
            SpanAttribution::Following
        );
        assert!("both".parse::<SpanAttribution>().is_err());
        assert_eq!(
            "line-start".parse::<MarkerStyle>().unwrap(),
            MarkerStyle::LineStart
        );
        assert!("fancy".parse::<MarkerStyle>().is_err());
    }
}
