use once_cell::sync::Lazy;
use regex::Regex;

use folio_core::PageMarker;

use crate::config::{MarkerStyle, ParsingConfig};

/// Decides whether a candidate `(page, next_page)` pair is a real page transition.
pub trait MarkerValidator: Send + Sync {
    fn accepts(&self, page: u32, next_page: u32) -> bool;
}

impl<F> MarkerValidator for F
where
    F: Fn(u32, u32) -> bool + Send + Sync,
{
    fn accepts(&self, page: u32, next_page: u32) -> bool {
        self(page, next_page)
    }
}

/// Accepts a marker when `next_page - page` is one of the allowed steps.
///
/// The default `[1, 2]` tolerates one blank or unlabeled page between the two
/// numbers; anything else is treated as a stray number in the prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStep {
    steps: Vec<u32>,
}

impl Default for PageStep {
    fn default() -> Self {
        Self { steps: vec![1, 2] }
    }
}

impl PageStep {
    pub fn new(steps: Vec<u32>) -> Self {
        Self { steps }
    }
}

impl MarkerValidator for PageStep {
    fn accepts(&self, page: u32, next_page: u32) -> bool {
        next_page
            .checked_sub(page)
            .is_some_and(|step| self.steps.contains(&step))
    }
}

/// Finds page-transition markers in the concatenated document text.
pub trait BoundaryDetector: Send + Sync {
    fn name(&self) -> &str;

    /// Accepted markers, sorted by start offset.
    fn detect(&self, text: &str) -> Vec<PageMarker>;
}

/// `N TITLE. M` anywhere in the text; title is upper-case letters, spaces and hyphens.
static INLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)\s+([A-Z][A-Z\s-]+?)\.\s+([0-9]+)").unwrap());

/// `N Title. M` at the start of a line; title runs to the first period.
static LINE_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([0-9]+)\s+([A-Z][^.]*?)\.\s+([0-9]+)").unwrap());

/// Detects the book's running headers, `"2 DOWN THE RABBIT-HOLE. 3"`.
///
/// The first capture group is the page number, the last is the next page
/// number, and a middle group (when present) is the title. Matches are
/// non-overlapping; a rejected candidate still consumes its text.
pub struct RunningHeaderDetector {
    name: String,
    pattern: Regex,
    validator: Box<dyn MarkerValidator>,
}

impl std::fmt::Debug for RunningHeaderDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningHeaderDetector")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

impl Default for RunningHeaderDetector {
    fn default() -> Self {
        Self::inline()
    }
}

impl RunningHeaderDetector {
    /// `pattern` must have at least two capture groups; use
    /// [`ParsingConfigBuilder::marker_regex`](crate::ParsingConfigBuilder::marker_regex)
    /// to have that checked up front.
    pub fn new(
        name: impl Into<String>,
        pattern: Regex,
        validator: impl MarkerValidator + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            pattern,
            validator: Box::new(validator),
        }
    }

    pub fn inline() -> Self {
        Self::new("inline", INLINE_RE.clone(), PageStep::default())
    }

    pub fn line_start() -> Self {
        Self::new("line-start", LINE_START_RE.clone(), PageStep::default())
    }

    /// Build the detector described by a parsing config.
    pub fn from_config(config: &ParsingConfig) -> Self {
        let validator = PageStep::new(config.page_steps.clone());
        match (&config.marker_re, config.marker_style) {
            (Some(re), _) => Self::new("custom", re.clone(), validator),
            (None, MarkerStyle::Inline) => Self::new("inline", INLINE_RE.clone(), validator),
            (None, MarkerStyle::LineStart) => {
                Self::new("line-start", LINE_START_RE.clone(), validator)
            }
        }
    }

    pub fn with_validator(mut self, validator: impl MarkerValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }
}

impl BoundaryDetector for RunningHeaderDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, text: &str) -> Vec<PageMarker> {
        let last_group = self.pattern.captures_len().saturating_sub(1);
        if last_group < 2 {
            return Vec::new();
        }

        let mut markers = Vec::new();
        for caps in self.pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let page = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
            let next_page = caps
                .get(last_group)
                .and_then(|m| m.as_str().parse::<u32>().ok());
            let (Some(page), Some(next_page)) = (page, next_page) else {
                tracing::debug!(candidate = whole.as_str(), "skipping: unparsable page number");
                continue;
            };

            if !self.validator.accepts(page, next_page) {
                tracing::debug!(
                    page,
                    next_page,
                    offset = whole.start(),
                    "rejected marker candidate"
                );
                continue;
            }

            let title = if last_group > 2 {
                caps.get(2).map(|m| m.as_str().trim().to_string())
            } else {
                None
            };

            markers.push(PageMarker {
                page,
                next_page,
                title: title.unwrap_or_default(),
                start: whole.start(),
                end: whole.end(),
            });
        }

        markers.sort_by_key(|m| m.start);
        markers
    }
}
