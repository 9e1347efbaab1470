use folio_core::{PageMap, PageMarker};

use crate::config::{ParsingConfig, SpanAttribution};
use crate::noise::NoiseFilter;
use crate::reflow::clean;

/// Slices the full text between markers and credits each span to a page.
///
/// Every span is cleaned (noise filter, then reflow) before it is stored.
/// Spans that clean to nothing are dropped and never overwrite a page that
/// already has text. When there are no markers the whole text goes to the
/// leading page.
#[derive(Debug, Clone)]
pub struct Segmenter {
    filter: NoiseFilter,
    attribution: SpanAttribution,
    leading_page: u32,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::from_config(&ParsingConfig::default())
    }
}

impl Segmenter {
    pub fn from_config(config: &ParsingConfig) -> Self {
        Self {
            filter: NoiseFilter::from_config(config),
            attribution: config.attribution,
            leading_page: config.leading_page,
        }
    }

    pub fn segment(&self, text: &str, markers: &[PageMarker]) -> PageMap {
        let mut pages = PageMap::new();
        if text.is_empty() {
            return pages;
        }

        let markers = usable_markers(text, markers);
        let Some(first) = markers.first() else {
            self.assign(&mut pages, self.leading_page, text);
            return pages;
        };

        self.assign(&mut pages, self.leading_page, &text[..first.start]);

        for (i, marker) in markers.iter().enumerate() {
            let after_end = markers.get(i + 1).map_or(text.len(), |m| m.start);
            let after = &text[marker.end..after_end];

            match self.attribution {
                SpanAttribution::Following => {
                    self.assign(&mut pages, marker.page, after);
                }
                SpanAttribution::Straddle => {
                    let before_start = if i == 0 { 0 } else { markers[i - 1].end };
                    self.assign(&mut pages, marker.page, &text[before_start..marker.start]);
                    self.assign(&mut pages, marker.next_page, after);
                }
            }
        }

        pages
    }

    fn assign(&self, pages: &mut PageMap, page: u32, raw: &str) {
        let cleaned = clean(raw, &self.filter);
        if cleaned.trim().is_empty() {
            return;
        }
        pages.insert(page, cleaned);
    }
}

/// Sorted, in-bounds, non-overlapping markers. Detectors outside this crate
/// are not trusted to uphold that.
fn usable_markers<'a>(text: &str, markers: &'a [PageMarker]) -> Vec<&'a PageMarker> {
    let mut sorted: Vec<&PageMarker> = markers.iter().collect();
    sorted.sort_by_key(|m| m.start);

    let mut usable: Vec<&PageMarker> = Vec::with_capacity(sorted.len());
    for marker in sorted {
        let in_bounds = marker.start <= marker.end
            && marker.end <= text.len()
            && text.is_char_boundary(marker.start)
            && text.is_char_boundary(marker.end);
        if !in_bounds {
            tracing::warn!(start = marker.start, end = marker.end, "ignoring out-of-bounds marker");
            continue;
        }
        if usable.last().is_some_and(|prev| marker.start < prev.end) {
            tracing::warn!(page = marker.page, start = marker.start, "ignoring overlapping marker");
            continue;
        }
        usable.push(marker);
    }
    usable
}
