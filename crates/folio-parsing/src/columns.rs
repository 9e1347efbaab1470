use folio_core::{FallbackReason, PageLayout, RawPage, TextFragment};

/// Text for one source page after the column pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnText {
    /// Left column top to bottom, then right column top to bottom.
    Reordered(String),
    /// The page's plain extraction text, unchanged.
    Plain {
        text: String,
        reason: FallbackReason,
    },
}

impl ColumnText {
    pub fn text(&self) -> &str {
        match self {
            ColumnText::Reordered(text) => text,
            ColumnText::Plain { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ColumnText::Reordered(text) => text,
            ColumnText::Plain { text, .. } => text,
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            ColumnText::Reordered(_) => None,
            ColumnText::Plain { reason, .. } => Some(reason),
        }
    }
}

/// Rebuild reading order for a two-column page.
///
/// A fragment whose horizontal center is left of the page midpoint belongs to
/// the left column. Each column is sorted by its top edge (ties keep source
/// order) and the fragments are joined with a blank line. Any page without
/// usable geometry falls back to its plain text, byte-for-byte.
pub fn reorder_columns(page: &RawPage) -> ColumnText {
    let plain = |reason: FallbackReason| ColumnText::Plain {
        text: page.text.clone(),
        reason,
    };

    let (width, fragments) = match &page.layout {
        PageLayout::Positioned { width, fragments } => (*width, fragments),
        PageLayout::Unavailable => return plain(FallbackReason::NoLayout),
        PageLayout::Failed(e) => return plain(FallbackReason::LayoutFailed(e.clone())),
    };

    if !width.is_finite() || width <= 0.0 {
        return plain(FallbackReason::InvalidWidth(width));
    }

    let midpoint = width / 2.0;
    let (mut left, mut right): (Vec<&TextFragment>, Vec<&TextFragment>) = fragments
        .iter()
        .filter(|f| !f.text.trim().is_empty())
        .partition(|f| f.center_x() < midpoint);

    if left.is_empty() && right.is_empty() {
        return plain(FallbackReason::NoFragments);
    }

    left.sort_by(|a, b| a.y0.total_cmp(&b.y0));
    right.sort_by(|a, b| a.y0.total_cmp(&b.y0));

    let text = left
        .iter()
        .chain(right.iter())
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    ColumnText::Reordered(text)
}
