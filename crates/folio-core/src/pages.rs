use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Physical page number → cleaned page text, iterated in ascending page order.
///
/// Page numbers need not be contiguous. Inserting an existing page replaces
/// its text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMap {
    pages: BTreeMap<u32, String>,
}

impl PageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` for `page`, returning the text it replaced.
    pub fn insert(&mut self, page: u32, text: String) -> Option<String> {
        self.pages.insert(page, text)
    }

    pub fn get(&self, page: u32) -> Option<&str> {
        self.pages.get(&page).map(String::as_str)
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains_key(&page)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.pages.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        self.pages.keys().copied().collect()
    }

    pub fn first_page(&self) -> Option<u32> {
        self.pages.keys().next().copied()
    }

    pub fn last_page(&self) -> Option<u32> {
        self.pages.keys().next_back().copied()
    }

    /// Runs of page numbers absent between the first and last present page.
    pub fn missing_pages(&self) -> Vec<RangeInclusive<u32>> {
        let mut gaps = Vec::new();
        let mut prev: Option<u32> = None;
        for &page in self.pages.keys() {
            if let Some(p) = prev {
                if page - p > 1 {
                    gaps.push(p + 1..=page - 1);
                }
            }
            prev = Some(page);
        }
        gaps
    }
}

/// Total count of page numbers covered by `gaps`.
pub fn gap_len(gaps: &[RangeInclusive<u32>]) -> u64 {
    gaps.iter()
        .map(|g| u64::from(*g.end()) - u64::from(*g.start()) + 1)
        .sum()
}

impl FromIterator<(u32, String)> for PageMap {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_last_write_wins() {
        let mut map = PageMap::new();
        assert!(map.insert(3, "first".into()).is_none());
        assert_eq!(map.insert(3, "second".into()).as_deref(), Some("first"));
        assert_eq!(map.get(3), Some("second"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn iterates_in_ascending_order() {
        let map: PageMap = [(10, "c"), (2, "a"), (7, "b")]
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        let order: Vec<u32> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec![2, 7, 10]);
        assert_eq!(map.first_page(), Some(2));
        assert_eq!(map.last_page(), Some(10));
    }

    #[test]
    fn missing_pages_reports_gaps() {
        let map: PageMap = [1, 2, 5, 6, 9]
            .into_iter()
            .map(|k| (k, String::new()))
            .collect();
        assert_eq!(map.missing_pages(), vec![3..=4, 7..=8]);
        assert_eq!(gap_len(&map.missing_pages()), 4);
    }

    #[test]
    fn missing_pages_huge_gap_stays_small() {
        let map: PageMap = [1, 2, 3_999_999_999, u32::MAX]
            .into_iter()
            .map(|k| (k, String::new()))
            .collect();
        let gaps = map.missing_pages();
        assert_eq!(gaps, vec![3..=3_999_999_998, 4_000_000_000..=u32::MAX - 1]);
        assert_eq!(
            gap_len(&gaps),
            (3_999_999_998 - 3 + 1) + (u64::from(u32::MAX) - 1 - 4_000_000_000 + 1)
        );
    }

    #[test]
    fn missing_pages_empty_and_single() {
        assert!(PageMap::new().missing_pages().is_empty());
        let mut map = PageMap::new();
        map.insert(4, "x".into());
        assert!(map.missing_pages().is_empty());
    }
}
