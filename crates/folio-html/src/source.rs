use std::path::Path;

use scraper::{ElementRef, Html, Selector};

use folio_core::{PageLayout, PageSource, RawPage, SourceError};

/// Elements whose text never reaches the page.
const SKIPPED: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that start a new line in the extracted text.
const BLOCKS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "br", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table",
    "section", "article", "blockquote", "pre", "hr", "dd", "dt",
];

/// A [`PageSource`] that reads an HTML document as a single page.
///
/// HTML has no pages and no geometry, so the result is always one
/// [`RawPage`] with [`PageLayout::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct HtmlSource;

impl HtmlSource {
    pub fn new() -> Self {
        Self
    }
}

impl PageSource for HtmlSource {
    fn name(&self) -> &str {
        "html"
    }

    fn read_pages(&self, path: &Path) -> Result<Vec<RawPage>, SourceError> {
        let bytes = std::fs::read(path)
            .map_err(|e| SourceError::OpenError(format!("{}: {}", path.display(), e)))?;
        let html = String::from_utf8_lossy(&bytes);
        let text = body_text(&html);
        tracing::debug!(path = %path.display(), chars = text.len(), "read html body");

        Ok(vec![RawPage {
            index: 1,
            text,
            layout: PageLayout::Unavailable,
        }])
    }
}

/// Visible text of the document body, one line per block element.
pub fn body_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let selector = Selector::parse("body").unwrap();

    let mut out = String::new();
    match document.select(&selector).next() {
        Some(body) => collect_text(body, &mut out),
        None => collect_text(document.root_element(), &mut out),
    }
    out
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if SKIPPED.contains(&name) {
                continue;
            }
            let block = BLOCKS.contains(&name);
            if block && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            collect_text(child_element, out);
            if block && !out.ends_with('\n') {
                out.push('\n');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_body_text_skips_scripts_and_styles() {
        let html = r#"<html><head><title>Vocab</title><style>p { color: red }</style></head>
            <body><script>var x = 1;</script><p>Alice was beginning</p><p>to get very tired</p></body></html>"#;
        let text = body_text(html);
        assert!(text.contains("Alice was beginning\n"));
        assert!(text.contains("to get very tired"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color"));
        assert!(!text.contains("Vocab"));
    }

    #[test]
    fn test_inline_elements_stay_on_one_line() {
        let text = body_text("<body><p>so <em>very</em> remarkable</p></body>");
        assert_eq!(text, "so very remarkable\n");
    }

    #[test]
    fn test_read_pages_single_page() -> anyhow::Result<()> {
        let mut file = tempfile::Builder::new().suffix(".html").tempfile()?;
        write!(file, "<html><body><div>Down the Rabbit-Hole</div></body></html>")?;

        let pages = HtmlSource::new().read_pages(file.path())?;
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].index, 1);
        assert_eq!(pages[0].text, "Down the Rabbit-Hole\n");
        assert_eq!(pages[0].layout, PageLayout::Unavailable);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let err = HtmlSource::new()
            .read_pages(Path::new("/nonexistent/folio/page.html"))
            .unwrap_err();
        assert!(matches!(err, SourceError::OpenError(_)));
    }
}
