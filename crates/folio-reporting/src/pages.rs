use folio_core::PageMap;

/// Width of the `=` rules around each page heading.
pub const PAGE_RULE_WIDTH: usize = 80;

/// Render a page map as the plain-text page file.
///
/// Each page, in ascending order, is a rule line, `PAGE N`, another rule,
/// a blank line, the page text and a blank line.
pub fn render_pages(pages: &PageMap) -> String {
    let rule = "=".repeat(PAGE_RULE_WIDTH);
    let mut out = String::new();
    for (page, text) in pages.iter() {
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format!("PAGE {}\n", page));
        out.push_str(&rule);
        out.push_str("\n\n");
        out.push_str(text);
        out.push_str("\n\n");
    }
    out
}
