//! Markdown to HTML conversion for stage 4 output.

use pulldown_cmark::{html as md_html, Options, Parser};

/// Convert markdown to an HTML fragment.
///
/// CommonMark plus tables, footnotes and strikethrough.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    md_html::push_html(&mut html, parser);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_markdown() {
        let html = markdown_to_html("# 标题\n\nThis is **bold**.\n\n> quoted");
        assert!(html.contains("<h1>标题</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<blockquote>"));
    }

    #[test]
    fn test_tables_enabled() {
        let html = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }
}
