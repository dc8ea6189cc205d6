//! Narrow seam to the markup-rendering collaborator.
//!
//! Page bodies and choice labels are authored as markup and rendered to HTML
//! by a component outside this system. Grading only needs a function from
//! text to HTML, so that is all this trait exposes. [`PlainHtml`] is a
//! minimal implementation used in tests and as a fallback.

/// Renders authored markup text into HTML.
pub trait MarkupRenderer: Send + Sync {
    fn render(&self, text: &str) -> String;
}

/// Escape-only renderer: no markup features, just safe HTML paragraphs.
#[derive(Debug, Default)]
pub struct PlainHtml;

impl MarkupRenderer for PlainHtml {
    fn render(&self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            return String::new();
        }
        text.split("\n\n")
            .map(|para| format!("<p>{}</p>", html_escape(para.trim())))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Escape a string for literal inclusion in HTML.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
