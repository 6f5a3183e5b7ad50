//! Text format rendering for translation bodies.
//!
//! Bodies are stored as plain text. At render time they pass through the
//! configured text format: HTML-escape, wrap blank-line separated
//! paragraphs in `<p>` elements, turn single newlines into `<br>`.

/// Render a plain-text body to paragraph markup.
///
/// An empty (or whitespace-only) body renders to an empty string.
pub fn render_plain_text(body: &str) -> String {
    let normalized = body.replace("\r\n", "\n");

    normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| {
            let escaped = escape_html(paragraph).replace('\n', "<br>\n");
            format!("<p>{}</p>", escaped)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape the HTML special characters in `text`.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
