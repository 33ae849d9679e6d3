/// HTML escaping for text emitted by the tokenizer.

/// Characters replaced in emitted text, in replacement order.
const ESCAPES: &[(char, &str)] = &[
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#039;"),
];

/// Escape `&`, `<`, `>`, `"` and `'`.
///
/// A single pass over the input is equivalent to replacing each character in
/// turn: no replacement introduces a character replaced later.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match ESCAPES.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => escaped.push_str(to),
            None => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape_html("hello world"), "hello world");
    }

    #[test]
    fn test_all_special_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_ampersand_not_double_escaped() {
        // An existing entity is escaped once, not re-processed.
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_multibyte() {
        assert_eq!(escape_html("n° <1>"), "n° &lt;1&gt;");
        assert_eq!(escape_html("café & co"), "café &amp; co");
    }
}
