// src/scan/extractor.rs
//
// Turns raw fetched markup into a title and a normalized plain-text body.
// Caps are hard limits applied after extraction, before persistence; the
// recorded length is the pre-truncation one so analytics see the real size.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Persisted title cap, in characters.
pub const TITLE_MAX_CHARS: usize = 250;
/// Persisted body cap, in characters.
pub const CONTENT_MAX_CHARS: usize = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub title: String,
    pub text: String,
    /// Character count of the extracted text before truncation.
    pub text_len: usize,
}

fn re_title() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap())
}

fn re_script_style() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)\s*>").unwrap()
    })
}

fn re_tags() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap())
}

fn re_ws() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn collapse_ws(s: &str) -> String {
    re_ws().replace_all(s, " ").trim().to_string()
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

/// Extract title and normalized body text from `raw_html`.
///
/// The title comes from the document's `<title>` element; when absent or
/// empty after normalization, `fallback_title` (the target URL) is used.
/// The body is the document with script/style blocks dropped, tags replaced
/// by spaces, entities decoded and whitespace collapsed.
pub fn extract(raw_html: &str, fallback_title: &str) -> Extracted {
    let title = re_title()
        .captures(raw_html)
        .and_then(|c| c.get(1))
        .map(|m| collapse_ws(&html_escape::decode_html_entities(m.as_str())))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback_title.to_string());

    let without_blocks = re_script_style().replace_all(raw_html, " ");
    let without_tags = re_tags().replace_all(&without_blocks, " ");
    let text = collapse_ws(&html_escape::decode_html_entities(without_tags.as_ref()));
    let text_len = text.chars().count();

    Extracted {
        title: truncate_chars(&title, TITLE_MAX_CHARS),
        text: truncate_chars(&text, CONTENT_MAX_CHARS),
        text_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_text_are_normalized() {
        let html = "<html><head><title>  Leak &amp; Co.\n</title></head>\
                    <body><p>Hello   <b>world</b></p></body></html>";
        let out = extract(html, "https://fallback.example");
        assert_eq!(out.title, "Leak & Co.");
        assert_eq!(out.text, "Leak & Co. Hello world");
    }

    #[test]
    fn missing_title_falls_back_to_url() {
        let out = extract("<body>no title here</body>", "https://x.example/p");
        assert_eq!(out.title, "https://x.example/p");
    }

    #[test]
    fn empty_title_falls_back_to_url() {
        let out = extract("<title>   </title><body>x</body>", "https://x.example");
        assert_eq!(out.title, "https://x.example");
    }

    #[test]
    fn script_and_style_bodies_are_dropped() {
        let html = "<script>var password = 'secret';</script>\
                    <style>.a { color: red }</style><p>visible</p>";
        let out = extract(html, "u");
        assert_eq!(out.text, "visible");
    }

    #[test]
    fn title_is_truncated_to_exactly_250_chars() {
        let long = "t".repeat(400);
        let html = format!("<title>{long}</title><body>b</body>");
        let out = extract(&html, "u");
        assert_eq!(out.title.chars().count(), 250);
    }

    #[test]
    fn content_is_truncated_but_length_is_pre_truncation() {
        let body = "x".repeat(CONTENT_MAX_CHARS + 500);
        let html = format!("<title>t</title><body>{body}</body>");
        let out = extract(&html, "u");
        assert_eq!(out.text.chars().count(), CONTENT_MAX_CHARS);
        // "t " prefix from the title text node plus the body run.
        assert_eq!(out.text_len, CONTENT_MAX_CHARS + 500 + 2);
    }

    #[test]
    fn tags_separate_adjacent_text_nodes() {
        let out = extract("<p>one</p><p>two</p>", "u");
        assert_eq!(out.text, "one two");
    }
}
