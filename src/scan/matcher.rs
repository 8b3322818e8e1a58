// src/scan/matcher.rs
//
// Case-insensitive substring scan of extracted text against the configured
// keyword list. Deliberately dumb: no word boundaries, no stemming. The
// result preserves keyword-list order and carries no duplicates.

/// Returns the subset of `keywords` whose lower-cased form occurs as a
/// substring of the lower-cased `text`, in declaration order.
pub fn match_keywords(text: &str, keywords: &[String]) -> Vec<String> {
    let haystack = text.to_lowercase();
    let mut matched = Vec::new();
    for kw in keywords {
        let needle = kw.to_lowercase();
        if needle.is_empty() {
            continue;
        }
        if haystack.contains(&needle) && !matched.contains(kw) {
            matched.push(kw.clone());
        }
    }
    matched
}
