/// Characters kept on each side of the first match.
const CONTEXT_CHARS: usize = 50;

/// Excerpt of `body` around the first query word that occurs in it, case-insensitively.
///
/// Words are tried in query order. The excerpt is taken from the lowercased body,
/// spans up to 50 characters either side of the match and is wrapped in `...`.
/// Returns an empty string when no word occurs.
pub fn snippet<S: AsRef<str>>(body: &str, query: &[S]) -> String {
    let lowered: Vec<char> = body.to_lowercase().chars().collect();
    for word in query {
        let needle: Vec<char> = word.as_ref().trim().to_lowercase().chars().collect();
        if needle.is_empty() { continue; }
        if let Some(idx) = find_chars(&lowered, &needle) {
            let start = idx.saturating_sub(CONTEXT_CHARS);
            let end = (idx + CONTEXT_CHARS).min(lowered.len());
            let text: String = lowered[start..end].iter().collect();
            return format!("...{text}...");
        }
    }
    String::new()
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
