//! Query-side text normalization.
//!
//! The output is only used to build a search query, never for display, so it is deliberately
//! lossy: case folds away and punctuation disappears (including the sentence terminators the
//! summarizer would otherwise split on).

/// Lowercase, then keep only ASCII letters, ASCII digits and whitespace.
///
/// Lowercasing is Unicode-aware and happens first, so characters such as the Kelvin sign fold
/// into ASCII before the filter runs. No trimming and no whitespace collapsing: runs of
/// whitespace (including line breaks) survive verbatim.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect()
}

/// First `max_chars` characters of `s`, cut back to the last whitespace when the limit falls
/// inside a word. Returns the prefix and whether anything was dropped.
pub fn truncate_at_word(s: &str, max_chars: usize) -> (String, bool) {
    let mut out = String::new();
    for (n, ch) in s.chars().enumerate() {
        if n >= max_chars {
            if !ch.is_whitespace() {
                if let Some(i) = out.rfind(char::is_whitespace) {
                    out.truncate(i);
                }
            }
            return (out.trim_end().to_string(), true);
        }
        out.push(ch);
    }
    (out, false)
}
