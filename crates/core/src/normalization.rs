use unicode_normalization::UnicodeNormalization;

/// NFKC-normalizes a line (NBSP and friends become plain spaces), drops
/// control characters and collapses whitespace runs to a single space.
pub fn normalize_line(line: &str) -> String {
    let trimmed = line.trim_matches(|c: char| c.is_control() || c.is_whitespace());
    let nfkc = trimmed.nfkc().collect::<String>();
    let mut result = String::with_capacity(nfkc.len());
    let mut prev_space = false;
    for ch in nfkc.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                result.push(' ');
                prev_space = true;
            }
            continue;
        }
        if ch.is_control() {
            continue;
        }
        result.push(ch);
        prev_space = false;
    }
    result.trim().to_string()
}

pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

pub fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}
