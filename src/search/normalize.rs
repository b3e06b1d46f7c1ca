use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize free text for keyword comparison: lower-case, strip
/// diacritics (NFD + drop combining marks), replace punctuation with
/// spaces, collapse whitespace runs, trim.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let flattened: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    flattened.split_whitespace().collect::<Vec<_>>().join(" ")
}
