use std::collections::HashSet;

use crate::kb::types::{KbChunk, KbEntry, KbUnit};

use super::normalize::normalize;

/// Keywords shorter than this after normalization never match.
const MIN_KEYWORD_LEN: usize = 2;
/// Query tokens shorter than this are ignored for chunk matching.
const MIN_TOKEN_LEN: usize = 3;

const KEYWORD_POINTS: u32 = 3;
const TITLE_POINTS: u32 = 2;

/// Entry-mode score: +3 per keyword found at word boundaries in the
/// query, +2 when the whole normalized title appears inside the query.
///
/// Boundary matching pads both sides with a space, so "plan" matches
/// "uzemni plan obce" but not "planeta".
pub fn score_entry(query_norm: &str, entry: &KbEntry) -> u32 {
    if query_norm.is_empty() {
        return 0;
    }

    let hay = format!(" {} ", query_norm);
    let mut score = 0;

    for kw in &entry.keywords {
        let k = normalize(kw);
        if k.len() < MIN_KEYWORD_LEN {
            continue;
        }
        if hay.contains(&format!(" {} ", k)) {
            score += KEYWORD_POINTS;
        }
    }

    // Title direction is title-in-query only.
    let title = normalize(&entry.title);
    if !title.is_empty() && query_norm.contains(&title) {
        score += TITLE_POINTS;
    }

    score
}

/// Chunk-mode score: +1 per distinct query token (length ≥ 3) contained
/// anywhere in the normalized chunk text.
pub fn score_chunk(query_norm: &str, chunk: &KbChunk) -> u32 {
    if query_norm.is_empty() {
        return 0;
    }
    let text = normalize(&chunk.text);
    if text.is_empty() {
        return 0;
    }

    let mut seen = HashSet::new();
    let mut score = 0;
    for token in query_norm.split_whitespace() {
        if token.len() < MIN_TOKEN_LEN || !seen.insert(token) {
            continue;
        }
        if text.contains(token) {
            score += 1;
        }
    }
    score
}

pub fn score_unit(query_norm: &str, unit: &KbUnit) -> u32 {
    match unit {
        KbUnit::Entry(e) => score_entry(query_norm, e),
        KbUnit::Chunk(c) => score_chunk(query_norm, c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, keywords: &[&str]) -> KbEntry {
        KbEntry {
            title: title.to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            answer: "odpověď".to_string(),
            url: "https://x/".to_string(),
        }
    }

    fn chunk(text: &str) -> KbChunk {
        KbChunk {
            text: text.to_string(),
            url: "https://x/".to_string(),
            source: None,
        }
    }

    #[test]
    fn test_keyword_boundary_match() {
        let e = entry("Územní plán", &["územní plán"]);
        assert_eq!(score_entry(&normalize("kde najdu územní plán"), &e), 3 + 2);
    }

    #[test]
    fn test_keyword_requires_word_boundary() {
        let e = entry("Územní plán", &["plán"]);
        // "plan" inside "planeta" must not count as a keyword hit
        assert_eq!(score_entry(&normalize("planeta"), &e), 0);
    }

    #[test]
    fn test_short_keyword_skipped() {
        let e = entry("X", &["a"]);
        assert_eq!(score_entry(&normalize("a b c"), &e), 0);
    }

    #[test]
    fn test_title_in_query_scores_two() {
        let e = entry("Úřední hodiny", &[]);
        assert_eq!(score_entry(&normalize("jaké máte úřední hodiny"), &e), 2);
    }

    #[test]
    fn test_query_in_title_does_not_score() {
        // The other direction is deliberately not implemented.
        let e = entry("Úřední hodiny městského úřadu", &[]);
        assert_eq!(score_entry(&normalize("hodiny úřadu"), &e), 0);
    }

    #[test]
    fn test_multiple_keywords_accumulate() {
        let e = entry("Odpady", &["svoz odpadu", "poplatky"]);
        assert_eq!(
            score_entry(&normalize("svoz odpadu a poplatky za psa"), &e),
            6
        );
    }

    #[test]
    fn test_empty_query_scores_zero() {
        let e = entry("Úřední hodiny", &["úřední hodiny"]);
        assert_eq!(score_entry("", &e), 0);
        assert_eq!(score_chunk("", &chunk("text")), 0);
    }

    #[test]
    fn test_chunk_token_containment() {
        let c = chunk("Svoz odpadu probíhá každé pondělí a středu.");
        // "svoz" and "odpadu" hit, "kdy" is 3 chars and misses.
        assert_eq!(score_chunk(&normalize("kdy je svoz odpadu"), &c), 2);
    }

    #[test]
    fn test_chunk_tokens_counted_once() {
        let c = chunk("odpad odpad odpad");
        assert_eq!(score_chunk(&normalize("odpad odpad"), &c), 1);
    }

    #[test]
    fn test_chunk_short_tokens_ignored() {
        let c = chunk("co je to");
        assert_eq!(score_chunk(&normalize("co je to"), &c), 0);
    }

    #[test]
    fn test_empty_chunk_scores_zero() {
        assert_eq!(score_chunk(&normalize("svoz odpadu"), &chunk("")), 0);
    }
}
