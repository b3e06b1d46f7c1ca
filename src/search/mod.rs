pub mod normalize;
pub mod score;

pub use normalize::normalize;

use crate::kb::types::KbUnit;

/// A KB unit with its relevance score for one query. Transient: built
/// per request and discarded once the reply is rendered.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub unit: KbUnit,
    pub score: u32,
}

/// Rank `units` against `query`. Candidates scoring below `min_score`
/// (and always those scoring 0) are dropped; the rest are sorted by
/// score descending with ties keeping KB order, then truncated to
/// `limit`.
pub fn retrieve(
    units: &[KbUnit],
    query: &str,
    limit: usize,
    min_score: u32,
) -> Vec<ScoredCandidate> {
    let query_norm = normalize(query);

    let mut scored: Vec<ScoredCandidate> = units
        .iter()
        .map(|unit| ScoredCandidate {
            unit: unit.clone(),
            score: score::score_unit(&query_norm, unit),
        })
        .filter(|c| c.score >= min_score && c.score > 0)
        .collect();

    // sort_by is stable, so equal scores keep their KB ordering
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::types::KbEntry;

    fn entry(title: &str, keywords: &[&str], url: &str) -> KbUnit {
        KbUnit::Entry(KbEntry {
            title: title.to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            answer: "odpověď".to_string(),
            url: url.to_string(),
        })
    }

    fn sample_units() -> Vec<KbUnit> {
        vec![
            entry("Úřední hodiny", &["úřední hodiny", "otevírací doba"], "https://x/urad"),
            entry("Územní plán", &["územní plán"], "https://x/plan"),
            entry("Poplatky", &["poplatky", "poplatek za psa"], "https://x/poplatky"),
        ]
    }

    #[test]
    fn test_zero_scores_never_surfaced() {
        let results = retrieve(&sample_units(), "něco úplně mimo", 10, 0);
        assert!(results.iter().all(|c| c.score > 0));
    }

    #[test]
    fn test_limit_respected() {
        let results = retrieve(&sample_units(), "úřední hodiny poplatky územní plán", 2, 1);
        assert!(results.len() <= 2);
    }

    #[test]
    fn test_sorted_non_increasing() {
        let results = retrieve(&sample_units(), "jaké máte úřední hodiny a poplatky", 10, 1);
        assert!(!results.is_empty());
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_ties_keep_kb_order() {
        let units = vec![
            entry("První", &["obec"], "https://x/1"),
            entry("Druhý", &["obec"], "https://x/2"),
        ];
        let results = retrieve(&units, "obec", 10, 1);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].unit.url(), "https://x/1");
        assert_eq!(results[1].unit.url(), "https://x/2");
    }

    #[test]
    fn test_min_score_filters() {
        // title hit only → score 2, below min_score 3
        let units = vec![entry("Úřední hodiny", &[], "https://x/urad")];
        let results = retrieve(&units, "jaké máte úřední hodiny", 10, 3);
        assert!(results.is_empty());
    }
}
