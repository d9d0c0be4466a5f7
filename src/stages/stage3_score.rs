use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::Manuscript;

use super::Candidate;

/// Blend weights for the combined confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Weight of `1 - approx_score` from the fuzzy index
    pub fuzzy: f64,
    /// Weight of the bigram overlap score
    pub bigram: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            fuzzy: 0.6,
            bigram: 0.4,
        }
    }
}

/// A candidate after precision re-ranking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    pub unit_index: usize,
    pub approx_score: f64,
    pub bigram_score: f64,
    pub confidence: f64,
}

/// Set of 2-character shingles
pub fn bigrams(text: &str) -> HashSet<(char, char)> {
    let chars: Vec<char> = text.chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Dice coefficient over character bigrams, in `[0, 1]`.
///
/// Returns 0 when either side has fewer than two characters.
pub fn bigram_score(query: &str, candidate: &str) -> f64 {
    let a = bigrams(query);
    let b = bigrams(candidate);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(&b).count();
    2.0 * shared as f64 / (a.len() + b.len()) as f64
}

/// Blend the index distance with bigram overlap
pub fn confidence(approx_score: f64, bigram_score: f64, weights: &ScoreWeights) -> f64 {
    weights.fuzzy * (1.0 - approx_score.clamp(0.0, 1.0)) + weights.bigram * bigram_score
}

/// Re-rank index candidates by blended confidence.
///
/// A unit shorter than the query is compared with the same number of
/// characters from the end of the query. Equal confidences prefer the unit
/// closest to `active`, then document order.
pub fn rank_candidates(
    query: &str,
    candidates: &[Candidate],
    manuscript: &Manuscript,
    active: Option<usize>,
    weights: &ScoreWeights,
) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .filter_map(|c| {
            let unit = manuscript.get_unit(c.unit_index)?;
            let bigram = bigram_score(
                recent_span(query, unit.normalized_text.chars().count()),
                &unit.normalized_text,
            );
            Some(ScoredCandidate {
                unit_index: c.unit_index,
                approx_score: c.approx_score,
                bigram_score: bigram,
                confidence: confidence(c.approx_score, bigram, weights),
            })
        })
        .collect();

    let distance_from_active = |index: usize| active.map(|a| a.abs_diff(index)).unwrap_or(0);

    scored.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then(distance_from_active(a.unit_index).cmp(&distance_from_active(b.unit_index)))
            .then(a.unit_index.cmp(&b.unit_index))
    });
    scored
}

/// The last `count` characters of `text`
fn recent_span(text: &str, count: usize) -> &str {
    if count == 0 {
        return "";
    }
    match text.char_indices().rev().nth(count - 1) {
        Some((pos, _)) => &text[pos..],
        None => text,
    }
}
