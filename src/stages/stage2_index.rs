use serde::{Deserialize, Serialize};
use strsim::osa_distance;
use tracing::debug;

use crate::models::{Granularity, Unit};

/// Configuration for the fuzzy index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Maximum approximate score (0 = exact, 1 = unrelated) a candidate may have
    pub threshold: f64,
    /// Queries shorter than this (in characters) are unreliable; units shorter
    /// than this only match against the very end of the query
    pub min_match_len: usize,
    /// Character slack between the end of a match and the end of the query
    /// that costs a full point of score
    pub distance: usize,
}

impl IndexConfig {
    /// Looser for short sentences, stricter for whole sections
    pub fn for_granularity(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Sentence => Self::default(),
            Granularity::Section => Self {
                threshold: 0.35,
                ..Self::default()
            },
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            threshold: 0.45,
            min_match_len: 12,
            distance: 200,
        }
    }
}

/// A unit match returned by the index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub unit_index: usize,
    /// 0 = exact, capped at 1
    pub approx_score: f64,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    unit_index: usize,
    chars: Vec<char>,
}

/// Fuzzy search structure over normalized units.
///
/// Read-only once built; any change to the manuscript means building a new one.
#[derive(Debug, Clone, Default)]
pub struct SimilarityIndex {
    entries: Vec<IndexEntry>,
    config: IndexConfig,
}

impl SimilarityIndex {
    /// Build an index over the units' normalized text
    pub fn build(units: &[Unit], config: &IndexConfig) -> Self {
        let entries: Vec<IndexEntry> = units
            .iter()
            .filter(|u| !u.normalized_text.is_empty())
            .map(|u| IndexEntry {
                unit_index: u.index,
                chars: u.normalized_text.chars().collect(),
            })
            .collect();

        debug!("Built similarity index over {} units", entries.len());

        Self {
            entries,
            config: config.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Top-`k` units for an already-normalized query, closest first.
    ///
    /// Ties keep document order. Empty query or empty index yield no results.
    pub fn query(&self, normalized_query: &str, k: usize) -> Vec<Candidate> {
        self.query_near(normalized_query, k, None)
    }

    /// Like [`query`](Self::query), but equal scores prefer units closest to
    /// `active` before the cut to `k`
    pub fn query_near(&self, normalized_query: &str, k: usize, active: Option<usize>) -> Vec<Candidate> {
        if normalized_query.is_empty() || self.entries.is_empty() || k == 0 {
            return vec![];
        }

        let query: Vec<char> = normalized_query.chars().collect();
        let mut candidates: Vec<Candidate> = self
            .entries
            .iter()
            .map(|entry| Candidate {
                unit_index: entry.unit_index,
                approx_score: approx_score(&query, &entry.chars, &self.config),
            })
            .filter(|c| c.approx_score <= self.config.threshold)
            .collect();

        let distance_from_active = |index: usize| active.map(|a| a.abs_diff(index)).unwrap_or(0);

        candidates.sort_by(|a, b| {
            a.approx_score
                .total_cmp(&b.approx_score)
                .then(distance_from_active(a.unit_index).cmp(&distance_from_active(b.unit_index)))
                .then(a.unit_index.cmp(&b.unit_index))
        });
        candidates.truncate(k);
        candidates
    }
}

/// Approximate distance between a live query and one unit, in `[0, 1]`.
///
/// When the unit fits inside the query, the unit is searched for within the
/// query and matches ending early in the query are penalised (recent speech
/// sits at the end). Units shorter than `min_match_len` are compared only
/// with the query's tail. Otherwise the query is searched for anywhere
/// inside the unit.
pub fn approx_score(query: &[char], unit: &[char], config: &IndexConfig) -> f64 {
    if unit.is_empty() || query.is_empty() {
        return 1.0;
    }
    if unit.len() < config.min_match_len && unit.len() <= query.len() {
        return tail_score(query, unit);
    }

    let unit_as_pattern = unit.len() <= query.len();
    let (pattern, text) = if unit_as_pattern {
        (unit, query)
    } else {
        (query, unit)
    };

    let last_row = substring_edit_row(pattern, text);
    let m = pattern.len() as f64;
    let n = text.len();

    last_row
        .iter()
        .enumerate()
        .map(|(end, &errors)| {
            let slack = if unit_as_pattern {
                proximity_penalty(n - end, config.distance)
            } else {
                0.0
            };
            errors as f64 / m + slack
        })
        .fold(1.0_f64, f64::min)
        .min(1.0)
}

/// Whole-string distance of a short unit against the last few characters of
/// the query, trying tails within a quarter of the unit's length either way
fn tail_score(query: &[char], unit: &[char]) -> f64 {
    let m = unit.len();
    let shortest = (m - m / 4).max(1);
    let longest = (m + m / 4).min(query.len());
    let unit: String = unit.iter().collect();

    let errors = (shortest..=longest)
        .map(|len| {
            let tail: String = query[query.len() - len..].iter().collect();
            osa_distance(&unit, &tail)
        })
        .min()
        .unwrap_or(m);

    (errors as f64 / m as f64).min(1.0)
}

fn proximity_penalty(slack: usize, distance: usize) -> f64 {
    if slack == 0 {
        0.0
    } else if distance == 0 {
        1.0
    } else {
        slack as f64 / distance as f64
    }
}

/// Edit distance of `pattern` against every prefix-end of `text`, with a
/// free starting point in `text` (optimal string alignment: substitution,
/// insertion, deletion and adjacent transposition each cost 1).
///
/// Entry `j` of the result is the cheapest way to match the whole pattern
/// against some substring of `text` ending at position `j`.
fn substring_edit_row(pattern: &[char], text: &[char]) -> Vec<usize> {
    let n = text.len();
    let mut before_prev = vec![0usize; n + 1];
    let mut prev = vec![0usize; n + 1];
    let mut cur = vec![0usize; n + 1];

    for i in 1..=pattern.len() {
        cur[0] = i;
        for j in 1..=n {
            let cost = usize::from(pattern[i - 1] != text[j - 1]);
            let mut best = (prev[j - 1] + cost).min(prev[j] + 1).min(cur[j - 1] + 1);
            if i > 1 && j > 1 && pattern[i - 1] == text[j - 2] && pattern[i - 2] == text[j - 1] {
                best = best.min(before_prev[j - 2] + 1);
            }
            cur[j] = best;
        }
        std::mem::swap(&mut before_prev, &mut prev);
        std::mem::swap(&mut prev, &mut cur);
    }

    prev
}
