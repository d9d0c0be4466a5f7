use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Granularity, Manuscript, Section, Unit};

use super::normalize_text;

/// Characters that end a sentence
const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', '。', '…', '！', '？', '．', '｡'];

/// Characters allowed between a terminator and the following whitespace
const SENTENCE_CLOSERS: &[char] = &['"', '\'', ')', ']', '”', '’', '」', '』', '）'];

/// Configuration for segmentation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Unit granularity
    pub granularity: Granularity,
    /// Width (in characters) of fallback chunks for bodies without sentence punctuation
    pub chunk_size: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Sentence,
            chunk_size: 80,
        }
    }
}

/// A flushed heading/body group before it is cut into units
#[derive(Debug, Default)]
struct PendingGroup {
    title: String,
    body: Vec<String>,
}

impl PendingGroup {
    fn take(&mut self) -> Option<(String, String)> {
        let group = std::mem::take(self);
        let body = group.body.join("\n").trim().to_string();
        if body.is_empty() && group.title.is_empty() {
            return None;
        }
        Some((group.title, body))
    }
}

/// Split raw manuscript text into sections and units
///
/// Headings (`#` lines) open a new section, blank lines close the current
/// one. Section bodies are cut into sentences, or into fixed-width chunks
/// when they carry no sentence punctuation. Unit indices run across the
/// whole document.
pub fn segment(raw_text: &str, config: &SegmentConfig) -> Manuscript {
    let text = raw_text.replace("\r\n", "\n").replace('\r', "\n");

    let mut groups = Vec::new();
    let mut pending = PendingGroup::default();

    for line in text.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            groups.extend(pending.take());
            continue;
        }
        if trimmed.starts_with('#') {
            groups.extend(pending.take());
            pending.title = trimmed.trim_start_matches('#').trim().to_string();
            continue;
        }
        pending.body.push(line.to_string());
    }
    groups.extend(pending.take());

    let mut manuscript = Manuscript {
        granularity: config.granularity,
        ..Default::default()
    };

    for (title, body) in groups {
        let section_index = manuscript.sections.len();
        let first_unit = manuscript.units.len();

        match config.granularity {
            Granularity::Sentence => {
                for sentence in split_sentences(&body, config.chunk_size) {
                    let normalized = normalize_text(&sentence);
                    let index = manuscript.units.len();
                    manuscript
                        .units
                        .push(Unit::new(index, sentence, normalized, Some(section_index)));
                }
            }
            Granularity::Section => {
                let normalized = if title.is_empty() {
                    normalize_text(&body)
                } else {
                    normalize_text(&format!("{} {}", title, body))
                };
                let index = manuscript.units.len();
                manuscript
                    .units
                    .push(Unit::new(index, body.clone(), normalized, Some(section_index)));
            }
        }

        manuscript.sections.push(Section {
            title,
            body,
            units: first_unit..manuscript.units.len(),
        });
    }

    debug!(
        "Segmented {} sections into {} units ({:?})",
        manuscript.sections.len(),
        manuscript.units.len(),
        config.granularity
    );

    manuscript
}

/// Split a section body into sentences, keeping terminators attached.
///
/// A boundary is a run of terminators (plus optional closing quotes or
/// brackets) followed by whitespace. Bodies with no boundary at all are
/// chunked to `chunk_size` characters.
pub fn split_sentences(body: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<(usize, char)> = body.char_indices().collect();
    let mut sentences = Vec::new();
    let mut found_boundary = false;
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        if !SENTENCE_TERMINATORS.contains(&chars[i].1) {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len()
            && (SENTENCE_TERMINATORS.contains(&chars[j].1) || SENTENCE_CLOSERS.contains(&chars[j].1))
        {
            j += 1;
        }

        if j < chars.len() && chars[j].1.is_whitespace() {
            found_boundary = true;
            push_trimmed(&mut sentences, &body[start..chars[j].0]);
            while j < chars.len() && chars[j].1.is_whitespace() {
                j += 1;
            }
            start = chars.get(j).map(|(pos, _)| *pos).unwrap_or(body.len());
        }
        i = j;
    }

    if !found_boundary {
        return chunk_fixed_width(body, chunk_size);
    }

    push_trimmed(&mut sentences, &body[start..]);
    sentences
}

/// Cut text into pieces of at most `chunk_size` characters
pub fn chunk_fixed_width(body: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<char> = body.chars().collect();
    let mut chunks = Vec::new();
    for piece in chars.chunks(chunk_size.max(1)) {
        let piece: String = piece.iter().collect();
        push_trimmed(&mut chunks, &piece);
    }
    chunks
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece.to_string());
    }
}
