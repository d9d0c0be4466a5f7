use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::stages::normalize_text;

/// How finely the manuscript is cut into matchable units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One unit per sentence (or fixed-width chunk)
    #[default]
    Sentence,
    /// One unit per section (title + body)
    Section,
}

/// Smallest addressable span of the manuscript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Position in document order, zero-based and contiguous
    pub index: usize,
    /// Text as authored, used for display
    pub raw_text: String,
    /// Canonical form used only for matching
    pub normalized_text: String,
    /// Index of the enclosing section in `Manuscript::sections`
    pub section: Option<usize>,
}

impl Unit {
    pub fn new(index: usize, raw_text: String, normalized_text: String, section: Option<usize>) -> Self {
        Self {
            index,
            raw_text,
            normalized_text,
            section,
        }
    }
}

/// A titled group of units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Heading text with the marker stripped; may be empty
    pub title: String,
    /// Body text as authored, internal line breaks preserved
    pub body: String,
    /// Units belonging to this section (range into `Manuscript::units`)
    pub units: Range<usize>,
}

impl Section {
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

/// Previous/current/next text around the active unit, for a teleprompter view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextView {
    pub label: String,
    pub previous: Option<String>,
    pub current: String,
    pub next: Option<String>,
}

/// The full ordered collection of sections and units for one loaded document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manuscript {
    pub granularity: Granularity,
    pub sections: Vec<Section>,
    pub units: Vec<Unit>,
}

impl Manuscript {
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn get_unit(&self, index: usize) -> Option<&Unit> {
        self.units.get(index)
    }

    /// Section enclosing a unit, if any
    pub fn section_of(&self, index: usize) -> Option<&Section> {
        self.units
            .get(index)
            .and_then(|u| u.section)
            .and_then(|s| self.sections.get(s))
    }

    /// Clamp an arbitrary signed position into `[0, unit_count)`.
    ///
    /// Returns `None` when the manuscript has no units.
    pub fn clamp_index(&self, index: i64) -> Option<usize> {
        if self.units.is_empty() {
            return None;
        }
        let last = self.units.len() as i64 - 1;
        Some(index.clamp(0, last) as usize)
    }

    /// Replace a unit's raw text and re-derive its normalized form.
    ///
    /// In section granularity the section title is folded back into the
    /// normalized text, matching how the segmenter built it. The owning
    /// section's body is updated in place.
    pub(crate) fn replace_raw_text(&mut self, index: usize, raw_text: String) -> bool {
        let title = match self.granularity {
            Granularity::Section => self.section_of(index).map(|s| s.title.clone()),
            Granularity::Sentence => None,
        };
        let Some(unit) = self.units.get_mut(index) else {
            return false;
        };
        unit.normalized_text = match title {
            Some(title) if !title.is_empty() => normalize_text(&format!("{} {}", title, raw_text)),
            _ => normalize_text(&raw_text),
        };
        let previous = std::mem::replace(&mut unit.raw_text, raw_text);
        if let Some(section) = unit.section {
            self.splice_section_body(section, index, &previous);
        }
        true
    }

    fn splice_section_body(&mut self, section: usize, index: usize, previous: &str) {
        let Some(section) = self.sections.get_mut(section) else {
            return;
        };
        let units = &self.units[section.units.clone()];
        let Some(position) = index.checked_sub(section.units.start) else {
            return;
        };

        let mut cursor = 0;
        for unit in &units[..position.min(units.len())] {
            if let Some(found) = section.body[cursor..].find(unit.raw_text.as_str()) {
                cursor += found + unit.raw_text.len();
            }
        }

        match section.body[cursor..].find(previous) {
            Some(found) => {
                let start = cursor + found;
                section.body.replace_range(start..start + previous.len(), &self.units[index].raw_text);
            }
            None => {
                section.body = units
                    .iter()
                    .map(|u| u.raw_text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
            }
        }
    }

    /// Display label for a unit: its section title, or a 1-based ordinal
    pub fn label(&self, index: usize) -> String {
        match self.section_of(index) {
            Some(section) if !section.title.is_empty() => format!("Section: {}", section.title),
            _ => format!("Unit {}", index + 1),
        }
    }

    /// Neighbourhood of a unit for teleprompter-style display
    pub fn context(&self, index: usize) -> Option<ContextView> {
        let current = self.units.get(index)?;
        Some(ContextView {
            label: self.label(index),
            previous: index
                .checked_sub(1)
                .and_then(|i| self.units.get(i))
                .map(|u| u.raw_text.clone()),
            current: current.raw_text.clone(),
            next: self.units.get(index + 1).map(|u| u.raw_text.clone()),
        })
    }
}
