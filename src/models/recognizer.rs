use serde::{Deserialize, Serialize};

/// One hypothesis reported by the speech recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// Recognized text for this result slot
    pub transcript_text: String,
    /// Whether the recognizer will no longer revise this slot
    #[serde(default)]
    pub is_final: bool,
}

impl ResultEntry {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            transcript_text: text.into(),
            is_final: false,
        }
    }

    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            transcript_text: text.into(),
            is_final: true,
        }
    }
}

/// Events delivered by an external speech recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecognizerEvent {
    /// A batch of result entries
    Result { entries: Vec<ResultEntry> },
    /// A transient error reported mid-stream
    Error { message: String },
    /// The underlying stream ended (silence timeout, internal reset)
    Ended,
}

impl RecognizerEvent {
    /// Convenience for a single final entry
    pub fn final_text(text: impl Into<String>) -> Self {
        RecognizerEvent::Result {
            entries: vec![ResultEntry::final_text(text)],
        }
    }

    /// Convenience for a single interim entry
    pub fn interim(text: impl Into<String>) -> Self {
        RecognizerEvent::Result {
            entries: vec![ResultEntry::interim(text)],
        }
    }
}

/// Collapse the entries of one event into a single fragment.
///
/// Final text wins over interim text when both are present; returns `None`
/// when nothing but whitespace was recognized.
pub fn assemble_fragment(entries: &[ResultEntry]) -> Option<String> {
    let mut finals = String::new();
    let mut interims = String::new();

    for entry in entries {
        if entry.is_final {
            finals.push_str(&entry.transcript_text);
        } else {
            interims.push_str(&entry.transcript_text);
        }
    }

    let chosen = if finals.trim().is_empty() { interims } else { finals };
    let chunk = chosen.trim();
    if chunk.is_empty() {
        None
    } else {
        Some(chunk.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_preferred_over_interim() {
        let entries = vec![
            ResultEntry::final_text("in the beginning"),
            ResultEntry::interim(" was the"),
        ];
        assert_eq!(assemble_fragment(&entries).as_deref(), Some("in the beginning"));
    }

    #[test]
    fn test_interim_only() {
        let entries = vec![ResultEntry::interim("grace and"), ResultEntry::interim(" peace ")];
        assert_eq!(assemble_fragment(&entries).as_deref(), Some("grace and peace"));
    }

    #[test]
    fn test_blank_entries() {
        assert_eq!(assemble_fragment(&[]), None);
        assert_eq!(assemble_fragment(&[ResultEntry::interim("   ")]), None);
    }

    #[test]
    fn test_event_json_shape() {
        let json = r#"{"type": "result", "entries": [{"transcript_text": "hello", "is_final": true}]}"#;
        let event: RecognizerEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, RecognizerEvent::final_text("hello"));

        let ended: RecognizerEvent = serde_json::from_str(r#"{"type": "ended"}"#).unwrap();
        assert_eq!(ended, RecognizerEvent::Ended);
    }
}
