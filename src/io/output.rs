use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{ContextView, Manuscript, Signal};

/// One emitted signal as written to a JSON-lines log
#[derive(Debug, Clone, Serialize)]
pub struct SignalRecord {
    pub at: DateTime<Utc>,
    pub session_id: Uuid,
    #[serde(flatten)]
    pub signal: Signal,
    /// Teleprompter view of the newly active unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<ContextView>,
}

impl SignalRecord {
    pub fn new(session_id: Uuid, signal: Signal, manuscript: &Manuscript) -> Self {
        let view = match &signal {
            Signal::ActiveUnit(change) => manuscript.context(change.unit_index),
            Signal::Listening(_) => None,
        };
        Self {
            at: Utc::now(),
            session_id,
            signal,
            view,
        }
    }
}

/// Write records as JSON lines
pub fn write_signal_log<W: Write>(writer: &mut W, records: &[SignalRecord]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut *writer, record).context("Failed to serialize signal")?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Write records as JSON lines to a file
pub fn write_signal_log_file(path: &Path, records: &[SignalRecord]) -> Result<()> {
    let file =
        std::fs::File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    let mut writer = std::io::BufWriter::new(file);
    write_signal_log(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

/// Human-readable listing of a segmented manuscript
pub fn render_manuscript(manuscript: &Manuscript) -> String {
    let mut output = String::new();

    for (i, section) in manuscript.sections.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        if section.title.is_empty() {
            output.push_str(&format!("[section {}]\n", i + 1));
        } else {
            output.push_str(&format!("[section {}] {}\n", i + 1, section.title));
        }
        for unit in &manuscript.units[section.units.clone()] {
            output.push_str(&format!("{:>4}  {}\n", unit.index, unit.raw_text.replace('\n', " / ")));
        }
    }

    output
}

/// Serialize a manuscript to pretty JSON
pub fn manuscript_to_json(manuscript: &Manuscript) -> Result<String> {
    serde_json::to_string_pretty(manuscript).context("Failed to serialize manuscript")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActiveUnitChanged, ListeningStatus};
    use crate::stages::{segment, SegmentConfig};

    #[test]
    fn test_signal_log_lines() {
        let manuscript = segment("First. Second. Third.", &SegmentConfig::default());
        let id = Uuid::new_v4();
        let records = vec![
            SignalRecord::new(id, ListeningStatus::listening().into(), &manuscript),
            SignalRecord::new(id, ActiveUnitChanged::auto(1, 0.8).into(), &manuscript),
        ];

        let mut buf = Vec::new();
        write_signal_log(&mut buf, &records).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["signal"], "listening");
        assert_eq!(first["listening"], true);
        assert!(first.get("view").is_none());

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["signal"], "active_unit");
        assert_eq!(second["unit_index"], 1);
        assert_eq!(second["trigger"], "auto");
        assert_eq!(second["view"]["current"], "Second.");
        assert_eq!(second["view"]["previous"], "First.");
    }

    #[test]
    fn test_write_signal_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signals.jsonl");
        let manuscript = Manuscript::default();
        let records = vec![SignalRecord::new(
            Uuid::new_v4(),
            ListeningStatus::idle().into(),
            &manuscript,
        )];

        write_signal_log_file(&path, &records).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_render_manuscript() {
        let manuscript = segment("# Welcome\nGood morning. Let us pray.\n\nAmen", &SegmentConfig::default());
        let rendered = render_manuscript(&manuscript);

        assert!(rendered.contains("[section 1] Welcome"));
        assert!(rendered.contains("   0  Good morning."));
        assert!(rendered.contains("   1  Let us pray."));
        assert!(rendered.contains("[section 2]\n   2  Amen"));
    }

    #[test]
    fn test_manuscript_json() {
        let manuscript = segment("Hello world.", &SegmentConfig::default());
        let json = manuscript_to_json(&manuscript).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["units"][0]["normalized_text"], "hello world");
        assert_eq!(value["granularity"], "sentence");
    }
}
