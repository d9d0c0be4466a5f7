use std::path::Path;

use anyhow::{Context, Result};

use crate::live::{AlignmentConfig, SessionEvent};
use crate::models::RecognizerEvent;

/// Read a manuscript file as UTF-8 text
pub fn read_manuscript_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read manuscript: {:?}", path))
}

/// Load an alignment config from a JSON file; missing fields take defaults
pub fn load_config_file(path: &Path) -> Result<AlignmentConfig> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read config: {:?}", path))?;
    let config: AlignmentConfig =
        serde_json::from_str(&content).context("Failed to parse alignment config JSON")?;
    config.validate().context("Invalid alignment config")?;
    Ok(config)
}

/// Read a replay script from disk
pub fn read_replay_file(path: &Path) -> Result<Vec<SessionEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript: {:?}", path))?;
    parse_replay_script(&content)
}

/// Parse a replay script into session events.
///
/// One event per line:
/// - `{...}` a JSON recognizer event
/// - `#end`, `#error <message>` stream end / recognizer error
/// - `#goto <n>`, `#next`, `#prev`, `#calibrate` manual navigation
/// - `#start`, `#stop` listening control
/// - anything else is a final transcript fragment
///
/// Blank lines are skipped.
pub fn parse_replay_script(content: &str) -> Result<Vec<SessionEvent>> {
    let mut events = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = if line.starts_with('{') {
            let event: RecognizerEvent = serde_json::from_str(line)
                .with_context(|| format!("Invalid recognizer event on line {}", line_no + 1))?;
            SessionEvent::Recognizer(event)
        } else if let Some(directive) = line.strip_prefix('#') {
            parse_directive(directive)
                .with_context(|| format!("Invalid directive on line {}: {}", line_no + 1, line))?
        } else {
            SessionEvent::Recognizer(RecognizerEvent::final_text(line))
        };
        events.push(event);
    }

    Ok(events)
}

fn parse_directive(directive: &str) -> Result<SessionEvent> {
    let (name, arg) = match directive.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (directive, ""),
    };

    let event = match name {
        "end" => SessionEvent::Recognizer(RecognizerEvent::Ended),
        "error" => SessionEvent::Recognizer(RecognizerEvent::Error {
            message: arg.to_string(),
        }),
        "goto" => SessionEvent::SetActive(arg.parse().context("#goto expects a unit index")?),
        "next" => SessionEvent::Step(1),
        "prev" => SessionEvent::Step(-1),
        "calibrate" => SessionEvent::Recalibrate,
        "start" => SessionEvent::Start,
        "stop" => SessionEvent::Stop,
        other => anyhow::bail!("unknown directive #{}", other),
    };
    Ok(event)
}
