use serde::{Deserialize, Serialize};

/// What caused the active unit to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Matched from live transcript
    Auto,
    /// Set directly by the user
    Manual,
}

/// Emitted whenever the active unit moves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveUnitChanged {
    pub unit_index: usize,
    pub trigger: Trigger,
    /// Blended confidence of the match (automatic changes only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ActiveUnitChanged {
    pub fn auto(unit_index: usize, confidence: f64) -> Self {
        Self {
            unit_index,
            trigger: Trigger::Auto,
            confidence: Some(confidence),
        }
    }

    pub fn manual(unit_index: usize) -> Self {
        Self {
            unit_index,
            trigger: Trigger::Manual,
            confidence: None,
        }
    }
}

/// Listening indicator for a status display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListeningStatus {
    pub listening: bool,
    pub status: String,
}

impl ListeningStatus {
    pub fn idle() -> Self {
        Self {
            listening: false,
            status: "Idle".to_string(),
        }
    }

    pub fn listening() -> Self {
        Self {
            listening: true,
            status: "Listening".to_string(),
        }
    }

    pub fn with_status(listening: bool, status: impl Into<String>) -> Self {
        Self {
            listening,
            status: status.into(),
        }
    }
}

/// Everything the core exposes to a renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum Signal {
    ActiveUnit(ActiveUnitChanged),
    Listening(ListeningStatus),
}

impl From<ActiveUnitChanged> for Signal {
    fn from(change: ActiveUnitChanged) -> Self {
        Signal::ActiveUnit(change)
    }
}

impl From<ListeningStatus> for Signal {
    fn from(status: ListeningStatus) -> Self {
        Signal::Listening(status)
    }
}
