use thiserror::Error;

/// Failures reported by a speech recognizer transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognizerError {
    /// No speech recognition capability on this platform
    #[error("speech recognition is not supported in this environment")]
    UnsupportedEnvironment,
    /// A recoverable mid-stream failure (permission hiccup, network blip)
    #[error("recognizer error: {0}")]
    Transient(String),
}

/// Errors surfaced by a live alignment session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("unit {index} is out of range (manuscript has {count} units)")]
    UnitOutOfRange { index: usize, count: usize },
    #[error(transparent)]
    Recognizer(#[from] RecognizerError),
}

/// Invalid alignment configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("score weights must sum to 1 (fuzzy {fuzzy} + bigram {bigram})")]
    WeightsNotNormalized { fuzzy: f64, bigram: f64 },
    #[error("{name} must be within [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f64 },
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
    #[error("min_buffer_len ({min}) must be below buffer_capacity ({capacity})")]
    BufferTooSmall { min: usize, capacity: usize },
}
