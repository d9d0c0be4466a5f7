pub mod buffer;
pub mod controller;
pub mod driver;
pub mod recognizer;

pub use buffer::*;
pub use controller::*;
pub use driver::*;
pub use recognizer::*;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Granularity;
use crate::stages::{IndexConfig, ScoreWeights, SegmentConfig};

/// Configuration for a live alignment session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// How the manuscript is cut into units
    pub segment: SegmentConfig,
    /// Fuzzy index tolerances
    pub index: IndexConfig,
    /// Blend of index distance and bigram overlap
    pub weights: ScoreWeights,
    /// Minimum blended confidence for an automatic move
    pub acceptance_threshold: f64,
    /// Trailing buffer capacity in characters
    pub buffer_capacity: usize,
    /// Buffer must be longer than this (in characters) before matching
    pub min_buffer_len: usize,
    /// Most recent normalized characters used as the query
    pub query_window: usize,
    /// Candidates requested from the index
    pub top_k: usize,
    /// Signed shift applied to every automatic match
    pub calibration_offset: i64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            segment: SegmentConfig::default(),
            index: IndexConfig::default(),
            weights: ScoreWeights::default(),
            acceptance_threshold: 0.30,
            buffer_capacity: 250,
            min_buffer_len: 50,
            query_window: 64,
            top_k: 5,
            calibration_offset: 0,
        }
    }
}

impl AlignmentConfig {
    /// Defaults tuned for the given unit granularity
    pub fn for_granularity(granularity: Granularity) -> Self {
        Self {
            segment: SegmentConfig {
                granularity,
                ..Default::default()
            },
            index: IndexConfig::for_granularity(granularity),
            ..Default::default()
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.segment.granularity
    }

    /// Reject configurations the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_range = [
            ("acceptance_threshold", self.acceptance_threshold),
            ("index.threshold", self.index.threshold),
            ("weights.fuzzy", self.weights.fuzzy),
            ("weights.bigram", self.weights.bigram),
        ];
        for (name, value) in unit_range {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { name, value });
            }
        }

        if (self.weights.fuzzy + self.weights.bigram - 1.0).abs() > 1e-6 {
            return Err(ConfigError::WeightsNotNormalized {
                fuzzy: self.weights.fuzzy,
                bigram: self.weights.bigram,
            });
        }

        let non_zero = [
            ("buffer_capacity", self.buffer_capacity),
            ("query_window", self.query_window),
            ("top_k", self.top_k),
            ("segment.chunk_size", self.segment.chunk_size),
        ];
        for (name, value) in non_zero {
            if value == 0 {
                return Err(ConfigError::Zero { name });
            }
        }

        if self.min_buffer_len >= self.buffer_capacity {
            return Err(ConfigError::BufferTooSmall {
                min: self.min_buffer_len,
                capacity: self.buffer_capacity,
            });
        }

        Ok(())
    }
}
