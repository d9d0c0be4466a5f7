pub mod error;
pub mod io;
pub mod live;
pub mod models;
pub mod stages;

pub use error::{ConfigError, RecognizerError, SessionError};
pub use io::{parse_replay_script, read_manuscript_file, SignalRecord};
pub use live::{run, AlignmentConfig, ListenState, Recognizer, ReplayRecognizer, Session, SessionEvent};
pub use models::{
    ActiveUnitChanged, Granularity, ListeningStatus, Manuscript, RecognizerEvent, ResultEntry,
    Section, Signal, Trigger, Unit,
};
pub use stages::{
    bigram_score, normalize_text, rank_candidates, segment, Candidate, IndexConfig, ScoreWeights,
    ScoredCandidate, SegmentConfig, SimilarityIndex,
};
