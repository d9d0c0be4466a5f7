use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ConfigError, RecognizerError, SessionError};
use crate::models::{
    assemble_fragment, ActiveUnitChanged, ListeningStatus, Manuscript, RecognizerEvent, Signal,
};
use crate::stages::{normalize_text, rank_candidates, segment, ScoredCandidate, SimilarityIndex};

use super::{tail_chars, AlignmentConfig, Recognizer, TrailingBuffer};

/// Listening intent of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenState {
    Idle,
    Listening,
}

/// One loaded manuscript plus the live alignment state that follows it.
///
/// All handlers are synchronous and emit at most one signal each.
pub struct Session<R> {
    session_id: Uuid,
    config: AlignmentConfig,
    manuscript: Manuscript,
    index: SimilarityIndex,
    recognizer: R,
    state: ListenState,
    transport_running: bool,
    buffer: TrailingBuffer,
    active: Option<usize>,
    status: ListeningStatus,
}

impl<R: Recognizer> Session<R> {
    /// Create an idle session with an empty manuscript
    pub fn new(config: AlignmentConfig, recognizer: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let index = SimilarityIndex::build(&[], &config.index);
        let buffer = TrailingBuffer::new(config.buffer_capacity);

        Ok(Self {
            session_id: Uuid::new_v4(),
            config,
            manuscript: Manuscript::default(),
            index,
            recognizer,
            state: ListenState::Idle,
            transport_running: false,
            buffer,
            active: None,
            status: ListeningStatus::idle(),
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    pub fn manuscript(&self) -> &Manuscript {
        &self.manuscript
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn state(&self) -> ListenState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == ListenState::Listening
    }

    pub fn listening_status(&self) -> &ListeningStatus {
        &self.status
    }

    pub fn buffer(&self) -> &TrailingBuffer {
        &self.buffer
    }

    pub fn active_unit(&self) -> Option<usize> {
        self.active
    }

    /// Active unit as a signed index, -1 when none
    pub fn active_index(&self) -> i64 {
        self.active.map(|i| i as i64).unwrap_or(-1)
    }

    /// Whether a manual override is still holding off automatic matches
    pub fn is_pinned(&self) -> bool {
        self.buffer.is_pinned()
    }

    /// Replace the manuscript wholesale and rebuild the index.
    ///
    /// The first unit becomes active; an empty manuscript leaves nothing active.
    pub fn load_manuscript(&mut self, raw_text: &str) -> &Manuscript {
        self.manuscript = segment(raw_text, &self.config.segment);
        self.rebuild_index();
        self.active = if self.manuscript.is_empty() { None } else { Some(0) };
        self.buffer.unpin();

        info!(
            session = %self.session_id,
            "Loaded manuscript: {} sections, {} units",
            self.manuscript.sections.len(),
            self.manuscript.unit_count()
        );

        &self.manuscript
    }

    /// Apply an external edit to one unit's raw text
    pub fn edit_unit(&mut self, index: usize, raw_text: &str) -> Result<(), SessionError> {
        if !self.manuscript.replace_raw_text(index, raw_text.to_string()) {
            return Err(SessionError::UnitOutOfRange {
                index,
                count: self.manuscript.unit_count(),
            });
        }
        self.rebuild_index();
        debug!(session = %self.session_id, "Unit {} edited, index rebuilt", index);
        Ok(())
    }

    fn rebuild_index(&mut self) {
        self.index = SimilarityIndex::build(&self.manuscript.units, &self.config.index);
    }

    /// Begin listening: clears the buffer and starts the transport.
    ///
    /// Fails only when recognition is unsupported, in which case the session
    /// stays idle. A transient start failure keeps the listening intent.
    pub fn start_listening(&mut self) -> Result<ListeningStatus, SessionError> {
        if self.state == ListenState::Listening {
            return Ok(self.status.clone());
        }
        if !self.recognizer.is_supported() {
            warn!(session = %self.session_id, "Speech recognition unavailable");
            return Err(RecognizerError::UnsupportedEnvironment.into());
        }

        self.buffer.clear();
        self.state = ListenState::Listening;
        self.status = ListeningStatus::listening();

        match self.recognizer.start() {
            Ok(()) => {
                self.transport_running = true;
                info!(session = %self.session_id, "Listening started");
            }
            Err(RecognizerError::UnsupportedEnvironment) => {
                self.state = ListenState::Idle;
                self.status = ListeningStatus::idle();
                return Err(RecognizerError::UnsupportedEnvironment.into());
            }
            Err(e) => {
                warn!(session = %self.session_id, "Recognizer failed to start: {}", e);
                self.status = ListeningStatus::with_status(true, e.to_string());
            }
        }

        Ok(self.status.clone())
    }

    /// Stop listening and discard the buffer
    pub fn stop_listening(&mut self) -> ListeningStatus {
        if self.state == ListenState::Idle {
            return self.status.clone();
        }
        self.state = ListenState::Idle;
        if self.transport_running {
            self.recognizer.stop();
            self.transport_running = false;
        }
        self.buffer.clear();
        self.status = ListeningStatus::idle();
        info!(session = %self.session_id, "Listening stopped");
        self.status.clone()
    }

    /// Start when idle, stop when listening
    pub fn toggle_listening(&mut self) -> Result<ListeningStatus, SessionError> {
        match self.state {
            ListenState::Idle => self.start_listening(),
            ListenState::Listening => Ok(self.stop_listening()),
        }
    }

    /// Handle one event from the recognizer
    pub fn handle_recognizer_event(&mut self, event: RecognizerEvent) -> Option<Signal> {
        match event {
            RecognizerEvent::Ended => {
                self.transport_running = false;
                self.reconcile_transport()
            }
            _ if self.state == ListenState::Idle => {
                debug!(session = %self.session_id, "Ignoring recognizer event while idle");
                None
            }
            RecognizerEvent::Result { entries } => {
                let fragment = assemble_fragment(&entries)?;
                self.push_fragment(&fragment).map(Signal::from)
            }
            RecognizerEvent::Error { message } => {
                warn!(session = %self.session_id, "Recognition error: {}", message);
                self.status = ListeningStatus::with_status(true, format!("Recognition error: {}", message));
                Some(self.status.clone().into())
            }
        }
    }

    /// Restart the transport if and only if listening is still intended
    fn reconcile_transport(&mut self) -> Option<Signal> {
        if self.state != ListenState::Listening || self.transport_running {
            return None;
        }
        match self.recognizer.start() {
            Ok(()) => {
                self.transport_running = true;
                debug!(session = %self.session_id, "Recognizer stream restarted");
                None
            }
            Err(e) => {
                warn!(session = %self.session_id, "Recognizer restart failed: {}", e);
                self.status = ListeningStatus::with_status(true, e.to_string());
                Some(self.status.clone().into())
            }
        }
    }

    /// Append a transcript fragment and try to align it
    pub fn push_fragment(&mut self, fragment: &str) -> Option<ActiveUnitChanged> {
        if self.state == ListenState::Idle {
            return None;
        }
        self.buffer.push(fragment);
        self.align()
    }

    /// Match the fresh part of the buffer against the manuscript
    fn align(&mut self) -> Option<ActiveUnitChanged> {
        if self.index.is_empty() || self.buffer.fresh_len() <= self.config.min_buffer_len {
            return None;
        }

        let normalized = normalize_text(self.buffer.fresh());
        let window = tail_chars(&normalized, self.config.query_window);
        if window.chars().count() < self.config.index.min_match_len {
            return None;
        }

        let best = self.best_match(window).or_else(|| {
            if normalized.len() > window.len() {
                self.best_match(&normalized)
            } else {
                None
            }
        });
        let Some(best) = best else {
            debug!(session = %self.session_id, "No candidate for {:?}", window);
            return None;
        };

        if best.confidence < self.config.acceptance_threshold {
            debug!(
                session = %self.session_id,
                "Unit {} below acceptance ({:.3} < {:.3})",
                best.unit_index, best.confidence, self.config.acceptance_threshold
            );
            return None;
        }

        self.buffer.unpin();
        let target = self
            .manuscript
            .clamp_index((best.unit_index as i64).saturating_add(self.config.calibration_offset))?;

        debug!(
            session = %self.session_id,
            "Matched unit {} (approx {:.3}, bigram {:.3}, confidence {:.3})",
            best.unit_index, best.approx_score, best.bigram_score, best.confidence
        );

        if self.active == Some(target) {
            return None;
        }
        self.active = Some(target);
        Some(ActiveUnitChanged::auto(target, best.confidence))
    }

    fn best_match(&self, query: &str) -> Option<ScoredCandidate> {
        self.rank(query).into_iter().next()
    }

    fn rank(&self, normalized_query: &str) -> Vec<ScoredCandidate> {
        let candidates = self.index.query_near(normalized_query, self.config.top_k, self.active);
        rank_candidates(
            normalized_query,
            &candidates,
            &self.manuscript,
            self.active,
            &self.config.weights,
        )
    }

    /// Ranked candidates for arbitrary text, without touching session state
    pub fn preview(&self, text: &str) -> Vec<ScoredCandidate> {
        let normalized = normalize_text(text);
        self.rank(&normalized)
    }

    /// Manually set the active unit.
    ///
    /// Out-of-range positions are clamped; an empty manuscript ignores the
    /// request. The buffer is kept, but text received before this call no
    /// longer drives automatic matching.
    pub fn set_active(&mut self, index: i64) -> Option<ActiveUnitChanged> {
        let target = self.manuscript.clamp_index(index)?;
        self.buffer.pin_here();
        if self.active == Some(target) {
            return None;
        }
        self.active = Some(target);
        debug!(session = %self.session_id, "Manual override to unit {}", target);
        Some(ActiveUnitChanged::manual(target))
    }

    /// Move the active unit by `delta` positions
    pub fn step(&mut self, delta: i64) -> Option<ActiveUnitChanged> {
        self.set_active(self.active_index() + delta)
    }

    /// Re-pin at the current unit without moving
    pub fn recalibrate(&mut self) {
        if self.active.is_some() {
            self.buffer.pin_here();
        }
    }
}
