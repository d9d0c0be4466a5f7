use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::models::{ListeningStatus, RecognizerEvent, Signal};

use super::{Recognizer, Session};

/// Inputs a session reacts to, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Replace the manuscript with new raw text
    Load(String),
    /// An external editor changed one unit's raw text
    Edit { index: usize, raw_text: String },
    Start,
    Stop,
    Toggle,
    /// Manual jump to a unit (clamped)
    SetActive(i64),
    /// Manual move by a relative amount
    Step(i64),
    Recalibrate,
    Recognizer(RecognizerEvent),
}

impl From<RecognizerEvent> for SessionEvent {
    fn from(event: RecognizerEvent) -> Self {
        SessionEvent::Recognizer(event)
    }
}

impl<R: Recognizer> Session<R> {
    /// Apply one event and collect the signals it produces
    pub fn dispatch(&mut self, event: SessionEvent) -> Vec<Signal> {
        match event {
            SessionEvent::Load(text) => {
                self.load_manuscript(&text);
                vec![]
            }
            SessionEvent::Edit { index, raw_text } => {
                if let Err(e) = self.edit_unit(index, &raw_text) {
                    warn!(session = %self.session_id(), "Ignoring edit: {}", e);
                }
                vec![]
            }
            SessionEvent::Start => vec![self.listening_signal(|s| s.start_listening())],
            SessionEvent::Toggle => vec![self.listening_signal(|s| s.toggle_listening())],
            SessionEvent::Stop => vec![self.stop_listening().into()],
            SessionEvent::SetActive(index) => self.set_active(index).map(Signal::from).into_iter().collect(),
            SessionEvent::Step(delta) => self.step(delta).map(Signal::from).into_iter().collect(),
            SessionEvent::Recalibrate => {
                self.recalibrate();
                vec![]
            }
            SessionEvent::Recognizer(event) => self.handle_recognizer_event(event).into_iter().collect(),
        }
    }

    fn listening_signal(
        &mut self,
        transition: impl FnOnce(&mut Self) -> Result<ListeningStatus, SessionError>,
    ) -> Signal {
        match transition(self) {
            Ok(status) => status.into(),
            Err(e) => ListeningStatus::with_status(self.is_listening(), e.to_string()).into(),
        }
    }
}

/// Drive a session from an event channel until it closes.
///
/// Every produced signal is forwarded to `signals`; the session is handed
/// back once the input side is dropped (or the output side goes away).
pub async fn run<R: Recognizer>(
    mut session: Session<R>,
    mut events: mpsc::Receiver<SessionEvent>,
    signals: mpsc::Sender<Signal>,
) -> Session<R> {
    while let Some(event) = events.recv().await {
        for signal in session.dispatch(event) {
            if signals.send(signal).await.is_err() {
                debug!(session = %session.session_id(), "Signal receiver dropped, stopping driver");
                return session;
            }
        }
    }
    debug!(session = %session.session_id(), "Event stream closed");
    session
}
