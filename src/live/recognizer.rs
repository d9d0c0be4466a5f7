use crate::error::RecognizerError;

/// Transport for an external speech recognizer.
///
/// The session only starts and stops it; results arrive separately as
/// [`RecognizerEvent`](crate::models::RecognizerEvent)s.
pub trait Recognizer {
    /// Whether speech recognition is available at all
    fn is_supported(&self) -> bool {
        true
    }

    /// Begin (or resume) streaming results
    fn start(&mut self) -> Result<(), RecognizerError>;

    /// Release the stream
    fn stop(&mut self);
}

/// Recognizer for replayed or synthetic event streams.
///
/// Keeps count of transport starts and stops so restart policy can be observed.
#[derive(Debug, Clone, Default)]
pub struct ReplayRecognizer {
    unsupported: bool,
    failing_starts: usize,
    starts: usize,
    stops: usize,
}

impl ReplayRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recognizer reporting that speech recognition is unavailable
    pub fn unsupported() -> Self {
        Self {
            unsupported: true,
            ..Self::default()
        }
    }

    /// Make the next `count` start attempts fail with a transient error
    pub fn fail_next_starts(&mut self, count: usize) {
        self.failing_starts = count;
    }

    pub fn starts(&self) -> usize {
        self.starts
    }

    pub fn stops(&self) -> usize {
        self.stops
    }
}

impl Recognizer for ReplayRecognizer {
    fn is_supported(&self) -> bool {
        !self.unsupported
    }

    fn start(&mut self) -> Result<(), RecognizerError> {
        if self.unsupported {
            return Err(RecognizerError::UnsupportedEnvironment);
        }
        if self.failing_starts > 0 {
            self.failing_starts -= 1;
            return Err(RecognizerError::Transient("recognizer busy".to_string()));
        }
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}
