/// Fixed-capacity window over the most recent transcript text.
///
/// Lengths are counted in characters. An optional pin marks how much of the
/// buffer predates the last manual override; only text after the pin counts
/// as fresh.
#[derive(Debug, Clone)]
pub struct TrailingBuffer {
    text: String,
    capacity: usize,
    pin: Option<usize>,
}

impl TrailingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            text: String::new(),
            capacity: capacity.max(1),
            pin: None,
        }
    }

    /// Append a fragment with a separating space, dropping the oldest
    /// characters beyond capacity
    pub fn push(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(fragment);

        let len = self.len();
        if len > self.capacity {
            let excess = len - self.capacity;
            let cut = self
                .text
                .char_indices()
                .nth(excess)
                .map(|(pos, _)| pos)
                .unwrap_or(self.text.len());
            self.text.drain(..cut);
            if let Some(pin) = self.pin.as_mut() {
                *pin = pin.saturating_sub(excess);
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.pin = None;
    }

    /// Mark everything currently buffered as stale
    pub fn pin_here(&mut self) {
        self.pin = Some(self.len());
    }

    pub fn unpin(&mut self) {
        self.pin = None;
    }

    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }

    /// Text received after the pin (the whole buffer when unpinned)
    pub fn fresh(&self) -> &str {
        match self.pin {
            None => &self.text,
            Some(pin) => {
                let start = self
                    .text
                    .char_indices()
                    .nth(pin)
                    .map(|(pos, _)| pos)
                    .unwrap_or(self.text.len());
                &self.text[start..]
            }
        }
    }

    pub fn fresh_len(&self) -> usize {
        self.fresh().chars().count()
    }
}

/// The last `count` characters of `text`, leading whitespace trimmed
pub fn tail_chars(text: &str, count: usize) -> &str {
    let len = text.chars().count();
    if len <= count {
        return text;
    }
    let start = text
        .char_indices()
        .nth(len - count)
        .map(|(pos, _)| pos)
        .unwrap_or(0);
    text[start..].trim_start()
}
