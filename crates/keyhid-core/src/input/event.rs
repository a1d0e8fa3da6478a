// Keyhid Input Layer - Key Events
// Immutable key events and the source trait live capture implements

use std::time::{Duration, SystemTime};

use crate::Action;

/// One physical key transition as delivered by a capture source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Raw scan code (Linux key code for evdev sources)
    pub scan_code: u16,
    /// Name of the key as the capture layer reports it
    pub key_name: String,
    pub action: Action,
    pub timestamp: SystemTime,
}

impl KeyEvent {
    pub fn new(scan_code: u16, key_name: impl Into<String>, action: Action) -> Self {
        Self {
            scan_code,
            key_name: key_name.into(),
            action,
            timestamp: SystemTime::now(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Errors raised by capture sources
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Cannot open input device {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input device closed")]
    Closed,
}

/// A producer of key events for the live translation loop.
pub trait KeyEventSource {
    /// Wait up to `timeout` for the next key event.
    ///
    /// `Ok(None)` means nothing arrived in time; the caller uses the gap to
    /// check for a stop request.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, CaptureError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_event_new() {
        let event = KeyEvent::new(30, "a", Action::Press);
        assert_eq!(event.scan_code, 30);
        assert_eq!(event.key_name, "a");
        assert_eq!(event.action, Action::Press);
    }
}
