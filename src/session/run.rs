use serde::{Deserialize, Serialize};

use crate::session::typing::RunState;

/// One printable key press during a run.
///
/// Events are append-only: a mistyped character keeps its event even after the
/// user backspaces and retypes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystrokeEvent {
    pub expected: char,
    pub actual: char,
    /// Milliseconds since the run's first keystroke. Non-decreasing within a run.
    pub timestamp_ms: u64,
}

impl KeystrokeEvent {
    pub fn new(expected: char, actual: char, timestamp_ms: u64) -> Self {
        Self {
            expected,
            actual,
            timestamp_ms,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.expected == self.actual
    }
}

/// A completed attempt at one prompt. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub events: Vec<KeystrokeEvent>,
    pub wpm: f64,
    pub accuracy: f64,
}

impl Run {
    pub fn new(events: Vec<KeystrokeEvent>, wpm: f64, accuracy: f64) -> Self {
        Self {
            events,
            wpm,
            accuracy: accuracy.clamp(0.0, 100.0),
        }
    }

    /// Snapshot a finished typing state, using its final live WPM and accuracy.
    pub fn from_state(state: &RunState) -> Self {
        Self::new(
            state.events.clone(),
            f64::from(state.wpm()),
            f64::from(state.accuracy()),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::session::input;

    #[test]
    fn from_state_keeps_corrected_errors() {
        let mut state = RunState::new("ab");
        let t0 = Instant::now();
        input::process_char_at(&mut state, 'x', t0);
        input::process_backspace(&mut state);
        input::process_char_at(&mut state, 'a', t0 + Duration::from_millis(120));
        input::process_char_at(&mut state, 'b', t0 + Duration::from_millis(300));

        let run = Run::from_state(&state);
        assert_eq!(run.events.len(), 3);
        assert!(!run.events[0].is_correct());
        assert_eq!(run.events[0].timestamp_ms, 0);
        assert_eq!(run.events[1].timestamp_ms, 120);
        assert_eq!(run.events[2].timestamp_ms, 300);
        assert_eq!(run.accuracy, 100.0);
    }

    #[test]
    fn accuracy_is_clamped() {
        let run = Run::new(Vec::new(), 40.0, 140.0);
        assert_eq!(run.accuracy, 100.0);
    }
}
