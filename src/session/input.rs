use std::time::Instant;

use crate::session::run::KeystrokeEvent;
use crate::session::typing::RunState;

#[derive(Clone, Debug)]
pub enum CharStatus {
    Correct,
    Incorrect(char),
}

/// Record a printable key press at `now`. The first press starts the run clock.
pub fn process_char_at(run: &mut RunState, ch: char, now: Instant) -> Option<KeystrokeEvent> {
    if run.is_complete() {
        return None;
    }

    let started = *run.started_at.get_or_insert(now);
    let expected = run.target[run.cursor];

    let event = KeystrokeEvent {
        expected,
        actual: ch,
        timestamp_ms: now.saturating_duration_since(started).as_millis() as u64,
    };
    run.events.push(event.clone());

    if ch == expected {
        run.input.push(CharStatus::Correct);
    } else {
        run.input.push(CharStatus::Incorrect(ch));
    }
    run.cursor += 1;

    if run.is_complete() {
        run.finished_at = Some(now);
    }

    Some(event)
}

/// Step the cursor back. The event log is left untouched.
pub fn process_backspace(run: &mut RunState) {
    if run.cursor > 0 && !run.is_complete() {
        run.cursor -= 1;
        run.input.pop();
    }
}
