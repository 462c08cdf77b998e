use std::time::Instant;

use crate::session::input::CharStatus;
use crate::session::run::KeystrokeEvent;

/// Live state of the prompt currently being typed.
pub struct RunState {
    pub target: Vec<char>,
    pub input: Vec<CharStatus>,
    pub cursor: usize,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub events: Vec<KeystrokeEvent>,
}

impl RunState {
    pub fn new(text: &str) -> Self {
        Self {
            target: text.chars().collect(),
            input: Vec::new(),
            cursor: 0,
            started_at: None,
            finished_at: None,
            events: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.target.len()
    }

    pub fn elapsed_ms(&self, now: Instant) -> u64 {
        match self.started_at {
            Some(start) => {
                let end = self.finished_at.unwrap_or(now);
                end.saturating_duration_since(start).as_millis() as u64
            }
            None => 0,
        }
    }

    pub fn correct_count(&self) -> usize {
        self.input
            .iter()
            .filter(|s| matches!(s, CharStatus::Correct))
            .count()
    }

    pub fn typo_count(&self) -> usize {
        self.cursor - self.correct_count()
    }

    /// Live words per minute: typed chars / 5 per elapsed minute, rounded.
    /// Zero until the first keystroke lands.
    pub fn wpm_at(&self, now: Instant) -> u32 {
        let elapsed = self.elapsed_ms(now);
        if self.cursor == 0 || elapsed == 0 {
            return 0;
        }
        let minutes = elapsed as f64 / 60_000.0;
        ((self.cursor as f64 / 5.0) / minutes).round() as u32
    }

    pub fn wpm(&self) -> u32 {
        self.wpm_at(Instant::now())
    }

    /// Share of currently typed chars that match the prompt, rounded.
    pub fn accuracy(&self) -> u32 {
        if self.cursor == 0 {
            return 100;
        }
        (self.correct_count() as f64 / self.cursor as f64 * 100.0).round() as u32
    }

    pub fn progress(&self) -> f64 {
        if self.target.is_empty() {
            return 0.0;
        }
        self.cursor as f64 / self.target.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::session::input;

    #[test]
    fn test_new_run() {
        let run = RunState::new("hello");
        assert_eq!(run.target.len(), 5);
        assert_eq!(run.cursor, 0);
        assert!(!run.is_complete());
        assert_eq!(run.progress(), 0.0);
    }

    #[test]
    fn test_live_stats_before_typing() {
        let run = RunState::new("test");
        assert_eq!(run.accuracy(), 100);
        assert_eq!(run.wpm(), 0);
    }

    #[test]
    fn test_empty_run_progress() {
        let run = RunState::new("");
        assert!(run.is_complete());
        assert_eq!(run.progress(), 0.0);
    }

    #[test]
    fn test_wpm_counts_typed_chars_per_minute() {
        let mut run = RunState::new("abcdefghij");
        let t0 = Instant::now();
        for (i, ch) in "abcdefghij".chars().enumerate() {
            input::process_char_at(&mut run, ch, t0 + Duration::from_millis(i as u64 * 100));
        }
        // 10 chars = 2 words in 0.9s
        assert!(run.is_complete());
        assert_eq!(run.wpm_at(t0 + Duration::from_secs(60)), 133);
    }

    #[test]
    fn test_wpm_zero_when_no_time_elapsed() {
        let mut run = RunState::new("ab");
        let t0 = Instant::now();
        input::process_char_at(&mut run, 'a', t0);
        assert_eq!(run.wpm_at(t0), 0);
    }

    #[test]
    fn test_accuracy_tracks_current_input() {
        let mut run = RunState::new("abcd");
        let t0 = Instant::now();
        input::process_char_at(&mut run, 'a', t0);
        input::process_char_at(&mut run, 'x', t0);
        input::process_char_at(&mut run, 'c', t0);
        // 2 of 3 typed chars are right
        assert_eq!(run.accuracy(), 67);
        assert_eq!(run.typo_count(), 1);

        input::process_backspace(&mut run);
        input::process_backspace(&mut run);
        assert_eq!(run.accuracy(), 100);
    }
}
