use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine::bigram::BigramKey;
use crate::session::run::{KeystrokeEvent, Run};

/// Raw per-bigram counters for one cycle.
///
/// `count` and `total_time_ms` always move together; `count` normally equals
/// `attempts` but is kept separately so error-only and timing-only tables can
/// be merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigramCounts {
    pub attempts: u64,
    pub errors: u64,
    pub total_time_ms: u64,
    pub count: u64,
}

impl BigramCounts {
    pub fn error_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        (self.errors as f64 / self.attempts as f64).min(1.0)
    }

    pub fn avg_time_ms(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total_time_ms as f64 / self.count as f64
    }
}

/// Insertion-ordered bigram table.
///
/// Iteration follows first-observation order so rankings break ties the same
/// way on every run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BigramStats {
    order: Vec<BigramKey>,
    counts: HashMap<BigramKey, BigramCounts>,
}

impl BigramStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&mut self, key: BigramKey) -> &mut BigramCounts {
        if !self.counts.contains_key(&key) {
            self.order.push(key);
        }
        self.counts.entry(key).or_default()
    }

    pub fn get(&self, key: &BigramKey) -> Option<&BigramCounts> {
        self.counts.get(key)
    }

    pub fn contains(&self, key: &BigramKey) -> bool {
        self.counts.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BigramKey, &BigramCounts)> {
        self.order.iter().map(move |k| (k, &self.counts[k]))
    }

    pub fn record_attempt(&mut self, key: BigramKey, error: bool) {
        let counts = self.entry(key);
        counts.attempts += 1;
        if error {
            counts.errors += 1;
        }
    }

    pub fn record_timing(&mut self, key: BigramKey, delta_ms: u64) {
        let counts = self.entry(key);
        counts.total_time_ms += delta_ms;
        counts.count += 1;
    }

    /// Mean transition time over every sample in the table, 0 when empty.
    pub fn overall_avg_time_ms(&self) -> f64 {
        let (time, count) = self.counts.values().fold((0u64, 0u64), |(t, c), s| {
            (t + s.total_time_ms, c + s.count)
        });
        if count == 0 {
            return 0.0;
        }
        time as f64 / count as f64
    }
}

/// Adjacent event pairs that form a real typing transition.
///
/// Pairs whose bigram contains a space straddle a word boundary and are skipped.
fn transitions(run: &Run) -> impl Iterator<Item = (BigramKey, &KeystrokeEvent, &KeystrokeEvent)> {
    run.events.windows(2).filter_map(|pair| {
        let (prev, next) = (&pair[0], &pair[1]);
        let key = BigramKey([prev.expected, next.expected]);
        (!key.contains_space()).then_some((key, prev, next))
    })
}

/// Attempt and error counts per bigram. An error is charged to the bigram when
/// its second character was mistyped.
pub fn analyze_errors(runs: &[Run]) -> BigramStats {
    let mut stats = BigramStats::new();
    for run in runs {
        for (key, _, next) in transitions(run) {
            stats.record_attempt(key, !next.is_correct());
        }
    }
    stats
}

/// Transition-time totals per bigram.
pub fn analyze_timing(runs: &[Run]) -> BigramStats {
    let mut stats = BigramStats::new();
    for run in runs {
        for (key, prev, next) in transitions(run) {
            stats.record_timing(key, next.timestamp_ms.saturating_sub(prev.timestamp_ms));
        }
    }
    stats
}

/// Error and timing counters in one pass. Identical to merging
/// [`analyze_errors`] and [`analyze_timing`].
pub fn analyze_runs(runs: &[Run]) -> BigramStats {
    let mut stats = BigramStats::new();
    for run in runs {
        for (key, prev, next) in transitions(run) {
            stats.record_attempt(key, !next.is_correct());
            stats.record_timing(key, next.timestamp_ms.saturating_sub(prev.timestamp_ms));
        }
    }
    stats
}
