use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::analyzer::BigramCounts;
use crate::engine::bigram::BigramKey;
use crate::session::run::{KeystrokeEvent, Run};

pub const SCHEMA_VERSION: u32 = 1;

pub type SessionId = u64;
pub type RunId = u64;

/// Files carrying a schema version; a mismatch is treated as no data.
pub trait Versioned {
    fn schema_version(&self) -> u32;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_runs: u32,
    pub total_cycles: u32,
    pub avg_wpm: f64,
    pub avg_accuracy: f64,
}

impl SessionRecord {
    pub fn new(id: SessionId, start_time: DateTime<Utc>) -> Self {
        Self {
            id,
            start_time,
            end_time: None,
            total_runs: 0,
            total_cycles: 0,
            avg_wpm: 0.0,
            avg_accuracy: 0.0,
        }
    }

    /// Fold one run into the running averages. Averages are kept rounded.
    pub fn apply_run(&mut self, wpm: f64, accuracy: f64, at: DateTime<Utc>) {
        let n = f64::from(self.total_runs);
        let next = n + 1.0;
        self.avg_wpm = ((self.avg_wpm * n + wpm) / next).round();
        self.avg_accuracy = ((self.avg_accuracy * n + accuracy) / next).round();
        self.total_runs += 1;
        self.end_time = Some(at);
    }
}

/// A run as handed to the store, before it has an id.
#[derive(Clone, Debug)]
pub struct NewRun {
    pub session_id: SessionId,
    pub cycle_number: u32,
    pub run_number: u32,
    pub run: Run,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: RunId,
    pub session_id: SessionId,
    pub cycle_number: u32,
    pub run_number: u32,
    pub wpm: f64,
    pub accuracy: f64,
    pub timestamp: DateTime<Utc>,
    pub events: Vec<KeystrokeEvent>,
}

impl RunRecord {
    pub fn run(&self) -> Run {
        Run::new(self.events.clone(), self.wpm, self.accuracy)
    }
}

/// Lifetime totals for one bigram. Only ever grows, until a full reset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LifetimeBigramAggregate {
    pub bigram: BigramKey,
    pub total_attempts: u64,
    pub total_errors: u64,
    pub total_time_ms: u64,
    pub total_count: u64,
    pub last_updated: DateTime<Utc>,
}

impl LifetimeBigramAggregate {
    pub fn new(bigram: BigramKey, at: DateTime<Utc>) -> Self {
        Self {
            bigram,
            total_attempts: 0,
            total_errors: 0,
            total_time_ms: 0,
            total_count: 0,
            last_updated: at,
        }
    }

    pub fn merge(&mut self, cycle: &BigramCounts, at: DateTime<Utc>) {
        self.total_attempts += cycle.attempts;
        self.total_errors += cycle.errors;
        self.total_time_ms += cycle.total_time_ms;
        self.total_count += cycle.count;
        self.last_updated = at;
    }

    pub fn counts(&self) -> BigramCounts {
        BigramCounts {
            attempts: self.total_attempts,
            errors: self.total_errors,
            total_time_ms: self.total_time_ms,
            count: self.total_count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionsData {
    pub schema_version: u32,
    pub next_id: SessionId,
    pub sessions: Vec<SessionRecord>,
}

impl Default for SessionsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            next_id: 1,
            sessions: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunsData {
    pub schema_version: u32,
    pub next_id: RunId,
    pub runs: Vec<RunRecord>,
}

impl Default for RunsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            next_id: 1,
            runs: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BigramStatsData {
    pub schema_version: u32,
    pub stats: Vec<LifetimeBigramAggregate>,
}

impl Default for BigramStatsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            stats: Vec::new(),
        }
    }
}

impl Versioned for SessionsData {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

impl Versioned for RunsData {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

impl Versioned for BigramStatsData {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_average_is_rounded() {
        let now = Utc::now();
        let mut session = SessionRecord::new(1, now);
        session.apply_run(50.0, 90.0, now);
        session.apply_run(61.0, 95.0, now);
        assert_eq!(session.total_runs, 2);
        assert_eq!(session.avg_wpm, 56.0);
        assert_eq!(session.avg_accuracy, 93.0);
        assert_eq!(session.end_time, Some(now));
    }

    #[test]
    fn aggregate_merge_is_additive() {
        let now = Utc::now();
        let mut agg = LifetimeBigramAggregate::new(BigramKey::new('t', 'h'), now);
        let cycle = BigramCounts {
            attempts: 3,
            errors: 1,
            total_time_ms: 300,
            count: 3,
        };
        agg.merge(&cycle, now);
        agg.merge(&cycle, now);
        assert_eq!(agg.counts(), BigramCounts {
            attempts: 6,
            errors: 2,
            total_time_ms: 600,
            count: 6,
        });
    }

    #[test]
    fn aggregates_serialize_bigram_as_string() {
        let agg = LifetimeBigramAggregate::new(BigramKey::new('o', 'u'), Utc::now());
        let json = serde_json::to_value(&agg).unwrap();
        assert_eq!(json["bigram"], "ou");
    }
}
