use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::engine::analyzer::{BigramCounts, BigramStats};
use crate::engine::bigram::BigramKey;

pub const DEFAULT_MIN_ATTEMPTS: u64 = 3;
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_ERROR_WEIGHT: f64 = 0.6;
pub const DEFAULT_TIMING_WEIGHT: f64 = 0.4;
pub const LIFETIME_MIN_ATTEMPTS: u64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaknessOptions {
    pub min_attempts: u64,
    pub top_n: usize,
    pub error_weight: f64,
    pub timing_weight: f64,
}

impl Default for WeaknessOptions {
    fn default() -> Self {
        Self {
            min_attempts: DEFAULT_MIN_ATTEMPTS,
            top_n: DEFAULT_TOP_N,
            error_weight: DEFAULT_ERROR_WEIGHT,
            timing_weight: DEFAULT_TIMING_WEIGHT,
        }
    }
}

/// Counters for one bigram plus the rates derived from them.
#[derive(Clone, Debug, PartialEq)]
pub struct CombinedStat {
    pub bigram: BigramKey,
    pub counts: BigramCounts,
    pub error_rate: f64,
    pub avg_time_ms: f64,
}

impl CombinedStat {
    fn new(bigram: BigramKey, counts: BigramCounts) -> Self {
        Self {
            bigram,
            counts,
            error_rate: counts.error_rate(),
            avg_time_ms: counts.avg_time_ms(),
        }
    }
}

/// Union of an error table and a timing table.
///
/// Attempts and errors come from `errors`, time and sample count from `timing`.
/// Order is the error table's order followed by timing-only bigrams. Passing the
/// same fused table twice is fine.
pub fn combine(errors: &BigramStats, timing: &BigramStats) -> Vec<CombinedStat> {
    let merged = |key: &BigramKey| {
        let e = errors.get(key).copied().unwrap_or_default();
        let t = timing.get(key).copied().unwrap_or_default();
        BigramCounts {
            attempts: e.attempts,
            errors: e.errors,
            total_time_ms: t.total_time_ms,
            count: t.count,
        }
    };

    errors
        .iter()
        .map(|(key, _)| *key)
        .chain(
            timing
                .iter()
                .map(|(key, _)| *key)
                .filter(|key| !errors.contains(key)),
        )
        .map(|key| CombinedStat::new(key, merged(&key)))
        .collect()
}

/// One ranked weakness.
///
/// `timing_diff` is the signed relative deviation from the cycle's mean
/// transition time: negative is faster, positive is slower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaknessEntry {
    pub bigram: BigramKey,
    pub weakness_score: f64,
    pub error_rate: f64,
    pub avg_time_ms: f64,
    pub timing_diff: f64,
    pub attempts: u64,
    pub errors: u64,
}

impl WeaknessEntry {
    pub fn timing_diff_percent(&self) -> i64 {
        (self.timing_diff * 100.0).round() as i64
    }

    pub fn error_percent(&self) -> i64 {
        (self.error_rate * 100.0).round() as i64
    }
}

fn rank(mut scored: Vec<WeaknessEntry>, top_n: usize) -> Vec<WeaknessEntry> {
    scored.retain(|e| e.weakness_score > 0.0);
    sort_and_truncate(scored, top_n)
}

fn sort_and_truncate(mut scored: Vec<WeaknessEntry>, top_n: usize) -> Vec<WeaknessEntry> {
    // sort_by is stable: equal scores keep first-observation order
    scored.sort_by(|a, b| {
        b.weakness_score
            .partial_cmp(&a.weakness_score)
            .unwrap_or(Ordering::Equal)
    });
    scored.truncate(top_n);
    scored
}

/// Rank one cycle's bigrams by blended error rate and relative slowness.
pub fn rank_weaknesses(
    combined: &[CombinedStat],
    overall_avg_time_ms: f64,
    options: &WeaknessOptions,
) -> Vec<WeaknessEntry> {
    let scored = combined
        .iter()
        .filter(|s| s.counts.attempts >= options.min_attempts)
        .map(|s| {
            let timing_diff = if overall_avg_time_ms > 0.0 {
                (s.avg_time_ms - overall_avg_time_ms) / overall_avg_time_ms
            } else {
                0.0
            };
            let slowness = timing_diff.max(0.0);
            WeaknessEntry {
                bigram: s.bigram,
                weakness_score: s.error_rate * options.error_weight
                    + slowness * options.timing_weight,
                error_rate: s.error_rate,
                avg_time_ms: s.avg_time_ms,
                timing_diff,
                attempts: s.counts.attempts,
                errors: s.counts.errors,
            }
        })
        .collect();

    rank(scored, options.top_n)
}

/// Rank a fused cycle table against its own mean transition time.
pub fn cycle_weaknesses(stats: &BigramStats, options: &WeaknessOptions) -> Vec<WeaknessEntry> {
    rank_weaknesses(&combine(stats, stats), stats.overall_avg_time_ms(), options)
}

/// Rank lifetime totals by error rate alone.
///
/// There is no shared timing baseline across sessions, so slowness does not
/// contribute here. Error-free bigrams that meet `min_attempts` are kept at
/// the tail.
pub fn rank_lifetime<I>(totals: I, min_attempts: u64, limit: usize) -> Vec<WeaknessEntry>
where
    I: IntoIterator<Item = (BigramKey, BigramCounts)>,
{
    let scored = totals
        .into_iter()
        .filter(|(_, counts)| counts.attempts >= min_attempts)
        .map(|(bigram, counts)| WeaknessEntry {
            bigram,
            weakness_score: counts.error_rate(),
            error_rate: counts.error_rate(),
            avg_time_ms: counts.avg_time_ms(),
            timing_diff: 0.0,
            attempts: counts.attempts,
            errors: counts.errors,
        })
        .collect();

    sort_and_truncate(scored, limit)
}

pub fn weak_bigram_names(entries: &[WeaknessEntry]) -> Vec<BigramKey> {
    entries.iter().map(|e| e.bigram).collect()
}
