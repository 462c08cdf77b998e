pub mod json_store;
pub mod memory;
pub mod schema;

use crate::engine::analyzer::BigramStats;
use crate::engine::bigram::BigramKey;
use crate::engine::weakness::{LIFETIME_MIN_ATTEMPTS, WeaknessEntry, rank_lifetime, weak_bigram_names};
use crate::error::StoreError;
use crate::store::schema::{LifetimeBigramAggregate, NewRun, RunId, RunRecord, SessionId, SessionRecord};

pub use json_store::JsonStore;
pub use memory::MemoryStore;

/// Persistence handle passed into the app. Open it, read and write through
/// it, drop it to close.
pub trait LifetimeStore {
    fn create_session(&mut self) -> Result<SessionId, StoreError>;

    fn session(&self, id: SessionId) -> Result<Option<SessionRecord>, StoreError>;

    /// Append a run and fold it into its session's running averages.
    fn record_run(&mut self, run: NewRun) -> Result<RunId, StoreError>;

    fn complete_cycle(&mut self, id: SessionId) -> Result<(), StoreError>;

    /// Add one cycle's counters onto the lifetime totals, keyed by bigram.
    fn record_cycle_aggregates(&mut self, stats: &BigramStats) -> Result<(), StoreError>;

    fn lifetime_aggregates(&self) -> Result<Vec<LifetimeBigramAggregate>, StoreError>;

    fn runs_by_session(&self, id: SessionId) -> Result<Vec<RunRecord>, StoreError>;

    /// Newest first.
    fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>, StoreError>;

    fn reset_all(&mut self) -> Result<(), StoreError>;

    fn load_lifetime_weaknesses(
        &self,
        min_attempts: u64,
        limit: usize,
    ) -> Result<Vec<WeaknessEntry>, StoreError> {
        let aggregates = self.lifetime_aggregates()?;
        Ok(rank_lifetime(
            aggregates.iter().map(|a| (a.bigram, a.counts())),
            min_attempts,
            limit,
        ))
    }

    /// Weakest lifetime bigrams by error rate, used to seed a new session.
    fn load_lifetime_weak_bigrams(&self, limit: usize) -> Result<Vec<BigramKey>, StoreError> {
        let ranked = self.load_lifetime_weaknesses(LIFETIME_MIN_ATTEMPTS, limit)?;
        Ok(weak_bigram_names(&ranked))
    }
}
