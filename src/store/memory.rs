use std::collections::HashMap;

use chrono::Utc;

use crate::engine::analyzer::BigramStats;
use crate::engine::bigram::BigramKey;
use crate::error::StoreError;
use crate::store::LifetimeStore;
use crate::store::schema::{
    BigramStatsData, LifetimeBigramAggregate, NewRun, RunId, RunRecord, RunsData, SessionId,
    SessionRecord, SessionsData,
};

/// In-process store. Also the working state behind [`super::JsonStore`].
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub(crate) sessions: SessionsData,
    pub(crate) runs: RunsData,
    pub(crate) bigrams: BigramStatsData,
    index: HashMap<BigramKey, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(sessions: SessionsData, runs: RunsData, mut bigrams: BigramStatsData) -> Self {
        // Collapse duplicate keys from hand-edited files into one row each.
        let mut index: HashMap<BigramKey, usize> = HashMap::new();
        let mut unique: Vec<LifetimeBigramAggregate> = Vec::with_capacity(bigrams.stats.len());
        for agg in bigrams.stats.drain(..) {
            match index.get(&agg.bigram) {
                Some(&i) => {
                    let existing = &mut unique[i];
                    let at = agg.last_updated.max(existing.last_updated);
                    existing.merge(&agg.counts(), at);
                }
                None => {
                    index.insert(agg.bigram, unique.len());
                    unique.push(agg);
                }
            }
        }
        bigrams.stats = unique;
        Self {
            sessions,
            runs,
            bigrams,
            index,
        }
    }

    fn session_mut(&mut self, id: SessionId) -> Option<&mut SessionRecord> {
        self.sessions.sessions.iter_mut().find(|s| s.id == id)
    }
}

impl LifetimeStore for MemoryStore {
    fn create_session(&mut self) -> Result<SessionId, StoreError> {
        let id = self.sessions.next_id;
        self.sessions.next_id += 1;
        self.sessions.sessions.push(SessionRecord::new(id, Utc::now()));
        Ok(id)
    }

    fn session(&self, id: SessionId) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.sessions.sessions.iter().find(|s| s.id == id).cloned())
    }

    fn record_run(&mut self, new_run: NewRun) -> Result<RunId, StoreError> {
        let now = Utc::now();
        let id = self.runs.next_id;
        self.runs.next_id += 1;

        let NewRun {
            session_id,
            cycle_number,
            run_number,
            run,
        } = new_run;

        if let Some(session) = self.session_mut(session_id) {
            session.apply_run(run.wpm, run.accuracy, now);
        }

        self.runs.runs.push(RunRecord {
            id,
            session_id,
            cycle_number,
            run_number,
            wpm: run.wpm,
            accuracy: run.accuracy,
            timestamp: now,
            events: run.events,
        });
        Ok(id)
    }

    fn complete_cycle(&mut self, id: SessionId) -> Result<(), StoreError> {
        let session = self.session_mut(id).ok_or(StoreError::SessionNotFound(id))?;
        session.total_cycles += 1;
        session.end_time = Some(Utc::now());
        Ok(())
    }

    fn record_cycle_aggregates(&mut self, stats: &BigramStats) -> Result<(), StoreError> {
        let now = Utc::now();
        for (key, counts) in stats.iter() {
            let slot = match self.index.get(key) {
                Some(&i) => i,
                None => {
                    self.bigrams.stats.push(LifetimeBigramAggregate::new(*key, now));
                    let i = self.bigrams.stats.len() - 1;
                    self.index.insert(*key, i);
                    i
                }
            };
            self.bigrams.stats[slot].merge(counts, now);
        }
        Ok(())
    }

    fn lifetime_aggregates(&self) -> Result<Vec<LifetimeBigramAggregate>, StoreError> {
        Ok(self.bigrams.stats.clone())
    }

    fn runs_by_session(&self, id: SessionId) -> Result<Vec<RunRecord>, StoreError> {
        Ok(self
            .runs
            .runs
            .iter()
            .filter(|r| r.session_id == id)
            .cloned()
            .collect())
    }

    fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>, StoreError> {
        let mut runs: Vec<RunRecord> = self.runs.runs.clone();
        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        runs.truncate(limit);
        Ok(runs)
    }

    fn reset_all(&mut self) -> Result<(), StoreError> {
        *self = Self::default();
        Ok(())
    }
}
