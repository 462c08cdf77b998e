use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use crate::config::Config;
use crate::engine::analyzer::BigramStats;
use crate::error::StoreError;
use crate::store::LifetimeStore;
use crate::store::memory::MemoryStore;
use crate::store::schema::{
    BigramStatsData, LifetimeBigramAggregate, NewRun, RunId, RunRecord, RunsData, SCHEMA_VERSION,
    SessionId, SessionRecord, SessionsData, Versioned,
};

const SESSIONS_FILE: &str = "sessions.json";
const RUNS_FILE: &str = "runs.json";
const BIGRAMS_FILE: &str = "bigram_stats.json";

/// File-backed store. State is loaded once at open and every mutation is
/// written through before returning.
pub struct JsonStore {
    base_dir: PathBuf,
    state: MemoryStore,
}

impl JsonStore {
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(Config::data_dir())
    }

    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;

        let sessions: SessionsData = load(&base_dir, SESSIONS_FILE);
        let runs: RunsData = load(&base_dir, RUNS_FILE);
        let bigrams: BigramStatsData = load(&base_dir, BIGRAMS_FILE);
        tracing::info!(
            dir = %base_dir.display(),
            sessions = sessions.sessions.len(),
            runs = runs.runs.len(),
            bigrams = bigrams.stats.len(),
            "Opened store"
        );

        Ok(Self {
            base_dir,
            state: MemoryStore::from_parts(sessions, runs, bigrams),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Write to a temp file, sync, then rename over the target.
    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<(), StoreError> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn save_sessions(&self) -> Result<(), StoreError> {
        self.save(SESSIONS_FILE, &self.state.sessions)
    }

    fn save_runs(&self) -> Result<(), StoreError> {
        self.save(RUNS_FILE, &self.state.runs)
    }

    fn save_bigrams(&self) -> Result<(), StoreError> {
        self.save(BIGRAMS_FILE, &self.state.bigrams)
    }
}

/// Read one data file. Missing, unreadable, or stale-schema files load as empty.
fn load<T: DeserializeOwned + Default + Versioned>(base_dir: &Path, name: &str) -> T {
    let path = base_dir.join(name);
    if !path.exists() {
        return T::default();
    }
    match read_versioned::<T>(&path) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Discarding unreadable store file");
            T::default()
        }
    }
}

fn read_versioned<T: DeserializeOwned + Versioned>(path: &Path) -> Result<T, StoreError> {
    let content = fs::read_to_string(path)?;
    let data: T = serde_json::from_str(&content)?;
    if data.schema_version() != SCHEMA_VERSION {
        return Err(StoreError::SchemaMismatch {
            path: path.to_path_buf(),
            found: data.schema_version(),
            expected: SCHEMA_VERSION,
        });
    }
    Ok(data)
}

impl LifetimeStore for JsonStore {
    fn create_session(&mut self) -> Result<SessionId, StoreError> {
        let id = self.state.create_session()?;
        self.save_sessions()?;
        Ok(id)
    }

    fn session(&self, id: SessionId) -> Result<Option<SessionRecord>, StoreError> {
        self.state.session(id)
    }

    fn record_run(&mut self, run: NewRun) -> Result<RunId, StoreError> {
        let id = self.state.record_run(run)?;
        self.save_runs()?;
        self.save_sessions()?;
        Ok(id)
    }

    fn complete_cycle(&mut self, id: SessionId) -> Result<(), StoreError> {
        self.state.complete_cycle(id)?;
        self.save_sessions()
    }

    fn record_cycle_aggregates(&mut self, stats: &BigramStats) -> Result<(), StoreError> {
        self.state.record_cycle_aggregates(stats)?;
        self.save_bigrams()
    }

    fn lifetime_aggregates(&self) -> Result<Vec<LifetimeBigramAggregate>, StoreError> {
        self.state.lifetime_aggregates()
    }

    fn runs_by_session(&self, id: SessionId) -> Result<Vec<RunRecord>, StoreError> {
        self.state.runs_by_session(id)
    }

    fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>, StoreError> {
        self.state.recent_runs(limit)
    }

    fn reset_all(&mut self) -> Result<(), StoreError> {
        self.state.reset_all()?;
        self.save_sessions()?;
        self.save_runs()?;
        self.save_bigrams()?;
        tracing::info!(dir = %self.base_dir.display(), "Reset all stored data");
        Ok(())
    }
}
