use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::engine::analyzer::analyze_runs;
use crate::engine::bigram::BigramKey;
use crate::engine::coverage::{Coverage, coverage};
use crate::engine::prompt::generate_prompts;
use crate::engine::weakness::{WeaknessEntry, cycle_weaknesses, weak_bigram_names};
use crate::generator::{RemoteWordSource, StaticWordSource, WordSource};
use crate::session::input;
use crate::session::run::Run;
use crate::session::typing::RunState;
use crate::store::schema::{NewRun, SessionId};
use crate::store::{JsonStore, LifetimeStore};

/// What happens when the current transition delay runs out.
#[derive(Clone, Debug, PartialEq)]
enum PendingStep {
    NextPrompt,
    NewCycle(Vec<String>),
}

/// Practice loop state: prompt queue, run history, and the current weak list.
///
/// Everything runs on the caller's thread. While a transition is pending the
/// app ignores typing, so cycle analysis never overlaps new input.
pub struct App {
    pub config: Config,
    pub prompts: Vec<String>,
    /// Position in the current cycle; also the index into `prompts`.
    pub prompt_index: usize,
    pub run: RunState,
    pub run_history: Vec<Run>,
    pub weak_bigrams: Vec<BigramKey>,
    pub weaknesses: Vec<WeaknessEntry>,
    pub coverage: Coverage,
    pub cycle_count: u32,
    pub session_id: Option<SessionId>,
    pub status: Option<String>,
    pub should_quit: bool,
    transition: Option<(Instant, PendingStep)>,
    store: Option<Box<dyn LifetimeStore>>,
    words: Box<dyn WordSource>,
    rng: SmallRng,
}

impl App {
    /// Build the app from the on-disk store and the configured word sources.
    pub fn new(config: Config, persist: bool) -> Self {
        let store: Option<Box<dyn LifetimeStore>> = if persist {
            match JsonStore::open_default() {
                Ok(store) => Some(Box::new(store)),
                Err(e) => {
                    tracing::warn!(error = %e, "Store unavailable, running without persistence");
                    None
                }
            }
        } else {
            None
        };
        let words: Box<dyn WordSource> = if config.network_enabled {
            Box::new(RemoteWordSource::from_config(&config))
        } else {
            Box::new(StaticWordSource::new())
        };
        Self::with_parts(config, store, words, SmallRng::from_entropy())
    }

    pub fn with_parts(
        config: Config,
        store: Option<Box<dyn LifetimeStore>>,
        words: Box<dyn WordSource>,
        rng: SmallRng,
    ) -> Self {
        let mut app = Self {
            config,
            prompts: Vec::new(),
            prompt_index: 0,
            run: RunState::new(""),
            run_history: Vec::new(),
            weak_bigrams: Vec::new(),
            weaknesses: Vec::new(),
            coverage: Coverage::default(),
            cycle_count: 1,
            session_id: None,
            status: None,
            should_quit: false,
            transition: None,
            store,
            words,
            rng,
        };
        if app.store.is_none() {
            app.status = Some("not saving progress".to_string());
        }
        app.start_session();
        app
    }

    fn start_session(&mut self) {
        self.session_id = None;
        if let Some(store) = self.store.as_mut() {
            match store.create_session() {
                Ok(id) => self.session_id = Some(id),
                Err(e) => tracing::warn!(error = %e, "Could not create session"),
            }
            let ranked = store.load_lifetime_weaknesses(
                self.config.lifetime_min_attempts,
                self.config.lifetime_seed_limit,
            );
            match ranked.map(|entries| weak_bigram_names(&entries)) {
                Ok(seed) => {
                    if !seed.is_empty() {
                        tracing::info!(seed = %join_keys(&seed), "Seeded weak bigrams from lifetime stats");
                    }
                    self.weak_bigrams = seed;
                }
                Err(e) => tracing::warn!(error = %e, "Could not load lifetime weak bigrams"),
            }
        }
        let prompts = self.generate();
        self.load_prompts(prompts);
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Option<&dyn LifetimeStore> {
        self.store.as_deref()
    }

    pub fn current_prompt(&self) -> &str {
        self.prompts
            .get(self.prompt_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// 1-based position in the cycle.
    pub fn run_number(&self) -> usize {
        self.prompt_index % self.config.runs_per_cycle + 1
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn type_char(&mut self, ch: char) {
        self.type_char_at(ch, Instant::now());
    }

    pub fn type_char_at(&mut self, ch: char, now: Instant) {
        if self.is_transitioning() {
            return;
        }
        if input::process_char_at(&mut self.run, ch, now).is_some() && self.run.is_complete() {
            self.complete_run(now);
        }
    }

    pub fn backspace(&mut self) {
        if !self.is_transitioning() {
            input::process_backspace(&mut self.run);
        }
    }

    /// Finish a pending transition once its delay has elapsed.
    pub fn tick(&mut self, now: Instant) {
        let due = matches!(&self.transition, Some((until, _)) if *until <= now);
        if !due {
            return;
        }
        if let Some((_, step)) = self.transition.take() {
            match step {
                PendingStep::NextPrompt => {
                    self.prompt_index += 1;
                    self.run = RunState::new(self.current_prompt());
                }
                PendingStep::NewCycle(prompts) => {
                    self.cycle_count += 1;
                    self.load_prompts(prompts);
                }
            }
        }
    }

    fn complete_run(&mut self, now: Instant) {
        let run = Run::from_state(&self.run);
        self.persist_run(&run);
        self.run_history.push(run);

        let step = if self.prompt_index + 1 >= self.config.runs_per_cycle {
            PendingStep::NewCycle(self.end_cycle())
        } else {
            PendingStep::NextPrompt
        };
        let delay = Duration::from_millis(self.config.transition_delay_ms);
        self.transition = Some((now + delay, step));
    }

    fn persist_run(&mut self, run: &Run) {
        let run_number = self.run_number() as u32;
        let (Some(store), Some(session_id)) = (self.store.as_mut(), self.session_id) else {
            return;
        };
        let new_run = NewRun {
            session_id,
            cycle_number: self.cycle_count,
            run_number,
            run: run.clone(),
        };
        if let Err(e) = store.record_run(new_run) {
            tracing::warn!(error = %e, "Failed to save run");
        }
    }

    /// Analyze the cycle just finished, persist its counters, and build the
    /// next cycle's prompts.
    fn end_cycle(&mut self) -> Vec<String> {
        let window = self.config.runs_per_cycle.min(self.run_history.len());
        let recent = &self.run_history[self.run_history.len() - window..];
        let stats = analyze_runs(recent);

        self.weaknesses = cycle_weaknesses(&stats, &self.config.weakness_options());
        self.weak_bigrams = weak_bigram_names(&self.weaknesses);
        tracing::info!(
            cycle = self.cycle_count,
            bigrams = stats.len(),
            weak = %join_keys(&self.weak_bigrams),
            "Cycle complete"
        );

        if let Some(store) = self.store.as_mut() {
            if let Err(e) = store.record_cycle_aggregates(&stats) {
                tracing::warn!(error = %e, "Failed to save bigram aggregates");
            }
            if let Some(id) = self.session_id
                && let Err(e) = store.complete_cycle(id)
            {
                tracing::warn!(error = %e, "Failed to update session");
            }
        }

        self.generate()
    }

    /// Regenerate the current cycle's prompts against the current weak list.
    pub fn restart(&mut self) {
        if self.is_transitioning() {
            return;
        }
        let prompts = self.generate();
        self.load_prompts(prompts);
    }

    /// Wipe all persisted data and start over with a fresh session.
    pub fn reset_data(&mut self) {
        if let Some(store) = self.store.as_mut()
            && let Err(e) = store.reset_all()
        {
            tracing::warn!(error = %e, "Failed to reset stored data");
        }
        self.transition = None;
        self.run_history.clear();
        self.weak_bigrams.clear();
        self.weaknesses.clear();
        self.cycle_count = 1;
        self.start_session();
    }

    fn generate(&mut self) -> Vec<String> {
        let settings = self.config.prompt_settings();
        generate_prompts(self.words.as_mut(), &self.weak_bigrams, &settings, &mut self.rng)
    }

    fn load_prompts(&mut self, prompts: Vec<String>) {
        self.coverage = coverage(&prompts, &self.weak_bigrams);
        self.prompts = prompts;
        self.prompt_index = 0;
        self.run = RunState::new(self.current_prompt());
    }
}

fn join_keys(keys: &[BigramKey]) -> String {
    keys.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn test_config() -> Config {
        Config {
            transition_delay_ms: 0,
            network_enabled: false,
            ..Config::default()
        }
    }

    fn test_app(store: Option<Box<dyn LifetimeStore>>) -> App {
        App::with_parts(
            test_config(),
            store,
            Box::new(StaticWordSource::seeded(3)),
            SmallRng::seed_from_u64(3),
        )
    }

    fn type_prompt(app: &mut App, t0: Instant) {
        let text: Vec<char> = app.current_prompt().chars().collect();
        for (i, ch) in text.into_iter().enumerate() {
            app.type_char_at(ch, t0 + Duration::from_millis(i as u64 * 100));
        }
    }

    #[test]
    fn starts_with_a_full_cycle_of_prompts() {
        let app = test_app(None);
        assert_eq!(app.prompts.len(), 3);
        assert_eq!(app.run_number(), 1);
        assert!(!app.current_prompt().is_empty());
        assert!(!app.has_store());
        assert!(app.status.is_some());
    }

    #[test]
    fn offline_app_uses_built_in_words() {
        let app = App::new(test_config(), false);
        assert!(!app.has_store());
        let words: Vec<&str> = app.prompts.iter().flat_map(|p| p.split_whitespace()).collect();
        assert_eq!(words.len(), 3 * app.config.words_per_prompt);
        assert!(
            words
                .iter()
                .all(|w| crate::generator::fallback::words().iter().any(|f| f == w))
        );
    }

    #[test]
    fn completing_a_run_transitions_to_next_prompt() {
        let mut app = test_app(None);
        let t0 = Instant::now();
        type_prompt(&mut app, t0);
        assert!(app.is_transitioning());
        assert_eq!(app.run_history.len(), 1);

        // Input is gated until the transition finishes.
        let cursor = app.run.cursor;
        app.type_char_at('z', t0);
        assert_eq!(app.run.cursor, cursor);

        app.tick(t0 + Duration::from_secs(60));
        assert!(!app.is_transitioning());
        assert_eq!(app.run_number(), 2);
        assert_eq!(app.run.cursor, 0);
    }

    #[test]
    fn transition_waits_for_delay() {
        let mut app = test_app(None);
        app.config.transition_delay_ms = 400;
        let t0 = Instant::now();
        type_prompt(&mut app, t0);
        app.tick(t0);
        assert!(app.is_transitioning());
    }

    #[test]
    fn backspace_ignored_while_transitioning() {
        let mut app = test_app(None);
        let t0 = Instant::now();
        type_prompt(&mut app, t0);
        let cursor = app.run.cursor;
        app.backspace();
        assert_eq!(app.run.cursor, cursor);
    }

    #[test]
    fn cycle_end_persists_aggregates_and_regenerates() {
        let mut app = test_app(Some(Box::new(MemoryStore::new())));
        let session = app.session_id.unwrap();
        let t0 = Instant::now();
        for _ in 0..3 {
            type_prompt(&mut app, t0);
            app.tick(t0 + Duration::from_secs(600));
        }

        assert_eq!(app.cycle_count, 2);
        assert_eq!(app.run_number(), 1);
        let store = app.store().unwrap();
        assert!(!store.lifetime_aggregates().unwrap().is_empty());
        let record = store.session(session).unwrap().unwrap();
        assert_eq!(record.total_runs, 3);
        assert_eq!(record.total_cycles, 1);
        let runs = store.runs_by_session(session).unwrap();
        let numbers: Vec<u32> = runs.iter().map(|r| r.run_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn restart_resets_cycle_position() {
        let mut app = test_app(None);
        let t0 = Instant::now();
        type_prompt(&mut app, t0);
        app.tick(t0 + Duration::from_secs(60));
        assert_eq!(app.run_number(), 2);
        app.restart();
        assert_eq!(app.run_number(), 1);
        assert_eq!(app.prompts.len(), 3);
    }

    #[test]
    fn lifetime_stats_seed_the_first_cycle() {
        let mut store = MemoryStore::new();
        let mut stats = crate::engine::analyzer::BigramStats::new();
        for _ in 0..6 {
            stats.record_attempt(BigramKey::new('q', 'u'), true);
        }
        store.record_cycle_aggregates(&stats).unwrap();

        let app = test_app(Some(Box::new(store)));
        assert_eq!(app.weak_bigrams, vec![BigramKey::new('q', 'u')]);
    }

    #[test]
    fn reset_clears_history_and_store() {
        let mut app = test_app(Some(Box::new(MemoryStore::new())));
        let t0 = Instant::now();
        for _ in 0..3 {
            type_prompt(&mut app, t0);
            app.tick(t0 + Duration::from_secs(600));
        }
        app.reset_data();
        assert!(app.run_history.is_empty());
        assert_eq!(app.cycle_count, 1);
        assert!(app.store().unwrap().lifetime_aggregates().unwrap().is_empty());
        assert!(app.session_id.is_some());
    }
}
