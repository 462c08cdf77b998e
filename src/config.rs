use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::prompt::PromptSettings;
use crate::engine::weakness::{
    DEFAULT_ERROR_WEIGHT, DEFAULT_MIN_ATTEMPTS, DEFAULT_TIMING_WEIGHT, DEFAULT_TOP_N,
    LIFETIME_MIN_ATTEMPTS, WeaknessOptions,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_runs_per_cycle")]
    pub runs_per_cycle: usize,
    #[serde(default = "default_words_per_prompt")]
    pub words_per_prompt: usize,
    #[serde(default = "default_word_pool_size")]
    pub word_pool_size: usize,
    #[serde(default = "default_min_attempts")]
    pub min_attempts: u64,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_error_weight")]
    pub error_weight: f64,
    #[serde(default = "default_timing_weight")]
    pub timing_weight: f64,
    #[serde(default = "default_lifetime_min_attempts")]
    pub lifetime_min_attempts: u64,
    #[serde(default = "default_lifetime_seed_limit")]
    pub lifetime_seed_limit: usize,
    #[serde(default = "default_transition_delay_ms")]
    pub transition_delay_ms: u64,
    #[serde(default = "default_network_enabled")]
    pub network_enabled: bool,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_primary_word_url")]
    pub primary_word_url: String,
    #[serde(default = "default_secondary_word_url")]
    pub secondary_word_url: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_runs_per_cycle() -> usize {
    3
}
fn default_words_per_prompt() -> usize {
    10
}
fn default_word_pool_size() -> usize {
    50
}
fn default_min_attempts() -> u64 {
    DEFAULT_MIN_ATTEMPTS
}
fn default_top_n() -> usize {
    DEFAULT_TOP_N
}
fn default_error_weight() -> f64 {
    DEFAULT_ERROR_WEIGHT
}
fn default_timing_weight() -> f64 {
    DEFAULT_TIMING_WEIGHT
}
fn default_lifetime_min_attempts() -> u64 {
    LIFETIME_MIN_ATTEMPTS
}
fn default_lifetime_seed_limit() -> usize {
    10
}
fn default_transition_delay_ms() -> u64 {
    400
}
fn default_network_enabled() -> bool {
    true
}
fn default_fetch_timeout_secs() -> u64 {
    5
}
fn default_primary_word_url() -> String {
    "https://random-word-api.vercel.app/api?words={count}".to_string()
}
fn default_secondary_word_url() -> String {
    "https://random-word-api.herokuapp.com/word?number={count}".to_string()
}
fn default_theme() -> String {
    "default".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runs_per_cycle: default_runs_per_cycle(),
            words_per_prompt: default_words_per_prompt(),
            word_pool_size: default_word_pool_size(),
            min_attempts: default_min_attempts(),
            top_n: default_top_n(),
            error_weight: default_error_weight(),
            timing_weight: default_timing_weight(),
            lifetime_min_attempts: default_lifetime_min_attempts(),
            lifetime_seed_limit: default_lifetime_seed_limit(),
            transition_delay_ms: default_transition_delay_ms(),
            network_enabled: default_network_enabled(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            primary_word_url: default_primary_word_url(),
            secondary_word_url: default_secondary_word_url(),
            theme: default_theme(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Config::default())
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typecycle")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typecycle")
    }

    /// Clamp values into usable ranges. Call after deserialization or CLI overrides.
    pub fn validate(&mut self) {
        self.runs_per_cycle = self.runs_per_cycle.clamp(1, 10);
        self.words_per_prompt = self.words_per_prompt.clamp(1, 50);
        self.word_pool_size = self.word_pool_size.clamp(self.words_per_prompt, 500);
        self.min_attempts = self.min_attempts.max(1);
        self.top_n = self.top_n.clamp(1, 50);
        self.lifetime_min_attempts = self.lifetime_min_attempts.max(1);
        self.transition_delay_ms = self.transition_delay_ms.min(5_000);
        self.fetch_timeout_secs = self.fetch_timeout_secs.clamp(1, 30);
        if !self.error_weight.is_finite() || self.error_weight < 0.0 {
            self.error_weight = default_error_weight();
        }
        if !self.timing_weight.is_finite() || self.timing_weight < 0.0 {
            self.timing_weight = default_timing_weight();
        }
    }

    pub fn weakness_options(&self) -> WeaknessOptions {
        WeaknessOptions {
            min_attempts: self.min_attempts,
            top_n: self.top_n,
            error_weight: self.error_weight,
            timing_weight: self.timing_weight,
        }
    }

    pub fn prompt_settings(&self) -> PromptSettings {
        PromptSettings {
            count: self.runs_per_cycle,
            words_per_prompt: self.words_per_prompt,
            pool_size: self.word_pool_size,
        }
    }
}
