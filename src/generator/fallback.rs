use std::sync::OnceLock;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::generator::normalize_words;

const FALLBACK_WORDS: &str = include_str!("../../assets/fallback-words.json");

/// Built-in word list, normalized and de-duplicated.
pub fn words() -> &'static [String] {
    static WORDS: OnceLock<Vec<String>> = OnceLock::new();
    WORDS.get_or_init(|| {
        let raw: Vec<String> = serde_json::from_str(FALLBACK_WORDS).unwrap_or_default();
        let mut words = normalize_words(raw);
        let mut seen = std::collections::HashSet::new();
        words.retain(|w| seen.insert(w.clone()));
        words
    })
}

/// Shuffled prefix of the built-in list.
pub fn sample<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<String> {
    let mut shuffled = words().to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}
