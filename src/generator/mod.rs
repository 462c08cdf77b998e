pub mod fallback;
pub mod remote;

use rand::SeedableRng;
use rand::rngs::SmallRng;

pub use remote::RemoteWordSource;

pub const MIN_WORD_LEN: usize = 3;
pub const MAX_WORD_LEN: usize = 10;

/// Supplies the candidate pool that prompts are sampled from.
///
/// Implementations must return a non-empty list in bounded time.
pub trait WordSource {
    fn fetch_words(&mut self, count: usize) -> Vec<String>;
}

/// Keep lowercase ASCII alphabetic words of 3 to 10 characters.
pub fn normalize_words<I, S>(words: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .filter(|w| {
            let len = w.chars().count();
            (MIN_WORD_LEN..=MAX_WORD_LEN).contains(&len) && w.chars().all(|c| c.is_ascii_alphabetic())
        })
        .collect()
}

/// Serves the built-in list only. Used offline and in tests.
pub struct StaticWordSource {
    rng: SmallRng,
}

impl StaticWordSource {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for StaticWordSource {
    fn default() -> Self {
        Self::new()
    }
}

impl WordSource for StaticWordSource {
    fn fetch_words(&mut self, count: usize) -> Vec<String> {
        fallback::sample(count, &mut self.rng)
    }
}
