use rand::Rng;

use crate::engine::bigram::BigramKey;
use crate::engine::sampler::sample_weighted;
use crate::generator::WordSource;

pub const DEFAULT_WORDS_PER_PROMPT: usize = 10;
pub const DEFAULT_WORD_POOL_SIZE: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PromptSettings {
    /// Prompts per generation call, normally the cycle length.
    pub count: usize,
    pub words_per_prompt: usize,
    /// Words requested from the source once per call.
    pub pool_size: usize,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            count: 3,
            words_per_prompt: DEFAULT_WORDS_PER_PROMPT,
            pool_size: DEFAULT_WORD_POOL_SIZE,
        }
    }
}

/// Build `count` prompts from one shared pool. Each prompt is sampled
/// independently, so two prompts may repeat words or even match.
pub fn build_prompts<R: Rng + ?Sized>(
    pool: &[String],
    weak: &[BigramKey],
    count: usize,
    words_per_prompt: usize,
    rng: &mut R,
) -> Vec<String> {
    (0..count)
        .map(|_| sample_weighted(pool, weak, words_per_prompt, rng).join(" "))
        .collect()
}

/// Fetch one word pool and turn it into a batch of prompts.
pub fn generate_prompts<R: Rng + ?Sized>(
    source: &mut dyn WordSource,
    weak: &[BigramKey],
    settings: &PromptSettings,
    rng: &mut R,
) -> Vec<String> {
    let pool = source.fetch_words(settings.pool_size);
    build_prompts(&pool, weak, settings.count, settings.words_per_prompt, rng)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::generator::StaticWordSource;

    struct CountingSource {
        calls: usize,
        words: Vec<String>,
    }

    impl WordSource for CountingSource {
        fn fetch_words(&mut self, _count: usize) -> Vec<String> {
            self.calls += 1;
            self.words.clone()
        }
    }

    #[test]
    fn test_pool_fetched_once_per_call() {
        let mut source = CountingSource {
            calls: 0,
            words: ["alpha", "beta", "gamma", "delta"].map(String::from).to_vec(),
        };
        let mut rng = SmallRng::seed_from_u64(5);
        let settings = PromptSettings {
            count: 4,
            words_per_prompt: 3,
            pool_size: 50,
        };
        let prompts = generate_prompts(&mut source, &[], &settings, &mut rng);
        assert_eq!(source.calls, 1);
        assert_eq!(prompts.len(), 4);
        for p in &prompts {
            assert_eq!(p.split(' ').count(), 3);
        }
    }

    #[test]
    fn test_prompts_join_with_single_spaces() {
        let mut source = StaticWordSource::seeded(11);
        let mut rng = SmallRng::seed_from_u64(11);
        let weak = vec![BigramKey::new('t', 'h')];
        let prompts = generate_prompts(&mut source, &weak, &PromptSettings::default(), &mut rng);
        assert_eq!(prompts.len(), 3);
        for p in &prompts {
            assert!(!p.contains("  "));
            assert!(!p.starts_with(' ') && !p.ends_with(' '));
            assert_eq!(p.split(' ').count(), DEFAULT_WORDS_PER_PROMPT);
        }
    }

    #[test]
    fn test_short_pool_gives_short_prompts() {
        let pool = vec!["only".to_string(), "two".to_string()];
        let mut rng = SmallRng::seed_from_u64(2);
        let prompts = build_prompts(&pool, &[BigramKey::new('o', 'n')], 2, 10, &mut rng);
        assert_eq!(prompts.len(), 2);
        assert!(prompts.iter().all(|p| p.split(' ').count() == 2));
    }
}
