use serde::{Deserialize, Serialize};

use crate::engine::bigram::BigramKey;
use crate::engine::sampler::score_word;

/// How many generated words contain at least one targeted bigram.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub total_words: usize,
    pub words_with_weak_bigrams: usize,
    pub percentage: u32,
}

pub fn coverage(prompts: &[String], weak: &[BigramKey]) -> Coverage {
    let (total_words, hits) = prompts
        .iter()
        .flat_map(|p| p.split_whitespace())
        .fold((0usize, 0usize), |(total, hits), word| {
            (total + 1, hits + usize::from(score_word(word, weak) > 0))
        });

    let percentage = if total_words == 0 {
        0
    } else {
        (100.0 * hits as f64 / total_words as f64).round() as u32
    };

    Coverage {
        total_words,
        words_with_weak_bigrams: hits,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weak(list: &[&str]) -> Vec<BigramKey> {
        list.iter().map(|b| BigramKey::try_from(*b).unwrap()).collect()
    }

    fn prompts(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn counts_each_word_once() {
        let cov = coverage(&prompts(&["thethe cat", "dog other"]), &weak(&["th", "he"]));
        assert_eq!(cov.total_words, 4);
        assert_eq!(cov.words_with_weak_bigrams, 2);
        assert_eq!(cov.percentage, 50);
    }

    #[test]
    fn rounds_percentage() {
        let cov = coverage(&prompts(&["the cat dog"]), &weak(&["th"]));
        assert_eq!(cov.percentage, 33);
        let cov = coverage(&prompts(&["the then dog"]), &weak(&["th"]));
        assert_eq!(cov.percentage, 67);
    }

    #[test]
    fn zero_without_weak_bigrams_or_words() {
        assert_eq!(coverage(&prompts(&["the cat"]), &[]).percentage, 0);
        let empty = coverage(&[], &weak(&["th"]));
        assert_eq!(empty, Coverage::default());
        assert_eq!(coverage(&prompts(&[""]), &weak(&["th"])).total_words, 0);
    }

    #[test]
    fn full_when_every_word_hits() {
        let cov = coverage(&prompts(&["the this", "that"]), &weak(&["th"]));
        assert_eq!(cov.percentage, 100);
    }
}
