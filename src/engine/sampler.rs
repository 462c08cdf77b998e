use rand::Rng;
use rand::seq::SliceRandom;

use crate::engine::bigram::{BigramKey, bigrams};

/// Number of weak bigram occurrences in `word` (lowercased). Repeats count.
pub fn score_word(word: &str, weak: &[BigramKey]) -> usize {
    if weak.is_empty() {
        return 0;
    }
    let lowered = word.to_lowercase();
    bigrams(&lowered).filter(|b| weak.contains(b)).count()
}

/// Uniform sample of up to `count` distinct pool words.
pub fn sample_uniform<R: Rng + ?Sized>(pool: &[String], count: usize, rng: &mut R) -> Vec<String> {
    pool.choose_multiple(rng, count).cloned().collect()
}

/// Draw up to `count` pool words without replacement, each draw picking a
/// remaining word with probability proportional to `score + 1`.
///
/// The `+ 1` keeps score-zero words in play. With no weak bigrams this
/// degenerates to [`sample_uniform`].
pub fn sample_weighted<R: Rng + ?Sized>(
    pool: &[String],
    weak: &[BigramKey],
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    if weak.is_empty() {
        return sample_uniform(pool, count, rng);
    }

    // Working copy of (pool index, weight); drawn slots are swap-removed.
    let mut remaining: Vec<(usize, f64)> = pool
        .iter()
        .enumerate()
        .map(|(i, w)| (i, (score_word(w, weak) + 1) as f64))
        .collect();
    let mut total: f64 = remaining.iter().map(|(_, w)| w).sum();
    let mut selected = Vec::with_capacity(count.min(pool.len()));

    while selected.len() < count && !remaining.is_empty() {
        let slot = roulette(&remaining, total, rng);
        let (idx, weight) = remaining.swap_remove(slot);
        total -= weight;
        selected.push(pool[idx].clone());
    }

    selected
}

/// Cumulative-weight pick: walk the candidates subtracting weights from a
/// uniform draw in `[0, total)` until it is spent.
fn roulette<R: Rng + ?Sized>(candidates: &[(usize, f64)], total: f64, rng: &mut R) -> usize {
    let mut target = if total > 0.0 {
        rng.gen_range(0.0..total)
    } else {
        0.0
    };
    for (slot, (_, weight)) in candidates.iter().enumerate() {
        target -= weight;
        if target <= 0.0 {
            return slot;
        }
    }
    // Float drift in `total` can leave a sliver; the last candidate owns it.
    candidates.len() - 1
}
