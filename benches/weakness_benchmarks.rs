use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use typecycle::engine::analyzer::analyze_runs;
use typecycle::engine::weakness::{WeaknessOptions, cycle_weaknesses, weak_bigram_names};
use typecycle::engine::sampler::sample_weighted;
use typecycle::generator::fallback;
use typecycle::session::run::{KeystrokeEvent, Run};

fn make_run(len: usize, seed: usize) -> Run {
    let chars: Vec<char> = "the quick brown fox jumps over the lazy dog".chars().collect();
    let events = (0..len)
        .map(|i| {
            let expected = chars[(i + seed) % chars.len()];
            // ~14% error rate
            let actual = if i % 7 == 0 { 'x' } else { expected };
            KeystrokeEvent::new(expected, actual, (i as u64) * (120 + (i % 40) as u64))
        })
        .collect();
    Run::new(events, 60.0, 86.0)
}

fn bench_analysis(c: &mut Criterion) {
    let runs: Vec<Run> = (0..3).map(|i| make_run(60, i * 11)).collect();

    c.bench_function("analyze_runs (3 runs x 60 keys)", |b| {
        b.iter(|| analyze_runs(black_box(&runs)))
    });
}

fn bench_ranking(c: &mut Criterion) {
    let runs: Vec<Run> = (0..3).map(|i| make_run(60, i * 11)).collect();
    let stats = analyze_runs(&runs);
    let options = WeaknessOptions::default();

    c.bench_function("cycle_weaknesses", |b| {
        b.iter(|| cycle_weaknesses(black_box(&stats), black_box(&options)))
    });
}

fn bench_sampling(c: &mut Criterion) {
    let runs: Vec<Run> = (0..3).map(|i| make_run(60, i * 11)).collect();
    let weak = weak_bigram_names(&cycle_weaknesses(&analyze_runs(&runs), &WeaknessOptions::default()));
    let pool: Vec<String> = fallback::words().to_vec();

    c.bench_function("sample_weighted (fallback pool, 30 words)", |b| {
        let mut rng = SmallRng::seed_from_u64(7);
        b.iter(|| sample_weighted(black_box(&pool), black_box(&weak), 30, &mut rng))
    });
}

criterion_group!(benches, bench_analysis, bench_ranking, bench_sampling);
criterion_main!(benches);
