//! 🏆 Benchmarks for the top-K: the streaming offers and the final podium.
//!
//! Run with: cargo bench -p wcx

use std::collections::HashMap;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use wcx::top_k::{TopKSelector, materialize};

/// 📊 A skewed vocabulary: word `i` shows up roughly `n / (i + 1)` times.
fn zipf_counts(vocabulary: usize, n: u64) -> HashMap<String, u64> {
    (0..vocabulary)
        .map(|i| (format!("word{i}"), (n / (i as u64 + 1)).max(1)))
        .collect()
}

fn benchmark_streaming_offers(c: &mut Criterion) {
    let counts = zipf_counts(10_000, 1_000_000);
    let updates: Vec<(&str, u64)> = counts.iter().map(|(w, c)| (w.as_str(), *c)).collect();

    let mut group = c.benchmark_group("top_k_offer");
    for k in [10usize, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, &k| {
            b.iter(|| {
                let mut selector = TopKSelector::new(k);
                for (word, count) in &updates {
                    selector.offer(word, *count);
                }
                black_box(selector.len());
            })
        });
    }
    group.finish();
}

fn benchmark_materialize(c: &mut Criterion) {
    let counts = zipf_counts(50_000, 1_000_000);
    c.bench_function("top_k_materialize_50k_words", |b| {
        b.iter(|| black_box(materialize(black_box(&counts), 10)))
    });
}

criterion_group!(benches, benchmark_streaming_offers, benchmark_materialize);
criterion_main!(benches);
