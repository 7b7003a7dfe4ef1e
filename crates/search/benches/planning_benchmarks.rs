use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use prodsearch_search::{SearchQuery, plan};

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");

    for words in [1usize, 4, 16, 64] {
        let text = (0..words)
            .map(|i| format!("token{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let query = SearchQuery::new(text, 0.35);

        // Proximity only: the common case when the first strategy hits.
        group.bench_with_input(BenchmarkId::new("first_strategy", words), &query, |b, q| {
            b.iter(|| black_box(plan(q).next()))
        });

        // Full fallback chain.
        group.bench_with_input(BenchmarkId::new("full_chain", words), &query, |b, q| {
            b.iter(|| black_box(plan(q).collect::<Vec<_>>()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_plan);
criterion_main!(benches);
