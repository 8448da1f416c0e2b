//! Performance benchmarks

use aircast::index::{resolve_partial_path, FlatTree, TreeNode};
use aircast::scheme::compare_schemes;
use aircast::CachingConfig;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn benchmark_caching(c: &mut Criterion) {
    let broadcast: String = "ABACADEFAGHABCIJ".repeat(8);
    let requests: String = "ABCDEFGHIJAABBCC".repeat(32);
    let config = CachingConfig::new(&broadcast, &requests, 4).expect("valid config");

    c.bench_function("compare_schemes_512_requests", |b| {
        b.iter(|| black_box(compare_schemes(black_box(&config)).expect("comparison succeeds")));
    });
}

fn benchmark_indexing(c: &mut Criterion) {
    let tree = FlatTree::flatten(&TreeNode::standard()).expect("standard tree flattens");

    c.bench_function("partial_path_level_b", |b| {
        b.iter(|| black_box(resolve_partial_path(&tree, black_box(40), "b3").expect("resolves")));
    });
}

criterion_group!(benches, benchmark_caching, benchmark_indexing);
criterion_main!(benches);
