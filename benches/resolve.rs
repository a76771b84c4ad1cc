//! Resolution and evaluation benchmarks.
//!
//! Resolution is a per-parameter scan over the region stack, so cost
//! scales with nesting depth; the deep-stack cases bound the worst
//! case where no region specifies anything and the scan never
//! terminates early.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use oxacc::ast::Predicate;
use oxacc::exec::match_count;
use oxacc::resolve::{resolve, ClauseValue, RegionAnnotation, RegionStack};

/// Build a stack of the given depth where only the outermost frame
/// specifies anything, forcing a full scan.
fn deep_stack(depth: usize) -> RegionStack {
    let mut stack = RegionStack::new();
    stack.push(RegionAnnotation {
        num_gangs: ClauseValue::Specified(2),
        num_workers: ClauseValue::Specified(8),
        vector_length: ClauseValue::Specified(4),
    });
    for _ in 1..depth {
        stack.push(RegionAnnotation::default());
    }
    stack
}

fn bench_resolve(c: &mut Criterion) {
    let shallow = deep_stack(4);
    let deep = deep_stack(64);
    let pathological = deep_stack(1024);

    let mut group = c.benchmark_group("resolve");
    group.bench_function("depth_4", |b| b.iter(|| resolve(black_box(&shallow))));
    group.bench_function("depth_64", |b| b.iter(|| resolve(black_box(&deep))));
    group.bench_function("depth_1024", |b| {
        b.iter(|| resolve(black_box(&pathological)))
    });
    group.finish();
}

fn bench_match_count(c: &mut Criterion) {
    let shape = resolve(&deep_stack(2));

    let mut group = c.benchmark_group("match_count");
    group.bench_function("extent_10", |b| {
        b.iter(|| match_count(black_box(&shape), black_box(10), Predicate::Diagonal))
    });
    group.bench_function("extent_100", |b| {
        b.iter(|| match_count(black_box(&shape), black_box(100), Predicate::OffDiagonal))
    });
    group.finish();
}

criterion_group!(benches, bench_resolve, bench_match_count);
criterion_main!(benches);
