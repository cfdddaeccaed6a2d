//! Performance benchmarks for analysis, transforms and scheduling.
//!
//! Run with: `cargo bench --bench analysis`
//!
//! ## Workloads
//!
//! | Benchmark | Graph | Notes |
//! |-----------|-------|-------|
//! | toposort | layered vertices | Generic DFS via `parent_vertices` |
//! | dag_view | layered vertices | Unified vertex/edge traversal |
//! | transform | layered vertices | Cold fold vs fully seeded fold |
//! | scheduler | layered vertices | Full start/finish drain |

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use dag_kernel::{toposort, transform, DagView, Scheduler, Vertex};

/// Layered graph where each vertex depends on up to `fan_in` vertices of the
/// previous layer. Returns the last layer (the roots).
fn layered(layers: usize, width: usize, fan_in: usize) -> Vec<Vertex> {
    let mut prev: Vec<Vertex> = (0..width).map(|i| Vertex::labeled(i)).collect();
    for layer in 1..layers {
        let next = (0..width)
            .map(|i| {
                let edges: Vec<_> = (0..fan_in).map(|k| prev[(i + k) % width].edge()).collect();
                Vertex::new(Some(format!("{layer}:{i}").into()), edges, None)
                    .expect("unlabeled edges never conflict")
            })
            .collect();
        prev = next;
    }
    prev
}

const SIZES: [usize; 3] = [10, 50, 200];

fn bench_toposort(c: &mut Criterion) {
    let mut group = c.benchmark_group("toposort");

    for layers in SIZES {
        let roots = layered(layers, 20, 3);
        group.throughput(Throughput::Elements((layers * 20) as u64));
        group.bench_with_input(BenchmarkId::new("layers", layers), &roots, |b, roots| {
            b.iter(|| toposort(black_box(roots.clone()), Vertex::parent_vertices).unwrap())
        });
    }

    group.finish();
}

fn bench_dag_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("dag_view");

    for layers in SIZES {
        let roots = layered(layers, 20, 3);
        group.throughput(Throughput::Elements((layers * 20) as u64));
        group.bench_with_input(BenchmarkId::new("layers", layers), &roots, |b, roots| {
            b.iter(|| DagView::from_roots(black_box(roots.clone())).unwrap())
        });
    }

    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    let depth = |_: &Vertex, ps: &[u32]| ps.iter().max().map_or(0, |d| d + 1);

    for layers in SIZES {
        let roots = layered(layers, 20, 3);
        let cold = transform(
            roots.clone(),
            Vertex::parent_vertices,
            depth,
            |_, _, d: &u32| *d,
            &HashMap::new(),
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::new("cold", layers), &roots, |b, roots| {
            b.iter(|| {
                transform(
                    black_box(roots.clone()),
                    Vertex::parent_vertices,
                    depth,
                    |_, _, d: &u32| *d,
                    &HashMap::new(),
                )
                .unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("seeded", layers), &roots, |b, roots| {
            b.iter(|| {
                transform(
                    black_box(roots.clone()),
                    Vertex::parent_vertices,
                    depth,
                    |_, _, d: &u32| *d,
                    &cold.vertex_values,
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler");

    for layers in SIZES {
        let roots = layered(layers, 20, 3);
        group.throughput(Throughput::Elements((layers * 20) as u64));
        group.bench_with_input(BenchmarkId::new("drain", layers), &roots, |b, roots| {
            b.iter(|| {
                let mut s = Scheduler::new(roots.clone()).unwrap();
                while !s.is_done() {
                    for v in s.start(Some(8)) {
                        s.finish(&v).unwrap();
                    }
                }
                s
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_toposort,
    bench_dag_view,
    bench_transform,
    bench_scheduler,
);
criterion_main!(benches);
