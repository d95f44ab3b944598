use criterion::{criterion_group, criterion_main, Criterion};
use kd_index::{KDTree, KDTreeBuilder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const NUM_POINTS: usize = 100_000;

fn random_points(n: usize, seed: u64) -> Vec<[f64; 2]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| [rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)])
        .collect()
}

fn construct_tree(points: &[[f64; 2]]) -> KDTree<f64, ()> {
    let mut builder = KDTreeBuilder::new(2);
    for p in points {
        builder.add(p, ()).unwrap();
    }
    builder.finish().unwrap()
}

/// The O(N) scan baseline the tree is supposed to beat.
fn brute_nearest(points: &[[f64; 2]], query: &[f64; 2], k: usize) -> Vec<usize> {
    let mut order: Vec<(f64, usize)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let dx = p[0] - query[0];
            let dy = p[1] - query[1];
            (dx * dx + dy * dy, i)
        })
        .collect();
    order.sort_by(|a, b| a.partial_cmp(b).unwrap());
    order.truncate(k);
    order.into_iter().map(|(_, i)| i).collect()
}

fn brute_within(points: &[[f64; 2]], query: &[f64; 2], r: f64) -> Vec<usize> {
    let r2 = r * r;
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| {
            let dx = p[0] - query[0];
            let dy = p[1] - query[1];
            dx * dx + dy * dy <= r2
        })
        .map(|(i, _)| i)
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let points = random_points(NUM_POINTS, 48);
    let queries = random_points(100, 1848);
    let tree = construct_tree(&points);

    c.bench_function("construction (100k points)", |b| {
        b.iter(|| construct_tree(&points))
    });

    c.bench_function("nearest k=3 (tree)", |b| {
        b.iter(|| {
            for query in &queries {
                tree.nearest(query, 3).unwrap();
            }
        })
    });

    c.bench_function("nearest k=3 (brute force)", |b| {
        b.iter(|| {
            for query in &queries {
                brute_nearest(&points, query, 3);
            }
        })
    });

    c.bench_function("within r=0.05 (tree)", |b| {
        b.iter(|| {
            for query in &queries {
                tree.within(query, 0.05).unwrap();
            }
        })
    });

    c.bench_function("within r=0.05 (brute force)", |b| {
        b.iter(|| {
            for query in &queries {
                brute_within(&points, query, 0.05);
            }
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
