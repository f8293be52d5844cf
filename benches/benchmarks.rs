use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use icon_ugrid::{BoundaryParams, Grid, normalize_icon_grid};

// A torus roughly the size of a coarse ICON grid.
fn large_torus() -> Grid {
    Grid::torus(256, 128, 1.0, 1.0).unwrap()
}

// Primitive Creation Benchmarks
fn bench_primitive_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitive_creation");

    group.bench_function("torus_16x13", |b| {
        b.iter(|| {
            let grid = Grid::torus(black_box(16), black_box(13), 5.0, 5.0).unwrap();
            black_box(grid);
        });
    });

    group.bench_function("torus_256x128", |b| {
        b.iter(|| {
            black_box(large_torus());
        });
    });

    group.finish();
}

// Classification and pruning benchmarks
fn bench_boundary(c: &mut Criterion) {
    let mut group = c.benchmark_group("boundary");
    let torus = large_torus();
    let params = BoundaryParams::default();

    group.bench_function("boundary_faces", |b| {
        b.iter(|| {
            let faces = torus.boundary_faces(black_box(&params)).unwrap();
            black_box(faces);
        });
    });

    group.bench_function("remove_boundary_faces", |b| {
        b.iter(|| {
            let pruned = torus.remove_boundary_faces().unwrap();
            black_box(pruned);
        });
    });

    group.finish();
}

// UGRID conversion benchmarks
fn bench_ugrid(c: &mut Criterion) {
    let mut group = c.benchmark_group("ugrid");
    let torus = large_torus();
    let ds = torus.to_ugrid().unwrap();

    group.bench_function("to_ugrid", |b| {
        b.iter(|| {
            black_box(torus.to_ugrid().unwrap());
        });
    });

    group.bench_function("from_ugrid", |b| {
        b.iter(|| {
            black_box(Grid::from_ugrid(black_box(&ds)).unwrap());
        });
    });

    group.bench_function("normalize", |b| {
        b.iter(|| {
            let mut ds = ds.clone();
            normalize_icon_grid(&mut ds).unwrap();
            black_box(ds);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_primitive_creation, bench_boundary, bench_ugrid);
criterion_main!(benches);
