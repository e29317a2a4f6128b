//! Benchmarks for handle selection (factorization) and per-frame solves.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use vdeform::{primitives, DeformConfig, Deformer, HandleAssignment, Transform, Vec3};

fn setup(rings: usize, segments: usize) -> (Deformer, HandleAssignment) {
    let mesh = primitives::tube(rings, segments, 8.0, 1.0);
    let n = mesh.num_vertices();
    let mut handles = HandleAssignment::new(n);
    handles.assign(&(0..segments).collect::<Vec<_>>());
    handles.assign(&(n - segments..n).collect::<Vec<_>>());
    let deformer = Deformer::with_mesh(mesh, DeformConfig::default()).unwrap();
    (deformer, handles)
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_handle_vertex_selection");
    for (rings, segments) in [(16, 16), (32, 32)] {
        group.bench_function(format!("tube_{rings}x{segments}"), |b| {
            b.iter_batched(
                || setup(rings, segments),
                |(mut deformer, handles)| {
                    deformer.update_handle_vertex_selection(black_box(&handles)).unwrap();
                    deformer
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let (mut deformer, handles) = setup(32, 32);
    deformer.update_handle_vertex_selection(&handles).unwrap();
    let mut targets = deformer.rest_targets().unwrap().to_vec();
    handles.transform_handle(1, &mut targets, &Transform::translation(Vec3::new(0.0, 1.0, 0.5)));

    let mut group = c.benchmark_group("per_frame");
    group.bench_function("deformed_smooth", |b| {
        b.iter(|| deformer.get_deformed_smooth_mesh(black_box(&targets)).unwrap())
    });
    group.bench_function("displacement", |b| {
        b.iter(|| deformer.get_deformed_mesh(black_box(&targets)).unwrap())
    });
    group.bench_function("deformation_transfer", |b| {
        b.iter(|| {
            deformer
                .get_deformed_mesh_deformation_transfer(black_box(&targets))
                .unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_selection, bench_frame);
criterion_main!(benches);
