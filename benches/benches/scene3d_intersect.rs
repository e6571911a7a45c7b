// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::{Affine3A, Vec3};
use understory_scene3d::{Aabb3, LocalNode, NodeId, QueryFilter, Ray, Shape, Tree};

/// An `n * n` grid of unit cubes in the z=0 plane, grouped into rows.
fn grid_tree(n: usize) -> (Tree, Vec<NodeId>, Vec<NodeId>) {
    let mut tree = Tree::new();
    let root = tree.insert(None, LocalNode::default());
    let mut rows = Vec::with_capacity(n);
    let mut cubes = Vec::with_capacity(n * n);
    for y in 0..n {
        let row = tree.insert(
            Some(root),
            LocalNode {
                local_transform: Affine3A::from_translation(Vec3::new(0.0, y as f32 * 2.0, 0.0)),
                ..Default::default()
            },
        );
        rows.push(row);
        for x in 0..n {
            cubes.push(tree.insert(
                Some(row),
                LocalNode {
                    local_transform: Affine3A::from_translation(Vec3::new(
                        x as f32 * 2.0,
                        0.0,
                        0.0,
                    )),
                    shape: Some(Shape::Cuboid(Aabb3::from_center_half_extents(
                        Vec3::ZERO,
                        Vec3::splat(0.5),
                    ))),
                    ..Default::default()
                },
            ));
        }
    }
    let _ = tree.commit();
    (tree, rows, cubes)
}

fn pick_filter() -> QueryFilter {
    QueryFilter {
        visible_only: true,
        pickable_only: true,
    }
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene3d_commit");
    for &n in &[16_usize, 64] {
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("full_n{n}"), |b| {
            b.iter_batched(
                || grid_tree(n),
                |(mut tree, rows, _)| {
                    for row in &rows {
                        tree.set_local_transform(*row, Affine3A::from_translation(Vec3::Z));
                    }
                    black_box(tree.commit());
                },
                BatchSize::LargeInput,
            );
        });
        group.bench_function(format!("single_leaf_n{n}"), |b| {
            b.iter_batched(
                || grid_tree(n),
                |(mut tree, _, cubes)| {
                    tree.set_local_transform(cubes[0], Affine3A::from_translation(Vec3::Z));
                    black_box(tree.commit());
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_intersect(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene3d_intersect");
    for &n in &[16_usize, 64] {
        let (tree, rows, cubes) = grid_tree(n);
        let ray = Ray::new(Vec3::new(2.0, 2.0, 10.0), Vec3::NEG_Z);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("leaves_n{n}"), |b| {
            b.iter(|| black_box(tree.intersect(&ray, &cubes, false, pick_filter())));
        });
        group.bench_function(format!("rows_recursive_n{n}"), |b| {
            b.iter(|| black_box(tree.intersect(&ray, &rows, true, pick_filter())));
        });
        group.bench_function(format!("all_n{n}"), |b| {
            b.iter(|| black_box(tree.intersect_all(&ray, pick_filter())));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_commit, bench_intersect);
criterion_main!(benches);
