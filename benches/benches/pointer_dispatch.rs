// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::{Affine3A, Vec3};
use kurbo::Size;
use understory_pointer::camera::Camera;
use understory_pointer::dispatcher::EventSystem;
use understory_pointer::handlers::{HandlerMask, HandlerSet};
use understory_pointer::raycast::RaycastConfig;
use understory_pointer::resolver;
use understory_pointer::types::{EventName, InputKind, RawPointerEvent};
use understory_scene3d::{Aabb3, LocalNode, NodeId, Shape, Tree};

/// A stack of `n` cubes along -z under one group, all in front of the default camera.
fn stacked_tree(n: usize) -> (Tree, NodeId, Vec<NodeId>) {
    let mut tree = Tree::new();
    let group = tree.insert(None, LocalNode::default());
    let cubes = (0..n)
        .map(|i| {
            tree.insert(
                Some(group),
                LocalNode {
                    local_transform: Affine3A::from_translation(Vec3::new(
                        0.0,
                        0.0,
                        -(i as f32) * 2.0,
                    )),
                    shape: Some(Shape::Cuboid(Aabb3::from_center_half_extents(
                        Vec3::ZERO,
                        Vec3::splat(0.5),
                    ))),
                    ..Default::default()
                },
            )
        })
        .collect();
    let _ = tree.commit();
    (tree, group, cubes)
}

fn system(group: NodeId, cubes: &[NodeId]) -> EventSystem<NodeId> {
    let mut sys = EventSystem::new(Camera::default(), Size::new(800.0, 600.0));
    sys.handlers_mut().register(
        group,
        HandlerSet::new().with(EventName::Click, |e| {
            black_box(e.event_object());
        }),
    );
    for &cube in cubes {
        sys.handlers_mut().register(
            cube,
            HandlerSet::new()
                .with(EventName::PointerOver, |_| {})
                .with(EventName::PointerOut, |_| {})
                .with(EventName::PointerMove, |e| {
                    black_box(e.distance());
                }),
        );
    }
    sys
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("pointer_resolve");
    for &n in &[8_usize, 128] {
        let (tree, g, cubes) = stacked_tree(n);
        let sys = system(g, &cubes);
        let ray = sys.camera().ray_from_ndc(glam::Vec2::ZERO);
        let config = RaycastConfig::default();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("all_handlers_n{n}"), |b| {
            b.iter(|| {
                black_box(resolver::intersect(
                    &tree,
                    &ray,
                    sys.handlers(),
                    &config,
                    HandlerMask::all(),
                ))
            });
        });
    }
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("pointer_dispatch");
    for &n in &[8_usize, 128] {
        let (tree, g, cubes) = stacked_tree(n);
        let center = RawPointerEvent::at(400.0, 300.0).with_pointer_id(1);
        let away = RawPointerEvent::at(0.0, 0.0).with_pointer_id(1);
        group.throughput(Throughput::Elements(n as u64));

        let mut sys = system(g, &cubes);
        group.bench_function(format!("move_hover_toggle_n{n}"), |b| {
            b.iter(|| {
                sys.handle_pointer(&tree, InputKind::PointerMove, &center);
                sys.handle_pointer(&tree, InputKind::PointerMove, &away);
            });
        });

        let mut sys = system(g, &cubes);
        group.bench_function(format!("click_n{n}"), |b| {
            b.iter(|| {
                sys.handle_pointer(&tree, InputKind::PointerDown, &center);
                sys.handle_pointer(&tree, InputKind::PointerUp, &center);
                sys.handle_pointer(&tree, InputKind::Click, &center);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve, bench_dispatch);
criterion_main!(benches);
