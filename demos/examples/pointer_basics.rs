// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer basics.
//!
//! Two cubes under a group node. A click on the near cube bubbles to the group, which stops
//! propagation, and every delivery tells the other objects `onPointerMissed`. A click on empty
//! space reports a miss to every object and to the scene.
//!
//! Run:
//! - `cargo run -p understory_demos --example pointer_basics`

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Affine3A, Vec3};
use kurbo::Size;
use understory_pointer::camera::Camera;
use understory_pointer::dispatcher::EventSystem;
use understory_pointer::handlers::HandlerSet;
use understory_pointer::types::{EventName, InputKind, RawPointerEvent};
use understory_scene3d::{Aabb3, LocalNode, NodeId, Shape, Tree};

fn cube(z: f32) -> LocalNode {
    LocalNode {
        local_transform: Affine3A::from_translation(Vec3::new(0.0, 0.0, z)),
        shape: Some(Shape::Cuboid(Aabb3::from_center_half_extents(
            Vec3::ZERO,
            Vec3::splat(0.5),
        ))),
        ..Default::default()
    }
}

fn main() {
    let mut tree = Tree::new();
    let group = tree.insert(None, LocalNode::default());
    let near = tree.insert(Some(group), cube(0.0));
    let far = tree.insert(Some(group), cube(-3.0));
    let _ = tree.commit();
    let names = [(group, "group"), (near, "near"), (far, "far")];
    let name = move |id: NodeId| names.iter().find(|(n, _)| *n == id).map_or("?", |(_, s)| *s);

    let log: Rc<RefCell<Vec<String>>> = Rc::default();
    let mut events: EventSystem<NodeId> =
        EventSystem::new(Camera::default(), Size::new(800.0, 800.0));

    let on_click = log.clone();
    events.handlers_mut().register(
        group,
        HandlerSet::new().with(EventName::Click, move |e| {
            on_click.borrow_mut().push(format!(
                "click {} (hit {}, distance {:.2}, delta {})",
                name(e.event_object()),
                name(e.object()),
                e.distance(),
                e.delta(),
            ));
            e.stop_propagation();
        }),
    );
    let (on_click, on_missed) = (log.clone(), log.clone());
    events.handlers_mut().register(
        near,
        HandlerSet::new()
            .with(EventName::Click, move |e| {
                on_click
                    .borrow_mut()
                    .push(format!("click {}", name(e.event_object())));
            })
            .with_missed(move |_| on_missed.borrow_mut().push("missed near".into())),
    );
    let on_missed = log.clone();
    events.handlers_mut().register(
        far,
        HandlerSet::new().with_missed(move |_| on_missed.borrow_mut().push("missed far".into())),
    );
    let global = log.clone();
    events
        .handlers_mut()
        .set_on_pointer_missed(move |_| global.borrow_mut().push("missed (scene)".into()));

    let center = RawPointerEvent::at(400.0, 400.0);
    events.handle_pointer(&tree, InputKind::PointerDown, &center);
    events.handle_pointer(&tree, InputKind::Click, &center);
    println!("== Click center ==");
    for line in log.borrow_mut().drain(..) {
        println!("  {line}");
    }

    let corner = RawPointerEvent::at(10.0, 10.0);
    events.handle_pointer(&tree, InputKind::PointerDown, &corner);
    events.handle_pointer(&tree, InputKind::Click, &corner);
    println!("== Click corner ==");
    for line in log.borrow().iter() {
        println!("  {line}");
    }
    assert_eq!(
        *log.borrow(),
        ["missed near", "missed far", "missed (scene)"]
    );
}
