// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover tracking.
//!
//! Moves the pointer across a row of cubes and prints over/out transitions. The last step
//! shows `stop_propagation` on the front cube clearing hover on the one behind it.
//!
//! Run:
//! - `cargo run -p understory_demos --example pointer_hover`

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::{Affine3A, Vec3};
use kurbo::Size;
use understory_pointer::camera::Camera;
use understory_pointer::dispatcher::EventSystem;
use understory_pointer::handlers::HandlerSet;
use understory_pointer::types::{EventName, InputKind, RawPointerEvent};
use understory_scene3d::{Aabb3, LocalNode, NodeId, Shape, Tree};

fn cube(x: f32, z: f32) -> LocalNode {
    LocalNode {
        local_transform: Affine3A::from_translation(Vec3::new(x, 0.0, z)),
        shape: Some(Shape::Cuboid(Aabb3::from_center_half_extents(
            Vec3::ZERO,
            Vec3::splat(0.5),
        ))),
        ..Default::default()
    }
}

fn main() {
    let mut tree = Tree::new();
    let left = tree.insert(None, cube(-1.5, 0.0));
    let front = tree.insert(None, cube(0.0, 0.0));
    let back = tree.insert(None, cube(0.0, -3.0));
    let _ = tree.commit();
    let names = [(left, "left"), (front, "front"), (back, "back")];
    let name = move |id: NodeId| names.iter().find(|(n, _)| *n == id).map_or("?", |(_, s)| *s);

    let log: Rc<RefCell<Vec<String>>> = Rc::default();
    let blocking = Rc::new(Cell::new(false));
    let mut events: EventSystem<NodeId> =
        EventSystem::new(Camera::default(), Size::new(800.0, 800.0));
    for id in [left, front, back] {
        let (over, out, blocking) = (log.clone(), log.clone(), blocking.clone());
        events.handlers_mut().register(
            id,
            HandlerSet::new()
                .with(EventName::PointerOver, move |e| {
                    over.borrow_mut().push(format!("over {}", name(e.event_object())));
                })
                .with(EventName::PointerOut, move |e| {
                    out.borrow_mut().push(format!("out {}", name(e.event_object())));
                })
                .with(EventName::PointerMove, move |e| {
                    if blocking.get() && e.event_object() == front {
                        e.stop_propagation();
                    }
                }),
        );
    }

    let steps = [
        ("center", RawPointerEvent::at(400.0, 400.0)),
        ("left cube", RawPointerEvent::at(235.0, 400.0)),
        ("nothing", RawPointerEvent::at(20.0, 20.0)),
        ("center", RawPointerEvent::at(400.0, 400.0)),
    ];
    for (label, event) in &steps {
        events.handle_pointer(&tree, InputKind::PointerMove, event);
        println!("== Move to {label} ==");
        for line in log.borrow_mut().drain(..) {
            println!("  {line}");
        }
    }

    blocking.set(true);
    events.handle_pointer(&tree, InputKind::PointerMove, &steps[3].1);
    println!("== Front cube stops propagation ==");
    for line in log.borrow_mut().drain(..) {
        println!("  {line}");
    }
    assert_eq!(events.hovered().len(), 1);

    events.handle_pointer(&tree, InputKind::PointerLeave, &steps[3].1);
    println!("== Pointer leaves the canvas ==");
    for line in log.borrow().iter() {
        println!("  {line}");
    }
    assert!(events.hovered().is_empty());
}
