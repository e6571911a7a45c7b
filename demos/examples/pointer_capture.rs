// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer capture.
//!
//! A cube captures the pointer on pointer-down and keeps receiving moves after the pointer
//! slides off it, until pointer-up releases the capture.
//!
//! Run:
//! - `cargo run -p understory_demos --example pointer_capture`

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use kurbo::Size;
use understory_pointer::camera::Camera;
use understory_pointer::dispatcher::EventSystem;
use understory_pointer::handlers::HandlerSet;
use understory_pointer::types::{CaptureTarget, EventName, InputKind, RawPointerEvent};
use understory_scene3d::{LocalNode, NodeId, Shape, Tree};

/// Stands in for the canvas element of a windowing toolkit.
#[derive(Debug, Default)]
struct Canvas {
    captured: Vec<i32>,
}

impl CaptureTarget for Canvas {
    fn set_pointer_capture(&mut self, pointer_id: i32) {
        println!("  canvas: capture pointer {pointer_id}");
        self.captured.push(pointer_id);
    }

    fn release_pointer_capture(&mut self, pointer_id: i32) {
        println!("  canvas: release pointer {pointer_id}");
        self.captured.retain(|p| *p != pointer_id);
    }

    fn has_pointer_capture(&self, pointer_id: i32) -> bool {
        self.captured.contains(&pointer_id)
    }
}

fn main() {
    let mut tree = Tree::new();
    let handle = tree.insert(
        None,
        LocalNode {
            shape: Some(Shape::Sphere {
                center: Vec3::ZERO,
                radius: 0.5,
            }),
            ..Default::default()
        },
    );
    let _ = tree.commit();

    let log: Rc<RefCell<Vec<String>>> = Rc::default();
    let mut events: EventSystem<NodeId, Canvas> =
        EventSystem::new(Camera::default(), Size::new(800.0, 800.0));
    let _ = events.connect(Canvas::default());

    let on_move = log.clone();
    events.handlers_mut().register(
        handle,
        HandlerSet::new()
            .with(EventName::PointerDown, |e| {
                let id = e.pointer_id().unwrap_or(0);
                e.target().set_pointer_capture(id);
            })
            .with(EventName::PointerMove, move |e| {
                let p = e.unprojected_point();
                on_move.borrow_mut().push(format!(
                    "drag to ({:.2}, {:.2}), {} record(s)",
                    p.x,
                    p.y,
                    e.intersections().len()
                ));
            })
            .with(EventName::PointerUp, |e| {
                let id = e.pointer_id().unwrap_or(0);
                e.target().release_pointer_capture(id);
            }),
    );

    println!("== Pointer down on the sphere ==");
    events.handle_pointer(
        &tree,
        InputKind::PointerDown,
        &RawPointerEvent::at(400.0, 400.0).with_pointer_id(7),
    );

    println!("== Drag off the sphere ==");
    for x in [450.0, 600.0, 750.0] {
        events.handle_pointer(
            &tree,
            InputKind::PointerMove,
            &RawPointerEvent::at(x, 400.0).with_pointer_id(7),
        );
    }
    for line in log.borrow_mut().drain(..) {
        println!("  {line}");
    }

    println!("== Pointer up off the sphere ==");
    events.handle_pointer(
        &tree,
        InputKind::PointerUp,
        &RawPointerEvent::at(750.0, 400.0).with_pointer_id(7),
    );
    assert!(!events.captures().is_captured(7));

    events.handle_pointer(
        &tree,
        InputKind::PointerMove,
        &RawPointerEvent::at(750.0, 400.0).with_pointer_id(7),
    );
    assert!(log.borrow().is_empty(), "no moves once released");
}
