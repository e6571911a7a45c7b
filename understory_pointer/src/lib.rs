// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_pointer --heading-base-level=0

//! Understory Pointer: DOM-style pointer events for 3D scene graphs.
//!
//! ## Overview
//!
//! This crate turns raw pointer, mouse and wheel input on a viewport into handler invocations
//! on the objects of a 3D scene: `onClick`, `onPointerOver`, `onPointerMove`, and the rest of the
//! DOM family. It casts a ray from the camera through the pointer, bubbles each hit up the
//! object's ancestors, tracks hover across moves, and honors pointer capture.
//!
//! It does not own geometry. Implement [`SceneGraph`](crate::types::SceneGraph) for your scene
//! (ray test plus parent lookup), or enable `scene3d_adapter` to use `understory_scene3d`.
//!
//! ## Pieces
//!
//! - [`EventSystem`](crate::dispatcher::EventSystem): the engine. Feed it inputs with
//!   [`handle_pointer`](crate::dispatcher::EventSystem::handle_pointer).
//! - [`HandlerSet`](crate::handlers::HandlerSet) / [`HandlerRegistry`](crate::handlers::HandlerRegistry):
//!   per-object handler tables. An object takes part in picking only while it has one.
//! - [`PointerEvent`](crate::event::PointerEvent): what handlers receive, including
//!   `stop_propagation` and pointer capture through [`target`](crate::event::PointerEvent::target).
//! - [`Camera`](crate::camera::Camera): perspective or orthographic picking camera.
//! - [`resolver`]: the hit pipeline on its own, for callers that only need ordered records.
//!
//! ## Ordering
//!
//! Every input produces a flat list of records: for each primitive hit, nearest first, one
//! record for the hit object and one for each ancestor that has handlers. Objects holding the
//! pointer's capture are appended at the end. Handlers run in that order until one calls
//! `stop_propagation`.
//!
//! ## Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use glam::Vec3;
//! use kurbo::Size;
//! use understory_pointer::camera::Camera;
//! use understory_pointer::dispatcher::EventSystem;
//! use understory_pointer::handlers::HandlerSet;
//! use understory_pointer::types::{EventName, InputKind, RawHit, RawPointerEvent, Ray, SceneGraph};
//!
//! /// Unit spheres centered on the -z axis, keyed by index.
//! struct Spheres(Vec<f32>);
//!
//! impl SceneGraph for Spheres {
//!     type Object = usize;
//!
//!     fn intersect(&self, ray: &Ray, candidates: &[usize], _recursive: bool) -> Vec<RawHit<usize>> {
//!         let mut hits: Vec<_> = candidates
//!             .iter()
//!             .filter_map(|&i| {
//!                 let center = Vec3::new(0.0, 0.0, self.0[i]);
//!                 let t = (center - ray.origin).dot(ray.direction);
//!                 let closest = ray.at(t);
//!                 (closest.distance(center) <= 1.0).then(|| RawHit {
//!                     object: i,
//!                     index: None,
//!                     distance: t - 1.0,
//!                     point: ray.at(t - 1.0),
//!                     face: None,
//!                 })
//!             })
//!             .collect();
//!         hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
//!         hits
//!     }
//!
//!     fn parent_of(&self, _object: &usize) -> Option<usize> {
//!         None
//!     }
//! }
//!
//! let scene = Spheres(vec![-10.0, -4.0]);
//! let mut events: EventSystem<usize> = EventSystem::new(Camera::default(), Size::new(640.0, 480.0));
//!
//! let clicked = Rc::new(Cell::new(None));
//! for object in [0, 1] {
//!     let clicked = clicked.clone();
//!     events.handlers_mut().register(
//!         object,
//!         HandlerSet::new().with(EventName::Click, move |e| {
//!             clicked.set(Some(e.event_object()));
//!             e.stop_propagation();
//!         }),
//!     );
//! }
//!
//! let center = RawPointerEvent::at(320.0, 240.0);
//! events.handle_pointer(&scene, InputKind::PointerDown, &center);
//! events.handle_pointer(&scene, InputKind::Click, &center);
//! // The nearer sphere stopped propagation.
//! assert_eq!(clicked.get(), Some(1));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapters;
pub mod camera;
pub mod capture;
pub mod dispatcher;
pub mod event;
pub mod handlers;
pub mod hover;
pub mod raycast;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod testing;
