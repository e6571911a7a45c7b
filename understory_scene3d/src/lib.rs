// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Scene3D: a Glam-native 3D node tree with ray intersection.
//!
//! This crate is the geometry half of a 3D picking stack. It owns a hierarchy of nodes with
//! local transforms, optional pickable shapes, and visibility/picking flags, and answers
//! "which shapes does this ray pass through, nearest first?".
//!
//! - Nodes are addressed by generational [`NodeId`] handles; stale handles never alias live nodes.
//! - World transforms and bounds are recomputed lazily by [`Tree::commit`].
//! - [`Tree::intersect`] tests a ray against a set of candidate nodes (optionally recursing into
//!   their subtrees) and returns [`RayHit`]s sorted by distance.
//!
//! It does not dispatch events. Pair it with `understory_pointer` (feature `scene3d_adapter`)
//! to get DOM-style pointer events over the tree.
//!
//! ## API overview
//!
//! - [`Tree`]: container managing nodes, transforms, and world data.
//! - [`LocalNode`]: per-node local data (transform, shape, flags).
//! - [`Shape`]: pickable geometry (box, sphere, or instanced boxes).
//! - [`Ray`] / [`RayHit`]: query input and output.
//! - [`QueryFilter`]: restricts results to visible and/or pickable nodes.
//!
//! ## Minimal usage
//!
//! ```
//! use glam::{Affine3A, Vec3};
//! use understory_scene3d::{Aabb3, LocalNode, QueryFilter, Ray, Shape, Tree};
//!
//! let mut tree = Tree::new();
//! let root = tree.insert(None, LocalNode::default());
//! let cube = tree.insert(
//!     Some(root),
//!     LocalNode {
//!         local_transform: Affine3A::from_translation(Vec3::new(0.0, 0.0, -5.0)),
//!         shape: Some(Shape::Cuboid(Aabb3::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5)))),
//!         ..Default::default()
//!     },
//! );
//! let _ = tree.commit();
//!
//! let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
//! let filter = QueryFilter { visible_only: true, pickable_only: true };
//! let hits = tree.intersect(&ray, &[root], true, filter);
//! assert_eq!(hits[0].node, cube);
//! assert!((hits[0].distance - 4.5).abs() < 1e-4);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod ray;
mod tree;
mod types;

pub use ray::{Ray, RayHit};
pub use tree::{QueryFilter, Tree};
pub use types::{Aabb3, LocalNode, NodeFlags, NodeId, Shape};
