// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene tree: node identifiers, flags, bounds, shapes, and local data.

use alloc::vec::Vec;
use glam::{Affine3A, Vec3};

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// ### Liveness
///
/// Use [`Tree::is_alive`](crate::Tree::is_alive) to check whether a `NodeId` still refers to a live node.
/// Stale `NodeId`s never alias a different live node because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Generation of the slot this identifier was issued for.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Node flags controlling visibility and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible.
        const VISIBLE  = 0b0000_0001;
        /// Node is pickable (participates in ray intersection).
        const PICKABLE = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// Axis-aligned box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb3 {
    /// Create a box from its corners. Callers keep `min <= max` per axis.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box centered on `center` extending `half_extents` along each axis.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Center of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Smallest box containing both boxes.
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns true if `p` lies inside or on the boundary.
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Conservative world-space box of this box under `transform`.
    pub fn transformed(&self, transform: &Affine3A) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let p = transform.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }
}

/// Pickable geometry attached to a node, in the node's local space.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// A solid box.
    Cuboid(Aabb3),
    /// A solid sphere.
    Sphere {
        /// Center in local space.
        center: Vec3,
        /// Radius in local units.
        radius: f32,
    },
    /// Several boxes sharing the node; the position of the box that was hit
    /// is reported as the hit's instance index.
    Instances(Vec<Aabb3>),
}

impl Shape {
    /// Local bounds of the shape, or `None` for an empty instance list.
    pub fn local_bounds(&self) -> Option<Aabb3> {
        match self {
            Self::Cuboid(b) => Some(*b),
            Self::Sphere { center, radius } => Some(Aabb3::from_center_half_extents(
                *center,
                Vec3::splat(*radius),
            )),
            Self::Instances(boxes) => boxes.iter().copied().reduce(Aabb3::union),
        }
    }
}

/// Local data for a node.
#[derive(Clone, Debug)]
pub struct LocalNode {
    /// Local transform relative to parent space.
    pub local_transform: Affine3A,
    /// Optional pickable geometry. Nodes without a shape act as groups.
    pub shape: Option<Shape>,
    /// Visibility and picking flags.
    pub flags: NodeFlags,
}

impl Default for LocalNode {
    fn default() -> Self {
        Self {
            local_transform: Affine3A::IDENTITY,
            shape: None,
            flags: NodeFlags::default(),
        }
    }
}
