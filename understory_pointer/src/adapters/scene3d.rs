// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapter for Understory Scene3D.
//!
//! ## Feature
//!
//! Enable with `scene3d_adapter`.
//!
//! ## Notes
//!
//! [`Tree`] implements [`SceneGraph`] directly, testing only nodes that are both visible and
//! pickable. Wrap it in [`Scene3dGraph`] to pick with a different [`QueryFilter`].
//! The tree must be [committed](Tree::commit) before it is handed to the event system; world
//! data is read as of the last commit.

use alloc::vec::Vec;

use understory_scene3d::{NodeId, QueryFilter, RayHit, Tree};

use crate::types::{Face, RawHit, Ray, SceneGraph};

/// A [`Tree`] paired with the filter used for picking.
#[derive(Clone, Copy, Debug)]
pub struct Scene3dGraph<'t> {
    tree: &'t Tree,
    filter: QueryFilter,
}

impl<'t> Scene3dGraph<'t> {
    /// Pick visible, pickable nodes of `tree`.
    pub fn new(tree: &'t Tree) -> Self {
        Self::with_filter(tree, pick_filter())
    }

    /// Pick nodes of `tree` passing `filter`.
    pub fn with_filter(tree: &'t Tree, filter: QueryFilter) -> Self {
        Self { tree, filter }
    }

    /// The wrapped tree.
    pub fn tree(&self) -> &'t Tree {
        self.tree
    }
}

impl SceneGraph for Scene3dGraph<'_> {
    type Object = NodeId;

    fn intersect(&self, ray: &Ray, candidates: &[NodeId], recursive: bool) -> Vec<RawHit<NodeId>> {
        let ray = understory_scene3d::Ray::new(ray.origin, ray.direction);
        self.tree
            .intersect(&ray, candidates, recursive, self.filter)
            .into_iter()
            .map(raw_hit)
            .collect()
    }

    fn parent_of(&self, object: &NodeId) -> Option<NodeId> {
        self.tree.parent(*object)
    }
}

impl SceneGraph for Tree {
    type Object = NodeId;

    fn intersect(&self, ray: &Ray, candidates: &[NodeId], recursive: bool) -> Vec<RawHit<NodeId>> {
        Scene3dGraph::new(self).intersect(ray, candidates, recursive)
    }

    fn parent_of(&self, object: &NodeId) -> Option<NodeId> {
        self.parent(*object)
    }
}

fn pick_filter() -> QueryFilter {
    QueryFilter {
        visible_only: true,
        pickable_only: true,
    }
}

fn raw_hit(hit: RayHit) -> RawHit<NodeId> {
    RawHit {
        object: hit.node,
        index: hit.instance,
        distance: hit.distance,
        point: hit.point,
        face: Some(Face {
            normal: hit.normal,
            index: hit.face,
        }),
    }
}
