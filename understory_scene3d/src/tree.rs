// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, updates, ray queries.

use alloc::vec::Vec;
use glam::{Affine3A, Vec3};

use crate::ray::{Ray, RayHit, ray_aabb, ray_sphere};
use crate::types::{Aabb3, LocalNode, NodeFlags, NodeId, Shape};

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level scene tree.
pub struct Tree {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .finish_non_exhaustive()
    }
}

/// Filters applied during ray intersection.
///
/// Used by [`Tree::intersect`] and [`Tree::intersect_all`].
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryFilter {
    /// If true, only consider nodes marked [`NodeFlags::VISIBLE`].
    pub visible_only: bool,
    /// If true, only consider nodes marked [`NodeFlags::PICKABLE`].
    pub pickable_only: bool,
}

#[derive(Clone, Debug)]
struct WorldNode {
    world_transform: Affine3A,
    inverse: Affine3A,
    world_bounds: Option<Aabb3>, // conservative box of the transformed shape
}

impl Default for WorldNode {
    fn default() -> Self {
        Self {
            world_transform: Affine3A::IDENTITY,
            inverse: Affine3A::IDENTITY,
            world_bounds: None,
        }
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: LocalNode,
    world: WorldNode,
    dirty: bool,
}

impl Node {
    fn new(generation: u32, local: LocalNode) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
            world: WorldNode::default(),
            dirty: true,
        }
    }
}

impl Tree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Insert a new node as a child of `parent` (or as a root if `None`).
    ///
    /// A stale `parent` inserts the node as a root.
    pub fn insert(&mut self, parent: Option<NodeId>, local: LocalNode) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent
            && self.is_alive(p)
        {
            self.link_parent(id, p);
        }
        id
    }

    /// Remove a node (and its subtree) from the tree.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        let children = self.node(id).children.clone();
        for child in children {
            self.remove(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Reparent `id` under `new_parent` (or make it a root if `None`).
    ///
    /// Reparenting under the node itself or one of its descendants is ignored.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(p) = new_parent
            && (!self.is_alive(p) || self.path_to_root(p).contains(&id))
        {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
        self.node_mut(id).dirty = true;
    }

    /// Update the local transform.
    pub fn set_local_transform(&mut self, id: NodeId, transform: Affine3A) {
        if let Some(node) = self.node_opt_mut(id) {
            node.local.local_transform = transform;
            node.dirty = true;
        }
    }

    /// Update the pickable shape.
    pub fn set_shape(&mut self, id: NodeId, shape: Option<Shape>) {
        if let Some(node) = self.node_opt_mut(id) {
            node.local.shape = shape;
            node.dirty = true;
        }
    }

    /// Update flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(node) = self.node_opt_mut(id) {
            // flags do not affect world transforms/bounds; no geometry dirty
            node.local.flags = flags;
        }
    }

    /// Commit pending changes, recomputing world transforms and bounds.
    ///
    /// Returns the number of nodes whose world data was recomputed.
    /// Ray queries observe world data as of the last commit.
    pub fn commit(&mut self) -> usize {
        let roots: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if n.parent.is_none() => {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "NodeId uses 32-bit indices by design."
                    )]
                    Some(NodeId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect();

        let mut updated = 0;
        for root in roots {
            self.update_world_recursive(root, Affine3A::IDENTITY, false, &mut updated);
        }
        updated
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Parent of `id`, or `None` for roots and stale identifiers.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id)?.parent
    }

    /// Children of `id` in insertion order. Empty for stale identifiers.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Local data of `id`.
    pub fn local(&self, id: NodeId) -> Option<&LocalNode> {
        self.node_opt(id).map(|n| &n.local)
    }

    /// World transform of `id` as of the last commit.
    pub fn world_transform(&self, id: NodeId) -> Option<Affine3A> {
        self.node_opt(id).map(|n| n.world.world_transform)
    }

    /// Conservative world bounds of `id`'s shape as of the last commit.
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb3> {
        self.node_opt(id)?.world.world_bounds
    }

    /// Path from the root to `id` (inclusive). Empty for stale identifiers.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            let Some(node) = self.node_opt(n) else {
                break;
            };
            out.push(n);
            cur = node.parent;
        }
        out.reverse();
        out
    }

    /// Intersect `ray` with the shapes of `candidates` and, if `recursive`,
    /// their descendants.
    ///
    /// Results are sorted by ascending distance; equal distances keep
    /// traversal order. A node reachable from several candidates (for example
    /// a candidate together with one of its ancestors) is reported once per
    /// candidate, so callers that pass overlapping subtrees should
    /// deduplicate.
    pub fn intersect(
        &self,
        ray: &Ray,
        candidates: &[NodeId],
        recursive: bool,
        filter: QueryFilter,
    ) -> Vec<RayHit> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        for &candidate in candidates {
            if !self.is_alive(candidate) {
                continue;
            }
            stack.push(candidate);
            while let Some(id) = stack.pop() {
                let node = self.node(id);
                self.intersect_node(id, node, ray, filter, &mut out);
                if recursive {
                    stack.extend(node.children.iter().rev().copied());
                }
            }
        }
        out.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        out
    }

    /// Intersect `ray` with every node in the tree.
    pub fn intersect_all(&self, ray: &Ray, filter: QueryFilter) -> Vec<RayHit> {
        let roots: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if n.parent.is_none() => {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "NodeId uses 32-bit indices by design."
                    )]
                    Some(NodeId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect();
        self.intersect(ray, &roots, true, filter)
    }

    // --- internals ---

    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    fn update_world_recursive(
        &mut self,
        id: NodeId,
        parent_tf: Affine3A,
        parent_changed: bool,
        updated: &mut usize,
    ) {
        let (changed, world_tf, child_ids) = {
            let node = self.node_mut(id);
            let changed = parent_changed || node.dirty;
            if changed {
                let world_transform = parent_tf * node.local.local_transform;
                node.world.world_transform = world_transform;
                node.world.inverse = world_transform.inverse();
                node.world.world_bounds = node
                    .local
                    .shape
                    .as_ref()
                    .and_then(Shape::local_bounds)
                    .map(|b| b.transformed(&world_transform));
                node.dirty = false;
                *updated += 1;
            }
            (changed, node.world.world_transform, node.children.clone())
        };

        for child in child_ids {
            self.update_world_recursive(child, world_tf, changed, updated);
        }
    }

    fn intersect_node(
        &self,
        id: NodeId,
        node: &Node,
        ray: &Ray,
        filter: QueryFilter,
        out: &mut Vec<RayHit>,
    ) {
        if filter.visible_only && !node.local.flags.contains(NodeFlags::VISIBLE) {
            return;
        }
        if filter.pickable_only && !node.local.flags.contains(NodeFlags::PICKABLE) {
            return;
        }
        let (Some(shape), Some(bounds)) = (node.local.shape.as_ref(), node.world.world_bounds)
        else {
            return;
        };
        // Broad phase against the world box before going to local space.
        if ray_aabb(ray.origin, ray.direction, &bounds).is_none() {
            return;
        }

        let world = &node.world;
        let local_origin = world.inverse.transform_point3(ray.origin);
        let local_dir = world.inverse.transform_vector3(ray.direction);
        let normal_matrix = world.inverse.matrix3.transpose();
        let mut push = |t: f32, local_normal: Vec3, face: u32, instance: Option<u32>| {
            let point = world
                .world_transform
                .transform_point3(local_origin + local_dir * t);
            out.push(RayHit {
                node: id,
                instance,
                distance: point.distance(ray.origin),
                point,
                normal: (normal_matrix * local_normal).normalize_or_zero(),
                face,
            });
        };

        match shape {
            Shape::Cuboid(b) => {
                if let Some((t, n, face)) = ray_aabb(local_origin, local_dir, b) {
                    push(t, n, face, None);
                }
            }
            Shape::Sphere { center, radius } => {
                if let Some((t, n)) = ray_sphere(local_origin, local_dir, *center, *radius) {
                    push(t, n, 0, None);
                }
            }
            Shape::Instances(boxes) => {
                for (i, b) in boxes.iter().enumerate() {
                    if let Some((t, n, face)) = ray_aabb(local_origin, local_dir, b) {
                        #[allow(
                            clippy::cast_possible_truncation,
                            reason = "Instance counts are bounded well below u32::MAX."
                        )]
                        push(t, n, face, Some(i as u32));
                    }
                }
            }
        }
    }
}
