// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit resolution: ray test, deduplication, user filter, and bubble-path expansion.
//!
//! ## Ordering
//!
//! Records come out ordered by the raw hit order (ascending distance unless a user
//! [filter](crate::raycast::RaycastConfig::filter) re-sorted them), and within one raw hit from
//! the hit object outwards to the root. Only ancestors carrying a handler set produce records;
//! handler-less ancestors are skipped without ending the walk.
//!
//! ## Deduplication
//!
//! The scene graph may report the same primitive more than once when candidates overlap (an
//! object and one of its ancestors both being interactive, for instance). The first occurrence
//! of each `(object, index)` wins.

use alloc::vec::Vec;

use hashbrown::HashSet;
use tracing::trace;

use crate::handlers::{HandlerMask, HandlerRegistry};
use crate::raycast::RaycastConfig;
use crate::types::{Intersection, RawHit, Ray, SceneGraph};

/// Resolve `ray` against the interactive objects of `registry`.
///
/// Candidates are the registered objects carrying any handler in `candidates`. Returns an empty
/// list when the raycaster is disabled.
pub fn intersect<S: SceneGraph>(
    scene: &S,
    ray: &Ray,
    registry: &HandlerRegistry<S::Object>,
    config: &RaycastConfig<S::Object>,
    candidates: HandlerMask,
) -> Vec<Intersection<S::Object>> {
    if !config.enabled {
        return Vec::new();
    }
    let objects = registry.objects_with_any(candidates);
    if objects.is_empty() {
        return Vec::new();
    }

    let raw = scene.intersect(ray, &objects, true);
    let raw_count = raw.len();
    let mut hits = dedupe(raw);
    if let Some(filter) = &config.filter {
        hits = filter(hits);
    }
    let records = expand(scene, registry, hits);
    trace!(
        candidates = objects.len(),
        raw = raw_count,
        records = records.len(),
        "resolved hits"
    );
    records
}

/// Drop repeated `(object, index)` hits, keeping the first.
pub fn dedupe<O: Copy + Eq + core::hash::Hash>(hits: Vec<RawHit<O>>) -> Vec<RawHit<O>> {
    let mut seen = HashSet::with_capacity(hits.len());
    hits.into_iter()
        .filter(|h| seen.insert((h.object, h.index)))
        .collect()
}

/// Expand each raw hit into one record per ancestor (inclusive) carrying a handler set.
pub fn expand<S: SceneGraph>(
    scene: &S,
    registry: &HandlerRegistry<S::Object>,
    hits: Vec<RawHit<S::Object>>,
) -> Vec<Intersection<S::Object>> {
    let mut records = Vec::with_capacity(hits.len());
    for hit in hits {
        let mut current = Some(hit.object);
        while let Some(object) = current {
            if registry.contains(object) {
                records.push(Intersection {
                    hit: hit.clone(),
                    event_object: object,
                });
            }
            current = scene.parent_of(&object);
        }
    }
    records
}
