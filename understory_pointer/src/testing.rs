// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test helpers: a scripted scene graph and a call log.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use glam::Vec3;
use hashbrown::HashMap;

use crate::event::PointerEvent;
use crate::types::{RawHit, Ray, SceneGraph};

/// A scene whose ray always hits the same scripted primitives.
///
/// Like a real recursive ray cast, a primitive is reported once for every candidate whose
/// subtree contains it.
#[derive(Debug, Default)]
pub(crate) struct MockScene {
    parents: HashMap<u32, u32>,
    hits: RefCell<Vec<RawHit<u32>>>,
    calls: Cell<usize>,
    last_candidates: RefCell<Vec<u32>>,
}

pub(crate) fn raw(object: u32, distance: f32) -> RawHit<u32> {
    RawHit {
        object,
        index: None,
        distance,
        point: Vec3::new(0.0, 0.0, -distance),
        face: None,
    }
}

impl MockScene {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_parent(mut self, child: u32, parent: u32) -> Self {
        self.parents.insert(child, parent);
        self
    }

    pub(crate) fn with_hit(self, hit: RawHit<u32>) -> Self {
        self.hits.borrow_mut().push(hit);
        self
    }

    /// Replace the scripted hits, e.g. to move the pointer between events.
    pub(crate) fn set_hits(&self, hits: Vec<RawHit<u32>>) {
        *self.hits.borrow_mut() = hits;
    }

    pub(crate) fn intersect_calls(&self) -> usize {
        self.calls.get()
    }

    pub(crate) fn last_candidates(&self) -> Vec<u32> {
        self.last_candidates.borrow().clone()
    }

    fn is_within(&self, object: u32, root: u32) -> bool {
        let mut current = Some(object);
        while let Some(o) = current {
            if o == root {
                return true;
            }
            current = self.parents.get(&o).copied();
        }
        false
    }
}

impl SceneGraph for MockScene {
    type Object = u32;

    fn intersect(&self, _ray: &Ray, candidates: &[u32], recursive: bool) -> Vec<RawHit<u32>> {
        self.calls.set(self.calls.get() + 1);
        *self.last_candidates.borrow_mut() = candidates.to_vec();
        let hits = self.hits.borrow();
        let mut out = Vec::new();
        for &candidate in candidates {
            for hit in hits.iter() {
                let reached = if recursive {
                    self.is_within(hit.object, candidate)
                } else {
                    hit.object == candidate
                };
                if reached {
                    out.push(hit.clone());
                }
            }
        }
        out.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        out
    }

    fn parent_of(&self, object: &u32) -> Option<u32> {
        self.parents.get(object).copied()
    }
}

/// Shared log of handler invocations, as `"label:event_object"` strings.
pub(crate) type Log = Rc<RefCell<Vec<String>>>;

pub(crate) fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// A handler that appends `"label:event_object"` to `log`.
pub(crate) fn logger(
    log: &Log,
    label: &'static str,
) -> impl FnMut(&mut PointerEvent<'_, u32>) + 'static {
    let log = log.clone();
    move |e: &mut PointerEvent<'_, u32>| {
        log.borrow_mut()
            .push(format!("{label}:{}", e.event_object()));
    }
}
