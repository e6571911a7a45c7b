// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover state: which records the pointer is currently "inside".
//!
//! ## Usage
//!
//! The [`EventSystem`](crate::dispatcher::EventSystem) owns one [`HoverState`] and drives it:
//!
//! 1) On each move, [`HoverState::retain_hits`] drops entries that are no longer hit; the engine
//!    fires `onPointerOut` then `onPointerLeave` for each removed entry.
//! 2) While dispatching the fresh hits, records not yet hovered are
//!    [inserted](HoverState::insert) and receive `onPointerOver` then `onPointerEnter`.
//! 3) Leaving the viewport, cancelling, or losing capture [clears](HoverState::clear) everything.
//!
//! Entries are keyed by `(event_object, index)` but matched against fresh hits by
//! `(object, index)`, so every ancestor record of a hovered primitive stays hovered while that
//! primitive is under the pointer.
//!
//! ## Minimal example
//!
//! ```
//! use glam::Vec3;
//! use understory_pointer::event::FrameInfo;
//! use understory_pointer::hover::{HoverEntry, HoverState};
//! use understory_pointer::types::{Intersection, RawHit};
//!
//! let record = |object: u32, event_object: u32| Intersection {
//!     hit: RawHit { object, index: None, distance: 1.0, point: Vec3::ZERO, face: None },
//!     event_object,
//! };
//!
//! let mut hover = HoverState::new();
//! assert!(hover.insert(HoverEntry::new(record(2, 1), FrameInfo::default())));
//! assert!(hover.insert(HoverEntry::new(record(2, 2), FrameInfo::default())));
//!
//! // Primitive 2 is still hit: both records stay.
//! assert!(hover.retain_hits(&[record(2, 2)]).is_empty());
//! // Nothing is hit: both leave, in the order they were entered.
//! let left: Vec<_> = hover.retain_hits(&[]).into_iter().map(|e| e.record.event_object).collect();
//! assert_eq!(left, [1, 2]);
//! ```

use alloc::vec::Vec;

use crate::event::FrameInfo;
use crate::types::Intersection;

/// A hovered record.
#[derive(Clone, Debug)]
pub struct HoverEntry<O> {
    /// The record that received `onPointerOver`.
    pub record: Intersection<O>,
    /// Set when propagation was stopped while dispatching the record that created the entry.
    ///
    /// Later moves over a stopped entry stop propagation again before `onPointerMove`.
    pub stopped: bool,
    /// The event frame the entry was created in; out/leave events replay its fields.
    pub frame: FrameInfo,
}

impl<O> HoverEntry<O> {
    /// A fresh, unstopped entry.
    pub fn new(record: Intersection<O>, frame: FrameInfo) -> Self {
        Self {
            record,
            stopped: false,
            frame,
        }
    }
}

/// Insertion-ordered set of hovered records.
#[derive(Clone, Debug)]
pub struct HoverState<O> {
    entries: Vec<HoverEntry<O>>,
}

impl<O> Default for HoverState<O> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<O> HoverState<O> {
    /// Create an empty hover state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of hovered records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is hovered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hovered entries in the order they were entered.
    pub fn iter(&self) -> impl Iterator<Item = &HoverEntry<O>> {
        self.entries.iter()
    }

    /// Remove and return every entry, in insertion order.
    pub fn clear(&mut self) -> Vec<HoverEntry<O>> {
        core::mem::take(&mut self.entries)
    }
}

impl<O: Copy + Eq> HoverState<O> {

    /// Entry for hover id `(event_object, index)`.
    pub fn get(&self, id: (O, Option<u32>)) -> Option<&HoverEntry<O>> {
        self.entries.iter().find(|e| e.record.hover_id() == id)
    }

    /// Returns true if any entry is dispatched to `event_object`.
    pub fn contains_event_object(&self, event_object: O) -> bool {
        self.entries
            .iter()
            .any(|e| e.record.event_object == event_object)
    }

    /// Insert `entry` unless its hover id is already present. Returns true if inserted.
    pub fn insert(&mut self, entry: HoverEntry<O>) -> bool {
        if self.get(entry.record.hover_id()).is_some() {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Mark the entry for `id` as stopped.
    pub fn mark_stopped(&mut self, id: (O, Option<u32>)) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.record.hover_id() == id) {
            e.stopped = true;
        }
    }

    /// Remove every entry whose `(object, index)` does not appear in `hits`.
    ///
    /// Returns the removed entries in insertion order. An empty `hits` removes everything.
    pub fn retain_hits(&mut self, hits: &[Intersection<O>]) -> Vec<HoverEntry<O>> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            let id = entry.record.geometry_id();
            if hits.iter().any(|h| h.geometry_id() == id) {
                kept.push(entry);
            } else {
                removed.push(entry);
            }
        }
        self.entries = kept;
        removed
    }
}
