// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer capture bookkeeping, scoped per pointer id.
//!
//! An object that captures a pointer is appended to the resolved hit list of every later event
//! carrying that pointer id, whether or not the ray still hits it. Releasing or losing one
//! pointer's capture never touches another pointer's entries.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::types::Intersection;

/// Per-pointer map of capturing objects and the record each captured with.
#[derive(Clone, Debug)]
pub struct CaptureTracker<O> {
    // Insertion ordered per pointer; a pointer entry exists only while non-empty.
    pointers: HashMap<i32, Vec<(O, Intersection<O>)>>,
}

impl<O> Default for CaptureTracker<O> {
    fn default() -> Self {
        Self {
            pointers: HashMap::new(),
        }
    }
}

impl<O: Copy + Eq + Hash> CaptureTracker<O> {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `pointer_id` for `object`, remembering `record` as its hit.
    ///
    /// Capturing again replaces the stored record in place.
    pub fn set_pointer_capture(&mut self, pointer_id: i32, object: O, record: Intersection<O>) {
        let entries = self.pointers.entry(pointer_id).or_default();
        if let Some(slot) = entries.iter_mut().find(|(o, _)| *o == object) {
            slot.1 = record;
        } else {
            entries.push((object, record));
        }
    }

    /// Returns true if `object` holds `pointer_id`.
    pub fn has_pointer_capture(&self, pointer_id: i32, object: O) -> bool {
        self.pointers
            .get(&pointer_id)
            .is_some_and(|entries| entries.iter().any(|(o, _)| *o == object))
    }

    /// Release `object`'s capture of `pointer_id`.
    ///
    /// Returns true if `object` held the pointer. The pointer entry is dropped once no object
    /// holds it.
    pub fn release_pointer_capture(&mut self, pointer_id: i32, object: O) -> bool {
        let Some(entries) = self.pointers.get_mut(&pointer_id) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(o, _)| *o != object);
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.pointers.remove(&pointer_id);
        }
        removed
    }

    /// Returns true if any object holds `pointer_id`.
    pub fn is_captured(&self, pointer_id: i32) -> bool {
        self.pointers.contains_key(&pointer_id)
    }

    /// Objects holding `pointer_id`, in capture order.
    pub fn capturing_objects(&self, pointer_id: i32) -> impl Iterator<Item = O> + '_ {
        self.pointers
            .get(&pointer_id)
            .into_iter()
            .flat_map(|entries| entries.iter().map(|(o, _)| *o))
    }

    /// Drop every capture of `pointer_id`. Returns true if there were any.
    pub fn clear(&mut self, pointer_id: i32) -> bool {
        self.pointers.remove(&pointer_id).is_some()
    }

    /// Append the captured records for `pointer_id` after the geometric hits.
    ///
    /// Records are appended in capture order even when the object was also hit geometrically.
    pub fn patch_intersects(&self, hits: &mut Vec<Intersection<O>>, pointer_id: Option<i32>) {
        if let Some(entries) = pointer_id.and_then(|id| self.pointers.get(&id)) {
            hits.extend(entries.iter().map(|(_, record)| record.clone()));
        }
    }

    /// Whether a handler on `event_object` may stop propagation of an event with `pointer_id`.
    ///
    /// Refused only when the pointer is captured and `event_object` is not among the capturers.
    pub fn allows_stop(&self, pointer_id: Option<i32>, event_object: O) -> bool {
        match pointer_id.and_then(|id| self.pointers.get(&id)) {
            None => true,
            Some(entries) => entries.iter().any(|(o, _)| *o == event_object),
        }
    }
}
