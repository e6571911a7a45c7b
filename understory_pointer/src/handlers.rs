// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handler sets and the side table that attaches them to scene objects.
//!
//! The reconciliation layer owns the contents of the [`HandlerRegistry`]: it registers a
//! [`HandlerSet`] when it creates an object with handlers and unregisters it when the object
//! goes away. The engine only reads the table and invokes handlers.
//!
//! ```
//! use understory_pointer::handlers::{HandlerMask, HandlerRegistry, HandlerSet};
//! use understory_pointer::types::EventName;
//!
//! let mut registry: HandlerRegistry<u32> = HandlerRegistry::new();
//! registry.register(
//!     1,
//!     HandlerSet::new()
//!         .with(EventName::PointerOver, |_| {})
//!         .with(EventName::Click, |_| {}),
//! );
//! registry.register(2, HandlerSet::new().with(EventName::Click, |_| {}));
//!
//! assert_eq!(registry.interaction(), vec![1, 2]);
//! assert_eq!(registry.objects_with_any(HandlerMask::MOVE_CANDIDATES), vec![1]);
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::event::PointerEvent;
use crate::types::{EventName, RawPointerEvent};

/// A handler invoked with the event record.
pub type PointerHandler<O> = Box<dyn FnMut(&mut PointerEvent<'_, O>)>;

/// A `onPointerMissed` handler; it only sees the raw event.
pub type MissedHandler = Box<dyn FnMut(&RawPointerEvent)>;

bitflags::bitflags! {
    /// Which handlers a [`HandlerSet`] carries.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct HandlerMask: u16 {
        /// `onClick`.
        const CLICK                = 1 << 0;
        /// `onContextMenu`.
        const CONTEXT_MENU         = 1 << 1;
        /// `onDoubleClick`.
        const DOUBLE_CLICK         = 1 << 2;
        /// `onWheel`.
        const WHEEL                = 1 << 3;
        /// `onPointerDown`.
        const POINTER_DOWN         = 1 << 4;
        /// `onPointerUp`.
        const POINTER_UP           = 1 << 5;
        /// `onPointerOver`.
        const POINTER_OVER         = 1 << 6;
        /// `onPointerOut`.
        const POINTER_OUT          = 1 << 7;
        /// `onPointerEnter`.
        const POINTER_ENTER        = 1 << 8;
        /// `onPointerLeave`.
        const POINTER_LEAVE        = 1 << 9;
        /// `onPointerMove`.
        const POINTER_MOVE         = 1 << 10;
        /// `onPointerCancel`.
        const POINTER_CANCEL       = 1 << 11;
        /// `onLostPointerCapture`.
        const LOST_POINTER_CAPTURE = 1 << 12;
        /// `onPointerMissed`.
        const POINTER_MISSED       = 1 << 13;

        /// Handlers that make an object take part in hover tracking.
        const HOVER = Self::POINTER_OVER.bits()
            | Self::POINTER_OUT.bits()
            | Self::POINTER_ENTER.bits()
            | Self::POINTER_LEAVE.bits();
        /// Objects worth ray testing on a move.
        const MOVE_CANDIDATES = Self::HOVER.bits() | Self::POINTER_MOVE.bits();
    }
}

impl From<EventName> for HandlerMask {
    fn from(name: EventName) -> Self {
        Self::from_bits_truncate(1 << name.slot())
    }
}

/// The handlers attached to one scene object.
pub struct HandlerSet<O> {
    slots: [Option<PointerHandler<O>>; EventName::COUNT],
    missed: Option<MissedHandler>,
}

impl<O> Default for HandlerSet<O> {
    fn default() -> Self {
        Self {
            slots: [const { None }; EventName::COUNT],
            missed: None,
        }
    }
}

impl<O> core::fmt::Debug for HandlerSet<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandlerSet")
            .field("mask", &self.mask())
            .finish_non_exhaustive()
    }
}

impl<O> HandlerSet<O> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with<F>(mut self, name: EventName, handler: F) -> Self
    where
        F: FnMut(&mut PointerEvent<'_, O>) + 'static,
    {
        self.set(name, handler);
        self
    }

    /// Builder form of [`set_missed`](Self::set_missed).
    #[must_use]
    pub fn with_missed<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&RawPointerEvent) + 'static,
    {
        self.set_missed(handler);
        self
    }

    /// Install `handler` for `name`, replacing any previous one.
    pub fn set<F>(&mut self, name: EventName, handler: F)
    where
        F: FnMut(&mut PointerEvent<'_, O>) + 'static,
    {
        self.slots[name.slot()] = Some(Box::new(handler));
    }

    /// Install the `onPointerMissed` handler.
    pub fn set_missed<F>(&mut self, handler: F)
    where
        F: FnMut(&RawPointerEvent) + 'static,
    {
        self.missed = Some(Box::new(handler));
    }

    /// Remove the handler for `name`. Returns true if there was one.
    pub fn remove(&mut self, name: EventName) -> bool {
        self.slots[name.slot()].take().is_some()
    }

    /// Remove the `onPointerMissed` handler. Returns true if there was one.
    pub fn remove_missed(&mut self) -> bool {
        self.missed.take().is_some()
    }

    /// Returns true if a handler is installed for `name`.
    pub fn has(&self, name: EventName) -> bool {
        self.slots[name.slot()].is_some()
    }

    /// Which handlers are installed.
    pub fn mask(&self) -> HandlerMask {
        let mut mask = HandlerMask::empty();
        for name in EventName::ALL {
            if self.has(name) {
                mask |= HandlerMask::from(name);
            }
        }
        if self.missed.is_some() {
            mask |= HandlerMask::POINTER_MISSED;
        }
        mask
    }

    /// Returns true if no handler is installed.
    pub fn is_empty(&self) -> bool {
        self.mask().is_empty()
    }

    /// Invoke the handler for `name`. Returns true if one ran.
    pub(crate) fn call(&mut self, name: EventName, event: &mut PointerEvent<'_, O>) -> bool {
        match self.slots[name.slot()].as_mut() {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }

    pub(crate) fn call_missed(&mut self, event: &RawPointerEvent) -> bool {
        match self.missed.as_mut() {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }
}

/// Side table from scene object to its handler set.
///
/// Registration order defines the interactive object list: ray candidates and
/// `onPointerMissed` fan-out both follow it.
pub struct HandlerRegistry<O> {
    sets: HashMap<O, HandlerSet<O>>,
    order: Vec<O>,
    on_pointer_missed: Option<MissedHandler>,
}

impl<O> Default for HandlerRegistry<O> {
    fn default() -> Self {
        Self {
            sets: HashMap::new(),
            order: Vec::new(),
            on_pointer_missed: None,
        }
    }
}

impl<O: core::fmt::Debug> core::fmt::Debug for HandlerRegistry<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("order", &self.order)
            .field("on_pointer_missed", &self.on_pointer_missed.is_some())
            .finish_non_exhaustive()
    }
}

impl<O: Copy + Eq + Hash> HandlerRegistry<O> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `set` to `object`, returning the set it replaces.
    ///
    /// Replacing keeps the object's position in the interaction order.
    pub fn register(&mut self, object: O, set: HandlerSet<O>) -> Option<HandlerSet<O>> {
        let previous = self.sets.insert(object, set);
        if previous.is_none() {
            self.order.push(object);
        }
        previous
    }

    /// Detach and return `object`'s handler set.
    pub fn unregister(&mut self, object: O) -> Option<HandlerSet<O>> {
        let removed = self.sets.remove(&object)?;
        self.order.retain(|o| *o != object);
        Some(removed)
    }

    /// Handler set of `object`.
    pub fn get(&self, object: O) -> Option<&HandlerSet<O>> {
        self.sets.get(&object)
    }

    /// Mutable handler set of `object`.
    pub fn get_mut(&mut self, object: O) -> Option<&mut HandlerSet<O>> {
        self.sets.get_mut(&object)
    }

    /// Returns true if `object` carries a handler set (possibly empty).
    pub fn contains(&self, object: O) -> bool {
        self.sets.contains_key(&object)
    }

    /// Installed handlers of `object`, or `None` when it carries no set.
    pub fn mask_of(&self, object: O) -> Option<HandlerMask> {
        self.sets.get(&object).map(HandlerSet::mask)
    }

    /// Objects carrying at least one handler, in registration order.
    pub fn interaction(&self) -> Vec<O> {
        self.objects_with_any(HandlerMask::all())
    }

    /// Objects carrying at least one handler in `mask`, in registration order.
    pub fn objects_with_any(&self, mask: HandlerMask) -> Vec<O> {
        self.order
            .iter()
            .copied()
            .filter(|o| self.mask_of(*o).is_some_and(|m| m.intersects(mask)))
            .collect()
    }

    /// Number of registered objects.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no object is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Install the scene-level `onPointerMissed` callback.
    pub fn set_on_pointer_missed<F>(&mut self, handler: F)
    where
        F: FnMut(&RawPointerEvent) + 'static,
    {
        self.on_pointer_missed = Some(Box::new(handler));
    }

    /// Remove the scene-level `onPointerMissed` callback.
    pub fn clear_on_pointer_missed(&mut self) {
        self.on_pointer_missed = None;
    }

    /// Invoke `object`'s handler for `name`. Returns true if one ran.
    pub(crate) fn call(
        &mut self,
        object: O,
        name: EventName,
        event: &mut PointerEvent<'_, O>,
    ) -> bool {
        self.sets
            .get_mut(&object)
            .is_some_and(|set| set.call(name, event))
    }

    /// Fan `onPointerMissed` out to every interactive object except `skip`.
    pub(crate) fn notify_missed(&mut self, event: &RawPointerEvent, skip: Option<O>) -> usize {
        let mut notified = 0;
        for object in &self.order {
            if Some(*object) == skip {
                continue;
            }
            if let Some(set) = self.sets.get_mut(object)
                && set.call_missed(event)
            {
                notified += 1;
            }
        }
        notified
    }

    pub(crate) fn notify_global_missed(&mut self, event: &RawPointerEvent) -> bool {
        match self.on_pointer_missed.as_mut() {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }
}
