// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types: scene-graph seam, raw hits, intersection records, event names, raw input.
//!
//! ## Overview
//!
//! These types describe what flows into the engine from its collaborators (the scene graph,
//! the windowing layer) and what each handler invocation is built from.
//! They are referenced by the [`resolver`](crate::resolver) and the
//! [`dispatcher`](crate::dispatcher).

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use glam::Vec3;
use kurbo::{Point, Vec2};

/// A ray in world space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    /// Ray origin.
    pub origin: Vec3,
    /// Unit direction (or zero for a degenerate ray).
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing `direction`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// The scene graph the engine resolves pointer events against.
///
/// The engine never owns or mutates the graph. It asks for ray intersections over a set of
/// candidate objects and walks parent links to build bubble paths.
pub trait SceneGraph {
    /// Identity of a scene object. Must be cheap to copy and compare.
    type Object: Copy + Eq + Hash + Debug;

    /// Intersect `ray` with `candidates` (and their descendants when `recursive`).
    ///
    /// Results are expected in ascending distance. Overlapping candidates may produce the same
    /// primitive more than once; the engine deduplicates.
    fn intersect(
        &self,
        ray: &Ray,
        candidates: &[Self::Object],
        recursive: bool,
    ) -> Vec<RawHit<Self::Object>>;

    /// Returns the parent of `object`, or `None` if `object` is a root.
    fn parent_of(&self, object: &Self::Object) -> Option<Self::Object>;
}

/// Surface data for a hit face.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Face {
    /// World-space surface normal.
    pub normal: Vec3,
    /// Provider-specific face index.
    pub index: u32,
}

/// An unfiltered geometric intersection, before ancestor expansion.
#[derive(Clone, Debug, PartialEq)]
pub struct RawHit<O> {
    /// The object whose geometry was hit.
    pub object: O,
    /// Sub-index within the object (for example an instance), if any.
    pub index: Option<u32>,
    /// World-space distance from the ray origin.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
    /// Face data, when the provider reports it.
    pub face: Option<Face>,
}

/// A raw hit annotated with the ancestor currently receiving dispatch.
///
/// One raw hit expands to one record per ancestor carrying a handler set.
#[derive(Clone, Debug, PartialEq)]
pub struct Intersection<O> {
    /// The geometric hit this record was expanded from.
    pub hit: RawHit<O>,
    /// The object whose handlers this record is dispatched to.
    pub event_object: O,
}

impl<O: Copy> Intersection<O> {
    /// The object whose geometry was hit.
    pub fn object(&self) -> O {
        self.hit.object
    }

    /// Sub-index within the hit object.
    pub fn index(&self) -> Option<u32> {
        self.hit.index
    }

    /// Key identifying this record in the hover set: `(event_object, index)`.
    pub fn hover_id(&self) -> (O, Option<u32>) {
        (self.event_object, self.hit.index)
    }

    /// Key identifying the underlying primitive: `(object, index)`.
    pub fn geometry_id(&self) -> (O, Option<u32>) {
        (self.hit.object, self.hit.index)
    }
}

/// Handler slots on a scene object.
///
/// `onPointerMissed` is not listed: it receives only the raw event and lives in its own slot on
/// [`HandlerSet`](crate::handlers::HandlerSet).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EventName {
    /// `onClick`.
    Click,
    /// `onContextMenu`.
    ContextMenu,
    /// `onDoubleClick`.
    DoubleClick,
    /// `onWheel`.
    Wheel,
    /// `onPointerDown`.
    PointerDown,
    /// `onPointerUp`.
    PointerUp,
    /// `onPointerOver`.
    PointerOver,
    /// `onPointerOut`.
    PointerOut,
    /// `onPointerEnter`.
    PointerEnter,
    /// `onPointerLeave`.
    PointerLeave,
    /// `onPointerMove`.
    PointerMove,
    /// `onPointerCancel`.
    PointerCancel,
    /// `onLostPointerCapture`.
    LostPointerCapture,
}

impl EventName {
    /// Number of handler slots.
    pub const COUNT: usize = 13;

    /// Every handler slot, in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Click,
        Self::ContextMenu,
        Self::DoubleClick,
        Self::Wheel,
        Self::PointerDown,
        Self::PointerUp,
        Self::PointerOver,
        Self::PointerOut,
        Self::PointerEnter,
        Self::PointerLeave,
        Self::PointerMove,
        Self::PointerCancel,
        Self::LostPointerCapture,
    ];

    /// Conventional handler property name, e.g. `"onPointerOver"`.
    pub const fn handler_name(self) -> &'static str {
        match self {
            Self::Click => "onClick",
            Self::ContextMenu => "onContextMenu",
            Self::DoubleClick => "onDoubleClick",
            Self::Wheel => "onWheel",
            Self::PointerDown => "onPointerDown",
            Self::PointerUp => "onPointerUp",
            Self::PointerOver => "onPointerOver",
            Self::PointerOut => "onPointerOut",
            Self::PointerEnter => "onPointerEnter",
            Self::PointerLeave => "onPointerLeave",
            Self::PointerMove => "onPointerMove",
            Self::PointerCancel => "onPointerCancel",
            Self::LostPointerCapture => "onLostPointerCapture",
        }
    }

    /// True for `onClick`, `onContextMenu` and `onDoubleClick`.
    pub const fn is_click_family(self) -> bool {
        matches!(self, Self::Click | Self::ContextMenu | Self::DoubleClick)
    }

    pub(crate) const fn slot(self) -> usize {
        self as usize
    }
}

/// Raw input events the windowing layer forwards to
/// [`EventSystem::handle_pointer`](crate::dispatcher::EventSystem::handle_pointer).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum InputKind {
    /// `click`.
    Click,
    /// `contextmenu`.
    ContextMenu,
    /// `dblclick`.
    DoubleClick,
    /// `wheel`.
    Wheel,
    /// `pointerdown`.
    PointerDown,
    /// `pointerup`.
    PointerUp,
    /// `pointerleave`: the pointer left the viewport.
    PointerLeave,
    /// `pointermove`.
    PointerMove,
    /// `pointercancel`.
    PointerCancel,
    /// `lostpointercapture`.
    LostPointerCapture,
}

impl InputKind {
    /// Every input the engine listens to. Attach one listener per entry.
    pub const ALL: [Self; 10] = [
        Self::Click,
        Self::ContextMenu,
        Self::DoubleClick,
        Self::Wheel,
        Self::PointerDown,
        Self::PointerUp,
        Self::PointerLeave,
        Self::PointerMove,
        Self::PointerCancel,
        Self::LostPointerCapture,
    ];

    /// DOM event type name, e.g. `"dblclick"`.
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::ContextMenu => "contextmenu",
            Self::DoubleClick => "dblclick",
            Self::Wheel => "wheel",
            Self::PointerDown => "pointerdown",
            Self::PointerUp => "pointerup",
            Self::PointerLeave => "pointerleave",
            Self::PointerMove => "pointermove",
            Self::PointerCancel => "pointercancel",
            Self::LostPointerCapture => "lostpointercapture",
        }
    }

    /// Look up an input by its DOM event type name.
    pub fn from_dom_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.dom_name() == name)
    }

    /// Handler slot this input is delivered to.
    pub const fn event_name(self) -> EventName {
        match self {
            Self::Click => EventName::Click,
            Self::ContextMenu => EventName::ContextMenu,
            Self::DoubleClick => EventName::DoubleClick,
            Self::Wheel => EventName::Wheel,
            Self::PointerDown => EventName::PointerDown,
            Self::PointerUp => EventName::PointerUp,
            Self::PointerLeave => EventName::PointerLeave,
            Self::PointerMove => EventName::PointerMove,
            Self::PointerCancel => EventName::PointerCancel,
            Self::LostPointerCapture => EventName::LostPointerCapture,
        }
    }

    /// True for `click`, `contextmenu` and `dblclick`.
    pub const fn is_click_family(self) -> bool {
        self.event_name().is_click_family()
    }
}

bitflags::bitflags! {
    /// Keyboard modifiers held while the event was produced.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 0b0001;
        /// Control.
        const CTRL  = 0b0010;
        /// Alt / Option.
        const ALT   = 0b0100;
        /// Meta / Command / Windows.
        const META  = 0b1000;
    }
}

/// A pointer, mouse, or wheel event as delivered by the windowing layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawPointerEvent {
    /// Position relative to the viewport's top-left corner, in pixels.
    pub offset: Point,
    /// Pointer id for pointer events; `None` for plain mouse events.
    pub pointer_id: Option<i32>,
    /// Button that changed state (`0` primary, `1` auxiliary, `2` secondary).
    pub button: i16,
    /// Bitmask of buttons currently held.
    pub buttons: u16,
    /// Keyboard modifiers.
    pub modifiers: Modifiers,
    /// Scroll amount for wheel events.
    pub wheel_delta: Vec2,
    /// Event timestamp in milliseconds.
    pub timestamp: f64,
}

impl RawPointerEvent {
    /// An event at `(x, y)` with every other field defaulted.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            offset: Point::new(x, y),
            ..Default::default()
        }
    }

    /// Set the pointer id.
    #[must_use]
    pub fn with_pointer_id(mut self, pointer_id: i32) -> Self {
        self.pointer_id = Some(pointer_id);
        self
    }
}

/// Native pointer capture on the element that produced the raw events.
///
/// [`EventSystem::connect`](crate::dispatcher::EventSystem::connect) installs one; capture
/// requests from handlers are forwarded to it after the engine updates its own bookkeeping.
pub trait CaptureTarget {
    /// Route all further events for `pointer_id` to this element.
    fn set_pointer_capture(&mut self, pointer_id: i32);
    /// Stop routing `pointer_id` to this element.
    fn release_pointer_capture(&mut self, pointer_id: i32);
    /// Returns true if this element holds `pointer_id`.
    fn has_pointer_capture(&self, pointer_id: i32) -> bool;
}

/// A target that ignores capture requests.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoCaptureTarget;

impl CaptureTarget for NoCaptureTarget {
    #[inline]
    fn set_pointer_capture(&mut self, _pointer_id: i32) {}

    #[inline]
    fn release_pointer_capture(&mut self, _pointer_id: i32) {}

    #[inline]
    fn has_pointer_capture(&self, _pointer_id: i32) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_name_slots_match_all() {
        for (i, name) in EventName::ALL.into_iter().enumerate() {
            assert_eq!(name.slot(), i);
        }
    }

    #[test]
    fn input_kind_dom_names_round_trip() {
        for kind in InputKind::ALL {
            assert_eq!(InputKind::from_dom_name(kind.dom_name()), Some(kind));
        }
        assert_eq!(InputKind::from_dom_name("pointerover"), None);
    }

    #[test]
    fn click_family() {
        let family: Vec<_> = InputKind::ALL
            .into_iter()
            .filter(|k| k.is_click_family())
            .collect();
        assert_eq!(
            family,
            [
                InputKind::Click,
                InputKind::ContextMenu,
                InputKind::DoubleClick
            ]
        );
        assert_eq!(InputKind::DoubleClick.event_name().handler_name(), "onDoubleClick");
    }

    #[test]
    fn intersection_ids() {
        let rec = Intersection {
            hit: RawHit {
                object: 3_u32,
                index: Some(2),
                distance: 1.0,
                point: Vec3::ZERO,
                face: None,
            },
            event_object: 1_u32,
        };
        assert_eq!(rec.hover_id(), (1, Some(2)));
        assert_eq!(rec.geometry_id(), (3, Some(2)));
    }
}
