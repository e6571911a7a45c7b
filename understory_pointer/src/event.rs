// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The event record handed to handlers.
//!
//! ## Overview
//!
//! Every handler receives a [`PointerEvent`]: the intersection record being dispatched, the
//! native event it came from, derived fields (normalized device coordinates, click distance,
//! unprojected point, ray, camera), the full ordered record list, and two controls:
//!
//! - [`PointerEvent::stop_propagation`] halts delivery to later records. While another object
//!   holds the event's pointer capture the request is refused, so a non-capturing object can
//!   never silence a capturing one.
//! - [`PointerEvent::target`] exposes `has/set/release_pointer_capture` bound to the record's
//!   event object.

use core::hash::Hash;

use glam::{Vec2, Vec3};
use kurbo::Point;
use tracing::{debug, trace};

use crate::camera::Camera;
use crate::capture::CaptureTracker;
use crate::types::{
    CaptureTarget, EventName, Face, InputKind, Intersection, Ray, RawPointerEvent,
};

/// Per-input data shared by every record dispatched for one raw event.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameInfo {
    /// The raw event as delivered by the windowing layer.
    pub native: RawPointerEvent,
    /// Which input produced this frame.
    pub kind: InputKind,
    /// Pointer position in normalized device coordinates (`[-1, 1]`, y up).
    pub ndc: Vec2,
    /// Picking ray.
    pub ray: Ray,
    /// Pointer position unprojected at NDC depth `0`.
    pub unprojected_point: Vec3,
    /// Rounded pixel distance from the last pointer-down, for click-family inputs; `0` otherwise.
    pub delta: f64,
}

impl Default for FrameInfo {
    fn default() -> Self {
        Self {
            native: RawPointerEvent::default(),
            kind: InputKind::PointerMove,
            ndc: Vec2::ZERO,
            ray: Ray::default(),
            unprojected_point: Vec3::ZERO,
            delta: 0.0,
        }
    }
}

/// The event passed to every handler.
pub struct PointerEvent<'a, O> {
    pub(crate) name: EventName,
    pub(crate) record: &'a Intersection<O>,
    pub(crate) position: usize,
    pub(crate) intersections: &'a [Intersection<O>],
    pub(crate) frame: &'a FrameInfo,
    pub(crate) camera: &'a Camera,
    pub(crate) stopped: bool,
    pub(crate) flush_requested: bool,
    pub(crate) captures: &'a mut CaptureTracker<O>,
    pub(crate) native_target: Option<&'a mut dyn CaptureTarget>,
}

impl<O: core::fmt::Debug> core::fmt::Debug for PointerEvent<'_, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PointerEvent")
            .field("name", &self.name)
            .field("record", self.record)
            .field("position", &self.position)
            .field("stopped", &self.stopped)
            .field("frame", self.frame)
            .finish_non_exhaustive()
    }
}

impl<'a, O: Copy + Eq + Hash + core::fmt::Debug> PointerEvent<'a, O> {
    pub(crate) fn new(
        name: EventName,
        record: &'a Intersection<O>,
        position: usize,
        intersections: &'a [Intersection<O>],
        frame: &'a FrameInfo,
        camera: &'a Camera,
        stopped: bool,
        captures: &'a mut CaptureTracker<O>,
        native_target: Option<&'a mut dyn CaptureTarget>,
    ) -> Self {
        Self {
            name,
            record,
            position,
            intersections,
            frame,
            camera,
            stopped,
            flush_requested: false,
            captures,
            native_target,
        }
    }

    /// Handler slot currently being invoked.
    pub fn name(&self) -> EventName {
        self.name
    }

    /// The record being dispatched.
    pub fn intersection(&self) -> &Intersection<O> {
        self.record
    }

    /// The object whose geometry was hit.
    pub fn object(&self) -> O {
        self.record.hit.object
    }

    /// The object whose handlers are running (the hit object or one of its ancestors).
    pub fn event_object(&self) -> O {
        self.record.event_object
    }

    /// Sub-index within the hit object.
    pub fn index(&self) -> Option<u32> {
        self.record.hit.index
    }

    /// Distance from the ray origin to the hit.
    pub fn distance(&self) -> f32 {
        self.record.hit.distance
    }

    /// World-space hit point.
    pub fn point(&self) -> Vec3 {
        self.record.hit.point
    }

    /// Face data, if the scene graph reported it.
    pub fn face(&self) -> Option<Face> {
        self.record.hit.face
    }

    /// Every record resolved for this input, in dispatch order.
    pub fn intersections(&self) -> &[Intersection<O>] {
        self.intersections
    }

    /// Pointer x in normalized device coordinates.
    pub fn space_x(&self) -> f32 {
        self.frame.ndc.x
    }

    /// Pointer y in normalized device coordinates.
    pub fn space_y(&self) -> f32 {
        self.frame.ndc.y
    }

    /// Rounded pixel distance to the last pointer-down for click-family events, `0` otherwise.
    pub fn delta(&self) -> f64 {
        self.frame.delta
    }

    /// Pointer position unprojected into the world at NDC depth `0`.
    pub fn unprojected_point(&self) -> Vec3 {
        self.frame.unprojected_point
    }

    /// Picking ray.
    pub fn ray(&self) -> Ray {
        self.frame.ray
    }

    /// Camera used to build the ray.
    pub fn camera(&self) -> &Camera {
        self.camera
    }

    /// Input that produced this event.
    pub fn kind(&self) -> InputKind {
        self.frame.kind
    }

    /// The raw event as delivered by the windowing layer.
    pub fn native_event(&self) -> &RawPointerEvent {
        &self.frame.native
    }

    /// Alias of [`native_event`](Self::native_event).
    #[deprecated(note = "use `native_event`")]
    pub fn source_event(&self) -> &RawPointerEvent {
        self.native_event()
    }

    /// Pointer position relative to the viewport.
    pub fn offset(&self) -> Point {
        self.frame.native.offset
    }

    /// Pointer id of the raw event, if any.
    pub fn pointer_id(&self) -> Option<i32> {
        self.frame.native.pointer_id
    }

    /// Returns true once propagation has been stopped for this record.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Stop delivery to later records.
    ///
    /// Refused while the event's pointer is captured by objects other than this record's event
    /// object. When accepted and this event object is hovered, hovered records behind it lose
    /// hover as soon as the current handler returns.
    pub fn stop_propagation(&mut self) {
        let event_object = self.record.event_object;
        if !self
            .captures
            .allows_stop(self.frame.native.pointer_id, event_object)
        {
            debug!(
                event_object = ?event_object,
                pointer_id = ?self.frame.native.pointer_id,
                "stop_propagation refused: pointer captured elsewhere"
            );
            return;
        }
        self.stopped = true;
        self.flush_requested = true;
    }

    /// Capture controls bound to this record's event object.
    pub fn target(&mut self) -> EventTarget<'_, 'a, O> {
        EventTarget { event: self }
    }

    /// Same as [`target`](Self::target); both are bound to the event object.
    pub fn current_target(&mut self) -> EventTarget<'_, 'a, O> {
        self.target()
    }

    pub(crate) fn take_flush_request(&mut self) -> bool {
        core::mem::take(&mut self.flush_requested)
    }
}

/// Pointer capture controls for one event object.
///
/// Obtained from [`PointerEvent::target`].
pub struct EventTarget<'e, 'a, O> {
    event: &'e mut PointerEvent<'a, O>,
}

impl<O: core::fmt::Debug> core::fmt::Debug for EventTarget<'_, '_, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventTarget")
            .field("event_object", &self.event.record.event_object)
            .finish_non_exhaustive()
    }
}

impl<O: Copy + Eq + Hash + core::fmt::Debug> EventTarget<'_, '_, O> {
    /// Returns true if this event object holds `pointer_id`.
    pub fn has_pointer_capture(&self, pointer_id: i32) -> bool {
        self.event
            .captures
            .has_pointer_capture(pointer_id, self.event.record.event_object)
    }

    /// Capture `pointer_id` for this event object.
    ///
    /// Until released, the current record is appended to every event carrying `pointer_id`,
    /// even when the ray misses the object.
    pub fn set_pointer_capture(&mut self, pointer_id: i32) {
        let record = self.event.record;
        debug!(event_object = ?record.event_object, pointer_id, "pointer captured");
        self.event
            .captures
            .set_pointer_capture(pointer_id, record.event_object, record.clone());
        if let Some(native) = self.event.native_target.as_mut() {
            native.set_pointer_capture(pointer_id);
        }
    }

    /// Release this event object's capture of `pointer_id`.
    ///
    /// The native element releases the pointer once no object holds it.
    pub fn release_pointer_capture(&mut self, pointer_id: i32) {
        let event_object = self.event.record.event_object;
        if !self
            .event
            .captures
            .release_pointer_capture(pointer_id, event_object)
        {
            trace!(event_object = ?event_object, pointer_id, "release without capture");
            return;
        }
        debug!(event_object = ?event_object, pointer_id, "pointer released");
        if !self.event.captures.is_captured(pointer_id)
            && let Some(native) = self.event.native_target.as_mut()
        {
            native.release_pointer_capture(pointer_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawHit;
    use alloc::vec;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct Element {
        calls: Vec<(&'static str, i32)>,
    }

    impl CaptureTarget for Element {
        fn set_pointer_capture(&mut self, pointer_id: i32) {
            self.calls.push(("set", pointer_id));
        }
        fn release_pointer_capture(&mut self, pointer_id: i32) {
            self.calls.push(("release", pointer_id));
        }
        fn has_pointer_capture(&self, _pointer_id: i32) -> bool {
            false
        }
    }

    fn rec(event_object: u32) -> Intersection<u32> {
        Intersection {
            hit: RawHit {
                object: 1,
                index: None,
                distance: 2.0,
                point: Vec3::ONE,
                face: None,
            },
            event_object,
        }
    }

    fn frame(pointer_id: Option<i32>) -> FrameInfo {
        FrameInfo {
            native: RawPointerEvent {
                pointer_id,
                ..RawPointerEvent::at(10.0, 20.0)
            },
            ..FrameInfo::default()
        }
    }

    #[test]
    fn capture_round_trip_forwards_to_native() {
        let records = vec![rec(1), rec(2)];
        let frame = frame(Some(4));
        let camera = Camera::default();
        let mut captures = CaptureTracker::new();
        let mut element = Element::default();
        {
            let mut ev = PointerEvent::new(
                EventName::PointerDown,
                &records[0],
                0,
                &records,
                &frame,
                &camera,
                false,
                &mut captures,
                Some(&mut element),
            );
            assert!(!ev.target().has_pointer_capture(4));
            ev.target().set_pointer_capture(4);
            assert!(ev.current_target().has_pointer_capture(4));
            ev.target().release_pointer_capture(4);
            ev.target().release_pointer_capture(4);
        }
        assert!(!captures.is_captured(4));
        assert_eq!(element.calls, vec![("set", 4), ("release", 4)]);
    }

    #[test]
    fn native_release_waits_for_last_capturer() {
        let records = vec![rec(1), rec(2)];
        let frame = frame(Some(4));
        let camera = Camera::default();
        let mut captures = CaptureTracker::new();
        captures.set_pointer_capture(4, 2, rec(2));
        let mut element = Element::default();
        {
            let mut ev = PointerEvent::new(
                EventName::PointerUp,
                &records[0],
                0,
                &records,
                &frame,
                &camera,
                false,
                &mut captures,
                Some(&mut element),
            );
            ev.target().set_pointer_capture(4);
            ev.target().release_pointer_capture(4);
        }
        assert!(captures.has_pointer_capture(4, 2));
        assert_eq!(element.calls, vec![("set", 4)]);
    }

    #[test]
    fn stop_refused_while_captured_elsewhere() {
        let records = vec![rec(1)];
        let frame = frame(Some(4));
        let camera = Camera::default();
        let mut captures = CaptureTracker::new();
        captures.set_pointer_capture(4, 9, rec(9));
        let mut ev = PointerEvent::new(
            EventName::PointerMove,
            &records[0],
            0,
            &records,
            &frame,
            &camera,
            false,
            &mut captures,
            None,
        );
        ev.stop_propagation();
        assert!(!ev.is_stopped());
        assert!(!ev.take_flush_request());
    }

    #[test]
    fn accessors_reflect_record_and_frame() {
        let records = vec![rec(7)];
        let frame = frame(None);
        let camera = Camera::default();
        let mut captures = CaptureTracker::new();
        let mut ev = PointerEvent::new(
            EventName::Click,
            &records[0],
            0,
            &records,
            &frame,
            &camera,
            false,
            &mut captures,
            None,
        );
        assert_eq!(ev.object(), 1);
        assert_eq!(ev.event_object(), 7);
        assert_eq!(ev.point(), Vec3::ONE);
        assert_eq!(ev.offset(), Point::new(10.0, 20.0));
        assert_eq!(ev.intersections().len(), 1);
        ev.stop_propagation();
        assert!(ev.is_stopped());
        assert!(ev.take_flush_request());
        assert!(!ev.take_flush_request(), "flush requests are consumed");
    }
}
