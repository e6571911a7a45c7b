// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The event system: turns raw input into handler invocations.
//!
//! ## Flow for one input
//!
//! 1) `pointerleave` / `pointercancel` clear hover and stop there. `lostpointercapture` also
//!    drops the captures of the event's pointer id.
//! 2) Otherwise the ray is built, hits are [resolved](crate::resolver::intersect) (moves only
//!    test objects with hover or move handlers), and captured records are appended.
//! 3) Moves first drop hover for entries no longer hit (out, then leave).
//! 4) Records are dispatched in order until one is stopped. Moves run over/enter for records
//!    not yet hovered, then move. Other inputs run their own handler, with click-family inputs
//!    restricted to objects that were hit at the last pointer-down, and each delivery tells every
//!    other interactive object `onPointerMissed`.
//! 5) Pointer-down remembers the position and the hit event objects.
//! 6) A click-family input that hit nothing within [`CLICK_MISS_TOLERANCE`] pixels of the
//!    pointer-down notifies every interactive object and the scene-level callback.
//!
//! Everything runs synchronously inside [`EventSystem::handle_pointer`]. Handlers cannot reach
//! the registry, so the set of interactive objects is fixed for the duration of one input.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Size};
use tracing::{debug, trace};

use crate::camera::Camera;
use crate::capture::CaptureTracker;
use crate::event::{FrameInfo, PointerEvent};
use crate::handlers::{HandlerMask, HandlerRegistry};
use crate::hover::{HoverEntry, HoverState};
use crate::raycast::{RaycastConfig, prepare_ray};
use crate::resolver;
use crate::types::{
    CaptureTarget, EventName, InputKind, Intersection, NoCaptureTarget, RawPointerEvent,
    SceneGraph,
};

/// Largest pointer travel, in pixels, for which a click that hit nothing still counts as a miss.
pub const CLICK_MISS_TOLERANCE: f64 = 2.0;

/// Pointer event engine for one viewport.
///
/// Owns the persistent interaction state (hover set, pointer captures, last pointer-down) and
/// the handler table. The scene graph is borrowed per input.
pub struct EventSystem<O, T = NoCaptureTarget> {
    config: RaycastConfig<O>,
    camera: Camera,
    size: Size,
    handlers: HandlerRegistry<O>,
    hovered: HoverState<O>,
    captures: CaptureTracker<O>,
    initial_click: Point,
    initial_hits: Vec<O>,
    target: Option<T>,
}

impl<O: Debug, T> Debug for EventSystem<O, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventSystem")
            .field("config", &self.config)
            .field("camera", &self.camera)
            .field("size", &self.size)
            .field("handlers", &self.handlers)
            .field("hovered", &self.hovered.len())
            .field("initial_click", &self.initial_click)
            .field("initial_hits", &self.initial_hits)
            .field("connected", &self.target.is_some())
            .finish_non_exhaustive()
    }
}

impl<O, T> EventSystem<O, T>
where
    O: Copy + Eq + Hash + Debug,
    T: CaptureTarget,
{
    /// Create an event system for a viewport of `size` seen through `camera`.
    pub fn new(camera: Camera, size: Size) -> Self {
        Self {
            config: RaycastConfig::default(),
            camera,
            size,
            handlers: HandlerRegistry::new(),
            hovered: HoverState::new(),
            captures: CaptureTracker::new(),
            initial_click: Point::ZERO,
            initial_hits: Vec::new(),
            target: None,
        }
    }

    /// Attach the native element that receives capture requests. Returns the previous one.
    pub fn connect(&mut self, target: T) -> Option<T> {
        self.target.replace(target)
    }

    /// Detach and return the native element.
    pub fn disconnect(&mut self) -> Option<T> {
        self.target.take()
    }

    /// The attached native element.
    pub fn connected(&self) -> Option<&T> {
        self.target.as_ref()
    }

    /// Raycaster settings.
    pub fn config(&self) -> &RaycastConfig<O> {
        &self.config
    }

    /// Mutable raycaster settings.
    pub fn config_mut(&mut self) -> &mut RaycastConfig<O> {
        &mut self.config
    }

    /// Active camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Replace the active camera.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Viewport size in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Set the viewport size. The camera's aspect ratio is left to the caller.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Handler table.
    pub fn handlers(&self) -> &HandlerRegistry<O> {
        &self.handlers
    }

    /// Mutable handler table, for the layer that creates and destroys objects.
    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry<O> {
        &mut self.handlers
    }

    /// Currently hovered records.
    pub fn hovered(&self) -> &HoverState<O> {
        &self.hovered
    }

    /// Current pointer captures.
    pub fn captures(&self) -> &CaptureTracker<O> {
        &self.captures
    }

    /// Offset of the last pointer-down.
    pub fn initial_click(&self) -> Point {
        self.initial_click
    }

    /// Event objects resolved at the last pointer-down.
    pub fn initial_hits(&self) -> &[O] {
        &self.initial_hits
    }

    /// A listener for `kind`, suitable for attaching to the input source.
    pub fn handler_for<'s, S>(
        &'s mut self,
        scene: &'s S,
        kind: InputKind,
    ) -> impl FnMut(&RawPointerEvent) + 's
    where
        S: SceneGraph<Object = O>,
    {
        move |event: &RawPointerEvent| self.handle_pointer(scene, kind, event)
    }

    /// Process one raw input.
    pub fn handle_pointer<S>(&mut self, scene: &S, kind: InputKind, event: &RawPointerEvent)
    where
        S: SceneGraph<Object = O>,
    {
        match kind {
            InputKind::PointerLeave | InputKind::PointerCancel => {
                debug!(input = kind.dom_name(), "clearing hover");
                self.cancel_pointer(&[]);
                return;
            }
            InputKind::LostPointerCapture => {
                if let Some(pointer_id) = event.pointer_id
                    && self.captures.clear(pointer_id)
                {
                    debug!(pointer_id, "pointer capture lost");
                }
                self.cancel_pointer(&[]);
                return;
            }
            _ => {}
        }

        let (ndc, ray) = prepare_ray(
            event,
            self.size,
            &self.camera,
            self.config.compute_offsets.as_ref(),
        );
        let is_move = kind == InputKind::PointerMove;
        let candidates = if is_move {
            HandlerMask::MOVE_CANDIDATES
        } else {
            HandlerMask::all()
        };
        let mut hits = resolver::intersect(scene, &ray, &self.handlers, &self.config, candidates);
        self.captures.patch_intersects(&mut hits, event.pointer_id);

        let frame = FrameInfo {
            native: event.clone(),
            kind,
            ndc,
            ray,
            unprojected_point: self.camera.unproject(ndc.extend(0.0)),
            delta: if kind.is_click_family() {
                self.click_distance(event)
            } else {
                0.0
            },
        };

        if is_move {
            self.cancel_pointer(&hits);
        }

        self.handle_intersects(&hits, &frame);

        if kind == InputKind::PointerDown {
            self.initial_click = event.offset;
            self.initial_hits = hits.iter().map(|h| h.event_object).collect();
        }

        if kind.is_click_family() && hits.is_empty() && frame.delta <= CLICK_MISS_TOLERANCE {
            debug!(input = kind.dom_name(), delta = frame.delta, "pointer missed");
            let _ = self.handlers.notify_missed(event, None);
            let _ = self.handlers.notify_global_missed(event);
        }
    }

    /// Rounded pixel distance between `event` and the last pointer-down.
    fn click_distance(&self, event: &RawPointerEvent) -> f64 {
        (event.offset - self.initial_click).hypot().round()
    }

    /// Drop hover for entries whose primitive is not in `hits` (all of them when empty).
    fn cancel_pointer(&mut self, hits: &[Intersection<O>]) {
        let removed = self.hovered.retain_hits(hits);
        if removed.is_empty() {
            return;
        }
        let native = self
            .target
            .as_mut()
            .map(|t| t as &mut dyn CaptureTarget);
        notify_hover_exit(
            &mut self.handlers,
            &removed,
            hits,
            &self.camera,
            &mut self.captures,
            native,
        );
    }

    fn handle_intersects(&mut self, hits: &[Intersection<O>], frame: &FrameInfo) {
        let Self {
            handlers,
            hovered,
            captures,
            camera,
            target,
            initial_hits,
            ..
        } = self;
        let camera = &*camera;
        let mut native = target.as_mut().map(|t| t as &mut dyn CaptureTarget);
        let kind = frame.kind;

        for (position, record) in hits.iter().enumerate() {
            let object = record.event_object;
            // A captured record may outlive its object's handler set.
            let Some(mask) = handlers.mask_of(object) else {
                continue;
            };
            let mut event = PointerEvent::new(
                kind.event_name(),
                record,
                position,
                hits,
                frame,
                camera,
                false,
                captures,
                reborrow(&mut native),
            );

            if kind == InputKind::PointerMove {
                let mut entered = false;
                if mask.intersects(HandlerMask::HOVER) {
                    let id = record.hover_id();
                    match hovered.get(id).map(|e| e.stopped) {
                        None => {
                            let _ = hovered.insert(HoverEntry::new(record.clone(), frame.clone()));
                            entered = true;
                            debug!(event_object = ?object, index = ?record.index(), "hover entered");
                            deliver(handlers, hovered, camera, EventName::PointerOver, &mut event);
                            deliver(handlers, hovered, camera, EventName::PointerEnter, &mut event);
                        }
                        Some(true) => {
                            event.stop_propagation();
                            flush_if_requested(handlers, hovered, camera, &mut event);
                        }
                        Some(false) => {}
                    }
                }
                deliver(handlers, hovered, camera, EventName::PointerMove, &mut event);
                if entered && event.stopped {
                    hovered.mark_stopped(record.hover_id());
                }
            } else {
                let name = kind.event_name();
                let gated = name.is_click_family() && !initial_hits.contains(&object);
                if mask.contains(HandlerMask::from(name)) && !gated {
                    deliver(handlers, hovered, camera, name, &mut event);
                    let _ = handlers.notify_missed(&frame.native, Some(object));
                }
            }

            if event.stopped {
                trace!(event_object = ?object, position, "propagation stopped");
                break;
            }
        }
    }
}

fn reborrow<'s>(
    target: &'s mut Option<&mut dyn CaptureTarget>,
) -> Option<&'s mut dyn CaptureTarget> {
    match target {
        Some(t) => Some(&mut **t),
        None => None,
    }
}

fn deliver<O>(
    handlers: &mut HandlerRegistry<O>,
    hovered: &mut HoverState<O>,
    camera: &Camera,
    name: EventName,
    event: &mut PointerEvent<'_, O>,
) where
    O: Copy + Eq + Hash + Debug,
{
    event.name = name;
    let object = event.record.event_object;
    if handlers.call(object, name, event) {
        trace!(handler = name.handler_name(), event_object = ?object, "delivered");
    }
    flush_if_requested(handlers, hovered, camera, event);
}

/// Apply a stop requested during the last handler: if the stopping object is hovered, hovered
/// records that are not among the records up to and including it lose hover.
fn flush_if_requested<O>(
    handlers: &mut HandlerRegistry<O>,
    hovered: &mut HoverState<O>,
    camera: &Camera,
    event: &mut PointerEvent<'_, O>,
) where
    O: Copy + Eq + Hash + Debug,
{
    if !event.take_flush_request() || !hovered.contains_event_object(event.record.event_object) {
        return;
    }
    let all = event.intersections;
    let reached = &all[..=event.position];
    let removed = hovered.retain_hits(reached);
    if removed.is_empty() {
        return;
    }
    debug!(
        event_object = ?event.record.event_object,
        occluded = removed.len(),
        "stop cleared occluded hover"
    );
    notify_hover_exit(
        handlers,
        &removed,
        reached,
        camera,
        &mut *event.captures,
        reborrow(&mut event.native_target),
    );
}

/// Fire out then leave for each removed entry, replaying the frame it was entered in.
///
/// Stop requests from these handlers have no effect on the current dispatch.
fn notify_hover_exit<O>(
    handlers: &mut HandlerRegistry<O>,
    removed: &[HoverEntry<O>],
    current: &[Intersection<O>],
    camera: &Camera,
    captures: &mut CaptureTracker<O>,
    mut native: Option<&mut dyn CaptureTarget>,
) where
    O: Copy + Eq + Hash + Debug,
{
    for entry in removed {
        let object = entry.record.event_object;
        debug!(event_object = ?object, index = ?entry.record.index(), "hover left");
        let mut event = PointerEvent::new(
            EventName::PointerOut,
            &entry.record,
            0,
            current,
            &entry.frame,
            camera,
            entry.stopped,
            captures,
            reborrow(&mut native),
        );
        let _ = handlers.call(object, EventName::PointerOut, &mut event);
        event.name = EventName::PointerLeave;
        let _ = handlers.call(object, EventName::PointerLeave, &mut event);
    }
}
