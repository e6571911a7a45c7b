// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raycaster configuration and pointer-to-ray conversion.

use alloc::boxed::Box;
use alloc::vec::Vec;

use glam::Vec2;
use kurbo::{Point, Size};

use crate::camera::Camera;
use crate::types::{RawHit, RawPointerEvent, Ray};

/// Re-sorts or eliminates raw hits after deduplication. Its output is used verbatim.
pub type HitFilter<O> = Box<dyn Fn(Vec<RawHit<O>>) -> Vec<RawHit<O>>>;

/// Extracts the viewport offset from a raw event, given the viewport size.
pub type ComputeOffsets = Box<dyn Fn(&RawPointerEvent, Size) -> Point>;

/// Raycaster settings consulted on every input.
pub struct RaycastConfig<O> {
    /// When false, nothing is ray tested; only captured records are dispatched.
    pub enabled: bool,
    /// Optional user ordering of raw hits.
    pub filter: Option<HitFilter<O>>,
    /// Optional override of [`RawPointerEvent::offset`].
    pub compute_offsets: Option<ComputeOffsets>,
}

impl<O> Default for RaycastConfig<O> {
    fn default() -> Self {
        Self {
            enabled: true,
            filter: None,
            compute_offsets: None,
        }
    }
}

impl<O> core::fmt::Debug for RaycastConfig<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RaycastConfig")
            .field("enabled", &self.enabled)
            .field("filter", &self.filter.is_some())
            .field("compute_offsets", &self.compute_offsets.is_some())
            .finish()
    }
}

impl<O> RaycastConfig<O> {
    /// Install a hit filter.
    pub fn set_filter<F>(&mut self, filter: F)
    where
        F: Fn(Vec<RawHit<O>>) -> Vec<RawHit<O>> + 'static,
    {
        self.filter = Some(Box::new(filter));
    }

    /// Install an offset override.
    pub fn set_compute_offsets<F>(&mut self, compute: F)
    where
        F: Fn(&RawPointerEvent, Size) -> Point + 'static,
    {
        self.compute_offsets = Some(Box::new(compute));
    }
}

/// Convert a viewport offset to normalized device coordinates (`[-1, 1]`, y up).
pub fn pointer_to_ndc(offset: Point, size: Size) -> Vec2 {
    let x = (offset.x / size.width) * 2.0 - 1.0;
    let y = -(offset.y / size.height) * 2.0 + 1.0;
    #[allow(
        clippy::cast_possible_truncation,
        reason = "NDC values are small; f32 precision is what the camera uses."
    )]
    Vec2::new(x as f32, y as f32)
}

/// Build the picking ray for `event`. Returns the NDC position and the ray.
pub fn prepare_ray(
    event: &RawPointerEvent,
    size: Size,
    camera: &Camera,
    compute_offsets: Option<&ComputeOffsets>,
) -> (Vec2, Ray) {
    let offset = match compute_offsets {
        Some(compute) => compute(event, size),
        None => event.offset,
    };
    let ndc = pointer_to_ndc(offset, size);
    (ndc, camera.ray_from_ndc(ndc))
}
