// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rays, ray hits, and the primitive intersection tests used by the tree.

use glam::Vec3;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::types::{Aabb3, NodeId};

/// A ray in world space.
///
/// `direction` is expected to be normalized so that hit distances are in world units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Ray origin.
    pub origin: Vec3,
    /// Ray direction.
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

/// A single ray/shape intersection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// The node whose shape was hit.
    pub node: NodeId,
    /// Position within [`Shape::Instances`](crate::Shape::Instances), if the shape has instances.
    pub instance: Option<u32>,
    /// World-space distance from the ray origin.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
    /// World-space surface normal at the hit point.
    pub normal: Vec3,
    /// Face that was hit: `0..6` for box faces (`-x, +x, -y, +y, -z, +z`), `0` for spheres.
    pub face: u32,
}

const PARALLEL_EPSILON: f32 = 1e-12;

/// Slab test. Returns the ray parameter, the outward face normal, and the face index.
///
/// When the origin is inside the box the exit face is reported.
pub(crate) fn ray_aabb(origin: Vec3, direction: Vec3, aabb: &Aabb3) -> Option<(f32, Vec3, u32)> {
    if direction.length_squared() < PARALLEL_EPSILON {
        return None;
    }
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_axis = 0_usize;
    let mut exit_axis = 0_usize;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let (lo, hi) = (aabb.min[axis], aabb.max[axis]);
        if d.abs() < PARALLEL_EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (t0, t1) = {
            let a = (lo - o) * inv;
            let b = (hi - o) * inv;
            if a <= b { (a, b) } else { (b, a) }
        };
        if t0 > t_enter {
            t_enter = t0;
            enter_axis = axis;
        }
        if t1 < t_exit {
            t_exit = t1;
            exit_axis = axis;
        }
        if t_enter > t_exit {
            return None;
        }
    }

    if t_exit < 0.0 {
        return None;
    }
    let (t, axis, outward) = if t_enter >= 0.0 {
        (t_enter, enter_axis, -direction[enter_axis].signum())
    } else {
        (t_exit, exit_axis, direction[exit_axis].signum())
    };
    let mut normal = Vec3::ZERO;
    normal[axis] = outward;
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Axis index is always below 3."
    )]
    let face = axis as u32 * 2 + u32::from(outward > 0.0);
    Some((t, normal, face))
}

/// Ray/sphere test. Returns the ray parameter and the outward normal.
pub(crate) fn ray_sphere(
    origin: Vec3,
    direction: Vec3,
    center: Vec3,
    radius: f32,
) -> Option<(f32, Vec3)> {
    let oc = origin - center;
    let a = direction.length_squared();
    if a < PARALLEL_EPSILON {
        return None;
    }
    let b = oc.dot(direction);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let s = disc.sqrt();
    let mut t = (-b - s) / a;
    if t < 0.0 {
        t = (-b + s) / a;
    }
    if t < 0.0 {
        return None;
    }
    let p = origin + direction * t;
    Some((t, (p - center) / radius))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slab_hits_front_face() {
        let b = Aabb3::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let (t, n, face) = ray_aabb(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, &b).unwrap();
        assert!((t - 4.0).abs() < 1e-6);
        assert_eq!(n, Vec3::Z);
        assert_eq!(face, 5);
    }

    #[test]
    fn slab_misses_parallel_outside() {
        let b = Aabb3::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!(ray_aabb(Vec3::new(2.0, 0.0, 5.0), Vec3::NEG_Z, &b).is_none());
        // Box entirely behind the origin.
        assert!(ray_aabb(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, &b).is_none());
    }

    #[test]
    fn slab_from_inside_reports_exit() {
        let b = Aabb3::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let (t, n, _) = ray_aabb(Vec3::ZERO, Vec3::X, &b).unwrap();
        assert!((t - 1.0).abs() < 1e-6);
        assert_eq!(n, Vec3::X);
    }

    #[test]
    fn sphere_hit_distance_and_normal() {
        let (t, n) = ray_sphere(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z, Vec3::ZERO, 2.0).unwrap();
        assert!((t - 8.0).abs() < 1e-5);
        assert!((n - Vec3::Z).length() < 1e-5);
        assert!(ray_sphere(Vec3::new(3.0, 0.0, 10.0), Vec3::NEG_Z, Vec3::ZERO, 2.0).is_none());
    }

    #[test]
    fn ray_new_normalizes() {
        let r = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(r.direction, Vec3::NEG_Z);
        assert_eq!(r.at(2.0), Vec3::new(0.0, 0.0, -2.0));
    }
}
