// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Camera: projection, view placement, unprojection, and picking rays.
//!
//! Matrices follow OpenGL clip conventions (right-handed view space, NDC depth in `[-1, 1]`),
//! so an NDC depth of `0` lies between the near and far planes.

use glam::{Mat4, Vec2, Vec3};

use crate::types::Ray;

const EPSILON: f32 = 1e-12;

/// Errors from building or re-aiming a [`Camera`].
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
pub enum CameraError {
    /// Aspect ratio was zero, negative, or not finite.
    #[error("aspect ratio must be positive and finite, got {0}")]
    InvalidAspect(f32),
    /// Vertical field of view outside `(0, pi)`.
    #[error("vertical field of view must be in (0, pi) radians, got {0}")]
    InvalidFov(f32),
    /// Near/far planes were not finite, coincided, or (for perspective) were not `0 < near < far`.
    #[error("invalid depth range near={near} far={far}")]
    InvalidDepthRange {
        /// Near plane.
        near: f32,
        /// Far plane.
        far: f32,
    },
    /// Orthographic extents were not finite or had zero width or height.
    #[error("orthographic extents must be finite with non-zero width and height")]
    DegenerateExtents,
    /// The eye and the target are the same point.
    #[error("camera eye coincides with its target")]
    EyeAtTarget,
    /// The up vector is zero or parallel to the view direction.
    #[error("camera up vector is parallel to the view direction")]
    UpParallel,
}

/// Camera projection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Projection {
    /// Perspective projection.
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        /// Width over height.
        aspect: f32,
        /// Near plane distance.
        near: f32,
        /// Far plane distance.
        far: f32,
    },
    /// Orthographic projection.
    Orthographic {
        /// Left extent.
        left: f32,
        /// Right extent.
        right: f32,
        /// Bottom extent.
        bottom: f32,
        /// Top extent.
        top: f32,
        /// Near plane distance.
        near: f32,
        /// Far plane distance.
        far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Self::Perspective {
            fov_y: 75.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Projection {
    /// Check that the projection yields an invertible matrix.
    pub fn validate(&self) -> Result<(), CameraError> {
        match *self {
            Self::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => {
                if !(fov_y > 0.0 && fov_y < core::f32::consts::PI) {
                    return Err(CameraError::InvalidFov(fov_y));
                }
                if !(aspect.is_finite() && aspect > 0.0) {
                    return Err(CameraError::InvalidAspect(aspect));
                }
                if !(near.is_finite() && far.is_finite() && near > 0.0 && far > near) {
                    return Err(CameraError::InvalidDepthRange { near, far });
                }
            }
            Self::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => {
                let finite = [left, right, bottom, top].iter().all(|v| v.is_finite());
                if !finite || left == right || bottom == top {
                    return Err(CameraError::DegenerateExtents);
                }
                if !(near.is_finite() && far.is_finite()) || near == far {
                    return Err(CameraError::InvalidDepthRange { near, far });
                }
            }
        }
        Ok(())
    }

    /// Projection matrix (OpenGL clip conventions).
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Self::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh_gl(fov_y, aspect, near, far),
            Self::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh_gl(left, right, bottom, top, near, far),
        }
    }
}

/// A camera placed in the world.
///
/// Matrices are cached and rebuilt whenever the projection or placement changes.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    projection: Projection,
    position: Vec3,
    target: Vec3,
    up: Vec3,
    view: Mat4,
    world: Mat4,
    projection_matrix: Mat4,
    projection_inverse: Mat4,
}

impl Default for Camera {
    /// A 75° perspective camera at `(0, 0, 5)` looking at the origin.
    fn default() -> Self {
        let mut camera = Self {
            projection: Projection::default(),
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            view: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            projection_inverse: Mat4::IDENTITY,
        };
        camera.update_matrices();
        camera
    }
}

impl Camera {
    /// Create a camera with `projection`, placed at `(0, 0, 5)` looking at the origin.
    pub fn new(projection: Projection) -> Result<Self, CameraError> {
        projection.validate()?;
        let mut camera = Self {
            projection,
            ..Self::default()
        };
        camera.update_matrices();
        Ok(camera)
    }

    /// Perspective camera; `fov_y` is in radians.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Result<Self, CameraError> {
        Self::new(Projection::Perspective {
            fov_y,
            aspect,
            near,
            far,
        })
    }

    /// Orthographic camera.
    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Result<Self, CameraError> {
        Self::new(Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            near,
            far,
        })
    }

    /// Place the camera at `eye`, looking at `target`.
    ///
    /// On error the camera is left unchanged.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) -> Result<(), CameraError> {
        let dir = target - eye;
        if !(dir.length_squared() > EPSILON) {
            return Err(CameraError::EyeAtTarget);
        }
        if dir.normalize().cross(up.normalize_or_zero()).length_squared() < EPSILON {
            return Err(CameraError::UpParallel);
        }
        self.position = eye;
        self.target = target;
        self.up = up;
        self.update_matrices();
        Ok(())
    }

    /// Replace the projection. On error the camera is left unchanged.
    pub fn set_projection(&mut self, projection: Projection) -> Result<(), CameraError> {
        projection.validate()?;
        self.projection = projection;
        self.update_matrices();
        Ok(())
    }

    /// Adapt the projection to a new viewport aspect ratio.
    ///
    /// Orthographic cameras keep their vertical extent and horizontal center.
    pub fn set_aspect(&mut self, aspect: f32) -> Result<(), CameraError> {
        if !(aspect.is_finite() && aspect > 0.0) {
            return Err(CameraError::InvalidAspect(aspect));
        }
        let projection = match self.projection {
            Projection::Perspective {
                fov_y, near, far, ..
            } => Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            },
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => {
                let center = (left + right) * 0.5;
                let half_width = (top - bottom) * 0.5 * aspect;
                Projection::Orthographic {
                    left: center - half_width,
                    right: center + half_width,
                    bottom,
                    top,
                    near,
                    far,
                }
            }
        };
        self.set_projection(projection)
    }

    /// Current projection.
    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Eye position in world space.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Point the camera looks at.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Unit view direction in world space.
    pub fn forward(&self) -> Vec3 {
        self.world.transform_vector3(Vec3::NEG_Z).normalize_or_zero()
    }

    /// World-to-camera matrix.
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// Camera-to-world matrix.
    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    /// Projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// Map a point in normalized device coordinates back to world space.
    pub fn unproject(&self, ndc: Vec3) -> Vec3 {
        let view_space = self.projection_inverse.project_point3(ndc);
        self.world.transform_point3(view_space)
    }

    /// Picking ray through `ndc` (x and y in `[-1, 1]`, y up).
    ///
    /// Perspective rays start at the eye. Orthographic rays start in the camera plane and run
    /// along the view direction.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        match self.projection {
            Projection::Perspective { .. } => {
                let through = self.unproject(ndc.extend(0.5));
                Ray::new(self.position, through - self.position)
            }
            Projection::Orthographic { near, far, .. } => {
                let origin = self.unproject(ndc.extend((near + far) / (near - far)));
                Ray::new(origin, self.forward())
            }
        }
    }

    fn update_matrices(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.target, self.up);
        self.world = self.view.inverse();
        self.projection_matrix = self.projection.matrix();
        self.projection_inverse = self.projection_matrix.inverse();
    }
}
