//! AR camera model.

use depthgate_core::Viewport;
use glam::{Mat4, Vec3};

/// Camera pose and intrinsics for one AR frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ArCamera {
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ArCamera {
    /// Session origin, looking down -Z, roughly a phone's wide camera.
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 60f32.to_radians(),
            aspect: 4.0 / 3.0,
            near: 0.001,
            far: 100.0,
        }
    }
}

impl ArCamera {
    /// Default camera with the aspect ratio of `viewport`.
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            aspect: viewport.aspect(),
            ..Self::default()
        }
    }

    /// Set the camera position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Look at a target position.
    pub fn look_at(&mut self, target: Vec3) {
        self.direction = (target - self.position).normalize();
    }

    /// Set the aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.direction, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Get the view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
