//! Projection helpers shared by the CPU evaluator and the rasterizer.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::types::Viewport;

/// Clip-space w at or below this is treated as behind the camera.
pub const MIN_CLIP_W: f32 = 1e-6;

/// Distance in front of the camera of a model-space point.
///
/// Camera space looks down -Z, so the depth is the negated z of the
/// model-view transformed position.
#[inline]
pub fn view_depth(model_view: Mat4, position: Vec3) -> f32 {
    -(model_view * position.extend(1.0)).z
}

/// Map normalized device coordinates to pixel coordinates.
///
/// NDC y points up; pixel y points down with the origin in the top-left.
/// `size` is the viewport size in pixels.
#[inline]
pub fn ndc_to_pixel(ndc: Vec2, size: Vec2) -> Vec2 {
    Vec2::new((ndc.x + 1.0) * 0.5 * size.x, (1.0 - ndc.y) * 0.5 * size.y)
}

/// Perspective divide a clip-space position. `None` if behind the camera.
#[inline]
pub fn clip_to_ndc(clip: Vec4) -> Option<Vec3> {
    if clip.w <= MIN_CLIP_W {
        return None;
    }
    Some(clip.truncate() / clip.w)
}

/// Project a model-space point to a pixel coordinate in a viewport of
/// `size` pixels.
///
/// Returns `None` for points behind the camera.
#[inline]
pub fn project_to_pixel(model_view_projection: Mat4, position: Vec3, size: Vec2) -> Option<Vec2> {
    let ndc = clip_to_ndc(model_view_projection * position.extend(1.0))?;
    Some(ndc_to_pixel(ndc.truncate(), size))
}

/// Axis-Aligned Bounding Box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point; `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut aabb = Self::new(first, first);
        for point in points {
            aabb.expand_to_include(point);
        }
        Some(aabb)
    }

    /// Expand AABB to include a point
    #[inline]
    pub fn expand_to_include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn viewport() -> Viewport {
        Viewport::new(640, 480).unwrap()
    }

    #[test]
    fn view_depth_is_negated_z() {
        let model_view = Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0));
        assert_relative_eq!(view_depth(model_view, Vec3::ZERO), 2.0);
        assert_relative_eq!(view_depth(model_view, Vec3::new(0.0, 0.0, 0.5)), 1.5);
    }

    #[test]
    fn ndc_corners_map_to_viewport_corners() {
        let top_left = ndc_to_pixel(Vec2::new(-1.0, 1.0), viewport().size_f32());
        let bottom_right = ndc_to_pixel(Vec2::new(1.0, -1.0), viewport().size_f32());
        let center = ndc_to_pixel(Vec2::ZERO, viewport().size_f32());
        assert_eq!(top_left, Vec2::ZERO);
        assert_eq!(bottom_right, Vec2::new(640.0, 480.0));
        assert_eq!(center, Vec2::new(320.0, 240.0));
    }

    #[test]
    fn point_on_view_axis_projects_to_center() {
        let projection = Mat4::perspective_rh(1.0, viewport().aspect(), 0.01, 100.0);
        let pixel = project_to_pixel(projection, Vec3::new(0.0, 0.0, -3.0), viewport().size_f32()).unwrap();
        assert_relative_eq!(pixel.x, 320.0, epsilon = 1e-3);
        assert_relative_eq!(pixel.y, 240.0, epsilon = 1e-3);
    }

    #[test]
    fn point_behind_camera_does_not_project() {
        let projection = Mat4::perspective_rh(1.0, viewport().aspect(), 0.01, 100.0);
        assert!(project_to_pixel(projection, Vec3::new(0.0, 0.0, 3.0), viewport().size_f32()).is_none());
    }

    #[test]
    fn aabb_from_points() {
        let aabb = Aabb::from_points([Vec3::ONE, -Vec3::ONE, Vec3::new(0.0, 2.0, 0.0)]).unwrap();
        assert_eq!(aabb.min, -Vec3::ONE);
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 1.0));
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }
}
