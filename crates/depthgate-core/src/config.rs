//! Occlusion probe configuration.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::{BOX_SIZE, CYLINDER_HEIGHT, CYLINDER_RADIUS, PROBE_DISTANCE};

/// How the depth adapter maps viewport pixels back onto the source frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFilter {
    /// Source pixel containing the mapped point.
    #[default]
    Nearest,
    /// Interpolate the four neighbouring source pixel centers.
    Bilinear,
}

/// How a fragment's screen pixel is derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionMode {
    /// Model-view-projection, perspective divide, viewport mapping.
    #[default]
    ClipSpace,
    /// `texcoord * viewport`. Only screen-correct for geometry whose texture
    /// coordinates happen to line up with the screen.
    TexcoordApprox,
}

/// Which depth stream of a camera update drives occlusion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthSource {
    /// Temporally smoothed scene depth.
    #[default]
    Smoothed,
    /// Per-frame scene depth.
    Raw,
}

/// Shape and size of the probe, in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ProbeShape {
    /// Axis-aligned box centered on the node origin.
    Box { width: f32, height: f32, length: f32 },
    /// Cylinder along the local Y axis, centered on the node origin.
    Cylinder { radius: f32, height: f32 },
}

impl ProbeShape {
    /// Cube with the default edge length.
    pub const fn default_box() -> Self {
        Self::Box {
            width: BOX_SIZE,
            height: BOX_SIZE,
            length: BOX_SIZE,
        }
    }

    /// Thin, long cylinder.
    pub const fn default_cylinder() -> Self {
        Self::Cylinder {
            radius: CYLINDER_RADIUS,
            height: CYLINDER_HEIGHT,
        }
    }
}

impl Default for ProbeShape {
    fn default() -> Self {
        Self::default_cylinder()
    }
}

/// Fixed placement of the probe node relative to the session origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbePlacement {
    /// Translation in meters.
    pub translation: Vec3,
    /// XYZ Euler rotation in radians.
    pub euler: Vec3,
}

impl Default for ProbePlacement {
    /// Just in front of the camera start pose, rotated so a cylinder runs
    /// along the view axis.
    fn default() -> Self {
        Self {
            translation: Vec3::new(0.0, 0.0, -PROBE_DISTANCE),
            euler: Vec3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0),
        }
    }
}

impl ProbePlacement {
    /// Model matrix for this placement.
    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(glam::EulerRot::XYZ, self.euler.x, self.euler.y, self.euler.z);
        Mat4::from_rotation_translation(rotation, self.translation)
    }
}

/// Everything that tunes the probe and its occlusion test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcclusionConfig {
    pub filter: SampleFilter,
    pub projection: ProjectionMode,
    pub depth_source: DepthSource,
    /// Use the other depth stream when the preferred one is missing.
    pub depth_fallback: bool,
    pub shape: ProbeShape,
    pub placement: ProbePlacement,
    /// Linear RGB color of kept fragments.
    pub color: [f32; 3],
}

impl Default for OcclusionConfig {
    fn default() -> Self {
        Self {
            filter: SampleFilter::default(),
            projection: ProjectionMode::default(),
            depth_source: DepthSource::default(),
            depth_fallback: true,
            shape: ProbeShape::default(),
            placement: ProbePlacement::default(),
            color: [1.0, 0.0, 0.0],
        }
    }
}

impl OcclusionConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resample filter.
    #[must_use]
    pub const fn with_filter(mut self, filter: SampleFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the fragment projection mode.
    #[must_use]
    pub const fn with_projection(mut self, projection: ProjectionMode) -> Self {
        self.projection = projection;
        self
    }

    /// Set the preferred depth stream and whether to fall back to the other.
    #[must_use]
    pub const fn with_depth_source(mut self, source: DepthSource, fallback: bool) -> Self {
        self.depth_source = source;
        self.depth_fallback = fallback;
        self
    }

    /// Set the probe shape.
    #[must_use]
    pub const fn with_shape(mut self, shape: ProbeShape) -> Self {
        self.shape = shape;
        self
    }

    /// Set the probe placement.
    #[must_use]
    pub const fn with_placement(mut self, placement: ProbePlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the probe color.
    #[must_use]
    pub const fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }
}
