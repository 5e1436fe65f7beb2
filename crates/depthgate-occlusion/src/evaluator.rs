//! CPU reference of the occlusion fragment test.

use depthgate_core::math::{project_to_pixel, view_depth};
use depthgate_core::ProjectionMode;
use depthgate_depth::DepthSurface;
use glam::{Vec2, Vec3};

use crate::uniforms::OcclusionUniforms;

/// Returns true if real geometry at `real_depth` hides a fragment at
/// `virtual_depth`. Ties count as occluded.
///
/// NaN depths never occlude, the same as a GPU `<=` on NaN.
#[inline]
pub fn is_occluded(real_depth: f32, virtual_depth: f32) -> bool {
    real_depth <= virtual_depth
}

/// One probe fragment as the rasterizer hands it over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    /// Model-space position.
    pub position: Vec3,
    /// Diffuse texture coordinate.
    pub texcoord: Vec2,
}

impl Fragment {
    #[inline]
    pub const fn new(position: Vec3, texcoord: Vec2) -> Self {
        Self { position, texcoord }
    }
}

/// Outcome of the fragment test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FragmentDecision {
    /// Draw with this RGBA color.
    Keep([f32; 4]),
    /// Produce no output.
    Discard,
}

impl FragmentDecision {
    #[inline]
    pub const fn is_discard(&self) -> bool {
        matches!(self, Self::Discard)
    }
}

/// Intermediate values of one fragment test, for debugging and tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FragmentTest {
    /// Screen pixel the depth map was sampled at; `None` behind the camera.
    pub pixel: Option<Vec2>,
    /// Fragment distance in front of the camera.
    pub virtual_depth: f32,
    /// Sampled real-world depth; `None` when nothing was sampled.
    pub real_depth: Option<f32>,
    pub decision: FragmentDecision,
}

/// Keep/discard counts over a batch of fragments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvaluationSummary {
    pub kept: usize,
    pub discarded: usize,
}

impl EvaluationSummary {
    /// Number of fragments tested.
    #[inline]
    pub const fn total(&self) -> usize {
        self.kept + self.discarded
    }

    /// Record one decision.
    #[inline]
    pub fn record(&mut self, decision: FragmentDecision) {
        if decision.is_discard() {
            self.discarded += 1;
        } else {
            self.kept += 1;
        }
    }
}

/// Evaluates probe fragments against one bound depth surface.
#[derive(Clone, Copy, Debug)]
pub struct OcclusionEvaluator<'a> {
    uniforms: &'a OcclusionUniforms,
    depth: &'a DepthSurface,
}

impl<'a> OcclusionEvaluator<'a> {
    pub const fn new(uniforms: &'a OcclusionUniforms, depth: &'a DepthSurface) -> Self {
        Self { uniforms, depth }
    }

    /// Pixel coordinate a fragment samples the depth map at.
    pub fn screen_pixel(&self, fragment: &Fragment) -> Option<Vec2> {
        let size = self.uniforms.viewport_size();
        match self.uniforms.projection_mode() {
            ProjectionMode::TexcoordApprox => Some(fragment.texcoord * size),
            ProjectionMode::ClipSpace => {
                project_to_pixel(self.uniforms.model_view_projection(), fragment.position, size)
            }
        }
    }

    /// Run the test and return every intermediate value.
    pub fn test(&self, fragment: &Fragment) -> FragmentTest {
        let virtual_depth = view_depth(self.uniforms.model_view(), fragment.position);
        let Some(pixel) = self.screen_pixel(fragment) else {
            return FragmentTest {
                pixel: None,
                virtual_depth,
                real_depth: None,
                decision: FragmentDecision::Discard,
            };
        };

        let real_depth = self.depth.sample_pixel(pixel);
        let decision = if is_occluded(real_depth, virtual_depth) {
            FragmentDecision::Discard
        } else {
            let mut color = self.uniforms.color;
            color[3] = 1.0;
            FragmentDecision::Keep(color)
        };

        FragmentTest {
            pixel: Some(pixel),
            virtual_depth,
            real_depth: Some(real_depth),
            decision,
        }
    }

    /// Keep or discard a fragment.
    #[inline]
    pub fn evaluate(&self, fragment: &Fragment) -> FragmentDecision {
        self.test(fragment).decision
    }

    /// Evaluate a batch and count the outcomes.
    pub fn evaluate_all<'f>(&self, fragments: impl IntoIterator<Item = &'f Fragment>) -> EvaluationSummary {
        let mut summary = EvaluationSummary::default();
        for fragment in fragments {
            summary.record(self.evaluate(fragment));
        }
        summary
    }
}
