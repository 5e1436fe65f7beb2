//! Software rasterizer for the probe mesh.
//!
//! Every covered pixel becomes a [`Fragment`] that goes through the
//! occlusion test before it may touch the target. Triangles are clipped
//! against a plane just in front of the camera so that long probes
//! reaching behind the eye still draw their visible part.

use depthgate_core::math::ndc_to_pixel;
use depthgate_occlusion::{EvaluationSummary, Fragment, FragmentDecision, OcclusionEvaluator};
use depthgate_probe::{DrawParams, Vertex};
use glam::{Mat4, Vec2, Vec3, Vec4};
use tracing::trace;

use crate::target::RenderTarget;

/// Clip-space w of the near clipping plane.
const NEAR_W: f32 = 1e-4;

/// Counters from one probe draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Triangles that reached rasterization after clipping.
    pub triangles: usize,
    /// Occlusion test outcomes, one per covered pixel.
    pub fragments: EvaluationSummary,
    /// Kept fragments that also passed the probe's own depth test.
    pub written: usize,
}

#[derive(Clone, Copy, Debug)]
struct ClipVertex {
    clip: Vec4,
    position: Vec3,
    texcoord: Vec2,
}

impl ClipVertex {
    fn new(mvp: Mat4, vertex: &Vertex) -> Self {
        let position = vertex.position();
        Self {
            clip: mvp * position.extend(1.0),
            position,
            texcoord: vertex.texcoord(),
        }
    }

    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            clip: self.clip.lerp(other.clip, t),
            position: self.position.lerp(other.position, t),
            texcoord: self.texcoord.lerp(other.texcoord, t),
        }
    }
}

/// Clip a triangle against `w >= NEAR_W`. Yields 0, 3 or 4 vertices.
fn clip_near(triangle: [ClipVertex; 3]) -> Vec<ClipVertex> {
    let mut out = Vec::with_capacity(4);
    for i in 0..3 {
        let a = &triangle[i];
        let b = &triangle[(i + 1) % 3];
        let da = a.clip.w - NEAR_W;
        let db = b.clip.w - NEAR_W;
        if da >= 0.0 {
            out.push(*a);
        }
        if (da >= 0.0) != (db >= 0.0) {
            out.push(a.lerp(b, da / (da - db)));
        }
    }
    out
}

#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

/// Draw the bound probe into `target`, testing every fragment against
/// the bound depth surface.
pub fn draw_probe(params: &DrawParams<'_>, target: &mut RenderTarget) -> DrawStats {
    let _span = tracing::trace_span!("render.draw_probe").entered();

    let evaluator = OcclusionEvaluator::new(&params.uniforms, params.binding.surface());
    let mvp = params.uniforms.model_view_projection();
    let size = target.viewport().size_f32();
    let mut stats = DrawStats::default();

    for triangle in params.probe.mesh().triangles() {
        let clipped = clip_near(triangle.map(|v| ClipVertex::new(mvp, &v)));
        for i in 1..clipped.len().saturating_sub(1) {
            let tri = [clipped[0], clipped[i], clipped[i + 1]];
            if rasterize(&tri, size, &evaluator, target, &mut stats) {
                stats.triangles += 1;
            }
        }
    }

    trace!(
        triangles = stats.triangles,
        kept = stats.fragments.kept,
        discarded = stats.fragments.discarded,
        written = stats.written,
        "Probe drawn"
    );
    stats
}

/// Returns false for degenerate or off-screen triangles.
fn rasterize(
    tri: &[ClipVertex; 3],
    size: Vec2,
    evaluator: &OcclusionEvaluator<'_>,
    target: &mut RenderTarget,
    stats: &mut DrawStats,
) -> bool {
    let inv_w = tri.map(|v| 1.0 / v.clip.w);
    let screen: [Vec2; 3] =
        std::array::from_fn(|i| ndc_to_pixel(tri[i].clip.truncate().truncate() * inv_w[i], size));

    let area = edge(screen[0], screen[1], screen[2]);
    if !area.is_finite() || area.abs() < f32::EPSILON {
        return false;
    }

    let min = screen[0].min(screen[1]).min(screen[2]).floor().max(Vec2::ZERO);
    let max = screen[0].max(screen[1]).max(screen[2]).ceil().min(size);
    if min.x >= max.x || min.y >= max.y {
        return false;
    }

    for y in min.y as u32..max.y as u32 {
        for x in min.x as u32..max.x as u32 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let b = Vec3::new(
                edge(screen[1], screen[2], p),
                edge(screen[2], screen[0], p),
                edge(screen[0], screen[1], p),
            ) / area;
            if b.min_element() < 0.0 {
                continue;
            }

            // Perspective-correct weights.
            let pw = b * Vec3::from_array(inv_w);
            let pw = pw / pw.element_sum();
            let fragment = Fragment::new(
                tri[0].position * pw.x + tri[1].position * pw.y + tri[2].position * pw.z,
                tri[0].texcoord * pw.x + tri[1].texcoord * pw.y + tri[2].texcoord * pw.z,
            );

            let test = evaluator.test(&fragment);
            stats.fragments.record(test.decision);
            if let FragmentDecision::Keep(color) = test.decision {
                if target.write(x, y, test.virtual_depth, color) {
                    stats.written += 1;
                }
            }
        }
    }
    true
}
