//! Uniform block shared with the WGSL occlusion shader.

use depthgate_core::{ProjectionMode, Viewport};
use depthgate_shaders::{UNIFORMS_BINDING, UNIFORMS_SIZE};
use glam::{Mat4, Vec2};

/// Per-draw uniforms for the occlusion pass.
///
/// Layout matches `OcclusionUniforms` in `occlusion.wgsl`: two matrices and
/// three vectors, [`UNIFORMS_SIZE`] bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OcclusionUniforms {
    pub model_view: [[f32; 4]; 4],
    pub model_view_projection: [[f32; 4]; 4],
    /// xy = viewport size in pixels, zw = reciprocal
    pub viewport: [f32; 4],
    /// x = projection mode (0 clip space, 1 texcoord)
    pub params: [f32; 4],
    /// rgb = probe color, a = opacity of kept fragments
    pub color: [f32; 4],
}

const _: () = assert!(std::mem::size_of::<OcclusionUniforms>() as u64 == UNIFORMS_SIZE);

impl OcclusionUniforms {
    /// Bind group slot of the block in `occlusion.wgsl`.
    pub const BINDING: u32 = UNIFORMS_BINDING;

    /// Build uniforms for one draw of the probe.
    pub fn new(
        model: Mat4,
        view: Mat4,
        projection: Mat4,
        viewport: Viewport,
        mode: ProjectionMode,
        color: [f32; 3],
    ) -> Self {
        let model_view = view * model;
        let size = viewport.size_f32();
        let mode = match mode {
            ProjectionMode::ClipSpace => 0.0,
            ProjectionMode::TexcoordApprox => 1.0,
        };
        Self {
            model_view: model_view.to_cols_array_2d(),
            model_view_projection: (projection * model_view).to_cols_array_2d(),
            viewport: [size.x, size.y, size.x.recip(), size.y.recip()],
            params: [mode, 0.0, 0.0, 0.0],
            color: [color[0], color[1], color[2], 1.0],
        }
    }

    /// Bytes to upload into the uniform buffer.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    #[inline]
    pub fn model_view(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model_view)
    }

    #[inline]
    pub fn model_view_projection(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model_view_projection)
    }

    #[inline]
    pub const fn viewport_size(&self) -> Vec2 {
        Vec2::new(self.viewport[0], self.viewport[1])
    }

    #[inline]
    pub fn projection_mode(&self) -> ProjectionMode {
        if self.params[0] > 0.5 {
            ProjectionMode::TexcoordApprox
        } else {
            ProjectionMode::ClipSpace
        }
    }
}
