//! WGSL shaders for the depthgate occlusion probe.
//!
//! The uniform block mirrors `depthgate_occlusion::OcclusionUniforms` and
//! the fragment stage performs the same test as the CPU evaluator.

/// Occlusion probe vertex + fragment shader source.
pub const OCCLUSION_WGSL: &str = include_str!("wgsl/occlusion.wgsl");

/// Vertex entry point in [`OCCLUSION_WGSL`].
pub const OCCLUSION_VERTEX_ENTRY: &str = "vs_main";

/// Fragment entry point in [`OCCLUSION_WGSL`].
pub const OCCLUSION_FRAGMENT_ENTRY: &str = "fs_main";

/// Bind group slot of the uniform buffer.
pub const UNIFORMS_BINDING: u32 = 0;

/// Bind group slot of the viewport-sized depth texture.
pub const DEPTH_MAP_BINDING: u32 = 1;

/// Size in bytes of the uniform block: two `mat4x4<f32>` and three
/// `vec4<f32>`.
pub const UNIFORMS_SIZE: u64 = 176;
