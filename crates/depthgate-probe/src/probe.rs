//! The occlusion probe and its scene node.

use depthgate_core::math::Aabb;
use depthgate_core::{OcclusionConfig, ProbeShape};
use glam::Mat4;

use crate::binding::DepthBinding;
use crate::geometry::ProbeMesh;

/// Scene graph node describing the attached probe.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeNode {
    pub name: String,
    pub shape: ProbeShape,
    /// Fixed model transform.
    pub model: Mat4,
    /// Model-space bounds of the mesh.
    pub bounds: Aabb,
}

/// The virtual object whose fragments are tested against real depth.
///
/// Geometry and placement are fixed at creation; only the depth binding
/// changes from frame to frame.
#[derive(Clone, Debug)]
pub struct OcclusionProbe {
    shape: ProbeShape,
    mesh: ProbeMesh,
    model: Mat4,
    color: [f32; 3],
    binding: DepthBinding,
}

impl OcclusionProbe {
    /// Build the probe from configuration with its first binding.
    pub fn new(config: &OcclusionConfig, binding: DepthBinding) -> Self {
        Self {
            shape: config.shape,
            mesh: ProbeMesh::from_shape(config.shape),
            model: config.placement.model_matrix(),
            color: config.color,
            binding,
        }
    }

    #[inline]
    pub const fn shape(&self) -> ProbeShape {
        self.shape
    }

    #[inline]
    pub const fn mesh(&self) -> &ProbeMesh {
        &self.mesh
    }

    #[inline]
    pub const fn model(&self) -> Mat4 {
        self.model
    }

    #[inline]
    pub const fn color(&self) -> [f32; 3] {
        self.color
    }

    #[inline]
    pub const fn binding(&self) -> &DepthBinding {
        &self.binding
    }

    /// Replace the bound depth surface and viewport.
    pub fn rebind(&mut self, binding: DepthBinding) {
        self.binding = binding;
    }

    /// Node to attach to the scene graph.
    pub fn node(&self) -> ProbeNode {
        ProbeNode {
            name: match self.shape {
                ProbeShape::Box { .. } => "occlusion-probe-box".to_string(),
                ProbeShape::Cylinder { .. } => "occlusion-probe-cylinder".to_string(),
            },
            shape: self.shape,
            model: self.model,
            bounds: self.mesh.bounds().unwrap_or_default(),
        }
    }
}
