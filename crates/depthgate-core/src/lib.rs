//! Core types, math, and configuration for depthgate.
//!
//! This crate provides the foundational types shared by every other crate:
//! - Viewport and depth frame containers
//! - Raw depth buffer decoding
//! - Projection helpers (view depth, clip space to pixel)
//! - Configuration and error types

pub mod config;
pub mod error;
pub mod math;
pub mod types;

pub use config::{DepthSource, OcclusionConfig, ProbePlacement, ProbeShape, ProjectionMode, SampleFilter};
pub use error::{Error, Result};
pub use types::{DepthFormat, DepthFrame, Viewport};

/// Workspace-wide constants
pub mod constants {
    /// Distance of the probe in front of the session origin, in meters.
    pub const PROBE_DISTANCE: f32 = 0.1;
    /// Radius of the default cylinder probe, in meters.
    pub const CYLINDER_RADIUS: f32 = 0.008;
    /// Length of the default cylinder probe, in meters.
    pub const CYLINDER_HEIGHT: f32 = 1.0;
    /// Edge length of the default box probe, in meters.
    pub const BOX_SIZE: f32 = 0.05;
    /// Radial segments used when tessellating a cylinder.
    pub const CYLINDER_SEGMENTS: u32 = 24;
    /// Scale applied to 16-bit millimeter depth samples.
    pub const MILLIMETERS_TO_METERS: f32 = 0.001;
}
