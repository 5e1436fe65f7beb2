//! Occlusion probe lifecycle for depthgate.
//!
//! This crate provides:
//! - Probe meshes (box and cylinder)
//! - The per-probe depth binding handed to the draw step
//! - [`ProbeController`], the synchronous per-frame sink that creates the
//!   probe on the first depth frame and rebinds depth on every later one

pub mod binding;
pub mod controller;
pub mod geometry;
pub mod probe;

pub use binding::DepthBinding;
pub use controller::{
    CameraUpdate, DrawParams, FrameOutcome, FrameSink, ProbeController, ProbeState, SceneGraph,
    SkipReason,
};
pub use geometry::{ProbeMesh, Vertex};
pub use probe::{OcclusionProbe, ProbeNode};
