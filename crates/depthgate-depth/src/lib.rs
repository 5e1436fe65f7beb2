//! Depth frame adaptation for depthgate.
//!
//! Sensor depth arrives at its own resolution (256x192 on current phones),
//! while fragments address the depth map in camera-image pixels. This crate
//! provides:
//! - [`DepthSurface`], a depth grid exactly the size of the viewport
//! - [`DepthAdapter`], which resamples a [`DepthFrame`] onto a viewport
//!
//! [`DepthFrame`]: depthgate_core::DepthFrame

pub mod resample;
pub mod surface;

pub use resample::{resample, DepthAdapter};
pub use surface::DepthSurface;
