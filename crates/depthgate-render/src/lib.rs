//! Headless draw step for the depthgate occlusion probe.
//!
//! This crate provides:
//! - AR camera model (pose + perspective projection)
//! - Software rasterizer that runs the occlusion test per fragment
//! - Depth visualization for backgrounds
//! - Screenshot capture utilities
//! - Synthetic AR sessions with known depth

pub mod camera;
pub mod raster;
pub mod screenshot;
pub mod session;
pub mod target;

pub use camera::ArCamera;
pub use raster::{draw_probe, DrawStats};
pub use screenshot::{parse_frame_indices, MAX_CAPTURE_RANGE, save_screenshot, ScreenshotConfig, ScreenshotError};
pub use session::{SyntheticDepthSession, SyntheticScene};
pub use target::{depth_to_image, RenderTarget};
