//! Test harness for the depthgate occlusion probe.
//!
//! Provides headless rendering of synthetic depth sessions and visual
//! regression testing.

pub mod harness;

#[cfg(test)]
mod scenarios;

pub use harness::{compare_images, create_diff_image, HeadlessRenderer, RenderOutput, VisualRegressionTest};
pub use depthgate_render::{SyntheticDepthSession, SyntheticScene};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestError {
    #[error("Depth error: {0}")]
    Depth(#[from] depthgate_core::Error),
    #[error("Probe has not been bound to a depth frame yet")]
    ProbeNotBound,
    #[error("Image comparison failed: {0}")]
    ImageComparison(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, TestError>;

/// Where baselines live and how much drift a probe image may show.
#[derive(Debug, Clone)]
pub struct VisualTestConfig {
    /// Maximum normalized difference, 0.0 to 1.0.
    pub threshold: f64,
    pub baseline_dir: PathBuf,
    /// Rendered images and diffs are written here.
    pub output_dir: PathBuf,
}

impl Default for VisualTestConfig {
    fn default() -> Self {
        Self {
            threshold: 0.001,
            baseline_dir: PathBuf::from("tests/baselines"),
            output_dir: PathBuf::from("target/probe_output"),
        }
    }
}
