//! Headless probe rendering and visual regression testing.
//!
//! Runs the probe controller and the software rasterizer without a
//! display, so whole sessions can be checked against baseline images.

use std::path::Path;

use depthgate_core::OcclusionConfig;
use depthgate_probe::{CameraUpdate, FrameOutcome, FrameSink, ProbeController, ProbeNode};
use depthgate_render::{draw_probe, DrawStats, RenderTarget, SyntheticDepthSession};
use image::{Rgba, RgbaImage};
use tracing::info;

use crate::{Result, TestError, VisualTestConfig};

/// One rendered frame.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub image: RgbaImage,
    pub stats: DrawStats,
    /// Camera update the bound depth came from.
    pub depth_frame: u64,
}

/// Probe controller plus rasterizer, fed one camera update at a time.
pub struct HeadlessRenderer {
    controller: ProbeController<Vec<ProbeNode>>,
    depth_background: bool,
}

impl HeadlessRenderer {
    /// Renderer with a black background.
    pub fn new(config: OcclusionConfig) -> Self {
        Self {
            controller: ProbeController::new(config, Vec::new()),
            depth_background: false,
        }
    }

    /// Draw the bound depth as a grayscale background behind the probe.
    #[must_use]
    pub const fn with_depth_background(mut self, enabled: bool) -> Self {
        self.depth_background = enabled;
        self
    }

    #[inline]
    pub const fn controller(&self) -> &ProbeController<Vec<ProbeNode>> {
        &self.controller
    }

    /// Hand one camera update to the controller.
    pub fn submit(&mut self, update: &CameraUpdate) -> FrameOutcome {
        self.controller.on_frame(update)
    }

    /// Feed `frames` updates from a session.
    pub fn run(&mut self, session: &mut SyntheticDepthSession, frames: usize) -> Result<Vec<FrameOutcome>> {
        let mut outcomes = Vec::with_capacity(frames);
        for _ in 0..frames {
            let update = session.next_update()?;
            outcomes.push(self.submit(&update));
        }
        Ok(outcomes)
    }

    /// Draw the probe with the latest camera pose and bound depth.
    pub fn render(&self) -> Result<RenderOutput> {
        let params = self.controller.draw_params().ok_or(TestError::ProbeNotBound)?;
        let surface = params.binding.surface();
        let mut target = RenderTarget::new(params.binding.viewport());

        if self.depth_background {
            let (near, far) = surface.depth_range().unwrap_or((0.0, 1.0));
            target.clear_with_depth(surface, near, far);
        } else {
            target.clear([0, 0, 0, 255]);
        }

        let stats = draw_probe(&params, &mut target);
        Ok(RenderOutput {
            image: target.into_image(),
            stats,
            depth_frame: params.binding.frame_index(),
        })
    }
}

/// Compares rendered probe images against stored baselines.
///
/// A missing baseline is created from the first run.
pub struct VisualRegressionTest {
    config: VisualTestConfig,
}

impl VisualRegressionTest {
    pub const fn new(config: VisualTestConfig) -> Self {
        Self { config }
    }

    /// Run a session through a fresh renderer and check the last frame.
    pub fn run_session(
        &self,
        name: &str,
        config: OcclusionConfig,
        session: &mut SyntheticDepthSession,
        frames: usize,
    ) -> Result<RenderOutput> {
        let mut renderer = HeadlessRenderer::new(config).with_depth_background(true);
        renderer.run(session, frames)?;
        let output = renderer.render()?;
        self.compare_and_save(name, &output.image)?;
        Ok(output)
    }

    /// Save `image` and compare it with the baseline called `name`.
    pub fn compare_and_save(&self, name: &str, image: &RgbaImage) -> Result<()> {
        std::fs::create_dir_all(&self.config.baseline_dir)?;
        std::fs::create_dir_all(&self.config.output_dir)?;

        let baseline_path = self.config.baseline_dir.join(format!("{name}.png"));
        let output_path = self.config.output_dir.join(format!("{name}.png"));
        image.save(&output_path)?;

        if !baseline_path.exists() {
            image.save(&baseline_path)?;
            info!(path = %baseline_path.display(), "Created new baseline");
            return Ok(());
        }

        let baseline = load_rgba(&baseline_path)?;
        let diff = compare_images(&baseline, image)?;
        if diff > self.config.threshold {
            let diff_path = self.config.output_dir.join(format!("{name}_diff.png"));
            create_diff_image(&baseline, image).save(&diff_path)?;
            return Err(TestError::ImageComparison(format!(
                "difference {diff:.4} exceeds threshold {:.4} (see {})",
                self.config.threshold,
                diff_path.display()
            )));
        }
        Ok(())
    }
}

fn load_rgba(path: &Path) -> Result<RgbaImage> {
    Ok(image::open(path)?.to_rgba8())
}

/// Normalized RGB difference of two images, 0.0 to 1.0.
pub fn compare_images(a: &RgbaImage, b: &RgbaImage) -> Result<f64> {
    if a.dimensions() != b.dimensions() {
        return Err(TestError::ImageComparison(format!(
            "dimensions differ: {:?} vs {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }

    let total: u64 = a
        .pixels()
        .zip(b.pixels())
        .map(|(pa, pb)| {
            (0..3)
                .map(|c| u64::from(pa[c].abs_diff(pb[c])))
                .sum::<u64>()
        })
        .sum();

    let max = u64::from(a.width()) * u64::from(a.height()) * 3 * 255;
    if max == 0 {
        return Ok(0.0);
    }
    Ok(total as f64 / max as f64)
}

/// Differences above a small tolerance in magenta over the dimmed baseline.
pub fn create_diff_image(baseline: &RgbaImage, actual: &RgbaImage) -> RgbaImage {
    RgbaImage::from_fn(baseline.width(), baseline.height(), |x, y| {
        let pa = baseline.get_pixel(x, y);
        let Some(pb) = actual.get_pixel_checked(x, y) else {
            return Rgba([255, 0, 255, 255]);
        };
        let delta = (0..3).map(|c| pa[c].abs_diff(pb[c])).max().unwrap_or(0);
        if delta > 10 {
            Rgba([255, 0, 255, 255])
        } else {
            Rgba([pa[0] / 2, pa[1] / 2, pa[2] / 2, 255])
        }
    })
}
