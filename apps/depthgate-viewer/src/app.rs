//! Viewer session loop.

use anyhow::{bail, Context};
use depthgate_core::{OcclusionConfig, ProbeShape, ProjectionMode, SampleFilter, Viewport};
use depthgate_probe::{FrameOutcome, FrameSink, ProbeController, ProbeNode};
use depthgate_render::{
    draw_probe, save_screenshot, RenderTarget, ScreenshotConfig, SyntheticDepthSession, SyntheticScene,
};
use tracing::{debug, info, warn};

/// Session and probe settings from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerParams {
    pub frames: u64,
    pub width: u32,
    pub height: u32,
    pub scene: SyntheticScene,
    pub drop_every: Option<u64>,
    pub rotate_every: Option<u64>,
    pub probe: OcclusionConfig,
}

impl Default for ViewerParams {
    fn default() -> Self {
        Self {
            frames: 30,
            width: 640,
            height: 480,
            scene: SyntheticScene::StepWall {
                near: 0.05,
                far: 2.0,
                split: 0.5,
            },
            drop_every: None,
            rotate_every: None,
            probe: OcclusionConfig::default(),
        }
    }
}

impl ViewerParams {
    /// Parse viewer flags. Screenshot flags are left to [`ScreenshotConfig`].
    pub fn parse_args(args: &[String]) -> anyhow::Result<Self> {
        let mut params = Self::default();
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            let flag = arg.as_str();
            if matches!(flag, "-o" | "--output" | "-F" | "--capture") {
                iter.next();
                continue;
            }
            if !matches!(
                flag,
                "--frames"
                    | "--width"
                    | "--height"
                    | "--scene"
                    | "--drop-every"
                    | "--rotate-every"
                    | "--shape"
                    | "--projection"
                    | "--filter"
            ) {
                continue;
            }
            let value = iter
                .next()
                .with_context(|| format!("{flag} needs a value"))?
                .as_str();

            match flag {
                "--frames" => params.frames = parse_number(flag, value)?,
                "--width" => params.width = parse_number(flag, value)?,
                "--height" => params.height = parse_number(flag, value)?,
                "--drop-every" => params.drop_every = Some(parse_number(flag, value)?),
                "--rotate-every" => params.rotate_every = Some(parse_number(flag, value)?),
                "--scene" => {
                    params.scene = SyntheticScene::from_name(value)
                        .with_context(|| format!("unknown scene '{value}' (plane, step, ramp)"))?;
                }
                "--shape" => {
                    let shape = match value {
                        "box" => ProbeShape::default_box(),
                        "cylinder" => ProbeShape::default_cylinder(),
                        _ => bail!("unknown shape '{value}' (box, cylinder)"),
                    };
                    params.probe = params.probe.with_shape(shape);
                }
                "--projection" => {
                    let projection = match value {
                        "clip" => ProjectionMode::ClipSpace,
                        "texcoord" => ProjectionMode::TexcoordApprox,
                        _ => bail!("unknown projection '{value}' (clip, texcoord)"),
                    };
                    params.probe = params.probe.with_projection(projection);
                }
                "--filter" => {
                    let filter = match value {
                        "nearest" => SampleFilter::Nearest,
                        "bilinear" => SampleFilter::Bilinear,
                        _ => bail!("unknown filter '{value}' (nearest, bilinear)"),
                    };
                    params.probe = params.probe.with_filter(filter);
                }
                _ => {}
            }
        }

        Viewport::new(params.width, params.height)?;
        Ok(params)
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> anyhow::Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("{flag} expects a number, got '{value}'"))
}

/// Counters for one viewer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewerReport {
    pub frames: u64,
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub screenshots: u64,
}

/// Synthetic session feeding the probe controller.
pub struct Viewer {
    params: ViewerParams,
    screenshots: ScreenshotConfig,
    session: SyntheticDepthSession,
    controller: ProbeController<Vec<ProbeNode>>,
}

impl Viewer {
    pub fn new(params: ViewerParams, mut screenshots: ScreenshotConfig) -> anyhow::Result<Self> {
        screenshots.limit_to(params.frames);
        let viewport = Viewport::new(params.width, params.height)?;
        let mut session = SyntheticDepthSession::new(params.scene, viewport);
        if let Some(n) = params.drop_every {
            session = session.with_dropped_depth(n);
        }
        if let Some(n) = params.rotate_every {
            session = session.with_rotation(n);
        }

        info!(
            width = params.width,
            height = params.height,
            scene = ?params.scene,
            shape = ?params.probe.shape,
            projection = ?params.probe.projection,
            filter = ?params.probe.filter,
            "Starting depthgate viewer"
        );

        Ok(Self {
            controller: ProbeController::new(params.probe.clone(), Vec::new()),
            params,
            screenshots,
            session,
        })
    }

    /// Run every requested camera update.
    pub fn run(mut self) -> anyhow::Result<ViewerReport> {
        let mut report = ViewerReport::default();

        for _ in 0..self.params.frames {
            let update = self.session.next_update()?;
            let outcome = self.controller.on_frame(&update);
            report.frames += 1;
            match outcome {
                FrameOutcome::Created => report.created += 1,
                FrameOutcome::Updated => report.updated += 1,
                FrameOutcome::Skipped(_) => report.skipped += 1,
            }
            debug!(frame = update.index, ?outcome, stale = ?self.controller.staleness(), "Frame processed");

            if self.screenshots.should_capture(update.index) && self.capture(update.index)? {
                report.screenshots += 1;
            }
            if self.screenshots.exit_after_capture && self.screenshots.all_captured(update.index + 1) {
                info!("All screenshots captured, stopping");
                break;
            }
        }

        Ok(report)
    }

    /// Render the probe over the bound depth and save it. Returns false
    /// before the probe exists.
    fn capture(&self, frame: u64) -> anyhow::Result<bool> {
        let Some(params) = self.controller.draw_params() else {
            warn!(frame, "No depth bound yet, skipping screenshot");
            return Ok(false);
        };

        let surface = params.binding.surface();
        let mut target = RenderTarget::new(params.binding.viewport());
        let (near, far) = surface.depth_range().unwrap_or((0.0, 1.0));
        target.clear_with_depth(surface, near, far);
        let stats = draw_probe(&params, &mut target);
        debug!(frame, kept = stats.fragments.kept, discarded = stats.fragments.discarded, "Probe drawn");

        let path = self.screenshots.output_path(frame);
        save_screenshot(target.image(), &path).with_context(|| format!("saving {}", path.display()))?;
        Ok(true)
    }
}
