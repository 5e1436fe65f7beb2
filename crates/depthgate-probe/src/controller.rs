//! Per-frame probe controller.
//!
//! The depth session calls [`FrameSink::on_frame`] once per camera update,
//! never concurrently. The controller resamples the depth frame onto the
//! viewport and either creates the probe (first valid frame) or rebinds it.

use depthgate_core::{DepthFrame, DepthSource, OcclusionConfig, Viewport};
use depthgate_depth::DepthAdapter;
use depthgate_occlusion::OcclusionUniforms;
use glam::Mat4;
use tracing::{debug, info, warn};

use crate::binding::DepthBinding;
use crate::probe::{OcclusionProbe, ProbeNode};

/// One camera update from the depth session.
#[derive(Clone, Debug)]
pub struct CameraUpdate {
    /// Monotonic update counter.
    pub index: u64,
    /// Size of the camera image.
    pub viewport: Viewport,
    pub smoothed_depth: Option<DepthFrame>,
    pub raw_depth: Option<DepthFrame>,
    /// World to camera.
    pub view: Mat4,
    /// Camera to clip.
    pub projection: Mat4,
}

impl CameraUpdate {
    /// Update with no depth and identity camera matrices.
    pub fn new(index: u64, viewport: Viewport) -> Self {
        Self {
            index,
            viewport,
            smoothed_depth: None,
            raw_depth: None,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }

    #[must_use]
    pub fn with_smoothed_depth(mut self, frame: DepthFrame) -> Self {
        self.smoothed_depth = Some(frame);
        self
    }

    #[must_use]
    pub fn with_raw_depth(mut self, frame: DepthFrame) -> Self {
        self.raw_depth = Some(frame);
        self
    }

    #[must_use]
    pub fn with_camera(mut self, view: Mat4, projection: Mat4) -> Self {
        self.view = view;
        self.projection = projection;
        self
    }

    /// Depth frame to use for `source`, optionally falling back to the other stream.
    pub fn depth(&self, source: DepthSource, fallback: bool) -> Option<&DepthFrame> {
        let (preferred, other) = match source {
            DepthSource::Smoothed => (&self.smoothed_depth, &self.raw_depth),
            DepthSource::Raw => (&self.raw_depth, &self.smoothed_depth),
        };
        preferred
            .as_ref()
            .or_else(|| if fallback { other.as_ref() } else { None })
    }
}

/// Why an update did not change the binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The update carried no usable depth.
    NoDepth,
    /// Resampling failed; the previous binding stays.
    ResampleFailed,
}

/// What an update did. Informational only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// First valid depth frame: probe built and attached.
    Created,
    /// Depth and viewport rebound.
    Updated,
    Skipped(SkipReason),
}

/// Receiver of camera updates.
///
/// `&mut self` keeps calls strictly one at a time.
pub trait FrameSink {
    fn on_frame(&mut self, update: &CameraUpdate) -> FrameOutcome;
}

/// Scene graph the probe node is attached to.
pub trait SceneGraph {
    fn attach_probe(&mut self, node: &ProbeNode);
}

/// Plain node list, for headless use.
impl SceneGraph for Vec<ProbeNode> {
    fn attach_probe(&mut self, node: &ProbeNode) {
        self.push(node.clone());
    }
}

/// Probe lifecycle state.
#[derive(Clone, Debug, Default)]
pub enum ProbeState {
    /// No valid depth frame seen yet.
    #[default]
    Uninitialized,
    /// Probe attached; binding refreshed each frame.
    Bound(OcclusionProbe),
}

/// Everything one draw of the probe needs, passed explicitly.
#[derive(Clone, Copy, Debug)]
pub struct DrawParams<'a> {
    pub probe: &'a OcclusionProbe,
    pub binding: &'a DepthBinding,
    pub uniforms: OcclusionUniforms,
}

/// Drives the probe from camera updates.
pub struct ProbeController<S: SceneGraph> {
    config: OcclusionConfig,
    adapter: DepthAdapter,
    scene: S,
    state: ProbeState,
    camera: (Mat4, Mat4),
    last_update: Option<u64>,
}

impl<S: SceneGraph> ProbeController<S> {
    pub fn new(config: OcclusionConfig, scene: S) -> Self {
        Self {
            adapter: DepthAdapter::new(config.filter),
            config,
            scene,
            state: ProbeState::Uninitialized,
            camera: (Mat4::IDENTITY, Mat4::IDENTITY),
            last_update: None,
        }
    }

    #[inline]
    pub const fn config(&self) -> &OcclusionConfig {
        &self.config
    }

    #[inline]
    pub const fn state(&self) -> &ProbeState {
        &self.state
    }

    #[inline]
    pub const fn scene(&self) -> &S {
        &self.scene
    }

    /// The probe, once created.
    pub const fn probe(&self) -> Option<&OcclusionProbe> {
        match &self.state {
            ProbeState::Uninitialized => None,
            ProbeState::Bound(probe) => Some(probe),
        }
    }

    /// Current binding, once a valid depth frame has arrived.
    pub fn binding(&self) -> Option<&DepthBinding> {
        self.probe().map(OcclusionProbe::binding)
    }

    /// How far behind the latest update the bound depth is.
    pub fn staleness(&self) -> Option<u64> {
        let current = self.last_update?;
        self.binding().map(|binding| binding.staleness(current))
    }

    /// Parameters for drawing the probe with the latest camera pose.
    ///
    /// `None` until the first valid depth frame; nothing is drawn before then.
    pub fn draw_params(&self) -> Option<DrawParams<'_>> {
        let probe = self.probe()?;
        let binding = probe.binding();
        let (view, projection) = self.camera;
        let uniforms = OcclusionUniforms::new(
            probe.model(),
            view,
            projection,
            binding.viewport(),
            self.config.projection,
            probe.color(),
        );
        Some(DrawParams {
            probe,
            binding,
            uniforms,
        })
    }
}

impl<S: SceneGraph> FrameSink for ProbeController<S> {
    fn on_frame(&mut self, update: &CameraUpdate) -> FrameOutcome {
        let _span = tracing::trace_span!("probe.on_frame", frame = update.index).entered();

        self.last_update = Some(update.index);
        self.camera = (update.view, update.projection);

        let Some(depth) = update.depth(self.config.depth_source, self.config.depth_fallback) else {
            debug!(frame = update.index, "No depth in camera update, skipping");
            return FrameOutcome::Skipped(SkipReason::NoDepth);
        };

        let surface = match self.adapter.adapt(depth, update.viewport) {
            Ok(surface) => surface,
            Err(e) => {
                warn!(
                    frame = update.index,
                    stale = ?self.staleness(),
                    "Keeping previous depth binding: {e}"
                );
                return FrameOutcome::Skipped(SkipReason::ResampleFailed);
            }
        };
        let binding = DepthBinding::new(surface, update.index);

        match &mut self.state {
            ProbeState::Bound(probe) => {
                probe.rebind(binding);
                debug!(
                    frame = update.index,
                    width = update.viewport.width(),
                    height = update.viewport.height(),
                    "Rebound probe depth"
                );
                FrameOutcome::Updated
            }
            ProbeState::Uninitialized => {
                let probe = OcclusionProbe::new(&self.config, binding);
                let node = probe.node();
                self.scene.attach_probe(&node);
                info!(
                    frame = update.index,
                    node = %node.name,
                    width = update.viewport.width(),
                    height = update.viewport.height(),
                    "Occlusion probe attached"
                );
                self.state = ProbeState::Bound(probe);
                FrameOutcome::Created
            }
        }
    }
}
