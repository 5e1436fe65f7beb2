//! Synthetic AR sessions producing camera updates with known depth.

use depthgate_core::constants::MILLIMETERS_TO_METERS;
use depthgate_core::{DepthFormat, DepthFrame, Result, Viewport};
use depthgate_probe::CameraUpdate;
use glam::Vec3;

use crate::camera::ArCamera;

/// Real-world geometry seen by the synthetic depth sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SyntheticScene {
    /// Flat wall facing the camera.
    ConstantPlane { depth: f32 },
    /// Left part at `near`, the rest at `far`; `split` is the fraction
    /// of the width covered by the near part.
    StepWall { near: f32, far: f32, split: f32 },
    /// Depth rising linearly from `near` at the left edge to `far` at the
    /// right edge.
    Ramp { near: f32, far: f32 },
}

impl SyntheticScene {
    /// Look up a scene by its command-line name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "plane" => Some(Self::ConstantPlane { depth: 2.0 }),
            "step" => Some(Self::StepWall {
                near: 0.05,
                far: 2.0,
                split: 0.5,
            }),
            "ramp" => Some(Self::Ramp { near: 0.05, far: 1.0 }),
            _ => None,
        }
    }

    /// Depth at normalized image coordinate `u` in [0, 1).
    pub fn depth_at(&self, u: f32) -> f32 {
        match *self {
            Self::ConstantPlane { depth } => depth,
            Self::StepWall { near, far, split } => {
                if u < split {
                    near
                } else {
                    far
                }
            }
            Self::Ramp { near, far } => near + (far - near) * u,
        }
    }

    /// Render the scene at sensor resolution.
    pub fn frame(&self, width: u32, height: u32, index: u64) -> Result<DepthFrame> {
        self.sensor_frame(width, height, index, DepthFormat::Float32, None)
    }

    /// Render the scene as a sensor would deliver it: encoded in `format`
    /// and decoded back, with no reading left of `missing_split`.
    pub fn sensor_frame(
        &self,
        width: u32,
        height: u32,
        index: u64,
        format: DepthFormat,
        missing_split: Option<f32>,
    ) -> Result<DepthFrame> {
        let mut bytes = Vec::with_capacity(width as usize * height as usize * format.bytes_per_sample());
        for _ in 0..height {
            for x in 0..width {
                let u = (x as f32 + 0.5) / width as f32;
                let depth = if missing_split.is_some_and(|split| u < split) {
                    f32::NAN
                } else {
                    self.depth_at(u)
                };
                encode_sample(format, depth, &mut bytes);
            }
        }
        Ok(DepthFrame::from_bytes(width, height, format, &bytes)?.with_index(index))
    }
}

fn encode_sample(format: DepthFormat, depth: f32, out: &mut Vec<u8>) {
    match format {
        DepthFormat::Float32 => out.extend_from_slice(&depth.to_le_bytes()),
        DepthFormat::Millimeters16 => {
            // 0 is the sensor's "no reading" value.
            let mm = if depth.is_finite() && depth > 0.0 {
                (depth / MILLIMETERS_TO_METERS).round().clamp(1.0, f32::from(u16::MAX)) as u16
            } else {
                0
            };
            out.extend_from_slice(&mm.to_le_bytes());
        }
    }
}

/// Scripted session: a fixed camera, a low-resolution depth sensor, and
/// optional dropped or rotated frames.
///
/// Depth is encoded in the sensor's byte format and decoded again before it
/// reaches the update, like a buffer read from a capture device.
#[derive(Clone, Debug)]
pub struct SyntheticDepthSession {
    scene: SyntheticScene,
    sensor: (u32, u32),
    format: DepthFormat,
    missing_split: Option<f32>,
    viewport: Viewport,
    camera: ArCamera,
    next_index: u64,
    drop_every: Option<u64>,
    rotate_every: Option<u64>,
    raw_only: bool,
}

impl SyntheticDepthSession {
    /// Session with a 256x192 sensor and a camera above and behind the
    /// default probe placement, looking at it.
    pub fn new(scene: SyntheticScene, viewport: Viewport) -> Self {
        let mut camera = ArCamera::for_viewport(viewport);
        camera.set_position(Vec3::new(0.0, 0.3, 0.5));
        camera.look_at(Vec3::new(0.0, 0.0, -0.1));
        Self {
            scene,
            sensor: (256, 192),
            format: DepthFormat::Float32,
            missing_split: None,
            viewport,
            camera,
            next_index: 0,
            drop_every: None,
            rotate_every: None,
            raw_only: false,
        }
    }

    #[must_use]
    pub const fn with_sensor_size(mut self, width: u32, height: u32) -> Self {
        self.sensor = (width, height);
        self
    }

    /// Byte format the sensor delivers.
    #[must_use]
    pub const fn with_format(mut self, format: DepthFormat) -> Self {
        self.format = format;
        self
    }

    /// Sensor has no reading for columns left of `split` (fraction of the
    /// width).
    #[must_use]
    pub const fn with_missing_readings(mut self, split: f32) -> Self {
        self.missing_split = Some(split);
        self
    }

    #[must_use]
    pub fn with_camera(mut self, camera: ArCamera) -> Self {
        self.camera = camera;
        self
    }

    /// Every `n`th update (1-based) carries no depth.
    #[must_use]
    pub const fn with_dropped_depth(mut self, n: u64) -> Self {
        self.drop_every = Some(n);
        self
    }

    /// Swap viewport orientation every `n` updates.
    #[must_use]
    pub const fn with_rotation(mut self, n: u64) -> Self {
        self.rotate_every = Some(n);
        self
    }

    /// Deliver depth on the raw stream only.
    #[must_use]
    pub const fn raw_only(mut self) -> Self {
        self.raw_only = true;
        self
    }

    #[inline]
    pub const fn scene(&self) -> SyntheticScene {
        self.scene
    }

    #[inline]
    pub const fn camera(&self) -> &ArCamera {
        &self.camera
    }

    /// Index the next update will carry.
    #[inline]
    pub const fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Viewport of the update with the given index.
    pub fn viewport_at(&self, index: u64) -> Result<Viewport> {
        let rotated = self.rotate_every.is_some_and(|n| n > 0 && (index / n) % 2 == 1);
        if rotated {
            Ok(Viewport::new(self.viewport.height(), self.viewport.width())?)
        } else {
            Ok(self.viewport)
        }
    }

    /// Produce the next camera update.
    pub fn next_update(&mut self) -> Result<CameraUpdate> {
        let index = self.next_index;
        self.next_index += 1;

        let viewport = self.viewport_at(index)?;
        let mut camera = self.camera.clone();
        camera.set_aspect(viewport.aspect());
        let mut update = CameraUpdate::new(index, viewport)
            .with_camera(camera.view_matrix(), camera.projection_matrix());

        if self.drop_every.is_some_and(|n| n > 0 && (index + 1) % n == 0) {
            return Ok(update);
        }

        let frame = self
            .scene
            .sensor_frame(self.sensor.0, self.sensor.1, index, self.format, self.missing_split)?;
        update = if self.raw_only {
            update.with_raw_depth(frame)
        } else {
            update.with_smoothed_depth(frame)
        };
        Ok(update)
    }

    /// Produce the next `count` updates.
    pub fn take_updates(&mut self, count: usize) -> Result<Vec<CameraUpdate>> {
        (0..count).map(|_| self.next_update()).collect()
    }
}
