//! Viewport-sized depth surface.

use depthgate_core::{Error, Result, Viewport};
use glam::Vec2;

/// Depth in meters, one sample per viewport pixel.
///
/// This is what gets bound for the fragment stage. It is sampled with
/// pixel coordinates, not normalized ones.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthSurface {
    viewport: Viewport,
    data: Vec<f32>,
    source_index: u64,
}

impl DepthSurface {
    /// Wrap resampled data. `data` must hold exactly one sample per pixel.
    pub fn from_vec(viewport: Viewport, data: Vec<f32>, source_index: u64) -> Result<Self> {
        if data.len() != viewport.pixel_count() {
            return Err(Error::InvalidData(format!(
                "surface data length ({}) must equal {}x{}",
                data.len(),
                viewport.width(),
                viewport.height()
            )));
        }
        Ok(Self {
            viewport,
            data,
            source_index,
        })
    }

    /// Surface with every pixel at `depth`.
    pub fn filled(viewport: Viewport, depth: f32) -> Self {
        Self {
            viewport,
            data: vec![depth; viewport.pixel_count()],
            source_index: 0,
        }
    }

    #[inline]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.viewport.width()
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.viewport.height()
    }

    /// Number of samples; always `width * height`.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: viewports are never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Index of the depth frame this surface was produced from.
    #[inline]
    pub const fn source_index(&self) -> u64 {
        self.source_index
    }

    /// Samples in row-major order.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Depth at integer pixel (x, y), or `None` outside the surface.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.data[y as usize * self.width() as usize + x as usize])
    }

    /// Point-sample at a pixel coordinate.
    ///
    /// Reads the texel containing `pixel`, clamped to the edges, like a
    /// nearest sampler in pixel-coordinate mode.
    #[inline]
    pub fn sample_pixel(&self, pixel: Vec2) -> f32 {
        let max_x = i64::from(self.width()) - 1;
        let max_y = i64::from(self.height()) - 1;
        let x = (pixel.x.floor() as i64).clamp(0, max_x) as usize;
        let y = (pixel.y.floor() as i64).clamp(0, max_y) as usize;
        self.data[y * self.width() as usize + x]
    }

    /// Minimum and maximum finite depth, or `None` if no sample is finite.
    pub fn depth_range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|depth| depth.is_finite())
            .fold(None, |range, depth| match range {
                None => Some((depth, depth)),
                Some((min, max)) => Some((min.min(depth), max.max(depth))),
            })
    }
}
