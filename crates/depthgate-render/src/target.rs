//! Color + depth render target and depth visualization.

use depthgate_core::Viewport;
use depthgate_depth::DepthSurface;
use image::{Rgba, RgbaImage};

/// Off-screen color buffer with a view-depth buffer for the probe.
pub struct RenderTarget {
    viewport: Viewport,
    color: RgbaImage,
    depth: Vec<f32>,
}

impl RenderTarget {
    /// Transparent black target.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            color: RgbaImage::new(viewport.width(), viewport.height()),
            depth: vec![f32::INFINITY; viewport.pixel_count()],
        }
    }

    #[inline]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Fill with a solid color and reset depth.
    pub fn clear(&mut self, color: [u8; 4]) {
        for pixel in self.color.pixels_mut() {
            *pixel = Rgba(color);
        }
        self.depth.fill(f32::INFINITY);
    }

    /// Use a depth visualization as background and reset depth.
    pub fn clear_with_depth(&mut self, surface: &DepthSurface, near: f32, far: f32) {
        let background = depth_to_image(surface, near, far);
        if background.dimensions() == self.color.dimensions() {
            self.color = background;
        } else {
            self.clear([0, 0, 0, 255]);
        }
        self.depth.fill(f32::INFINITY);
    }

    /// Write a fragment if it is nearer than what the pixel holds.
    ///
    /// Returns false when the pixel is outside the target or the depth
    /// test fails.
    pub fn write(&mut self, x: u32, y: u32, depth: f32, color: [f32; 4]) -> bool {
        if x >= self.viewport.width() || y >= self.viewport.height() {
            return false;
        }
        let index = y as usize * self.viewport.width() as usize + x as usize;
        if depth >= self.depth[index] {
            return false;
        }
        self.depth[index] = depth;
        self.color.put_pixel(x, y, Rgba(color.map(to_unorm8)));
        true
    }

    /// Probe depth at a pixel; infinity where nothing was drawn.
    pub fn depth_at(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.viewport.width() || y >= self.viewport.height() {
            return None;
        }
        Some(self.depth[y as usize * self.viewport.width() as usize + x as usize])
    }

    #[inline]
    pub const fn image(&self) -> &RgbaImage {
        &self.color
    }

    pub fn into_image(self) -> RgbaImage {
        self.color
    }
}

/// Grayscale view of a depth surface: `near` white, `far` black.
///
/// Samples without a reading are drawn dark blue.
pub fn depth_to_image(surface: &DepthSurface, near: f32, far: f32) -> RgbaImage {
    let span = (far - near).max(f32::EPSILON);
    RgbaImage::from_fn(surface.width(), surface.height(), |x, y| {
        match surface.get(x, y).filter(|depth| depth.is_finite()) {
            Some(depth) => {
                let level = to_unorm8(1.0 - ((depth - near) / span).clamp(0.0, 1.0));
                Rgba([level, level, level, 255])
            }
            None => Rgba([0, 0, 64, 255]),
        }
    })
}

#[inline]
fn to_unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
