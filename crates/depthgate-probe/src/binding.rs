//! Depth binding handed to the draw step.

use std::sync::Arc;

use depthgate_core::Viewport;
use depthgate_depth::DepthSurface;

/// Depth surface and viewport bound to the probe for the next draw.
///
/// Replaced wholesale on every successful frame; the surface is shared so a
/// draw in flight can keep the previous one alive.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthBinding {
    surface: Arc<DepthSurface>,
    frame_index: u64,
}

impl DepthBinding {
    /// Bind `surface`, produced for camera update `frame_index`.
    pub fn new(surface: DepthSurface, frame_index: u64) -> Self {
        Self {
            surface: Arc::new(surface),
            frame_index,
        }
    }

    #[inline]
    pub fn surface(&self) -> &DepthSurface {
        &self.surface
    }

    /// Shared handle to the surface.
    #[inline]
    pub fn surface_handle(&self) -> Arc<DepthSurface> {
        Arc::clone(&self.surface)
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.surface.viewport()
    }

    #[inline]
    pub fn viewport_width(&self) -> u32 {
        self.surface.width()
    }

    #[inline]
    pub fn viewport_height(&self) -> u32 {
        self.surface.height()
    }

    /// Camera update this binding was produced from.
    #[inline]
    pub const fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// How many updates behind `current` this binding is.
    #[inline]
    pub const fn staleness(&self, current: u64) -> u64 {
        current.saturating_sub(self.frame_index)
    }
}
