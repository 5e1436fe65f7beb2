//! Resampling sensor depth onto the camera viewport.
//!
//! Output pixel `(x, y)` maps to the source point
//! `((x + 0.5) * src_w / dst_w, (y + 0.5) * src_h / dst_h)`, an independent
//! uniform scale per axis. The filter decides how that point is read.

use depthgate_core::{DepthFrame, Error, Result, SampleFilter, Viewport};
use rayon::prelude::*;
use tracing::trace;

use crate::surface::DepthSurface;

/// Stateless depth frame adapter.
#[derive(Clone, Copy, Debug, Default)]
pub struct DepthAdapter {
    filter: SampleFilter,
}

impl DepthAdapter {
    /// Create an adapter with the given filter.
    pub const fn new(filter: SampleFilter) -> Self {
        Self { filter }
    }

    #[inline]
    pub const fn filter(&self) -> SampleFilter {
        self.filter
    }

    /// Resample `frame` to exactly the viewport size.
    pub fn adapt(&self, frame: &DepthFrame, viewport: Viewport) -> Result<DepthSurface> {
        resample(frame, viewport.width(), viewport.height(), self.filter)
    }
}

/// Resample `frame` to `width` x `height`.
///
/// Fails without side effects when the target has a zero dimension, the
/// source is empty, or the output cannot be allocated.
pub fn resample(frame: &DepthFrame, width: u32, height: u32, filter: SampleFilter) -> Result<DepthSurface> {
    let _span = tracing::trace_span!("depth.resample").entered();

    let viewport = Viewport::new(width, height)
        .map_err(|_| Error::Resample(format!("target size {width}x{height} has a zero dimension")))?;
    if frame.is_empty() {
        return Err(Error::Resample(format!(
            "source frame {} is empty ({}x{})",
            frame.index(),
            frame.width(),
            frame.height()
        )));
    }

    let count = viewport.pixel_count();
    let mut data = Vec::new();
    data.try_reserve_exact(count)
        .map_err(|e| Error::Resample(format!("cannot allocate {width}x{height} surface: {e}")))?;
    data.resize(count, 0.0f32);

    let scale_x = f64::from(frame.width()) / f64::from(width);
    let scale_y = f64::from(frame.height()) / f64::from(height);

    data.par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let src_y = (y as f64 + 0.5) * scale_y;
            for (x, out) in row.iter_mut().enumerate() {
                let src_x = (x as f64 + 0.5) * scale_x;
                *out = match filter {
                    SampleFilter::Nearest => sample_nearest(frame, src_x, src_y),
                    SampleFilter::Bilinear => sample_bilinear(frame, src_x, src_y),
                };
            }
        });

    trace!(
        frame = frame.index(),
        src_width = frame.width(),
        src_height = frame.height(),
        width,
        height,
        ?filter,
        "Resampled depth frame"
    );

    DepthSurface::from_vec(viewport, data, frame.index())
}

#[inline]
fn sample_nearest(frame: &DepthFrame, x: f64, y: f64) -> f32 {
    frame.texel_clamped(x.floor() as i64, y.floor() as i64)
}

/// Bilinear read between source pixel centers, clamp-to-edge.
#[inline]
fn sample_bilinear(frame: &DepthFrame, x: f64, y: f64) -> f32 {
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = (fx - x0) as f32;
    let ty = (fy - y0) as f32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let top = lerp(frame.texel_clamped(x0, y0), frame.texel_clamped(x0 + 1, y0), tx);
    let bottom = lerp(frame.texel_clamped(x0, y0 + 1), frame.texel_clamped(x0 + 1, y0 + 1), tx);
    lerp(top, bottom, ty)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    t.mul_add(b - a, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// 4x3 frame where each pixel holds `y * 10 + x`.
    fn grid_4x3() -> DepthFrame {
        DepthFrame::from_fn(4, 3, |x, y| (y * 10 + x) as f32).unwrap()
    }

    #[test]
    fn output_matches_target_size() {
        let frame = grid_4x3();
        for (width, height) in [(1, 1), (4, 3), (8, 6), (7, 13), (256, 192)] {
            for filter in [SampleFilter::Nearest, SampleFilter::Bilinear] {
                let surface = resample(&frame, width, height, filter).unwrap();
                assert_eq!(surface.width(), width);
                assert_eq!(surface.height(), height);
                assert_eq!(surface.len(), (width * height) as usize);
            }
        }
    }

    #[test]
    fn upscale_4x3_to_8x6_nearest() {
        let frame = grid_4x3();
        let surface = resample(&frame, 8, 6, SampleFilter::Nearest).unwrap();
        assert_eq!(surface.len(), 48);
        assert_eq!(surface.get(0, 0), frame.get(0, 0));
        assert_eq!(surface.get(7, 5), frame.get(3, 2));
        // Each source pixel covers a 2x2 block.
        assert_eq!(surface.get(3, 2), frame.get(1, 1));
        assert_eq!(surface.get(2, 3), frame.get(1, 1));
    }

    #[test]
    fn upscale_4x3_to_8x6_bilinear_corners() {
        let frame = grid_4x3();
        let surface = resample(&frame, 8, 6, SampleFilter::Bilinear).unwrap();
        assert_relative_eq!(surface.get(0, 0).unwrap(), frame.get(0, 0).unwrap());
        assert_relative_eq!(surface.get(7, 5).unwrap(), frame.get(3, 2).unwrap());
        // Between source (0,0) and (1,0): a quarter of the way.
        assert_relative_eq!(surface.get(1, 0).unwrap(), 0.25, epsilon = 1e-6);
    }

    #[test]
    fn identity_size_is_a_copy() {
        let frame = grid_4x3();
        for filter in [SampleFilter::Nearest, SampleFilter::Bilinear] {
            let surface = resample(&frame, 4, 3, filter).unwrap();
            assert_eq!(surface.samples(), frame.samples());
        }
    }

    #[test]
    fn downscale_picks_covering_pixels() {
        let frame = DepthFrame::from_fn(8, 8, |x, y| (y * 8 + x) as f32).unwrap();
        let surface = resample(&frame, 2, 2, SampleFilter::Nearest).unwrap();
        // Centers map to source (2, 2), (6, 2), (2, 6), (6, 6).
        assert_eq!(surface.samples(), &[18.0, 22.0, 50.0, 54.0]);
    }

    #[test]
    fn repeated_resample_is_bit_identical() {
        let frame = DepthFrame::from_fn(37, 19, |x, y| 0.3 + (x as f32 * 0.17).sin() + y as f32 * 0.01)
            .unwrap();
        for filter in [SampleFilter::Nearest, SampleFilter::Bilinear] {
            let a = resample(&frame, 101, 67, filter).unwrap();
            let b = resample(&frame, 101, 67, filter).unwrap();
            let a_bits: Vec<u32> = a.samples().iter().map(|v| v.to_bits()).collect();
            let b_bits: Vec<u32> = b.samples().iter().map(|v| v.to_bits()).collect();
            assert_eq!(a_bits, b_bits);
        }
    }

    #[test]
    fn uniform_frame_stays_uniform() {
        let frame = DepthFrame::filled(5, 3, 1.25).unwrap();
        let surface = resample(&frame, 17, 11, SampleFilter::Bilinear).unwrap();
        assert!(surface.samples().iter().all(|&depth| depth == 1.25));
    }

    #[test]
    fn zero_target_is_a_resample_error() {
        let frame = grid_4x3();
        assert!(matches!(
            resample(&frame, 0, 6, SampleFilter::Nearest),
            Err(Error::Resample(_))
        ));
        assert!(matches!(
            resample(&frame, 8, 0, SampleFilter::Bilinear),
            Err(Error::Resample(_))
        ));
    }

    #[test]
    fn empty_source_is_a_resample_error() {
        let frame = DepthFrame::new(0, 0, Vec::new()).unwrap();
        assert!(matches!(
            resample(&frame, 8, 6, SampleFilter::Nearest),
            Err(Error::Resample(_))
        ));
    }

    #[test]
    fn adapter_carries_frame_index() {
        let frame = grid_4x3().with_index(9);
        let adapter = DepthAdapter::new(SampleFilter::Nearest);
        let surface = adapter.adapt(&frame, Viewport::new(8, 6).unwrap()).unwrap();
        assert_eq!(surface.source_index(), 9);
    }
}
