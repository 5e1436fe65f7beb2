//! Viewport and depth frame types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::MILLIMETERS_TO_METERS;
use crate::error::{Error, Result};

/// Size in pixels of the current camera image.
///
/// Both dimensions are strictly positive; the constructor rejects zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    /// Create a viewport, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a float vector, for shader-style math.
    #[inline]
    pub fn size_f32(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Width divided by height.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Total number of pixels.
    #[inline]
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Encoding of a raw depth buffer as delivered by a sensor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthFormat {
    /// Little-endian 32-bit float, meters.
    #[default]
    Float32,
    /// Little-endian unsigned 16-bit millimeters; 0 means no reading.
    Millimeters16,
}

impl DepthFormat {
    /// Size of one sample in bytes.
    #[inline]
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::Float32 => 4,
            Self::Millimeters16 => 2,
        }
    }
}

/// One frame of per-pixel depth in meters.
///
/// Row-major, tightly packed. Frames are immutable once built and are
/// superseded by the next camera update.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthFrame {
    width: u32,
    height: u32,
    data: Vec<f32>,
    index: u64,
}

impl DepthFrame {
    /// Create a frame from meters-per-pixel samples.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let expected = sample_count(width, height)?;
        if data.len() != expected {
            return Err(Error::InvalidData(format!(
                "depth data length ({}) must equal width * height ({expected})",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            index: 0,
        })
    }

    /// Create a frame with every pixel set to `depth`.
    pub fn filled(width: u32, height: u32, depth: f32) -> Result<Self> {
        let count = sample_count(width, height)?;
        Self::new(width, height, vec![depth; count])
    }

    /// Create a frame by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Result<Self> {
        let mut data = Vec::with_capacity(sample_count(width, height)?);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    /// Decode a raw sensor buffer.
    pub fn from_bytes(width: u32, height: u32, format: DepthFormat, bytes: &[u8]) -> Result<Self> {
        let expected = sample_count(width, height)?
            .checked_mul(format.bytes_per_sample())
            .ok_or_else(|| Error::InvalidData(format!("depth buffer {width}x{height} too large")))?;
        if bytes.len() != expected {
            return Err(Error::InvalidData(format!(
                "{format:?} buffer of {width}x{height} needs {expected} bytes, got {}",
                bytes.len()
            )));
        }

        let data = match format {
            DepthFormat::Float32 => bytes
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
            DepthFormat::Millimeters16 => bytes
                .chunks_exact(2)
                .map(|chunk| match u16::from_le_bytes([chunk[0], chunk[1]]) {
                    0 => f32::NAN,
                    mm => f32::from(mm) * MILLIMETERS_TO_METERS,
                })
                .collect(),
        };
        Self::new(width, height, data)
    }

    /// Tag the frame with the index of the camera update it came from.
    #[must_use]
    pub fn with_index(mut self, index: u64) -> Self {
        self.index = index;
        self
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Index of the camera update this frame belongs to.
    #[inline]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Returns true if the frame holds no samples.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Raw samples, row-major.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Depth at (x, y), or `None` outside the frame.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }

    /// Depth at (x, y) with coordinates clamped to the frame edges.
    ///
    /// The frame must not be empty.
    #[inline]
    pub fn texel_clamped(&self, x: i64, y: i64) -> f32 {
        debug_assert!(!self.is_empty());
        let x = x.clamp(0, i64::from(self.width) - 1) as usize;
        let y = y.clamp(0, i64::from(self.height) - 1) as usize;
        self.data[y * self.width as usize + x]
    }
}

fn sample_count(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| Error::InvalidData(format!("depth frame {width}x{height} too large")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_rejects_zero() {
        assert!(matches!(
            Viewport::new(0, 10),
            Err(Error::InvalidViewport { width: 0, height: 10 })
        ));
        assert!(Viewport::new(10, 0).is_err());
        let viewport = Viewport::new(1920, 1440).unwrap();
        assert_eq!(viewport.pixel_count(), 1920 * 1440);
        assert!((viewport.aspect() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn frame_length_checked() {
        assert!(DepthFrame::new(4, 3, vec![1.0; 12]).is_ok());
        assert!(matches!(
            DepthFrame::new(4, 3, vec![1.0; 11]),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn frame_from_fn_is_row_major() {
        let frame = DepthFrame::from_fn(3, 2, |x, y| (y * 10 + x) as f32).unwrap();
        assert_eq!(frame.samples(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        assert_eq!(frame.get(2, 1), Some(12.0));
        assert_eq!(frame.get(3, 0), None);
    }

    #[test]
    fn texel_clamped_at_edges() {
        let frame = DepthFrame::from_fn(3, 2, |x, y| (y * 10 + x) as f32).unwrap();
        assert_eq!(frame.texel_clamped(-5, -5), 0.0);
        assert_eq!(frame.texel_clamped(10, 10), 12.0);
        assert_eq!(frame.texel_clamped(1, 7), 11.0);
    }

    #[test]
    fn decode_float32() {
        let values = [0.5f32, 1.0, 2.25, 4.0];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let frame = DepthFrame::from_bytes(2, 2, DepthFormat::Float32, &bytes).unwrap();
        assert_eq!(frame.samples(), &values);
    }

    #[test]
    fn decode_millimeters() {
        let bytes: Vec<u8> = [1500u16, 0].iter().flat_map(|v| v.to_le_bytes()).collect();
        let frame = DepthFrame::from_bytes(2, 1, DepthFormat::Millimeters16, &bytes).unwrap();
        assert!((frame.samples()[0] - 1.5).abs() < 1e-6);
        assert!(frame.samples()[1].is_nan());
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let bytes = vec![0u8; 7];
        assert!(matches!(
            DepthFrame::from_bytes(2, 1, DepthFormat::Float32, &bytes),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn index_is_tagged() {
        let frame = DepthFrame::filled(1, 1, 1.0).unwrap().with_index(42);
        assert_eq!(frame.index(), 42);
    }
}
