//! Frame capture to image files.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;
use tracing::{info, warn};

/// Widest inclusive range `parse_frame_indices` expands.
pub const MAX_CAPTURE_RANGE: u64 = 10_000;

/// Which camera updates to capture and where to write them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScreenshotConfig {
    pub enabled: bool,
    /// Output path pattern; `{}` is replaced by the frame index.
    pub output_pattern: String,
    /// Frame indices to capture, ascending.
    pub frames: BTreeSet<u64>,
    /// Stop the run once the last requested frame is written.
    pub exit_after_capture: bool,
}

impl ScreenshotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable capture with the given output pattern.
    #[must_use]
    pub fn with_output(mut self, pattern: impl Into<String>) -> Self {
        self.enabled = true;
        self.output_pattern = pattern.into();
        self
    }

    #[must_use]
    pub fn with_frames(mut self, frames: impl IntoIterator<Item = u64>) -> Self {
        self.enabled = true;
        self.frames.extend(frames);
        self
    }

    #[must_use]
    pub const fn with_exit_after(mut self, exit: bool) -> Self {
        self.exit_after_capture = exit;
        self
    }

    pub fn output_path(&self, frame: u64) -> PathBuf {
        PathBuf::from(self.output_pattern.replace("{}", &frame.to_string()))
    }

    pub fn should_capture(&self, frame: u64) -> bool {
        self.enabled && self.frames.contains(&frame)
    }

    /// Drop requested frames at or beyond `frame_count`.
    pub fn limit_to(&mut self, frame_count: u64) {
        let dropped = self.frames.split_off(&frame_count);
        if let Some(&first) = dropped.first() {
            warn!(first, count = dropped.len(), frame_count, "Capture frames beyond the run ignored");
        }
    }

    /// True once `current_frame` is past the last requested capture.
    pub fn all_captured(&self, current_frame: u64) -> bool {
        self.enabled
            && self
                .frames
                .last()
                .is_some_and(|&last| current_frame > last)
    }

    /// Parse capture flags, ignoring everything else.
    ///
    /// - `-S` / `--screenshot`: enable capture
    /// - `-o` / `--output <PATTERN>`: output pattern (`{}` = frame index)
    /// - `-F` / `--capture <FRAMES>`: frames to capture, e.g. `0,5,10-15`
    /// - `--exit-after`: stop after the last capture
    pub fn parse_args(args: &[String]) -> Self {
        let mut config = Self::default();
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-S" | "--screenshot" => config.enabled = true,
                "-o" | "--output" => {
                    if let Some(pattern) = iter.next() {
                        config.output_pattern.clone_from(pattern);
                    }
                }
                "-F" | "--capture" => {
                    if let Some(frames) = iter.next() {
                        config.frames = parse_frame_indices(frames);
                    }
                }
                "--exit-after" => config.exit_after_capture = true,
                _ => {}
            }
        }

        if config.enabled {
            if config.output_pattern.is_empty() {
                config.output_pattern = "depthgate_{}.png".to_string();
            }
            if config.frames.is_empty() {
                config.frames.insert(0);
            }
        }
        config
    }
}

/// Parse frame indices like `"0,5,10-15"`. Ranges are inclusive;
/// malformed parts, reversed ranges and ranges wider than
/// [`MAX_CAPTURE_RANGE`] are skipped.
pub fn parse_frame_indices(s: &str) -> BTreeSet<u64> {
    let mut frames = BTreeSet::new();
    for part in s.split(',').map(str::trim) {
        if let Some((start, end)) = part.split_once('-') {
            if let (Ok(start), Ok(end)) = (start.trim().parse::<u64>(), end.trim().parse::<u64>()) {
                if end < start || end - start >= MAX_CAPTURE_RANGE {
                    warn!(range = part, "Skipping capture range");
                    continue;
                }
                frames.extend(start..=end);
            }
        } else if let Ok(frame) = part.parse::<u64>() {
            frames.insert(frame);
        }
    }
    frames
}

/// Write an image; the format follows the path extension.
pub fn save_screenshot(image: &RgbaImage, path: impl AsRef<Path>) -> Result<(), ScreenshotError> {
    let path = path.as_ref();
    if image.width() == 0 || image.height() == 0 {
        return Err(ScreenshotError::EmptyImage);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    image.save(path)?;
    info!(path = %path.display(), "screenshot saved");
    Ok(())
}

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("cannot save an empty image")]
    EmptyImage,
    #[error("failed to create output directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to save screenshot: {0}")]
    Save(#[from] image::ImageError),
}
