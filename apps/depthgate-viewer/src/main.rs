//! Depthgate Demo Viewer
//!
//! Drives a synthetic depth session through the occlusion probe and the
//! software rasterizer, logging per-frame outcomes and optionally saving
//! PNG screenshots of the composited result.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p depthgate-viewer -- [OPTIONS]
//! ```
//!
//! ## Options
//!
//! ### Session options
//! - `--frames <N>`: Camera updates to run (default: 30)
//! - `--width <N>`, `--height <N>`: Viewport size (default: 640x480)
//! - `--scene <plane|step|ramp>`: Synthetic real-world geometry (default: step)
//! - `--drop-every <N>`: Every Nth update carries no depth
//! - `--rotate-every <N>`: Swap viewport orientation every N updates
//!
//! ### Probe options
//! - `--shape <box|cylinder>`: Probe shape (default: cylinder)
//! - `--projection <clip|texcoord>`: Depth lookup projection (default: clip)
//! - `--filter <nearest|bilinear>`: Depth resampling filter (default: nearest)
//!
//! ### Screenshot options
//! - `-S, --screenshot`: Enable screenshot capture mode
//! - `-o, --output <PATTERN>`: Output path pattern (use `{}` for frame number)
//! - `-F, --capture <FRAMES>`: Frame indices to capture (e.g., "0,10,20" or "0-5")
//! - `--exit-after`: Stop after capturing all specified frames
//!
//! ### Other
//! - `-h, --help`: Print help message
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

mod app;

use depthgate_render::ScreenshotConfig;
use tracing_subscriber::EnvFilter;

use crate::app::{Viewer, ViewerParams};

fn main() -> anyhow::Result<()> {
    // Check for help flag before doing any work
    if std::env::args().any(|arg| arg == "-h" || arg == "--help") {
        print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let params = ViewerParams::parse_args(&args)?;
    let screenshots = ScreenshotConfig::parse_args(&args);

    let report = Viewer::new(params, screenshots)?.run()?;
    tracing::info!(
        frames = report.frames,
        created = report.created,
        updated = report.updated,
        skipped = report.skipped,
        screenshots = report.screenshots,
        "Session finished"
    );
    Ok(())
}

fn print_help() {
    eprintln!(
        "Depthgate Demo Viewer

USAGE:
    cargo run -p depthgate-viewer -- [OPTIONS]

SESSION OPTIONS:
    --frames <N>            Camera updates to run (default: 30)
    --width <N>             Viewport width in pixels (default: 640)
    --height <N>            Viewport height in pixels (default: 480)
    --scene <NAME>          Synthetic geometry: plane, step, ramp (default: step)
    --drop-every <N>        Every Nth update carries no depth
    --rotate-every <N>      Swap viewport orientation every N updates

PROBE OPTIONS:
    --shape <NAME>          box or cylinder (default: cylinder)
    --projection <NAME>     clip or texcoord (default: clip)
    --filter <NAME>         nearest or bilinear (default: nearest)

SCREENSHOT OPTIONS:
    -S, --screenshot        Enable screenshot capture mode
    -o, --output <PATTERN>  Output path pattern (use {{}} for frame number)
                            Default: depthgate_{{}}.png
    -F, --capture <FRAMES>  Frame indices to capture
                            Examples: \"0\" \"0,10,20\" \"0-5\" \"0,5-10,20\"
                            Default: 0
    --exit-after            Stop after capturing all specified frames

OTHER:
    -h, --help              Print this help message

EXAMPLES:
    # Step wall, default cylinder probe
    cargo run -p depthgate-viewer

    # Box probe in front of a ramp, bilinear depth
    cargo run -p depthgate-viewer -- --shape box --scene ramp --filter bilinear

    # Capture a few frames and stop
    cargo run -p depthgate-viewer -- -S -F 0,5-7 -o shots/probe_{{}}.png --exit-after

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log level (e.g., info, debug, trace)"
    );
}
