mod capture;
mod detection;
mod driver;
mod error;
mod frame;
mod output;

use anyhow::{Context, Result};
use capture::{FrameSource, WebcamCapture};
use clap::Parser;
use detection::Detector;
use driver::{TickSchedule, Tracker};
use output::{Discard, DisplaySink, V4L2Output};
use std::num::NonZeroUsize;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera device index
    #[arg(short, long, default_value_t = 0)]
    device: u32,

    /// Frames the camera may queue before old ones are dropped
    #[arg(long, default_value = "1")]
    buffer_limit: NonZeroUsize,

    /// Minimum time between the start of two ticks, in milliseconds
    #[arg(long, default_value_t = 8)]
    interval_ms: u64,

    /// Fixed delay before each frame pull, in milliseconds
    #[arg(long, default_value_t = 30)]
    pacing_ms: u64,

    /// v4l2loopback device that receives the annotated frames.
    /// If not provided, frames are dropped after detection
    #[arg(short, long)]
    output_device: Option<String>,

    /// Stop after this many ticks instead of running until interrupted
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("handtrack starting");
    tracing::info!("Camera: {}, buffer limit: {}", args.device, args.buffer_limit);

    let schedule = TickSchedule {
        interval: Duration::from_millis(args.interval_ms),
        pacing: Duration::from_millis(args.pacing_ms),
    };

    let mut capture =
        WebcamCapture::open(args.device).context("Failed to initialize webcam capture")?;
    capture.set_buffer_limit(args.buffer_limit);

    let detector = Detector::default();
    let (width, height) = detector.working_size();

    let display: Box<dyn DisplaySink> = match &args.output_device {
        Some(path) => Box::new(
            V4L2Output::new(path, width, height)
                .context("Failed to initialize v4l2loopback output")?,
        ),
        None => {
            tracing::info!("No output device, running headless");
            Box::new(Discard)
        }
    };

    let mut tracker = Tracker::new(capture, detector, display, schedule);
    tracing::info!("Press Ctrl+C to stop");
    tracker.run(args.max_ticks);
    tracker.close();

    Ok(())
}
