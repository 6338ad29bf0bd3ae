use crate::capture::FrameSource;
use crate::detection::{BoundingBox, Detector};
use crate::output::{self, DisplaySink};
use std::time::{Duration, Instant};

/// Ticks between timing reports
const STATS_EVERY: u64 = 30;

/// Cadence of the acquisition loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSchedule {
    /// Minimum time from the start of one tick to the start of the next
    pub interval: Duration,
    /// Blocking delay before each pull
    pub pacing: Duration,
}

impl Default for TickSchedule {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(8),
            pacing: Duration::from_millis(30),
        }
    }
}

/// What a single tick ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The source had no frame
    Empty,
    /// Decode or processing failed; nothing was reported or shown
    Skipped,
    /// The frame held no foreground region
    NotFound,
    Found(BoundingBox),
}

#[derive(Debug, Default)]
struct TickStats {
    ticks: u64,
    pull: Duration,
    detect: Duration,
    display: Duration,
    /// Start of the first tick to the end of the latest, sleeps included
    wall: Duration,
}

impl TickStats {
    fn ms_per_tick(&self, d: Duration) -> f64 {
        if self.ticks == 0 {
            return 0.0;
        }
        d.as_secs_f64() * 1000.0 / self.ticks as f64
    }

    fn ticks_per_second(&self) -> f64 {
        let secs = self.wall.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.ticks as f64 / secs
    }

    fn log(&self) {
        tracing::info!(
            "Tick {}: pull={:.1}ms, detect={:.1}ms, display={:.1}ms, total={:.1}ms, rate={:.1}/s",
            self.ticks,
            self.ms_per_tick(self.pull),
            self.ms_per_tick(self.detect),
            self.ms_per_tick(self.display),
            self.ms_per_tick(self.wall),
            self.ticks_per_second()
        );
    }
}

/// Owns the camera, the detector and the display for the life of the run
pub struct Tracker<S, D> {
    source: S,
    detector: Detector,
    display: D,
    schedule: TickSchedule,
    stats: TickStats,
}

impl<S, D> Tracker<S, D>
where
    S: FrameSource,
    D: DisplaySink,
{
    pub fn new(source: S, detector: Detector, display: D, schedule: TickSchedule) -> Self {
        Self {
            source,
            detector,
            display,
            schedule,
            stats: TickStats::default(),
        }
    }

    #[cfg(test)]
    fn display(&self) -> &D {
        &self.display
    }

    #[cfg(test)]
    fn source(&self) -> &S {
        &self.source
    }

    /// One pull → detect → report → display cycle.
    ///
    /// Never fails: every problem costs this tick only.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.schedule.pacing.is_zero() {
            std::thread::sleep(self.schedule.pacing);
        }

        let pull_start = Instant::now();
        let pulled = self.source.pull();
        self.stats.pull += pull_start.elapsed();

        let frame = match pulled {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::debug!("No frame this tick");
                return TickOutcome::Empty;
            }
            Err(e) => {
                tracing::warn!("Skipping tick: {}", e);
                return TickOutcome::Skipped;
            }
        };

        let detect_start = Instant::now();
        let detected = self.detector.detect(&frame);
        self.stats.detect += detect_start.elapsed();

        let detection = match detected {
            Ok(detection) => detection,
            Err(e) => {
                tracing::warn!("Skipping tick: {}", e);
                return TickOutcome::Skipped;
            }
        };

        let outcome = match &detection.hand {
            Some(hand) => {
                let bbox = hand.bounding_box;
                tracing::info!("Hand detected");
                tracing::info!("  position (x, y): {}, {}", bbox.x, bbox.y);
                tracing::info!("  size (width, height): {}, {}", bbox.width, bbox.height);
                tracing::debug!("  area: {:.0}", hand.area);
                TickOutcome::Found(bbox)
            }
            None => {
                tracing::debug!("No hand in frame");
                TickOutcome::NotFound
            }
        };

        let display_start = Instant::now();
        match output::to_display_image(&detection.annotated) {
            Some(image) => {
                if let Err(e) = self.display.show(&image) {
                    tracing::warn!("Display failed: {:#}", e);
                }
            }
            None => tracing::debug!("No displayable frame this tick"),
        }
        self.stats.display += display_start.elapsed();

        outcome
    }

    /// Tick sequentially until `max_ticks` have run, or forever.
    pub fn run(&mut self, max_ticks: Option<u64>) {
        tracing::info!(
            "Starting tick loop (interval={:?}, pacing={:?}, buffer limit={:?})",
            self.schedule.interval,
            self.schedule.pacing,
            self.source.buffer_limit()
        );

        let mut ticks = 0u64;
        while max_ticks.map_or(true, |max| ticks < max) {
            let tick_start = Instant::now();
            self.tick();
            ticks += 1;

            let elapsed = tick_start.elapsed();
            if elapsed < self.schedule.interval {
                std::thread::sleep(self.schedule.interval - elapsed);
            }

            self.stats.ticks += 1;
            self.stats.wall += tick_start.elapsed();
            if self.stats.ticks % STATS_EVERY == 0 {
                self.stats.log();
            }
        }
    }

    /// Release the camera. Safe to call more than once.
    pub fn close(&mut self) {
        self.source.close();
    }
}
