//! Frame scheduling: frame index to subject angle, plus wall-clock pacing for stream output.

use crate::foundation::core::{Fps, FrameIndex};
use std::f64::consts::TAU;
use std::time::Duration;
use tokio::time::Instant;

/// Rotation direction of a turntable sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Positive azimuth.
    #[default]
    Clockwise,
    /// Negative azimuth.
    CounterClockwise,
}

impl Direction {
    /// `+1.0` or `-1.0`.
    pub fn sign(self) -> f64 {
        match self {
            Self::Clockwise => 1.0,
            Self::CounterClockwise => -1.0,
        }
    }
}

/// Easing curve applied to normalized sweep progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant angular speed.
    #[default]
    Linear,
    /// Symmetric quadratic ease-in/ease-out.
    Smooth,
}

impl Easing {
    /// Map `t` in `[0, 1]` to eased progress. Inputs outside are clamped.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Smooth => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
        }
    }
}

/// Subject angle for frame `i` of a `total_frames` sweep.
///
/// Progress is `i / total_frames`, so the last captured frame stops one step short of a full
/// revolution and the output loops seamlessly. `angle_at(total_frames, ..)` closes the circle.
pub fn angle_at(
    i: u64,
    total_frames: u64,
    start_angle: f64,
    direction: Direction,
    easing: Easing,
) -> f64 {
    let t = if total_frames == 0 {
        0.0
    } else {
        i as f64 / total_frames as f64
    };
    start_angle + easing.apply(t) * TAU * direction.sign()
}

/// One scheduled frame. Lives for a single loop iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameRequest {
    /// Frame position in the sweep.
    pub index: FrameIndex,
    /// Azimuth to apply before capture.
    pub angle_radians: f64,
}

/// A complete turntable sweep description.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurntablePath {
    /// Number of frames captured.
    pub total_frames: u64,
    /// Azimuth at frame 0.
    pub start_angle: f64,
    /// Sweep direction.
    pub direction: Direction,
    /// Easing curve.
    pub easing: Easing,
}

impl TurntablePath {
    /// Request for frame `i`.
    pub fn request(&self, i: u64) -> FrameRequest {
        FrameRequest {
            index: FrameIndex(i),
            angle_radians: angle_at(
                i,
                self.total_frames,
                self.start_angle,
                self.direction,
                self.easing,
            ),
        }
    }

    /// Every frame request, in capture order.
    pub fn requests(&self) -> impl Iterator<Item = FrameRequest> + '_ {
        (0..self.total_frames).map(|i| self.request(i))
    }
}

/// Target wall-clock spacing between frame submissions at `fps`.
pub fn pace_interval(fps: Fps) -> Duration {
    Duration::from_secs_f64(fps.frame_duration_secs())
}

/// Milliseconds form of [`pace_interval`].
pub fn pace_interval_ms(fps: Fps) -> f64 {
    fps.frame_duration_secs() * 1000.0
}

/// Throttles submissions to at most one per pacing interval.
///
/// Each frame's interval starts at [`Pacer::begin_frame`]; [`Pacer::wait`] sleeps out whatever
/// is left of it. Pacing never skips or duplicates frames; a late frame just gets no delay.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    frame_start: Option<Instant>,
}

impl Pacer {
    /// Pacer for `fps`.
    pub fn new(fps: Fps) -> Self {
        Self {
            interval: pace_interval(fps),
            frame_start: None,
        }
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start timing a frame at `now`.
    pub fn begin_frame(&mut self, now: Instant) {
        self.frame_start = Some(now);
    }

    /// Time still owed on the current frame, never negative.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.frame_start {
            Some(start) => (start + self.interval).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// Sleep out the remainder of the current frame's interval.
    pub async fn wait(&mut self) {
        let remaining = self.remaining(Instant::now());
        if remaining.is_zero() {
            tracing::trace!("pacing deadline missed; continuing without delay");
            return;
        }
        tokio::time::sleep(remaining).await;
    }
}

#[cfg(test)]
#[path = "../tests/unit/schedule.rs"]
mod tests;
