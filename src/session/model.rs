use crate::encode::TurntableFormat;
use crate::encode::encoder::Artifact;
use crate::encode::still::{DEFAULT_QUALITY, StillFormat};
use crate::foundation::core::{Fps, SurfaceSize};
use crate::foundation::error::{CaptureError, CaptureResult, ErrorKind};
use crate::generation::Generation;
use crate::schedule::{Direction, Easing};

/// What a capture session produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// One high-resolution image.
    Still,
    /// A turntable encoded as one continuous video.
    TurntableStream,
    /// A turntable packed as an image-sequence archive.
    TurntableSequence,
}

/// Lifecycle of a capture session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session owns the surface.
    #[default]
    Idle,
    /// Surface and encoder are being set up.
    Preparing,
    /// Frames (or accumulation ticks) are being captured.
    Running,
    /// The encoder is producing the artifact.
    Finalizing,
    /// Finished with a complete artifact.
    Done,
    /// Stopped by the user or superseded by a newer session.
    Cancelled,
    /// Stopped by an encoder failure.
    Failed,
}

impl SessionState {
    /// `true` for `Done`, `Cancelled` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Failed)
    }
}

/// The in-flight state of one capture.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureSession {
    /// Generation minted at start.
    pub generation: Generation,
    /// Output kind.
    pub kind: SessionKind,
    /// Capture width.
    pub width: u32,
    /// Capture height.
    pub height: u32,
    /// Frames to capture, 1 for stills.
    pub total_frames: u64,
    /// Pixel density applied while capturing.
    pub pixel_density: f64,
    /// Current lifecycle state.
    pub state: SessionState,
}

impl CaptureSession {
    pub(crate) fn new(
        generation: Generation,
        kind: SessionKind,
        size: SurfaceSize,
        total_frames: u64,
    ) -> Self {
        Self {
            generation,
            kind,
            width: size.width,
            height: size.height,
            total_frames,
            pixel_density: 1.0,
            state: SessionState::Idle,
        }
    }

    pub(crate) fn size(&self) -> SurfaceSize {
        SurfaceSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Handle returned when a session is started; used to cancel it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionHandle {
    /// Generation owned by the session.
    pub generation: Generation,
    /// Output kind.
    pub kind: SessionKind,
}

/// Terminal event of a capture session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Every frame was captured.
    Completed(Artifact),
    /// Cancelled by the user after some frames were delivered.
    Partial(Artifact),
    /// Cancelled by the user before anything was delivered.
    Cancelled,
    /// A newer session took over; nothing is handed off.
    Superseded,
    /// The encoder failed; nothing is handed off.
    Failed(ErrorKind),
}

impl CaptureOutcome {
    /// The artifact to hand off, if any.
    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Completed(a) | Self::Partial(a) => Some(a),
            _ => None,
        }
    }

    /// Consume the outcome, yielding its artifact.
    pub fn into_artifact(self) -> Option<Artifact> {
        match self {
            Self::Completed(a) | Self::Partial(a) => Some(a),
            _ => None,
        }
    }

    /// Terminal session state this outcome corresponds to.
    pub fn state(&self) -> SessionState {
        match self {
            Self::Completed(_) => SessionState::Done,
            Self::Partial(_) | Self::Cancelled | Self::Superseded => SessionState::Cancelled,
            Self::Failed(_) => SessionState::Failed,
        }
    }
}

/// Request for a 360° turntable capture.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TurntableConfig {
    /// Output width.
    pub width: u32,
    /// Output height.
    pub height: u32,
    /// Frames per revolution.
    pub total_frames: u64,
    /// Playback rate; also paces stream submission.
    pub fps: Fps,
    /// Output format.
    pub format: TurntableFormat,
    /// Sweep direction.
    pub direction: Direction,
    /// Sweep easing.
    pub easing: Easing,
    /// JPEG quality for `JpegSequence`.
    pub quality: u8,
    /// Stem for the artifact file name.
    pub filename_hint: String,
}

impl Default for TurntableConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            total_frames: 120,
            fps: Fps { num: 30, den: 1 },
            format: TurntableFormat::Mp4,
            direction: Direction::Clockwise,
            easing: Easing::Linear,
            quality: DEFAULT_QUALITY,
            filename_hint: "model".to_owned(),
        }
    }
}

impl TurntableConfig {
    /// Reject requests no session could satisfy.
    pub fn validate(&self) -> CaptureResult<()> {
        SurfaceSize::new(self.width, self.height)?;
        if self.total_frames == 0 {
            return Err(CaptureError::validation(
                "turntable total_frames must be > 0",
            ));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        validate_quality(self.quality)?;
        validate_hint(&self.filename_hint)
    }

    /// Session kind for the requested format.
    pub fn kind(&self) -> SessionKind {
        if self.format.is_stream() {
            SessionKind::TurntableStream
        } else {
            SessionKind::TurntableSequence
        }
    }
}

/// Request for a single high-resolution still.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StillConfig {
    /// Output width.
    pub width: u32,
    /// Output height.
    pub height: u32,
    /// Accumulation ticks before readback.
    pub sample_count: u32,
    /// Image format.
    pub format: StillFormat,
    /// JPEG quality.
    pub quality: u8,
    /// Stem for the artifact file name.
    pub filename_hint: String,
}

impl Default for StillConfig {
    fn default() -> Self {
        Self {
            width: 3840,
            height: 2160,
            sample_count: 64,
            format: StillFormat::Png,
            quality: DEFAULT_QUALITY,
            filename_hint: "model".to_owned(),
        }
    }
}

impl StillConfig {
    /// Reject requests no session could satisfy.
    pub fn validate(&self) -> CaptureResult<()> {
        SurfaceSize::new(self.width, self.height)?;
        if self.sample_count == 0 {
            return Err(CaptureError::validation("still sample_count must be > 0"));
        }
        validate_quality(self.quality)?;
        validate_hint(&self.filename_hint)
    }
}

fn validate_quality(quality: u8) -> CaptureResult<()> {
    if !(1..=100).contains(&quality) {
        return Err(CaptureError::validation(format!(
            "quality must be in 1..=100, got {quality}"
        )));
    }
    Ok(())
}

fn validate_hint(hint: &str) -> CaptureResult<()> {
    if hint.is_empty() {
        return Err(CaptureError::validation("filename_hint must not be empty"));
    }
    if hint.contains(['/', '\\']) {
        return Err(CaptureError::validation(
            "filename_hint must not contain path separators",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/model.rs"]
mod tests;
