use crate::foundation::core::{Fps, FrameIndex, PixelBuffer};
use crate::foundation::error::{CaptureError, CaptureResult};

/// Configuration handed to a [`FrameEncoder`] when a capture session starts.
#[derive(Clone, Debug, PartialEq)]
pub struct EncoderConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Playback rate of the produced artifact.
    pub fps: Fps,
    /// Number of frames the session intends to submit.
    pub total_frames: u64,
    /// Stem used for the artifact's suggested file name.
    pub name_hint: String,
}

/// Final output of an encoder, handed to the caller for persistence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Encoded bytes (video file or archive).
    pub bytes: Vec<u8>,
    /// Suggested download file name.
    pub suggested_name: String,
    /// Frames actually encoded.
    pub frame_count_delivered: u64,
    /// `true` when the session was cancelled before every frame was delivered.
    pub was_partial: bool,
}

/// Encoder contract shared by stream and sequence outputs.
///
/// Ordering contract: `submit_frame` receives indices `0, 1, 2, ...` with no gaps or repeats.
pub trait FrameEncoder {
    /// Called once before any frame is submitted.
    fn start(&mut self, cfg: EncoderConfig) -> CaptureResult<()>;
    /// Encode exactly this frame.
    fn submit_frame(&mut self, idx: FrameIndex, frame: &PixelBuffer) -> CaptureResult<()>;
    /// Close the output and produce the artifact. `cancelled` marks a partial result.
    fn finish(&mut self, cancelled: bool) -> CaptureResult<Artifact>;
}

/// Enforces contiguous frame indices from zero and checks frame dimensions.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FrameCounter {
    next: u64,
}

impl FrameCounter {
    pub(crate) fn accept(
        &mut self,
        idx: FrameIndex,
        frame: &PixelBuffer,
        cfg: &EncoderConfig,
    ) -> CaptureResult<()> {
        if idx.0 != self.next {
            return Err(CaptureError::encoder_write(format!(
                "frame {} submitted out of order, expected {}",
                idx.0, self.next
            )));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(CaptureError::encoder_write(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        frame
            .check_len()
            .map_err(|e| CaptureError::encoder_write(e.to_string()))?;
        self.next += 1;
        Ok(())
    }

    pub(crate) fn delivered(&self) -> u64 {
        self.next
    }
}

/// Validate the parts of an [`EncoderConfig`] every encoder depends on.
pub(crate) fn check_config(cfg: &EncoderConfig) -> CaptureResult<()> {
    if cfg.width == 0 || cfg.height == 0 {
        return Err(CaptureError::encoder_init(
            "encoder width/height must be non-zero",
        ));
    }
    if cfg.total_frames == 0 {
        return Err(CaptureError::encoder_init(
            "encoder total_frames must be non-zero",
        ));
    }
    Ok(())
}
