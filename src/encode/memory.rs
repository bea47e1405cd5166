use crate::encode::encoder::{Artifact, EncoderConfig, FrameCounter, FrameEncoder, check_config};
use crate::foundation::core::{FrameIndex, PixelBuffer};
use crate::foundation::error::{CaptureError, CaptureResult};

/// In-memory encoder for tests and debugging.
///
/// Keeps every submitted frame. The artifact bytes are the concatenated raw RGBA data.
#[derive(Debug, Default)]
pub struct InMemoryEncoder {
    cfg: Option<EncoderConfig>,
    counter: FrameCounter,
    /// Frames in submission order.
    pub(crate) frames: Vec<(FrameIndex, PixelBuffer)>,
    fail_start: bool,
    fail_at: Option<u64>,
    finish_calls: Vec<bool>,
}

impl InMemoryEncoder {
    /// Create a new in-memory encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `start` fail with an init error.
    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    /// Make `submit_frame` fail with a write error on frame `index`.
    pub fn failing_at(index: u64) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    /// Configuration captured in `start`, if any.
    pub fn config(&self) -> Option<&EncoderConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, PixelBuffer)] {
        &self.frames
    }

    /// Indices of the captured frames.
    pub fn indices(&self) -> Vec<u64> {
        self.frames.iter().map(|(idx, _)| idx.0).collect()
    }

    /// The `cancelled` argument of every `finish` call so far.
    pub fn finish_calls(&self) -> &[bool] {
        &self.finish_calls
    }
}

impl FrameEncoder for InMemoryEncoder {
    fn start(&mut self, cfg: EncoderConfig) -> CaptureResult<()> {
        if self.fail_start {
            return Err(CaptureError::encoder_init("in-memory encoder refused to start"));
        }
        check_config(&cfg)?;
        self.cfg = Some(cfg);
        self.counter = FrameCounter::default();
        self.frames.clear();
        Ok(())
    }

    fn submit_frame(&mut self, idx: FrameIndex, frame: &PixelBuffer) -> CaptureResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| CaptureError::encoder_write("in-memory encoder not started"))?;
        if self.fail_at == Some(idx.0) {
            return Err(CaptureError::encoder_write(format!(
                "in-memory encoder rejected frame {}",
                idx.0
            )));
        }
        self.counter.accept(idx, frame, cfg)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn finish(&mut self, cancelled: bool) -> CaptureResult<Artifact> {
        self.finish_calls.push(cancelled);
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| CaptureError::encoder_write("in-memory encoder not started"))?;
        let delivered = self.counter.delivered();
        let bytes = self
            .frames
            .iter()
            .flat_map(|(_, f)| f.data.iter().copied())
            .collect();
        Ok(Artifact {
            bytes,
            suggested_name: format!("{}_frames.rgba", cfg.name_hint),
            frame_count_delivered: delivered,
            was_partial: cancelled && delivered < cfg.total_frames,
        })
    }
}
