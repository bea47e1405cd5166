use crate::encode::encoder::{Artifact, EncoderConfig, FrameCounter, FrameEncoder, check_config};
use crate::encode::still::{StillFormat, encode_still};
use crate::foundation::core::{FrameIndex, PixelBuffer};
use crate::foundation::error::{CaptureError, CaptureResult};
use std::io::{Cursor, Write as _};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Packs discrete still captures into one ZIP archive.
///
/// Entries are named `frame_0000.png`, `frame_0001.png`, ...; the padding widens when the
/// sweep has more than 10 000 frames. Entries are stored uncompressed with a fixed timestamp
/// so identical captures produce identical archives.
pub struct SequenceEncoder {
    format: StillFormat,
    quality: u8,

    zip: Option<ZipWriter<Cursor<Vec<u8>>>>,
    cfg: Option<EncoderConfig>,
    counter: FrameCounter,
    pad: usize,
}

impl SequenceEncoder {
    /// Encoder producing `format` entries; `quality` applies to JPEG.
    pub fn new(format: StillFormat, quality: u8) -> Self {
        Self {
            format,
            quality,
            zip: None,
            cfg: None,
            counter: FrameCounter::default(),
            pad: 4,
        }
    }

    fn entry_name(&self, idx: FrameIndex) -> String {
        format!(
            "frame_{:0width$}.{}",
            idx.0,
            self.format.extension(),
            width = self.pad
        )
    }
}

/// Digits needed for the largest index, at least four.
pub(crate) fn index_padding(total_frames: u64) -> usize {
    let last = total_frames.saturating_sub(1);
    last.to_string().len().max(4)
}

impl FrameEncoder for SequenceEncoder {
    fn start(&mut self, cfg: EncoderConfig) -> CaptureResult<()> {
        check_config(&cfg)?;
        self.pad = index_padding(cfg.total_frames);
        self.zip = Some(ZipWriter::new(Cursor::new(Vec::new())));
        self.cfg = Some(cfg);
        self.counter = FrameCounter::default();
        Ok(())
    }

    fn submit_frame(&mut self, idx: FrameIndex, frame: &PixelBuffer) -> CaptureResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| CaptureError::encoder_write("sequence encoder not started"))?;
        self.counter.accept(idx, frame, cfg)?;

        let encoded = encode_still(frame, self.format, self.quality)?;
        let name = self.entry_name(idx);
        let zip = self
            .zip
            .as_mut()
            .ok_or_else(|| CaptureError::encoder_write("sequence encoder already finished"))?;
        let opts = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .last_modified_time(zip::DateTime::default());
        zip.start_file(name.as_str(), opts)
            .map_err(|e| CaptureError::encoder_write(format!("zip entry '{name}': {e}")))?;
        zip.write_all(&encoded)
            .map_err(|e| CaptureError::encoder_write(format!("zip write '{name}': {e}")))?;
        Ok(())
    }

    fn finish(&mut self, cancelled: bool) -> CaptureResult<Artifact> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| CaptureError::encoder_write("sequence encoder not started"))?;
        let zip = self
            .zip
            .take()
            .ok_or_else(|| CaptureError::encoder_write("sequence encoder already finished"))?;
        let bytes = zip
            .finish()
            .map_err(|e| CaptureError::encoder_write(format!("zip finalize failed: {e}")))?
            .into_inner();

        let delivered = self.counter.delivered();
        let was_partial = cancelled && delivered < cfg.total_frames;
        let suggested_name = if was_partial {
            format!(
                "{}_frames_partial_{}of{}.zip",
                cfg.name_hint, delivered, cfg.total_frames
            )
        } else {
            format!("{}_frames.zip", cfg.name_hint)
        };
        tracing::debug!(delivered, was_partial, bytes = bytes.len(), "sequence archive packed");

        Ok(Artifact {
            bytes,
            suggested_name,
            frame_count_delivered: delivered,
            was_partial,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sequence.rs"]
mod tests;
