//! Encoders turning captured frames into a downloadable [`Artifact`].
//!
//! Two strategies sit behind one [`FrameEncoder`] contract: [`StreamEncoder`] pushes frames into
//! a continuous video, [`SequenceEncoder`] packs discrete stills into an archive.

/// Encoder contract, configuration and artifact.
pub mod encoder;
/// In-memory encoder for tests and debugging.
pub mod memory;
/// Image-sequence archive encoder.
pub mod sequence;
/// Single still-image encoding.
pub mod still;
/// `ffmpeg`-backed video encoder.
pub mod stream;

use crate::encode::encoder::FrameEncoder;
use crate::encode::sequence::SequenceEncoder;
use crate::encode::still::StillFormat;
use crate::encode::stream::{StreamEncoder, StreamEncoderOpts, VideoContainer};

pub use crate::encode::encoder::Artifact;

/// Output format of a turntable capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurntableFormat {
    /// H.264 MP4 video.
    #[default]
    Mp4,
    /// VP9 WebM video.
    Webm,
    /// ZIP of PNG frames.
    PngSequence,
    /// ZIP of JPEG frames.
    JpegSequence,
}

impl TurntableFormat {
    /// `true` for continuous video output (paced, streamed).
    pub fn is_stream(self) -> bool {
        matches!(self, Self::Mp4 | Self::Webm)
    }

    /// Build the encoder for this format. `quality` applies to JPEG sequences.
    pub fn build_encoder(self, quality: u8) -> Box<dyn FrameEncoder> {
        match self {
            Self::Mp4 => Box::new(StreamEncoder::new(StreamEncoderOpts::new(
                VideoContainer::Mp4,
            ))),
            Self::Webm => Box::new(StreamEncoder::new(StreamEncoderOpts::new(
                VideoContainer::Webm,
            ))),
            Self::PngSequence => Box::new(SequenceEncoder::new(StillFormat::Png, quality)),
            Self::JpegSequence => Box::new(SequenceEncoder::new(StillFormat::Jpeg, quality)),
        }
    }
}
