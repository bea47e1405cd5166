use crate::foundation::core::PixelBuffer;
use crate::foundation::error::{CaptureError, CaptureResult};
use crate::foundation::math::flatten_over_background;
use image::ImageEncoder as _;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;

/// JPEG has no alpha channel; transparent pixels are flattened onto this color.
pub const JPEG_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Default JPEG quality.
pub const DEFAULT_QUALITY: u8 = 92;

/// Still-image formats for single renders and sequence frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StillFormat {
    /// Lossless PNG with alpha.
    #[default]
    Png,
    /// Lossy JPEG, alpha flattened onto [`JPEG_BACKGROUND`].
    Jpeg,
    /// Lossless WebP with alpha.
    Webp,
}

impl StillFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }
}

/// Encode `frame` to `format`. `quality` (1..=100) only affects JPEG.
pub fn encode_still(
    frame: &PixelBuffer,
    format: StillFormat,
    quality: u8,
) -> CaptureResult<Vec<u8>> {
    frame
        .check_len()
        .map_err(|e| CaptureError::encoder_write(e.to_string()))?;
    let mut out = Vec::new();
    match format {
        StillFormat::Png => {
            let straight = frame.to_straight_rgba();
            PngEncoder::new(&mut out)
                .write_image(
                    &straight,
                    frame.width,
                    frame.height,
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(|e| CaptureError::encoder_write(format!("png encode failed: {e}")))?;
        }
        StillFormat::Webp => {
            let straight = frame.to_straight_rgba();
            WebPEncoder::new_lossless(&mut out)
                .write_image(
                    &straight,
                    frame.width,
                    frame.height,
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(|e| CaptureError::encoder_write(format!("webp encode failed: {e}")))?;
        }
        StillFormat::Jpeg => {
            let mut flat = vec![0u8; frame.data.len()];
            flatten_over_background(&mut flat, &frame.data, frame.premultiplied, JPEG_BACKGROUND)?;
            let rgb: Vec<u8> = flat
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
                .write_image(
                    &rgb,
                    frame.width,
                    frame.height,
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| CaptureError::encoder_write(format!("jpeg encode failed: {e}")))?;
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/still.rs"]
mod tests;
