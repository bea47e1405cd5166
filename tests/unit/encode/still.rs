use super::*;

fn checker(width: u32, height: u32) -> PixelBuffer {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            if (x + y) % 2 == 0 {
                data.extend_from_slice(&[200, 40, 40, 255]);
            } else {
                data.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    PixelBuffer {
        width,
        height,
        data,
        premultiplied: true,
    }
}

#[test]
fn png_round_trips_dimensions_and_alpha() {
    let bytes = encode_still(&checker(6, 4), StillFormat::Png, DEFAULT_QUALITY).unwrap();
    let img = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
        .unwrap()
        .to_rgba8();
    assert_eq!(img.dimensions(), (6, 4));
    assert_eq!(img.get_pixel(0, 0).0, [200, 40, 40, 255]);
    assert_eq!(img.get_pixel(1, 0).0[3], 0);
}

#[test]
fn jpeg_is_opaque_and_flattened() {
    let bytes = encode_still(&checker(8, 8), StillFormat::Jpeg, 90).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    let img = image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg)
        .unwrap()
        .to_rgb8();
    assert_eq!(img.dimensions(), (8, 8));
}

#[test]
fn webp_signature() {
    let bytes = encode_still(&checker(4, 4), StillFormat::Webp, DEFAULT_QUALITY).unwrap();
    assert_eq!(&bytes[..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WEBP");
}

#[test]
fn rejects_truncated_buffer() {
    let mut frame = checker(4, 4);
    frame.data.truncate(10);
    let err = encode_still(&frame, StillFormat::Png, DEFAULT_QUALITY).unwrap_err();
    assert!(matches!(err, CaptureError::EncoderWrite(_)));
}

#[test]
fn extensions() {
    assert_eq!(StillFormat::Png.extension(), "png");
    assert_eq!(StillFormat::Jpeg.extension(), "jpg");
    assert_eq!(StillFormat::Webp.extension(), "webp");
}
