use super::*;
use crate::foundation::core::Fps;
use std::io::Read as _;

fn cfg(total_frames: u64) -> EncoderConfig {
    EncoderConfig {
        width: 4,
        height: 2,
        fps: Fps::new(30, 1).unwrap(),
        total_frames,
        name_hint: "chair".to_owned(),
    }
}

fn frame(shade: u8) -> PixelBuffer {
    PixelBuffer {
        width: 4,
        height: 2,
        data: [shade, shade, shade, 255].repeat(8),
        premultiplied: true,
    }
}

fn entry_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_owned())
        .collect()
}

#[test]
fn complete_archive_has_every_frame_in_order() {
    let mut enc = SequenceEncoder::new(StillFormat::Png, 92);
    enc.start(cfg(3)).unwrap();
    for i in 0..3 {
        enc.submit_frame(FrameIndex(i), &frame(i as u8 * 50)).unwrap();
    }
    let art = enc.finish(false).unwrap();
    assert_eq!(art.suggested_name, "chair_frames.zip");
    assert_eq!(art.frame_count_delivered, 3);
    assert!(!art.was_partial);
    assert_eq!(
        entry_names(&art.bytes),
        ["frame_0000.png", "frame_0001.png", "frame_0002.png"]
    );

    let mut archive = zip::ZipArchive::new(Cursor::new(art.bytes.as_slice())).unwrap();
    let mut png = Vec::new();
    archive.by_index(2).unwrap().read_to_end(&mut png).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [100, 100, 100, 255]);
}

#[test]
fn cancelled_archive_is_labelled_partial() {
    let mut enc = SequenceEncoder::new(StillFormat::Jpeg, 80);
    enc.start(cfg(10)).unwrap();
    for i in 0..4 {
        enc.submit_frame(FrameIndex(i), &frame(10)).unwrap();
    }
    let art = enc.finish(true).unwrap();
    assert!(art.was_partial);
    assert_eq!(art.frame_count_delivered, 4);
    assert_eq!(art.suggested_name, "chair_frames_partial_4of10.zip");
    assert_eq!(entry_names(&art.bytes).len(), 4);
    assert!(entry_names(&art.bytes)[3].ends_with(".jpg"));
}

#[test]
fn out_of_order_submission_is_a_write_failure() {
    let mut enc = SequenceEncoder::new(StillFormat::Png, 92);
    enc.start(cfg(3)).unwrap();
    let err = enc.submit_frame(FrameIndex(1), &frame(0)).unwrap_err();
    assert!(matches!(err, CaptureError::EncoderWrite(_)));
}

#[test]
fn submit_before_start_fails() {
    let mut enc = SequenceEncoder::new(StillFormat::Png, 92);
    assert!(enc.submit_frame(FrameIndex(0), &frame(0)).is_err());
    assert!(enc.finish(false).is_err());
}

#[test]
fn identical_captures_produce_identical_archives() {
    let run = || {
        let mut enc = SequenceEncoder::new(StillFormat::Png, 92);
        enc.start(cfg(2)).unwrap();
        enc.submit_frame(FrameIndex(0), &frame(1)).unwrap();
        enc.submit_frame(FrameIndex(1), &frame(2)).unwrap();
        enc.finish(false).unwrap().bytes
    };
    assert_eq!(run(), run());
}

#[test]
fn padding_widens_for_long_sweeps() {
    assert_eq!(index_padding(1), 4);
    assert_eq!(index_padding(10_000), 4);
    assert_eq!(index_padding(10_001), 5);
}
