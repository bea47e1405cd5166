use super::*;
use crate::encode::still::StillFormat;
use crate::foundation::error::ErrorKind;
use crate::session::fake_surface::FakeSurface;

fn studio() -> CaptureStudio<FakeSurface> {
    CaptureStudio::new(FakeSurface::new(640, 480, 2.0, 1.1))
}

fn config(sample_count: u32) -> StillConfig {
    StillConfig {
        width: 16,
        height: 12,
        sample_count,
        format: StillFormat::Png,
        filename_hint: "chair".to_owned(),
        ..StillConfig::default()
    }
}

#[tokio::test]
async fn renders_after_every_sample_at_density_one() {
    let studio = studio();
    let session = studio.start_still_render(config(4)).unwrap();
    let outcome = session.run().await;

    let CaptureOutcome::Completed(artifact) = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(artifact.suggested_name, "chair_16x12.png");
    assert_eq!(artifact.frame_count_delivered, 1);
    let img = image::load_from_memory(&artifact.bytes).unwrap();
    assert_eq!((img.width(), img.height()), (16, 12));
    assert_eq!(studio.surface().composites.get(), 4);
    assert_eq!(studio.surface().state(), ((640, 480), 2.0, 1.1));
}

#[tokio::test]
async fn cancel_after_second_tick_produces_nothing() {
    let studio = studio();
    let session = studio.start_still_render(config(4)).unwrap();
    let handle = session.handle();
    let mut rx = studio.subscribe();

    let (outcome, percent_at_cancel) = tokio::join!(session.run(), async {
        let p = *rx.wait_for(|p| p.frame >= 2).await.unwrap();
        studio.cancel(handle.generation);
        p.percent
    });

    assert_eq!(percent_at_cancel, 50);
    assert_eq!(outcome, CaptureOutcome::Cancelled);
    assert_eq!(outcome.state(), SessionState::Cancelled);
    assert!(outcome.artifact().is_none());
    assert!(studio.surface().composites.get() <= 3);
    assert_eq!(studio.surface().state(), ((640, 480), 2.0, 1.1));
}

#[tokio::test]
async fn still_is_superseded_by_a_turntable() {
    let studio = studio();
    let still = studio.start_still_render(config(8)).unwrap();
    let mut rx = studio.subscribe();

    let (outcome, _) = tokio::join!(still.run(), async {
        rx.wait_for(|p| p.frame >= 1).await.unwrap();
        studio.start_turntable(Default::default()).unwrap()
    });
    assert_eq!(outcome, CaptureOutcome::Superseded);
    assert_eq!(studio.surface().state(), ((640, 480), 2.0, 1.1));
}

#[tokio::test]
async fn jpeg_still_uses_quality() {
    let studio = studio();
    let cfg = StillConfig {
        format: StillFormat::Jpeg,
        quality: 40,
        ..config(1)
    };
    let outcome = studio.start_still_render(cfg).unwrap().run().await;
    let artifact = outcome.into_artifact().unwrap();
    assert!(artifact.suggested_name.ends_with(".jpg"));
    assert_eq!(&artifact.bytes[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn bad_readback_fails_and_restores() {
    let studio = studio();
    studio.surface().short_readback.set(true);
    let outcome = studio.start_still_render(config(3)).unwrap().run().await;

    assert_eq!(outcome, CaptureOutcome::Failed(ErrorKind::EncoderWriteFailed));
    assert_eq!(outcome.state(), SessionState::Failed);
    assert!(outcome.artifact().is_none());
    assert_eq!(studio.surface().composites.get(), 3);
    assert_eq!(studio.surface().state(), ((640, 480), 2.0, 1.1));
    let p = studio.progress().latest();
    assert_eq!(p.state, SessionState::Idle);
    assert_eq!(p.percent, 0);
    assert!(!studio.is_busy());
}
