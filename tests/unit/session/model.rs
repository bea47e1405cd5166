use super::*;

#[test]
fn default_configs_validate() {
    TurntableConfig::default().validate().unwrap();
    StillConfig::default().validate().unwrap();
}

#[test]
fn turntable_validation_rejects_bad_requests() {
    let bad = [
        TurntableConfig {
            width: 0,
            ..Default::default()
        },
        TurntableConfig {
            total_frames: 0,
            ..Default::default()
        },
        TurntableConfig {
            fps: Fps { num: 30, den: 0 },
            ..Default::default()
        },
        TurntableConfig {
            quality: 0,
            ..Default::default()
        },
        TurntableConfig {
            filename_hint: "../escape".to_owned(),
            ..Default::default()
        },
    ];
    for cfg in bad {
        assert!(matches!(cfg.validate(), Err(CaptureError::Validation(_))));
    }
}

#[test]
fn still_validation_rejects_zero_samples() {
    let cfg = StillConfig {
        sample_count: 0,
        ..Default::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn kind_follows_format() {
    let mut cfg = TurntableConfig::default();
    assert_eq!(cfg.kind(), SessionKind::TurntableStream);
    cfg.format = TurntableFormat::JpegSequence;
    assert_eq!(cfg.kind(), SessionKind::TurntableSequence);
}

#[test]
fn outcome_states() {
    let art = Artifact {
        bytes: vec![1],
        suggested_name: "a".to_owned(),
        frame_count_delivered: 1,
        was_partial: true,
    };
    assert_eq!(
        CaptureOutcome::Completed(art.clone()).state(),
        SessionState::Done
    );
    assert_eq!(
        CaptureOutcome::Partial(art.clone()).state(),
        SessionState::Cancelled
    );
    assert_eq!(CaptureOutcome::Superseded.state(), SessionState::Cancelled);
    assert_eq!(
        CaptureOutcome::Failed(ErrorKind::EncoderInitFailed).state(),
        SessionState::Failed
    );
    assert!(CaptureOutcome::Cancelled.artifact().is_none());
    assert_eq!(CaptureOutcome::Partial(art.clone()).into_artifact(), Some(art));
}

#[test]
fn partial_json_config_fills_defaults() {
    let cfg: TurntableConfig =
        serde_json::from_str(r#"{ "total_frames": 36, "easing": "smooth" }"#).unwrap();
    assert_eq!(cfg.total_frames, 36);
    assert_eq!(cfg.easing, Easing::Smooth);
    assert_eq!(cfg.width, 1920);
    assert_eq!(cfg.direction, Direction::Clockwise);
}

#[test]
fn terminal_states() {
    assert!(SessionState::Done.is_terminal());
    assert!(SessionState::Failed.is_terminal());
    assert!(!SessionState::Running.is_terminal());
    assert!(!SessionState::Idle.is_terminal());
}
