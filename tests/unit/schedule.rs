use super::*;
use std::f64::consts::PI;

const EPS: f64 = 1e-9;

#[test]
fn boundaries_close_the_circle() {
    for total in [1u64, 2, 7, 60, 120, 361] {
        for start in [0.0, 1.25, -3.0] {
            for direction in [Direction::Clockwise, Direction::CounterClockwise] {
                for easing in [Easing::Linear, Easing::Smooth] {
                    let a0 = angle_at(0, total, start, direction, easing);
                    let an = angle_at(total, total, start, direction, easing);
                    assert!((a0 - start).abs() < EPS);
                    assert!((an - (start + direction.sign() * TAU)).abs() < EPS);
                }
            }
        }
    }
}

#[test]
fn linear_is_monotonic() {
    let total = 90;
    let mut prev = f64::NEG_INFINITY;
    for i in 0..=total {
        let a = angle_at(i, total, 0.5, Direction::Clockwise, Easing::Linear);
        assert!(a > prev);
        prev = a;
    }

    let mut prev = f64::INFINITY;
    for i in 0..=total {
        let a = angle_at(i, total, 0.5, Direction::CounterClockwise, Easing::Linear);
        assert!(a < prev);
        prev = a;
    }
}

#[test]
fn smooth_midpoint_and_endpoints() {
    assert_eq!(Easing::Smooth.apply(0.0), 0.0);
    assert!((Easing::Smooth.apply(0.5) - 0.5).abs() < EPS);
    assert_eq!(Easing::Smooth.apply(1.0), 1.0);
    assert!((Easing::Smooth.apply(0.75) - 0.875).abs() < EPS);
}

#[test]
fn smooth_is_monotonic_with_flat_ends() {
    let mut prev = -1.0;
    for i in 0..=100 {
        let v = Easing::Smooth.apply(i as f64 / 100.0);
        assert!(v >= prev);
        prev = v;
    }
    let h = 1e-4;
    assert!(Easing::Smooth.apply(h) / h < 1e-3);
    assert!((1.0 - Easing::Smooth.apply(1.0 - h)) / h < 1e-3);
}

#[test]
fn last_frame_is_one_step_short() {
    let total = 36;
    let last = angle_at(total - 1, total, 0.0, Direction::Clockwise, Easing::Linear);
    assert!((last - (TAU - TAU / 36.0)).abs() < EPS);
}

#[test]
fn half_revolution_at_frame_60_of_120() {
    let a = angle_at(60, 120, 0.0, Direction::Clockwise, Easing::Linear);
    assert!((a - PI).abs() < EPS);
}

#[test]
fn smooth_quarter_of_60_frames() {
    let eased = Easing::Smooth.apply(15.0 / 60.0);
    assert!((eased - 0.125).abs() < EPS);
    let a = angle_at(15, 60, 0.0, Direction::Clockwise, Easing::Smooth);
    assert!((a - 0.125 * TAU).abs() < EPS);
    assert!((a - 0.785).abs() < 1e-3);
}

#[test]
fn path_requests_are_contiguous() {
    let path = TurntablePath {
        total_frames: 5,
        start_angle: 1.0,
        direction: Direction::CounterClockwise,
        easing: Easing::Linear,
    };
    let reqs: Vec<FrameRequest> = path.requests().collect();
    assert_eq!(reqs.len(), 5);
    for (i, r) in reqs.iter().enumerate() {
        assert_eq!(r.index, FrameIndex(i as u64));
    }
    assert!((reqs[1].angle_radians - (1.0 - TAU / 5.0)).abs() < EPS);
}

#[test]
fn pace_interval_matches_fps() {
    let fps = Fps::new(24, 1).unwrap();
    assert!((pace_interval_ms(fps) - 1000.0 / 24.0).abs() < EPS);
    assert_eq!(pace_interval(Fps::new(4, 1).unwrap()), Duration::from_millis(250));
}

#[test]
fn remaining_is_never_negative() {
    let mut pacer = Pacer::new(Fps::new(10, 1).unwrap());
    let t0 = Instant::now();
    assert_eq!(pacer.remaining(t0), Duration::ZERO);
    pacer.begin_frame(t0);
    assert_eq!(pacer.remaining(t0), Duration::from_millis(100));
    assert_eq!(
        pacer.remaining(t0 + Duration::from_millis(40)),
        Duration::from_millis(60)
    );
    assert_eq!(pacer.remaining(t0 + Duration::from_secs(3)), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn paced_sweep_takes_frames_over_fps() {
    let mut pacer = Pacer::new(Fps::new(24, 1).unwrap());
    let t0 = Instant::now();
    for _ in 0..120 {
        pacer.begin_frame(Instant::now());
        pacer.wait().await;
    }
    let elapsed = Instant::now() - t0;
    assert!((elapsed.as_secs_f64() - 5.0).abs() < 0.01);
}
