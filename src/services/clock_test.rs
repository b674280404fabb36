use super::*;
use crate::frame::ErrorCode;

fn clock() -> SimulationClock {
    SimulationClock::new(SimulationConfig::default()).unwrap()
}

fn running_clock() -> SimulationClock {
    let mut clock = clock();
    clock.play().unwrap();
    clock
}

// =========================================================================
// Construction
// =========================================================================

#[test]
fn new_clock_is_stopped_at_zero() {
    let clock = clock();
    assert_eq!(clock.status(), SimulationStatus::Stopped);
    assert!(clock.current_time().abs() < f64::EPSILON);
    assert!((clock.horizon() - 100.0).abs() < f64::EPSILON);
    assert!((clock.speed() - 1.0).abs() < f64::EPSILON);
    assert!(clock.last_sample().is_none());
}

#[test]
fn non_positive_horizon_is_rejected() {
    for horizon in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let config = SimulationConfig { horizon, ..SimulationConfig::default() };
        let err = SimulationClock::new(config).unwrap_err();
        assert_eq!(err.error_code(), "E_CLOCK_INVALID_HORIZON");
    }
}

#[test]
fn default_speed_outside_bounds_is_rejected() {
    let config = SimulationConfig { default_speed: 9.0, ..SimulationConfig::default() };
    assert!(matches!(SimulationClock::new(config), Err(ClockError::InvalidSpeedBounds { .. })));

    let inverted = SimulationConfig { min_speed: 5.0, max_speed: 0.1, ..SimulationConfig::default() };
    assert!(SimulationClock::new(inverted).is_err());
}

// =========================================================================
// Transport transitions
// =========================================================================

#[test]
fn play_pause_play_cycle() {
    let mut clock = clock();
    let t = clock.play().unwrap();
    assert_eq!((t.from, t.to), (SimulationStatus::Stopped, SimulationStatus::Running));
    assert!(t.changed());

    clock.pause().unwrap();
    assert_eq!(clock.status(), SimulationStatus::Paused);
    clock.play().unwrap();
    assert_eq!(clock.status(), SimulationStatus::Running);
}

#[test]
fn play_while_running_is_rejected() {
    let mut clock = running_clock();
    let err = clock.play().unwrap_err();
    assert_eq!(err, ClockError::InvalidTransition { action: "play", status: "running" });
    assert_eq!(clock.status(), SimulationStatus::Running);
}

#[test]
fn pause_outside_running_is_rejected() {
    let mut clock = clock();
    assert!(clock.pause().is_err());
    assert_eq!(clock.status(), SimulationStatus::Stopped);
}

#[test]
fn stop_keeps_speed_and_reset_restores_default() {
    let mut clock = clock();
    clock.set_speed(2.5).unwrap();
    clock.play().unwrap();
    clock.advance(1.0).unwrap();

    let t = clock.stop();
    assert_eq!(t.to, SimulationStatus::Stopped);
    assert!(clock.current_time().abs() < f64::EPSILON);
    assert!((clock.speed() - 2.5).abs() < f64::EPSILON);
    assert!(clock.last_sample().is_none());

    clock.reset();
    assert!((clock.speed() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn reset_is_total_from_every_status() {
    let mut stopped = clock();
    let mut running = running_clock();
    let mut paused = running_clock();
    paused.advance(1.0).unwrap();
    paused.pause().unwrap();
    let mut completed = running_clock();
    completed.advance(1_000.0).unwrap();
    assert_eq!(completed.status(), SimulationStatus::Completed);

    for clock in [&mut stopped, &mut running, &mut paused, &mut completed] {
        clock.reset();
        assert_eq!(clock.status(), SimulationStatus::Stopped);
        assert!(clock.current_time().abs() < f64::EPSILON);
        assert!(clock.last_sample().is_none());
    }
}

// =========================================================================
// advance
// =========================================================================

#[test]
fn advance_outside_running_has_no_effect() {
    let mut clock = clock();
    assert_eq!(clock.advance(0.1).unwrap(), None);
    assert!(clock.current_time().abs() < f64::EPSILON);

    let mut paused = running_clock();
    paused.pause().unwrap();
    assert_eq!(paused.advance(0.1).unwrap(), None);
    assert!(paused.last_sample().is_none());
}

#[test]
fn advance_scales_by_speed_and_emits_one_sample() {
    let mut clock = clock();
    clock.set_speed(2.0).unwrap();
    clock.play().unwrap();

    let step = clock.advance(0.5).unwrap().unwrap();
    assert!((clock.current_time() - 1.0).abs() < 1e-12);
    assert!((step.sample.timestamp - 1.0).abs() < 1e-12);
    assert!((step.sample.progress - 1.0).abs() < 1e-12);
    assert!(!step.completed);
    assert_eq!(clock.last_sample(), Some(&step.sample));
}

#[test]
fn advance_rejects_invalid_delta() {
    let mut clock = running_clock();
    for delta in [-0.1, f64::NAN, f64::INFINITY] {
        assert!(matches!(clock.advance(delta), Err(ClockError::InvalidDelta(_))));
    }
    assert!(clock.current_time().abs() < f64::EPSILON);
    assert!(clock.last_sample().is_none());
}

#[test]
fn advance_clamps_to_horizon_and_completes_once() {
    let mut clock = running_clock();
    clock.advance(99.95).unwrap();
    let step = clock.advance(10.0).unwrap().unwrap();

    assert!(step.completed);
    assert!((clock.current_time() - 100.0).abs() < f64::EPSILON);
    assert_eq!(clock.status(), SimulationStatus::Completed);
    assert_eq!(clock.advance(1.0).unwrap(), None);
    assert!((clock.current_time() - 100.0).abs() < f64::EPSILON);
}

#[test]
fn thousand_small_steps_reach_horizon_exactly() {
    let mut clock = running_clock();
    let mut completions = 0;
    for _ in 0..1_000 {
        if let Some(step) = clock.advance(0.1).unwrap() {
            completions += usize::from(step.completed);
        }
    }
    assert_eq!(completions, 1);
    assert_eq!(clock.status(), SimulationStatus::Completed);
    assert!((clock.current_time() - 100.0).abs() < f64::EPSILON);
}

#[test]
fn time_never_leaves_bounds() {
    let mut clock = running_clock();
    for step in 0..300 {
        let delta = f64::from(step % 7) * 0.3;
        clock.advance(delta).unwrap();
        assert!(clock.current_time() >= 0.0);
        assert!(clock.current_time() <= clock.horizon());
        let completed = clock.status() == SimulationStatus::Completed;
        assert_eq!(completed, (clock.current_time() - clock.horizon()).abs() < f64::EPSILON);
    }
}

// =========================================================================
// set_speed / seek
// =========================================================================

#[test]
fn set_speed_validates_bounds() {
    let mut clock = clock();
    let err = clock.set_speed(0.01).unwrap_err();
    assert_eq!(err.error_code(), "E_CLOCK_INVALID_SPEED");
    assert!(clock.set_speed(f64::NAN).is_err());
    assert!((clock.speed() - 1.0).abs() < f64::EPSILON);

    let previous = clock.set_speed(5.0).unwrap();
    assert!((previous - 1.0).abs() < f64::EPSILON);
    assert!((clock.speed() - 5.0).abs() < f64::EPSILON);
}

#[test]
fn set_speed_is_locked_while_running() {
    let mut clock = running_clock();
    assert_eq!(clock.set_speed(2.0).unwrap_err(), ClockError::SpeedLocked);
    assert!((clock.speed() - 1.0).abs() < f64::EPSILON);

    clock.pause().unwrap();
    clock.set_speed(2.0).unwrap();
    assert!((clock.speed() - 2.0).abs() < f64::EPSILON);
}

#[test]
fn seek_moves_time_without_changing_status() {
    let mut clock = running_clock();
    clock.seek(42.0).unwrap();
    assert!((clock.current_time() - 42.0).abs() < f64::EPSILON);
    assert_eq!(clock.status(), SimulationStatus::Running);

    let mut stopped = self::clock();
    stopped.seek(10.0).unwrap();
    assert_eq!(stopped.status(), SimulationStatus::Stopped);
}

#[test]
fn seek_rejects_out_of_range_and_completed() {
    let mut clock = running_clock();
    for target in [-1.0, 100.0, 250.0, f64::NAN] {
        assert!(matches!(clock.seek(target), Err(ClockError::InvalidSeek { .. })));
    }

    clock.advance(200.0).unwrap();
    assert!(matches!(clock.seek(5.0), Err(ClockError::InvalidTransition { action: "seek", .. })));
    assert!((clock.current_time() - 100.0).abs() < f64::EPSILON);
}

#[test]
fn telemetry_replays_after_reset() {
    let mut clock = running_clock();
    let first: Vec<_> = (0..10).filter_map(|_| clock.advance(0.1).unwrap()).collect();
    clock.reset();
    clock.play().unwrap();
    let second: Vec<_> = (0..10).filter_map(|_| clock.advance(0.1).unwrap()).collect();
    assert_eq!(first, second);
}
