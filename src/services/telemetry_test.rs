use super::*;

#[test]
fn samples_stay_in_expected_ranges() {
    let mut generator = TelemetryGenerator::new(11);
    for step in 0..500 {
        let time = f64::from(step) * 0.1;
        let sample = generator.sample(time, 0.0);
        assert!(sample.rmsd >= RMSD_BASE - RMSD_AMPLITUDE);
        assert!(sample.rmsd < RMSD_BASE + RMSD_AMPLITUDE + RMSD_NOISE);
        assert!((sample.temperature - 300.0).abs() <= 2.0);
        assert!((sample.pressure - 1.0).abs() <= 0.02);
        assert!((sample.timestamp - time).abs() < f64::EPSILON);
    }
}

#[test]
fn energy_walks_from_baseline() {
    let mut generator = TelemetryGenerator::new(3);
    let first = generator.sample(0.1, 0.1);
    assert!((first.potential_energy - BASELINE_ENERGY).abs() <= ENERGY_STEP / 2.0);
}

#[test]
fn reset_replays_identical_stream() {
    let mut generator = TelemetryGenerator::new(42);
    let first_run: Vec<_> = (1..=20)
        .map(|i| generator.sample(f64::from(i), 0.0))
        .collect();

    generator.reset();
    let second_run: Vec<_> = (1..=20)
        .map(|i| generator.sample(f64::from(i), 0.0))
        .collect();

    assert_eq!(first_run, second_run);
}

#[test]
fn different_seeds_diverge() {
    let mut a = TelemetryGenerator::new(1);
    let mut b = TelemetryGenerator::new(2);
    assert_ne!(a.sample(1.0, 1.0), b.sample(1.0, 1.0));
}
