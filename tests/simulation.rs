use herdflow::{
    engine::{SimulationConfig, SimulationRunner},
    herd::{Compartment, PopulationState},
    params::ScenarioParameters,
    scenario::{ScenarioFile, ScenarioLoader},
};

fn pampa() -> ScenarioFile {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
        .load("scenarios/pampa.yaml")
        .expect("scenario should load")
}

fn assert_close(actual: f64, expected: f64, relative: f64) {
    let tolerance = expected.abs() * relative;
    assert!(
        (actual - expected).abs() <= tolerance,
        "{actual} differs from {expected} by more than {tolerance}"
    );
}

#[test]
fn day_zero_reports_the_initial_census() {
    let scenario = pampa();
    let result = SimulationRunner::new(scenario.baseline_config().unwrap())
        .unwrap()
        .run();
    let first = result.series.day(0).unwrap();
    assert_eq!(first.total_herd, scenario.initial_herd.total());
    assert_eq!(first.total_herd, 23_729_878.0);
    assert_eq!(first.daily_meat, 0.0);
    assert_eq!(first.daily_emissions, 0.0);
    assert_eq!(first.emission_intensity, 0.0);
    assert_eq!(result.series.len(), 3651);
}

#[test]
fn first_day_applies_the_net_flow() {
    let scenario = pampa();
    let runner = SimulationRunner::new(scenario.baseline_config().unwrap()).unwrap();
    let mut frames = Vec::new();
    runner.run_with_hook(|frame| {
        if frame.day == 1 {
            frames.push(*frame);
        }
    });
    let frame = frames.pop().expect("day 1 reported");
    let expected = scenario.initial_herd.total() + frame.flows.net_change();
    assert_close(frame.herd.total(), expected, 1e-12);
    assert_close(frame.herd.total(), 23_730_471.742682554, 1e-4);
    assert_close(frame.metrics.meat, 4_051_161.540985348, 1e-6);
    assert_close(frame.metrics.emissions, 97_281_874.66, 1e-6);
    assert_close(frame.metrics.emission_intensity, 24.0133, 1e-4);
    assert_eq!(frame.adjusted.stress, 0.0);
}

#[test]
fn stocks_stay_non_negative_over_the_full_horizon() {
    let scenario = pampa();
    for config in [
        scenario.baseline_config().unwrap(),
        scenario.transition_config().unwrap(),
    ] {
        let runner = SimulationRunner::new(config).unwrap();
        let mut lowest = f64::INFINITY;
        runner.run_with_hook(|frame| {
            for (_, stock) in frame.herd.iter() {
                lowest = lowest.min(stock);
            }
        });
        assert!(lowest >= 0.0);
    }
}

#[test]
fn static_baseline_keeps_its_regime_and_stays_unstressed() {
    let scenario = pampa();
    let extensive = scenario.regime("extensive").unwrap();
    let runner = SimulationRunner::new(scenario.baseline_config().unwrap()).unwrap();
    let mut checked = 0;
    runner.run_with_hook(|frame| {
        assert_eq!(frame.parameters, extensive);
        assert_eq!(frame.adjusted.stress, 0.0);
        checked += 1;
    });
    assert_eq!(checked, 3650);
}

#[test]
fn baseline_herd_settles_below_capacity() {
    let scenario = pampa();
    let result = SimulationRunner::new(scenario.baseline_config().unwrap())
        .unwrap()
        .run();
    assert_close(result.final_state.total(), 23_553_343.5, 1e-3);
    let peak = result
        .series
        .iter()
        .map(|record| record.total_herd)
        .fold(f64::MIN, f64::max);
    assert!(peak < scenario.carrying_capacity);
}

#[test]
fn transition_reaches_the_end_regime_and_engages_stress() {
    let scenario = pampa();
    let intensive = scenario.regime("intensive").unwrap();
    let runner = SimulationRunner::new(scenario.transition_config().unwrap()).unwrap();
    let mut last_parameters = None;
    let mut max_stress: f64 = 0.0;
    let result = runner.run_with_hook(|frame| {
        last_parameters = Some(frame.parameters);
        max_stress = max_stress.max(frame.adjusted.stress);
    });
    let last = last_parameters.unwrap();
    // progress on the final day is (N - 1) / N
    let expected = intensive.daily_gain_steer
        - (intensive.daily_gain_steer - ScenarioParameters::extensive().daily_gain_steer) / 3650.0;
    assert_close(last.daily_gain_steer, expected, 1e-12);
    assert!(max_stress > 0.0);
    assert!(result.final_state.total() > scenario.carrying_capacity);
    assert_close(result.final_state.total(), 29_115_822.3, 1e-3);
}

#[test]
fn zero_growth_stalls_maturation_without_failing() {
    let mut stalled = ScenarioParameters::extensive();
    stalled.daily_gain_steer = 0.0;
    stalled.daily_gain_female_calf = 0.0;
    let config = SimulationConfig::new("stalled", stalled, stalled, 26_000_000.0)
        .with_horizon_days(365);
    let runner = SimulationRunner::new(config).unwrap();
    let result = runner.run_with_hook(|frame| {
        assert_eq!(frame.maturation.steer, f64::INFINITY);
        assert_eq!(frame.flows.steer_maturation, 0.0);
        assert_eq!(frame.flows.female_calf_maturation, 0.0);
    });
    assert!(result
        .series
        .iter()
        .all(|record| record.total_herd.is_finite() && record.daily_meat.is_finite()));
    let calves = result.final_state.get(Compartment::FemaleCalves);
    assert!(calves > PopulationState::historical().female_calves);
}
