use crate::herd::PopulationState;
use crate::systems::flows::Flows;

/// Explicit Euler step of the six compartments, clamped at zero afterwards.
pub fn integrate(herd: &mut PopulationState, flows: &Flows, step_days: f64) {
    let deaths = &flows.deaths;
    herd.female_calves +=
        (flows.female_births - flows.female_calf_maturation - deaths.female_calves) * step_days;
    herd.heifers += (flows.female_calf_maturation
        - flows.heifer_conversion
        - flows.open_heifer_culling
        - deaths.heifers)
        * step_days;
    herd.cows += (flows.heifer_conversion - flows.cow_culling - deaths.cows) * step_days;
    herd.male_calves +=
        (flows.male_births - flows.male_calf_maturation - deaths.male_calves) * step_days;
    herd.steers +=
        (flows.male_calf_maturation - flows.steer_maturation - deaths.steers) * step_days;
    herd.bulls += (flows.steer_maturation - flows.bull_sales - deaths.bulls) * step_days;
    herd.clamp_non_negative();
}
