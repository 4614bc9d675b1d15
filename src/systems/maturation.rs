use serde::Serialize;

use crate::params::{GlobalConstants, ScenarioParameters};
use crate::systems::stress::GrowthRates;

/// Days for an animal to grow from `initial_weight` to `target_weight`.
///
/// A non-positive gain never reaches the target and yields infinity.
pub fn maturation_time(initial_weight: f64, target_weight: f64, daily_gain: f64) -> f64 {
    if daily_gain > 0.0 {
        (target_weight - initial_weight) / daily_gain
    } else {
        f64::INFINITY
    }
}

/// Daily outflow of `stock` through a transition lasting `days`.
///
/// Infinite or non-positive durations move nothing.
pub fn transition_flow(stock: f64, days: f64) -> f64 {
    if days > 0.0 && days.is_finite() {
        stock / days
    } else {
        0.0
    }
}

/// Transition durations in days for the five weight-driven stages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaturationTimes {
    pub female_calf: f64,
    pub heifer: f64,
    pub male_calf: f64,
    pub steer: f64,
    pub bull_fattening: f64,
}

pub fn maturation_times(
    params: &ScenarioParameters,
    growth: &GrowthRates,
    constants: &GlobalConstants,
) -> MaturationTimes {
    MaturationTimes {
        female_calf: maturation_time(
            params.initial_weight_female_calf,
            constants.target_weight_female_calf,
            growth.female_calf,
        ),
        heifer: maturation_time(
            params.initial_weight_heifer,
            params.target_weight_heifer,
            growth.heifer,
        ),
        male_calf: maturation_time(
            params.initial_weight_male_calf,
            constants.target_weight_male_calf,
            growth.male_calf,
        ),
        steer: maturation_time(
            constants.initial_weight_steer,
            constants.target_weight_steer,
            growth.steer,
        ),
        bull_fattening: maturation_time(
            constants.initial_weight_bull,
            constants.target_weight_bull,
            growth.bull,
        ),
    }
}
