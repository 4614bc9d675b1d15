use serde::Serialize;

use crate::params::ScenarioParameters;

/// Density stress: how far the herd overshoots the carrying capacity, as a
/// fraction of capacity. Zero at or below capacity.
pub fn stress_factor(population: f64, carrying_capacity: f64) -> f64 {
    (population / carrying_capacity - 1.0).max(0.0)
}

/// Daily gains in kg/day after the density feedback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthRates {
    pub female_calf: f64,
    pub heifer: f64,
    pub male_calf: f64,
    pub steer: f64,
    pub bull: f64,
}

/// Annual mortality rates after the density feedback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MortalityRates {
    pub female_calves: f64,
    pub heifers: f64,
    pub cows: f64,
    pub male_calves: f64,
    pub steers: f64,
    pub bulls: f64,
}

/// Parameters touched by the density feedback for one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdjustedParameters {
    pub stress: f64,
    pub pregnancy_rate_heifers: f64,
    pub pregnancy_rate_cows: f64,
    pub growth: GrowthRates,
    pub mortality: MortalityRates,
}

/// Slows fertility and growth by `1 + stress` and speeds up mortality by the
/// same factor. Bull mortality is left at the regime rate.
pub fn adjust(params: &ScenarioParameters, stress: f64) -> AdjustedParameters {
    let factor = 1.0 + stress;
    AdjustedParameters {
        stress,
        pregnancy_rate_heifers: params.pregnancy_rate_heifers / factor,
        pregnancy_rate_cows: params.pregnancy_rate_cows / factor,
        growth: GrowthRates {
            female_calf: params.daily_gain_female_calf / factor,
            heifer: params.daily_gain_heifer / factor,
            male_calf: params.daily_gain_male_calf / factor,
            steer: params.daily_gain_steer / factor,
            bull: params.daily_gain_bull / factor,
        },
        mortality: MortalityRates {
            female_calves: params.mortality_female_calves * factor,
            heifers: params.mortality_heifers * factor,
            cows: params.mortality_cows * factor,
            male_calves: params.mortality_male_calves * factor,
            steers: params.mortality_steers * factor,
            bulls: params.mortality_bulls,
        },
    }
}
