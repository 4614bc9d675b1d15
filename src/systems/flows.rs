use serde::Serialize;

use crate::herd::PopulationState;
use crate::params::{GlobalConstants, ScenarioParameters};
use crate::systems::maturation::{transition_flow, MaturationTimes};
use crate::systems::stress::AdjustedParameters;

const DAYS_PER_YEAR: f64 = 365.0;

/// Carcass weight leaving the herd in one day, in kg, per sold category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MeatProduction {
    pub heifers: f64,
    pub cows: f64,
    pub bulls: f64,
}

impl MeatProduction {
    pub fn total(&self) -> f64 {
        self.heifers + self.cows + self.bulls
    }
}

/// Every transfer computed for one day, in head per day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Flows {
    pub female_births: f64,
    pub male_births: f64,
    pub female_calf_maturation: f64,
    pub heifer_conversion: f64,
    pub male_calf_maturation: f64,
    pub steer_maturation: f64,
    pub open_heifer_culling: f64,
    pub cow_culling: f64,
    pub bull_sales: f64,
    /// Deaths per compartment.
    pub deaths: PopulationState,
    pub meat: MeatProduction,
}

impl Flows {
    pub fn births(&self) -> f64 {
        self.female_births + self.male_births
    }

    pub fn sales(&self) -> f64 {
        self.open_heifer_culling + self.cow_culling + self.bull_sales
    }

    pub fn total_deaths(&self) -> f64 {
        self.deaths.total()
    }

    /// Net change of the whole herd; transfers between compartments cancel.
    pub fn net_change(&self) -> f64 {
        self.births() - self.total_deaths() - self.sales()
    }
}

/// Bulls kept for breeding; only the surplus above this is sold.
pub fn required_bulls(cows: f64, constants: &GlobalConstants) -> f64 {
    cows / constants.cows_per_bull
}

/// Computes the day's flows from the previous day's stocks.
pub fn compute_flows(
    herd: &PopulationState,
    params: &ScenarioParameters,
    adjusted: &AdjustedParameters,
    times: &MaturationTimes,
    constants: &GlobalConstants,
) -> Flows {
    let heifer_births =
        herd.heifers * adjusted.pregnancy_rate_heifers * params.calving_rate_heifers;
    let cow_births = herd.cows * adjusted.pregnancy_rate_cows * params.calving_rate_cows;
    let births = (heifer_births + cow_births) / DAYS_PER_YEAR;

    let pregnant_heifers = herd.heifers * adjusted.pregnancy_rate_heifers;
    let open_heifers = herd.heifers * (1.0 - adjusted.pregnancy_rate_heifers);
    let surplus_bulls = (herd.bulls - required_bulls(herd.cows, constants)).max(0.0);

    let open_heifer_culling = open_heifers * params.cull_rate_open_heifers / DAYS_PER_YEAR;
    let cow_culling = herd.cows * params.cull_rate_cows / DAYS_PER_YEAR;
    let bull_sales = transition_flow(surplus_bulls, times.bull_fattening);

    let mortality = &adjusted.mortality;
    let deaths = PopulationState {
        female_calves: herd.female_calves * mortality.female_calves / DAYS_PER_YEAR,
        heifers: herd.heifers * mortality.heifers / DAYS_PER_YEAR,
        cows: herd.cows * mortality.cows / DAYS_PER_YEAR,
        male_calves: herd.male_calves * mortality.male_calves / DAYS_PER_YEAR,
        steers: herd.steers * mortality.steers / DAYS_PER_YEAR,
        bulls: herd.bulls * mortality.bulls / DAYS_PER_YEAR,
    };

    let meat = MeatProduction {
        heifers: open_heifer_culling
            * constants.sale_weight_heifers
            * constants.dressing_yield_heifers,
        cows: cow_culling * constants.sale_weight_cows * constants.dressing_yield_cows,
        bulls: bull_sales * constants.target_weight_bull * constants.dressing_yield_bulls,
    };

    Flows {
        female_births: births * params.female_birth_ratio,
        male_births: births * (1.0 - params.female_birth_ratio),
        female_calf_maturation: transition_flow(herd.female_calves, times.female_calf),
        heifer_conversion: transition_flow(pregnant_heifers, times.heifer),
        male_calf_maturation: transition_flow(herd.male_calves, times.male_calf),
        steer_maturation: transition_flow(herd.steers, times.steer),
        open_heifer_culling,
        cow_culling,
        bull_sales,
        deaths,
        meat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::maturation::maturation_times;
    use crate::systems::stress::adjust;

    fn flows_for(herd: &PopulationState, params: &ScenarioParameters) -> Flows {
        let constants = GlobalConstants::default();
        let adjusted = adjust(params, 0.0);
        let times = maturation_times(params, &adjusted.growth, &constants);
        compute_flows(herd, params, &adjusted, &times, &constants)
    }

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() <= 1e-9 * expected.abs().max(1.0)
    }

    #[test]
    fn births_split_by_sex_ratio() {
        let herd = PopulationState {
            heifers: 365.0,
            cows: 730.0,
            ..PopulationState::default()
        };
        let flows = flows_for(&herd, &ScenarioParameters::extensive());
        // (365 * 0.65 * 0.85 + 730 * 0.65 * 0.85) / 365
        assert!(close(flows.births(), 1.6575));
        assert!(close(flows.female_births, flows.male_births));
    }

    #[test]
    fn only_surplus_bulls_are_sold() {
        let herd = PopulationState {
            cows: 2_500.0,
            bulls: 100.0,
            ..PopulationState::default()
        };
        let flows = flows_for(&herd, &ScenarioParameters::extensive());
        assert_eq!(flows.bull_sales, 0.0);
        assert_eq!(flows.meat.bulls, 0.0);

        let herd = PopulationState {
            bulls: 560.0,
            ..herd
        };
        let flows = flows_for(&herd, &ScenarioParameters::extensive());
        // 460 surplus bulls over a 460-day fattening period
        assert!(close(flows.bull_sales, 1.0));
        assert!(close(flows.meat.bulls, 530.0 * 0.52));
    }

    #[test]
    fn heifers_convert_only_when_pregnant() {
        let herd = PopulationState {
            heifers: 1_040.0,
            ..PopulationState::default()
        };
        let flows = flows_for(&herd, &ScenarioParameters::extensive());
        assert!(close(flows.heifer_conversion, 0.65));
        assert!(close(flows.open_heifer_culling, 1_040.0 * 0.35 * 0.35 / 365.0));
    }

    #[test]
    fn zero_growth_stops_the_transition() {
        let params = ScenarioParameters {
            daily_gain_steer: 0.0,
            ..ScenarioParameters::extensive()
        };
        let flows = flows_for(&PopulationState::historical(), &params);
        assert_eq!(flows.steer_maturation, 0.0);
        assert!(flows.male_calf_maturation > 0.0);
    }

    #[test]
    fn bull_mortality_ignores_stress() {
        let params = ScenarioParameters::extensive();
        let constants = GlobalConstants::default();
        let herd = PopulationState::historical();
        let adjusted = adjust(&params, 0.5);
        let times = maturation_times(&params, &adjusted.growth, &constants);
        let flows = compute_flows(&herd, &params, &adjusted, &times, &constants);
        assert!(close(flows.deaths.bulls, herd.bulls * 0.02 / 365.0));
        assert!(close(flows.deaths.cows, herd.cows * 0.075 / 365.0));
    }

    #[test]
    fn meat_is_carcass_weight_of_culled_animals() {
        let flows = flows_for(&PopulationState::historical(), &ScenarioParameters::extensive());
        let expected = flows.open_heifer_culling * 380.0 * 0.52
            + flows.cow_culling * 450.0 * 0.52
            + flows.bull_sales * 530.0 * 0.52;
        assert!(close(flows.meat.total(), expected));
        assert!(close(flows.meat.total(), 4_051_161.540985348));
    }
}
