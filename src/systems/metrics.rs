use serde::Serialize;

use crate::herd::PopulationState;
use crate::params::EmissionFactors;

/// Herd emissions for one day in kg CO2-eq.
pub fn daily_emissions(herd: &PopulationState, factors: &EmissionFactors) -> f64 {
    herd.iter()
        .map(|(compartment, stock)| stock * factors.get(compartment))
        .sum()
}

/// Cumulative emissions per kg of cumulative meat; 0 until meat is produced.
pub fn emission_intensity(cumulative_emissions: f64, cumulative_meat: f64) -> f64 {
    if cumulative_meat > 0.0 {
        cumulative_emissions / cumulative_meat
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DailyMetrics {
    pub meat: f64,
    pub emissions: f64,
    pub cumulative_meat: f64,
    pub cumulative_emissions: f64,
    pub emission_intensity: f64,
}

/// Running production and emission totals since day 0.
#[derive(Debug, Clone, Default)]
pub struct MetricsAccumulator {
    cumulative_meat: f64,
    cumulative_emissions: f64,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one day into the totals. `herd` is the stock after integration.
    pub fn record(
        &mut self,
        herd: &PopulationState,
        meat: f64,
        factors: &EmissionFactors,
        step_days: f64,
    ) -> DailyMetrics {
        let emissions = daily_emissions(herd, factors);
        self.cumulative_meat += meat * step_days;
        self.cumulative_emissions += emissions * step_days;
        DailyMetrics {
            meat,
            emissions,
            cumulative_meat: self.cumulative_meat,
            cumulative_emissions: self.cumulative_emissions,
            emission_intensity: emission_intensity(self.cumulative_emissions, self.cumulative_meat),
        }
    }

    pub fn cumulative_meat(&self) -> f64 {
        self.cumulative_meat
    }

    pub fn cumulative_emissions(&self) -> f64 {
        self.cumulative_emissions
    }
}
