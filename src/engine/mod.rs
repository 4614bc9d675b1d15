use std::collections::BTreeMap;
use std::thread;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::ConfigurationError,
    herd::{Compartment, PopulationState},
    params::{EmissionFactors, GlobalConstants, ScenarioParameters},
    systems::{
        adjust, compute_flows, integrate, interpolate, maturation_times, progress, stress_factor,
        AdjustedParameters, DailyMetrics, Flows, MaturationTimes, MetricsAccumulator,
    },
};

pub const DEFAULT_HORIZON_DAYS: u64 = 3650;
pub const DEFAULT_START_YEAR: i32 = 2025;
pub const STEP_DAYS: f64 = 1.0;
pub const DAYS_PER_YEAR: u64 = 365;

/// Everything one run needs. Two configs that differ only in `end` give the
/// baseline and transition trajectories.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub name: String,
    pub start: ScenarioParameters,
    pub end: ScenarioParameters,
    pub carrying_capacity: f64,
    pub horizon_days: u64,
    pub start_year: i32,
    pub initial_herd: PopulationState,
    pub constants: GlobalConstants,
}

impl SimulationConfig {
    pub fn new(
        name: impl Into<String>,
        start: ScenarioParameters,
        end: ScenarioParameters,
        carrying_capacity: f64,
    ) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            carrying_capacity,
            horizon_days: DEFAULT_HORIZON_DAYS,
            start_year: DEFAULT_START_YEAR,
            initial_herd: PopulationState::historical(),
            constants: GlobalConstants::default(),
        }
    }

    pub fn with_initial_herd(mut self, herd: PopulationState) -> Self {
        self.initial_herd = herd;
        self
    }

    pub fn with_constants(mut self, constants: GlobalConstants) -> Self {
        self.constants = constants;
        self
    }

    pub fn with_horizon_days(mut self, days: u64) -> Self {
        self.horizon_days = days;
        self
    }

    pub fn with_start_year(mut self, year: i32) -> Self {
        self.start_year = year;
        self
    }

    pub fn step_days(&self) -> f64 {
        STEP_DAYS
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.carrying_capacity.is_finite() && self.carrying_capacity > 0.0) {
            return Err(ConfigurationError::NonPositiveCapacity(
                self.carrying_capacity,
            ));
        }
        if self.horizon_days == 0 {
            return Err(ConfigurationError::EmptyHorizon);
        }
        self.start.validate()?;
        self.end.validate()?;
        self.initial_herd.validate()?;
        self.constants.validate()?;
        Ok(())
    }

    /// Fractional calendar year of `day`.
    pub fn year_of(&self, day: u64) -> f64 {
        self.start_year as f64 + day as f64 / DAYS_PER_YEAR as f64
    }

    /// Calendar year bucket that `day` falls into.
    pub fn calendar_year_of(&self, day: u64) -> i32 {
        self.start_year + (day / DAYS_PER_YEAR) as i32
    }
}

/// One row of the output time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayRecord {
    pub day: u64,
    pub year: f64,
    pub calendar_year: i32,
    pub total_herd: f64,
    pub daily_meat: f64,
    pub daily_emissions: f64,
    pub emission_intensity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeSeries {
    pub start_year: i32,
    pub records: Vec<DayRecord>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn day(&self, day: u64) -> Option<&DayRecord> {
        self.records.get(day as usize)
    }

    pub fn last(&self) -> Option<&DayRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayRecord> {
        self.records.iter()
    }
}

/// Terminal herd composition and each compartment's emission share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalSummary {
    pub day: u64,
    pub stocks: BTreeMap<Compartment, f64>,
    pub emissions: BTreeMap<Compartment, f64>,
}

impl FinalSummary {
    pub fn capture(day: u64, herd: &PopulationState, factors: &EmissionFactors) -> Self {
        Self {
            day,
            stocks: herd.to_map(),
            emissions: herd
                .iter()
                .map(|(compartment, stock)| (compartment, stock * factors.get(compartment)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub name: String,
    pub series: TimeSeries,
    pub final_state: PopulationState,
    pub summary: FinalSummary,
    pub cumulative_meat: f64,
    pub cumulative_emissions: f64,
}

/// Full view of one computed day, handed to run hooks.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DayFrame {
    pub day: u64,
    pub year: f64,
    pub calendar_year: i32,
    pub parameters: ScenarioParameters,
    pub adjusted: AdjustedParameters,
    pub maturation: MaturationTimes,
    pub flows: Flows,
    pub herd: PopulationState,
    pub metrics: DailyMetrics,
}

impl DayFrame {
    pub fn record(&self) -> DayRecord {
        DayRecord {
            day: self.day,
            year: self.year,
            calendar_year: self.calendar_year,
            total_herd: self.herd.total(),
            daily_meat: self.metrics.meat,
            daily_emissions: self.metrics.emissions,
            emission_intensity: self.metrics.emission_intensity,
        }
    }
}

pub struct SimulationRunner {
    config: SimulationConfig,
}

impl SimulationRunner {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn run(&self) -> SimulationResult {
        self.run_with_hook(|_| {})
    }

    /// Runs the whole horizon, calling `hook` after every computed day.
    pub fn run_with_hook(&self, mut hook: impl FnMut(&DayFrame)) -> SimulationResult {
        let config = &self.config;
        info!(
            scenario = %config.name,
            days = config.horizon_days,
            carrying_capacity = config.carrying_capacity,
            "simulation started"
        );

        let mut herd = config.initial_herd;
        let mut metrics = MetricsAccumulator::new();
        let mut records = Vec::with_capacity(config.horizon_days as usize + 1);
        records.push(DayRecord {
            day: 0,
            year: config.year_of(0),
            calendar_year: config.calendar_year_of(0),
            total_herd: herd.total(),
            daily_meat: 0.0,
            daily_emissions: 0.0,
            emission_intensity: 0.0,
        });

        let mut stressed = false;
        for day in 1..=config.horizon_days {
            let frame = self.advance(day, &mut herd, &mut metrics);
            if !stressed && frame.adjusted.stress > 0.0 {
                stressed = true;
                debug!(
                    scenario = %config.name,
                    day,
                    population = frame.herd.total(),
                    "density stress engaged"
                );
            }
            if day % DAYS_PER_YEAR == 0 {
                debug!(
                    scenario = %config.name,
                    year = config.calendar_year_of(day) - 1,
                    herd = herd.total(),
                    stress = frame.adjusted.stress,
                    cumulative_meat = metrics.cumulative_meat(),
                    "simulated year complete"
                );
            }
            records.push(frame.record());
            hook(&frame);
        }

        let summary = FinalSummary::capture(
            config.horizon_days,
            &herd,
            &config.constants.emission_factors,
        );
        info!(
            scenario = %config.name,
            final_herd = herd.total(),
            cumulative_meat = metrics.cumulative_meat(),
            cumulative_emissions = metrics.cumulative_emissions(),
            "simulation finished"
        );

        SimulationResult {
            name: config.name.clone(),
            series: TimeSeries {
                start_year: config.start_year,
                records,
            },
            final_state: herd,
            summary,
            cumulative_meat: metrics.cumulative_meat(),
            cumulative_emissions: metrics.cumulative_emissions(),
        }
    }

    /// Computes day `day` from the stocks of the previous day.
    pub fn advance(
        &self,
        day: u64,
        herd: &mut PopulationState,
        metrics: &mut MetricsAccumulator,
    ) -> DayFrame {
        let config = &self.config;
        let constants = &config.constants;
        let parameters = interpolate(
            &config.start,
            &config.end,
            progress(day, config.horizon_days),
        );
        let stress = stress_factor(herd.total(), config.carrying_capacity);
        let adjusted = adjust(&parameters, stress);
        let maturation = maturation_times(&parameters, &adjusted.growth, constants);
        let flows = compute_flows(herd, &parameters, &adjusted, &maturation, constants);
        integrate(herd, &flows, config.step_days());
        let daily = metrics.record(
            herd,
            flows.meat.total(),
            &constants.emission_factors,
            config.step_days(),
        );
        DayFrame {
            day,
            year: config.year_of(day),
            calendar_year: config.calendar_year_of(day),
            parameters,
            adjusted,
            maturation,
            flows,
            herd: *herd,
            metrics: daily,
        }
    }
}

/// Runs two independent configurations, optionally on separate threads.
pub fn run_pair(
    baseline: SimulationConfig,
    transition: SimulationConfig,
    parallel: bool,
) -> Result<(SimulationResult, SimulationResult), ConfigurationError> {
    let baseline = SimulationRunner::new(baseline)?;
    let transition = SimulationRunner::new(transition)?;
    if !parallel {
        return Ok((baseline.run(), transition.run()));
    }
    let results = thread::scope(|scope| {
        let handle = scope.spawn(|| transition.run());
        let baseline_result = baseline.run();
        (baseline_result, handle.join())
    });
    match results {
        (baseline_result, Ok(transition_result)) => Ok((baseline_result, transition_result)),
        (_, Err(panic)) => std::panic::resume_unwind(panic),
    }
}
