//! The per-day pipeline. Each step runs interpolation, stress, maturation,
//! flows, integration and metrics, in that order.

pub mod flows;
pub mod integration;
pub mod interpolation;
pub mod maturation;
pub mod metrics;
pub mod stress;

pub use flows::{compute_flows, Flows, MeatProduction};
pub use integration::integrate;
pub use interpolation::{interpolate, progress};
pub use maturation::{maturation_time, maturation_times, transition_flow, MaturationTimes};
pub use metrics::{daily_emissions, emission_intensity, DailyMetrics, MetricsAccumulator};
pub use stress::{adjust, stress_factor, AdjustedParameters, GrowthRates, MortalityRates};
