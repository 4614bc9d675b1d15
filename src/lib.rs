pub mod engine;
pub mod error;
pub mod export;
pub mod herd;
pub mod params;
pub mod report;
pub mod scenario;
pub mod snapshot;
pub mod systems;
pub mod web;

pub use engine::{SimulationConfig, SimulationResult, SimulationRunner};
pub use error::{ConfigurationError, ReportError};
pub use herd::{Compartment, PopulationState};
pub use params::{GlobalConstants, ScenarioParameters};
pub use report::ComparisonReport;
pub use scenario::{ScenarioFile, ScenarioLoader};
