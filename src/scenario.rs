use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    engine::{SimulationConfig, DEFAULT_HORIZON_DAYS, DEFAULT_START_YEAR},
    error::ConfigurationError,
    herd::PopulationState,
    params::{GlobalConstants, ScenarioParameters},
};

fn default_start_year() -> i32 {
    DEFAULT_START_YEAR
}

fn default_horizon_days() -> u64 {
    DEFAULT_HORIZON_DAYS
}

fn default_evaluation_year() -> i32 {
    2034
}

fn default_initial_herd() -> PopulationState {
    PopulationState::historical()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_start_year")]
    pub start_year: i32,
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u64,
    pub carrying_capacity: f64,
    #[serde(default = "default_evaluation_year")]
    pub evaluation_year: i32,
    #[serde(default = "default_initial_herd")]
    pub initial_herd: PopulationState,
    #[serde(default)]
    pub constants: GlobalConstants,
    /// Regime name to raw parameter map; typed on demand.
    pub regimes: BTreeMap<String, BTreeMap<String, f64>>,
    pub baseline: RunDefinition,
    pub transition: RunDefinition,
}

/// Which regimes a run starts and ends in.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunDefinition {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl RunDefinition {
    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| {
            if self.start == self.end {
                self.start.clone()
            } else {
                format!("{} -> {}", self.start, self.end)
            }
        })
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<ScenarioFile> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario = ScenarioFile::from_yaml(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl ScenarioFile {
    /// Parses and checks that both runs can be built.
    pub fn from_yaml(data: &str) -> Result<Self> {
        let scenario: ScenarioFile = serde_yaml::from_str(data)?;
        scenario.baseline_config()?;
        scenario.transition_config()?;
        Ok(scenario)
    }

    pub fn regime(&self, name: &str) -> Result<ScenarioParameters, ConfigurationError> {
        let raw = self
            .regimes
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownRegime(name.to_string()))?;
        ScenarioParameters::from_map(raw)
    }

    pub fn baseline_config(&self) -> Result<SimulationConfig, ConfigurationError> {
        self.run_config(&self.baseline)
    }

    pub fn transition_config(&self) -> Result<SimulationConfig, ConfigurationError> {
        self.run_config(&self.transition)
    }

    fn run_config(&self, run: &RunDefinition) -> Result<SimulationConfig, ConfigurationError> {
        let config = SimulationConfig::new(
            run.label(),
            self.regime(&run.start)?,
            self.regime(&run.end)?,
            self.carrying_capacity,
        )
        .with_horizon_days(self.horizon_days)
        .with_start_year(self.start_year)
        .with_initial_herd(self.initial_herd)
        .with_constants(self.constants);
        config.validate()?;
        Ok(config)
    }
}
