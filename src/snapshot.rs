use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::{engine::DayFrame, herd::PopulationState};

#[derive(Debug, Serialize)]
pub struct HerdSnapshot<'a> {
    pub scenario: &'a str,
    pub day: u64,
    pub year: f64,
    pub total_herd: f64,
    pub stress: f64,
    pub stocks: &'a PopulationState,
    pub cumulative_meat: f64,
    pub cumulative_emissions: f64,
    pub emission_intensity: f64,
}

/// Writes a JSON checkpoint every `interval_days` simulated days.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval_days: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval_days: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval_days,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.interval_days > 0
    }

    pub fn maybe_write(&self, scenario: &str, frame: &DayFrame) -> Result<Option<PathBuf>> {
        if !self.is_enabled() || frame.day % self.interval_days != 0 {
            return Ok(None);
        }
        let dir = self.dir.join(slug(scenario));
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("day_{:06}.json", frame.day));
        let snapshot = HerdSnapshot {
            scenario,
            day: frame.day,
            year: frame.year,
            total_herd: frame.herd.total(),
            stress: frame.adjusted.stress,
            stocks: &frame.herd,
            cumulative_meat: frame.metrics.cumulative_meat,
            cumulative_emissions: frame.metrics.cumulative_emissions,
            emission_intensity: frame.metrics.emission_intensity,
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        debug!(path = %path.display(), "snapshot written");
        Ok(Some(path))
    }
}

/// Directory-safe form of a run label.
fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "run".to_string()
    } else {
        trimmed.to_string()
    }
}
