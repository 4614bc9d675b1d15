use std::{
    collections::BTreeMap,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::{
    engine::FinalSummary,
    herd::Compartment,
    report::{AnnualRecord, AnnualSeries, ComparisonReport, KpiComparison},
};

/// One sheet per yearly metric, written as `<name>.csv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sheet {
    HerdTotal,
    AnnualMeatProduction,
    TotalEmissions,
    EmissionIntensity,
}

impl Sheet {
    pub const ALL: [Sheet; 4] = [
        Sheet::HerdTotal,
        Sheet::AnnualMeatProduction,
        Sheet::TotalEmissions,
        Sheet::EmissionIntensity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Sheet::HerdTotal => "herd_total",
            Sheet::AnnualMeatProduction => "annual_meat_production",
            Sheet::TotalEmissions => "total_emissions",
            Sheet::EmissionIntensity => "emission_intensity",
        }
    }

    fn value(self, record: &AnnualRecord) -> f64 {
        match self {
            Sheet::HerdTotal => record.herd_total,
            Sheet::AnnualMeatProduction => record.meat_production,
            Sheet::TotalEmissions => record.daily_emissions,
            Sheet::EmissionIntensity => record.emission_intensity,
        }
    }
}

/// Renders one sheet: a `year` column and one column per run.
pub fn render_sheet(
    sheet: Sheet,
    baseline_label: &str,
    baseline: &AnnualSeries,
    transition_label: &str,
    transition: &AnnualSeries,
) -> String {
    let mut rows: BTreeMap<i32, (Option<f64>, Option<f64>)> = BTreeMap::new();
    for record in &baseline.records {
        rows.entry(record.year).or_default().0 = Some(sheet.value(record));
    }
    for record in &transition.records {
        rows.entry(record.year).or_default().1 = Some(sheet.value(record));
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "year,{},{}",
        csv_field(baseline_label),
        csv_field(transition_label)
    );
    for (year, (base, trans)) in rows {
        let _ = writeln!(out, "{year},{},{}", cell(base), cell(trans));
    }
    out
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_field(text: &str) -> String {
    if text.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

#[derive(Serialize)]
struct RunSummary<'a> {
    name: &'a str,
    cumulative_meat: f64,
    cumulative_emissions: f64,
    final_stocks: &'a BTreeMap<Compartment, f64>,
    final_emissions: &'a BTreeMap<Compartment, f64>,
}

impl<'a> RunSummary<'a> {
    fn new(name: &'a str, summary: &'a FinalSummary, meat: f64, emissions: f64) -> Self {
        Self {
            name,
            cumulative_meat: meat,
            cumulative_emissions: emissions,
            final_stocks: &summary.stocks,
            final_emissions: &summary.emissions,
        }
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    generated_at: DateTime<Utc>,
    scenario: &'a str,
    kpis: &'a KpiComparison,
    baseline: RunSummary<'a>,
    transition: RunSummary<'a>,
}

/// Writes the four metric sheets and `report.json` into `dir`.
pub fn write_workbook(dir: impl AsRef<Path>, report: &ComparisonReport) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(Sheet::ALL.len() + 1);
    for sheet in Sheet::ALL {
        let path = dir.join(format!("{}.csv", sheet.name()));
        let contents = render_sheet(
            sheet,
            &report.baseline.name,
            &report.baseline_annual,
            &report.transition.name,
            &report.transition_annual,
        );
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write sheet {}", path.display()))?;
        info!(path = %path.display(), "sheet written");
        written.push(path);
    }

    let document = ReportDocument {
        generated_at: Utc::now(),
        scenario: &report.scenario,
        kpis: &report.kpis,
        baseline: RunSummary::new(
            &report.baseline.name,
            &report.baseline.summary,
            report.baseline.cumulative_meat,
            report.baseline.cumulative_emissions,
        ),
        transition: RunSummary::new(
            &report.transition.name,
            &report.transition.summary,
            report.transition.cumulative_meat,
            report.transition.cumulative_emissions,
        ),
    };
    let path = dir.join("report.json");
    let json = serde_json::to_string_pretty(&document)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "report written");
    written.push(path);

    Ok(written)
}
