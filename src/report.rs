//! Yearly aggregation and baseline-vs-transition comparison of finished runs.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::{
    engine::{SimulationResult, TimeSeries, DAYS_PER_YEAR},
    error::ReportError,
    herd::Compartment,
};

/// One complete calendar year of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnualRecord {
    pub year: i32,
    /// Herd size on the last day of the year.
    pub herd_total: f64,
    /// Meat produced over the year, kg.
    pub meat_production: f64,
    /// Meat produced from day 0 to the end of the year, kg.
    pub cumulative_meat: f64,
    /// Emissions on the last day of the year, kg CO2-eq/day.
    pub daily_emissions: f64,
    pub emission_intensity: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnnualSeries {
    pub records: Vec<AnnualRecord>,
}

impl AnnualSeries {
    pub fn year(&self, year: i32) -> Option<&AnnualRecord> {
        self.records.iter().find(|record| record.year == year)
    }

    fn require(&self, year: i32) -> Result<&AnnualRecord, ReportError> {
        let (first, last) = match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => (first.year, last.year),
            _ => return Err(ReportError::NoCompleteYears),
        };
        self.year(year)
            .ok_or(ReportError::YearNotSimulated { year, first, last })
    }
}

/// Collapses a daily series into calendar years. Only years holding all 365
/// daily records are kept, which drops the trailing partial year.
pub fn annualize(series: &TimeSeries) -> AnnualSeries {
    let mut records = Vec::new();
    let mut cumulative_meat = 0.0;
    let mut days = series.iter().peekable();
    while let Some(first) = days.next() {
        let year = first.calendar_year;
        let mut count = 1;
        let mut meat = first.daily_meat;
        let mut last = first;
        while let Some(next) = days.next_if(|record| record.calendar_year == year) {
            count += 1;
            meat += next.daily_meat;
            last = next;
        }
        cumulative_meat += meat;
        if count == DAYS_PER_YEAR {
            records.push(AnnualRecord {
                year,
                herd_total: last.total_herd,
                meat_production: meat,
                cumulative_meat,
                daily_emissions: last.daily_emissions,
                emission_intensity: last.emission_intensity,
            });
        }
    }
    AnnualSeries { records }
}

/// Relative change of `new` against `old` in percent; 0 when `old` is 0.
pub fn percent_difference(new: f64, old: f64) -> f64 {
    if old != 0.0 {
        (new - old) / old * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiDelta {
    pub baseline: f64,
    pub transition: f64,
    pub percent_change: f64,
}

impl KpiDelta {
    pub fn new(baseline: f64, transition: f64) -> Self {
        Self {
            baseline,
            transition,
            percent_change: percent_difference(transition, baseline),
        }
    }
}

/// Headline indicators at the evaluation year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiComparison {
    pub evaluation_year: i32,
    pub herd_total: KpiDelta,
    pub annual_meat: KpiDelta,
    pub cumulative_meat: KpiDelta,
    pub daily_emissions: KpiDelta,
    pub emission_intensity: KpiDelta,
}

impl KpiComparison {
    pub fn between(
        baseline: &AnnualSeries,
        transition: &AnnualSeries,
        evaluation_year: i32,
    ) -> Result<Self, ReportError> {
        let base = baseline.require(evaluation_year)?;
        let trans = transition.require(evaluation_year)?;
        Ok(Self {
            evaluation_year,
            herd_total: KpiDelta::new(base.herd_total, trans.herd_total),
            annual_meat: KpiDelta::new(base.meat_production, trans.meat_production),
            cumulative_meat: KpiDelta::new(base.cumulative_meat, trans.cumulative_meat),
            daily_emissions: KpiDelta::new(base.daily_emissions, trans.daily_emissions),
            emission_intensity: KpiDelta::new(base.emission_intensity, trans.emission_intensity),
        })
    }
}

impl fmt::Display for KpiComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "--- Key indicators at the end of {} (transition vs. baseline) ---",
            self.evaluation_year
        )?;
        let rows = [
            ("Total herd", &self.herd_total),
            ("Annual meat production", &self.annual_meat),
            ("Cumulative meat production", &self.cumulative_meat),
            ("Total daily emissions", &self.daily_emissions),
            ("Emission intensity", &self.emission_intensity),
        ];
        for (label, delta) in rows {
            writeln!(f, "* {label}: {:+.2}%", delta.percent_change)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contribution {
    pub compartment: Compartment,
    pub value: f64,
    pub share_percent: f64,
}

/// Each compartment's share of the total; empty when the total is zero.
pub fn contributions(values: &BTreeMap<Compartment, f64>) -> Vec<Contribution> {
    let total: f64 = values.values().sum();
    if total == 0.0 {
        return Vec::new();
    }
    values
        .iter()
        .map(|(&compartment, &value)| Contribution {
            compartment,
            value,
            share_percent: value / total * 100.0,
        })
        .collect()
}

pub struct ContributionTable<'a> {
    pub title: &'a str,
    pub rows: Vec<Contribution>,
}

impl<'a> ContributionTable<'a> {
    pub fn new(title: &'a str, values: &BTreeMap<Compartment, f64>) -> Self {
        Self {
            title,
            rows: contributions(values),
        }
    }
}

impl fmt::Display for ContributionTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} ---", self.title)?;
        if self.rows.is_empty() {
            return writeln!(f, "No data to show.");
        }
        writeln!(f, "{:<14} | Contribution (%)", "Category")?;
        writeln!(f, "{}", "-".repeat(34))?;
        for row in &self.rows {
            writeln!(f, "{:<14} | {:.2}%", row.compartment.name(), row.share_percent)?;
        }
        Ok(())
    }
}

/// Both runs of a scenario file together with their derived figures.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub scenario: String,
    pub baseline: SimulationResult,
    pub transition: SimulationResult,
    pub baseline_annual: AnnualSeries,
    pub transition_annual: AnnualSeries,
    pub kpis: KpiComparison,
}

impl ComparisonReport {
    pub fn build(
        scenario: impl Into<String>,
        baseline: SimulationResult,
        transition: SimulationResult,
        evaluation_year: i32,
    ) -> Result<Self, ReportError> {
        let baseline_annual = annualize(&baseline.series);
        let transition_annual = annualize(&transition.series);
        let kpis = KpiComparison::between(&baseline_annual, &transition_annual, evaluation_year)?;
        Ok(Self {
            scenario: scenario.into(),
            baseline,
            transition,
            baseline_annual,
            transition_annual,
            kpis,
        })
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kpis)?;
        for run in [&self.baseline, &self.transition] {
            writeln!(f, "Scenario: {}", run.name)?;
            writeln!(
                f,
                "{}",
                ContributionTable::new("Herd composition", &run.summary.stocks)
            )?;
            writeln!(
                f,
                "{}",
                ContributionTable::new("Emission contribution", &run.summary.emissions)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DayRecord;

    fn series(days: u64, meat_per_day: f64) -> TimeSeries {
        let records = (0..=days)
            .map(|day| DayRecord {
                day,
                year: 2025.0 + day as f64 / 365.0,
                calendar_year: 2025 + (day / 365) as i32,
                total_herd: 1_000.0 + day as f64,
                daily_meat: if day == 0 { 0.0 } else { meat_per_day },
                daily_emissions: 10.0 * day as f64,
                emission_intensity: if day == 0 { 0.0 } else { 2.0 },
            })
            .collect();
        TimeSeries {
            start_year: 2025,
            records,
        }
    }

    #[test]
    fn trailing_partial_year_is_dropped() {
        let annual = annualize(&series(730, 1.0));
        assert_eq!(annual.records.len(), 2);
        assert_eq!(annual.records[0].year, 2025);
        assert_eq!(annual.records[1].year, 2026);
        assert!(annual.year(2027).is_none());
    }

    #[test]
    fn years_sum_meat_and_keep_last_day_levels() {
        let annual = annualize(&series(730, 2.0));
        let first = annual.year(2025).unwrap();
        // day 0 carries no production
        assert_eq!(first.meat_production, 364.0 * 2.0);
        assert_eq!(first.herd_total, 1_364.0);
        assert_eq!(first.daily_emissions, 3_640.0);
        let second = annual.year(2026).unwrap();
        assert_eq!(second.meat_production, 730.0);
        assert_eq!(second.cumulative_meat, 728.0 + 730.0);
        assert_eq!(second.herd_total, 1_729.0);
    }

    #[test]
    fn percent_difference_guards_zero_baseline() {
        assert_eq!(percent_difference(150.0, 100.0), 50.0);
        assert_eq!(percent_difference(50.0, 100.0), -50.0);
        assert_eq!(percent_difference(10.0, 0.0), 0.0);
    }

    #[test]
    fn comparison_outside_simulated_years_fails() {
        let annual = annualize(&series(730, 1.0));
        assert_eq!(
            KpiComparison::between(&annual, &annual, 2030),
            Err(ReportError::YearNotSimulated {
                year: 2030,
                first: 2025,
                last: 2026
            })
        );
        let empty = AnnualSeries::default();
        assert_eq!(
            KpiComparison::between(&empty, &empty, 2025),
            Err(ReportError::NoCompleteYears)
        );
    }

    #[test]
    fn kpis_compare_the_evaluation_year() {
        let base = annualize(&series(730, 1.0));
        let trans = annualize(&series(730, 1.5));
        let kpis = KpiComparison::between(&base, &trans, 2026).unwrap();
        assert_eq!(kpis.annual_meat.percent_change, 50.0);
        assert_eq!(kpis.herd_total.percent_change, 0.0);
        let text = kpis.to_string();
        assert!(text.contains("2026"));
        assert!(text.contains("* Annual meat production: +50.00%"));
    }

    #[test]
    fn contributions_share_the_total() {
        let values: BTreeMap<_, _> = [(Compartment::Cows, 3.0), (Compartment::Bulls, 1.0)]
            .into_iter()
            .collect();
        let rows = contributions(&values);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].compartment, Compartment::Cows);
        assert_eq!(rows[0].share_percent, 75.0);
        assert_eq!(rows[1].share_percent, 25.0);
    }

    #[test]
    fn empty_contribution_table_says_so() {
        let values: BTreeMap<_, _> = Compartment::ALL.into_iter().map(|c| (c, 0.0)).collect();
        let table = ContributionTable::new("Herd composition", &values);
        assert!(table.rows.is_empty());
        assert!(table.to_string().contains("No data to show."));
    }
}
