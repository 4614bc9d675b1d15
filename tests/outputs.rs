use std::fs;

use herdflow::{
    engine::{run_pair, SimulationRunner},
    export::{write_workbook, Sheet},
    report::ComparisonReport,
    scenario::{ScenarioFile, ScenarioLoader},
    snapshot::SnapshotWriter,
};
use tempfile::tempdir;

fn pampa() -> ScenarioFile {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
        .load("scenarios/pampa.yaml")
        .expect("scenario should load")
}

#[test]
fn workbook_holds_one_sheet_per_metric() {
    let scenario = pampa();
    let (baseline, transition) = run_pair(
        scenario.baseline_config().unwrap(),
        scenario.transition_config().unwrap(),
        false,
    )
    .unwrap();
    let report = ComparisonReport::build("pampa", baseline, transition, 2034).unwrap();
    let temp = tempdir().expect("tempdir");
    let written = write_workbook(temp.path(), &report).expect("export succeeds");
    assert_eq!(written.len(), Sheet::ALL.len() + 1);

    for sheet in Sheet::ALL {
        let text = fs::read_to_string(temp.path().join(format!("{}.csv", sheet.name()))).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "year,Extensive (baseline),Intensive");
        // header plus 2025..=2034
        assert_eq!(lines.len(), 11);
        assert!(lines[10].starts_with("2034,"));
    }

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(json["scenario"], "pampa");
    assert_eq!(json["kpis"]["evaluation_year"], 2034);
    assert!(json["generated_at"].is_string());
    assert!(json["transition"]["final_stocks"]["cows"].as_f64().unwrap() > 0.0);
}

#[test]
fn snapshots_follow_the_interval() {
    let scenario = pampa();
    let temp = tempdir().expect("tempdir");
    let writer = SnapshotWriter::new(temp.path(), 365);
    let runner = SimulationRunner::new(scenario.baseline_config().unwrap().with_horizon_days(800))
        .unwrap();
    let mut written = Vec::new();
    runner.run_with_hook(|frame| {
        if let Some(path) = writer.maybe_write(&runner.config().name, frame).unwrap() {
            written.push(path);
        }
    });
    assert_eq!(written.len(), 2);
    let first = temp.path().join("extensive_baseline").join("day_000365.json");
    assert_eq!(written[0], first);
    assert!(temp
        .path()
        .join("extensive_baseline")
        .join("day_000730.json")
        .exists());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(first).unwrap()).unwrap();
    assert_eq!(json["day"], 365);
    assert_eq!(json["scenario"], "Extensive (baseline)");
    assert!(json["stocks"]["bulls"].as_f64().unwrap() > 0.0);
}
