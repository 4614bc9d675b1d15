use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use herdflow::{
    engine::{run_pair, SimulationConfig, SimulationResult, SimulationRunner},
    export::write_workbook,
    report::ComparisonReport,
    scenario::ScenarioLoader,
    snapshot::SnapshotWriter,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Herd stock-and-flow transition runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/pampa.yaml")]
    scenario: PathBuf,

    /// Directory for the exported sheets and report.json
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Calendar year the indicators are compared at (uses scenario default when omitted)
    #[arg(long)]
    evaluation_year: Option<i32>,

    /// Write a herd snapshot every N days (0 disables)
    #[arg(long, default_value_t = 0)]
    snapshot_interval: u64,

    /// Directory for snapshots
    #[arg(long, default_value = "snapshots")]
    snapshot_dir: PathBuf,

    /// Run baseline and transition on separate threads
    #[arg(long)]
    parallel: bool,

    /// Serve the live dashboard instead of printing a report
    #[arg(long)]
    serve: bool,

    /// Dashboard bind host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Dashboard port
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Days between dashboard frames
    #[arg(long, default_value_t = 30)]
    frame_interval: u64,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn run_with_snapshots(
    config: SimulationConfig,
    writer: &SnapshotWriter,
) -> Result<SimulationResult> {
    let runner = SimulationRunner::new(config)?;
    let name = runner.config().name.clone();
    let mut failure = None;
    let result = runner.run_with_hook(|frame| {
        if failure.is_some() {
            return;
        }
        if let Err(err) = writer.maybe_write(&name, frame) {
            failure = Some(err);
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(result),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let evaluation_year = cli.evaluation_year.unwrap_or(scenario.evaluation_year);
    info!(
        scenario = %scenario.name,
        horizon_days = scenario.horizon_days,
        evaluation_year,
        "scenario loaded"
    );

    if cli.serve {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        return runtime.block_on(web::run(WebServerConfig {
            scenario,
            evaluation_year,
            frame_interval_days: cli.frame_interval,
            host: cli.host,
            port: cli.port,
        }));
    }

    let writer = SnapshotWriter::new(&cli.snapshot_dir, cli.snapshot_interval);
    let (baseline, transition) = if writer.is_enabled() {
        (
            run_with_snapshots(scenario.baseline_config()?, &writer)?,
            run_with_snapshots(scenario.transition_config()?, &writer)?,
        )
    } else {
        run_pair(
            scenario.baseline_config()?,
            scenario.transition_config()?,
            cli.parallel,
        )?
    };

    let report =
        ComparisonReport::build(scenario.name.clone(), baseline, transition, evaluation_year)?;
    println!("{report}");

    if let Some(dir) = &cli.output_dir {
        let written = write_workbook(dir, &report)?;
        println!("Exported {} files to {}", written.len(), dir.display());
    }
    Ok(())
}
