mod assets;

use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse,
    },
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{error, info};

use crate::{
    engine::{DayFrame, SimulationRunner},
    report::{AnnualSeries, ComparisonReport, KpiComparison},
    scenario::ScenarioFile,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunRole {
    Baseline,
    Transition,
}

/// Sampled point of a running simulation, as plotted by the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct UiFrame {
    pub role: RunRole,
    pub day: u64,
    pub year: f64,
    pub total_herd: f64,
    pub daily_meat: f64,
    pub daily_emissions: f64,
    pub emission_intensity: f64,
    pub stress: f64,
}

impl UiFrame {
    fn from_day(role: RunRole, frame: &DayFrame) -> Self {
        Self {
            role,
            day: frame.day,
            year: frame.year,
            total_herd: frame.herd.total(),
            daily_meat: frame.metrics.meat,
            daily_emissions: frame.metrics.emissions,
            emission_intensity: frame.metrics.emission_intensity,
            stress: frame.adjusted.stress,
        }
    }
}

/// Figures available once both runs have finished.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub baseline_label: String,
    pub transition_label: String,
    pub baseline_annual: AnnualSeries,
    pub transition_annual: AnnualSeries,
    pub kpis: KpiComparison,
}

impl From<&ComparisonReport> for DashboardSummary {
    fn from(report: &ComparisonReport) -> Self {
        Self {
            baseline_label: report.baseline.name.clone(),
            transition_label: report.transition.name.clone(),
            baseline_annual: report.baseline_annual.clone(),
            transition_annual: report.transition_annual.clone(),
            kpis: report.kpis.clone(),
        }
    }
}

#[derive(Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    Frame(UiFrame),
    Complete(DashboardSummary),
}

#[derive(Clone, Serialize)]
pub struct StateEnvelope {
    pub scenario: String,
    pub horizon_days: u64,
    pub latest: Vec<UiFrame>,
    pub summary: Option<DashboardSummary>,
    pub completed: bool,
}

#[derive(Clone)]
struct AppState {
    broadcaster: broadcast::Sender<String>,
    frames: Arc<Mutex<Vec<UiFrame>>>,
    summary: Arc<Mutex<Option<DashboardSummary>>>,
    horizon_days: u64,
    scenario_name: String,
    simulation_done: Arc<AtomicBool>,
}

pub struct WebServerConfig {
    pub scenario: ScenarioFile,
    pub evaluation_year: i32,
    pub frame_interval_days: u64,
    pub host: String,
    pub port: u16,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        evaluation_year,
        frame_interval_days,
        host,
        port,
    } = config;

    let baseline = SimulationRunner::new(scenario.baseline_config()?)?;
    let transition = SimulationRunner::new(scenario.transition_config()?)?;
    let interval = frame_interval_days.max(1);

    let (tx, _) = broadcast::channel::<String>(512);
    let frames: Arc<Mutex<Vec<UiFrame>>> = Arc::new(Mutex::new(Vec::new()));
    let summary: Arc<Mutex<Option<DashboardSummary>>> = Arc::new(Mutex::new(None));
    let simulation_done = Arc::new(AtomicBool::new(false));

    let frames_for_sim = frames.clone();
    let summary_for_sim = summary.clone();
    let done_for_sim = simulation_done.clone();
    let tx_for_sim = tx.clone();
    let scenario_label = scenario.name.clone();

    let sim_handle = tokio::task::spawn_blocking(move || -> Result<()> {
        let publish = |event: StreamEvent| {
            if let Ok(payload) = serde_json::to_string(&event) {
                let _ = tx_for_sim.send(payload);
            }
        };
        let mut results = Vec::with_capacity(2);
        for (role, runner) in [(RunRole::Baseline, &baseline), (RunRole::Transition, &transition)] {
            let result = runner.run_with_hook(|day| {
                if day.day % interval != 0 {
                    return;
                }
                let frame = UiFrame::from_day(role, day);
                frames_for_sim
                    .lock()
                    .expect("frames lock poisoned")
                    .push(frame.clone());
                publish(StreamEvent::Frame(frame));
            });
            results.push(result);
        }

        let transition_result = results.pop().context("transition run missing")?;
        let baseline_result = results.pop().context("baseline run missing")?;
        let report = ComparisonReport::build(
            scenario_label,
            baseline_result,
            transition_result,
            evaluation_year,
        )?;
        let dashboard = DashboardSummary::from(&report);
        *summary_for_sim.lock().expect("summary lock poisoned") = Some(dashboard.clone());
        done_for_sim.store(true, Ordering::SeqCst);
        publish(StreamEvent::Complete(dashboard));
        Ok(())
    });

    let state = Arc::new(AppState {
        broadcaster: tx.clone(),
        frames: frames.clone(),
        summary: summary.clone(),
        horizon_days: scenario.horizon_days,
        scenario_name: scenario.name.clone(),
        simulation_done: simulation_done.clone(),
    });

    let finished_label = scenario.name.clone();
    tokio::spawn(async move {
        match sim_handle.await {
            Ok(Ok(())) => info!(scenario = %finished_label, "simulations completed"),
            Ok(Err(err)) => error!("simulation error: {err:?}"),
            Err(err) => error!("simulation task failed: {err:?}"),
        }
    });

    let router = Router::new()
        .route("/", get(index))
        .route("/styles.css", get(styles))
        .route("/app.js", get(script))
        .route("/api/state", get(latest_state))
        .route("/api/frames", get(all_frames))
        .route("/api/events", get(stream_events))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;

    info!("herd dashboard live at http://{}:{} (Ctrl+C to stop)", host, port);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down dashboard");
}

async fn index() -> Html<&'static str> {
    Html(assets::INDEX_HTML)
}

async fn styles() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        assets::STYLES_CSS,
    )
}

async fn script() -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        assets::APP_JS,
    )
}

fn latest_per_run(frames: &[UiFrame]) -> Vec<UiFrame> {
    [RunRole::Baseline, RunRole::Transition]
        .into_iter()
        .filter_map(|role| frames.iter().rev().find(|f| f.role == role).cloned())
        .collect()
}

async fn latest_state(State(state): State<Arc<AppState>>) -> Json<StateEnvelope> {
    let latest = latest_per_run(&state.frames.lock().expect("frames lock poisoned"));
    let summary = state.summary.lock().expect("summary lock poisoned").clone();
    Json(StateEnvelope {
        scenario: state.scenario_name.clone(),
        horizon_days: state.horizon_days,
        latest,
        summary,
        completed: state.simulation_done.load(Ordering::SeqCst),
    })
}

#[derive(Serialize)]
struct FramesResponse {
    scenario: String,
    horizon_days: u64,
    completed: bool,
    frames: Vec<UiFrame>,
}

async fn all_frames(State(state): State<Arc<AppState>>) -> Json<FramesResponse> {
    let frames = state.frames.lock().expect("frames lock poisoned").clone();
    Json(FramesResponse {
        scenario: state.scenario_name.clone(),
        horizon_days: state.horizon_days,
        completed: state.simulation_done.load(Ordering::SeqCst),
        frames,
    })
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
