//! MedLyf crew binary.
//!
//! Subscribes to the event channel and runs the agents until Ctrl-C.
//! Optionally serves the ingress API and runs the periodic severity scan.
//!
//! # Usage
//!
//! ```bash
//! # Redis transport (default)
//! BUS_URL=redis://localhost:6379 cargo run --bin medlyf-crew
//!
//! # Everything in-process, no Redis needed
//! BUS_URL=memory:// SEVERITY_CSV=data/outbreaks.csv cargo run --bin medlyf-crew
//! ```
//!
//! See [`medlyf_crew::config`] for every recognised variable. `RUST_LOG`
//! sets the log level (default: info).

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use medlyf_crew::bus::BusFactory;
use medlyf_crew::jobs::{HttpJobClient, JobClient};
use medlyf_crew::severity::{JsonLinesSink, LocalSink, RecordSink, SeverityScanner};
use medlyf_crew::{CrewConfig, EventRouter, ModelContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting MedLyf crew (forecasting, optimization, alerting, logistics)");

    let config = CrewConfig::load()?;
    let context = Arc::new(ModelContext::from_settings(&config.severity)?);
    info!(models = ?context.registry().keys(), "Model context ready");

    let bus = BusFactory::from_settings(&config.bus).await?;
    let jobs: Arc<dyn JobClient> = Arc::new(HttpJobClient::from_settings(&config.jobs)?);
    let sink: Arc<dyn RecordSink> = match &config.records.path {
        Some(path) => Arc::new(JsonLinesSink::new(path)),
        None => Arc::new(LocalSink::new()),
    };

    let scanner = config
        .severity
        .csv_path
        .as_ref()
        .map(|path| SeverityScanner::new(path, Arc::clone(&context), Arc::clone(&sink)));
    if let Some(scanner) = scanner.clone() {
        let interval = Duration::from_secs(config.severity.interval_secs);
        info!(?interval, "Severity scan scheduled");
        tokio::spawn(async move { scanner.run_every(interval).await });
    }

    #[cfg(feature = "http-server")]
    if config.http.enabled {
        use medlyf_crew::http::{create_router, AppState};

        let mut state = AppState::new(Arc::clone(&bus), Arc::clone(&sink));
        if let Some(scanner) = scanner {
            state = state.with_scanner(scanner);
        }
        let app = create_router(state);
        let addr: std::net::SocketAddr = config.http.addr.parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Ingress API listening on http://{}", addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "HTTP server stopped");
            }
        });
    }

    let router = EventRouter::new(context, config.alerts.threshold, Arc::clone(&bus), jobs);
    let stream = bus.subscribe().await?;
    info!(
        channel = %config.bus.channel,
        bus = %bus.describe(),
        threshold = config.alerts.threshold,
        "Crew subscriber listening"
    );

    tokio::select! {
        handled = router.run(stream) => {
            warn!(handled, "Event stream closed");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
