use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;
use strava_client::StravaClient;
use strava_client::config::Config;
use strava_client::http_client::ReqwestStravaClient;
use strava_dashboard::{AppState, DEFAULT_REQUEST_TIMEOUT, build_router};
use tokio::signal;
use tracing::info;

fn request_timeout_from(raw: Option<String>) -> Duration {
    raw.and_then(|s| s.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
}

fn address_from(raw: Option<String>) -> SocketAddr {
    raw.and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)))
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("failed to install ctrl+c handler: {e}");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Configure logging from env var `STRAVA_DASHBOARD_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("STRAVA_DASHBOARD_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(log_env.clone())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!(%log_env, "strava_dashboard: log filter");

    let handle = PrometheusBuilder::new().install_recorder()?;

    let cfg = Config::from_env()?;
    if let Err(e) = cfg.credentials.require() {
        tracing::warn!(details = %e.details(), "Strava credentials incomplete; /api/strava will return 500");
    }
    info!(auth_url = %cfg.auth_url, api = %cfg.api_base_url, per_page = cfg.per_page, "strava client configured");

    let client: Arc<dyn StravaClient> = Arc::new(ReqwestStravaClient::new(cfg)?);
    let state = AppState::new(client).with_metrics(handle);

    let request_timeout = request_timeout_from(std::env::var("REQUEST_TIMEOUT_SECS").ok());
    let app = build_router(state, request_timeout);

    let addr = address_from(std::env::var("ADDRESS").ok());
    info!(%addr, timeout_secs = request_timeout.as_secs(), "starting HTTP server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
