//! Personal Strava stats dashboard: a token-refresh proxy in front of the
//! Strava API plus server-rendered dashboard, calendar and map views.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod calendar;
pub mod error;
pub mod handlers;
pub mod map;
pub mod pages;
pub mod state;
pub mod stats;

pub use state::{AppState, SharedState};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the full router over `state`. Slow requests are answered with 408.
#[allow(deprecated)]
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/", get(handlers::home))
        .route("/dashboard", get(handlers::dashboard_page))
        .route("/calendar", get(handlers::calendar_page))
        .route("/activitymap", get(handlers::map_page))
        // API
        .route("/api/strava", get(handlers::api_strava))
        .route("/api/dashboard", get(handlers::api_dashboard))
        .route("/api/calendar", get(handlers::api_calendar))
        .route("/api/map", get(handlers::api_map))
        // Ops
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics_endpoint))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
