//! Axum handlers: the Strava proxy, JSON aggregates and HTML views.

use axum::Json;
use axum::debug_handler;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;
use strava_client::Activity;

use crate::calendar::{self, MonthView};
use crate::error::{DashboardError, DashboardResult};
use crate::map::{self, MapView};
use crate::pages;
use crate::state::SharedState;
use crate::stats::{self, DashboardSummary};

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<String>,
}

async fn load_activities(state: &SharedState) -> DashboardResult<Vec<Activity>> {
    let raw = state.client.get_recent_activities().await?;
    let parsed = Activity::parse_all(&raw);
    tracing::debug!(fetched = raw.len(), parsed = parsed.len(), "loaded activities");
    Ok(parsed)
}

fn calendar_view(
    activities: &[Activity],
    month: Option<&str>,
    today: NaiveDate,
) -> DashboardResult<MonthView> {
    let buckets = calendar::bucket_by_date(activities);
    let (year, month) = match month {
        Some(raw) => calendar::parse_month(raw)
            .ok_or_else(|| DashboardError::InvalidInput(format!("invalid month {raw:?}, expected YYYY-MM")))?,
        None => calendar::default_month(&buckets, today),
    };
    calendar::month_view(year, month, &buckets)
        .ok_or_else(|| DashboardError::InvalidInput(format!("no calendar for {year}-{month:02}")))
}

/// Render an HTML page, or the static failure page when loading failed.
fn html_or_error(result: DashboardResult<String>) -> Response {
    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                tracing::warn!(error = %e, "page failed");
                (status, Html(pages::render_error(pages::LOAD_FAILED))).into_response()
            } else {
                (status, Html(pages::render_error(&e.to_string()))).into_response()
            }
        }
    }
}

#[debug_handler]
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[debug_handler]
pub async fn metrics_endpoint(State(state): State<SharedState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [("content-type", "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// Token refresh plus pass-through fetch: `{"activities": [...]}`.
#[debug_handler]
pub async fn api_strava(State(state): State<SharedState>) -> DashboardResult<Json<serde_json::Value>> {
    let activities = state.client.get_recent_activities().await?;
    metrics::counter!("dashboard_activities_served_total").increment(activities.len() as u64);
    Ok(Json(serde_json::json!({ "activities": activities })))
}

#[debug_handler]
pub async fn api_dashboard(State(state): State<SharedState>) -> DashboardResult<Json<DashboardSummary>> {
    let activities = load_activities(&state).await?;
    Ok(Json(stats::summarize(&activities)))
}

#[debug_handler]
pub async fn api_calendar(
    State(state): State<SharedState>,
    Query(q): Query<CalendarQuery>,
) -> DashboardResult<Json<MonthView>> {
    let activities = load_activities(&state).await?;
    let today = Local::now().date_naive();
    calendar_view(&activities, q.month.as_deref(), today).map(Json)
}

#[debug_handler]
pub async fn api_map(State(state): State<SharedState>) -> DashboardResult<Json<MapView>> {
    let activities = load_activities(&state).await?;
    Ok(Json(map::build_map(&activities)))
}

#[debug_handler]
pub async fn home() -> Html<String> {
    Html(pages::render_home(Local::now().year()))
}

#[debug_handler]
pub async fn dashboard_page(State(state): State<SharedState>) -> Response {
    let result = load_activities(&state)
        .await
        .map(|acts| pages::render_dashboard(&stats::summarize(&acts)));
    html_or_error(result)
}

#[debug_handler]
pub async fn calendar_page(
    State(state): State<SharedState>,
    Query(q): Query<CalendarQuery>,
) -> Response {
    let today = Local::now().date_naive();
    let result = match load_activities(&state).await {
        Ok(acts) => calendar_view(&acts, q.month.as_deref(), today).map(|v| pages::render_calendar(&v)),
        Err(e) => Err(e),
    };
    html_or_error(result)
}

#[debug_handler]
pub async fn map_page(State(state): State<SharedState>) -> Response {
    let result = match load_activities(&state).await {
        Ok(acts) => pages::render_map(&map::build_map(&acts)).map_err(DashboardError::from),
        Err(e) => Err(e),
    };
    html_or_error(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn acts() -> Vec<Activity> {
        serde_json::from_value(json!([
            {"id": 1, "type": "Run", "distance": 1609.0, "start_date_local": "2025-03-04T07:00:00Z"},
            {"id": 2, "type": "Ride", "distance": 1609.0, "start_date_local": "2025-01-10T07:00:00Z"}
        ]))
        .unwrap()
    }

    #[test]
    fn calendar_view_defaults_to_newest_month() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let view = calendar_view(&acts(), None, today).unwrap();
        assert_eq!((view.year, view.month), (2025, 3));
    }

    #[test]
    fn calendar_view_honours_requested_month() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let view = calendar_view(&acts(), Some("2025-01"), today).unwrap();
        assert_eq!(view.month, 1);
    }

    #[test]
    fn calendar_view_rejects_bad_month() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let err = calendar_view(&acts(), Some("2025-1x"), today).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
