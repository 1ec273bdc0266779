//! Metric names and recording helpers for upstream Strava calls.

use std::time::Duration;

pub const REQUESTS_TOTAL: &str = "strava_api_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "strava_api_request_duration_seconds";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    OauthToken,
    AthleteActivities,
}

impl Endpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::OauthToken => "oauth_token",
            Endpoint::AthleteActivities => "athlete_activities",
        }
    }
}

pub fn record_request(endpoint: Endpoint, ok: bool, elapsed: Duration) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint.as_str(), "outcome" => outcome)
        .increment(1);
    metrics::histogram!(REQUEST_DURATION_SECONDS, "endpoint" => endpoint.as_str())
        .record(elapsed.as_secs_f64());
}
