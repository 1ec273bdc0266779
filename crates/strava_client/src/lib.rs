//! `StravaClient` trait, activity model and the reqwest-based implementation.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod observability;

#[derive(Debug, Error)]
pub enum StravaError {
    #[error("missing Strava API credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
    #[error("error during auth fetch: {0}")]
    AuthFetch(#[source] reqwest::Error),
    #[error("failed to get access token: {0}")]
    MissingAccessToken(String),
    #[error("error during activities fetch: {0}")]
    ActivitiesFetch(#[source] reqwest::Error),
    #[error("activities response is not an array: {0}")]
    UnexpectedShape(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl StravaError {
    /// Short, stable description of the step that failed.
    pub fn step(&self) -> &'static str {
        match self {
            StravaError::MissingCredentials(_) => "Missing Strava API credentials.",
            StravaError::AuthFetch(_) => "Error during auth fetch",
            StravaError::MissingAccessToken(_) => "Failed to get access token.",
            StravaError::ActivitiesFetch(_) => "Error during activities fetch",
            StravaError::UnexpectedShape(_) => "Activities response is not an array",
            StravaError::Config(_) => "Invalid Strava configuration.",
        }
    }

    /// Extra context for the failed step. Never contains credential values.
    pub fn details(&self) -> String {
        match self {
            StravaError::MissingCredentials(names) => format!("unset: {}", names.join(", ")),
            StravaError::AuthFetch(e) | StravaError::ActivitiesFetch(e) => e.to_string(),
            StravaError::MissingAccessToken(body)
            | StravaError::UnexpectedShape(body)
            | StravaError::Config(body) => body.clone(),
        }
    }
}

/// Short-lived bearer token obtained from the refresh exchange.
#[derive(Clone, Debug)]
pub struct AccessToken {
    pub token: SecretString,
    /// Epoch seconds, when Strava reports it.
    pub expires_at: Option<i64>,
}

impl AccessToken {
    pub fn new(token: SecretString, expires_at: Option<i64>) -> Self {
        Self { token, expires_at }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ActivityMap {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub summary_polyline: Option<String>,
}

/// One workout as returned by `GET /athlete/activities`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub sport_type: Option<String>,
    /// Metres.
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub moving_time: Option<u64>,
    #[serde(default)]
    pub elapsed_time: Option<u64>,
    #[serde(default)]
    pub total_elevation_gain: Option<f64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub start_date_local: Option<String>,
    #[serde(default)]
    pub map: Option<ActivityMap>,
}

impl Activity {
    /// The encoded route, if Strava sent a non-empty one.
    pub fn summary_polyline(&self) -> Option<&str> {
        self.map
            .as_ref()
            .and_then(|m| m.summary_polyline.as_deref())
            .filter(|p| !p.is_empty())
    }

    /// Parse raw activity JSON, dropping entries that do not look like activities.
    pub fn parse_all(values: &[serde_json::Value]) -> Vec<Activity> {
        values
            .iter()
            .filter_map(|v| match Activity::deserialize(v) {
                Ok(a) => Some(a),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unparseable activity");
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
pub trait StravaClient: Send + Sync + 'static {
    /// Exchange the stored refresh token for a fresh access token.
    async fn refresh_access_token(&self) -> Result<AccessToken, StravaError>;

    /// Fetch one page of the athlete's activities as raw JSON.
    async fn list_activities(
        &self,
        access_token: &AccessToken,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<serde_json::Value>, StravaError>;

    /// Refresh and fetch the first page of recent activities in one shot.
    async fn get_recent_activities(&self) -> Result<Vec<serde_json::Value>, StravaError>;
}
