//! HTTP client implementation for the Strava API.
//!
//! This module provides a reqwest-based implementation of the [`StravaClient`](crate::StravaClient) trait.

use crate::config::Config;
use crate::observability::{Endpoint, record_request};
use crate::{AccessToken, StravaClient, StravaError};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

const USER_AGENT: &str = concat!("strava_client/", env!("CARGO_PKG_VERSION"));
const BODY_SNIPPET_CHARS: usize = 256;

/// Client for the Strava API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestStravaClient {
    config: Config,
    client: reqwest::Client,
}

impl ReqwestStravaClient {
    /// Create a new client instance.
    ///
    /// Credentials are not validated here; a missing value surfaces as
    /// [`StravaError::MissingCredentials`] when a token is requested.
    pub fn new(config: Config) -> Result<Self, StravaError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| StravaError::Config(e.to_string()))?;
        Ok(Self { config, client })
    }

    async fn exchange_refresh_token(&self, payload: &Value) -> Result<AccessToken, StravaError> {
        let resp = self
            .client
            .post(&self.config.auth_url)
            .json(payload)
            .send()
            .await
            .map_err(StravaError::AuthFetch)?;
        let status = resp.status();
        let body: Value = resp.json().await.map_err(StravaError::AuthFetch)?;
        debug!(status = status.as_u16(), "strava token exchange responded");

        let Some(token) = body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
        else {
            return Err(StravaError::MissingAccessToken(snippet(&body)));
        };
        let expires_at = body.get("expires_at").and_then(Value::as_i64);
        Ok(AccessToken::new(SecretString::new(token.into()), expires_at))
    }

    async fn fetch_activities_page(
        &self,
        access_token: &AccessToken,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, StravaError> {
        let url = format!("{}/athlete/activities", self.config.api_base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("per_page", per_page), ("page", page)])
            .bearer_auth(access_token.token.expose_secret())
            .send()
            .await
            .map_err(StravaError::ActivitiesFetch)?;
        let status = resp.status();
        let body: Value = resp.json().await.map_err(StravaError::ActivitiesFetch)?;
        debug!(status = status.as_u16(), page, per_page, "strava activities responded");

        match body {
            Value::Array(items) => Ok(items),
            other => Err(StravaError::UnexpectedShape(format!(
                "status {}: {}",
                status.as_u16(),
                snippet(&other)
            ))),
        }
    }
}

fn snippet(body: &Value) -> String {
    body.to_string().chars().take(BODY_SNIPPET_CHARS).collect()
}

#[async_trait]
impl StravaClient for ReqwestStravaClient {
    async fn refresh_access_token(&self) -> Result<AccessToken, StravaError> {
        let (client_id, client_secret, refresh_token) = self.config.credentials.require()?;
        let payload = serde_json::json!({
            "client_id": client_id,
            "client_secret": client_secret.expose_secret(),
            "refresh_token": refresh_token.expose_secret(),
            "grant_type": "refresh_token",
            "f": "json",
        });

        let started = Instant::now();
        let result = self.exchange_refresh_token(&payload).await;
        record_request(Endpoint::OauthToken, result.is_ok(), started.elapsed());
        result
    }

    async fn list_activities(
        &self,
        access_token: &AccessToken,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, StravaError> {
        let started = Instant::now();
        let result = self
            .fetch_activities_page(access_token, page, per_page)
            .await;
        record_request(
            Endpoint::AthleteActivities,
            result.is_ok(),
            started.elapsed(),
        );
        result
    }

    async fn get_recent_activities(&self) -> Result<Vec<Value>, StravaError> {
        let token = self.refresh_access_token().await?;
        self.list_activities(&token, 1, self.config.per_page).await
    }
}
