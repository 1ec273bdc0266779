use crate::StravaError;
use secrecy::SecretString;

pub const DEFAULT_AUTH_URL: &str = "https://www.strava.com/oauth/token";
pub const DEFAULT_API_BASE_URL: &str = "https://www.strava.com/api/v3";
/// Strava caps `per_page` at 200.
pub const MAX_PER_PAGE: u32 = 200;

/// The three values needed for the refresh-token exchange. Any of them may be
/// absent at startup; they are checked when a token is requested.
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        refresh_token: SecretString,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret),
            refresh_token: Some(refresh_token),
        }
    }

    /// Return all three values, or the names of every one that is unset.
    pub fn require(&self) -> Result<(&str, &SecretString, &SecretString), StravaError> {
        match (&self.client_id, &self.client_secret, &self.refresh_token) {
            (Some(id), Some(secret), Some(refresh)) => Ok((id.as_str(), secret, refresh)),
            _ => {
                let mut missing = Vec::new();
                if self.client_id.is_none() {
                    missing.push("STRAVA_CLIENT_ID");
                }
                if self.client_secret.is_none() {
                    missing.push("STRAVA_CLIENT_SECRET");
                }
                if self.refresh_token.is_none() {
                    missing.push("STRAVA_REFRESH_TOKEN");
                }
                Err(StravaError::MissingCredentials(missing))
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub credentials: Credentials,
    pub auth_url: String,
    pub api_base_url: String,
    pub per_page: u32,
}

impl Config {
    pub fn new(credentials: Credentials, auth_url: &str, api_base_url: &str) -> Self {
        Self {
            credentials,
            auth_url: auth_url.to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            per_page: MAX_PER_PAGE,
        }
    }

    pub fn from_env() -> Result<Self, StravaError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, StravaError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut non_blank = |k: &str| get(k).filter(|v| !v.trim().is_empty());

        let credentials = Credentials {
            client_id: non_blank("STRAVA_CLIENT_ID"),
            client_secret: non_blank("STRAVA_CLIENT_SECRET").map(|s| SecretString::new(s.into())),
            refresh_token: non_blank("STRAVA_REFRESH_TOKEN").map(|s| SecretString::new(s.into())),
        };
        let auth_url = non_blank("STRAVA_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.into());
        let api_base_url =
            non_blank("STRAVA_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.into());
        let per_page = match non_blank("STRAVA_PER_PAGE") {
            None => MAX_PER_PAGE,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if (1..=MAX_PER_PAGE).contains(&n) => n,
                _ => {
                    return Err(StravaError::Config(format!(
                        "STRAVA_PER_PAGE must be between 1 and {MAX_PER_PAGE}, got {raw:?}"
                    )));
                }
            },
        };

        let mut cfg = Self::new(credentials, &auth_url, &api_base_url);
        cfg.per_page = per_page;
        Ok(cfg)
    }
}
