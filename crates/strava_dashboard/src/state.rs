use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use strava_client::StravaClient;

pub struct AppState {
    pub client: Arc<dyn StravaClient>,
    /// Present when the binary installed a Prometheus recorder.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(client: Arc<dyn StravaClient>) -> Self {
        Self {
            client,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

pub type SharedState = Arc<AppState>;
