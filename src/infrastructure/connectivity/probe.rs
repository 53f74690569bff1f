use crate::application::ports::{ConnectivitySink, ConnectivitySource};
use crate::shared::config::{ConnectivityConfig, RemoteConfig};
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Polls a health endpoint and reports reachability as connectivity.
pub struct HttpConnectivityProbe {
    client: Client,
    url: String,
    interval: Duration,
}

impl HttpConnectivityProbe {
    pub fn new(client: Client, url: impl Into<String>, interval: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            interval,
        }
    }

    /// Builds a probe from config. Falls back to the remote base URL when no probe URL is set.
    pub fn from_config(
        connectivity: &ConnectivityConfig,
        remote: &RemoteConfig,
    ) -> Result<Self, AppError> {
        let url = connectivity
            .probe_url
            .clone()
            .unwrap_or_else(|| format!("{}/rest/v1/", remote.base_url.trim_end_matches('/')));
        let client = Client::builder()
            .timeout(Duration::from_secs(remote.request_timeout.max(1)))
            .build()?;
        Ok(Self::new(
            client,
            url,
            Duration::from_secs(connectivity.probe_interval.max(1)),
        ))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One health request. Any non-success status counts as offline.
    pub async fn check(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::debug!(
                    target: "sync::connectivity",
                    url = %self.url,
                    status = %response.status(),
                    "health probe returned non-success status"
                );
                false
            }
            Err(err) => {
                tracing::debug!(
                    target: "sync::connectivity",
                    url = %self.url,
                    error = %err,
                    "health probe request failed"
                );
                false
            }
        }
    }
}

#[async_trait]
impl ConnectivitySource for HttpConnectivityProbe {
    async fn run(&self, sink: Arc<dyn ConnectivitySink>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sink.report(self.check().await);
        }
    }
}
