use crate::application::ports::{GatewayRegistry, RemoteError, RemoteGateway};
use crate::domain::value_objects::{EntityKind, RecordPayload};
use crate::shared::config::RemoteConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const MAX_ERROR_BODY: usize = 256;

/// Remote gateway for a PostgREST-style backend (`/rest/v1/<table>`).
pub struct PostgrestGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    kind: EntityKind,
}

impl PostgrestGateway {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        kind: EntityKind,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            kind,
        }
    }

    pub fn build_client(config: &RemoteConfig) -> Result<reqwest::Client, AppError> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout.max(1)))
            .build()?)
    }

    /// One adapter per entity kind sharing a single HTTP client.
    pub fn registry(config: &RemoteConfig) -> Result<GatewayRegistry, AppError> {
        let client = Self::build_client(config)?;
        Ok(EntityKind::ALL
            .into_iter()
            .fold(GatewayRegistry::new(), |registry, kind| {
                let gateway = Self::new(
                    client.clone(),
                    config.base_url.clone(),
                    config.api_key.clone(),
                    kind,
                );
                registry.with(kind, Arc::new(gateway))
            }))
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.kind.table_name())
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.table_url())
            .header("Prefer", "return=representation");
        match &self.api_key {
            Some(key) => builder.header("apikey", key).bearer_auth(key),
            None => builder,
        }
    }

    fn body_for(&self, payload: &RecordPayload) -> Result<Value, RemoteError> {
        if payload.kind() != self.kind {
            return Err(RemoteError::Rejected(format!(
                "{} payload sent to the {} gateway",
                payload.kind(),
                self.kind
            )));
        }
        payload
            .to_json()
            .map_err(|err| RemoteError::Rejected(format!("payload serialization failed: {err}")))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Vec<Value>, RemoteError> {
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body));
        }

        let body: Value = response.json().await.map_err(|err| {
            RemoteError::Rejected(format!("unreadable response from {}: {err}", self.kind))
        })?;
        Ok(match body {
            Value::Array(rows) => rows,
            Value::Null => Vec::new(),
            row => vec![row],
        })
    }
}

#[async_trait]
impl RemoteGateway for PostgrestGateway {
    async fn create(&self, payload: &RecordPayload) -> Result<String, RemoteError> {
        let body = self.body_for(payload)?;
        let rows = self.send(self.request(Method::POST).json(&body)).await?;

        rows.first()
            .and_then(row_id)
            .ok_or_else(|| {
                RemoteError::Rejected(format!(
                    "{} insert returned no identifier",
                    self.kind.table_name()
                ))
            })
    }

    async fn update(&self, server_id: &str, payload: &RecordPayload) -> Result<(), RemoteError> {
        if self.kind.is_append_only() {
            return Err(RemoteError::Rejected(format!(
                "{} are append-only",
                self.kind.table_name()
            )));
        }

        let body = self.body_for(payload)?;
        let filter = format!("eq.{server_id}");
        let rows = self
            .send(
                self.request(Method::PATCH)
                    .query(&[("id", filter.as_str())])
                    .json(&body),
            )
            .await?;

        if rows.is_empty() {
            return Err(RemoteError::Rejected(format!(
                "no {} row with id {server_id}",
                self.kind.table_name()
            )));
        }
        Ok(())
    }
}

fn row_id(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn map_transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_builder() {
        RemoteError::Rejected(err.to_string())
    } else {
        RemoteError::Unavailable(err.to_string())
    }
}

fn map_status(status: StatusCode, body: &str) -> RemoteError {
    let detail: String = body.chars().take(MAX_ERROR_BODY).collect();
    let message = if detail.is_empty() {
        format!("status {status}")
    } else {
        format!("status {status}: {detail}")
    };

    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        RemoteError::Unavailable(message)
    } else {
        RemoteError::Rejected(message)
    }
}
