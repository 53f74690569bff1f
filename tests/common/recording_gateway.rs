use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use trackit_sync::application::ports::{RemoteError, RemoteGateway};
use trackit_sync::domain::value_objects::{EntityKind, RecordPayload};

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    pub kind: EntityKind,
    pub action: &'static str,
    pub server_id: Option<String>,
    pub body: Value,
}

type FailureRule = (Box<dyn Fn(&RecordPayload) -> bool + Send + Sync>, RemoteError);

/// In-memory remote that records every mutation and hands out server ids.
pub struct RecordingGateway {
    calls: Mutex<Vec<RemoteCall>>,
    queued_ids: Mutex<VecDeque<String>>,
    counter: AtomicU64,
    failures: Mutex<Vec<FailureRule>>,
    delay: Option<Duration>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            queued_ids: Mutex::new(VecDeque::new()),
            counter: AtomicU64::new(100),
            failures: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Ids handed out by the next creates, in order. Falls back to `srv-<n>`.
    pub fn with_ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queued_ids
            .lock()
            .unwrap()
            .extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn fail_when<F>(&self, predicate: F, error: RemoteError)
    where
        F: Fn(&RecordPayload) -> bool + Send + Sync + 'static,
    {
        self.failures
            .lock()
            .unwrap()
            .push((Box::new(predicate), error));
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, kind: EntityKind) -> Vec<RemoteCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.kind == kind)
            .collect()
    }

    async fn record(
        &self,
        action: &'static str,
        server_id: Option<&str>,
        payload: &RecordPayload,
    ) -> Result<(), RemoteError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.calls.lock().unwrap().push(RemoteCall {
            kind: payload.kind(),
            action,
            server_id: server_id.map(str::to_string),
            body: payload.to_json().unwrap(),
        });

        let failures = self.failures.lock().unwrap();
        match failures.iter().find(|(predicate, _)| predicate(payload)) {
            Some((_, error)) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteGateway for RecordingGateway {
    async fn create(&self, payload: &RecordPayload) -> Result<String, RemoteError> {
        self.record("create", None, payload).await?;
        let queued = self.queued_ids.lock().unwrap().pop_front();
        Ok(queued.unwrap_or_else(|| {
            format!("srv-{}", self.counter.fetch_add(1, Ordering::SeqCst))
        }))
    }

    async fn update(&self, server_id: &str, payload: &RecordPayload) -> Result<(), RemoteError> {
        self.record("update", Some(server_id), payload).await
    }
}
