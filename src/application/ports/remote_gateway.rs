use crate::domain::value_objects::{EntityKind, FailureKind, RecordPayload};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// Validation, constraint or conflict failure. Retrying the same payload will fail again.
    #[error("Rejected by remote: {0}")]
    Rejected(String),

    /// Network or availability failure. The same payload may succeed later.
    #[error("Remote unavailable: {0}")]
    Unavailable(String),
}

impl RemoteError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            RemoteError::Rejected(_) => FailureKind::Rejected,
            RemoteError::Unavailable(_) => FailureKind::Transient,
        }
    }
}

/// Create/update against the authoritative store for one entity kind.
///
/// Each call performs at most one remote mutation and never retries.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Inserts the payload and returns the server-assigned identifier.
    async fn create(&self, payload: &RecordPayload) -> Result<String, RemoteError>;

    async fn update(&self, server_id: &str, payload: &RecordPayload) -> Result<(), RemoteError>;
}

#[derive(Clone, Default)]
pub struct GatewayRegistry {
    gateways: HashMap<EntityKind, Arc<dyn RemoteGateway>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: EntityKind, gateway: Arc<dyn RemoteGateway>) -> Self {
        self.gateways.insert(kind, gateway);
        self
    }

    /// Registers the same adapter for every kind.
    pub fn uniform(gateway: Arc<dyn RemoteGateway>) -> Self {
        EntityKind::ALL
            .into_iter()
            .fold(Self::new(), |registry, kind| {
                registry.with(kind, Arc::clone(&gateway))
            })
    }

    pub fn get(&self, kind: EntityKind) -> Result<Arc<dyn RemoteGateway>, AppError> {
        self.gateways.get(&kind).cloned().ok_or_else(|| {
            AppError::ConfigurationError(format!("No remote gateway registered for {kind}"))
        })
    }

    pub fn ensure_complete(&self) -> Result<(), AppError> {
        for kind in EntityKind::ALL {
            self.get(kind)?;
        }
        Ok(())
    }
}
