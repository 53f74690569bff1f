#![allow(dead_code)]

pub mod mock_remote;
pub mod mocks;
pub mod recording_gateway;

use std::sync::Arc;
use std::time::Duration;

use trackit_sync::application::ports::{GatewayRegistry, RemoteGateway, StagingStore};
use trackit_sync::application::services::{SyncOptions, SyncService};
use trackit_sync::domain::entities::StagedRecord;
use trackit_sync::domain::value_objects::{EntityKind, RecordId, RecordPayload};
use trackit_sync::infrastructure::{ConnectionPool, ConnectivityMonitor, SqliteStagingStore};

pub use recording_gateway::{RecordingGateway, RemoteCall};

pub const TEST_DEBOUNCE: Duration = Duration::from_millis(20);

pub struct SyncTestContext {
    pub store: Arc<SqliteStagingStore>,
    pub pool: ConnectionPool,
    pub monitor: Arc<ConnectivityMonitor>,
}

impl SyncTestContext {
    pub fn service(&self, gateway: Arc<dyn RemoteGateway>) -> SyncService {
        self.service_with(GatewayRegistry::uniform(gateway), SyncOptions::default())
    }

    pub fn service_with(&self, gateways: GatewayRegistry, options: SyncOptions) -> SyncService {
        SyncService::new(self.store.clone(), gateways, self.monitor.clone()).with_options(options)
    }

    /// Stages a pending record under a fixed local id.
    pub async fn stage(&self, local_id: &str, payload: impl Into<RecordPayload>) -> StagedRecord {
        let record = StagedRecord::new_local(payload)
            .with_local_id(RecordId::new(local_id.to_string()).expect("local id"));
        self.store.insert(&record).await.expect("insert staged record");
        record
    }

    pub async fn reload(&self, kind: EntityKind, id: &str) -> StagedRecord {
        self.store
            .get(kind, id)
            .await
            .expect("store get")
            .unwrap_or_else(|| panic!("{kind} {id} should be staged"))
    }
}

pub async fn setup_sync_context(online: bool) -> SyncTestContext {
    let pool = ConnectionPool::from_memory().await.expect("in-memory sqlite");
    pool.migrate().await.expect("migrations");

    SyncTestContext {
        store: Arc::new(SqliteStagingStore::new(pool.clone())),
        pool,
        monitor: Arc::new(ConnectivityMonitor::new(online, TEST_DEBOUNCE)),
    }
}

/// Polls `check` until it holds or the timeout elapses.
pub async fn wait_for<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
