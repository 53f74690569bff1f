use crate::application::ports::{
    ConnectivitySink, ConnectivitySource, ConnectivityState, GatewayRegistry, StagingStore,
    SyncNotifier,
};
use crate::application::services::{RetryPolicy, SyncOptions, SyncService, SyncServiceStatus};
use crate::domain::entities::SyncReport;
use crate::infrastructure::{
    ConnectionPool, ConnectivityEvent, ConnectivityMonitor, LoggingSyncNotifier, PostgrestGateway,
    SqliteStagingStore,
};
use crate::shared::config::{AppConfig, SyncConfig};
use crate::shared::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Owns the staging store, the connectivity monitor, the sync service and
/// every background task they need. Built explicitly; nothing here is global.
pub struct SyncEngine {
    store: Arc<dyn StagingStore>,
    monitor: Arc<ConnectivityMonitor>,
    service: Arc<SyncService>,
    pool: Option<ConnectionPool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    started: AtomicBool,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn StagingStore>,
        gateways: GatewayRegistry,
        monitor: Arc<ConnectivityMonitor>,
        config: &SyncConfig,
    ) -> Self {
        Self::with_notifier(store, gateways, monitor, config, Arc::new(LoggingSyncNotifier))
    }

    pub fn with_notifier(
        store: Arc<dyn StagingStore>,
        gateways: GatewayRegistry,
        monitor: Arc<ConnectivityMonitor>,
        config: &SyncConfig,
        notifier: Arc<dyn SyncNotifier>,
    ) -> Self {
        let connectivity: Arc<dyn ConnectivityState> = monitor.clone();
        let service = SyncService::new(Arc::clone(&store), gateways, connectivity)
            .with_options(SyncOptions::from(config))
            .with_retry_policy(RetryPolicy::new(config.retry.clone()))
            .with_notifier(notifier);
        Self::from_service(store, monitor, service)
    }

    /// Wraps a service the caller configured itself (custom notifier, options).
    pub fn from_service(
        store: Arc<dyn StagingStore>,
        monitor: Arc<ConnectivityMonitor>,
        service: SyncService,
    ) -> Self {
        Self {
            store,
            monitor,
            service: Arc::new(service),
            pool: None,
            tasks: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        }
    }

    /// Opens and migrates the SQLite store and wires the PostgREST gateways.
    pub async fn open(config: &AppConfig) -> Result<Self, AppError> {
        let pool = ConnectionPool::with_options(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(config.database.connection_timeout),
        )
        .await?;
        pool.migrate().await?;

        let gateways = PostgrestGateway::registry(&config.remote)?;
        gateways.ensure_complete()?;

        let store: Arc<dyn StagingStore> = Arc::new(SqliteStagingStore::new(pool.clone()));
        let monitor = Arc::new(ConnectivityMonitor::from_config(&config.connectivity));

        let mut engine = Self::new(store, gateways, monitor, &config.sync);
        engine.pool = Some(pool);
        Ok(engine)
    }

    /// Starts the debounce worker and the reconnect watcher. If the link is
    /// already up, one pass is requested straight away. Later calls are no-ops.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!(target: "sync::orchestrator", "sync engine already started");
            return;
        }
        self.monitor.start();

        let mut events = self.monitor.subscribe();
        let service = Arc::clone(&self.service);
        if self.monitor.settled_state() {
            service.trigger();
        }

        let watcher = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ConnectivityEvent::Reconnected) => {
                        tracing::info!(target: "sync::connectivity", "reconnected; requesting sync");
                        service.trigger();
                    }
                    Ok(ConnectivityEvent::Disconnected) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            target: "sync::connectivity",
                            skipped,
                            "connectivity watcher lagged; requesting sync"
                        );
                        service.trigger();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        self.task_list().push(watcher);
    }

    /// Spawns a connectivity source that feeds the monitor until shutdown.
    pub fn attach_source(&self, source: Arc<dyn ConnectivitySource>) {
        let sink: Arc<dyn ConnectivitySink> = self.monitor.clone();
        let handle = tokio::spawn(async move {
            source.run(sink).await;
        });
        self.task_list().push(handle);
    }

    /// Trigger surface for the UI: runs one pass (or reports why it was skipped).
    pub async fn request_sync(&self) -> SyncReport {
        self.service.request_sync().await
    }

    pub async fn status(&self) -> SyncServiceStatus {
        self.service.get_status().await
    }

    pub fn staging(&self) -> Arc<dyn StagingStore> {
        Arc::clone(&self.store)
    }

    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    /// Stops watching connectivity, refuses new passes and waits for an in-flight
    /// one, then closes the store.
    pub async fn shutdown(&self) {
        let tasks: Vec<_> = self.task_list().drain(..).collect();
        for task in &tasks {
            task.abort();
        }
        self.monitor.stop();
        self.service.close().await;

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
        tracing::info!(target: "sync::orchestrator", stopped_tasks = tasks.len(), "sync engine stopped");
    }

    fn task_list(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        for task in self.task_list().drain(..) {
            task.abort();
        }
    }
}
