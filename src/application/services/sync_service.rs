use crate::application::ports::{
    ConnectivityState, GatewayRegistry, RemoteError, RemoteGateway, StagingStore, SyncNotifier,
};
use crate::application::services::id_remapper::{IdRemapper, Resolution};
use crate::application::services::retry_policy::RetryPolicy;
use crate::domain::entities::{PassOutcome, StagedRecord, SyncReport};
use crate::domain::sync_action::SyncAction;
use crate::domain::value_objects::{EntityKind, SYNC_STAGES, SyncStatus};
use crate::shared::config::SyncConfig;
use crate::shared::error::AppError;
use crate::shared::metrics;
use chrono::Utc;
use futures::StreamExt;
use futures::stream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SyncServiceStatus {
    pub is_syncing: bool,
    pub last_sync: Option<i64>,
    pub sync_errors: u32,
    pub last_report: Option<SyncReport>,
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub max_concurrency: usize,
    pub auto_requeue_transient: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            auto_requeue_transient: false,
        }
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency.max(1),
            auto_requeue_transient: config.auto_requeue_transient,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordOutcome {
    Synced,
    Errored,
    Deferred,
}

/// Reconciles staged records with the remote store, one pass at a time.
pub struct SyncService {
    store: Arc<dyn StagingStore>,
    gateways: GatewayRegistry,
    connectivity: Arc<dyn ConnectivityState>,
    notifier: Option<Arc<dyn SyncNotifier>>,
    remapper: IdRemapper,
    retry: RetryPolicy,
    options: SyncOptions,
    gate: Mutex<()>,
    closed: AtomicBool,
    status: RwLock<SyncServiceStatus>,
}

impl SyncService {
    pub fn new(
        store: Arc<dyn StagingStore>,
        gateways: GatewayRegistry,
        connectivity: Arc<dyn ConnectivityState>,
    ) -> Self {
        Self {
            remapper: IdRemapper::new(Arc::clone(&store)),
            store,
            gateways,
            connectivity,
            notifier: None,
            retry: RetryPolicy::default(),
            options: SyncOptions::default(),
            gate: Mutex::new(()),
            closed: AtomicBool::new(false),
            status: RwLock::new(SyncServiceStatus {
                is_syncing: false,
                last_sync: None,
                sync_errors: 0,
                last_report: None,
            }),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn SyncNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs `request_sync` in the background. Used by the connectivity watcher.
    pub fn trigger(self: &Arc<Self>) {
        if self.is_closed() {
            return;
        }
        let service = Arc::clone(self);
        tokio::spawn(async move {
            service.request_sync().await;
        });
    }

    /// Runs one reconciliation pass unless one is already running or the client is offline.
    pub async fn request_sync(&self) -> SyncReport {
        let Ok(_guard) = self.gate.try_lock() else {
            tracing::debug!(target: "sync::orchestrator", "sync already in flight; trigger ignored");
            let report = SyncReport::skipped(PassOutcome::SkippedInFlight);
            metrics::record_pass(&report);
            return report;
        };

        // Checked under the gate so a pass queued before `close` never starts after it.
        if self.is_closed() {
            tracing::debug!(target: "sync::orchestrator", "sync service closed; trigger ignored");
            let report = SyncReport::skipped(PassOutcome::SkippedClosed);
            metrics::record_pass(&report);
            return report;
        }

        if !self.connectivity.is_connected() {
            tracing::info!(target: "sync::orchestrator", "offline; sync pass skipped");
            let report = SyncReport::skipped(PassOutcome::SkippedOffline);
            metrics::record_pass(&report);
            return report;
        }

        self.status.write().await.is_syncing = true;
        let report = self.run_pass().await;
        self.complete_pass(&report).await;
        report
    }

    pub async fn get_status(&self) -> SyncServiceStatus {
        self.status.read().await.clone()
    }

    /// Resolves once no pass is running.
    pub async fn wait_idle(&self) {
        let _guard = self.gate.lock().await;
    }

    /// Refuses further passes and waits for the running one, if any, to finish.
    pub async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.wait_idle().await;
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn run_pass(&self) -> SyncReport {
        let mut report = SyncReport::started();
        tracing::info!(target: "sync::orchestrator", "sync pass started");

        if self.options.auto_requeue_transient {
            match self
                .retry
                .requeue_failed(self.store.as_ref(), Utc::now())
                .await
            {
                Ok(requeued) => report.requeued = requeued,
                Err(err) => return self.abort(report, err),
            }
        }

        for stage in SYNC_STAGES {
            for kind in stage.iter().copied() {
                if let Err(err) = self.drain_kind(kind, &mut report).await {
                    return self.abort(report, err);
                }
            }
        }

        report.finish(PassOutcome::Completed)
    }

    fn abort(&self, report: SyncReport, err: AppError) -> SyncReport {
        tracing::error!(
            target: "sync::orchestrator",
            error = %err,
            "sync pass aborted; remaining records stay pending"
        );
        report.finish(PassOutcome::Aborted {
            reason: err.to_string(),
        })
    }

    /// Drains the pending queue of one kind. Returns `Err` only for pass-level failures.
    async fn drain_kind(&self, kind: EntityKind, report: &mut SyncReport) -> Result<(), AppError> {
        let pending = self.store.list_by_status(kind, SyncStatus::Pending).await?;
        if pending.is_empty() {
            return Ok(());
        }
        let registered = self.gateways.get(kind)?;

        tracing::debug!(
            target: "sync::orchestrator",
            kind = %kind,
            pending = pending.len(),
            "draining pending records"
        );

        let gateway = registered.as_ref();
        let mut outcomes = stream::iter(pending)
            .map(|record| self.push_record(gateway, record))
            .buffered(self.options.max_concurrency.max(1));

        while let Some(outcome) = outcomes.next().await {
            let tally = report.tally_mut(kind);
            match outcome? {
                RecordOutcome::Synced => tally.synced += 1,
                RecordOutcome::Errored => tally.errored += 1,
                RecordOutcome::Deferred => tally.deferred += 1,
            }
        }
        Ok(())
    }

    async fn push_record(
        &self,
        gateway: &dyn RemoteGateway,
        mut record: StagedRecord,
    ) -> Result<RecordOutcome, AppError> {
        let kind = record.kind();

        if let Resolution::Blocked(fk) = self.remapper.resolve_foreign_keys(&mut record).await? {
            tracing::debug!(
                target: "sync::orchestrator",
                kind = %kind,
                local_id = %record.local_id,
                field = fk.field,
                parent = %fk.value,
                "parent not synced yet; record deferred"
            );
            return Ok(RecordOutcome::Deferred);
        }

        let action = SyncAction::classify(&record);
        let result = match action {
            SyncAction::Create => gateway.create(&record.payload).await.and_then(|id| {
                if id.trim().is_empty() {
                    Err(RemoteError::Rejected(
                        "remote returned an empty identifier".to_string(),
                    ))
                } else {
                    Ok(Some(id))
                }
            }),
            // Append-only rows with a remote identity are already server-resident.
            SyncAction::Update if kind.is_append_only() => Ok(None),
            SyncAction::Update => match record.remote_id().map(str::to_string) {
                Some(remote_id) => gateway
                    .update(&remote_id, &record.payload)
                    .await
                    .map(|()| None),
                None => Err(RemoteError::Rejected(
                    "record has no remote identity".to_string(),
                )),
            },
        };

        match result {
            Ok(created_id) => {
                record.mark_synced(created_id.clone());
                self.store.update(&record).await?;

                if let Some(server_id) = created_id.as_deref() {
                    self.remapper
                        .remap(kind, record.local_id.as_str(), server_id)
                        .await?;
                }

                tracing::info!(
                    target: "sync::orchestrator",
                    kind = %kind,
                    action = action.as_str(),
                    local_id = %record.local_id,
                    server_id = record.server_id.as_deref().unwrap_or_default(),
                    "record synced"
                );
                Ok(RecordOutcome::Synced)
            }
            Err(err) => {
                let attempt = record.attempt_count.saturating_add(1);
                let failure = self.retry.failure_for(&err, attempt, Utc::now());
                tracing::warn!(
                    target: "sync::orchestrator",
                    kind = %kind,
                    action = action.as_str(),
                    local_id = %record.local_id,
                    failure = %failure.kind,
                    error = %err,
                    "record failed to sync"
                );
                record.mark_error(failure);
                self.store.update(&record).await?;
                Ok(RecordOutcome::Errored)
            }
        }
    }

    async fn complete_pass(&self, report: &SyncReport) {
        {
            let mut status = self.status.write().await;
            status.is_syncing = false;
            status.last_sync = Some(report.finished_at.timestamp());
            if matches!(report.outcome, PassOutcome::Aborted { .. }) {
                status.sync_errors = status.sync_errors.saturating_add(1);
            }
            status.last_report = Some(report.clone());
        }

        metrics::record_pass(report);

        match &report.outcome {
            PassOutcome::Aborted { reason } => {
                if let Some(notifier) = &self.notifier {
                    if let Err(err) = notifier.emit_failure(reason) {
                        tracing::warn!(
                            target: "sync::orchestrator",
                            error = %err,
                            "failed to emit sync failure event"
                        );
                    }
                }
            }
            _ => {
                if let Some(notifier) = &self.notifier {
                    if let Err(err) = notifier.emit_report(report) {
                        tracing::warn!(
                            target: "sync::orchestrator",
                            error = %err,
                            "failed to emit sync report event"
                        );
                    }
                }
                tracing::info!(
                    target: "sync::orchestrator",
                    synced = report.total_synced(),
                    errored = report.total_errored(),
                    deferred = report.total_deferred(),
                    requeued = report.requeued,
                    "sync pass completed"
                );
            }
        }
    }
}
