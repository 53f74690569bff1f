use crate::domain::entities::{PassOutcome, SyncReport};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

pub const UNSET_TS: u64 = 0;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PassOutcomeStatus {
    Completed,
    Aborted,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetricsSnapshot {
    pub passes_completed: u64,
    pub passes_aborted: u64,
    pub passes_skipped: u64,
    pub records_synced: u64,
    pub records_errored: u64,
    pub consecutive_aborts: u64,
    pub last_completed_ms: Option<u64>,
    pub last_aborted_ms: Option<u64>,
    pub last_outcome: Option<PassOutcomeStatus>,
    pub last_duration_ms: Option<u64>,
    pub last_synced_count: Option<u32>,
    pub last_errored_count: Option<u32>,
    pub last_deferred_count: Option<u32>,
}

#[derive(Default, Clone)]
struct LastPassMetadata {
    last_outcome: Option<PassOutcomeStatus>,
    duration_ms: Option<u64>,
    synced_count: Option<u32>,
    errored_count: Option<u32>,
    deferred_count: Option<u32>,
}

struct SyncPassMetrics {
    completed: AtomicU64,
    aborted: AtomicU64,
    skipped: AtomicU64,
    records_synced: AtomicU64,
    records_errored: AtomicU64,
    consecutive_aborts: AtomicU64,
    last_completed_ms: AtomicU64,
    last_aborted_ms: AtomicU64,
    metadata: Mutex<LastPassMetadata>,
}

impl SyncPassMetrics {
    fn new() -> Self {
        Self {
            completed: AtomicU64::new(0),
            aborted: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            records_synced: AtomicU64::new(0),
            records_errored: AtomicU64::new(0),
            consecutive_aborts: AtomicU64::new(0),
            last_completed_ms: AtomicU64::new(UNSET_TS),
            last_aborted_ms: AtomicU64::new(UNSET_TS),
            metadata: Mutex::new(LastPassMetadata::default()),
        }
    }

    fn record(&self, report: &SyncReport) {
        let status = match report.outcome {
            PassOutcome::Completed => PassOutcomeStatus::Completed,
            PassOutcome::Aborted { .. } => PassOutcomeStatus::Aborted,
            PassOutcome::SkippedOffline
            | PassOutcome::SkippedInFlight
            | PassOutcome::SkippedClosed => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        match status {
            PassOutcomeStatus::Completed => {
                self.completed.fetch_add(1, Ordering::Relaxed);
                self.last_completed_ms
                    .store(current_unix_ms(), Ordering::Relaxed);
                self.consecutive_aborts.store(0, Ordering::Relaxed);
            }
            PassOutcomeStatus::Aborted => {
                self.aborted.fetch_add(1, Ordering::Relaxed);
                self.last_aborted_ms
                    .store(current_unix_ms(), Ordering::Relaxed);
                self.consecutive_aborts.fetch_add(1, Ordering::Relaxed);
            }
        }

        let synced = report.total_synced();
        let errored = report.total_errored();
        self.records_synced
            .fetch_add(u64::from(synced), Ordering::Relaxed);
        self.records_errored
            .fetch_add(u64::from(errored), Ordering::Relaxed);

        if let Ok(mut guard) = self.metadata.lock() {
            guard.last_outcome = Some(status);
            guard.duration_ms = (report.finished_at - report.started_at)
                .num_milliseconds()
                .try_into()
                .ok();
            guard.synced_count = Some(synced);
            guard.errored_count = Some(errored);
            guard.deferred_count = Some(report.total_deferred());
        }
    }

    fn snapshot(&self) -> SyncMetricsSnapshot {
        let metadata = self
            .metadata
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();

        SyncMetricsSnapshot {
            passes_completed: self.completed.load(Ordering::Relaxed),
            passes_aborted: self.aborted.load(Ordering::Relaxed),
            passes_skipped: self.skipped.load(Ordering::Relaxed),
            records_synced: self.records_synced.load(Ordering::Relaxed),
            records_errored: self.records_errored.load(Ordering::Relaxed),
            consecutive_aborts: self.consecutive_aborts.load(Ordering::Relaxed),
            last_completed_ms: timestamp_to_option(self.last_completed_ms.load(Ordering::Relaxed)),
            last_aborted_ms: timestamp_to_option(self.last_aborted_ms.load(Ordering::Relaxed)),
            last_outcome: metadata.last_outcome,
            last_duration_ms: metadata.duration_ms,
            last_synced_count: metadata.synced_count,
            last_errored_count: metadata.errored_count,
            last_deferred_count: metadata.deferred_count,
        }
    }
}

static SYNC_PASS_METRICS: LazyLock<SyncPassMetrics> = LazyLock::new(SyncPassMetrics::new);

pub fn record_pass(report: &SyncReport) -> SyncMetricsSnapshot {
    SYNC_PASS_METRICS.record(report);
    SYNC_PASS_METRICS.snapshot()
}

pub fn snapshot() -> SyncMetricsSnapshot {
    SYNC_PASS_METRICS.snapshot()
}

#[inline]
pub fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(UNSET_TS)
}

#[inline]
pub fn timestamp_to_option(value: u64) -> Option<u64> {
    if value == UNSET_TS { None } else { Some(value) }
}
