use crate::application::ports::{RemoteError, StagingStore};
use crate::domain::entities::SyncFailure;
use crate::domain::value_objects::{EntityKind, FailureKind, SyncStatus};
use crate::shared::config::RetryConfig;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};

/// Decides what an `error` record carries and when a transient one may run again.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// `attempts` is the attempt count including the one that just failed.
    pub fn failure_for(
        &self,
        error: &RemoteError,
        attempts: u32,
        now: DateTime<Utc>,
    ) -> SyncFailure {
        let kind = error.failure_kind();
        let next_attempt_at = if kind.is_retryable() && attempts < self.config.max_attempts {
            chrono::Duration::from_std(self.config.backoff_for(attempts))
                .ok()
                .map(|backoff| now + backoff)
        } else {
            None
        };

        SyncFailure {
            kind,
            message: error.to_string(),
            next_attempt_at,
        }
    }

    pub fn is_due(&self, failure: &SyncFailure, attempts: u32, now: DateTime<Utc>) -> bool {
        failure.kind.is_retryable()
            && attempts < self.config.max_attempts
            && failure.next_attempt_at.is_some_and(|at| at <= now)
    }

    /// Resets due transient errors back to `pending`. Rejected errors stay terminal.
    pub async fn requeue_failed(
        &self,
        store: &dyn StagingStore,
        now: DateTime<Utc>,
    ) -> Result<u32, AppError> {
        let mut requeued = 0u32;
        for kind in EntityKind::ALL {
            for mut record in store.list_by_status(kind, SyncStatus::Error).await? {
                let due = record
                    .failure
                    .as_ref()
                    .is_some_and(|failure| self.is_due(failure, record.attempt_count, now));
                if !due {
                    continue;
                }
                record.sync_status = SyncStatus::Pending;
                record.updated_at = now;
                store.update(&record).await?;
                requeued += 1;
            }
        }

        if requeued > 0 {
            tracing::info!(target: "sync::retry", requeued, "requeued transient failures");
        }
        Ok(requeued)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}
