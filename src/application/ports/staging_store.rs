use crate::domain::entities::StagedRecord;
use crate::domain::value_objects::{EntityKind, SyncStatus};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable, per-kind ordered collection of staged records.
///
/// Records are keyed by `(kind, local_id)`. `get` also resolves a server id,
/// so callers can look a parent up by whichever identifier a foreign key holds.
#[async_trait]
pub trait StagingStore: Send + Sync {
    async fn insert(&self, record: &StagedRecord) -> Result<(), AppError>;

    async fn get(&self, kind: EntityKind, id: &str) -> Result<Option<StagedRecord>, AppError>;

    /// Overwrites the stored row for `record.local_id`. Fails with `NotFound` if absent.
    async fn update(&self, record: &StagedRecord) -> Result<(), AppError>;

    /// Records of `kind` in `status`, in insertion order.
    async fn list_by_status(
        &self,
        kind: EntityKind,
        status: SyncStatus,
    ) -> Result<Vec<StagedRecord>, AppError>;

    /// Every record of `kind`, in insertion order.
    async fn list_kind(&self, kind: EntityKind) -> Result<Vec<StagedRecord>, AppError>;
}
