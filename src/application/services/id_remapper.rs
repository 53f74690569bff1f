use crate::application::ports::StagingStore;
use crate::domain::entities::StagedRecord;
use crate::domain::value_objects::{EntityKind, ForeignKey};
use crate::shared::error::AppError;
use std::sync::Arc;

/// Whether a staged record may be pushed with its current foreign keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Ready,
    /// A referenced parent has no server identity yet.
    Blocked(ForeignKey),
}

/// Propagates server-assigned identifiers into records that still reference local ones.
#[derive(Clone)]
pub struct IdRemapper {
    store: Arc<dyn StagingStore>,
}

impl IdRemapper {
    pub fn new(store: Arc<dyn StagingStore>) -> Self {
        Self { store }
    }

    /// Rewrites every dependent reference to `old_id` in `kind` to `new_id`.
    ///
    /// Sync status of the rewritten records is left untouched. Returns the
    /// number of records changed.
    pub async fn remap(
        &self,
        kind: EntityKind,
        old_id: &str,
        new_id: &str,
    ) -> Result<u32, AppError> {
        if old_id == new_id {
            return Ok(0);
        }

        let mut remapped = 0u32;
        for dependent in kind.dependents() {
            for mut record in self.store.list_kind(*dependent).await? {
                if record.payload.remap(kind, old_id, new_id) {
                    self.store.update(&record).await?;
                    remapped += 1;
                }
            }
        }

        if remapped > 0 {
            tracing::debug!(
                target: "sync::remap",
                kind = %kind,
                old_id,
                new_id,
                remapped,
                "remapped foreign keys"
            );
        }
        Ok(remapped)
    }

    /// Replaces local-origin foreign keys whose parent is already synced.
    ///
    /// Covers references written after the parent's remap ran, or left behind by
    /// an interrupted pass. Persists the record if anything changed.
    pub async fn resolve_foreign_keys(
        &self,
        record: &mut StagedRecord,
    ) -> Result<Resolution, AppError> {
        let mut changed = false;

        for fk in record.payload.foreign_keys() {
            if !fk.is_local_origin() {
                continue;
            }

            let parent = self.store.get(fk.target, &fk.value).await?;
            let server_id = parent
                .as_ref()
                .and_then(StagedRecord::remote_id)
                .map(str::to_string);

            match server_id {
                Some(server_id) => {
                    changed |= record.payload.remap(fk.target, &fk.value, &server_id);
                }
                None => {
                    if changed {
                        self.store.update(record).await?;
                    }
                    return Ok(Resolution::Blocked(fk));
                }
            }
        }

        if changed {
            self.store.update(record).await?;
        }
        Ok(Resolution::Ready)
    }
}
