use crate::domain::entities::StagedRecord;

/// Remote operation a staged record needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Create,
    Update,
}

impl SyncAction {
    /// Derived from id provenance only. Callers must not cache the result across attempts.
    pub fn classify(record: &StagedRecord) -> Self {
        let has_server_id = record
            .server_id
            .as_deref()
            .is_some_and(|id| !id.is_empty());
        if record.local_id.is_local_origin() && !has_server_id {
            SyncAction::Create
        } else {
            SyncAction::Update
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::Create => "create",
            SyncAction::Update => "update",
        }
    }
}
