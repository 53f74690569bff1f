use crate::domain::value_objects::{EntityKind, FailureKind, RecordId, RecordPayload, SyncStatus};
use chrono::{DateTime, Utc};

/// Failure bookkeeping for a record that ended a push in `error`.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncFailure {
    pub kind: FailureKind,
    pub message: String,
    pub next_attempt_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StagedRecord {
    pub local_id: RecordId,
    pub server_id: Option<String>,
    pub payload: RecordPayload,
    pub sync_status: SyncStatus,
    pub failure: Option<SyncFailure>,
    pub attempt_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StagedRecord {
    /// A record written by the application while offline (or speculatively).
    pub fn new_local(payload: impl Into<RecordPayload>) -> Self {
        let now = Utc::now();
        Self {
            local_id: RecordId::generate_local(),
            server_id: None,
            payload: payload.into(),
            sync_status: SyncStatus::Pending,
            failure: None,
            attempt_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Local mirror of a row the remote store already holds.
    pub fn mirror(server_id: RecordId, payload: impl Into<RecordPayload>) -> Self {
        let now = Utc::now();
        Self {
            server_id: Some(server_id.to_string()),
            local_id: server_id,
            payload: payload.into(),
            sync_status: SyncStatus::Synced,
            failure: None,
            attempt_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_local_id(mut self, local_id: RecordId) -> Self {
        self.local_id = local_id;
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.payload.kind()
    }

    /// Identifier the remote store knows this record by, if any.
    pub fn remote_id(&self) -> Option<&str> {
        match &self.server_id {
            Some(id) if !id.is_empty() => Some(id.as_str()),
            _ if !self.local_id.is_local_origin() => Some(self.local_id.as_str()),
            _ => None,
        }
    }

    pub fn mark_synced(&mut self, server_id: Option<String>) {
        if let Some(id) = server_id {
            self.server_id = Some(id);
        }
        self.sync_status = SyncStatus::Synced;
        self.failure = None;
        self.updated_at = Utc::now();
    }

    pub fn mark_error(&mut self, failure: SyncFailure) {
        self.sync_status = SyncStatus::Error;
        self.attempt_count = self.attempt_count.saturating_add(1);
        self.failure = Some(failure);
        self.updated_at = Utc::now();
    }
}
