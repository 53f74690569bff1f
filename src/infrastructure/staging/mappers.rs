use super::rows::StagedRecordRow;
use crate::domain::entities::{StagedRecord, SyncFailure};
use crate::domain::value_objects::{EntityKind, FailureKind, RecordId, RecordPayload, SyncStatus};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};

pub fn record_from_row(row: StagedRecordRow) -> Result<StagedRecord, AppError> {
    let kind = EntityKind::parse(&row.kind).map_err(AppError::DeserializationError)?;
    let payload_value: serde_json::Value = serde_json::from_str(&row.payload)?;
    let payload = RecordPayload::from_json(kind, payload_value)?;
    let sync_status = SyncStatus::parse(&row.sync_status).map_err(AppError::DeserializationError)?;

    let failure = match row.failure_kind.as_deref() {
        Some(value) => Some(SyncFailure {
            kind: FailureKind::parse(value).map_err(AppError::DeserializationError)?,
            message: row.last_error.clone().unwrap_or_default(),
            next_attempt_at: row
                .next_attempt_at
                .map(|ms| timestamp_from_millis(ms, "next_attempt_at"))
                .transpose()?,
        }),
        None => None,
    };

    Ok(StagedRecord {
        local_id: RecordId::new(row.local_id).map_err(AppError::DeserializationError)?,
        server_id: row.server_id,
        payload,
        sync_status,
        failure,
        attempt_count: u32::try_from(row.attempt_count.max(0)).unwrap_or(u32::MAX),
        created_at: timestamp_from_millis(row.created_at, "created_at")?,
        updated_at: timestamp_from_millis(row.updated_at, "updated_at")?,
    })
}

pub fn payload_to_column(payload: &RecordPayload) -> Result<String, AppError> {
    Ok(serde_json::to_string(&payload.to_json()?)?)
}

fn timestamp_from_millis(value: i64, field: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::<Utc>::from_timestamp_millis(value)
        .ok_or_else(|| AppError::DeserializationError(format!("Invalid {field} timestamp")))
}
