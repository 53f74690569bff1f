use super::mappers::{payload_to_column, record_from_row};
use super::queries::{
    INSERT_STAGED_RECORD, QUARANTINE_STAGED_RECORD, SELECT_STAGED_RECORD_BY_ID,
    SELECT_STAGED_RECORDS_BY_KIND, SELECT_STAGED_RECORDS_BY_STATUS, UPDATE_STAGED_RECORD,
};
use super::rows::StagedRecordRow;
use crate::application::ports::StagingStore;
use crate::domain::entities::StagedRecord;
use crate::domain::value_objects::{EntityKind, SyncStatus};
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;

/// SQLite-backed staging store. All kinds share one table partitioned by `kind`.
pub struct SqliteStagingStore {
    pool: ConnectionPool,
}

impl SqliteStagingStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Decodes a row; rows that no longer decode are parked as `error`/`local` and skipped.
    async fn decode_or_quarantine(
        &self,
        row: StagedRecordRow,
    ) -> Result<Option<StagedRecord>, AppError> {
        let seq = row.seq;
        let local_id = row.local_id.clone();
        match record_from_row(row) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                tracing::warn!(
                    target: "sync::staging",
                    seq,
                    local_id = %local_id,
                    error = %err,
                    "staged record could not be decoded; quarantined"
                );
                sqlx::query(QUARANTINE_STAGED_RECORD)
                    .bind(seq)
                    .bind(err.to_string())
                    .bind(Utc::now().timestamp_millis())
                    .execute(self.pool.get_pool())
                    .await?;
                Ok(None)
            }
        }
    }

    async fn decode_all(&self, rows: Vec<StagedRecordRow>) -> Result<Vec<StagedRecord>, AppError> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(record) = self.decode_or_quarantine(row).await? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl StagingStore for SqliteStagingStore {
    async fn insert(&self, record: &StagedRecord) -> Result<(), AppError> {
        let payload = payload_to_column(&record.payload)?;
        let failure = record.failure.as_ref();

        sqlx::query(INSERT_STAGED_RECORD)
            .bind(record.kind().as_str())
            .bind(record.local_id.as_str())
            .bind(record.server_id.as_deref())
            .bind(payload)
            .bind(record.sync_status.as_str())
            .bind(failure.map(|f| f.kind.as_str()))
            .bind(failure.map(|f| f.message.as_str()))
            .bind(i64::from(record.attempt_count))
            .bind(failure.and_then(|f| f.next_attempt_at).map(|at| at.timestamp_millis()))
            .bind(record.created_at.timestamp_millis())
            .bind(record.updated_at.timestamp_millis())
            .execute(self.pool.get_pool())
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(db) if db.is_unique_violation() => AppError::InvalidInput(
                    format!("{} {} is already staged", record.kind(), record.local_id),
                ),
                other => AppError::from(other),
            })?;
        Ok(())
    }

    async fn get(&self, kind: EntityKind, id: &str) -> Result<Option<StagedRecord>, AppError> {
        let row = sqlx::query_as::<_, StagedRecordRow>(SELECT_STAGED_RECORD_BY_ID)
            .bind(kind.as_str())
            .bind(id)
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => self.decode_or_quarantine(row).await,
            None => Ok(None),
        }
    }

    async fn update(&self, record: &StagedRecord) -> Result<(), AppError> {
        let payload = payload_to_column(&record.payload)?;
        let failure = record.failure.as_ref();

        let result = sqlx::query(UPDATE_STAGED_RECORD)
            .bind(record.kind().as_str())
            .bind(record.local_id.as_str())
            .bind(record.server_id.as_deref())
            .bind(payload)
            .bind(record.sync_status.as_str())
            .bind(failure.map(|f| f.kind.as_str()))
            .bind(failure.map(|f| f.message.as_str()))
            .bind(i64::from(record.attempt_count))
            .bind(failure.and_then(|f| f.next_attempt_at).map(|at| at.timestamp_millis()))
            .bind(record.updated_at.timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "{} {} is not staged",
                record.kind(),
                record.local_id
            )));
        }
        Ok(())
    }

    async fn list_by_status(
        &self,
        kind: EntityKind,
        status: SyncStatus,
    ) -> Result<Vec<StagedRecord>, AppError> {
        let rows = sqlx::query_as::<_, StagedRecordRow>(SELECT_STAGED_RECORDS_BY_STATUS)
            .bind(kind.as_str())
            .bind(status.as_str())
            .fetch_all(self.pool.get_pool())
            .await?;
        self.decode_all(rows).await
    }

    async fn list_kind(&self, kind: EntityKind) -> Result<Vec<StagedRecord>, AppError> {
        let rows = sqlx::query_as::<_, StagedRecordRow>(SELECT_STAGED_RECORDS_BY_KIND)
            .bind(kind.as_str())
            .fetch_all(self.pool.get_pool())
            .await?;
        self.decode_all(rows).await
    }
}
