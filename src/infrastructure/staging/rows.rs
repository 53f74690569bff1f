use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StagedRecordRow {
    pub seq: i64,
    pub kind: String,
    pub local_id: String,
    pub server_id: Option<String>,
    pub payload: String,
    pub sync_status: String,
    pub failure_kind: Option<String>,
    pub last_error: Option<String>,
    pub attempt_count: i64,
    pub next_attempt_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}
