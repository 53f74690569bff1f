pub(super) const INSERT_STAGED_RECORD: &str = r#"
    INSERT INTO staged_records (
        kind,
        local_id,
        server_id,
        payload,
        sync_status,
        failure_kind,
        last_error,
        attempt_count,
        next_attempt_at,
        created_at,
        updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
"#;

pub(super) const UPDATE_STAGED_RECORD: &str = r#"
    UPDATE staged_records
    SET server_id = ?3,
        payload = ?4,
        sync_status = ?5,
        failure_kind = ?6,
        last_error = ?7,
        attempt_count = ?8,
        next_attempt_at = ?9,
        updated_at = ?10
    WHERE kind = ?1 AND local_id = ?2
"#;

pub(super) const SELECT_STAGED_RECORD_BY_ID: &str = r#"
    SELECT seq, kind, local_id, server_id, payload, sync_status, failure_kind,
           last_error, attempt_count, next_attempt_at, created_at, updated_at
    FROM staged_records
    WHERE kind = ?1 AND (local_id = ?2 OR server_id = ?2)
    ORDER BY CASE WHEN local_id = ?2 THEN 0 ELSE 1 END, seq
    LIMIT 1
"#;

pub(super) const SELECT_STAGED_RECORDS_BY_STATUS: &str = r#"
    SELECT seq, kind, local_id, server_id, payload, sync_status, failure_kind,
           last_error, attempt_count, next_attempt_at, created_at, updated_at
    FROM staged_records
    WHERE kind = ?1 AND sync_status = ?2
    ORDER BY seq ASC
"#;

pub(super) const SELECT_STAGED_RECORDS_BY_KIND: &str = r#"
    SELECT seq, kind, local_id, server_id, payload, sync_status, failure_kind,
           last_error, attempt_count, next_attempt_at, created_at, updated_at
    FROM staged_records
    WHERE kind = ?1
    ORDER BY seq ASC
"#;

pub(super) const QUARANTINE_STAGED_RECORD: &str = r#"
    UPDATE staged_records
    SET sync_status = 'error',
        failure_kind = 'local',
        last_error = ?2,
        updated_at = ?3
    WHERE seq = ?1
"#;
