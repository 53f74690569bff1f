use crate::domain::entities::SyncReport;

/// Surface that reports the aggregate result of each pass (e.g. a toast in the UI).
pub trait SyncNotifier: Send + Sync {
    fn emit_report(&self, report: &SyncReport) -> Result<(), String>;
    fn emit_failure(&self, message: &str) -> Result<(), String>;
}
