pub mod id_remapper;
pub mod retry_policy;
pub mod sync_service;

pub use id_remapper::{IdRemapper, Resolution};
pub use retry_policy::RetryPolicy;
pub use sync_service::{SyncOptions, SyncService, SyncServiceStatus};
