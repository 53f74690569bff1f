pub mod notifier;

pub use notifier::{BroadcastSyncNotifier, LoggingSyncNotifier, SyncEvent};
