pub mod connectivity;
pub mod database;
pub mod remote;
pub mod staging;
pub mod sync;

pub use connectivity::{ConnectivityEvent, ConnectivityMonitor, HttpConnectivityProbe};
pub use database::ConnectionPool;
pub use remote::PostgrestGateway;
pub use staging::SqliteStagingStore;
pub use sync::{BroadcastSyncNotifier, LoggingSyncNotifier, SyncEvent};
