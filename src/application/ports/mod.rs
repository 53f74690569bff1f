pub mod connectivity;
pub mod remote_gateway;
pub mod staging_store;
pub mod sync_notifier;

pub use connectivity::{ConnectivitySink, ConnectivitySource, ConnectivityState};
pub use remote_gateway::{GatewayRegistry, RemoteError, RemoteGateway};
pub use staging_store::StagingStore;
pub use sync_notifier::SyncNotifier;
