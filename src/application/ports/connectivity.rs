use async_trait::async_trait;
use std::sync::Arc;

/// Read side of the connectivity signal.
pub trait ConnectivityState: Send + Sync {
    fn is_connected(&self) -> bool;
}

/// Receives raw online/offline observations.
pub trait ConnectivitySink: Send + Sync {
    fn report(&self, online: bool);
}

/// Host-side producer of connectivity observations (OS events, a health probe, ...).
#[async_trait]
pub trait ConnectivitySource: Send + Sync {
    /// Feeds observations into `sink` until the surrounding task is aborted.
    async fn run(&self, sink: Arc<dyn ConnectivitySink>);
}
