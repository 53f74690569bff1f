pub mod monitor;
pub mod probe;

pub use monitor::{ConnectivityEvent, ConnectivityMonitor};
pub use probe::HttpConnectivityProbe;
