pub mod ports;
pub mod services;

pub use services::{IdRemapper, RetryPolicy, SyncService};
