pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
mod state;

pub use application::ports::{RemoteError, RemoteGateway, StagingStore};
pub use domain::entities::{PassOutcome, StagedRecord, SyncReport};
pub use domain::value_objects::{EntityKind, RecordId, RecordPayload, SyncStatus};
pub use shared::{AppConfig, AppError, Result};
pub use state::SyncEngine;

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trackit_sync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
