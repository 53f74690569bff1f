use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use trackit_sync::infrastructure::HttpConnectivityProbe;
use trackit_sync::shared::metrics;
use trackit_sync::{init_logging, AppConfig, SyncEngine};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = AppConfig::from_env();
    config.validate().map_err(|err| anyhow!(err))?;
    ensure_database_dir(&config.database.url)?;

    info!(
        remote = %config.remote.base_url,
        max_concurrency = config.sync.max_concurrency,
        auto_requeue = config.sync.auto_requeue_transient,
        "trackit sync agent starting"
    );

    let engine = SyncEngine::open(&config)
        .await
        .context("failed to open the sync engine")?;

    let probe = HttpConnectivityProbe::from_config(&config.connectivity, &config.remote)
        .context("failed to build the connectivity probe")?;
    info!(url = probe.url(), "watching connectivity");
    engine.attach_source(Arc::new(probe));
    engine.start();

    tokio::signal::ctrl_c().await?;
    info!("shutting down sync agent...");

    engine.shutdown().await;
    let snapshot = metrics::snapshot();
    info!(
        completed = snapshot.passes_completed,
        aborted = snapshot.passes_aborted,
        synced = snapshot.records_synced,
        errored = snapshot.records_errored,
        "sync agent stopped"
    );
    Ok(())
}

/// Creates the parent directory of a file-backed SQLite URL.
fn ensure_database_dir(url: &str) -> Result<()> {
    let Some(rest) = url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let path = rest.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}
