mod common;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use common::mock_remote::spawn_mock_remote;
use common::wait_for;
use tempfile::TempDir;
use trackit_sync::application::ports::{ConnectivityState, StagingStore};
use trackit_sync::domain::entities::{PassOutcome, StagedRecord};
use trackit_sync::domain::value_objects::{
    EntityKind, InventoryLinePayload, ItemPayload, RecordId, RecordPayload, SyncStatus,
};
use trackit_sync::infrastructure::HttpConnectivityProbe;
use trackit_sync::{AppConfig, SyncEngine};

fn engine_config(dir: &Path, remote_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = format!("sqlite:{}?mode=rwc", dir.join("trackit.db").display());
    config.database.max_connections = 2;
    config.remote.base_url = remote_url.to_string();
    config.remote.request_timeout = 5;
    config.connectivity.debounce_ms = 20;
    config.connectivity.start_online = false;
    config
}

async fn stage(store: &dyn StagingStore, local_id: &str, payload: impl Into<RecordPayload>) {
    let record = StagedRecord::new_local(payload)
        .with_local_id(RecordId::new(local_id.to_string()).unwrap());
    store.insert(&record).await.unwrap();
}

async fn is_synced(store: &dyn StagingStore, kind: EntityKind, id: &str) -> bool {
    store
        .get(kind, id)
        .await
        .ok()
        .flatten()
        .is_some_and(|record| record.sync_status == SyncStatus::Synced)
}

#[tokio::test]
async fn staged_records_survive_a_restart_and_sync_on_reconnect() {
    let dir = TempDir::new().unwrap();
    let (remote_url, remote) = spawn_mock_remote().await;
    let config = engine_config(dir.path(), &remote_url);

    {
        let engine = SyncEngine::open(&config).await.unwrap();
        let store = engine.staging();
        stage(store.as_ref(), "local-1700-abc", ItemPayload::new("W-1", "Widget")).await;
        stage(
            store.as_ref(),
            "local-1700-inv",
            InventoryLinePayload::new("local-1700-abc", "wh-1", 5),
        )
        .await;

        let report = engine.request_sync().await;
        assert_eq!(report.outcome, PassOutcome::SkippedOffline);
        engine.shutdown().await;
    }

    let engine = SyncEngine::open(&config).await.unwrap();
    let store = engine.staging();
    let pending = store
        .list_by_status(EntityKind::Item, SyncStatus::Pending)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);

    engine.start();
    engine.monitor().set_online(true);

    let store_ref = store.as_ref();
    let synced = wait_for(Duration::from_secs(3), || async move {
        is_synced(store_ref, EntityKind::InventoryLine, "local-1700-inv").await
    })
    .await;
    assert!(synced, "reconnect should have triggered a sync pass");

    let item = store
        .get(EntityKind::Item, "local-1700-abc")
        .await
        .unwrap()
        .unwrap();
    let server_id = item.server_id.clone().unwrap();
    let line = store
        .get(EntityKind::InventoryLine, "local-1700-inv")
        .await
        .unwrap()
        .unwrap();
    assert!(line.payload.references(EntityKind::Item, &server_id));

    let pushed = remote.requests_for("inventory");
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].body["item_id"], server_id.as_str());

    engine.shutdown().await;
    drop(engine);

    let reopened = SyncEngine::open(&config).await.unwrap();
    let item = reopened
        .staging()
        .get(EntityKind::Item, &server_id)
        .await
        .unwrap()
        .expect("synced record is addressable by server id");
    assert_eq!(item.local_id.as_str(), "local-1700-abc");
    assert_eq!(item.sync_status, SyncStatus::Synced);
    reopened.shutdown().await;
}

#[tokio::test]
async fn health_probe_drives_the_reconnect_edge() {
    let dir = TempDir::new().unwrap();
    let (remote_url, remote) = spawn_mock_remote().await;
    remote.set_healthy(false);
    let config = engine_config(dir.path(), &remote_url);

    let engine = SyncEngine::open(&config).await.unwrap();
    let store = engine.staging();
    stage(store.as_ref(), "local-1700-abc", ItemPayload::new("W-1", "Widget")).await;

    let probe = HttpConnectivityProbe::new(
        reqwest::Client::new(),
        format!("{remote_url}/rest/v1/"),
        Duration::from_millis(20),
    );
    engine.attach_source(Arc::new(probe));
    engine.start();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!engine.monitor().is_connected());
    assert!(remote.requests_for("items").is_empty());

    remote.set_healthy(true);
    let store_ref = store.as_ref();
    let synced = wait_for(Duration::from_secs(3), || async move {
        is_synced(store_ref, EntityKind::Item, "local-1700-abc").await
    })
    .await;
    assert!(synced);
    assert_eq!(remote.requests_for("items").len(), 1);

    let engine_ref = &engine;
    let reported = wait_for(Duration::from_secs(1), || async move {
        engine_ref.status().await.last_report.is_some()
    })
    .await;
    assert!(reported);
    let status = engine.status().await;
    assert_eq!(
        status.last_report.map(|report| report.outcome),
        Some(PassOutcome::Completed)
    );
    engine.shutdown().await;
}

#[tokio::test]
async fn shutdown_stops_reacting_to_connectivity() {
    let dir = TempDir::new().unwrap();
    let (remote_url, remote) = spawn_mock_remote().await;
    let config = engine_config(dir.path(), &remote_url);

    let engine = SyncEngine::open(&config).await.unwrap();
    stage(
        engine.staging().as_ref(),
        "local-1700-abc",
        ItemPayload::new("W-1", "Widget"),
    )
    .await;
    engine.start();
    engine.shutdown().await;

    engine.monitor().set_online(true);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(remote.requests().is_empty());
}

#[tokio::test]
async fn shutdown_right_after_start_does_not_abort_a_pass() {
    let dir = TempDir::new().unwrap();
    let (remote_url, remote) = spawn_mock_remote().await;
    let mut config = engine_config(dir.path(), &remote_url);
    config.connectivity.start_online = true;

    let engine = SyncEngine::open(&config).await.unwrap();
    stage(
        engine.staging().as_ref(),
        "local-1700-abc",
        ItemPayload::new("W-1", "Widget"),
    )
    .await;

    engine.start();
    engine.shutdown().await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let status = engine.status().await;
    assert_eq!(status.sync_errors, 0);
    assert!(!status.is_syncing);
    match status.last_report.map(|report| report.outcome) {
        None => assert!(remote.requests().is_empty()),
        Some(outcome) => assert_eq!(outcome, PassOutcome::Completed),
    }

    let report = engine.request_sync().await;
    assert_eq!(report.outcome, PassOutcome::SkippedClosed);
}
