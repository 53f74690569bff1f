mod common;

use std::time::Duration;

use common::mock_remote::spawn_mock_remote;
use tokio::net::TcpListener;
use trackit_sync::application::ports::{RemoteError, RemoteGateway};
use trackit_sync::domain::value_objects::{
    ActivityLogPayload, EntityKind, InventoryLinePayload, ItemPayload, RecordPayload,
    WarehousePayload,
};
use trackit_sync::infrastructure::PostgrestGateway;
use trackit_sync::shared::config::RemoteConfig;

fn gateway(base_url: &str, kind: EntityKind) -> PostgrestGateway {
    PostgrestGateway::new(
        reqwest::Client::new(),
        base_url,
        Some("anon-key".to_string()),
        kind,
    )
}

#[tokio::test]
async fn create_posts_the_row_and_returns_the_server_id() {
    let (base_url, remote) = spawn_mock_remote().await;
    let items = gateway(&base_url, EntityKind::Item);

    let payload = RecordPayload::from(ItemPayload::new("W-1", "Widget"));
    let id = items.create(&payload).await.unwrap();
    assert_eq!(id, "srv-1");

    let requests = remote.requests_for("items");
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.api_key.as_deref(), Some("anon-key"));
    assert_eq!(request.authorization.as_deref(), Some("Bearer anon-key"));
    assert_eq!(request.prefer.as_deref(), Some("return=representation"));
    assert_eq!(request.body["name"], "Widget");
    assert!(request.body.get("id").is_none());
    assert!(request.body.get("sync_status").is_none());
}

#[tokio::test]
async fn update_patches_by_id_filter() {
    let (base_url, remote) = spawn_mock_remote().await;
    let lines = gateway(&base_url, EntityKind::InventoryLine);

    let payload = RecordPayload::from(InventoryLinePayload::new("srv-9", "srv-wh", 7));
    lines.update("srv-3", &payload).await.unwrap();

    let requests = remote.requests_for("inventory");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "PATCH");
    assert_eq!(
        requests[0].query.get("id").map(String::as_str),
        Some("eq.srv-3")
    );
    assert_eq!(requests[0].body["quantity"], 7);
}

#[tokio::test]
async fn update_matching_no_row_is_rejected() {
    let (base_url, remote) = spawn_mock_remote().await;
    remote.forget_id("srv-gone");
    let items = gateway(&base_url, EntityKind::Item);

    let err = items
        .update("srv-gone", &ItemPayload::new("W-1", "Widget").into())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Rejected(_)));
}

#[tokio::test]
async fn conflict_is_rejected_and_server_errors_are_unavailable() {
    let (base_url, remote) = spawn_mock_remote().await;
    remote.reject_table("warehouses");
    remote.fail_table("items");

    let err = gateway(&base_url, EntityKind::Warehouse)
        .create(&WarehousePayload::new("Main").into())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Rejected(ref msg) if msg.contains("23505")));

    let err = gateway(&base_url, EntityKind::Item)
        .create(&ItemPayload::new("W-1", "Widget").into())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Unavailable(_)));
}

#[tokio::test]
async fn unreachable_remote_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = gateway(&format!("http://{addr}"), EntityKind::Item)
        .create(&ItemPayload::new("W-1", "Widget").into())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Unavailable(_)));
}

#[tokio::test]
async fn activity_logs_are_never_patched() {
    let (base_url, remote) = spawn_mock_remote().await;
    let logs = gateway(&base_url, EntityKind::ActivityLog);

    let payload = RecordPayload::from(ActivityLogPayload::new("create", "item", "srv-9"));
    let err = logs.update("srv-log", &payload).await.unwrap_err();
    assert!(matches!(err, RemoteError::Rejected(_)));
    assert!(remote.requests().is_empty());

    assert_eq!(logs.create(&payload).await.unwrap(), "srv-1");
}

#[tokio::test]
async fn payload_of_another_kind_is_rejected_locally() {
    let (base_url, remote) = spawn_mock_remote().await;
    let items = gateway(&base_url, EntityKind::Item);

    let err = items
        .create(&WarehousePayload::new("Main").into())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Rejected(_)));
    assert!(remote.requests().is_empty());
}

#[tokio::test]
async fn registry_covers_every_kind() {
    let registry = PostgrestGateway::registry(&RemoteConfig {
        base_url: "http://127.0.0.1:9".into(),
        api_key: None,
        request_timeout: 1,
    })
    .unwrap();
    assert!(registry.ensure_complete().is_ok());
}

#[tokio::test]
async fn request_timeout_is_reported_as_unavailable() {
    use axum::{Router, routing::post};

    let app = Router::new().route(
        "/rest/v1/items",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "[]"
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let items = PostgrestGateway::new(client, format!("http://{addr}"), None, EntityKind::Item);
    let err = items
        .create(&ItemPayload::new("W-1", "Widget").into())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Unavailable(_)));
}
