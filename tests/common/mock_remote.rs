use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub method: &'static str,
    pub table: String,
    pub query: HashMap<String, String>,
    pub api_key: Option<String>,
    pub authorization: Option<String>,
    pub prefer: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct MockRemoteInner {
    requests: Vec<ReceivedRequest>,
    next_id: u64,
    unhealthy: bool,
    rejected_tables: HashSet<String>,
    unavailable_tables: HashSet<String>,
    missing_ids: HashSet<String>,
}

/// Minimal PostgREST stand-in: inserts get `srv-<n>` ids, patches echo the id.
#[derive(Clone, Default)]
pub struct MockRemote {
    inner: Arc<Mutex<MockRemoteInner>>,
}

impl MockRemote {
    pub fn requests(&self) -> Vec<ReceivedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn requests_for(&self, table: &str) -> Vec<ReceivedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.table == table)
            .collect()
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.inner.lock().unwrap().unhealthy = !healthy;
    }

    pub fn reject_table(&self, table: &str) {
        self.inner
            .lock()
            .unwrap()
            .rejected_tables
            .insert(table.to_string());
    }

    pub fn fail_table(&self, table: &str) {
        self.inner
            .lock()
            .unwrap()
            .unavailable_tables
            .insert(table.to_string());
    }

    pub fn forget_id(&self, id: &str) {
        self.inner
            .lock()
            .unwrap()
            .missing_ids
            .insert(id.to_string());
    }
}

pub async fn spawn_mock_remote() -> (String, MockRemote) {
    let remote = MockRemote::default();
    let app = Router::new()
        .route("/rest/v1/", get(health))
        .route("/rest/v1/:table", post(insert_row).patch(update_rows))
        .with_state(remote.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock remote");
    let addr = listener.local_addr().expect("mock remote addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock remote server");
    });

    (format!("http://{addr}"), remote)
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn received(
    method: &'static str,
    table: String,
    query: HashMap<String, String>,
    headers: &HeaderMap,
    body: Value,
) -> ReceivedRequest {
    ReceivedRequest {
        method,
        table,
        query,
        api_key: header(headers, "apikey"),
        authorization: header(headers, "authorization"),
        prefer: header(headers, "prefer"),
        body,
    }
}

async fn health(State(remote): State<MockRemote>) -> StatusCode {
    if remote.inner.lock().unwrap().unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

async fn insert_row(
    State(remote): State<MockRemote>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = remote.inner.lock().unwrap();
    inner.requests.push(received(
        "POST",
        table.clone(),
        HashMap::new(),
        &headers,
        body.clone(),
    ));

    if inner.unavailable_tables.contains(&table) {
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream unavailable").into_response();
    }
    if inner.rejected_tables.contains(&table) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"code": "23505", "message": "duplicate key value"})),
        )
            .into_response();
    }

    inner.next_id += 1;
    let mut row = body;
    if let Some(fields) = row.as_object_mut() {
        fields.insert("id".into(), json!(format!("srv-{}", inner.next_id)));
    }
    (StatusCode::CREATED, Json(json!([row]))).into_response()
}

async fn update_rows(
    State(remote): State<MockRemote>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = remote.inner.lock().unwrap();
    inner.requests.push(received(
        "PATCH",
        table.clone(),
        query.clone(),
        &headers,
        body.clone(),
    ));

    if inner.unavailable_tables.contains(&table) {
        return StatusCode::BAD_GATEWAY.into_response();
    }

    let id = query
        .get("id")
        .and_then(|filter| filter.strip_prefix("eq."))
        .unwrap_or_default()
        .to_string();
    if id.is_empty() || inner.missing_ids.contains(&id) {
        return (StatusCode::OK, Json(json!([]))).into_response();
    }

    let mut row = body;
    if let Some(fields) = row.as_object_mut() {
        fields.insert("id".into(), json!(id));
    }
    (StatusCode::OK, Json(json!([row]))).into_response()
}
