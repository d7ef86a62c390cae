use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use mizar::lambda::{Dispatcher, FunctionEvent};
use mizar::server::router::AppState;
use serde_json::Value;
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

const API_KEY: &str = "pwd";

async fn test_state(tag: &str) -> (AppState, PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!("mizar-{tag}-{}-{nanos}.sqlite", std::process::id()));

    let database_url = format!("sqlite:{}", temp_path.display());
    let pool = mizar::db::connect(&database_url, 5).await.unwrap();

    (AppState::new(pool, Arc::from(API_KEY)), temp_path)
}

async fn cleanup(db_path: PathBuf) {
    let wal_path = PathBuf::from(format!("{}-wal", db_path.to_string_lossy()));
    let shm_path = PathBuf::from(format!("{}-shm", db_path.to_string_lossy()));
    let _ = tokio::fs::remove_file(&wal_path).await;
    let _ = tokio::fs::remove_file(&shm_path).await;
    tokio::fs::remove_file(&db_path).await.unwrap();
}

fn authed_headers() -> HashMap<String, String> {
    HashMap::from([
        ("content-type".to_string(), "application/json".to_string()),
        ("x-api-key".to_string(), API_KEY.to_string()),
    ])
}

fn event(method: &str, path: &str, body: Option<&str>) -> FunctionEvent {
    FunctionEvent {
        http_method: method.to_string(),
        path: path.to_string(),
        headers: authed_headers(),
        query: HashMap::new(),
        body: body.map(str::to_string),
        is_base64_encoded: false,
        request_id: None,
    }
}

#[tokio::test]
async fn create_then_get_through_the_adapter() {
    let (state, db_path) = test_state("lambda-crud").await;
    let dispatcher = Dispatcher::api(state);

    let resp = dispatcher
        .dispatch(event(
            "POST",
            "/users",
            Some(r#"{"name":"Alice","email":"alice@example.com"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status_code, 201);
    assert!(!resp.is_base64_encoded);
    assert_eq!(
        resp.headers.get("content-type").map(String::as_str),
        Some("application/json")
    );

    let created: Value = serde_json::from_str(&resp.body).unwrap();
    let id = created["id"].as_i64().unwrap();

    let resp = dispatcher
        .dispatch(event("GET", &format!("/users/{id}"), None))
        .await
        .unwrap();
    assert_eq!(resp.status_code, 200);
    let fetched: Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(fetched["email"], "alice@example.com");

    let resp = dispatcher
        .dispatch(event("GET", "/users/4242", None))
        .await
        .unwrap();
    assert_eq!(resp.status_code, 404);

    cleanup(db_path).await;
}

#[tokio::test]
async fn camel_case_events_and_query_auth_are_understood() {
    let (state, db_path) = test_state("lambda-camel").await;
    let dispatcher = Dispatcher::api(state);

    // Gateway-style encoding: camelCase keys, auth via ?key=.
    let raw = format!(
        r#"{{
            "httpMethod": "GET",
            "path": "/users",
            "queryStringParameters": {{"key": "{API_KEY}", "limit": "10"}},
            "isBase64Encoded": false,
            "requestId": "req-123"
        }}"#
    );
    let event: FunctionEvent = serde_json::from_str(&raw).unwrap();
    assert_eq!(event.request_id.as_deref(), Some("req-123"));

    let resp = dispatcher.dispatch(event).await.unwrap();
    assert_eq!(resp.status_code, 200);
    // The platform-assigned id is reflected for correlation.
    assert_eq!(
        resp.headers.get("x-request-id").map(String::as_str),
        Some("req-123")
    );

    let body: Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(body["limit"], 10);

    cleanup(db_path).await;
}

#[tokio::test]
async fn base64_bodies_are_decoded_before_dispatch() {
    let (state, db_path) = test_state("lambda-b64").await;
    let dispatcher = Dispatcher::api(state);

    let payload = r#"{"name":"Encoded","email":"encoded@example.com"}"#;
    let mut event = event("POST", "/users", None);
    event.body = Some(BASE64.encode(payload));
    event.is_base64_encoded = true;

    let resp = dispatcher.dispatch(event).await.unwrap();
    assert_eq!(resp.status_code, 201);

    cleanup(db_path).await;
}

#[tokio::test]
async fn deployable_units_only_expose_their_own_resource() {
    let (state, db_path) = test_state("lambda-units").await;
    let users_unit = Dispatcher::users(state.clone());
    let todos_unit = Dispatcher::todos(state);

    let resp = users_unit
        .dispatch(event("GET", "/users", None))
        .await
        .unwrap();
    assert_eq!(resp.status_code, 200);

    // The users unit does not route todos, and vice versa.
    let resp = users_unit
        .dispatch(event("GET", "/todos", None))
        .await
        .unwrap();
    assert_eq!(resp.status_code, 404);

    let resp = todos_unit
        .dispatch(event("GET", "/users", None))
        .await
        .unwrap();
    assert_eq!(resp.status_code, 404);

    // Both still answer the health route.
    let resp = todos_unit.dispatch(event("GET", "/", None)).await.unwrap();
    assert_eq!(resp.status_code, 200);

    cleanup(db_path).await;
}

#[tokio::test]
async fn malformed_events_are_rejected_by_the_adapter() {
    let (state, db_path) = test_state("lambda-bad").await;
    let dispatcher = Dispatcher::api(state);

    let mut bad_method = event("GET", "/", None);
    bad_method.http_method = "NOT A METHOD".to_string();
    assert!(dispatcher.dispatch(bad_method).await.is_err());

    let mut bad_body = event("POST", "/users", None);
    bad_body.body = Some("###not-base64###".to_string());
    bad_body.is_base64_encoded = true;
    assert!(dispatcher.dispatch(bad_body).await.is_err());

    cleanup(db_path).await;
}
