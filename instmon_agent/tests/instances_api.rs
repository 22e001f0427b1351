use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use instmon_agent::api;
use instmon_agent::state::AppState;
use instmon_agent::store::InstanceStore;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    api::router(AppState::new(InstanceStore::open_in_memory().unwrap()))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let v = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, v)
}

#[tokio::test]
async fn create_list_delete() {
    let app = app();

    let (st, created) = call(
        &app,
        "POST",
        "/instances",
        Some(json!({"name": "a", "ip": "1.2.3.4"})),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED);
    assert_eq!(created["name"], "a");
    assert_eq!(created["ip"], "1.2.3.4");
    let id = created["id"].as_i64().expect("numeric id");

    let (st, list) = call(&app, "GET", "/instances", None).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(list, json!([{"id": id, "name": "a", "ip": "1.2.3.4"}]));

    let (st, body) = call(&app, "DELETE", &format!("/instances?id={id}"), None).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (_, list) = call(&app, "GET", "/instances", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn delete_is_idempotent() {
    let app = app();
    for uri in ["/instances?id=12345", "/instances?id=abc", "/instances"] {
        let (st, body) = call(&app, "DELETE", uri, None).await;
        assert_eq!(st, StatusCode::OK, "{uri}");
        assert_eq!(body, json!({"success": true}));
    }
}

#[tokio::test]
async fn other_methods_are_rejected() {
    let app = app();
    for method in ["PUT", "PATCH"] {
        let (st, body) = call(&app, method, "/instances", None).await;
        assert_eq!(st, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({"error": "Method not allowed"}));
    }
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = app();
    let (st, body) = call(&app, "POST", "/instances", Some(json!({"name": "only"}))).await;
    assert_eq!(st, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn api_prefix_is_an_alias() {
    let app = app();
    let (st, _) = call(
        &app,
        "POST",
        "/api/instances",
        Some(json!({"name": "b", "ip": "10.0.0.1"})),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED);
    let (_, list) = call(&app, "GET", "/instances", None).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
}
