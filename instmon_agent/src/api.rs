//! Instance API: list, create and delete rows of the instance table.

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, MethodRouter},
    Json, Router,
};
use serde_json::json;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{Instance, NewInstance};

pub fn router(state: AppState) -> Router {
    let instances: MethodRouter<AppState> = get(list_instances)
        .post(create_instance)
        .delete(delete_instance)
        .fallback(method_not_allowed);

    Router::new()
        .route("/instances", instances.clone())
        // path the web dashboard pages call
        .route("/api/instances", instances)
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

async fn list_instances(State(state): State<AppState>) -> Result<Json<Vec<Instance>>, ApiError> {
    Ok(Json(state.store.list()?))
}

async fn create_instance(
    State(state): State<AppState>,
    body: Result<Json<NewInstance>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let inst = state.store.create(&req.name, &req.ip)?;
    Ok((StatusCode::CREATED, Json(inst)))
}

// Always succeeds: a missing or unparsable id simply matches no row.
async fn delete_instance(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    match q.get("id").and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(id) => {
            state.store.delete(id)?;
        }
        None => debug!("delete without a usable id: {:?}", q.get("id")),
    }
    Ok(Json(json!({ "success": true })))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
