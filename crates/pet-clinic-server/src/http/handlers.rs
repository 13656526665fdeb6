//! Client endpoints.

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use pet_clinic_core::{validate_create, validate_update};
use serde_json::{json, Value};
use tracing::info;

use super::envelope::{success, ApiFailure};
use super::list_query::parse_list_params;
use crate::AppState;

type HandlerResult = Result<Response, ApiFailure>;

pub(crate) async fn healthz_handler() -> Response {
    success(StatusCode::OK, json!({"status": "ok"}))
}

pub(crate) async fn route_not_found_handler() -> ApiFailure {
    ApiFailure::new(StatusCode::NOT_FOUND, "Route not found", None)
}

pub(crate) async fn method_not_allowed_handler() -> ApiFailure {
    ApiFailure::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None)
}

pub(crate) async fn list_clients_handler(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> HandlerResult {
    let Query(pairs) = query.map_err(|e| {
        ApiFailure::bad_request("Invalid query string", Some(vec![e.body_text()]))
    })?;
    let params = parse_list_params(&pairs)?;

    let clients = state
        .store
        .list_ordered(&params.filters, params.order)
        .await
        .map_err(|e| ApiFailure::from_store(e, "Failed to fetch clients"))?;
    Ok(success(StatusCode::OK, clients))
}

pub(crate) async fn get_client_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> HandlerResult {
    let id = client_id(path)?;
    let client = state
        .store
        .get_by_id(&id)
        .await
        .map_err(|e| ApiFailure::from_store(e, "Failed to fetch client"))?
        .ok_or_else(ApiFailure::not_found)?;
    Ok(success(StatusCode::OK, client))
}

pub(crate) async fn create_client_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> HandlerResult {
    let payload = parse_json_body(body)?;
    let input = validate_create(&payload).map_err(ApiFailure::validation)?;

    let client = state
        .store
        .add(input)
        .await
        .map_err(|e| ApiFailure::from_store(e, "Failed to create client"))?;
    info!(client_id = %client.id, "client created");
    Ok(success(StatusCode::CREATED, client))
}

pub(crate) async fn update_client_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> HandlerResult {
    let id = client_id(path)?;
    let payload = parse_json_body(body)?;
    let patch = validate_update(&payload).map_err(ApiFailure::validation)?;
    let fields = patch.field_count();

    let client = state
        .store
        .update(&id, patch)
        .await
        .map_err(|e| ApiFailure::from_store(e, "Failed to update client"))?
        .ok_or_else(ApiFailure::not_found)?;
    info!(client_id = %client.id, fields, "client updated");
    Ok(success(StatusCode::OK, client))
}

pub(crate) async fn delete_client_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> HandlerResult {
    let id = client_id(path)?;
    let deleted = state
        .store
        .remove(&id)
        .await
        .map_err(|e| ApiFailure::from_store(e, "Failed to delete client"))?;
    if !deleted {
        return Err(ApiFailure::not_found());
    }
    info!(client_id = %id, "client deleted");
    Ok(success(StatusCode::OK, json!({"deleted": true})))
}

/// Read the raw body as JSON. Oversized or unreadable bodies keep the
/// rejection's status; anything that is not JSON is a 400.
fn parse_json_body(body: Result<Bytes, BytesRejection>) -> Result<Value, ApiFailure> {
    let bytes = body.map_err(|e| {
        ApiFailure::new(e.status(), "Invalid request body", Some(vec![e.body_text()]))
    })?;
    serde_json::from_slice(&bytes).map_err(|_| ApiFailure::invalid_json())
}

fn client_id(path: Result<Path<String>, PathRejection>) -> Result<String, ApiFailure> {
    let Path(id) = path.map_err(|e| {
        ApiFailure::new(e.status(), "Invalid client id", Some(vec![e.body_text()]))
    })?;
    Ok(id)
}
