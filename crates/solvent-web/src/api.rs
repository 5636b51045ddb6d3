use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use solvent::dto::NotebookDto;
use solvent::Notebook;
use solvent_store::{NotebookRepository, StoreError};
use uuid::Uuid;

use crate::AppState;

// ── Handlers ────────────────────────────────────────────────────────

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

pub async fn create_notebook<R: NotebookRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Response {
    match state.service.create() {
        Ok(notebook) => Json(NotebookDto::from(&notebook)).into_response(),
        Err(e) => store_error_response(e),
    }
}

pub async fn fetch_notebook<R: NotebookRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.service.fetch(id) {
        Ok(notebook) => Json(NotebookDto::from(&notebook)).into_response(),
        Err(e) => store_error_response(e),
    }
}

pub async fn update_notebook<R: NotebookRepository>(
    State(state): State<Arc<AppState<R>>>,
    body: Bytes,
) -> Response {
    let notebook = match decode_notebook(&body) {
        Ok(notebook) => notebook,
        Err(resp) => return resp,
    };
    match state.service.update(&notebook) {
        Ok(merged) => Json(NotebookDto::from(&merged)).into_response(),
        Err(e) => store_error_response(e),
    }
}

pub async fn remove_notebook<R: NotebookRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.service.remove(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error_response(e),
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn parse_id(raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw).map_err(|e| bad_request(format!("invalid notebook id '{raw}': {e}")))
}

fn decode_notebook(body: &[u8]) -> Result<Notebook, Response> {
    let dto: NotebookDto = serde_json::from_slice(body)
        .map_err(|e| bad_request(format!("invalid notebook body: {e}")))?;
    Notebook::try_from(dto).map_err(|e| bad_request(format!("invalid notebook body: {e}")))
}

fn bad_request(msg: String) -> Response {
    tracing::debug!(error = %msg, "rejected request");
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": msg})),
    )
        .into_response()
}

fn store_error_response(err: StoreError) -> Response {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        tracing::error!(error = %err, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(serde_json::json!({"error": err.to_string()}))).into_response()
}
