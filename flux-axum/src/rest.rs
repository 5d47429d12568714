use std::path::{Component, Path as FsPath};

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post, put},
    Json, Router,
};
use bytes::Bytes;
use flux_blob::UploadReceipt;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{FluxAxumError, FluxAxumState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartUploadRequest {
    pub file_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartUploadResponse {
    pub upload_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChunkResponse {
    pub chunk: String,
}

/// Upload ids arrive percent-decoded and become artifact names, so they
/// must be exactly one plain path component.
fn ensure_plain_upload_id(upload_id: &str) -> Result<(), FluxAxumError> {
    let mut components = FsPath::new(upload_id).components();
    let plain = !upload_id.contains(['/', '\\', '\0'])
        && matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none();
    if plain {
        Ok(())
    } else {
        Err(FluxAxumError::bad_request("Invalid upload identifier")
            .with_errors(json!({ "uploadId": [upload_id] })))
    }
}

/// Routes for the chunked upload protocol, relative to where they are nested
pub fn upload_router(state: FluxAxumState) -> Router<()> {
    Router::new()
        .route("/", post(start_upload))
        .route("/{upload_id}/chunks/{index}", put(upload_chunk))
        .route("/{upload_id}/complete", post(complete_upload))
        .route("/{upload_id}", delete(cancel_upload))
        .with_state(state)
}

async fn start_upload(
    State(state): State<FluxAxumState>,
    body: Result<Json<StartUploadRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StartUploadResponse>), FluxAxumError> {
    let Json(request) = body?;
    let upload_id = state.uploads().start_upload(&request.file_name).await?;
    Ok((StatusCode::CREATED, Json(StartUploadResponse { upload_id })))
}

async fn upload_chunk(
    State(state): State<FluxAxumState>,
    path: Result<Path<(String, u64)>, PathRejection>,
    body: Bytes,
) -> Result<Json<ChunkResponse>, FluxAxumError> {
    let Path((upload_id, index)) = path?;
    ensure_plain_upload_id(&upload_id)?;
    let chunk = state.uploads().upload_chunk(&upload_id, body, index).await?;
    Ok(Json(ChunkResponse { chunk }))
}

async fn complete_upload(
    State(state): State<FluxAxumState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<UploadReceipt>, FluxAxumError> {
    let Path(upload_id) = path?;
    ensure_plain_upload_id(&upload_id)?;
    let receipt = state.uploads().complete_upload(&upload_id).await?;
    Ok(Json(receipt))
}

async fn cancel_upload(
    State(state): State<FluxAxumState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, FluxAxumError> {
    let Path(upload_id) = path?;
    ensure_plain_upload_id(&upload_id)?;
    state.uploads().cancel_upload(&upload_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
