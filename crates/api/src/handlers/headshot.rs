//! Handlers for headshot generation.
//!
//! These endpoints proxy to the configured [`HeadshotProvider`]: photo
//! upload, task creation, and a single status lookup. The server never
//! polls; the registration workflow drives polling from the client side.
//!
//! [`HeadshotProvider`]: eventconnect_youcam::HeadshotProvider

use axum::extract::{Multipart, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use eventconnect_core::error::CoreError;
use eventconnect_core::image_prep::ImageUpload;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart field carrying the photo.
const FILE_FIELD: &str = "file";

const DEFAULT_FILE_NAME: &str = "upload.jpg";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub file_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub task_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub task_id: Option<String>,
}

/// POST /api/v1/headshots/upload
///
/// Accept a multipart upload with a single `file` field and forward it to
/// the headshot provider.
pub async fn upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = field.bytes().await?;

        upload = Some(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let image = upload
        .ok_or_else(|| AppError::Core(CoreError::Validation("No file provided".into())))?;
    if image.bytes.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Uploaded file is empty".into(),
        )));
    }

    let file_id = state.headshots.upload(&image).await?;

    tracing::info!(
        file_id = %file_id,
        bytes = image.bytes.len(),
        provider = state.headshots.name(),
        "Headshot source uploaded",
    );

    Ok(Json(UploadResponse { file_id }))
}

/// POST /api/v1/headshots/generate
///
/// Start a headshot generation task for an uploaded file.
pub async fn start_generation(
    State(state): State<AppState>,
    Json(input): Json<GenerateRequest>,
) -> AppResult<impl IntoResponse> {
    let file_id = input.file_id.trim();
    if file_id.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "file_id is required".into(),
        )));
    }

    let task_id = state.headshots.start_generation(file_id).await?;

    tracing::info!(file_id, task_id = %task_id, "Headshot task started");

    Ok(Json(GenerateResponse { task_id }))
}

/// GET /api/v1/headshots/status?task_id=...
///
/// Return one status snapshot for a task, exactly as the provider reports it.
pub async fn task_status(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> AppResult<impl IntoResponse> {
    let task_id = params
        .task_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Core(CoreError::Validation("task_id is required".into())))?;

    let snapshot = state.headshots.task_status(task_id).await?;

    tracing::debug!(task_id, status = ?snapshot.task_status, "Headshot task status");

    Ok(Json(snapshot))
}
