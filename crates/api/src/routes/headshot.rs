//! Route definitions for headshot generation, mounted at `/headshots`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::headshot;
use crate::state::AppState;

/// ```text
/// POST   /upload             -> upload_photo
/// POST   /generate           -> start_generation
/// GET    /status             -> task_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(headshot::upload_photo))
        .route("/generate", post(headshot::start_generation))
        .route("/status", get(headshot::task_status))
}
