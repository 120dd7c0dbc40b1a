//! JWT-based authentication extractor for organizer endpoints.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use eventconnect_core::error::CoreError;
use uuid::Uuid;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Organizer extracted from a JWT Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(organizer: Organizer) -> AppResult<Json<()>> {
///     tracing::info!(organizer_id = %organizer.organizer_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Organizer {
    /// The organizer's user id (from `claims.sub`).
    pub organizer_id: Uuid,
}

impl FromRequestParts<AppState> for Organizer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected organizer token");
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(Organizer {
            organizer_id: claims.sub,
        })
    }
}
