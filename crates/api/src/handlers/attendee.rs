//! Handler for persisting confirmed attendee profiles.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use eventconnect_core::error::CoreError;
use eventconnect_core::registration::AttendeeSubmission;
use eventconnect_db::models::attendee::CreateAttendeeProfile;
use eventconnect_db::repositories::{AttendeeProfileRepo, EventRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/attendees
///
/// Store a reviewed attendee profile for an existing event. Returns 201 with
/// the stored row.
pub async fn create_attendee(
    State(state): State<AppState>,
    Json(input): Json<AttendeeSubmission>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let event = EventRepo::find_by_id(&state.pool, input.event_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Event",
                key: input.event_id.to_string(),
            })
        })?;

    let profile = AttendeeProfileRepo::create(
        &state.pool,
        &CreateAttendeeProfile {
            event_id: event.id,
            name: input.name.trim().to_string(),
            role: input.role.trim().to_string(),
            company: input.company.trim().to_string(),
            linkedin: input
                .linkedin
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            headshot_url: input.image_url,
        },
    )
    .await?;

    tracing::info!(
        attendee_id = profile.id,
        event_id = event.id,
        slug = %event.slug,
        "Attendee registered",
    );

    Ok((StatusCode::CREATED, Json(profile)))
}
