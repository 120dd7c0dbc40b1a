//! Handlers for events.
//!
//! Public reads (listing, detail by slug, attendee directory) and
//! organizer-only creation.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use eventconnect_core::error::CoreError;
use eventconnect_core::types::DbId;
use eventconnect_core::validation::{validate_http_url, validate_required, validate_slug};
use eventconnect_db::models::attendee::AttendeeProfile;
use eventconnect_db::models::event::{CreateEvent, Event, EventWithAttendees};
use eventconnect_db::repositories::{AttendeeProfileRepo, EventRepo};
use eventconnect_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::Organizer;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/v1/events
///
/// List all events, newest first, each with its attendees.
pub async fn list_events(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let events = EventRepo::list(&state.pool).await?;
    let events = attach_attendees(&state.pool, events).await?;
    Ok(Json(events))
}

/// GET /api/v1/events/{slug}
pub async fn get_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let event = find_by_slug(&state.pool, &slug).await?;
    let attendees = AttendeeProfileRepo::list_by_event(&state.pool, event.id).await?;
    Ok(Json(EventWithAttendees { event, attendees }))
}

/// GET /api/v1/events/{slug}/attendees
///
/// The attendee directory for one event, in registration order.
pub async fn list_event_attendees(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let event = find_by_slug(&state.pool, &slug).await?;
    let attendees = AttendeeProfileRepo::list_by_event(&state.pool, event.id).await?;
    Ok(Json(attendees))
}

// ---------------------------------------------------------------------------
// Organizer
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/events
///
/// Events owned by the calling organizer, with attendees.
pub async fn list_my_events(
    organizer: Organizer,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let events = EventRepo::list_by_organizer(&state.pool, organizer.organizer_id).await?;
    let events = attach_attendees(&state.pool, events).await?;
    Ok(Json(events))
}

/// POST /api/v1/admin/events
///
/// Create an event owned by the calling organizer. A duplicate slug is
/// rejected with 409 by the `uq_events_slug` constraint.
pub async fn create_event(
    organizer: Organizer,
    State(state): State<AppState>,
    Json(mut input): Json<CreateEvent>,
) -> AppResult<impl IntoResponse> {
    input.slug = input.slug.trim().to_string();
    validate_create_event(&input)?;

    let event = EventRepo::create(&state.pool, organizer.organizer_id, &input).await?;

    tracing::info!(
        event_id = event.id,
        slug = %event.slug,
        organizer_id = %organizer.organizer_id,
        "Event created",
    );

    Ok((StatusCode::CREATED, Json(event)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_create_event(input: &CreateEvent) -> Result<(), CoreError> {
    validate_required("title", &input.title)?;
    validate_slug(&input.slug)?;
    validate_required("date", &input.date)?;
    validate_required("location", &input.location)?;
    if let Some(image) = input.image.as_deref().filter(|u| !u.trim().is_empty()) {
        validate_http_url("image", image)?;
    }
    Ok(())
}

async fn find_by_slug(pool: &DbPool, slug: &str) -> AppResult<Event> {
    EventRepo::find_by_slug(pool, slug).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Event",
            key: slug.to_string(),
        })
    })
}

/// Load attendees for `events` in one query and pair them up.
async fn attach_attendees(
    pool: &DbPool,
    events: Vec<Event>,
) -> AppResult<Vec<EventWithAttendees>> {
    let ids: Vec<DbId> = events.iter().map(|e| e.id).collect();
    let mut by_event: HashMap<DbId, Vec<AttendeeProfile>> = HashMap::new();
    if !ids.is_empty() {
        for attendee in AttendeeProfileRepo::list_by_events(pool, &ids).await? {
            by_event.entry(attendee.event_id).or_default().push(attendee);
        }
    }

    Ok(events
        .into_iter()
        .map(|event| {
            let attendees = by_event.remove(&event.id).unwrap_or_default();
            EventWithAttendees { event, attendees }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn input() -> CreateEvent {
        CreateEvent {
            title: "DeveloperWeek 2026".into(),
            slug: "devweek-2026".into(),
            date: "October 15-17, 2026".into(),
            location: "Oakland".into(),
            about_text: String::new(),
            image: None,
            front_page_html: None,
        }
    }

    #[test]
    fn valid_event_passes() {
        assert!(validate_create_event(&input()).is_ok());
    }

    #[test]
    fn bad_slug_is_rejected() {
        let event = CreateEvent {
            slug: "Dev Week".into(),
            ..input()
        };
        assert_matches!(validate_create_event(&event), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_title_is_rejected() {
        let event = CreateEvent {
            title: "  ".into(),
            ..input()
        };
        assert_matches!(validate_create_event(&event), Err(CoreError::Validation(_)));
    }

    #[test]
    fn cover_image_must_be_http_url() {
        let event = CreateEvent {
            image: Some("ftp://files/cover.png".into()),
            ..input()
        };
        assert_matches!(validate_create_event(&event), Err(CoreError::Validation(_)));
    }
}
