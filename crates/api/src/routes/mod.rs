pub mod admin;
pub mod attendee;
pub mod event;
pub mod headshot;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /headshots/upload                                photo upload (multipart)
/// /headshots/generate                              start generation task
/// /headshots/status                                one task status snapshot
///
/// /attendees                                       register attendee (POST)
///
/// /events                                          list with attendees
/// /events/{slug}                                   detail with attendees
/// /events/{slug}/attendees                         attendee directory
///
/// /admin/events                                    list own, create (organizer)
/// /admin/events/{id}/collateral                    export PDF (organizer)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/headshots", headshot::router())
        .nest("/attendees", attendee::router())
        .nest("/events", event::router())
        .nest("/admin", admin::router())
}
