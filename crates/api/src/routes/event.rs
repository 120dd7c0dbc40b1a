//! Public event routes, mounted at `/events`.

use axum::routing::get;
use axum::Router;

use crate::handlers::event;
use crate::state::AppState;

/// ```text
/// GET    /                   -> list_events
/// GET    /{slug}             -> get_event
/// GET    /{slug}/attendees   -> list_event_attendees
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(event::list_events))
        .route("/{slug}", get(event::get_event))
        .route("/{slug}/attendees", get(event::list_event_attendees))
}
