//! Organizer routes, mounted at `/admin`. Every handler requires a valid
//! Bearer token via the `Organizer` extractor.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{collateral, event};
use crate::state::AppState;

/// ```text
/// GET    /events                      -> list_my_events
/// POST   /events                      -> create_event
/// POST   /events/{id}/collateral      -> export_collateral
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(event::list_my_events).post(event::create_event))
        .route("/events/{id}/collateral", post(collateral::export_collateral))
}
