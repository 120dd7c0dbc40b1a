use axum::routing::post;
use axum::Router;

use crate::handlers::attendee;
use crate::state::AppState;

/// Attendee routes mounted at `/attendees`.
///
/// ```text
/// POST   /                   -> create_attendee
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(attendee::create_attendee))
}
