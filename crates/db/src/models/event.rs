//! Event entity model and DTOs.

use eventconnect_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::attendee::AttendeeProfile;

/// An event row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    /// Free-form date text as entered by the organizer.
    pub date: String,
    pub location: String,
    pub about_text: String,
    pub image: Option<String>,
    pub front_page_html: Option<String>,
    pub organizer_id: Uuid,
    pub created_at: Timestamp,
}

/// DTO for creating a new event. `organizer_id` comes from the auth token,
/// never from the request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvent {
    pub title: String,
    pub slug: String,
    pub date: String,
    pub location: String,
    #[serde(default)]
    pub about_text: String,
    pub image: Option<String>,
    pub front_page_html: Option<String>,
}

/// An event together with its registered attendees.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWithAttendees {
    #[serde(flatten)]
    pub event: Event,
    pub attendees: Vec<AttendeeProfile>,
}
