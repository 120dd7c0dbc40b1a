//! Attendee profile entity model and DTOs.

use eventconnect_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `attendee_profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeProfile {
    pub id: DbId,
    pub event_id: DbId,
    pub name: String,
    pub role: String,
    pub company: String,
    pub linkedin: Option<String>,
    pub headshot_url: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a confirmed attendee profile.
#[derive(Debug, Clone)]
pub struct CreateAttendeeProfile {
    pub event_id: DbId,
    pub name: String,
    pub role: String,
    pub company: String,
    pub linkedin: Option<String>,
    pub headshot_url: String,
}
