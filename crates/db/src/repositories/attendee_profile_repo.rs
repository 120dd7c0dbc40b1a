//! Repository for the `attendee_profiles` table.

use eventconnect_core::types::DbId;
use sqlx::PgPool;

use crate::models::attendee::{AttendeeProfile, CreateAttendeeProfile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, event_id, name, role, company, linkedin, headshot_url, created_at";

/// Provides insert and read operations for attendee profiles.
pub struct AttendeeProfileRepo;

impl AttendeeProfileRepo {
    /// Insert a confirmed profile, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAttendeeProfile,
    ) -> Result<AttendeeProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendee_profiles (event_id, name, role, company, linkedin, headshot_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendeeProfile>(&query)
            .bind(input.event_id)
            .bind(&input.name)
            .bind(&input.role)
            .bind(&input.company)
            .bind(&input.linkedin)
            .bind(&input.headshot_url)
            .fetch_one(pool)
            .await
    }

    /// List the attendees of one event in registration order.
    pub async fn list_by_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<AttendeeProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendee_profiles WHERE event_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, AttendeeProfile>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// List the attendees of several events in one query, in registration order.
    pub async fn list_by_events(
        pool: &PgPool,
        event_ids: &[DbId],
    ) -> Result<Vec<AttendeeProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendee_profiles WHERE event_id = ANY($1) ORDER BY created_at, id"
        );
        sqlx::query_as::<_, AttendeeProfile>(&query)
            .bind(event_ids)
            .fetch_all(pool)
            .await
    }
}
