//! Repository for the `events` table.

use eventconnect_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::event::{CreateEvent, Event};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, slug, title, date, location, about_text, image, front_page_html, \
                       organizer_id, created_at";

/// Provides create and read operations for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event owned by `organizer_id`, returning the created row.
    ///
    /// A duplicate slug violates `uq_events_slug`.
    pub async fn create(
        pool: &PgPool,
        organizer_id: Uuid,
        input: &CreateEvent,
    ) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events
                (slug, title, date, location, about_text, image, front_page_html, organizer_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.slug)
            .bind(&input.title)
            .bind(&input.date)
            .bind(&input.location)
            .bind(&input.about_text)
            .bind(&input.image)
            .bind(&input.front_page_html)
            .bind(organizer_id)
            .fetch_one(pool)
            .await
    }

    /// Find an event by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an event by its public slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE slug = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List all events, most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Event>(&query).fetch_all(pool).await
    }

    /// List events owned by one organizer, most recently created first.
    pub async fn list_by_organizer(
        pool: &PgPool,
        organizer_id: Uuid,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events WHERE organizer_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(organizer_id)
            .fetch_all(pool)
            .await
    }
}
