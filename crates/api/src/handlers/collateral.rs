//! Handler for printable collateral export (lanyards, programme).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use eventconnect_core::collateral::{self, Badge, BadgeOptions, CollateralKind, EventSheet};
use eventconnect_core::error::CoreError;
use eventconnect_core::types::DbId;
use eventconnect_db::repositories::{AttendeeProfileRepo, EventRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::Organizer;
use crate::state::AppState;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CollateralRequest {
    pub kind: CollateralKind,
    #[serde(default = "default_true")]
    pub include_role: bool,
    #[serde(default = "default_true")]
    pub include_company: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CollateralResponse {
    pub pdf_url: String,
    pub file_name: String,
}

/// POST /api/v1/admin/events/{id}/collateral
///
/// Render lanyards or a programme for an event owned by the caller and
/// convert it to PDF. Events owned by other organizers are reported as
/// not found.
pub async fn export_collateral(
    organizer: Organizer,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(input): Json<CollateralRequest>,
) -> AppResult<impl IntoResponse> {
    let event = EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .filter(|e| e.organizer_id == organizer.organizer_id)
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Event",
                key: event_id.to_string(),
            })
        })?;

    let attendees = match input.kind {
        CollateralKind::Lanyards => AttendeeProfileRepo::list_by_event(&state.pool, event.id).await?,
        CollateralKind::Programme => Vec::new(),
    };

    let sheet = EventSheet {
        title: &event.title,
        date: &event.date,
        location: &event.location,
        front_page_html: event.front_page_html.as_deref(),
    };
    let badges: Vec<Badge<'_>> = attendees
        .iter()
        .map(|a| Badge {
            name: &a.name,
            role: &a.role,
            company: &a.company,
        })
        .collect();
    let options = BadgeOptions {
        include_role: input.include_role,
        include_company: input.include_company,
    };

    let html = collateral::render(input.kind, &sheet, &badges, options);
    let file_name = collateral::file_name(&event.slug, input.kind);

    let pdf_url = state.pdf.render(&html, &file_name).await?;

    tracing::info!(
        event_id = event.id,
        kind = %input.kind,
        badges = badges.len(),
        renderer = state.pdf.name(),
        "Collateral exported",
    );

    Ok(Json(CollateralResponse { pdf_url, file_name }))
}
