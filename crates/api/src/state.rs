use std::sync::Arc;

use eventconnect_foxit::PdfRenderer;
use eventconnect_youcam::HeadshotProvider;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: eventconnect_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Headshot provider (live YouCam or placeholder).
    pub headshots: Arc<dyn HeadshotProvider>,
    /// PDF renderer (live Foxit or placeholder).
    pub pdf: Arc<dyn PdfRenderer>,
}

impl AppState {
    /// Build state with provider strategies chosen from `config`.
    pub fn new(pool: eventconnect_db::DbPool, config: ServerConfig) -> Self {
        let headshots = config.headshot.build();
        let pdf = config.pdf.build();
        Self {
            pool,
            config: Arc::new(config),
            headshots,
            pdf,
        }
    }
}
