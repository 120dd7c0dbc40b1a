//! Headshot provider seam.
//!
//! [`HeadshotProvider`] is what the API handlers and the registration
//! workflow talk to. Two strategies exist:
//!
//! - [`YouCamProvider`] calls the real YouCam API.
//! - [`PlaceholderProvider`] returns fixed identifiers and a stock portrait
//!   so the whole flow can be exercised without a credential.
//!
//! Which one is used is decided once, from configuration, via
//! [`ProviderMode`].

use std::sync::Arc;

use async_trait::async_trait;
use eventconnect_core::headshot::{
    TaskSnapshot, PLACEHOLDER_FILE_ID, PLACEHOLDER_HEADSHOT_URL, PLACEHOLDER_TASK_ID,
};
use eventconnect_core::image_prep::ImageUpload;

use crate::api::{YouCamApi, YouCamApiError, DEFAULT_API_URL};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Failure talking to a headshot provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider could not be reached or the transfer failed.
    #[error("{0}")]
    Transport(String),

    /// The provider answered but refused the request.
    #[error("{message}")]
    Rejected {
        message: String,
        /// The provider's diagnostic payload, if any.
        details: Option<serde_json::Value>,
    },

    /// The provider answered with something we could not interpret.
    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            ProviderError::Rejected { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

impl From<YouCamApiError> for ProviderError {
    fn from(err: YouCamApiError) -> Self {
        match err {
            YouCamApiError::Request(e) => ProviderError::Transport(e.to_string()),
            YouCamApiError::ApiError { status, body } => ProviderError::Rejected {
                message: format!("Headshot provider rejected the request (HTTP {status})"),
                details: Some(body),
            },
            YouCamApiError::Malformed(msg) => ProviderError::Malformed(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Operations the registration flow needs from an image-generation provider.
#[async_trait]
pub trait HeadshotProvider: Send + Sync {
    /// Short name for logs (e.g. `"youcam"`, `"placeholder"`).
    fn name(&self) -> &str;

    /// Upload a source photo, returning the provider's file id.
    async fn upload(&self, image: &ImageUpload) -> Result<String, ProviderError>;

    /// Start generating a headshot from an uploaded file, returning the task id.
    async fn start_generation(&self, file_id: &str) -> Result<String, ProviderError>;

    /// Fetch one status snapshot for a task.
    async fn task_status(&self, task_id: &str) -> Result<TaskSnapshot, ProviderError>;
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Which provider strategy to run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderMode {
    Live { api_url: String, api_key: String },
    /// No credential configured: use placeholder values.
    Placeholder,
}

impl ProviderMode {
    /// Choose the mode from an optional API key. Blank keys count as absent.
    pub fn from_credentials(api_key: Option<String>, api_url: Option<String>) -> Self {
        match api_key.filter(|k| !k.trim().is_empty()) {
            Some(api_key) => ProviderMode::Live {
                api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                api_key,
            },
            None => ProviderMode::Placeholder,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, ProviderMode::Live { .. })
    }

    /// Build the provider for this mode.
    pub fn build(&self) -> Arc<dyn HeadshotProvider> {
        match self {
            ProviderMode::Live { api_url, api_key } => {
                Arc::new(YouCamProvider::new(YouCamApi::new(api_url.clone(), api_key.clone())))
            }
            ProviderMode::Placeholder => Arc::new(PlaceholderProvider),
        }
    }
}

// ---------------------------------------------------------------------------
// Live
// ---------------------------------------------------------------------------

/// Provider backed by the YouCam API.
pub struct YouCamProvider {
    api: YouCamApi,
}

impl YouCamProvider {
    pub fn new(api: YouCamApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl HeadshotProvider for YouCamProvider {
    fn name(&self) -> &str {
        "youcam"
    }

    async fn upload(&self, image: &ImageUpload) -> Result<String, ProviderError> {
        let file_id = self.api.upload_file(image).await?;
        tracing::info!(file_id = %file_id, bytes = image.bytes.len(), "Uploaded source photo to YouCam");
        Ok(file_id)
    }

    async fn start_generation(&self, file_id: &str) -> Result<String, ProviderError> {
        let template_id = self.api.first_template_id().await;
        let task_id = self.api.start_headshot_task(file_id, &template_id).await?;
        tracing::info!(file_id, task_id = %task_id, template_id = %template_id, "Started YouCam headshot task");
        Ok(task_id)
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskSnapshot, ProviderError> {
        Ok(self.api.get_headshot_task(task_id).await?)
    }
}

// ---------------------------------------------------------------------------
// Placeholder
// ---------------------------------------------------------------------------

/// Offline provider: every call succeeds immediately with fixed values.
pub struct PlaceholderProvider;

#[async_trait]
impl HeadshotProvider for PlaceholderProvider {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn upload(&self, image: &ImageUpload) -> Result<String, ProviderError> {
        tracing::debug!(file_name = %image.file_name, "No YouCam credential, returning placeholder file id");
        Ok(PLACEHOLDER_FILE_ID.to_string())
    }

    async fn start_generation(&self, _file_id: &str) -> Result<String, ProviderError> {
        Ok(PLACEHOLDER_TASK_ID.to_string())
    }

    async fn task_status(&self, _task_id: &str) -> Result<TaskSnapshot, ProviderError> {
        Ok(TaskSnapshot::success(PLACEHOLDER_HEADSHOT_URL))
    }
}
