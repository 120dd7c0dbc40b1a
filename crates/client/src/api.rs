//! Typed HTTP client for the EventConnect API.
//!
//! [`ApiClient`] implements [`HeadshotProvider`] by going through the
//! server's headshot proxy, and [`AttendeeSink`] by posting to the
//! attendee endpoint, so the registration workflow can run against a
//! deployed server.

use std::time::Duration;

use async_trait::async_trait;
use eventconnect_core::headshot::TaskSnapshot;
use eventconnect_core::image_prep::ImageUpload;
use eventconnect_core::registration::AttendeeSubmission;
use eventconnect_core::types::{DbId, Timestamp};
use eventconnect_youcam::{HeadshotProvider, ProviderError};
use serde::de::DeserializeOwned;
use serde::Deserialize;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors from the EventConnect API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned an error body.
    #[error("{message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// A 2xx response did not have the expected shape.
    #[error("Malformed API response: {0}")]
    Malformed(String),
}

impl From<ClientError> for ProviderError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Request(e) => ProviderError::Transport(e.to_string()),
            ClientError::Api {
                message, details, ..
            } => ProviderError::Rejected { message, details },
            ClientError::Malformed(msg) => ProviderError::Malformed(msg),
        }
    }
}

/// `{ error, code, details? }` body returned by the server on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file_id: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    task_id: String,
}

/// An attendee profile as stored by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAttendee {
    pub id: DbId,
    pub event_id: DbId,
    pub name: String,
    pub role: String,
    pub company: String,
    pub linkedin: Option<String>,
    pub headshot_url: String,
    pub created_at: Timestamp,
}

/// The event fields the registration flow needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub date: String,
    pub location: String,
}

/// Where confirmed registrations are persisted.
#[async_trait]
pub trait AttendeeSink: Send + Sync {
    async fn save(&self, submission: &AttendeeSubmission) -> Result<StoredAttendee, ClientError>;
}

/// HTTP client for the EventConnect API.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// * `base_url` - Server root without trailing slash, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    /// Look up an event by slug.
    pub async fn get_event(&self, slug: &str) -> Result<EventSummary, ClientError> {
        let response = self.client.get(self.url(&format!("/events/{slug}"))).send().await?;
        Self::parse_response(response).await
    }

    /// Upload a photo, returning the provider file id.
    pub async fn upload_photo(&self, image: &ImageUpload) -> Result<String, ClientError> {
        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/headshots/upload"))
            .multipart(form)
            .send()
            .await?;
        let body: UploadResponse = Self::parse_response(response).await?;
        Ok(body.file_id)
    }

    /// Start generation for an uploaded file, returning the task id.
    pub async fn start_generation(&self, file_id: &str) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.url("/headshots/generate"))
            .json(&serde_json::json!({ "file_id": file_id }))
            .send()
            .await?;
        let body: GenerateResponse = Self::parse_response(response).await?;
        Ok(body.task_id)
    }

    /// Fetch one status snapshot for a task.
    pub async fn task_status(&self, task_id: &str) -> Result<TaskSnapshot, ClientError> {
        let response = self
            .client
            .get(self.url("/headshots/status"))
            .query(&[("task_id", task_id)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Persist a reviewed registration.
    pub async fn create_attendee(
        &self,
        submission: &AttendeeSubmission,
    ) -> Result<StoredAttendee, ClientError> {
        let response = self
            .client
            .post(self.url("/attendees"))
            .json(submission)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ErrorBody>(&bytes) {
                Ok(body) => ClientError::Api {
                    status: status.as_u16(),
                    code: body.code,
                    message: body.error,
                    details: body.details,
                },
                Err(_) => ClientError::Api {
                    status: status.as_u16(),
                    code: "HTTP_ERROR".into(),
                    message: format!("Server returned HTTP {status}"),
                    details: None,
                },
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl HeadshotProvider for ApiClient {
    fn name(&self) -> &str {
        "eventconnect-api"
    }

    async fn upload(&self, image: &ImageUpload) -> Result<String, ProviderError> {
        Ok(self.upload_photo(image).await?)
    }

    async fn start_generation(&self, file_id: &str) -> Result<String, ProviderError> {
        Ok(ApiClient::start_generation(self, file_id).await?)
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskSnapshot, ProviderError> {
        Ok(ApiClient::task_status(self, task_id).await?)
    }
}

#[async_trait]
impl AttendeeSink for ApiClient {
    async fn save(&self, submission: &AttendeeSubmission) -> Result<StoredAttendee, ClientError> {
        self.create_attendee(submission).await
    }
}
