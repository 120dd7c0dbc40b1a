//! REST API client for the YouCam headshot endpoints.
//!
//! Wraps file upload (slot request + byte upload), template lookup, task
//! creation and task status retrieval using [`reqwest`].

use std::time::Duration;

use eventconnect_core::headshot::TaskSnapshot;
use eventconnect_core::image_prep::ImageUpload;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Default production base URL.
pub const DEFAULT_API_URL: &str = "https://yce-api-01.makeupar.com";

/// Template used when the template listing cannot be read.
pub const DEFAULT_TEMPLATE_ID: &str = "professional_001";

/// HTTP request timeout for a single call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the YouCam headshot API.
pub struct YouCamApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

/// Errors from the YouCam REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum YouCamApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// YouCam returned a non-2xx status code.
    #[error("YouCam API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Response body, parsed as JSON when possible.
        body: serde_json::Value,
    },

    /// A 2xx response did not have the expected shape.
    #[error("Malformed YouCam response: {0}")]
    Malformed(String),
}

/// `{ "data": T }` envelope used by every YouCam response.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct FileSlots {
    files: Vec<FileSlot>,
}

/// Upload slot returned by `POST /s2s/v2.0/file/headshot`.
#[derive(Debug, Clone, Deserialize)]
pub struct FileSlot {
    pub file_id: String,
    pub upload_url: String,
}

#[derive(Debug, Deserialize)]
struct TemplateList {
    #[serde(default)]
    templates: Vec<Template>,
}

#[derive(Debug, Deserialize)]
struct Template {
    template_id: String,
}

#[derive(Debug, Deserialize)]
struct TaskCreated {
    task_id: String,
}

impl YouCamApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base URL without trailing slash, e.g. [`DEFAULT_API_URL`].
    /// * `api_key` - Bearer credential.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(client, api_url, api_key)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Upload an image and return the provider's file id.
    ///
    /// Requests an upload slot, then `PUT`s the bytes to the slot URL.
    pub async fn upload_file(&self, image: &ImageUpload) -> Result<String, YouCamApiError> {
        let slot = self.request_upload_slot(image).await?;
        self.put_bytes(&slot.upload_url, image).await?;
        Ok(slot.file_id)
    }

    /// Ask YouCam for an upload slot for `image`.
    pub async fn request_upload_slot(&self, image: &ImageUpload) -> Result<FileSlot, YouCamApiError> {
        let body = serde_json::json!({
            "files": [{
                "file_name": image.file_name,
                "file_size": image.bytes.len(),
                "content_type": image.content_type,
            }]
        });

        let response = self
            .client
            .post(format!("{}/s2s/v2.0/file/headshot", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let slots: Envelope<FileSlots> = Self::parse_response(response).await?;
        slots
            .data
            .files
            .into_iter()
            .next()
            .ok_or_else(|| YouCamApiError::Malformed("no upload slot returned".into()))
    }

    /// Upload the raw bytes of `image` to a pre-signed slot URL.
    pub async fn put_bytes(&self, upload_url: &str, image: &ImageUpload) -> Result<(), YouCamApiError> {
        let response = self
            .client
            .put(upload_url)
            .header(reqwest::header::CONTENT_TYPE, image.content_type.as_str())
            .header(reqwest::header::CONTENT_LENGTH, image.bytes.len())
            .body(image.bytes.clone())
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Return the first headshot template id, or [`DEFAULT_TEMPLATE_ID`] if
    /// the listing fails or is empty.
    pub async fn first_template_id(&self) -> String {
        match self.fetch_first_template().await {
            Ok(Some(id)) => id,
            Ok(None) => DEFAULT_TEMPLATE_ID.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not fetch headshot templates, using default");
                DEFAULT_TEMPLATE_ID.to_string()
            }
        }
    }

    async fn fetch_first_template(&self) -> Result<Option<String>, YouCamApiError> {
        let response = self
            .client
            .get(format!("{}/s2s/v2.0/task/template/headshot", self.api_url))
            .query(&[("page_size", "1")])
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let list: Envelope<TemplateList> = Self::parse_response(response).await?;
        Ok(list.data.templates.into_iter().next().map(|t| t.template_id))
    }

    /// Start a headshot task for an uploaded file, returning the task id.
    pub async fn start_headshot_task(
        &self,
        file_id: &str,
        template_id: &str,
    ) -> Result<String, YouCamApiError> {
        let body = serde_json::json!({
            "src_file_id": file_id,
            "template_id": template_id,
            "output_count": 1,
        });

        let response = self
            .client
            .post(format!("{}/s2s/v2.0/task/headshot", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let created: Envelope<TaskCreated> = Self::parse_response(response).await?;
        Ok(created.data.task_id)
    }

    /// Retrieve the current status of a headshot task.
    pub async fn get_headshot_task(&self, task_id: &str) -> Result<TaskSnapshot, YouCamApiError> {
        let response = self
            .client
            .get(format!("{}/s2s/v2.0/task/headshot/{}", self.api_url, task_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status: Envelope<TaskSnapshot> = Self::parse_response(response).await?;
        Ok(status.data)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. On failure the body
    /// is captured (as JSON when it parses) for diagnostics.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, YouCamApiError> {
        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
            return Err(YouCamApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, YouCamApiError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| YouCamApiError::Malformed(e.to_string()))
    }
}
