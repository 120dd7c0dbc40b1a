//! REST API client for Foxit PDF Services.
//!
//! Two calls are needed per document: a client-credentials token request
//! and a multipart HTML upload to the HTML-to-PDF endpoint.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Default production base URL.
pub const DEFAULT_API_URL: &str = "https://openapi.foxit.com";

/// HTML-to-PDF conversion can be slow for large badge sheets.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for Foxit PDF Services.
pub struct FoxitApi {
    client: reqwest::Client,
    api_url: String,
    client_id: String,
    client_secret: String,
}

/// Errors from the Foxit REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum FoxitApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Foxit returned a non-2xx status code.
    #[error("Foxit API error ({status}): {body}")]
    ApiError {
        status: u16,
        body: serde_json::Value,
    },

    /// A 2xx response did not have the expected shape.
    #[error("Malformed Foxit response: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ConversionResponse {
    download_url: String,
}

impl FoxitApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base URL without trailing slash, e.g. [`DEFAULT_API_URL`].
    pub fn new(
        api_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Exchange the client credentials for a bearer token.
    pub async fn fetch_token(&self) -> Result<String, FoxitApiError> {
        let body = serde_json::json!({
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "grant_type": "client_credentials",
        });

        let response = self
            .client
            .post(format!("{}/auth/token", self.api_url))
            .json(&body)
            .send()
            .await?;

        let token: TokenResponse = Self::parse_response(response).await?;
        Ok(token.access_token)
    }

    /// Upload `html` as `file_name` and return the download URL of the PDF.
    pub async fn html_to_pdf(
        &self,
        token: &str,
        html: &str,
        file_name: &str,
    ) -> Result<String, FoxitApiError> {
        let part = reqwest::multipart::Part::text(html.to_owned())
            .file_name(file_name.to_owned())
            .mime_str("text/html")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/pdf-services/html-to-pdf", self.api_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        let converted: ConversionResponse = Self::parse_response(response).await?;
        Ok(converted.download_url)
    }

    // ---- private helpers ----

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FoxitApiError> {
        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
            return Err(FoxitApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, FoxitApiError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FoxitApiError::Malformed(e.to_string()))
    }
}
