//! PDF renderer seam.
//!
//! The collateral handler only knows [`PdfRenderer`]. [`RendererMode`]
//! picks the implementation once from configuration.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{FoxitApi, FoxitApiError, DEFAULT_API_URL};

/// One-page PDF returned when no Foxit credentials are configured.
pub const PLACEHOLDER_PDF_DATA_URI: &str = "data:application/pdf;base64,JVBERi0xLjcKCjEgMCBvYmogICUgZW50cnkgcG9pbnQKPDwKICAvVHlwZSAvQ2F0YWxvZwogIC9QYWdlcyAyIDAgUgo+PgplbmRvYmoKCjIgMCBvYmoKPDwKICAvVHlwZSAvUGFnZXMKICAvTWVkaWFCb3ggWyAwIDAgMjAwIDIwMCBdCiAgL0NvdW50IDEKICAvS2lkcyBbIDMgMCBSIF0KPj4KZW5kb2JqCgozIDAgb2JqCjw8CiAgL1R5cGUgL1BhZ2UKICAvUGFyZW50IDIgMCBSCiAgL1Jlc291cmNlcyA8PAogICAgL0ZvbnQgPDwKICAgICAgL0YxIDQgMCBSCgkvRm9udEJCb3ggWyAwIDAgMTAwMCAxMDAwIF0KICAgID4+CiAgPj4KICAvQ29udGVudHMgNSAwIFIKPj4KZW5kb2JqCgo0IDAgb2JqCjw8CiAgL1R5cGUgL0ZvbnQKICAvU3VidHlwZSAvVHlwZTEKICAvQmFzZUZvbnQgL1RpbWVzLVJvbWFuCj4+CmVuZG9iagoKNSAwIG9iago8PAogIC9MZW5ndGggNDQKPj4Kc3RyZWFtCkJUCjcwIDUwIFRECi9GMSAxMiBUZgooSGVsbG8sIEdlbmVyYXRlZCBQREYgTW9jayEpIFRqCkVUCmVuZHN0cmVhbQplbmRvYmoKCnhyZWYKMCA2CjAwMDAwMDAwMDAgNjUzNTUgZiAKMDAwMDAwMDAxMCAwMDAwMCBuIAowMDAwMDAwMDYwIDAwMDAwIG4gCjAwMDAwMDAxNDkgMDAwMDAgbiAKMDAwMDAwMDI1OSAwMDAwMCBuIAowMDAwMDAwMzQ2IDAwMDAwIG4gCnRyYWlsZXIKPDwKICAvU2l6ZSA2CiAgL1Jvb3QgMSAwIFIKPj4Kc3RhcnR4cmVmCjQ0MQolJUVPRg==";

/// Failure converting HTML to PDF.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Rejected {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Malformed renderer response: {0}")]
    Malformed(String),
}

impl RenderError {
    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            RenderError::Rejected { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

impl From<FoxitApiError> for RenderError {
    fn from(err: FoxitApiError) -> Self {
        match err {
            FoxitApiError::Request(e) => RenderError::Transport(e.to_string()),
            FoxitApiError::ApiError { status, body } => RenderError::Rejected {
                message: format!("PDF service rejected the request (HTTP {status})"),
                details: Some(body),
            },
            FoxitApiError::Malformed(msg) => RenderError::Malformed(msg),
        }
    }
}

/// Converts an HTML document into a downloadable PDF.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    fn name(&self) -> &str;

    /// Render `html` and return a URL (possibly a `data:` URI) for the PDF.
    async fn render(&self, html: &str, file_name: &str) -> Result<String, RenderError>;
}

/// Which renderer strategy to run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererMode {
    Live {
        api_url: String,
        client_id: String,
        client_secret: String,
    },
    Placeholder,
}

impl RendererMode {
    /// Live when a client id is configured; blank values count as absent.
    pub fn from_credentials(
        client_id: Option<String>,
        client_secret: Option<String>,
        api_url: Option<String>,
    ) -> Self {
        match client_id.filter(|id| !id.trim().is_empty()) {
            Some(client_id) => RendererMode::Live {
                api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                client_id,
                client_secret: client_secret.unwrap_or_default(),
            },
            None => RendererMode::Placeholder,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, RendererMode::Live { .. })
    }

    pub fn build(&self) -> Arc<dyn PdfRenderer> {
        match self {
            RendererMode::Live {
                api_url,
                client_id,
                client_secret,
            } => Arc::new(FoxitRenderer::new(FoxitApi::new(
                api_url.clone(),
                client_id.clone(),
                client_secret.clone(),
            ))),
            RendererMode::Placeholder => Arc::new(PlaceholderRenderer),
        }
    }
}

/// Renderer backed by Foxit PDF Services.
pub struct FoxitRenderer {
    api: FoxitApi,
}

impl FoxitRenderer {
    pub fn new(api: FoxitApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PdfRenderer for FoxitRenderer {
    fn name(&self) -> &str {
        "foxit"
    }

    async fn render(&self, html: &str, file_name: &str) -> Result<String, RenderError> {
        let token = self.api.fetch_token().await?;
        let html_name = file_name
            .strip_suffix(".pdf")
            .map(|stem| format!("{stem}.html"))
            .unwrap_or_else(|| format!("{file_name}.html"));
        let url = self.api.html_to_pdf(&token, html, &html_name).await?;
        tracing::info!(file_name, html_bytes = html.len(), "Rendered PDF with Foxit");
        Ok(url)
    }
}

/// Offline renderer returning a fixed one-page PDF.
pub struct PlaceholderRenderer;

#[async_trait]
impl PdfRenderer for PlaceholderRenderer {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn render(&self, html: &str, file_name: &str) -> Result<String, RenderError> {
        tracing::warn!(
            file_name,
            html_bytes = html.len(),
            "No Foxit client id configured, returning placeholder PDF"
        );
        Ok(PLACEHOLDER_PDF_DATA_URI.to_string())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn mode_without_client_id_is_placeholder() {
        assert_eq!(
            RendererMode::from_credentials(None, Some("secret".into()), None),
            RendererMode::Placeholder
        );
        assert_eq!(
            RendererMode::from_credentials(Some("".into()), None, None),
            RendererMode::Placeholder
        );
    }

    #[test]
    fn mode_with_client_id_is_live() {
        let mode = RendererMode::from_credentials(Some("id".into()), Some("secret".into()), None);
        assert_matches!(&mode, RendererMode::Live { api_url, .. } if api_url == DEFAULT_API_URL);
        assert!(mode.is_live());
        assert_eq!(mode.build().name(), "foxit");
    }

    #[tokio::test]
    async fn placeholder_returns_pdf_data_uri() {
        let url = PlaceholderRenderer.render("<html></html>", "x.pdf").await.unwrap();
        assert!(url.starts_with("data:application/pdf;base64,JVBERi0"));
    }

    #[test]
    fn api_error_keeps_details() {
        let err: RenderError = FoxitApiError::ApiError {
            status: 401,
            body: serde_json::json!({"error": "invalid_client"}),
        }
        .into();
        assert_eq!(err.details().unwrap()["error"], "invalid_client");
        assert!(err.to_string().contains("401"));
    }
}
