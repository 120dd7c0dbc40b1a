use eventconnect_foxit::RendererMode;
use eventconnect_youcam::ProviderMode;

use crate::auth::jwt::JwtConfig;

/// Default cap on uploaded photo size (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
///
/// All fields except the auth secret have defaults suitable for local
/// development. Without provider credentials the server runs with the
/// placeholder headshot provider and PDF renderer.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
    /// Organizer token verification.
    pub jwt: JwtConfig,
    /// Headshot provider strategy.
    pub headshot: ProviderMode,
    /// PDF renderer strategy.
    pub pdf: RendererMode,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                            |
    /// |------------------------|------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                          |
    /// | `PORT`                 | `3000`                             |
    /// | `CORS_ORIGINS`         | `http://localhost:3001`            |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                               |
    /// | `MAX_UPLOAD_BYTES`     | `10485760`                         |
    /// | `AUTH_JWT_SECRET`      | **required**                       |
    /// | `YOUCAM_API_KEY`       | unset (placeholder provider)       |
    /// | `YOUCAM_API_URL`       | `https://yce-api-01.makeupar.com`  |
    /// | `FOXIT_CLIENT_ID`      | unset (placeholder renderer)       |
    /// | `FOXIT_CLIENT_SECRET`  | unset                              |
    /// | `FOXIT_API_URL`        | `https://openapi.foxit.com`        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or("PORT", lookup("PORT"), 3000u16)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3001".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse_or("REQUEST_TIMEOUT_SECS", lookup("REQUEST_TIMEOUT_SECS"), 30u64)?;
        let max_upload_bytes = parse_or(
            "MAX_UPLOAD_BYTES",
            lookup("MAX_UPLOAD_BYTES"),
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;

        let secret = lookup("AUTH_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("AUTH_JWT_SECRET"))?;

        let headshot = ProviderMode::from_credentials(lookup("YOUCAM_API_KEY"), lookup("YOUCAM_API_URL"));
        let pdf = RendererMode::from_credentials(
            lookup("FOXIT_CLIENT_ID"),
            lookup("FOXIT_CLIENT_SECRET"),
            lookup("FOXIT_API_URL"),
        );

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            jwt: JwtConfig::new(secret),
            headshot,
            pdf,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}
