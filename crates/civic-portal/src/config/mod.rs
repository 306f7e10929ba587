use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::session::{Session, UserId};

const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Distinguishes which portal deployment the client is pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalEnvironment {
    Development,
    Test,
    Production,
}

impl PortalEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the portal client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: PortalEnvironment,
    pub portal: PortalConfig,
    pub credentials: Credentials,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = PortalEnvironment::from_str(
            &env::var("PORTAL_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url = parse_base_url(
            &env::var("PORTAL_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        )?;

        let timeout_secs = env::var("PORTAL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let log_level = env::var("PORTAL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            portal: PortalConfig {
                base_url,
                timeout_secs,
            },
            credentials: Credentials {
                token: non_blank(env::var("PORTAL_TOKEN").ok()),
                user_id: non_blank(env::var("PORTAL_USER_ID").ok()),
            },
            telemetry: TelemetryConfig { log_level },
        })
    }

    pub fn set_base_url(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.portal.base_url = parse_base_url(raw)?;
        Ok(())
    }

    /// Builds the authenticated session for calls that need one.
    pub fn session(&self) -> Result<Session, ConfigError> {
        match (&self.credentials.user_id, &self.credentials.token) {
            (Some(user_id), Some(token)) => Ok(Session::new(UserId(user_id.clone()), token.clone())),
            _ => Err(ConfigError::MissingCredentials),
        }
    }
}

/// Where the portal lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub base_url: Url,
    pub timeout_secs: u64,
}

impl PortalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Bearer credentials issued by the portal's auth service.
#[derive(Clone, Default)]
pub struct Credentials {
    pub token: Option<String>,
    pub user_id: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidBaseUrl { source })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::UnsupportedBaseUrl);
    }
    Ok(url)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidBaseUrl { source: url::ParseError },
    UnsupportedBaseUrl,
    InvalidTimeout,
    MissingCredentials,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBaseUrl { .. } => write!(f, "PORTAL_BASE_URL must be a valid URL"),
            ConfigError::UnsupportedBaseUrl => {
                write!(f, "PORTAL_BASE_URL must be an http(s) base URL")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "PORTAL_TIMEOUT_SECS must be a positive integer")
            }
            ConfigError::MissingCredentials => write!(
                f,
                "PORTAL_USER_ID and PORTAL_TOKEN are required for signed-in commands"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidBaseUrl { source } => Some(source),
            ConfigError::UnsupportedBaseUrl
            | ConfigError::InvalidTimeout
            | ConfigError::MissingCredentials => None,
        }
    }
}
