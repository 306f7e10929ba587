//! Transport to the portal's REST service.
//!
//! Workflows depend on the gateway traits declared next to them; [`HttpPortal`] is the one
//! production implementation and speaks JSON for mutations, multipart for uploads.

pub mod http;

pub use http::HttpPortal;

/// Failure talking to the portal. Never retried; the caller surfaces it and stops.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("portal responded {status}: {message}")]
    Server { status: u16, message: String },
    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("this request requires a signed-in session")]
    MissingSession,
    #[error("portal base url cannot carry request paths")]
    BaseUrl,
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Server { status, .. } => Some(*status),
            GatewayError::Http(err) => err.status().map(|status| status.as_u16()),
            GatewayError::Decode(_) | GatewayError::MissingSession | GatewayError::BaseUrl => {
                None
            }
        }
    }
}
