use crate::config::ConfigError;
use crate::gateway::GatewayError;
use crate::telemetry::TelemetryError;
use crate::workflows::applications::DeskError;
use crate::workflows::profile::ProfileError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Gateway(GatewayError),
    Desk(DeskError),
    Profile(ProfileError),
}

impl AppError {
    /// Message for the person at the terminal. Workflow failures use their short alert text.
    pub fn alert(&self) -> String {
        match self {
            AppError::Desk(err) => err.alert(),
            AppError::Profile(err) => err.alert(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Gateway(err) => write!(f, "portal error: {}", err),
            AppError::Desk(err) => write!(f, "application error: {}", err),
            AppError::Profile(err) => write!(f, "profile error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Gateway(err) => Some(err),
            AppError::Desk(err) => Some(err),
            AppError::Profile(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<GatewayError> for AppError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}

impl From<DeskError> for AppError {
    fn from(value: DeskError) -> Self {
        Self::Desk(value)
    }
}

impl From<ProfileError> for AppError {
    fn from(value: ProfileError) -> Self {
        Self::Profile(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::applications::ValidationError;
    use std::error::Error;

    #[test]
    fn workflow_errors_surface_their_alert() {
        let err = AppError::from(DeskError::from(ValidationError::BlankRejectReason));
        assert_eq!(err.alert(), "Rejection reason is required");
        assert_eq!(
            err.to_string(),
            "application error: Rejection reason is required"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn transport_errors_keep_full_detail() {
        let err = AppError::from(GatewayError::Server {
            status: 404,
            message: "Application not found".to_string(),
        });
        assert_eq!(
            err.alert(),
            "portal error: portal responded 404: Application not found"
        );
    }
}
