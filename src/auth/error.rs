use strum::{AsRefStr, Display};
use thiserror::Error;

use super::identity::Provider;

/// Normalized authentication errors across providers.
///
/// The session façade collapses every variant except the usage errors into a
/// `None` outcome; [`AuthError::failure_reason`] recovers the coarse cause for
/// callers that want to tell the user more.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Device code request failed: {0}")]
    DeviceCodeRequest(String),
    #[error("Access denied")]
    AccessDenied,
    #[error("Device code expired before authorization")]
    Expired,
    #[error("Sign-in window closed before authorization completed")]
    Cancelled,
    #[error("Sign-in window could not be opened")]
    PopupBlocked,
    #[error("OAuth state mismatch (possible CSRF)")]
    StateMismatch,
    #[error("Profile unavailable: {0}")]
    ProfileUnavailable(String),
    #[error("Provider {0} requires a user-code callback")]
    MissingUserCodeCallback(Provider),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse cause of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum FailureReason {
    Denied,
    Expired,
    Cancelled,
    PopupBlocked,
    CsrfMismatch,
    Network,
    InvalidResponse,
    Usage,
}

impl AuthError {
    /// Errors caused by calling the API incorrectly rather than by the
    /// provider or the user. These are never collapsed into `None`.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::MissingUserCodeCallback(_) | Self::Configuration(_) | Self::Unsupported(_)
        )
    }

    pub fn failure_reason(&self) -> FailureReason {
        match self {
            Self::AccessDenied => FailureReason::Denied,
            Self::Expired => FailureReason::Expired,
            Self::Cancelled => FailureReason::Cancelled,
            Self::PopupBlocked => FailureReason::PopupBlocked,
            Self::StateMismatch => FailureReason::CsrfMismatch,
            Self::Network(_) | Self::Io(_) => FailureReason::Network,
            Self::DeviceCodeRequest(_)
            | Self::ProfileUnavailable(_)
            | Self::InvalidResponse(_)
            | Self::Serialization(_) => FailureReason::InvalidResponse,
            Self::MissingUserCodeCallback(_) | Self::Configuration(_) | Self::Unsupported(_) => {
                FailureReason::Usage
            }
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<url::ParseError> for AuthError {
    fn from(error: url::ParseError) -> Self {
        Self::Configuration(format!("invalid URL: {error}"))
    }
}
