//! Error types for VidBanner Core

use crate::types::ProviderKind;
use thiserror::Error;

/// Result type alias for banner operations
pub type Result<T> = std::result::Result<T, Error>;

/// Banner error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Unknown video provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid video id: {0:?}")]
    InvalidVideoId(String),

    #[error("Unknown aspect ratio: {0}")]
    InvalidAspectRatio(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid embed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // Lifecycle errors
    #[error("Invalid playback state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Adapter for {adapter} cannot attach a {source_kind} source")]
    ProviderMismatch {
        adapter: ProviderKind,
        source_kind: ProviderKind,
    },

    // Provider errors
    #[error(transparent)]
    Sdk(#[from] SdkError),
}

impl Error {
    /// Returns the error code reported to the host application
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::UnknownProvider(_) => "UNKNOWN_PROVIDER",
            Error::InvalidVideoId(_) => "INVALID_VIDEO_ID",
            Error::InvalidAspectRatio(_) => "INVALID_ASPECT_RATIO",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::ConfigParse(_) => "CONFIG_PARSE",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::InvalidStateTransition { .. } => "INVALID_STATE",
            Error::ProviderMismatch { .. } => "PROVIDER_MISMATCH",
            Error::Sdk(_) => "SDK",
        }
    }

    /// Returns true for errors raised while validating configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownProvider(_)
                | Error::InvalidVideoId(_)
                | Error::InvalidAspectRatio(_)
                | Error::InvalidConfig(_)
                | Error::ConfigParse(_)
        )
    }
}

/// Failure reported by a third-party player SDK.
///
/// These never reach the host: adapters log them and leave the banner loading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{provider} SDK error: {message}")]
pub struct SdkError {
    pub provider: ProviderKind,
    pub message: String,
}

impl SdkError {
    pub fn new(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self {
            provider,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::UnknownProvider("dailymotion".into()).error_code(), "UNKNOWN_PROVIDER");
        assert_eq!(
            Error::InvalidStateTransition { from: "disposed".into(), to: "loading".into() }.error_code(),
            "INVALID_STATE"
        );
    }

    #[test]
    fn test_config_error_classification() {
        assert!(Error::InvalidVideoId(String::new()).is_config_error());
        assert!(!Error::Sdk(SdkError::new(ProviderKind::Vimeo, "boom")).is_config_error());
    }

    #[test]
    fn test_sdk_error_display() {
        let err = SdkError::new(ProviderKind::YouTube, "YT.Player is not a constructor");
        assert_eq!(err.to_string(), "youtube SDK error: YT.Player is not a constructor");
    }
}
