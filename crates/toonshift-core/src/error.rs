//! Error types for Toonshift

use thiserror::Error;

/// Result type alias using Toonshift's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Toonshift error types
#[derive(Error, Debug)]
pub enum Error {
    // Input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to read image file: {0}")]
    ReadError(String),

    // Generation errors
    #[error("The model response contained no image data")]
    NoImageProduced,

    #[error("Image generation failed: {0}")]
    GenerationError(String),

    // Network errors
    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    #[error("No API key found. Set TOONSHIFT_API_KEY or OPENROUTER_API_KEY.")]
    ApiKeyMissing,

    // Config errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::InvalidInput(_) => Some("Choose a JPEG, PNG or WebP photo".to_string()),
            Self::NetworkError(_) => Some("Check internet connection".to_string()),
            Self::ApiKeyMissing => Some("export TOONSHIFT_API_KEY=<your key>".to_string()),
            Self::ConfigError(_) => Some("toonshift config reset".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages_are_actionable() {
        let error = Error::ApiKeyMissing;
        assert!(error.to_string().contains("TOONSHIFT_API_KEY"));

        let error = Error::GenerationError("HTTP 500: internal".to_string());
        assert!(error.to_string().contains("HTTP 500"));
    }

    #[test]
    fn test_suggestions() {
        assert!(Error::ApiKeyMissing.suggestion().is_some());
        assert!(Error::InvalidInput("x".to_string()).suggestion().is_some());
        assert!(Error::NoImageProduced.suggestion().is_none());
    }
}
