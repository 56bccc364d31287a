//! Domain error types
//!
//! This module defines the error hierarchy for the harvester.
//! Errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main harvester error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Flickr API errors
    #[error("Flickr error: {0}")]
    Flickr(#[from] FlickrError),

    /// Work queue errors (closed channel, invalid work item)
    #[error("Queue error: {0}")]
    Queue(String),

    /// CSV sink errors
    #[error("Sink error: {0}")]
    Sink(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Flickr-specific errors
///
/// Errors that occur when talking to the Flickr REST API.
/// These errors don't expose the HTTP client's types.
#[derive(Debug, Error)]
pub enum FlickrError {
    /// Failed to connect to the API endpoint
    #[error("Failed to connect to Flickr API: {0}")]
    ConnectionFailed(String),

    /// Response body could not be decoded
    #[error("Invalid response from Flickr API: {0}")]
    InvalidResponse(String),

    /// API answered with `stat = "fail"`
    #[error("Flickr API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl FlickrError {
    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FlickrError::ConnectionFailed(_)
                | FlickrError::ServerError { .. }
                | FlickrError::Timeout(_)
        )
    }
}

impl HarvesterError {
    /// Whether the error is a transient Flickr failure worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, HarvesterError::Flickr(e) if e.is_retryable())
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for HarvesterError {
    fn from(err: std::io::Error) -> Self {
        HarvesterError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for HarvesterError {
    fn from(err: serde_json::Error) -> Self {
        HarvesterError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for HarvesterError {
    fn from(err: toml::de::Error) -> Self {
        HarvesterError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv writer errors
impl From<csv::Error> for HarvesterError {
    fn from(err: csv::Error) -> Self {
        HarvesterError::Sink(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvester_error_display() {
        let err = HarvesterError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_flickr_error_conversion() {
        let flickr_err = FlickrError::ConnectionFailed("Network error".to_string());
        let err: HarvesterError = flickr_err.into();
        assert!(matches!(err, HarvesterError::Flickr(_)));
    }

    #[test]
    fn test_flickr_api_error_display() {
        let err = FlickrError::Api {
            code: 100,
            message: "Invalid API Key".to_string(),
        };
        assert_eq!(err.to_string(), "Flickr API error 100: Invalid API Key");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(HarvesterError::from(FlickrError::Timeout("30s".into())).is_retryable());
        assert!(HarvesterError::from(FlickrError::ServerError {
            status: 502,
            message: "bad gateway".into()
        })
        .is_retryable());
        assert!(!HarvesterError::from(FlickrError::ClientError {
            status: 404,
            message: "missing".into()
        })
        .is_retryable());
        assert!(!HarvesterError::from(FlickrError::Api {
            code: 1,
            message: "Group not found".into()
        })
        .is_retryable());
        assert!(!HarvesterError::Sink("disk full".into()).is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: HarvesterError = io_err.into();
        assert!(matches!(err, HarvesterError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: HarvesterError = json_err.into();
        assert!(matches!(err, HarvesterError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: HarvesterError = toml_err.into();
        assert!(matches!(err, HarvesterError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_harvester_error_implements_std_error() {
        let err = HarvesterError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
