//! Error types for ScriptAI
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - Fixed user-facing messages (internal detail stays in the logs)
//! - Error context and chaining
//! - Retry/fatal classification for the host UI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Validation errors (1xx)
    ValidationMissingField = 100,
    ValidationInvalid = 101,
    ValidationDuplicate = 102,

    // Configuration errors (2xx)
    ConfigCredentialMissing = 200,
    ConfigParseError = 201,
    ConfigValidation = 202,
    ConfigNotFound = 203,
    ConfigIo = 204,

    // Storage errors (3xx)
    StorageRead = 300,
    StorageWrite = 301,
    StorageSerialize = 302,
    StorageUnavailable = 303,

    // Network errors (4xx)
    NetworkFailed = 400,
    NetworkTimeout = 401,

    // Upstream errors (5xx)
    UpstreamRejected = 500,
    UpstreamModelUnavailable = 501,
    UpstreamMalformed = 502,

    // Parse errors (6xx)
    ParseJson = 600,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Validation Errors
    // ─────────────────────────────────────────────────────────────

    /// A required user input was missing or blank
    #[error("Missing required input: {field}")]
    MissingField { field: &'static str },

    /// User input was present but unusable
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },

    /// A persona with the same id is already stored
    #[error("Persona {id} already exists")]
    DuplicatePersona { id: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// No API key could be resolved
    #[error("No API key found in {source_name}")]
    CredentialMissing { source_name: String },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// A configured path (config file, log directory) could not be written
    #[error("Failed to write {}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Storage Errors
    // ─────────────────────────────────────────────────────────────

    /// Storage slot could not be read
    #[error("Failed to read storage slot '{key}'")]
    StorageRead {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Storage slot could not be written
    #[error("Failed to write storage slot '{key}'")]
    StorageWrite {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Storage backend is not usable (bad directory, bad key)
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String, path: Option<PathBuf> },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Network Errors
    // ─────────────────────────────────────────────────────────────

    /// Transport-level failure reaching the remote service
    #[error("Failed to reach {url}: {message}")]
    Network {
        url: String,
        message: String,
        timed_out: bool,
    },

    // ─────────────────────────────────────────────────────────────
    // Upstream Errors
    // ─────────────────────────────────────────────────────────────

    /// Remote service rejected the request
    #[error("Remote service returned {status}: {message}")]
    UpstreamRejected { status: u16, message: String },

    /// The configured model identifier is not served
    #[error("Model '{model}' is unavailable: {message}")]
    ModelUnavailable { model: String, message: String },

    /// Remote service answered with an unexpected payload shape
    #[error("Unexpected response from remote service: {message}")]
    UpstreamMalformed { message: String },

    // ─────────────────────────────────────────────────────────────
    // Parse Errors
    // ─────────────────────────────────────────────────────────────

    /// Model reply was not the JSON document that was asked for
    #[error("Model reply is not valid JSON: {message}")]
    Parse { message: String },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error families surfaced to hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Configuration,
    Storage,
    Network,
    Upstream,
    Parse,
    Internal,
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::MissingField { .. } => ErrorCode::ValidationMissingField,
            Error::InvalidInput { .. } => ErrorCode::ValidationInvalid,
            Error::DuplicatePersona { .. } => ErrorCode::ValidationDuplicate,

            Error::CredentialMissing { .. } => ErrorCode::ConfigCredentialMissing,
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::ConfigIo { .. } => ErrorCode::ConfigIo,

            Error::StorageRead { .. } => ErrorCode::StorageRead,
            Error::StorageWrite { .. } => ErrorCode::StorageWrite,
            Error::StorageUnavailable { .. } => ErrorCode::StorageUnavailable,
            Error::Json(_) => ErrorCode::StorageSerialize,

            Error::Network { timed_out: true, .. } => ErrorCode::NetworkTimeout,
            Error::Network { .. } => ErrorCode::NetworkFailed,

            Error::UpstreamRejected { .. } => ErrorCode::UpstreamRejected,
            Error::ModelUnavailable { .. } => ErrorCode::UpstreamModelUnavailable,
            Error::UpstreamMalformed { .. } => ErrorCode::UpstreamMalformed,

            Error::Parse { .. } => ErrorCode::ParseJson,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Get the error family
    pub fn kind(&self) -> ErrorKind {
        match self.code() as u16 {
            100..=199 => ErrorKind::Validation,
            200..=299 => ErrorKind::Configuration,
            300..=399 => ErrorKind::Storage,
            400..=499 => ErrorKind::Network,
            500..=599 => ErrorKind::Upstream,
            600..=699 => ErrorKind::Parse,
            _ => ErrorKind::Internal,
        }
    }

    /// Check if the user can reasonably retry the same action
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network { .. } => true,
            Error::UpstreamRejected { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Check if the error blocks every operation until the setup is fixed
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::CredentialMissing { .. }
                | Error::ConfigNotFound { .. }
                | Error::ConfigParse { .. }
                | Error::ConfigValidation { .. }
                | Error::ConfigIo { .. }
                | Error::ModelUnavailable { .. }
        )
    }

    // ─────────────────────────────────────────────────────────────
    // User-Facing Messages
    // ─────────────────────────────────────────────────────────────

    /// Fixed message safe to show in a UI. Never includes transport detail.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => match self {
                Error::DuplicatePersona { .. } => "This persona already exists.",
                _ => "Please fill in all fields and upload an image.",
            },
            ErrorKind::Configuration => match self {
                Error::ConfigIo { .. } => {
                    "Could not write configuration or log files. Please check permissions."
                }
                _ => "The API key is missing or invalid. Please check your configuration.",
            },
            ErrorKind::Network => {
                "Could not reach the generation service. Please check your connection and try again."
            }
            ErrorKind::Upstream | ErrorKind::Parse => {
                "The generation service could not complete the request. Please try again."
            }
            ErrorKind::Storage | ErrorKind::Internal => {
                "Something went wrong. Please try again."
            }
        }
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors (for ergonomic error creation)
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a missing field error
    pub fn missing(field: &'static str) -> Self {
        Error::MissingField { field }
    }

    /// Create an invalid input error
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Create a config validation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a config parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error for a configured path that could not be written
    pub fn config_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::ConfigIo {
            path: path.into(),
            source,
        }
    }

    /// Create a network error
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Network {
            url: url.into(),
            message: message.into(),
            timed_out: false,
        }
    }

    /// Create an upstream malformed-response error
    pub fn upstream_malformed(message: impl Into<String>) -> Self {
        Error::UpstreamMalformed {
            message: message.into(),
        }
    }

    /// Create a storage unavailable error
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Error::StorageUnavailable {
            message: message.into(),
            path: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::ValidationMissingField.as_str(), "E100");
        assert_eq!(ErrorCode::ConfigCredentialMissing.as_str(), "E200");
        assert_eq!(ErrorCode::NetworkFailed.as_str(), "E400");
        assert_eq!(ErrorCode::InternalError.as_str(), "E900");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::missing("name").kind(), ErrorKind::Validation);
        assert_eq!(
            Error::CredentialMissing { source_name: "API_KEY".into() }.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(Error::network("https://x", "refused").kind(), ErrorKind::Network);
        assert_eq!(Error::upstream_malformed("no text").kind(), ErrorKind::Upstream);
        assert_eq!(Error::Parse { message: "eof".into() }.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_timeout_code() {
        let err = Error::Network {
            url: "https://x".into(),
            message: "deadline".into(),
            timed_out: true,
        };
        assert_eq!(err.code(), ErrorCode::NetworkTimeout);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_retryable() {
        assert!(Error::network("url", "test").is_retryable());
        assert!(Error::UpstreamRejected { status: 503, message: "busy".into() }.is_retryable());
        assert!(Error::UpstreamRejected { status: 429, message: "quota".into() }.is_retryable());
        assert!(!Error::UpstreamRejected { status: 400, message: "bad".into() }.is_retryable());
        assert!(!Error::missing("topic").is_retryable());
    }

    #[test]
    fn test_error_fatal() {
        assert!(Error::CredentialMissing { source_name: "API_KEY".into() }.is_fatal());
        assert!(Error::ModelUnavailable { model: "m".into(), message: "gone".into() }.is_fatal());
        assert!(!Error::network("url", "test").is_fatal());
    }

    #[test]
    fn test_user_message_hides_detail() {
        let err = Error::network("https://secret.example/v1?key=abc", "connection refused");
        let msg = err.user_message();
        assert!(!msg.contains("secret.example"));
        assert!(msg.contains("try again"));
    }

    #[test]
    fn test_model_name_in_display() {
        let err = Error::ModelUnavailable {
            model: "gemini-x".into(),
            message: "not found".into(),
        };
        assert!(err.to_string().contains("gemini-x"));
    }

    #[test]
    fn test_format_for_log() {
        let err = Error::missing("name");
        let formatted = err.format_for_log();
        assert!(formatted.contains("[E100]"));
        assert!(formatted.contains("name"));
    }

    #[test]
    fn test_config_io_is_configuration() {
        let err = Error::config_io(
            "/etc/scriptai/config.toml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.code(), ErrorCode::ConfigIo);
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.is_fatal());
        assert!(err.to_string().contains("/etc/scriptai/config.toml"));
        assert!(err.user_message().contains("permissions"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert_eq!(err.code(), ErrorCode::StorageSerialize);
    }
}
