//! Error types for the envforge configuration system.
//!
//! This module provides the error hierarchy for every stage of a session:
//! loading the document, applying editor operations, talking to the
//! configuration service, and tracking the selected environment.

use std::path::PathBuf;
use thiserror::Error;

/// Fallback message used when the configuration service gives no detail.
pub const GENERIC_SERVICE_ERROR: &str = "configuration service request failed";

/// The main error type for envforge.
#[derive(Debug, Error)]
pub enum EnvforgeError {
    /// Document loading and saving errors.
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Form editor errors.
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    /// Configuration service errors.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Session and environment selection errors.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Tool settings errors.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad classification of an error, used to decide how it is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The operator supplied something unusable. Handled locally.
    UserInput,
    /// The network or the remote service failed.
    Transport,
    /// Local file system or document encoding failure.
    Internal,
}

/// Errors raised while reading or writing a document file.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document file was not found.
    #[error("Document file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The document file could not be parsed.
    #[error("Failed to parse document: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// The document could not be serialized.
    #[error("Failed to serialize document: {message}")]
    SerializeError {
        /// Description of the serialization error.
        message: String,
    },

    /// The document file already exists and overwriting was not requested.
    #[error("Document file already exists: {path}")]
    AlreadyExists {
        /// Path to the existing file.
        path: PathBuf,
    },
}

/// Errors raised by form editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A positional index does not address an existing entity.
    #[error("{entity} index {index} is out of range (length {len})")]
    IndexOutOfRange {
        /// Kind of entity addressed (environment, service, port, variable).
        entity: &'static str,
        /// Index that was supplied.
        index: usize,
        /// Length of the addressed sequence.
        len: usize,
    },

    /// A field name does not belong to the entity's editable field set.
    #[error("Unknown {entity} field: {field}")]
    UnknownField {
        /// Kind of entity.
        entity: &'static str,
        /// The rejected field name.
        field: String,
    },

    /// A protocol value other than tcp or udp.
    #[error("Invalid protocol: {value}. Expected: tcp or udp")]
    InvalidProtocol {
        /// The rejected value.
        value: String,
    },
}

/// Errors raised while talking to the configuration service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No markup was supplied.
    #[error("No markup content supplied")]
    EmptyMarkup,

    /// An artifact kind the service does not generate.
    #[error("Unknown artifact kind: {kind}. Expected one of: {expected}")]
    UnknownArtifactKind {
        /// The rejected kind.
        kind: String,
        /// Comma-separated list of supported kinds.
        expected: String,
    },

    /// There is no generated content to download.
    #[error("No generated content to download")]
    NoContent,

    /// Generation was requested for markup that has not passed validation.
    #[error("Markup has not passed validation; run validate first")]
    NotValidated,

    /// A request of the same class is still running.
    #[error("A {class} request is already in flight")]
    RequestInFlight {
        /// Name of the request class.
        class: String,
    },

    /// Network failure.
    #[error("Network error communicating with the configuration service: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// Non-success HTTP status.
    #[error("Configuration service request failed: {status} - {message}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or the generic fallback.
        message: String,
    },

    /// The service answered but reported failure.
    #[error("{message}")]
    Unsuccessful {
        /// Server-provided message, or the generic fallback.
        message: String,
    },

    /// The response body could not be understood.
    #[error("Invalid response from configuration service: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Errors raised by the environment selector.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The requested environment was not reported by the service.
    #[error("Unknown environment '{name}'. Known environments: {known}")]
    UnknownEnvironment {
        /// The requested name.
        name: String,
        /// Comma-separated list of known names.
        known: String,
    },
}

/// Errors raised while assembling tool settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The `.env` file exists but could not be loaded.
    #[error("Failed to load {path}: {message}")]
    Dotenv {
        /// Path to the `.env` file.
        path: PathBuf,
        /// Loader message.
        message: String,
    },

    /// A setting has a value that cannot be used.
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// The rejected value.
        value: String,
    },
}

/// Result type alias for envforge operations.
pub type Result<T> = std::result::Result<T, EnvforgeError>;

impl EnvforgeError {
    /// Returns the category used to decide how the error is reported.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Editor(_) | Self::Session(_) | Self::Settings(SettingsError::InvalidValue { .. }) => {
                ErrorCategory::UserInput
            }
            Self::Service(
                ServiceError::EmptyMarkup
                | ServiceError::UnknownArtifactKind { .. }
                | ServiceError::NoContent
                | ServiceError::NotValidated
                | ServiceError::RequestInFlight { .. },
            ) => ErrorCategory::UserInput,
            Self::Service(_) => ErrorCategory::Transport,
            Self::Document(DocumentError::FileNotFound { .. } | DocumentError::AlreadyExists { .. }) => {
                ErrorCategory::UserInput
            }
            Self::Document(_) | Self::Settings(_) | Self::Io(_) => ErrorCategory::Internal,
        }
    }
}

impl EditorError {
    /// Creates an index error for the given entity.
    #[must_use]
    pub const fn out_of_range(entity: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { entity, index, len }
    }
}

impl ServiceError {
    /// Creates an API request error, falling back to the generic message.
    #[must_use]
    pub fn api_error(status: u16, message: Option<String>) -> Self {
        Self::ApiRequestFailed {
            status,
            message: message.unwrap_or_else(|| String::from(GENERIC_SERVICE_ERROR)),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates an unsuccessful-response error, falling back to the generic message.
    #[must_use]
    pub fn unsuccessful(message: Option<String>) -> Self {
        Self::Unsuccessful {
            message: message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| String::from(GENERIC_SERVICE_ERROR)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_user_input() {
        let err = EnvforgeError::from(EditorError::out_of_range("service", 3, 1));
        assert_eq!(err.category(), ErrorCategory::UserInput);

        let err = EnvforgeError::from(ServiceError::EmptyMarkup);
        assert_eq!(err.category(), ErrorCategory::UserInput);
    }

    #[test]
    fn test_category_transport() {
        let err = EnvforgeError::from(ServiceError::network("connection refused"));
        assert_eq!(err.category(), ErrorCategory::Transport);
    }

    #[test]
    fn test_generic_fallback_message() {
        let err = ServiceError::unsuccessful(None);
        assert_eq!(err.to_string(), GENERIC_SERVICE_ERROR);

        let err = ServiceError::unsuccessful(Some(String::new()));
        assert_eq!(err.to_string(), GENERIC_SERVICE_ERROR);

        let err = ServiceError::api_error(500, Some(String::from("boom")));
        assert_eq!(err.to_string(), "Configuration service request failed: 500 - boom");
    }

    #[test]
    fn test_index_error_message() {
        let err = EditorError::out_of_range("port", 2, 1);
        assert_eq!(err.to_string(), "port index 2 is out of range (length 1)");
    }
}
