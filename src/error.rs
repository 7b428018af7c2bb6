//! CoHive Files Error Types

use thiserror::Error;

/// Result type alias for CoHive Files operations
pub type Result<T> = std::result::Result<T, Error>;

/// CoHive Files error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Client input errors
    #[error("Invalid path. Must start with /Workspace, /Volumes, or dbfs:")]
    InvalidPath(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Unsupported encoding: {0} (expected 'text' or 'base64')")]
    InvalidEncoding(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    // Backend errors
    #[error("Databricks API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Error reading {namespace} file: {reason}")]
    Read {
        namespace: &'static str,
        reason: String,
    },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Decoding errors
    #[error("Invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if this error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidPath(_)
                | Error::MissingField(_)
                | Error::InvalidEncoding(_)
                | Error::InvalidBody(_)
        )
    }

    /// Wrap a backend failure with the namespace it happened in
    pub fn read_failure(namespace: &'static str, err: Error) -> Self {
        Error::Read {
            namespace,
            reason: err.to_string(),
        }
    }
}
