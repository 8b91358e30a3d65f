//! Client error types

use std::collections::BTreeMap;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server-side validation rejected the request
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    /// Conflicting state (e.g. duplicate e-mail)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Short text suitable for a transient notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            Self::Http(_) => "Could not reach the server".to_string(),
            Self::Unauthorized => "Your session has expired, please sign in again".to_string(),
            Self::Forbidden(_) => "You do not have permission for this action".to_string(),
            Self::NotFound(_) => "Record not found".to_string(),
            Self::Validation { message, .. } if !message.is_empty() => message.clone(),
            Self::Validation { .. } => "The server rejected the submitted data".to_string(),
            Self::Conflict(msg) => msg.clone(),
            Self::InvalidResponse(_) | Self::Internal(_) => {
                "Unexpected server error".to_string()
            }
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
