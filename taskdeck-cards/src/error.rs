//! Error types for the card engine

use thiserror::Error;

/// Result type for card operations
pub type Result<T> = std::result::Result<T, DeckError>;

/// Errors that can occur while querying or mutating cards
#[derive(Debug, Error)]
pub enum DeckError {
    /// Missing or invalid configuration (credentials, board name)
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The remote store rejected the credentials
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// Bad user input: invalid regex, unparsable date, conflicting flags
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// A named board, list, tag or card does not resolve
    #[error("{resource} not found: {name}")]
    NotFound { resource: String, name: String },

    /// A repository call failed in transit or with an unexpected status
    #[error("network error: {message}")]
    Network { message: String },

    /// The external editor could not be launched or exited unsuccessfully
    #[error("editor failed: {message}")]
    Editor { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeckError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(resource: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            name: name.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an editor error
    pub fn editor(message: impl Into<String>) -> Self {
        Self::Editor {
            message: message.into(),
        }
    }

    /// Process exit code for a command that failed with this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => 2,
            Self::Config { .. } => 3,
            Self::Auth { .. } => 4,
            Self::NotFound { .. } => 5,
            Self::Network { .. } => 6,
            Self::Editor { .. } | Self::Io(_) | Self::Json(_) => 1,
        }
    }

    /// Whether a failure on one card should end the whole session.
    ///
    /// Rejected credentials will fail every following card too; anything else
    /// is reported against the card and the session moves on.
    pub fn is_fatal_in_session(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::Config { .. })
    }
}

impl From<reqwest::Error> for DeckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::network(format!("malformed response: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}
