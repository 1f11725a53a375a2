//! Error types for the Freizeit API client

use thiserror::Error;

/// Result alias for API calls
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur when talking to the events backend
///
/// Cloneable so failures can travel inside reducer actions.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The backend could not be reached at all
    #[error(
        "Netzwerk-Fehler: Backend nicht erreichbar unter {url}. Bitte prüfe, ob der Server läuft. ({reason})"
    )]
    Unreachable {
        /// Base URL that was tried
        url: String,
        /// Transport error
        reason: String,
    },

    /// 401 - the session is no longer valid
    #[error("Nicht autorisiert. Bitte melde dich erneut an.")]
    Unauthorized,

    /// 403 - the session was rejected
    #[error("Zugriff verweigert. Bitte melde dich erneut an.")]
    Forbidden,

    /// The backend rejected the request and explained why
    #[error("{message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// The backend rejected the request without a usable message
    #[error("API Error: {status} {reason}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        reason: String,
    },

    /// Response parsing failed
    #[error("Antwort konnte nicht gelesen werden: {0}")]
    ResponseParseFailed(String),

    /// The call needs a session token but none is stored
    #[error("Nicht angemeldet.")]
    NotAuthenticated,
}

impl ApiError {
    /// HTTP status carried by the error, if any
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::Rejected { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Unreachable { .. } | Self::ResponseParseFailed(_) | Self::NotAuthenticated => {
                None
            },
        }
    }

    /// Whether the error carries no explanation a user could act on
    ///
    /// True for a bare HTTP 400 and for any message that only names a status
    /// code ("400", "API Error").
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        match self {
            Self::Status { .. } => true,
            Self::Rejected { message, .. } => {
                message.trim().is_empty() || message.contains("400") || message.contains("API Error")
            },
            _ => false,
        }
    }
}

/// Error building an [`ApiConfig`](crate::ApiConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL is not an absolute http(s) URL
    #[error("Invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// The rejected URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}
