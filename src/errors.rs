/*!
 * Error types for the subtrans library.
 *
 * Provider failures are normalized into a single taxonomy (`ErrorKind`) so the
 * retry controller and the fallback router can reason about them without
 * knowing which backend produced them.
 */

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Classification of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Credential missing, rejected or revoked
    Auth,
    /// Usage quota exhausted for the current billing period or identity
    QuotaExceeded,
    /// Too many requests in a short window
    RateLimited,
    /// Backend returned a 5xx status
    Server,
    /// Request did not complete in time
    Timeout,
    /// Connection could not be established or was dropped
    Network,
    /// Anything else
    Unknown,
}

impl ErrorKind {
    /// Permanent kinds are never retried
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Auth | Self::QuotaExceeded)
    }

    /// Classify an HTTP status code plus response body
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => Self::Auth,
            403 | 456 => Self::QuotaExceeded,
            429 if body.contains("insufficient_quota") => Self::QuotaExceeded,
            429 => Self::RateLimited,
            408 => Self::Timeout,
            500..=599 => Self::Server,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auth => "auth",
            Self::QuotaExceeded => "quota_exceeded",
            Self::RateLimited => "rate_limited",
            Self::Server => "server",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Usage quota exhausted
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Provider requires a credential that was not supplied
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// The taxonomy class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationError(_) | Self::NotConfigured(_) => ErrorKind::Auth,
            Self::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
            Self::RateLimitExceeded(_) => ErrorKind::RateLimited,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::ConnectionError(_) => ErrorKind::Network,
            Self::ApiError { status_code, message } => ErrorKind::from_status(*status_code, message),
            Self::RequestFailed(_) | Self::ParseError(_) => ErrorKind::Unknown,
        }
    }

    /// Build an error from a non-success HTTP status and its body
    pub fn from_status(status_code: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match ErrorKind::from_status(status_code, &body) {
            ErrorKind::Auth => Self::AuthenticationError(format!("{} - {}", status_code, body)),
            ErrorKind::QuotaExceeded => Self::QuotaExceeded(format!("{} - {}", status_code, body)),
            ErrorKind::RateLimited => Self::RateLimitExceeded(format!("{} - {}", status_code, body)),
            ErrorKind::Timeout => Self::Timeout(format!("{} - {}", status_code, body)),
            _ => Self::ApiError { status_code, message: body },
        }
    }

    /// Human-readable explanation suitable for showing to an operator
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Auth => "Invalid or missing API key".to_string(),
            ErrorKind::QuotaExceeded => "API usage quota exceeded".to_string(),
            ErrorKind::RateLimited => "Too many requests, try again later".to_string(),
            ErrorKind::Server => "Translation server error".to_string(),
            ErrorKind::Timeout => "Request timed out".to_string(),
            ErrorKind::Network => "Network connection failed".to_string(),
            ErrorKind::Unknown => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if let Some(status) = error.status() {
            Self::from_status(status.as_u16(), error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Document-level failures surfaced by a translation pass
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The input document could not be read
    #[error("Failed to read subtitle document {path:?}: {source}")]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input document is not valid UTF-8
    #[error("Subtitle document {0:?} is not valid UTF-8")]
    InvalidEncoding(PathBuf),

    /// The translated document could not be written
    #[error("Failed to write translated document {path:?}: {message}")]
    DocumentWrite {
        path: PathBuf,
        message: String,
    },

    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Credential store failure
    #[error("Credential store error: {0}")]
    Credentials(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Credentials(error.to_string())
    }
}
