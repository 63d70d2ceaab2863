use std::fmt;

/// Errors that can occur while talking to the chat service
#[derive(Debug)]
pub enum ConnectorError {
    /// HTTP request/response error
    HttpError(String),
    /// The service answered with a status the operation does not accept
    UnexpectedStatus(u16),
    /// Service unreachable or timeout
    ServiceUnavailable(String),
    /// Invalid response format from the chat service
    InvalidResponse(String),
    /// Not found (404) or nothing configured to look up
    NotFound(String),
    /// Internal error in connector
    Internal(String),
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            Self::UnexpectedStatus(status) => write!(f, "Unexpected HTTP status: {}", status),
            Self::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ConnectorError {}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ServiceUnavailable(format!("Request timeout: {}", err))
        } else if err.is_connect() {
            Self::ServiceUnavailable(format!("Connection failed: {}", err))
        } else if let Some(status) = err.status() {
            Self::UnexpectedStatus(status.as_u16())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}
