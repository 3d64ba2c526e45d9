//! API error types for the HalalNest client.

use thiserror::Error;

/// Errors that can occur when talking to the HalalNest backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the merchant's credentials.
    #[error("Authentication failed: sign in again")]
    Unauthorized,

    /// The merchant may not access this resource.
    #[error("Permission denied: you don't have access to this resource")]
    Forbidden,

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The resource changed underneath the request.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend refused the submitted values.
    #[error("Rejected by server: {0}")]
    Validation(String),

    /// Too many requests.
    #[error("Rate limited: please wait before retrying")]
    RateLimited,

    /// Backend failure.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The response body did not have the expected shape.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from an HTTP status code.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound(context.to_string()),
            409 => ApiError::Conflict(context.to_string()),
            422 => ApiError::Validation(context.to_string()),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(format!("HTTP {}: {}", status, context)),
            _ => ApiError::ServerError(format!("Unexpected HTTP {}: {}", status, context)),
        }
    }

    /// Whether repeating the request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited | ApiError::ServerError(_) | ApiError::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_from_status_401() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "test");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_error_from_status_403() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, "test");
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[test]
    fn test_error_from_status_404() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "product 42");
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "product 42"),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_error_from_status_409_and_422() {
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, "order 7"),
            ApiError::Conflict(_)
        ));
        match ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "status is invalid") {
            ApiError::Validation(msg) => assert_eq!(msg, "status is invalid"),
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_error_from_status_429() {
        let err = ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "test");
        assert!(matches!(err, ApiError::RateLimited));
    }

    #[test]
    fn test_error_from_status_500() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "test");
        assert!(matches!(err, ApiError::ServerError(_)));
    }

    #[test]
    fn test_retryable() {
        assert!(ApiError::RateLimited.is_retryable());
        assert!(ApiError::ServerError("boom".into()).is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(!ApiError::NotFound("x".into()).is_retryable());
        assert!(!ApiError::Validation("x".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("product 42".to_string());
        assert_eq!(err.to_string(), "Resource not found: product 42");
    }
}
