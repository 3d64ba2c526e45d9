//! Centralized error types for HalalNest.
//!
//! Aggregates configuration and API failures and turns them into messages
//! suitable for the dashboard's error dialog and toasts.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// IO errors (file system, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal-related errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Generic errors with a message.
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Create a terminal error.
    pub fn terminal(msg: impl Into<String>) -> Self {
        AppError::Terminal(msg.into())
    }

    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::CreateDirError(_) => {
                    "Could not create configuration directory. Check file permissions.".to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Please check it exists and is readable."
                        .to_string()
                }
                ConfigError::WriteError(_) => {
                    "Could not save configuration. Please check file permissions.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                ConfigError::SerializeError(_) => {
                    "Could not save configuration. Internal error.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
                ConfigError::ProfileNotFound(name) => format!("Profile '{}' not found.", name),
            },
            AppError::Api(e) => match e {
                ApiError::Unauthorized => {
                    "Authentication failed. Your merchant session is no longer valid.".to_string()
                }
                ApiError::Forbidden => {
                    "Access denied. This merchant cannot access that resource.".to_string()
                }
                ApiError::NotFound(resource) => format!("'{}' was not found.", resource),
                ApiError::Conflict(msg) => {
                    format!("The record changed on the server: {}. Refresh and try again.", msg)
                }
                ApiError::Validation(msg) => format!("The server rejected the change: {}", msg),
                ApiError::RateLimited => {
                    "Too many requests. Please wait a moment and try again.".to_string()
                }
                ApiError::ServerError(_) => {
                    "HalalNest server error. Please try again later.".to_string()
                }
                ApiError::Network(_) => {
                    "Connection failed. Please check your internet connection.".to_string()
                }
                ApiError::InvalidUrl(_) => "Invalid API URL in configuration.".to_string(),
                ApiError::InvalidResponse(_) => {
                    "Unexpected response from the server. Please try again.".to_string()
                }
            },
            AppError::Io(_) => "A file operation failed. Please check file permissions.".to_string(),
            AppError::Terminal(msg) => format!("Terminal error: {}", msg),
            AppError::Other(msg) => msg.clone(),
        }
    }

    /// Check if this error is critical and requires user acknowledgment.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::Api(ApiError::Unauthorized)
                | AppError::Api(ApiError::Forbidden)
                | AppError::Api(ApiError::InvalidUrl(_))
                | AppError::Terminal(_)
        )
    }

    /// Check if this error is recoverable.
    ///
    /// Recoverable errors are shown as a toast and the user can keep working.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Api(ApiError::RateLimited)
                | AppError::Api(ApiError::ServerError(_))
                | AppError::Api(ApiError::Network(_))
                | AppError::Api(ApiError::NotFound(_))
                | AppError::Api(ApiError::Conflict(_))
                | AppError::Api(ApiError::Validation(_))
                | AppError::Api(ApiError::InvalidResponse(_))
        )
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Config(ConfigError::NoConfigDir)
            | AppError::Config(ConfigError::ReadError(_))
            | AppError::Config(ConfigError::ProfileNotFound(_)) => {
                Some("Add a [[profiles]] entry to config.toml or pass --profile.")
            }
            AppError::Api(ApiError::Unauthorized) => {
                Some("Check the merchant_id and API URL of the active profile.")
            }
            AppError::Api(ApiError::RateLimited) => {
                Some("Wait a few seconds and press 'r' to refresh.")
            }
            AppError::Api(ApiError::Conflict(_)) => Some("Press 'r' to reload the latest data."),
            AppError::Api(ApiError::Network(_)) | AppError::Api(ApiError::InvalidUrl(_)) => {
                Some("Check your internet connection and the profile URL.")
            }
            _ => None,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
