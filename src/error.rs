//! Error types and handling for the `SkySentry` core

use thiserror::Error;

/// Main error type for the `SkySentry` library
#[derive(Error, Debug)]
pub enum SkySentryError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Weather provider communication errors
    #[error("Provider error: {message}")]
    Provider { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Profile store errors
    #[error("Profile store error: {message}")]
    Storage { message: String },

    /// Notification delivery errors
    #[error("Delivery error: {message}")]
    Delivery { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl SkySentryError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a new profile store error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a new delivery error
    pub fn delivery<S: Into<String>>(message: S) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SkySentryError::Config { .. } => {
                "Configuration error. Please check your API key and settings.".to_string()
            }
            SkySentryError::Provider { .. } => {
                "Unable to reach the weather service. Please try again later.".to_string()
            }
            SkySentryError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            SkySentryError::Cache { .. } => {
                "Cache operation failed. You may need to clear the cache directory.".to_string()
            }
            SkySentryError::Storage { .. } => {
                "Could not read or write user data. Please check file permissions.".to_string()
            }
            SkySentryError::Delivery { .. } => {
                "Could not deliver the notification.".to_string()
            }
            SkySentryError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
