//! Error types for rapid_textclean
//!
//! This module defines the crate-level error type used for construction-time
//! failures: unsupported languages, unreadable resource files, malformed
//! substitution tables. Composition-time and run-time pipeline diagnostics
//! are not errors in this sense — see [`crate::pipeline::errors`].

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TextCleanError>;

/// Main error type for rapid_textclean
#[derive(Error, Debug, Clone)]
pub enum TextCleanError {
    /// A language code outside the supported set was requested
    #[error("Unsupported language '{code}'. Supported languages are: {supported}")]
    UnsupportedLanguage { code: String, supported: String },

    /// A resource file (ignore list, name list, substitution table) could not be read
    #[error("Failed to read resource '{path}': {message}")]
    Resource { path: String, message: String },

    /// A substitution or contraction table was malformed
    #[error("Invalid table '{path}': {message}")]
    InvalidTable { path: String, message: String },

    /// Internal error (should not occur in normal usage)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TextCleanError {
    /// Create an unsupported language error
    pub fn unsupported_language(code: impl Into<String>, supported: &[&str]) -> Self {
        Self::UnsupportedLanguage {
            code: code.into(),
            supported: supported.join(", "),
        }
    }

    /// Create a resource error
    pub fn resource(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resource {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid table error
    pub fn invalid_table(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTable {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
