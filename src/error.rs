//! Error types for GenieX
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for GenieX operations
///
/// This enum encompasses all possible errors that can occur while loading
/// configuration, talking to the chat store service, generating replies,
/// and persisting local preferences.
#[derive(Error, Debug)]
pub enum GeniexError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chat store service errors (persistence endpoints)
    #[error("Store error: {0}")]
    Store(String),

    /// Reply generation errors (the remote /chat endpoint)
    #[error("Reply error: {0}")]
    Reply(String),

    /// No authenticated user is available for an operation that needs one
    #[error("Not signed in: {0}")]
    NotSignedIn(String),

    /// Local preference storage errors
    #[error("Preferences error: {0}")]
    Preferences(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for GenieX operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
