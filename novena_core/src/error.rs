//! Error types for the novena_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for novena_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Novena day outside 1..=54
    #[error("invalid novena day: {0} (must be 1..=54)")]
    DayOutOfRange(u32),

    /// Unknown prayer or chaplet name
    #[error("unknown prayer type: {0}")]
    UnknownPrayerType(String),

    /// Liturgical calendar provider failure
    #[error("calendar provider error: {0}")]
    Provider(String),

    /// State management error
    #[error("State error: {0}")]
    State(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
