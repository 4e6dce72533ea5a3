//! Core error types for repflow-core.
//!
//! Session timing problems are handled locally (clamped or ignored); only
//! the errors below ever reach a host.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for repflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session lifecycle errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Cast connection errors
    #[error("Cast error: {0}")]
    Cast(#[from] CastError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Workout document errors
    #[error("Workout error: {0}")]
    Workout(#[from] WorkoutError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by the session engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The workout flattened to zero work items and cannot be played.
    #[error("Workout '{workout}' has no exercises and cannot be started")]
    EmptyWorkout { workout: String },
}

/// Cast connection errors. Never affect the session state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CastError {
    /// The requested device is not among the discovered devices
    #[error("Cast device not found: {0}")]
    DeviceNotFound(String),

    /// The device refused or dropped the connection
    #[error("Failed to connect to '{device}': {message}")]
    ConnectFailed { device: String, message: String },

    /// The connection attempt did not finish in time
    #[error("Timed out connecting to '{device}' after {timeout_ms} ms")]
    Timeout { device: String, timeout_ms: u64 },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors loading a workout document.
#[derive(Error, Debug)]
pub enum WorkoutError {
    /// Failed to read the document
    #[error("Failed to read workout from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is not a valid workout
    #[error("Failed to parse workout: {0}")]
    Parse(#[from] serde_json::Error),

    /// Document parsed but violates a workout rule
    #[error("Invalid workout: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
