//! # Error Types
//!
//! Custom error types for the CanSat dashboard using `thiserror`.

use thiserror::Error;

/// Main error type for the CanSat dashboard
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Serial port could not be opened or configured
    #[error("Serial error: {0}")]
    Serial(String),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration parsed but holds an out-of-range value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Telemetry record could not be serialized for recording
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Camera view could not be started
    #[error("Camera view error: {0}")]
    Camera(String),

    /// Dashboard window could not be created or crashed
    #[error("Dashboard window error: {0}")]
    Window(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the CanSat dashboard
pub type Result<T> = std::result::Result<T, DashboardError>;
