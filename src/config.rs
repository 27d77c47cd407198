//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a built-in default, so the dashboard runs without any
//! file at all and a file only needs to name the values it overrides.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{DashboardError, Result};

/// Baud rates accepted for the telemetry link
const SUPPORTED_BAUD_RATES: &[u32] = &[9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_max_pending_bytes")]
    pub max_pending_bytes: usize,

    /// Wait after opening the port before the first read (board reset)
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

/// Dashboard window configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_team")]
    pub team: String,

    #[serde(default = "default_chart_refresh_ms")]
    pub chart_refresh_ms: u64,

    #[serde(default = "default_orientation_refresh_ms")]
    pub orientation_refresh_ms: u64,

    #[serde(default = "default_history_len")]
    pub history_len: usize,
}

/// Camera stream configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    #[serde(default = "default_camera_url")]
    pub url: String,
}

/// Telemetry recording configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RecordingConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

// Default value functions
#[cfg(windows)]
fn default_serial_port() -> String { "COM4".to_string() }
#[cfg(not(windows))]
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 115200 }
fn default_timeout_ms() -> u64 { 1000 }
fn default_poll_interval_ms() -> u64 { 100 }
fn default_max_pending_bytes() -> usize { 4096 }
fn default_settle_ms() -> u64 { 2000 }

fn default_title() -> String {
    "ICESCO's 4th International CanSat Training Workshop & Aerospace Symposium".to_string()
}
fn default_team() -> String { "Team: ICESCO SatRiders 2.0".to_string() }
fn default_chart_refresh_ms() -> u64 { 100 }
fn default_orientation_refresh_ms() -> u64 { 100 }
fn default_history_len() -> usize { 50 }

fn default_camera_url() -> String { "http://192.168.4.1/".to_string() }

fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_pending_bytes: default_max_pending_bytes(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            team: default_team(),
            chart_refresh_ms: default_chart_refresh_ms(),
            orientation_refresh_ms: default_orientation_refresh_ms(),
            history_len: default_history_len(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { url: default_camera_url() }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
        }
    }
}

fn invalid(msg: impl Into<String>) -> DashboardError {
    DashboardError::InvalidConfig(msg.into())
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cansat_dashboard::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first out-of-range value
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if !SUPPORTED_BAUD_RATES.contains(&self.serial.baud_rate) {
            return Err(invalid(format!(
                "baud_rate must be one of: {:?}",
                SUPPORTED_BAUD_RATES
            )));
        }

        for (name, value) in [
            ("timeout_ms", self.serial.timeout_ms),
            ("poll_interval_ms", self.serial.poll_interval_ms),
            ("chart_refresh_ms", self.display.chart_refresh_ms),
            ("orientation_refresh_ms", self.display.orientation_refresh_ms),
        ] {
            if value == 0 || value > 10000 {
                return Err(invalid(format!("{} must be between 1 and 10000", name)));
            }
        }

        if self.serial.settle_ms > 10000 {
            return Err(invalid("settle_ms must be at most 10000"));
        }

        if self.serial.max_pending_bytes < 64 {
            return Err(invalid("max_pending_bytes must be at least 64"));
        }

        if self.display.history_len == 0 || self.display.history_len > 10000 {
            return Err(invalid("history_len must be between 1 and 10000"));
        }

        if self.camera.url.is_empty() {
            return Err(invalid("camera url cannot be empty"));
        }

        if self.recording.enabled && self.recording.log_dir.is_empty() {
            return Err(invalid("recording log_dir cannot be empty when enabled"));
        }

        if self.recording.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.recording.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        Ok(())
    }
}
