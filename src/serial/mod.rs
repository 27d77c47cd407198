//! # Serial Communication Module
//!
//! Handles the serial link to the CanSat ground receiver.
//!
//! This module handles:
//! - Opening the serial port at 115,200 baud (8N1, no flow control)
//! - Draining whatever bytes are pending on each poll
//! - Framing the byte stream into telemetry blocks
//! - Running the background reader that publishes telemetry state

pub mod framer;
pub mod port_trait;
pub mod reader;

use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio_serial::{SerialPort, SerialPortBuilderExt};
use tracing::{debug, info};

use crate::config::SerialConfig;
use crate::error::{DashboardError, Result};
pub use port_trait::TelemetrySource;

/// Default baud rate of the CanSat ground receiver
pub const TELEMETRY_BAUD_RATE: u32 = 115_200;

/// Serial link to the ground receiver
pub struct TelemetrySerial {
    /// Serial port handle
    port: tokio_serial::SerialStream,
    /// Device path (e.g., /dev/ttyUSB0 or COM4)
    device_path: String,
    /// Upper bound on a single read
    read_timeout: Duration,
}

impl std::fmt::Debug for TelemetrySerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetrySerial")
            .field("device_path", &self.device_path)
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

impl TelemetrySerial {
    /// Open the serial port named in the configuration
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `Serial` if the port cannot be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cansat_dashboard::config::SerialConfig;
    /// use cansat_dashboard::serial::TelemetrySerial;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let serial = TelemetrySerial::open(&SerialConfig::default())?;
    ///     println!("Connected to: {}", serial.device_path());
    ///     Ok(())
    /// }
    /// ```
    pub fn open(config: &SerialConfig) -> Result<Self> {
        debug!("Trying to open serial port: {}", config.port);
        let port = Self::open_port(&config.port, config.baud_rate, config.timeout_ms)?;
        info!(
            "Opened telemetry link at {} ({} baud)",
            config.port, config.baud_rate
        );

        Ok(Self {
            port,
            device_path: config.port.clone(),
            read_timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    /// Open a specific serial port with telemetry link settings
    fn open_port(path: &str, baud_rate: u32, timeout_ms: u64) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(Duration::from_millis(timeout_ms))
            .open_native_async()
            .map_err(|e| DashboardError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// Device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl TelemetrySource for TelemetrySerial {
    async fn read_available(&mut self) -> io::Result<Vec<u8>> {
        let waiting = self.port.bytes_to_read().map_err(io::Error::from)? as usize;
        if waiting == 0 {
            return Ok(Vec::new());
        }

        let mut buf = vec![0u8; waiting];
        let read = tokio::time::timeout(self.read_timeout, AsyncReadExt::read(&mut self.port, &mut buf))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "serial read timed out"))??;
        buf.truncate(read);

        debug!("Read {} bytes from {}", read, self.device_path);
        Ok(buf)
    }
}
