//! # CanSat Dashboard
//!
//! Live ground-station dashboard for a CanSat payload.
//!
//! Reads the payload's text telemetry from the ground receiver's serial port
//! and shows it as live charts, read-outs and a 3D orientation view.

use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::watch;
use tracing::{error, info, warn};

use cansat_dashboard::camera::webview::{run_webview, CAMERA_VIEW_FLAG};
use cansat_dashboard::camera::CameraLauncher;
use cansat_dashboard::config::Config;
use cansat_dashboard::display;
use cansat_dashboard::serial::reader::{ReaderHandle, TelemetryReader};
use cansat_dashboard::serial::TelemetrySerial;
use cansat_dashboard::telemetry::recorder::TelemetryRecorder;
use cansat_dashboard::telemetry::TelemetryState;

/// How long to wait for the reader to finish after the window closes
const READER_STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Worker threads for the telemetry runtime
const RUNTIME_WORKER_THREADS: usize = 2;

/// Main entry point for the CanSat dashboard
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first argument, or built-in defaults)
///    - Open the serial link and spawn the telemetry reader
///
/// 2. **Dashboard**
///    - Run the window on the main thread until it is closed
///
/// 3. **Shutdown**
///    - Signal the reader to stop and wait for it (bounded)
///    - The serial port is released when the reader exits
///
/// If the serial port cannot be opened the reader stays off for the whole
/// session and the window shows placeholders.
///
/// Run as `cansat-dashboard --camera-view <url>` the binary instead hosts
/// the embedded camera browser; the dashboard launches itself this way.
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().map(String::as_str) == Some(CAMERA_VIEW_FLAG) {
        let url = args
            .get(1)
            .ok_or_else(|| anyhow!("{} requires a URL", CAMERA_VIEW_FLAG))?;
        run_webview(url)?;
        return Ok(());
    }

    let config = match args.first() {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => Config::default(),
    };

    info!("CanSat Dashboard v{} starting...", env!("CARGO_PKG_VERSION"));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(RUNTIME_WORKER_THREADS)
        .thread_name("telemetry")
        .enable_all()
        .build()
        .context("Failed to start telemetry runtime")?;

    let (updates_tx, updates_rx) = watch::channel(TelemetryState::new(config.display.history_len));
    let reader = start_reader(&runtime, &config, updates_tx);

    let camera = CameraLauncher::embedded(config.camera.url.clone());
    let result = display::run(&config, updates_rx, camera);
    info!("Dashboard window closed");

    if let Some(reader) = reader {
        if let Some(stats) = runtime.block_on(reader.stop(READER_STOP_TIMEOUT)) {
            info!("Total records received: {}", stats.records);
        }
    }

    result?;
    Ok(())
}

/// Open the serial link and spawn the reader
///
/// Returns `None` when the port cannot be opened; there is no retry.
fn start_reader(
    runtime: &Runtime,
    config: &Config,
    updates: watch::Sender<TelemetryState>,
) -> Option<ReaderHandle> {
    let serial = {
        let _guard = runtime.enter();
        TelemetrySerial::open(&config.serial)
    };

    let serial = match serial {
        Ok(serial) => serial,
        Err(e) => {
            error!("Serial connection error: {}", e);
            warn!("Telemetry reader disabled for this session");
            return None;
        }
    };

    let mut reader = TelemetryReader::new(serial, config, updates);
    if config.recording.enabled {
        match TelemetryRecorder::new(&config.recording) {
            Ok(recorder) => reader = reader.with_recorder(recorder),
            Err(e) => warn!("Telemetry recording disabled: {}", e),
        }
    }

    Some(ReaderHandle::spawn(runtime.handle(), reader))
}
