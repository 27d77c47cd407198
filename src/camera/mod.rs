//! # Camera View Module
//!
//! Opens the payload camera's built-in streaming page in an embedded browser.
//!
//! This module handles:
//! - Starting at most one camera view at a time
//! - Running the blocking viewer on its own background thread
//! - Hosting the embedded browser window (see [`webview`])
//!
//! The stream itself is never decoded here; the camera serves a web page and
//! the embedded browser renders it.

pub mod webview;

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

use crate::error::{DashboardError, Result};

/// Something that can show the camera page
///
/// `open` blocks for as long as the view is open.
#[cfg_attr(test, mockall::automock)]
pub trait ViewerBackend: Send + Sync {
    /// Show `url` and block until the view is closed
    fn open(&self, url: &str) -> Result<()>;

    /// Close any open view
    fn close(&self);
}

/// Result of a launch request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// A new viewer thread was started
    Started,
    /// The previous view is still open; nothing was started
    AlreadyOpen,
}

/// Starts the camera view on demand, one at a time
pub struct CameraLauncher {
    url: String,
    backend: Arc<dyn ViewerBackend>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for CameraLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraLauncher")
            .field("url", &self.url)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl CameraLauncher {
    pub fn new(url: impl Into<String>, backend: Arc<dyn ViewerBackend>) -> Self {
        Self {
            url: url.into(),
            backend,
            worker: None,
        }
    }

    /// Launcher using the embedded browser window
    pub fn embedded(url: impl Into<String>) -> Self {
        Self::new(url, Arc::new(webview::ChildProcessViewer::new()))
    }

    /// Open the camera view unless one is already open
    ///
    /// # Errors
    ///
    /// Returns `Camera` if the viewer thread cannot be spawned
    pub fn launch(&mut self) -> Result<LaunchOutcome> {
        if self.is_open() {
            info!("Camera view already open");
            return Ok(LaunchOutcome::AlreadyOpen);
        }

        let backend = Arc::clone(&self.backend);
        let url = self.url.clone();
        let worker = thread::Builder::new()
            .name("camera-view".to_string())
            .spawn(move || {
                info!("Opening camera view at {}", url);
                match backend.open(&url) {
                    Ok(()) => info!("Camera view closed"),
                    Err(e) => warn!("Camera view failed: {}", e),
                }
            })
            .map_err(|e| DashboardError::Camera(format!("Failed to start camera thread: {}", e)))?;

        self.worker = Some(worker);
        Ok(LaunchOutcome::Started)
    }

    /// Whether a viewer thread is still running
    pub fn is_open(&self) -> bool {
        self.worker.as_ref().map_or(false, |w| !w.is_finished())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    #[cfg(test)]
    fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.join().unwrap();
        }
    }
}

impl Drop for CameraLauncher {
    fn drop(&mut self) {
        if self.is_open() {
            self.backend.close();
        }
    }
}
