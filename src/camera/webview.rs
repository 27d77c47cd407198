//! # Embedded Camera Browser
//!
//! The browser window needs an event loop on the main thread of its own
//! process, so the dashboard re-runs its own executable with
//! [`CAMERA_VIEW_FLAG`] and waits on that child.

use std::process::{Child, Command};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use tao::dpi::LogicalSize;
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop};
use tao::window::WindowBuilder;
use tracing::{debug, warn};
use wry::WebViewBuilder;

use super::ViewerBackend;
use crate::error::{DashboardError, Result};

/// Command-line flag that runs the binary as the camera viewer
pub const CAMERA_VIEW_FLAG: &str = "--camera-view";

/// Title of the camera window
pub const CAMERA_WINDOW_TITLE: &str = "ESP32-CAM Live Stream";

/// How often the launcher thread checks whether the viewer exited
const CHILD_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Runs the camera window as a child process of the dashboard
#[derive(Debug, Default)]
pub struct ChildProcessViewer {
    child: Mutex<Option<Child>>,
}

impl ChildProcessViewer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ViewerBackend for ChildProcessViewer {
    fn open(&self, url: &str) -> Result<()> {
        let exe = std::env::current_exe()?;
        let child = Command::new(exe)
            .arg(CAMERA_VIEW_FLAG)
            .arg(url)
            .spawn()
            .map_err(|e| DashboardError::Camera(format!("Failed to start camera viewer: {}", e)))?;
        debug!("Camera viewer started (pid {})", child.id());

        if let Ok(mut slot) = self.child.lock() {
            *slot = Some(child);
        }

        loop {
            thread::sleep(CHILD_POLL_INTERVAL);

            let mut slot = self
                .child
                .lock()
                .map_err(|_| DashboardError::Camera("camera viewer state poisoned".to_string()))?;
            let Some(child) = slot.as_mut() else {
                // Closed by the dashboard.
                return Ok(());
            };

            if let Some(status) = child.try_wait()? {
                slot.take();
                if !status.success() {
                    return Err(DashboardError::Camera(format!(
                        "Camera viewer exited with {}",
                        status
                    )));
                }
                return Ok(());
            }
        }
    }

    fn close(&self) {
        let Ok(mut slot) = self.child.lock() else {
            return;
        };
        if let Some(mut child) = slot.take() {
            if let Err(e) = child.kill() {
                warn!("Failed to stop camera viewer: {}", e);
            }
            // Reap the process.
            let _ = child.wait();
        }
    }
}

/// Show `url` in an embedded browser window
///
/// Runs the window's event loop on the calling thread and only returns on
/// error; closing the window exits the process.
///
/// # Errors
///
/// Returns `Camera` if the window or web view cannot be created
pub fn run_webview(url: &str) -> Result<()> {
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(CAMERA_WINDOW_TITLE)
        .with_inner_size(LogicalSize::new(480.0, 360.0))
        .with_resizable(true)
        .build(&event_loop)
        .map_err(|e| DashboardError::Camera(format!("Failed to create camera window: {}", e)))?;

    #[cfg(not(target_os = "linux"))]
    let builder = WebViewBuilder::new(&window);

    #[cfg(target_os = "linux")]
    let builder = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window
            .default_vbox()
            .ok_or_else(|| DashboardError::Camera("Camera window has no GTK container".to_string()))?;
        WebViewBuilder::new_gtk(vbox)
    };

    let webview = builder
        .with_url(url)
        .build()
        .map_err(|e| DashboardError::Camera(format!("Failed to create web view: {}", e)))?;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;
        let _ = (&window, &webview);

        if let Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } = event
        {
            *control_flow = ControlFlow::Exit;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_without_open_is_noop() {
        let viewer = ChildProcessViewer::new();
        viewer.close();
        assert!(viewer.child.lock().unwrap().is_none());
    }

    #[test]
    fn test_viewer_flag_is_distinct_from_config_paths() {
        assert!(CAMERA_VIEW_FLAG.starts_with("--"));
    }
}
