//! # Telemetry Module
//!
//! Turns the payload's text telemetry into dashboard state.
//!
//! This module handles:
//! - Recognizing sensor-data blocks and extracting their fields
//! - Keeping bounded rolling histories of charted channels
//! - Tracking the latest value of every channel
//! - Optionally recording parsed records to rotating JSONL files

pub mod buffer;
pub mod parser;
pub mod recorder;
pub mod state;
pub mod types;

pub use buffer::RollingBuffer;
pub use state::{LatestSnapshot, Orientation, TelemetryState};
pub use types::{Channel, Reading, TelemetryRecord};
