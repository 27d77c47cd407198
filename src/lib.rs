//! # CanSat Dashboard Library
//!
//! Live ground-station dashboard for CanSat serial telemetry.
//!
//! This library provides the pieces behind the dashboard window: parsing the
//! payload's text telemetry, keeping rolling histories, reading the serial
//! link in the background, and drawing charts and the orientation view.

pub mod camera;
pub mod config;
pub mod display;
pub mod error;
pub mod serial;
pub mod telemetry;
