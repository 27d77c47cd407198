//! # Display Module
//!
//! The live dashboard window.
//!
//! This module handles:
//! - Scheduling the chart and orientation refreshes
//! - Turning telemetry histories into chart series
//! - Rotating and projecting the orientation cylinder
//! - Laying out and drawing the window

pub mod app;
pub mod charts;
pub mod orientation;
pub mod schedule;

pub use app::{run, DashboardApp};
