//! # Chart Frames
//!
//! Copies the telemetry histories into plot-ready series.
//!
//! A [`ChartFrame`] is rebuilt on each chart refresh and rendered unchanged
//! until the next one.

use eframe::egui::Color32;

use crate::telemetry::{Channel, RollingBuffer, TelemetryState};

/// Chart accent used for the banner and labels
pub const ACCENT: Color32 = Color32::from_rgb(0x00, 0x52, 0xcc);

const AXIS_COLORS: [Color32; 3] = [Color32::RED, Color32::GREEN, Color32::BLUE];

/// Upper bound of the sample-index axis
///
/// The visible window grows with the history until the buffer is full, then
/// holds steady at the buffer capacity.
pub fn x_axis_max(capacity: usize, len: usize) -> f64 {
    capacity.max(len) as f64
}

/// `(sample index, value)` pairs, oldest first
pub fn line_points(buffer: &RollingBuffer) -> Vec<[f64; 2]> {
    buffer
        .iter()
        .enumerate()
        .map(|(i, v)| [i as f64, v])
        .collect()
}

/// One plotted line
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine {
    pub name: &'static str,
    pub color: Color32,
    pub points: Vec<[f64; 2]>,
}

/// One line chart and its fixed axes
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub id: &'static str,
    pub title: &'static str,
    pub y_label: &'static str,
    pub y_range: (f64, f64),
    pub x_max: f64,
    pub lines: Vec<ChartLine>,
}

impl LineChart {
    fn from_channels(
        state: &TelemetryState,
        id: &'static str,
        title: &'static str,
        y_label: &'static str,
        y_range: (f64, f64),
        channels: &[(Channel, &'static str, Color32)],
    ) -> Self {
        let mut len = 0;
        let lines = channels
            .iter()
            .filter_map(|&(channel, name, color)| {
                let buffer = state.buffer(channel)?;
                len = len.max(buffer.len());
                Some(ChartLine {
                    name,
                    color,
                    points: line_points(buffer),
                })
            })
            .collect();

        Self {
            id,
            title,
            y_label,
            y_range,
            x_max: x_axis_max(state.history_len(), len),
            lines,
        }
    }
}

/// A labelled numeric read-out
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    pub label: &'static str,
    pub value: String,
}

/// Everything the chart refresh produces
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub altitude: LineChart,
    pub accel: LineChart,
    pub gyro: LineChart,
    pub readouts: Vec<Readout>,
    /// `(column label, value)` for every channel, in table order
    pub table: Vec<(&'static str, String)>,
}

impl ChartFrame {
    /// Build a frame from the current telemetry state
    pub fn from_state(state: &TelemetryState) -> Self {
        let altitude = LineChart::from_channels(
            state,
            "altitude",
            "Altitude (m)",
            "Altitude",
            (0.0, 500.0),
            &[(Channel::Alt, "Altitude", Color32::BLUE)],
        );

        let accel_channels: Vec<_> = Channel::ACCEL
            .iter()
            .zip(AXIS_COLORS)
            .map(|(&c, color)| (c, c.label(), color))
            .collect();
        let accel = LineChart::from_channels(
            state,
            "accel",
            "Acceleration (ax, ay, az)",
            "Accel (m/s²)",
            (-10.0, 10.0),
            &accel_channels,
        );

        let gyro_channels: Vec<_> = Channel::GYRO
            .iter()
            .zip(AXIS_COLORS)
            .map(|(&c, color)| (c, c.label(), color))
            .collect();
        let gyro = LineChart::from_channels(
            state,
            "gyro",
            "Gyro (gx, gy, gz)",
            "Gyro (°/s)",
            (-10.0, 10.0),
            &gyro_channels,
        );

        let latest = state.latest();
        let readouts = [
            ("Temperature (°C):", Channel::Temp),
            ("Pressure (hPa):", Channel::Press),
            ("Altitude (m):", Channel::Alt),
            ("GPS Sats:", Channel::GpsSats),
        ]
        .into_iter()
        .map(|(label, channel)| Readout {
            label,
            value: latest.display(channel),
        })
        .collect();

        let table = Channel::ALL
            .iter()
            .map(|&c| (c.label(), latest.display(c)))
            .collect();

        Self {
            altitude,
            accel,
            gyro,
            readouts,
            table,
        }
    }
}

impl Default for ChartFrame {
    fn default() -> Self {
        Self::from_state(&TelemetryState::default())
    }
}
