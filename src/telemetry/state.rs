//! # Telemetry State
//!
//! Rolling histories plus the latest value of every channel.
//!
//! The reader task owns one [`TelemetryState`] and is its only writer. After
//! each change it publishes a clone, so the dashboard always works on an
//! immutable, internally consistent copy.

use super::buffer::RollingBuffer;
use super::types::{Channel, Reading, TelemetryRecord};

/// Text shown for a channel that has not reported yet
pub const NO_DATA: &str = "--";

/// Most recent value per channel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatestSnapshot {
    values: [Option<Reading>; Channel::COUNT],
}

impl LatestSnapshot {
    pub fn get(&self, channel: Channel) -> Option<Reading> {
        self.values[channel.index()]
    }

    pub fn set(&mut self, channel: Channel, reading: Reading) {
        self.values[channel.index()] = Some(reading);
    }

    /// Formatted value, or [`NO_DATA`] before the first reading
    pub fn display(&self, channel: Channel) -> String {
        self.get(channel)
            .map(|r| r.to_string())
            .unwrap_or_else(|| NO_DATA.to_string())
    }
}

/// Pose angles for the orientation view, in degrees
///
/// Fed straight from the latest angular-rate reading without integration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub x_deg: f64,
    pub y_deg: f64,
    pub z_deg: f64,
}

/// Telemetry histories and latest values
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryState {
    altitude: RollingBuffer,
    accel: [RollingBuffer; 3],
    gyro: [RollingBuffer; 3],
    latest: LatestSnapshot,
    orientation: Orientation,
    records_applied: u64,
}

impl TelemetryState {
    /// Empty state keeping `history_len` samples per buffered channel
    pub fn new(history_len: usize) -> Self {
        let buffer = || RollingBuffer::new(history_len);
        Self {
            altitude: buffer(),
            accel: [buffer(), buffer(), buffer()],
            gyro: [buffer(), buffer(), buffer()],
            latest: LatestSnapshot::default(),
            orientation: Orientation::default(),
            records_applied: 0,
        }
    }

    /// Fold one parsed record into the state
    ///
    /// Every extracted field overwrites the latest snapshot and, for buffered
    /// channels, is appended to that channel's history. Channels missing from
    /// the record keep their previous values.
    ///
    /// # Returns
    ///
    /// `true` if the record carried at least one field
    pub fn apply(&mut self, record: &TelemetryRecord) -> bool {
        let readings = record.readings();
        if readings.is_empty() {
            return false;
        }

        for (channel, reading) in readings {
            self.latest.set(channel, reading);
            if let Some(buffer) = self.buffer_mut(channel) {
                buffer.push(reading.as_f64());
            }
        }

        if let Some(gx) = record.gx {
            self.orientation.x_deg = gx;
        }
        if let Some(gy) = record.gy {
            self.orientation.y_deg = gy;
        }
        if let Some(gz) = record.gz {
            self.orientation.z_deg = gz;
        }

        self.records_applied += 1;
        true
    }

    /// History for a buffered channel; `None` for snapshot-only channels
    pub fn buffer(&self, channel: Channel) -> Option<&RollingBuffer> {
        match channel {
            Channel::Alt => Some(&self.altitude),
            Channel::Ax => Some(&self.accel[0]),
            Channel::Ay => Some(&self.accel[1]),
            Channel::Az => Some(&self.accel[2]),
            Channel::Gx => Some(&self.gyro[0]),
            Channel::Gy => Some(&self.gyro[1]),
            Channel::Gz => Some(&self.gyro[2]),
            _ => None,
        }
    }

    fn buffer_mut(&mut self, channel: Channel) -> Option<&mut RollingBuffer> {
        match channel {
            Channel::Alt => Some(&mut self.altitude),
            Channel::Ax => Some(&mut self.accel[0]),
            Channel::Ay => Some(&mut self.accel[1]),
            Channel::Az => Some(&mut self.accel[2]),
            Channel::Gx => Some(&mut self.gyro[0]),
            Channel::Gy => Some(&mut self.gyro[1]),
            Channel::Gz => Some(&mut self.gyro[2]),
            _ => None,
        }
    }

    pub fn latest(&self) -> &LatestSnapshot {
        &self.latest
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Number of non-empty records applied since startup
    pub fn records_applied(&self) -> u64 {
        self.records_applied
    }

    /// Capacity shared by all rolling buffers
    pub fn history_len(&self) -> usize {
        self.altitude.capacity()
    }
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self::new(super::buffer::DEFAULT_HISTORY_LEN)
    }
}
