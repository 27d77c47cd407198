//! # Telemetry Types
//!
//! Channels, readings and the per-block telemetry record.

use serde::Serialize;
use std::fmt;

/// A named scalar telemetry quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Temp,
    Press,
    Alt,
    GpsLat,
    GpsLon,
    GpsSats,
    Ax,
    Ay,
    Az,
    Gx,
    Gy,
    Gz,
}

impl Channel {
    /// Number of channels
    pub const COUNT: usize = 12;

    /// All channels, in read-out table order
    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::Temp,
        Channel::Press,
        Channel::Alt,
        Channel::GpsLat,
        Channel::GpsLon,
        Channel::GpsSats,
        Channel::Ax,
        Channel::Ay,
        Channel::Az,
        Channel::Gx,
        Channel::Gy,
        Channel::Gz,
    ];

    /// Acceleration channels, x/y/z
    pub const ACCEL: [Channel; 3] = [Channel::Ax, Channel::Ay, Channel::Az];

    /// Angular-rate channels, x/y/z
    pub const GYRO: [Channel; 3] = [Channel::Gx, Channel::Gy, Channel::Gz];

    /// Column label used in the read-out table
    pub fn label(self) -> &'static str {
        match self {
            Channel::Temp => "Temp",
            Channel::Press => "Press",
            Channel::Alt => "Alt",
            Channel::GpsLat => "GPS_Lat",
            Channel::GpsLon => "GPS_Lon",
            Channel::GpsSats => "GPS_Sats",
            Channel::Ax => "ax",
            Channel::Ay => "ay",
            Channel::Az => "az",
            Channel::Gx => "gx",
            Channel::Gy => "gy",
            Channel::Gz => "gz",
        }
    }

    /// Position of this channel in [`Channel::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether this channel keeps a rolling history
    ///
    /// Only altitude, acceleration and angular rate are charted; the other
    /// channels are kept in the latest snapshot only.
    pub fn is_buffered(self) -> bool {
        matches!(
            self,
            Channel::Alt
                | Channel::Ax
                | Channel::Ay
                | Channel::Az
                | Channel::Gx
                | Channel::Gy
                | Channel::Gz
        )
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single observed value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Decimal measurement
    Value(f64),
    /// Integer count (GPS satellites)
    Count(u32),
}

impl Reading {
    /// Numeric value for charting
    pub fn as_f64(self) -> f64 {
        match self {
            Reading::Value(v) => v,
            Reading::Count(n) => n as f64,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Value(v) => write!(f, "{:.2}", v),
            Reading::Count(n) => write!(f, "{}", n),
        }
    }
}

/// Fields extracted from one telemetry block
///
/// Every field is independently optional: a block may carry any subset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TelemetryRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub az: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub press: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_sats: Option<u32>,
}

impl TelemetryRecord {
    /// True when no field was extracted
    pub fn is_empty(&self) -> bool {
        self.readings().is_empty()
    }

    /// The value extracted for `channel`, if any
    pub fn get(&self, channel: Channel) -> Option<Reading> {
        let value = match channel {
            Channel::Temp => self.temp,
            Channel::Press => self.press,
            Channel::Alt => self.alt,
            Channel::GpsLat => self.gps_lat,
            Channel::GpsLon => self.gps_lon,
            Channel::GpsSats => return self.gps_sats.map(Reading::Count),
            Channel::Ax => self.ax,
            Channel::Ay => self.ay,
            Channel::Az => self.az,
            Channel::Gx => self.gx,
            Channel::Gy => self.gy,
            Channel::Gz => self.gz,
        };
        value.map(Reading::Value)
    }

    /// All extracted fields, in table order
    pub fn readings(&self) -> Vec<(Channel, Reading)> {
        Channel::ALL
            .iter()
            .filter_map(|&channel| self.get(channel).map(|r| (channel, r)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_index_matches_table_order() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i, "{} out of order", channel);
        }
    }

    #[test]
    fn test_buffered_channels() {
        let buffered: Vec<_> = Channel::ALL.iter().filter(|c| c.is_buffered()).collect();
        assert_eq!(buffered.len(), 7);
        assert!(!Channel::Temp.is_buffered());
        assert!(!Channel::GpsSats.is_buffered());
        assert!(Channel::Alt.is_buffered());
    }

    #[test]
    fn test_reading_display() {
        assert_eq!(Reading::Value(23.456).to_string(), "23.46");
        assert_eq!(Reading::Value(-2.5).to_string(), "-2.50");
        assert_eq!(Reading::Count(7).to_string(), "7");
    }

    #[test]
    fn test_record_readings_skip_missing_fields() {
        let record = TelemetryRecord {
            alt: Some(120.0),
            gps_sats: Some(5),
            ..Default::default()
        };

        assert!(!record.is_empty());
        assert_eq!(
            record.readings(),
            vec![
                (Channel::Alt, Reading::Value(120.0)),
                (Channel::GpsSats, Reading::Count(5)),
            ]
        );
    }

    #[test]
    fn test_empty_record_serializes_to_empty_object() {
        let record = TelemetryRecord::default();
        assert!(record.is_empty());
        assert_eq!(serde_json::to_string(&record).unwrap(), "{}");
    }
}
