//! # Telemetry Text Parser
//!
//! Extracts numeric fields from one block of the payload's text telemetry.
//!
//! ## Record Grammar
//!
//! ```text
//! Accel (m/s²): <ax>, <ay>, <az>
//! Gyro (°/s): <gx>, <gy>, <gz>
//! Temp: <t>
//! Press: <p>
//! Alt: <a>
//! GPS -> Lat: <lat>, Lon: <lon>, Sats: <n>
//! ```
//!
//! Each label is matched on its own. A missing label, or a number that does
//! not convert, drops that field group and nothing else.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::types::TelemetryRecord;

/// Substring marking a block as a sensor-data record
///
/// Also covers the ground relay's `"RECEIVED SENSOR DATA"` header.
pub const SENSOR_DATA_MARKER: &str = "SENSOR DATA";

struct FieldPatterns {
    accel: Regex,
    gyro: Regex,
    temp: Regex,
    press: Regex,
    alt: Regex,
    gps: Regex,
}

fn patterns() -> &'static FieldPatterns {
    static PATTERNS: OnceLock<FieldPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        // Patterns are literals; compilation cannot fail.
        let re = |p: &str| Regex::new(p).expect("valid telemetry pattern");
        FieldPatterns {
            accel: re(r"Accel \(m/s²\): ([\d.\-]+), ([\d.\-]+), ([\d.\-]+)"),
            gyro: re(r"Gyro \(°/s\): ([\d.\-]+), ([\d.\-]+), ([\d.\-]+)"),
            temp: re(r"Temp: ([\d.\-]+)"),
            press: re(r"Press: ([\d.\-]+)"),
            alt: re(r"Alt: ([\d.\-]+)"),
            gps: re(r"GPS -> Lat: ([\d.\-]+), Lon: ([\d.\-]+), Sats: (\d+)"),
        }
    })
}

/// Check whether a block is a sensor-data record
pub fn is_sensor_block(text: &str) -> bool {
    text.contains(SENSOR_DATA_MARKER)
}

/// Parse a framed block
///
/// Blocks without the sensor-data marker yield an empty record.
pub fn parse_block(text: &str) -> TelemetryRecord {
    if is_sensor_block(text) {
        parse_sensor_data(text)
    } else {
        TelemetryRecord::default()
    }
}

/// Extract every recognized field from `text`
///
/// # Examples
///
/// ```
/// use cansat_dashboard::telemetry::parser::parse_sensor_data;
///
/// let record = parse_sensor_data("Temp: 23.5 C");
/// assert_eq!(record.temp, Some(23.5));
/// assert_eq!(record.alt, None);
/// ```
pub fn parse_sensor_data(text: &str) -> TelemetryRecord {
    let p = patterns();
    let mut record = TelemetryRecord::default();

    if let Some([ax, ay, az]) = capture_triple(&p.accel, text) {
        record.ax = Some(ax);
        record.ay = Some(ay);
        record.az = Some(az);
    }

    if let Some([gx, gy, gz]) = capture_triple(&p.gyro, text) {
        record.gx = Some(gx);
        record.gy = Some(gy);
        record.gz = Some(gz);
    }

    record.temp = capture_single(&p.temp, text);
    record.press = capture_single(&p.press, text);
    record.alt = capture_single(&p.alt, text);

    if let Some(caps) = p.gps.captures(text) {
        let lat = float_at(&caps, 1);
        let lon = float_at(&caps, 2);
        let sats = caps.get(3).and_then(|m| m.as_str().parse::<u32>().ok());
        if let (Some(lat), Some(lon), Some(sats)) = (lat, lon, sats) {
            record.gps_lat = Some(lat);
            record.gps_lon = Some(lon);
            record.gps_sats = Some(sats);
        }
    }

    record
}

fn float_at(caps: &Captures<'_>, group: usize) -> Option<f64> {
    caps.get(group)?.as_str().parse().ok()
}

fn capture_single(re: &Regex, text: &str) -> Option<f64> {
    float_at(&re.captures(text)?, 1)
}

fn capture_triple(re: &Regex, text: &str) -> Option<[f64; 3]> {
    let caps = re.captures(text)?;
    Some([float_at(&caps, 1)?, float_at(&caps, 2)?, float_at(&caps, 3)?])
}
