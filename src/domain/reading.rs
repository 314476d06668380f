// Sensor reading domain model
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::severity::{SeverityLevel, Thresholds};

/// Raw window state reported by the sensor node when the window is open.
pub const WINDOW_OPEN: &str = "ABIERTA";

/// Raw alarm state marking a reading whose alarm was switched off.
pub const ALARM_OFF: &str = "APAGADA";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Literal timestamp as received; parsed on demand.
    pub timestamp: String,
    pub room: String,
    pub gas_level: Option<f64>,
    pub mq2_value: Option<f64>,
    pub system_state: Option<String>,
    pub alarm_state: Option<String>,
    pub window_state: Option<String>,
}

impl Reading {
    pub fn new(timestamp: impl Into<String>, room: impl Into<String>, gas_level: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            room: room.into(),
            gas_level: Some(gas_level),
            mq2_value: None,
            system_state: None,
            alarm_state: None,
            window_state: None,
        }
    }

    pub fn with_mq2(mut self, value: f64) -> Self {
        self.mq2_value = Some(value);
        self
    }

    pub fn with_system_state(mut self, state: impl Into<String>) -> Self {
        self.system_state = Some(state.into());
        self
    }

    pub fn with_alarm_state(mut self, state: impl Into<String>) -> Self {
        self.alarm_state = Some(state.into());
        self
    }

    pub fn with_window_state(mut self, state: impl Into<String>) -> Self {
        self.window_state = Some(state.into());
        self
    }

    /// Parse the timestamp into an instant expressed in `offset`.
    pub fn instant(&self, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.timestamp, offset)
    }

    pub fn severity(&self, thresholds: &Thresholds) -> Option<SeverityLevel> {
        self.gas_level.map(|level| thresholds.classify(level))
    }

    pub fn is_alarm_off(&self) -> bool {
        self.alarm_state.as_deref() == Some(ALARM_OFF)
    }

    pub fn is_window_open(&self) -> bool {
        self.window_state.as_deref() == Some(WINDOW_OPEN)
    }
}

/// Parse an RFC 3339 timestamp, or a naive local timestamp interpreted in `offset`.
pub fn parse_timestamp(value: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&offset));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    offset.from_local_datetime(&naive).single()
}

/// Copy of `readings` in ascending timestamp order. Unparseable timestamps sort last,
/// keeping their relative order.
pub fn sort_chronologically(readings: &[Reading], offset: FixedOffset) -> Vec<Reading> {
    let mut keyed: Vec<(Option<DateTime<FixedOffset>>, &Reading)> = readings
        .iter()
        .map(|r| (r.instant(offset), r))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    keyed.into_iter().map(|(_, r)| r.clone()).collect()
}

/// Copy of `readings` with the newest first.
pub fn sort_newest_first(readings: &[Reading], offset: FixedOffset) -> Vec<Reading> {
    let mut keyed: Vec<(Option<DateTime<FixedOffset>>, &Reading)> = readings
        .iter()
        .map(|r| (r.instant(offset), r))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    keyed.into_iter().map(|(_, r)| r.clone()).collect()
}
