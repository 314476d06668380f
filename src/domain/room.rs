// Room selection and the headline summary card
use chrono::FixedOffset;
use serde::Serialize;

use super::reading::Reading;
use super::severity::{SeverityLevel, Thresholds};

pub const DEFAULT_ROOM: &str = "Cocina";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSummary {
    pub room: String,
    pub last_reading: String,
    pub gas_level: Option<f64>,
    pub status: SeverityLevel,
    pub status_label: &'static str,
}

/// Requested room, else the room of the newest reading, else the default room.
/// `newest_first` must be sorted newest first.
pub fn select_room(newest_first: &[Reading], requested: Option<&str>) -> String {
    requested
        .map(str::trim)
        .filter(|room| !room.is_empty())
        .map(str::to_string)
        .or_else(|| newest_first.first().map(|r| r.room.clone()))
        .unwrap_or_else(|| DEFAULT_ROOM.to_string())
}

/// Readings of `room`, keeping order. Falls back to every reading when the room
/// has none.
pub fn room_readings(newest_first: &[Reading], room: &str) -> Vec<Reading> {
    let matching: Vec<Reading> = newest_first
        .iter()
        .filter(|r| r.room == room)
        .cloned()
        .collect();
    if matching.is_empty() {
        newest_first.to_vec()
    } else {
        matching
    }
}

/// `dd/mm/yyyy HH:MM` in `offset`, or the literal timestamp.
pub fn format_date_time(reading: &Reading, offset: FixedOffset) -> String {
    reading
        .instant(offset)
        .map(|instant| instant.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| reading.timestamp.clone())
}

pub fn summarize_room(
    latest: Option<&Reading>,
    thresholds: &Thresholds,
    offset: FixedOffset,
) -> Option<RoomSummary> {
    let latest = latest?;
    let status = latest.severity(thresholds).unwrap_or(SeverityLevel::Normal);
    Some(RoomSummary {
        room: latest.room.clone(),
        last_reading: format_date_time(latest, offset),
        gas_level: latest.gas_level,
        status,
        status_label: status.label(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_select_room() {
        let readings = vec![Reading::new("2024-01-01T08:00", "Sala", 1.0)];
        assert_eq!(select_room(&readings, Some("Dormitorio")), "Dormitorio");
        assert_eq!(select_room(&readings, Some("  ")), "Sala");
        assert_eq!(select_room(&readings, None), "Sala");
        assert_eq!(select_room(&[], None), DEFAULT_ROOM);
    }

    #[test]
    fn test_room_readings_fallback() {
        let readings = vec![
            Reading::new("2024-01-01T09:00", "Sala", 1.0),
            Reading::new("2024-01-01T08:00", "Cocina", 2.0),
        ];
        assert_eq!(room_readings(&readings, "Cocina").len(), 1);
        assert_eq!(room_readings(&readings, "Garage").len(), 2);
    }

    #[test]
    fn test_summary() {
        let reading = Reading::new("2024-01-01T08:05:00Z", "Cocina", 320.0);
        let summary = summarize_room(Some(&reading), &Thresholds::default(), utc()).unwrap();
        assert_eq!(summary.last_reading, "01/01/2024 08:05");
        assert_eq!(summary.status, SeverityLevel::Warning);
        assert_eq!(summary.status_label, "Warning");
        assert!(summarize_room(None, &Thresholds::default(), utc()).is_none());
    }
}
