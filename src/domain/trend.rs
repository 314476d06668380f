// Line and bar series over the most recent readings
use chrono::FixedOffset;
use serde::Serialize;

use super::palette::SeverityColors;
use super::reading::Reading;
use super::severity::{SeverityLevel, Thresholds};

pub const MOVING_AVERAGE_SPAN: usize = 3;
pub const DEFAULT_BAR_SAMPLE: usize = 8;

const PLACEHOLDER_LABEL: &str = "--";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub labels: Vec<String>,
    pub gas: Vec<f64>,
    pub mq2: Vec<f64>,
    pub moving_average: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
}

/// `HH:MM` in `offset`, or the literal timestamp when it cannot be parsed.
pub fn short_time(reading: &Reading, offset: FixedOffset) -> String {
    reading
        .instant(offset)
        .map(|instant| instant.format("%H:%M").to_string())
        .unwrap_or_else(|| reading.timestamp.clone())
}

/// Trailing mean over up to `span` points ending at each index.
pub fn moving_average(values: &[f64], span: usize) -> Vec<f64> {
    let span = span.max(1);
    (0..values.len())
        .map(|i| {
            let window = &values[(i + 1).saturating_sub(span)..=i];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

/// Gas, MQ-2 and smoothed gas over chronologically ordered readings.
///
/// An empty input yields a flat two-point placeholder so charts keep an axis.
/// Missing values plot as 0.
pub fn line_series(readings: &[Reading], offset: FixedOffset) -> LineSeries {
    if readings.is_empty() {
        return LineSeries {
            labels: vec![PLACEHOLDER_LABEL.to_string(); 2],
            gas: vec![0.0; 2],
            mq2: vec![0.0; 2],
            moving_average: vec![0.0; 2],
        };
    }

    let labels = readings.iter().map(|r| short_time(r, offset)).collect();
    let gas: Vec<f64> = readings.iter().map(|r| r.gas_level.unwrap_or(0.0)).collect();
    let mq2 = readings.iter().map(|r| r.mq2_value.unwrap_or(0.0)).collect();
    let moving_average = moving_average(&gas, MOVING_AVERAGE_SPAN);

    LineSeries {
        labels,
        gas,
        mq2,
        moving_average,
    }
}

/// The last `sample` readings as bars colored by severity.
pub fn bar_series(
    readings: &[Reading],
    thresholds: &Thresholds,
    colors: &SeverityColors,
    sample: usize,
    offset: FixedOffset,
) -> BarSeries {
    let recent = &readings[readings.len().saturating_sub(sample)..];
    BarSeries {
        labels: recent.iter().map(|r| short_time(r, offset)).collect(),
        values: recent.iter().map(|r| r.gas_level.unwrap_or(0.0)).collect(),
        colors: recent
            .iter()
            .map(|r| {
                let level = r.severity(thresholds).unwrap_or(SeverityLevel::Normal);
                colors.color(level).to_string()
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_moving_average_warms_up() {
        let avg = moving_average(&[3.0, 6.0, 9.0, 12.0], 3);
        assert_eq!(avg, vec![3.0, 4.5, 6.0, 9.0]);
        assert!(moving_average(&[], 3).is_empty());
    }

    #[test]
    fn test_line_series_placeholder() {
        let series = line_series(&[], utc());
        assert_eq!(series.labels, vec!["--", "--"]);
        assert_eq!(series.gas, vec![0.0, 0.0]);
        assert_eq!(series.moving_average, vec![0.0, 0.0]);
    }

    #[test]
    fn test_line_series_values() {
        let readings = vec![
            Reading::new("2024-01-01T08:05", "Cocina", 100.0).with_mq2(1.5),
            Reading::new("broken", "Cocina", 200.0),
        ];
        let series = line_series(&readings, utc());
        assert_eq!(series.labels, vec!["08:05", "broken"]);
        assert_eq!(series.gas, vec![100.0, 200.0]);
        assert_eq!(series.mq2, vec![1.5, 0.0]);
        assert_eq!(series.moving_average, vec![100.0, 150.0]);
    }

    #[test]
    fn test_bar_series_samples_tail() {
        let readings: Vec<Reading> = (0..10)
            .map(|i| Reading::new(format!("2024-01-01T{:02}:00", i), "Cocina", i as f64 * 100.0))
            .collect();
        let bars = bar_series(&readings, &Thresholds::default(), &SeverityColors::default(), 8, utc());
        assert_eq!(bars.values.len(), 8);
        assert_eq!(bars.values[0], 200.0);
        assert_eq!(bars.labels[0], "02:00");
        assert_eq!(bars.colors[0], "#f59e0b");
        assert_eq!(bars.colors[7], "#ef4444");
        assert_eq!(bars.colors.len(), 8);
    }
}
