// Severity distribution of the most recent readings, with donut arc geometry
use std::f64::consts::PI;

use serde::Serialize;

use super::palette::SeverityColors;
use super::reading::Reading;
use super::severity::{SeverityLevel, Thresholds};

pub const DEFAULT_RECENT_WINDOW: usize = 20;
pub const DONUT_RADIUS: f64 = 42.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSegment {
    pub label: String,
    pub count: u32,
    pub color: String,
    pub arc_length: f64,
    /// Where the segment starts along the circumference.
    pub arc_offset: f64,
    pub percent_of_total: u32,
    /// SVG `stroke-dasharray` for a circle of `DONUT_RADIUS`.
    pub dash_array: String,
    /// SVG `stroke-dashoffset`; negative so segments advance clockwise.
    pub dash_offset: String,
}

fn dash_array(arc_length: f64, circumference: f64) -> String {
    format!("{:.2} {:.2}", arc_length, circumference - arc_length)
}

fn dash_offset(arc_offset: f64) -> String {
    let offset = if arc_offset == 0.0 { 0.0 } else { -arc_offset };
    format!("{:.2}", offset)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    /// Counts in `[normal, warning, critical]` order.
    pub counts: [u32; 3],
    /// Sum of counts, floored at 1.
    pub total: u32,
    pub segments: Vec<DistributionSegment>,
}

pub fn circumference() -> f64 {
    2.0 * PI * DONUT_RADIUS
}

/// Summarize the last `recent_window` readings of a chronologically sorted slice.
/// Readings without a gas level are not counted.
pub fn summarize(
    readings: &[Reading],
    thresholds: &Thresholds,
    colors: &SeverityColors,
    recent_window: usize,
) -> Distribution {
    let recent = &readings[readings.len().saturating_sub(recent_window)..];

    let counts = recent
        .iter()
        .filter_map(|reading| reading.severity(thresholds))
        .fold([0u32; 3], |mut counts, level| {
            counts[level.index()] += 1;
            counts
        });

    let total = counts.iter().sum::<u32>().max(1);
    let circumference = circumference();

    let mut offset = 0.0;
    let segments = SeverityLevel::ALL
        .iter()
        .map(|level| {
            let count = counts[level.index()];
            let share = f64::from(count) / f64::from(total);
            let arc_length = share * circumference;
            let segment = DistributionSegment {
                label: level.label().to_string(),
                count,
                color: colors.color(*level).to_string(),
                arc_length,
                arc_offset: offset,
                percent_of_total: (share * 100.0).round() as u32,
                dash_array: dash_array(arc_length, circumference),
                dash_offset: dash_offset(offset),
            };
            offset += arc_length;
            segment
        })
        .collect();

    Distribution {
        counts,
        total,
        segments,
    }
}
