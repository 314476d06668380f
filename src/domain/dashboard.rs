// Dashboard snapshot domain model
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::control::ControlState;
use super::distribution::Distribution;
use super::palette::ChartPalette;
use super::room::RoomSummary;
use super::severity::SeverityLevel;
use super::trend::{BarSeries, LineSeries};

/// Everything the live dashboard shows, recomputed wholesale on every poll.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub room: String,
    pub summary: Option<RoomSummary>,
    pub overall_status: SeverityLevel,
    pub overall_label: &'static str,
    pub alarm_status: String,
    pub window_status: String,
    pub manual_override_active: bool,
    pub control: Option<ControlState>,
    pub distribution: Distribution,
    pub line: LineSeries,
    pub bars: BarSeries,
    pub palette: ChartPalette,
    pub generated_at: DateTime<FixedOffset>,
}
