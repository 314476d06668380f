// Trailing calendar-day windows used by the daily series
use chrono::{DateTime, Days, FixedOffset, NaiveDate, TimeZone};
use serde::Serialize;

use super::error::AnalyticsError;

const LABEL_FORMAT: &str = "%d %b";

/// A contiguous run of calendar days ending on the reference day.
///
/// Days are computed in the reference instant's offset, so a reading at
/// 23:30 local time lands on the local day even when its UTC date differs.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyWindow {
    start: DateTime<FixedOffset>,
    keys: Vec<NaiveDate>,
    labels: Vec<String>,
}

impl DailyWindow {
    /// Local midnight of the first day.
    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn keys(&self) -> &[NaiveDate] {
        &self.keys
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn offset(&self) -> FixedOffset {
        *self.start.offset()
    }

    /// Bucket index for `instant`, or `None` when it falls outside the window.
    pub fn slot(&self, instant: DateTime<FixedOffset>) -> Option<usize> {
        if instant < self.start {
            return None;
        }
        let first = *self.keys.first()?;
        let day = instant.with_timezone(&self.offset()).date_naive();
        let index = usize::try_from((day - first).num_days()).ok()?;
        (index < self.keys.len()).then_some(index)
    }

    /// Attach per-day values to the window's keys and labels.
    pub fn series(&self, values: Vec<f64>) -> DailySeries {
        DailySeries {
            keys: self.keys.iter().map(|k| k.format("%Y-%m-%d").to_string()).collect(),
            labels: self.labels.clone(),
            values,
        }
    }
}

/// Chart-ready daily values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    pub keys: Vec<String>,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl DailySeries {
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Largest value, floored at zero.
    pub fn peak(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Smallest value, or zero when the series is empty.
    pub fn floor(&self) -> f64 {
        self.values
            .iter()
            .copied()
            .reduce(f64::min)
            .unwrap_or(0.0)
    }
}

pub fn build_daily_buckets(
    window_days: usize,
    reference: DateTime<FixedOffset>,
) -> Result<DailyWindow, AnalyticsError> {
    if window_days == 0 {
        return Err(AnalyticsError::InvalidWindow(window_days));
    }

    let today = reference.date_naive();
    let first = today
        .checked_sub_days(Days::new(window_days as u64 - 1))
        .ok_or(AnalyticsError::InvalidWindow(window_days))?;

    let keys: Vec<NaiveDate> = first.iter_days().take(window_days).collect();
    let labels = keys
        .iter()
        .map(|day| day.format(LABEL_FORMAT).to_string())
        .collect();

    let midnight = first
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| reference.offset().from_local_datetime(&naive).single())
        .ok_or(AnalyticsError::InvalidWindow(window_days))?;

    Ok(DailyWindow {
        start: midnight,
        keys,
        labels,
    })
}
