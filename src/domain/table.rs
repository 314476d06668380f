// Report table filtering and pagination
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::error::AnalyticsError;
use super::reading::Reading;
use super::severity::{SeverityLevel, Thresholds};

pub const DEFAULT_PAGE_SIZE: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub severity: Option<SeverityLevel>,
}

impl FilterCriteria {
    fn has_date_bounds(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePage {
    pub rows: Vec<Reading>,
    /// Page actually returned after clamping, 1-based.
    pub page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
}

/// A table row with its derived display fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    #[serde(flatten)]
    pub reading: Reading,
    pub severity: Option<SeverityLevel>,
    pub alert_type: &'static str,
    pub level_class: &'static str,
    pub badge: StatusBadge,
}

impl TableRow {
    pub fn from_reading(reading: Reading, thresholds: &Thresholds) -> Self {
        let severity = reading.severity(thresholds);
        let level = severity.unwrap_or(SeverityLevel::Normal);
        let badge = StatusBadge::for_reading(&reading);
        Self {
            reading,
            severity,
            alert_type: level.label(),
            level_class: level.level_class(),
            badge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub class_name: &'static str,
}

impl StatusBadge {
    pub fn for_reading(reading: &Reading) -> Self {
        if reading.is_alarm_off() {
            Self {
                label: "OK",
                class_name: "status-normal",
            }
        } else {
            Self {
                label: "Alarma",
                class_name: "status-pending",
            }
        }
    }
}

fn day_bound(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    offset.from_local_datetime(&date.and_time(time)).single()
}

/// Readings that belong in the report table, in input order.
///
/// Date bounds are inclusive whole days in `offset`. A reading whose timestamp
/// cannot be parsed only survives when no date bound is set. Readings whose alarm
/// was switched off never appear in the table.
pub fn filter_readings(
    readings: &[Reading],
    criteria: &FilterCriteria,
    thresholds: &Thresholds,
    offset: FixedOffset,
) -> Vec<Reading> {
    let start = criteria
        .start_date
        .and_then(|date| day_bound(date, NaiveTime::MIN, offset));
    let end = criteria.end_date.and_then(|date| {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).and_then(|t| day_bound(date, t, offset))
    });

    readings
        .iter()
        .filter(|reading| {
            if criteria.has_date_bounds() {
                let Some(instant) = reading.instant(offset) else {
                    return false;
                };
                if start.is_some_and(|start| instant < start) {
                    return false;
                }
                if end.is_some_and(|end| instant > end) {
                    return false;
                }
            }
            if let Some(wanted) = criteria.severity {
                let level = reading.severity(thresholds).unwrap_or(SeverityLevel::Normal);
                if level != wanted {
                    return false;
                }
            }
            !reading.is_alarm_off()
        })
        .cloned()
        .collect()
}

/// Slice already filtered rows into a page, clamping `page` into range.
pub fn paginate(rows: &[Reading], page: usize, page_size: usize) -> Result<TablePage, AnalyticsError> {
    if page_size == 0 {
        return Err(AnalyticsError::InvalidPageSize);
    }
    let total_rows = rows.len();
    let total_pages = total_rows.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_rows);

    Ok(TablePage {
        rows: rows[start.min(end)..end].to_vec(),
        page,
        total_pages,
        total_rows,
    })
}

pub fn filter_and_page(
    readings: &[Reading],
    criteria: &FilterCriteria,
    page: usize,
    page_size: usize,
    thresholds: &Thresholds,
    offset: FixedOffset,
) -> Result<TablePage, AnalyticsError> {
    let filtered = filter_readings(readings, criteria, thresholds, offset);
    paginate(&filtered, page, page_size)
}

/// Caller-held table state: current criteria and page.
///
/// Library helper for clients that keep a table open across interactions
/// (next/previous, filter edits). The HTTP layer is stateless and calls
/// [`filter_and_page`] with the requested page instead.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    criteria: FilterCriteria,
    page: usize,
    page_size: usize,
}

impl TableView {
    pub fn new(page_size: usize) -> Result<Self, AnalyticsError> {
        if page_size == 0 {
            return Err(AnalyticsError::InvalidPageSize);
        }
        Ok(Self {
            criteria: FilterCriteria::default(),
            page: 1,
            page_size,
        })
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Any filter change starts over at the first page.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.page = 1;
    }

    pub fn reset(&mut self) {
        self.set_criteria(FilterCriteria::default());
    }

    pub fn next_page(&mut self, total_pages: usize) {
        if self.page < total_pages {
            self.page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn render(
        &mut self,
        readings: &[Reading],
        thresholds: &Thresholds,
        offset: FixedOffset,
    ) -> Result<TablePage, AnalyticsError> {
        let page = filter_and_page(
            readings,
            &self.criteria,
            self.page,
            self.page_size,
            thresholds,
            offset,
        )?;
        self.page = page.page;
        Ok(page)
    }
}
