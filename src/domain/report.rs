// Weekly and monthly interest reports built from the full history
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::buckets::{build_daily_buckets, DailySeries};
use super::error::AnalyticsError;
use super::reading::Reading;
use super::series;
use super::severity::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportWindows {
    pub week_days: usize,
    pub month_days: usize,
}

impl Default for ReportWindows {
    fn default() -> Self {
        Self {
            week_days: 7,
            month_days: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestReport {
    pub window_opens_week: DailySeries,
    pub max_gas_month: DailySeries,
    pub critical_entries_month: DailySeries,
    pub min_gas_month: DailySeries,
    pub total_window_opens_week: f64,
    pub peak_gas_month: f64,
    pub total_critical_entries_month: f64,
    pub lowest_gas_month: f64,
}

/// Build every daily series. `sorted` must be in ascending timestamp order.
pub fn build_interest_report(
    sorted: &[Reading],
    thresholds: &Thresholds,
    windows: ReportWindows,
    reference: DateTime<FixedOffset>,
) -> Result<InterestReport, AnalyticsError> {
    let week = build_daily_buckets(windows.week_days, reference)?;
    let month = build_daily_buckets(windows.month_days, reference)?;

    let window_opens_week = week.series(series::window_opens_per_day(sorted, &week));
    let max_gas_month = month.series(series::max_per_day(sorted, &month));
    let critical_entries_month =
        month.series(series::critical_entries_per_day(sorted, &month, thresholds));
    let min_gas_month = month.series(series::min_per_day(sorted, &month));

    Ok(InterestReport {
        total_window_opens_week: window_opens_week.total(),
        peak_gas_month: max_gas_month.peak(),
        total_critical_entries_month: critical_entries_month.total(),
        lowest_gas_month: min_gas_month.floor(),
        window_opens_week,
        max_gas_month,
        critical_entries_month,
        min_gas_month,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::WINDOW_OPEN;

    fn reference() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-01-02T20:00:00-05:00").unwrap()
    }

    #[test]
    fn test_interest_report_totals() {
        let sorted = vec![
            Reading::new("2024-01-01T08:00", "Cocina", 50.0),
            Reading::new("2024-01-01T09:00", "Cocina", 350.0).with_window_state(WINDOW_OPEN),
            Reading::new("2024-01-01T10:00", "Cocina", 550.0).with_window_state("CERRADA"),
            Reading::new("2024-01-02T08:00", "Cocina", 100.0).with_window_state(WINDOW_OPEN),
        ];
        let report =
            build_interest_report(&sorted, &Thresholds::default(), ReportWindows::default(), reference())
                .unwrap();

        assert_eq!(report.window_opens_week.values.len(), 7);
        assert_eq!(report.max_gas_month.values.len(), 30);
        assert_eq!(report.total_window_opens_week, 2.0);
        assert_eq!(report.peak_gas_month, 550.0);
        assert_eq!(report.total_critical_entries_month, 1.0);
        // days without readings report 0 and pull the monthly floor down
        assert_eq!(report.lowest_gas_month, 0.0);
        assert_eq!(report.max_gas_month.values[28..], [550.0, 100.0]);
        assert_eq!(report.min_gas_month.values[28..], [50.0, 100.0]);
    }

    #[test]
    fn test_invalid_window_is_reported() {
        let windows = ReportWindows {
            week_days: 0,
            month_days: 30,
        };
        let err = build_interest_report(&[], &Thresholds::default(), windows, reference()).unwrap_err();
        assert_eq!(err, AnalyticsError::InvalidWindow(0));
    }
}
