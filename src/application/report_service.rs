// Report service - Interest reports, filtered table and export shaping
use crate::application::telemetry_source::{LastKnownTelemetry, TelemetrySource};
use crate::domain::export::{readings_table, series_table, ExportTable};
use crate::domain::reading::sort_chronologically;
use crate::domain::report::{build_interest_report, InterestReport};
use crate::domain::table::{filter_and_page, filter_readings, FilterCriteria, TableRow};
use crate::infrastructure::config::AnalyticsSettings;
use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    WindowOpens,
    MaxGas,
    CriticalEntries,
    MinGas,
}

impl SeriesKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "window-opens" => Some(SeriesKind::WindowOpens),
            "max-gas" => Some(SeriesKind::MaxGas),
            "critical-entries" => Some(SeriesKind::CriticalEntries),
            "min-gas" => Some(SeriesKind::MinGas),
            _ => None,
        }
    }

    fn titles(&self) -> (&'static str, &'static str) {
        match self {
            SeriesKind::WindowOpens => ("Window openings (week)", "Window openings"),
            SeriesKind::MaxGas => ("Max gas (month)", "Max gas (ppm)"),
            SeriesKind::CriticalEntries => ("Critical entries (month)", "Critical entries"),
            SeriesKind::MinGas => ("Min gas (month)", "Min gas (ppm)"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableResponse {
    pub rows: Vec<TableRow>,
    pub page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
}

#[derive(Clone)]
pub struct ReportService {
    telemetry: LastKnownTelemetry,
    settings: AnalyticsSettings,
}

impl ReportService {
    pub fn new(source: Arc<dyn TelemetrySource>, settings: AnalyticsSettings) -> Self {
        Self {
            telemetry: LastKnownTelemetry::new(source),
            settings,
        }
    }

    pub fn with_telemetry(telemetry: LastKnownTelemetry, settings: AnalyticsSettings) -> Self {
        Self {
            telemetry,
            settings,
        }
    }

    pub async fn interest_report(&self, now: DateTime<FixedOffset>) -> anyhow::Result<InterestReport> {
        let readings = self.telemetry.readings().await;
        let sorted = sort_chronologically(&readings, self.settings.offset());
        build_interest_report(
            &sorted,
            &self.settings.thresholds,
            self.settings.report_windows,
            now,
        )
        .context("Failed to build interest report")
    }

    pub async fn table(&self, criteria: &FilterCriteria, page: usize) -> anyhow::Result<TableResponse> {
        let readings = self.telemetry.readings().await;
        let table = filter_and_page(
            &readings,
            criteria,
            page,
            self.settings.page_size,
            &self.settings.thresholds,
            self.settings.offset(),
        )
        .context("Failed to page report table")?;

        tracing::debug!(
            "Report table page {}/{} ({} rows match)",
            table.page,
            table.total_pages,
            table.total_rows
        );

        Ok(TableResponse {
            rows: table
                .rows
                .into_iter()
                .map(|r| TableRow::from_reading(r, &self.settings.thresholds))
                .collect(),
            page: table.page,
            total_pages: table.total_pages,
            total_rows: table.total_rows,
        })
    }

    /// Every filtered row, not just one page
    pub async fn export_readings(&self, criteria: &FilterCriteria) -> ExportTable {
        let readings = self.telemetry.readings().await;
        let filtered = filter_readings(
            &readings,
            criteria,
            &self.settings.thresholds,
            self.settings.offset(),
        );
        readings_table("AirData report", &filtered)
    }

    pub async fn export_series(
        &self,
        kind: SeriesKind,
        now: DateTime<FixedOffset>,
    ) -> anyhow::Result<ExportTable> {
        let report = self.interest_report(now).await?;
        let series = match kind {
            SeriesKind::WindowOpens => &report.window_opens_week,
            SeriesKind::MaxGas => &report.max_gas_month,
            SeriesKind::CriticalEntries => &report.critical_entries_month,
            SeriesKind::MinGas => &report.min_gas_month,
        };
        let (title, value_header) = kind.titles();
        Ok(series_table(title, value_header, series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::telemetry_source::fake::FakeSource;
    use crate::domain::reading::{Reading, ALARM_OFF};
    use crate::domain::severity::SeverityLevel;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-01-02T20:00:00-05:00").unwrap()
    }

    fn service(readings: Vec<Reading>) -> ReportService {
        let settings = AnalyticsSettings {
            utc_offset_minutes: -300,
            ..Default::default()
        };
        ReportService::new(Arc::new(FakeSource::new(readings, None)), settings)
    }

    fn unsorted_scenario() -> Vec<Reading> {
        vec![
            Reading::new("2024-01-02T08:00", "Cocina", 100.0),
            Reading::new("2024-01-01T10:00", "Cocina", 550.0),
            Reading::new("2024-01-01T08:00", "Cocina", 50.0),
            Reading::new("2024-01-01T09:00", "Cocina", 350.0),
        ]
    }

    #[tokio::test]
    async fn test_interest_report_sorts_before_folding() {
        let report = service(unsorted_scenario()).interest_report(now()).await.unwrap();
        let month = &report.critical_entries_month.values;
        assert_eq!(month[28..], [1.0, 0.0]);
        assert_eq!(report.max_gas_month.values[28..], [550.0, 100.0]);
        assert_eq!(report.min_gas_month.values[28..], [50.0, 100.0]);
    }

    #[tokio::test]
    async fn test_table_pages_and_annotates() {
        let mut readings: Vec<Reading> = (0..17)
            .map(|i| Reading::new(format!("2024-01-01T{:02}:00", i), "Cocina", 600.0))
            .collect();
        readings.push(Reading::new("2024-01-01T20:00", "Cocina", 600.0).with_alarm_state(ALARM_OFF));

        let svc = service(readings);
        let table = svc.table(&FilterCriteria::default(), 5).await.unwrap();
        assert_eq!(table.total_rows, 17);
        assert_eq!(table.total_pages, 3);
        assert_eq!(table.page, 3);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].alert_type, "Critical");

        let normal_only = FilterCriteria {
            severity: Some(SeverityLevel::Normal),
            ..Default::default()
        };
        let empty = svc.table(&normal_only, 1).await.unwrap();
        assert_eq!(empty.total_pages, 1);
        assert!(empty.rows.is_empty());
    }

    #[tokio::test]
    async fn test_exports() {
        let svc = service(unsorted_scenario());
        let readings = svc.export_readings(&FilterCriteria::default()).await;
        assert_eq!(readings.rows.len(), 4);
        assert_eq!(readings.headers[0], "fecha_hora");

        let max = svc.export_series(SeriesKind::MaxGas, now()).await.unwrap();
        assert_eq!(max.rows.len(), 30);
        assert_eq!(max.rows[28][1], "550");
        assert_eq!(max.headers[1], "Max gas (ppm)");
    }

    #[test]
    fn test_series_kind_parse() {
        assert_eq!(SeriesKind::parse("window-opens"), Some(SeriesKind::WindowOpens));
        assert_eq!(SeriesKind::parse("min-gas"), Some(SeriesKind::MinGas));
        assert_eq!(SeriesKind::parse("avg-gas"), None);
    }
}
