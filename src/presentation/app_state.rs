// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::report_service::ReportService;
use chrono::{DateTime, FixedOffset, Utc};

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub report_service: ReportService,
    pub offset: FixedOffset,
}

impl AppState {
    /// Wall clock in the deployment's offset; the core never reads it itself
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}
