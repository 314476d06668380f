// HTTP request handlers
use crate::application::dashboard_service::DashboardRequest;
use crate::application::report_service::SeriesKind;
use crate::domain::control::{ControlCommand, ControlPatch};
use crate::domain::palette::Theme;
use crate::domain::severity::SeverityLevel;
use crate::domain::table::FilterCriteria;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub room: Option<String>,
    pub theme: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct TableQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub severity: Option<String>,
    pub page: Option<usize>,
}

impl TableQuery {
    /// Empty form fields mean "no filter"; anything else must parse.
    pub fn criteria(&self) -> Result<FilterCriteria, String> {
        fn blank(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }
        fn date(value: Option<&str>) -> Result<Option<NaiveDate>, String> {
            value
                .map(|v| {
                    NaiveDate::parse_from_str(v, "%Y-%m-%d")
                        .map_err(|_| format!("invalid date: {}", v))
                })
                .transpose()
        }

        let severity = blank(&self.severity)
            .map(|v| SeverityLevel::from_filter_key(v).ok_or_else(|| format!("invalid severity: {}", v)))
            .transpose()?;

        Ok(FilterCriteria {
            start_date: date(blank(&self.start))?,
            end_date: date(blank(&self.end))?,
            severity,
        })
    }
}

async fn respond<T: Serialize>(data: &T, headers: &HeaderMap) -> axum::response::Response {
    match json_response(data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Live dashboard for one room
pub async fn get_dashboard(
    Query(query): Query<DashboardQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let request = DashboardRequest {
        room: query.room,
        theme: query.theme.as_deref().and_then(Theme::parse).unwrap_or_default(),
    };
    let dashboard = state.dashboard_service.get_dashboard(&request, state.now()).await;
    respond(&dashboard, &headers).await
}

/// Weekly and monthly daily series
pub async fn get_interest_report(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state.report_service.interest_report(state.now()).await {
        Ok(report) => respond(&report, &headers).await,
        Err(e) => {
            tracing::error!("Error building interest report: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// One page of the filtered report table
pub async fn get_report_table(
    Query(query): Query<TableQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let criteria = match query.criteria() {
        Ok(criteria) => criteria,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };
    let page = query.page.unwrap_or(1);

    match state.report_service.table(&criteria, page).await {
        Ok(table) => respond(&table, &headers).await,
        Err(e) => {
            tracing::error!("Error building report table: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Every filtered reading, shaped for file export
pub async fn export_readings(
    Query(query): Query<TableQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let criteria = match query.criteria() {
        Ok(criteria) => criteria,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };
    let table = state.report_service.export_readings(&criteria).await;
    respond(&table, &headers).await
}

/// One daily series, shaped for file export
pub async fn export_series(
    Path(name): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let Some(kind) = SeriesKind::parse(&name) else {
        return (StatusCode::NOT_FOUND, format!("unknown series: {}", name)).into_response();
    };

    match state.report_service.export_series(kind, state.now()).await {
        Ok(table) => respond(&table, &headers).await,
        Err(e) => {
            tracing::error!("Error exporting series {}: {:#}", name, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn apply_control(state: &AppState, patch: &ControlPatch, headers: &HeaderMap) -> axum::response::Response {
    if patch.is_empty() {
        return (StatusCode::BAD_REQUEST, "control patch has no fields to change").into_response();
    }
    match state.dashboard_service.update_control(patch).await {
        Ok(control) => respond(&control, headers).await,
        Err(e) => {
            tracing::error!("Error updating air control: {:#}", e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Partial manual actuator change
pub async fn update_control(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<ControlPatch>,
) -> impl IntoResponse {
    apply_control(&state, &patch, &headers).await
}

/// Named operator shortcut such as `open-window`
pub async fn run_control_command(
    Path(name): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let Some(command) = ControlCommand::parse(&name) else {
        return (StatusCode::NOT_FOUND, format!("unknown command: {}", name)).into_response();
    };
    apply_control(&state, &command.patch(), &headers).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_are_no_filter() {
        let query = TableQuery {
            start: Some("".to_string()),
            end: None,
            severity: Some(" ".to_string()),
            page: None,
        };
        assert_eq!(query.criteria().unwrap(), FilterCriteria::default());
    }

    #[test]
    fn test_fields_parse() {
        let query = TableQuery {
            start: Some("2024-01-01".to_string()),
            end: Some("2024-01-31".to_string()),
            severity: Some("info".to_string()),
            page: Some(2),
        };
        let criteria = query.criteria().unwrap();
        assert_eq!(criteria.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(criteria.end_date, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(criteria.severity, Some(SeverityLevel::Normal));
    }

    #[test]
    fn test_bad_fields_are_rejected() {
        let query = TableQuery {
            start: Some("01/02/2024".to_string()),
            ..Default::default()
        };
        assert!(query.criteria().is_err());

        let query = TableQuery {
            severity: Some("alert".to_string()),
            ..Default::default()
        };
        assert!(query.criteria().is_err());
    }

    fn control_state() -> Arc<AppState> {
        use crate::application::dashboard_service::DashboardService;
        use crate::application::report_service::ReportService;
        use crate::application::telemetry_source::fake::FakeSource;
        use crate::domain::control::{ControlState, SwitchState, WindowState};
        use crate::infrastructure::config::AnalyticsSettings;

        let control = ControlState {
            manual_mode: false,
            window_state: WindowState::Closed,
            fan_state: SwitchState::Off,
            alarm_state: SwitchState::On,
            updated_at: None,
        };
        let source = Arc::new(FakeSource::new(Vec::new(), Some(control)));
        let settings = AnalyticsSettings::default();
        Arc::new(AppState {
            dashboard_service: DashboardService::new(source.clone(), settings.clone()),
            report_service: ReportService::new(source, settings.clone()),
            offset: settings.offset(),
        })
    }

    #[tokio::test]
    async fn test_control_routes() {
        let state = control_state();

        let response = run_control_command(Path("open-window".to_string()), HeaderMap::new(), State(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response = run_control_command(Path("launch".to_string()), HeaderMap::new(), State(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = update_control(HeaderMap::new(), State(state), Json(ControlPatch::default()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
