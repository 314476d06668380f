// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use safeair_telemetry::application::dashboard_service::DashboardService;
use safeair_telemetry::application::report_service::ReportService;
use safeair_telemetry::application::telemetry_source::LastKnownTelemetry;
use safeair_telemetry::infrastructure::config::load_config;
use safeair_telemetry::infrastructure::http_source::HttpTelemetrySource;
use safeair_telemetry::presentation::app_state::AppState;
use safeair_telemetry::presentation::handlers::{
    export_readings, export_series, get_dashboard, get_interest_report, get_report_table,
    health_check, run_control_command, update_control,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_config()?;
    let offset = config.analytics.offset();

    // Create telemetry source (infrastructure layer)
    let source = Arc::new(HttpTelemetrySource::new(&config.telemetry, offset)?);
    let telemetry = LastKnownTelemetry::new(source);

    // Create services (application layer), sharing the last-known cache
    let dashboard_service =
        DashboardService::with_telemetry(telemetry.clone(), config.analytics.clone());
    let report_service = ReportService::with_telemetry(telemetry, config.analytics.clone());

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        report_service,
        offset,
    });

    // Build router (presentation layer)
    // Compression is done in the response builders, so no CompressionLayer here
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/control", put(update_control))
        .route("/control/:command", post(run_control_command))
        .route("/reports/interest", get(get_interest_report))
        .route("/reports/table", get(get_report_table))
        .route("/reports/export/readings", get(export_readings))
        .route("/reports/export/:series", get(export_series))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_addr))?;
    tracing::info!(
        "Starting safeair-telemetry on {} (telemetry source {})",
        addr,
        config.telemetry.base_url
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
