// Application layer - Use cases over the telemetry source
pub mod dashboard_service;
pub mod report_service;
pub mod telemetry_source;
