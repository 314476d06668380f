// Dashboard service - Use case for the live monitoring view
use crate::application::telemetry_source::{LastKnownTelemetry, TelemetrySource};
use crate::domain::control::{ActuatorKind, ControlPatch, ControlState};
use crate::domain::dashboard::Dashboard;
use crate::domain::distribution::summarize;
use crate::domain::palette::{ChartPalette, Theme};
use crate::domain::reading::{sort_newest_first, Reading};
use crate::domain::room::{room_readings, select_room, summarize_room};
use crate::domain::severity::SeverityLevel;
use crate::domain::trend::{bar_series, line_series};
use crate::infrastructure::config::AnalyticsSettings;
use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct DashboardRequest {
    pub room: Option<String>,
    pub theme: Theme,
}

#[derive(Clone)]
pub struct DashboardService {
    telemetry: LastKnownTelemetry,
    settings: AnalyticsSettings,
}

impl DashboardService {
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

    pub async fn get_dashboard(
        &self,
        request: &DashboardRequest,
        now: DateTime<FixedOffset>,
    ) -> Dashboard {
        let (readings, control) = tokio::join!(self.telemetry.readings(), self.telemetry.control());
        build_dashboard(&readings, control, &self.settings, request, now)
    }

    /// Manual actuator change; the returned state is what the next dashboard arbitrates.
    pub async fn update_control(&self, patch: &ControlPatch) -> anyhow::Result<ControlState> {
        if patch.is_empty() {
            anyhow::bail!("Control patch has no fields to change");
        }
        self.telemetry
            .update_control(patch)
            .await
            .context("Failed to update air control")
    }
}

/// Pure dashboard assembly over one poll's data.
pub fn build_dashboard(
    readings: &[Reading],
    control: Option<ControlState>,
    settings: &AnalyticsSettings,
    request: &DashboardRequest,
    now: DateTime<FixedOffset>,
) -> Dashboard {
    let offset = settings.offset();
    let thresholds = &settings.thresholds;
    let arbiter = settings.arbiter();

    let newest_first = sort_newest_first(readings, offset);
    let latest = newest_first.first();
    let room = select_room(&newest_first, request.room.as_deref());
    let in_room = room_readings(&newest_first, &room);

    let summary = summarize_room(in_room.first().or(latest), thresholds, offset);
    let overall_status = summary
        .as_ref()
        .map(|s| s.status)
        .unwrap_or(SeverityLevel::Normal);

    let mut recent: Vec<Reading> = in_room.iter().take(settings.recent_window).cloned().collect();
    recent.reverse();

    let distribution = summarize(&recent, thresholds, &settings.colors, settings.recent_window);
    let line = line_series(&recent, offset);
    let bars = bar_series(&recent, thresholds, &settings.colors, settings.bar_sample, offset);

    let alarm_status = arbiter.resolve(control.as_ref(), latest, ActuatorKind::Alarm, now);
    let window_status = arbiter.resolve(control.as_ref(), latest, ActuatorKind::Window, now);
    let manual_override_active = arbiter.is_override_active(control.as_ref(), now);

    tracing::debug!(
        room = %room,
        readings = readings.len(),
        recent = recent.len(),
        manual_override_active,
        "Built dashboard"
    );

    Dashboard {
        title: format!("{} gas monitor", room),
        room,
        summary,
        overall_status,
        overall_label: overall_status.label(),
        alarm_status,
        window_status,
        manual_override_active,
        control,
        distribution,
        line,
        bars,
        palette: ChartPalette::for_theme(request.theme),
        generated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::telemetry_source::fake::FakeSource;
    use crate::domain::control::{ControlCommand, SwitchState, WindowState, UNKNOWN_STATUS};
    use chrono::TimeDelta;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-01-02T12:00:00-05:00").unwrap()
    }

    fn settings() -> AnalyticsSettings {
        AnalyticsSettings {
            utc_offset_minutes: -300,
            ..Default::default()
        }
    }

    fn history() -> Vec<Reading> {
        vec![
            Reading::new("2024-01-02T11:00", "Cocina", 50.0),
            Reading::new("2024-01-02T11:30", "Sala", 650.0),
            Reading::new("2024-01-02T10:00", "Cocina", 320.0),
            Reading::new("2024-01-02T11:50", "Cocina", 520.0),
        ]
    }

    #[test]
    fn test_dashboard_defaults_to_latest_room() {
        let dashboard = build_dashboard(&history(), None, &settings(), &DashboardRequest::default(), now());

        assert_eq!(dashboard.room, "Cocina");
        assert_eq!(dashboard.overall_status, SeverityLevel::Critical);
        assert_eq!(dashboard.distribution.counts, [1, 1, 1]);
        assert_eq!(dashboard.line.gas, vec![320.0, 50.0, 520.0]);
        assert_eq!(dashboard.line.labels, vec!["10:00", "11:00", "11:50"]);
        assert_eq!(dashboard.alarm_status, "ON");
        assert_eq!(dashboard.window_status, "ABIERTA");
        assert!(!dashboard.manual_override_active);
    }

    #[test]
    fn test_dashboard_for_requested_room() {
        let request = DashboardRequest {
            room: Some("Sala".to_string()),
            theme: Theme::Light,
        };
        let dashboard = build_dashboard(&history(), None, &settings(), &request, now());
        assert_eq!(dashboard.room, "Sala");
        assert_eq!(dashboard.distribution.counts, [0, 0, 1]);
        assert_eq!(dashboard.palette.panel, "#ffffff");
    }

    #[test]
    fn test_manual_override_wins_while_fresh() {
        let control = ControlState {
            manual_mode: true,
            window_state: WindowState::Closed,
            fan_state: SwitchState::Off,
            alarm_state: SwitchState::Off,
            updated_at: Some(now() - TimeDelta::seconds(10)),
        };
        let dashboard = build_dashboard(
            &history(),
            Some(control.clone()),
            &settings(),
            &DashboardRequest::default(),
            now(),
        );
        assert!(dashboard.manual_override_active);
        assert_eq!(dashboard.alarm_status, "OFF");
        assert_eq!(dashboard.window_status, "CERRADA");

        let later = now() + TimeDelta::minutes(5);
        let dashboard = build_dashboard(&history(), Some(control), &settings(), &DashboardRequest::default(), later);
        assert!(!dashboard.manual_override_active);
        assert_eq!(dashboard.alarm_status, "ON");
    }

    #[test]
    fn test_empty_dashboard_degrades() {
        let dashboard = build_dashboard(&[], None, &settings(), &DashboardRequest::default(), now());
        assert_eq!(dashboard.room, "Cocina");
        assert!(dashboard.summary.is_none());
        assert_eq!(dashboard.overall_status, SeverityLevel::Normal);
        assert_eq!(dashboard.distribution.total, 1);
        assert_eq!(dashboard.line.labels, vec!["--", "--"]);
        assert!(dashboard.bars.values.is_empty());
        assert_eq!(dashboard.alarm_status, UNKNOWN_STATUS);
    }

    #[tokio::test]
    async fn test_service_uses_source() {
        let source = Arc::new(FakeSource::new(history(), None));
        let service = DashboardService::new(source.clone(), settings());

        let dashboard = service.get_dashboard(&DashboardRequest::default(), now()).await;
        assert_eq!(dashboard.room, "Cocina");

        source.fail();
        let cached = service.get_dashboard(&DashboardRequest::default(), now()).await;
        assert_eq!(cached.line.gas, dashboard.line.gas);
    }

    #[tokio::test]
    async fn test_manual_command_reaches_dashboard() {
        let control = ControlState {
            manual_mode: false,
            window_state: WindowState::Closed,
            fan_state: SwitchState::Off,
            alarm_state: SwitchState::On,
            updated_at: Some(now() - TimeDelta::seconds(5)),
        };
        let source = Arc::new(FakeSource::new(history(), Some(control)));
        let service = DashboardService::new(source.clone(), settings());

        let updated = service
            .update_control(&ControlCommand::TurnOffAlarm.patch())
            .await
            .unwrap();
        assert!(updated.manual_mode);

        let dashboard = service.get_dashboard(&DashboardRequest::default(), now()).await;
        assert!(dashboard.manual_override_active);
        assert_eq!(dashboard.alarm_status, "OFF");
    }

    #[tokio::test]
    async fn test_empty_patch_is_rejected() {
        let source = Arc::new(FakeSource::new(history(), None));
        let service = DashboardService::new(source.clone(), settings());
        assert!(service.update_control(&ControlPatch::default()).await.is_err());
        assert!(source.patches.lock().unwrap().is_empty());
    }
}
