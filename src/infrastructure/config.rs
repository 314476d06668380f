use crate::domain::control::{OverrideArbiter, DEFAULT_OVERRIDE_WINDOW_MS};
use crate::domain::distribution::DEFAULT_RECENT_WINDOW;
use crate::domain::palette::SeverityColors;
use crate::domain::report::ReportWindows;
use crate::domain::severity::Thresholds;
use crate::domain::table::DEFAULT_PAGE_SIZE;
use crate::domain::trend::DEFAULT_BAR_SAMPLE;
use anyhow::Context;
use chrono::{FixedOffset, Offset, TimeDelta, Utc};
use config::{Environment, File, FileFormat};
use serde::Deserialize;

/// Built-in defaults, overridden by `config/safeair.toml` and `SAFEAIR__*` variables
const DEFAULT_CONFIG: &str = r#"
[server]
bind_addr = "0.0.0.0:8080"

[telemetry]
base_url = "http://localhost:3000"
readings_path = "/api/air-data"
control_path = "/api/air-control"
timeout_secs = 10

[analytics]
utc_offset_minutes = -300
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub analytics: AnalyticsSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    pub base_url: String,
    pub readings_path: String,
    pub control_path: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AnalyticsSettings {
    pub thresholds: Thresholds,
    pub override_window_ms: i64,
    pub recent_window: usize,
    pub bar_sample: usize,
    pub page_size: usize,
    pub report_windows: ReportWindows,
    /// Offset of the deployment's local time, used for calendar days and naive timestamps
    pub utc_offset_minutes: i32,
    pub colors: SeverityColors,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            override_window_ms: DEFAULT_OVERRIDE_WINDOW_MS,
            recent_window: DEFAULT_RECENT_WINDOW,
            bar_sample: DEFAULT_BAR_SAMPLE,
            page_size: DEFAULT_PAGE_SIZE,
            report_windows: ReportWindows::default(),
            utc_offset_minutes: 0,
            colors: SeverityColors::default(),
        }
    }
}

impl AnalyticsSettings {
    /// Local offset; falls back to UTC when out of range (rejected by `validate`)
    pub fn offset(&self) -> FixedOffset {
        self.checked_offset().unwrap_or_else(|| Utc.fix())
    }

    fn checked_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }

    pub fn arbiter(&self) -> OverrideArbiter {
        OverrideArbiter::new(
            self.thresholds,
            TimeDelta::milliseconds(self.override_window_ms),
        )
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.checked_offset().is_none() {
            anyhow::bail!("utc_offset_minutes out of range: {}", self.utc_offset_minutes);
        }
        if self.override_window_ms < 0 {
            anyhow::bail!("override_window_ms must not be negative");
        }
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        if self.report_windows.week_days == 0 || self.report_windows.month_days == 0 {
            anyhow::bail!("report windows must cover at least one day");
        }
        let t = &self.thresholds;
        if !(t.normal <= t.warning && t.warning <= t.critical) {
            tracing::warn!(
                "Thresholds out of order (normal={}, warning={}, critical={}), classification follows them literally",
                t.normal,
                t.warning,
                t.critical
            );
        }
        Ok(())
    }
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        .add_source(File::with_name("config/safeair").required(false))
        .add_source(Environment::with_prefix("SAFEAIR").separator("__"))
        .build()
        .context("Failed to build configuration")?;

    let config: AppConfig = settings
        .try_deserialize()
        .context("Failed to deserialize configuration")?;
    config.analytics.validate()?;

    Ok(config)
}
