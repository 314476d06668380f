// Actuator control state and manual override arbitration
use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};

use super::reading::Reading;
use super::severity::{SeverityLevel, Thresholds};

/// Status reported when neither the control state nor a reading says anything.
pub const UNKNOWN_STATUS: &str = "unknown";

/// Default lifetime of a manual actuator change.
pub const DEFAULT_OVERRIDE_WINDOW_MS: i64 = 90_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowState {
    #[serde(rename = "ABIERTA")]
    Open,
    #[serde(rename = "MEDIA")]
    Mid,
    #[serde(rename = "CERRADA")]
    Closed,
}

impl WindowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowState::Open => "ABIERTA",
            WindowState::Mid => "MEDIA",
            WindowState::Closed => "CERRADA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwitchState {
    On,
    Off,
}

impl SwitchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchState::On => "ON",
            SwitchState::Off => "OFF",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub manual_mode: bool,
    pub window_state: WindowState,
    pub fan_state: SwitchState,
    pub alarm_state: SwitchState,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// Partial actuator change; only the `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlPatch {
    pub manual_mode: Option<bool>,
    pub window_state: Option<WindowState>,
    pub fan_state: Option<SwitchState>,
    pub alarm_state: Option<SwitchState>,
}

impl ControlPatch {
    pub fn is_empty(&self) -> bool {
        self.manual_mode.is_none()
            && self.window_state.is_none()
            && self.fan_state.is_none()
            && self.alarm_state.is_none()
    }
}

/// Operator shortcuts. Each one switches to manual mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    OpenWindow,
    CloseWindow,
    TurnOffAlarm,
    TurnOnFan,
    TurnOffFan,
}

impl ControlCommand {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open-window" => Some(ControlCommand::OpenWindow),
            "close-window" => Some(ControlCommand::CloseWindow),
            "turn-off-alarm" => Some(ControlCommand::TurnOffAlarm),
            "turn-on-fan" => Some(ControlCommand::TurnOnFan),
            "turn-off-fan" => Some(ControlCommand::TurnOffFan),
            _ => None,
        }
    }

    pub fn patch(&self) -> ControlPatch {
        let manual = ControlPatch {
            manual_mode: Some(true),
            ..Default::default()
        };
        match self {
            ControlCommand::OpenWindow => ControlPatch {
                window_state: Some(WindowState::Open),
                ..manual
            },
            ControlCommand::CloseWindow => ControlPatch {
                window_state: Some(WindowState::Closed),
                ..manual
            },
            ControlCommand::TurnOffAlarm => ControlPatch {
                alarm_state: Some(SwitchState::Off),
                ..manual
            },
            ControlCommand::TurnOnFan => ControlPatch {
                fan_state: Some(SwitchState::On),
                ..manual
            },
            ControlCommand::TurnOffFan => ControlPatch {
                fan_state: Some(SwitchState::Off),
                ..manual
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorKind {
    Alarm,
    Window,
}

impl ActuatorKind {
    fn manual_value(&self, control: &ControlState) -> &'static str {
        match self {
            ActuatorKind::Alarm => control.alarm_state.as_str(),
            ActuatorKind::Window => control.window_state.as_str(),
        }
    }

    fn reported_value<'a>(&self, reading: &'a Reading) -> Option<&'a str> {
        let value = match self {
            ActuatorKind::Alarm => reading.alarm_state.as_deref(),
            ActuatorKind::Window => reading.window_state.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }

    fn derived_value(&self, severity: SeverityLevel) -> &'static str {
        let critical = severity == SeverityLevel::Critical;
        match (self, critical) {
            (ActuatorKind::Alarm, true) => SwitchState::On.as_str(),
            (ActuatorKind::Alarm, false) => SwitchState::Off.as_str(),
            (ActuatorKind::Window, true) => WindowState::Open.as_str(),
            (ActuatorKind::Window, false) => WindowState::Closed.as_str(),
        }
    }
}

/// Decides whether a manual actuator change still wins over automatic behavior.
///
/// There is no timer: a manual change expires simply because every call
/// compares `now` against the control state's `updated_at`.
#[derive(Debug, Clone, Copy)]
pub struct OverrideArbiter {
    thresholds: Thresholds,
    override_window: TimeDelta,
}

impl Default for OverrideArbiter {
    fn default() -> Self {
        Self::new(
            Thresholds::default(),
            TimeDelta::milliseconds(DEFAULT_OVERRIDE_WINDOW_MS),
        )
    }
}

impl OverrideArbiter {
    pub fn new(thresholds: Thresholds, override_window: TimeDelta) -> Self {
        Self {
            thresholds,
            override_window,
        }
    }

    pub fn override_window(&self) -> TimeDelta {
        self.override_window
    }

    /// A clock-skewed `updated_at` in the future never activates the override.
    pub fn is_override_active(
        &self,
        control: Option<&ControlState>,
        now: DateTime<FixedOffset>,
    ) -> bool {
        let Some(control) = control else {
            return false;
        };
        if !control.manual_mode {
            return false;
        }
        let Some(updated_at) = control.updated_at else {
            return false;
        };
        let elapsed = now.signed_duration_since(updated_at);
        elapsed >= TimeDelta::zero() && elapsed <= self.override_window
    }

    pub fn resolve(
        &self,
        control: Option<&ControlState>,
        latest: Option<&Reading>,
        kind: ActuatorKind,
        now: DateTime<FixedOffset>,
    ) -> String {
        if self.is_override_active(control, now) {
            let status = control
                .map(|c| kind.manual_value(c))
                .or_else(|| latest.and_then(|r| kind.reported_value(r)))
                .unwrap_or(UNKNOWN_STATUS);
            return status.to_string();
        }
        self.resolve_automatic(control, latest, kind)
    }

    fn resolve_automatic(
        &self,
        control: Option<&ControlState>,
        latest: Option<&Reading>,
        kind: ActuatorKind,
    ) -> String {
        if let Some(reported) = latest.and_then(|r| kind.reported_value(r)) {
            return reported.to_string();
        }
        if let Some(severity) = latest.and_then(|r| r.severity(&self.thresholds)) {
            return kind.derived_value(severity).to_string();
        }
        control
            .map(|c| kind.manual_value(c))
            .unwrap_or(UNKNOWN_STATUS)
            .to_string()
    }
}
