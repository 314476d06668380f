// Threshold classification of gas readings
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Normal,
    Warning,
    Critical,
}

impl SeverityLevel {
    /// Levels in chart order.
    pub const ALL: [SeverityLevel; 3] = [
        SeverityLevel::Normal,
        SeverityLevel::Warning,
        SeverityLevel::Critical,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SeverityLevel::Normal => "Normal",
            SeverityLevel::Warning => "Warning",
            SeverityLevel::Critical => "Critical",
        }
    }

    pub fn level_class(&self) -> &'static str {
        match self {
            SeverityLevel::Normal => "level-low",
            SeverityLevel::Warning => "level-medium",
            SeverityLevel::Critical => "level-high",
        }
    }

    /// Parse the report filter key. The report form uses `info` for the normal level.
    pub fn from_filter_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "info" | "normal" => Some(SeverityLevel::Normal),
            "warning" => Some(SeverityLevel::Warning),
            "critical" => Some(SeverityLevel::Critical),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            SeverityLevel::Normal => 0,
            SeverityLevel::Warning => 1,
            SeverityLevel::Critical => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub normal: f64,
    pub warning: f64,
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            normal: 120.0,
            warning: 300.0,
            critical: 500.0,
        }
    }
}

impl Thresholds {
    pub fn new(normal: f64, warning: f64, critical: f64) -> Self {
        Self {
            normal,
            warning,
            critical,
        }
    }

    pub fn classify(&self, gas_level: f64) -> SeverityLevel {
        classify(gas_level, self.normal, self.warning, self.critical)
    }
}

/// Map a gas concentration to a severity level.
///
/// The warning band is entered either by reaching `warning` or by exceeding
/// `normal`, so a value equal to `normal` stays normal while anything above it
/// is at least a warning. `NaN` never compares true and is reported as normal.
pub fn classify(gas_level: f64, normal: f64, warning: f64, critical: f64) -> SeverityLevel {
    if gas_level.is_nan() {
        return SeverityLevel::Normal;
    }
    if gas_level >= critical {
        return SeverityLevel::Critical;
    }
    if gas_level >= warning || gas_level > normal {
        return SeverityLevel::Warning;
    }
    SeverityLevel::Normal
}
