// Chart colors, chosen by parameter rather than observed from the UI
use serde::{Deserialize, Serialize};

use super::severity::SeverityLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityColors {
    pub normal: String,
    pub warning: String,
    pub critical: String,
}

impl Default for SeverityColors {
    fn default() -> Self {
        Self {
            normal: "#22c55e".to_string(),
            warning: "#f59e0b".to_string(),
            critical: "#ef4444".to_string(),
        }
    }
}

impl SeverityColors {
    pub fn color(&self, level: SeverityLevel) -> &str {
        match level {
            SeverityLevel::Normal => &self.normal,
            SeverityLevel::Warning => &self.warning,
            SeverityLevel::Critical => &self.critical,
        }
    }
}

/// Axis, grid, text and panel colors for a theme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPalette {
    pub axis: &'static str,
    pub grid: &'static str,
    pub text: &'static str,
    pub panel: &'static str,
}

impl ChartPalette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                axis: "#475569",
                grid: "rgba(148, 163, 184, 0.25)",
                text: "#0f172a",
                panel: "#ffffff",
            },
            Theme::Dark => Self {
                axis: "#cbd5f5",
                grid: "rgba(148, 163, 184, 0.2)",
                text: "#e2e8f0",
                panel: "#0f172a",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_selects_palette() {
        assert_eq!(ChartPalette::for_theme(Theme::Light).panel, "#ffffff");
        assert_eq!(ChartPalette::for_theme(Theme::Dark).panel, "#0f172a");
        assert_eq!(Theme::parse("LIGHT"), Some(Theme::Light));
        assert_eq!(Theme::parse("sepia"), None);
    }

    #[test]
    fn test_severity_colors() {
        let colors = SeverityColors::default();
        assert_eq!(colors.color(SeverityLevel::Critical), "#ef4444");
        assert_eq!(colors.color(SeverityLevel::Normal), "#22c55e");
    }
}
