// Header + row tables handed to the presentation layer for file export
use serde::Serialize;

use super::buckets::DailySeries;
use super::reading::Reading;

pub const READING_HEADERS: [&str; 7] = [
    "fecha_hora",
    "habitacion",
    "nivel_gas",
    "mq2",
    "estado_sistema",
    "estado_alarma",
    "estado_ventana",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

pub fn readings_table(title: &str, readings: &[Reading]) -> ExportTable {
    let rows = readings
        .iter()
        .map(|r| {
            vec![
                r.timestamp.clone(),
                r.room.clone(),
                number(r.gas_level),
                number(r.mq2_value),
                text(&r.system_state),
                text(&r.alarm_state),
                text(&r.window_state),
            ]
        })
        .collect();

    ExportTable {
        title: title.to_string(),
        headers: READING_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows,
    }
}

/// Label/value table for one daily series.
pub fn series_table(title: &str, value_header: &str, series: &DailySeries) -> ExportTable {
    let rows = series
        .labels
        .iter()
        .zip(&series.values)
        .map(|(label, value)| vec![label.clone(), value.to_string()])
        .collect();

    ExportTable {
        title: title.to_string(),
        headers: vec!["Fecha".to_string(), value_header.to_string()],
        rows,
    }
}
