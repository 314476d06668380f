// REST telemetry source implementation
use crate::application::telemetry_source::TelemetrySource;
use crate::domain::control::{ControlPatch, ControlState, SwitchState, WindowState};
use crate::domain::reading::{parse_timestamp, Reading};
use crate::infrastructure::config::TelemetrySettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::FixedOffset;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpTelemetrySource {
    client: reqwest::Client,
    readings_url: String,
    control_url: String,
    offset: FixedOffset,
}

#[derive(Debug, Deserialize)]
struct AirDataDto {
    #[serde(default)]
    fecha_hora: String,
    #[serde(default)]
    habitacion: String,
    #[serde(default)]
    sensores: SensorsDto,
    #[serde(default)]
    controles: ControlsDto,
}

#[derive(Debug, Default, Deserialize)]
struct SensorsDto {
    nivel_gas: Option<f64>,
    mq2: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ControlsDto {
    estado_sistema: Option<String>,
    estado_alarma: Option<String>,
    estado_ventana: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirControlDto {
    #[serde(default)]
    modo_manual: bool,
    ventana: WindowState,
    ventilador: SwitchState,
    alarma: SwitchState,
    updated_at: Option<String>,
}

/// Wire form of a partial update; absent fields are left out of the body.
#[derive(Debug, Serialize)]
struct AirControlPatchDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    modo_manual: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ventana: Option<WindowState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ventilador: Option<SwitchState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alarma: Option<SwitchState>,
}

impl From<&ControlPatch> for AirControlPatchDto {
    fn from(patch: &ControlPatch) -> Self {
        Self {
            modo_manual: patch.manual_mode,
            ventana: patch.window_state,
            ventilador: patch.fan_state,
            alarma: patch.alarm_state,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AirDataDto {
    fn into_reading(self) -> Reading {
        Reading {
            timestamp: self.fecha_hora,
            room: self.habitacion,
            gas_level: self.sensores.nivel_gas,
            mq2_value: self.sensores.mq2,
            system_state: non_empty(self.controles.estado_sistema),
            alarm_state: non_empty(self.controles.estado_alarma),
            window_state: non_empty(self.controles.estado_ventana),
        }
    }
}

impl AirControlDto {
    fn into_control(self, offset: FixedOffset) -> ControlState {
        let updated_at = self
            .updated_at
            .as_deref()
            .and_then(|ts| parse_timestamp(ts, offset));
        ControlState {
            manual_mode: self.modo_manual,
            window_state: self.ventana,
            fan_state: self.ventilador,
            alarm_state: self.alarma,
            updated_at,
        }
    }
}

impl HttpTelemetrySource {
    pub fn new(settings: &TelemetrySettings, offset: FixedOffset) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        let base = settings.base_url.trim_end_matches('/');

        Ok(Self {
            client,
            readings_url: format!("{}{}", base, settings.readings_path),
            control_url: format!("{}{}", base, settings.control_path),
            offset,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let request = self.client.get(url);
        self.execute(request, url).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let request = self.client.put(url).json(body);
        self.execute(request, url).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder, url: &str) -> Result<T> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telemetry request to {} failed with status {}: {}", url, status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

#[async_trait]
impl TelemetrySource for HttpTelemetrySource {
    async fn fetch_readings(&self) -> Result<Vec<Reading>> {
        let dtos: Vec<AirDataDto> = self.get_json(&self.readings_url).await?;
        Ok(dtos.into_iter().map(AirDataDto::into_reading).collect())
    }

    async fn fetch_control(&self) -> Result<Option<ControlState>> {
        let dto: Option<AirControlDto> = self.get_json(&self.control_url).await?;
        Ok(dto.map(|d| d.into_control(self.offset)))
    }

    async fn update_control(&self, patch: &ControlPatch) -> Result<ControlState> {
        tracing::info!("Updating air control: {:?}", patch);
        let dto: AirControlDto = self
            .put_json(&self.control_url, &AirControlPatchDto::from(patch))
            .await?;
        Ok(dto.into_control(self.offset))
    }
}
