// Telemetry source trait and last-known-value fallback
use crate::domain::control::{ControlPatch, ControlState};
use crate::domain::reading::Reading;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Full reading history, in whatever order the source returns it
    async fn fetch_readings(&self) -> anyhow::Result<Vec<Reading>>;

    /// Current actuator snapshot, if the source has one
    async fn fetch_control(&self) -> anyhow::Result<Option<ControlState>>;

    /// Apply a partial actuator change and return the stored control state
    async fn update_control(&self, patch: &ControlPatch) -> anyhow::Result<ControlState>;
}

/// Wraps a source and keeps the last successful results.
///
/// A failed poll logs and serves the previous data instead of blanking the
/// dashboard.
#[derive(Clone)]
pub struct LastKnownTelemetry {
    source: Arc<dyn TelemetrySource>,
    readings: Arc<RwLock<Vec<Reading>>>,
    control: Arc<RwLock<Option<ControlState>>>,
}

impl LastKnownTelemetry {
    pub fn new(source: Arc<dyn TelemetrySource>) -> Self {
        Self {
            source,
            readings: Arc::new(RwLock::new(Vec::new())),
            control: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn readings(&self) -> Vec<Reading> {
        match self.source.fetch_readings().await {
            Ok(readings) => {
                tracing::debug!("Fetched {} readings", readings.len());
                *self.readings.write().await = readings.clone();
                readings
            }
            Err(e) => {
                tracing::warn!("Keeping previous readings, fetch failed: {:#}", e);
                self.readings.read().await.clone()
            }
        }
    }

    pub async fn control(&self) -> Option<ControlState> {
        match self.source.fetch_control().await {
            Ok(Some(control)) => {
                *self.control.write().await = Some(control.clone());
                Some(control)
            }
            Ok(None) => {
                tracing::debug!("Telemetry source has no control state, using last known");
                self.control.read().await.clone()
            }
            Err(e) => {
                tracing::warn!("Keeping previous control state, fetch failed: {:#}", e);
                self.control.read().await.clone()
            }
        }
    }

    /// Commands are not retried or faked: a failure leaves the cache untouched.
    pub async fn update_control(&self, patch: &ControlPatch) -> anyhow::Result<ControlState> {
        let control = self.source.update_control(patch).await?;
        *self.control.write().await = Some(control.clone());
        Ok(control)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::Mutex;

    /// In-memory source whose responses can be swapped or made to fail.
    #[derive(Default)]
    pub struct FakeSource {
        pub readings: Mutex<Option<Vec<Reading>>>,
        pub control: Mutex<Option<Option<ControlState>>>,
        pub patches: Mutex<Vec<ControlPatch>>,
    }

    impl FakeSource {
        pub fn new(readings: Vec<Reading>, control: Option<ControlState>) -> Self {
            Self {
                readings: Mutex::new(Some(readings)),
                control: Mutex::new(Some(control)),
                patches: Mutex::new(Vec::new()),
            }
        }

        pub fn fail(&self) {
            *self.readings.lock().unwrap() = None;
            *self.control.lock().unwrap() = None;
        }
    }

    #[async_trait]
    impl TelemetrySource for FakeSource {
        async fn fetch_readings(&self) -> anyhow::Result<Vec<Reading>> {
            self.readings
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| anyhow::anyhow!("source unavailable"))
        }

        async fn fetch_control(&self) -> anyhow::Result<Option<ControlState>> {
            self.control
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| anyhow::anyhow!("source unavailable"))
        }

        async fn update_control(&self, patch: &ControlPatch) -> anyhow::Result<ControlState> {
            let mut guard = self.control.lock().unwrap();
            let Some(Some(current)) = guard.as_ref() else {
                anyhow::bail!("no control document to update");
            };
            let updated = ControlState {
                manual_mode: patch.manual_mode.unwrap_or(current.manual_mode),
                window_state: patch.window_state.unwrap_or(current.window_state),
                fan_state: patch.fan_state.unwrap_or(current.fan_state),
                alarm_state: patch.alarm_state.unwrap_or(current.alarm_state),
                updated_at: current.updated_at,
            };
            *guard = Some(Some(updated.clone()));
            self.patches.lock().unwrap().push(patch.clone());
            Ok(updated)
        }
    }
}
