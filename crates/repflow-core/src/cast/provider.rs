use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::CastError;

pub const DEFAULT_CAST_DEVICE: &str = "Living Room TV";

/// Capability for finding and connecting to cast targets.
///
/// Swap in a real discovery protocol by implementing this trait; the session
/// engine only ever sees the resulting `CastState`.
#[async_trait]
pub trait CastProvider: Send + Sync {
    /// Devices currently reachable.
    async fn discover(&self) -> Vec<String>;

    /// Connect to `device`, returning the name it reports once connected.
    async fn connect(&self, device: &str) -> Result<String, CastError>;
}

/// Fixed device list with an artificial connect delay.
#[derive(Debug, Clone)]
pub struct SimulatedCastProvider {
    devices: Vec<String>,
    connect_delay: Duration,
}

impl SimulatedCastProvider {
    pub fn new(devices: Vec<String>, connect_delay: Duration) -> Self {
        Self {
            devices,
            connect_delay,
        }
    }

    pub fn connect_delay(&self) -> Duration {
        self.connect_delay
    }
}

impl Default for SimulatedCastProvider {
    fn default() -> Self {
        Self::new(vec![DEFAULT_CAST_DEVICE.to_string()], Duration::from_millis(1500))
    }
}

#[async_trait]
impl CastProvider for SimulatedCastProvider {
    async fn discover(&self) -> Vec<String> {
        self.devices.clone()
    }

    async fn connect(&self, device: &str) -> Result<String, CastError> {
        debug!(device, delay_ms = self.connect_delay.as_millis() as u64, "connecting to cast device");
        tokio::time::sleep(self.connect_delay).await;
        if !self.devices.iter().any(|d| d == device) {
            return Err(CastError::DeviceNotFound(device.to_string()));
        }
        info!(device, "cast device connected");
        Ok(device.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn connect_takes_the_configured_delay() {
        let provider = SimulatedCastProvider::new(vec!["TV".into()], Duration::from_secs(2));
        let started = tokio::time::Instant::now();
        assert_eq!(provider.connect("TV").await.unwrap(), "TV");
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn discover_lists_default_device() {
        let provider = SimulatedCastProvider::default();
        assert_eq!(provider.discover().await, vec![DEFAULT_CAST_DEVICE.to_string()]);
    }
}
