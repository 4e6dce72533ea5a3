//! Cast sidecar: mirrors the session onto an external display.
//!
//! Casting only changes which surface the host renders. It never pauses,
//! resets or otherwise touches the session clock.

mod provider;

pub use provider::{CastProvider, SimulatedCastProvider, DEFAULT_CAST_DEVICE};

use serde::{Deserialize, Serialize};

use crate::error::CastError;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CastState {
    pub is_casting: bool,
    pub connected_device_name: Option<String>,
}

/// Per-session cast state plus the connection attempt in flight, if any.
#[derive(Debug, Clone, Default)]
pub struct CastSidecar {
    state: CastState,
    pending: Option<String>,
}

impl CastSidecar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CastState {
        &self.state
    }

    pub fn pending_device(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Record that a connection attempt to `device` started.
    pub fn begin_connect(&mut self, device: &str) {
        self.pending = Some(device.to_string());
    }

    /// Apply the outcome of a connection attempt.
    ///
    /// Results for an attempt that was superseded or abandoned by
    /// `disconnect` are dropped and reported as `Ok(false)`. A failure leaves
    /// the state unchanged and is returned to the caller.
    pub fn finish_connect(
        &mut self,
        device: &str,
        result: Result<String, CastError>,
    ) -> Result<bool, CastError> {
        if self.pending.as_deref() != Some(device) {
            return Ok(false);
        }
        self.pending = None;
        let name = result?;
        let next = CastState {
            is_casting: true,
            connected_device_name: Some(name),
        };
        let changed = next != self.state;
        self.state = next;
        Ok(changed)
    }

    /// Connect through `provider`, awaiting its simulated delay.
    pub async fn connect(
        &mut self,
        provider: &dyn CastProvider,
        device: &str,
    ) -> Result<&CastState, CastError> {
        self.begin_connect(device);
        let result = provider.connect(device).await;
        self.finish_connect(device, result)?;
        Ok(&self.state)
    }

    /// Drop the connection and any attempt in flight. Returns whether the
    /// visible state changed.
    pub fn disconnect(&mut self) -> bool {
        self.pending = None;
        let changed = self.state != CastState::default();
        self.state = CastState::default();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn connect_waits_then_casts() {
        let provider = SimulatedCastProvider::new(vec!["Den TV".into()], Duration::from_millis(1500));
        let mut sidecar = CastSidecar::new();

        let state = sidecar.connect(&provider, "Den TV").await.unwrap();
        assert!(state.is_casting);
        assert_eq!(state.connected_device_name.as_deref(), Some("Den TV"));

        assert!(sidecar.disconnect());
        assert_eq!(sidecar.state(), &CastState::default());
        assert!(!sidecar.disconnect());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_connect_leaves_state_unchanged() {
        let provider = SimulatedCastProvider::default();
        let mut sidecar = CastSidecar::new();

        let err = sidecar.connect(&provider, "Garage Projector").await.unwrap_err();
        assert_eq!(err, CastError::DeviceNotFound("Garage Projector".into()));
        assert_eq!(sidecar.state(), &CastState::default());
        assert_eq!(sidecar.pending_device(), None);
    }

    #[test]
    fn late_result_after_disconnect_is_dropped() {
        let mut sidecar = CastSidecar::new();
        sidecar.begin_connect("Living Room TV");
        sidecar.disconnect();

        let applied = sidecar
            .finish_connect("Living Room TV", Ok("Living Room TV".into()))
            .unwrap();
        assert!(!applied);
        assert!(!sidecar.state().is_casting);
    }

    #[test]
    fn newer_attempt_supersedes_older() {
        let mut sidecar = CastSidecar::new();
        sidecar.begin_connect("A");
        sidecar.begin_connect("B");
        assert!(!sidecar.finish_connect("A", Ok("A".into())).unwrap());
        assert!(sidecar.finish_connect("B", Ok("B".into())).unwrap());
        assert_eq!(sidecar.state().connected_device_name.as_deref(), Some("B"));
    }
}
