//! One-tick-per-second async driver for a `SessionEngine`.
//!
//! The driver is a single task. Commands are polled before ticks
//! (`biased` select), so a skip that arrives in the same instant as a tick
//! always wins and the expiry of the phase being left is never delivered.
//! Pausing or opening the exit prompt keeps the part of the current second
//! already counted, so resuming does not lose it.
//! Cast connects run in their own task and report back over a channel, so
//! the connect delay never holds up the countdown.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::engine::SessionEngine;
use super::state::{SessionAction, SessionOutcome};
use crate::cast::CastProvider;
use crate::error::{CastError, SessionError};

/// Host requests delivered to a running driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    TogglePause,
    SkipForward,
    SkipBackward,
    RequestExit,
    ConfirmExit,
    CancelExit,
    ConnectCast(String),
    DisconnectCast,
}

impl SessionCommand {
    fn action(&self) -> Option<SessionAction> {
        match self {
            SessionCommand::TogglePause => Some(SessionAction::TogglePause),
            SessionCommand::SkipForward => Some(SessionAction::SkipForward),
            SessionCommand::SkipBackward => Some(SessionAction::SkipBackward),
            SessionCommand::RequestExit => Some(SessionAction::RequestExit),
            SessionCommand::ConfirmExit => Some(SessionAction::ConfirmExit),
            SessionCommand::CancelExit => Some(SessionAction::CancelExit),
            SessionCommand::ConnectCast(_) | SessionCommand::DisconnectCast => None,
        }
    }
}

type CastResult = (String, Result<String, CastError>);

/// Upper bound on a single cast connection attempt.
pub const CAST_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Start `engine` and drive it until it completes or is cancelled.
///
/// Dropping every sender of `commands` counts as a confirmed exit.
///
/// # Errors
///
/// Returns `SessionError::EmptyWorkout` without ticking if the workout has
/// no exercises.
pub async fn run_session(
    mut engine: SessionEngine,
    mut commands: mpsc::Receiver<SessionCommand>,
    cast_provider: Arc<dyn CastProvider>,
) -> Result<(SessionOutcome, SessionEngine), SessionError> {
    engine.start()?;

    let period = engine.config().tick_interval.max(Duration::from_micros(1));
    let mut second_started = Instant::now();
    let mut ticker = interval_at(second_started + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Share of the current second already counted when the clock was held.
    let mut held_at: Option<Duration> = None;

    let (cast_tx, mut cast_rx) = mpsc::channel::<CastResult>(4);

    loop {
        if let Some(outcome) = engine.outcome() {
            info!(session = %engine.id(), ?outcome, "driver finished");
            return Ok((outcome, engine));
        }

        tokio::select! {
            biased;

            command = commands.recv() => {
                let Some(command) = command else {
                    debug!(session = %engine.id(), "command channel closed; cancelling");
                    engine.abandon();
                    continue;
                };
                let epoch = engine.clock_epoch();

                match command {
                    SessionCommand::ConnectCast(device) => {
                        if engine.begin_cast(&device) {
                            let provider = Arc::clone(&cast_provider);
                            let tx = cast_tx.clone();
                            tokio::spawn(async move {
                                let attempt = provider.connect(&device);
                                let result = tokio::time::timeout(CAST_CONNECT_TIMEOUT, attempt)
                                    .await
                                    .unwrap_or_else(|_| {
                                        Err(CastError::Timeout {
                                            device: device.clone(),
                                            timeout_ms: CAST_CONNECT_TIMEOUT.as_millis() as u64,
                                        })
                                    });
                                // The session may be gone by now; nothing to report to.
                                let _ = tx.send((device, result)).await;
                            });
                        }
                    }
                    SessionCommand::DisconnectCast => {
                        engine.disconnect_cast();
                    }
                    other => {
                        if let Some(action) = other.action() {
                            engine.dispatch(action);
                        }
                    }
                }

                let now = Instant::now();
                let held = is_held(&engine);
                if engine.clock_epoch() != epoch {
                    // A new countdown starts on a fresh second.
                    second_started = now;
                    held_at = held.then_some(Duration::ZERO);
                    ticker.reset();
                } else if held && held_at.is_none() {
                    held_at = Some((now - second_started).min(period));
                } else if !held {
                    if let Some(spent) = held_at.take() {
                        second_started = now - spent;
                        ticker.reset_at(now + (period - spent));
                    }
                }
            }

            Some((device, result)) = cast_rx.recv() => {
                engine.finish_cast(&device, result);
            }

            _ = ticker.tick() => {
                if held_at.is_none() {
                    second_started = Instant::now();
                }
                engine.tick();
            }
        }
    }
}

/// Paused by the user or frozen behind the exit prompt.
fn is_held(engine: &SessionEngine) -> bool {
    engine.state().is_paused || engine.exit_prompt_open()
}
