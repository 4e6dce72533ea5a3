use serde::{Deserialize, Serialize};

use crate::cast::CastState;
use crate::session::{SessionState, SessionSummary};

/// Every observable change of a session produces an event.
/// Hosts receive them through `SessionEngine::subscribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Phase, index, remaining time or pause flag changed.
    StateChanged { state: SessionState },
    CastStateChanged { cast: CastState },
    /// A cast connection attempt failed; cast state is unchanged.
    CastFailed { device: String, message: String },
    /// Exit confirmation prompt opened.
    ExitRequested,
    /// Exit confirmation prompt dismissed without exiting.
    ExitDismissed,
    /// Emitted once, on entering the completed phase.
    Completed { summary: SessionSummary },
    /// Emitted once, on confirmed exit. Never follows `Completed`.
    Cancelled,
}

impl SessionEvent {
    /// Whether this event ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionEvent::Completed { .. } | SessionEvent::Cancelled)
    }
}
