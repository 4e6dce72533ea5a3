//! Pure transition functions of the session state machine.
//!
//! ```text
//! GetReady -> Exercise(0) -> Rest(0) -> Exercise(1) -> ... -> Exercise(n-1) -> Completed
//! ```
//!
//! Skip-forward and timer expiry share `advance`. Indices never leave
//! `[0, len-1]`; anything out of range lands in `Completed`.

use super::state::{SessionConfig, SessionPhase, SessionState};
use crate::workout::Timeline;

/// The state following `state` when its countdown ends or is skipped.
pub fn advance(state: &SessionState, timeline: &Timeline, config: &SessionConfig) -> SessionState {
    match state.phase {
        SessionPhase::GetReady => enter_exercise(0, timeline),
        SessionPhase::Exercise => match timeline.last_index() {
            Some(last) if state.current_index < last => {
                SessionState::rest(state.current_index, config.rest_secs)
            }
            _ => completed(timeline),
        },
        SessionPhase::Rest => enter_exercise(state.current_index.saturating_add(1), timeline),
        SessionPhase::Completed => *state,
    }
}

/// Re-enter the previous exercise (clamped at 0) with its full duration.
///
/// Only defined from `Exercise`; returns `None` elsewhere.
pub fn step_back(state: &SessionState, timeline: &Timeline) -> Option<SessionState> {
    if state.phase != SessionPhase::Exercise {
        return None;
    }
    let index = state.current_index.saturating_sub(1);
    let item = timeline.get(index)?;
    Some(SessionState::exercise(index, item.duration_secs))
}

fn enter_exercise(index: usize, timeline: &Timeline) -> SessionState {
    match timeline.get(index) {
        Some(item) => SessionState::exercise(index, item.duration_secs),
        None => completed(timeline),
    }
}

fn completed(timeline: &Timeline) -> SessionState {
    SessionState::completed(timeline.last_index().unwrap_or(0))
}
