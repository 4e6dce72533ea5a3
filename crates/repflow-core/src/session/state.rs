use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session phase. Not to be confused with a workout phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionPhase {
    GetReady,
    Exercise,
    Rest,
    Completed,
}

/// Mutable session state observed by the host.
///
/// `current_index` is 0 and meaningless during get-ready. During rest it is
/// the exercise just finished; the next one is `current_index + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub current_index: usize,
    pub time_left_secs: u64,
    pub is_paused: bool,
}

impl SessionState {
    pub fn get_ready(secs: u64) -> Self {
        Self {
            phase: SessionPhase::GetReady,
            current_index: 0,
            time_left_secs: secs,
            is_paused: false,
        }
    }

    pub fn exercise(index: usize, secs: u64) -> Self {
        Self {
            phase: SessionPhase::Exercise,
            current_index: index,
            time_left_secs: secs,
            is_paused: false,
        }
    }

    pub fn rest(after_index: usize, secs: u64) -> Self {
        Self {
            phase: SessionPhase::Rest,
            current_index: after_index,
            time_left_secs: secs,
            is_paused: false,
        }
    }

    pub fn completed(last_index: usize) -> Self {
        Self {
            phase: SessionPhase::Completed,
            current_index: last_index,
            time_left_secs: 0,
            is_paused: false,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    /// Whether skip/back/pause are meaningful.
    pub fn is_active(&self) -> bool {
        !self.is_completed()
    }
}

/// Final summary handed to the host on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_exercises: usize,
    pub declared_duration_min: u32,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SessionOutcome {
    Completed(SessionSummary),
    Cancelled,
}

/// Timing constants for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub get_ready_secs: u64,
    pub rest_secs: u64,
    /// Wall-clock length of one tick. Shortened by the CLI for fast runs.
    pub tick_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            get_ready_secs: 10,
            rest_secs: 30,
            tick_interval: Duration::from_secs(1),
        }
    }
}

/// Host-invoked operations, as accepted by `SessionEngine::dispatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionAction {
    Tick,
    TogglePause,
    SkipForward,
    SkipBackward,
    RequestExit,
    ConfirmExit,
    CancelExit,
}
