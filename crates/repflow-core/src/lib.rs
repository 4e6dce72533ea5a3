//! # Repflow Core Library
//!
//! Runs guided workout sessions: a get-ready countdown, then timed exercise
//! intervals separated by rests, with pause, skip and an exit confirmation.
//! The CLI binary and any GUI host are thin layers over this library.
//!
//! ## Architecture
//!
//! - **Workout / Timeline**: the host's workout tree, flattened once per
//!   session into timed work items
//! - **Session Engine**: a tick-driven state machine; the caller (or the
//!   async driver) delivers one `tick()` per second
//! - **Cast**: a simulated external display, independent of the clock
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: session state machine and event source
//! - [`run_session`]: tokio driver feeding ticks and host commands
//! - [`CastProvider`]: pluggable cast device capability
//! - [`Config`]: application configuration management

pub mod cast;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod workout;

pub use cast::{CastProvider, CastSidecar, CastState, SimulatedCastProvider, DEFAULT_CAST_DEVICE};
pub use error::{CastError, ConfigError, CoreError, SessionError, WorkoutError};
pub use events::SessionEvent;
pub use session::{
    run_session, SessionAction, SessionCommand, SessionConfig, SessionEngine, SessionOutcome,
    SessionPhase, SessionSnapshot, SessionState, SessionSummary,
};
pub use storage::Config;
pub use workout::{flatten, Exercise, ExerciseSet, FlatWorkItem, Timeline, Workout, WorkoutPhase};
