mod clock;
pub mod driver;
mod engine;
mod exit_guard;
mod state;
pub mod transition;

pub use clock::{ClockTick, SessionClock};
pub use driver::{run_session, SessionCommand};
pub use engine::{SessionEngine, SessionSnapshot, Subscriber};
pub use exit_guard::{ExitGuard, ExitGuardState};
pub use state::{
    SessionAction, SessionConfig, SessionOutcome, SessionPhase, SessionState, SessionSummary,
};
