//! Confirmation gate in front of session cancellation.

use super::clock::SessionClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitGuardState {
    #[default]
    Closed,
    /// Prompt is showing; the clock is frozen.
    Prompting,
    /// Exit confirmed. Terminal.
    Confirmed,
}

/// Tracks the exit prompt and holds the clock while it is open.
#[derive(Debug, Clone, Default)]
pub struct ExitGuard {
    state: ExitGuardState,
}

impl ExitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ExitGuardState {
        self.state
    }

    pub fn is_prompting(&self) -> bool {
        self.state == ExitGuardState::Prompting
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == ExitGuardState::Confirmed
    }

    /// Open the prompt and freeze the clock. Returns false if the prompt was
    /// already open or the exit was already confirmed.
    pub fn request(&mut self, clock: &mut SessionClock) -> bool {
        if self.state != ExitGuardState::Closed {
            return false;
        }
        self.state = ExitGuardState::Prompting;
        clock.freeze();
        true
    }

    /// Close the prompt without exiting. The clock's own pause flag is left
    /// exactly as it was when the prompt opened.
    pub fn dismiss(&mut self, clock: &mut SessionClock) -> bool {
        if self.state != ExitGuardState::Prompting {
            return false;
        }
        self.state = ExitGuardState::Closed;
        clock.thaw();
        true
    }

    /// Confirm the exit and halt the clock for good. Only an open prompt
    /// can be confirmed.
    pub fn confirm(&mut self, clock: &mut SessionClock) -> bool {
        if self.state != ExitGuardState::Prompting {
            return false;
        }
        self.state = ExitGuardState::Confirmed;
        clock.disarm();
        true
    }

    /// Exit without a prompt, for a host that is tearing the session down.
    pub fn abandon(&mut self, clock: &mut SessionClock) -> bool {
        if self.state == ExitGuardState::Confirmed {
            return false;
        }
        self.state = ExitGuardState::Confirmed;
        clock.disarm();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::clock::ClockTick;

    #[test]
    fn prompt_freezes_running_clock() {
        let mut clock = SessionClock::new();
        clock.arm(10);
        let mut guard = ExitGuard::new();

        assert!(guard.request(&mut clock));
        assert_eq!(clock.tick(), ClockTick::Idle);
        assert!(!clock.is_paused());

        assert!(guard.dismiss(&mut clock));
        assert_eq!(clock.tick(), ClockTick::Running { remaining_secs: 9 });
    }

    #[test]
    fn dismiss_keeps_user_pause() {
        let mut clock = SessionClock::new();
        clock.arm(10);
        clock.pause();
        let mut guard = ExitGuard::new();
        guard.request(&mut clock);
        guard.dismiss(&mut clock);
        assert!(clock.is_paused());
        assert_eq!(clock.tick(), ClockTick::Idle);
    }

    #[test]
    fn repeated_requests_are_ignored() {
        let mut clock = SessionClock::new();
        let mut guard = ExitGuard::new();
        assert!(guard.request(&mut clock));
        assert!(!guard.request(&mut clock));
        assert!(!ExitGuard::new().dismiss(&mut clock));
    }

    #[test]
    fn confirm_is_terminal() {
        let mut clock = SessionClock::new();
        clock.arm(10);
        let mut guard = ExitGuard::new();
        guard.request(&mut clock);
        assert!(guard.confirm(&mut clock));
        assert!(!guard.confirm(&mut clock));
        assert!(!guard.request(&mut clock));
        assert!(clock.is_disarmed());
    }

    #[test]
    fn confirm_needs_open_prompt() {
        let mut clock = SessionClock::new();
        clock.arm(10);
        let mut guard = ExitGuard::new();
        assert!(!guard.confirm(&mut clock));
        assert_eq!(guard.state(), ExitGuardState::Closed);
        assert_eq!(clock.tick(), ClockTick::Running { remaining_secs: 9 });

        assert!(guard.abandon(&mut clock));
        assert!(guard.is_confirmed());
        assert!(clock.is_disarmed());
        assert!(!guard.abandon(&mut clock));
    }
}
