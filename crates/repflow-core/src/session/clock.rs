//! Single countdown driving phase transitions.
//!
//! Like the rest of the engine the clock owns no thread or timer; the
//! caller delivers one `tick()` per elapsed second.

/// Result of delivering one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// Not counting (paused, frozen, dormant or disarmed).
    Idle,
    /// Decremented; the countdown is still running.
    Running { remaining_secs: u64 },
    /// Reached zero on this tick. Reported once per armed countdown.
    Expired,
}

#[derive(Debug, Clone)]
pub struct SessionClock {
    remaining_secs: u64,
    paused: bool,
    /// Hold applied while an exit prompt is open, independent of `paused`.
    frozen: bool,
    /// Set once the countdown expired; cleared by `arm`.
    dormant: bool,
    disarmed: bool,
    /// Incremented every time a countdown is replaced.
    epoch: u64,
}

impl SessionClock {
    /// A clock with no countdown armed.
    pub fn new() -> Self {
        Self {
            remaining_secs: 0,
            paused: false,
            frozen: false,
            dormant: true,
            disarmed: false,
            epoch: 0,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_dormant(&self) -> bool {
        self.dormant
    }

    pub fn is_disarmed(&self) -> bool {
        self.disarmed
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Replace the current countdown. Any expiry the old one was about to
    /// report is discarded. The pause flag is cleared; a freeze is kept.
    pub fn arm(&mut self, secs: u64) {
        if self.disarmed {
            return;
        }
        self.remaining_secs = secs;
        self.paused = false;
        self.dormant = false;
        self.epoch += 1;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn thaw(&mut self) {
        self.frozen = false;
    }

    /// Halt for good. No tick will ever count again.
    pub fn disarm(&mut self) {
        self.disarmed = true;
        self.dormant = true;
    }

    pub fn tick(&mut self) -> ClockTick {
        if self.disarmed || self.dormant || self.paused || self.frozen {
            return ClockTick::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.dormant = true;
            ClockTick::Expired
        } else {
            ClockTick::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}
