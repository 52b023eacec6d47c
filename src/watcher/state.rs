//! Poll driver state machine.

/// Current state of the poll driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DriverState {
    #[default]
    Idle,
    Polling,
    Backoff,
    Stopping,
    Stopped,
}

impl DriverState {
    /// Whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, next: DriverState) -> bool {
        use DriverState::{Backoff, Idle, Polling, Stopped, Stopping};

        match (self, next) {
            (Stopped, _) => false,
            (_, Stopping) => self != Stopping,
            (Stopping, Stopped) | (Idle, Polling) | (Polling, Idle | Backoff) | (Backoff, Idle) => {
                true
            }
            _ => false,
        }
    }
}

/// State machine for tracking the poll loop.
#[derive(Debug, Clone, Default)]
pub struct DriverStateMachine {
    state: DriverState,
    cycles: u64,
    failed_cycles: u64,
    matches: u64,
    unreadable: u64,
}

impl DriverStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Move to `new_state`, returning `false` if the transition is illegal.
    pub fn transition(&mut self, new_state: DriverState) -> bool {
        if !self.state.can_transition_to(new_state) {
            tracing::warn!(from = ?self.state, to = ?new_state, "Ignoring illegal state transition");
            return false;
        }
        tracing::debug!(from = ?self.state, to = ?new_state, "State transition");
        self.state = new_state;
        true
    }

    pub fn record_cycle(&mut self) {
        self.cycles = self.cycles.saturating_add(1);
    }

    pub fn record_failed_cycle(&mut self) {
        self.failed_cycles = self.failed_cycles.saturating_add(1);
    }

    pub fn record_matches(&mut self, count: usize) {
        self.matches = self.matches.saturating_add(count as u64);
    }

    pub fn record_unreadable(&mut self) {
        self.unreadable = self.unreadable.saturating_add(1);
    }

    #[must_use]
    pub fn stats(&self) -> DriverStats {
        DriverStats {
            cycles: self.cycles,
            failed_cycles: self.failed_cycles,
            matches: self.matches,
            unreadable: self.unreadable,
        }
    }
}

/// Poll loop statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub matches: u64,
    pub unreadable: u64,
}
