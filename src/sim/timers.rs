//! Deferred, cancellable effects
//!
//! Effects like "multiplier reverts after 10 seconds" are scheduled here
//! against the wall clock. Each task carries a `TimerToken`; the code that
//! applies a fired task must check that the token is still the one recorded
//! in the round state before touching anything.

use serde::{Deserialize, Serialize};

/// Identifies one scheduled activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

/// What happens when a task fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// Multiplier power-up runs out
    MultiplierExpiry,
    /// Slow-time window ends and spawning resumes
    SlowTimeEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub token: TimerToken,
    pub kind: TimerKind,
    /// Wall clock time (ms) at which the task fires
    pub fire_at_ms: f64,
}

/// Pending tasks, kept sorted by fire time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timers {
    tasks: Vec<ScheduledTask>,
    next_token: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire at `fire_at_ms`
    pub fn schedule(&mut self, kind: TimerKind, fire_at_ms: f64) -> TimerToken {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        let idx = self.tasks.partition_point(|t| t.fire_at_ms <= fire_at_ms);
        self.tasks.insert(
            idx,
            ScheduledTask {
                token,
                kind,
                fire_at_ms,
            },
        );
        token
    }

    /// Cancel a task. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.token != token);
        self.tasks.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    /// Remove and return every task due at `now_ms`, oldest first
    pub fn take_due(&mut self, now_ms: f64) -> Vec<ScheduledTask> {
        let split = self.tasks.partition_point(|t| t.fire_at_ms <= now_ms);
        self.tasks.drain(..split).collect()
    }

    #[cfg(test)]
    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.tasks.iter().any(|t| t.token == token)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
