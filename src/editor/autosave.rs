//! Debounced autosave.
//!
//! Two states: idle and pending. Each edit (re)schedules the flush for
//! `delay` after that edit, so a burst of typing produces one save once the
//! user pauses. Time is passed in explicitly; nothing here reads the clock.

use log::debug;
use std::time::{Duration, Instant};

/// Debouncer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    Idle,
    Pending { deadline: Instant },
}

/// Coalesces edit notifications into a single flush.
#[derive(Debug, Clone)]
pub struct Autosave {
    delay: Duration,
    state: AutosaveState,
}

impl Autosave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: AutosaveState::Idle,
        }
    }

    /// Change the quiescence interval. A pending flush keeps its deadline.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, AutosaveState::Pending { .. })
    }

    /// Record edit activity at `now`, replacing any scheduled flush.
    pub fn on_edit(&mut self, now: Instant) {
        if !self.is_pending() {
            debug!("Autosave scheduled in {:?}", self.delay);
        }
        self.state = AutosaveState::Pending {
            deadline: now + self.delay,
        };
    }

    /// Returns `true` exactly once when the scheduled flush is due, moving
    /// back to idle.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            AutosaveState::Pending { deadline } if now >= deadline => {
                self.state = AutosaveState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Drop any scheduled flush. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        self.state = AutosaveState::Idle;
        was_pending
    }

    /// Time left until the flush is due, for scheduling a wake-up.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        match self.state {
            AutosaveState::Pending { deadline } => Some(deadline.saturating_duration_since(now)),
            AutosaveState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_starts_idle() {
        let mut autosave = Autosave::new(ms(2000));
        assert_eq!(autosave.state, AutosaveState::Idle);
        assert!(!autosave.poll(Instant::now()));
    }

    #[test]
    fn test_burst_of_edits_flushes_once_after_last_edit() {
        let t0 = Instant::now();
        let mut autosave = Autosave::new(ms(2000));

        let mut flushes = Vec::new();
        for step in (0..=4000).step_by(100) {
            let now = t0 + ms(step);
            if step == 0 || step == 500 || step == 1000 {
                autosave.on_edit(now);
            }
            if autosave.poll(now) {
                flushes.push(step);
            }
        }
        assert_eq!(flushes, vec![3000]);
    }

    #[test]
    fn test_not_due_before_deadline() {
        let t0 = Instant::now();
        let mut autosave = Autosave::new(ms(2000));
        autosave.on_edit(t0);
        assert!(!autosave.poll(t0 + ms(1999)));
        assert!(autosave.is_pending());
        assert!(autosave.poll(t0 + ms(2000)));
        assert!(!autosave.is_pending());
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut autosave = Autosave::new(ms(2000));
        assert!(!autosave.cancel());

        autosave.on_edit(t0);
        assert!(autosave.cancel());
        assert!(!autosave.poll(t0 + ms(5000)));
    }

    #[test]
    fn test_time_until_due() {
        let t0 = Instant::now();
        let mut autosave = Autosave::new(ms(2000));
        assert_eq!(autosave.time_until_due(t0), None);

        autosave.on_edit(t0);
        assert_eq!(autosave.time_until_due(t0 + ms(500)), Some(ms(1500)));
        assert_eq!(autosave.time_until_due(t0 + ms(2500)), Some(Duration::ZERO));
    }

    #[test]
    fn test_set_delay_applies_to_next_edit() {
        let t0 = Instant::now();
        let mut autosave = Autosave::new(ms(2000));
        autosave.set_delay(ms(500));
        autosave.on_edit(t0);
        assert!(autosave.poll(t0 + ms(500)));
    }
}
