//! Countdown timers advanced by the fixed tick
//!
//! Each timed window (coyote, buffer, grace, switch lock, revive, below-hazard,
//! fade stages) is a plain value with a remaining duration. A timer slot is an
//! `Option<Countdown>`: starting replaces whatever was running, cancelling is
//! setting it to `None`.

use serde::{Deserialize, Serialize};

/// Which clock a timer consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeDomain {
    /// Frozen while paused
    Scaled,
    /// Keeps running while paused
    Unscaled,
}

/// Elapsed time for one tick, in both domains
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickClock {
    pub scaled: f32,
    pub unscaled: f32,
}

impl TickClock {
    pub fn new(dt: f32, paused: bool) -> Self {
        Self {
            scaled: if paused { 0.0 } else { dt },
            unscaled: dt,
        }
    }

    pub fn delta(&self, domain: TimeDomain) -> f32 {
        match domain {
            TimeDomain::Scaled => self.scaled,
            TimeDomain::Unscaled => self.unscaled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    pub remaining: f32,
    pub duration: f32,
    pub domain: TimeDomain,
}

impl Countdown {
    pub fn new(duration: f32, domain: TimeDomain) -> Self {
        Self {
            remaining: duration.max(0.0),
            duration: duration.max(0.0),
            domain,
        }
    }

    /// Consume this tick's time. Returns true once the countdown has run out.
    pub fn advance(&mut self, clock: &TickClock) -> bool {
        self.remaining = (self.remaining - clock.delta(self.domain)).max(0.0);
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn elapsed(&self) -> f32 {
        self.duration - self.remaining
    }
}

/// Advance a timer slot; clears it and returns true on the tick it expires
pub fn advance_slot(slot: &mut Option<Countdown>, clock: &TickClock) -> bool {
    let expired = slot.as_mut().is_some_and(|countdown| countdown.advance(clock));
    if expired {
        *slot = None;
    }
    expired
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_countdown_freezes_while_paused() {
        let mut timer = Countdown::new(1.0, TimeDomain::Scaled);
        assert!(!timer.advance(&TickClock::new(0.5, true)));
        assert_eq!(timer.remaining, 1.0);
        assert!(!timer.advance(&TickClock::new(0.5, false)));
        assert!(timer.advance(&TickClock::new(0.5, false)));
    }

    #[test]
    fn test_unscaled_countdown_runs_while_paused() {
        let mut timer = Countdown::new(1.0, TimeDomain::Unscaled);
        assert!(!timer.advance(&TickClock::new(0.6, true)));
        assert!((timer.elapsed() - 0.6).abs() < 1e-6);
        assert!(timer.advance(&TickClock::new(0.6, true)));
        assert_eq!(timer.remaining, 0.0);
    }

    #[test]
    fn test_slot_clears_on_expiry_and_restart_replaces() {
        let clock = TickClock::new(0.25, false);
        let mut slot = Some(Countdown::new(0.5, TimeDomain::Scaled));
        assert!(!advance_slot(&mut slot, &clock));
        // Restart replaces the running instance
        slot = Some(Countdown::new(0.5, TimeDomain::Scaled));
        assert!(!advance_slot(&mut slot, &clock));
        assert!(advance_slot(&mut slot, &clock));
        assert!(slot.is_none());
        assert!(!advance_slot(&mut slot, &clock));
    }

    #[test]
    fn test_slot_keeps_running_countdown() {
        let mut slot = Some(Countdown::new(1.0, TimeDomain::Unscaled));
        assert!(!advance_slot(&mut slot, &TickClock::new(0.25, true)));
        let remaining = slot.map(|c| c.remaining);
        assert_eq!(remaining, Some(0.75));
    }
}
