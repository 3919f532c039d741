//! Jump bookkeeping
//!
//! There is no explicit "jump state" enum. Whether a jump may fire is derived
//! every tick from three counters: jumps used since landing, the coyote timer
//! and the jump buffer.

use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY;
use crate::tuning::JumpTuning;

/// Launch speed that reaches `height` under the body's scaled gravity
#[inline]
pub fn jump_velocity(height: f32, gravity_scale: f32) -> f32 {
    (2.0 * height * GRAVITY.abs() * gravity_scale).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JumpState {
    pub jumps_used: u32,
    /// Seconds left in the coyote window (held full while grounded)
    pub coyote_timer: f32,
    /// Seconds left on a remembered jump press
    pub buffer_timer: f32,
}

impl JumpState {
    /// Grounding bookkeeping for this tick. `landed` is the false→true edge.
    pub fn track_ground(&mut self, grounded: bool, landed: bool, tuning: &JumpTuning, dt: f32) {
        if landed {
            self.jumps_used = 0;
        }

        if grounded {
            self.coyote_timer = tuning.coyote_time;
        } else {
            self.coyote_timer = (self.coyote_timer - dt).max(0.0);
        }
    }

    pub fn track_press(&mut self, pressed: bool, tuning: &JumpTuning, dt: f32) {
        if pressed {
            self.buffer_timer = tuning.buffer_time;
        } else {
            self.buffer_timer = (self.buffer_timer - dt).max(0.0);
        }
    }

    /// Walking off a ledge without jumping spends the first jump once coyote
    /// time runs out. Multi-jump characters keep the rest; single-jump
    /// characters have none left.
    pub fn consume_stale_first_jump(&mut self, grounded: bool) {
        if !grounded && self.coyote_timer <= 0.0 && self.jumps_used == 0 {
            self.jumps_used = 1;
        }
    }

    /// A buffered press fires when a jump remains and the body is grounded,
    /// inside coyote time, already mid-sequence, or in the post-switch grace
    /// window. The jump count cap always applies.
    pub fn can_jump(&self, max_jumps: u32, grounded: bool, in_grace: bool) -> bool {
        self.buffer_timer > 0.0
            && self.jumps_used < max_jumps
            && (grounded || self.coyote_timer > 0.0 || in_grace || self.jumps_used > 0)
    }

    pub fn record_jump(&mut self) {
        self.buffer_timer = 0.0;
        self.coyote_timer = 0.0;
        self.jumps_used += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 120.0;

    #[test]
    fn test_jump_velocity_reaches_height() {
        // v² = 2gh  =>  h = v² / 2g
        let v = jump_velocity(3.0, 4.0);
        let apex = v * v / (2.0 * GRAVITY * 4.0);
        assert!((apex - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_landing_resets_and_coyote_decays() {
        let tuning = JumpTuning::default();
        let mut jump = JumpState {
            jumps_used: 2,
            ..Default::default()
        };
        jump.track_ground(true, true, &tuning, DT);
        assert_eq!(jump.jumps_used, 0);
        assert_eq!(jump.coyote_timer, tuning.coyote_time);

        jump.track_ground(false, false, &tuning, 0.05);
        assert!((jump.coyote_timer - (tuning.coyote_time - 0.05)).abs() < 1e-6);
        jump.track_ground(false, false, &tuning, 1.0);
        assert_eq!(jump.coyote_timer, 0.0);
    }

    #[test]
    fn test_stale_first_jump_is_consumed_only_when_airborne() {
        let mut jump = JumpState::default();
        jump.consume_stale_first_jump(true);
        assert_eq!(jump.jumps_used, 0);
        jump.consume_stale_first_jump(false);
        assert_eq!(jump.jumps_used, 1);
        // Already mid-sequence: untouched
        jump.consume_stale_first_jump(false);
        assert_eq!(jump.jumps_used, 1);
    }

    #[test]
    fn test_cap_holds_even_in_grace() {
        let jump = JumpState {
            jumps_used: 1,
            coyote_timer: 0.0,
            buffer_timer: 0.1,
        };
        assert!(!jump.can_jump(1, false, true));
        assert!(jump.can_jump(2, false, false));
    }

    #[test]
    fn test_grace_relaxes_airborne_eligibility() {
        let jump = JumpState {
            jumps_used: 0,
            coyote_timer: 0.0,
            buffer_timer: 0.1,
        };
        assert!(!jump.can_jump(1, false, false));
        assert!(jump.can_jump(1, false, true));
    }

    /// Timings with exact binary steps so the edge tick is unambiguous
    fn exact_tuning() -> JumpTuning {
        JumpTuning {
            coyote_time: 0.25,
            buffer_time: 0.25,
            ..Default::default()
        }
    }

    #[test]
    fn test_coyote_window_closes_exactly_at_coyote_time() {
        let tuning = exact_tuning();
        let step = 0.0625;
        let mut jump = JumpState {
            buffer_timer: 0.1,
            ..Default::default()
        };
        jump.track_ground(true, true, &tuning, step);

        for _ in 0..3 {
            jump.track_ground(false, false, &tuning, step);
        }
        jump.consume_stale_first_jump(false);
        assert_eq!(jump.coyote_timer, 0.0625);
        assert!(jump.can_jump(1, false, false));

        // A full coyote_time airborne: the window is already shut
        jump.track_ground(false, false, &tuning, step);
        jump.consume_stale_first_jump(false);
        assert_eq!(jump.coyote_timer, 0.0);
        assert_eq!(jump.jumps_used, 1);
        assert!(!jump.can_jump(1, false, false));
    }

    #[test]
    fn test_buffer_expires_exactly_at_buffer_time() {
        let tuning = exact_tuning();
        let step = 0.0625;
        let mut jump = JumpState::default();
        jump.track_press(true, &tuning, step);
        assert_eq!(jump.buffer_timer, 0.25);

        for _ in 0..3 {
            jump.track_press(false, &tuning, step);
        }
        assert!(jump.can_jump(1, true, false));

        jump.track_press(false, &tuning, step);
        assert_eq!(jump.buffer_timer, 0.0);
        assert!(!jump.can_jump(1, true, false));
    }

    #[test]
    fn test_no_jump_without_buffered_press() {
        let jump = JumpState::default();
        assert!(!jump.can_jump(2, true, true));
    }
}
