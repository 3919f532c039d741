//! Horizontal approach shaping and kinematic integration

use glam::Vec2;

use super::geometry::{Category, Geometry};
use super::state::Body;
use crate::consts::{GRAVITY, INPUT_DEADZONE};
use crate::tuning::{BodyTuning, MovementTuning};
use crate::{move_towards, sign_or_positive};

/// Rate (units/s²) used to approach `target_vx` this tick.
///
/// Accelerating means a non-zero target that does not point against the
/// current velocity; everything else (stopping, turning) uses deceleration.
pub fn approach_rate(tuning: &MovementTuning, grounded: bool, current_vx: f32, target_vx: f32) -> f32 {
    let (accel, decel) = if grounded {
        (tuning.ground_acceleration, tuning.ground_deceleration)
    } else {
        (tuning.air_acceleration, tuning.air_deceleration)
    };

    let accelerating = target_vx.abs() > INPUT_DEADZONE;
    let turning = current_vx.abs() > INPUT_DEADZONE
        && sign_or_positive(target_vx) != sign_or_positive(current_vx);

    if accelerating && !turning { accel } else { decel }
}

/// New horizontal velocity after one tick of bounded approach
pub fn step_horizontal(
    tuning: &MovementTuning,
    grounded: bool,
    current_vx: f32,
    target_vx: f32,
    dt: f32,
) -> f32 {
    let rate = approach_rate(tuning, grounded, current_vx, target_vx);
    move_towards(current_vx, target_vx, rate * dt)
}

/// Apply gravity, move the body, and settle it on ground it fell onto.
///
/// Returns true if the body was snapped onto a surface this tick.
pub fn integrate<G: Geometry>(body: &mut Body, tuning: &BodyTuning, dt: f32, geometry: &G) -> bool {
    body.velocity.y -= GRAVITY * tuning.gravity_scale * dt;

    let old_feet_y = body.position.y - tuning.half_height;
    body.position += body.velocity * dt;

    if body.velocity.y > 0.0 {
        return false;
    }

    // Sweep the feet from last tick's height down to this tick's
    let new_feet_y = body.position.y - tuning.half_height;
    let origin = Vec2::new(body.position.x, old_feet_y);
    let travel = (old_feet_y - new_feet_y).max(0.0);

    match geometry.raycast(origin, Vec2::NEG_Y, travel, Category::Ground) {
        Some(hit) if hit.normal.y > 0.0 => {
            body.position.y = hit.point.y + tuning.half_height;
            body.velocity.y = 0.0;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::{Solid, StaticWorld};

    const DT: f32 = 1.0 / 120.0;

    #[test]
    fn test_four_rate_cases() {
        let t = MovementTuning {
            ground_acceleration: 1.0,
            ground_deceleration: 2.0,
            air_acceleration: 3.0,
            air_deceleration: 4.0,
        };
        // Speeding up from rest
        assert_eq!(approach_rate(&t, true, 0.0, 5.0), 1.0);
        assert_eq!(approach_rate(&t, false, 0.0, 5.0), 3.0);
        // Letting go of the stick
        assert_eq!(approach_rate(&t, true, 5.0, 0.0), 2.0);
        assert_eq!(approach_rate(&t, false, 5.0, 0.0), 4.0);
        // Turning around
        assert_eq!(approach_rate(&t, true, 5.0, -5.0), 2.0);
        assert_eq!(approach_rate(&t, false, -5.0, 5.0), 4.0);
        // Leftward from rest still accelerates
        assert_eq!(approach_rate(&t, true, 0.0, -5.0), 1.0);
    }

    #[test]
    fn test_step_is_bounded() {
        let t = MovementTuning::default();
        let vx = step_horizontal(&t, true, 0.0, 7.0, DT);
        assert!((vx - t.ground_acceleration * DT).abs() < 1e-5);
        // Close enough: snaps to target
        assert_eq!(step_horizontal(&t, true, 6.9, 7.0, DT), 7.0);
    }

    #[test]
    fn test_falling_body_lands_on_platform() {
        let world = StaticWorld::new().with(Solid::platform(0.0, 0.0, 10.0, 1.0));
        let tuning = BodyTuning::default();
        let mut body = Body {
            position: Vec2::new(0.0, 3.0),
            velocity: Vec2::ZERO,
        };

        let mut landed = false;
        for _ in 0..240 {
            landed |= integrate(&mut body, &tuning, DT, &world);
        }

        assert!(landed);
        assert!((body.position.y - tuning.half_height).abs() < 1e-4);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_rising_body_passes_through_platform() {
        let world = StaticWorld::new().with(Solid::platform(0.0, 1.0, 10.0, 0.2));
        let tuning = BodyTuning::default();
        let mut body = Body {
            position: Vec2::new(0.0, 0.0),
            velocity: Vec2::new(0.0, 20.0),
        };
        assert!(!integrate(&mut body, &tuning, 0.1, &world));
        assert!(body.position.y > 1.0);
    }
}
