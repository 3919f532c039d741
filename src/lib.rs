//! Twin Ascent - gameplay core of a two-character vertical platformer
//!
//! Core modules:
//! - `sim`: Fixed-tick simulation (character controller, rising hazard, survival rules)
//! - `tuning`: Data-driven movement, jump and hazard balance
//! - `error`: Configuration errors
//! - `logging`: Logger bootstrap for native runners

pub mod error;
pub mod logging;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Magnitude of world gravity (units/s², before the body's gravity scale)
    pub const GRAVITY: f32 = 9.81;

    /// Inputs with a smaller magnitude count as "no input"
    pub const INPUT_DEADZONE: f32 = 0.01;
    /// Horizontal speed above which the body counts as moving (sprint state)
    pub const MOVING_THRESHOLD: f32 = 0.1;
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Clamp to [0, 1]
#[inline]
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Linear interpolation with `t` clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * clamp01(t)
}

/// Unsigned angle in degrees between a surface normal and world up
#[inline]
pub fn angle_from_up_degrees(normal: Vec2) -> f32 {
    let n = normal.normalize_or_zero();
    if n == Vec2::ZERO {
        return 180.0;
    }
    n.dot(Vec2::Y).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Sign with zero treated as positive (a stopped body "faces" right)
#[inline]
pub fn sign_or_positive(value: f32) -> f32 {
    if value < 0.0 { -1.0 } else { 1.0 }
}
