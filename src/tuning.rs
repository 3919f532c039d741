//! Gameplay tuning
//!
//! Every knob the simulation reads lives here. Loaded from JSON on native
//! runners, otherwise the defaults below are used.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ensure_positive, ensure_range};
use crate::sim::state::Character;

/// Per-character movement stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    /// Top horizontal speed (units/s)
    pub speed: f32,
    /// Jumps available between landings
    pub max_jumps: u32,
}

/// The two playable characters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterRoster {
    pub a: CharacterProfile,
    pub b: CharacterProfile,
}

impl Default for CharacterRoster {
    fn default() -> Self {
        Self {
            // Heavier single jumper
            a: CharacterProfile {
                speed: 7.0,
                max_jumps: 1,
            },
            // Nimble double jumper
            b: CharacterProfile {
                speed: 8.5,
                max_jumps: 2,
            },
        }
    }
}

impl CharacterRoster {
    pub fn profile(&self, character: Character) -> CharacterProfile {
        match character {
            Character::A => self.a,
            Character::B => self.b,
        }
    }
}

/// Horizontal approach rates (units/s²)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    pub ground_acceleration: f32,
    /// Used when slowing down or turning on the ground
    pub ground_deceleration: f32,
    pub air_acceleration: f32,
    /// Used when slowing down or turning in the air
    pub air_deceleration: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            ground_acceleration: 60.0,
            ground_deceleration: 70.0,
            air_acceleration: 35.0,
            air_deceleration: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpTuning {
    /// Apex height of a full jump (units)
    pub height: f32,
    /// Seconds after leaving the ground during which a jump is still honored
    pub coyote_time: f32,
    /// Seconds a jump press is remembered before it can fire
    pub buffer_time: f32,
    /// Vertical velocity multiplier when jump is released early
    pub cut_multiplier: f32,
    /// Seconds after a switch during which jump rules are relaxed
    pub switch_grace_period: f32,
}

impl Default for JumpTuning {
    fn default() -> Self {
        Self {
            height: 3.0,
            coyote_time: 0.2,
            buffer_time: 0.2,
            cut_multiplier: 0.5,
            switch_grace_period: 1.0,
        }
    }
}

/// Shape of the controlled body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyTuning {
    /// Distance from the body center down to its feet
    pub half_height: f32,
    /// Ground-check point relative to the body center
    pub ground_check_offset: Vec2,
    pub ground_check_radius: f32,
    /// Multiplier on world gravity
    pub gravity_scale: f32,
}

impl Default for BodyTuning {
    fn default() -> Self {
        Self {
            half_height: 0.5,
            ground_check_offset: Vec2::new(0.0, -0.5),
            ground_check_radius: 0.6,
            gravity_scale: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchTuning {
    /// Seconds switch input stays locked after a forced switch
    pub lock_duration: f32,
}

impl Default for SwitchTuning {
    fn default() -> Self {
        Self { lock_duration: 3.0 }
    }
}

/// Respawn point validation probes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafeGroundTuning {
    /// Horizontal offset of the left/right probes from the body center
    pub probe_half_width: f32,
    /// How far below the ground-check height the probes reach
    pub probe_distance: f32,
    /// Steepest accepted surface, in degrees from vertical
    pub max_slope_degrees: f32,
}

impl Default for SafeGroundTuning {
    fn default() -> Self {
        Self {
            probe_half_width: 2.0,
            probe_distance: 1.0,
            max_slope_degrees: 45.0,
        }
    }
}

/// Shaping applied to the hazard's combined pressure before lerping the multiplier
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeedCurve {
    #[default]
    Linear,
    SmoothStep,
    /// t^power
    EaseIn { power: f32 },
}

impl SpeedCurve {
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = crate::clamp01(t);
        match self {
            SpeedCurve::Linear => t,
            SpeedCurve::SmoothStep => t * t * (3.0 - 2.0 * t),
            SpeedCurve::EaseIn { power } => t.powf(power.max(0.0)),
        }
    }
}

/// Soft-death trigger riding along with the hazard, as offsets from its surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeSensorShape {
    pub bottom_offset: f32,
    pub top_offset: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    /// Surface height at level start
    pub start_height: f32,
    /// Rise speed at multiplier 1.0 (units/s)
    pub base_speed: f32,
    /// How far the hazard body reaches below its surface
    pub thickness: f32,
    pub min_multiplier: f32,
    pub max_multiplier: f32,
    /// Player climb (units above the hazard start) that saturates height pressure
    pub height_ramp: f32,
    /// Seconds that saturate time pressure
    pub time_ramp: f32,
    pub curve: SpeedCurve,
    /// Exponential compression factor applied to combined pressure
    pub compression: f32,
    /// Max multiplier change per second, up or down
    pub max_multiplier_delta_per_second: f32,
    /// None disables the soft-death path
    pub fade_sensor: Option<FadeSensorShape>,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            start_height: -10.0,
            base_speed: 2.0,
            thickness: 4.0,
            min_multiplier: 0.8,
            max_multiplier: 3.0,
            height_ramp: 90.0,
            time_ramp: 40.0,
            curve: SpeedCurve::Linear,
            compression: 1.6,
            max_multiplier_delta_per_second: 0.12,
            fade_sensor: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DangerTuning {
    /// Height above the hazard at which danger reaches zero
    pub max_danger_distance: f32,
    /// Seconds the player may stay below the hazard before the run ends
    pub death_check_duration: f32,
    /// Seconds between touching the fade sensor and the respawn
    pub fade_delay: f32,
    /// Seconds after the fade respawn before the fade flag clears
    pub fade_recovery: f32,
}

impl Default for DangerTuning {
    fn default() -> Self {
        Self {
            max_danger_distance: 50.0,
            death_check_duration: 5.0,
            fade_delay: 1.0,
            fade_recovery: 1.0,
        }
    }
}

impl DangerTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("danger.max_danger_distance", self.max_danger_distance)?;
        ensure_range(
            "danger.death_check_duration",
            self.death_check_duration,
            0.0,
            f32::MAX,
        )?;
        ensure_range("danger.fade_delay", self.fade_delay, 0.0, f32::MAX)?;
        ensure_range("danger.fade_recovery", self.fade_recovery, 0.0, f32::MAX)?;
        Ok(())
    }
}

/// Complete gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub characters: CharacterRoster,
    pub movement: MovementTuning,
    pub jump: JumpTuning,
    pub body: BodyTuning,
    pub switching: SwitchTuning,
    pub safe_ground: SafeGroundTuning,
    pub hazard: HazardTuning,
    pub danger: DangerTuning,
    /// Where the body starts; also the respawn target until safe ground is found
    pub spawn_point: Vec2,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            characters: CharacterRoster::default(),
            movement: MovementTuning::default(),
            jump: JumpTuning::default(),
            body: BodyTuning::default(),
            switching: SwitchTuning::default(),
            safe_ground: SafeGroundTuning::default(),
            hazard: HazardTuning::default(),
            danger: DangerTuning::default(),
            spawn_point: Vec2::new(0.0, 0.5),
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read and parse a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load a tuning file, falling back to defaults when it is unusable
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::warn!("Using default tuning: {err}");
                Self::default()
            }
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the sections the controller and hazard cannot run without.
    ///
    /// The danger section is validated separately: a bad value there only
    /// disables the danger meter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, profile) in [
            ("characters.a", self.characters.a),
            ("characters.b", self.characters.b),
        ] {
            ensure_positive(name, profile.speed)?;
            if profile.max_jumps == 0 {
                return Err(ConfigError::OutOfRange {
                    field: name,
                    value: 0.0,
                    min: 1.0,
                    max: f32::MAX,
                });
            }
        }

        let m = &self.movement;
        ensure_positive("movement.ground_acceleration", m.ground_acceleration)?;
        ensure_positive("movement.ground_deceleration", m.ground_deceleration)?;
        ensure_positive("movement.air_acceleration", m.air_acceleration)?;
        ensure_positive("movement.air_deceleration", m.air_deceleration)?;

        let j = &self.jump;
        ensure_positive("jump.height", j.height)?;
        ensure_range("jump.coyote_time", j.coyote_time, 0.0, f32::MAX)?;
        ensure_range("jump.buffer_time", j.buffer_time, 0.0, f32::MAX)?;
        ensure_range("jump.cut_multiplier", j.cut_multiplier, 0.0, 1.0)?;
        ensure_range(
            "jump.switch_grace_period",
            j.switch_grace_period,
            0.0,
            f32::MAX,
        )?;

        let b = &self.body;
        ensure_positive("body.half_height", b.half_height)?;
        ensure_positive("body.ground_check_radius", b.ground_check_radius)?;
        ensure_positive("body.gravity_scale", b.gravity_scale)?;

        ensure_range(
            "switching.lock_duration",
            self.switching.lock_duration,
            0.0,
            f32::MAX,
        )?;

        let s = &self.safe_ground;
        ensure_range(
            "safe_ground.probe_half_width",
            s.probe_half_width,
            0.0,
            f32::MAX,
        )?;
        ensure_positive("safe_ground.probe_distance", s.probe_distance)?;
        ensure_range(
            "safe_ground.max_slope_degrees",
            s.max_slope_degrees,
            0.0,
            90.0,
        )?;

        let h = &self.hazard;
        ensure_range("hazard.base_speed", h.base_speed, 0.0, f32::MAX)?;
        ensure_positive("hazard.thickness", h.thickness)?;
        ensure_range("hazard.min_multiplier", h.min_multiplier, 0.0, f32::MAX)?;
        ensure_range(
            "hazard.max_multiplier",
            h.max_multiplier,
            h.min_multiplier,
            f32::MAX,
        )?;
        ensure_positive("hazard.height_ramp", h.height_ramp)?;
        ensure_positive("hazard.time_ramp", h.time_ramp)?;
        ensure_positive(
            "hazard.max_multiplier_delta_per_second",
            h.max_multiplier_delta_per_second,
        )?;
        ensure_positive("hazard.compression", h.compression)?;
        if let Some(sensor) = h.fade_sensor {
            ensure_range(
                "hazard.fade_sensor",
                sensor.bottom_offset,
                f32::MIN,
                sensor.top_offset,
            )?;
        }

        Ok(())
    }
}
