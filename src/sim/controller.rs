//! Character controller
//!
//! Owns the body, the active character and every per-character timer. Other
//! components read it through accessors and act on it only through the
//! public operations below (switch, forced switch, respawn, alive flags).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::geometry::{Category, Geometry};
use super::jump::{JumpState, jump_velocity};
use super::movement;
use super::safe_ground;
use super::state::{Body, Character};
use super::tick::TickInput;
use super::timer::{Countdown, TickClock, TimeDomain, advance_slot};
use crate::consts::MOVING_THRESHOLD;
use crate::error::ConfigError;
use crate::tuning::{
    BodyTuning, CharacterProfile, CharacterRoster, JumpTuning, MovementTuning, SafeGroundTuning,
    SwitchTuning, Tuning,
};

/// Everything the controller mutates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    pub body: Body,
    pub active: Character,
    pub alive_a: bool,
    pub alive_b: bool,
    /// Stats of the active character
    pub stats: CharacterProfile,
    pub jump: JumpState,
    /// Post-switch grace window
    pub grace: Option<Countdown>,
    /// Running while switch input is locked
    pub switch_lock: Option<Countdown>,
    pub grounded: bool,
    pub was_grounded: bool,
    /// Horizontal motion above the sprint threshold
    pub moving: bool,
    pub last_safe_ground: Vec2,
    /// False until a probe-validated point replaces the spawn fallback
    pub safe_ground_recorded: bool,
}

impl ControllerState {
    pub fn is_alive(&self, character: Character) -> bool {
        match character {
            Character::A => self.alive_a,
            Character::B => self.alive_b,
        }
    }

    pub fn both_dead(&self) -> bool {
        !self.alive_a && !self.alive_b
    }

    pub fn is_switch_locked(&self) -> bool {
        self.switch_lock.is_some()
    }

    pub fn in_grace_period(&self) -> bool {
        self.grace.is_some()
    }
}

/// What a respawn resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RespawnOutcome {
    Respawned { active: Character },
    /// Both characters were dead; the run must end
    AllCharactersLost,
}

#[derive(Debug, Clone)]
pub struct Controller {
    roster: CharacterRoster,
    movement: MovementTuning,
    jump: JumpTuning,
    body: BodyTuning,
    switching: SwitchTuning,
    safe_ground: SafeGroundTuning,
    state: ControllerState,
}

impl Controller {
    /// Build a controller at the tuning's spawn point, character A active
    pub fn new(tuning: &Tuning) -> Result<Self, ConfigError> {
        tuning.validate()?;

        let active = Character::A;
        let state = ControllerState {
            body: Body {
                position: tuning.spawn_point,
                velocity: Vec2::ZERO,
            },
            active,
            alive_a: true,
            alive_b: true,
            stats: tuning.characters.profile(active),
            jump: JumpState::default(),
            grace: None,
            switch_lock: None,
            grounded: false,
            was_grounded: false,
            moving: false,
            last_safe_ground: tuning.spawn_point,
            safe_ground_recorded: false,
        };

        Ok(Self {
            roster: tuning.characters,
            movement: tuning.movement,
            jump: tuning.jump,
            body: tuning.body,
            switching: tuning.switching,
            safe_ground: tuning.safe_ground,
            state,
        })
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn position(&self) -> Vec2 {
        self.state.body.position
    }

    pub fn active(&self) -> Character {
        self.state.active
    }

    pub fn ground_check_point(&self) -> Vec2 {
        self.state.body.position + self.body.ground_check_offset
    }

    pub fn ground_check_radius(&self) -> f32 {
        self.body.ground_check_radius
    }

    /// Place the body (level start, checkpoints) and stop it
    pub fn teleport(&mut self, position: Vec2) {
        self.state.body.position = position;
        self.state.body.velocity = Vec2::ZERO;
    }

    /// One simulation step. `dt` is scaled time; the caller skips this while paused.
    pub fn update<G: Geometry>(
        &mut self,
        input: &TickInput,
        dt: f32,
        geometry: &G,
        fading: bool,
        events: &mut Vec<GameEvent>,
    ) {
        let clock = TickClock::new(dt, false);
        if advance_slot(&mut self.state.switch_lock, &clock) {
            log::debug!("Switching unlocked");
        }
        if advance_slot(&mut self.state.grace, &clock) {
            log::debug!("Switch grace period ended");
        }

        if input.switch_character {
            self.request_switch(events);
        }
        let in_grace = self.state.in_grace_period();

        let was_grounded = self.state.grounded;
        let grounded = geometry.overlap_circle(
            self.ground_check_point(),
            self.body.ground_check_radius,
            Category::Ground,
        );
        self.state.grounded = grounded;
        self.state.was_grounded = was_grounded;

        if grounded && !fading {
            self.record_safe_ground(geometry);
        }

        let landed = grounded && !was_grounded;
        self.state.jump.track_ground(grounded, landed, &self.jump, dt);
        self.state.jump.track_press(input.jump.pressed(), &self.jump, dt);
        self.state.jump.consume_stale_first_jump(grounded);

        self.move_horizontal(input.movement, grounded, dt, events);

        if self
            .state
            .jump
            .can_jump(self.state.stats.max_jumps, grounded, in_grace)
        {
            let second_airborne_jump = !grounded
                && !was_grounded
                && self.state.jump.jumps_used == 1
                && self.state.stats.max_jumps > 1;
            if second_airborne_jump {
                events.push(GameEvent::SecondJump {
                    character: self.state.active,
                });
            }
            self.perform_jump(events);
        }

        if input.jump.released() && self.state.body.velocity.y > 0.0 {
            if in_grace {
                log::debug!("Jump cut skipped during switch grace");
            } else {
                self.state.body.velocity.y *= self.jump.cut_multiplier;
            }
        }

        movement::integrate(&mut self.state.body, &self.body, dt, geometry);
    }

    /// Player-initiated switch. Ignored entirely while the lock runs.
    pub fn request_switch(&mut self, events: &mut Vec<GameEvent>) {
        if self.state.is_switch_locked() {
            log::debug!("Switch input ignored - lock active");
            return;
        }

        self.state.active = self.state.active.other();
        self.apply_profile(false, events);
        events.push(GameEvent::SwitchEffect {
            to: self.state.active,
        });
        self.state.grace = Some(Countdown::new(
            self.jump.switch_grace_period,
            TimeDomain::Scaled,
        ));
        log::debug!("Switched to {:?}, grace period started", self.state.active);
    }

    /// Switch imposed by the survival rules. Moves to the other character only
    /// if it is alive, but always re-applies stats and (re)starts the lock.
    pub fn force_switch(&mut self, events: &mut Vec<GameEvent>) {
        let other = self.state.active.other();
        if self.state.is_alive(other) {
            self.state.active = other;
        }
        self.apply_profile(true, events);

        self.state.switch_lock = Some(Countdown::new(
            self.switching.lock_duration,
            TimeDomain::Scaled,
        ));
        log::debug!(
            "Forced switch: {:?} active, switching locked for {}s",
            self.state.active,
            self.switching.lock_duration
        );
    }

    /// Return to the last safe ground as the other character
    pub fn respawn(&mut self, events: &mut Vec<GameEvent>) -> RespawnOutcome {
        if !self.state.safe_ground_recorded {
            log::warn!("Respawning before any safe ground was recorded; using spawn point");
        }
        let target = self.state.last_safe_ground;
        self.teleport(target);

        self.force_switch(events);
        events.push(GameEvent::RespawnFlicker);

        if self.state.both_dead() {
            events.push(GameEvent::PlayerDied);
            log::info!("Both characters lost");
            RespawnOutcome::AllCharactersLost
        } else {
            RespawnOutcome::Respawned {
                active: self.state.active,
            }
        }
    }

    pub fn set_alive(&mut self, character: Character, alive: bool) {
        match character {
            Character::A => self.state.alive_a = alive,
            Character::B => self.state.alive_b = alive,
        }
    }

    /// Returns the character that was marked
    pub fn mark_active_dead(&mut self) -> Character {
        let active = self.state.active;
        self.set_alive(active, false);
        log::debug!("{active:?} caught by the hazard");
        active
    }

    pub fn revive_all(&mut self) {
        self.state.alive_a = true;
        self.state.alive_b = true;
        log::debug!("Revive window ended - both characters restored");
    }

    fn apply_profile(&mut self, forced: bool, events: &mut Vec<GameEvent>) {
        self.state.stats = self.roster.profile(self.state.active);
        events.push(GameEvent::CharacterChanged {
            active: self.state.active,
            forced,
        });
    }

    fn move_horizontal(
        &mut self,
        movement_input: Vec2,
        grounded: bool,
        dt: f32,
        events: &mut Vec<GameEvent>,
    ) {
        let target_vx = movement_input.normalize_or_zero().x * self.state.stats.speed;
        let body = &mut self.state.body;
        body.velocity.x =
            movement::step_horizontal(&self.movement, grounded, body.velocity.x, target_vx, dt);

        let moving = body.velocity.x.abs() > MOVING_THRESHOLD;
        if moving != self.state.moving {
            self.state.moving = moving;
            events.push(GameEvent::SprintChanged { moving });
        }
    }

    fn perform_jump(&mut self, events: &mut Vec<GameEvent>) {
        self.state.body.velocity.y = jump_velocity(self.jump.height, self.body.gravity_scale);
        self.state.jump.record_jump();
        events.push(GameEvent::CharacterJumped {
            character: self.state.active,
        });
        log::debug!(
            "{:?} jumped ({}/{})",
            self.state.active,
            self.state.jump.jumps_used,
            self.state.stats.max_jumps
        );
    }

    fn record_safe_ground<G: Geometry>(&mut self, geometry: &G) {
        let position = self.state.body.position;
        let check_y = self.ground_check_point().y;
        if let Some(point) = safe_ground::validate(geometry, position, check_y, &self.safe_ground) {
            self.state.last_safe_ground = point;
            self.state.safe_ground_recorded = true;
        }
    }
}
