//! Danger and survival rules
//!
//! The coordinator watches the player against the hazard and decides when a
//! character is lost, when the run ends and whether pause is allowed. It
//! never touches the controller: it returns `Directive`s that the simulation
//! context applies.

use serde::{Deserialize, Serialize};

use super::events::{GameEvent, GameOverCause};
use super::timer::{Countdown, TickClock, TimeDomain, advance_slot};
use crate::clamp01;
use crate::error::ConfigError;
use crate::tuning::DangerTuning;

/// Normalized danger for a player `height_delta` units above the hazard.
///
/// 0 at `max_distance` and beyond, 1 at or below the surface.
pub fn danger(height_delta: f32, max_distance: f32) -> f32 {
    clamp01(1.0 - height_delta / max_distance)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeStage {
    /// Screen going dark; respawn happens when it ends
    Darkening,
    /// Screen coming back; fading clears when it ends
    Recovering,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeSequence {
    pub stage: FadeStage,
    pub timer: Countdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DangerState {
    /// Normalized danger in [0, 1]
    pub danger: f32,
    pub below_hazard: bool,
    /// Running while the player stays below the hazard surface
    pub below_timer: Option<Countdown>,
    /// Restores both characters when it runs out
    pub revive_timer: Option<Countdown>,
    pub fade: Option<FadeSequence>,
    pub paused: bool,
    pub game_over: Option<GameOverCause>,
}

/// What the coordinator sees of the world this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub player_height: f32,
    pub hazard_height: f32,
    pub hazard_contact: bool,
    pub fade_contact: bool,
}

/// Requests for the controller, applied in order by the simulation context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    MarkActiveDead,
    ReviveAll,
    Respawn,
}

#[derive(Debug, Clone)]
pub struct SurvivalCoordinator {
    tuning: DangerTuning,
    revive_delay: f32,
    meter_enabled: bool,
    fade_enabled: bool,
    state: DangerState,
}

impl SurvivalCoordinator {
    /// `revive_delay` is the switch-lock duration. Invalid danger tuning
    /// disables the meter only; the survival timers fall back to defaults.
    pub fn new(tuning: &DangerTuning, revive_delay: f32, fade_enabled: bool) -> Self {
        let (tuning, meter_enabled) = match tuning.validate() {
            Ok(()) => (*tuning, true),
            Err(err) => {
                log::warn!("Danger meter disabled: {err}");
                (DangerTuning::default(), false)
            }
        };
        if !fade_enabled {
            let err = ConfigError::MissingComponent {
                component: "hazard.fade_sensor",
            };
            log::info!("Soft-death path disabled: {err}");
        }

        Self {
            tuning,
            revive_delay,
            meter_enabled,
            fade_enabled,
            state: DangerState {
                danger: 0.0,
                below_hazard: false,
                below_timer: None,
                revive_timer: None,
                fade: None,
                paused: false,
                game_over: None,
            },
        }
    }

    pub fn state(&self) -> &DangerState {
        &self.state
    }

    pub fn danger_level(&self) -> f32 {
        self.state.danger
    }

    pub fn meter_enabled(&self) -> bool {
        self.meter_enabled
    }

    pub fn is_fading(&self) -> bool {
        self.state.fade.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn game_over(&self) -> Option<GameOverCause> {
        self.state.game_over
    }

    /// Pause input. Ignored during a fade or after game over.
    pub fn toggle_pause(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if self.is_fading() || self.state.game_over.is_some() {
            log::debug!("Pause ignored");
            return false;
        }

        self.state.paused = !self.state.paused;
        if self.state.paused {
            events.push(GameEvent::Paused);
            log::info!("Game paused");
        } else {
            events.push(GameEvent::Unpaused);
            log::info!("Game resumed");
        }
        true
    }

    /// Resume from a menu; no-op unless paused
    pub fn resume(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if !self.state.paused {
            return false;
        }
        self.state.paused = false;
        events.push(GameEvent::Unpaused);
        log::info!("Game resumed");
        true
    }

    /// Latch the terminal state. Returns true only the first time.
    pub fn trigger_game_over(&mut self, cause: GameOverCause, events: &mut Vec<GameEvent>) -> bool {
        if self.state.game_over.is_some() {
            return false;
        }
        self.state.game_over = Some(cause);
        self.state.below_timer = None;
        self.state.revive_timer = None;
        self.state.fade = None;
        events.push(GameEvent::GameOver { cause });
        log::info!("Game over: {cause:?}");
        true
    }

    pub fn update(
        &mut self,
        obs: &Observation,
        clock: &TickClock,
        events: &mut Vec<GameEvent>,
    ) -> Vec<Directive> {
        let mut directives = Vec::new();
        if self.state.game_over.is_some() {
            return directives;
        }

        if self.meter_enabled {
            self.state.danger = danger(
                obs.player_height - obs.hazard_height,
                self.tuning.max_danger_distance,
            );
        }

        self.advance_fade(clock, &mut directives);

        if advance_slot(&mut self.state.revive_timer, clock) {
            directives.push(Directive::ReviveAll);
        }

        if self.track_below_hazard(obs, clock) {
            self.trigger_game_over(GameOverCause::StalledBelowHazard, events);
            return directives;
        }

        if self.state.paused {
            return directives;
        }

        // Fade sensor first: a fade that starts this tick owns the respawn
        if obs.fade_contact && self.fade_enabled && !self.is_fading() {
            self.state.fade = Some(FadeSequence {
                stage: FadeStage::Darkening,
                timer: Countdown::new(self.tuning.fade_delay, TimeDomain::Unscaled),
            });
            events.push(GameEvent::CollidedWithFadeSensor);
            log::debug!("Fade sensor touched, fade sequence started");
        }

        // A running fade owns the outcome; contact is ignored until it ends
        if obs.hazard_contact && !self.is_fading() {
            directives.push(Directive::MarkActiveDead);
            directives.push(Directive::Respawn);
            self.state.revive_timer = Some(Countdown::new(self.revive_delay, TimeDomain::Scaled));
        }

        directives
    }

    /// Returns true when the countdown ran out this tick
    fn track_below_hazard(&mut self, obs: &Observation, clock: &TickClock) -> bool {
        let below = obs.player_height < obs.hazard_height;
        let was_below = std::mem::replace(&mut self.state.below_hazard, below);

        match (was_below, below) {
            (false, true) => {
                self.state.below_timer = Some(Countdown::new(
                    self.tuning.death_check_duration,
                    TimeDomain::Unscaled,
                ));
                log::debug!("Player below the hazard, countdown started");
                false
            }
            (true, false) => {
                self.state.below_timer = None;
                log::debug!("Player back above the hazard");
                false
            }
            (true, true) => advance_slot(&mut self.state.below_timer, clock),
            (false, false) => false,
        }
    }

    fn advance_fade(&mut self, clock: &TickClock, directives: &mut Vec<Directive>) {
        let Some(fade) = self.state.fade.as_mut() else {
            return;
        };
        if !fade.timer.advance(clock) {
            return;
        }

        match fade.stage {
            FadeStage::Darkening => {
                directives.push(Directive::Respawn);
                fade.stage = FadeStage::Recovering;
                fade.timer = Countdown::new(self.tuning.fade_recovery, TimeDomain::Unscaled);
                log::debug!("Fade darkened, respawning");
            }
            FadeStage::Recovering => {
                self.state.fade = None;
                log::debug!("Fade sequence finished");
            }
        }
    }
}
