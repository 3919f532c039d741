//! Fixed timestep simulation tick
//!
//! One call advances every component by one step, in a fixed order: pause
//! input, controller, hazard, survival rules, directives, invariant check,
//! then event delivery.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::controller::RespawnOutcome;
use super::events::{GameEvent, GameOverCause};
use super::geometry::{Category, Geometry};
use super::state::GameState;
use super::survival::{Directive, Observation};
use super::timer::TickClock;

/// Jump button state for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JumpSignal {
    #[default]
    Idle,
    /// Went down this tick
    Pressed,
    Held,
    /// Went up this tick
    Released,
}

impl JumpSignal {
    pub fn pressed(self) -> bool {
        self == JumpSignal::Pressed
    }

    pub fn released(self) -> bool {
        self == JumpSignal::Released
    }

    pub fn is_down(self) -> bool {
        matches!(self, JumpSignal::Pressed | JumpSignal::Held)
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Movement stick; only the normalized x component drives the body
    pub movement: Vec2,
    pub jump: JumpSignal,
    /// Switch character (one-shot)
    pub switch_character: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick<G: Geometry>(state: &mut GameState, world: &G, input: &TickInput, dt: f32) {
    state.frame_events.clear();
    // Nothing runs after the run has ended
    if state.survival.game_over().is_some() {
        return;
    }
    let mut events = std::mem::take(&mut state.frame_events);

    if input.pause {
        state.survival.toggle_pause(&mut events);
    }
    let clock = TickClock::new(dt, state.survival.is_paused());
    state.time_ticks += 1;

    if !state.survival.is_paused() {
        let fading = state.survival.is_fading();
        let view = state.hazard.view(world);
        state
            .controller
            .update(input, clock.scaled, &view, fading, &mut events);
        state
            .hazard
            .advance(clock.scaled, state.controller.position().y);
    }

    let view = state.hazard.view(world);
    let check_point = state.controller.ground_check_point();
    let radius = state.controller.ground_check_radius();
    let obs = Observation {
        player_height: state.controller.position().y,
        hazard_height: state.hazard.height(),
        hazard_contact: view.overlap_circle(check_point, radius, Category::Hazard),
        fade_contact: view.overlap_circle(check_point, radius, Category::FadeSensor),
    };

    let directives = state.survival.update(&obs, &clock, &mut events);
    apply_directives(state, &directives, &mut events);
    enforce_invariants(state, &mut events);

    // Only reachable on the tick the run ends
    if state.survival.game_over().is_some() {
        state.director.stop_music();
        state.director.load_game_over_scene();
    }

    state.bus.publish(&events);
    state.frame_events = events;
}

fn apply_directives(state: &mut GameState, directives: &[Directive], events: &mut Vec<GameEvent>) {
    for directive in directives {
        match directive {
            Directive::MarkActiveDead => {
                state.controller.mark_active_dead();
            }
            Directive::ReviveAll => state.controller.revive_all(),
            Directive::Respawn => {
                if state.controller.respawn(events) == RespawnOutcome::AllCharactersLost {
                    state
                        .survival
                        .trigger_game_over(GameOverCause::BothCharactersLost, events);
                    return;
                }
            }
        }
    }
}

/// Both characters dead with no fade left to resolve it ends the run
fn enforce_invariants(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let unresolved = state.controller.state().both_dead()
        && !state.survival.is_fading()
        && state.survival.game_over().is_none();

    if unresolved {
        log::error!("Both characters dead with no pending respawn; forcing game over");
        state
            .survival
            .trigger_game_over(GameOverCause::InvariantViolation, events);
    }
}
