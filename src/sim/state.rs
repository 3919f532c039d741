//! Simulation context and core types
//!
//! `GameState` owns one instance of every component and wires them together.
//! Nothing is reachable through globals; callers hold the context and pass
//! it to `tick`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::controller::{Controller, ControllerState};
use super::events::{EventBus, EventKind, GameEvent, ListenerId, NullDirector, SceneDirector};
use super::hazard::{Hazard, HazardState};
use super::survival::{DangerState, SurvivalCoordinator};
use crate::error::ConfigError;
use crate::tuning::Tuning;

/// The two playable characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Character {
    A,
    B,
}

impl Character {
    pub fn other(self) -> Self {
        match self {
            Character::A => Character::B,
            Character::B => Character::A,
        }
    }
}

/// The controlled body. It never rotates, so there is no angular state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Simulation time frozen; unscaled timers still run
    Paused,
    /// Run ended
    GameOver,
}

/// Serializable view of the whole simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub controller: ControllerState,
    pub hazard: HazardState,
    pub danger: DangerState,
}

pub struct GameState {
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) controller: Controller,
    pub(crate) hazard: Hazard,
    pub(crate) survival: SurvivalCoordinator,
    pub(crate) bus: EventBus,
    pub(crate) director: Box<dyn SceneDirector>,
    /// Events raised by the most recent tick
    pub(crate) frame_events: Vec<GameEvent>,
}

impl std::fmt::Debug for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("time_ticks", &self.time_ticks)
            .field("phase", &self.phase())
            .field("controller", &self.controller)
            .field("hazard", &self.hazard)
            .field("survival", &self.survival)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl GameState {
    /// Build a fresh run. Fails only if the controller tuning is unusable.
    pub fn new(tuning: &Tuning) -> Result<Self, ConfigError> {
        let controller = Controller::new(tuning)?;
        let hazard = Hazard::new(&tuning.hazard);
        let survival = SurvivalCoordinator::new(
            &tuning.danger,
            tuning.switching.lock_duration,
            hazard.has_fade_sensor(),
        );

        log::info!(
            "New run: spawn at ({:.1}, {:.1}), hazard at {:.1}",
            tuning.spawn_point.x,
            tuning.spawn_point.y,
            hazard.height()
        );

        Ok(Self {
            time_ticks: 0,
            controller,
            hazard,
            survival,
            bus: EventBus::new(),
            director: Box::new(NullDirector),
            frame_events: Vec::new(),
        })
    }

    /// Attach the scene/audio collaborator notified on game over
    pub fn with_director(mut self, director: impl SceneDirector + 'static) -> Self {
        self.director = Box::new(director);
        self
    }

    pub fn phase(&self) -> GamePhase {
        if self.survival.game_over().is_some() {
            GamePhase::GameOver
        } else if self.survival.is_paused() {
            GamePhase::Paused
        } else {
            GamePhase::Playing
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn hazard(&self) -> &Hazard {
        &self.hazard
    }

    pub fn survival(&self) -> &SurvivalCoordinator {
        &self.survival
    }

    /// Events raised by the last tick, in the order they were raised
    pub fn events(&self) -> &[GameEvent] {
        &self.frame_events
    }

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&GameEvent) + 'static,
    ) -> ListenerId {
        self.bus.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Resume from a pause menu. Listeners hear `Unpaused` immediately.
    pub fn resume(&mut self) {
        let mut events = Vec::new();
        if self.survival.resume(&mut events) {
            self.bus.publish(&events);
        }
    }

    /// Place the body, e.g. at a level checkpoint
    pub fn teleport(&mut self, position: Vec2) {
        self.controller.teleport(position);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time_ticks: self.time_ticks,
            phase: self.phase(),
            controller: self.controller.state().clone(),
            hazard: *self.hazard.state(),
            danger: self.survival.state().clone(),
        }
    }

    /// Teardown: drop every listener
    pub fn shutdown(&mut self) {
        let dropped = self.bus.listener_count();
        self.bus.clear();
        log::debug!("Simulation shut down, {dropped} listeners released");
    }
}
