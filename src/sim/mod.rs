//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Level geometry reached only through the `Geometry` trait
//! - Timers advanced by the tick, never by wall-clock time
//! - No rendering, audio or platform dependencies

pub mod controller;
pub mod events;
pub mod geometry;
pub mod hazard;
pub mod jump;
pub mod movement;
pub mod safe_ground;
pub mod state;
pub mod survival;
pub mod tick;
pub mod timer;

pub use controller::{Controller, ControllerState, RespawnOutcome};
pub use events::{
    EventBus, EventKind, GameEvent, GameOverCause, ListenerId, NullDirector, SceneDirector,
};
pub use geometry::{Category, Geometry, RayHit, Solid, StaticWorld};
pub use hazard::{Hazard, HazardState, PursuitView};
pub use state::{Body, Character, GamePhase, GameState, Snapshot};
pub use survival::{DangerState, Directive, FadeStage, Observation, SurvivalCoordinator};
pub use tick::{JumpSignal, TickInput, tick};
pub use timer::{Countdown, TickClock, TimeDomain};
