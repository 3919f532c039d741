//! Gameplay notifications and their listeners
//!
//! Components push `GameEvent`s into the tick's event list. At the end of the
//! tick the list is delivered through the `EventBus`: events in the order
//! they were raised, each one to its listeners in subscription order.

use serde::{Deserialize, Serialize};

use super::state::Character;

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverCause {
    /// Both characters were dead at respawn
    BothCharactersLost,
    /// The player stayed below the hazard surface for too long
    StalledBelowHazard,
    /// Both characters dead with no pending resolution (should not happen)
    InvariantViolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CharacterJumped { character: Character },
    /// Second jump of a multi-jump character, performed airborne
    SecondJump { character: Character },
    /// Body started or stopped moving horizontally
    SprintChanged { moving: bool },
    /// Stats re-applied, by player switch or forced switch
    CharacterChanged { active: Character, forced: bool },
    /// Cosmetic cue for a player-initiated switch
    SwitchEffect { to: Character },
    PlayerDied,
    Paused,
    Unpaused,
    CollidedWithFadeSensor,
    RespawnFlicker,
    GameOver { cause: GameOverCause },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    CharacterJumped,
    SecondJump,
    SprintChanged,
    CharacterChanged,
    SwitchEffect,
    PlayerDied,
    Paused,
    Unpaused,
    CollidedWithFadeSensor,
    RespawnFlicker,
    GameOver,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::CharacterJumped { .. } => EventKind::CharacterJumped,
            GameEvent::SecondJump { .. } => EventKind::SecondJump,
            GameEvent::SprintChanged { .. } => EventKind::SprintChanged,
            GameEvent::CharacterChanged { .. } => EventKind::CharacterChanged,
            GameEvent::SwitchEffect { .. } => EventKind::SwitchEffect,
            GameEvent::PlayerDied => EventKind::PlayerDied,
            GameEvent::Paused => EventKind::Paused,
            GameEvent::Unpaused => EventKind::Unpaused,
            GameEvent::CollidedWithFadeSensor => EventKind::CollidedWithFadeSensor,
            GameEvent::RespawnFlicker => EventKind::RespawnFlicker,
            GameEvent::GameOver { .. } => EventKind::GameOver,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&GameEvent)>;

/// Listener registry keyed by event kind
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(ListenerId, EventKind, Listener)>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&GameEvent) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, kind, Box::new(listener)));
        id
    }

    /// Returns false if the listener was already gone
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Drop every listener (teardown)
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn publish(&mut self, events: &[GameEvent]) {
        for event in events {
            let kind = event.kind();
            for (_, listener_kind, listener) in self.listeners.iter_mut() {
                if *listener_kind == kind {
                    listener(event);
                }
            }
        }
    }
}

/// Scene and audio hooks invoked on game over
pub trait SceneDirector {
    fn stop_music(&mut self);
    fn load_game_over_scene(&mut self);
}

/// Director that only logs; used when no presentation layer is attached
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDirector;

impl SceneDirector for NullDirector {
    fn stop_music(&mut self) {
        log::debug!("stop_music (no director attached)");
    }

    fn load_game_over_scene(&mut self) {
        log::info!("Game over scene requested (no director attached)");
    }
}
