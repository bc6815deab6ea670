//! Gameplay events
//!
//! The simulation queues [`GameEvent`]s on the state during a tick; the
//! session drains them once per host frame and hands them to listeners.

use std::error::Error;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;

/// Something observers (audio, HUD, analytics) may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemyDefeated {
        kind: EnemyKind,
        position: Vec2,
        /// Zero for a boomer that blew itself up
        score_award: u32,
    },
    WaveStarted { wave: u32 },
    WaveCompleted { wave: u32 },
    PlayerDamaged { health: i32, max_health: i32 },
    PlayerDied,
    TrapTriggered { trap_id: u32 },
    ExplosionTriggered { position: Vec2, radius: f32 },
}

pub type ListenerResult = Result<(), Box<dyn Error>>;

type Listener = Box<dyn FnMut(&GameEvent) -> ListenerResult>;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

/// Ordered listener list. A listener returning `Err` is logged and skipped;
/// the rest still see the event.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GameEvent) -> ListenerResult + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the listener was registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver every event to every listener in order.
    /// Returns the number of failed deliveries.
    pub fn dispatch(&mut self, events: &[GameEvent]) -> usize {
        let mut failures = 0;
        for event in events {
            for (id, listener) in self.listeners.iter_mut() {
                if let Err(e) = listener(event) {
                    failures += 1;
                    log::warn!("Event listener {:?} failed on {:?}: {}", id, event, e);
                }
            }
        }
        failures
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.len())
            .finish()
    }
}
