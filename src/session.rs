//! Host-facing session
//!
//! Owns the [`GameState`], turns host frames into fixed simulation ticks,
//! buffers input intents between frames and fans events out to listeners.

use glam::Vec2;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::sim::{
    Direction, EventBus, GameEvent, GamePhase, GameState, ListenerId, ListenerResult,
    RenderSnapshot, TickInput, Upgrade, tick,
};
use crate::tuning::Tuning;

pub struct Session {
    state: GameState,
    input: TickInput,
    accumulator: f32,
    last_timestamp: Option<f64>,
    bus: EventBus,
    /// Events raised during the last `update`
    frame_events: Vec<GameEvent>,
}

impl Session {
    pub fn new(seed: u64) -> Self {
        Self::from_state(GameState::new(seed))
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self::from_state(GameState::with_tuning(seed, tuning))
    }

    /// Wrap a prepared world (custom layouts, scripted scenarios)
    pub fn from_state(state: GameState) -> Self {
        Self {
            state,
            input: TickInput::default(),
            accumulator: 0.0,
            last_timestamp: None,
            bus: EventBus::new(),
            frame_events: Vec::new(),
        }
    }

    /// Advance by one host frame.
    ///
    /// `elapsed` is the frame delta in seconds; when it is not a usable
    /// number the delta is derived from `timestamp` (monotonic seconds).
    pub fn update(&mut self, elapsed: f32, timestamp: f64) {
        let dt = self.frame_delta(elapsed, timestamp);

        if self.state.phase == GamePhase::Playing {
            self.accumulator += dt.min(MAX_FRAME_DT);

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.push = false;
            }
        } else {
            self.accumulator = 0.0;
        }

        self.frame_events = self.state.drain_events();
        if !self.frame_events.is_empty() {
            self.bus.dispatch(&self.frame_events);
        }
    }

    fn frame_delta(&mut self, elapsed: f32, timestamp: f64) -> f32 {
        let previous = self.last_timestamp;
        if timestamp.is_finite() {
            self.last_timestamp = Some(timestamp);
        } else {
            log::warn!("Ignoring non-finite frame timestamp {}", timestamp);
        }

        if elapsed.is_finite() && elapsed >= 0.0 {
            return elapsed;
        }
        match previous {
            Some(prev) if timestamp.is_finite() && timestamp >= prev => (timestamp - prev) as f32,
            _ => {
                log::warn!("Unusable frame delta {}, skipping frame", elapsed);
                0.0
            }
        }
    }

    pub fn set_movement_intent(&mut self, direction: Direction, pressed: bool) {
        self.input.movement.set(direction, pressed);
    }

    /// Queue a push for the next tick
    pub fn trigger_push(&mut self) {
        self.input.push = true;
    }

    /// Place a trap now. `None` when the request is rejected.
    pub fn place_trap(&mut self, position: Vec2) -> Option<u32> {
        if self.state.phase != GamePhase::Playing {
            return None;
        }
        self.state.place_trap(position)
    }

    pub fn apply_upgrade(&mut self, upgrade: Upgrade) -> bool {
        if self.state.phase == GamePhase::GameOver {
            return false;
        }
        self.state.apply_upgrade(upgrade)
    }

    pub fn pause(&mut self) {
        if self.state.phase == GamePhase::Playing {
            self.state.phase = GamePhase::Paused;
            log::info!("Paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state.phase == GamePhase::Paused {
            self.state.phase = GamePhase::Playing;
            log::info!("Resumed");
        }
    }

    /// Fresh run; listeners stay subscribed
    pub fn restart(&mut self, seed: u64) {
        let tuning = self.state.tuning.clone();
        self.state = GameState::with_tuning(seed, tuning);
        self.accumulator = 0.0;
        self.input = TickInput::default();
        self.frame_events.clear();
        log::info!("Restarted with seed {}", seed);
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GameEvent) -> ListenerResult + 'static,
    {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Events raised during the most recent `update`
    pub fn events(&self) -> &[GameEvent] {
        &self.frame_events
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.state)
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }
}
