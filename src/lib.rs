//! Push Knight - A top-down survival arena built around a single push ability
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, pathfinding, combat, waves)
//! - `session`: Host-facing surface (input intents, events, render queries)
//! - `tuning`: Data-driven game balance

pub mod session;
pub mod sim;
pub mod tuning;

pub use session::Session;
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the simulation will accept (debugger pauses, hitches)
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Unit vector pointing from `from` toward `to` (zero when the points coincide)
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}
