//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod ai;
pub mod combat;
pub mod director;
pub mod enemy;
pub mod entity;
pub mod events;
pub mod geom;
pub mod movement;
pub mod path;
pub mod player;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use combat::{Blast, apply_knockback, detonate, execute_push};
pub use director::{SpawnOrder, WaveDirector, WavePhase};
pub use enemy::{AiState, DeathCause, Enemy, EnemyKind, EnemyVariant};
pub use entity::{Body, Cooldown, Health, Obstacle, Trap};
pub use events::{EventBus, GameEvent, ListenerId, ListenerResult};
pub use geom::{Rect, circle_contains, circle_rect_overlap, circles_overlap};
pub use path::{find_path, simplify_path};
pub use player::{Direction, MoveIntent, Player, Upgrade};
pub use snapshot::{EnemyView, ExplosionView, PlayerView, RenderSnapshot, TrapView};
pub use state::{GamePhase, GameState, default_layout};
pub use tick::{TickInput, tick};
