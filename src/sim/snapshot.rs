//! Read-only render queries
//!
//! A renderer polls one [`RenderSnapshot`] per frame after the session has
//! stepped. Nothing in here feeds back into the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{AiState, Enemy, EnemyKind, EnemyVariant};
use super::geom::Rect;
use super::state::{GamePhase, GameState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: u32,
    pub position: Vec2,
    pub radius: f32,
    pub size: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub health_fraction: f32,
    pub facing: Vec2,
    pub moving: bool,
    pub invulnerable: bool,
    /// 0.0 right after a push, 1.0 when the push is ready
    pub push_ready: f32,
    pub push_range: f32,
    pub alive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub position: Vec2,
    pub radius: f32,
    pub size: Vec2,
    pub health_fraction: f32,
    pub state: AiState,
    /// Armed boomer fuse, 0.0 to 1.0
    pub fuse: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrapView {
    pub id: u32,
    pub position: Vec2,
    pub radius: f32,
    pub active: bool,
    pub rearm: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplosionView {
    pub source: u32,
    pub center: Vec2,
    pub radius: f32,
    /// 0.0 at detonation, 1.0 when the window closes
    pub progress: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub wave: u32,
    pub wave_active: bool,
    pub score: u32,
    pub upgrade_tokens: u32,
    pub arena: Rect,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub traps: Vec<TrapView>,
    pub obstacles: Vec<Rect>,
    pub explosions: Vec<ExplosionView>,
}

fn enemy_view(enemy: &Enemy) -> EnemyView {
    let fuse = match enemy.variant {
        EnemyVariant::Boomer { fuse, .. } if fuse.armed && fuse.duration > 0.0 => {
            Some((fuse.elapsed / fuse.duration).clamp(0.0, 1.0))
        }
        _ => None,
    };
    EnemyView {
        id: enemy.id,
        kind: enemy.kind(),
        position: enemy.pos(),
        radius: enemy.body.radius,
        size: enemy.body.size(),
        health_fraction: enemy.health.fraction(),
        state: enemy.state,
        fuse,
    }
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let p = &state.player;
        let player = PlayerView {
            id: p.id,
            position: p.pos(),
            radius: p.body.radius,
            size: p.body.size(),
            health: p.health.current(),
            max_health: p.health.max(),
            health_fraction: p.health.fraction(),
            facing: p.facing,
            moving: p.vel != Vec2::ZERO,
            invulnerable: p.invulnerability.active(),
            push_ready: p.push.cooldown.progress(),
            push_range: p.push.range,
            alive: p.is_alive(),
        };

        let explosions = state
            .enemies
            .iter()
            .filter_map(|e| {
                e.explosion().map(|x| ExplosionView {
                    source: e.id,
                    center: e.pos(),
                    radius: x.radius,
                    progress: x.progress(),
                })
            })
            .collect();

        Self {
            phase: state.phase,
            wave: state.director.current_wave,
            wave_active: state.director.wave_active(),
            score: p.score,
            upgrade_tokens: state.upgrade_tokens,
            arena: state.arena(),
            player,
            enemies: state.enemies.iter().map(enemy_view).collect(),
            traps: state
                .traps
                .iter()
                .map(|t| TrapView {
                    id: t.id,
                    position: t.body.pos,
                    radius: t.body.radius,
                    active: t.active,
                    rearm: t.rearm_progress(state.clock),
                })
                .collect(),
            obstacles: state.obstacles.iter().map(|o| o.rect).collect(),
            explosions,
        }
    }
}
