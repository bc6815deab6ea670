//! Game state and world construction
//!
//! Everything one run needs lives in [`GameState`]: the player, the dense
//! enemy and trap arrays, static obstacles, the wave director and the
//! seeded RNG. A restart simply builds a new one.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::director::WaveDirector;
use super::enemy::{Enemy, EnemyKind};
use super::entity::{Obstacle, Trap};
use super::events::GameEvent;
use super::geom::{Rect, circle_rect_overlap};
use super::player::{Player, Upgrade};
use crate::tuning::{ArenaTuning, Tuning};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Player is dead
    GameOver,
}

/// Side length of the default arena pillars
const PILLAR_SIZE: f32 = 60.0;

/// Four pillars placed symmetrically around the center, leaving the middle
/// clear for the player
pub fn default_layout(arena: &ArenaTuning) -> Vec<Rect> {
    let center = Vec2::new(arena.width, arena.height) * 0.5;
    let offset = Vec2::new(arena.width * 0.2, arena.height * 0.2);
    let half = Vec2::splat(PILLAR_SIZE * 0.5);
    [
        Vec2::new(-offset.x, -offset.y),
        Vec2::new(offset.x, -offset.y),
        Vec2::new(-offset.x, offset.y),
        Vec2::new(offset.x, offset.y),
    ]
    .into_iter()
    .map(|o| Rect::from_center(center + o, half))
    .collect()
}

/// Complete game state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Simulation seconds since the run started
    pub clock: f64,
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub player: Player,
    /// Dense, sorted by id after every reap
    pub enemies: Vec<Enemy>,
    pub traps: Vec<Trap>,
    pub obstacles: Vec<Obstacle>,
    pub director: WaveDirector,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    /// Earned by clearing waves, spent on upgrades
    pub upgrade_tokens: u32,
    next_id: u32,
}

impl GameState {
    /// New run with the shipped balance and default arena
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let layout = default_layout(&tuning.arena);
        Self::with_layout(seed, tuning, layout)
    }

    /// New run with an explicit obstacle list
    pub fn with_layout(seed: u64, tuning: Tuning, obstacles: Vec<Rect>) -> Self {
        let center = Vec2::new(tuning.arena.width, tuning.arena.height) * 0.5;
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(0, center, &tuning.player),
            director: WaveDirector::new(0.0, &tuning),
            tuning,
            clock: 0.0,
            time_ticks: 0,
            phase: GamePhase::Playing,
            enemies: Vec::new(),
            traps: Vec::new(),
            obstacles: Vec::new(),
            events: Vec::new(),
            upgrade_tokens: 0,
            next_id: 1,
        };
        state.player.id = state.next_entity_id();
        for rect in obstacles {
            state.add_obstacle(rect);
        }
        log::info!("New run (seed {})", seed);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn arena(&self) -> Rect {
        Rect::new(0.0, 0.0, self.tuning.arena.width, self.tuning.arena.height)
    }

    pub fn add_obstacle(&mut self, rect: Rect) -> u32 {
        let id = self.next_entity_id();
        self.obstacles.push(Obstacle {
            id,
            rect,
            collision_damage: self.tuning.obstacle_damage,
        });
        id
    }

    pub fn obstacle_rects(&self) -> Vec<Rect> {
        self.obstacles.iter().map(|o| o.rect).collect()
    }

    /// Add an enemy hunting the player and count it toward the wave
    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let mut enemy = Enemy::new(id, kind, pos, &self.tuning);
        enemy.target = Some(self.player.id);
        self.enemies.push(enemy);
        self.director.on_enemy_spawned();
        log::debug!("Spawned {} #{} at ({:.0}, {:.0})", kind.name(), id, pos.x, pos.y);
        id
    }

    /// Place a trap. Rejected at the trap cap, outside the arena, or on top
    /// of an obstacle.
    pub fn place_trap(&mut self, pos: Vec2) -> Option<u32> {
        let traps = &self.tuning.traps;
        if self.traps.len() >= traps.max_traps || !self.arena().contains(pos) {
            return None;
        }
        if self
            .obstacles
            .iter()
            .any(|o| circle_rect_overlap(pos, traps.radius, &o.rect))
        {
            return None;
        }

        let (radius, damage, cooldown) = (traps.radius, traps.damage, traps.cooldown);
        let id = self.next_entity_id();
        self.traps.push(Trap::new(id, pos, radius, damage, cooldown));
        log::debug!("Trap #{} placed at ({:.0}, {:.0})", id, pos.x, pos.y);
        Some(id)
    }

    /// Spend an upgrade token. Returns false when none are banked.
    pub fn apply_upgrade(&mut self, upgrade: Upgrade) -> bool {
        if self.upgrade_tokens == 0 {
            return false;
        }
        self.upgrade_tokens -= 1;
        self.player.apply_upgrade(upgrade);
        true
    }

    /// Take every queued event
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Keep dense arrays in id order for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.traps.sort_by_key(|t| t.id);
    }
}
