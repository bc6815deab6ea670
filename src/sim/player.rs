//! The knight
//!
//! Holds movement intent, the push ability, the post-hit invulnerability
//! window and run score. Upgrades between waves mutate these stats.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Cooldown, Health};
use super::geom::Rect;
use super::movement::{clamp_to_arena, slide};
use crate::tuning::PlayerTuning;

/// One of the four movement inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Four independent held-direction flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    pub fn set(&mut self, direction: Direction, pressed: bool) {
        match direction {
            Direction::Up => self.up = pressed,
            Direction::Down => self.down = pressed,
            Direction::Left => self.left = pressed,
            Direction::Right => self.right = pressed,
        }
    }

    /// Unit heading (zero when nothing or opposing keys are held)
    pub fn heading(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down)).normalize_or_zero()
    }
}

/// Push ability state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PushAbility {
    pub cooldown: Cooldown,
    pub range: f32,
    pub force: f32,
}

impl PushAbility {
    #[inline]
    pub fn available(&self) -> bool {
        self.cooldown.is_ready()
    }
}

/// Post-hit grace period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Invulnerability {
    pub remaining: f32,
    pub max: f32,
}

impl Invulnerability {
    #[inline]
    pub fn active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// Stat bump granted between waves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Upgrade {
    /// +1 heart and a full heal
    MaxHealth,
    Speed,
    PushRange,
    PushForce,
    /// Shorter push cooldown
    PushCooldown,
}

impl Upgrade {
    pub const ALL: [Upgrade; 5] = [
        Upgrade::MaxHealth,
        Upgrade::Speed,
        Upgrade::PushRange,
        Upgrade::PushForce,
        Upgrade::PushCooldown,
    ];
}

/// Result of a hit attempt on the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Dead, invulnerable, or zero damage
    Ignored,
    Damaged,
    Killed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub body: Body,
    pub health: Health,
    pub speed: f32,
    /// Last nonzero movement heading
    pub facing: Vec2,
    pub intent: MoveIntent,
    pub vel: Vec2,
    pub push: PushAbility,
    pub invulnerability: Invulnerability,
    pub score: u32,
    hit_shove_time: f32,
}

impl Player {
    pub fn new(id: u32, pos: Vec2, tuning: &PlayerTuning) -> Self {
        Self {
            id,
            body: Body::new(pos, tuning.radius),
            health: Health::new(tuning.max_health),
            speed: tuning.speed,
            facing: Vec2::new(0.0, -1.0),
            intent: MoveIntent::default(),
            vel: Vec2::ZERO,
            push: PushAbility {
                cooldown: Cooldown::ready(tuning.push_cooldown),
                range: tuning.push_range,
                force: tuning.push_force,
            },
            invulnerability: Invulnerability {
                remaining: 0.0,
                max: tuning.invulnerability,
            },
            score: 0,
            hit_shove_time: tuning.hit_shove_time,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn tick_timers(&mut self, dt: f32) {
        self.push.cooldown.tick(dt);
        self.invulnerability.remaining = (self.invulnerability.remaining - dt).max(0.0);
    }

    /// Apply held movement for one step
    pub fn steer(&mut self, dt: f32, obstacles: &[Rect], arena: &Rect) {
        if !self.is_alive() {
            self.vel = Vec2::ZERO;
            return;
        }
        let heading = self.intent.heading();
        if heading != Vec2::ZERO {
            self.facing = heading;
        }
        self.vel = heading * self.speed;
        let moved = slide(self.body.pos, self.body.radius, self.vel, dt, obstacles);
        self.body.pos = clamp_to_arena(moved, self.body.radius, arena);
    }

    /// Damage the player and shove them along `direction`. The shove goes
    /// through the same sliding resolution as walking.
    pub fn take_hit(
        &mut self,
        amount: i32,
        direction: Vec2,
        force: f32,
        obstacles: &[Rect],
        arena: &Rect,
    ) -> HitOutcome {
        if !self.is_alive() || self.invulnerability.active() || amount <= 0 {
            return HitOutcome::Ignored;
        }

        self.health.take_damage(amount);
        let shove = direction.normalize_or_zero() * force;
        let moved = slide(self.body.pos, self.body.radius, shove, self.hit_shove_time, obstacles);
        self.body.pos = clamp_to_arena(moved, self.body.radius, arena);
        self.invulnerability.remaining = self.invulnerability.max;

        if self.is_alive() {
            HitOutcome::Damaged
        } else {
            HitOutcome::Killed
        }
    }

    pub fn apply_upgrade(&mut self, upgrade: Upgrade) {
        match upgrade {
            Upgrade::MaxHealth => {
                self.health.set_max(self.health.max() + 1);
                self.health.heal_full();
            }
            Upgrade::Speed => self.speed *= 1.2,
            Upgrade::PushRange => self.push.range *= 1.3,
            Upgrade::PushForce => self.push.force *= 1.3,
            Upgrade::PushCooldown => self.push.cooldown.max *= 0.85,
        }
        log::debug!("Player upgraded: {:?}", upgrade);
    }
}
