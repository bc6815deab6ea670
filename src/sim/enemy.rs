//! Enemy records
//!
//! One flat record per enemy; the four kinds share every common field and
//! differ only in stats and the small payload carried by [`EnemyVariant`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Cooldown, Health};
use crate::tuning::Tuning;

/// Enemy type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Skeleton,
    Goblin,
    SkeletonBrute,
    BoomerGoblin,
}

impl EnemyKind {
    /// Other enemies path around this kind and it stops knockback
    pub fn is_obstacle(self) -> bool {
        matches!(self, EnemyKind::SkeletonBrute)
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Skeleton => "Skeleton",
            EnemyKind::Goblin => "Goblin",
            EnemyKind::SkeletonBrute => "Skeleton Brute",
            EnemyKind::BoomerGoblin => "Boomer Goblin",
        }
    }
}

/// Brute charge attack
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChargeState {
    pub charging: bool,
    pub direction: Vec2,
    pub elapsed: f32,
    pub duration: f32,
    pub speed: f32,
}

/// Boomer fuse, counts up once armed
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FuseState {
    pub armed: bool,
    pub elapsed: f32,
    pub duration: f32,
}

/// Boomer explosion window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExplosionState {
    pub triggered: bool,
    pub elapsed: f32,
    pub duration: f32,
    pub radius: f32,
    pub damage: i32,
}

impl ExplosionState {
    pub fn finished(&self) -> bool {
        self.triggered && self.elapsed >= self.duration
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Kind-specific sub-state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyVariant {
    Skeleton,
    Goblin,
    Brute { charge: ChargeState },
    Boomer { fuse: FuseState, explosion: ExplosionState },
}

impl EnemyVariant {
    pub fn kind(&self) -> EnemyKind {
        match self {
            EnemyVariant::Skeleton => EnemyKind::Skeleton,
            EnemyVariant::Goblin => EnemyKind::Goblin,
            EnemyVariant::Brute { .. } => EnemyKind::SkeletonBrute,
            EnemyVariant::Boomer { .. } => EnemyKind::BoomerGoblin,
        }
    }
}

/// Externally imposed velocity that suspends AI while active
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Knockback {
    pub velocity: Vec2,
    pub active: bool,
}

/// Cached route toward the target
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathCache {
    pub waypoints: Vec<Vec2>,
    pub index: usize,
    /// Seconds until the next recompute
    pub recompute_in: f32,
}

impl PathCache {
    pub fn current(&self) -> Option<Vec2> {
        self.waypoints.get(self.index).copied()
    }

    pub fn exhausted(&self) -> bool {
        self.index >= self.waypoints.len()
    }

    pub fn replace(&mut self, waypoints: Vec<Vec2>, interval: f32) {
        self.waypoints = waypoints;
        self.index = 0;
        self.recompute_in = interval;
    }
}

/// Animation/AI tag exposed to renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Idle,
    Pursuing,
    Attacking,
    Charging,
    Fused,
    KnockedBack,
    Exploding,
    Dead,
}

/// How an enemy died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Damage,
    /// Boomer that blew itself up
    Fuse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub body: Body,
    pub vel: Vec2,
    pub health: Health,
    pub damage: i32,
    pub speed: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub attack_knockback: f32,
    pub attack: Cooldown,
    /// Id of the player being hunted
    pub target: Option<u32>,
    pub knockback: Knockback,
    pub path: PathCache,
    pub state: AiState,
    pub variant: EnemyVariant,
    pub death: Option<DeathCause>,
    /// Set once the defeat has been reported
    pub defeat_reported: bool,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, tuning: &Tuning) -> Self {
        let stats = tuning.stats(kind);
        let variant = match kind {
            EnemyKind::Skeleton => EnemyVariant::Skeleton,
            EnemyKind::Goblin => EnemyVariant::Goblin,
            EnemyKind::SkeletonBrute => EnemyVariant::Brute {
                charge: ChargeState {
                    duration: tuning.charge.duration,
                    speed: tuning.charge.speed,
                    ..Default::default()
                },
            },
            EnemyKind::BoomerGoblin => EnemyVariant::Boomer {
                fuse: FuseState {
                    duration: tuning.blast.fuse,
                    ..Default::default()
                },
                explosion: ExplosionState {
                    duration: tuning.blast.duration,
                    radius: tuning.blast.radius,
                    damage: tuning.blast.damage,
                    ..Default::default()
                },
            },
        };

        Self {
            id,
            body: Body::new(pos, stats.radius),
            vel: Vec2::ZERO,
            health: Health::new(stats.max_health),
            damage: stats.damage,
            speed: stats.speed,
            detection_range: stats.detection_range,
            attack_range: stats.attack_range,
            attack_knockback: stats.attack_knockback,
            attack: Cooldown::ready(stats.attack_cooldown),
            target: None,
            knockback: Knockback::default(),
            path: PathCache::default(),
            state: AiState::Idle,
            variant,
            death: None,
            defeat_reported: false,
        }
    }

    #[inline]
    pub fn kind(&self) -> EnemyKind {
        self.variant.kind()
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    #[inline]
    pub fn is_obstacle(&self) -> bool {
        self.kind().is_obstacle()
    }

    /// Damage from any external source. Records the death cause on the
    /// killing blow.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let applied = self.health.take_damage(amount);
        if applied > 0 && !self.is_alive() && self.death.is_none() {
            self.death = Some(DeathCause::Damage);
            log::debug!("{} #{} killed", self.kind().name(), self.id);
        }
        applied
    }

    /// Boomer fuse expiry
    pub fn self_destruct(&mut self) {
        let remaining = self.health.current();
        self.health.take_damage(remaining);
        if self.death.is_none() {
            self.death = Some(DeathCause::Fuse);
        }
    }

    /// Score owed for this enemy's death (none for self-detonation)
    pub fn score_award(&self, tuning: &Tuning) -> u32 {
        match self.death {
            Some(DeathCause::Damage) => tuning.stats(self.kind()).score,
            _ => 0,
        }
    }

    pub fn charging(&self) -> bool {
        matches!(self.variant, EnemyVariant::Brute { charge } if charge.charging)
    }

    pub fn explosion(&self) -> Option<&ExplosionState> {
        match &self.variant {
            EnemyVariant::Boomer { explosion, .. } if explosion.triggered => Some(explosion),
            _ => None,
        }
    }

    /// Dead enemies are removed at end of tick, except a boomer whose
    /// explosion window is still running (or has not started yet)
    pub fn ready_for_removal(&self) -> bool {
        if self.is_alive() {
            return false;
        }
        match &self.variant {
            EnemyVariant::Boomer { explosion, .. } => explosion.finished(),
            _ => true,
        }
    }
}
