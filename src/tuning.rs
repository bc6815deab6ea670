//! Data-driven game balance
//!
//! Every gameplay constant lives here so a host can ship a JSON override
//! without rebuilding. Missing sections fall back to the shipped defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::EnemyKind;

/// Errors raised while loading a tuning override
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

fn invalid(field: &'static str, reason: &'static str) -> TuningError {
    TuningError::Invalid { field, reason }
}

/// Arena dimensions (world units, origin at top-left)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
        }
    }
}

/// Player stats and push ability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Hearts
    pub max_health: i32,
    pub speed: f32,
    pub radius: f32,
    pub push_range: f32,
    pub push_force: f32,
    /// Seconds between pushes
    pub push_cooldown: f32,
    /// Seconds of invulnerability after taking a hit
    pub invulnerability: f32,
    /// A hit shoves the player by `force * hit_shove_time`
    pub hit_shove_time: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 3,
            speed: 200.0,
            radius: 20.0,
            push_range: 80.0,
            push_force: 300.0,
            push_cooldown: 1.0,
            invulnerability: 1.5,
            hit_shove_time: 0.1,
        }
    }
}

/// Per-kind enemy stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub max_health: i32,
    /// Damage dealt by a melee attack or a brute charge
    pub damage: i32,
    pub speed: f32,
    pub radius: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    /// Knockback force applied to the player on a melee hit
    pub attack_knockback: f32,
    pub score: u32,
}

/// Override for one kind's stats; unset fields keep that kind's shipped value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct EnemyStatsPatch {
    max_health: Option<i32>,
    damage: Option<i32>,
    speed: Option<f32>,
    radius: Option<f32>,
    detection_range: Option<f32>,
    attack_range: Option<f32>,
    attack_cooldown: Option<f32>,
    attack_knockback: Option<f32>,
    score: Option<u32>,
}

impl EnemyStatsPatch {
    fn apply(self, stats: &mut EnemyStats) {
        stats.max_health = self.max_health.unwrap_or(stats.max_health);
        stats.damage = self.damage.unwrap_or(stats.damage);
        stats.speed = self.speed.unwrap_or(stats.speed);
        stats.radius = self.radius.unwrap_or(stats.radius);
        stats.detection_range = self.detection_range.unwrap_or(stats.detection_range);
        stats.attack_range = self.attack_range.unwrap_or(stats.attack_range);
        stats.attack_cooldown = self.attack_cooldown.unwrap_or(stats.attack_cooldown);
        stats.attack_knockback = self.attack_knockback.unwrap_or(stats.attack_knockback);
        stats.score = self.score.unwrap_or(stats.score);
    }
}

/// Skeleton brute charge attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeTuning {
    pub speed: f32,
    pub duration: f32,
    pub knockback: f32,
}

impl Default for ChargeTuning {
    fn default() -> Self {
        Self {
            speed: 250.0,
            duration: 0.8,
            knockback: 400.0,
        }
    }
}

/// Boomer goblin fuse and explosion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlastTuning {
    pub fuse: f32,
    pub radius: f32,
    pub damage: i32,
    /// How long the exploding body stays in the world
    pub duration: f32,
    pub player_knockback: f32,
    pub enemy_knockback: f32,
}

impl Default for BlastTuning {
    fn default() -> Self {
        Self {
            fuse: 1.5,
            radius: 100.0,
            damage: 2,
            duration: 0.5,
            player_knockback: 300.0,
            enemy_knockback: 200.0,
        }
    }
}

/// Knockback sub-physics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockbackTuning {
    /// Multiplicative velocity decay applied every tick
    pub decay: f32,
    /// Knockback ends once speed drops below this
    pub stop_speed: f32,
    /// Fraction of any knockback force a brute actually receives
    pub brute_resistance: f32,
    /// Speed of the soft push that keeps enemies from stacking
    pub separation_speed: f32,
}

impl Default for KnockbackTuning {
    fn default() -> Self {
        Self {
            decay: 0.9,
            stop_speed: 10.0,
            brute_resistance: 0.5,
            separation_speed: 20.0,
        }
    }
}

/// Grid A* parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathTuning {
    pub cell_size: f32,
    pub max_expansions: u32,
    /// Interior waypoints whose in/out directions dot above this are dropped
    pub colinear_dot: f32,
    /// Seconds between path recomputes
    pub recompute_interval: f32,
    pub capture_radius: f32,
}

impl Default for PathTuning {
    fn default() -> Self {
        Self {
            cell_size: 20.0,
            max_expansions: 1000,
            colinear_dot: 0.95,
            recompute_interval: 0.5,
            capture_radius: 10.0,
        }
    }
}

/// Player-placed traps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapTuning {
    pub damage: i32,
    pub radius: f32,
    pub cooldown: f64,
    pub max_traps: usize,
}

impl Default for TrapTuning {
    fn default() -> Self {
        Self {
            damage: 1,
            radius: 20.0,
            cooldown: 2.0,
            max_traps: 5,
        }
    }
}

/// Relative spawn weights for one difficulty tier. Omitted kinds weigh 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindWeights {
    pub skeleton: u32,
    pub goblin: u32,
    pub brute: u32,
    pub boomer: u32,
}

impl KindWeights {
    /// Sum of all weights, widened so any four `u32` weights fit
    pub fn total(&self) -> u64 {
        self.entries().iter().map(|&(_, w)| u64::from(w)).sum()
    }

    /// Weights in the fixed order used for rolling
    pub fn entries(&self) -> [(EnemyKind, u32); 4] {
        [
            (EnemyKind::Skeleton, self.skeleton),
            (EnemyKind::Goblin, self.goblin),
            (EnemyKind::SkeletonBrute, self.brute),
            (EnemyKind::BoomerGoblin, self.boomer),
        ]
    }
}

/// Weights that apply from `from_wave` until the next tier starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveTier {
    pub from_wave: u32,
    pub weights: KindWeights,
}

/// Wave pacing and composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    pub base_enemies: u32,
    pub enemies_per_wave: u32,
    /// Seconds between spawns on wave 1
    pub base_interval: f32,
    pub interval_decrease: f32,
    /// Floor for the spawn interval
    pub min_interval: f32,
    pub start_delay: f64,
    pub complete_delay: f64,
    /// Inset from the arena edge for spawn positions
    pub spawn_margin: f32,
    /// Sorted by `from_wave`, first tier starts at wave 1
    pub tiers: Vec<WaveTier>,
}

impl Default for WaveTuning {
    fn default() -> Self {
        let tier = |from_wave, skeleton, goblin, brute, boomer| WaveTier {
            from_wave,
            weights: KindWeights {
                skeleton,
                goblin,
                brute,
                boomer,
            },
        };
        Self {
            base_enemies: 6,
            enemies_per_wave: 3,
            base_interval: 2.0,
            interval_decrease: 0.15,
            min_interval: 0.5,
            start_delay: 2.0,
            complete_delay: 3.0,
            spawn_margin: 50.0,
            tiers: vec![
                tier(1, 60, 40, 0, 0),
                tier(3, 45, 35, 0, 20),
                tier(5, 35, 30, 15, 20),
                tier(8, 25, 25, 25, 25),
            ],
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TuningFile")]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub player: PlayerTuning,
    pub skeleton: EnemyStats,
    pub goblin: EnemyStats,
    pub brute: EnemyStats,
    pub boomer: EnemyStats,
    pub charge: ChargeTuning,
    pub blast: BlastTuning,
    pub knockback: KnockbackTuning,
    pub pathing: PathTuning,
    pub traps: TrapTuning,
    /// Damage an enemy takes when knocked into a static obstacle
    pub obstacle_damage: i32,
    pub waves: WaveTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena: ArenaTuning::default(),
            player: PlayerTuning::default(),

            // Balanced melee
            skeleton: EnemyStats {
                max_health: 3,
                damage: 1,
                speed: 90.0,
                radius: 18.0,
                detection_range: 450.0,
                attack_range: 40.0,
                attack_cooldown: 1.2,
                attack_knockback: 180.0,
                score: 10,
            },
            // Fast and fragile
            goblin: EnemyStats {
                max_health: 2,
                damage: 1,
                speed: 120.0,
                radius: 15.0,
                detection_range: 400.0,
                attack_range: 36.0,
                attack_cooldown: 1.0,
                attack_knockback: 150.0,
                score: 15,
            },
            // Slow tank, attacks by charging
            brute: EnemyStats {
                max_health: 6,
                damage: 2,
                speed: 60.0,
                radius: 25.0,
                detection_range: 400.0,
                attack_range: 50.0,
                attack_cooldown: 2.0,
                attack_knockback: 0.0,
                score: 50,
            },
            // No contact damage, attack range arms the fuse
            boomer: EnemyStats {
                max_health: 1,
                damage: 0,
                speed: 140.0,
                radius: 16.0,
                detection_range: 500.0,
                attack_range: 60.0,
                attack_cooldown: 0.0,
                attack_knockback: 0.0,
                score: 25,
            },

            charge: ChargeTuning::default(),
            blast: BlastTuning::default(),
            knockback: KnockbackTuning::default(),
            pathing: PathTuning::default(),
            traps: TrapTuning::default(),
            obstacle_damage: 1,
            waves: WaveTuning::default(),
        }
    }
}

/// On-disk form of [`Tuning`]: every section optional, enemy stats
/// overridable field by field
#[derive(Deserialize)]
#[serde(default)]
struct TuningFile {
    arena: ArenaTuning,
    player: PlayerTuning,
    skeleton: EnemyStatsPatch,
    goblin: EnemyStatsPatch,
    brute: EnemyStatsPatch,
    boomer: EnemyStatsPatch,
    charge: ChargeTuning,
    blast: BlastTuning,
    knockback: KnockbackTuning,
    pathing: PathTuning,
    traps: TrapTuning,
    obstacle_damage: i32,
    waves: WaveTuning,
}

impl Default for TuningFile {
    fn default() -> Self {
        let shipped = Tuning::default();
        Self {
            arena: shipped.arena,
            player: shipped.player,
            skeleton: EnemyStatsPatch::default(),
            goblin: EnemyStatsPatch::default(),
            brute: EnemyStatsPatch::default(),
            boomer: EnemyStatsPatch::default(),
            charge: shipped.charge,
            blast: shipped.blast,
            knockback: shipped.knockback,
            pathing: shipped.pathing,
            traps: shipped.traps,
            obstacle_damage: shipped.obstacle_damage,
            waves: shipped.waves,
        }
    }
}

impl From<TuningFile> for Tuning {
    fn from(file: TuningFile) -> Self {
        let mut tuning = Tuning {
            arena: file.arena,
            player: file.player,
            charge: file.charge,
            blast: file.blast,
            knockback: file.knockback,
            pathing: file.pathing,
            traps: file.traps,
            obstacle_damage: file.obstacle_damage,
            waves: file.waves,
            ..Tuning::default()
        };
        file.skeleton.apply(&mut tuning.skeleton);
        file.goblin.apply(&mut tuning.goblin);
        file.brute.apply(&mut tuning.brute);
        file.boomer.apply(&mut tuning.boomer);
        tuning
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning override");
        Ok(tuning)
    }

    /// Stats for one enemy kind
    pub fn stats(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Skeleton => &self.skeleton,
            EnemyKind::Goblin => &self.goblin,
            EnemyKind::SkeletonBrute => &self.brute,
            EnemyKind::BoomerGoblin => &self.boomer,
        }
    }

    /// Spawn weights for a wave (tiers are stepped, not interpolated)
    pub fn weights_for_wave(&self, wave: u32) -> KindWeights {
        self.waves
            .tiers
            .iter()
            .rev()
            .find(|tier| tier.from_wave <= wave)
            .or_else(|| self.waves.tiers.first())
            .map(|tier| tier.weights)
            .unwrap_or(KindWeights {
                skeleton: 1,
                goblin: 0,
                brute: 0,
                boomer: 0,
            })
    }

    /// Reject values that would break simulation invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.arena.width > 0.0 && self.arena.height > 0.0) {
            return Err(invalid("arena", "width and height must be positive"));
        }
        if self.player.max_health < 1 {
            return Err(invalid("player.max_health", "must be at least 1"));
        }
        if !(self.knockback.decay > 0.0 && self.knockback.decay < 1.0) {
            return Err(invalid("knockback.decay", "must lie strictly between 0 and 1"));
        }
        if self.knockback.stop_speed <= 0.0 {
            return Err(invalid("knockback.stop_speed", "must be positive"));
        }
        if self.pathing.cell_size <= 0.0 {
            return Err(invalid("pathing.cell_size", "must be positive"));
        }
        if self.pathing.max_expansions == 0 {
            return Err(invalid("pathing.max_expansions", "must be at least 1"));
        }
        if self.traps.max_traps == 0 {
            return Err(invalid("traps.max_traps", "must be at least 1"));
        }

        let waves = &self.waves;
        if waves.min_interval < 0.0 || waves.base_interval < 0.0 || waves.interval_decrease < 0.0 {
            return Err(invalid("waves", "intervals must not be negative"));
        }
        if waves.min_interval > waves.base_interval {
            return Err(invalid("waves.min_interval", "must not exceed base_interval"));
        }
        match waves.tiers.first() {
            None => return Err(invalid("waves.tiers", "must not be empty")),
            Some(first) if first.from_wave != 1 => {
                return Err(invalid("waves.tiers", "first tier must start at wave 1"));
            }
            Some(_) => {}
        }
        if waves.tiers.windows(2).any(|w| w[0].from_wave >= w[1].from_wave) {
            return Err(invalid("waves.tiers", "must be sorted by from_wave"));
        }
        if waves.tiers.iter().any(|tier| tier.weights.total() == 0) {
            return Err(invalid("waves.tiers", "every tier needs a nonzero weight"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "player": { "speed": 260.0 }, "obstacle_damage": 2 }"#)
            .expect("override should parse");
        assert_eq!(tuning.player.speed, 260.0);
        assert_eq!(tuning.player.max_health, 3);
        assert_eq!(tuning.obstacle_damage, 2);
        assert_eq!(tuning.waves, WaveTuning::default());
    }

    #[test]
    fn test_single_enemy_field_override() {
        let tuning = Tuning::from_json(r#"{ "goblin": { "speed": 150.0 } }"#).unwrap();
        let shipped = Tuning::default();
        assert_eq!(tuning.goblin.speed, 150.0);
        assert_eq!(tuning.goblin.max_health, 2);
        assert_eq!(tuning.goblin.score, 15);
        assert_eq!(tuning.skeleton, shipped.skeleton);
        assert_eq!(tuning.brute, shipped.brute);
    }

    #[test]
    fn test_full_dump_reloads() {
        let mut tuning = Tuning::default();
        tuning.boomer.detection_range = 320.0;
        let json = serde_json::to_string(&tuning).unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_huge_weights_do_not_overflow() {
        let json = r#"{ "waves": { "tiers": [
            { "from_wave": 1, "weights": { "skeleton": 4294967295, "goblin": 1 } }
        ] } }"#;
        let tuning = Tuning::from_json(json).unwrap();
        let weights = tuning.weights_for_wave(1);
        assert_eq!(weights.brute, 0);
        assert_eq!(weights.total(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_rejects_all_zero_tier() {
        let json = r#"{ "waves": { "tiers": [ { "from_wave": 1, "weights": {} } ] } }"#;
        let err = Tuning::from_json(json).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "waves.tiers", .. }));
    }

    #[test]
    fn test_rejects_non_decaying_knockback() {
        let err = Tuning::from_json(r#"{ "knockback": { "decay": 1.0 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "knockback.decay", .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_rejects_unsorted_tiers() {
        let mut tuning = Tuning::default();
        tuning.waves.tiers.swap(1, 2);
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_weights_step_at_thresholds() {
        let tuning = Tuning::default();
        assert_eq!(tuning.weights_for_wave(1).brute, 0);
        assert_eq!(tuning.weights_for_wave(2).boomer, 0);
        assert_eq!(tuning.weights_for_wave(3).boomer, 20);
        assert_eq!(tuning.weights_for_wave(4).brute, 0);
        assert_eq!(tuning.weights_for_wave(5).brute, 15);
        assert_eq!(tuning.weights_for_wave(40), tuning.waves.tiers[3].weights);
    }
}
