//! Wave director
//!
//! Paces the run: a short lead-in, then timer-gated spawning of a weighted
//! mix of enemies from the arena edges, a wait for the last enemy to go
//! down, a breather, and the next (larger, faster) wave.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::events::GameEvent;
use crate::tuning::{KindWeights, Tuning};

/// Where the current wave stands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Lead-in before the wave opens
    Starting { begins_at: f64 },
    Spawning,
    /// Everything spawned, waiting for the arena to clear
    AwaitingClear,
    /// Cleared; the next wave opens after the completion delay
    Complete { at: f64 },
}

/// An enemy the director wants placed this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnOrder {
    pub kind: EnemyKind,
    pub position: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDirector {
    pub current_wave: u32,
    /// Total enemies in the current (or upcoming) wave
    pub wave_target: u32,
    pub enemies_to_spawn: u32,
    pub enemies_alive: u32,
    /// Seconds between spawns this wave
    pub spawn_interval: f32,
    pub phase: WavePhase,
    pub last_spawn_at: f64,
}

/// Linear growth in wave size
pub fn enemy_count_for_wave(wave: u32, tuning: &Tuning) -> u32 {
    let waves = &tuning.waves;
    waves.base_enemies + wave.saturating_sub(1) * waves.enemies_per_wave
}

/// Shrinking spawn gap with a floor
pub fn spawn_interval_for_wave(wave: u32, tuning: &Tuning) -> f32 {
    let waves = &tuning.waves;
    let steps = wave.saturating_sub(1) as f32;
    (waves.base_interval - steps * waves.interval_decrease).max(waves.min_interval)
}

impl WaveDirector {
    /// Director for a fresh run; wave 1 opens after the start delay
    pub fn new(now: f64, tuning: &Tuning) -> Self {
        let target = enemy_count_for_wave(1, tuning);
        Self {
            current_wave: 0,
            wave_target: target,
            enemies_to_spawn: target,
            enemies_alive: 0,
            spawn_interval: spawn_interval_for_wave(1, tuning),
            phase: WavePhase::Starting {
                begins_at: now + tuning.waves.start_delay,
            },
            last_spawn_at: now,
        }
    }

    /// A wave is open (spawning or waiting for clear)
    pub fn wave_active(&self) -> bool {
        matches!(self.phase, WavePhase::Spawning | WavePhase::AwaitingClear)
    }

    pub fn wave_complete(&self) -> bool {
        matches!(self.phase, WavePhase::Complete { .. })
    }

    fn begin_wave(&mut self, wave: u32, now: f64, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        self.current_wave = wave;
        self.wave_target = enemy_count_for_wave(wave, tuning);
        self.enemies_to_spawn = self.wave_target;
        self.spawn_interval = spawn_interval_for_wave(wave, tuning);
        self.last_spawn_at = now;
        self.phase = WavePhase::Spawning;

        log::info!(
            "Wave {} started: {} enemies, one every {:.2}s",
            wave,
            self.wave_target,
            self.spawn_interval
        );
        events.push(GameEvent::WaveStarted { wave });
    }

    /// Advance timers. Returns an enemy to spawn, at most one per tick.
    pub fn tick<R: Rng>(
        &mut self,
        now: f64,
        rng: &mut R,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> Option<SpawnOrder> {
        match self.phase {
            WavePhase::Starting { begins_at } => {
                if now >= begins_at {
                    self.begin_wave(self.current_wave + 1, now, tuning, events);
                }
                None
            }
            WavePhase::Complete { at } => {
                if now - at >= tuning.waves.complete_delay {
                    self.begin_wave(self.current_wave + 1, now, tuning, events);
                }
                None
            }
            WavePhase::AwaitingClear => None,
            WavePhase::Spawning => {
                if self.enemies_to_spawn == 0 {
                    self.phase = WavePhase::AwaitingClear;
                    return None;
                }
                if now - self.last_spawn_at < self.spawn_interval as f64 {
                    return None;
                }

                self.last_spawn_at = now;
                self.enemies_to_spawn -= 1;
                if self.enemies_to_spawn == 0 {
                    self.phase = WavePhase::AwaitingClear;
                }

                let weights = tuning.weights_for_wave(self.current_wave);
                Some(SpawnOrder {
                    kind: pick_kind(rng, &weights),
                    position: spawn_position(
                        rng,
                        tuning.arena.width,
                        tuning.arena.height,
                        tuning.waves.spawn_margin,
                    ),
                })
            }
        }
    }

    pub fn on_enemy_spawned(&mut self) {
        self.enemies_alive += 1;
    }

    pub fn on_enemy_removed(&mut self) {
        self.enemies_alive = self.enemies_alive.saturating_sub(1);
    }

    /// Close the wave once nothing is left to spawn and nothing is alive.
    /// Returns true on the tick the wave completes.
    pub fn evaluate_completion(&mut self, now: f64, events: &mut Vec<GameEvent>) -> bool {
        if !self.wave_active() || self.enemies_to_spawn > 0 || self.enemies_alive > 0 {
            return false;
        }
        self.phase = WavePhase::Complete { at: now };
        log::info!("Wave {} complete", self.current_wave);
        events.push(GameEvent::WaveCompleted {
            wave: self.current_wave,
        });
        true
    }
}

/// Weighted roll over the four kinds
pub fn pick_kind<R: Rng>(rng: &mut R, weights: &KindWeights) -> EnemyKind {
    let total = weights.total();
    if total == 0 {
        return EnemyKind::Skeleton;
    }
    let mut roll = rng.random_range(0..total);
    for (kind, weight) in weights.entries() {
        let weight = u64::from(weight);
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    EnemyKind::Skeleton
}

fn span<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Uniform edge, then a uniform point along it, inset by `margin`
pub fn spawn_position<R: Rng>(rng: &mut R, width: f32, height: f32, margin: f32) -> Vec2 {
    let (left, right) = (margin, width - margin);
    let (top, bottom) = (margin, height - margin);
    match rng.random_range(0..4u8) {
        0 => Vec2::new(span(rng, left, right), top),
        1 => Vec2::new(right, span(rng, top, bottom)),
        2 => Vec2::new(span(rng, left, right), bottom),
        _ => Vec2::new(left, span(rng, top, bottom)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f64 = 1.0 / 60.0;

    /// Run the director until it has spawned everything, killing each spawn
    /// straight away, then let the wave close. Returns the time reached.
    fn clear_wave(d: &mut WaveDirector, mut now: f64, rng: &mut Pcg32, tuning: &Tuning) -> f64 {
        let mut events = Vec::new();
        let wave = d.current_wave + 1;
        while !(d.wave_complete() && d.current_wave == wave) {
            now += DT;
            if d.tick(now, rng, tuning, &mut events).is_some() {
                d.on_enemy_spawned();
                d.on_enemy_removed();
            }
            d.evaluate_completion(now, &mut events);
            assert!(now < 10_000.0, "wave never completed");
        }
        now
    }

    #[test]
    fn test_first_wave_waits_for_start_delay() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut d = WaveDirector::new(0.0, &tuning);
        let mut events = Vec::new();

        assert!(d.tick(1.9, &mut rng, &tuning, &mut events).is_none());
        assert!(events.is_empty());
        d.tick(2.0, &mut rng, &tuning, &mut events);
        assert_eq!(events, vec![GameEvent::WaveStarted { wave: 1 }]);
        assert!(d.wave_active());

        // First spawn one interval after the wave opens
        assert!(d.tick(3.9, &mut rng, &tuning, &mut events).is_none());
        assert!(d.tick(4.0, &mut rng, &tuning, &mut events).is_some());
        assert_eq!(d.enemies_to_spawn, 5);
    }

    #[test]
    fn test_completion_requires_clear_arena() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut d = WaveDirector::new(0.0, &tuning);
        let mut events = Vec::new();
        let mut now = 0.0;
        let mut spawned = 0;
        while d.enemies_to_spawn > 0 {
            now += DT;
            if d.tick(now, &mut rng, &tuning, &mut events).is_some() {
                d.on_enemy_spawned();
                spawned += 1;
            }
            assert!(!d.evaluate_completion(now, &mut events));
        }
        assert_eq!(spawned, 6);
        assert_eq!(d.phase, WavePhase::AwaitingClear);

        for _ in 0..5 {
            d.on_enemy_removed();
            assert!(!d.evaluate_completion(now, &mut events));
        }
        d.on_enemy_removed();
        assert!(d.evaluate_completion(now, &mut events));
        assert!(d.wave_complete());
        assert_eq!(events.last(), Some(&GameEvent::WaveCompleted { wave: 1 }));
    }

    #[test]
    fn test_wave_scaling_after_four_waves() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut d = WaveDirector::new(0.0, &tuning);
        let mut now = 0.0;
        for _ in 0..4 {
            now = clear_wave(&mut d, now, &mut rng, &tuning);
        }
        let mut events = Vec::new();
        d.tick(now + tuning.waves.complete_delay + 0.01, &mut rng, &tuning, &mut events);

        assert_eq!(d.current_wave, 5);
        assert_eq!(d.wave_target, 6 + 4 * 3);
        assert!((d.spawn_interval - (2.0f32 - 4.0 * 0.15).max(0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_interval_floor() {
        let tuning = Tuning::default();
        assert_eq!(spawn_interval_for_wave(1, &tuning), 2.0);
        assert_eq!(spawn_interval_for_wave(30, &tuning), 0.5);
        assert_eq!(enemy_count_for_wave(3, &tuning), 12);
    }

    #[test]
    fn test_early_waves_only_weak_kinds() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(4);
        let weights = tuning.weights_for_wave(1);
        for _ in 0..500 {
            let kind = pick_kind(&mut rng, &weights);
            assert!(matches!(kind, EnemyKind::Skeleton | EnemyKind::Goblin));
        }
    }

    #[test]
    fn test_pick_kind_with_maximal_weights() {
        let mut rng = Pcg32::seed_from_u64(6);
        let weights = KindWeights {
            skeleton: u32::MAX,
            goblin: u32::MAX,
            brute: 0,
            boomer: 0,
        };
        let kinds: Vec<EnemyKind> = (0..200).map(|_| pick_kind(&mut rng, &weights)).collect();
        assert!(kinds.iter().all(|k| matches!(k, EnemyKind::Skeleton | EnemyKind::Goblin)));
        assert!(kinds.contains(&EnemyKind::Skeleton));
        assert!(kinds.contains(&EnemyKind::Goblin));
    }

    #[test]
    fn test_spawn_positions_on_inset_edges() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..200 {
            let p = spawn_position(&mut rng, 1024.0, 768.0, 50.0);
            let on_edge = p.x == 50.0 || p.x == 974.0 || p.y == 50.0 || p.y == 718.0;
            assert!(on_edge);
            assert!(p.x >= 50.0 && p.x <= 974.0 && p.y >= 50.0 && p.y <= 718.0);
        }
    }

    proptest! {
        #[test]
        fn prop_completion_gating(seed in any::<u64>(), kills in proptest::collection::vec(any::<bool>(), 1..400)) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut d = WaveDirector::new(0.0, &tuning);
            let mut events = Vec::new();
            let mut now = 0.0;
            let mut spawned = 0;
            let mut wave = d.current_wave;

            for kill in kills {
                now += 0.25;
                let order = d.tick(now, &mut rng, &tuning, &mut events);
                if d.current_wave != wave {
                    wave = d.current_wave;
                    spawned = 0;
                }
                if order.is_some() {
                    d.on_enemy_spawned();
                    spawned += 1;
                }
                prop_assert!(spawned <= d.wave_target);
                if kill {
                    d.on_enemy_removed();
                }
                d.evaluate_completion(now, &mut events);

                if d.wave_active() || d.wave_complete() {
                    let cleared = d.enemies_to_spawn == 0 && d.enemies_alive == 0;
                    prop_assert_eq!(d.wave_complete(), cleared);
                }
            }
        }
    }
}
