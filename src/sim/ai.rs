//! Per-enemy AI step
//!
//! Priority each tick: explosion window, death, fuse, knockback, charge,
//! then distance to the player picks between idling, pursuing along the
//! cached path, and attacking.

use glam::Vec2;

use super::combat::{Blast, ImpactWorld, strike_player, touching_player, trip_traps, update_knockback};
use super::enemy::{AiState, Enemy, EnemyVariant, Knockback};
use super::entity::{Body, Obstacle, Trap};
use super::events::GameEvent;
use super::geom::{Rect, circle_rect_overlap};
use super::movement::{clamp_to_arena, resolve_axes, separation_nudge};
use super::path::find_path;
use super::player::Player;
use crate::direction_to;
use crate::tuning::Tuning;

/// Everything an enemy can see and touch during its step
pub struct AiContext<'a> {
    pub tuning: &'a Tuning,
    pub dt: f32,
    pub now: f64,
    pub arena: &'a Rect,
    pub player: &'a mut Player,
    pub obstacles: &'a [Obstacle],
    /// Static obstacle rects only (the player's blockers)
    pub obstacle_rects: &'a [Rect],
    /// Bounds of other living obstacle-flagged enemies
    pub brutes: &'a [Rect],
    /// Static obstacles plus `brutes`
    pub blockers: &'a [Rect],
    /// Other living enemies
    pub neighbours: &'a [Body],
    pub traps: &'a mut [Trap],
    pub events: &'a mut Vec<GameEvent>,
}

/// Run one AI step. Returns a blast when a boomer goes off this step.
pub fn step_enemy(enemy: &mut Enemy, ctx: &mut AiContext<'_>) -> Option<Blast> {
    let dt = ctx.dt;

    if let EnemyVariant::Boomer { explosion, .. } = &mut enemy.variant {
        if explosion.triggered {
            explosion.elapsed += dt;
            enemy.vel = Vec2::ZERO;
            enemy.state = AiState::Exploding;
            return None;
        }
    }

    if !enemy.is_alive() {
        enemy.vel = Vec2::ZERO;
        enemy.knockback = Knockback::default();
        if matches!(enemy.variant, EnemyVariant::Boomer { .. }) {
            return Some(trigger_explosion(enemy, ctx.events));
        }
        enemy.state = AiState::Dead;
        return None;
    }

    enemy.attack.tick(dt);
    enemy.path.recompute_in -= dt;

    if burn_fuse(enemy, dt) {
        enemy.self_destruct();
        return Some(trigger_explosion(enemy, ctx.events));
    }

    if enemy.target != Some(ctx.player.id) {
        enemy.vel = Vec2::ZERO;
        enemy.state = AiState::Idle;
        return None;
    }

    if enemy.knockback.active {
        let mut world = ImpactWorld {
            obstacles: ctx.obstacles,
            brutes: ctx.brutes,
            arena: ctx.arena,
            traps: &mut *ctx.traps,
            now: ctx.now,
            events: &mut *ctx.events,
        };
        update_knockback(enemy, dt, &mut world, &ctx.tuning.knockback);
        enemy.vel = Vec2::ZERO;
        enemy.state = AiState::KnockedBack;
        return None;
    }

    if enemy.charging() {
        run_charge(enemy, ctx);
        return None;
    }

    let dist = enemy.pos().distance(ctx.player.pos());
    if dist > enemy.detection_range || !ctx.player.is_alive() {
        enemy.vel = Vec2::ZERO;
        enemy.state = if fuse_armed(enemy) {
            AiState::Fused
        } else {
            AiState::Idle
        };
    } else if dist <= enemy.attack_range {
        enemy.vel = Vec2::ZERO;
        perform_attack(enemy, ctx);
        if enemy.charging() {
            return None;
        }
    } else {
        pursue(enemy, ctx);
    }

    walk(enemy, ctx);
    None
}

fn fuse_armed(enemy: &Enemy) -> bool {
    matches!(enemy.variant, EnemyVariant::Boomer { fuse, .. } if fuse.armed)
}

/// Advance an armed fuse; true once it has run out
fn burn_fuse(enemy: &mut Enemy, dt: f32) -> bool {
    match &mut enemy.variant {
        EnemyVariant::Boomer { fuse, .. } if fuse.armed => {
            fuse.elapsed += dt;
            fuse.elapsed >= fuse.duration
        }
        _ => false,
    }
}

fn trigger_explosion(enemy: &mut Enemy, events: &mut Vec<GameEvent>) -> Blast {
    let center = enemy.pos();
    let (radius, damage) = match &mut enemy.variant {
        EnemyVariant::Boomer { explosion, .. } => {
            explosion.triggered = true;
            explosion.elapsed = 0.0;
            (explosion.radius, explosion.damage)
        }
        _ => (0.0, 0),
    };
    enemy.state = AiState::Exploding;
    log::debug!("Boomer #{} exploded at {:?}", enemy.id, center);
    events.push(GameEvent::ExplosionTriggered {
        position: center,
        radius,
    });
    Blast {
        source: enemy.id,
        center,
        radius,
        damage,
    }
}

fn perform_attack(enemy: &mut Enemy, ctx: &mut AiContext<'_>) {
    let to_player = direction_to(enemy.pos(), ctx.player.pos());
    match &mut enemy.variant {
        EnemyVariant::Skeleton | EnemyVariant::Goblin => {
            enemy.state = AiState::Attacking;
            if enemy.attack.is_ready() {
                strike_player(
                    ctx.player,
                    enemy.damage,
                    to_player,
                    enemy.attack_knockback,
                    ctx.obstacle_rects,
                    ctx.arena,
                    ctx.events,
                );
                enemy.attack.reset();
            }
        }
        EnemyVariant::Brute { charge } => {
            if enemy.attack.is_ready() && !charge.charging && to_player != Vec2::ZERO {
                charge.charging = true;
                charge.direction = to_player;
                charge.elapsed = 0.0;
                enemy.attack.reset();
                enemy.state = AiState::Charging;
                log::debug!("Brute #{} charging", enemy.id);
            } else {
                enemy.state = AiState::Attacking;
            }
        }
        EnemyVariant::Boomer { fuse, .. } => {
            if !fuse.armed {
                fuse.armed = true;
                fuse.elapsed = 0.0;
                log::debug!("Boomer #{} fuse lit", enemy.id);
            }
            enemy.state = AiState::Fused;
        }
    }
}

fn end_charge(enemy: &mut Enemy) {
    if let EnemyVariant::Brute { charge } = &mut enemy.variant {
        charge.charging = false;
    }
    enemy.vel = Vec2::ZERO;
}

fn run_charge(enemy: &mut Enemy, ctx: &mut AiContext<'_>) {
    let EnemyVariant::Brute { charge } = &mut enemy.variant else {
        return;
    };
    charge.elapsed += ctx.dt;
    let (direction, speed, expired) = (charge.direction, charge.speed, charge.elapsed >= charge.duration);

    let radius = enemy.body.radius;
    let candidate = enemy.pos() + direction * speed * ctx.dt;

    let blocked = ctx.blockers.iter().any(|r| circle_rect_overlap(candidate, radius, r));
    if blocked || !ctx.arena.contains_circle(candidate, radius) {
        end_charge(enemy);
        enemy.state = AiState::Idle;
        return;
    }

    if ctx.player.is_alive() && touching_player(candidate, radius, ctx.player) {
        strike_player(
            ctx.player,
            enemy.damage,
            direction,
            ctx.tuning.charge.knockback,
            ctx.obstacle_rects,
            ctx.arena,
            ctx.events,
        );
        end_charge(enemy);
        enemy.state = AiState::Attacking;
        return;
    }

    enemy.body.pos = candidate;
    enemy.vel = direction * speed;
    enemy.state = AiState::Charging;
    trip_traps(enemy, ctx.traps, ctx.now, ctx.events);

    if expired {
        end_charge(enemy);
    }
}

fn pursue(enemy: &mut Enemy, ctx: &mut AiContext<'_>) {
    let pathing = &ctx.tuning.pathing;
    if enemy.path.exhausted() || enemy.path.recompute_in <= 0.0 {
        let waypoints = find_path(enemy.pos(), ctx.player.pos(), ctx.blockers, pathing);
        enemy.path.replace(waypoints, pathing.recompute_interval);
        // First waypoint is the cell we are standing in
        if enemy.path.waypoints.len() > 1 {
            enemy.path.index = 1;
        }
    }

    while let Some(wp) = enemy.path.current() {
        if enemy.pos().distance(wp) > pathing.capture_radius {
            break;
        }
        enemy.path.index += 1;
    }

    enemy.vel = match enemy.path.current() {
        Some(wp) => direction_to(enemy.pos(), wp) * enemy.speed,
        None => Vec2::ZERO,
    };
    enemy.state = if fuse_armed(enemy) {
        AiState::Fused
    } else {
        AiState::Pursuing
    };
}

/// Apply velocity with separation, sliding against blockers, then check
/// traps underfoot
fn walk(enemy: &mut Enemy, ctx: &mut AiContext<'_>) {
    let pos = enemy.pos();
    let radius = enemy.body.radius;

    let mut candidate = pos + enemy.vel * ctx.dt;
    if !enemy.is_obstacle() {
        candidate = separation_nudge(
            candidate,
            radius,
            ctx.neighbours,
            ctx.tuning.knockback.separation_speed,
            ctx.dt,
        );
    }
    if candidate != pos {
        let moved = resolve_axes(pos, candidate, radius, ctx.blockers);
        enemy.body.pos = clamp_to_arena(moved, radius, ctx.arena);
    }

    trip_traps(enemy, ctx.traps, ctx.now, ctx.events);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::enemy::{DeathCause, EnemyKind};

    struct Fixture {
        tuning: Tuning,
        arena: Rect,
        player: Player,
        obstacles: Vec<Obstacle>,
        /// Bounds of other brutes
        brutes: Vec<Rect>,
        traps: Vec<Trap>,
        events: Vec<GameEvent>,
    }

    impl Fixture {
        fn new(player_pos: Vec2) -> Self {
            let tuning = Tuning::default();
            let player = Player::new(1, player_pos, &tuning.player);
            Self {
                arena: Rect::new(0.0, 0.0, tuning.arena.width, tuning.arena.height),
                tuning,
                player,
                obstacles: Vec::new(),
                brutes: Vec::new(),
                traps: Vec::new(),
                events: Vec::new(),
            }
        }

        fn enemy(&self, kind: EnemyKind, pos: Vec2) -> Enemy {
            let mut e = Enemy::new(10, kind, pos, &self.tuning);
            e.target = Some(self.player.id);
            e
        }

        fn step(&mut self, enemy: &mut Enemy) -> Option<Blast> {
            let rects: Vec<Rect> = self.obstacles.iter().map(|o| o.rect).collect();
            let blockers: Vec<Rect> = rects.iter().chain(&self.brutes).copied().collect();
            let mut ctx = AiContext {
                tuning: &self.tuning,
                dt: SIM_DT,
                now: 0.0,
                arena: &self.arena,
                player: &mut self.player,
                obstacles: &self.obstacles,
                obstacle_rects: &rects,
                brutes: &self.brutes,
                blockers: &blockers,
                neighbours: &[],
                traps: &mut self.traps,
                events: &mut self.events,
            };
            step_enemy(enemy, &mut ctx)
        }
    }

    #[test]
    fn test_idle_out_of_detection_range() {
        let mut fx = Fixture::new(Vec2::new(900.0, 400.0));
        let mut e = fx.enemy(EnemyKind::Skeleton, Vec2::new(100.0, 400.0));
        fx.step(&mut e);
        assert_eq!(e.state, AiState::Idle);
        assert_eq!(e.pos(), Vec2::new(100.0, 400.0));
    }

    #[test]
    fn test_pursues_toward_player() {
        let mut fx = Fixture::new(Vec2::new(500.0, 400.0));
        let mut e = fx.enemy(EnemyKind::Goblin, Vec2::new(300.0, 400.0));
        for _ in 0..30 {
            fx.step(&mut e);
        }
        assert_eq!(e.state, AiState::Pursuing);
        assert!(e.pos().x > 350.0);
        assert!((e.pos().y - 400.0).abs() < 15.0);
    }

    #[test]
    fn test_missing_target_is_noop() {
        let mut fx = Fixture::new(Vec2::new(500.0, 400.0));
        let mut e = fx.enemy(EnemyKind::Goblin, Vec2::new(450.0, 400.0));
        e.target = None;
        assert!(fx.step(&mut e).is_none());
        assert_eq!(e.vel, Vec2::ZERO);
        assert_eq!(e.pos(), Vec2::new(450.0, 400.0));
        assert_eq!(fx.player.health.current(), 3);
    }

    #[test]
    fn test_melee_respects_cooldown() {
        let mut fx = Fixture::new(Vec2::new(500.0, 400.0));
        let mut e = fx.enemy(EnemyKind::Skeleton, Vec2::new(470.0, 400.0));
        fx.step(&mut e);
        assert_eq!(e.state, AiState::Attacking);
        assert_eq!(fx.player.health.current(), 2);
        assert!(matches!(fx.events[0], GameEvent::PlayerDamaged { health: 2, max_health: 3 }));

        // Put the player back in reach; invulnerability and cooldown both gate
        fx.player.body.pos = Vec2::new(500.0, 400.0);
        fx.player.invulnerability.remaining = 0.0;
        fx.step(&mut e);
        assert_eq!(fx.player.health.current(), 2);
    }

    #[test]
    fn test_boomer_fuse_runs_out() {
        let mut fx = Fixture::new(Vec2::new(500.0, 400.0));
        let mut e = fx.enemy(EnemyKind::BoomerGoblin, Vec2::new(450.0, 400.0));
        assert!(fx.step(&mut e).is_none());
        assert_eq!(e.state, AiState::Fused);

        // Walk away: the fuse keeps burning
        fx.player.body.pos = Vec2::new(1000.0, 700.0);
        let mut blast = None;
        for _ in 0..200 {
            blast = fx.step(&mut e);
            if blast.is_some() {
                break;
            }
        }
        let blast = blast.expect("fuse should expire");
        assert_eq!(blast.source, e.id);
        assert_eq!(blast.radius, 100.0);
        assert_eq!(e.death, Some(DeathCause::Fuse));
        assert!(!e.ready_for_removal());

        for _ in 0..31 {
            assert!(fx.step(&mut e).is_none());
        }
        assert!(e.ready_for_removal());
    }

    #[test]
    fn test_dead_boomer_explodes_on_next_step() {
        let mut fx = Fixture::new(Vec2::new(900.0, 400.0));
        let mut e = fx.enemy(EnemyKind::BoomerGoblin, Vec2::new(100.0, 400.0));
        e.take_damage(1);
        let blast = fx.step(&mut e);
        assert!(blast.is_some());
        assert_eq!(e.state, AiState::Exploding);
        assert!(matches!(fx.events[0], GameEvent::ExplosionTriggered { .. }));
        // Only once
        assert!(fx.step(&mut e).is_none());
    }

    #[test]
    fn test_dead_skeleton_goes_dead() {
        let mut fx = Fixture::new(Vec2::new(500.0, 400.0));
        let mut e = fx.enemy(EnemyKind::Skeleton, Vec2::new(470.0, 400.0));
        e.take_damage(10);
        assert!(fx.step(&mut e).is_none());
        assert_eq!(e.state, AiState::Dead);
        assert_eq!(fx.player.health.current(), 3);
    }

    #[test]
    fn test_brute_charge_hits_player() {
        let mut fx = Fixture::new(Vec2::new(500.0, 400.0));
        let mut e = fx.enemy(EnemyKind::SkeletonBrute, Vec2::new(455.0, 400.0));
        fx.step(&mut e);
        assert!(e.charging());
        assert_eq!(e.state, AiState::Charging);

        // Contact distance is 45 (25 + 20); first charge step closes it
        fx.step(&mut e);
        assert!(!e.charging());
        assert_eq!(fx.player.health.current(), 1);
        assert!(fx.player.pos().x > 500.0);
    }

    #[test]
    fn test_brute_charge_stops_at_wall() {
        let mut fx = Fixture::new(Vec2::new(500.0, 400.0));
        fx.obstacles.push(Obstacle {
            id: 3,
            rect: Rect::new(478.0, 350.0, 1.0, 100.0),
            collision_damage: 1,
        });
        let mut e = fx.enemy(EnemyKind::SkeletonBrute, Vec2::new(452.0, 400.0));
        fx.step(&mut e);
        assert!(e.charging());
        fx.step(&mut e);
        assert!(!e.charging());
        assert_eq!(e.pos(), Vec2::new(452.0, 400.0));
        assert_eq!(fx.player.health.current(), 3);
    }

    #[test]
    fn test_brute_charge_runs_out() {
        let mut fx = Fixture::new(Vec2::new(500.0, 400.0));
        let mut e = fx.enemy(EnemyKind::SkeletonBrute, Vec2::new(455.0, 400.0));
        fx.step(&mut e);
        assert!(e.charging());

        // Sidestep: nothing left in the charge lane
        fx.player.body.pos = Vec2::new(500.0, 700.0);
        let mut steps = 0;
        while e.charging() {
            fx.step(&mut e);
            steps += 1;
            assert!(steps < 100, "charge never ended");
        }
        // 0.8 s at 60 Hz, 250 units/s
        assert!((47..=50).contains(&steps));
        assert!((e.pos().x - 655.0).abs() < 5.0);
        assert_eq!(e.pos().y, 400.0);
        assert_eq!(fx.player.health.current(), 3);
    }

    #[test]
    fn test_path_recomputed_on_interval() {
        let mut fx = Fixture::new(Vec2::new(600.0, 400.0));
        let mut e = fx.enemy(EnemyKind::Goblin, Vec2::new(300.0, 400.0));
        fx.step(&mut e);
        let first = e.path.waypoints.clone();
        assert_eq!(first.last(), Some(&Vec2::new(610.0, 410.0)));

        // The cached route holds until the interval runs out
        fx.player.body.pos = Vec2::new(300.0, 650.0);
        let mut steps = 0;
        while e.path.waypoints == first {
            fx.step(&mut e);
            steps += 1;
            assert!(steps < 60, "path never recomputed");
        }
        assert!((29..=32).contains(&steps));
        assert_eq!(e.path.waypoints.last(), Some(&Vec2::new(310.0, 650.0)));
    }

    #[test]
    fn test_exhausted_path_recomputed_at_once() {
        let mut fx = Fixture::new(Vec2::new(600.0, 400.0));
        let mut e = fx.enemy(EnemyKind::Goblin, Vec2::new(300.0, 400.0));
        fx.step(&mut e);
        assert!(e.path.recompute_in > 0.4);

        fx.player.body.pos = Vec2::new(300.0, 650.0);
        e.path.index = e.path.waypoints.len();
        fx.step(&mut e);
        assert_eq!(e.path.waypoints.last(), Some(&Vec2::new(310.0, 650.0)));
        assert!(e.path.recompute_in > 0.4);
    }

    #[test]
    fn test_paths_around_brute() {
        let mut fx = Fixture::new(Vec2::new(600.0, 400.0));
        let brute = Rect::from_center(Vec2::new(400.0, 400.0), Vec2::splat(25.0));
        fx.brutes.push(brute);
        let mut e = fx.enemy(EnemyKind::Goblin, Vec2::new(300.0, 400.0));

        fx.step(&mut e);
        assert!(e.path.waypoints.iter().any(|w| (w.y - 410.0).abs() >= 30.0));

        for _ in 0..150 {
            fx.step(&mut e);
            assert!(!circle_rect_overlap(e.pos(), e.body.radius, &brute));
        }
        assert!(e.pos().x > 450.0);
    }

    #[test]
    fn test_knockback_suspends_ai() {
        let mut fx = Fixture::new(Vec2::new(500.0, 400.0));
        let mut e = fx.enemy(EnemyKind::Skeleton, Vec2::new(470.0, 400.0));
        e.knockback.velocity = Vec2::new(-300.0, 0.0);
        e.knockback.active = true;
        fx.step(&mut e);
        assert_eq!(e.state, AiState::KnockedBack);
        assert!(e.pos().x < 470.0);
        assert_eq!(fx.player.health.current(), 3);
    }
}
