//! Combat: the push, knockback sub-physics, hits on the player and
//! boomer blasts
//!
//! Knockback is what turns the push into damage: enemies flung into walls
//! or armed traps get hurt on impact.

use glam::Vec2;

use super::enemy::{AiState, Enemy, EnemyVariant};
use super::entity::{Obstacle, Trap};
use super::events::GameEvent;
use super::geom::{Rect, circle_contains, circle_rect_overlap, circles_overlap};
use super::player::{HitOutcome, Player};
use crate::direction_to;
use crate::tuning::{KnockbackTuning, Tuning};

/// Push every living enemy within range away from the player.
///
/// Gated on the ability being ready and the player alive; any ungated call
/// consumes the cooldown even if nothing was in range. Returns how many
/// enemies were pushed.
pub fn execute_push(player: &mut Player, enemies: &mut [Enemy], knockback: &KnockbackTuning) -> usize {
    if !player.push.available() || !player.is_alive() {
        return 0;
    }
    player.push.cooldown.reset();

    let origin = player.pos();
    let mut pushed = 0;
    for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
        if !circle_contains(origin, player.push.range, enemy.pos()) {
            continue;
        }
        let mut dir = direction_to(origin, enemy.pos());
        if dir == Vec2::ZERO {
            dir = player.facing;
        }
        apply_knockback(enemy, dir, player.push.force, knockback);
        pushed += 1;
    }
    log::trace!("Push hit {} enemies", pushed);
    pushed
}

/// Start (or replace) a knockback impulse. Brutes shrug off part of the
/// force and lose any charge in progress.
pub fn apply_knockback(enemy: &mut Enemy, direction: Vec2, force: f32, tuning: &KnockbackTuning) {
    let force = if enemy.is_obstacle() {
        force * tuning.brute_resistance
    } else {
        force
    };
    let velocity = direction.normalize_or_zero() * force;
    if velocity == Vec2::ZERO {
        return;
    }

    if let EnemyVariant::Brute { charge } = &mut enemy.variant {
        charge.charging = false;
    }
    enemy.knockback.velocity = velocity;
    enemy.knockback.active = true;
    enemy.vel = Vec2::ZERO;
    enemy.state = AiState::KnockedBack;
}

fn stop_knockback(enemy: &mut Enemy) {
    enemy.knockback.velocity = Vec2::ZERO;
    enemy.knockback.active = false;
}

/// World view used while integrating knockback
pub struct ImpactWorld<'a> {
    pub obstacles: &'a [Obstacle],
    /// Bounds of other living obstacle-flagged enemies
    pub brutes: &'a [Rect],
    pub arena: &'a Rect,
    pub traps: &'a mut [Trap],
    pub now: f64,
    pub events: &'a mut Vec<GameEvent>,
}

/// Advance one knockback step: impact checks, move, trap contact, decay
pub fn update_knockback(enemy: &mut Enemy, dt: f32, world: &mut ImpactWorld<'_>, tuning: &KnockbackTuning) {
    if !enemy.knockback.active {
        return;
    }

    let radius = enemy.body.radius;
    let candidate = enemy.pos() + enemy.knockback.velocity * dt;

    if let Some(obstacle) = world
        .obstacles
        .iter()
        .find(|o| circle_rect_overlap(candidate, radius, &o.rect))
    {
        enemy.take_damage(obstacle.collision_damage);
        log::trace!("Enemy #{} slammed into obstacle #{}", enemy.id, obstacle.id);
        stop_knockback(enemy);
        return;
    }
    if world.brutes.iter().any(|r| circle_rect_overlap(candidate, radius, r))
        || !world.arena.contains_circle(candidate, radius)
    {
        stop_knockback(enemy);
        return;
    }

    enemy.body.pos = candidate;
    trip_traps(enemy, world.traps, world.now, world.events);

    enemy.knockback.velocity *= tuning.decay;
    if enemy.knockback.velocity.length() < tuning.stop_speed {
        stop_knockback(enemy);
    }
}

/// Fire any armed trap the enemy is standing on
pub fn trip_traps(enemy: &mut Enemy, traps: &mut [Trap], now: f64, events: &mut Vec<GameEvent>) {
    for trap in traps.iter_mut() {
        if !enemy.is_alive() {
            break;
        }
        if !trap.active || !enemy.body.overlaps(&trap.body) {
            continue;
        }
        if trap.try_trigger(now) {
            enemy.take_damage(trap.damage);
            events.push(GameEvent::TrapTriggered { trap_id: trap.id });
        }
    }
}

/// Hit the player, queueing the resulting damage/death events
pub fn strike_player(
    player: &mut Player,
    amount: i32,
    direction: Vec2,
    force: f32,
    obstacles: &[Rect],
    arena: &Rect,
    events: &mut Vec<GameEvent>,
) -> HitOutcome {
    let outcome = player.take_hit(amount, direction, force, obstacles, arena);
    if outcome != HitOutcome::Ignored {
        events.push(GameEvent::PlayerDamaged {
            health: player.health.current(),
            max_health: player.health.max(),
        });
    }
    if outcome == HitOutcome::Killed {
        log::info!("Player died");
        events.push(GameEvent::PlayerDied);
    }
    outcome
}

/// A boomer detonation, resolved after the source's AI step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blast {
    pub source: u32,
    pub center: Vec2,
    pub radius: f32,
    pub damage: i32,
}

/// Apply a blast to the player and every other living enemy whose center
/// lies inside it. Survivors are flung outward.
pub fn detonate(
    blast: &Blast,
    player: &mut Player,
    enemies: &mut [Enemy],
    tuning: &Tuning,
    obstacles: &[Rect],
    events: &mut Vec<GameEvent>,
) {
    let arena = Rect::new(0.0, 0.0, tuning.arena.width, tuning.arena.height);

    if player.is_alive() && circle_contains(blast.center, blast.radius, player.pos()) {
        strike_player(
            player,
            blast.damage,
            direction_to(blast.center, player.pos()),
            tuning.blast.player_knockback,
            obstacles,
            &arena,
            events,
        );
    }

    for enemy in enemies.iter_mut() {
        if enemy.id == blast.source || !enemy.is_alive() {
            continue;
        }
        if !circle_contains(blast.center, blast.radius, enemy.pos()) {
            continue;
        }
        enemy.take_damage(blast.damage);
        if enemy.is_alive() {
            apply_knockback(
                enemy,
                direction_to(blast.center, enemy.pos()),
                tuning.blast.enemy_knockback,
                &tuning.knockback,
            );
        }
    }
}

/// Whether an enemy body touches the player body
pub fn touching_player(enemy_pos: Vec2, enemy_radius: f32, player: &Player) -> bool {
    circles_overlap(enemy_pos, enemy_radius, player.pos(), player.body.radius)
}
