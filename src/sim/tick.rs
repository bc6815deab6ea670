//! Fixed timestep simulation tick
//!
//! Per-tick order: traps re-arm, player moves and pushes, the director may
//! spawn, every enemy runs its AI step (with knockback overriding it), blasts
//! resolve, dead enemies are reaped, then wave completion is evaluated.

use super::ai::{AiContext, step_enemy};
use super::combat::{Blast, detonate, execute_push};
use super::enemy::Enemy;
use super::entity::Body;
use super::events::GameEvent;
use super::geom::Rect;
use super::player::MoveIntent;
use super::state::{GamePhase, GameState};
use crate::consts::MAX_FRAME_DT;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Held movement directions
    pub movement: MoveIntent,
    /// Push requested this tick
    pub push: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Don't tick if paused or game over
    if state.phase != GamePhase::Playing {
        return;
    }

    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    state.clock += dt as f64;
    state.time_ticks += 1;
    let now = state.clock;
    let arena = state.arena();
    let obstacle_rects = state.obstacle_rects();

    for trap in &mut state.traps {
        trap.update(now);
    }

    // Player
    state.player.intent = input.movement;
    state.player.tick_timers(dt);
    state.player.steer(dt, &obstacle_rects, &arena);
    if input.push {
        execute_push(&mut state.player, &mut state.enemies, &state.tuning.knockback);
    }

    // Wave director
    if let Some(order) = state
        .director
        .tick(now, &mut state.rng, &state.tuning, &mut state.events)
    {
        state.spawn_enemy(order.kind, order.position);
    }

    // Enemies, in id order
    let mut crowd = Crowd::default();
    for i in 0..state.enemies.len() {
        if let Some(blast) = step_enemy_at(state, i, dt, &arena, &obstacle_rects, &mut crowd) {
            detonate(
                &blast,
                &mut state.player,
                &mut state.enemies,
                &state.tuning,
                &obstacle_rects,
                &mut state.events,
            );
        }
    }

    reap(state);

    if !state.player.is_alive() {
        state.phase = GamePhase::GameOver;
        log::info!(
            "Game over on wave {} with score {}",
            state.director.current_wave,
            state.player.score
        );
    } else if state.director.evaluate_completion(now, &mut state.events) {
        state.upgrade_tokens += 1;
    }
}

/// What one enemy sees of everyone else. The buffers live for the whole
/// tick and are refilled before each enemy steps, so earlier movers are
/// seen where they ended up.
#[derive(Debug, Default)]
struct Crowd {
    neighbours: Vec<Body>,
    brutes: Vec<Rect>,
    blockers: Vec<Rect>,
}

impl Crowd {
    fn refill(&mut self, enemies: &[Enemy], skip: u32, obstacle_rects: &[Rect]) {
        self.neighbours.clear();
        self.brutes.clear();
        for enemy in enemies.iter().filter(|e| e.id != skip && e.is_alive()) {
            self.neighbours.push(enemy.body);
            if enemy.is_obstacle() {
                self.brutes.push(enemy.body.bounds());
            }
        }
        self.blockers.clear();
        self.blockers.extend_from_slice(obstacle_rects);
        self.blockers.extend_from_slice(&self.brutes);
    }
}

fn step_enemy_at(
    state: &mut GameState,
    index: usize,
    dt: f32,
    arena: &Rect,
    obstacle_rects: &[Rect],
    crowd: &mut Crowd,
) -> Option<Blast> {
    crowd.refill(&state.enemies, state.enemies[index].id, obstacle_rects);

    let mut ctx = AiContext {
        tuning: &state.tuning,
        dt,
        now: state.clock,
        arena,
        player: &mut state.player,
        obstacles: &state.obstacles,
        obstacle_rects,
        brutes: &crowd.brutes,
        blockers: &crowd.blockers,
        neighbours: &crowd.neighbours,
        traps: &mut state.traps,
        events: &mut state.events,
    };
    step_enemy(&mut state.enemies[index], &mut ctx)
}

/// Report each death once, then drop enemies that are finished
fn reap(state: &mut GameState) {
    let mut i = 0;
    while i < state.enemies.len() {
        let enemy = &mut state.enemies[i];
        if !enemy.is_alive() && !enemy.defeat_reported {
            enemy.defeat_reported = true;
            let score_award = enemy.score_award(&state.tuning);
            state.player.score += score_award;
            state.events.push(GameEvent::EnemyDefeated {
                kind: enemy.kind(),
                position: enemy.pos(),
                score_award,
            });
        }

        if state.enemies[i].ready_for_removal() {
            state.enemies.swap_remove(i);
            state.director.on_enemy_removed();
        } else {
            i += 1;
        }
    }
    state.normalize_order();
}
