//! Movement and collision resolution
//!
//! Movement is resolved one axis at a time so an actor pressed diagonally
//! against a wall keeps sliding along it instead of sticking.

use glam::Vec2;

use super::entity::Body;
use super::geom::{Rect, circle_rect_overlap};

fn blocked(pos: Vec2, radius: f32, blockers: &[Rect]) -> bool {
    blockers.iter().any(|rect| circle_rect_overlap(pos, radius, rect))
}

/// Resolve a move from `pos` to `candidate`, applying each axis only if
/// that axis alone lands clear of every blocker
pub fn resolve_axes(pos: Vec2, candidate: Vec2, radius: f32, blockers: &[Rect]) -> Vec2 {
    let mut out = pos;
    if candidate.x != pos.x && !blocked(Vec2::new(candidate.x, pos.y), radius, blockers) {
        out.x = candidate.x;
    }
    if candidate.y != pos.y && !blocked(Vec2::new(pos.x, candidate.y), radius, blockers) {
        out.y = candidate.y;
    }
    out
}

/// Move a circle by `vel * dt`, sliding along blockers
pub fn slide(pos: Vec2, radius: f32, vel: Vec2, dt: f32, blockers: &[Rect]) -> Vec2 {
    if vel == Vec2::ZERO {
        return pos;
    }
    resolve_axes(pos, pos + vel * dt, radius, blockers)
}

/// Soft push away from every overlapping neighbour, `strength` units/s each
pub fn separation_nudge(pos: Vec2, radius: f32, neighbours: &[Body], strength: f32, dt: f32) -> Vec2 {
    let mut nudge = Vec2::ZERO;
    for other in neighbours {
        if !Body::new(pos, radius).overlaps(other) {
            continue;
        }
        let away = (pos - other.pos).normalize_or_zero();
        // Exactly stacked: break the tie along +x
        let away = if away == Vec2::ZERO { Vec2::X } else { away };
        nudge += away * strength * dt;
    }
    pos + nudge
}

/// Keep a circle fully inside the arena
pub fn clamp_to_arena(pos: Vec2, radius: f32, arena: &Rect) -> Vec2 {
    let lo = arena.min + Vec2::splat(radius);
    let hi = (arena.max() - Vec2::splat(radius)).max(lo);
    pos.clamp(lo, hi)
}
