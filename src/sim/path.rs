//! Grid A* for enemy navigation
//!
//! World positions are snapped to square cells. The search is 8-connected
//! with a Euclidean heuristic and a hard expansion cap; when the cap is hit
//! or the goal is unreachable the caller gets a straight two-point path.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use glam::{IVec2, Vec2};

use super::geom::Rect;
use crate::tuning::PathTuning;

/// Cardinal steps first, then diagonals
const NEIGHBOURS: [IVec2; 8] = [
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(0, -1),
    IVec2::new(0, 1),
    IVec2::new(-1, -1),
    IVec2::new(-1, 1),
    IVec2::new(1, -1),
    IVec2::new(1, 1),
];

/// Open-set entry, ordered as a min-heap on f-cost with FIFO tie-breaking
#[derive(Debug, Clone, Copy)]
struct Open {
    f: f32,
    seq: u64,
    cell: IVec2,
}

impl PartialEq for Open {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Open {}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Open {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap pops the greatest
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Grid<'a> {
    cell: f32,
    obstacles: &'a [Rect],
    goal: IVec2,
}

impl Grid<'_> {
    fn cell_of(&self, p: Vec2) -> IVec2 {
        (p / self.cell).floor().as_ivec2()
    }

    fn center_of(&self, c: IVec2) -> Vec2 {
        (c.as_vec2() + Vec2::splat(0.5)) * self.cell
    }

    fn blocked(&self, c: IVec2) -> bool {
        if c == self.goal {
            return false;
        }
        let center = self.center_of(c);
        let pad = self.cell * 0.5;
        self.obstacles.iter().any(|rect| rect.expand(pad).contains(center))
    }
}

/// Find a waypoint list (cell centers) from `start` to `end`.
///
/// Never returns an empty list.
pub fn find_path(start: Vec2, end: Vec2, obstacles: &[Rect], params: &PathTuning) -> Vec<Vec2> {
    let mut grid = Grid {
        cell: params.cell_size,
        obstacles,
        goal: IVec2::ZERO,
    };
    let start_cell = grid.cell_of(start);
    let goal = grid.cell_of(end);
    grid.goal = goal;

    if start_cell == goal {
        return vec![grid.center_of(goal)];
    }

    let heuristic = |c: IVec2| (c - goal).as_vec2().length();

    let mut open = BinaryHeap::new();
    let mut g_score: HashMap<IVec2, f32> = HashMap::new();
    let mut came_from: HashMap<IVec2, IVec2> = HashMap::new();
    let mut closed: HashSet<IVec2> = HashSet::new();
    let mut seq = 0u64;

    g_score.insert(start_cell, 0.0);
    open.push(Open {
        f: heuristic(start_cell),
        seq,
        cell: start_cell,
    });

    let mut expansions = 0;
    while let Some(Open { cell, .. }) = open.pop() {
        if !closed.insert(cell) {
            // Stale duplicate
            continue;
        }
        if cell == goal {
            return simplify_path(&reconstruct(&came_from, goal, &grid), params.colinear_dot);
        }

        expansions += 1;
        if expansions >= params.max_expansions {
            break;
        }

        let g = g_score.get(&cell).copied().unwrap_or(f32::INFINITY);
        for step in NEIGHBOURS {
            let next = cell + step;
            if closed.contains(&next) || grid.blocked(next) {
                continue;
            }
            // No squeezing diagonally between two blocked corners
            if step.x != 0
                && step.y != 0
                && (grid.blocked(cell + IVec2::new(step.x, 0))
                    || grid.blocked(cell + IVec2::new(0, step.y)))
            {
                continue;
            }

            let tentative = g + step.as_vec2().length();
            if tentative < g_score.get(&next).copied().unwrap_or(f32::INFINITY) {
                g_score.insert(next, tentative);
                came_from.insert(next, cell);
                seq += 1;
                open.push(Open {
                    f: tentative + heuristic(next),
                    seq,
                    cell: next,
                });
            }
        }
    }

    log::trace!("A* gave up after {} expansions, using direct path", expansions);
    vec![start, end]
}

fn reconstruct(came_from: &HashMap<IVec2, IVec2>, goal: IVec2, grid: &Grid<'_>) -> Vec<Vec2> {
    let mut cells = vec![goal];
    let mut cur = goal;
    while let Some(&prev) = came_from.get(&cur) {
        cells.push(prev);
        cur = prev;
    }
    cells.reverse();
    cells.into_iter().map(|c| grid.center_of(c)).collect()
}

/// Drop interior waypoints that continue (almost) straight on.
///
/// A waypoint survives when the normalized directions of its incoming and
/// outgoing segments dot below `colinear_dot`.
pub fn simplify_path(path: &[Vec2], colinear_dot: f32) -> Vec<Vec2> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let mut out = Vec::with_capacity(path.len());
    out.push(path[0]);
    for w in path.windows(3) {
        let incoming = (w[1] - w[0]).normalize_or_zero();
        let outgoing = (w[2] - w[1]).normalize_or_zero();
        if incoming.dot(outgoing) < colinear_dot {
            out.push(w[1]);
        }
    }
    out.push(path[path.len() - 1]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> PathTuning {
        PathTuning::default()
    }

    fn point_blocked(p: Vec2, obstacles: &[Rect]) -> bool {
        obstacles.iter().any(|r| r.contains(p))
    }

    #[test]
    fn test_open_ground_is_straight() {
        let path = find_path(Vec2::new(10.0, 10.0), Vec2::new(210.0, 10.0), &[], &params());
        assert_eq!(path, vec![Vec2::new(10.0, 10.0), Vec2::new(210.0, 10.0)]);
    }

    #[test]
    fn test_same_cell_is_single_waypoint() {
        let path = find_path(Vec2::new(3.0, 4.0), Vec2::new(17.0, 15.0), &[], &params());
        assert_eq!(path, vec![Vec2::new(10.0, 10.0)]);
    }

    #[test]
    fn test_routes_around_wall() {
        let wall = [Rect::new(100.0, 0.0, 20.0, 200.0)];
        let path = find_path(Vec2::new(50.0, 50.0), Vec2::new(170.0, 50.0), &wall, &params());
        assert!(path.len() > 2);
        assert_eq!(path.first().copied(), Some(Vec2::new(50.0, 50.0)));
        assert_eq!(path.last().copied(), Some(Vec2::new(170.0, 50.0)));
        for p in &path {
            assert!(!point_blocked(*p, &wall));
        }
        // Detours past one end of the wall
        assert!(path.iter().any(|p| p.y < 0.0 || p.y > 200.0));
    }

    #[test]
    fn test_goal_near_wall_is_reachable() {
        // Goal cell center (110, 50) only lies inside the wall's padding
        let wall = [Rect::new(112.0, 0.0, 20.0, 200.0)];
        let path = find_path(Vec2::new(30.0, 50.0), Vec2::new(101.0, 50.0), &wall, &params());
        assert_eq!(path, vec![Vec2::new(30.0, 50.0), Vec2::new(110.0, 50.0)]);
    }

    #[test]
    fn test_enclosed_goal_falls_back_to_direct() {
        let ring = [
            Rect::new(400.0, 400.0, 200.0, 20.0),
            Rect::new(400.0, 580.0, 200.0, 20.0),
            Rect::new(400.0, 400.0, 20.0, 200.0),
            Rect::new(580.0, 400.0, 20.0, 200.0),
        ];
        let start = Vec2::new(100.0, 100.0);
        let end = Vec2::new(500.0, 500.0);
        assert_eq!(find_path(start, end, &ring, &params()), vec![start, end]);
    }

    #[test]
    fn test_deterministic() {
        let obstacles = [
            Rect::new(200.0, 100.0, 40.0, 300.0),
            Rect::new(300.0, 250.0, 200.0, 30.0),
        ];
        let a = find_path(Vec2::new(50.0, 300.0), Vec2::new(600.0, 320.0), &obstacles, &params());
        let b = find_path(Vec2::new(50.0, 300.0), Vec2::new(600.0, 320.0), &obstacles, &params());
        assert_eq!(a, b);
    }

    #[test]
    fn test_simplify_keeps_turns() {
        let path = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(20.0, 10.0),
            Vec2::new(20.0, 20.0),
        ];
        assert_eq!(
            simplify_path(&path, 0.95),
            vec![Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0), Vec2::new(20.0, 20.0)]
        );
    }
}
