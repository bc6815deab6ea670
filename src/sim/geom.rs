//! Spatial primitives
//!
//! Circles are (center, radius) pairs, rectangles are axis-aligned with the
//! origin at the top-left corner. Every overlap test is strict so that two
//! shapes exactly touching never count as colliding.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Square of side `2 * half` centered on `center`
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            size: half * 2.0,
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Grow the rectangle by `pad` on every side
    pub fn expand(&self, pad: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(pad),
            size: self.size + Vec2::splat(pad * 2.0),
        }
    }

    /// Point on (or inside) the rectangle closest to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max())
    }

    /// Strict interior containment (points on the border are outside)
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x > self.min.x && p.x < max.x && p.y > self.min.y && p.y < max.y
    }

    /// Whether a circle of `radius` at `center` lies fully within the rect
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        let max = self.max();
        center.x - radius >= self.min.x
            && center.x + radius <= max.x
            && center.y - radius >= self.min.y
            && center.y + radius <= max.y
    }
}

/// Circle-circle overlap: strictly closer than the sum of radii
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}

/// Circle-rectangle overlap using the clamped closest point
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    center.distance_squared(rect.closest_point(center)) < radius * radius
}

/// Point-in-circle containment (inclusive, used for area effects)
#[inline]
pub fn circle_contains(center: Vec2, radius: f32, p: Vec2) -> bool {
    center.distance_squared(p) <= radius * radius
}
