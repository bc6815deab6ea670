//! Shared entity records
//!
//! Components every actor is built from: a circular body, clamped health,
//! a countdown cooldown, plus the two world fixtures (obstacles and traps).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{Rect, circles_overlap};

/// Circular body. `pos` is the center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub radius: f32,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self { pos, radius }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::splat(self.radius * 2.0)
    }

    /// Axis-aligned bounding square
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::splat(self.radius))
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        circles_overlap(self.pos, self.radius, other.pos, other.radius)
    }
}

/// Hit points, always within `0..=max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HealthRecord")]
pub struct Health {
    current: i32,
    max: i32,
}

/// Unchecked wire form of [`Health`]
#[derive(Deserialize)]
struct HealthRecord {
    current: i32,
    max: i32,
}

impl TryFrom<HealthRecord> for Health {
    type Error = &'static str;

    fn try_from(record: HealthRecord) -> Result<Self, Self::Error> {
        if record.max < 1 {
            return Err("health max must be at least 1");
        }
        if !(0..=record.max).contains(&record.current) {
            return Err("health current must lie within 0..=max");
        }
        Ok(Self {
            current: record.current,
            max: record.max,
        })
    }
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    #[inline]
    pub fn current(&self) -> i32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> i32 {
        self.max
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    /// Remove up to `amount` hit points, returning how many were removed.
    /// Negative amounts are rejected.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        if amount <= 0 {
            return 0;
        }
        let applied = amount.min(self.current);
        self.current -= applied;
        applied
    }

    /// Restore up to `amount` hit points, returning how many were restored
    pub fn heal(&mut self, amount: i32) -> i32 {
        if amount <= 0 {
            return 0;
        }
        let applied = amount.min(self.max - self.current);
        self.current += applied;
        applied
    }

    pub fn heal_full(&mut self) {
        self.current = self.max;
    }

    /// Change the maximum (at least 1), trimming current health if needed
    pub fn set_max(&mut self, max: i32) {
        self.max = max.max(1);
        self.current = self.current.min(self.max);
    }
}

/// Countdown timer that is ready at zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    pub remaining: f32,
    pub max: f32,
}

impl Cooldown {
    /// A cooldown that starts ready
    pub fn ready(max: f32) -> Self {
        Self { remaining: 0.0, max }
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn reset(&mut self) {
        self.remaining = self.max;
    }

    /// 0.0 right after a reset, 1.0 when ready
    pub fn progress(&self) -> f32 {
        if self.max <= 0.0 {
            1.0
        } else {
            1.0 - (self.remaining / self.max).clamp(0.0, 1.0)
        }
    }
}

/// Static world blocker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub rect: Rect,
    /// Damage dealt to an enemy knocked into this obstacle
    pub collision_damage: i32,
}

/// Player-placed hazard with a re-arm cooldown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trap {
    pub id: u32,
    pub body: Body,
    pub damage: i32,
    /// Seconds before the trap re-arms
    pub cooldown: f64,
    pub last_activation: Option<f64>,
    pub active: bool,
}

impl Trap {
    pub fn new(id: u32, pos: Vec2, radius: f32, damage: i32, cooldown: f64) -> Self {
        Self {
            id,
            body: Body::new(pos, radius),
            damage,
            cooldown,
            last_activation: None,
            active: true,
        }
    }

    /// Re-arm once the cooldown since the last activation has passed
    pub fn update(&mut self, now: f64) {
        if self.active {
            return;
        }
        match self.last_activation {
            Some(last) if now - last < self.cooldown => {}
            _ => self.active = true,
        }
    }

    /// Fire the trap if armed. Returns whether it fired.
    pub fn try_trigger(&mut self, now: f64) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.last_activation = Some(now);
        true
    }

    /// 0.0 right after firing, 1.0 when armed
    pub fn rearm_progress(&self, now: f64) -> f32 {
        match self.last_activation {
            _ if self.active => 1.0,
            Some(last) if self.cooldown > 0.0 => ((now - last) / self.cooldown).clamp(0.0, 1.0) as f32,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_negative_damage_rejected() {
        let mut hp = Health::new(3);
        assert_eq!(hp.take_damage(-5), 0);
        assert_eq!(hp.current(), 3);
        assert_eq!(hp.heal(-1), 0);
    }

    #[test]
    fn test_damage_reports_applied_amount() {
        let mut hp = Health::new(3);
        assert_eq!(hp.take_damage(2), 2);
        assert_eq!(hp.take_damage(5), 1);
        assert!(!hp.is_alive());
        assert_eq!(hp.take_damage(1), 0);
    }

    #[test]
    fn test_set_max_trims_current() {
        let mut hp = Health::new(5);
        hp.set_max(2);
        assert_eq!(hp.current(), 2);
        hp.set_max(4);
        assert_eq!(hp.current(), 2);
        assert_eq!(hp.max(), 4);
        hp.set_max(0);
        assert_eq!(hp.max(), 1);
    }

    #[test]
    fn test_health_json_is_checked() {
        let hp: Health = serde_json::from_str(r#"{ "current": 2, "max": 3 }"#).unwrap();
        assert_eq!((hp.current(), hp.max()), (2, 3));
        assert!(serde_json::from_str::<Health>(r#"{ "current": 5, "max": 3 }"#).is_err());
        assert!(serde_json::from_str::<Health>(r#"{ "current": -1, "max": 3 }"#).is_err());
        assert!(serde_json::from_str::<Health>(r#"{ "current": 0, "max": 0 }"#).is_err());
    }

    #[test]
    fn test_cooldown_counts_down() {
        let mut cd = Cooldown::ready(1.0);
        assert!(cd.is_ready());
        cd.reset();
        assert!(!cd.is_ready());
        cd.tick(0.6);
        assert!((cd.progress() - 0.6).abs() < 1e-5);
        cd.tick(0.6);
        assert!(cd.is_ready());
        assert_eq!(cd.remaining, 0.0);
    }

    #[test]
    fn test_trap_rearms_after_cooldown() {
        let mut trap = Trap::new(1, Vec2::ZERO, 20.0, 1, 2.0);
        assert!(trap.try_trigger(10.0));
        assert!(!trap.try_trigger(10.5));

        trap.update(11.9);
        assert!(!trap.active);
        trap.update(12.0);
        assert!(trap.active);
        assert!(trap.try_trigger(12.0));
        assert_eq!(trap.last_activation, Some(12.0));
    }

    #[test]
    fn test_body_bounds() {
        let body = Body::new(Vec2::new(50.0, 60.0), 10.0);
        assert_eq!(body.bounds(), Rect::new(40.0, 50.0, 20.0, 20.0));
        assert_eq!(body.size(), Vec2::splat(20.0));
    }

    proptest! {
        #[test]
        fn prop_health_stays_clamped(
            max in 1i32..20,
            ops in proptest::collection::vec((any::<bool>(), -50i32..50), 0..40),
        ) {
            let mut hp = Health::new(max);
            for (damage, amount) in ops {
                if damage {
                    hp.take_damage(amount);
                } else {
                    hp.heal(amount);
                }
                prop_assert!(hp.current() >= 0);
                prop_assert!(hp.current() <= hp.max());
                prop_assert_eq!(hp.is_alive(), hp.current() > 0);
            }
        }
    }
}
