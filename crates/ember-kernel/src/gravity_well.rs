//! Point attractors.
//!
//! A well pulls particles with an inverse-square falloff:
//!
//! ```text
//! factor = power * gravity / max(d², epsilon²)
//! dv     = (well - particle) / d * factor * delta_ms
//! ```
//!
//! Clamping the squared distance to `epsilon²` keeps particles passing
//! close to the well from being flung away. Negative power repels.

use ember_common::{ConfigError, Vec2};
use serde_json::Value;

use crate::config::{read_bool, read_f32};

/// An inverse-square point attractor.
#[derive(Debug, Clone, PartialEq)]
pub struct GravityWell {
    /// Well position
    pub position: Vec2,
    /// Whether the well affects particles
    pub active: bool,
    power: f32,
    epsilon_sq: f32,
    gravity: f32,
}

impl Default for GravityWell {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 0.0, 100.0, 50.0)
    }
}

impl GravityWell {
    /// Creates an active well.
    #[must_use]
    pub fn new(position: Vec2, power: f32, epsilon: f32, gravity: f32) -> Self {
        Self {
            position,
            active: true,
            power,
            epsilon_sq: epsilon * epsilon,
            gravity,
        }
    }

    /// Strength multiplier.
    #[must_use]
    pub const fn power(&self) -> f32 {
        self.power
    }

    /// Sets the strength multiplier.
    pub fn set_power(&mut self, power: f32) {
        self.power = power;
    }

    /// Minimum effective distance.
    #[must_use]
    pub fn epsilon(&self) -> f32 {
        self.epsilon_sq.sqrt()
    }

    /// Sets the minimum effective distance; stored squared.
    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon_sq = epsilon * epsilon;
    }

    /// Gravitational constant.
    #[must_use]
    pub const fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Sets the gravitational constant.
    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    /// Velocity change for a particle at `position` over `delta_ms`.
    /// Inactive wells and particles exactly on the well are unaffected.
    #[must_use]
    pub fn velocity_delta(&self, position: Vec2, delta_ms: f32) -> Vec2 {
        if !self.active {
            return Vec2::ZERO;
        }
        let offset = self.position - position;
        let distance_sq = offset.length_squared();
        if distance_sq <= 0.0 {
            return Vec2::ZERO;
        }
        let distance = distance_sq.sqrt();
        let factor = self.power * self.gravity / distance_sq.max(self.epsilon_sq);
        offset * (factor * delta_ms / distance)
    }

    /// Parses `{"x", "y", "power", "epsilon", "gravity", "active"}`.
    /// Missing fields take their defaults.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        if !value.is_object() {
            return Err(ConfigError::UnexpectedType {
                key: "well".into(),
                expected: "object",
            });
        }
        let defaults = Self::default();
        let mut well = Self::new(
            Vec2::new(
                read_f32(value, "x").unwrap_or(0.0),
                read_f32(value, "y").unwrap_or(0.0),
            ),
            read_f32(value, "power").unwrap_or(defaults.power),
            read_f32(value, "epsilon").unwrap_or_else(|| defaults.epsilon()),
            read_f32(value, "gravity").unwrap_or(defaults.gravity),
        );
        well.active = read_bool(value, "active").unwrap_or(true);
        Ok(well)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let well = GravityWell::default();
        assert_eq!(well.power(), 0.0);
        assert_eq!(well.epsilon(), 100.0);
        assert_eq!(well.gravity(), 50.0);
        assert!(well.active);
        assert_eq!(well.velocity_delta(Vec2::new(10.0, 0.0), 16.0), Vec2::ZERO);
    }

    #[test]
    fn test_pulls_toward_well() {
        let well = GravityWell::new(Vec2::ZERO, 1.0, 10.0, 50.0);
        let delta = well.velocity_delta(Vec2::new(200.0, 0.0), 16.0);
        assert!(delta.x < 0.0);
        assert_eq!(delta.y, 0.0);
        // 1 * 50 / 40000 * 16 = 0.02
        assert!((delta.x + 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_epsilon_caps_close_range_pull() {
        let well = GravityWell::new(Vec2::ZERO, 1.0, 100.0, 50.0);
        let near = well.velocity_delta(Vec2::new(1.0, 0.0), 16.0);
        let edge = well.velocity_delta(Vec2::new(100.0, 0.0), 16.0);
        assert!((near - edge).length() < 1e-6);
    }

    #[test]
    fn test_negative_power_repels() {
        let well = GravityWell::new(Vec2::ZERO, -2.0, 10.0, 50.0);
        assert!(well.velocity_delta(Vec2::new(50.0, 0.0), 16.0).x > 0.0);
    }

    #[test]
    fn test_coincident_particle_unaffected() {
        let well = GravityWell::new(Vec2::new(5.0, 5.0), 3.0, 10.0, 50.0);
        assert_eq!(well.velocity_delta(Vec2::new(5.0, 5.0), 16.0), Vec2::ZERO);
    }

    #[test]
    fn test_inactive_well() {
        let mut well = GravityWell::new(Vec2::ZERO, 3.0, 10.0, 50.0);
        well.active = false;
        assert_eq!(well.velocity_delta(Vec2::new(5.0, 5.0), 16.0), Vec2::ZERO);
    }

    #[test]
    fn test_from_value() {
        let well = GravityWell::from_value(&json!({"x": 400, "y": 300, "power": 4.2, "epsilon": 250}))
            .unwrap();
        assert_eq!(well.position, Vec2::new(400.0, 300.0));
        assert!((well.power() - 4.2).abs() < 1e-6);
        assert_eq!(well.epsilon(), 250.0);
        assert_eq!(well.gravity(), 50.0);
        assert!(GravityWell::from_value(&json!(3)).is_err());
    }
}
