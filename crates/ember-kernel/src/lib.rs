//! # Ember Kernel
//!
//! Particle simulation core.
//!
//! This crate provides:
//! - Emitter operations that resolve every particle property at emission and
//!   per tick (static, random set, min/max, eased start/end, stepped, custom)
//! - A pooled particle store that recycles dead particles
//! - Emission zones, death zones and collision bounds
//! - Inverse-square gravity wells
//! - Emitters with flow and explode scheduling, and a manager that steps them
//!
//! ## Update order
//!
//! Every emitter update integrates all alive particles, culls the dead ones
//! (death callback, then recycle), and only then emits new particles. New
//! particles are therefore never integrated on the tick they are born.
//!
//! ## Configuration
//!
//! Emitters and wells load from JSON property bags. Loading is best effort:
//! unknown keys are ignored, malformed sub-objects are skipped with a
//! warning, and [`Emitter::describe`] writes a bag that reloads to an
//! equivalent emitter.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
pub mod ease;
pub mod emitter;
pub mod frames;
pub mod gravity_well;
pub mod manager;
pub mod ops;
pub mod particle;
pub mod pool;
pub mod shape;
pub mod zone;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ease::*;
    pub use crate::emitter::*;
    pub use crate::frames::*;
    pub use crate::gravity_well::*;
    pub use crate::manager::*;
    pub use crate::ops::*;
    pub use crate::particle::*;
    pub use crate::pool::*;
    pub use crate::shape::*;
    pub use crate::zone::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use ember_common::Vec2;
    use serde_json::json;

    #[test]
    fn test_instance_size() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), ParticleInstance::SIZE);
    }

    #[test]
    fn test_fountain_scene() {
        let mut manager = EmitterManager::new();
        let id = manager.create_emitter(&json!({
            "x": 400,
            "y": 300,
            "speedY": {"min": -400, "max": -300},
            "speedX": {"min": -50, "max": 50},
            "gravityY": 600,
            "lifespan": 1500,
            "frequency": 20,
            "alpha": {"start": 1, "end": 0},
            "bounds": {"x": 0, "y": 0, "width": 800, "height": 600},
            "bounce": 0.4,
            "seed": 1,
        }));
        manager.add_well(GravityWell::new(Vec2::new(400.0, 100.0), 2.0, 50.0, 50.0));
        for frame in 0..120 {
            manager.update(f64::from(frame) * 16.0, 16.0);
        }
        let Some(emitter) = manager.emitter(id) else {
            panic!("emitter missing");
        };
        assert!(emitter.alive_count() > 0);
        emitter.for_each_alive(|particle| {
            assert!((0.0..=800.0).contains(&particle.position.x));
            assert!((0.0..=600.0).contains(&particle.position.y));
            assert!((0.0..=1.0).contains(&particle.alpha));
            assert!(particle.life_remaining > 0.0 && particle.life_remaining <= particle.lifespan);
        });
    }
}
