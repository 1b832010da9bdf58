//! # Ember Common
//!
//! Common types, utilities, and shared abstractions for Project Ember.
//!
//! This crate provides foundational types used across all Ember subsystems:
//! - Geometry (`Vec2`, `Rect`)
//! - ID and handle types (EmitterId, WellId, FrameHandle, AnimHandle)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod geom;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::geom::*;
    pub use crate::ids::*;
}

pub use prelude::*;
