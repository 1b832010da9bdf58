//! ID and handle types for emitters, wells and renderable frames.

use serde::{Deserialize, Serialize};

/// Identifier of an emitter owned by an emitter manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmitterId(u32);

impl EmitterId {
    /// Creates an emitter ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Identifier of a gravity well owned by an emitter manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WellId(u32);

impl WellId {
    /// Creates a well ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Opaque handle to a renderable texture frame.
///
/// Handles are produced by a frame registry; the simulation only stores and
/// cycles through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(u32);

impl FrameHandle {
    /// The texture's base frame.
    pub const DEFAULT: Self = Self(0);

    /// Creates a frame handle from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl Default for FrameHandle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Opaque handle to a frame animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimHandle(u32);

impl AnimHandle {
    /// Fallback animation for names the registry does not know.
    pub const DEFAULT: Self = Self(0);

    /// Creates an animation handle from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl Default for AnimHandle {
    fn default() -> Self {
        Self::DEFAULT
    }
}
