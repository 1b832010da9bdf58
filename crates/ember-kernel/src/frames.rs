//! Frame and animation name lookup.
//!
//! The simulation never touches textures; it only stores opaque handles.
//! A [`FrameRegistry`] turns the names used in configs into handles.

use ahash::AHashMap;
use ember_common::{AnimHandle, FrameHandle};
use tracing::warn;

/// Resolves frame and animation names to handles.
pub trait FrameRegistry {
    /// Handle for a texture frame, if the texture has it.
    fn frame(&self, name: &str) -> Option<FrameHandle>;

    /// Handle for an animation, if one is registered under `name`.
    fn anim(&self, name: &str) -> Option<AnimHandle>;

    /// Resolves `name`, warning and falling back to the base frame when the
    /// texture does not have it.
    fn frame_or_default(&self, name: &str) -> FrameHandle {
        self.frame(name).unwrap_or_else(|| {
            warn!("Frame `{name}` not found, using the base frame");
            FrameHandle::DEFAULT
        })
    }

    /// Resolves `name`, warning and falling back to the default animation
    /// when none is registered under it.
    fn anim_or_default(&self, name: &str) -> AnimHandle {
        self.anim(name).unwrap_or_else(|| {
            warn!("Animation `{name}` not found, using the default animation");
            AnimHandle::DEFAULT
        })
    }
}

/// In-memory registry that hands out sequential handles.
///
/// Handle 0 is reserved for the base frame and the default animation.
#[derive(Debug, Default, Clone)]
pub struct FrameAtlas {
    frames: AHashMap<String, FrameHandle>,
    anims: AHashMap<String, AnimHandle>,
}

impl FrameAtlas {
    /// Create an empty atlas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a frame, returning its handle. Re-registering a name
    /// returns the existing handle.
    pub fn add_frame(&mut self, name: impl Into<String>) -> FrameHandle {
        let next = FrameHandle::new(self.frames.len() as u32 + 1);
        *self.frames.entry(name.into()).or_insert(next)
    }

    /// Registers an animation, returning its handle.
    pub fn add_anim(&mut self, name: impl Into<String>) -> AnimHandle {
        let next = AnimHandle::new(self.anims.len() as u32 + 1);
        *self.anims.entry(name.into()).or_insert(next)
    }

    /// Number of registered frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Number of registered animations.
    #[must_use]
    pub fn anim_count(&self) -> usize {
        self.anims.len()
    }
}

impl FrameRegistry for FrameAtlas {
    fn frame(&self, name: &str) -> Option<FrameHandle> {
        self.frames.get(name).copied()
    }

    fn anim(&self, name: &str) -> Option<AnimHandle> {
        self.anims.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_stable() {
        let mut atlas = FrameAtlas::new();
        let red = atlas.add_frame("red");
        let blue = atlas.add_frame("blue");
        assert_ne!(red, blue);
        assert_ne!(red, FrameHandle::DEFAULT);
        assert_eq!(atlas.add_frame("red"), red);
        assert_eq!(atlas.frame_count(), 2);
        assert_eq!(atlas.frame("blue"), Some(blue));
    }

    #[test]
    fn test_unknown_frame_falls_back() {
        let atlas = FrameAtlas::new();
        assert_eq!(atlas.frame("missing"), None);
        assert_eq!(atlas.frame_or_default("missing"), FrameHandle::DEFAULT);
    }

    #[test]
    fn test_anims() {
        let mut atlas = FrameAtlas::new();
        let spin = atlas.add_anim("spin");
        assert_eq!(atlas.anim("spin"), Some(spin));
        assert_eq!(atlas.anim("walk"), None);
        assert_ne!(spin, AnimHandle::DEFAULT);
        assert_eq!(atlas.anim_or_default("walk"), AnimHandle::DEFAULT);
        assert_eq!(atlas.anim_count(), 1);
    }
}
