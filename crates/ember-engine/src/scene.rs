//! Scene files.
//!
//! A scene is a JSON document listing the frames and animations to register
//! and the emitter and gravity well property bags to build.

use ember_common::{EmberError, EmberResult};
use ember_kernel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Declarative scene contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Frame names to register, in handle order
    pub frames: Vec<String>,
    /// Animation names to register
    pub anims: Vec<String>,
    /// Emitter property bags
    pub emitters: Vec<Value>,
    /// Gravity well property bags
    pub wells: Vec<Value>,
}

impl Scene {
    /// Parse a scene from JSON text.
    pub fn parse(json: &str) -> EmberResult<Self> {
        let scene: Self = serde_json::from_str(json)?;
        if scene.emitters.iter().any(|props| !props.is_object()) {
            return Err(EmberError::Scene("every emitter entry must be an object".into()));
        }
        Ok(scene)
    }

    /// Load a scene file.
    pub fn load<P: AsRef<Path>>(path: P) -> EmberResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let scene = Self::parse(&contents)?;
        info!(
            path = %path.display(),
            emitters = scene.emitters.len(),
            wells = scene.wells.len(),
            "Scene loaded"
        );
        Ok(scene)
    }

    /// Builds a manager holding the scene. Emitters without their own
    /// `seed` get `base_seed + index` when a base seed is given.
    #[must_use]
    pub fn build(&self, base_seed: Option<u64>) -> EmitterManager {
        let mut atlas = FrameAtlas::new();
        for name in &self.frames {
            atlas.add_frame(name.as_str());
        }
        for name in &self.anims {
            atlas.add_anim(name.as_str());
        }

        let mut manager = EmitterManager::with_registry(atlas);
        for (index, props) in self.emitters.iter().enumerate() {
            let id = manager.create_emitter(props);
            let Some(base) = base_seed else { continue };
            if props.get("seed").is_none() {
                if let Some(emitter) = manager.emitter_mut(id) {
                    emitter.set_seed(base.wrapping_add(index as u64));
                }
            }
        }

        for (index, props) in self.wells.iter().enumerate() {
            match GravityWell::from_value(props) {
                Ok(well) => {
                    manager.add_well(well);
                },
                Err(e) => warn!(index, "Skipping gravity well: {e}"),
            }
        }
        manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_common::FrameHandle;
    use tempfile::TempDir;

    const SCENE: &str = r#"{
        "frames": ["spark", "smoke"],
        "emitters": [
            { "name": "sparks", "x": 100, "y": 100, "frame": ["spark", "smoke"], "quantity": 2 },
            { "name": "burst", "x": 0, "y": 0, "frequency": -1 }
        ],
        "wells": [
            { "x": 50, "y": 50, "power": 2 },
            "not a well"
        ]
    }"#;

    #[test]
    fn test_build_scene() {
        let scene = Scene::parse(SCENE).unwrap();
        let manager = scene.build(Some(7));
        assert_eq!(manager.emitter_count(), 2);
        assert_eq!(manager.well_count(), 1);

        let names: Vec<&str> = manager.emitters().map(|(_, e)| e.name()).collect();
        assert_eq!(names, ["sparks", "burst"]);

        let (_, sparks) = manager.emitters().next().unwrap();
        assert_eq!(sparks.frames().len(), 2);
        assert!(!sparks.frames().contains(&FrameHandle::DEFAULT));
    }

    #[test]
    fn test_base_seed_is_deterministic() {
        let scene = Scene::parse(SCENE).unwrap();
        let run = || {
            let mut manager = scene.build(Some(3));
            for frame in 0..10 {
                manager.update(f64::from(frame) * 16.0, 16.0);
            }
            manager
                .emitters()
                .flat_map(|(_, e)| e.alive().map(|p| (p.velocity.x, p.velocity.y)).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_rejects_non_object_emitters() {
        let result = Scene::parse(r#"{ "emitters": [1, 2] }"#);
        assert!(matches!(result, Err(EmberError::Scene(_))));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("scene.json");
        fs::write(&path, SCENE).unwrap();
        let scene = Scene::load(&path).unwrap();
        assert_eq!(scene.frames, ["spark", "smoke"]);

        assert!(matches!(
            Scene::load(temp_dir.path().join("missing.json")),
            Err(EmberError::Io(_))
        ));
    }
}
