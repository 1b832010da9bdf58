//! Declarative emitter configuration.
//!
//! Emitters load from and describe themselves as JSON property bags. Loading
//! is best effort: unknown keys are ignored and malformed sub-objects are
//! skipped with a warning, so a partly bad config still yields a working
//! emitter.
//!
//! Fast properties are copied verbatim. Op properties go through
//! [`EmitterOp::load_config`](crate::ops::EmitterOp::load_config), with a few
//! shorthands:
//!
//! - `speed` drives both axes (`speedY` is disabled and mirrors `speedX`),
//! - any of `speedX`, `speedY`, `moveToX`, `moveToY` switches to point
//!   emission unless `radial` is given explicitly, and `moveToX`/`moveToY`
//!   switch on move-to mode,
//! - `scale` drives both axes (`scaleY` is disabled and mirrors `scaleX`).
//!
//! Callbacks, follow targets and particle classes cannot be expressed in
//! JSON and are attached in code.

use ember_common::{ConfigError, Vec2};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::emitter::{BlendMode, Emitter};
use crate::frames::FrameRegistry;
use crate::ops::{OpConfig, OpKey};
use crate::zone::{Bounds, DeathZone, EmitZone};

/// Reads a numeric property.
pub(crate) fn read_f32(value: &Value, key: &str) -> Option<f32> {
    value.get(key).and_then(Value::as_f64).map(|v| v as f32)
}

/// Reads a boolean property.
pub(crate) fn read_bool(value: &Value, key: &str) -> Option<bool> {
    value.get(key).and_then(Value::as_bool)
}

/// Reads a string property.
pub(crate) fn read_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Reads a non-negative count.
pub(crate) fn read_usize(value: &Value, key: &str) -> Option<usize> {
    read_f32(value, key).map(|v| v.max(0.0) as usize)
}

/// Keys that can only be set in code.
const CODE_ONLY: [&str; 4] = ["follow", "emitCallback", "deathCallback", "particleClass"];

/// Names and selection mode parsed from a `frame` or `anim` property.
#[derive(Debug, Clone, PartialEq)]
struct HandleConfig {
    names: Vec<String>,
    random: bool,
    quantity: u32,
}

impl HandleConfig {
    fn from_value(value: &Value, list_key: &str) -> Option<Self> {
        let name_of = |item: &Value| match item {
            Value::String(name) => Some(name.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        };
        match value {
            Value::Array(items) => Some(Self {
                names: items.iter().filter_map(name_of).collect(),
                random: true,
                quantity: 1,
            }),
            Value::Object(_) => {
                let list = value.get(list_key)?;
                let names = match list {
                    Value::Array(items) => items.iter().filter_map(name_of).collect(),
                    single => vec![name_of(single)?],
                };
                Some(Self {
                    names,
                    random: !read_bool(value, "cycle").unwrap_or(false),
                    quantity: read_f32(value, "quantity").map_or(1, |q| q.max(1.0) as u32),
                })
            },
            single => Some(Self {
                names: vec![name_of(single)?],
                random: true,
                quantity: 1,
            }),
        }
    }
}

fn read_follow_offset(value: &Value) -> Result<Vec2, ConfigError> {
    if !value.is_object() {
        return Err(ConfigError::UnexpectedType {
            key: "followOffset".into(),
            expected: "object with x and y",
        });
    }
    Ok(Vec2::new(
        read_f32(value, "x").unwrap_or(0.0),
        read_f32(value, "y").unwrap_or(0.0),
    ))
}

impl Emitter {
    /// Builds an emitter from a property bag.
    pub fn from_config(props: &Value, registry: &dyn FrameRegistry) -> Self {
        let mut emitter = Self::new();
        emitter.apply_config(props, registry);
        emitter
    }

    /// Applies a property bag on top of the current state.
    pub fn apply_config(&mut self, props: &Value, registry: &dyn FrameRegistry) {
        if !props.is_object() {
            warn!("Emitter config must be an object, got {props}");
            return;
        }
        self.apply_fast_properties(props);
        self.apply_op_properties(props);

        if let Some(bounds) = props.get("bounds") {
            match Bounds::rect_from_value(bounds) {
                Ok(rect) => self.bounds = Some(rect),
                Err(err) => warn!("Ignoring bounds: {err}"),
            }
        }
        if let Some(zone) = props.get("emitZone") {
            match EmitZone::from_value(zone) {
                Ok(zone) => self.emit_zone = Some(zone),
                Err(err) => warn!("Ignoring emitZone: {err}"),
            }
        }
        if let Some(zone) = props.get("deathZone") {
            match DeathZone::from_value(zone) {
                Ok(zone) => self.death_zone = Some(zone),
                Err(err) => warn!("Ignoring deathZone: {err}"),
            }
        }
        if let Some(frame) = props.get("frame") {
            match HandleConfig::from_value(frame, "frames") {
                Some(config) => {
                    let handles = config
                        .names
                        .iter()
                        .map(|name| registry.frame_or_default(name))
                        .collect();
                    self.set_frames(handles, config.random, config.quantity);
                },
                None => warn!("Ignoring frame config {frame}"),
            }
        }
        if let Some(anim) = props.get("anim") {
            match HandleConfig::from_value(anim, "anims") {
                Some(config) => {
                    let handles = config
                        .names
                        .iter()
                        .map(|name| registry.anim_or_default(name))
                        .collect();
                    self.set_anims(handles, config.random, config.quantity);
                },
                None => warn!("Ignoring anim config {anim}"),
            }
        }
        if let Some(seed) = props.get("seed").and_then(Value::as_u64) {
            self.set_seed(seed);
        }
        if let Some(count) = read_usize(props, "reserve") {
            self.reserve(count);
        }
        for key in CODE_ONLY {
            if props.get(key).is_some() {
                debug!("`{key}` can only be set in code, ignoring");
            }
        }
    }

    fn apply_fast_properties(&mut self, props: &Value) {
        let flag = |key: &str, target: &mut bool| {
            if let Some(value) = read_bool(props, key) {
                *target = value;
            }
        };
        flag("active", &mut self.active);
        flag("on", &mut self.on);
        flag("particleBringToTop", &mut self.particle_bring_to_top);
        flag("radial", &mut self.radial);
        flag("trackVisible", &mut self.track_visible);
        flag("visible", &mut self.visible);
        flag("collideLeft", &mut self.collide.left);
        flag("collideRight", &mut self.collide.right);
        flag("collideTop", &mut self.collide.top);
        flag("collideBottom", &mut self.collide.bottom);

        if let Some(frequency) = read_f32(props, "frequency") {
            self.frequency = frequency;
        }
        if let Some(max) = read_usize(props, "maxParticles") {
            self.max_particles = max;
        }
        if let Some(max) = read_usize(props, "maxAliveParticles") {
            self.max_alive_particles = max;
        }
        if let Some(time_scale) = read_f32(props, "timeScale") {
            self.time_scale = time_scale;
        }
        if let Some(x) = read_f32(props, "gravityX") {
            self.gravity.x = x;
        }
        if let Some(y) = read_f32(props, "gravityY") {
            self.gravity.y = y;
        }
        if let Some(name) = read_str(props, "name") {
            self.name = name.to_owned();
        }
        if let Some(mode) = props.get("blendMode") {
            match BlendMode::from_value(mode) {
                Some(mode) => self.blend_mode = mode,
                None => warn!("Unknown blend mode {mode}, keeping {}", self.blend_mode.name()),
            }
        }
        if let Some(offset) = props.get("followOffset") {
            match read_follow_offset(offset) {
                Ok(offset) => self.follow_offset = offset,
                Err(err) => warn!("Ignoring followOffset: {err}"),
            }
        }
    }

    fn apply_op_properties(&mut self, props: &Value) {
        for key in OpKey::ALL {
            self.ops[key].load_config(props, None);
        }

        if self.ops[OpKey::SpeedX].load_config(props, Some("speed")) {
            self.ops[OpKey::SpeedY].set_active(false);
        }
        let has = |key: &str| props.get(key).is_some();
        if ["speedX", "speedY", "moveToX", "moveToY"].into_iter().any(has) && !has("radial") {
            self.radial = false;
        }
        if has("moveToX") || has("moveToY") {
            self.move_to = true;
        }
        if self.ops[OpKey::ScaleX].load_config(props, Some("scale")) {
            self.ops[OpKey::ScaleY].set_active(false);
        }
    }

    /// Serializes the emitter into a property bag that reloads to an
    /// equivalent emitter.
    ///
    /// Emit and death zones, frames and animations are not included: zones
    /// may wrap code-only sources and frames are stored as registry handles,
    /// not names. Reapply them after reloading.
    #[must_use]
    pub fn describe(&self) -> Value {
        let mut out = Map::new();
        out.insert("active".into(), json!(self.active));
        out.insert("blendMode".into(), json!(self.blend_mode.name()));
        out.insert("frequency".into(), json!(self.frequency));
        out.insert("maxParticles".into(), json!(self.max_particles));
        out.insert("maxAliveParticles".into(), json!(self.max_alive_particles));
        out.insert("name".into(), json!(self.name));
        out.insert("on".into(), json!(self.on));
        out.insert("particleBringToTop".into(), json!(self.particle_bring_to_top));
        out.insert("radial".into(), json!(self.radial));
        out.insert("timeScale".into(), json!(self.time_scale));
        out.insert("trackVisible".into(), json!(self.track_visible));
        out.insert("visible".into(), json!(self.visible));
        out.insert("collideLeft".into(), json!(self.collide.left));
        out.insert("collideRight".into(), json!(self.collide.right));
        out.insert("collideTop".into(), json!(self.collide.top));
        out.insert("collideBottom".into(), json!(self.collide.bottom));
        out.insert("gravityX".into(), json!(self.gravity.x));
        out.insert("gravityY".into(), json!(self.gravity.y));
        out.insert(
            "followOffset".into(),
            json!({ "x": self.follow_offset.x, "y": self.follow_offset.y }),
        );

        for op in self.ops.iter() {
            let key = op.key();
            let skip = match key {
                OpKey::SpeedX | OpKey::SpeedY => !self.ops[OpKey::SpeedY].is_active(),
                OpKey::ScaleX | OpKey::ScaleY => self.collapses_scale(),
                OpKey::MoveToX | OpKey::MoveToY => !self.move_to,
                _ => false,
            };
            if !skip {
                out.insert(key.name().into(), op.describe());
            }
        }
        if !self.ops[OpKey::SpeedY].is_active() {
            out.insert("speed".into(), self.ops[OpKey::SpeedX].describe());
        }
        if self.collapses_scale() {
            out.insert("scale".into(), self.ops[OpKey::ScaleX].describe());
        }

        if let Some(rect) = self.bounds {
            out.insert(
                "bounds".into(),
                json!({ "x": rect.x, "y": rect.y, "width": rect.width, "height": rect.height }),
            );
        }
        Value::Object(out)
    }

    fn collapses_scale(&self) -> bool {
        let (x, y) = (&self.ops[OpKey::ScaleX], &self.ops[OpKey::ScaleY]);
        !y.is_active()
            || matches!((x.config(), y.config()), (OpConfig::Static(a), OpConfig::Static(b)) if a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::FrameAtlas;
    use ember_common::{AnimHandle, FrameHandle};

    fn load(props: Value) -> Emitter {
        let mut emitter = Emitter::from_config(&props, &FrameAtlas::new());
        emitter.set_seed(9);
        emitter
    }

    #[test]
    fn test_fast_properties() {
        let emitter = load(json!({
            "frequency": 80,
            "maxParticles": 200,
            "maxAliveParticles": 50,
            "name": "sparks",
            "on": false,
            "particleBringToTop": false,
            "timeScale": 0.5,
            "gravityY": 300,
            "blendMode": "ADD",
            "collideTop": false,
            "followOffset": {"x": 4, "y": -2},
            "unknown": [1, 2, 3],
        }));
        assert_eq!(emitter.frequency(), 80.0);
        assert_eq!(emitter.max_particles, 200);
        assert_eq!(emitter.max_alive_particles, 50);
        assert_eq!(emitter.name(), "sparks");
        assert!(!emitter.is_on());
        assert!(!emitter.particle_bring_to_top);
        assert_eq!(emitter.time_scale(), 0.5);
        assert_eq!(emitter.gravity, Vec2::new(0.0, 300.0));
        assert_eq!(emitter.blend_mode(), BlendMode::Add);
        assert!(!emitter.collide.top && emitter.collide.left);
        assert_eq!(emitter.follow_offset, Vec2::new(4.0, -2.0));
    }

    #[test]
    fn test_speed_shorthand() {
        let emitter = load(json!({ "speed": {"min": 100, "max": 200} }));
        assert!(!emitter.op(OpKey::SpeedY).is_active());
        assert!(emitter.radial);
        assert!(matches!(emitter.op(OpKey::SpeedX).config(), OpConfig::MinMax { .. }));
    }

    #[test]
    fn test_axis_speed_switches_to_point_mode() {
        let emitter = load(json!({ "speedX": 10, "speedY": 20 }));
        assert!(!emitter.radial);
        assert!(!emitter.move_to);

        let emitter = load(json!({ "speedX": 10, "radial": true }));
        assert!(emitter.radial);

        let emitter = load(json!({ "moveToX": 100, "moveToY": 50 }));
        assert!(!emitter.radial);
        assert!(emitter.move_to);
    }

    #[test]
    fn test_scale_shorthand_mirrors() {
        let mut emitter = load(json!({ "scale": {"start": 1, "end": 0}, "on": false }));
        assert!(!emitter.op(OpKey::ScaleY).is_active());
        emitter.emit_particle(Some(1));
        emitter.update(500.0, &[]);
        emitter.for_each_alive(|particle| {
            assert!((particle.scale.x - 0.5).abs() < 1e-5);
            assert_eq!(particle.scale.x, particle.scale.y);
        });
    }

    #[test]
    fn test_unrecognized_op_uses_default() {
        let emitter = load(json!({ "lifespan": "forever" }));
        assert!(matches!(emitter.op(OpKey::Lifespan).config(), OpConfig::Static(v) if *v == 1000.0));
    }

    #[test]
    fn test_bad_sub_objects_are_skipped() {
        let emitter = load(json!({
            "bounds": {"x": 0},
            "emitZone": {"type": "random"},
            "deathZone": {"type": "onLeave", "source": {"type": "line", "x1": 0, "y1": 0, "x2": 1, "y2": 1}},
            "alpha": 0.5,
        }));
        assert!(emitter.bounds().is_none());
        assert!(emitter.emit_zone().is_none());
        assert!(emitter.death_zone().is_none());
        assert!(matches!(emitter.op(OpKey::Alpha).config(), OpConfig::Static(v) if *v == 0.5));
    }

    #[test]
    fn test_zones_and_bounds() {
        let emitter = load(json!({
            "bounds": {"x": 0, "y": 0, "width": 800, "height": 600},
            "emitZone": {"type": "edge", "source": {"type": "circle", "x": 0, "y": 0, "radius": 50}, "quantity": 12},
            "deathZone": {"type": "onEnter", "source": {"type": "rectangle", "x": 10, "y": 10, "width": 5, "height": 5}},
        }));
        assert_eq!(emitter.bounds().map(|b| b.width), Some(800.0));
        assert!(matches!(emitter.emit_zone(), Some(EmitZone::Edge(zone)) if zone.points().len() == 12));
        assert!(emitter.death_zone().is_some_and(|zone| zone.kill_on_enter()));
    }

    #[test]
    fn test_frames_resolve_through_registry() {
        let mut atlas = FrameAtlas::new();
        let red = atlas.add_frame("red");
        let blue = atlas.add_frame("blue");
        let spin = atlas.add_anim("spin");
        let emitter = Emitter::from_config(
            &json!({
                "frame": {"frames": ["red", "blue", "green"], "cycle": true, "quantity": 2},
                "anim": ["spin", "walk"],
            }),
            &atlas,
        );
        assert_eq!(emitter.frames(), &[red, blue, FrameHandle::DEFAULT]);
        assert!(!emitter.frames.is_random());
        assert_eq!(emitter.frames.quantity(), 2);
        assert_eq!(emitter.anims.handles(), &[spin, AnimHandle::DEFAULT]);
    }

    #[test]
    fn test_reserve_and_seed() {
        let emitter = load(json!({ "reserve": 25 }));
        assert_eq!(emitter.dead_count(), 25);

        let positions = |seed: u64| {
            let mut emitter = load(json!({ "seed": seed, "x": {"min": 0, "max": 500}, "on": false }));
            emitter.apply_config(&json!({ "seed": seed }), &FrameAtlas::new());
            emitter.emit_particle(Some(4));
            emitter.alive().map(|p| p.position.x).collect::<Vec<_>>()
        };
        assert_eq!(positions(3), positions(3));
    }

    #[test]
    fn test_describe_collapses_shorthands() {
        let emitter = load(json!({ "speed": 150, "scale": 2 }));
        let described = emitter.describe();
        assert_eq!(described["speed"], json!(150.0));
        assert_eq!(described["scale"], json!(2.0));
        assert!(described.get("speedX").is_none());
        assert!(described.get("scaleX").is_none());
    }

    #[test]
    fn test_describe_leaves_out_zones_and_frames() {
        let mut atlas = FrameAtlas::new();
        atlas.add_frame("red");
        let emitter = Emitter::from_config(
            &json!({
                "frame": "red",
                "emitZone": {"type": "random", "source": {"type": "circle", "x": 0, "y": 0, "radius": 10}},
                "bounds": {"x": 0, "y": 0, "width": 50, "height": 50},
            }),
            &atlas,
        );
        assert!(emitter.emit_zone().is_some());
        let described = emitter.describe();
        for key in ["emitZone", "deathZone", "frame", "anim"] {
            assert!(described.get(key).is_none(), "{key} was described");
        }
        assert!(described.get("bounds").is_some());
        assert!(described.get("moveToX").is_none());
    }

    #[test]
    fn test_describe_round_trip() {
        let emitter = load(json!({
            "name": "smoke",
            "frequency": 40,
            "speedX": {"min": -20, "max": 20},
            "speedY": -60,
            "scaleX": {"start": 0.5, "end": 2, "ease": "Quad.easeOut"},
            "scaleY": 1,
            "alpha": {"start": 1, "end": 0},
            "tint": [16711680, 65280],
            "lifespan": 2000,
            "gravityY": -10,
            "bounds": {"x": 0, "y": 0, "width": 100, "height": 100},
        }));
        let described = emitter.describe();
        let reloaded = Emitter::from_config(&described, &FrameAtlas::new());
        assert_eq!(reloaded.describe(), described);
        assert!(!reloaded.radial);
    }

    #[test]
    fn test_non_object_config_is_ignored() {
        let emitter = load(json!("nope"));
        assert_eq!(emitter.frequency(), 0.0);
        assert!(emitter.is_on());
    }
}
