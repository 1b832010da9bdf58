//! Emitter operations: per-property value resolution.
//!
//! Every animatable particle property is driven by one [`EmitterOp`]. The op
//! produces the property's value when a particle is fired and, for
//! properties that animate over a particle's life, re-evaluates it every
//! tick from the particle's normalized age.
//!
//! Ops are configured from a small literal grammar, normalized into
//! [`OpConfig`]:
//!
//! | literal | mode |
//! |---------|------|
//! | `1.5` | static |
//! | `[1, 2, 3]` | random pick from the set |
//! | `{"min": 0, "max": 1}` / `{"random": [0, 1]}` | random in range |
//! | `{"start": 1, "end": 0, "ease": "Quad.easeIn", "random": false}` | eased start/end |
//! | `{"start": 0, "end": 576, "steps": 32, "yoyo": true}` | stepped range |
//!
//! Custom callbacks are attached in code with [`OpConfig::custom`].

use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::config::{read_bool, read_f32};
use crate::ease::Ease;
use crate::particle::Particle;

/// Callback signature for custom ops: `(particle, key, t, value) -> value`.
pub type OpFn = Arc<dyn Fn(&Particle, OpKey, f32, f32) -> f32 + Send + Sync>;

/// The properties an emitter resolves through ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpKey {
    /// Spawn X offset
    X,
    /// Spawn Y offset
    Y,
    /// Horizontal acceleration (px/s²)
    AccelerationX,
    /// Vertical acceleration (px/s²)
    AccelerationY,
    /// Horizontal velocity cap (px/s)
    MaxVelocityX,
    /// Vertical velocity cap (px/s)
    MaxVelocityY,
    /// Horizontal launch speed (px/s)
    SpeedX,
    /// Vertical launch speed (px/s)
    SpeedY,
    /// Move-to target X
    MoveToX,
    /// Move-to target Y
    MoveToY,
    /// Bounce factor against bounds
    Bounce,
    /// Horizontal scale
    ScaleX,
    /// Vertical scale
    ScaleY,
    /// Tint color (0xRRGGBB)
    Tint,
    /// Opacity
    Alpha,
    /// Lifespan in milliseconds
    Lifespan,
    /// Launch angle in degrees (radial emitters)
    Angle,
    /// Particle rotation in degrees
    Rotate,
    /// Particles per emission
    Quantity,
    /// Delay before a fired particle starts updating (ms)
    Delay,
}

impl OpKey {
    /// Number of keys.
    pub const COUNT: usize = 20;

    /// Every key in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::X,
        Self::Y,
        Self::AccelerationX,
        Self::AccelerationY,
        Self::MaxVelocityX,
        Self::MaxVelocityY,
        Self::SpeedX,
        Self::SpeedY,
        Self::MoveToX,
        Self::MoveToY,
        Self::Bounce,
        Self::ScaleX,
        Self::ScaleY,
        Self::Tint,
        Self::Alpha,
        Self::Lifespan,
        Self::Angle,
        Self::Rotate,
        Self::Quantity,
        Self::Delay,
    ];

    /// Config property name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::AccelerationX => "accelerationX",
            Self::AccelerationY => "accelerationY",
            Self::MaxVelocityX => "maxVelocityX",
            Self::MaxVelocityY => "maxVelocityY",
            Self::SpeedX => "speedX",
            Self::SpeedY => "speedY",
            Self::MoveToX => "moveToX",
            Self::MoveToY => "moveToY",
            Self::Bounce => "bounce",
            Self::ScaleX => "scaleX",
            Self::ScaleY => "scaleY",
            Self::Tint => "tint",
            Self::Alpha => "alpha",
            Self::Lifespan => "lifespan",
            Self::Angle => "angle",
            Self::Rotate => "rotate",
            Self::Quantity => "quantity",
            Self::Delay => "delay",
        }
    }

    /// Index into per-key arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether the value is only resolved at emission and never animated.
    #[must_use]
    pub const fn emit_only(self) -> bool {
        !matches!(
            self,
            Self::ScaleX | Self::ScaleY | Self::Tint | Self::Alpha | Self::Rotate
        )
    }

    /// The configuration a fresh emitter starts with.
    #[must_use]
    pub fn default_config(self) -> OpConfig {
        match self {
            Self::MaxVelocityX | Self::MaxVelocityY => OpConfig::Static(10_000.0),
            Self::ScaleX | Self::ScaleY | Self::Alpha | Self::Quantity => OpConfig::Static(1.0),
            Self::Tint => OpConfig::Static(0x00ff_ffff as f32),
            Self::Lifespan => OpConfig::Static(1000.0),
            Self::Angle => OpConfig::MinMax {
                min: 0.0,
                max: 360.0,
            },
            _ => OpConfig::Static(0.0),
        }
    }

    /// The value a custom op without an `on_emit` callback emits.
    #[must_use]
    pub fn default_value(self) -> f32 {
        match self.default_config() {
            OpConfig::Static(value) => value,
            _ => 0.0,
        }
    }
}

impl fmt::Display for OpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalized op configuration.
#[derive(Clone)]
pub enum OpConfig {
    /// Same value at emission and every tick.
    Static(f32),
    /// Uniform pick from a non-empty set at emission.
    RandomSet(Vec<f32>),
    /// Uniform float in `[min, max)` at emission.
    MinMax {
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },
    /// Starts at `start` (or a random point in the range) and eases to `end`
    /// over the particle's life.
    StartEnd {
        /// Start value
        start: f32,
        /// End value
        end: f32,
        /// Easing applied to normalized age
        ease: Ease,
        /// Pick the starting value at random in `[start, end)`
        random: bool,
    },
    /// Walks `steps` evenly spaced values between `start` and `end`, one per
    /// emission, shared by every particle of the emitter.
    Stepped {
        /// First value
        start: f32,
        /// Range end (never emitted itself)
        end: f32,
        /// Number of values (at least 1)
        steps: u32,
        /// Reverse at the ends instead of wrapping
        yoyo: bool,
    },
    /// Caller-supplied callbacks. A missing callback falls back to emitting
    /// the key's default value and to leaving the value unchanged per tick.
    Custom {
        /// Called at emission
        on_emit: Option<OpFn>,
        /// Called every tick
        on_update: Option<OpFn>,
    },
}

impl OpConfig {
    /// Builds a custom op from optional callbacks.
    pub fn custom<E, U>(on_emit: Option<E>, on_update: Option<U>) -> Self
    where
        E: Fn(&Particle, OpKey, f32, f32) -> f32 + Send + Sync + 'static,
        U: Fn(&Particle, OpKey, f32, f32) -> f32 + Send + Sync + 'static,
    {
        Self::Custom {
            on_emit: on_emit.map(|f| Arc::new(f) as OpFn),
            on_update: on_update.map(|f| Arc::new(f) as OpFn),
        }
    }

    /// Parses one literal from the op grammar. Returns `None` for shapes
    /// the grammar does not recognise.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_f64().map(|v| Self::Static(v as f32)),
            Value::Array(items) => {
                let set: Vec<f32> = items
                    .iter()
                    .filter_map(Value::as_f64)
                    .map(|v| v as f32)
                    .collect();
                (!set.is_empty()).then_some(Self::RandomSet(set))
            },
            Value::Object(_) => Self::from_object(value),
            _ => None,
        }
    }

    fn from_object(value: &Value) -> Option<Self> {
        if let Some(range) = value.get("random").and_then(Value::as_array) {
            let bound = |i: usize| range.get(i).and_then(Value::as_f64);
            if let (Some(min), Some(max)) = (bound(0), bound(1)) {
                return Some(Self::MinMax {
                    min: min as f32,
                    max: max as f32,
                });
            }
        }

        if let (Some(start), Some(end)) = (read_f32(value, "start"), read_f32(value, "end")) {
            if let Some(steps) = value.get("steps").and_then(Value::as_f64) {
                return Some(Self::Stepped {
                    start,
                    end,
                    steps: steps.max(1.0) as u32,
                    yoyo: read_bool(value, "yoyo").unwrap_or(false),
                });
            }
            let params: Vec<f32> = value
                .get("easeParams")
                .and_then(Value::as_array)
                .map(|p| p.iter().filter_map(Value::as_f64).map(|v| v as f32).collect())
                .unwrap_or_default();
            let ease = match value.get("ease").and_then(Value::as_str) {
                Some(name) => Ease::from_name(name, &params).unwrap_or_else(|| {
                    warn!("Unknown ease `{name}`, using Linear");
                    Ease::Linear
                }),
                None => Ease::Linear,
            };
            return Some(Self::StartEnd {
                start,
                end,
                ease,
                random: read_bool(value, "random").unwrap_or(false),
            });
        }

        if let (Some(min), Some(max)) = (read_f32(value, "min"), read_f32(value, "max")) {
            return Some(Self::MinMax { min, max });
        }

        None
    }

    /// Serializes back into the literal grammar. Custom ops cannot carry
    /// their callbacks, so they describe as the key's default value.
    #[must_use]
    pub fn describe(&self, key: OpKey) -> Value {
        match self {
            Self::Static(value) => json!(value),
            Self::RandomSet(set) => json!(set),
            Self::MinMax { min, max } => json!({ "min": min, "max": max }),
            Self::StartEnd {
                start,
                end,
                ease,
                random,
            } => {
                let mut object = Map::new();
                object.insert("start".into(), json!(start));
                object.insert("end".into(), json!(end));
                object.insert("ease".into(), json!(ease.to_string()));
                let params = ease.params();
                if !params.is_empty() {
                    object.insert("easeParams".into(), json!(params));
                }
                if *random {
                    object.insert("random".into(), json!(true));
                }
                Value::Object(object)
            },
            Self::Stepped {
                start,
                end,
                steps,
                yoyo,
            } => json!({ "start": start, "end": end, "steps": steps, "yoyo": yoyo }),
            Self::Custom { .. } => json!(key.default_value()),
        }
    }

    /// Whether this op changes the value after emission.
    #[must_use]
    pub fn animates(&self) -> bool {
        match self {
            Self::StartEnd { .. } => true,
            Self::Custom { on_update, .. } => on_update.is_some(),
            _ => false,
        }
    }
}

impl fmt::Debug for OpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::RandomSet(set) => f.debug_tuple("RandomSet").field(set).finish(),
            Self::MinMax { min, max } => f
                .debug_struct("MinMax")
                .field("min", min)
                .field("max", max)
                .finish(),
            Self::StartEnd {
                start,
                end,
                ease,
                random,
            } => f
                .debug_struct("StartEnd")
                .field("start", start)
                .field("end", end)
                .field("ease", ease)
                .field("random", random)
                .finish(),
            Self::Stepped {
                start,
                end,
                steps,
                yoyo,
            } => f
                .debug_struct("Stepped")
                .field("start", start)
                .field("end", end)
                .field("steps", steps)
                .field("yoyo", yoyo)
                .finish(),
            Self::Custom { on_emit, on_update } => f
                .debug_struct("Custom")
                .field("on_emit", &on_emit.is_some())
                .field("on_update", &on_update.is_some())
                .finish(),
        }
    }
}

/// Value resolver for one particle property.
#[derive(Debug, Clone)]
pub struct EmitterOp {
    key: OpKey,
    config: OpConfig,
    active: bool,
    /// Stepped-range cursor, shared across emissions.
    cursor: u32,
    /// Stepped-range yoyo direction.
    reversing: bool,
}

impl EmitterOp {
    /// Creates an op holding the key's default configuration.
    #[must_use]
    pub fn new(key: OpKey) -> Self {
        Self::with_config(key, key.default_config())
    }

    /// Creates an op with an explicit configuration.
    #[must_use]
    pub fn with_config(key: OpKey, config: OpConfig) -> Self {
        Self {
            key,
            config,
            active: true,
            cursor: 0,
            reversing: false,
        }
    }

    /// The property this op resolves.
    #[must_use]
    pub const fn key(&self) -> OpKey {
        self.key
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &OpConfig {
        &self.config
    }

    /// Whether the op participates in resolution.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enables or disables the op. Disabled ops return the caller's fallback.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Replaces the configuration, resetting stepped state, and activates the op.
    pub fn set(&mut self, config: OpConfig) {
        self.config = config;
        self.cursor = 0;
        self.reversing = false;
        self.active = true;
    }

    /// Sets a static value.
    pub fn set_value(&mut self, value: f32) {
        self.set(OpConfig::Static(value));
    }

    /// Loads this op from `props[name]`, where `name` defaults to the key's
    /// own property name. Returns whether the property was present.
    ///
    /// A present but unrecognised literal resets the op to its default.
    pub fn load_config(&mut self, props: &Value, name: Option<&str>) -> bool {
        let name = name.unwrap_or(self.key.name());
        let Some(value) = props.get(name) else {
            return false;
        };
        match OpConfig::from_value(value) {
            Some(config) => self.set(config),
            None => {
                warn!("Unrecognized value for `{name}`: {value}, using default");
                self.set(self.key.default_config());
            },
        }
        true
    }

    /// Resolves the value for a particle being fired. Returns `fallback`
    /// when the op is inactive.
    pub fn emit_value(&mut self, particle: &Particle, rng: &mut fastrand::Rng, fallback: f32) -> f32 {
        if !self.active {
            return fallback;
        }
        match &self.config {
            OpConfig::Static(value) => *value,
            OpConfig::RandomSet(set) => {
                if set.is_empty() {
                    self.key.default_value()
                } else {
                    set[rng.usize(..set.len())]
                }
            },
            OpConfig::MinMax { min, max } => min + rng.f32() * (max - min),
            OpConfig::StartEnd {
                start, end, random, ..
            } => {
                if *random {
                    start + rng.f32() * (end - start)
                } else {
                    *start
                }
            },
            OpConfig::Stepped {
                start,
                end,
                steps,
                yoyo,
            } => {
                let (start, end, steps, yoyo) = (*start, *end, (*steps).max(1), *yoyo);
                let value = start + self.cursor as f32 * (end - start) / steps as f32;
                self.advance_cursor(steps, yoyo);
                value
            },
            OpConfig::Custom { on_emit, .. } => {
                let default = self.key.default_value();
                match on_emit {
                    Some(on_emit) => on_emit(particle, self.key, 0.0, default),
                    None => default,
                }
            },
        }
    }

    fn advance_cursor(&mut self, steps: u32, yoyo: bool) {
        if steps <= 1 {
            self.cursor = 0;
            return;
        }
        if !yoyo {
            self.cursor = (self.cursor + 1) % steps;
            return;
        }
        if self.reversing {
            if self.cursor == 0 {
                self.reversing = false;
                self.cursor = 1;
            } else {
                self.cursor -= 1;
            }
        } else if self.cursor + 1 >= steps {
            self.reversing = true;
            self.cursor -= 1;
        } else {
            self.cursor += 1;
        }
    }

    /// Re-evaluates the value at normalized age `t`. `current` is the
    /// particle's present value and is returned unchanged when the op does
    /// not animate.
    #[must_use]
    pub fn update_value(&self, particle: &Particle, t: f32, current: f32) -> f32 {
        if !self.active || self.key.emit_only() {
            return current;
        }
        match &self.config {
            OpConfig::StartEnd { end, ease, .. } => {
                let start = particle.op_start(self.key);
                start + (end - start) * ease.apply(t)
            },
            OpConfig::Custom {
                on_update: Some(on_update),
                ..
            } => on_update(particle, self.key, t, current),
            _ => current,
        }
    }

    /// Serializes the configuration back into the literal grammar.
    #[must_use]
    pub fn describe(&self) -> Value {
        self.config.describe(self.key)
    }
}

/// One [`EmitterOp`] per [`OpKey`], indexable by key.
#[derive(Debug, Clone)]
pub struct EmitterOps {
    ops: [EmitterOp; OpKey::COUNT],
}

impl EmitterOps {
    /// Every op at its default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ops: OpKey::ALL.map(EmitterOp::new),
        }
    }

    /// Iterates ops in key order.
    pub fn iter(&self) -> impl Iterator<Item = &EmitterOp> {
        self.ops.iter()
    }
}

impl Default for EmitterOps {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<OpKey> for EmitterOps {
    type Output = EmitterOp;

    fn index(&self, key: OpKey) -> &EmitterOp {
        &self.ops[key.index()]
    }
}

impl IndexMut<OpKey> for EmitterOps {
    fn index_mut(&mut self, key: OpKey) -> &mut EmitterOp {
        &mut self.ops[key.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ease::{EaseCurve, EaseDirection};

    fn emit_n(op: &mut EmitterOp, n: usize) -> Vec<f32> {
        let particle = Particle::default();
        let mut rng = fastrand::Rng::with_seed(1);
        (0..n).map(|_| op.emit_value(&particle, &mut rng, -1.0)).collect()
    }

    #[test]
    fn test_static_op() {
        let mut op = EmitterOp::with_config(OpKey::Alpha, OpConfig::Static(0.4));
        assert_eq!(emit_n(&mut op, 3), vec![0.4, 0.4, 0.4]);
        assert_eq!(op.update_value(&Particle::default(), 0.5, 0.4), 0.4);
    }

    #[test]
    fn test_random_set_picks_members() {
        let mut op = EmitterOp::with_config(OpKey::Tint, OpConfig::RandomSet(vec![1.0, 2.0, 3.0]));
        for value in emit_n(&mut op, 50) {
            assert!([1.0, 2.0, 3.0].contains(&value));
        }
    }

    #[test]
    fn test_min_max_in_range() {
        let mut op = EmitterOp::with_config(
            OpKey::SpeedX,
            OpConfig::MinMax {
                min: -50.0,
                max: 50.0,
            },
        );
        for value in emit_n(&mut op, 100) {
            assert!((-50.0..50.0).contains(&value));
        }
    }

    #[test]
    fn test_start_end_linear_midpoint() {
        let mut op = EmitterOp::with_config(
            OpKey::Alpha,
            OpConfig::StartEnd {
                start: 0.0,
                end: 1.0,
                ease: Ease::Linear,
                random: false,
            },
        );
        let mut particle = Particle::default();
        let mut rng = fastrand::Rng::with_seed(3);
        let start = op.emit_value(&particle, &mut rng, 1.0);
        assert_eq!(start, 0.0);
        particle.set_op_start(OpKey::Alpha, start);
        assert_eq!(op.update_value(&particle, 0.5, start), 0.5);
        assert_eq!(op.update_value(&particle, 1.0, start), 1.0);
    }

    #[test]
    fn test_start_end_random_start_eases_to_end() {
        let mut op = EmitterOp::with_config(
            OpKey::ScaleX,
            OpConfig::StartEnd {
                start: 2.0,
                end: 4.0,
                ease: Ease::Curve(EaseCurve::Quad, EaseDirection::In),
                random: true,
            },
        );
        let mut particle = Particle::default();
        let mut rng = fastrand::Rng::with_seed(11);
        let start = op.emit_value(&particle, &mut rng, 1.0);
        assert!((2.0..4.0).contains(&start));
        particle.set_op_start(OpKey::ScaleX, start);
        assert_eq!(op.update_value(&particle, 0.0, start), start);
        assert!((op.update_value(&particle, 1.0, start) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_stepped_wraps() {
        let mut op = EmitterOp::with_config(
            OpKey::X,
            OpConfig::Stepped {
                start: 0.0,
                end: 576.0,
                steps: 32,
                yoyo: false,
            },
        );
        let values = emit_n(&mut op, 33);
        let expected: Vec<f32> = (0..32).map(|i| i as f32 * 18.0).chain([0.0]).collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn test_stepped_yoyo_reverses_without_repeating() {
        let mut op = EmitterOp::with_config(
            OpKey::X,
            OpConfig::Stepped {
                start: 0.0,
                end: 576.0,
                steps: 32,
                yoyo: true,
            },
        );
        let values = emit_n(&mut op, 65);
        assert_eq!(values[31], 558.0);
        assert_eq!(values[32], 540.0);
        assert_eq!(values[62], 0.0);
        assert_eq!(values[63], 18.0);
        assert!(values.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn test_stepped_single_step_is_constant() {
        let mut op = EmitterOp::with_config(
            OpKey::X,
            OpConfig::Stepped {
                start: 5.0,
                end: 10.0,
                steps: 1,
                yoyo: true,
            },
        );
        assert_eq!(emit_n(&mut op, 3), vec![5.0, 5.0, 5.0]);
    }

    #[test]
    fn test_inactive_returns_fallback() {
        let mut op = EmitterOp::new(OpKey::SpeedY);
        op.set_active(false);
        assert_eq!(emit_n(&mut op, 1), vec![-1.0]);
    }

    #[test]
    fn test_custom_callbacks() {
        let mut op = EmitterOp::with_config(
            OpKey::Alpha,
            OpConfig::custom(
                Some(|_: &Particle, _: OpKey, _: f32, _: f32| 0.25),
                Some(|_: &Particle, _: OpKey, t: f32, _: f32| 1.0 - t),
            ),
        );
        assert_eq!(emit_n(&mut op, 1), vec![0.25]);
        assert_eq!(op.update_value(&Particle::default(), 0.75, 0.25), 0.25);
    }

    #[test]
    fn test_custom_missing_callbacks_fall_back() {
        let mut op = EmitterOp::with_config(
            OpKey::ScaleX,
            OpConfig::custom::<fn(&Particle, OpKey, f32, f32) -> f32, _>(
                None,
                Some(|_: &Particle, _: OpKey, _: f32, v: f32| v * 2.0),
            ),
        );
        assert_eq!(emit_n(&mut op, 1), vec![1.0]);
        assert_eq!(op.update_value(&Particle::default(), 0.5, 3.0), 6.0);
    }

    #[test]
    fn test_emit_only_key_never_animates() {
        let op = EmitterOp::with_config(
            OpKey::SpeedX,
            OpConfig::StartEnd {
                start: 0.0,
                end: 100.0,
                ease: Ease::Linear,
                random: false,
            },
        );
        assert_eq!(op.update_value(&Particle::default(), 0.5, 0.0), 0.0);
    }

    #[test]
    fn test_parse_grammar() {
        assert!(matches!(OpConfig::from_value(&json!(3)), Some(OpConfig::Static(v)) if v == 3.0));
        assert!(matches!(
            OpConfig::from_value(&json!([1, 2])),
            Some(OpConfig::RandomSet(set)) if set == vec![1.0, 2.0]
        ));
        assert!(matches!(
            OpConfig::from_value(&json!({"min": 1, "max": 2})),
            Some(OpConfig::MinMax { min, max }) if min == 1.0 && max == 2.0
        ));
        assert!(matches!(
            OpConfig::from_value(&json!({"random": [4, 8]})),
            Some(OpConfig::MinMax { min, max }) if min == 4.0 && max == 8.0
        ));
        assert!(matches!(
            OpConfig::from_value(&json!({"start": 1, "end": 0, "ease": "Sine.easeIn"})),
            Some(OpConfig::StartEnd { ease: Ease::Curve(EaseCurve::Sine, EaseDirection::In), random: false, .. })
        ));
        assert!(matches!(
            OpConfig::from_value(&json!({"start": 0, "end": 10, "steps": 5, "yoyo": true})),
            Some(OpConfig::Stepped { steps: 5, yoyo: true, .. })
        ));
        assert!(OpConfig::from_value(&json!("fast")).is_none());
        assert!(OpConfig::from_value(&json!([])).is_none());
        assert!(OpConfig::from_value(&json!({"foo": 1})).is_none());
    }

    #[test]
    fn test_load_config_unrecognized_falls_back_to_default() {
        let mut op = EmitterOp::with_config(OpKey::Lifespan, OpConfig::Static(50.0));
        assert!(op.load_config(&json!({"lifespan": "long"}), None));
        assert!(matches!(op.config(), OpConfig::Static(v) if *v == 1000.0));
        assert!(!op.load_config(&json!({"alpha": 1}), None));
    }

    #[test]
    fn test_describe_round_trip() {
        let configs = [
            json!(2.5),
            json!([1.0, 2.0]),
            json!({"min": 0.0, "max": 5.0}),
            json!({"start": 1.0, "end": 0.0, "ease": "Back.easeOut"}),
            json!({"start": 1.0, "end": 0.0, "ease": "Stepped", "easeParams": [3.0], "random": true}),
            json!({"start": 0.0, "end": 10.0, "steps": 4, "yoyo": true}),
        ];
        for config in configs {
            let mut op = EmitterOp::new(OpKey::Alpha);
            assert!(op.load_config(&json!({ "alpha": config.clone() }), None));
            let described = op.describe();
            let mut reloaded = EmitterOp::new(OpKey::Alpha);
            reloaded.load_config(&json!({ "alpha": described.clone() }), None);
            assert_eq!(reloaded.describe(), described, "{config}");
        }
    }

    #[test]
    fn test_ops_indexed_by_key() {
        let mut ops = EmitterOps::new();
        for key in OpKey::ALL {
            assert_eq!(ops[key].key(), key);
        }
        ops[OpKey::Bounce].set_value(0.5);
        assert!(matches!(ops[OpKey::Bounce].config(), OpConfig::Static(v) if *v == 0.5));
    }
}
