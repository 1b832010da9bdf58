//! Emission and death zones.
//!
//! Zones wrap a [`ZoneSource`]. Emission zones pick spawn offsets, either at
//! random inside the source or by walking evenly spaced points along its
//! outline. Death zones kill particles on entering or leaving the source.
//!
//! A zone can only be built from a source that offers the capability it
//! needs; constructors return `None` otherwise and the emitter simply runs
//! without that zone.

use std::fmt;
use std::sync::Arc;

use ember_common::{ConfigError, Rect, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{read_bool, read_f32, read_str};
use crate::shape::{Curve, Shape};

/// Produces a random point.
pub type RandomPointFn = Arc<dyn Fn(&mut fastrand::Rng) -> Vec2 + Send + Sync>;
/// Produces `(quantity, step_rate)` outline points.
pub type OutlineFn = Arc<dyn Fn(usize, f32) -> Vec<Vec2> + Send + Sync>;
/// Containment test.
pub type ContainsFn = Arc<dyn Fn(Vec2) -> bool + Send + Sync>;

/// Caller-provided zone capabilities. Any subset may be present.
#[derive(Clone, Default)]
pub struct CustomSource {
    /// Random point generator
    pub random_point: Option<RandomPointFn>,
    /// Outline sampler
    pub outline: Option<OutlineFn>,
    /// Containment test
    pub contains: Option<ContainsFn>,
}

impl fmt::Debug for CustomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomSource")
            .field("random_point", &self.random_point.is_some())
            .field("outline", &self.outline.is_some())
            .field("contains", &self.contains.is_some())
            .finish()
    }
}

/// Geometry a zone draws from.
#[derive(Debug, Clone)]
pub enum ZoneSource {
    /// A closed shape (or a line).
    Shape(Shape),
    /// A polyline path.
    Curve(Curve),
    /// Callbacks.
    Custom(CustomSource),
}

impl ZoneSource {
    /// Random point, if the source can produce one.
    pub fn random_point(&self, rng: &mut fastrand::Rng) -> Option<Vec2> {
        match self {
            Self::Shape(shape) => Some(shape.random_point(rng)),
            Self::Curve(curve) => Some(curve.random_point(rng)),
            Self::Custom(custom) => custom.random_point.as_ref().map(|f| f(rng)),
        }
    }

    /// Outline points, if the source can produce them.
    #[must_use]
    pub fn outline(&self, quantity: usize, step_rate: f32) -> Option<Vec<Vec2>> {
        match self {
            Self::Shape(shape) => Some(shape.points(quantity, step_rate)),
            Self::Curve(curve) => Some(curve.points(quantity, step_rate)),
            Self::Custom(custom) => custom.outline.as_ref().map(|f| f(quantity, step_rate)),
        }
    }

    /// Containment test, if the source supports one.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> Option<bool> {
        match self {
            Self::Shape(shape) => shape.has_area().then(|| shape.contains(point)),
            Self::Curve(_) => None,
            Self::Custom(custom) => custom.contains.as_ref().map(|f| f(point)),
        }
    }

    fn supports_random(&self) -> bool {
        match self {
            Self::Shape(_) | Self::Curve(_) => true,
            Self::Custom(custom) => custom.random_point.is_some(),
        }
    }

    fn supports_outline(&self) -> bool {
        match self {
            Self::Shape(_) | Self::Curve(_) => true,
            Self::Custom(custom) => custom.outline.is_some(),
        }
    }

    fn supports_contains(&self) -> bool {
        match self {
            Self::Shape(shape) => shape.has_area(),
            Self::Curve(_) => false,
            Self::Custom(custom) => custom.contains.is_some(),
        }
    }

    /// Parses a shape or curve object.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        match read_str(value, "type") {
            Some(kind) if kind.eq_ignore_ascii_case("curve") || kind.eq_ignore_ascii_case("path") => {
                Curve::from_value(value).map(Self::Curve)
            },
            _ => Shape::from_value(value).map(Self::Shape),
        }
    }
}

impl From<Shape> for ZoneSource {
    fn from(shape: Shape) -> Self {
        Self::Shape(shape)
    }
}

impl From<Curve> for ZoneSource {
    fn from(curve: Curve) -> Self {
        Self::Curve(curve)
    }
}

/// Spawns particles at random points inside a source.
#[derive(Debug, Clone)]
pub struct RandomZone {
    source: ZoneSource,
}

impl RandomZone {
    /// Creates the zone, or `None` if the source cannot produce random points.
    #[must_use]
    pub fn new(source: impl Into<ZoneSource>) -> Option<Self> {
        let source = source.into();
        source.supports_random().then_some(Self { source })
    }

    /// The wrapped source.
    #[must_use]
    pub const fn source(&self) -> &ZoneSource {
        &self.source
    }
}

/// Spawns particles at successive evenly spaced points along an outline.
#[derive(Debug, Clone)]
pub struct EdgeZone {
    source: ZoneSource,
    quantity: usize,
    step_rate: f32,
    yoyo: bool,
    seamless: bool,
    points: Vec<Vec2>,
    /// Index of the last point handed out.
    counter: Option<usize>,
    reversing: bool,
}

impl EdgeZone {
    /// Creates the zone, or `None` if the source cannot produce an outline.
    ///
    /// `quantity` points are sampled (derived from `step_rate` when zero).
    /// `seamless` drops the last sample when it coincides with the first.
    #[must_use]
    pub fn new(
        source: impl Into<ZoneSource>,
        quantity: usize,
        step_rate: f32,
        yoyo: bool,
        seamless: bool,
    ) -> Option<Self> {
        let source = source.into();
        if !source.supports_outline() {
            return None;
        }
        let mut zone = Self {
            source,
            quantity,
            step_rate,
            yoyo,
            seamless,
            points: Vec::new(),
            counter: None,
            reversing: false,
        };
        zone.update_source();
        Some(zone)
    }

    /// Re-samples the outline, keeping the cursor within range.
    pub fn update_source(&mut self) {
        let mut points = self
            .source
            .outline(self.quantity, self.step_rate)
            .unwrap_or_default();
        if self.seamless && points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        self.points = points;
        if let Some(counter) = self.counter {
            self.counter = self.points.len().checked_sub(1).map(|last| counter.min(last));
        }
    }

    /// Swaps the source and re-samples.
    pub fn change_source(&mut self, source: impl Into<ZoneSource>) {
        self.source = source.into();
        self.update_source();
    }

    /// Sampled outline points.
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Advances the cursor and returns the point under it.
    pub fn next_point(&mut self) -> Option<Vec2> {
        let len = self.points.len();
        if len == 0 {
            return None;
        }
        let next = match self.counter {
            None => 0,
            Some(_) if len == 1 => 0,
            Some(current) if self.reversing => {
                if current == 0 {
                    self.reversing = false;
                    1
                } else {
                    current - 1
                }
            },
            Some(current) if current + 1 >= len => {
                if self.yoyo {
                    self.reversing = true;
                    current - 1
                } else {
                    0
                }
            },
            Some(current) => current + 1,
        };
        self.counter = Some(next);
        Some(self.points[next])
    }
}

/// Where newly fired particles are placed relative to the spawn origin.
#[derive(Debug, Clone)]
pub enum EmitZone {
    /// Random point inside the source.
    Random(RandomZone),
    /// Successive points along the source's outline.
    Edge(EdgeZone),
}

impl EmitZone {
    /// Offset for the next particle.
    pub fn next_point(&mut self, rng: &mut fastrand::Rng) -> Option<Vec2> {
        match self {
            Self::Random(zone) => zone.source.random_point(rng),
            Self::Edge(zone) => zone.next_point(),
        }
    }

    /// Parses `{"type": "random" | "edge", "source": {...}, "quantity",
    /// "stepRate", "yoyo", "seamless"}`.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let source = value
            .get("source")
            .ok_or_else(|| ConfigError::InvalidZone("emit zone has no `source`".into()))
            .and_then(ZoneSource::from_value)?;
        let kind = read_str(value, "type").unwrap_or("random");
        match kind {
            "random" => RandomZone::new(source)
                .map(Self::Random)
                .ok_or_else(|| ConfigError::InvalidZone("source has no random points".into())),
            "edge" => EdgeZone::new(
                source,
                read_f32(value, "quantity").map_or(0, |q| q.max(0.0) as usize),
                read_f32(value, "stepRate").unwrap_or(0.0),
                read_bool(value, "yoyo").unwrap_or(false),
                read_bool(value, "seamless").unwrap_or(true),
            )
            .map(Self::Edge)
            .ok_or_else(|| ConfigError::InvalidZone("source has no outline".into())),
            other => Err(ConfigError::InvalidZone(format!("unknown emit zone type `{other}`"))),
        }
    }
}

/// Kills particles that enter (or leave) a source.
#[derive(Debug, Clone)]
pub struct DeathZone {
    source: ZoneSource,
    kill_on_enter: bool,
}

impl DeathZone {
    /// Creates the zone, or `None` if the source has no containment test.
    #[must_use]
    pub fn new(source: impl Into<ZoneSource>, kill_on_enter: bool) -> Option<Self> {
        let source = source.into();
        source
            .supports_contains()
            .then_some(Self {
                source,
                kill_on_enter,
            })
    }

    /// Whether particles die on entering (`true`) or on leaving (`false`).
    #[must_use]
    pub const fn kill_on_enter(&self) -> bool {
        self.kill_on_enter
    }

    /// Whether a particle at `position` must die.
    #[must_use]
    pub fn will_kill(&self, position: Vec2) -> bool {
        let inside = self.source.contains(position).unwrap_or(false);
        inside == self.kill_on_enter
    }

    /// Parses `{"type": "onEnter" | "onLeave", "source": {...}}`.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let source = value
            .get("source")
            .ok_or_else(|| ConfigError::InvalidZone("death zone has no `source`".into()))
            .and_then(ZoneSource::from_value)?;
        let kill_on_enter = match read_str(value, "type").unwrap_or("onEnter") {
            "onEnter" => true,
            "onLeave" => false,
            other => {
                return Err(ConfigError::InvalidZone(format!(
                    "unknown death zone type `{other}`"
                )))
            },
        };
        Self::new(source, kill_on_enter)
            .ok_or_else(|| ConfigError::InvalidZone("source has no containment test".into()))
    }
}

/// Which rectangle edges particles collide with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeFlags {
    /// Left edge
    pub left: bool,
    /// Right edge
    pub right: bool,
    /// Top edge
    pub top: bool,
    /// Bottom edge
    pub bottom: bool,
}

impl EdgeFlags {
    /// Every edge enabled.
    pub const ALL: Self = Self {
        left: true,
        right: true,
        top: true,
        bottom: true,
    };

    /// No edge enabled.
    pub const NONE: Self = Self {
        left: false,
        right: false,
        top: false,
        bottom: false,
    };

    /// Whether any edge is set.
    #[must_use]
    pub const fn any(self) -> bool {
        self.left || self.right || self.top || self.bottom
    }
}

impl Default for EdgeFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// A rectangle particles bounce off or stick to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// The bounding rectangle
    pub rect: Rect,
    /// Edges that participate in collision
    pub collide: EdgeFlags,
}

impl Bounds {
    /// Clamps `position` inside the enabled edges, reflecting the matching
    /// velocity component scaled by `bounce` (or zeroing it when `bounce`
    /// is not positive). Returns the edges that were hit.
    pub fn collide(&self, position: &mut Vec2, velocity: &mut Vec2, bounce: f32) -> EdgeFlags {
        let reflect = |v: f32| if bounce > 0.0 { -v * bounce } else { 0.0 };
        let mut hit = EdgeFlags::NONE;
        if position.x < self.rect.left() && self.collide.left {
            position.x = self.rect.left();
            velocity.x = reflect(velocity.x);
            hit.left = true;
        } else if position.x > self.rect.right() && self.collide.right {
            position.x = self.rect.right();
            velocity.x = reflect(velocity.x);
            hit.right = true;
        }
        if position.y < self.rect.top() && self.collide.top {
            position.y = self.rect.top();
            velocity.y = reflect(velocity.y);
            hit.top = true;
        } else if position.y > self.rect.bottom() && self.collide.bottom {
            position.y = self.rect.bottom();
            velocity.y = reflect(velocity.y);
            hit.bottom = true;
        }
        hit
    }

    /// Parses `{"x", "y", "width", "height"}`.
    pub fn rect_from_value(value: &Value) -> Result<Rect, ConfigError> {
        match (
            read_f32(value, "x"),
            read_f32(value, "y"),
            read_f32(value, "width").or_else(|| read_f32(value, "w")),
            read_f32(value, "height").or_else(|| read_f32(value, "h")),
        ) {
            (Some(x), Some(y), Some(width), Some(height)) => Ok(Rect::new(x, y, width, height)),
            _ => Err(ConfigError::InvalidBounds(format!(
                "expected x, y, width and height in {value}"
            ))),
        }
    }
}
