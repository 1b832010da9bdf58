//! Geometric sources for emission and death zones.
//!
//! Shapes answer three questions: is a point inside, give me a uniformly
//! random point inside, and give me evenly spaced points along the outline.
//! Curves are open or closed polylines that only support the latter two.

use std::f32::consts::TAU;

use ember_common::{ConfigError, Rect, Vec2};
use serde_json::Value;

use crate::config::{read_bool, read_f32, read_str};

/// Attempts made by polygon rejection sampling before giving up.
const POLYGON_SAMPLE_ATTEMPTS: usize = 64;

/// A closed (or degenerate, in the case of `Line`) 2D shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle.
    Rectangle(Rect),
    /// Circle around a center.
    Circle {
        /// Center
        center: Vec2,
        /// Radius
        radius: f32,
    },
    /// Axis-aligned ellipse around a center.
    Ellipse {
        /// Center
        center: Vec2,
        /// Full width
        width: f32,
        /// Full height
        height: f32,
    },
    /// Line segment. Has no area, so it never contains a point.
    Line {
        /// Start point
        start: Vec2,
        /// End point
        end: Vec2,
    },
    /// Triangle.
    Triangle([Vec2; 3]),
    /// Simple polygon (implicitly closed).
    Polygon(Vec<Vec2>),
}

impl Shape {
    /// Whether the shape supports containment tests.
    #[must_use]
    pub fn has_area(&self) -> bool {
        match self {
            Self::Line { .. } => false,
            Self::Polygon(points) => points.len() >= 3,
            _ => true,
        }
    }

    /// Containment test.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Self::Rectangle(rect) => rect.contains(point),
            Self::Circle { center, radius } => {
                *radius > 0.0 && center.distance_squared(point) <= radius * radius
            },
            Self::Ellipse {
                center,
                width,
                height,
            } => {
                if *width <= 0.0 || *height <= 0.0 {
                    return false;
                }
                let normalized = (point - *center) / Vec2::new(width * 0.5, height * 0.5);
                normalized.length_squared() <= 1.0
            },
            Self::Line { .. } => false,
            Self::Triangle(vertices) => polygon_contains(vertices, point),
            Self::Polygon(vertices) => vertices.len() >= 3 && polygon_contains(vertices, point),
        }
    }

    /// Uniformly distributed point inside the shape (on it, for lines).
    pub fn random_point(&self, rng: &mut fastrand::Rng) -> Vec2 {
        match self {
            Self::Rectangle(rect) => rect.lerp_point(rng.f32(), rng.f32()),
            Self::Circle { center, radius } => {
                let angle = rng.f32() * TAU;
                let distance = rng.f32().sqrt() * radius;
                *center + Vec2::new(angle.cos(), angle.sin()) * distance
            },
            Self::Ellipse {
                center,
                width,
                height,
            } => {
                let angle = rng.f32() * TAU;
                let distance = rng.f32().sqrt();
                *center
                    + Vec2::new(angle.cos() * width * 0.5, angle.sin() * height * 0.5) * distance
            },
            Self::Line { start, end } => start.lerp(*end, rng.f32()),
            Self::Triangle([a, b, c]) => {
                let mut u = rng.f32();
                let mut v = rng.f32();
                if u + v > 1.0 {
                    u = 1.0 - u;
                    v = 1.0 - v;
                }
                *a + (*b - *a) * u + (*c - *a) * v
            },
            Self::Polygon(vertices) => {
                let Some(&first) = vertices.first() else {
                    return Vec2::ZERO;
                };
                let (min, max) = vertices
                    .iter()
                    .fold((first, first), |(min, max), v| (min.min(*v), max.max(*v)));
                for _ in 0..POLYGON_SAMPLE_ATTEMPTS {
                    let candidate = min + (max - min) * Vec2::new(rng.f32(), rng.f32());
                    if polygon_contains(vertices, candidate) {
                        return candidate;
                    }
                }
                first
            },
        }
    }

    /// Outline length.
    #[must_use]
    pub fn perimeter(&self) -> f32 {
        match self {
            Self::Rectangle(rect) => rect.perimeter(),
            Self::Circle { radius, .. } => TAU * radius,
            Self::Ellipse { width, height, .. } => {
                // Ramanujan's approximation.
                let (a, b) = (width * 0.5, height * 0.5);
                let h = ((a - b) * (a - b)) / ((a + b) * (a + b)).max(f32::EPSILON);
                std::f32::consts::PI * (a + b) * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()))
            },
            Self::Line { start, end } => start.distance(*end),
            Self::Triangle(vertices) => closed_length(vertices),
            Self::Polygon(vertices) => closed_length(vertices),
        }
    }

    /// Evenly spaced outline points. When `quantity` is zero it is derived
    /// from the perimeter divided by `step_rate`. Closed outlines do not
    /// repeat their starting point; lines stop short of their end point.
    #[must_use]
    pub fn points(&self, quantity: usize, step_rate: f32) -> Vec<Vec2> {
        let quantity = resolve_quantity(quantity, step_rate, self.perimeter());
        (0..quantity)
            .map(|i| self.point_at(i as f32 / quantity as f32))
            .collect()
    }

    /// Point at a fraction `position` in `[0, 1)` of the way round the outline.
    #[must_use]
    pub fn point_at(&self, position: f32) -> Vec2 {
        match self {
            Self::Rectangle(rect) => walk_closed(
                &[
                    Vec2::new(rect.left(), rect.top()),
                    Vec2::new(rect.right(), rect.top()),
                    Vec2::new(rect.right(), rect.bottom()),
                    Vec2::new(rect.left(), rect.bottom()),
                ],
                position,
            ),
            Self::Circle { center, radius } => {
                let angle = position * TAU;
                *center + Vec2::new(angle.cos(), angle.sin()) * *radius
            },
            Self::Ellipse {
                center,
                width,
                height,
            } => {
                let angle = position * TAU;
                *center + Vec2::new(angle.cos() * width * 0.5, angle.sin() * height * 0.5)
            },
            Self::Line { start, end } => start.lerp(*end, position),
            Self::Triangle(vertices) => walk_closed(vertices, position),
            Self::Polygon(vertices) => walk_closed(vertices, position),
        }
    }

    /// Parses a shape object such as `{"type": "circle", "x": 0, "y": 0, "radius": 20}`.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let kind = read_str(value, "type")
            .ok_or_else(|| ConfigError::InvalidShape("missing `type`".into()))?;
        let x = read_f32(value, "x").unwrap_or(0.0);
        let y = read_f32(value, "y").unwrap_or(0.0);
        match kind.to_ascii_lowercase().as_str() {
            "rectangle" | "rect" => Ok(Self::Rectangle(Rect::new(
                x,
                y,
                read_f32(value, "width").unwrap_or(0.0),
                read_f32(value, "height").unwrap_or(0.0),
            ))),
            "circle" => Ok(Self::Circle {
                center: Vec2::new(x, y),
                radius: read_f32(value, "radius").unwrap_or(0.0),
            }),
            "ellipse" => Ok(Self::Ellipse {
                center: Vec2::new(x, y),
                width: read_f32(value, "width").unwrap_or(0.0),
                height: read_f32(value, "height").unwrap_or(0.0),
            }),
            "line" => Ok(Self::Line {
                start: Vec2::new(
                    read_f32(value, "x1").unwrap_or(0.0),
                    read_f32(value, "y1").unwrap_or(0.0),
                ),
                end: Vec2::new(
                    read_f32(value, "x2").unwrap_or(0.0),
                    read_f32(value, "y2").unwrap_or(0.0),
                ),
            }),
            "triangle" => {
                let points = read_points(value)?;
                match points.as_slice() {
                    [a, b, c] => Ok(Self::Triangle([*a, *b, *c])),
                    _ => Err(ConfigError::InvalidShape(
                        "triangle needs exactly three points".into(),
                    )),
                }
            },
            "polygon" => {
                let points = read_points(value)?;
                if points.len() < 3 {
                    return Err(ConfigError::InvalidShape(
                        "polygon needs at least three points".into(),
                    ));
                }
                Ok(Self::Polygon(points))
            },
            other => Err(ConfigError::InvalidShape(format!("unknown shape `{other}`"))),
        }
    }
}

/// A polyline path.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    points: Vec<Vec2>,
    /// Cumulative length at each vertex.
    lengths: Vec<f32>,
}

impl Curve {
    /// Creates a polyline through `points`. Repeat the first point at the end
    /// to close it.
    #[must_use]
    pub fn new(points: Vec<Vec2>) -> Self {
        let mut lengths = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, point) in points.iter().enumerate() {
            if i > 0 {
                total += points[i - 1].distance(*point);
            }
            lengths.push(total);
        }
        Self { points, lengths }
    }

    /// Vertices of the path.
    #[must_use]
    pub fn vertices(&self) -> &[Vec2] {
        &self.points
    }

    /// Total path length.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Point at fraction `t` of the total length.
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec2 {
        let Some(&first) = self.points.first() else {
            return Vec2::ZERO;
        };
        let total = self.length();
        if total <= 0.0 {
            return first;
        }
        let target = t.clamp(0.0, 1.0) * total;
        let segment = self
            .lengths
            .iter()
            .position(|&len| len >= target)
            .unwrap_or(self.lengths.len() - 1)
            .max(1);
        let (start_len, end_len) = (self.lengths[segment - 1], self.lengths[segment]);
        let span = end_len - start_len;
        let local = if span > 0.0 {
            (target - start_len) / span
        } else {
            0.0
        };
        self.points[segment - 1].lerp(self.points[segment], local)
    }

    /// `divisions + 1` evenly spaced points including both ends. When
    /// `divisions` is zero it is derived from the length and `step_rate`.
    #[must_use]
    pub fn points(&self, divisions: usize, step_rate: f32) -> Vec<Vec2> {
        let divisions = resolve_quantity(divisions, step_rate, self.length());
        (0..=divisions)
            .map(|i| self.point_at(i as f32 / divisions as f32))
            .collect()
    }

    /// Random point along the path.
    pub fn random_point(&self, rng: &mut fastrand::Rng) -> Vec2 {
        self.point_at(rng.f32())
    }

    /// Parses `{"type": "curve", "points": [[x, y], ...], "closed": bool}`.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let mut points = read_points(value)?;
        if points.len() < 2 {
            return Err(ConfigError::InvalidShape("curve needs at least two points".into()));
        }
        if read_bool(value, "closed").unwrap_or(false) {
            points.push(points[0]);
        }
        Ok(Self::new(points))
    }
}

fn resolve_quantity(quantity: usize, step_rate: f32, length: f32) -> usize {
    if quantity > 0 {
        return quantity;
    }
    if step_rate > 0.0 {
        ((length / step_rate) as usize).max(1)
    } else {
        1
    }
}

fn closed_length(vertices: &[Vec2]) -> f32 {
    (0..vertices.len())
        .map(|i| vertices[i].distance(vertices[(i + 1) % vertices.len()]))
        .sum()
}

fn walk_closed(vertices: &[Vec2], position: f32) -> Vec2 {
    let Some(&first) = vertices.first() else {
        return Vec2::ZERO;
    };
    let total = closed_length(vertices);
    if total <= 0.0 {
        return first;
    }
    let mut remaining = position.rem_euclid(1.0) * total;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        let len = a.distance(b);
        if remaining <= len && len > 0.0 {
            return a.lerp(b, remaining / len);
        }
        remaining -= len;
    }
    first
}

/// Even-odd rule point-in-polygon test.
fn polygon_contains(vertices: &[Vec2], point: Vec2) -> bool {
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (vertices[i], vertices[j]);
        if (vi.y > point.y) != (vj.y > point.y)
            && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn read_points(value: &Value) -> Result<Vec<Vec2>, ConfigError> {
    let Some(points) = value.get("points").and_then(Value::as_array) else {
        return Err(ConfigError::InvalidShape("missing `points` array".into()));
    };
    points
        .iter()
        .map(|point| {
            let pair = match point {
                Value::Array(pair) if pair.len() == 2 => (pair[0].as_f64(), pair[1].as_f64()),
                Value::Object(_) => (
                    point.get("x").and_then(Value::as_f64),
                    point.get("y").and_then(Value::as_f64),
                ),
                _ => (None, None),
            };
            match pair {
                (Some(x), Some(y)) => Ok(Vec2::new(x as f32, y as f32)),
                _ => Err(ConfigError::InvalidShape(format!("bad point {point}"))),
            }
        })
        .collect()
}
