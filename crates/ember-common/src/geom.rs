//! Geometry primitives shared by the simulation and its hosts.

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Axis-aligned rectangle in world space, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width (non-negative)
    pub width: f32,
    /// Height (non-negative)
    pub height: f32,
}

impl Rect {
    /// Creates a new rectangle. Negative extents are flipped so the
    /// rectangle always has a non-negative width and height.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        let (x, width) = if width < 0.0 { (x + width, -width) } else { (x, width) };
        let (y, height) = if height < 0.0 { (y + height, -height) } else { (y, height) };
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left edge.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Perimeter length.
    #[must_use]
    pub fn perimeter(&self) -> f32 {
        2.0 * (self.width + self.height)
    }

    /// Checks whether a point lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        if self.width <= 0.0 || self.height <= 0.0 {
            return false;
        }
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Point at normalized coordinates `(u, v)` inside the rectangle.
    #[must_use]
    pub fn lerp_point(&self, u: f32, v: f32) -> Vec2 {
        Vec2::new(self.x + u * self.width, self.y + v * self.height)
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.bottom(), 70.0);
        assert_eq!(rect.center(), Vec2::new(60.0, 45.0));
    }

    #[test]
    fn test_rect_negative_extent_is_normalized() {
        let rect = Rect::new(100.0, 100.0, -50.0, -20.0);
        assert_eq!(rect, Rect::new(50.0, 80.0, 50.0, 20.0));
    }

    #[test]
    fn test_empty_rect_contains_nothing() {
        assert!(!Rect::default().contains(Vec2::ZERO));
    }

    proptest! {
        #[test]
        fn prop_lerp_point_is_contained(u in 0.0f32..=1.0, v in 0.0f32..=1.0) {
            let rect = Rect::new(-40.0, 12.0, 80.0, 30.0);
            prop_assert!(rect.contains(rect.lerp_point(u, v)));
        }
    }
}
