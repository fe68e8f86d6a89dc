//! Core geometry types shared by model space and screen space.

use serde::{Deserialize, Serialize};

/// A 2D point. Whether it is in model or screen space depends on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Component-wise difference `self - other`.
    pub fn delta_from(&self, other: &Point) -> (f32, f32) {
        (self.x - other.x, self.y - other.y)
    }
}

/// Width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Both dimensions are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// An axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner X coordinate
    pub x: f32,
    /// Top-left corner Y coordinate
    pub y: f32,
    /// Width of the rectangle
    pub width: f32,
    /// Height of the rectangle
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a normalized rectangle from two corner points.
    ///
    /// Width and height are always non-negative regardless of corner order.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self {
            x: p1.x.min(p2.x),
            y: p1.y.min(p2.y),
            width: (p1.x - p2.x).abs(),
            height: (p1.y - p2.y).abs(),
        }
    }

    /// Build from an `[x, y, w, h]` array as used on the wire.
    pub fn from_array([x, y, width, height]: [f32; 4]) -> Self {
        Self::new(x, y, width, height)
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point is inside the rectangle (edges inclusive).
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Return a copy shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Return a copy grown (keeping the top-left corner) so both sides are at least `min`.
    pub fn with_min_size(&self, min: f32) -> Self {
        Self::new(self.x, self.y, self.width.max(min), self.height.max(min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance_to(&p2) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_rect_from_corners_normalizes() {
        let rect = Rect::from_corners(Point::new(40.0, 40.0), Point::new(10.0, 10.0));
        assert_eq!(rect, Rect::new(10.0, 10.0, 30.0, 30.0));

        let reversed = Rect::from_corners(Point::new(10.0, 10.0), Point::new(40.0, 40.0));
        assert_eq!(rect, reversed);
    }

    #[test]
    fn test_rect_contains_edges() {
        let rect = Rect::new(10.0, 10.0, 100.0, 100.0);
        assert!(rect.contains(&Point::new(50.0, 50.0)));
        assert!(rect.contains(&Point::new(10.0, 110.0)));
        assert!(!rect.contains(&Point::new(5.0, 50.0)));
    }

    #[test]
    fn test_with_min_size_keeps_origin() {
        let rect = Rect::new(3.0, 4.0, 1.0, 20.0).with_min_size(5.0);
        assert_eq!(rect, Rect::new(3.0, 4.0, 5.0, 20.0));
    }

    #[test]
    fn test_size_validity() {
        assert!(Size::new(640.0, 480.0).is_valid());
        assert!(!Size::new(0.0, 480.0).is_valid());
        assert!(!Size::new(f32::NAN, 480.0).is_valid());
    }
}
