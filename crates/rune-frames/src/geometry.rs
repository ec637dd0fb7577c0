//! Points and rectangles in frame-local or window-absolute space.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A position. Whether it is frame-local or window-absolute depends on
/// where it came from; the type does not track the space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Strict containment: points on the edge are outside.
    pub fn contains_strict(&self, p: Point) -> bool {
        self.x < p.x && p.x < self.x + self.w && self.y < p.y && p.y < self.y + self.h
    }
}

/// Width and height of a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_containment_excludes_edges() {
        let r = Rect::new(100.0, 50.0, 300.0, 200.0);
        assert!(r.contains_strict(Point::new(120.0, 70.0)));
        assert!(!r.contains_strict(Point::new(100.0, 70.0)));
        assert!(!r.contains_strict(Point::new(400.0, 70.0)));
        assert!(!r.contains_strict(Point::new(120.0, 250.0)));
    }
}
