//! Page geometry
//!
//! Coordinates follow artboard conventions: x grows rightward, y grows
//! upward, so a rectangle's `top` is numerically larger than its `bottom`.

use serde::{Deserialize, Serialize};

/// Points per millimetre (72 pt per inch, 25.4 mm per inch)
pub const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// Convert millimetres to points
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * POINTS_PER_MM
}

/// Convert points to millimetres
pub fn pt_to_mm(pt: f64) -> f64 {
    pt / POINTS_PER_MM
}

/// A position on the page
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, `[left, top, right, bottom]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Bounds {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle anchored at its top-left corner
    pub fn from_origin(origin: Point, width: f64, height: f64) -> Self {
        Self::new(origin.x, origin.y, origin.x + width, origin.y - height)
    }

    /// Page rectangle with the bottom-left corner at the origin
    pub fn page(width: f64, height: f64) -> Self {
        Self::new(0.0, height, width, 0.0)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Overlap of two rectangles.
    ///
    /// The result may have non-positive width or height when the inputs
    /// do not overlap; callers decide what that means.
    pub fn intersect(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.left.max(other.left),
            self.top.min(other.top),
            self.right.min(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.left.min(other.left),
            self.top.max(other.top),
            self.right.max(other.right),
            self.bottom.min(other.bottom),
        )
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Bounds {
        Bounds::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mm_round_trip() {
        assert_relative_eq!(mm_to_pt(25.4), 72.0);
        assert_relative_eq!(pt_to_mm(mm_to_pt(320.0)), 320.0, epsilon = 1e-9);
    }

    #[test]
    fn test_intersect_partial_overlap() {
        let item = Bounds::new(-10.0, 50.0, 40.0, 0.0);
        let board = Bounds::page(30.0, 40.0);
        let clip = item.intersect(&board);

        assert_relative_eq!(clip.width(), 30.0);
        assert_relative_eq!(clip.height(), 40.0);
    }

    #[test]
    fn test_intersect_disjoint_is_non_positive() {
        let a = Bounds::new(0.0, 10.0, 10.0, 0.0);
        let b = Bounds::new(20.0, 10.0, 30.0, 0.0);
        assert!(a.intersect(&b).width() <= 0.0);
    }

    #[test]
    fn test_from_origin() {
        let b = Bounds::from_origin(Point::new(5.0, 100.0), 20.0, 30.0);
        assert_eq!(b, Bounds::new(5.0, 100.0, 25.0, 70.0));
    }
}
