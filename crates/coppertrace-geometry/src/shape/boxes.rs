use serde::{Deserialize, Serialize};

use crate::point::Point;
use crate::vector::Vector;

/// An axis-aligned rectangle with integer corners.
///
/// Boxes are the hot path of trace-vs-trace checks: every test reduces to
/// interval comparisons. An inverted box (`ll > ur` in either axis) denotes
/// the empty set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntBox {
    pub ll: Point,
    pub ur: Point,
}

impl IntBox {
    /// A canonical empty box.
    pub const EMPTY: IntBox = IntBox {
        ll: Point { x: 1, y: 1 },
        ur: Point { x: -1, y: -1 },
    };

    /// Creates a box from any two opposite corners.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            ll: Point::new(x1.min(x2), y1.min(y2)),
            ur: Point::new(x1.max(x2), y1.max(y2)),
        }
    }

    pub fn from_corners(ll: Point, ur: Point) -> Self {
        Self::new(ll.x, ll.y, ur.x, ur.y)
    }

    pub fn width(&self) -> i32 {
        self.ur.x - self.ll.x
    }

    pub fn height(&self) -> i32 {
        self.ur.y - self.ll.y
    }

    pub fn is_empty(&self) -> bool {
        self.ll.x > self.ur.x || self.ll.y > self.ur.y
    }

    /// True when the box encloses no 2-dimensional region.
    pub fn has_no_interior(&self) -> bool {
        self.ll.x >= self.ur.x || self.ll.y >= self.ur.y
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.width() as f64 * self.height() as f64
    }

    /// Closed containment: boundary points count as inside.
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.ll.x && p.x <= self.ur.x && p.y >= self.ll.y && p.y <= self.ur.y
    }

    /// Open-interior overlap: boxes that merely touch do not intersect.
    pub fn intersects(&self, other: &IntBox) -> bool {
        self.ll.x < other.ur.x
            && other.ll.x < self.ur.x
            && self.ll.y < other.ur.y
            && other.ll.y < self.ur.y
    }

    /// Closed overlap, used for conservative bounding-region pruning.
    pub fn touches_or_intersects(&self, other: &IntBox) -> bool {
        self.ll.x <= other.ur.x
            && other.ll.x <= self.ur.x
            && self.ll.y <= other.ur.y
            && other.ll.y <= self.ur.y
    }

    pub fn intersection(&self, other: &IntBox) -> IntBox {
        IntBox {
            ll: Point {
                x: self.ll.x.max(other.ll.x),
                y: self.ll.y.max(other.ll.y),
            },
            ur: Point {
                x: self.ur.x.min(other.ur.x),
                y: self.ur.y.min(other.ur.y),
            },
        }
    }

    pub fn union(&self, other: &IntBox) -> IntBox {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        IntBox {
            ll: Point {
                x: self.ll.x.min(other.ll.x),
                y: self.ll.y.min(other.ll.y),
            },
            ur: Point {
                x: self.ur.x.max(other.ur.x),
                y: self.ur.y.max(other.ur.y),
            },
        }
    }

    /// Minkowski-style offset: grows the box by `dist` on every side.
    pub fn offset(&self, dist: i32) -> IntBox {
        IntBox {
            ll: Point {
                x: self.ll.x - dist,
                y: self.ll.y - dist,
            },
            ur: Point {
                x: self.ur.x + dist,
                y: self.ur.y + dist,
            },
        }
    }

    pub fn translate(&self, v: Vector) -> IntBox {
        IntBox {
            ll: self.ll + v,
            ur: self.ur + v,
        }
    }

    pub fn turn_90(&self, factor: u8, pivot: Point) -> IntBox {
        let a = self.ll.turn_90(factor, pivot);
        let b = self.ur.turn_90(factor, pivot);
        IntBox::new(a.x, a.y, b.x, b.y)
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            self.ll,
            Point { x: self.ur.x, y: self.ll.y },
            self.ur,
            Point { x: self.ll.x, y: self.ur.y },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_boxes_do_not_intersect() {
        let a = IntBox::new(0, 0, 10, 10);
        let b = IntBox::new(10, 0, 20, 10);
        assert!(!a.intersects(&b));
        assert!(a.touches_or_intersects(&b));
        assert!(a.intersects(&IntBox::new(9, 9, 20, 20)));
    }

    #[test]
    fn test_offset_turns_touching_into_overlap() {
        let a = IntBox::new(0, 0, 10, 10);
        let b = IntBox::new(12, 0, 20, 10);
        assert!(!a.intersects(&b));
        // Separation is exactly 2, so a required clearance of 3 is violated.
        assert!(a.offset(3).intersects(&b));
        // A required clearance of 2 is met.
        assert!(!a.offset(2).intersects(&b));
    }

    #[test]
    fn test_empty_intersection() {
        let a = IntBox::new(0, 0, 5, 5);
        let b = IntBox::new(6, 6, 8, 8);
        assert!(a.intersection(&b).is_empty());
        assert_eq!(IntBox::EMPTY.area(), 0.0);
    }

    #[test]
    fn test_turn_90() {
        let b = IntBox::new(0, 0, 4, 2);
        let r = b.turn_90(1, Point::ORIGIN);
        assert_eq!(r, IntBox::new(-2, 0, 0, 4));
    }
}
