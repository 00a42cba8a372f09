use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::point::Point;
use crate::shape::boxes::IntBox;
use crate::vector::Vector;

/// A disc with an integer center and a positive integer radius, used for
/// round pads and via barrels.
///
/// Tests against boxes and other circles are exact squared-distance
/// comparisons; a clearance around a circle is just a larger radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: i32,
}

impl Circle {
    pub fn new(center: Point, radius: i32) -> Result<Circle, GeometryError> {
        if radius <= 0 {
            return Err(GeometryError::InvalidRadius(radius));
        }
        Ok(Circle { center, radius })
    }

    pub fn bounding_box(&self) -> IntBox {
        IntBox::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    pub fn area(&self) -> f64 {
        std::f64::consts::PI * (self.radius as f64) * (self.radius as f64)
    }

    /// Closed containment including the boundary circle.
    pub fn contains(&self, p: &Point) -> bool {
        self.center.distance_squared(p) <= self.radius_squared()
    }

    pub fn contains_strictly(&self, p: &Point) -> bool {
        self.center.distance_squared(p) < self.radius_squared()
    }

    /// Open-interior overlap: externally tangent circles do not intersect.
    pub fn intersects_circle(&self, other: &Circle) -> bool {
        let d2 = self.center.distance_squared(&other.center);
        let r = self.radius as i64 + other.radius as i64;
        d2 < r * r
    }

    /// Open-interior overlap with a box, exact: the nearest box point to the
    /// center must be strictly inside the circle.
    pub fn intersects_box(&self, b: &IntBox) -> bool {
        if b.has_no_interior() {
            return false;
        }
        let nx = self.center.x.clamp(b.ll.x, b.ur.x);
        let ny = self.center.y.clamp(b.ll.y, b.ur.y);
        self.center.distance_squared(&Point::new(nx, ny)) < self.radius_squared()
    }

    /// Grows the radius by `dist` (exact Minkowski offset of a disc).
    pub fn offset(&self, dist: i32) -> Circle {
        Circle {
            center: self.center,
            radius: self.radius + dist,
        }
    }

    pub fn translate(&self, v: Vector) -> Circle {
        Circle {
            center: self.center + v,
            radius: self.radius,
        }
    }

    pub fn turn_90(&self, factor: u8, pivot: Point) -> Circle {
        Circle {
            center: self.center.turn_90(factor, pivot),
            radius: self.radius,
        }
    }

    fn radius_squared(&self) -> i64 {
        self.radius as i64 * self.radius as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_radius() {
        assert!(matches!(
            Circle::new(Point::ORIGIN, 0),
            Err(GeometryError::InvalidRadius(0))
        ));
    }

    #[test]
    fn test_tangent_circles_do_not_intersect() {
        let a = Circle::new(Point::new(0, 0), 5).unwrap();
        let b = Circle::new(Point::new(10, 0), 5).unwrap();
        assert!(!a.intersects_circle(&b));
        let c = Circle::new(Point::new(9, 0), 5).unwrap();
        assert!(a.intersects_circle(&c));
    }

    #[test]
    fn test_circle_box_overlap() {
        let c = Circle::new(Point::new(0, 0), 5).unwrap();
        // Tangent to the right edge of the circle: no interior overlap.
        assert!(!c.intersects_box(&IntBox::new(5, -3, 9, 3)));
        assert!(c.intersects_box(&IntBox::new(4, -3, 9, 3)));
        // Corner case: box corner at (3, 4) is on the boundary, 3^2 + 4^2 = 25.
        assert!(!c.intersects_box(&IntBox::new(3, 4, 9, 9)));
        assert!(c.intersects_box(&IntBox::new(3, 3, 9, 9)));
    }

    #[test]
    fn test_contains_boundary() {
        let c = Circle::new(Point::new(0, 0), 5).unwrap();
        assert!(c.contains(&Point::new(3, 4)));
        assert!(!c.contains_strictly(&Point::new(3, 4)));
        assert!(!c.contains(&Point::new(4, 4)));
    }

    #[test]
    fn test_offset_is_radius_growth() {
        let c = Circle::new(Point::new(1, 2), 5).unwrap();
        assert_eq!(c.offset(3).radius, 8);
        assert_eq!(c.bounding_box(), IntBox::new(-4, -3, 6, 7));
    }
}
