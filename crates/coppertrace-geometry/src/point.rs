use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::vector::Vector;

/// A point in integer board units.
///
/// All side-of-line and collinearity decisions on integer points are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        debug_assert!(
            x.unsigned_abs() <= crate::MAX_COORD as u32 && y.unsigned_abs() <= crate::MAX_COORD as u32,
            "coordinate outside the exact-arithmetic range"
        );
        Self { x, y }
    }

    pub fn to_float(self) -> FloatPoint {
        FloatPoint::new(self.x as f64, self.y as f64)
    }

    /// Exact squared distance to another point.
    pub fn distance_squared(&self, other: &Point) -> i64 {
        (*other - *self).length_squared()
    }

    pub fn distance_approx(&self, other: &Point) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// Rotates the point by `factor` quarter turns counterclockwise around `pivot`.
    pub fn turn_90(&self, factor: u8, pivot: Point) -> Point {
        pivot + (*self - pivot).turn_90(factor)
    }

    /// Exact side test: the sign of the turn a -> b -> self.
    ///
    /// Positive means a left turn.
    pub fn side_of_turn(&self, a: &Point, b: &Point) -> i64 {
        (*b - *a).cross(&(*self - *a))
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Point {
        Point {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Fast floating-point counterpart of [`Point`].
///
/// Used where execution speed matters more than accuracy, e.g. first-pass
/// rejection and display. Never authoritative: any accept/reject decision
/// affecting electrical correctness is confirmed with exact primitives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatPoint {
    pub x: f64,
    pub y: f64,
}

impl FloatPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &FloatPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An exact point with infinite-precision rational coordinates, stored in
/// homogeneous form `(x/z, y/z)` with `z > 0`.
///
/// Produced by exact line intersection. Algorithms are structured so that a
/// rational point is never materialized as permanent geometry; it only feeds
/// further exact sign tests or conservative rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RationalPoint {
    x: i128,
    y: i128,
    z: i128,
}

impl RationalPoint {
    /// Creates a rational point, normalizing the sign so `z > 0`.
    ///
    /// `z` must be nonzero; the caller guards against points at infinity.
    pub(crate) fn new(x: i128, y: i128, z: i128) -> Self {
        debug_assert!(z != 0, "rational point at infinity");
        if z < 0 {
            Self { x: -x, y: -y, z: -z }
        } else {
            Self { x, y, z }
        }
    }

    pub fn from_point(p: Point) -> Self {
        Self {
            x: p.x as i128,
            y: p.y as i128,
            z: 1,
        }
    }

    pub(crate) fn x_num(&self) -> i128 {
        self.x
    }

    pub(crate) fn y_num(&self) -> i128 {
        self.y
    }

    pub(crate) fn den(&self) -> i128 {
        self.z
    }

    pub fn to_float(&self) -> FloatPoint {
        FloatPoint::new(self.x as f64 / self.z as f64, self.y as f64 / self.z as f64)
    }

    /// Largest integer not above the x coordinate.
    pub fn floor_x(&self) -> i64 {
        floor_div(self.x, self.z)
    }

    pub fn floor_y(&self) -> i64 {
        floor_div(self.y, self.z)
    }

    /// Smallest integer not below the x coordinate.
    pub fn ceil_x(&self) -> i64 {
        -floor_div(-self.x, self.z)
    }

    pub fn ceil_y(&self) -> i64 {
        -floor_div(-self.y, self.z)
    }
}

fn floor_div(n: i128, d: i128) -> i64 {
    debug_assert!(d > 0);
    let q = n.div_euclid(d);
    q as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_vector_roundtrip() {
        let a = Point::new(3, 4);
        let b = Point::new(-2, 10);
        assert_eq!(a + (b - a), b);
    }

    #[test]
    fn test_side_of_turn() {
        let a = Point::new(0, 0);
        let b = Point::new(10, 0);
        assert!(Point::new(5, 1).side_of_turn(&a, &b) > 0);
        assert!(Point::new(5, -1).side_of_turn(&a, &b) < 0);
        assert_eq!(Point::new(20, 0).side_of_turn(&a, &b), 0);
    }

    #[test]
    fn test_rational_rounding() {
        // 7/2 = 3.5
        let p = RationalPoint::new(7, -7, 2);
        assert_eq!(p.floor_x(), 3);
        assert_eq!(p.ceil_x(), 4);
        assert_eq!(p.floor_y(), -4);
        assert_eq!(p.ceil_y(), -3);
    }

    #[test]
    fn test_rational_sign_normalization() {
        let p = RationalPoint::new(1, 2, -3);
        assert_eq!(p.den(), 3);
        assert_eq!(p.x_num(), -1);
    }
}
