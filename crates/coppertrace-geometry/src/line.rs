use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::error::GeometryError;
use crate::point::{FloatPoint, Point, RationalPoint};
use crate::vector::Vector;

/// Which side of a directed line a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    OnLine,
}

impl Side {
    fn of_sign(sign: i128) -> Side {
        if sign > 0 {
            Side::Left
        } else if sign < 0 {
            Side::Right
        } else {
            Side::OnLine
        }
    }
}

/// An infinite directed line through two distinct integer points.
///
/// The positive half-plane is to the left of the direction a -> b, the
/// negative half-plane to the right. Two different point pairs may define the
/// same line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

impl Line {
    /// Creates a directed line. Fails if the two points coincide.
    pub fn new(a: Point, b: Point) -> Result<Line, GeometryError> {
        if a == b {
            return Err(GeometryError::DegenerateLine(a.x, a.y));
        }
        Ok(Line { a, b })
    }

    /// Creates the line through `p` with the given direction.
    pub fn from_point_direction(p: Point, dir: Direction) -> Line {
        Line {
            a: p,
            b: p + dir.to_vector(),
        }
    }

    pub fn direction(&self) -> Direction {
        // The constructor guarantees a != b.
        Direction::from_vector(self.b - self.a).unwrap_or_else(|_| unreachable!())
    }

    /// Returns the line pointing the opposite way, swapping the half-planes.
    pub fn opposite(&self) -> Line {
        Line {
            a: self.b,
            b: self.a,
        }
    }

    pub fn translate(&self, v: Vector) -> Line {
        Line {
            a: self.a + v,
            b: self.b + v,
        }
    }

    pub fn turn_90(&self, factor: u8, pivot: Point) -> Line {
        Line {
            a: self.a.turn_90(factor, pivot),
            b: self.b.turn_90(factor, pivot),
        }
    }

    /// Exact side test for an integer point.
    pub fn side_of(&self, p: &Point) -> Side {
        Side::of_sign(p.side_of_turn(&self.a, &self.b) as i128)
    }

    /// Exact side test for a rational point.
    pub fn side_of_rational(&self, p: &RationalPoint) -> Side {
        let (ca, cb, cc) = self.coefficients();
        let value =
            ca as i128 * p.x_num() + cb as i128 * p.y_num() + cc as i128 * p.den();
        Side::of_sign(value)
    }

    pub fn is_parallel(&self, other: &Line) -> bool {
        (self.b - self.a).cross(&(other.b - other.a)) == 0
    }

    /// Coefficients (a, b, c) of the implicit form a*x + b*y + c, positive on
    /// the left half-plane.
    fn coefficients(&self) -> (i64, i64, i64) {
        let d = self.b - self.a;
        let ca = -(d.y as i64);
        let cb = d.x as i64;
        let cc = d.y as i64 * self.a.x as i64 - d.x as i64 * self.a.y as i64;
        (ca, cb, cc)
    }

    /// Exact intersection of two lines as a rational point.
    ///
    /// The result is exact but may be slow; it is never stored as permanent
    /// geometry. Parallel lines have no intersection point.
    pub fn intersection(&self, other: &Line) -> Result<RationalPoint, GeometryError> {
        let (a1, b1, c1) = self.coefficients();
        let (a2, b2, c2) = other.coefficients();
        let z = a1 as i128 * b2 as i128 - a2 as i128 * b1 as i128;
        if z == 0 {
            return Err(GeometryError::ParallelLines);
        }
        let x = b1 as i128 * c2 as i128 - b2 as i128 * c1 as i128;
        let y = c1 as i128 * a2 as i128 - c2 as i128 * a1 as i128;
        Ok(RationalPoint::new(x, y, z))
    }

    /// Fast floating-point intersection, `None` for (nearly) parallel lines.
    pub fn intersection_approx(&self, other: &Line) -> Option<FloatPoint> {
        let (a1, b1, c1) = self.coefficients();
        let (a2, b2, c2) = other.coefficients();
        let det = a1 as f64 * b2 as f64 - a2 as f64 * b1 as f64;
        if det == 0.0 {
            return None;
        }
        Some(FloatPoint::new(
            (b1 as f64 * c2 as f64 - b2 as f64 * c1 as f64) / det,
            (c1 as f64 * a2 as f64 - c2 as f64 * a1 as f64) / det,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x1: i32, y1: i32, x2: i32, y2: i32) -> Line {
        Line::new(Point::new(x1, y1), Point::new(x2, y2)).unwrap()
    }

    #[test]
    fn test_degenerate_line_rejected() {
        let p = Point::new(5, 5);
        assert_eq!(Line::new(p, p), Err(GeometryError::DegenerateLine(5, 5)));
    }

    #[test]
    fn test_side_of() {
        let l = line(0, 0, 10, 0);
        assert_eq!(l.side_of(&Point::new(5, 3)), Side::Left);
        assert_eq!(l.side_of(&Point::new(5, -3)), Side::Right);
        assert_eq!(l.side_of(&Point::new(-7, 0)), Side::OnLine);
    }

    #[test]
    fn test_exact_intersection() {
        // y = x and y = -x + 1 meet at (1/2, 1/2), not an integer point.
        let l1 = line(0, 0, 2, 2);
        let l2 = line(0, 1, 1, 0);
        let p = l1.intersection(&l2).unwrap();
        assert_eq!(p.floor_x(), 0);
        assert_eq!(p.ceil_x(), 1);
        assert_eq!(l1.side_of_rational(&p), Side::OnLine);
        assert_eq!(l2.side_of_rational(&p), Side::OnLine);
    }

    #[test]
    fn test_parallel_intersection_fails() {
        let l1 = line(0, 0, 10, 0);
        let l2 = line(0, 5, 10, 5);
        assert_eq!(l1.intersection(&l2), Err(GeometryError::ParallelLines));
        assert!(l1.intersection_approx(&l2).is_none());
    }

    #[test]
    fn test_opposite_swaps_half_planes() {
        let l = line(0, 0, 10, 0);
        assert_eq!(l.opposite().side_of(&Point::new(5, 3)), Side::Right);
    }
}
