use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::vector::Vector;

/// An equivalence class of vectors pointing the same way.
///
/// Stored as a gcd-reduced vector, never as a floating angle, so equality and
/// ordering stay exact. Directions are totally ordered counterclockwise
/// starting at the positive x-axis; the comparison is decided by a half-plane
/// split plus one cross-product sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    x: i32,
    y: i32,
}

impl Direction {
    /// Reduces a vector to its direction. Fails on the zero vector.
    pub fn from_vector(v: Vector) -> Result<Direction, GeometryError> {
        if v.is_zero() {
            return Err(GeometryError::ZeroVector);
        }
        let g = gcd(v.x.unsigned_abs(), v.y.unsigned_abs()) as i32;
        Ok(Direction {
            x: v.x / g,
            y: v.y / g,
        })
    }

    pub fn to_vector(&self) -> Vector {
        Vector::new(self.x, self.y)
    }

    pub fn opposite(&self) -> Direction {
        Direction {
            x: -self.x,
            y: -self.y,
        }
    }

    /// True for directions parallel to a coordinate axis.
    pub fn is_orthogonal(&self) -> bool {
        self.x == 0 || self.y == 0
    }

    /// True for 45-degree diagonal directions.
    pub fn is_diagonal(&self) -> bool {
        self.x.abs() == self.y.abs()
    }

    /// 0 for angles in [0, pi), 1 for [pi, 2*pi).
    fn half(&self) -> u8 {
        if self.y < 0 || (self.y == 0 && self.x < 0) {
            1
        } else {
            0
        }
    }
}

impl Ord for Direction {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.half().cmp(&other.half()) {
            Ordering::Equal => {
                // Same half-plane: a positive determinant means `other` lies
                // counterclockwise of `self`, so `self` sorts first.
                let det = self.to_vector().cross(&other.to_vector());
                0.cmp(&det)
            }
            ord => ord,
        }
    }
}

impl PartialOrd for Direction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(x: i32, y: i32) -> Direction {
        Direction::from_vector(Vector::new(x, y)).unwrap()
    }

    #[test]
    fn test_reduction() {
        assert_eq!(dir(4, -6), dir(2, -3));
        assert_ne!(dir(1, 1), dir(-1, -1));
    }

    #[test]
    fn test_zero_vector_rejected() {
        assert_eq!(
            Direction::from_vector(Vector::ZERO),
            Err(GeometryError::ZeroVector)
        );
    }

    #[test]
    fn test_total_order_counterclockwise() {
        let ring = [
            dir(1, 0),
            dir(2, 1),
            dir(1, 1),
            dir(0, 1),
            dir(-1, 1),
            dir(-1, 0),
            dir(-1, -1),
            dir(0, -1),
            dir(1, -1),
        ];
        for w in ring.windows(2) {
            assert!(w[0] < w[1], "{:?} should sort before {:?}", w[0], w[1]);
        }
    }

    #[test]
    fn test_opposite() {
        assert_eq!(dir(3, -1).opposite(), dir(-3, 1));
    }
}
