use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A translation in the plane, in integer board units.
///
/// Cross and dot products are widened to i64 and are therefore exact for all
/// coordinates within [`crate::MAX_COORD`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Exact cross product (determinant) of two vectors.
    ///
    /// Positive when `other` points to the left of `self`.
    pub fn cross(&self, other: &Vector) -> i64 {
        self.x as i64 * other.y as i64 - self.y as i64 * other.x as i64
    }

    /// Exact scalar product of two vectors.
    pub fn dot(&self, other: &Vector) -> i64 {
        self.x as i64 * other.x as i64 + self.y as i64 * other.y as i64
    }

    /// Exact squared Euclidean length.
    pub fn length_squared(&self) -> i64 {
        self.dot(self)
    }

    pub fn length_approx(&self) -> f64 {
        (self.length_squared() as f64).sqrt()
    }

    /// Rotates the vector by `factor` quarter turns counterclockwise.
    pub fn turn_90(&self, factor: u8) -> Vector {
        match factor % 4 {
            0 => *self,
            1 => Vector::new(-self.y, self.x),
            2 => Vector::new(-self.x, -self.y),
            _ => Vector::new(self.y, -self.x),
        }
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}
