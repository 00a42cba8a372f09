//! Exact two-dimensional geometry for printed circuit board routing.
//!
//! Everything electrical-correctness-relevant is decided in integer (or
//! integer-rational) arithmetic: side-of-line tests, direction ordering,
//! shape intersection and clearance checks. Floating point appears only as a
//! fast non-authoritative counterpart for display and first-pass rejection.
//!
//! Coordinates are board units in `[-MAX_COORD, MAX_COORD]`; with that bound,
//! every determinant and rational corner evaluation this crate performs fits
//! in `i64`/`i128` without overflow.

pub mod direction;
pub mod error;
pub mod line;
pub mod point;
pub mod shape;
pub mod vector;

pub use direction::Direction;
pub use error::GeometryError;
pub use line::{Line, Side};
pub use point::{FloatPoint, Point, RationalPoint};
pub use shape::{separated_by_at_least, Circle, IntBox, IntOctagon, PolygonShape, Shape, Simplex};
pub use vector::Vector;

/// Largest representable coordinate magnitude.
///
/// The bound is what makes the fixed-width exact arithmetic sound: line
/// coefficients stay within `2^52`, homogeneous corner coordinates within
/// `2^79`, and side evaluations of rational corners within `2^107`.
pub const MAX_COORD: i32 = 1 << 25;
