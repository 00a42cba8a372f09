//! The closed shape hierarchy: one tagged type covering every concrete shape
//! kind, with the dispatch for overlap and clearance checks.
//!
//! Intersection of two shapes always produces a representable, exact result:
//! restricted kinds stay in interval arithmetic, everything else goes through
//! the half-plane machinery of [`Simplex`]. Non-convex polygons are decomposed
//! into triangles over their original corners first.

pub mod boxes;
pub mod circle;
pub mod octagon;
pub mod polygon;
pub mod simplex;

use serde::{Deserialize, Serialize};

pub use boxes::IntBox;
pub use circle::Circle;
pub use octagon::IntOctagon;
pub use polygon::PolygonShape;
pub use simplex::Simplex;

use crate::point::{FloatPoint, Point};
use crate::vector::Vector;

/// Margin subtracted from floating-point distance bounds so that rounding can
/// never turn a real clearance violation into a pass. Coordinates are bounded
/// by [`crate::MAX_COORD`], which keeps the true floating error far below this.
const FLOAT_GUARD: f64 = 1e-6;

/// A placed copper or keepout shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Box(IntBox),
    Octagon(IntOctagon),
    Simplex(Simplex),
    Polygon(PolygonShape),
    Circle(Circle),
}

impl Shape {
    pub fn is_empty(&self) -> bool {
        match self {
            Shape::Box(b) => b.is_empty(),
            Shape::Octagon(o) => o.is_empty(),
            Shape::Simplex(s) => s.is_empty(),
            // Polygon and circle constructors reject degenerate inputs.
            Shape::Polygon(_) | Shape::Circle(_) => false,
        }
    }

    /// Conservative bounding box, never smaller than the true extent.
    pub fn bounding_box(&self) -> IntBox {
        match self {
            Shape::Box(b) => *b,
            Shape::Octagon(o) => o.bounding_box(),
            Shape::Simplex(s) => s.bounding_box(),
            Shape::Polygon(p) => p.bounding_box(),
            Shape::Circle(c) => c.bounding_box(),
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            Shape::Box(b) => b.area(),
            Shape::Octagon(o) => o.area(),
            Shape::Simplex(s) => s.area(),
            Shape::Polygon(p) => p.area(),
            Shape::Circle(c) => c.area(),
        }
    }

    /// Closed containment: boundary points count as inside.
    pub fn contains(&self, p: &Point) -> bool {
        match self {
            Shape::Box(b) => b.contains(p),
            Shape::Octagon(o) => o.contains(p),
            Shape::Simplex(s) => s.contains(p),
            Shape::Polygon(poly) => poly.contains(p),
            Shape::Circle(c) => c.contains(p),
        }
    }

    pub fn translate(&self, v: Vector) -> Shape {
        match self {
            Shape::Box(b) => Shape::Box(b.translate(v)),
            Shape::Octagon(o) => Shape::Octagon(o.translate(v)),
            Shape::Simplex(s) => Shape::Simplex(s.translate(v)),
            Shape::Polygon(p) => Shape::Polygon(p.translate(v)),
            Shape::Circle(c) => Shape::Circle(c.translate(v)),
        }
    }

    pub fn turn_90(&self, factor: u8, pivot: Point) -> Shape {
        match self {
            Shape::Box(b) => Shape::Box(b.turn_90(factor, pivot)),
            Shape::Octagon(o) => Shape::Octagon(o.turn_90(factor, pivot)),
            Shape::Simplex(s) => Shape::Simplex(s.turn_90(factor, pivot)),
            Shape::Polygon(p) => Shape::Polygon(p.turn_90(factor, pivot)),
            Shape::Circle(c) => Shape::Circle(c.turn_90(factor, pivot)),
        }
    }

    /// The equivalent simplex for convex shape kinds, `None` for circles and
    /// non-convex polygons.
    pub fn to_simplex(&self) -> Option<Simplex> {
        match self {
            Shape::Box(b) => Some(Simplex::from_box(b)),
            Shape::Octagon(o) => Some(o.to_simplex()),
            Shape::Simplex(s) => Some(s.clone()),
            Shape::Polygon(p) => p.to_simplex(),
            Shape::Circle(_) => None,
        }
    }

    /// Open-interior overlap: shapes that merely touch do not intersect.
    ///
    /// Exact for every pairing of box, octagon, simplex and polygon; circle
    /// tests against non-box convex shapes are conservative (may report an
    /// overlap at exact tangency, never miss one).
    pub fn intersects(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Box(a), Shape::Box(b)) => a.intersects(b),
            (Shape::Octagon(a), Shape::Octagon(b)) => a.intersects(b),
            (Shape::Box(a), Shape::Octagon(b)) | (Shape::Octagon(b), Shape::Box(a)) => {
                IntOctagon::from_box(a).intersects(b)
            }
            (Shape::Circle(a), Shape::Circle(b)) => a.intersects_circle(b),
            (Shape::Circle(c), Shape::Box(b)) | (Shape::Box(b), Shape::Circle(c)) => {
                c.intersects_box(b)
            }
            (Shape::Circle(c), s) | (s, Shape::Circle(c)) => {
                s.pieces().iter().any(|piece| circle_overlaps_simplex(c, piece))
            }
            (a, b) => {
                let pa = a.pieces();
                let pb = b.pieces();
                pa.iter().any(|x| pb.iter().any(|y| x.intersects(y)))
            }
        }
    }

    /// Clearance-aware overlap: true when the shapes come closer than
    /// `clearance` board units.
    ///
    /// Shape kinds with a closed-form expansion (box, octagon, circle) are
    /// grown by the clearance and tested with plain [`Shape::intersects`];
    /// general simplex and polygon pairs test the unexpanded shapes and then
    /// verify a minimum separation distance.
    pub fn intersects_with_clearance(&self, other: &Shape, clearance: i32) -> bool {
        if clearance <= 0 {
            return self.intersects(other);
        }
        if let Some(grown) = self.expanded(clearance) {
            return grown.intersects(other);
        }
        if let Some(grown) = other.expanded(clearance) {
            return grown.intersects(self);
        }
        self.intersects(other) || !separated_by_at_least(self, other, clearance)
    }

    /// Grows the shape by `dist` for the kinds that support a closed-form
    /// offset. The octagon's diagonal bounds round outward, so the expansion
    /// is never smaller than the true Minkowski sum.
    pub fn expanded(&self, dist: i32) -> Option<Shape> {
        match self {
            Shape::Box(b) => Some(Shape::Box(b.offset(dist))),
            Shape::Octagon(o) => Some(Shape::Octagon(o.offset(dist))),
            Shape::Circle(c) => Some(Shape::Circle(c.offset(dist))),
            Shape::Simplex(_) | Shape::Polygon(_) => None,
        }
    }

    /// The shape as a set of simplices whose union is the shape. Circles have
    /// no such decomposition.
    fn pieces(&self) -> Vec<Simplex> {
        match self {
            Shape::Box(b) => vec![Simplex::from_box(b)],
            Shape::Octagon(o) => vec![o.to_simplex()],
            Shape::Simplex(s) => vec![s.clone()],
            Shape::Polygon(p) => match p.to_simplex() {
                Some(s) => vec![s],
                None => p.triangles(),
            },
            Shape::Circle(_) => Vec::new(),
        }
    }

    /// Integer corner ring when the boundary is a polygon over integer points.
    fn integer_outline(&self) -> Option<Vec<Point>> {
        match self {
            Shape::Box(b) => {
                if b.has_no_interior() {
                    None
                } else {
                    Some(b.corners().to_vec())
                }
            }
            Shape::Polygon(p) => Some(p.corners().to_vec()),
            _ => None,
        }
    }
}

/// True when the shapes are certainly at least `clearance` apart.
///
/// For shape kinds with a closed-form expansion this reproduces the expansion
/// strategy, so the two clearance strategies agree on the restricted kinds.
/// Integer-cornered pairs (boxes, polygons) get an exact squared-distance
/// check; anything involving rational corners falls back to a guarded
/// floating-point bound that never reports separation falsely.
pub fn separated_by_at_least(a: &Shape, b: &Shape, clearance: i32) -> bool {
    if clearance <= 0 {
        return !a.intersects(b);
    }
    if let Some(grown) = a.expanded(clearance) {
        return !grown.intersects(b);
    }
    if let Some(grown) = b.expanded(clearance) {
        return !grown.intersects(a);
    }
    if a.intersects(b) {
        return false;
    }
    match (a.integer_outline(), b.integer_outline()) {
        (Some(ca), Some(cb)) => {
            exact_ring_separation(&ca, &cb, clearance) && exact_ring_separation(&cb, &ca, clearance)
        }
        _ => {
            let ca = float_outline(a);
            let cb = float_outline(b);
            if ca.is_empty() || cb.is_empty() {
                return true;
            }
            float_ring_distance(&ca, &cb) - FLOAT_GUARD >= clearance as f64
        }
    }
}

/// Every corner of `pts` at least `clearance` away from every edge of `ring`,
/// decided exactly in integer arithmetic.
fn exact_ring_separation(pts: &[Point], ring: &[Point], clearance: i32) -> bool {
    let cl2 = clearance as i128 * clearance as i128;
    pts.iter().all(|p| {
        (0..ring.len()).all(|i| {
            segment_dist_squared_at_least(p, &ring[i], &ring[(i + 1) % ring.len()], cl2)
        })
    })
}

/// `dist(p, segment uv)^2 >= cl2`, exactly.
fn segment_dist_squared_at_least(p: &Point, u: &Point, v: &Point, cl2: i128) -> bool {
    let uv = *v - *u;
    let up = *p - *u;
    let len2 = uv.length_squared();
    if len2 == 0 {
        return up.length_squared() as i128 >= cl2;
    }
    let t = uv.dot(&up);
    if t <= 0 {
        return up.length_squared() as i128 >= cl2;
    }
    if t >= len2 {
        return (*p - *v).length_squared() as i128 >= cl2;
    }
    let cr = uv.cross(&up) as i128;
    cr * cr >= cl2 * len2 as i128
}

fn float_outline(s: &Shape) -> Vec<FloatPoint> {
    match s {
        Shape::Box(b) => b.corners().iter().map(|c| c.to_float()).collect(),
        Shape::Polygon(p) => p.corners().iter().map(|c| c.to_float()).collect(),
        Shape::Octagon(o) => o.to_simplex().corners_approx(),
        Shape::Simplex(sx) => sx.corners_approx(),
        Shape::Circle(_) => Vec::new(),
    }
}

/// Minimum distance between two corner rings (corner against opposite edge,
/// both ways). Valid as a boundary distance only for non-overlapping shapes.
fn float_ring_distance(a: &[FloatPoint], b: &[FloatPoint]) -> f64 {
    let mut min = f64::INFINITY;
    for p in a {
        for i in 0..b.len() {
            min = min.min(point_segment_distance(p, &b[i], &b[(i + 1) % b.len()]));
        }
    }
    for p in b {
        for i in 0..a.len() {
            min = min.min(point_segment_distance(p, &a[i], &a[(i + 1) % a.len()]));
        }
    }
    min
}

fn point_segment_distance(p: &FloatPoint, u: &FloatPoint, v: &FloatPoint) -> f64 {
    let dx = v.x - u.x;
    let dy = v.y - u.y;
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return p.distance(u);
    }
    let t = (((p.x - u.x) * dx + (p.y - u.y) * dy) / len2).clamp(0.0, 1.0);
    p.distance(&FloatPoint::new(u.x + t * dx, u.y + t * dy))
}

fn circle_overlaps_simplex(c: &Circle, s: &Simplex) -> bool {
    if s.is_empty() {
        return false;
    }
    if s.contains(&c.center) {
        return true;
    }
    let corners = s.corners_approx();
    let center = c.center.to_float();
    let mut min = f64::INFINITY;
    for i in 0..corners.len() {
        min = min.min(point_segment_distance(
            &center,
            &corners[i],
            &corners[(i + 1) % corners.len()],
        ));
    }
    min < c.radius as f64 + FLOAT_GUARD
}
