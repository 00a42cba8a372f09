use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::line::Line;
use crate::point::Point;
use crate::shape::boxes::IntBox;
use crate::shape::simplex::Simplex;
use crate::vector::Vector;

/// A shape given as a literal corner sequence, used for geometry that arrives
/// from an imported design.
///
/// Convex polygons normalize to an equivalent [`Simplex`]; non-convex ones are
/// decomposed into triangles over the original integer corners, so no rounded
/// intersection point ever becomes primary data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolygonShape {
    corners: Vec<Point>,
}

impl PolygonShape {
    /// Creates a polygon, dropping repeated consecutive corners (including a
    /// repeated closing corner). Fewer than 3 distinct corners is an error.
    pub fn new(corners: Vec<Point>) -> Result<PolygonShape, GeometryError> {
        let mut cleaned: Vec<Point> = Vec::with_capacity(corners.len());
        for c in corners {
            if cleaned.last() != Some(&c) {
                cleaned.push(c);
            }
        }
        if cleaned.len() > 1 && cleaned.first() == cleaned.last() {
            cleaned.pop();
        }
        if cleaned.len() < 3 {
            return Err(GeometryError::TooFewCorners(cleaned.len()));
        }
        Ok(PolygonShape { corners: cleaned })
    }

    pub fn corners(&self) -> &[Point] {
        &self.corners
    }

    fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.corners.len();
        (0..n).map(move |i| (self.corners[i], self.corners[(i + 1) % n]))
    }

    /// Twice the signed area (exact); positive for counterclockwise corners.
    pub fn signed_area_doubled(&self) -> i64 {
        self.edges()
            .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
            .sum()
    }

    pub fn area(&self) -> f64 {
        self.signed_area_doubled().abs() as f64 / 2.0
    }

    /// Exact convexity test: every turn has the orientation's sign (collinear
    /// corners are tolerated).
    pub fn is_convex(&self) -> bool {
        let n = self.corners.len();
        let orientation = self.signed_area_doubled().signum();
        if orientation == 0 {
            return false;
        }
        (0..n).all(|i| {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % n];
            let c = self.corners[(i + 2) % n];
            let turn = c.side_of_turn(&a, &b).signum();
            turn == 0 || turn == orientation
        })
    }

    /// Corners in counterclockwise order regardless of input orientation.
    fn ccw_corners(&self) -> Vec<Point> {
        if self.signed_area_doubled() >= 0 {
            self.corners.clone()
        } else {
            self.corners.iter().rev().copied().collect()
        }
    }

    /// The equivalent simplex for a convex polygon, `None` otherwise.
    pub fn to_simplex(&self) -> Option<Simplex> {
        if !self.is_convex() {
            return None;
        }
        let ccw = self.ccw_corners();
        let n = ccw.len();
        let lines: Vec<Line> = (0..n)
            .filter_map(|i| Line::new(ccw[i], ccw[(i + 1) % n]).ok())
            .collect();
        Some(Simplex::from_lines(lines))
    }

    /// Decomposes the polygon into triangles over its own corners
    /// (ear clipping, exact integer arithmetic). The union of the triangles
    /// is the polygon, so overlap tests reduce to simplex tests.
    pub fn triangles(&self) -> Vec<Simplex> {
        let mut ring = self.ccw_corners();
        let mut out = Vec::new();
        'clip: while ring.len() > 3 {
            let n = ring.len();
            for i in 0..n {
                let prev = ring[(i + n - 1) % n];
                let cur = ring[i];
                let next = ring[(i + 1) % n];
                let turn = next.side_of_turn(&prev, &cur);
                if turn <= 0 {
                    continue; // reflex or collinear corner, not an ear
                }
                let blocked = ring.iter().any(|p| {
                    *p != prev
                        && *p != cur
                        && *p != next
                        && point_in_triangle_closed(p, &prev, &cur, &next)
                });
                if blocked {
                    continue;
                }
                out.push(triangle_simplex(prev, cur, next));
                ring.remove(i);
                continue 'clip;
            }
            // No ear found: degenerate input, fall back to the remaining fan.
            log::warn!("polygon triangulation found no ear in a {}-gon", n);
            break;
        }
        if ring.len() == 3 {
            out.push(triangle_simplex(ring[0], ring[1], ring[2]));
        }
        out.retain(|t| !t.is_empty());
        out
    }

    /// Closed containment: boundary points count as inside. Exact ray cast.
    pub fn contains(&self, p: &Point) -> bool {
        if self.on_boundary(p) {
            return true;
        }
        self.crossing_parity(p)
    }

    /// Strict containment: boundary points count as outside.
    pub fn contains_strictly(&self, p: &Point) -> bool {
        !self.on_boundary(p) && self.crossing_parity(p)
    }

    fn on_boundary(&self, p: &Point) -> bool {
        self.edges().any(|(a, b)| {
            p.side_of_turn(&a, &b) == 0
                && p.x >= a.x.min(b.x)
                && p.x <= a.x.max(b.x)
                && p.y >= a.y.min(b.y)
                && p.y <= a.y.max(b.y)
        })
    }

    fn crossing_parity(&self, p: &Point) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let d = p.side_of_turn(&a, &b);
                if (b.y > a.y && d > 0) || (b.y < a.y && d < 0) {
                    inside = !inside;
                }
            }
        }
        inside
    }

    pub fn bounding_box(&self) -> IntBox {
        let mut bb = IntBox::EMPTY;
        for c in &self.corners {
            bb = bb.union(&IntBox::from_corners(*c, *c));
        }
        bb
    }

    pub fn translate(&self, v: Vector) -> PolygonShape {
        PolygonShape {
            corners: self.corners.iter().map(|c| *c + v).collect(),
        }
    }

    pub fn turn_90(&self, factor: u8, pivot: Point) -> PolygonShape {
        PolygonShape {
            corners: self
                .corners
                .iter()
                .map(|c| c.turn_90(factor, pivot))
                .collect(),
        }
    }
}

fn triangle_simplex(a: Point, b: Point, c: Point) -> Simplex {
    let lines: Vec<Line> = [(a, b), (b, c), (c, a)]
        .iter()
        .filter_map(|(p, q)| Line::new(*p, *q).ok())
        .collect();
    if lines.len() < 3 {
        return Simplex::empty();
    }
    Simplex::from_lines(lines)
}

fn point_in_triangle_closed(p: &Point, a: &Point, b: &Point, c: &Point) -> bool {
    // a, b, c counterclockwise.
    p.side_of_turn(a, b) >= 0 && p.side_of_turn(b, c) >= 0 && p.side_of_turn(c, a) >= 0
}
