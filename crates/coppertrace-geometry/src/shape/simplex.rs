use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::line::{Line, Side};
use crate::point::{FloatPoint, Point, RationalPoint};
use crate::shape::boxes::IntBox;
use crate::vector::Vector;

/// A convex shape defined as the intersection of the left half-planes of
/// finitely many directed lines.
///
/// This is the mechanism that keeps shape intersection exact under integer
/// coordinates: intersecting two simplices takes the union of their line sets
/// and removes half-planes that do not contribute to the result. No new
/// corner coordinates are ever computed into permanent geometry; corners only
/// exist transiently as exact rational points feeding sign tests.
///
/// Invariants of a constructed simplex: lines are sorted by direction, no two
/// lines share a direction, every line contributes a boundary edge, and every
/// pair of cyclically adjacent lines meets in a finite corner. The kernel
/// clips every simplex against the world box (+-[`crate::MAX_COORD`]), which
/// keeps all regions bounded; the clip lines drop out as redundant for
/// ordinary board shapes. An empty line set denotes the empty region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simplex {
    lines: Vec<Line>,
}

/// The vertex shared by two adjacent boundary lines, possibly at infinity
/// while the sweep has not yet bounded the region.
enum Corner {
    Finite(RationalPoint),
    Infinite { dir: Direction, on: Line },
}

enum CornerCalc {
    Corner(Corner),
    /// The two half-planes (or the region between them) cannot enclose any
    /// interior point.
    EmptyRegion,
}

impl Simplex {
    pub fn empty() -> Simplex {
        Simplex { lines: Vec::new() }
    }

    /// Builds a simplex from arbitrary half-plane lines, removing redundant
    /// constraints. Returns the empty simplex when the lines enclose no
    /// 2-dimensional region (a point or segment has no interior).
    pub fn from_lines(lines: Vec<Line>) -> Simplex {
        Simplex {
            lines: normalize(lines),
        }
    }

    pub fn from_box(b: &IntBox) -> Simplex {
        if b.has_no_interior() {
            return Simplex::empty();
        }
        Simplex::from_lines(box_lines(b))
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Exact intersection: the union of both line sets with non-contributing
    /// half-planes removed.
    pub fn intersection(&self, other: &Simplex) -> Simplex {
        if self.is_empty() || other.is_empty() {
            return Simplex::empty();
        }
        let mut lines = self.lines.clone();
        lines.extend_from_slice(&other.lines);
        Simplex::from_lines(lines)
    }

    /// Open-interior overlap: touching simplices do not intersect.
    pub fn intersects(&self, other: &Simplex) -> bool {
        !self.intersection(other).is_empty()
    }

    /// Closed containment including the boundary.
    pub fn contains(&self, p: &Point) -> bool {
        !self.is_empty() && self.lines.iter().all(|l| l.side_of(p) != Side::Right)
    }

    /// Strict containment: `p` lies in the open interior.
    pub fn contains_strictly(&self, p: &Point) -> bool {
        !self.is_empty() && self.lines.iter().all(|l| l.side_of(p) == Side::Left)
    }

    /// The corners in counterclockwise order, as exact rational points.
    ///
    /// Normalization guarantees every adjacent line pair meets in a finite
    /// point, so the result has one corner per line.
    pub fn corners(&self) -> Vec<RationalPoint> {
        let n = self.lines.len();
        (0..n)
            .filter_map(|i| self.lines[i].intersection(&self.lines[(i + 1) % n]).ok())
            .collect()
    }

    pub fn corners_approx(&self) -> Vec<FloatPoint> {
        self.corners().iter().map(|c| c.to_float()).collect()
    }

    /// Conservative bounding box: rational corners are rounded outward, so the
    /// box is never smaller than the true extent.
    pub fn bounding_box(&self) -> IntBox {
        if self.is_empty() {
            return IntBox::EMPTY;
        }
        let corners = self.corners();
        let mut min_x = i64::MAX;
        let mut min_y = i64::MAX;
        let mut max_x = i64::MIN;
        let mut max_y = i64::MIN;
        for c in &corners {
            min_x = min_x.min(c.floor_x());
            min_y = min_y.min(c.floor_y());
            max_x = max_x.max(c.ceil_x());
            max_y = max_y.max(c.ceil_y());
        }
        IntBox::new(min_x as i32, min_y as i32, max_x as i32, max_y as i32)
    }

    pub fn area(&self) -> f64 {
        let corners = self.corners_approx();
        let n = corners.len();
        if n < 3 {
            return 0.0;
        }
        let mut doubled = 0.0;
        for i in 0..n {
            let a = &corners[i];
            let b = &corners[(i + 1) % n];
            doubled += a.x * b.y - b.x * a.y;
        }
        doubled.abs() / 2.0
    }

    pub fn translate(&self, v: Vector) -> Simplex {
        Simplex {
            lines: self.lines.iter().map(|l| l.translate(v)).collect(),
        }
    }

    pub fn turn_90(&self, factor: u8, pivot: Point) -> Simplex {
        Simplex::from_lines(
            self.lines
                .iter()
                .map(|l| l.turn_90(factor, pivot))
                .collect(),
        )
    }
}

fn dir(x: i32, y: i32) -> Direction {
    Direction::from_vector(Vector::new(x, y)).unwrap_or_else(|_| unreachable!())
}

fn box_lines(b: &IntBox) -> Vec<Line> {
    vec![
        Line::from_point_direction(Point::new(0, b.ll.y), dir(1, 0)),
        Line::from_point_direction(Point::new(b.ur.x, 0), dir(0, 1)),
        Line::from_point_direction(Point::new(0, b.ur.y), dir(-1, 0)),
        Line::from_point_direction(Point::new(b.ll.x, 0), dir(0, -1)),
    ]
}

fn world_box_lines() -> Vec<Line> {
    box_lines(&IntBox::new(
        -crate::MAX_COORD,
        -crate::MAX_COORD,
        crate::MAX_COORD,
        crate::MAX_COORD,
    ))
}

fn corner_between(l1: &Line, l2: &Line) -> CornerCalc {
    let d1 = l1.direction();
    if l2.direction() == d1.opposite() {
        // Antiparallel pair: either an empty (or boundary-only) slab, or two
        // edges connected at infinity along d1.
        match l2.side_of(&l1.a) {
            Side::Left => CornerCalc::Corner(Corner::Infinite { dir: d1, on: *l1 }),
            _ => CornerCalc::EmptyRegion,
        }
    } else {
        match l1.intersection(l2) {
            Ok(p) => CornerCalc::Corner(Corner::Finite(p)),
            // Equal directions are deduplicated before the sweep.
            Err(_) => CornerCalc::EmptyRegion,
        }
    }
}

fn corner_side(c: &Corner, l: &Line) -> Side {
    match c {
        Corner::Finite(p) => l.side_of_rational(p),
        Corner::Infinite { dir, on } => {
            let s = (l.b - l.a).cross(&dir.to_vector());
            if s > 0 {
                Side::Left
            } else if s < 0 {
                Side::Right
            } else {
                // The line runs parallel to the unbounded edge.
                l.side_of(&on.a)
            }
        }
    }
}

/// Redundant-constraint elimination: a rotational sweep over the
/// direction-sorted lines. Every feasibility decision is an exact sign test
/// on integer or rational coordinates; nothing is rounded.
fn normalize(input: Vec<Line>) -> Vec<Line> {
    let mut all = world_box_lines();
    all.extend(input);
    all.sort_by(|p, q| p.direction().cmp(&q.direction()));

    // Among parallel same-direction lines only the most restrictive survives.
    let mut lines: Vec<Line> = Vec::with_capacity(all.len());
    for l in all {
        match lines.last_mut() {
            Some(last) if last.direction() == l.direction() => {
                if last.side_of(&l.a) != Side::Right {
                    *last = l;
                }
            }
            _ => lines.push(l),
        }
    }

    let mut dq: VecDeque<Line> = VecDeque::new();
    for l in lines {
        loop {
            if dq.len() < 2 {
                break;
            }
            match corner_between(&dq[dq.len() - 2], &dq[dq.len() - 1]) {
                CornerCalc::EmptyRegion => return Vec::new(),
                CornerCalc::Corner(c) => {
                    if corner_side(&c, &l) != Side::Left {
                        dq.pop_back();
                    } else {
                        break;
                    }
                }
            }
        }
        loop {
            if dq.len() < 2 {
                break;
            }
            match corner_between(&dq[0], &dq[1]) {
                CornerCalc::EmptyRegion => return Vec::new(),
                CornerCalc::Corner(c) => {
                    if corner_side(&c, &l) != Side::Left {
                        dq.pop_front();
                    } else {
                        break;
                    }
                }
            }
        }
        dq.push_back(l);
    }

    // The wrap-around: first and last lines constrain each other's corners.
    loop {
        let mut changed = false;
        while dq.len() > 2 {
            match corner_between(&dq[dq.len() - 2], &dq[dq.len() - 1]) {
                CornerCalc::EmptyRegion => return Vec::new(),
                CornerCalc::Corner(c) => {
                    if corner_side(&c, &dq[0]) != Side::Left {
                        dq.pop_back();
                        changed = true;
                    } else {
                        break;
                    }
                }
            }
        }
        while dq.len() > 2 {
            match corner_between(&dq[0], &dq[1]) {
                CornerCalc::EmptyRegion => return Vec::new(),
                CornerCalc::Corner(c) => {
                    if corner_side(&c, &dq[dq.len() - 1]) != Side::Left {
                        dq.pop_front();
                        changed = true;
                    } else {
                        break;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    if dq.len() < 3 {
        return Vec::new();
    }
    let result: Vec<Line> = dq.into();
    // A bounded region with interior meets every adjacent pair in a finite
    // corner; anything else is degenerate.
    for i in 0..result.len() {
        match corner_between(&result[i], &result[(i + 1) % result.len()]) {
            CornerCalc::Corner(Corner::Finite(_)) => {}
            _ => return Vec::new(),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x1: i32, y1: i32, x2: i32, y2: i32) -> Simplex {
        Simplex::from_box(&IntBox::new(x1, y1, x2, y2))
    }

    #[test]
    fn test_box_simplex_has_four_lines() {
        let s = square(0, 0, 10, 10);
        assert_eq!(s.lines().len(), 4);
        assert!(s.contains(&Point::new(0, 0)));
        assert!(s.contains(&Point::new(5, 5)));
        assert!(!s.contains(&Point::new(11, 5)));
        assert!(!s.contains_strictly(&Point::new(0, 5)));
    }

    #[test]
    fn test_redundant_lines_removed() {
        // A diagonal cut through the square makes two of the box lines and
        // none of the world-box lines contribute.
        let mut lines = box_lines(&IntBox::new(0, 0, 10, 10));
        lines.push(Line::new(Point::new(10, 0), Point::new(0, 10)).unwrap());
        let s = Simplex::from_lines(lines);
        assert_eq!(s.lines().len(), 3);
        assert!(s.contains(&Point::new(1, 1)));
        assert!(!s.contains(&Point::new(8, 8)));
    }

    #[test]
    fn test_touching_squares_do_not_intersect() {
        let a = square(0, 0, 10, 10);
        let b = square(10, 0, 20, 10);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&square(9, 0, 20, 10)));
    }

    #[test]
    fn test_corner_touch_does_not_intersect() {
        let a = square(0, 0, 5, 5);
        let b = square(5, 5, 9, 9);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_intersection_stays_exact() {
        // Two squares rotated against each other intersect in a region whose
        // corners are not integer points; the result is still exact because
        // only boundary lines are kept.
        let a = square(0, 0, 10, 10);
        let diamond = Simplex::from_lines(vec![
            Line::new(Point::new(5, -6), Point::new(16, 5)).unwrap(),
            Line::new(Point::new(16, 5), Point::new(5, 16)).unwrap(),
            Line::new(Point::new(5, 16), Point::new(-6, 5)).unwrap(),
            Line::new(Point::new(-6, 5), Point::new(5, -6)).unwrap(),
        ]);
        let cut = a.intersection(&diamond);
        assert!(!cut.is_empty());
        assert!(cut.contains(&Point::new(5, 5)));
        // The intersection keeps only contributing lines of both inputs.
        for l in cut.lines() {
            assert!(a.lines().contains(l) || diamond.lines().contains(l));
        }
    }

    #[test]
    fn test_empty_constraints() {
        let lines = vec![
            Line::from_point_direction(Point::new(0, 0), dir(-1, 0)), // y <= 0
            Line::from_point_direction(Point::new(0, 10), dir(1, 0)), // y >= 10
        ];
        assert!(Simplex::from_lines(lines).is_empty());
    }

    #[test]
    fn test_bounding_box_rounds_rational_corners_outward() {
        // Triangle y >= 0, x + y <= 10, x > 2y with one corner at
        // (20/3, 10/3): the bounding box rounds it outward.
        let t = Simplex::from_lines(vec![
            Line::from_point_direction(Point::new(0, 0), dir(1, 0)),
            Line::from_point_direction(Point::new(10, 0), dir(-1, 1)),
            Line::from_point_direction(Point::new(0, 0), dir(-2, -1)),
        ]);
        assert!(!t.is_empty());
        assert_eq!(t.bounding_box(), IntBox::new(0, 0, 10, 4));
    }

    #[test]
    fn test_area_of_square() {
        let s = square(0, 0, 10, 10);
        assert!((s.area() - 100.0).abs() < 1e-9);
    }
}
