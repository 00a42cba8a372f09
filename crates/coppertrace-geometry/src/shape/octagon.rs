use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::line::Line;
use crate::point::Point;
use crate::shape::boxes::IntBox;
use crate::shape::simplex::Simplex;
use crate::vector::Vector;

/// A convex shape whose boundary directions are multiples of 45 degrees,
/// described by eight interval bounds:
///
/// `lx <= x <= rx`, `ly <= y <= uy`, `ulx <= x - y <= lrx`,
/// `llx <= x + y <= urx`.
///
/// Together with [`IntBox`] this is the hot path of pad-vs-trace checks:
/// intersection and overlap reduce to interval comparisons. The bounds of a
/// normalized octagon are mutually consistent (each is attained by some shape
/// point), so emptiness is a plain interval check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntOctagon {
    pub lx: i32,
    pub ly: i32,
    pub rx: i32,
    pub uy: i32,
    pub ulx: i32,
    pub lrx: i32,
    pub llx: i32,
    pub urx: i32,
}

impl IntOctagon {
    #[allow(clippy::too_many_arguments)]
    pub fn new(lx: i32, ly: i32, rx: i32, uy: i32, ulx: i32, lrx: i32, llx: i32, urx: i32) -> Self {
        Self {
            lx,
            ly,
            rx,
            uy,
            ulx,
            lrx,
            llx,
            urx,
        }
        .normalize()
    }

    pub fn from_box(b: &IntBox) -> Self {
        Self {
            lx: b.ll.x,
            ly: b.ll.y,
            rx: b.ur.x,
            uy: b.ur.y,
            ulx: b.ll.x - b.ur.y,
            lrx: b.ur.x - b.ll.y,
            llx: b.ll.x + b.ll.y,
            urx: b.ur.x + b.ur.y,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lx > self.rx || self.ly > self.uy || self.ulx > self.lrx || self.llx > self.urx
    }

    /// True when the octagon encloses no 2-dimensional region.
    pub fn has_no_interior(&self) -> bool {
        self.lx >= self.rx || self.ly >= self.uy || self.ulx >= self.lrx || self.llx >= self.urx
    }

    /// Tightens every bound against the others until nothing changes, so each
    /// bound is attained by an actual shape point. Inconsistent (empty) inputs
    /// stay recognizably empty.
    pub fn normalize(mut self) -> Self {
        for _ in 0..8 {
            let before = self;
            self.rx = self.rx.min(self.lrx + self.uy).min(self.urx - self.ly);
            self.lx = self.lx.max(self.ulx + self.ly).max(self.llx - self.uy);
            self.uy = self.uy.min(self.rx - self.ulx).min(self.urx - self.lx);
            self.ly = self.ly.max(self.lx - self.lrx).max(self.llx - self.rx);
            self.lrx = self.lrx.min(self.rx - self.ly).min(self.urx - 2 * self.ly);
            self.ulx = self.ulx.max(self.lx - self.uy).max(self.llx - 2 * self.uy);
            self.urx = self.urx.min(self.rx + self.uy).min(self.lrx + 2 * self.uy);
            self.llx = self.llx.max(self.lx + self.ly).max(self.ulx + 2 * self.ly);
            if self.is_empty() || self == before {
                break;
            }
        }
        self
    }

    pub fn intersection(&self, other: &IntOctagon) -> IntOctagon {
        IntOctagon {
            lx: self.lx.max(other.lx),
            ly: self.ly.max(other.ly),
            rx: self.rx.min(other.rx),
            uy: self.uy.min(other.uy),
            ulx: self.ulx.max(other.ulx),
            lrx: self.lrx.min(other.lrx),
            llx: self.llx.max(other.llx),
            urx: self.urx.min(other.urx),
        }
        .normalize()
    }

    /// Open-interior overlap: touching octagons do not intersect.
    pub fn intersects(&self, other: &IntOctagon) -> bool {
        !self.intersection(other).has_no_interior()
    }

    /// Closed containment including the boundary.
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.lx
            && p.x <= self.rx
            && p.y >= self.ly
            && p.y <= self.uy
            && p.x - p.y >= self.ulx
            && p.x - p.y <= self.lrx
            && p.x + p.y >= self.llx
            && p.x + p.y <= self.urx
    }

    /// Grows the octagon by `dist` on every side.
    ///
    /// The diagonal bounds move by `ceil(dist * sqrt(2))`, rounding outward so
    /// the offset shape is never smaller than the true Minkowski sum.
    pub fn offset(&self, dist: i32) -> IntOctagon {
        let diag = ((dist as f64) * std::f64::consts::SQRT_2).ceil() as i32;
        IntOctagon {
            lx: self.lx - dist,
            ly: self.ly - dist,
            rx: self.rx + dist,
            uy: self.uy + dist,
            ulx: self.ulx - diag,
            lrx: self.lrx + diag,
            llx: self.llx - diag,
            urx: self.urx + diag,
        }
        .normalize()
    }

    pub fn bounding_box(&self) -> IntBox {
        if self.is_empty() {
            return IntBox::EMPTY;
        }
        IntBox::new(self.lx, self.ly, self.rx, self.uy)
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let w = (self.rx - self.lx) as f64;
        let h = (self.uy - self.ly) as f64;
        // Corner triangles cut off the bounding box by the diagonal bounds.
        let c_ll = ((self.llx - (self.lx + self.ly)).max(0)) as f64;
        let c_lr = (((self.rx - self.ly) - self.lrx).max(0)) as f64;
        let c_ur = (((self.rx + self.uy) - self.urx).max(0)) as f64;
        let c_ul = ((self.ulx - (self.lx - self.uy)).max(0)) as f64;
        w * h - 0.5 * (c_ll * c_ll + c_lr * c_lr + c_ur * c_ur + c_ul * c_ul)
    }

    pub fn translate(&self, v: Vector) -> IntOctagon {
        IntOctagon {
            lx: self.lx + v.x,
            ly: self.ly + v.y,
            rx: self.rx + v.x,
            uy: self.uy + v.y,
            ulx: self.ulx + v.x - v.y,
            lrx: self.lrx + v.x - v.y,
            llx: self.llx + v.x + v.y,
            urx: self.urx + v.x + v.y,
        }
    }

    pub fn turn_90(&self, factor: u8, pivot: Point) -> IntOctagon {
        let shifted = self.translate(Point::ORIGIN - pivot);
        let mut r = shifted;
        for _ in 0..factor % 4 {
            // (x, y) -> (-y, x): x' in [-uy, -ly], y' in [lx, rx],
            // x' - y' = -(x + y), x' + y' = x - y.
            r = IntOctagon {
                lx: -r.uy,
                ly: r.lx,
                rx: -r.ly,
                uy: r.rx,
                ulx: -r.urx,
                lrx: -r.llx,
                llx: r.ulx,
                urx: r.lrx,
            };
        }
        r.translate(pivot - Point::ORIGIN)
    }

    /// The boundary lines as directed half-planes with the interior on the
    /// left, for handing an octagon to the simplex machinery.
    pub fn to_simplex(&self) -> Simplex {
        if self.is_empty() {
            return Simplex::empty();
        }
        let dir = |x: i32, y: i32| Direction::from_vector(Vector::new(x, y)).unwrap_or_else(|_| unreachable!());
        let lines = vec![
            Line::from_point_direction(Point::new(0, self.ly), dir(1, 0)),
            Line::from_point_direction(Point::new(self.lrx, 0), dir(1, 1)),
            Line::from_point_direction(Point::new(self.rx, 0), dir(0, 1)),
            Line::from_point_direction(Point::new(self.urx, 0), dir(-1, 1)),
            Line::from_point_direction(Point::new(0, self.uy), dir(-1, 0)),
            Line::from_point_direction(Point::new(self.ulx, 0), dir(-1, -1)),
            Line::from_point_direction(Point::new(self.lx, 0), dir(0, -1)),
            Line::from_point_direction(Point::new(self.llx, 0), dir(1, -1)),
        ];
        Simplex::from_lines(lines)
    }
}
