use std::ops::{Add, Div, Mul, Neg, Sub};

/// A point (or free vector) in user units.
///
/// Immutable value type: every operation returns a new point. Rotation angles
/// are in degrees, counter-clockwise.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// In-band pen-up marker for poly-lines: a non-finite coordinate pair
    /// splits a path into disconnected subpaths.
    pub const GAP: Point = Point {
        x: f64::NAN,
        y: f64::NAN,
    };

    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether either coordinate is the pen-up sentinel.
    pub fn is_gap(self) -> bool {
        !self.x.is_finite() || !self.y.is_finite()
    }

    /// Rotate about the origin by `theta` degrees.
    pub fn rotate(self, theta: f64) -> Self {
        let (sin, cos) = theta.to_radians().sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Rotate about an arbitrary `center` by `theta` degrees.
    pub fn rotate_about(self, theta: f64, center: Point) -> Self {
        (self - center).rotate(theta) + center
    }

    /// Euclidean length of the vector from the origin.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Axis-aligned bounding box in user units.
///
/// Starts as the empty sentinel (`xmin/ymin = +inf`, `xmax/ymax = -inf`) and
/// is widened monotonically by [`BBox::expand`] and [`BBox::union`]. Once any
/// finite geometry has been folded in, `xmin <= xmax` and `ymin <= ymax`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BBox {
    /// The empty sentinel: expanding it by any point yields that point's box.
    pub const EMPTY: BBox = BBox {
        xmin: f64::INFINITY,
        ymin: f64::INFINITY,
        xmax: f64::NEG_INFINITY,
        ymax: f64::NEG_INFINITY,
    };

    pub const fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Whether no finite geometry has been accumulated (any non-finite edge).
    pub fn is_empty(&self) -> bool {
        !(self.xmin.is_finite()
            && self.ymin.is_finite()
            && self.xmax.is_finite()
            && self.ymax.is_finite())
    }

    /// Widen to include `p`. Gap markers are ignored.
    pub fn expand(&mut self, p: Point) {
        if p.is_gap() {
            return;
        }
        self.xmin = self.xmin.min(p.x);
        self.ymin = self.ymin.min(p.y);
        self.xmax = self.xmax.max(p.x);
        self.ymax = self.ymax.max(p.y);
    }

    /// Union of two boxes (min of mins, max of maxes).
    pub fn union(self, other: BBox) -> BBox {
        BBox {
            xmin: self.xmin.min(other.xmin),
            ymin: self.ymin.min(other.ymin),
            xmax: self.xmax.max(other.xmax),
            ymax: self.ymax.max(other.ymax),
        }
    }

    /// Grow by `amount` user units on every side.
    pub fn pad(self, amount: f64) -> BBox {
        BBox {
            xmin: self.xmin - amount,
            ymin: self.ymin - amount,
            xmax: self.xmax + amount,
            ymax: self.ymax + amount,
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn rotate_then_unrotate_is_identity() {
        let p = Point::new(3.25, -1.5);
        for theta in [0.0, 17.0, 90.0, 123.4, 270.0, 359.0] {
            assert!(close(p.rotate(theta).rotate(-theta), p));
        }
    }

    #[test]
    fn rotate_about_center() {
        let c = Point::new(1.0, 1.0);
        let p = Point::new(2.0, 1.0);
        assert!(close(p.rotate_about(90.0, c), Point::new(1.0, 2.0)));
        assert!(close(p.rotate_about(180.0, c), Point::new(0.0, 1.0)));
    }

    #[test]
    fn arithmetic_ops() {
        let p = Point::new(1.0, 2.0) + Point::new(0.5, -1.0);
        assert_eq!(p, Point::new(1.5, 1.0));
        assert_eq!(p * 2.0, Point::new(3.0, 2.0));
        assert_eq!(Point::new(3.0, 4.0).length(), 5.0);
    }

    #[test]
    fn gap_marker_is_detected_and_skipped() {
        assert!(Point::GAP.is_gap());
        assert!(Point::new(f64::NAN, 0.0).is_gap());
        assert!(!Point::new(0.0, 0.0).is_gap());

        let mut bbox = BBox::EMPTY;
        bbox.expand(Point::GAP);
        assert!(bbox.is_empty());
    }

    #[test]
    fn bbox_accumulates_monotonically() {
        let mut bbox = BBox::EMPTY;
        assert!(bbox.is_empty());
        bbox.expand(Point::new(1.0, 2.0));
        bbox.expand(Point::new(-1.0, 0.5));
        assert!(!bbox.is_empty());
        assert_eq!(bbox, BBox::new(-1.0, 0.5, 1.0, 2.0));

        let other = BBox::new(0.0, -3.0, 4.0, 0.0);
        let u = bbox.union(other);
        assert_eq!(u, BBox::new(-1.0, -3.0, 4.0, 2.0));

        // Union with the sentinel is the identity.
        assert_eq!(u.union(BBox::EMPTY), u);
    }
}
