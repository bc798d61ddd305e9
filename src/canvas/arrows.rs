//! Arrowhead geometry shared by both backends.
//!
//! Both renderers must place identical heads for identical calls, so the
//! user-space tangent math lives here and each backend only rasterizes the
//! result its own way.

use crate::foundation::geom::Point;

use super::{ArrowAt, SweepArrow};

/// Fixed head length for Bezier end arrows, user units.
pub(crate) const BEZIER_HEAD: f64 = 0.2;

/// Head proportions for arc sweep arrows, user units.
pub(crate) const ARC_HEAD_LENGTH: f64 = 0.25;
pub(crate) const ARC_HEAD_WIDTH: f64 = 0.15;

/// An arrowhead request: head tip at `pos + dir`, pointing along `dir`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Head {
    pub pos: Point,
    pub dir: Point,
}

/// Heads for the requested ends of a Bezier curve, from the end tangents
/// `p[0] - p[1]` and `p[last] - p[last-1]` normalized to [`BEZIER_HEAD`].
///
/// Degenerate (zero-length) tangents produce no head.
pub(crate) fn bezier_heads(points: &[Point], arrow_at: ArrowAt) -> Vec<Head> {
    let mut heads = Vec::new();
    if points.len() < 2 {
        return heads;
    }
    if matches!(arrow_at, ArrowAt::Start | ArrowAt::Both) {
        if let Some(h) = end_head(points[0], points[1]) {
            heads.push(h);
        }
    }
    if matches!(arrow_at, ArrowAt::End | ArrowAt::Both) {
        let n = points.len();
        if let Some(h) = end_head(points[n - 1], points[n - 2]) {
            heads.push(h);
        }
    }
    heads
}

fn end_head(end: Point, inner: Point) -> Option<Head> {
    let delta = end - inner;
    let len = delta.length();
    if len < 1e-12 {
        return None;
    }
    let delta = delta / len * BEZIER_HEAD;
    Some(Head {
        pos: end - delta,
        dir: delta,
    })
}

/// Head tangential to an elliptical arc sweep, at the `Cw` start or `Ccw`
/// end, in user units before the backend's device transform.
///
/// The tangent direction mixes the eccentric-corrected angle for x with the
/// nominal angle for y, matching how both original renderers have always
/// placed these heads; keeping it here keeps the backends in agreement.
pub(crate) fn arc_head(
    center: Point,
    width: f64,
    height: f64,
    theta1: f64,
    theta2: f64,
    angle: f64,
    which: SweepArrow,
) -> Head {
    let ecc = |theta: f64| -> f64 {
        let (y, x) = theta.to_radians().sin_cos();
        ((width / height) * y).atan2(x).to_degrees()
    };
    let th1 = ecc(theta1);
    let th2 = ecc(theta2);

    let (dx, dy, on_ellipse) = match which {
        SweepArrow::Ccw => (
            (th2 + 90.0).to_radians().cos() * ARC_HEAD_LENGTH,
            (theta2 + 90.0).to_radians().sin() * ARC_HEAD_LENGTH,
            th2,
        ),
        SweepArrow::Cw => (
            -(th1 + 90.0).to_radians().cos() * ARC_HEAD_LENGTH,
            -(theta1 + 90.0).to_radians().sin() * ARC_HEAD_LENGTH,
            th1,
        ),
    };

    let xy = center
        + Point::new(
            width / 2.0 * on_ellipse.to_radians().cos(),
            height / 2.0 * on_ellipse.to_radians().sin(),
        );

    Head {
        pos: xy.rotate_about(angle, center),
        dir: Point::new(dx, dy).rotate(angle),
    }
}
