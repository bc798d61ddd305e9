//! Drawing primitives.
//!
//! A [`Segment`] is a write-once primitive in user-space coordinates carrying
//! its own style attributes (and, through them, an optional clip rectangle).
//! Elements build segments relative to their local origin; placement rotates
//! and translates them into the drawing via [`Segment::transformed`], after
//! which they are handed to whichever canvas backend is active.

use crate::canvas::{ArrowAt, Canvas, SweepArrow};
use crate::foundation::geom::{BBox, Point};
use crate::style::{Halign, Style, TextStyle, Valign};
use crate::textmeasure::TextMeasure;

#[derive(Clone, Debug)]
pub enum Segment {
    /// Poly-line, possibly multi-subpath via [`Point::GAP`] markers.
    Path { points: Vec<Point>, style: Style },
    /// Vertex chain; `closed = false` draws as an open path.
    Poly {
        verts: Vec<Point>,
        closed: bool,
        style: Style,
    },
    Circle {
        center: Point,
        radius: f64,
        style: Style,
    },
    /// Elliptical arc from `theta1` to `theta2` parameter degrees, rotated by
    /// `angle` about the center, with an optional tangential arrowhead.
    Arc {
        center: Point,
        width: f64,
        height: f64,
        theta1: f64,
        theta2: f64,
        angle: f64,
        arrow: Option<SweepArrow>,
        style: Style,
    },
    /// Filled arrowhead with tip at `pos + direction`.
    Arrow {
        pos: Point,
        direction: Point,
        headwidth: f64,
        headlength: f64,
        style: Style,
    },
    /// Quadratic or cubic Bezier with optional end arrowheads.
    Bezier {
        points: Vec<Point>,
        arrow_at: Option<ArrowAt>,
        style: Style,
    },
    Text {
        text: String,
        pos: Point,
        style: TextStyle,
    },
}

impl Segment {
    /// The segment rotated by `theta` degrees about the origin and then
    /// translated by `origin` (the element placement transform).
    pub fn transformed(&self, origin: Point, theta: f64) -> Segment {
        let xf = |p: Point| -> Point {
            if p.is_gap() {
                p
            } else {
                p.rotate(theta) + origin
            }
        };
        match self {
            Segment::Path { points, style } => Segment::Path {
                points: points.iter().map(|p| xf(*p)).collect(),
                style: style.clone(),
            },
            Segment::Poly {
                verts,
                closed,
                style,
            } => Segment::Poly {
                verts: verts.iter().map(|p| xf(*p)).collect(),
                closed: *closed,
                style: style.clone(),
            },
            Segment::Circle {
                center,
                radius,
                style,
            } => Segment::Circle {
                center: xf(*center),
                radius: *radius,
                style: style.clone(),
            },
            Segment::Arc {
                center,
                width,
                height,
                theta1,
                theta2,
                angle,
                arrow,
                style,
            } => Segment::Arc {
                center: xf(*center),
                width: *width,
                height: *height,
                theta1: *theta1,
                theta2: *theta2,
                angle: angle + theta,
                arrow: *arrow,
                style: style.clone(),
            },
            Segment::Arrow {
                pos,
                direction,
                headwidth,
                headlength,
                style,
            } => Segment::Arrow {
                pos: xf(*pos),
                direction: direction.rotate(theta),
                headwidth: *headwidth,
                headlength: *headlength,
                style: style.clone(),
            },
            Segment::Bezier {
                points,
                arrow_at,
                style,
            } => Segment::Bezier {
                points: points.iter().map(|p| xf(*p)).collect(),
                arrow_at: *arrow_at,
                style: style.clone(),
            },
            Segment::Text { text, pos, style } => Segment::Text {
                text: text.clone(),
                pos: xf(*pos),
                style: TextStyle {
                    rotation: style.rotation + theta,
                    ..style.clone()
                },
            },
        }
    }

    /// User-space bounding box. Text extents come from the measurement
    /// collaborator; rotated text is boxed conservatively at its anchor.
    pub fn bounding_box(&self, measure: &dyn TextMeasure) -> BBox {
        let mut bbox = BBox::EMPTY;
        match self {
            Segment::Path { points, .. } => {
                for p in points {
                    bbox.expand(*p);
                }
            }
            Segment::Poly { verts, .. } => {
                for v in verts {
                    bbox.expand(*v);
                }
            }
            Segment::Circle { center, radius, .. } => {
                bbox.expand(*center + Point::new(*radius, *radius));
                bbox.expand(*center - Point::new(*radius, *radius));
            }
            Segment::Arc {
                center,
                width,
                height,
                angle,
                ..
            } => {
                let rot = angle.to_radians();
                let ex = (width / 2.0 * rot.cos()).abs() + (height / 2.0 * rot.sin()).abs();
                let ey = (width / 2.0 * rot.sin()).abs() + (height / 2.0 * rot.cos()).abs();
                bbox.expand(*center + Point::new(ex, ey));
                bbox.expand(*center - Point::new(ex, ey));
            }
            Segment::Arrow { pos, direction, .. } => {
                bbox.expand(*pos);
                bbox.expand(*pos + *direction);
            }
            Segment::Bezier { points, .. } => {
                // Control points bound the curve (convex hull property).
                for p in points {
                    bbox.expand(*p);
                }
            }
            Segment::Text { text, pos, style } => {
                let size = measure.measure(text, &style.fontfamily, style.fontsize);
                let (x0, x1) = match style.halign {
                    Halign::Left => (pos.x, pos.x + size.width),
                    Halign::Center => (pos.x - size.width / 2.0, pos.x + size.width / 2.0),
                    Halign::Right => (pos.x - size.width, pos.x),
                };
                let (y0, y1) = match style.valign {
                    Valign::Top => (pos.y - size.height, pos.y),
                    Valign::Center => (pos.y - size.height / 2.0, pos.y + size.height / 2.0),
                    Valign::Bottom => (pos.y, pos.y + size.height),
                };
                bbox.expand(Point::new(x0, y0));
                bbox.expand(Point::new(x1, y1));
            }
        }
        bbox
    }

    /// Resolve an untouched default style against the session configuration,
    /// so default-styled segments follow the session's color/width/theme.
    /// Explicitly styled segments are returned unchanged.
    pub fn themed(&self, config: &crate::style::DrawConfig) -> Segment {
        let mut seg = self.clone();
        match &mut seg {
            Segment::Text { style, .. } => {
                if *style == TextStyle::default() {
                    *style = config.text_style();
                }
            }
            Segment::Path { style, .. }
            | Segment::Poly { style, .. }
            | Segment::Circle { style, .. }
            | Segment::Arc { style, .. }
            | Segment::Arrow { style, .. }
            | Segment::Bezier { style, .. } => {
                if *style == Style::default() {
                    *style = config.style();
                }
            }
        }
        seg
    }

    /// Compositing priority of this segment.
    pub fn zorder(&self) -> i32 {
        match self {
            Segment::Path { style, .. }
            | Segment::Poly { style, .. }
            | Segment::Circle { style, .. }
            | Segment::Arc { style, .. }
            | Segment::Arrow { style, .. }
            | Segment::Bezier { style, .. } => style.zorder,
            Segment::Text { style, .. } => style.zorder,
        }
    }

    /// Endpoint a cursor would naturally continue from, if the segment has
    /// one.
    pub fn end_point(&self) -> Option<Point> {
        match self {
            Segment::Path { points, .. } => points.iter().rev().copied().find(|p| !p.is_gap()),
            Segment::Poly { verts, .. } => verts.first().copied(),
            Segment::Arrow { pos, direction, .. } => Some(*pos + *direction),
            Segment::Bezier { points, .. } => points.last().copied(),
            Segment::Circle { .. } | Segment::Arc { .. } | Segment::Text { .. } => None,
        }
    }

    /// Issue the matching canvas call.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        match self {
            Segment::Path { points, style } => canvas.plot(points, style),
            Segment::Poly {
                verts,
                closed,
                style,
            } => canvas.poly(verts, *closed, style),
            Segment::Circle {
                center,
                radius,
                style,
            } => canvas.circle(*center, *radius, style),
            Segment::Arc {
                center,
                width,
                height,
                theta1,
                theta2,
                angle,
                arrow,
                style,
            } => canvas.arc(
                *center, *width, *height, *theta1, *theta2, *angle, style, *arrow,
            ),
            Segment::Arrow {
                pos,
                direction,
                headwidth,
                headlength,
                style,
            } => canvas.arrow(*pos, *direction, *headwidth, *headlength, style),
            Segment::Bezier {
                points,
                arrow_at,
                style,
            } => canvas.bezier(points, style, *arrow_at),
            Segment::Text { text, pos, style } => canvas.text(text, *pos, style),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textmeasure::ApproxTextMeasure;

    fn line(points: &[Point]) -> Segment {
        Segment::Path {
            points: points.to_vec(),
            style: Style::default(),
        }
    }

    #[test]
    fn transform_rotates_then_translates() {
        let seg = line(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        let moved = seg.transformed(Point::new(10.0, 0.0), 90.0);
        match moved {
            Segment::Path { points, .. } => {
                assert!((points[1].x - 10.0).abs() < 1e-9);
                assert!((points[1].y - 1.0).abs() < 1e-9);
            }
            other => panic!("expected path, got {other:?}"),
        }
    }

    #[test]
    fn transform_preserves_gap_markers() {
        let seg = line(&[Point::new(0.0, 0.0), Point::GAP, Point::new(1.0, 0.0)]);
        match seg.transformed(Point::new(1.0, 1.0), 45.0) {
            Segment::Path { points, .. } => assert!(points[1].is_gap()),
            other => panic!("expected path, got {other:?}"),
        }
    }

    #[test]
    fn arc_transform_accumulates_rotation() {
        let seg = Segment::Arc {
            center: Point::ZERO,
            width: 2.0,
            height: 1.0,
            theta1: 0.0,
            theta2: 90.0,
            angle: 10.0,
            arrow: None,
            style: Style::default(),
        };
        match seg.transformed(Point::ZERO, 20.0) {
            Segment::Arc { angle, .. } => assert!((angle - 30.0).abs() < 1e-9),
            other => panic!("expected arc, got {other:?}"),
        }
    }

    #[test]
    fn circle_bbox_spans_diameter() {
        let seg = Segment::Circle {
            center: Point::new(1.0, 1.0),
            radius: 0.5,
            style: Style::default(),
        };
        let bbox = seg.bounding_box(&ApproxTextMeasure::default());
        assert_eq!(bbox, BBox::new(0.5, 0.5, 1.5, 1.5));
    }

    #[test]
    fn text_bbox_respects_alignment() {
        let measure = ApproxTextMeasure::default();
        let seg = Segment::Text {
            text: "abc".to_string(),
            pos: Point::ZERO,
            style: TextStyle {
                halign: Halign::Left,
                valign: Valign::Bottom,
                ..TextStyle::default()
            },
        };
        let bbox = seg.bounding_box(&measure);
        assert_eq!(bbox.xmin, 0.0);
        assert_eq!(bbox.ymin, 0.0);
        assert!(bbox.xmax > 0.0);
        assert!(bbox.ymax > 0.0);
    }

    #[test]
    fn themed_swaps_default_styles_only() {
        let config = crate::style::Theme::Dark.config();
        let default_line = line(&[Point::ZERO, Point::new(1.0, 0.0)]);
        match default_line.themed(&config) {
            Segment::Path { style, .. } => assert_eq!(style.color, "white"),
            other => panic!("expected path, got {other:?}"),
        }

        let explicit = Segment::Path {
            points: vec![Point::ZERO],
            style: Style::default().with_color("red"),
        };
        match explicit.themed(&config) {
            Segment::Path { style, .. } => assert_eq!(style.color, "red"),
            other => panic!("expected path, got {other:?}"),
        }
    }

    #[test]
    fn path_end_point_skips_trailing_gap() {
        let seg = line(&[Point::new(0.0, 0.0), Point::new(1.0, 2.0), Point::GAP]);
        assert_eq!(seg.end_point(), Some(Point::new(1.0, 2.0)));
    }
}
