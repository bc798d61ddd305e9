//! Element-to-engine contract.
//!
//! Concrete symbol catalogs live outside this crate; the engine only needs
//! the narrow [`Element`] interface: place yourself given the current cursor
//! and heading, expose your positioned segments, and report the state the
//! cursor should continue from.

use crate::canvas::Canvas;
use crate::foundation::geom::{BBox, Point};
use crate::segment::Segment;
use crate::style::DrawConfig;
use crate::textmeasure::ApproxTextMeasure;

/// A placeable diagram element.
pub trait Element {
    /// Place the element given the session cursor and heading (degrees) and
    /// the session configuration. Returns the exit cursor and heading the
    /// session continues from. Must be called before the other operations.
    fn place(&mut self, cursor: Point, heading: f64, config: &DrawConfig) -> (Point, f64);

    /// Positioned, styled segments. Empty before [`Element::place`].
    fn segments(&self) -> &[Segment];

    /// The (cursor, heading) recorded by the last [`Element::place`], used to
    /// restore session state on undo.
    fn exit_state(&self) -> (Point, f64);

    /// Bounding box of the placed segments.
    fn bounding_box(&self) -> BBox {
        let measure = ApproxTextMeasure::default();
        self.segments()
            .iter()
            .fold(BBox::EMPTY, |acc, s| acc.union(s.bounding_box(&measure)))
    }

    /// Issue the canvas calls for every placed segment.
    fn draw(&self, canvas: &mut dyn Canvas) {
        for segment in self.segments() {
            segment.draw(canvas);
        }
    }
}

/// A generic element: a bundle of segments defined relative to the element
/// origin, rotated to the session heading and translated to the cursor when
/// placed.
///
/// Segments still carrying the exact default style pick up the session
/// configuration (theme colors, line width) at placement; explicitly styled
/// segments are left alone.
///
/// The exit cursor is, in order of preference: the explicit drop point, the
/// last endpoint of the final segment, or the element origin.
#[derive(Clone, Debug, Default)]
pub struct SegmentElement {
    segments: Vec<Segment>,
    placed: Vec<Segment>,
    at: Option<Point>,
    theta: Option<f64>,
    drop: Option<Point>,
    exit: Option<(Point, f64)>,
}

impl SegmentElement {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            ..Self::default()
        }
    }

    /// Anchor at an absolute position instead of the session cursor.
    pub fn at(mut self, pos: Point) -> Self {
        self.at = Some(pos);
        self
    }

    /// Use an absolute heading instead of the session heading.
    pub fn theta(mut self, degrees: f64) -> Self {
        self.theta = Some(degrees);
        self
    }

    /// Exit point relative to the element origin (pre-transform).
    pub fn drop(mut self, pos: Point) -> Self {
        self.drop = Some(pos);
        self
    }
}

impl Element for SegmentElement {
    fn place(&mut self, cursor: Point, heading: f64, config: &DrawConfig) -> (Point, f64) {
        let origin = self.at.unwrap_or(cursor);
        let heading = self.theta.unwrap_or(heading);

        self.placed = self
            .segments
            .iter()
            .map(|s| s.themed(config).transformed(origin, heading))
            .collect();

        let exit_cursor = match self.drop {
            Some(drop) => drop.rotate(heading) + origin,
            None => self
                .placed
                .last()
                .and_then(Segment::end_point)
                .unwrap_or(origin),
        };
        self.exit = Some((exit_cursor, heading));
        (exit_cursor, heading)
    }

    fn segments(&self) -> &[Segment] {
        &self.placed
    }

    fn exit_state(&self) -> (Point, f64) {
        self.exit
            .expect("exit_state() queried before place()")
    }
}
