//! Drawing session: element list, cursor/heading state machine, anchors,
//! and the lazily built canvas.

use std::collections::HashMap;
use std::path::Path;

use crate::canvas::{Canvas, CanvasKind, CanvasOpts, ImageFormat, create_canvas};
use crate::element::Element;
use crate::foundation::error::DraftResult;
use crate::foundation::geom::{BBox, Point};
use crate::segment::Segment;
use crate::style::{DrawConfig, Theme};

/// The derived canvas: rebuilt lazily from the element list, invalidated by
/// any mutation. Never authoritative on its own.
enum CanvasState {
    Unbuilt,
    Built {
        kind: CanvasKind,
        canvas: Box<dyn Canvas>,
    },
}

/// A diagram under construction.
///
/// Elements are placed at the current cursor with the current heading; each
/// placement advances both. `push`/`pop` save and restore that state, and
/// named anchors mark positions for later reference. Rendering is lazy: the
/// backend canvas is built on the first [`Drawing::draw`] and reused until
/// the element list changes or a different backend is requested.
pub struct Drawing {
    config: DrawConfig,
    /// Placed elements, each with the (cursor, heading) it was entered at.
    elements: Vec<(Point, f64, Box<dyn Element>)>,
    cursor: Point,
    heading: f64,
    stack: Vec<(Point, f64)>,
    anchors: HashMap<String, Point>,
    canvas_state: CanvasState,
    default_kind: CanvasKind,
    interactive: bool,
    showframe: bool,
}

impl Default for Drawing {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawing {
    pub fn new() -> Self {
        Self::with_config(DrawConfig::default())
    }

    pub fn with_config(config: DrawConfig) -> Self {
        Self {
            config,
            elements: Vec::new(),
            cursor: Point::ZERO,
            heading: 0.0,
            stack: Vec::new(),
            anchors: HashMap::new(),
            canvas_state: CanvasState::Unbuilt,
            default_kind: CanvasKind::default(),
            interactive: false,
            showframe: false,
        }
    }

    pub fn with_theme(theme: Theme) -> Self {
        Self::with_config(theme.config())
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    /// Backend used when [`Drawing::draw`] is called without an explicit
    /// target.
    pub fn set_default_canvas(&mut self, kind: CanvasKind) {
        self.default_kind = kind;
    }

    /// Incremental mode: each added element is drawn onto a live canvas
    /// immediately instead of invalidating it.
    pub fn interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn show_frame(&mut self, show: bool) {
        self.showframe = show;
        self.canvas_state = CanvasState::Unbuilt;
    }

    /// Current cursor position.
    pub fn here(&self) -> Point {
        self.cursor
    }

    /// Current heading in degrees.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Place an element at the current cursor/heading and advance both to
    /// its exit state.
    pub fn add(&mut self, element: impl Element + 'static) -> DraftResult<()> {
        self.add_boxed(Box::new(element))
    }

    fn add_boxed(&mut self, mut element: Box<dyn Element>) -> DraftResult<()> {
        let entry = (self.cursor, self.heading);
        let (cursor, heading) = element.place(self.cursor, self.heading, &self.config);
        self.cursor = cursor;
        self.heading = heading;
        self.elements.push((entry.0, entry.1, element));
        tracing::debug!(
            elements = self.elements.len(),
            cursor_x = cursor.x,
            cursor_y = cursor.y,
            heading,
            "element placed"
        );

        if self.interactive {
            if matches!(self.canvas_state, CanvasState::Unbuilt) {
                self.build_canvas(self.default_kind)?;
            } else if let CanvasState::Built { canvas, .. } = &mut self.canvas_state {
                if let Some((_, _, element)) = self.elements.last() {
                    element.draw(canvas.as_mut());
                }
                let bbox = bounding_box_of(&self.elements);
                canvas.set_bbox(bbox);
            }
        } else {
            self.canvas_state = CanvasState::Unbuilt;
        }
        Ok(())
    }

    /// Place several elements in order.
    pub fn add_elements<I>(&mut self, elements: I) -> DraftResult<()>
    where
        I: IntoIterator<Item = Box<dyn Element>>,
    {
        for element in elements {
            self.add_boxed(element)?;
        }
        Ok(())
    }

    /// Remove the most recently added element, restoring the cursor and
    /// heading to the previous element's exit state (or, with nothing left,
    /// to the removed element's entry state).
    ///
    /// Precondition: at least one element has been added.
    pub fn undo(&mut self) {
        assert!(
            !self.elements.is_empty(),
            "undo() requires at least one placed element"
        );
        let Some((entry_cursor, entry_heading, _)) = self.elements.pop() else {
            unreachable!()
        };
        match self.elements.last() {
            Some((_, _, element)) => {
                let (cursor, heading) = element.exit_state();
                self.cursor = cursor;
                self.heading = heading;
            }
            None => {
                self.cursor = entry_cursor;
                self.heading = entry_heading;
            }
        }
        tracing::debug!(elements = self.elements.len(), "element removed");

        // Redraw the survivors from scratch on a live canvas.
        if let CanvasState::Built { canvas, .. } = &mut self.canvas_state {
            canvas.clear();
            for (_, _, element) in &self.elements {
                element.draw(canvas.as_mut());
            }
            canvas.set_bbox(bounding_box_of(&self.elements));
        }
    }

    /// Save the (cursor, heading) state.
    pub fn push(&mut self) {
        self.stack.push((self.cursor, self.heading));
    }

    /// Restore the most recently pushed state. Popping with an empty stack
    /// is a no-op.
    pub fn pop(&mut self) {
        if let Some((cursor, heading)) = self.stack.pop() {
            self.cursor = cursor;
            self.heading = heading;
        }
    }

    /// Move the cursor by a relative offset.
    pub fn move_cursor(&mut self, dx: f64, dy: f64) {
        self.cursor = self.cursor + Point::new(dx, dy);
    }

    /// Move the cursor relative to a reference point, optionally changing
    /// the heading.
    pub fn move_from(&mut self, reference: Point, dx: f64, dy: f64, heading: Option<f64>) {
        self.cursor = reference + Point::new(dx, dy);
        if let Some(heading) = heading {
            self.heading = heading;
        }
    }

    /// Name the current cursor position.
    pub fn set_anchor(&mut self, name: impl Into<String>) {
        self.anchors.insert(name.into(), self.cursor);
    }

    /// Look up a named anchor.
    pub fn get_anchor(&self, name: &str) -> Option<Point> {
        self.anchors.get(name).copied()
    }

    /// Aggregate bounding box of every placed element; the empty sentinel
    /// when no elements have been added.
    pub fn get_bounding_box(&self) -> BBox {
        bounding_box_of(&self.elements)
    }

    /// Flattened list of every placed segment, in insertion order.
    pub fn segments(&self) -> Vec<&Segment> {
        self.elements
            .iter()
            .flat_map(|(_, _, e)| e.segments().iter())
            .collect()
    }

    /// Build (or reuse) a canvas and draw every element onto it.
    ///
    /// With `target = None` an already built canvas is reused regardless of
    /// its kind; an explicit target rebuilds whenever the kind differs.
    #[tracing::instrument(skip(self))]
    pub fn draw(&mut self, target: Option<CanvasKind>) -> DraftResult<&mut dyn Canvas> {
        let rebuild = match (&self.canvas_state, target) {
            (CanvasState::Unbuilt, _) => true,
            (CanvasState::Built { .. }, None) => false,
            (CanvasState::Built { kind, .. }, Some(requested)) => *kind != requested,
        };
        if rebuild {
            self.build_canvas(target.unwrap_or(self.default_kind))?;
        }
        match &mut self.canvas_state {
            CanvasState::Built { canvas, .. } => Ok(canvas.as_mut()),
            CanvasState::Unbuilt => unreachable!("canvas was just built"),
        }
    }

    fn build_canvas(&mut self, kind: CanvasKind) -> DraftResult<()> {
        let opts = CanvasOpts {
            bbox: self.get_bounding_box(),
            inches_per_unit: self.config.inches_per_unit,
            showframe: self.showframe,
            bgcolor: self.config.bgcolor.clone(),
        };
        let mut canvas = create_canvas(kind, &opts)?;
        for (_, _, element) in &self.elements {
            element.draw(canvas.as_mut());
        }
        self.canvas_state = CanvasState::Built { kind, canvas };
        Ok(())
    }

    /// Draw if needed and write to `path`; the backend is chosen from the
    /// file extension (`.svg` forces the vector backend, raster extensions
    /// the raster backend, anything else the session default).
    pub fn save(&mut self, path: impl AsRef<Path>, transparent: bool, dpi: f64) -> DraftResult<()> {
        let path = path.as_ref();
        let target = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_ext)
            .map(|f| match f {
                ImageFormat::Svg => CanvasKind::Svg,
                _ => CanvasKind::Raster,
            });
        let canvas = self.draw(target)?;
        canvas.save(path, transparent, dpi)
    }

    /// Draw if needed and return encoded image bytes in `format`.
    pub fn image_bytes(&mut self, format: ImageFormat) -> DraftResult<Vec<u8>> {
        let target = match format {
            ImageFormat::Svg => CanvasKind::Svg,
            _ => CanvasKind::Raster,
        };
        let canvas = self.draw(Some(target))?;
        canvas.image_bytes(format, true, 72.0)
    }
}

fn bounding_box_of(elements: &[(Point, f64, Box<dyn Element>)]) -> BBox {
    elements
        .iter()
        .fold(BBox::EMPTY, |acc, (_, _, e)| acc.union(e.bounding_box()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::SegmentElement;
    use crate::style::Style;

    fn line(to: Point) -> SegmentElement {
        SegmentElement::new(vec![Segment::Path {
            points: vec![Point::ZERO, to],
            style: Style::default(),
        }])
    }

    #[test]
    fn add_advances_cursor() {
        let mut d = Drawing::new();
        d.add(line(Point::new(3.0, 0.0))).unwrap();
        assert_eq!(d.here(), Point::new(3.0, 0.0));
        d.add(line(Point::new(0.0, 2.0))).unwrap();
        assert_eq!(d.here(), Point::new(3.0, 2.0));
        assert_eq!(d.element_count(), 2);
    }

    #[test]
    fn matched_push_pop_restores_state() {
        let mut d = Drawing::new();
        d.add(line(Point::new(1.0, 0.0))).unwrap();
        let before = (d.here(), d.heading());
        d.push();
        d.push();
        d.move_cursor(5.0, 5.0);
        d.pop();
        d.pop();
        assert_eq!((d.here(), d.heading()), before);
    }

    #[test]
    fn pop_on_empty_stack_is_a_noop() {
        let mut d = Drawing::new();
        d.move_cursor(1.0, 2.0);
        d.pop();
        assert_eq!(d.here(), Point::new(1.0, 2.0));
    }

    #[test]
    fn bounding_box_is_union_of_element_boxes() {
        let mut d = Drawing::new();
        assert!(d.get_bounding_box().is_empty());
        d.add(line(Point::new(2.0, 1.0))).unwrap();
        d.add(line(Point::new(1.0, -3.0))).unwrap();
        let bbox = d.get_bounding_box();
        let union = d
            .segments()
            .iter()
            .fold(BBox::EMPTY, |acc, s| {
                acc.union(s.bounding_box(&crate::textmeasure::ApproxTextMeasure::default()))
            });
        assert_eq!(bbox, union);
    }

    #[test]
    fn undo_single_element_restores_pre_add_state() {
        let mut d = Drawing::new();
        d.move_cursor(1.0, 1.0);
        let before = (d.here(), d.heading());
        d.add(line(Point::new(4.0, 0.0))).unwrap();
        d.undo();
        assert_eq!((d.here(), d.heading()), before);
        assert_eq!(d.element_count(), 0);
        assert!(d.get_bounding_box().is_empty());
    }

    #[test]
    fn undo_restores_previous_exit_state() {
        let mut d = Drawing::new();
        d.add(line(Point::new(1.0, 0.0))).unwrap();
        let first_exit = (d.here(), d.heading());
        d.add(line(Point::new(0.0, 1.0))).unwrap();
        d.undo();
        assert_eq!((d.here(), d.heading()), first_exit);
        assert_eq!(d.element_count(), 1);
    }

    #[test]
    #[should_panic(expected = "undo() requires")]
    fn undo_on_empty_session_panics() {
        Drawing::new().undo();
    }

    #[test]
    fn anchors_are_explicit_lookups() {
        let mut d = Drawing::new();
        d.move_cursor(2.0, 3.0);
        d.set_anchor("tap");
        d.move_cursor(1.0, 0.0);
        assert_eq!(d.get_anchor("tap"), Some(Point::new(2.0, 3.0)));
        assert_eq!(d.get_anchor("missing"), None);
    }

    #[test]
    fn move_from_changes_cursor_and_heading() {
        let mut d = Drawing::new();
        d.move_from(Point::new(1.0, 1.0), 0.5, -0.5, Some(45.0));
        assert_eq!(d.here(), Point::new(1.5, 0.5));
        assert_eq!(d.heading(), 45.0);
    }

    #[test]
    fn draw_is_lazy_and_rebuilds_on_explicit_target() {
        let mut d = Drawing::new();
        d.add(line(Point::new(1.0, 0.0))).unwrap();
        d.draw(None).unwrap();
        assert!(matches!(d.canvas_state, CanvasState::Built { .. }));

        // Reuse without an explicit target.
        d.draw(None).unwrap();

        // Mutation invalidates.
        d.add(line(Point::new(1.0, 0.0))).unwrap();
        assert!(matches!(d.canvas_state, CanvasState::Unbuilt));
    }

    #[test]
    fn svg_bytes_round_trip_through_session() {
        let mut d = Drawing::new();
        d.add(line(Point::new(2.0, 0.0))).unwrap();
        let bytes = d.image_bytes(ImageFormat::Svg).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<path"));
    }

    #[test]
    fn heading_rotates_following_elements() {
        let mut d = Drawing::new();
        d.add(line(Point::new(1.0, 0.0)).theta(90.0)).unwrap();
        assert_eq!(d.heading(), 90.0);
        // Next element inherits the heading.
        d.add(line(Point::new(1.0, 0.0))).unwrap();
        assert!((d.here().x - 0.0).abs() < 1e-9);
        assert!((d.here().y - 2.0).abs() < 1e-9);
    }
}
