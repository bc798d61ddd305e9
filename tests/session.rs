use draftline::{
    BBox, CanvasKind, Drawing, Element, ImageFormat, Point, Segment, SegmentElement, Style, Theme,
};

fn line(to: Point) -> SegmentElement {
    SegmentElement::new(vec![Segment::Path {
        points: vec![Point::ZERO, to],
        style: Style::default(),
    }])
}

#[test]
fn cursor_walks_through_a_chain_of_elements() {
    let mut d = Drawing::new();
    d.add(line(Point::new(3.0, 0.0))).unwrap();
    d.add(line(Point::new(0.0, 2.0))).unwrap();
    d.add(line(Point::new(-1.0, 0.0))).unwrap();
    assert_eq!(d.here(), Point::new(2.0, 2.0));
    assert_eq!(d.element_count(), 3);
}

#[test]
fn push_pop_sequences_restore_state() {
    let mut d = Drawing::new();
    d.add(line(Point::new(1.0, 1.0))).unwrap();
    let saved = (d.here(), d.heading());

    for depth in 1..4 {
        for _ in 0..depth {
            d.push();
        }
        d.move_cursor(7.0, -2.0);
        d.move_from(Point::ZERO, 0.0, 0.0, Some(135.0));
        for _ in 0..depth {
            d.pop();
        }
        assert_eq!((d.here(), d.heading()), saved, "depth {depth}");
    }
}

#[test]
fn session_bbox_unions_every_element() {
    let mut d = Drawing::new();
    d.add(line(Point::new(2.0, 1.0))).unwrap();
    d.push();
    d.move_from(Point::new(-3.0, -2.0), 0.0, 0.0, None);
    d.add(line(Point::new(1.0, 1.0))).unwrap();
    d.pop();

    let bbox = d.get_bounding_box();
    assert_eq!(bbox, BBox::new(-3.0, -2.0, 2.0, 1.0));
}

#[test]
fn undo_round_trip_after_single_add() {
    let mut d = Drawing::new();
    d.move_cursor(0.5, 0.5);
    let before = (d.here(), d.heading());
    d.add(line(Point::new(2.0, 0.0))).unwrap();
    assert_ne!(d.here(), before.0);
    d.undo();
    assert_eq!((d.here(), d.heading()), before);
    assert_eq!(d.element_count(), 0);
    assert!(d.get_bounding_box().is_empty());
}

#[test]
fn anchors_survive_later_moves() {
    let mut d = Drawing::new();
    d.add(line(Point::new(1.0, 0.0))).unwrap();
    d.set_anchor("joint");
    d.add(line(Point::new(1.0, 0.0))).unwrap();
    let joint = d.get_anchor("joint").unwrap();
    d.move_from(joint, 0.0, -1.0, None);
    assert_eq!(d.here(), Point::new(1.0, -1.0));
}

#[test]
fn drawing_exports_svg_bytes() {
    let mut d = Drawing::with_theme(Theme::Dark);
    d.add(line(Point::new(2.0, 0.0))).unwrap();
    let svg = String::from_utf8(d.image_bytes(ImageFormat::Svg).unwrap()).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("stroke:white;"));
    assert!(svg.contains("background-color:black;"));
}

#[test]
fn save_infers_backend_from_extension() {
    let mut d = Drawing::new();
    d.add(line(Point::new(1.0, 0.0))).unwrap();
    let path = std::env::temp_dir().join("draftline_session_test.svg");
    d.save(&path, true, 72.0).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("<svg"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn explicit_target_rebuilds_canvas() {
    let mut d = Drawing::new();
    d.add(line(Point::new(1.0, 0.0))).unwrap();
    d.draw(Some(CanvasKind::Svg)).unwrap();
    // Same kind again reuses; a second draw with no target also reuses.
    d.draw(None).unwrap();
    d.draw(Some(CanvasKind::Svg)).unwrap();

    #[cfg(feature = "raster")]
    {
        d.draw(Some(CanvasKind::Raster)).unwrap();
        let bytes = d.image_bytes(ImageFormat::Png).unwrap();
        assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");
    }
}

#[test]
fn flattened_segments_follow_insertion_order() {
    let mut d = Drawing::new();
    d.add(line(Point::new(1.0, 0.0))).unwrap();
    d.add(SegmentElement::new(vec![
        Segment::Circle {
            center: Point::ZERO,
            radius: 0.5,
            style: Style::default(),
        },
        Segment::Path {
            points: vec![Point::ZERO, Point::new(0.0, 1.0)],
            style: Style::default(),
        },
    ]))
    .unwrap();
    let segments = d.segments();
    assert_eq!(segments.len(), 3);
    assert!(matches!(segments[0], Segment::Path { .. }));
    assert!(matches!(segments[1], Segment::Circle { .. }));
}

#[test]
fn custom_elements_plug_into_the_session() {
    /// Minimal hand-rolled element: a unit square that exits at its far
    /// corner with the heading turned 90 degrees.
    struct Corner {
        placed: Vec<Segment>,
        exit: (Point, f64),
    }

    impl Element for Corner {
        fn place(
            &mut self,
            cursor: Point,
            heading: f64,
            _config: &draftline::DrawConfig,
        ) -> (Point, f64) {
            let square = Segment::Poly {
                verts: vec![
                    Point::ZERO,
                    Point::new(1.0, 0.0),
                    Point::new(1.0, 1.0),
                    Point::new(0.0, 1.0),
                ],
                closed: true,
                style: Style::default(),
            };
            self.placed = vec![square.transformed(cursor, heading)];
            self.exit = (cursor + Point::new(1.0, 1.0).rotate(heading), heading + 90.0);
            self.exit
        }

        fn segments(&self) -> &[Segment] {
            &self.placed
        }

        fn exit_state(&self) -> (Point, f64) {
            self.exit
        }
    }

    let mut d = Drawing::new();
    d.add(Corner {
        placed: Vec::new(),
        exit: (Point::ZERO, 0.0),
    })
    .unwrap();
    assert_eq!(d.here(), Point::new(1.0, 1.0));
    assert_eq!(d.heading(), 90.0);
}
