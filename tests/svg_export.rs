use draftline::{
    ArrowAt, Canvas, CanvasOpts, ImageFormat, Point, Style, SvgFigure, TextStyle,
};

fn figure() -> SvgFigure {
    SvgFigure::new(CanvasOpts::default())
}

fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn exported_document_reparses_as_svg() {
    let mut fig = figure();
    fig.plot(
        &[
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        ],
        &Style::default(),
    );
    fig.circle(Point::new(1.0, 0.5), 0.5, &Style::default().with_fill("red"));
    fig.poly(
        &[
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.5, 1.0),
        ],
        true,
        &Style::default(),
    );
    fig.arc(
        Point::new(1.0, 1.0),
        2.0,
        1.0,
        0.0,
        90.0,
        0.0,
        &Style::default(),
        None,
    );

    let svg = String::from_utf8(fig.image_bytes(ImageFormat::Svg, true, 72.0).unwrap()).unwrap();
    let tree = usvg::Tree::from_str(&svg, &usvg::Options::default()).unwrap();

    // Every submitted primitive survives the round trip as a drawable node.
    fn count_paths(group: &usvg::Group) -> usize {
        group
            .children()
            .iter()
            .map(|node| match node {
                usvg::Node::Path(_) => 1,
                usvg::Node::Group(g) => count_paths(g),
                _ => 0,
            })
            .sum()
    }
    assert_eq!(count_paths(tree.root()), 4);
}

#[test]
fn node_count_tracks_submitted_primitives() {
    let mut fig = figure();
    fig.circle(Point::new(0.0, 0.0), 1.0, &Style::default());
    fig.plot(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)], &Style::default());
    // An arrowhead is two nodes: filled tip and shaft cap.
    fig.arrow(
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        0.2,
        0.2,
        &Style::default(),
    );
    assert_eq!(fig.node_count(), 4);

    let svg = fig.to_svg();
    assert_eq!(count_occurrences(&svg, "<circle"), 1);
    assert_eq!(count_occurrences(&svg, "<path"), 3);
}

#[test]
fn export_serializes_in_ascending_zorder() {
    let mut fig = figure();
    for (i, z) in [(0, 4), (1, 1), (2, 3), (3, 2)] {
        fig.circle(
            Point::new(f64::from(i), 0.0),
            0.4,
            &Style::default().with_zorder(z),
        );
    }
    let svg = fig.to_svg();
    let order: Vec<usize> = [1, 3, 2, 0]
        .iter()
        .map(|i| {
            let cx = format!("cx=\"{}\"", 32.4 * f64::from(*i as i32));
            svg.find(&cx).unwrap()
        })
        .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]), "order: {order:?}");
}

#[test]
fn device_transform_scenario() {
    // Scale 32.4 device units per user unit, y inverted.
    let mut fig = figure();
    fig.plot(
        &[
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        ],
        &Style::default(),
    );
    assert!(fig.to_svg().contains("M 0,0 L 32.4,-32.4 L 64.8,0"));
}

#[test]
fn full_sweep_emits_ellipse_not_path() {
    let mut fig = figure();
    fig.arc(
        Point::new(0.0, 0.0),
        4.0,
        2.0,
        0.0,
        360.0,
        0.0,
        &Style::default(),
        None,
    );
    let svg = fig.to_svg();
    assert_eq!(count_occurrences(&svg, "<ellipse"), 1);
    assert_eq!(count_occurrences(&svg, "<path"), 0);
}

#[test]
fn bezier_emits_curve_commands_and_heads() {
    let mut fig = figure();
    fig.bezier(
        &[
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        ],
        &Style::default(),
        Some(ArrowAt::End),
    );
    let svg = fig.to_svg();
    assert!(svg.contains("Q"));
    // Curve plus the two arrowhead subpaths.
    assert_eq!(count_occurrences(&svg, "<path"), 3);

    let mut fig = figure();
    fig.bezier(
        &[
            Point::new(0.0, 0.0),
            Point::new(0.5, 1.0),
            Point::new(1.5, 1.0),
            Point::new(2.0, 0.0),
        ],
        &Style::default(),
        None,
    );
    assert!(fig.to_svg().contains("C"));
}

#[test]
fn text_nodes_escape_markup() {
    let mut fig = figure();
    fig.text("a<b&c", Point::new(0.0, 0.0), &TextStyle::default());
    let svg = fig.to_svg();
    assert!(svg.contains("a&lt;b&amp;c"));
}

#[test]
fn background_and_frame_survive_clear() {
    let mut fig = SvgFigure::new(CanvasOpts {
        bgcolor: Some("#002b36".to_string()),
        showframe: true,
        ..CanvasOpts::default()
    });
    fig.circle(Point::new(0.0, 0.0), 1.0, &Style::default());
    fig.clear();
    let svg = fig.to_svg();
    assert!(svg.contains("background-color:#002b36;"));
    assert!(svg.contains("<rect"));
    assert_eq!(fig.node_count(), 0);
}
