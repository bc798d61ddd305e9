#![cfg(feature = "raster")]

use draftline::{
    Canvas, CanvasOpts, Drawing, ImageFormat, Point, RasterFigure, Segment, SegmentElement, Style,
};

fn digest(bytes: &[u8]) -> u64 {
    let mut state = 0xcbf2_9ce4_8422_2325u64;
    for &b in bytes {
        state ^= u64::from(b);
        state = state.wrapping_mul(0x0000_0100_0000_01B3);
    }
    state
}

fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
    assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");
    let w = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
    let h = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
    (w, h)
}

fn triangle_figure() -> RasterFigure {
    let mut fig = RasterFigure::new(CanvasOpts::default());
    fig.plot(
        &[
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        ],
        &Style::default(),
    );
    fig
}

#[test]
fn raster_render_is_deterministic_and_nonempty() {
    let mut fig = triangle_figure();
    let a = fig.image_bytes(ImageFormat::Png, true, 72.0).unwrap();
    let b = fig.image_bytes(ImageFormat::Png, true, 72.0).unwrap();
    assert_eq!(digest(&a), digest(&b));
    assert!(!a.is_empty());
}

#[test]
fn png_size_scales_with_dpi() {
    let mut fig = triangle_figure();
    let (w72, h72) = png_dimensions(&fig.image_bytes(ImageFormat::Png, true, 72.0).unwrap());
    let (w144, h144) = png_dimensions(&fig.image_bytes(ImageFormat::Png, true, 144.0).unwrap());
    // Extent 2x1 user units padded by 0.1 per side at 36 px/unit.
    assert_eq!((w72, h72), (80, 44));
    assert_eq!((w144, h144), (159, 87));
}

#[test]
fn empty_figure_swallows_degenerate_extent() {
    let mut fig = RasterFigure::new(CanvasOpts::default());
    let (w, h) = png_dimensions(&fig.image_bytes(ImageFormat::Png, true, 72.0).unwrap());
    assert_eq!((w, h), (5, 5));
}

#[test]
fn all_raster_formats_encode() {
    let mut fig = triangle_figure();
    for format in [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Bmp] {
        let bytes = fig.image_bytes(format, false, 72.0).unwrap();
        assert!(!bytes.is_empty(), "{format:?} produced no bytes");
    }
}

#[test]
fn session_renders_png_through_raster_backend() {
    let mut d = Drawing::new();
    d.add(SegmentElement::new(vec![
        Segment::Circle {
            center: Point::new(1.0, 0.0),
            radius: 1.0,
            style: Style::default().with_fill("#ff0000"),
        },
        Segment::Arc {
            center: Point::new(3.0, 0.0),
            width: 2.0,
            height: 1.0,
            theta1: 0.0,
            theta2: 270.0,
            angle: 15.0,
            arrow: Some(draftline::SweepArrow::Ccw),
            style: Style::default(),
        },
    ]))
    .unwrap();
    let bytes = d.image_bytes(ImageFormat::Png).unwrap();
    assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn save_writes_png_file() {
    let mut fig = triangle_figure();
    let path = std::env::temp_dir().join("draftline_raster_test.png");
    fig.save(&path, true, 72.0).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");
    let _ = std::fs::remove_file(&path);
}
