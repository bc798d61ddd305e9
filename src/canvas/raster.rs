//! Raster backend on a tiny-skia paint surface.
//!
//! Primitives are recorded into a display list in user units and replayed at
//! export: the extent (explicit override or accumulated auto-fit) is padded,
//! converted to a pixel size from the inches-per-unit scale and the export
//! dpi, and every primitive is painted in stable ascending z order through
//! the user-to-device transform. Geometry is converted to device coordinates
//! before painting so stroke widths and dash patterns stay in device units,
//! matching the vector backend exactly.

use std::f64::consts::TAU;
use std::io::Cursor;
use std::path::Path;

use kurbo::Shape as _;

use crate::foundation::error::{DraftError, DraftResult};
use crate::foundation::geom::{BBox, Point};
use crate::style::{CapStyle, Halign, JoinStyle, Style, TextStyle, Valign};

use super::arrows::{self, ARC_HEAD_LENGTH, ARC_HEAD_WIDTH};
use super::{ArrowAt, Canvas, CanvasOpts, ImageFormat, SweepArrow};

/// Extra user units around the auto-computed extent so stroke widths and
/// arrowheads are not clipped at the image edge.
const EXTENT_PAD: f64 = 0.1;

#[derive(Clone, Debug)]
enum Op {
    Plot {
        points: Vec<Point>,
        style: Style,
    },
    Poly {
        verts: Vec<Point>,
        style: Style,
    },
    Circle {
        center: Point,
        radius: f64,
        style: Style,
    },
    Arc {
        center: Point,
        width: f64,
        height: f64,
        theta1: f64,
        theta2: f64,
        angle: f64,
        style: Style,
    },
    Arrow {
        pos: Point,
        direction: Point,
        headwidth: f64,
        headlength: f64,
        style: Style,
    },
    Bezier {
        points: Vec<Point>,
        style: Style,
    },
    Text {
        s: String,
        pos: Point,
        style: TextStyle,
    },
}

impl Op {
    fn zorder(&self) -> i32 {
        match self {
            Op::Plot { style, .. }
            | Op::Poly { style, .. }
            | Op::Circle { style, .. }
            | Op::Arc { style, .. }
            | Op::Arrow { style, .. }
            | Op::Bezier { style, .. } => style.zorder,
            Op::Text { style, .. } => style.zorder,
        }
    }
}

/// User-space to device-space mapping for one replay.
#[derive(Clone, Copy, Debug)]
struct DeviceMap {
    xmin: f64,
    ymax: f64,
    scale: f64,
}

impl DeviceMap {
    fn apply(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.xmin) * self.scale,
            (self.ymax - p.y) * self.scale,
        )
    }
}

/// Drawing surface rasterizing onto a [`tiny_skia::Pixmap`].
pub struct RasterFigure {
    inches_per_unit: f64,
    showframe: bool,
    bgcolor: Option<String>,
    /// Explicit extent override; the empty sentinel means auto-fit.
    bbox: BBox,
    /// Extent accumulated from recorded primitives, user units.
    auto_bbox: BBox,
    ops: Vec<Op>,
    fonts: Option<(cosmic_text::FontSystem, cosmic_text::SwashCache)>,
}

impl RasterFigure {
    pub fn new(opts: CanvasOpts) -> Self {
        Self {
            inches_per_unit: opts.inches_per_unit,
            showframe: opts.showframe,
            bgcolor: opts.bgcolor,
            bbox: opts.bbox,
            auto_bbox: BBox::EMPTY,
            ops: Vec::new(),
            fonts: None,
        }
    }

    /// Number of recorded display-list entries.
    pub fn op_count(&self) -> usize {
        self.ops.len()
    }

    fn expand_auto(&mut self, points: &[Point]) {
        for p in points {
            self.auto_bbox.expand(*p);
        }
    }

    fn effective_bbox(&self) -> BBox {
        if !self.bbox.is_empty() {
            self.bbox
        } else {
            self.auto_bbox
        }
    }

    /// Rasterize the display list. Idempotent: ops are only read.
    fn rasterize(&mut self, transparent: bool, dpi: f64) -> DraftResult<tiny_skia::Pixmap> {
        let scale = self.inches_per_unit * dpi;
        let bbox = self.effective_bbox();

        // A degenerate extent (nothing drawn, or an all-infinite override) is
        // swallowed into a minimal canvas, never raised.
        let (map, wpx, hpx) = if bbox.is_empty() {
            (
                DeviceMap {
                    xmin: 0.0,
                    ymax: 0.0,
                    scale,
                },
                5,
                5,
            )
        } else {
            let bbox = bbox.pad(EXTENT_PAD);
            let wpx = (bbox.width() * scale).ceil().max(5.0) as u32;
            let hpx = (bbox.height() * scale).ceil().max(5.0) as u32;
            (
                DeviceMap {
                    xmin: bbox.xmin,
                    ymax: bbox.ymax,
                    scale,
                },
                wpx,
                hpx,
            )
        };

        let mut pixmap = tiny_skia::Pixmap::new(wpx, hpx)
            .ok_or_else(|| DraftError::render("could not allocate raster surface"))?;

        if !transparent {
            let bg = self.bgcolor.as_deref().unwrap_or("white");
            pixmap.fill(parse_color(bg));
        }

        if self.showframe {
            let mut pb = tiny_skia::PathBuilder::new();
            pb.push_rect(
                tiny_skia::Rect::from_xywh(0.5, 0.5, (wpx - 1) as f32, (hpx - 1) as f32)
                    .ok_or_else(|| DraftError::render("degenerate frame rect"))?,
            );
            if let Some(path) = pb.finish() {
                let stroke = tiny_skia::Stroke {
                    width: 1.0,
                    ..tiny_skia::Stroke::default()
                };
                pixmap.stroke_path(
                    &path,
                    &solid_paint(tiny_skia::Color::BLACK),
                    &stroke,
                    tiny_skia::Transform::identity(),
                    None,
                );
            }
        }

        let mut ordered: Vec<Op> = self.ops.clone();
        ordered.sort_by_key(Op::zorder);
        for op in &ordered {
            self.paint_op(op, map, &mut pixmap)?;
        }
        Ok(pixmap)
    }

    fn paint_op(
        &mut self,
        op: &Op,
        map: DeviceMap,
        pixmap: &mut tiny_skia::Pixmap,
    ) -> DraftResult<()> {
        match op {
            Op::Plot { points, style } => {
                let mut pb = tiny_skia::PathBuilder::new();
                let mut pen_up = true;
                for p in points {
                    if p.is_gap() {
                        pen_up = true;
                        continue;
                    }
                    let q = map.apply(*p);
                    if pen_up {
                        pb.move_to(q.x as f32, q.y as f32);
                        pen_up = false;
                    } else {
                        pb.line_to(q.x as f32, q.y as f32);
                    }
                }
                if let Some(path) = pb.finish() {
                    self.fill_then_stroke(pixmap, &path, style, map);
                }
            }
            Op::Poly { verts, style } => {
                let mut pb = tiny_skia::PathBuilder::new();
                for (i, v) in verts.iter().enumerate() {
                    let q = map.apply(*v);
                    if i == 0 {
                        pb.move_to(q.x as f32, q.y as f32);
                    } else {
                        pb.line_to(q.x as f32, q.y as f32);
                    }
                }
                pb.close();
                if let Some(path) = pb.finish() {
                    self.fill_then_stroke(pixmap, &path, style, map);
                }
            }
            Op::Circle {
                center,
                radius,
                style,
            } => {
                let c = map.apply(*center);
                let circle = kurbo::Circle::new((c.x, c.y), radius * map.scale);
                if let Some(path) = kurbo_to_skia(circle.path_elements(0.1)) {
                    self.fill_then_stroke(pixmap, &path, style, map);
                }
            }
            Op::Arc {
                center,
                width,
                height,
                theta1,
                theta2,
                angle,
                style,
            } => {
                if let Some(path) = arc_device_path(map, *center, *width, *height, *theta1, *theta2, *angle) {
                    self.stroke_only(pixmap, &path, style, map);
                }
            }
            Op::Arrow {
                pos,
                direction,
                headwidth,
                headlength,
                style,
            } => {
                let tail = map.apply(*pos);
                let dx = direction.x * map.scale;
                let dy = direction.y * map.scale;
                let headwidth = headwidth * map.scale;
                let headlength = headlength * map.scale;

                let head = Point::new(tail.x + dx, tail.y - dy);
                let fullen = dx.hypot(dy);
                let theta = -dy.atan2(dx).to_degrees();

                let finc = Point::new(fullen - headlength, 0.0).rotate(theta) + tail;
                let fin1 = Point::new(fullen - headlength, headwidth / 2.0).rotate(theta) + tail;
                let fin2 = Point::new(fullen - headlength, -headwidth / 2.0).rotate(theta) + tail;

                let theta_rad = theta.to_radians();
                let head = Point::new(
                    head.x - style.lw * theta_rad.cos(),
                    head.y - style.lw * theta_rad.sin(),
                );

                let mask = clip_mask(style.clip, map, pixmap);

                let mut tip = tiny_skia::PathBuilder::new();
                tip.move_to(head.x as f32, head.y as f32);
                tip.line_to(fin1.x as f32, fin1.y as f32);
                tip.line_to(fin2.x as f32, fin2.y as f32);
                tip.close();
                if let Some(path) = tip.finish() {
                    pixmap.fill_path(
                        &path,
                        &color_paint(&style.color),
                        tiny_skia::FillRule::Winding,
                        tiny_skia::Transform::identity(),
                        mask.as_ref(),
                    );
                }

                let mut shaft = tiny_skia::PathBuilder::new();
                shaft.move_to(finc.x as f32, finc.y as f32);
                shaft.line_to(tail.x as f32, tail.y as f32);
                if let Some(path) = shaft.finish() {
                    let stroke = tiny_skia::Stroke {
                        width: style.lw as f32,
                        line_cap: tiny_skia::LineCap::Butt,
                        line_join: tiny_skia::LineJoin::Miter,
                        ..tiny_skia::Stroke::default()
                    };
                    pixmap.stroke_path(
                        &path,
                        &color_paint(&style.color),
                        &stroke,
                        tiny_skia::Transform::identity(),
                        mask.as_ref(),
                    );
                }
            }
            Op::Bezier { points, style } => {
                let dev: Vec<Point> = points.iter().map(|p| map.apply(*p)).collect();
                let mut pb = tiny_skia::PathBuilder::new();
                pb.move_to(dev[0].x as f32, dev[0].y as f32);
                if dev.len() == 4 {
                    pb.cubic_to(
                        dev[1].x as f32,
                        dev[1].y as f32,
                        dev[2].x as f32,
                        dev[2].y as f32,
                        dev[3].x as f32,
                        dev[3].y as f32,
                    );
                } else {
                    pb.quad_to(dev[1].x as f32, dev[1].y as f32, dev[2].x as f32, dev[2].y as f32);
                }
                if let Some(path) = pb.finish() {
                    self.stroke_only(pixmap, &path, style, map);
                }
            }
            Op::Text { s, pos, style } => {
                self.paint_text(pixmap, s, *pos, style, map)?;
            }
        }
        Ok(())
    }

    fn fill_then_stroke(
        &self,
        pixmap: &mut tiny_skia::Pixmap,
        path: &tiny_skia::Path,
        style: &Style,
        map: DeviceMap,
    ) {
        let mask = clip_mask(style.clip, map, pixmap);
        if let Some(fill) = &style.fill {
            pixmap.fill_path(
                path,
                &color_paint(fill),
                tiny_skia::FillRule::Winding,
                tiny_skia::Transform::identity(),
                mask.as_ref(),
            );
        }
        pixmap.stroke_path(
            path,
            &color_paint(&style.color),
            &stroke_for(style),
            tiny_skia::Transform::identity(),
            mask.as_ref(),
        );
    }

    fn stroke_only(
        &self,
        pixmap: &mut tiny_skia::Pixmap,
        path: &tiny_skia::Path,
        style: &Style,
        map: DeviceMap,
    ) {
        let mask = clip_mask(style.clip, map, pixmap);
        pixmap.stroke_path(
            path,
            &color_paint(&style.color),
            &stroke_for(style),
            tiny_skia::Transform::identity(),
            mask.as_ref(),
        );
    }

    fn paint_text(
        &mut self,
        pixmap: &mut tiny_skia::Pixmap,
        s: &str,
        pos: Point,
        style: &TextStyle,
        map: DeviceMap,
    ) -> DraftResult<()> {
        use cosmic_text::{Attrs, Buffer, Command, Metrics, Shaping};

        let (font_system, swash_cache) = self.fonts.get_or_insert_with(|| {
            (
                cosmic_text::FontSystem::new(),
                cosmic_text::SwashCache::new(),
            )
        });

        // Font sizes are points; at 72 dpi one point is one device pixel, so
        // size scales with the dpi ratio the same way geometry does.
        let size_px = (style.fontsize * map.scale / (72.0 * self.inches_per_unit)) as f32;
        let line_height = size_px * 1.2;
        let metrics = Metrics::new(size_px, line_height);
        let mut buffer = Buffer::new(font_system, metrics);
        let attrs = Attrs::new().family(family_for(&style.fontfamily));
        buffer.set_text(font_system, s, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(font_system, false);

        let mut text_width: f32 = 0.0;
        let mut lines = 0usize;
        for run in buffer.layout_runs() {
            text_width = text_width.max(run.line_w);
            lines += 1;
        }
        let total_height = lines.max(1) as f32 * line_height;

        let anchor = map.apply(pos);
        let base_x = anchor.x as f32
            + match style.halign {
                Halign::Left => 0.0,
                Halign::Center => -text_width / 2.0,
                Halign::Right => -text_width,
            };
        let base_y = anchor.y as f32
            + match style.valign {
                Valign::Top => 0.0,
                Valign::Center => -total_height / 2.0,
                Valign::Bottom => -total_height,
            };

        // Rotation about the anchor point, matching the vector backend's
        // rotate(-rotation x y).
        let rotate = if style.rotation != 0.0 {
            let rad = (-style.rotation).to_radians() as f32;
            let (sin, cos) = rad.sin_cos();
            tiny_skia::Transform::from_translate(anchor.x as f32, anchor.y as f32)
                .pre_concat(tiny_skia::Transform::from_row(cos, sin, -sin, cos, 0.0, 0.0))
                .pre_translate(-anchor.x as f32, -anchor.y as f32)
        } else {
            tiny_skia::Transform::identity()
        };

        let mask = clip_mask(style.clip, map, pixmap);
        let paint = color_paint(&style.color);

        for run in buffer.layout_runs() {
            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((base_x, base_y), 1.0);
                let glyph_x = base_x + glyph.x + glyph.font_size * glyph.x_offset;
                let glyph_y = base_y + run.line_y + glyph.y - glyph.font_size * glyph.y_offset;

                let Some(commands) =
                    swash_cache.get_outline_commands(font_system, physical.cache_key)
                else {
                    continue;
                };

                // Font outlines are y-up; device space is y-down.
                let mut pb = tiny_skia::PathBuilder::new();
                for cmd in commands {
                    match cmd {
                        Command::MoveTo(p) => pb.move_to(p.x, -p.y),
                        Command::LineTo(p) => pb.line_to(p.x, -p.y),
                        Command::QuadTo(c, e) => pb.quad_to(c.x, -c.y, e.x, -e.y),
                        Command::CurveTo(c1, c2, e) => {
                            pb.cubic_to(c1.x, -c1.y, c2.x, -c2.y, e.x, -e.y)
                        }
                        Command::Close => pb.close(),
                    }
                }
                if let Some(path) = pb.finish() {
                    let transform =
                        tiny_skia::Transform::from_translate(glyph_x, glyph_y).post_concat(rotate);
                    pixmap.fill_path(
                        &path,
                        &paint,
                        tiny_skia::FillRule::Winding,
                        transform,
                        mask.as_ref(),
                    );
                }
            }
        }
        Ok(())
    }

    fn encode(
        &mut self,
        format: ImageFormat,
        transparent: bool,
        dpi: f64,
    ) -> DraftResult<Vec<u8>> {
        let img_format = match format {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Svg => {
                return Err(DraftError::validation(
                    "format Svg is not available in the raster backend",
                ));
            }
        };
        // Neither jpeg nor bmp carries alpha, so they always flatten over the
        // background.
        let transparent = transparent && format == ImageFormat::Png;
        let pixmap = self.rasterize(transparent, dpi)?;

        let (w, h) = (pixmap.width(), pixmap.height());
        let mut rgba = vec![0u8; (w * h * 4) as usize];
        for (dst, px) in rgba.chunks_exact_mut(4).zip(pixmap.pixels()) {
            let px = px.demultiply();
            dst.copy_from_slice(&[px.red(), px.green(), px.blue(), px.alpha()]);
        }
        let img = image::RgbaImage::from_raw(w, h, rgba)
            .ok_or_else(|| DraftError::render("raster buffer size mismatch"))?;

        let mut out = Cursor::new(Vec::new());
        match format {
            ImageFormat::Png => {
                image::DynamicImage::ImageRgba8(img)
                    .write_to(&mut out, img_format)
                    .map_err(|e| DraftError::render(format!("image encode failed: {e}")))?;
            }
            _ => {
                image::DynamicImage::ImageRgba8(img)
                    .to_rgb8()
                    .write_to(&mut out, img_format)
                    .map_err(|e| DraftError::render(format!("image encode failed: {e}")))?;
            }
        }
        Ok(out.into_inner())
    }
}

fn parse_color(s: &str) -> tiny_skia::Color {
    match csscolorparser::parse(s) {
        Ok(c) => {
            let [r, g, b, a] = c.to_rgba8();
            tiny_skia::Color::from_rgba8(r, g, b, a)
        }
        Err(_) => {
            tracing::debug!(color = s, "unparsable color, painting black");
            tiny_skia::Color::BLACK
        }
    }
}

fn solid_paint(color: tiny_skia::Color) -> tiny_skia::Paint<'static> {
    let mut paint = tiny_skia::Paint {
        anti_alias: true,
        ..tiny_skia::Paint::default()
    };
    paint.set_color(color);
    paint
}

fn color_paint(s: &str) -> tiny_skia::Paint<'static> {
    solid_paint(parse_color(s))
}

fn stroke_for(style: &Style) -> tiny_skia::Stroke {
    tiny_skia::Stroke {
        width: style.lw as f32,
        line_cap: match style.capstyle {
            CapStyle::Butt => tiny_skia::LineCap::Butt,
            CapStyle::Round => tiny_skia::LineCap::Round,
            CapStyle::Square => tiny_skia::LineCap::Square,
        },
        line_join: match style.joinstyle {
            JoinStyle::Round => tiny_skia::LineJoin::Round,
            JoinStyle::Miter => tiny_skia::LineJoin::Miter,
            JoinStyle::Bevel => tiny_skia::LineJoin::Bevel,
        },
        dash: style
            .ls
            .dash_pattern()
            .and_then(|p| tiny_skia::StrokeDash::new(p.to_vec(), 0.0)),
        ..tiny_skia::Stroke::default()
    }
}

/// Per-call clip rectangle as a device-space mask.
fn clip_mask(
    clip: Option<BBox>,
    map: DeviceMap,
    pixmap: &tiny_skia::Pixmap,
) -> Option<tiny_skia::Mask> {
    let clip = clip?;
    if clip.is_empty() {
        return None;
    }
    let tl = map.apply(Point::new(clip.xmin, clip.ymax));
    let br = map.apply(Point::new(clip.xmax, clip.ymin));
    let rect = tiny_skia::Rect::from_ltrb(tl.x as f32, tl.y as f32, br.x as f32, br.y as f32)?;
    let mut mask = tiny_skia::Mask::new(pixmap.width(), pixmap.height())?;
    let path = tiny_skia::PathBuilder::from_rect(rect);
    mask.fill_path(
        &path,
        tiny_skia::FillRule::Winding,
        true,
        tiny_skia::Transform::identity(),
    );
    Some(mask)
}

fn kurbo_to_skia(elements: impl Iterator<Item = kurbo::PathEl>) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    for el in elements {
        match el {
            kurbo::PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            kurbo::PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            kurbo::PathEl::QuadTo(c, p) => {
                pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32)
            }
            kurbo::PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            kurbo::PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

/// Device-space path for an elliptical arc, sharing the vector backend's
/// sweep derivation: parameter angles are corrected for eccentricity and the
/// sweep always runs from the `theta2` angle to the lifted `theta1` angle.
/// Coincident endpoints degrade to a full ellipse.
fn arc_device_path(
    map: DeviceMap,
    center: Point,
    width: f64,
    height: f64,
    theta1: f64,
    theta2: f64,
    angle: f64,
) -> Option<tiny_skia::Path> {
    let c = map.apply(center);
    let width_d = width * map.scale;
    let height_d = height * map.scale;

    let angle_d = -angle;
    let th1 = (-theta1).to_radians();
    let th2 = (-theta2).to_radians();
    let rot_d = angle_d.to_radians();

    let mut t1 = (width_d * th1.sin()).atan2(height_d * th1.cos());
    let t2 = (width_d * th2.sin()).atan2(height_d * th2.cos());
    while t1 < t2 {
        t1 += TAU;
    }

    let point_at = |t: f64| -> Point {
        Point::new(
            c.x + width_d / 2.0 * t.cos() * rot_d.cos() - height_d / 2.0 * t.sin() * rot_d.sin(),
            c.y + width_d / 2.0 * t.cos() * rot_d.sin() + height_d / 2.0 * t.sin() * rot_d.cos(),
        )
    };
    let start = point_at(t2);
    let end = point_at(t1);

    if (end.x - start.x).abs() < 0.1 && (end.y - start.y).abs() < 0.1 {
        let ellipse = kurbo::Ellipse::new(
            (c.x, c.y),
            (width_d / 2.0, height_d / 2.0),
            rot_d,
        );
        kurbo_to_skia(ellipse.path_elements(0.1))
    } else {
        let arc = kurbo::Arc::new(
            (c.x, c.y),
            (width_d / 2.0, height_d / 2.0),
            t2,
            t1 - t2,
            rot_d,
        );
        kurbo_to_skia(arc.path_elements(0.1))
    }
}

fn family_for(name: &str) -> cosmic_text::Family<'_> {
    match name {
        "sans-serif" => cosmic_text::Family::SansSerif,
        "serif" => cosmic_text::Family::Serif,
        "monospace" => cosmic_text::Family::Monospace,
        "cursive" => cosmic_text::Family::Cursive,
        other => cosmic_text::Family::Name(other),
    }
}

impl Canvas for RasterFigure {
    fn plot(&mut self, points: &[Point], style: &Style) {
        if points.is_empty() {
            return;
        }
        self.expand_auto(points);
        self.ops.push(Op::Plot {
            points: points.to_vec(),
            style: style.clone(),
        });
    }

    fn text(&mut self, s: &str, pos: Point, style: &TextStyle) {
        if s.is_empty() {
            return;
        }
        self.auto_bbox.expand(pos);
        self.ops.push(Op::Text {
            s: s.to_string(),
            pos,
            style: style.clone(),
        });
    }

    fn poly(&mut self, verts: &[Point], closed: bool, style: &Style) {
        if !closed {
            self.plot(verts, style);
            return;
        }
        self.expand_auto(verts);
        self.ops.push(Op::Poly {
            verts: verts.to_vec(),
            style: style.clone(),
        });
    }

    fn circle(&mut self, center: Point, radius: f64, style: &Style) {
        self.expand_auto(&[
            center + Point::new(radius, radius),
            center - Point::new(radius, radius),
        ]);
        self.ops.push(Op::Circle {
            center,
            radius,
            style: style.clone(),
        });
    }

    fn arrow(
        &mut self,
        pos: Point,
        direction: Point,
        headwidth: f64,
        headlength: f64,
        style: &Style,
    ) {
        self.expand_auto(&[pos, pos + direction]);
        self.ops.push(Op::Arrow {
            pos,
            direction,
            headwidth,
            headlength,
            style: style.clone(),
        });
    }

    fn bezier(&mut self, points: &[Point], style: &Style, arrow_at: Option<ArrowAt>) {
        assert!(
            points.len() == 3 || points.len() == 4,
            "bezier requires 3 (quadratic) or 4 (cubic) control points"
        );
        self.expand_auto(points);
        self.ops.push(Op::Bezier {
            points: points.to_vec(),
            style: style.clone(),
        });
        if let Some(at) = arrow_at {
            let head_style = Style {
                color: style.color.clone(),
                zorder: style.zorder,
                ..Style::default()
            };
            for head in arrows::bezier_heads(points, at) {
                self.arrow(head.pos, head.dir, 0.2, 0.2, &head_style);
            }
        }
    }

    fn arc(
        &mut self,
        center: Point,
        width: f64,
        height: f64,
        theta1: f64,
        theta2: f64,
        angle: f64,
        style: &Style,
        arrow: Option<SweepArrow>,
    ) {
        let rot = angle.to_radians();
        let ex = (width / 2.0 * rot.cos()).abs() + (height / 2.0 * rot.sin()).abs();
        let ey = (width / 2.0 * rot.sin()).abs() + (height / 2.0 * rot.cos()).abs();
        self.expand_auto(&[center + Point::new(ex, ey), center - Point::new(ex, ey)]);
        self.ops.push(Op::Arc {
            center,
            width,
            height,
            theta1,
            theta2,
            angle,
            style: style.clone(),
        });
        if let Some(which) = arrow {
            let head = arrows::arc_head(center, width, height, theta1, theta2, angle, which);
            let head_style = Style {
                color: style.color.clone(),
                lw: 1.0,
                zorder: style.zorder,
                ..Style::default()
            };
            self.arrow(head.pos, head.dir, ARC_HEAD_WIDTH, ARC_HEAD_LENGTH, &head_style);
        }
    }

    fn set_bbox(&mut self, bbox: BBox) {
        self.bbox = bbox;
    }

    fn set_background(&mut self, color: &str) {
        self.bgcolor = Some(color.to_string());
    }

    fn show_frame(&mut self, show: bool) {
        self.showframe = show;
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.auto_bbox = BBox::EMPTY;
    }

    fn image_bytes(
        &mut self,
        format: ImageFormat,
        transparent: bool,
        dpi: f64,
    ) -> DraftResult<Vec<u8>> {
        self.encode(format, transparent, dpi)
    }

    fn save(&mut self, path: &Path, transparent: bool, dpi: f64) -> DraftResult<()> {
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_ext)
            .unwrap_or(ImageFormat::Png);
        let bytes = self.image_bytes(format, transparent, dpi)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
