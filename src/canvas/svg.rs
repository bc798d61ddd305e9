//! Vector-markup backend: emits an SVG document directly.
//!
//! Primitives are buffered as `(zorder, node)` pairs and serialized at
//! export, sorted stably by ascending z. Styles are written per node, never
//! through a shared stylesheet, because one HTML page may embed several
//! exported documents and they must not leak class names into each other.

use std::f64::consts::{PI, TAU};
use std::fmt::Write as _;
use std::path::Path;

use crate::foundation::error::{DraftError, DraftResult};
use crate::foundation::geom::{BBox, Point};
use crate::style::{CapStyle, Halign, JoinStyle, LineStyle, Style, TextStyle, Valign};

use super::arrows::{self, ARC_HEAD_LENGTH, ARC_HEAD_WIDTH};
use super::{ArrowAt, Canvas, CanvasOpts, ImageFormat, SweepArrow};

/// Fixed device-unit padding around the exported document.
const PAD: f64 = 2.0;

/// Scale from inches-per-unit to device units per user unit.
const DEVICE_SCALE: f64 = 64.8;

fn fmt_num(v: f64) -> String {
    // Normalizes -0.0 so the y-flip never prints a negative zero.
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v}")
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// One markup node: tag, attributes, optional text, children.
#[derive(Clone, Debug)]
pub(crate) struct SvgNode {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<SvgNode>,
}

impl SvgNode {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    fn attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((key, value.into()));
        self
    }

    fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (k, v) in &self.attrs {
            let _ = write!(out, " {k}=\"{}\"", escape(v));
        }
        if self.text.is_none() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Per-node style string; properties matching the document default are left
/// out.
fn style_string(
    color: Option<&str>,
    ls: LineStyle,
    lw: f64,
    cap: Option<CapStyle>,
    join: Option<JoinStyle>,
    fill: Option<&str>,
) -> String {
    let mut s = String::new();
    if let Some(color) = color {
        if !color.is_empty() {
            let _ = write!(s, "stroke:{color};");
        }
    }
    let _ = write!(s, "fill:{};", fill.unwrap_or("none"));
    if lw != 0.0 {
        let _ = write!(s, "stroke-width:{};", fmt_num(lw));
    }
    if let Some(dash) = ls.dash_array() {
        let _ = write!(s, "stroke-dasharray:{dash};");
    }
    if let Some(cap) = cap {
        let _ = write!(s, "stroke-linecap:{};", cap.as_svg());
    }
    if let Some(join) = join {
        let _ = write!(s, "stroke-linejoin:{};", join.as_svg());
    }
    s
}

/// Drawing surface emitting a device-independent SVG document.
pub struct SvgFigure {
    scale: f64,
    showframe: bool,
    bgcolor: Option<String>,
    /// Explicit extent override; the empty sentinel means auto-fit.
    bbox: BBox,
    /// Extent accumulated from drawn primitives, user units.
    auto_bbox: BBox,
    nodes: Vec<(i32, SvgNode)>,
}

impl SvgFigure {
    pub fn new(opts: CanvasOpts) -> Self {
        Self {
            scale: DEVICE_SCALE * opts.inches_per_unit,
            showframe: opts.showframe,
            bgcolor: opts.bgcolor,
            bbox: opts.bbox,
            auto_bbox: BBox::EMPTY,
            nodes: Vec::new(),
        }
    }

    /// Device units per user unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Convert user coordinates to device coordinates (y grows downward).
    pub fn xform(&self, p: Point) -> Point {
        Point::new(p.x * self.scale, -p.y * self.scale)
    }

    fn push(&mut self, zorder: i32, node: SvgNode) {
        self.nodes.push((zorder, node));
    }

    fn effective_bbox(&self) -> BBox {
        if !self.bbox.is_empty() {
            self.bbox
        } else {
            self.auto_bbox
        }
    }

    /// Serialize the document. Idempotent: the buffered nodes are only read.
    pub fn to_svg(&self) -> String {
        let bbox = self.effective_bbox();
        let (xmin, ymax, pxwidth, pxheight) = if bbox.is_empty() {
            (0.0, 0.0, 5.0, 5.0)
        } else {
            (
                bbox.xmin,
                bbox.ymax,
                (bbox.width() * self.scale).max(5.0),
                (bbox.height() * self.scale).max(5.0),
            )
        };
        let x0 = xmin * self.scale - PAD;
        let y0 = -ymax * self.scale - PAD;

        let mut root = SvgNode::new("svg")
            .attr("xmlns", "http://www.w3.org/2000/svg")
            .attr("xml:lang", "en")
            .attr("height", format!("{}pt", fmt_num(pxheight + 2.0 * PAD)))
            .attr("width", format!("{}pt", fmt_num(pxwidth + 2.0 * PAD)))
            .attr(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    fmt_num(x0),
                    fmt_num(y0),
                    fmt_num(pxwidth + 2.0 * PAD),
                    fmt_num(pxheight + 2.0 * PAD)
                ),
            );
        if let Some(bg) = &self.bgcolor {
            root = root.attr("style", format!("background-color:{bg};"));
        }

        if self.showframe {
            root.children.push(
                SvgNode::new("rect")
                    .attr("x", fmt_num(x0))
                    .attr("y", fmt_num(y0))
                    .attr("width", fmt_num(pxwidth))
                    .attr("height", fmt_num(pxheight))
                    .attr("style", "fill:none; stroke-width:1; stroke:black;"),
            );
        }

        let mut ordered: Vec<&(i32, SvgNode)> = self.nodes.iter().collect();
        ordered.sort_by_key(|(z, _)| *z);
        for (_, node) in ordered {
            root.children.push(node.clone());
        }

        let mut out = String::new();
        root.write(&mut out);
        out
    }

    /// Number of buffered drawable nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn expand_auto(&mut self, points: &[Point]) {
        for p in points {
            self.auto_bbox.expand(*p);
        }
    }
}

impl Canvas for SvgFigure {
    fn plot(&mut self, points: &[Point], style: &Style) {
        if points.is_empty() {
            return;
        }
        self.expand_auto(points);

        let mut d = String::new();
        let mut pen_up = true;
        for p in points {
            if p.is_gap() {
                pen_up = true;
                continue;
            }
            let q = self.xform(*p);
            d.push_str(if pen_up { "M " } else { "L " });
            pen_up = false;
            let _ = write!(d, "{},{} ", fmt_num(q.x), fmt_num(q.y));
        }
        let node = SvgNode::new("path").attr("d", d.trim_end().to_string()).attr(
            "style",
            style_string(
                Some(&style.color),
                style.ls,
                style.lw,
                Some(style.capstyle),
                Some(style.joinstyle),
                style.fill.as_deref(),
            ),
        );
        self.push(style.zorder, node);
    }

    fn text(&mut self, s: &str, pos: Point, style: &TextStyle) {
        if s.is_empty() {
            return;
        }
        self.auto_bbox.expand(pos);
        let q = self.xform(pos);

        let anchor = match style.halign {
            Halign::Left => "start",
            Halign::Center => "middle",
            Halign::Right => "end",
        };
        let mut node = SvgNode::new("text")
            .attr("x", fmt_num(q.x))
            .attr("y", fmt_num(q.y))
            .attr("text-anchor", anchor)
            .attr("font-size", fmt_num(style.fontsize))
            .attr("font-family", style.fontfamily.clone())
            .attr("fill", style.color.clone());
        match style.valign {
            Valign::Top => node = node.attr("dominant-baseline", "hanging"),
            Valign::Center => node = node.attr("dominant-baseline", "central"),
            Valign::Bottom => {}
        }
        if style.rotation != 0.0 {
            node = node.attr(
                "transform",
                format!(
                    "rotate({} {} {})",
                    fmt_num(-style.rotation),
                    fmt_num(q.x),
                    fmt_num(q.y)
                ),
            );
        }

        let lines: Vec<&str> = s.split('\n').collect();
        if lines.len() == 1 {
            node.text = Some(s.to_string());
        } else {
            // First line is lifted so the block stays anchored per valign;
            // following lines step down one line box each.
            let first_dy = match style.valign {
                Valign::Top => 0.0,
                Valign::Center => -0.6 * (lines.len() - 1) as f64,
                Valign::Bottom => -1.2 * (lines.len() - 1) as f64,
            };
            for (i, line) in lines.iter().enumerate() {
                let dy = if i == 0 { first_dy } else { 1.2 };
                let mut span = SvgNode::new("tspan")
                    .attr("x", fmt_num(q.x))
                    .attr("dy", format!("{}em", fmt_num(dy)));
                span.text = Some((*line).to_string());
                node.children.push(span);
            }
        }
        self.push(style.zorder, node);
    }

    fn poly(&mut self, verts: &[Point], closed: bool, style: &Style) {
        if !closed {
            self.plot(verts, style);
            return;
        }
        self.expand_auto(verts);
        let mut points = String::new();
        for v in verts {
            let q = self.xform(*v);
            let _ = write!(points, "{},{} ", fmt_num(q.x), fmt_num(q.y));
        }
        let node = SvgNode::new("polygon")
            .attr("points", points.trim_end().to_string())
            .attr(
                "style",
                style_string(
                    Some(&style.color),
                    style.ls,
                    style.lw,
                    Some(style.capstyle),
                    Some(style.joinstyle),
                    style.fill.as_deref(),
                ),
            );
        self.push(style.zorder, node);
    }

    fn circle(&mut self, center: Point, radius: f64, style: &Style) {
        self.expand_auto(&[
            center + Point::new(radius, radius),
            center - Point::new(radius, radius),
        ]);
        let q = self.xform(center);
        let node = SvgNode::new("circle")
            .attr("cx", fmt_num(q.x))
            .attr("cy", fmt_num(q.y))
            .attr("r", fmt_num(radius * self.scale))
            .attr(
                "style",
                style_string(
                    Some(&style.color),
                    style.ls,
                    style.lw,
                    None,
                    None,
                    style.fill.as_deref(),
                ),
            );
        self.push(style.zorder, node);
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

        // All head geometry is computed in device space, where y is flipped.
        let tail = self.xform(pos);
        let dx = direction.x * self.scale;
        let dy = direction.y * self.scale;
        let headwidth = headwidth * self.scale;
        let headlength = headlength * self.scale;

        let head = Point::new(tail.x + dx, tail.y - dy);
        let fullen = dx.hypot(dy);
        let theta = -dy.atan2(dx).to_degrees();

        let finc = Point::new(fullen - headlength, 0.0).rotate(theta) + tail;
        let fin1 = Point::new(fullen - headlength, headwidth / 2.0).rotate(theta) + tail;
        let fin2 = Point::new(fullen - headlength, -headwidth / 2.0).rotate(theta) + tail;

        // Pull the tip back by the line width so the head does not overshoot
        // a stroked shaft ending at the same point.
        let theta_rad = theta.to_radians();
        let head = Point::new(
            head.x - style.lw * theta_rad.cos(),
            head.y - style.lw * theta_rad.sin(),
        );

        let tip = SvgNode::new("path")
            .attr(
                "d",
                format!(
                    "M {} {} L {} {} L {} {} Z",
                    fmt_num(head.x),
                    fmt_num(head.y),
                    fmt_num(fin1.x),
                    fmt_num(fin1.y),
                    fmt_num(fin2.x),
                    fmt_num(fin2.y)
                ),
            )
            .attr(
                "style",
                style_string(
                    Some(&style.color),
                    LineStyle::Solid,
                    0.0,
                    Some(CapStyle::Butt),
                    Some(JoinStyle::Miter),
                    Some(&style.color),
                ),
            );
        let shaft = SvgNode::new("path")
            .attr(
                "d",
                format!(
                    "M {} {} L {} {} Z",
                    fmt_num(finc.x),
                    fmt_num(finc.y),
                    fmt_num(tail.x),
                    fmt_num(tail.y)
                ),
            )
            .attr(
                "style",
                style_string(
                    Some(&style.color),
                    LineStyle::Solid,
                    style.lw,
                    Some(CapStyle::Butt),
                    Some(JoinStyle::Miter),
                    Some(&style.color),
                ),
            );
        self.push(style.zorder, tip);
        self.push(style.zorder, shaft);
    }

    fn bezier(&mut self, points: &[Point], style: &Style, arrow_at: Option<ArrowAt>) {
        assert!(
            points.len() == 3 || points.len() == 4,
            "bezier requires 3 (quadratic) or 4 (cubic) control points"
        );
        self.expand_auto(points);

        let dev: Vec<Point> = points.iter().map(|p| self.xform(*p)).collect();
        let mut d = format!("M {} {} ", fmt_num(dev[0].x), fmt_num(dev[0].y));
        d.push_str(if dev.len() == 4 { "C" } else { "Q" });
        for p in &dev[1..] {
            let _ = write!(d, " {} {}", fmt_num(p.x), fmt_num(p.y));
        }
        let node = SvgNode::new("path").attr("d", d).attr(
            "style",
            style_string(Some(&style.color), style.ls, style.lw, None, None, None),
        );
        self.push(style.zorder, node);

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

        let c = self.xform(center);
        let width_d = width * self.scale;
        let height_d = height * self.scale;

        // Device y grows downward, so every angle flips sign.
        let angle_d = -angle;
        let th1 = (-theta1).to_radians();
        let th2 = (-theta2).to_radians();
        let rot_d = angle_d.to_radians();

        // Eccentric correction: the positional angle of an ellipse differs
        // from its parameter angle, so the sweep bounds are re-derived before
        // computing endpoints.
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
        let (startx, starty) = (round2(start.x), round2(start.y));
        let (endx, endy) = (round2(end.x), round2(end.y));
        let (dx, dy) = (endx - startx, endy - starty);

        if dx.abs() < 0.1 && dy.abs() < 0.1 {
            // Full ellipse. A single curved path would collapse to a dot when
            // its endpoints coincide, so a dedicated node is emitted instead.
            let mut node = SvgNode::new("ellipse")
                .attr("cx", fmt_num(c.x))
                .attr("cy", fmt_num(c.y))
                .attr("rx", fmt_num(width_d / 2.0))
                .attr("ry", fmt_num(height_d / 2.0));
            if angle_d != 0.0 {
                node = node.attr(
                    "transform",
                    format!(
                        "rotate({} {} {})",
                        fmt_num(angle_d),
                        fmt_num(c.x),
                        fmt_num(c.y)
                    ),
                );
            }
            node = node
                .attr("stroke", style.color.clone())
                .attr("stroke-width", fmt_num(style.lw))
                .attr("fill", "none");
            self.push(style.zorder, node);
        } else {
            let flags = if (t2 - t1).abs() >= PI { "1 1" } else { "0 1" };
            let node = SvgNode::new("path")
                .attr(
                    "d",
                    format!(
                        "M {} {} a {} {} {} {} {} {}",
                        fmt_num(startx),
                        fmt_num(starty),
                        fmt_num(width_d / 2.0),
                        fmt_num(height_d / 2.0),
                        fmt_num(angle_d),
                        flags,
                        fmt_num(dx),
                        fmt_num(dy)
                    ),
                )
                .attr("stroke", style.color.clone())
                .attr("stroke-width", fmt_num(style.lw))
                .attr("fill", "none");
            self.push(style.zorder, node);
        }

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
        self.nodes.clear();
        self.auto_bbox = BBox::EMPTY;
    }

    fn image_bytes(
        &mut self,
        format: ImageFormat,
        _transparent: bool,
        _dpi: f64,
    ) -> DraftResult<Vec<u8>> {
        match format {
            ImageFormat::Svg => Ok(self.to_svg().into_bytes()),
            other => Err(DraftError::validation(format!(
                "format {other:?} is not available in the svg backend"
            ))),
        }
    }

    fn save(&mut self, path: &Path, transparent: bool, dpi: f64) -> DraftResult<()> {
        let bytes = self.image_bytes(ImageFormat::Svg, transparent, dpi)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
