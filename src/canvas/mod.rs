//! Backend-agnostic drawing canvas.
//!
//! Both renderers implement [`Canvas`] and nothing else is shared between
//! them: each owns its own buffering and compositing strategy. Select one
//! through [`create_canvas`], which surfaces an unavailable backend as a
//! configuration error at selection time rather than at export.

use std::path::Path;

use crate::foundation::error::{DraftError, DraftResult};
use crate::foundation::geom::{BBox, Point};
use crate::style::{Style, TextStyle};

pub(crate) mod arrows;
pub mod svg;

#[cfg(feature = "raster")]
pub mod raster;

pub use svg::SvgFigure;

#[cfg(feature = "raster")]
pub use raster::RasterFigure;

/// Which end(s) of a Bezier curve receive an arrowhead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowAt {
    Start,
    End,
    Both,
}

/// Which end of an arc sweep receives a tangential arrowhead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepArrow {
    /// Head at the start of the sweep, pointing clockwise.
    Cw,
    /// Head at the end of the sweep, pointing counter-clockwise.
    Ccw,
}

/// Export image encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Svg,
    Png,
    Jpeg,
    Bmp,
}

impl ImageFormat {
    /// Guess a format from a file extension.
    pub fn from_ext(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }
}

/// Drawing surface contract shared by every backend.
///
/// All geometry is in user units; styles carry per-call attributes with the
/// documented defaults (black, line width 2, round caps and joins). Export
/// calls are idempotent: they read the accumulated primitives without
/// consuming them.
pub trait Canvas {
    /// Draw a poly-line through `points`. A [`Point::GAP`] entry (or any
    /// non-finite pair) starts a new disconnected subpath. `style.fill`
    /// rasterizes the closed region.
    fn plot(&mut self, points: &[Point], style: &Style);

    /// Place a text run anchored at `pos` with 9-way alignment and rotation
    /// about the anchor. Empty strings are a no-op.
    fn text(&mut self, s: &str, pos: Point, style: &TextStyle);

    /// Draw a vertex chain. With `closed = false` this degrades to
    /// [`Canvas::plot`] (no polygon-fill semantics).
    fn poly(&mut self, verts: &[Point], closed: bool, style: &Style);

    fn circle(&mut self, center: Point, radius: f64, style: &Style);

    /// Draw a line-less filled arrowhead whose tip sits at `pos + direction`,
    /// pulled back by the line width so it composes with a stroked shaft,
    /// with back corners offset half of `headwidth` perpendicular to
    /// `direction`. Zero-length directions are a no-op.
    fn arrow(&mut self, pos: Point, direction: Point, headwidth: f64, headlength: f64, style: &Style);

    /// Draw a quadratic (3 points) or cubic (4 points) Bezier curve, with
    /// optional arrowheads along the end tangents.
    ///
    /// Other point counts violate the caller contract.
    fn bezier(&mut self, points: &[Point], style: &Style, arrow_at: Option<ArrowAt>);

    /// Draw an elliptical arc sweeping counter-clockwise from `theta1` to
    /// `theta2` degrees (parameter angles on the ellipse's auxiliary circle),
    /// rotated by `angle` degrees about `center`. Coincident endpoints are
    /// emitted as a full ellipse. `arrow` adds a tangential head at the start
    /// (`Cw`) or end (`Ccw`) of the sweep.
    #[allow(clippy::too_many_arguments)]
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
    );

    /// Override automatic extent computation. A bbox with non-finite
    /// components means "fall back to auto-fit".
    fn set_bbox(&mut self, bbox: BBox);

    fn set_background(&mut self, color: &str);

    /// Draw a frame rectangle around the drawing extent at export.
    fn show_frame(&mut self, show: bool);

    /// Drop accumulated primitives; configuration (scale, frame visibility,
    /// background) survives.
    fn clear(&mut self);

    /// Encode the accumulated drawing. `transparent` and `dpi` only apply to
    /// raster formats.
    fn image_bytes(&mut self, format: ImageFormat, transparent: bool, dpi: f64)
    -> DraftResult<Vec<u8>>;

    /// Write the drawing to `path`, inferring the format from the extension
    /// (defaulting to the backend's native format).
    fn save(&mut self, path: &Path, transparent: bool, dpi: f64) -> DraftResult<()>;
}

/// Available canvas backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasKind {
    /// Vector-markup document, always available.
    #[default]
    Svg,
    /// tiny-skia raster surface, behind the `raster` feature.
    Raster,
}

/// Construction parameters shared by both backends.
#[derive(Clone, Debug)]
pub struct CanvasOpts {
    /// Initial extent; the empty sentinel means auto-fit.
    pub bbox: BBox,
    /// Physical scale: inches of output per user unit.
    pub inches_per_unit: f64,
    pub showframe: bool,
    pub bgcolor: Option<String>,
}

impl Default for CanvasOpts {
    fn default() -> Self {
        Self {
            bbox: BBox::EMPTY,
            inches_per_unit: 0.5,
            showframe: false,
            bgcolor: None,
        }
    }
}

/// Create a canvas backend.
///
/// Requesting [`CanvasKind::Raster`] without the `raster` feature compiled in
/// is a configuration error, reported here and not deferred to export time.
pub fn create_canvas(kind: CanvasKind, opts: &CanvasOpts) -> DraftResult<Box<dyn Canvas>> {
    match kind {
        CanvasKind::Svg => Ok(Box::new(SvgFigure::new(opts.clone()))),
        #[cfg(feature = "raster")]
        CanvasKind::Raster => Ok(Box::new(RasterFigure::new(opts.clone()))),
        #[allow(unreachable_patterns)]
        _ => Err(DraftError::backend(
            "requested canvas backend is not available",
        )),
    }
}
