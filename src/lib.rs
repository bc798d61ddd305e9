//! Draftline renders placed 2-D diagram elements into finished images.
//!
//! The crate is split along one seam: a backend-agnostic [`Canvas`] contract
//! with two independent renderers (an SVG document writer and, behind the
//! `raster` feature, a tiny-skia paint surface), and a [`Drawing`] session
//! that places [`Element`]s while tracking cursor position, heading, named
//! anchors, and the aggregate bounding box.
//!
//! - Build a [`Drawing`], optionally from a [`Theme`] preset
//! - Add [`SegmentElement`]s (or your own [`Element`] implementations)
//! - Export with [`Drawing::save`] or [`Drawing::image_bytes`]
#![forbid(unsafe_code)]

pub mod canvas;
pub mod drawing;
pub mod element;
mod foundation;
pub mod segment;
pub mod style;
pub mod textmeasure;

pub use crate::canvas::{
    ArrowAt, Canvas, CanvasKind, CanvasOpts, ImageFormat, SvgFigure, SweepArrow, create_canvas,
};
#[cfg(feature = "raster")]
pub use crate::canvas::RasterFigure;
pub use crate::drawing::Drawing;
pub use crate::element::{Element, SegmentElement};
pub use crate::foundation::error::{DraftError, DraftResult};
pub use crate::foundation::geom::{BBox, Point};
pub use crate::segment::Segment;
pub use crate::style::{
    CapStyle, DrawConfig, Halign, JoinStyle, LineStyle, Style, TextStyle, Theme, Valign,
};
#[cfg(feature = "raster")]
pub use crate::textmeasure::CosmicTextMeasure;
pub use crate::textmeasure::{ApproxTextMeasure, TextMeasure, TextSize};
