//! Text-measurement collaborator.
//!
//! Glyph-accurate text handling lives outside the drawing core; the canvas
//! and segment layers only need an estimate of how much room a text run
//! takes in user units. [`ApproxTextMeasure`] is always available and close
//! enough for layout; the `raster` feature adds [`CosmicTextMeasure`], which
//! shapes the actual glyphs.

/// Measured extent of a text run, in user units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextSize {
    pub width: f64,
    pub height: f64,
    pub line_spacing: f64,
}

/// Provides (width, height, line-spacing) for a text run in user units.
///
/// Implementations may be exact or approximate; both backends tolerate
/// either.
pub trait TextMeasure {
    fn measure(&self, text: &str, family: &str, size: f64) -> TextSize;
}

/// Character-class width estimate, no font access.
///
/// Font sizes are in points; `points_per_unit` converts the estimate into
/// user units (72 pt/inch x inches-per-unit, so 36.0 at the default scale).
#[derive(Clone, Copy, Debug)]
pub struct ApproxTextMeasure {
    pub points_per_unit: f64,
}

impl Default for ApproxTextMeasure {
    fn default() -> Self {
        Self {
            points_per_unit: 36.0,
        }
    }
}

impl ApproxTextMeasure {
    pub fn new(points_per_unit: f64) -> Self {
        Self { points_per_unit }
    }

    fn char_width_factor(c: char) -> f64 {
        match c {
            'i' | 'j' | 'l' | 't' | 'f' | 'I' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.3,
            'm' | 'w' | 'M' | 'W' | '@' => 0.9,
            ' ' => 0.35,
            c if c.is_ascii_uppercase() || c.is_ascii_digit() => 0.7,
            _ => 0.55,
        }
    }
}

impl TextMeasure for ApproxTextMeasure {
    fn measure(&self, text: &str, _family: &str, size: f64) -> TextSize {
        if text.is_empty() {
            return TextSize {
                width: 0.0,
                height: 0.0,
                line_spacing: 0.0,
            };
        }
        let line_spacing = size * 1.2;
        let mut width_pt: f64 = 0.0;
        let mut lines = 0usize;
        for line in text.split('\n') {
            lines += 1;
            let w: f64 = line.chars().map(Self::char_width_factor).sum::<f64>() * size;
            width_pt = width_pt.max(w);
        }
        TextSize {
            width: width_pt / self.points_per_unit,
            height: (lines as f64) * line_spacing / self.points_per_unit,
            line_spacing: line_spacing / self.points_per_unit,
        }
    }
}

#[cfg(feature = "raster")]
pub use exact::CosmicTextMeasure;

#[cfg(feature = "raster")]
mod exact {
    use std::cell::RefCell;

    use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};

    use super::{TextMeasure, TextSize};

    /// Glyph-accurate measurement by shaping with cosmic-text.
    pub struct CosmicTextMeasure {
        font_system: RefCell<FontSystem>,
        points_per_unit: f64,
    }

    impl CosmicTextMeasure {
        pub fn new(points_per_unit: f64) -> Self {
            Self {
                font_system: RefCell::new(FontSystem::new()),
                points_per_unit,
            }
        }
    }

    impl Default for CosmicTextMeasure {
        fn default() -> Self {
            Self::new(36.0)
        }
    }

    pub(crate) fn family_for(name: &str) -> Family<'_> {
        match name {
            "sans-serif" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" => Family::Monospace,
            "cursive" => Family::Cursive,
            other => Family::Name(other),
        }
    }

    impl TextMeasure for CosmicTextMeasure {
        fn measure(&self, text: &str, family: &str, size: f64) -> TextSize {
            if text.is_empty() {
                return TextSize {
                    width: 0.0,
                    height: 0.0,
                    line_spacing: 0.0,
                };
            }
            let mut fs = self.font_system.borrow_mut();
            let line_height = (size * 1.2) as f32;
            let metrics = Metrics::new(size as f32, line_height);
            let mut buffer = Buffer::new(&mut fs, metrics);
            let attrs = Attrs::new().family(family_for(family));
            buffer.set_text(&mut fs, text, &attrs, Shaping::Advanced, None);
            buffer.shape_until_scroll(&mut fs, false);

            let mut width: f32 = 0.0;
            let mut lines = 0usize;
            for run in buffer.layout_runs() {
                width = width.max(run.line_w);
                lines += 1;
            }
            TextSize {
                width: f64::from(width) / self.points_per_unit,
                height: (lines.max(1) as f64) * f64::from(line_height) / self.points_per_unit,
                line_spacing: f64::from(line_height) / self.points_per_unit,
            }
        }
    }
}
