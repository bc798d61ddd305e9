use crate::foundation::geom::BBox;

/// Stroke dash pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

impl LineStyle {
    /// Dash pattern in device units, `None` for a solid stroke.
    ///
    /// The patterns match what the vector backend writes as
    /// `stroke-dasharray`, so both backends dash identically.
    pub fn dash_pattern(self) -> Option<&'static [f32]> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some(&[7.4, 3.2]),
            LineStyle::Dotted => Some(&[2.0, 3.3]),
            LineStyle::DashDot => Some(&[12.8, 3.2, 2.0, 3.2]),
        }
    }

    /// `stroke-dasharray` attribute value, `None` for a solid stroke.
    pub fn dash_array(self) -> Option<&'static str> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some("7.4,3.2"),
            LineStyle::Dotted => Some("2,3.3"),
            LineStyle::DashDot => Some("12.8,3.2,2,3.2"),
        }
    }
}

/// Stroke end-cap shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapStyle {
    Butt,
    #[default]
    Round,
    Square,
}

impl CapStyle {
    pub fn as_svg(self) -> &'static str {
        match self {
            CapStyle::Butt => "butt",
            CapStyle::Round => "round",
            CapStyle::Square => "square",
        }
    }
}

/// Stroke corner join shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStyle {
    #[default]
    Round,
    Miter,
    Bevel,
}

impl JoinStyle {
    pub fn as_svg(self) -> &'static str {
        match self {
            JoinStyle::Round => "round",
            JoinStyle::Miter => "miter",
            JoinStyle::Bevel => "bevel",
        }
    }
}

/// Horizontal text anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Halign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical text anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Valign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Stroke/fill attributes attached to a single draw call.
///
/// Colors are CSS color strings (named or `#rrggbb[aa]`): the vector backend
/// emits them verbatim, the raster backend parses them at paint time. A
/// `fill` of `None` means unfilled.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Style {
    pub color: String,
    pub fill: Option<String>,
    pub lw: f64,
    pub ls: LineStyle,
    pub capstyle: CapStyle,
    pub joinstyle: JoinStyle,
    pub zorder: i32,
    pub clip: Option<BBox>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: "black".to_string(),
            fill: None,
            lw: 2.0,
            ls: LineStyle::Solid,
            capstyle: CapStyle::default(),
            joinstyle: JoinStyle::default(),
            zorder: 1,
            clip: None,
        }
    }
}

impl Style {
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    pub fn with_zorder(mut self, zorder: i32) -> Self {
        self.zorder = zorder;
        self
    }
}

/// Attributes for a text run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextStyle {
    pub color: String,
    pub fontsize: f64,
    pub fontfamily: String,
    /// Rotation about the anchor point, degrees counter-clockwise.
    pub rotation: f64,
    pub halign: Halign,
    pub valign: Valign,
    pub zorder: i32,
    pub clip: Option<BBox>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: "black".to_string(),
            fontsize: 14.0,
            fontfamily: "sans-serif".to_string(),
            rotation: 0.0,
            halign: Halign::default(),
            valign: Valign::default(),
            zorder: 3,
            clip: None,
        }
    }
}

/// Immutable per-session drawing configuration.
///
/// Construct directly, via [`DrawConfig::default`], or from a [`Theme`]
/// preset; pass it into the session. There is no process-global style state.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DrawConfig {
    /// Full length of a 2-terminal element, in user units.
    pub unit: f64,
    /// Physical scale: inches of output per user unit.
    pub inches_per_unit: f64,
    /// Default offset between an element and its label.
    pub label_offset: f64,
    pub fontsize: f64,
    pub font: String,
    pub color: String,
    pub lw: f64,
    pub ls: LineStyle,
    pub fill: Option<String>,
    pub bgcolor: Option<String>,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            unit: 3.0,
            inches_per_unit: 0.5,
            label_offset: 0.1,
            fontsize: 14.0,
            font: "sans-serif".to_string(),
            color: "black".to_string(),
            lw: 2.0,
            ls: LineStyle::Solid,
            fill: None,
            bgcolor: None,
        }
    }
}

impl DrawConfig {
    /// Default per-call style derived from this configuration.
    pub fn style(&self) -> Style {
        Style {
            color: self.color.clone(),
            fill: self.fill.clone(),
            lw: self.lw,
            ls: self.ls,
            ..Style::default()
        }
    }

    /// Default text style derived from this configuration.
    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            color: self.color.clone(),
            fontsize: self.fontsize,
            fontfamily: self.font.clone(),
            ..TextStyle::default()
        }
    }
}

/// Named presets producing a [`DrawConfig`] (line color + background).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Black on white.
    #[default]
    Default,
    /// White on black.
    Dark,
    SolarizedDark,
    SolarizedLight,
    OneDork,
    Oceans16,
    Monokai,
    GruvboxLight,
    GruvboxDark,
    Grade3,
    Chesterish,
}

impl Theme {
    /// Build a configuration value carrying this theme's colors.
    pub fn config(self) -> DrawConfig {
        let (color, bgcolor) = match self {
            Theme::Default => ("black", "white"),
            Theme::Dark => ("white", "black"),
            Theme::SolarizedDark => ("#657b83", "#002b36"),
            Theme::SolarizedLight => ("#073642", "#eee8d5"),
            Theme::OneDork => ("#899ab8", "#373e4b"),
            Theme::Oceans16 => ("#CDD2E9", "#384151"),
            Theme::Monokai => ("#BBBBBB", "#232323"),
            Theme::GruvboxLight => ("#3c3836", "#ebdbb2"),
            Theme::GruvboxDark => ("#d5c4a1", "#1d2021"),
            Theme::Grade3 => ("#3f3d46", "#ffffff"),
            Theme::Chesterish => ("#92A2BD", "#323A48"),
        };
        DrawConfig {
            color: color.to_string(),
            bgcolor: Some(bgcolor.to_string()),
            ..DrawConfig::default()
        }
    }
}
