//! Computed style snapshot
//!
//! Only the properties the PDF engine acts on are carried over from the
//! host's computed style. Everything visual beyond fills and text (borders,
//! rounded corners, shadows) is flagged so the engine can ask the host to
//! rasterize it.

use serde::{Deserialize, Serialize};

/// RGBA color, channels 0-255, alpha 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "default_alpha")]
    pub a: f32,
}

fn default_alpha() -> f32 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 1.0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 1.0 };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// Composite over a white backdrop. PDF output carries no transparency.
    pub fn flatten_on_white(&self) -> Color {
        let a = self.a.clamp(0.0, 1.0);
        let blend = |c: u8| -> u8 { (c as f32 * a + 255.0 * (1.0 - a)).round() as u8 };
        Color::rgb(blend(self.r), blend(self.g), blend(self.b))
    }

    /// Channels as fractions for PDF color operators
    pub fn to_unit_rgb(&self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Font style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn is_slanted(&self) -> bool {
        !matches!(self, FontStyle::Normal)
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

/// CSS `page-break-*` value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakRule {
    #[default]
    Auto,
    Always,
    Avoid,
}

/// Border widths per edge in device pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub right: f32,
    #[serde(default)]
    pub bottom: f32,
    #[serde(default)]
    pub left: f32,
}

impl Edges {
    pub fn any(&self) -> bool {
        self.top > 0.0 || self.right > 0.0 || self.bottom > 0.0 || self.left > 0.0
    }
}

/// The subset of computed style the engine reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStyle {
    /// CSS font-family list, comma separated, first entry preferred
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_font_weight")]
    pub font_weight: u16,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub background_color: Option<Color>,
    /// Computed line height in device pixels (None = normal)
    #[serde(default)]
    pub line_height: Option<f32>,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default)]
    pub border_width: Edges,
    #[serde(default)]
    pub border_radius: f32,
    #[serde(default)]
    pub box_shadow: bool,
    #[serde(default)]
    pub page_break_before: BreakRule,
    #[serde(default)]
    pub page_break_after: BreakRule,
    #[serde(default)]
    pub page_break_inside: BreakRule,
}

fn default_font_family() -> String {
    "Helvetica".to_string()
}

fn default_font_size() -> f32 {
    16.0
}

fn default_font_weight() -> u16 {
    400
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: default_font_size(),
            font_weight: default_font_weight(),
            font_style: FontStyle::Normal,
            color: Color::BLACK,
            background_color: None,
            line_height: None,
            text_align: TextAlign::Left,
            border_width: Edges::default(),
            border_radius: 0.0,
            box_shadow: false,
            page_break_before: BreakRule::Auto,
            page_break_after: BreakRule::Auto,
            page_break_inside: BreakRule::Auto,
        }
    }
}

impl ComputedStyle {
    /// Effective line height; `normal` resolves to 1.2em
    pub fn effective_line_height(&self) -> f32 {
        self.line_height.unwrap_or(self.font_size * 1.2)
    }

    /// Font families in preference order, quotes stripped
    pub fn font_families(&self) -> impl Iterator<Item = &str> {
        self.font_family
            .split(',')
            .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|f| !f.is_empty())
    }

    /// Whether the element carries decoration that cannot be expressed
    /// as plain fills and must be rasterized by the host
    pub fn needs_rasterization(&self) -> bool {
        self.border_width.any() || self.border_radius > 0.0 || self.box_shadow
    }

    pub fn is_bold(&self) -> bool {
        self.font_weight >= 600
    }
}
