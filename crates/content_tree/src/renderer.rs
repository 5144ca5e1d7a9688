//! Renderer request protocol
//!
//! The engine never reaches into the host. Whenever it needs work only the
//! host can do (measuring a replaced string, fetching a font file,
//! rasterizing an element) it issues exactly one [`RenderRequest`] and waits
//! for the matching [`RenderResponse`] before resuming traversal.

use crate::{FontStyle, NodeId, Rect, Result};
use serde::{Deserialize, Serialize};

/// Font selection handed to the host for text measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
    pub size: f32,
}

/// What part of an element should be rasterized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterTarget {
    /// Borders, rounded corners and shadows of an element, without content
    Decoration,
    /// A replaced element such as `img`
    Replaced,
}

/// Requests the engine may issue to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderRequest {
    /// Measure the advance width of a string in device pixels
    MeasureText { text: String, font: FontSpec },
    /// Fetch the font file behind an `@font-face` source
    LoadFont { source: String },
    /// Rasterize part of an element at the given device-pixel bounds
    Rasterize {
        node: NodeId,
        bounds: Rect,
        target: RasterTarget,
    },
}

impl RenderRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            RenderRequest::MeasureText { .. } => "measure_text",
            RenderRequest::LoadFont { .. } => "load_font",
            RenderRequest::Rasterize { .. } => "rasterize",
        }
    }
}

/// Metadata the host extracts from a font file for embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontMetrics {
    pub postscript_name: String,
    /// Glyph-space (1/1000 em) values
    pub ascent: i32,
    pub descent: i32,
    pub cap_height: i32,
    pub italic_angle: f32,
    pub bbox: [i32; 4],
    pub stem_v: i32,
    /// First WinAnsi code covered by `widths`
    pub first_char: u8,
    /// Advance widths in glyph space, one per code from `first_char`
    pub widths: Vec<u16>,
}

/// A loaded font file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontData {
    pub bytes: Vec<u8>,
    pub metrics: FontMetrics,
}

/// An 8-bit RGBA raster, rows top to bottom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self { width, height, rgba }
    }

    /// Whether the pixel buffer matches the declared dimensions
    pub fn is_consistent(&self) -> bool {
        self.rgba.len() == self.width as usize * self.height as usize * 4
    }
}

/// Host answers, one per request kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderResponse {
    Measured { width: f32 },
    Font(FontData),
    Raster(RasterImage),
}

impl RenderResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            RenderResponse::Measured { .. } => "measured",
            RenderResponse::Font(_) => "font",
            RenderResponse::Raster(_) => "raster",
        }
    }
}

/// The host side of the protocol.
///
/// `handle` is synchronous: the engine is suspended until it returns, so at
/// most one request is ever outstanding and traversal order is preserved.
pub trait Renderer {
    fn handle(&mut self, request: RenderRequest) -> Result<RenderResponse>;
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn handle(&mut self, request: RenderRequest) -> Result<RenderResponse> {
        (**self).handle(request)
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn handle(&mut self, request: RenderRequest) -> Result<RenderResponse> {
        (**self).handle(request)
    }
}
