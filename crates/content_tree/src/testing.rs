//! Deterministic renderer for tests
//!
//! Measures text as half an em per character, serves every font source as
//! a synthetic font whose bytes are the source string, and rasterizes any
//! element as a solid block. Every request is recorded in order.

use crate::{
    ContentError, FontData, FontMetrics, RasterImage, RasterTarget, RenderRequest, RenderResponse,
    Renderer, Result,
};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ScriptedRenderer {
    /// Requests in the order they were issued
    pub requests: Vec<RenderRequest>,
    /// Font sources mapped to explicit bytes (dedup tests)
    pub font_bytes: HashMap<String, Vec<u8>>,
    /// Font sources that fail to load
    pub failing_fonts: Vec<String>,
    /// Answer every request with a measurement, whatever was asked
    pub answer_wrong_kind: bool,
}

impl ScriptedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `source` with the given file contents
    pub fn with_font_bytes(mut self, source: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.font_bytes.insert(source.into(), bytes);
        self
    }

    pub fn count(&self, kind: &str) -> usize {
        self.requests.iter().filter(|r| r.kind() == kind).count()
    }

    fn synthetic_font(&self, source: &str) -> FontData {
        let bytes = self
            .font_bytes
            .get(source)
            .cloned()
            .unwrap_or_else(|| source.as_bytes().to_vec());
        FontData {
            bytes,
            metrics: FontMetrics {
                postscript_name: source
                    .rsplit('/')
                    .next()
                    .unwrap_or(source)
                    .trim_end_matches(".ttf")
                    .replace(' ', "-"),
                ascent: 800,
                descent: -200,
                cap_height: 700,
                italic_angle: 0.0,
                bbox: [-100, -200, 1000, 900],
                stem_v: 80,
                first_char: 32,
                widths: vec![500; 224],
            },
        }
    }
}

impl Renderer for ScriptedRenderer {
    fn handle(&mut self, request: RenderRequest) -> Result<RenderResponse> {
        self.requests.push(request.clone());
        if self.answer_wrong_kind {
            return Ok(RenderResponse::Measured { width: 0.0 });
        }
        match request {
            RenderRequest::MeasureText { text, font } => Ok(RenderResponse::Measured {
                width: text.chars().count() as f32 * font.size * 0.5,
            }),
            RenderRequest::LoadFont { source } => {
                if self.failing_fonts.contains(&source) {
                    return Err(ContentError::FontLoad {
                        source_url: source,
                        reason: "scripted failure".to_string(),
                    });
                }
                Ok(RenderResponse::Font(self.synthetic_font(&source)))
            }
            RenderRequest::Rasterize { bounds, target, .. } => {
                let width = bounds.width.ceil().clamp(1.0, 64.0) as u32;
                let height = bounds.height.ceil().clamp(1.0, 64.0) as u32;
                let pixel: [u8; 4] = match target {
                    RasterTarget::Decoration => [0, 0, 0, 128],
                    RasterTarget::Replaced => [200, 40, 40, 255],
                };
                let rgba = pixel
                    .iter()
                    .copied()
                    .cycle()
                    .take(width as usize * height as usize * 4)
                    .collect();
                Ok(RenderResponse::Raster(RasterImage::new(width, height, rgba)))
            }
        }
    }
}
