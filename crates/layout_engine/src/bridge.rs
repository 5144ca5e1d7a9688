//! Renderer bridge
//!
//! Wraps the host renderer. Every call issues one request and returns only
//! once the matching response arrived, so traversal never has more than
//! one request in flight.

use crate::{LayoutError, Result};
use content_tree::{
    ContentError, FontData, FontSpec, NodeId, RasterImage, RasterTarget, Rect, RenderRequest,
    RenderResponse, Renderer,
};

pub struct RendererBridge<R> {
    renderer: R,
    issued: usize,
}

impl<R: Renderer> RendererBridge<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer, issued: 0 }
    }

    /// Requests issued so far
    pub fn issued(&self) -> usize {
        self.issued
    }

    pub fn into_inner(self) -> R {
        self.renderer
    }

    fn request(&mut self, request: RenderRequest) -> Result<RenderResponse> {
        self.issued += 1;
        let kind = request.kind();
        tracing::trace!(request = kind, seq = self.issued, "renderer request");
        let response = self.renderer.handle(request)?;
        tracing::trace!(request = kind, response = response.kind(), "renderer response");
        Ok(response)
    }

    /// Advance width of `text` in device pixels
    pub fn measure_text(&mut self, text: &str, font: FontSpec) -> Result<f32> {
        match self.request(RenderRequest::MeasureText {
            text: text.to_string(),
            font,
        })? {
            RenderResponse::Measured { width } => Ok(width),
            other => Err(unexpected("measure_text", &other)),
        }
    }

    /// Font file and metrics behind an `@font-face` source
    pub fn load_font(&mut self, source: &str) -> Result<FontData> {
        match self.request(RenderRequest::LoadFont {
            source: source.to_string(),
        })? {
            RenderResponse::Font(data) => Ok(data),
            other => Err(unexpected("load_font", &other)),
        }
    }

    /// Raster of an element's decoration or replaced content
    pub fn rasterize(&mut self, node: NodeId, bounds: Rect, target: RasterTarget) -> Result<RasterImage> {
        match self.request(RenderRequest::Rasterize { node, bounds, target })? {
            RenderResponse::Raster(image) if image.is_consistent() => Ok(image),
            RenderResponse::Raster(image) => Err(ContentError::Rasterize {
                node: node.to_string(),
                reason: format!(
                    "{} bytes do not make a {}x{} RGBA image",
                    image.rgba.len(),
                    image.width,
                    image.height
                ),
            }
            .into()),
            other => Err(unexpected("rasterize", &other)),
        }
    }
}

fn unexpected(expected: &'static str, response: &RenderResponse) -> LayoutError {
    LayoutError::UnexpectedResponse {
        expected,
        actual: response.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_tree::testing::ScriptedRenderer;
    use content_tree::FontStyle;

    fn spec() -> FontSpec {
        FontSpec {
            family: "Helvetica".to_string(),
            weight: 400,
            style: FontStyle::Normal,
            size: 10.0,
        }
    }

    #[test]
    fn test_requests_are_answered_in_order() {
        let mut bridge = RendererBridge::new(ScriptedRenderer::new());
        assert_eq!(bridge.measure_text("abcd", spec()).unwrap(), 20.0);
        let font = bridge.load_font("fonts/Inter.ttf").unwrap();
        assert_eq!(font.metrics.postscript_name, "Inter");
        let image = bridge
            .rasterize(NodeId::new(), Rect::new(0.0, 0.0, 3.0, 2.0), RasterTarget::Replaced)
            .unwrap();
        assert_eq!((image.width, image.height), (3, 2));

        assert_eq!(bridge.issued(), 3);
        let renderer = bridge.into_inner();
        let kinds: Vec<_> = renderer.requests.iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, vec!["measure_text", "load_font", "rasterize"]);
    }

    #[test]
    fn test_wrong_response_kind() {
        let mut renderer = ScriptedRenderer::new();
        renderer.answer_wrong_kind = true;
        let mut bridge = RendererBridge::new(renderer);
        assert!(matches!(
            bridge.load_font("a.ttf"),
            Err(LayoutError::UnexpectedResponse { expected: "load_font", actual: "measured" })
        ));
    }

    #[test]
    fn test_renderer_failure_propagates() {
        let mut renderer = ScriptedRenderer::new();
        renderer.failing_fonts.push("broken.ttf".to_string());
        let mut bridge = RendererBridge::new(renderer);
        assert!(matches!(
            bridge.load_font("broken.ttf"),
            Err(LayoutError::Renderer(ContentError::FontLoad { .. }))
        ));
    }
}
