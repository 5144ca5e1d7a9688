//! Font binding
//!
//! Maps a text run's computed style to a PDF font resource. Declared
//! `@font-face` entries win when their family matches; the closest weight
//! is preferred, then the closest style. Without a matching face the run
//! falls back to one of the standard 14 fonts.

use crate::bridge::RendererBridge;
use crate::{LayoutError, LayoutWarning, Result};
use content_tree::{ComputedStyle, FontData, FontFace, FontStyle, Renderer};
use pdf_model::{FontManager, FontResource, PdfDocument, StandardFont, TrueTypeProgram};
use std::collections::HashMap;

/// Ascent of the standard fonts as a fraction of the em
const STANDARD_ASCENT: f32 = 0.75;

/// A font ready to be used in content streams
#[derive(Debug, Clone, PartialEq)]
pub struct BoundFont {
    pub resource: FontResource,
    /// Ascent as a fraction of the font size
    pub ascent: f32,
}

fn style_penalty(face: FontStyle, wanted: FontStyle) -> u8 {
    if face == wanted {
        0
    } else if face.is_slanted() && wanted.is_slanted() {
        1
    } else {
        2
    }
}

/// Best declared face for `style`: first matching family, then smallest
/// weight distance, then style
pub fn select_face<'a>(faces: &'a [FontFace], style: &ComputedStyle) -> Option<&'a FontFace> {
    style.font_families().find_map(|family| {
        faces
            .iter()
            .filter(|face| face.family.eq_ignore_ascii_case(family))
            .min_by_key(|face| {
                (
                    face.weight.abs_diff(style.font_weight),
                    style_penalty(face.style, style.font_style),
                )
            })
    })
}

/// Standard font for `style`
pub fn standard_font_for(style: &ComputedStyle) -> StandardFont {
    let bold = style.is_bold();
    let italic = style.font_style.is_slanted();
    style
        .font_families()
        .find_map(|family| StandardFont::from_name(family, bold, italic))
        .unwrap_or_else(|| StandardFont::default_fallback(bold, italic))
}

fn to_program(data: FontData) -> TrueTypeProgram {
    let metrics = data.metrics;
    TrueTypeProgram {
        postscript_name: metrics.postscript_name,
        bytes: data.bytes,
        ascent: metrics.ascent,
        descent: metrics.descent,
        cap_height: metrics.cap_height,
        italic_angle: metrics.italic_angle,
        bbox: metrics.bbox,
        stem_v: metrics.stem_v,
        first_char: metrics.first_char,
        widths: metrics.widths,
    }
}

/// Binds styles to fonts for one document
pub struct FontBinder {
    faces: Vec<FontFace>,
    /// Results per face source; `None` once loading failed
    loaded: HashMap<String, Option<BoundFont>>,
    fonts: FontManager,
}

impl FontBinder {
    pub fn new(faces: Vec<FontFace>) -> Self {
        Self {
            faces,
            loaded: HashMap::new(),
            fonts: FontManager::new(),
        }
    }

    /// Font for a text run. Each face source is loaded at most once and
    /// identical font files are embedded once.
    pub fn bind<R: Renderer>(
        &mut self,
        style: &ComputedStyle,
        doc: &mut PdfDocument,
        bridge: &mut RendererBridge<R>,
        warnings: &mut Vec<LayoutWarning>,
    ) -> Result<BoundFont> {
        if let Some(source) = select_face(&self.faces, style).map(|face| face.source.clone()) {
            match self.loaded.get(&source) {
                Some(Some(bound)) => return Ok(bound.clone()),
                Some(None) => {}
                None => match bridge.load_font(&source) {
                    Ok(data) => {
                        let program = to_program(data);
                        let resource = self.fonts.embed(doc, &program)?;
                        let bound = BoundFont {
                            resource,
                            ascent: program.ascent as f32 / 1000.0,
                        };
                        self.loaded.insert(source, Some(bound.clone()));
                        return Ok(bound);
                    }
                    Err(LayoutError::Renderer(err)) => {
                        let warning = LayoutWarning::FontFallback {
                            source: source.clone(),
                            reason: err.to_string(),
                        };
                        tracing::warn!(%warning, "font fallback");
                        warnings.push(warning);
                        self.loaded.insert(source, None);
                    }
                    Err(other) => return Err(other),
                },
            }
        }

        let font = standard_font_for(style);
        Ok(BoundFont {
            resource: self.fonts.standard(doc, font),
            ascent: STANDARD_ASCENT,
        })
    }

    pub fn font_count(&self) -> usize {
        self.fonts.font_count()
    }

    pub fn embedded_count(&self) -> usize {
        self.fonts.embedded_count()
    }
}
