//! PDF Font Handling
//!
//! This module handles font resources for PDF export.
//! It supports:
//! - Standard 14 PDF fonts (always available, never embedded)
//! - TrueType font embedding from host-supplied metrics
//! - Font descriptor generation
//! - Deduplication of embedded font files by content hash

use crate::document::PdfDocument;
use crate::error::Result;
use crate::{ObjectRef, PdfDictionary, PdfObject, PdfStream};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Standard 14 PDF fonts (built into every PDF viewer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    /// Times Roman
    TimesRoman,
    /// Times Bold
    TimesBold,
    /// Times Italic
    TimesItalic,
    /// Times Bold Italic
    TimesBoldItalic,
    /// Helvetica
    Helvetica,
    /// Helvetica Bold
    HelveticaBold,
    /// Helvetica Oblique
    HelveticaOblique,
    /// Helvetica Bold Oblique
    HelveticaBoldOblique,
    /// Courier
    Courier,
    /// Courier Bold
    CourierBold,
    /// Courier Oblique
    CourierOblique,
    /// Courier Bold Oblique
    CourierBoldOblique,
    /// Symbol
    Symbol,
    /// Zapf Dingbats
    ZapfDingbats,
}

impl StandardFont {
    /// Get the PDF name for this font
    pub fn pdf_name(&self) -> &'static str {
        match self {
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
            StandardFont::Symbol => "Symbol",
            StandardFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Whether the font is a text font (symbol fonts carry their own encoding)
    pub fn is_text_font(&self) -> bool {
        !matches!(self, StandardFont::Symbol | StandardFont::ZapfDingbats)
    }

    /// Try to match a CSS family name to a standard font
    pub fn from_name(name: &str, bold: bool, italic: bool) -> Option<Self> {
        let name_lower = name.to_lowercase();

        // Generic families first; "sans-serif" contains "serif"
        if name_lower.contains("helvetica")
            || name_lower.contains("arial")
            || name_lower.contains("sans")
            || name_lower == "system-ui"
        {
            return Some(match (bold, italic) {
                (false, false) => StandardFont::Helvetica,
                (true, false) => StandardFont::HelveticaBold,
                (false, true) => StandardFont::HelveticaOblique,
                (true, true) => StandardFont::HelveticaBoldOblique,
            });
        }

        // Times variants
        if name_lower.contains("times") || name_lower.contains("serif") {
            return Some(match (bold, italic) {
                (false, false) => StandardFont::TimesRoman,
                (true, false) => StandardFont::TimesBold,
                (false, true) => StandardFont::TimesItalic,
                (true, true) => StandardFont::TimesBoldItalic,
            });
        }

        // Courier variants
        if name_lower.contains("courier") || name_lower.contains("mono") {
            return Some(match (bold, italic) {
                (false, false) => StandardFont::Courier,
                (true, false) => StandardFont::CourierBold,
                (false, true) => StandardFont::CourierOblique,
                (true, true) => StandardFont::CourierBoldOblique,
            });
        }

        // Symbol fonts
        if name_lower.contains("symbol") {
            return Some(StandardFont::Symbol);
        }
        if name_lower.contains("dingbat") || name_lower.contains("zapf") {
            return Some(StandardFont::ZapfDingbats);
        }

        None
    }

    /// Get default fallback font
    pub fn default_fallback(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => StandardFont::Helvetica,
            (true, false) => StandardFont::HelveticaBold,
            (false, true) => StandardFont::HelveticaOblique,
            (true, true) => StandardFont::HelveticaBoldOblique,
        }
    }
}

/// A TrueType font file plus the metrics needed to describe it
#[derive(Debug, Clone, PartialEq)]
pub struct TrueTypeProgram {
    pub postscript_name: String,
    pub bytes: Vec<u8>,
    /// Glyph-space (1/1000 em) values
    pub ascent: i32,
    pub descent: i32,
    pub cap_height: i32,
    pub italic_angle: f32,
    pub bbox: [i32; 4],
    pub stem_v: i32,
    pub first_char: u8,
    pub widths: Vec<u16>,
}

impl TrueTypeProgram {
    /// SHA-256 of the font file
    pub fn content_hash(&self) -> [u8; 32] {
        Sha256::digest(&self.bytes).into()
    }

    fn base_font(&self) -> String {
        let name: String = self
            .postscript_name
            .chars()
            .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
            .collect();
        if name.is_empty() {
            "EmbeddedFont".to_string()
        } else {
            name
        }
    }

    fn last_char(&self) -> u8 {
        let span = self.widths.len().saturating_sub(1).min(255 - self.first_char as usize);
        self.first_char + span as u8
    }
}

/// Font reference in a PDF document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontResource {
    /// Resource name (e.g. "F1")
    pub name: String,
    /// Font dictionary
    pub reference: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum FontKey {
    Standard(StandardFont),
    Embedded([u8; 32]),
}

/// Font manager for a document: each distinct font is written once and
/// named `F1`, `F2`, ...
#[derive(Debug, Default)]
pub struct FontManager {
    fonts: HashMap<FontKey, FontResource>,
}

impl FontManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_name(&self) -> String {
        format!("F{}", self.fonts.len() + 1)
    }

    /// Resource for a standard font
    pub fn standard(&mut self, doc: &mut PdfDocument, font: StandardFont) -> FontResource {
        let key = FontKey::Standard(font);
        if let Some(existing) = self.fonts.get(&key) {
            return existing.clone();
        }
        let encoding = font.is_text_font().then(|| doc.encoding());
        let reference = doc
            .registry_mut()
            .promote(create_standard_font_dict(font, encoding));
        let resource = FontResource {
            name: self.next_name(),
            reference,
        };
        tracing::debug!(font = font.pdf_name(), name = %resource.name, "standard font added");
        self.fonts.insert(key, resource.clone());
        resource
    }

    /// Resource for an embedded TrueType font; identical files are embedded once
    pub fn embed(&mut self, doc: &mut PdfDocument, program: &TrueTypeProgram) -> Result<FontResource> {
        let key = FontKey::Embedded(program.content_hash());
        if let Some(existing) = self.fonts.get(&key) {
            return Ok(existing.clone());
        }
        let encoding = doc.encoding();
        let registry = doc.registry_mut();

        let mut file = PdfStream::new(program.bytes.clone());
        file.dict.insert("Length1", program.bytes.len());
        let file_ref = registry.promote(file);

        let descriptor_ref = registry.promote(create_font_descriptor(program, file_ref));

        let base_font = program.base_font();
        let widths = program
            .widths
            .iter()
            .take(program.last_char() as usize - program.first_char as usize + 1)
            .map(|w| PdfObject::Integer(*w as i64))
            .collect();
        let font = PdfDictionary::new()
            .with_type("Font")
            .with("Subtype", PdfObject::name("TrueType"))
            .with("BaseFont", PdfObject::name(base_font.as_str()))
            .with("FirstChar", program.first_char as i64)
            .with("LastChar", program.last_char() as i64)
            .with("Widths", PdfObject::Array(widths))
            .with("FontDescriptor", descriptor_ref)
            .with("Encoding", encoding);
        let reference = registry.promote(font);

        let resource = FontResource {
            name: self.next_name(),
            reference,
        };
        tracing::debug!(font = %base_font, name = %resource.name, bytes = program.bytes.len(), "font embedded");
        self.fonts.insert(key, resource.clone());
        Ok(resource)
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// Embedded (non-standard) fonts
    pub fn embedded_count(&self) -> usize {
        self.fonts
            .keys()
            .filter(|k| matches!(k, FontKey::Embedded(_)))
            .count()
    }
}

/// Create a font dictionary for a standard font
pub fn create_standard_font_dict(font: StandardFont, encoding: Option<ObjectRef>) -> PdfDictionary {
    let mut dict = PdfDictionary::new().with_type("Font");

    dict.insert("Subtype", PdfObject::name("Type1"));
    dict.insert("BaseFont", PdfObject::name(font.pdf_name()));

    if let Some(encoding) = encoding {
        dict.insert("Encoding", encoding);
    }

    dict
}

/// Font descriptor for an embedded TrueType program
fn create_font_descriptor(program: &TrueTypeProgram, file: ObjectRef) -> PdfDictionary {
    // Nonsymbolic, plus Italic when slanted
    let mut flags = 32;
    if program.italic_angle != 0.0 {
        flags |= 64;
    }
    PdfDictionary::new()
        .with_type("FontDescriptor")
        .with("FontName", PdfObject::name(program.base_font()))
        .with("Flags", flags)
        .with(
            "FontBBox",
            PdfObject::Array(program.bbox.iter().map(|v| PdfObject::Integer(*v as i64)).collect()),
        )
        .with("ItalicAngle", program.italic_angle)
        .with("Ascent", program.ascent)
        .with("Descent", program.descent)
        .with("CapHeight", program.cap_height)
        .with("StemV", program.stem_v)
        .with("FontFile2", file)
}

/// Encode text as WinAnsi (Windows-1252). Unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x00..=0x7F | 0xA0..=0xFF => c as u8,
            _ => match c {
                '€' => 0x80,
                '‚' => 0x82,
                'ƒ' => 0x83,
                '„' => 0x84,
                '…' => 0x85,
                '†' => 0x86,
                '‡' => 0x87,
                'ˆ' => 0x88,
                '‰' => 0x89,
                'Š' => 0x8A,
                '‹' => 0x8B,
                'Œ' => 0x8C,
                'Ž' => 0x8E,
                '\u{2018}' => 0x91,
                '\u{2019}' => 0x92,
                '\u{201C}' => 0x93,
                '\u{201D}' => 0x94,
                '•' => 0x95,
                '–' => 0x96,
                '—' => 0x97,
                '˜' => 0x98,
                '™' => 0x99,
                'š' => 0x9A,
                '›' => 0x9B,
                'œ' => 0x9C,
                'ž' => 0x9E,
                'Ÿ' => 0x9F,
                _ => b'?',
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MediaBox;

    fn program(bytes: &[u8]) -> TrueTypeProgram {
        TrueTypeProgram {
            postscript_name: "Inter Regular".to_string(),
            bytes: bytes.to_vec(),
            ascent: 900,
            descent: -200,
            cap_height: 700,
            italic_angle: 0.0,
            bbox: [-100, -200, 1000, 900],
            stem_v: 80,
            first_char: 32,
            widths: vec![500; 224],
        }
    }

    #[test]
    fn test_standard_font_names() {
        assert_eq!(StandardFont::Helvetica.pdf_name(), "Helvetica");
        assert_eq!(StandardFont::TimesBold.pdf_name(), "Times-Bold");
        assert_eq!(StandardFont::CourierOblique.pdf_name(), "Courier-Oblique");
    }

    #[test]
    fn test_font_matching() {
        assert_eq!(
            StandardFont::from_name("Arial", false, false),
            Some(StandardFont::Helvetica)
        );
        assert_eq!(
            StandardFont::from_name("sans-serif", true, false),
            Some(StandardFont::HelveticaBold)
        );
        assert_eq!(
            StandardFont::from_name("Times New Roman", true, false),
            Some(StandardFont::TimesBold)
        );
        assert_eq!(
            StandardFont::from_name("Courier New", false, true),
            Some(StandardFont::CourierOblique)
        );
        assert_eq!(StandardFont::from_name("Unknown Font", false, false), None);
    }

    #[test]
    fn test_standard_fonts_share_encoding() {
        let mut doc = PdfDocument::default();
        doc.add_page(MediaBox::a4()).unwrap();
        let mut fonts = FontManager::new();

        let f1 = fonts.standard(&mut doc, StandardFont::Helvetica);
        let f2 = fonts.standard(&mut doc, StandardFont::TimesBold);
        let again = fonts.standard(&mut doc, StandardFont::Helvetica);
        assert_eq!(f1.name, "F1");
        assert_eq!(f2.name, "F2");
        assert_eq!(again, f1);

        let encoding = doc.encoding();
        for font in [f1, f2] {
            let dict = doc.registry().object(font.reference).unwrap().as_dictionary().unwrap();
            assert_eq!(dict.get_reference("Encoding"), Some(encoding));
        }
    }

    #[test]
    fn test_embedding_dedupes_by_content() {
        let mut doc = PdfDocument::default();
        let mut fonts = FontManager::new();

        let a = fonts.embed(&mut doc, &program(b"font-a")).unwrap();
        let b = fonts.embed(&mut doc, &program(b"font-a")).unwrap();
        let c = fonts.embed(&mut doc, &program(b"font-b")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.reference, c.reference);
        assert_eq!(fonts.embedded_count(), 2);

        let dict = doc.registry().object(a.reference).unwrap().as_dictionary().unwrap();
        assert_eq!(dict.get_name("BaseFont"), Some("InterRegular"));
        assert_eq!(dict.get("LastChar"), Some(&PdfObject::Integer(255)));
        let descriptor = dict.get_reference("FontDescriptor").unwrap();
        let descriptor = doc.registry().object(descriptor).unwrap().as_dictionary().unwrap();
        assert!(descriptor.get_reference("FontFile2").is_some());
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("A€é—"), vec![b'A', 0x80, 0xE9, 0x97]);
        assert_eq!(encode_win_ansi("漢"), vec![b'?']);
    }
}
