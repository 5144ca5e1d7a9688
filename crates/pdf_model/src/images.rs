//! PDF Image Handling
//!
//! Rasters arrive as 8-bit RGBA. PDF image XObjects here are plain
//! DeviceRGB: alpha is flattened onto a white background before embedding,
//! so translucent shadows and anti-aliased edges lighten towards white
//! instead of blending with whatever is painted underneath.

use crate::document::PdfDocument;
use crate::error::{PdfError, Result};
use crate::{ObjectRef, PdfDictionary, PdfObject, PdfStream};

/// RGB image data for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Packed RGB samples, rows top to bottom
    pub rgb: Vec<u8>,
}

impl ImageData {
    /// Create image data from raw RGB bytes
    pub fn from_raw_rgb(rgb: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        if rgb.len() != width as usize * height as usize * 3 {
            return Err(PdfError::InvalidDocument(format!(
                "RGB buffer of {} bytes does not match {}x{}",
                rgb.len(),
                width,
                height
            )));
        }
        Ok(Self { width, height, rgb })
    }

    /// Create image data from RGBA, flattening alpha onto white
    pub fn from_rgba_on_white(rgba: &[u8], width: u32, height: u32) -> Result<Self> {
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(PdfError::InvalidDocument(format!(
                "RGBA buffer of {} bytes does not match {}x{}",
                rgba.len(),
                width,
                height
            )));
        }
        let rgb = rgba
            .chunks_exact(4)
            .flat_map(|px| {
                let alpha = px[3] as u32;
                let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
                [blend(px[0]), blend(px[1]), blend(px[2])]
            })
            .collect();
        Ok(Self { width, height, rgb })
    }

    /// Image XObject stream; the serializer deflates it
    pub fn to_xobject(&self) -> PdfStream {
        PdfStream::new(self.rgb.clone()).with_dict(
            PdfDictionary::new()
                .with_type("XObject")
                .with("Subtype", PdfObject::name("Image"))
                .with("Width", self.width)
                .with("Height", self.height)
                .with("ColorSpace", PdfObject::name("DeviceRGB"))
                .with("BitsPerComponent", 8),
        )
    }
}

/// Image resource in a PDF document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResource {
    /// Resource name (e.g. "Im1")
    pub name: String,
    pub reference: ObjectRef,
}

/// Image manager for a document: names images `Im1`, `Im2`, ...
#[derive(Debug, Default)]
pub struct ImageManager {
    count: usize,
}

impl ImageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write an image XObject and name it
    pub fn add(&mut self, doc: &mut PdfDocument, image: &ImageData) -> ImageResource {
        self.count += 1;
        let reference = doc.registry_mut().promote(image.to_xobject());
        ImageResource {
            name: format!("Im{}", self.count),
            reference,
        }
    }

    pub fn image_count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_flattened_on_white() {
        let rgba = [
            0, 0, 0, 255, // opaque black
            0, 0, 0, 0, // transparent
            200, 0, 0, 128, // half red
        ];
        let image = ImageData::from_rgba_on_white(&rgba, 3, 1).unwrap();
        assert_eq!(&image.rgb[0..3], &[0, 0, 0]);
        assert_eq!(&image.rgb[3..6], &[255, 255, 255]);
        assert_eq!(&image.rgb[6..9], &[227, 127, 127]);
    }

    #[test]
    fn test_buffer_size_checked() {
        assert!(ImageData::from_rgba_on_white(&[0; 7], 1, 2).is_err());
        assert!(ImageData::from_raw_rgb(vec![0; 6], 1, 2).is_ok());
    }

    #[test]
    fn test_xobject_dictionary() {
        let image = ImageData::from_raw_rgb(vec![255; 12], 2, 2).unwrap();
        let stream = image.to_xobject();
        assert_eq!(stream.dict.get_name("Subtype"), Some("Image"));
        assert_eq!(stream.dict.get("Width"), Some(&PdfObject::Integer(2)));
        assert!(!stream.has_filter());
    }

    #[test]
    fn test_image_names() {
        let mut doc = PdfDocument::default();
        let mut images = ImageManager::new();
        let image = ImageData::from_raw_rgb(vec![0; 3], 1, 1).unwrap();
        assert_eq!(images.add(&mut doc, &image).name, "Im1");
        assert_eq!(images.add(&mut doc, &image).name, "Im2");
    }
}
