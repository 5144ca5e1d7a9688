//! PDF Content Stream Generation
//!
//! This module provides a builder for page content streams, which contain
//! the drawing operators that define the visual appearance of a page.
//!
//! # Operators
//!
//! ## Text Operators
//! - BT/ET: Begin/End text object
//! - Tf: Set font and size
//! - Td: Move text position
//! - Tj: Show text string
//!
//! ## Graphics Operators
//! - re: Rectangle
//! - S: Stroke path
//! - f: Fill path
//! - W n: Clip to path
//!
//! ## Color Operators
//! - rg/RG: Set RGB color (fill/stroke)
//!
//! ## Transform Operators
//! - cm: Concatenate transformation matrix
//! - q: Save graphics state
//! - Q: Restore graphics state
//!
//! ## XObject Operators
//! - Do: Paint an image

use crate::fonts::encode_win_ansi;
use crate::objects::format_real;
use std::io::Write;

/// Content stream builder
#[derive(Debug, Default, Clone)]
pub struct ContentStream {
    /// The content data
    data: Vec<u8>,
}

impl ContentStream {
    /// Create a new empty content stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the content stream data
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Get a reference to the content stream data
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the length of the content stream
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the content stream is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // =========================================================================
    // Graphics State Operators
    // =========================================================================

    /// Save graphics state (q)
    pub fn save_state(&mut self) -> &mut Self {
        self.write_line("q");
        self
    }

    /// Restore graphics state (Q)
    pub fn restore_state(&mut self) -> &mut Self {
        self.write_line("Q");
        self
    }

    /// Concatenate transformation matrix (cm)
    pub fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> &mut Self {
        self.write_fmt(format_args!(
            "{} {} {} {} {} {} cm\n",
            format_real(a),
            format_real(b),
            format_real(c),
            format_real(d),
            format_real(e),
            format_real(f)
        ));
        self
    }

    /// Set line width (w)
    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        self.write_fmt(format_args!("{} w\n", format_real(width)));
        self
    }

    // =========================================================================
    // Color Operators
    // =========================================================================

    /// Set fill color in RGB, components in 0..=1 (rg)
    pub fn set_fill_rgb(&mut self, r: f64, g: f64, b: f64) -> &mut Self {
        self.write_fmt(format_args!(
            "{} {} {} rg\n",
            format_real(r),
            format_real(g),
            format_real(b)
        ));
        self
    }

    /// Set stroke color in RGB, components in 0..=1 (RG)
    pub fn set_stroke_rgb(&mut self, r: f64, g: f64, b: f64) -> &mut Self {
        self.write_fmt(format_args!(
            "{} {} {} RG\n",
            format_real(r),
            format_real(g),
            format_real(b)
        ));
        self
    }

    // =========================================================================
    // Path Operators
    // =========================================================================

    /// Append a rectangle to the path (re)
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.write_fmt(format_args!(
            "{} {} {} {} re\n",
            format_real(x),
            format_real(y),
            format_real(width),
            format_real(height)
        ));
        self
    }

    /// Stroke the path (S)
    pub fn stroke(&mut self) -> &mut Self {
        self.write_line("S");
        self
    }

    /// Fill the path (f)
    pub fn fill(&mut self) -> &mut Self {
        self.write_line("f");
        self
    }

    /// Intersect the clipping path with the current path and discard it (W n)
    pub fn clip(&mut self) -> &mut Self {
        self.write_line("W n");
        self
    }

    // =========================================================================
    // Text Operators
    // =========================================================================

    /// Begin text object (BT)
    pub fn begin_text(&mut self) -> &mut Self {
        self.write_line("BT");
        self
    }

    /// End text object (ET)
    pub fn end_text(&mut self) -> &mut Self {
        self.write_line("ET");
        self
    }

    /// Set font and size (Tf)
    pub fn set_font(&mut self, font_name: &str, size: f64) -> &mut Self {
        self.write_fmt(format_args!("/{} {} Tf\n", font_name, format_real(size)));
        self
    }

    /// Move text position (Td)
    pub fn move_text(&mut self, tx: f64, ty: f64) -> &mut Self {
        self.write_fmt(format_args!("{} {} Td\n", format_real(tx), format_real(ty)));
        self
    }

    /// Show a text string (Tj), WinAnsi encoded
    pub fn show_text(&mut self, text: &str) -> &mut Self {
        self.write_pdf_string(&encode_win_ansi(text));
        self.write_line(" Tj");
        self
    }

    // =========================================================================
    // XObject Operators
    // =========================================================================

    /// Paint an XObject (Do)
    pub fn draw_xobject(&mut self, name: &str) -> &mut Self {
        self.write_fmt(format_args!("/{} Do\n", name));
        self
    }

    /// Paint an image XObject scaled into the given rectangle
    pub fn draw_image(&mut self, name: &str, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.save_state()
            .transform(width, 0.0, 0.0, height, x, y)
            .draw_xobject(name)
            .restore_state()
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    /// Write a line to the content stream
    fn write_line(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(b'\n');
    }

    /// Write formatted data
    fn write_fmt(&mut self, args: std::fmt::Arguments<'_>) {
        // Writing into a Vec cannot fail
        let _ = self.data.write_fmt(args);
    }

    /// Write a PDF string (escaped)
    fn write_pdf_string(&mut self, bytes: &[u8]) {
        self.data.push(b'(');
        for &byte in bytes {
            match byte {
                b'(' | b')' | b'\\' => {
                    self.data.push(b'\\');
                    self.data.push(byte);
                }
                0x0A => {
                    self.data.extend_from_slice(b"\\n");
                }
                0x0D => {
                    self.data.extend_from_slice(b"\\r");
                }
                0x09 => {
                    self.data.extend_from_slice(b"\\t");
                }
                _ => {
                    self.data.push(byte);
                }
            }
        }
        self.data.push(b')');
    }
}
