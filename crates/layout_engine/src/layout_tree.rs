//! Page geometry and page records
//!
//! Content is laid out by the host in one tall device-pixel canvas. Each
//! page shows a horizontal band of it (`y_start..y_end`), scaled so that the
//! viewport width fills the page's content width.

use crate::config::Margins;
use content_tree::Rect;
use pdf_model::{ContentStream, MediaBox, ObjectRef, StructureDictionary};
use serde::Serialize;
use std::collections::BTreeMap;

/// Mapping from device pixels to PDF user space for one drawing area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Device-pixel x mapped to `left`
    pub origin_x: f32,
    /// Device-pixel y mapped to `top`
    pub origin_y: f32,
    /// PDF x of the area's left edge
    pub left: f64,
    /// PDF y of the area's top edge
    pub top: f64,
    /// Points per device pixel
    pub scale: f64,
}

impl Frame {
    pub fn x(&self, x: f32) -> f64 {
        self.left + (x - self.origin_x) as f64 * self.scale
    }

    pub fn y(&self, y: f32) -> f64 {
        self.top - (y - self.origin_y) as f64 * self.scale
    }

    pub fn length(&self, len: f32) -> f64 {
        len as f64 * self.scale
    }

    /// `[x0, y0, x1, y1]` in PDF user space, y0 the bottom edge
    pub fn rect(&self, rect: &Rect) -> [f64; 4] {
        [
            self.x(rect.x),
            self.y(rect.bottom()),
            self.x(rect.right()),
            self.y(rect.y),
        ]
    }
}

/// Fixed page geometry shared by every page of a document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub media_box: MediaBox,
    pub margins: Margins,
    /// Device-pixel x of the layout viewport's left edge
    pub origin_x: f32,
    /// Points per device pixel
    pub scale: f64,
}

impl PageGeometry {
    pub fn new(media_box: MediaBox, margins: Margins, origin_x: f32, viewport_width: f32) -> Self {
        let content_width = media_box.width() - margins.left - margins.right;
        Self {
            media_box,
            margins,
            origin_x,
            scale: content_width / viewport_width as f64,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.media_box.width() - self.margins.left - self.margins.right
    }

    pub fn content_height(&self) -> f64 {
        self.media_box.height() - self.margins.top - self.margins.bottom
    }

    /// Device pixels of main content per page once header and footer
    /// heights (in device pixels) are reserved
    pub fn capacity(&self, header: f32, footer: f32) -> f32 {
        (self.content_height() / self.scale) as f32 - header - footer
    }

    /// Frame for main content starting at `y_start`
    pub fn content_frame(&self, y_start: f32, header: f32) -> Frame {
        Frame {
            origin_x: self.origin_x,
            origin_y: y_start,
            left: self.margins.left,
            top: self.media_box.height() - self.margins.top - header as f64 * self.scale,
            scale: self.scale,
        }
    }

    /// Frame for a header template whose top edge is at `template_top`
    pub fn header_frame(&self, template_top: f32) -> Frame {
        Frame {
            origin_x: self.origin_x,
            origin_y: template_top,
            left: self.margins.left,
            top: self.media_box.height() - self.margins.top,
            scale: self.scale,
        }
    }

    /// Frame for a footer template of the given height
    pub fn footer_frame(&self, template_top: f32, height: f32) -> Frame {
        Frame {
            origin_x: self.origin_x,
            origin_y: template_top,
            left: self.margins.left,
            top: self.margins.bottom + height as f64 * self.scale,
            scale: self.scale,
        }
    }
}

/// One output page while the document is being laid out
#[derive(Debug)]
pub struct PageRecord {
    pub page_ref: ObjectRef,
    /// 1-based
    pub page_number: usize,
    /// Band of the canvas shown on this page
    pub y_start: f32,
    pub y_end: f32,
    /// Reserved header and footer heights in device pixels
    pub header_height: f32,
    pub footer_height: f32,
    pub frame: Frame,
    /// Main content, clipped to the content area
    pub content: ContentStream,
    /// Header, footer and deferred drawing, not clipped
    pub overlay: ContentStream,
    /// (category, name) -> resource
    pub resources: BTreeMap<(String, String), ObjectRef>,
    pub annotations: Vec<StructureDictionary>,
    /// Whether any main content has been painted
    pub has_content: bool,
}

impl PageRecord {
    pub fn contains(&self, y: f32) -> bool {
        y >= self.y_start && y < self.y_end
    }

    pub fn add_resource(&mut self, category: &str, name: &str, reference: ObjectRef) {
        self.resources
            .insert((category.to_string(), name.to_string()), reference);
    }

    pub fn summary(&self) -> PageSummary {
        PageSummary {
            page_number: self.page_number,
            y_start: self.y_start,
            y_end: self.y_end,
            header_height: self.header_height,
            footer_height: self.footer_height,
        }
    }
}

/// What a caller gets to see of each page after generation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub page_number: usize,
    pub y_start: f32,
    pub y_end: f32,
    pub header_height: f32,
    pub footer_height: f32,
}
