//! Generation options
//!
//! Everything is optional. Hosts usually hand the options over as JSON next
//! to the content tree, so the wire names are camelCase.

use crate::{LayoutError, Result};
use content_tree::{BreakRule, Color, ContentNode};
use pdf_model::{MediaBox, PageLayout, PageMode, PdfVersion, ViewerPreferences};
use serde::{Deserialize, Serialize};

/// Page margin in points: `m`, `[vertical, horizontal]` or `[top, right, bottom, left]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Margin {
    Uniform(f64),
    Symmetric([f64; 2]),
    Edges([f64; 4]),
}

impl Default for Margin {
    fn default() -> Self {
        Margin::Uniform(36.0)
    }
}

/// Resolved margin edges in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub fn edges(&self) -> Margins {
        match *self {
            Margin::Uniform(m) => Margins {
                top: m,
                right: m,
                bottom: m,
                left: m,
            },
            Margin::Symmetric([v, h]) => Margins {
                top: v,
                right: h,
                bottom: v,
                left: h,
            },
            Margin::Edges([top, right, bottom, left]) => Margins {
                top,
                right,
                bottom,
                left,
            },
        }
    }
}

/// Standard page sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// US Letter (8.5" x 11")
    Letter,
    /// A4 (210mm x 297mm)
    #[default]
    A4,
    /// Legal (8.5" x 14")
    Legal,
    /// Custom size in points
    #[serde(untagged)]
    Custom { width: f64, height: f64 },
}

impl PageSize {
    pub fn media_box(&self) -> MediaBox {
        match self {
            PageSize::Letter => MediaBox::letter(),
            PageSize::A4 => MediaBox::a4(),
            PageSize::Legal => MediaBox::legal(),
            PageSize::Custom { width, height } => MediaBox::from_dimensions(*width, *height),
        }
    }
}

fn default_filename() -> String {
    "document.pdf".to_string()
}

fn default_true() -> bool {
    true
}

/// Options for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfOptions {
    #[serde(default)]
    pub margin: Margin,
    #[serde(default = "default_filename")]
    pub filename: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub pdf_version: PdfVersion,
    #[serde(default)]
    pub page_size: PageSize,
    /// Elements carrying any of these classes are skipped with their subtree
    #[serde(default)]
    pub ignore_classes: Vec<String>,
    /// Elements with any of these tags are skipped with their subtree
    #[serde(default)]
    pub ignore_tags: Vec<String>,
    #[serde(default = "default_true")]
    pub header: bool,
    #[serde(default = "default_true")]
    pub footer: bool,
    /// Whether headers and footers also appear on page 1
    #[serde(default = "default_true")]
    pub header_footer_on_first_page: bool,
    #[serde(default)]
    pub break_before: Vec<String>,
    #[serde(default)]
    pub break_after: Vec<String>,
    #[serde(default)]
    pub avoid_break: Vec<String>,
    /// Build the outline from `h1`..`h6`
    #[serde(default = "default_true")]
    pub outline: bool,
    #[serde(default)]
    pub link_border_color: Option<Color>,
    #[serde(default)]
    pub link_border_width: f32,
    /// Layout viewport width in device pixels; defaults to the root width
    #[serde(default)]
    pub viewport_width: Option<f32>,
    #[serde(default)]
    pub viewer_preferences: ViewerPreferences,
    #[serde(default)]
    pub page_mode: Option<PageMode>,
    #[serde(default)]
    pub page_layout: Option<PageLayout>,
    #[serde(default = "default_true")]
    pub compress: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            margin: Margin::default(),
            filename: default_filename(),
            title: None,
            author: None,
            subject: None,
            keywords: Vec::new(),
            pdf_version: PdfVersion::default(),
            page_size: PageSize::default(),
            ignore_classes: Vec::new(),
            ignore_tags: Vec::new(),
            header: true,
            footer: true,
            header_footer_on_first_page: true,
            break_before: Vec::new(),
            break_after: Vec::new(),
            avoid_break: Vec::new(),
            outline: true,
            link_border_color: None,
            link_border_width: 0.0,
            viewport_width: None,
            viewer_preferences: ViewerPreferences::default(),
            page_mode: None,
            page_layout: None,
            compress: true,
        }
    }
}

fn has_tag(list: &[String], tag: &str) -> bool {
    list.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

impl PdfOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options handed over by the host as JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LayoutError::InvalidConfig(e.to_string()))
    }

    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_version(mut self, version: PdfVersion) -> Self {
        self.pdf_version = version;
        self
    }

    pub fn with_ignore_class(mut self, class: impl Into<String>) -> Self {
        self.ignore_classes.push(class.into());
        self
    }

    pub fn with_ignore_tag(mut self, tag: impl Into<String>) -> Self {
        self.ignore_tags.push(tag.into());
        self
    }

    pub fn with_break_before(mut self, tag: impl Into<String>) -> Self {
        self.break_before.push(tag.into());
        self
    }

    pub fn with_break_after(mut self, tag: impl Into<String>) -> Self {
        self.break_after.push(tag.into());
        self
    }

    pub fn with_avoid_break(mut self, tag: impl Into<String>) -> Self {
        self.avoid_break.push(tag.into());
        self
    }

    pub fn with_header_footer_on_first_page(mut self, enabled: bool) -> Self {
        self.header_footer_on_first_page = enabled;
        self
    }

    pub fn with_outline(mut self, enabled: bool) -> Self {
        self.outline = enabled;
        self
    }

    pub fn with_link_border(mut self, color: Color, width: f32) -> Self {
        self.link_border_color = Some(color);
        self.link_border_width = width;
        self
    }

    pub fn with_viewport_width(mut self, width: f32) -> Self {
        self.viewport_width = Some(width);
        self
    }

    pub fn with_viewer_preferences(mut self, prefs: ViewerPreferences) -> Self {
        self.viewer_preferences = prefs;
        self
    }

    pub fn with_page_mode(mut self, mode: PageMode) -> Self {
        self.page_mode = Some(mode);
        self
    }

    pub fn with_page_layout(mut self, layout: PageLayout) -> Self {
        self.page_layout = Some(layout);
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Reject options that cannot produce a page
    pub fn validate(&self) -> Result<()> {
        let margins = self.margin.edges();
        if [margins.top, margins.right, margins.bottom, margins.left]
            .iter()
            .any(|m| *m < 0.0 || !m.is_finite())
        {
            return Err(LayoutError::InvalidConfig(format!(
                "margins must be non-negative, got {:?}",
                self.margin
            )));
        }
        let media_box = self.page_size.media_box();
        if media_box.width() <= 0.0 || media_box.height() <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "page size must be positive, got {}x{}",
                media_box.width(),
                media_box.height()
            )));
        }
        if margins.left + margins.right >= media_box.width()
            || margins.top + margins.bottom >= media_box.height()
        {
            return Err(LayoutError::InvalidConfig(
                "margins leave no content area".to_string(),
            ));
        }
        if let Some(width) = self.viewport_width {
            if width <= 0.0 || !width.is_finite() {
                return Err(LayoutError::InvalidConfig(format!(
                    "viewport width must be positive, got {}",
                    width
                )));
            }
        }
        if self.link_border_width < 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "link border width must be non-negative, got {}",
                self.link_border_width
            )));
        }
        Ok(())
    }

    /// Whether the node and its subtree are filtered out
    pub fn is_ignored(&self, node: &ContentNode) -> bool {
        has_tag(&self.ignore_tags, &node.tag)
            || node.classes.iter().any(|c| self.ignore_classes.contains(c))
    }

    pub fn breaks_before(&self, node: &ContentNode) -> bool {
        has_tag(&self.break_before, &node.tag) || node.style.page_break_before == BreakRule::Always
    }

    pub fn breaks_after(&self, node: &ContentNode) -> bool {
        has_tag(&self.break_after, &node.tag) || node.style.page_break_after == BreakRule::Always
    }

    pub fn avoids_break(&self, node: &ContentNode) -> bool {
        has_tag(&self.avoid_break, &node.tag) || node.style.page_break_inside == BreakRule::Avoid
    }
}
