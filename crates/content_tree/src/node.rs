//! Content tree nodes

use crate::{Color, ComputedStyle, FontStyle, NodeId, Rect, Result};
use serde::{Deserialize, Serialize};

/// Tag used for text nodes
pub const TEXT_TAG: &str = "#text";

/// A single pre-measured word of a text node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    /// Advance width in device pixels, measured by the host
    pub width: f32,
}

impl Word {
    pub fn new(text: impl Into<String>, width: f32) -> Self {
        Self {
            text: text.into(),
            width,
        }
    }
}

/// Text payload of a text node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default)]
    pub words: Vec<Word>,
    /// Width of one inter-word space in the node's font
    #[serde(default)]
    pub space_width: f32,
}

impl TextContent {
    pub fn new(words: Vec<Word>, space_width: f32) -> Self {
        Self { words, space_width }
    }

    /// Words joined by single spaces
    pub fn plain_text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The fixed vocabulary of `data-*` flags the engine understands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFlags {
    /// Replace the text with the number of the page the node lands on
    #[serde(default)]
    pub page_number: bool,
    /// Replace the text with the page number of the element with this id
    #[serde(default)]
    pub page_number_for: Option<String>,
    /// Exclude this heading from the outline
    #[serde(default)]
    pub no_outline: bool,
    #[serde(default)]
    pub header_template: bool,
    #[serde(default)]
    pub footer_template: bool,
    #[serde(default)]
    pub link_border_color: Option<Color>,
    #[serde(default)]
    pub link_border_width: Option<f32>,
}

/// A node of the rendered content tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    #[serde(default)]
    pub id: NodeId,
    /// Lower-case tag name, or `#text`
    pub tag: String,
    /// The element's `id` attribute, target of fragment links
    #[serde(default)]
    pub element_id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub flags: DataFlags,
    #[serde(default)]
    pub style: ComputedStyle,
    /// Border box in device pixels, document coordinates
    #[serde(default)]
    pub bounds: Rect,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub text: Option<TextContent>,
    #[serde(default)]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    /// Create an element node
    pub fn element(tag: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id: NodeId::new(),
            tag: tag.into().to_ascii_lowercase(),
            element_id: None,
            classes: Vec::new(),
            flags: DataFlags::default(),
            style: ComputedStyle::default(),
            bounds,
            href: None,
            text: None,
            children: Vec::new(),
        }
    }

    /// Create a text node
    pub fn text(content: TextContent, bounds: Rect, style: ComputedStyle) -> Self {
        Self {
            id: NodeId::new(),
            tag: TEXT_TAG.to_string(),
            element_id: None,
            classes: Vec::new(),
            flags: DataFlags::default(),
            style,
            bounds,
            href: None,
            text: Some(content),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: ContentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ContentNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_element_id(mut self, id: impl Into<String>) -> Self {
        self.element_id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_style(mut self, style: ComputedStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_flags(mut self, flags: DataFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Heading level for `h1`..`h6`
    pub fn heading_level(&self) -> Option<u8> {
        match self.tag.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text(&self, parts: &mut Vec<String>) {
        if let Some(text) = &self.text {
            let plain = text.plain_text();
            if !plain.is_empty() {
                parts.push(plain);
            }
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }

    /// First descendant text node in document order (including self)
    pub fn first_text_node(&self) -> Option<&ContentNode> {
        if self.is_text() {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.first_text_node())
    }

    /// Pre-order iterator over this node and its descendants
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order depth-first iterator, document order preserved
pub struct Descendants<'a> {
    stack: Vec<&'a ContentNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a ContentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// An `@font-face` declaration discovered in the host stylesheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFace {
    pub family: String,
    #[serde(default = "default_face_weight")]
    pub weight: u16,
    #[serde(default)]
    pub style: FontStyle,
    /// Resolved font file URL, handed back to the host on load
    pub source: String,
}

fn default_face_weight() -> u16 {
    400
}

impl FontFace {
    pub fn new(family: impl Into<String>, weight: u16, style: FontStyle, source: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            weight,
            style,
            source: source.into(),
        }
    }
}

/// A whole rendered document: tree plus stylesheet font faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub root: ContentNode,
    #[serde(default)]
    pub font_faces: Vec<FontFace>,
}

impl ContentDocument {
    pub fn new(root: ContentNode) -> Self {
        Self {
            root,
            font_faces: Vec::new(),
        }
    }

    pub fn with_font_faces(mut self, faces: Vec<FontFace>) -> Self {
        self.font_faces = faces;
        self
    }

    /// Parse a document handed over by the host as JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
