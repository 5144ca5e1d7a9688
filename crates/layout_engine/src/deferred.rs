//! Deferred work
//!
//! Some output depends on where a node lands that may appear later in
//! document order: page numbers of other elements and fragment link
//! destinations. Traversal only records them here; the queue is drained
//! once after the last page exists.

use crate::layout_tree::Frame;
use content_tree::{Color, ComputedStyle, Rect};
use serde::Serialize;
use std::collections::HashMap;

/// A placeholder to be replaced with the page number of `target`
#[derive(Debug, Clone)]
pub struct PendingPageNumber {
    /// Page index the placeholder was painted on
    pub page: usize,
    pub frame: Frame,
    pub bounds: Rect,
    pub style: ComputedStyle,
    pub target: String,
    /// Original text, kept when the target never appears
    pub fallback: String,
}

/// Where a link points
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum LinkTarget {
    /// Element id of a fragment link, percent-decoded
    Internal(String),
    External(String),
}

impl LinkTarget {
    /// Classify an `href`
    pub fn from_href(href: &str) -> Option<Self> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        match href.strip_prefix('#') {
            Some("") => None,
            Some(fragment) => {
                let id = urlencoding::decode(fragment)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| fragment.to_string());
                Some(LinkTarget::Internal(id))
            }
            None => Some(LinkTarget::External(href.to_string())),
        }
    }
}

/// Visible link border
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkBorder {
    pub color: Option<Color>,
    pub width: f32,
}

/// A link source collected during traversal
#[derive(Debug, Clone)]
pub struct PendingLink {
    pub page: usize,
    /// Source rectangle in PDF user space
    pub rect: [f64; 4],
    pub target: LinkTarget,
    pub border: LinkBorder,
}

/// A link once its destination is known
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLink {
    /// 1-based page holding the link source
    pub source_page: usize,
    pub rect: [f64; 4],
    pub target: LinkTarget,
    /// 1-based destination page for internal links
    pub destination_page: Option<usize>,
    /// Destination top in PDF user space for internal links
    pub destination_top: Option<f64>,
}

#[derive(Debug, Default)]
pub struct DeferredQueue {
    /// Element id -> canvas y of its top edge; first occurrence wins
    anchors: HashMap<String, f32>,
    page_numbers: Vec<PendingPageNumber>,
    links: Vec<PendingLink>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_anchor(&mut self, id: &str, y: f32) {
        self.anchors.entry(id.to_string()).or_insert(y);
    }

    pub fn anchor(&self, id: &str) -> Option<f32> {
        self.anchors.get(id).copied()
    }

    pub fn defer_page_number(&mut self, pending: PendingPageNumber) {
        self.page_numbers.push(pending);
    }

    pub fn defer_link(&mut self, link: PendingLink) {
        self.links.push(link);
    }

    pub fn len(&self) -> usize {
        self.page_numbers.len() + self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take everything queued, leaving the anchors in place
    pub fn drain(&mut self) -> (Vec<PendingPageNumber>, Vec<PendingLink>) {
        (
            std::mem::take(&mut self.page_numbers),
            std::mem::take(&mut self.links),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_href_classification() {
        assert_eq!(
            LinkTarget::from_href("#intro"),
            Some(LinkTarget::Internal("intro".to_string()))
        );
        assert_eq!(
            LinkTarget::from_href("#caf%C3%A9"),
            Some(LinkTarget::Internal("café".to_string()))
        );
        assert_eq!(
            LinkTarget::from_href("https://example.com/a"),
            Some(LinkTarget::External("https://example.com/a".to_string()))
        );
        assert_eq!(LinkTarget::from_href("#"), None);
        assert_eq!(LinkTarget::from_href("  "), None);
    }

    #[test]
    fn test_first_anchor_wins() {
        let mut queue = DeferredQueue::new();
        queue.record_anchor("a", 10.0);
        queue.record_anchor("a", 99.0);
        assert_eq!(queue.anchor("a"), Some(10.0));
        assert_eq!(queue.anchor("b"), None);
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = DeferredQueue::new();
        queue.defer_link(PendingLink {
            page: 0,
            rect: [0.0; 4],
            target: LinkTarget::Internal("x".to_string()),
            border: LinkBorder { color: None, width: 0.0 },
        });
        assert_eq!(queue.len(), 1);
        let (numbers, links) = queue.drain();
        assert!(numbers.is_empty());
        assert_eq!(links.len(), 1);
        assert!(queue.is_empty());
    }
}
