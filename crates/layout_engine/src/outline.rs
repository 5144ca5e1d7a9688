//! Outline construction from headings
//!
//! Headings nest under the most recent heading of a shallower level. A
//! heading may open at most one level below the deepest open heading;
//! skipping a level aborts generation rather than guessing a parent.

use crate::{LayoutError, Result};
use serde::Serialize;

/// One bookmark of the generated outline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub title: String,
    pub level: u8,
    /// Heading top in canvas pixels
    #[serde(skip)]
    pub y: f32,
    /// 1-based page, filled in once pagination is complete
    pub page_number: usize,
    /// Destination top in PDF user space
    pub top: f64,
    pub children: Vec<Bookmark>,
}

impl Bookmark {
    fn new(title: String, level: u8, y: f32) -> Self {
        Self {
            title,
            level,
            y,
            page_number: 0,
            top: 0.0,
            children: Vec::new(),
        }
    }

    /// Visit this bookmark and its descendants in document order
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Bookmark)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }
}

/// Builds the bookmark forest as headings are met in document order
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    roots: Vec<Bookmark>,
    /// (level, child index) path from a root to the deepest open heading
    open: Vec<(u8, usize)>,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Add a heading of `level` (1 = h1)
    pub fn push(&mut self, level: u8, title: impl Into<String>, y: f32) -> Result<()> {
        let title = title.into();
        while self.open.last().is_some_and(|(open_level, _)| *open_level >= level) {
            self.open.pop();
        }
        if let Some((deepest, _)) = self.open.last() {
            if level > deepest + 1 {
                return Err(LayoutError::OutlineHierarchy {
                    title,
                    level,
                    deepest: *deepest,
                });
            }
        }

        let mut siblings = &mut self.roots;
        for (_, index) in &self.open {
            siblings = &mut siblings[*index].children;
        }
        siblings.push(Bookmark::new(title, level, y));
        let index = siblings.len() - 1;
        self.open.push((level, index));
        Ok(())
    }

    pub fn finish(self) -> Vec<Bookmark> {
        self.roots
    }
}
