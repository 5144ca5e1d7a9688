//! Document outline (bookmarks)
//!
//! Outline items form a doubly linked list per level. Every item links to its
//! parent, its siblings and its first and last children, and carries an
//! explicit `/XYZ` destination.

use crate::document::PdfDocument;
use crate::error::Result;
use crate::structure::StructureDictionary;
use crate::{ObjectRef, PdfObject};

/// One bookmark and its children
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub title: String,
    pub page: ObjectRef,
    /// Destination top in PDF user space
    pub top: f64,
    pub children: Vec<OutlineEntry>,
}

impl OutlineEntry {
    pub fn new(title: impl Into<String>, page: ObjectRef, top: f64) -> Self {
        Self {
            title: title.into(),
            page,
            top,
            children: Vec::new(),
        }
    }

    /// Number of descendants
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}

/// `[page /XYZ left top zoom]` destination keeping the current zoom
pub fn xyz_destination(page: ObjectRef, left: Option<f64>, top: f64) -> PdfObject {
    PdfObject::Array(vec![
        PdfObject::Reference(page),
        PdfObject::name("XYZ"),
        left.map_or(PdfObject::Null, PdfObject::Real),
        PdfObject::Real(top),
        PdfObject::Null,
    ])
}

/// (first, last, open descendant count) of one written level
type Level = (ObjectRef, ObjectRef, usize);

fn write_level(
    doc: &mut PdfDocument,
    parent: ObjectRef,
    entries: &[OutlineEntry],
) -> Result<Option<Level>> {
    if entries.is_empty() {
        return Ok(None);
    }
    let version = doc.version();
    let refs: Vec<ObjectRef> = entries.iter().map(|_| doc.registry_mut().reserve()).collect();

    let mut count = 0;
    for (i, entry) in entries.iter().enumerate() {
        let reference = refs[i];
        let mut item = StructureDictionary::outline_item(&entry.title, parent)
            .with("Dest", xyz_destination(entry.page, None, entry.top), version);
        if i > 0 {
            item.set("Prev", refs[i - 1], version);
        }
        if let Some(next) = refs.get(i + 1) {
            item.set("Next", *next, version);
        }
        if let Some((first, last, descendants)) = write_level(doc, reference, &entry.children)? {
            item.set("First", first, version);
            item.set("Last", last, version);
            item.set("Count", descendants, version);
            count += descendants;
        }
        doc.registry_mut().define_structure(reference, item)?;
        count += 1;
    }

    Ok(Some((refs[0], refs[refs.len() - 1], count)))
}

impl PdfDocument {
    /// Write the outline tree and hook it into the catalog.
    ///
    /// Returns the Outlines root, or None when there are no entries.
    pub fn set_outline(&mut self, entries: &[OutlineEntry]) -> Result<Option<ObjectRef>> {
        if entries.is_empty() {
            return Ok(None);
        }
        let root = self.registry_mut().reserve();
        let mut outlines = StructureDictionary::outlines();
        if let Some((first, last, count)) = write_level(self, root, entries)? {
            let version = self.version();
            outlines.set("First", first, version);
            outlines.set("Last", last, version);
            outlines.set("Count", count, version);
        }
        self.registry_mut().define_structure(root, outlines)?;
        self.set_catalog_entry("Outlines", root)?;
        tracing::debug!(outlines = %root, items = entries.len(), "outline written");
        Ok(Some(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MediaBox;

    fn dict(doc: &PdfDocument, r: ObjectRef) -> &crate::PdfDictionary {
        doc.registry().object(r).unwrap().as_dictionary().unwrap()
    }

    #[test]
    fn test_outline_links() {
        let mut doc = PdfDocument::default();
        let page = doc.add_page(MediaBox::a4()).unwrap();

        let mut first = OutlineEntry::new("Intro", page, 800.0);
        first.children.push(OutlineEntry::new("Scope", page, 700.0));
        let second = OutlineEntry::new("Usage", page, 500.0);
        assert_eq!(first.descendant_count(), 1);

        let root = doc.set_outline(&[first, second]).unwrap().unwrap();
        let outlines = dict(&doc, root);
        assert_eq!(outlines.get("Count"), Some(&PdfObject::Integer(3)));

        let intro = outlines.get_reference("First").unwrap();
        let usage = outlines.get_reference("Last").unwrap();
        assert_eq!(dict(&doc, intro).get_reference("Next"), Some(usage));
        assert_eq!(dict(&doc, usage).get_reference("Prev"), Some(intro));
        assert_eq!(dict(&doc, intro).get("Count"), Some(&PdfObject::Integer(1)));

        let scope = dict(&doc, intro).get_reference("First").unwrap();
        assert_eq!(dict(&doc, scope).get_reference("Parent"), Some(intro));

        let catalog = dict(&doc, doc.catalog().unwrap());
        assert_eq!(catalog.get_reference("Outlines"), Some(root));

        // The whole graph passes validation
        doc.validate().unwrap();
    }

    #[test]
    fn test_empty_outline_writes_nothing() {
        let mut doc = PdfDocument::default();
        doc.add_page(MediaBox::a4()).unwrap();
        let before = doc.registry().len();
        assert_eq!(doc.set_outline(&[]).unwrap(), None);
        assert_eq!(doc.registry().len(), before);
    }

    #[test]
    fn test_xyz_destination() {
        let dest = xyz_destination(ObjectRef::new(3, 0), Some(36.0), 700.0);
        assert_eq!(
            String::from_utf8(dest.to_bytes().unwrap()).unwrap(),
            "[3 0 R /XYZ 36.0 700.0 null]"
        );
    }
}
