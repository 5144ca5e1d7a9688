//! PDF Document Assembler
//!
//! [`PdfDocument`] owns the object graph of one document: version, document
//! information, catalog, page tree and every indirect object. The catalog and
//! the page tree root are created with the first page.
//!
//! Writing is append-only: objects are emitted in ascending id order, each
//! offset is recorded as the object is laid out, and the cross-reference
//! table is built from those offsets. Every structure dictionary is checked
//! before the first byte leaves the assembler.

use crate::error::{PdfError, Result};
use crate::registry::ObjectRegistry;
use crate::structure::{required_values_set, set_checked, DictionaryKind, PdfVersion, StructureDictionary};
use crate::{ObjectRef, PdfDictionary, PdfObject, PdfSerializer, PdfStream};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// PDF document information
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Document keywords
    pub keywords: Vec<String>,
    /// Creator application
    pub creator: Option<String>,
    /// PDF producer
    pub producer: Option<String>,
    /// Creation date (PDF date string format)
    pub creation_date: Option<String>,
}

impl DocumentInfo {
    /// Document info stamped with the current time
    pub fn new() -> Self {
        Self {
            creator: Some("paged-pdf layout engine".to_string()),
            producer: Some(format!("pdf_model {}", env!("CARGO_PKG_VERSION"))),
            creation_date: Some(pdf_date(chrono::Utc::now())),
            ..Default::default()
        }
    }

    /// Convert to an Info structure dictionary
    pub fn to_structure(&self) -> StructureDictionary {
        let mut info = StructureDictionary::info();
        let dict = info.dict_mut();

        if let Some(ref title) = self.title {
            dict.insert("Title", PdfObject::text(title));
        }
        if let Some(ref author) = self.author {
            dict.insert("Author", PdfObject::text(author));
        }
        if let Some(ref subject) = self.subject {
            dict.insert("Subject", PdfObject::text(subject));
        }
        if !self.keywords.is_empty() {
            dict.insert("Keywords", PdfObject::text(&self.keywords.join(", ")));
        }
        if let Some(ref creator) = self.creator {
            dict.insert("Creator", PdfObject::text(creator));
        }
        if let Some(ref producer) = self.producer {
            dict.insert("Producer", PdfObject::text(producer));
        }
        if let Some(ref date) = self.creation_date {
            dict.insert("CreationDate", PdfObject::string(date.as_str()));
        }

        info
    }
}

/// Format a timestamp as a PDF date string
pub fn pdf_date(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("D:%Y%m%d%H%M%S+00'00'").to_string()
}

/// Page media box (page dimensions in points)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    /// Lower-left x coordinate
    pub llx: f64,
    /// Lower-left y coordinate
    pub lly: f64,
    /// Upper-right x coordinate
    pub urx: f64,
    /// Upper-right y coordinate
    pub ury: f64,
}

impl MediaBox {
    /// Create a media box from dimensions (origin at lower-left)
    pub fn from_dimensions(width: f64, height: f64) -> Self {
        Self {
            llx: 0.0,
            lly: 0.0,
            urx: width,
            ury: height,
        }
    }

    /// US Letter size (8.5 x 11 inches)
    pub fn letter() -> Self {
        Self::from_dimensions(612.0, 792.0)
    }

    /// US Legal size (8.5 x 14 inches)
    pub fn legal() -> Self {
        Self::from_dimensions(612.0, 1008.0)
    }

    /// A4 size (210 x 297 mm)
    pub fn a4() -> Self {
        Self::from_dimensions(595.28, 841.89)
    }

    /// Convert to PDF array
    pub fn to_array(&self) -> PdfObject {
        PdfObject::reals(&[self.llx, self.lly, self.urx, self.ury])
    }

    /// Get page width
    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    /// Get page height
    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }
}

impl Default for MediaBox {
    fn default() -> Self {
        Self::a4()
    }
}

/// How the viewer opens the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageMode {
    UseNone,
    UseOutlines,
    UseThumbs,
    FullScreen,
}

impl PageMode {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            PageMode::UseNone => "UseNone",
            PageMode::UseOutlines => "UseOutlines",
            PageMode::UseThumbs => "UseThumbs",
            PageMode::FullScreen => "FullScreen",
        }
    }
}

/// Page arrangement in the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageLayout {
    SinglePage,
    OneColumn,
    TwoColumnLeft,
    TwoColumnRight,
}

impl PageLayout {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            PageLayout::SinglePage => "SinglePage",
            PageLayout::OneColumn => "OneColumn",
            PageLayout::TwoColumnLeft => "TwoColumnLeft",
            PageLayout::TwoColumnRight => "TwoColumnRight",
        }
    }
}

/// Viewer preference flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerPreferences {
    pub hide_toolbar: bool,
    pub hide_menubar: bool,
    #[serde(rename = "hideWindowUI")]
    pub hide_window_ui: bool,
    pub display_doc_title: bool,
}

impl ViewerPreferences {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The object graph of one PDF document
#[derive(Debug)]
pub struct PdfDocument {
    version: PdfVersion,
    info: DocumentInfo,
    registry: ObjectRegistry,
    catalog: Option<ObjectRef>,
    page_tree: Option<ObjectRef>,
    info_ref: Option<ObjectRef>,
    encoding: Option<ObjectRef>,
    pages: Vec<ObjectRef>,
    compress: bool,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new(PdfVersion::default())
    }
}

impl PdfDocument {
    pub fn new(version: PdfVersion) -> Self {
        Self {
            version,
            info: DocumentInfo::new(),
            registry: ObjectRegistry::new(),
            catalog: None,
            page_tree: None,
            info_ref: None,
            encoding: None,
            pages: Vec::new(),
            compress: true,
        }
    }

    pub fn version(&self) -> PdfVersion {
        self.version
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut DocumentInfo {
        &mut self.info
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.registry
    }

    /// Set whether streams without a Filter get deflated
    pub fn set_compression(&mut self, compress: bool) {
        self.compress = compress;
    }

    pub fn catalog(&self) -> Option<ObjectRef> {
        self.catalog
    }

    pub fn page_tree(&self) -> Option<ObjectRef> {
        self.page_tree
    }

    pub fn pages(&self) -> &[ObjectRef] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Catalog and page tree root, created on first use
    fn ensure_structure(&mut self) -> Result<(ObjectRef, ObjectRef)> {
        if let (Some(catalog), Some(root)) = (self.catalog, self.page_tree) {
            return Ok((catalog, root));
        }
        let root = self.registry.reserve();
        let catalog = self
            .registry
            .promote_structure(StructureDictionary::catalog(root));
        self.registry
            .define_structure(root, StructureDictionary::page_tree(None))?;
        self.catalog = Some(catalog);
        self.page_tree = Some(root);
        self.sync_info()?;
        tracing::debug!(%catalog, page_tree = %root, "document structure created");
        Ok((catalog, root))
    }

    fn dict_mut(&mut self, reference: ObjectRef) -> Result<&mut PdfDictionary> {
        self.registry
            .get_mut(reference)?
            .as_dictionary_mut()
            .ok_or_else(|| PdfError::InvalidDocument(format!("object {} is not a dictionary", reference)))
    }

    /// Append a page to the page tree
    pub fn add_page(&mut self, media_box: MediaBox) -> Result<ObjectRef> {
        let (_, root) = self.ensure_structure()?;
        // Fails once the tree has been written
        self.dict_mut(root)?;
        let mut page = StructureDictionary::page(root);
        page.dict_mut().insert("MediaBox", media_box.to_array());
        let page_ref = self.registry.promote_structure(page);

        let tree = self.dict_mut(root)?;
        tree.array_entry("Kids")
            .ok_or_else(|| PdfError::InvalidDocument("page tree Kids is not an array".to_string()))?
            .push(PdfObject::Reference(page_ref));
        let count = tree.get("Count").and_then(PdfObject::as_integer).unwrap_or(0);
        tree.insert("Count", count + 1);

        self.pages.push(page_ref);
        tracing::debug!(page = %page_ref, number = self.pages.len(), "page added");
        Ok(page_ref)
    }

    /// Register a named resource (e.g. category `Font`, name `F1`) on a page
    pub fn add_page_resource(
        &mut self,
        page: ObjectRef,
        category: &str,
        name: &str,
        resource: ObjectRef,
    ) -> Result<()> {
        let page_dict = self.dict_mut(page)?;
        let resources = page_dict
            .dictionary_entry("Resources")
            .ok_or_else(|| PdfError::InvalidDocument(format!("page {} has indirect Resources", page)))?;
        resources
            .dictionary_entry(category)
            .ok_or_else(|| PdfError::InvalidDocument(format!("resource category {} is not a dictionary", category)))?
            .insert(name, resource);
        Ok(())
    }

    /// Attach a content stream to a page
    pub fn set_page_contents(&mut self, page: ObjectRef, content: Vec<u8>) -> Result<ObjectRef> {
        let stream = self.registry.promote(PdfStream::new(content));
        self.dict_mut(page)?.insert("Contents", stream);
        Ok(stream)
    }

    /// Add an annotation to a page's Annots
    pub fn add_annotation(
        &mut self,
        page: ObjectRef,
        annotation: StructureDictionary,
    ) -> Result<ObjectRef> {
        if annotation.kind() != DictionaryKind::Annotation {
            return Err(PdfError::InvalidDocument(format!(
                "{} dictionary is not an annotation",
                annotation.kind()
            )));
        }
        let annot = self.registry.promote_structure(annotation);
        self.dict_mut(page)?
            .array_entry("Annots")
            .ok_or_else(|| PdfError::InvalidDocument(format!("page {} has indirect Annots", page)))?
            .push(PdfObject::Reference(annot));
        Ok(annot)
    }

    /// Shared WinAnsi encoding dictionary referenced by text fonts
    pub fn encoding(&mut self) -> ObjectRef {
        match self.encoding {
            Some(encoding) => encoding,
            None => {
                let encoding = self
                    .registry
                    .promote_structure(StructureDictionary::encoding());
                self.encoding = Some(encoding);
                encoding
            }
        }
    }

    /// Set a catalog key. Keys unknown to the document version are dropped
    /// and `false` is returned.
    pub fn set_catalog_entry(&mut self, key: &str, value: impl Into<PdfObject>) -> Result<bool> {
        let (catalog, _) = self.ensure_structure()?;
        let version = self.version;
        let dict = self.dict_mut(catalog)?;
        Ok(set_checked(DictionaryKind::Catalog, dict, key, value.into(), version))
    }

    pub fn set_page_mode(&mut self, mode: PageMode) -> Result<bool> {
        self.set_catalog_entry("PageMode", PdfObject::name(mode.pdf_name()))
    }

    pub fn set_page_layout(&mut self, layout: PageLayout) -> Result<bool> {
        self.set_catalog_entry("PageLayout", PdfObject::name(layout.pdf_name()))
    }

    /// Current catalog page mode, if any
    pub fn page_mode(&self) -> Option<&str> {
        self.registry
            .object(self.catalog?)?
            .as_dictionary()?
            .get_name("PageMode")
    }

    /// Attach viewer preferences to the catalog
    pub fn set_viewer_preferences(&mut self, prefs: ViewerPreferences) -> Result<ObjectRef> {
        let version = self.version;
        let mut dict = StructureDictionary::viewer_preferences();
        if prefs.hide_toolbar {
            dict.set("HideToolbar", true, version);
        }
        if prefs.hide_menubar {
            dict.set("HideMenubar", true, version);
        }
        if prefs.hide_window_ui {
            dict.set("HideWindowUI", true, version);
        }
        if prefs.display_doc_title {
            dict.set("DisplayDocTitle", true, version);
        }
        let reference = self.registry.promote_structure(dict);
        self.set_catalog_entry("ViewerPreferences", reference)?;
        Ok(reference)
    }

    /// Check every structure dictionary against its required schedule
    pub fn validate(&self) -> Result<()> {
        if self.catalog.is_none() {
            return Err(PdfError::InvalidDocument("document has no pages".to_string()));
        }
        for object in self.registry.iter() {
            if object.kind().is_some() {
                required_values_set(&self.registry, object.reference(), self.version, self.page_tree)?;
            }
        }
        Ok(())
    }

    /// Bring the Info object in line with `info`
    fn sync_info(&mut self) -> Result<ObjectRef> {
        let structure = self.info.to_structure();
        match self.info_ref {
            Some(reference) => {
                let current = PdfObject::Dictionary(structure.dict().clone());
                if self.registry.object(reference) != Some(&current) {
                    *self.registry.get_mut(reference)? = current;
                }
                Ok(reference)
            }
            None => {
                let reference = self.registry.promote_structure(structure);
                self.info_ref = Some(reference);
                Ok(reference)
            }
        }
    }

    /// Serialize the whole document.
    ///
    /// Nothing is written to `out` unless the graph is complete. Returns the
    /// number of bytes written.
    pub fn write_to<W: Write>(&mut self, mut out: W) -> Result<u64> {
        let catalog = self
            .catalog
            .ok_or_else(|| PdfError::InvalidDocument("document has no pages".to_string()))?;
        let info = self.sync_info()?;
        self.validate()?;

        let mut serializer = PdfSerializer::new(Vec::new()).with_compression(self.compress);
        {
            let buf = serializer.writer_mut();
            write!(buf, "%PDF-{}\n", self.version.as_str())?;
            // Binary marker
            buf.write_all(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;
        }

        let mut offsets = Vec::with_capacity(self.registry.len());
        for object in self.registry.iter() {
            let value = object
                .object()
                .ok_or(PdfError::UndefinedObject(object.reference()))?;
            offsets.push((object.reference(), serializer.writer_mut().len() as u64));
            serializer.write_indirect(object.reference(), value)?;
        }
        for (reference, offset) in offsets {
            self.registry.record_offset(reference, offset)?;
        }

        let mut buf = serializer.into_inner();
        let xref_offset = buf.len() as u64;
        let table = self.registry.cross_reference_table()?;
        table.write_to(&mut buf)?;

        let trailer = PdfDictionary::new()
            .with("Size", table.size())
            .with("Root", catalog)
            .with("Info", info);
        write!(buf, "trailer\n")?;
        buf.extend_from_slice(&PdfObject::Dictionary(trailer).to_bytes()?);
        write!(buf, "\nstartxref\n{}\n%%EOF\n", xref_offset)?;

        out.write_all(&buf)?;
        tracing::info!(
            pages = self.pages.len(),
            objects = self.registry.len(),
            bytes = buf.len(),
            "document written"
        );
        Ok(buf.len() as u64)
    }

    /// Serialize into a new buffer
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }
}
