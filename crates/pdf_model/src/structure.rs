//! Document Structure Dictionaries
//!
//! A structure dictionary is a plain [`PdfDictionary`] tagged with a
//! [`DictionaryKind`]. The kind selects a required and an optional schedule;
//! each schedule entry names a key, the value types it accepts, the first PDF
//! version that knows it, whether it may be inherited through `/Parent`, and
//! an optional exception under which a required key may be absent.
//!
//! Completeness is checked when the document is written, never repaired.

use crate::error::{PdfError, Result};
use crate::registry::ObjectRegistry;
use crate::{ObjectRef, PdfDictionary, PdfObject};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// PDF version, ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PdfVersion {
    #[serde(rename = "1.3")]
    V1_3,
    #[serde(rename = "1.4")]
    V1_4,
    #[serde(rename = "1.5")]
    V1_5,
    #[serde(rename = "1.6")]
    V1_6,
    #[serde(rename = "1.7")]
    V1_7,
}

impl PdfVersion {
    /// Get the version string
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfVersion::V1_3 => "1.3",
            PdfVersion::V1_4 => "1.4",
            PdfVersion::V1_5 => "1.5",
            PdfVersion::V1_6 => "1.6",
            PdfVersion::V1_7 => "1.7",
        }
    }
}

impl Default for PdfVersion {
    fn default() -> Self {
        PdfVersion::V1_4
    }
}

impl fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PdfVersion {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1.3" => Ok(PdfVersion::V1_3),
            "1.4" => Ok(PdfVersion::V1_4),
            "1.5" => Ok(PdfVersion::V1_5),
            "1.6" => Ok(PdfVersion::V1_6),
            "1.7" => Ok(PdfVersion::V1_7),
            other => Err(PdfError::InvalidDocument(format!(
                "unsupported PDF version {}",
                other
            ))),
        }
    }
}

/// Value types a schedule entry may accept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Boolean,
    Integer,
    /// Integer or real
    Number,
    Name,
    String,
    Array,
    Dictionary,
    Reference,
}

impl ValueType {
    pub fn accepts(&self, value: &PdfObject) -> bool {
        matches!(
            (self, value),
            (ValueType::Boolean, PdfObject::Boolean(_))
                | (ValueType::Integer, PdfObject::Integer(_))
                | (ValueType::Number, PdfObject::Integer(_) | PdfObject::Real(_))
                | (ValueType::Name, PdfObject::Name(_))
                | (ValueType::String, PdfObject::String(_))
                | (ValueType::Array, PdfObject::Array(_))
                | (ValueType::Dictionary, PdfObject::Dictionary(_))
                | (ValueType::Reference, PdfObject::Reference(_))
        )
    }
}

/// What an exception predicate gets to look at
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub object: ObjectRef,
    pub dict: &'a PdfDictionary,
    /// The object is the root of the page tree
    pub is_root: bool,
}

/// One row of a required or optional schedule
#[derive(Debug, Clone, Copy)]
pub struct ScheduleEntry {
    pub name: &'static str,
    pub allowed: &'static [ValueType],
    pub min_version: PdfVersion,
    pub inheritable: bool,
    pub exception: Option<fn(&CheckContext<'_>) -> bool>,
}

impl ScheduleEntry {
    const fn new(name: &'static str, allowed: &'static [ValueType]) -> Self {
        Self {
            name,
            allowed,
            min_version: PdfVersion::V1_3,
            inheritable: false,
            exception: None,
        }
    }

    const fn since(mut self, version: PdfVersion) -> Self {
        self.min_version = version;
        self
    }

    const fn inheritable(mut self) -> Self {
        self.inheritable = true;
        self
    }

    const fn unless(mut self, exception: fn(&CheckContext<'_>) -> bool) -> Self {
        self.exception = Some(exception);
        self
    }

    pub fn accepts(&self, value: &PdfObject) -> bool {
        self.allowed.iter().any(|t| t.accepts(value))
    }
}

/// Whether `entry` exists in a document of the given version
pub fn is_value_applicable_by_version(entry: &ScheduleEntry, version: PdfVersion) -> bool {
    entry.min_version <= version
}

use ValueType as T;

const NAME: &[ValueType] = &[T::Name];
const INT: &[ValueType] = &[T::Integer];
const NUMBER: &[ValueType] = &[T::Number];
const BOOL: &[ValueType] = &[T::Boolean];
const STRING: &[ValueType] = &[T::String];
const ARRAY: &[ValueType] = &[T::Array];
const REF: &[ValueType] = &[T::Reference];
const DICT_OR_REF: &[ValueType] = &[T::Dictionary, T::Reference];
const ARRAY_OR_REF: &[ValueType] = &[T::Array, T::Reference];
const NAME_OR_DICT: &[ValueType] = &[T::Name, T::Dictionary, T::Reference];

fn is_root(ctx: &CheckContext<'_>) -> bool {
    ctx.is_root
}

fn has_no_items(ctx: &CheckContext<'_>) -> bool {
    ctx.dict
        .get("Count")
        .and_then(PdfObject::as_integer)
        .unwrap_or(0)
        == 0
}

const CATALOG_REQUIRED: &[ScheduleEntry] = &[
    ScheduleEntry::new("Type", NAME),
    ScheduleEntry::new("Pages", REF),
];
const CATALOG_OPTIONAL: &[ScheduleEntry] = &[
    ScheduleEntry::new("PageLayout", NAME),
    ScheduleEntry::new("PageMode", NAME),
    ScheduleEntry::new("Outlines", REF),
    ScheduleEntry::new("ViewerPreferences", DICT_OR_REF),
    ScheduleEntry::new("Lang", STRING).since(PdfVersion::V1_4),
    ScheduleEntry::new("Metadata", REF).since(PdfVersion::V1_4),
    ScheduleEntry::new("Version", NAME).since(PdfVersion::V1_4),
];

const PAGE_TREE_REQUIRED: &[ScheduleEntry] = &[
    ScheduleEntry::new("Type", NAME),
    ScheduleEntry::new("Parent", REF).unless(is_root),
    ScheduleEntry::new("Kids", ARRAY),
    ScheduleEntry::new("Count", INT),
];
const PAGE_TREE_OPTIONAL: &[ScheduleEntry] = &[
    ScheduleEntry::new("Resources", DICT_OR_REF).inheritable(),
    ScheduleEntry::new("MediaBox", ARRAY).inheritable(),
    ScheduleEntry::new("CropBox", ARRAY).inheritable(),
    ScheduleEntry::new("Rotate", INT).inheritable(),
];

const PAGE_REQUIRED: &[ScheduleEntry] = &[
    ScheduleEntry::new("Type", NAME),
    ScheduleEntry::new("Parent", REF),
    ScheduleEntry::new("Resources", DICT_OR_REF).inheritable(),
    ScheduleEntry::new("MediaBox", ARRAY).inheritable(),
];
const PAGE_OPTIONAL: &[ScheduleEntry] = &[
    ScheduleEntry::new("Contents", ARRAY_OR_REF),
    ScheduleEntry::new("Annots", ARRAY_OR_REF),
    ScheduleEntry::new("CropBox", ARRAY).inheritable(),
    ScheduleEntry::new("Rotate", INT).inheritable(),
    ScheduleEntry::new("Group", DICT_OR_REF).since(PdfVersion::V1_4),
    ScheduleEntry::new("UserUnit", NUMBER).since(PdfVersion::V1_6),
];

const ENCODING_REQUIRED: &[ScheduleEntry] = &[ScheduleEntry::new("Type", NAME)];
const ENCODING_OPTIONAL: &[ScheduleEntry] = &[
    ScheduleEntry::new("BaseEncoding", NAME),
    ScheduleEntry::new("Differences", ARRAY),
];

const OUTLINES_REQUIRED: &[ScheduleEntry] = &[
    ScheduleEntry::new("First", REF).unless(has_no_items),
    ScheduleEntry::new("Last", REF).unless(has_no_items),
];
const OUTLINES_OPTIONAL: &[ScheduleEntry] = &[
    ScheduleEntry::new("Type", NAME),
    ScheduleEntry::new("Count", INT),
];

const OUTLINE_ITEM_REQUIRED: &[ScheduleEntry] = &[
    ScheduleEntry::new("Title", STRING),
    ScheduleEntry::new("Parent", REF),
];
const OUTLINE_ITEM_OPTIONAL: &[ScheduleEntry] = &[
    ScheduleEntry::new("Prev", REF),
    ScheduleEntry::new("Next", REF),
    ScheduleEntry::new("First", REF),
    ScheduleEntry::new("Last", REF),
    ScheduleEntry::new("Count", INT),
    ScheduleEntry::new("Dest", ARRAY),
];

const ANNOTATION_REQUIRED: &[ScheduleEntry] = &[
    ScheduleEntry::new("Subtype", NAME),
    ScheduleEntry::new("Rect", ARRAY),
];
const ANNOTATION_OPTIONAL: &[ScheduleEntry] = &[
    ScheduleEntry::new("Type", NAME),
    ScheduleEntry::new("Border", ARRAY),
    ScheduleEntry::new("C", ARRAY),
    ScheduleEntry::new("Dest", ARRAY),
    ScheduleEntry::new("A", DICT_OR_REF),
    ScheduleEntry::new("F", INT),
    ScheduleEntry::new("P", REF),
];

const VIEWER_PREFERENCES_OPTIONAL: &[ScheduleEntry] = &[
    ScheduleEntry::new("HideToolbar", BOOL),
    ScheduleEntry::new("HideMenubar", BOOL),
    ScheduleEntry::new("HideWindowUI", BOOL),
    ScheduleEntry::new("FitWindow", BOOL),
    ScheduleEntry::new("CenterWindow", BOOL),
    ScheduleEntry::new("DisplayDocTitle", BOOL).since(PdfVersion::V1_4),
    ScheduleEntry::new("Direction", NAME),
];

const INFO_OPTIONAL: &[ScheduleEntry] = &[
    ScheduleEntry::new("Title", STRING),
    ScheduleEntry::new("Author", STRING),
    ScheduleEntry::new("Subject", STRING),
    ScheduleEntry::new("Keywords", STRING),
    ScheduleEntry::new("Creator", STRING),
    ScheduleEntry::new("Producer", STRING),
    ScheduleEntry::new("CreationDate", STRING),
    ScheduleEntry::new("ModDate", STRING),
    ScheduleEntry::new("Trapped", NAME_OR_DICT),
];

/// Structural role of a dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictionaryKind {
    Catalog,
    PageTree,
    Page,
    Encoding,
    Outlines,
    OutlineItem,
    Annotation,
    ViewerPreferences,
    Info,
}

impl DictionaryKind {
    pub fn required(&self) -> &'static [ScheduleEntry] {
        match self {
            DictionaryKind::Catalog => CATALOG_REQUIRED,
            DictionaryKind::PageTree => PAGE_TREE_REQUIRED,
            DictionaryKind::Page => PAGE_REQUIRED,
            DictionaryKind::Encoding => ENCODING_REQUIRED,
            DictionaryKind::Outlines => OUTLINES_REQUIRED,
            DictionaryKind::OutlineItem => OUTLINE_ITEM_REQUIRED,
            DictionaryKind::Annotation => ANNOTATION_REQUIRED,
            DictionaryKind::ViewerPreferences | DictionaryKind::Info => &[],
        }
    }

    pub fn optional(&self) -> &'static [ScheduleEntry] {
        match self {
            DictionaryKind::Catalog => CATALOG_OPTIONAL,
            DictionaryKind::PageTree => PAGE_TREE_OPTIONAL,
            DictionaryKind::Page => PAGE_OPTIONAL,
            DictionaryKind::Encoding => ENCODING_OPTIONAL,
            DictionaryKind::Outlines => OUTLINES_OPTIONAL,
            DictionaryKind::OutlineItem => OUTLINE_ITEM_OPTIONAL,
            DictionaryKind::Annotation => ANNOTATION_OPTIONAL,
            DictionaryKind::ViewerPreferences => VIEWER_PREFERENCES_OPTIONAL,
            DictionaryKind::Info => INFO_OPTIONAL,
        }
    }

    /// Schedule row for `key`, required rows first
    pub fn schedule_entry(&self, key: &str) -> Option<&'static ScheduleEntry> {
        self.required()
            .iter()
            .chain(self.optional())
            .find(|e| e.name == key)
    }
}

impl fmt::Display for DictionaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DictionaryKind::Catalog => "Catalog",
            DictionaryKind::PageTree => "Pages",
            DictionaryKind::Page => "Page",
            DictionaryKind::Encoding => "Encoding",
            DictionaryKind::Outlines => "Outlines",
            DictionaryKind::OutlineItem => "Outline item",
            DictionaryKind::Annotation => "Annotation",
            DictionaryKind::ViewerPreferences => "ViewerPreferences",
            DictionaryKind::Info => "Info",
        };
        f.write_str(name)
    }
}

/// A dictionary plus the schedules it must satisfy
#[derive(Debug, Clone, PartialEq)]
pub struct StructureDictionary {
    kind: DictionaryKind,
    dict: PdfDictionary,
}

impl StructureDictionary {
    pub fn new(kind: DictionaryKind, dict: PdfDictionary) -> Self {
        Self { kind, dict }
    }

    /// Catalog pointing at the page tree root
    pub fn catalog(pages: ObjectRef) -> Self {
        Self::new(
            DictionaryKind::Catalog,
            PdfDictionary::new().with_type("Catalog").with("Pages", pages),
        )
    }

    /// Empty page tree node; the root has no parent
    pub fn page_tree(parent: Option<ObjectRef>) -> Self {
        let mut dict = PdfDictionary::new()
            .with_type("Pages")
            .with("Kids", PdfObject::Array(Vec::new()))
            .with("Count", 0);
        if let Some(parent) = parent {
            dict.insert("Parent", parent);
        }
        Self::new(DictionaryKind::PageTree, dict)
    }

    /// Page with an empty Resources dictionary and its parent back-reference
    pub fn page(parent: ObjectRef) -> Self {
        Self::new(
            DictionaryKind::Page,
            PdfDictionary::new()
                .with_type("Page")
                .with("Parent", parent)
                .with("Resources", PdfDictionary::new()),
        )
    }

    /// WinAnsi-based text encoding
    pub fn encoding() -> Self {
        Self::new(
            DictionaryKind::Encoding,
            PdfDictionary::new()
                .with_type("Encoding")
                .with("BaseEncoding", PdfObject::name("WinAnsiEncoding")),
        )
    }

    /// Outline root without items
    pub fn outlines() -> Self {
        Self::new(
            DictionaryKind::Outlines,
            PdfDictionary::new().with_type("Outlines").with("Count", 0),
        )
    }

    pub fn outline_item(title: &str, parent: ObjectRef) -> Self {
        Self::new(
            DictionaryKind::OutlineItem,
            PdfDictionary::new()
                .with("Title", PdfObject::text(title))
                .with("Parent", parent),
        )
    }

    pub fn annotation(subtype: &str, rect: [f64; 4]) -> Self {
        Self::new(
            DictionaryKind::Annotation,
            PdfDictionary::new()
                .with_type("Annot")
                .with("Subtype", PdfObject::name(subtype))
                .with("Rect", PdfObject::reals(&rect)),
        )
    }

    pub fn viewer_preferences() -> Self {
        Self::new(DictionaryKind::ViewerPreferences, PdfDictionary::new())
    }

    pub fn info() -> Self {
        Self::new(DictionaryKind::Info, PdfDictionary::new())
    }

    pub fn kind(&self) -> DictionaryKind {
        self.kind
    }

    pub fn dict(&self) -> &PdfDictionary {
        &self.dict
    }

    pub fn dict_mut(&mut self) -> &mut PdfDictionary {
        &mut self.dict
    }

    /// Set a key, refusing keys the target version does not know.
    ///
    /// Keys outside both schedules are accepted as-is. Returns whether the
    /// value was stored.
    pub fn set(&mut self, key: &str, value: impl Into<PdfObject>, version: PdfVersion) -> bool {
        set_checked(self.kind, &mut self.dict, key, value.into(), version)
    }

    pub fn with(mut self, key: &str, value: impl Into<PdfObject>, version: PdfVersion) -> Self {
        self.set(key, value, version);
        self
    }

    pub fn into_parts(self) -> (DictionaryKind, PdfDictionary) {
        (self.kind, self.dict)
    }
}

/// Version-gated insert shared by [`StructureDictionary::set`] and the
/// assembler, which edits dictionaries already held by the registry
pub(crate) fn set_checked(
    kind: DictionaryKind,
    dict: &mut PdfDictionary,
    key: &str,
    value: PdfObject,
    version: PdfVersion,
) -> bool {
    if let Some(entry) = kind.schedule_entry(key) {
        if !is_value_applicable_by_version(entry, version) {
            tracing::warn!(
                %kind,
                key,
                requires = %entry.min_version,
                %version,
                "key not available in target PDF version, dropped"
            );
            return false;
        }
    }
    dict.insert(key, value);
    true
}

/// Maximum `/Parent` hops followed when looking for inherited values
const MAX_INHERITANCE_DEPTH: usize = 64;

fn inherited_value<'a>(
    registry: &'a ObjectRegistry,
    dict: &PdfDictionary,
    entry: &ScheduleEntry,
) -> Option<&'a PdfObject> {
    let mut parent = dict.get_reference("Parent");
    for _ in 0..MAX_INHERITANCE_DEPTH {
        let ancestor = registry.get(parent?)?;
        if ancestor.kind() != Some(DictionaryKind::PageTree) {
            return None;
        }
        let ancestor_dict = ancestor.object()?.as_dictionary()?;
        if let Some(value) = ancestor_dict.get(entry.name).filter(|v| entry.accepts(v)) {
            return Some(value);
        }
        parent = ancestor_dict.get_reference("Parent");
    }
    None
}

/// Check the required schedule of the structure dictionary at `reference`.
///
/// Each applicable required entry must be present with an allowed type,
/// inherited from an ancestor page tree node, or excused by its exception.
/// `page_tree_root` identifies the page tree node that needs no parent.
pub fn required_values_set(
    registry: &ObjectRegistry,
    reference: ObjectRef,
    version: PdfVersion,
    page_tree_root: Option<ObjectRef>,
) -> Result<()> {
    let object = registry
        .get(reference)
        .ok_or(PdfError::UnknownObject(reference))?;
    let Some(kind) = object.kind() else {
        return Ok(());
    };
    let dict = object
        .object()
        .and_then(PdfObject::as_dictionary)
        .ok_or(PdfError::UndefinedObject(reference))?;

    let ctx = CheckContext {
        object: reference,
        dict,
        is_root: page_tree_root == Some(reference),
    };

    for entry in kind.required() {
        if !is_value_applicable_by_version(entry, version) {
            continue;
        }
        let direct = dict.get(entry.name).is_some_and(|v| entry.accepts(v));
        let satisfied = direct
            || (entry.inheritable && inherited_value(registry, dict, entry).is_some())
            || entry.exception.is_some_and(|exception| exception(&ctx));
        if !satisfied {
            return Err(PdfError::StructuralIncomplete {
                kind,
                object: reference,
                key: entry.name,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering_and_parsing() {
        assert!(PdfVersion::V1_3 < PdfVersion::V1_7);
        assert_eq!("1.5".parse::<PdfVersion>().unwrap(), PdfVersion::V1_5);
        assert!("2.0".parse::<PdfVersion>().is_err());
        assert_eq!(PdfVersion::default().to_string(), "1.4");
    }

    #[test]
    fn test_value_applicable_by_version() {
        let entry = DictionaryKind::ViewerPreferences
            .schedule_entry("DisplayDocTitle")
            .unwrap();
        assert!(!is_value_applicable_by_version(entry, PdfVersion::V1_3));
        assert!(is_value_applicable_by_version(entry, PdfVersion::V1_4));
    }

    #[test]
    fn test_set_refuses_too_new_keys() {
        let mut prefs = StructureDictionary::viewer_preferences();
        assert!(!prefs.set("DisplayDocTitle", true, PdfVersion::V1_3));
        assert!(prefs.set("HideToolbar", true, PdfVersion::V1_3));
        assert!(prefs.dict().get("DisplayDocTitle").is_none());
    }

    #[test]
    fn test_catalog_requires_pages() {
        let mut registry = ObjectRegistry::new();
        let mut catalog = StructureDictionary::catalog(ObjectRef::new(2, 0));
        catalog.dict_mut().remove("Pages");
        let r = registry.promote_structure(catalog);

        let err = required_values_set(&registry, r, PdfVersion::V1_4, None).unwrap_err();
        assert!(matches!(
            err,
            PdfError::StructuralIncomplete { kind: DictionaryKind::Catalog, key: "Pages", .. }
        ));
    }

    #[test]
    fn test_wrong_value_type_is_incomplete() {
        let mut registry = ObjectRegistry::new();
        let mut catalog = StructureDictionary::catalog(ObjectRef::new(2, 0));
        catalog.dict_mut().insert("Pages", 2);
        let r = registry.promote_structure(catalog);
        assert!(required_values_set(&registry, r, PdfVersion::V1_4, None).is_err());
    }

    #[test]
    fn test_page_tree_root_needs_no_parent() {
        let mut registry = ObjectRegistry::new();
        let root = registry.promote_structure(StructureDictionary::page_tree(None));
        assert!(required_values_set(&registry, root, PdfVersion::V1_4, Some(root)).is_ok());
        assert!(required_values_set(&registry, root, PdfVersion::V1_4, None).is_err());
    }

    #[test]
    fn test_media_box_inherited_from_ancestor() {
        let mut registry = ObjectRegistry::new();
        let root = registry.reserve();
        let mid = registry.promote_structure(StructureDictionary::page_tree(Some(root)));
        let page = registry.promote_structure(StructureDictionary::page(mid));

        let mut root_tree = StructureDictionary::page_tree(None);
        root_tree
            .dict_mut()
            .insert("MediaBox", PdfObject::reals(&[0.0, 0.0, 595.0, 842.0]));
        registry.define_structure(root, root_tree).unwrap();

        assert!(required_values_set(&registry, page, PdfVersion::V1_4, Some(root)).is_ok());
    }

    #[test]
    fn test_missing_media_box_without_ancestor() {
        let mut registry = ObjectRegistry::new();
        let root = registry.promote_structure(StructureDictionary::page_tree(None));
        let page = registry.promote_structure(StructureDictionary::page(root));

        let err = required_values_set(&registry, page, PdfVersion::V1_4, Some(root)).unwrap_err();
        assert!(matches!(
            err,
            PdfError::StructuralIncomplete { kind: DictionaryKind::Page, key: "MediaBox", .. }
        ));
    }

    #[test]
    fn test_empty_outlines_need_no_first_last() {
        let mut registry = ObjectRegistry::new();
        let outlines = registry.promote_structure(StructureDictionary::outlines());
        assert!(required_values_set(&registry, outlines, PdfVersion::V1_4, None).is_ok());

        registry
            .get_mut(outlines)
            .unwrap()
            .as_dictionary_mut()
            .unwrap()
            .insert("Count", 2);
        assert!(required_values_set(&registry, outlines, PdfVersion::V1_4, None).is_err());
    }
}
