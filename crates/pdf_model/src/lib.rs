//! PDF object model and writer
//!
//! Builds the object graph of a PDF document and serializes it in a single
//! append-only pass.
//!
//! # Architecture
//!
//! - `objects`: PDF object model (Dictionary, Array, Stream, Reference) and serializer
//! - `registry`: indirect object identity, reservation, freeing and offsets
//! - `xref`: cross-reference table with subsections and the free list
//! - `structure`: structure dictionaries validated against required/optional schedules
//! - `document`: the document assembler (Catalog, Pages, Info, trailer)
//! - `outline`: bookmarks
//! - `content`: content stream generation (text, graphics operators)
//! - `fonts`: standard and embedded fonts
//! - `images`: image XObject generation

mod content;
mod document;
mod error;
mod fonts;
mod images;
mod objects;
mod outline;
mod registry;
mod structure;
mod xref;

pub use content::ContentStream;
pub use document::{
    pdf_date, DocumentInfo, MediaBox, PageLayout, PageMode, PdfDocument, ViewerPreferences,
};
pub use error::{PdfError, Result};
pub use fonts::{
    create_standard_font_dict, encode_win_ansi, FontManager, FontResource, StandardFont,
    TrueTypeProgram,
};
pub use images::{ImageData, ImageManager, ImageResource};
pub use objects::{ObjectRef, PdfDictionary, PdfName, PdfObject, PdfSerializer, PdfStream, PdfString};
pub use outline::{xyz_destination, OutlineEntry};
pub use registry::{IndirectObject, ObjectRegistry};
pub use structure::{
    is_value_applicable_by_version, required_values_set, CheckContext, DictionaryKind,
    PdfVersion, ScheduleEntry, StructureDictionary, ValueType,
};
pub use xref::{CrossReferenceTable, XrefEntry, XrefLocation, XrefSubsection, MAX_GENERATION};
