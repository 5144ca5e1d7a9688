//! Error types for the PDF model

use crate::structure::DictionaryKind;
use crate::ObjectRef;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{kind} dictionary {object} is missing required entry /{key}")]
    StructuralIncomplete {
        kind: DictionaryKind,
        object: ObjectRef,
        key: &'static str,
    },

    #[error("Unknown object: {0}")]
    UnknownObject(ObjectRef),

    #[error("Object {0} has already been written and can no longer change")]
    ObjectAlreadyWritten(ObjectRef),

    #[error("Object {0} was reserved but never defined")]
    UndefinedObject(ObjectRef),

    #[error("Malformed cross-reference data: {0}")]
    XrefParse(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;
