//! Error and warning types for the layout engine

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Heading \"{title}\" at level {level} skips a level (deepest open level is {deepest})")]
    OutlineHierarchy { title: String, level: u8, deepest: u8 },

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_model::PdfError),

    #[error("Renderer error: {0}")]
    Renderer(#[from] content_tree::ContentError),

    #[error("Renderer answered a {expected} request with a {actual} response")]
    UnexpectedResponse {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Recoverable conditions, collected in the output and logged.
/// Generation still completes when any of these occur.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutWarning {
    /// A page-number-by-id placeholder whose target never appeared
    UnresolvedReference { target: String },
    /// An element outside the supported set was hidden
    UnsupportedElement { tag: String },
    /// A fragment link whose target never appeared
    UnresolvedLink { target: String },
    /// A declared font face could not be loaded; a standard font was used
    FontFallback { source: String, reason: String },
}

impl std::fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutWarning::UnresolvedReference { target } => {
                write!(f, "page number target #{} not found", target)
            }
            LayoutWarning::UnsupportedElement { tag } => {
                write!(f, "unsupported element <{}> hidden", tag)
            }
            LayoutWarning::UnresolvedLink { target } => {
                write!(f, "link target #{} not found", target)
            }
            LayoutWarning::FontFallback { source, reason } => {
                write!(f, "font {} unavailable ({}), using a standard font", source, reason)
            }
        }
    }
}
