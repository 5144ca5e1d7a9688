//! Error types for content tree parsing and renderer requests

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Text measurement failed: {0}")]
    Measurement(String),

    #[error("Font could not be loaded from {source_url}: {reason}")]
    FontLoad { source_url: String, reason: String },

    #[error("Rasterization failed for node {node}: {reason}")]
    Rasterize { node: String, reason: String },

    #[error("Invalid content tree: {0}")]
    InvalidTree(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ContentError>;
