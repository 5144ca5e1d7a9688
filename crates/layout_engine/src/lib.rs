//! Layout Engine - single-pass pagination of a rendered content tree into PDF
//!
//! This crate walks an already laid-out content tree once, in document
//! order, and turns it into a paginated PDF document.
//!
//! # Architecture
//!
//! - `config`: generation options (margins, page size, break rules, metadata)
//! - `line_breaker`: greedy word packing and alignment of text nodes
//! - `paginator`: page windows over the canvas and break decisions
//! - `layout_tree`: page geometry and the canvas-to-page coordinate frames
//! - `header_footer`: running header and footer templates
//! - `font_binding`: maps computed styles to embedded or standard fonts
//! - `outline`: bookmark hierarchy built from headings
//! - `deferred`: page-number placeholders and links resolved after traversal
//! - `bridge`: typed requests to the host renderer
//! - `engine`: the traversal tying it all together

mod bridge;
mod config;
mod deferred;
mod engine;
mod error;
mod font_binding;
mod header_footer;
mod layout_tree;
mod line_breaker;
mod outline;
mod paginator;

pub use bridge::*;
pub use config::*;
pub use deferred::*;
pub use engine::*;
pub use error::*;
pub use font_binding::*;
pub use header_footer::*;
pub use layout_tree::*;
pub use line_breaker::*;
pub use outline::*;
pub use paginator::*;

#[cfg(test)]
mod tests;
