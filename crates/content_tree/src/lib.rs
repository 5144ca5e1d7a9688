//! Content Tree - the laid-out input handed over by a rendering host
//!
//! This crate describes the already-rendered DOM-like tree the PDF layout
//! engine consumes: element and text nodes with their computed style
//! snapshot, device-pixel geometry and data flags, plus the synchronous
//! request/response protocol used whenever the engine needs the host to
//! measure text, load a font or rasterize an element.

mod error;
mod geometry;
mod node;
mod node_id;
mod renderer;
mod style;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::*;
pub use geometry::*;
pub use node::*;
pub use node_id::*;
pub use renderer::*;
pub use style::*;
