// src/lib.rs
//
// Normalize model-drafted blog text into a small, styled HTML vocabulary.
//
// raw text → coerce (`<h3>`, `<p>`, `<ul><li>`) → annotate (default classes per
// tag) → HTML ready to store or display. draft wraps the same pipeline around the
// loosely-structured JSON a model returns for a post.

pub mod annotate;
pub mod classes;
pub mod coerce;
pub mod draft;
pub mod error;
pub mod tree;

pub use annotate::{annotate, Annotator};
pub use classes::ClassMap;
pub use coerce::coerce;
pub use draft::{Category, DraftRecord, DraftRequest, DraftResponse};
pub use error::{Error, Result};
pub use tree::{HtmlFragment, MarkupTree};

/// [`coerce`] then [`annotate`], with the default class map.
pub fn render(raw: &str) -> String {
    Annotator::new(ClassMap::default()).render(raw)
}
