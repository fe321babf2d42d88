//! Path addressing over nested JSON metadata documents.
//!
//! Every content object carries a `metadata` document: an arbitrarily nested
//! mapping of string keys to scalars, mappings, and ordered sequences
//! (represented as [`serde_json::Value`]). This crate is the leaf dependency
//! of the edit engine: it resolves slash-separated paths into that document
//! with get/set/remove semantics.
//!
//! Paths are normalized before use: leading and trailing separators are
//! stripped and a base path is joined with a field name, so `"/info/"` +
//! `"title"` and `"info/title"` address the same location.

/// Path normalization and segmentation helpers.
pub mod path;
/// Get/set/remove over nested [`serde_json::Value`] documents.
pub mod value;

pub use path::{join, normalize, segments, starts_with, strip_base};
pub use value::{get, get_mut, remove, set};
