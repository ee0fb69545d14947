//! Typed attribute model and marshalling for the Arbor bridge.
//!
//! The generator describes its parameters through compound bit-flag type
//! tags and per-kind getters; this crate decodes that surface once into a
//! closed, owned attribute model, writes host edits back through the matching
//! setters, and caches the enumerated snapshot per rule selection.

mod attribute;
mod marshal;
mod snapshot;

pub use attribute::{AttrKind, AttrValue, Attribute};
pub use marshal::{read_all, read_attribute, write_attribute};
pub use snapshot::{AttributeCache, SelectionKey};
