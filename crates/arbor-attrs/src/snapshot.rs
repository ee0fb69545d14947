//! Explicit attribute snapshot cache.
//!
//! The enumerated attribute set is only valid for one (rule package, rule
//! file, start rule) selection; the cache is keyed by that triple and must be
//! invalidated whenever any component changes. There is no implicit "empty
//! means stale" state.

use std::path::PathBuf;

use crate::attribute::Attribute;

/// The selection an attribute snapshot belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub rule_package: PathBuf,
    pub rule_file: usize,
    pub start_rule: usize,
}

/// Holds at most one attribute snapshot, keyed by its selection.
#[derive(Debug, Default)]
pub struct AttributeCache {
    entry: Option<(SelectionKey, Vec<Attribute>)>,
}

impl AttributeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached snapshot for `key`, if it is current.
    pub fn get(&self, key: &SelectionKey) -> Option<&[Attribute]> {
        match &self.entry {
            Some((cached, attrs)) if cached == key => Some(attrs),
            _ => None,
        }
    }

    /// Mutable access to the cached snapshot for `key`, if it is current.
    pub fn get_mut(&mut self, key: &SelectionKey) -> Option<&mut Vec<Attribute>> {
        match &mut self.entry {
            Some((cached, attrs)) if cached == key => Some(attrs),
            _ => None,
        }
    }

    /// Replace the cache with a snapshot for `key`.
    pub fn store(&mut self, key: SelectionKey, attrs: Vec<Attribute>) -> &mut Vec<Attribute> {
        let (_, stored) = self.entry.insert((key, attrs));
        stored
    }

    /// Drop any cached snapshot.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
