//! Key → position lookups over a tab list.
//!
//! Two identities are used when matching edited tabs to listed ones:
//!
//! 1. **Line**: id, title and url all unchanged. Most tabs match here.
//! 2. **Identity**: `(tab_id, title)`. Tolerates a changed window or url,
//!    which is how a tab moved to another window is recognised.
//!
//! Known limitation: when two listed tabs share `(tab_id, title)` (only
//! possible across prefixes) the identity tier resolves to the first one.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{ReconcileError, Result};
use crate::tab::Tab;

/// Maps a key extracted from each tab to the index of its first occurrence.
#[derive(Debug, Clone)]
pub struct KeyToIndexMapper<K> {
    positions: HashMap<K, usize>,
}

impl<K: Eq + Hash> KeyToIndexMapper<K> {
    pub fn new<F>(tabs: &[Tab], key: F) -> Self
    where
        F: Fn(&Tab) -> K,
    {
        let mut positions = HashMap::with_capacity(tabs.len());
        for (index, tab) in tabs.iter().enumerate() {
            positions.entry(key(tab)).or_insert(index);
        }
        Self { positions }
    }

    pub fn get(&self, key: &K) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

pub type IdentityKey = (u64, String);

pub fn identity_key(tab: &Tab) -> IdentityKey {
    (tab.tab_id, tab.title.clone())
}

pub fn line_mapper(tabs: &[Tab]) -> KeyToIndexMapper<String> {
    KeyToIndexMapper::new(tabs, Tab::line)
}

pub fn identity_mapper(tabs: &[Tab]) -> KeyToIndexMapper<IdentityKey> {
    KeyToIndexMapper::new(tabs, identity_key)
}

/// Two-tier lookup of an edited tab's position in the listed tabs.
#[derive(Debug, Clone)]
pub struct TabLookup {
    by_line: KeyToIndexMapper<String>,
    by_identity: KeyToIndexMapper<IdentityKey>,
}

impl TabLookup {
    pub fn new(tabs: &[Tab]) -> Self {
        Self {
            by_line: line_mapper(tabs),
            by_identity: identity_mapper(tabs),
        }
    }

    pub fn lookup(&self, tab: &Tab) -> Result<usize> {
        let line = tab.line();
        if let Some(index) = self.by_line.get(&line) {
            return Ok(index);
        }

        // Window or url may have changed.
        self.by_identity
            .get(&identity_key(tab))
            .ok_or(ReconcileError::LookupFailure { line })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tabs() -> Vec<Tab> {
        vec![
            Tab::new("f", 0, 0, "a", "url0"),
            Tab::new("f", 0, 1, "b", "url1"),
            Tab::new("f", 1, 2, "b", "url2"),
        ]
    }

    #[test]
    fn test_first_occurrence_wins() {
        let listed = vec![
            Tab::new("f", 0, 5, "same", "x"),
            Tab::new("g", 0, 5, "same", "y"),
        ];
        let mapper = identity_mapper(&listed);
        assert_eq!(mapper.get(&(5, "same".to_string())), Some(0));
        assert_eq!(mapper.len(), 1);
    }

    #[test]
    fn test_exact_line_match() {
        let lookup = TabLookup::new(&tabs());
        assert_eq!(lookup.lookup(&Tab::new("f", 1, 2, "b", "url2")).unwrap(), 2);
    }

    #[test]
    fn test_identity_fallback_tolerates_window_and_url() {
        let lookup = TabLookup::new(&tabs());
        let moved = Tab::new("f", 7, 1, "b", "changed");
        assert_eq!(lookup.lookup(&moved).unwrap(), 1);
    }

    #[test]
    fn test_changed_title_fails_lookup() {
        let lookup = TabLookup::new(&tabs());
        let renamed = Tab::new("f", 0, 1, "renamed", "url1");
        match lookup.lookup(&renamed) {
            Err(ReconcileError::LookupFailure { line }) => {
                assert_eq!(line, "f.0.1\trenamed\turl1")
            }
            other => panic!("expected lookup failure, got {:?}", other),
        }
    }
}
