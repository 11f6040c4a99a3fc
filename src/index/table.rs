//! Name Index
//!
//! HashMap from name to record offset, live records only.

use std::collections::HashMap;

/// In-memory map of live entries
#[derive(Debug, Default, Clone)]
pub struct Index {
    entries: HashMap<String, u32>,
}

impl Index {
    /// Create a new empty Index
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` as live at `offset`, returning the previous offset if any
    pub fn put(&mut self, name: impl Into<String>, offset: u32) -> Option<u32> {
        self.entries.insert(name.into(), offset)
    }

    /// Forget `name`, returning its offset if it was live
    pub fn remove(&mut self, name: &str) -> Option<u32> {
        self.entries.remove(name)
    }

    /// Offset of the live record for `name`
    pub fn get(&self, name: &str) -> Option<u32> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All live names, in no particular order
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// All live entries ordered by ascending offset
    pub fn by_offset(&self) -> Vec<(String, u32)> {
        let mut entries: Vec<(String, u32)> = self
            .entries
            .iter()
            .map(|(name, &offset)| (name.clone(), offset))
            .collect();
        entries.sort_by_key(|&(_, offset)| offset);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
