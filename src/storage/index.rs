//! B-Tree Index for MicaDB
//!
//! An order-4 B-tree multimap from cell value to posting list (the row
//! positions holding that value). Indexes back unique-constrained columns:
//! they accelerate equality lookups and enforce uniqueness.

use std::cmp::Ordering;

use super::value::Value;
use crate::error::{Error, Result};

const ORDER: usize = 4;
const MAX_ENTRIES: usize = ORDER - 1;

/// One (value, posting-list) pair inside a node
#[derive(Debug, Clone)]
struct Entry {
    key: Value,
    postings: Vec<usize>,
}

/// B-tree node: up to three entries, up to four children. Leaves have no
/// children.
#[derive(Debug, Clone, Default)]
struct Node {
    entries: Vec<Entry>,
    children: Vec<Node>,
}

impl Node {
    fn leaf() -> Self {
        Self::default()
    }

    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn is_full(&self) -> bool {
        self.entries.len() >= MAX_ENTRIES
    }

    fn find(&self, key: &Value) -> std::result::Result<usize, usize> {
        self.entries.binary_search_by(|e| e.key.total_cmp(key))
    }

    /// Split the full child at `idx`, promoting its median entry into self.
    fn split_child(&mut self, idx: usize) {
        let child = &mut self.children[idx];
        let mid = MAX_ENTRIES / 2;

        let right_entries = child.entries.split_off(mid + 1);
        let median = child.entries.pop().expect("full node has a median");
        let right_children = if child.is_leaf() {
            Vec::new()
        } else {
            child.children.split_off(mid + 1)
        };

        self.entries.insert(idx, median);
        self.children.insert(
            idx + 1,
            Node {
                entries: right_entries,
                children: right_children,
            },
        );
    }

    /// Insert into a node known not to be full, splitting full children on
    /// the way down.
    fn insert_non_full(&mut self, key: Value, position: usize) {
        match self.find(&key) {
            Ok(idx) => self.entries[idx].postings.push(position),
            Err(mut idx) => {
                if self.is_leaf() {
                    self.entries.insert(
                        idx,
                        Entry {
                            key,
                            postings: vec![position],
                        },
                    );
                } else {
                    if self.children[idx].is_full() {
                        self.split_child(idx);
                        // The promoted median may itself be the key, or sort
                        // before it.
                        match self.entries[idx].key.total_cmp(&key) {
                            Ordering::Equal => {
                                self.entries[idx].postings.push(position);
                                return;
                            }
                            Ordering::Less => idx += 1,
                            Ordering::Greater => {}
                        }
                    }
                    self.children[idx].insert_non_full(key, position);
                }
            }
        }
    }

    fn remove(&mut self, key: &Value, position: usize) {
        match self.find(key) {
            Ok(idx) => {
                self.entries[idx].postings.retain(|&p| p != position);
                // An emptied pair is dropped from a leaf. In an interior node
                // it stays in place (the child arity must hold); an empty
                // posting list reads as absent everywhere else.
                if self.entries[idx].postings.is_empty() && self.is_leaf() {
                    self.entries.remove(idx);
                }
            }
            Err(idx) => {
                if !self.is_leaf() {
                    self.children[idx].remove(key, position);
                }
            }
        }
    }

    fn scan_into(&self, out: &mut Vec<(Value, Vec<usize>)>) {
        for (i, entry) in self.entries.iter().enumerate() {
            if !self.is_leaf() {
                self.children[i].scan_into(out);
            }
            if !entry.postings.is_empty() {
                out.push((entry.key.clone(), entry.postings.clone()));
            }
        }
        if !self.is_leaf() {
            if let Some(last) = self.children.last() {
                last.scan_into(out);
            }
        }
    }
}

/// B-tree index over one column
#[derive(Debug, Clone)]
pub struct BTreeIndex {
    root: Node,
    unique: bool,
}

impl BTreeIndex {
    /// Create a new empty index
    pub fn new(unique: bool) -> Self {
        Self {
            root: Node::leaf(),
            unique,
        }
    }

    /// Does this index enforce uniqueness?
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Insert a (value, position) pair.
    ///
    /// A unique index rejects a second posting for the same non-null value
    /// with no state change; NULL values never conflict.
    pub fn insert(&mut self, key: Value, position: usize) -> Result<()> {
        if self.unique && !key.is_null() && !self.search(&key).is_empty() {
            return Err(Error::DuplicateIndexValue(key.to_string()));
        }

        if self.root.is_full() {
            let old_root = std::mem::take(&mut self.root);
            self.root = Node {
                entries: Vec::new(),
                children: vec![old_root],
            };
            self.root.split_child(0);
        }
        self.root.insert_non_full(key, position);
        Ok(())
    }

    /// Look up the posting list for a value.
    ///
    /// Returns a copy so later index mutations cannot invalidate the
    /// caller's view; empty when the value is absent.
    pub fn search(&self, key: &Value) -> Vec<usize> {
        let mut node = &self.root;
        loop {
            match node.find(key) {
                Ok(idx) => return node.entries[idx].postings.clone(),
                Err(idx) => {
                    if node.is_leaf() {
                        return Vec::new();
                    }
                    node = &node.children[idx];
                }
            }
        }
    }

    /// Check whether any row position is associated with a value
    pub fn contains(&self, key: &Value) -> bool {
        !self.search(key).is_empty()
    }

    /// Remove one (value, position) pair. The tree is never restructured by
    /// removal.
    pub fn remove(&mut self, key: &Value, position: usize) {
        self.root.remove(key, position);
    }

    /// Replace the tree contents with the given pairs
    pub fn rebuild(&mut self, pairs: Vec<(Value, usize)>) -> Result<()> {
        self.root = Node::leaf();
        for (key, position) in pairs {
            self.insert(key, position)?;
        }
        Ok(())
    }

    /// All (value, posting-list) pairs in key order
    pub fn scan(&self) -> Vec<(Value, Vec<usize>)> {
        let mut out = Vec::new();
        self.root.scan_into(&mut out);
        out
    }

    /// Number of levels from root to leaf
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = &self.root;
        while !node.is_leaf() {
            height += 1;
            node = &node.children[0];
        }
        height
    }
}
