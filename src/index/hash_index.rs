//! Hash Index
//!
//! Value → positions map over one column, with a reverse map so stale entries
//! can be removed on update/delete without rescanning the table.

use std::collections::{HashMap, HashSet};

use crate::schema::{Row, Value};

/// Hash index over a single column
#[derive(Debug, Clone)]
pub struct HashIndex {
    /// Column position in the table schema
    column: usize,

    /// Column name (for logging and inspection)
    column_name: String,

    /// Forward map: value → positions of live rows holding it
    entries: HashMap<Value, HashSet<usize>>,

    /// Reverse map: position → value currently indexed for it
    positions: HashMap<usize, Value>,
}

impl HashIndex {
    /// Create an empty index
    pub fn new(column: usize, column_name: impl Into<String>) -> Self {
        Self {
            column,
            column_name: column_name.into(),
            entries: HashMap::new(),
            positions: HashMap::new(),
        }
    }

    /// Build an index from a full scan, skipping tombstoned rows. O(n).
    pub fn build<'a, I>(column: usize, column_name: impl Into<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = (usize, &'a Row)>,
    {
        let mut index = Self::new(column, column_name);
        for (position, row) in rows {
            if row.is_deleted() {
                continue;
            }
            if let Some(value) = row.value(column) {
                index.on_insert(position, value.clone());
            }
        }
        tracing::debug!(
            column = %index.column_name,
            entries = index.len(),
            "Built hash index"
        );
        index
    }

    /// Positions of live rows holding `value`. O(1) average.
    pub fn lookup(&self, value: &Value) -> Option<&HashSet<usize>> {
        self.entries.get(value)
    }

    /// Positions holding `value`, sorted ascending
    pub fn lookup_sorted(&self, value: &Value) -> Vec<usize> {
        let mut positions: Vec<usize> = self
            .lookup(value)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        positions.sort_unstable();
        positions
    }

    /// Index a newly live row
    pub fn on_insert(&mut self, position: usize, value: Value) {
        if self.positions.contains_key(&position) {
            self.on_delete(position);
        }
        self.entries
            .entry(value.clone())
            .or_default()
            .insert(position);
        self.positions.insert(position, value);
    }

    /// Move a row from `old_value` to `new_value`.
    ///
    /// The reverse map is authoritative: the entry removed is the one indexed
    /// for `position`, even if it disagrees with `old_value`.
    pub fn on_update(&mut self, position: usize, old_value: &Value, new_value: Value) {
        if self
            .positions
            .get(&position)
            .is_some_and(|indexed| indexed != old_value)
        {
            tracing::warn!(
                column = %self.column_name,
                position,
                "Index entry drifted from row value; replacing indexed value"
            );
        }
        self.on_insert(position, new_value);
    }

    /// Drop a row from the index; returns the value it was indexed under
    pub fn on_delete(&mut self, position: usize) -> Option<Value> {
        let value = self.positions.remove(&position)?;
        self.remove_entry(&value, position);
        Some(value)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// Value currently indexed for `position`
    pub fn value_at(&self, position: usize) -> Option<&Value> {
        self.positions.get(&position)
    }

    /// Number of indexed positions
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of distinct indexed values
    pub fn distinct_values(&self) -> usize {
        self.entries.len()
    }

    fn remove_entry(&mut self, value: &Value, position: usize) {
        if let Some(set) = self.entries.get_mut(value) {
            set.remove(&position);
            if set.is_empty() {
                self.entries.remove(value);
            }
        }
    }
}
