//! Index Manager
//!
//! Owns every index of one table and fans row events out to them.
//!
//! ## Responsibilities
//! - Track which columns are indexed
//! - Keep every index current on insert / update / delete
//! - Only touch indexes whose column value actually changed

use std::collections::HashMap;

use crate::schema::Value;

use super::HashIndex;

/// The indexes of a single table, keyed by column position
#[derive(Debug, Clone, Default)]
pub struct IndexManager {
    indexes: HashMap<usize, HashIndex>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: usize) -> Option<&HashIndex> {
        self.indexes.get(&column)
    }

    pub fn contains(&self, column: usize) -> bool {
        self.indexes.contains_key(&column)
    }

    /// Register an index, replacing any existing one for its column
    pub fn insert(&mut self, index: HashIndex) {
        self.indexes.insert(index.column(), index);
    }

    /// Indexed column positions, ascending
    pub fn columns(&self) -> Vec<usize> {
        let mut columns: Vec<usize> = self.indexes.keys().copied().collect();
        columns.sort_unstable();
        columns
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    // =========================================================================
    // Row Events
    // =========================================================================

    /// A row became live at `position` with `values` (schema order)
    pub fn on_insert(&mut self, position: usize, values: &[Value]) {
        for index in self.indexes.values_mut() {
            if let Some(value) = values.get(index.column()) {
                index.on_insert(position, value.clone());
            }
        }
    }

    /// A live row changed from `old` to `new`
    pub fn on_update(&mut self, position: usize, old: &[Value], new: &[Value]) {
        for index in self.indexes.values_mut() {
            let column = index.column();
            match (old.get(column), new.get(column)) {
                (Some(before), Some(after)) if before != after => {
                    index.on_update(position, before, after.clone());
                }
                _ => {}
            }
        }
    }

    /// A row at `position` was tombstoned
    pub fn on_delete(&mut self, position: usize) {
        for index in self.indexes.values_mut() {
            index.on_delete(position);
        }
    }
}
