//! Table definitions
//!
//! Columns, rows and the in-memory table that owns them.
//!
//! Rows are an append-only log: a row's position is its index in `rows` and
//! never changes. DELETE only sets the tombstone flag.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabulaError};
use crate::index::{HashIndex, IndexManager};

use super::{DataType, Value};

/// Column constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Constraint {
    PrimaryKey,
    Unique,
    #[default]
    None,
}

impl Constraint {
    /// Whether values in this column must be unique among live rows
    pub fn is_unique(&self) -> bool {
        !matches!(self, Constraint::None)
    }
}

/// A column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub constraint: Constraint,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            constraint: Constraint::None,
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }
}

/// A stored row: values in schema order plus the tombstone flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    deleted: bool,
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            deleted: false,
            values,
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value(&self, column: usize) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

/// An in-memory table: schema, row log and the indexes derived from it
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    indexes: IndexManager,
}

impl Table {
    /// Create an empty table
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self::from_rows(name, columns, Vec::new())
    }

    /// Rebuild a table from persisted parts (no indexes)
    pub(crate) fn from_rows(name: impl Into<String>, columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
            indexes: IndexManager::new(),
        }
    }

    // =========================================================================
    // Schema
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Resolve a column name or fail with UnknownColumn
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| TabulaError::UnknownColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    pub fn primary_key(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.constraint == Constraint::PrimaryKey)
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// All rows, tombstones included, in position order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, position: usize) -> Option<&Row> {
        self.rows.get(position)
    }

    /// Live (non-deleted) rows with their positions
    pub fn live_rows(&self) -> impl Iterator<Item = (usize, &Row)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.deleted)
    }

    /// Total number of positions, tombstones included
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn live_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.deleted).count()
    }

    // =========================================================================
    // Indexes
    // =========================================================================

    pub fn indexes(&self) -> &IndexManager {
        &self.indexes
    }

    pub fn has_index(&self, column: &str) -> bool {
        self.column_index(column)
            .is_some_and(|c| self.indexes.contains(c))
    }

    /// Build an index on `column` if one does not exist yet.
    ///
    /// Returns true when a new index was built.
    pub fn create_index(&mut self, column: &str) -> Result<bool> {
        let column = self.require_column(column)?;
        Ok(self.ensure_index(column))
    }

    pub(crate) fn ensure_index(&mut self, column: usize) -> bool {
        if self.indexes.contains(column) {
            return false;
        }
        let index = HashIndex::build(column, &self.columns[column].name, self.live_rows());
        self.indexes.insert(index);
        true
    }

    // =========================================================================
    // Mutations (callers validate first)
    // =========================================================================

    /// Append a live row and index it; returns its position
    pub(crate) fn append(&mut self, values: Vec<Value>) -> usize {
        let position = self.rows.len();
        self.indexes.on_insert(position, &values);
        self.rows.push(Row::new(values));
        position
    }

    /// Undo the most recent append
    pub(crate) fn discard_last(&mut self) {
        if let Some(position) = self.rows.len().checked_sub(1) {
            self.indexes.on_delete(position);
            self.rows.pop();
        }
    }

    /// Apply `changes` to the row at `position`; returns the previous values
    pub(crate) fn update_row(&mut self, position: usize, changes: &[(usize, Value)]) -> Vec<Value> {
        let row = &mut self.rows[position];
        let previous = row.values.clone();
        for (column, value) in changes {
            row.values[*column] = value.clone();
        }
        self.indexes.on_update(position, &previous, &row.values);
        previous
    }

    /// Put back values captured by `update_row`
    pub(crate) fn restore_row(&mut self, position: usize, values: Vec<Value>) {
        let row = &mut self.rows[position];
        let current = std::mem::replace(&mut row.values, values);
        self.indexes.on_update(position, &current, &row.values);
    }

    /// Tombstone the row at `position` and drop it from every index
    pub(crate) fn mark_deleted(&mut self, position: usize) {
        self.rows[position].deleted = true;
        self.indexes.on_delete(position);
    }

    /// Undo `mark_deleted`
    pub(crate) fn unmark_deleted(&mut self, position: usize) {
        let row = &mut self.rows[position];
        row.deleted = false;
        self.indexes.on_insert(position, &row.values);
    }
}
