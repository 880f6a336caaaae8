//! Query Results
//!
//! What `execute` hands back to the prompt or service embedding the engine.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::schema::Value;

/// Outcome of one statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum QueryResult {
    /// SELECT output
    Rows(ResultSet),

    /// Rows touched by INSERT / UPDATE / DELETE (0 for CREATE TABLE)
    Affected(usize),

    /// Void success (DROP TABLE, CREATE INDEX)
    Empty,
}

impl QueryResult {
    pub fn rows(&self) -> Option<&ResultSet> {
        match self {
            QueryResult::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn into_rows(self) -> Option<ResultSet> {
        match self {
            QueryResult::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn affected(&self) -> Option<usize> {
        match self {
            QueryResult::Affected(n) => Some(*n),
            _ => None,
        }
    }
}

/// Ordered rows with named columns
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultSet {
    /// Column names, in projection order
    pub columns: Vec<String>,

    /// One value per column for each row
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at `row` for column `name`
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let column = self.column_index(name)?;
        self.rows.get(row)?.get(column)
    }

    /// Every value of one column, in row order
    pub fn column_values(&self, name: &str) -> Vec<&Value> {
        match self.column_index(name) {
            Some(column) => self.rows.iter().map(|row| &row[column]).collect(),
            None => Vec::new(),
        }
    }

    /// Rows as column name → value mappings
    pub fn records(&self) -> Vec<BTreeMap<String, Value>> {
        self.rows
            .iter()
            .map(|row| self.columns.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }
}
