//! Table Document
//!
//! The self-describing on-disk form of one table.
//!
//! A document is only turned back into a [`Table`] after every structural
//! check passes; a bad file never yields a half-initialized table.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabulaError};
use crate::schema::{validator, Column, Constraint, Row, Table, Value};

/// Current document format version
pub(crate) const FORMAT_VERSION: u16 = 1;

/// Borrowed view written by `save` (avoids cloning the row log)
#[derive(Serialize)]
pub(crate) struct DocumentRef<'a> {
    format_version: u16,
    name: &'a str,
    columns: &'a [Column],
    rows: &'a [Row],
    metadata: Metadata,
}

/// Owned form read by `load`
#[derive(Deserialize)]
pub(crate) struct Document {
    format_version: u16,
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    metadata: Metadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Metadata {
    row_count: usize,
    /// CRC32 of the compact JSON encoding of `rows`
    checksum: u32,
}

impl<'a> DocumentRef<'a> {
    pub(crate) fn new(table: &'a Table) -> Result<Self> {
        Ok(Self {
            format_version: FORMAT_VERSION,
            name: table.name(),
            columns: table.columns(),
            rows: table.rows(),
            metadata: Metadata {
                row_count: table.row_count(),
                checksum: rows_checksum(table.rows())?,
            },
        })
    }
}

impl Document {
    /// Validate the document and rebuild the table it describes
    pub(crate) fn into_table(self, expected_name: &str) -> Result<Table> {
        let corrupt = |reason: String| TabulaError::corrupt(expected_name, reason);

        if self.format_version != FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported format version {}",
                self.format_version
            )));
        }

        if self.name != expected_name {
            return Err(corrupt(format!("document describes table '{}'", self.name)));
        }

        validator::validate_schema(&self.name, &self.columns).map_err(|e| corrupt(e.to_string()))?;

        if self.metadata.row_count != self.rows.len() {
            return Err(corrupt(format!(
                "metadata row_count {} but {} rows present",
                self.metadata.row_count,
                self.rows.len()
            )));
        }

        let checksum = rows_checksum(&self.rows)?;
        if checksum != self.metadata.checksum {
            return Err(corrupt(format!(
                "checksum mismatch: stored {:#010x}, computed {:#010x}",
                self.metadata.checksum, checksum
            )));
        }

        check_rows(&self.columns, &self.rows).map_err(corrupt)?;

        Ok(Table::from_rows(self.name, self.columns, self.rows))
    }
}

/// CRC32 over the compact JSON encoding of the row log
pub(crate) fn rows_checksum(rows: &[Row]) -> Result<u32> {
    let bytes = serde_json::to_vec(rows).map_err(|e| TabulaError::Serialization(e.to_string()))?;
    Ok(crc32fast::hash(&bytes))
}

/// Arity, types, and uniqueness among live rows
fn check_rows(columns: &[Column], rows: &[Row]) -> std::result::Result<(), String> {
    let mut seen: Vec<HashSet<&Value>> = vec![HashSet::new(); columns.len()];

    for (position, row) in rows.iter().enumerate() {
        if row.values().len() != columns.len() {
            return Err(format!(
                "row {} has {} values, schema has {} columns",
                position,
                row.values().len(),
                columns.len()
            ));
        }

        for (column, value) in columns.iter().zip(row.values()) {
            if !value.conforms_to(column.data_type) {
                return Err(format!(
                    "row {} column '{}' holds {} but is declared {}",
                    position,
                    column.name,
                    value.type_name(),
                    column.data_type
                ));
            }
        }

        if row.is_deleted() {
            continue;
        }

        for (i, (column, value)) in columns.iter().zip(row.values()).enumerate() {
            let constrained = match column.constraint {
                Constraint::PrimaryKey => true,
                Constraint::Unique => !value.is_null(),
                Constraint::None => false,
            };
            if constrained && !seen[i].insert(value) {
                return Err(format!(
                    "live rows share value {} in constrained column '{}'",
                    value, column.name
                ));
            }
        }
    }

    Ok(())
}
