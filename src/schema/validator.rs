//! Constraint Validator
//!
//! Type and uniqueness checks run before any row is touched.
//!
//! ## Checks (in order)
//! 1. Every value's tag matches its column's declared type (Null always passes)
//! 2. PRIMARY KEY and UNIQUE columns among the new/changed values are not held
//!    by any other live row
//!
//! UNIQUE columns ignore Null. A PRIMARY KEY Null is an ordinary value and must
//! be unique like any other.

use crate::error::{Result, TabulaError};

use super::{Column, Constraint, Table, Value};

/// Check a table definition: at least one column, unique names, at most one
/// PRIMARY KEY
pub fn validate_schema(table: &str, columns: &[Column]) -> Result<()> {
    if columns.is_empty() {
        return Err(TabulaError::InvalidSchema {
            table: table.to_string(),
            reason: "a table needs at least one column".to_string(),
        });
    }

    for (i, column) in columns.iter().enumerate() {
        if columns[..i].iter().any(|c| c.name == column.name) {
            return Err(TabulaError::DuplicateColumn {
                table: table.to_string(),
                column: column.name.clone(),
            });
        }
    }

    let primary_keys = columns
        .iter()
        .filter(|c| c.constraint == Constraint::PrimaryKey)
        .count();
    if primary_keys > 1 {
        return Err(TabulaError::InvalidSchema {
            table: table.to_string(),
            reason: format!("{} PRIMARY KEY columns declared, at most one allowed", primary_keys),
        });
    }

    Ok(())
}

/// Validate a full row (schema order) about to be appended
pub fn validate_for_insert(table: &Table, values: &[Value]) -> Result<()> {
    if values.len() != table.columns().len() {
        return Err(TabulaError::ColumnCountMismatch {
            table: table.name().to_string(),
            expected: table.columns().len(),
            found: values.len(),
        });
    }

    for (column, value) in values.iter().enumerate() {
        check_type(table, column, value)?;
    }

    for (column, value) in values.iter().enumerate() {
        check_unique(table, column, value, None)?;
    }

    Ok(())
}

/// Validate changing `changes` on the live row at `position`.
///
/// The row itself is excluded from the uniqueness check.
pub fn validate_for_update(
    table: &Table,
    position: usize,
    changes: &[(usize, Value)],
) -> Result<()> {
    for (column, value) in changes {
        check_type(table, *column, value)?;
    }

    for (column, value) in changes {
        check_unique(table, *column, value, Some(position))?;
    }

    Ok(())
}

/// Validate applying the same `changes` to every row in `positions`.
///
/// Types are checked even when no row matches. Assigning one non-exempt value
/// to a constrained column on more than one row would duplicate it, so that is
/// rejected before any per-row check.
pub fn validate_update_batch(
    table: &Table,
    positions: &[usize],
    changes: &[(usize, Value)],
) -> Result<()> {
    for (column, value) in changes {
        check_type(table, *column, value)?;
    }

    if positions.len() > 1 {
        for (column, value) in changes {
            if is_constrained(table, *column, value) {
                return Err(violation(table, *column, value));
            }
        }
    }

    for &position in positions {
        validate_for_update(table, position, changes)?;
    }

    Ok(())
}

// =============================================================================
// Private Helpers
// =============================================================================

fn check_type(table: &Table, column: usize, value: &Value) -> Result<()> {
    let def = table.column(column);
    if value.conforms_to(def.data_type) {
        Ok(())
    } else {
        Err(TabulaError::TypeMismatch {
            column: def.name.clone(),
            expected: def.data_type,
            found: value.type_name(),
        })
    }
}

/// Whether `value` in `column` must be unique
fn is_constrained(table: &Table, column: usize, value: &Value) -> bool {
    match table.column(column).constraint {
        Constraint::PrimaryKey => true,
        Constraint::Unique => !value.is_null(),
        Constraint::None => false,
    }
}

fn check_unique(table: &Table, column: usize, value: &Value, exclude: Option<usize>) -> Result<()> {
    if !is_constrained(table, column, value) {
        return Ok(());
    }

    let taken = match table.indexes().get(column) {
        Some(index) => index
            .lookup(value)
            .is_some_and(|positions| positions.iter().any(|&p| Some(p) != exclude)),
        None => table
            .live_rows()
            .any(|(p, row)| Some(p) != exclude && row.value(column) == Some(value)),
    };

    if taken {
        Err(violation(table, column, value))
    } else {
        Ok(())
    }
}

fn violation(table: &Table, column: usize, value: &Value) -> TabulaError {
    TabulaError::ConstraintViolation {
        table: table.name().to_string(),
        column: table.column(column).name.clone(),
        value: value.clone(),
    }
}
