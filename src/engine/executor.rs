//! Statement Executor
//!
//! One handler per statement kind. Mutating handlers follow the same shape:
//!
//! ```text
//! bind ──► validate ──► mutate in memory ──► save document
//!                                               │
//!                                   failure ────┴──► undo in-memory change
//! ```
//!
//! Nothing is touched until validation passes, and a failed save rolls the
//! table back, so memory and disk never disagree after a statement returns.

use crate::error::{Result, TabulaError};
use crate::parser::{
    Assignment, CreateIndex, CreateTable, Delete, DropTable, Insert, Join, Select, Statement,
    Update,
};
use crate::schema::validator;
use crate::schema::{Table, Value};
use crate::storage::StorageManager;

use super::join::{join_positions, JoinStrategy};
use super::predicate::{compare_rows, BoundPredicate, Scope};
use super::{Database, QueryResult, ResultSet};

pub(crate) fn run(db: &mut Database, statement: Statement) -> Result<QueryResult> {
    match statement {
        Statement::CreateTable(s) => create_table(db, s),
        Statement::CreateIndex(s) => create_index(db, s),
        Statement::DropTable(s) => drop_table(db, s),
        Statement::Insert(s) => insert(db, s),
        Statement::Select(s) => select(db, s),
        Statement::Update(s) => update(db, s),
        Statement::Delete(s) => delete(db, s),
    }
}

// =============================================================================
// DDL
// =============================================================================

fn create_table(db: &mut Database, statement: CreateTable) -> Result<QueryResult> {
    let CreateTable { name, columns } = statement;

    if !StorageManager::is_valid_name(&name) {
        return Err(TabulaError::InvalidSchema {
            table: name,
            reason: "table names must be identifiers".to_string(),
        });
    }
    if db.table_exists(&name) {
        return Err(TabulaError::DuplicateTable(name));
    }
    validator::validate_schema(&name, &columns)?;

    let mut table = Table::new(name, columns);
    db.build_eager_indexes(&mut table);
    db.storage().save(&table)?;

    tracing::info!(
        table = table.name(),
        columns = table.columns().len(),
        "Created table"
    );
    db.register(table);
    Ok(QueryResult::Affected(0))
}

fn drop_table(db: &mut Database, statement: DropTable) -> Result<QueryResult> {
    let name = statement.name;
    if !db.table_exists(&name) {
        return Err(TabulaError::UnknownTable(name));
    }

    db.storage().remove(&name)?;
    db.unregister(&name);

    tracing::info!(table = %name, "Dropped table");
    Ok(QueryResult::Empty)
}

fn create_index(db: &mut Database, statement: CreateIndex) -> Result<QueryResult> {
    let table = db.table_mut(&statement.table)?;
    if table.create_index(&statement.column)? {
        tracing::info!(table = %statement.table, column = %statement.column, "Created index");
    }
    Ok(QueryResult::Empty)
}

// =============================================================================
// DML
// =============================================================================

fn insert(db: &mut Database, statement: Insert) -> Result<QueryResult> {
    let (table, storage) = db.table_and_storage(&statement.table)?;

    let values = bind_insert_values(table, statement.columns, statement.values)?;
    validator::validate_for_insert(table, &values)?;

    let position = table.append(values);
    if let Err(e) = storage.save(table) {
        tracing::warn!(table = table.name(), error = %e, "Save failed, discarding inserted row");
        table.discard_last();
        return Err(e);
    }

    tracing::debug!(table = table.name(), position, "Inserted row");
    Ok(QueryResult::Affected(1))
}

fn update(db: &mut Database, statement: Update) -> Result<QueryResult> {
    let lazy = db.config().lazy_indexing;
    let (table, storage) = db.table_and_storage(&statement.table)?;

    let changes = bind_assignments(table, statement.assignments)?;
    let predicate = BoundPredicate::bind(statement.predicate.as_ref(), &Scope::single(table))?;
    let positions = matching_positions(table, &predicate);

    validator::validate_update_batch(table, &positions, &changes)?;
    if positions.is_empty() {
        if lazy {
            build_lazy_index(table, &predicate);
        }
        return Ok(QueryResult::Affected(0));
    }

    let previous: Vec<(usize, Vec<Value>)> = positions
        .iter()
        .map(|&position| (position, table.update_row(position, &changes)))
        .collect();

    if let Err(e) = storage.save(table) {
        tracing::warn!(table = table.name(), error = %e, "Save failed, restoring updated rows");
        for (position, values) in previous.into_iter().rev() {
            table.restore_row(position, values);
        }
        return Err(e);
    }

    if lazy {
        build_lazy_index(table, &predicate);
    }
    tracing::debug!(table = table.name(), rows = positions.len(), "Updated rows");
    Ok(QueryResult::Affected(positions.len()))
}

fn delete(db: &mut Database, statement: Delete) -> Result<QueryResult> {
    let lazy = db.config().lazy_indexing;
    let (table, storage) = db.table_and_storage(&statement.table)?;

    let predicate = BoundPredicate::bind(statement.predicate.as_ref(), &Scope::single(table))?;
    let positions = matching_positions(table, &predicate);
    if positions.is_empty() {
        if lazy {
            build_lazy_index(table, &predicate);
        }
        return Ok(QueryResult::Affected(0));
    }

    for &position in &positions {
        table.mark_deleted(position);
    }

    if let Err(e) = storage.save(table) {
        tracing::warn!(table = table.name(), error = %e, "Save failed, restoring deleted rows");
        for &position in &positions {
            table.unmark_deleted(position);
        }
        return Err(e);
    }

    if lazy {
        build_lazy_index(table, &predicate);
    }
    tracing::debug!(table = table.name(), rows = positions.len(), "Deleted rows");
    Ok(QueryResult::Affected(positions.len()))
}

// =============================================================================
// SELECT
// =============================================================================

/// Resolved output shape shared by single-table and join queries
struct Shape {
    projection: Vec<usize>,
    order: Vec<(usize, bool)>,
    limit: Option<usize>,
}

impl Shape {
    fn bind(select: &Select, scope: &Scope) -> Result<Self> {
        Ok(Self {
            projection: scope.bind_projection(&select.projection)?,
            order: scope.bind_order(&select.order_by)?,
            limit: select.limit,
        })
    }

    /// Sort (stable), truncate and project matched rows
    fn apply<R: AsRef<[Value]>>(&self, mut rows: Vec<R>, scope: &Scope) -> ResultSet {
        if !self.order.is_empty() {
            rows.sort_by(|a, b| compare_rows(a.as_ref(), b.as_ref(), &self.order));
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }

        ResultSet {
            columns: self.projection.iter().map(|&i| scope.output_name(i)).collect(),
            rows: rows
                .iter()
                .map(|row| {
                    let row = row.as_ref();
                    self.projection.iter().map(|&i| row[i].clone()).collect()
                })
                .collect(),
        }
    }
}

fn select(db: &mut Database, statement: Select) -> Result<QueryResult> {
    let rows = match &statement.join {
        Some(join) => select_join(db, &statement, join)?,
        None => select_single(db, &statement)?,
    };
    Ok(QueryResult::Rows(rows))
}

fn select_single(db: &mut Database, statement: &Select) -> Result<ResultSet> {
    let lazy = db.config().lazy_indexing;
    let table = db.table_mut(&statement.table)?;

    let scope = Scope::single(table);
    let predicate = BoundPredicate::bind(statement.predicate.as_ref(), &scope)?;
    let shape = Shape::bind(statement, &scope)?;

    if lazy {
        build_lazy_index(table, &predicate);
    }
    let positions = matching_positions(table, &predicate);
    let rows: Vec<&[Value]> = positions
        .iter()
        .filter_map(|&p| table.row(p))
        .map(|row| row.values())
        .collect();

    Ok(shape.apply(rows, &scope))
}

fn select_join(db: &mut Database, statement: &Select, join: &Join) -> Result<ResultSet> {
    db.ensure_resident(&statement.table)?;
    db.ensure_resident(&join.table)?;
    let left = db.resident(&statement.table)?;
    let right = db.resident(&join.table)?;

    let left_column = left.require_column(&join.left_column)?;
    let right_column = right.require_column(&join.right_column)?;

    let scope = Scope::joined(left, right);
    let predicate = BoundPredicate::bind(statement.predicate.as_ref(), &scope)?;
    let shape = Shape::bind(statement, &scope)?;

    let rows: Vec<Vec<Value>> = join_positions(left, left_column, right, right_column, JoinStrategy::Auto)
        .into_iter()
        .filter_map(|(l, r)| {
            let combined: Vec<Value> = left
                .row(l)?
                .values()
                .iter()
                .chain(right.row(r)?.values())
                .cloned()
                .collect();
            predicate.matches(&combined).then_some(combined)
        })
        .collect();

    Ok(shape.apply(rows, &scope))
}

// =============================================================================
// Binding Helpers
// =============================================================================

/// Build an index on the column of the first equality term.
///
/// Mutating statements call this only once they have succeeded, so a failed
/// statement leaves the table's indexes as they were.
fn build_lazy_index(table: &mut Table, predicate: &BoundPredicate) {
    if let Some(term) = predicate.leading_equality() {
        if table.ensure_index(term.column) {
            tracing::debug!(
                table = table.name(),
                column = %table.column(term.column).name,
                "Built index lazily"
            );
        }
    }
}

/// Live positions satisfying `predicate`, ascending.
///
/// The first equality term is served by a hash index when one exists.
fn matching_positions(table: &Table, predicate: &BoundPredicate) -> Vec<usize> {
    if let Some(term) = predicate.leading_equality() {
        if let Some(index) = table.indexes().get(term.column) {
            tracing::debug!(table = table.name(), "Index lookup");
            return index
                .lookup_sorted(&term.value)
                .into_iter()
                .filter(|&p| table.row(p).is_some_and(|row| predicate.matches(row.values())))
                .collect();
        }
    }

    tracing::debug!(table = table.name(), "Full scan");
    table
        .live_rows()
        .filter(|(_, row)| predicate.matches(row.values()))
        .map(|(position, _)| position)
        .collect()
}

/// Build a full schema-order row from INSERT values, widening integer
/// literals bound for FLOAT columns
fn bind_insert_values(
    table: &Table,
    columns: Option<Vec<String>>,
    values: Vec<Value>,
) -> Result<Vec<Value>> {
    let width = table.columns().len();

    let row = match columns {
        None => {
            if values.len() != width {
                return Err(TabulaError::ColumnCountMismatch {
                    table: table.name().to_string(),
                    expected: width,
                    found: values.len(),
                });
            }
            values
        }
        Some(names) => {
            if names.len() != values.len() {
                return Err(TabulaError::ColumnCountMismatch {
                    table: table.name().to_string(),
                    expected: names.len(),
                    found: values.len(),
                });
            }

            let mut row = vec![Value::Null; width];
            let mut assigned = vec![false; width];
            for (name, value) in names.iter().zip(values) {
                let column = table.require_column(name)?;
                if std::mem::replace(&mut assigned[column], true) {
                    return Err(TabulaError::DuplicateColumn {
                        table: table.name().to_string(),
                        column: name.clone(),
                    });
                }
                row[column] = value;
            }
            row
        }
    };

    Ok(row
        .into_iter()
        .zip(table.columns())
        .map(|(value, column)| value.coerce_to(column.data_type))
        .collect())
}

/// Resolve SET targets to (column, value) changes
fn bind_assignments(table: &Table, assignments: Vec<Assignment>) -> Result<Vec<(usize, Value)>> {
    let mut changes: Vec<(usize, Value)> = Vec::with_capacity(assignments.len());

    for Assignment { column, value } in assignments {
        let index = table.require_column(&column)?;
        if changes.iter().any(|(c, _)| *c == index) {
            return Err(TabulaError::DuplicateColumn {
                table: table.name().to_string(),
                column,
            });
        }
        changes.push((index, value.coerce_to(table.column(index).data_type)));
    }

    Ok(changes)
}
