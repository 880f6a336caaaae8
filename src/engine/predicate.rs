//! Predicate binding and evaluation
//!
//! Column references are resolved once against a [`Scope`] and literals are
//! bound to their column's type; evaluation then works on plain offsets.

use std::cmp::Ordering;

use crate::error::{Result, TabulaError};
use crate::parser::{ColumnRef, CompareOp, OrderBy, Predicate, Projection};
use crate::schema::{DataType, Table, Value};

/// One column visible to a statement
#[derive(Debug, Clone)]
struct ScopeColumn {
    table: String,
    name: String,
    data_type: DataType,
}

/// The columns visible to a statement, in combined-row order.
///
/// A single-table scope mirrors the table schema. A join scope is the left
/// table's columns followed by the right table's.
#[derive(Debug, Clone)]
pub struct Scope {
    columns: Vec<ScopeColumn>,
    joined: bool,
}

impl Scope {
    pub fn single(table: &Table) -> Self {
        Self {
            columns: Self::columns_of(table),
            joined: false,
        }
    }

    pub fn joined(left: &Table, right: &Table) -> Self {
        let mut columns = Self::columns_of(left);
        columns.extend(Self::columns_of(right));
        Self {
            columns,
            joined: true,
        }
    }

    fn columns_of(table: &Table) -> Vec<ScopeColumn> {
        table
            .columns()
            .iter()
            .map(|c| ScopeColumn {
                table: table.name().to_string(),
                name: c.name.clone(),
                data_type: c.data_type,
            })
            .collect()
    }

    pub fn data_type(&self, offset: usize) -> DataType {
        self.columns[offset].data_type
    }

    /// Result column name: bare for one table, `table.column` for a join
    pub fn output_name(&self, offset: usize) -> String {
        let column = &self.columns[offset];
        if self.joined {
            format!("{}.{}", column.table, column.name)
        } else {
            column.name.clone()
        }
    }

    /// Resolve a column reference to its offset in the combined row
    pub fn resolve(&self, reference: &ColumnRef) -> Result<usize> {
        if let Some(table) = &reference.table {
            if !self.columns.iter().any(|c| &c.table == table) {
                return Err(TabulaError::UnknownTable(table.clone()));
            }
            return self
                .columns
                .iter()
                .position(|c| &c.table == table && c.name == reference.column)
                .ok_or_else(|| TabulaError::UnknownColumn {
                    table: table.clone(),
                    column: reference.column.clone(),
                });
        }

        let mut matches = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.name == reference.column)
            .map(|(offset, _)| offset);

        match (matches.next(), matches.next()) {
            (Some(offset), None) => Ok(offset),
            (Some(_), Some(_)) => Err(TabulaError::AmbiguousColumn(reference.column.clone())),
            _ => Err(TabulaError::UnknownColumn {
                table: self.table_names(),
                column: reference.column.clone(),
            }),
        }
    }

    /// Offsets to project, in output order
    pub fn bind_projection(&self, projection: &Projection) -> Result<Vec<usize>> {
        match projection {
            Projection::All => Ok((0..self.columns.len()).collect()),
            Projection::Columns(refs) => refs.iter().map(|r| self.resolve(r)).collect(),
        }
    }

    /// (offset, descending) sort keys
    pub fn bind_order(&self, order_by: &[OrderBy]) -> Result<Vec<(usize, bool)>> {
        order_by
            .iter()
            .map(|o| Ok((self.resolve(&o.column)?, o.descending)))
            .collect()
    }

    fn table_names(&self) -> String {
        let mut names: Vec<&str> = Vec::new();
        for column in &self.columns {
            if !names.contains(&column.table.as_str()) {
                names.push(&column.table);
            }
        }
        names.join(", ")
    }
}

// =============================================================================
// Bound Predicate
// =============================================================================

/// `column op value` with the column resolved to an offset
#[derive(Debug, Clone)]
pub struct BoundTerm {
    pub column: usize,
    pub op: CompareOp,
    pub value: Value,
}

/// A resolved conjunction. An empty predicate matches every row.
#[derive(Debug, Clone, Default)]
pub struct BoundPredicate {
    terms: Vec<BoundTerm>,
}

impl BoundPredicate {
    pub fn bind(predicate: Option<&Predicate>, scope: &Scope) -> Result<Self> {
        let Some(predicate) = predicate else {
            return Ok(Self::default());
        };

        let terms = predicate
            .terms
            .iter()
            .map(|term| {
                let column = scope.resolve(&term.column)?;
                Ok(BoundTerm {
                    column,
                    op: term.op,
                    value: term.value.clone().coerce_to(scope.data_type(column)),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { terms })
    }

    /// The first equality term: the one an index lookup can serve
    pub fn leading_equality(&self) -> Option<&BoundTerm> {
        self.terms.iter().find(|t| t.op == CompareOp::Eq)
    }

    /// Every term holds for `values` (a row in scope order)
    pub fn matches(&self, values: &[Value]) -> bool {
        self.terms
            .iter()
            .all(|t| values.get(t.column).is_some_and(|v| t.op.evaluate(v, &t.value)))
    }
}

impl CompareOp {
    /// Tag-aware comparison: across tags only `!=` holds; `NULL = NULL` holds
    pub fn evaluate(&self, left: &Value, right: &Value) -> bool {
        match left.compare(right) {
            Some(ordering) => match self {
                CompareOp::Eq => ordering == Ordering::Equal,
                CompareOp::NotEq => ordering != Ordering::Equal,
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Gt => ordering == Ordering::Greater,
                CompareOp::LtEq => ordering != Ordering::Greater,
                CompareOp::GtEq => ordering != Ordering::Less,
            },
            None => *self == CompareOp::NotEq,
        }
    }
}

/// Compare two rows by `(offset, descending)` keys
pub fn compare_rows(a: &[Value], b: &[Value], order: &[(usize, bool)]) -> Ordering {
    for &(column, descending) in order {
        let ordering = a[column].sort_cmp(&b[column]);
        let ordering = if descending { ordering.reverse() } else { ordering };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
