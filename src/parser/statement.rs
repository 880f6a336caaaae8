//! Statement definitions
//!
//! The structured, tagged output of the parser. The engine interprets these
//! directly; nothing is re-matched as text after parsing.

use std::fmt;

use crate::schema::{Column, Value};

/// One parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    CreateIndex(CreateIndex),
    DropTable(DropTable),
    Insert(Insert),
    Select(Select),
    Update(Update),
    Delete(Delete),
}

impl Statement {
    /// Short statement kind, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::CreateTable(_) => "CREATE TABLE",
            Statement::CreateIndex(_) => "CREATE INDEX",
            Statement::DropTable(_) => "DROP TABLE",
            Statement::Insert(_) => "INSERT",
            Statement::Select(_) => "SELECT",
            Statement::Update(_) => "UPDATE",
            Statement::Delete(_) => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: String,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTable {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    /// Explicit column list; `None` maps values positionally to the schema
    pub columns: Option<Vec<String>>,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,
    pub projection: Projection,
    pub join: Option<Join>,
    pub predicate: Option<Predicate>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<Assignment>,
    pub predicate: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,
    pub predicate: Option<Predicate>,
}

// =============================================================================
// Clauses
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*`
    All,
    Columns(Vec<ColumnRef>),
}

/// `[table.]column`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn bare(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.column),
            None => f.write_str(&self.column),
        }
    }
}

/// `INNER JOIN table ON from_table.left_column = table.right_column`
///
/// `left_column` always belongs to the FROM table, `right_column` to the
/// joined table, whichever order the ON clause wrote them in.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: String,
    pub left_column: String,
    pub right_column: String,
}

/// Conjunction of comparisons (`a AND b AND ...`)
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub terms: Vec<Comparison>,
}

/// `column op literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub column: ColumnRef,
    pub op: CompareOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::LtEq => "<=",
            CompareOp::GtEq => ">=",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: ColumnRef,
    pub descending: bool,
}

/// `column = literal` in an UPDATE
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Value,
}
