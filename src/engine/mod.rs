//! Engine Module
//!
//! Executes parsed statements against a [`Database`].
//!
//! ## Responsibilities
//! - Resolve statements against table schemas
//! - Route single-column equality lookups through hash indexes
//! - Execute equality joins without nested scans
//! - Validate, apply and persist mutations, rolling back on save failure
//!
//! ## Statement Flow
//! ```text
//! text ──► parser::parse ──► Statement ──► executor ──► QueryResult
//!                                              │
//!                            ┌─────────────────┼─────────────────┐
//!                            ▼                 ▼                 ▼
//!                       validator         Table + indexes     StorageManager
//! ```

mod database;
mod executor;
mod join;
mod predicate;
mod result;

pub use database::Database;
pub use join::{join_positions, JoinStrategy};
pub use result::{QueryResult, ResultSet};

use crate::error::Result;
use crate::parser::{parse, Statement};

/// Parse and execute one statement against `db`
pub fn execute(sql: &str, db: &mut Database) -> Result<QueryResult> {
    let statement = parse(sql)?;
    execute_statement(statement, db)
}

/// Execute an already-parsed statement
pub fn execute_statement(statement: Statement, db: &mut Database) -> Result<QueryResult> {
    tracing::debug!(kind = statement.kind(), "Executing statement");
    executor::run(db, statement)
}
