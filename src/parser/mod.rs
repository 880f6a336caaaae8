//! Parser Module
//!
//! Turns statement text into a structured [`Statement`].
//!
//! ## Pipeline
//! ```text
//!   "SELECT * FROM t WHERE id = 1"
//!                 │
//!                 ▼
//!   ┌──────────────────────────┐
//!   │  Lexer                   │  chars → positioned tokens
//!   └────────────┬─────────────┘
//!                ▼
//!   ┌──────────────────────────┐
//!   │  Parser (grammar)        │  tokens → Statement
//!   └────────────┬─────────────┘
//!                ▼
//!   Statement::Select { table, projection, join, predicate, .. }
//! ```
//!
//! ## Limitations
//! WHERE accepts only `column op literal` terms joined by AND. OR and
//! parentheses are rejected with a syntax error rather than guessed at.
//!
//! Keywords and type names are reserved, so a column named `text` or `key`
//! does not parse.

mod grammar;
mod lexer;
mod statement;

pub use grammar::{parse, Parser};
pub use lexer::{Lexer, Spanned, Token};
pub use statement::{
    Assignment, ColumnRef, CompareOp, Comparison, CreateIndex, CreateTable, Delete, DropTable,
    Insert, Join, OrderBy, Predicate, Projection, Select, Statement, Update,
};
