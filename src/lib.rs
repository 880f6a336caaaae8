//! # Tabula
//!
//! A small embeddable relational engine with:
//! - A SQL-like statement language (CREATE / INSERT / SELECT / UPDATE / DELETE)
//! - Equality joins between two tables
//! - PRIMARY KEY / UNIQUE constraints and column type checks
//! - Hash indexes kept in step with every mutation
//! - One JSON document per table, replaced atomically on every write
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │               Host (tabula-shell, service, ...)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ statement text
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Parser (lexer + grammar)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Statement
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │             Engine (executor, joins, predicates)            │
//! └──────────┬──────────────────┬──────────────────┬────────────┘
//!            │                  │                  │
//!            ▼                  ▼                  ▼
//!     ┌─────────────┐   ┌──────────────┐   ┌─────────────┐
//!     │  Validator  │   │ Tables +     │   │   Storage   │
//!     │             │   │ Hash Indexes │   │   (JSON)    │
//!     └─────────────┘   └──────────────┘   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use tabula::{Database, Result};
//!
//! fn main() -> Result<()> {
//!     let mut db = Database::open_path(std::path::Path::new("./data"))?;
//!     db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
//!     db.execute("INSERT INTO users VALUES (1, 'Ada')")?;
//!     let result = db.execute("SELECT name FROM users WHERE id = 1")?;
//!     println!("{:?}", result);
//!     Ok(())
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod schema;
pub mod index;
pub mod parser;
pub mod storage;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, TabulaError};
pub use config::Config;
pub use engine::{execute, Database, QueryResult, ResultSet};
pub use parser::{parse, Statement};
pub use schema::{DataType, Value};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Tabula
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
