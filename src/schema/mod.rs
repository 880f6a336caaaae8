//! Schema Module
//!
//! The data model shared by every other layer.
//!
//! ## Responsibilities
//! - Typed scalar values with tag-aware equality and ordering
//! - Column definitions with PRIMARY KEY / UNIQUE constraints
//! - The append-only row log of a table and its derived indexes
//! - Type and constraint validation before mutations

mod table;
mod value;
pub mod validator;

pub use table::{Column, Constraint, Row, Table};
pub use value::{DataType, Value};
