//! Storage Module
//!
//! Durable table state, one self-describing JSON document per table.
//!
//! ## Responsibilities
//! - Persist the full row log (tombstones included) with the schema
//! - Atomic replace on save so a crash never leaves a half-written table
//! - Detect malformed or tampered documents on load
//!
//! ## File Format (V1)
//! ```text
//! {data_dir}/users.json
//! ┌──────────────────────────────────────────────────────────┐
//! │ format_version: 1                                        │
//! │ name:           "users"                                  │
//! │ columns:        [{name, data_type, constraint}, ...]     │
//! │ rows:           [{deleted, values: [1, "A", null]}, ...] │
//! │ metadata:       {row_count, checksum (CRC32 of rows)}    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Indexes are derived state and are never written.

mod document;
mod manager;

pub use manager::StorageManager;
