//! Index Module
//!
//! In-memory hash indexes over table columns.
//!
//! ## Responsibilities
//! - O(1) average equality lookups from value to row positions
//! - Incremental maintenance on every insert / update / delete
//! - Never persisted: indexes are derived and rebuilt after a load
//!
//! ## Layout
//! ```text
//! ┌──────────────────────────┐      ┌──────────────────────────┐
//! │ entries (forward)        │      │ positions (reverse)      │
//! │  Value ──► {pos, pos..}  │      │  pos ──► Value           │
//! └──────────────────────────┘      └──────────────────────────┘
//! ```

mod hash_index;
mod manager;

pub use hash_index::HashIndex;
pub use manager::IndexManager;
