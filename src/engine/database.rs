//! Database Context
//!
//! The one object a host holds: configuration, storage and the tables loaded
//! so far. Statements run against it through [`Database::execute`].

use std::collections::HashMap;
use std::path::Path;

use crate::config::Config;
use crate::error::{Result, TabulaError};
use crate::schema::Table;
use crate::storage::StorageManager;

use super::QueryResult;

/// A database rooted at one data directory
///
/// ## Table Residency
///
/// Tables are loaded from storage the first time a statement names them and
/// stay resident until dropped or evicted. Every mutation is persisted before
/// the statement returns, so evicting a table never loses data.
///
/// ## Concurrency
///
/// Statements take `&mut self`: one statement runs at a time and sees every
/// earlier one. Hosts that share a database across threads wrap it in a lock.
pub struct Database {
    /// Database configuration
    config: Config,

    /// Document storage in `config.data_dir`
    storage: StorageManager,

    /// Resident tables by name
    tables: HashMap<String, Table>,
}

impl Database {
    /// Open or create a database with the given config
    ///
    /// No tables are read here; they load on first use.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let storage = StorageManager::open(&config.data_dir, config.pretty_documents)?;

        tracing::info!(
            data_dir = %config.data_dir.display(),
            lazy_indexing = config.lazy_indexing,
            "Database opened"
        );

        Ok(Self {
            config,
            storage,
            tables: HashMap::new(),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Parse and execute one statement
    pub fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        super::execute(sql, self)
    }

    /// A table by name, loading it from storage if needed
    pub fn table(&mut self, name: &str) -> Result<&Table> {
        self.ensure_resident(name)?;
        self.resident(name)
    }

    /// Names of every table in the database, sorted
    pub fn table_names(&self) -> Result<Vec<String>> {
        self.storage.table_names()
    }

    /// Whether `name` is currently loaded
    pub fn is_resident(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Drop a table from memory. It reloads from storage on next use.
    pub fn evict(&mut self, name: &str) -> bool {
        let evicted = self.tables.remove(name).is_some();
        if evicted {
            tracing::debug!(table = name, "Evicted table");
        }
        evicted
    }

    /// Get configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get storage
    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    // =========================================================================
    // Crate-Internal Access (used by the executor)
    // =========================================================================

    /// Whether a table exists, resident or on disk
    pub(crate) fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name) || self.storage.exists(name)
    }

    /// Load `name` from storage unless it is already resident
    pub(crate) fn ensure_resident(&mut self, name: &str) -> Result<()> {
        if self.tables.contains_key(name) {
            return Ok(());
        }

        let mut table = self.storage.load(name)?;
        self.build_eager_indexes(&mut table);

        tracing::debug!(
            table = name,
            rows = table.row_count(),
            indexes = table.indexes().len(),
            "Loaded table"
        );
        self.tables.insert(name.to_string(), table);
        Ok(())
    }

    /// A resident table; call `ensure_resident` first
    pub(crate) fn resident(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| TabulaError::UnknownTable(name.to_string()))
    }

    pub(crate) fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.ensure_resident(name)?;
        self.tables
            .get_mut(name)
            .ok_or_else(|| TabulaError::UnknownTable(name.to_string()))
    }

    /// A table for mutation together with the storage that persists it
    pub(crate) fn table_and_storage(&mut self, name: &str) -> Result<(&mut Table, &StorageManager)> {
        self.ensure_resident(name)?;
        let table = self
            .tables
            .get_mut(name)
            .ok_or_else(|| TabulaError::UnknownTable(name.to_string()))?;
        Ok((table, &self.storage))
    }

    pub(crate) fn register(&mut self, table: Table) {
        self.tables.insert(table.name().to_string(), table);
    }

    pub(crate) fn unregister(&mut self, name: &str) -> Option<Table> {
        self.tables.remove(name)
    }

    /// Build the indexes configured up front: listed columns, plus PRIMARY KEY
    /// and UNIQUE columns when enabled
    pub(crate) fn build_eager_indexes(&self, table: &mut Table) {
        let wanted: Vec<usize> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                self.config.is_indexable(&c.name)
                    || (self.config.index_constrained_columns && c.constraint.is_unique())
            })
            .map(|(i, _)| i)
            .collect();

        for column in wanted {
            if table.ensure_index(column) {
                tracing::debug!(
                    table = table.name(),
                    column = %table.column(column).name,
                    "Built index"
                );
            }
        }
    }
}
