//! Configuration for Tabula
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, TabulaError};

/// Main configuration for a Tabula database context
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all table documents
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── users.json          (one document per table)
    ///     └── users.json.tmp      (only during a save)
    pub data_dir: PathBuf,

    /// Pretty-print table documents (indented JSON)
    pub pretty_documents: bool,

    // -------------------------------------------------------------------------
    // Index Configuration
    // -------------------------------------------------------------------------
    /// Column names that are indexed eagerly in every table that has them
    pub indexed_columns: Vec<String>,

    /// Eagerly index PRIMARY KEY and UNIQUE columns
    pub index_constrained_columns: bool,

    /// Build an index the first time a column is used for an equality lookup
    pub lazy_indexing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./tabula_data"),
            pretty_documents: true,
            indexed_columns: Vec::new(),
            index_constrained_columns: true,
            lazy_indexing: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Whether `column` is configured for eager indexing
    pub fn is_indexable(&self, column: &str) -> bool {
        self.indexed_columns.iter().any(|c| c == column)
    }

    /// Reject settings no database could run with
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(TabulaError::Config("data_dir must not be empty".to_string()));
        }

        if let Some(bad) = self.indexed_columns.iter().find(|c| !is_identifier(c)) {
            return Err(TabulaError::Config(format!(
                "indexed column '{}' is not a valid column name",
                bad
            )));
        }

        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all table documents)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Pretty-print (true) or compact (false) table documents
    pub fn pretty_documents(mut self, pretty: bool) -> Self {
        self.config.pretty_documents = pretty;
        self
    }

    /// Add a column name to index eagerly
    pub fn index_column(mut self, column: impl Into<String>) -> Self {
        self.config.indexed_columns.push(column.into());
        self
    }

    /// Replace the set of eagerly indexed column names
    pub fn indexed_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.indexed_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable eager indexing of PRIMARY KEY / UNIQUE columns
    pub fn index_constrained_columns(mut self, enabled: bool) -> Self {
        self.config.index_constrained_columns = enabled;
        self
    }

    /// Enable or disable lazy index builds on equality lookups
    pub fn lazy_indexing(mut self, enabled: bool) -> Self {
        self.config.lazy_indexing = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
