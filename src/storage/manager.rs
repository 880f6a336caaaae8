//! Storage Manager
//!
//! Loads and saves whole tables as one JSON document each.
//!
//! ## Responsibilities
//! - Map table names to `{data_dir}/{name}.json`
//! - Crash-safe saves: write a temp file, fsync, rename over the real file
//! - Reject malformed documents with CorruptStorage
//! - Clean up temp files left behind by an interrupted save

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, TabulaError};
use crate::schema::Table;

use super::document::{Document, DocumentRef};

/// Manages the table documents in one data directory
pub struct StorageManager {
    /// Directory holding one document per table
    data_dir: PathBuf,

    /// Indent documents for human inspection
    pretty: bool,
}

impl StorageManager {
    const EXTENSION: &'static str = "json";
    const TEMP_EXTENSION: &'static str = "json.tmp";

    /// Open or create storage in the given directory
    ///
    /// On startup:
    /// 1. Create directory if it doesn't exist
    /// 2. Remove temp files from saves that never reached their rename
    pub fn open(path: &Path, pretty: bool) -> Result<Self> {
        fs::create_dir_all(path)?;

        let manager = Self {
            data_dir: path.to_path_buf(),
            pretty,
        };

        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.is_file() && Self::is_temp_file(&file_path) {
                tracing::warn!(path = %file_path.display(), "Removing stale temp file from interrupted save");
                fs::remove_file(&file_path)?;
            }
        }

        Ok(manager)
    }

    /// Whether a document exists for `name`
    pub fn exists(&self, name: &str) -> bool {
        Self::is_valid_name(name) && self.table_path(name).is_file()
    }

    /// Load a table from its document
    ///
    /// Returns:
    /// - `Err(UnknownTable)`: no document for this name
    /// - `Err(CorruptStorage)`: the document does not describe a valid table
    /// - `Err(Io)`: the file exists but could not be read
    pub fn load(&self, name: &str) -> Result<Table> {
        if !Self::is_valid_name(name) {
            return Err(TabulaError::UnknownTable(name.to_string()));
        }

        let path = self.table_path(name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TabulaError::UnknownTable(name.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(TabulaError::corrupt(name, "document is not valid UTF-8"))
            }
            Err(e) => return Err(e.into()),
        };

        let document: Document = serde_json::from_str(&contents)
            .map_err(|e| TabulaError::corrupt(name, format!("malformed document: {}", e)))?;

        let result = document.into_table(name);
        match &result {
            Ok(table) => tracing::debug!(table = name, rows = table.row_count(), "Read table document"),
            Err(e) => tracing::warn!(table = name, error = %e, "Failed to load table"),
        }
        result
    }

    /// Save a table atomically
    ///
    /// Steps:
    /// 1. Serialize the document
    /// 2. Write and fsync `{name}.json.tmp`
    /// 3. Rename it over `{name}.json`
    ///
    /// A failure at any step leaves the previous document untouched.
    pub fn save(&self, table: &Table) -> Result<()> {
        let document = DocumentRef::new(table)?;
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&document)
        } else {
            serde_json::to_vec(&document)
        }
        .map_err(|e| TabulaError::Serialization(e.to_string()))?;

        let temp_path = self.temp_path(table.name());
        let final_path = self.table_path(table.name());

        if let Err(e) = Self::write_synced(&temp_path, &bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &final_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        self.sync_dir();

        tracing::debug!(
            table = table.name(),
            rows = table.row_count(),
            bytes = bytes.len(),
            "Saved table"
        );
        Ok(())
    }

    /// Delete a table's document. Returns false if there was none.
    pub fn remove(&self, name: &str) -> Result<bool> {
        if !Self::is_valid_name(name) {
            return Ok(false);
        }
        match fs::remove_file(self.table_path(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of all stored tables, sorted
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.data_dir)? {
            let file_path = entry?.path();
            if !file_path.is_file() || Self::is_temp_file(&file_path) {
                continue;
            }
            if let Some(name) = Self::parse_table_name(&file_path) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the document for `name`
    pub fn table_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", name, Self::EXTENSION))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn temp_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", name, Self::TEMP_EXTENSION))
    }

    fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }

    /// Persist the rename itself. Not every platform can open a directory.
    fn sync_dir(&self) {
        if let Err(e) = File::open(&self.data_dir).and_then(|dir| dir.sync_all()) {
            tracing::trace!(error = %e, "Directory fsync unavailable");
        }
    }

    /// Table names are identifiers; anything else could escape the data dir
    pub fn is_valid_name(name: &str) -> bool {
        let mut chars = name.chars();
        matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_')
    }

    fn is_temp_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&format!(".{}", Self::TEMP_EXTENSION)))
    }

    /// "users.json" → Some("users")
    fn parse_table_name(path: &Path) -> Option<String> {
        if path.extension()?.to_str()? != Self::EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        Self::is_valid_name(stem).then(|| stem.to_string())
    }
}
