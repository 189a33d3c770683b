//! Record store: one JSON array of records per file.
//!
//! Files are read fully into memory and rewritten fully on save. Writes go to
//! a temp file in the destination directory and are renamed into place, so a
//! crash mid-save leaves the previous file intact.

use crate::errors::StoreError;
use crate::model::Record;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Ordered collection of records. Order is file order and is never changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Load a store from `path`.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let records: Vec<Record> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), records = records.len(), "loaded record store");
        Ok(Self { records })
    }

    /// Write the whole store to `path` (4-space indent, UTF-8 unescaped).
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let bytes = self.to_pretty_json().map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
        tmp.write_all(&bytes).map_err(|e| StoreError::io(path, e))?;
        tmp.flush().map_err(|e| StoreError::io(path, e))?;
        tmp.persist(path)
            .map_err(|e| StoreError::io(path, e.error))?;

        debug!(path = %path.display(), records = self.records.len(), "saved record store");
        Ok(())
    }

    fn to_pretty_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.records.serialize(&mut ser)?;
        Ok(buf)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}
