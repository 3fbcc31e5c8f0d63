//! Archive builder
//!
//! Accumulates named byte blobs in insertion order and emits them as one
//! zip. Names are unique, entries are never removed, and the final listing
//! reproduces append order exactly; one archive belongs to exactly one
//! in-flight request.

use courier_common::{Error, Result};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One named blob inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// In-memory, append-only archive.
#[derive(Debug, Default)]
pub struct Archive {
    entries: Vec<ArchiveEntry>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. A duplicate name is a programming error upstream
    /// and is rejected rather than silently replaced.
    pub fn add(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Result<()> {
        let name = name.into();
        if self.entries.iter().any(|e| e.name == name) {
            return Err(Error::Internal(format!("duplicate archive entry: {name}")));
        }
        self.entries.push(ArchiveEntry { name, bytes });
        Ok(())
    }

    /// Entry names in append order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to zip bytes, entries in append order.
    pub fn into_zip(self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &self.entries {
            writer
                .start_file(entry.name.as_str(), options)
                .map_err(|e| Error::Internal(format!("zip entry {}: {}", entry.name, e)))?;
            writer.write_all(&entry.bytes)?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| Error::Internal(format!("zip finish: {}", e)))?;
        Ok(cursor.into_inner())
    }
}
