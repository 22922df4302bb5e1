//! Document headers and their cache
//!
//! A header is the identity part of a document. Listing a project only
//! needs headers, so they are read without building the object and cached
//! per path. Each entry remembers the fingerprint of the bytes it was read
//! from; a changed file is read again.

use crate::document::DocumentFormat;
use crate::error::PersistError;
use crate::hash::ContentHash;
use parking_lot::Mutex;
use pcfg_model::QualifiedName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Identity of a stored configuration object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeader {
    /// Object name
    pub name: QualifiedName,
    /// Product type
    #[serde(rename = "type")]
    pub type_name: QualifiedName,
    /// Template reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<QualifiedName>,
    /// Whether the object acts as template
    #[serde(default)]
    pub is_template: bool,
    /// Hash of the document bytes the header was read from
    #[serde(skip)]
    pub fingerprint: Option<ContentHash>,
}

impl DocumentHeader {
    /// Read the header fields of a document
    ///
    /// # Errors
    /// Returns error if the text is not a document of `format`
    pub fn parse(text: &str, format: DocumentFormat) -> Result<Self, PersistError> {
        let mut header: Self = format.decode(text)?;
        header.fingerprint = Some(ContentHash::compute(text.as_bytes()));
        Ok(header)
    }

    /// Read the header of a document file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn read(path: &Path) -> Result<Self, PersistError> {
        let format = DocumentFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
        Self::parse(&text, format)
    }
}

/// Headers by document path
#[derive(Debug, Default)]
pub struct HeaderCache {
    entries: Mutex<HashMap<PathBuf, DocumentHeader>>,
}

impl HeaderCache {
    /// Create empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Header of the document at `path`, read again if the file changed
    ///
    /// Parsing happens outside the lock. Two callers may parse the same
    /// file concurrently; both store an equal header.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn get(&self, path: &Path) -> Result<DocumentHeader, PersistError> {
        let format = DocumentFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
        let fingerprint = ContentHash::compute(text.as_bytes());

        if let Some(header) = self.lookup(path, fingerprint) {
            return Ok(header);
        }

        let header = DocumentHeader::parse(&text, format)?;
        let mut entries = self.entries.lock();
        if let Some(cached) = entries.get(path) {
            if cached.fingerprint == Some(fingerprint) {
                return Ok(cached.clone());
            }
        }
        tracing::debug!(path = %path.display(), fingerprint = %fingerprint.short(), "cached document header");
        entries.insert(path.to_path_buf(), header.clone());
        Ok(header)
    }

    fn lookup(&self, path: &Path, fingerprint: ContentHash) -> Option<DocumentHeader> {
        self.entries
            .lock()
            .get(path)
            .filter(|h| h.fingerprint == Some(fingerprint))
            .cloned()
    }

    /// Drop the entry of one path
    pub fn invalidate(&self, path: &Path) {
        self.entries.lock().remove(path);
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of cached headers
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
