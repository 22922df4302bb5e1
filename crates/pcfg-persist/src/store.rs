//! Document store
//!
//! One document per configuration object under the documents directory,
//! one product type per file under the types directory. The store remembers
//! which file each loaded object came from so saving writes it back in
//! place and in its original format.

use crate::config::ProjectConfig;
use crate::document::{ConfigurationDocument, DocumentFormat};
use crate::error::PersistError;
use crate::header::{DocumentHeader, HeaderCache};
use parking_lot::RwLock;
use pcfg_model::{ConfigurationObject, QualifiedName, Repository};
use pcfg_typedef::{ProductType, TypeRegistry};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Files written and removed by [`DocumentStore::save_dirty`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Documents written
    pub written: Vec<PathBuf>,
    /// Documents of removed objects that were deleted
    pub removed: Vec<PathBuf>,
}

impl SaveReport {
    /// Check if nothing was touched
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.written.is_empty() && self.removed.is_empty()
    }
}

/// File-backed storage of one project
#[derive(Debug)]
pub struct DocumentStore {
    config: ProjectConfig,
    headers: HeaderCache,
    locations: RwLock<HashMap<QualifiedName, PathBuf>>,
}

impl DocumentStore {
    /// Create store over the directories of `config`
    #[must_use]
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            config,
            headers: HeaderCache::new(),
            locations: RwLock::new(HashMap::new()),
        }
    }

    /// Project configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Header cache
    #[inline]
    #[must_use]
    pub fn headers(&self) -> &HeaderCache {
        &self.headers
    }

    /// File an object is stored in
    ///
    /// Objects not loaded from disk get `<documents_dir>/<name>.<ext>` in the
    /// configured format.
    #[must_use]
    pub fn document_path(&self, name: &QualifiedName) -> PathBuf {
        if let Some(path) = self.locations.read().get(name) {
            return path.clone();
        }
        self.config
            .documents_dir
            .join(format!("{name}.{}", self.config.format.extension()))
    }

    /// Document files under the documents directory, sorted by path
    ///
    /// # Errors
    /// Returns error if a directory cannot be read
    pub fn list_documents(&self) -> Result<Vec<PathBuf>, PersistError> {
        list_files(&self.config.documents_dir)
    }

    /// Headers of every document, sorted by path
    ///
    /// # Errors
    /// Returns error if a document cannot be read or parsed
    pub fn list_headers(&self) -> Result<Vec<(PathBuf, DocumentHeader)>, PersistError> {
        self.list_documents()?
            .into_iter()
            .map(|path| {
                let header = self.headers.get(&path)?;
                Ok((path, header))
            })
            .collect()
    }

    /// Path of the document holding `name`, using cached headers
    ///
    /// # Errors
    /// Returns error if a document cannot be read or parsed
    pub fn find_document(&self, name: &QualifiedName) -> Result<Option<PathBuf>, PersistError> {
        Ok(self
            .list_headers()?
            .into_iter()
            .find(|(_, header)| &header.name == name)
            .map(|(path, _)| path))
    }

    /// Read one document
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or turned into an
    /// object
    pub fn load_document(&self, path: &Path) -> Result<ConfigurationObject, PersistError> {
        let format = DocumentFormat::from_path(path)?;
        let text = fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
        let document: ConfigurationDocument = format.decode(&text)?;
        let object = document.into_object()?;
        self.locations
            .write()
            .insert(object.name().clone(), path.to_path_buf());
        Ok(object)
    }

    /// Read every document into a repository
    ///
    /// Loaded objects start clean.
    ///
    /// # Errors
    /// Returns error if a document fails to load or two documents describe
    /// the same object
    pub fn load_repository(&self) -> Result<Repository, PersistError> {
        let mut repository = Repository::new();
        let mut seen: HashMap<QualifiedName, PathBuf> = HashMap::new();
        for path in self.list_documents()? {
            let object = self.load_document(&path)?;
            if let Some(first) = seen.get(object.name()) {
                return Err(PersistError::DuplicateObject {
                    name: object.name().clone(),
                    first: first.clone(),
                    second: path,
                });
            }
            seen.insert(object.name().clone(), path);
            repository.insert(object);
        }
        tracing::info!(
            objects = repository.len(),
            dir = %self.config.documents_dir.display(),
            "loaded repository"
        );
        Ok(repository)
    }

    /// Write one object
    ///
    /// # Errors
    /// Returns error if the document cannot be encoded or written
    pub fn save(&self, object: &ConfigurationObject) -> Result<PathBuf, PersistError> {
        let path = self.document_path(object.name());
        let format = DocumentFormat::from_path(&path)?;
        let text = format.encode(&ConfigurationDocument::from_object(object))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PersistError::io(parent, e))?;
        }
        fs::write(&path, text).map_err(|e| PersistError::io(&path, e))?;
        self.headers.invalidate(&path);
        self.locations
            .write()
            .insert(object.name().clone(), path.clone());
        tracing::debug!(object = %object.name(), path = %path.display(), "saved document");
        Ok(path)
    }

    /// Write every dirty object and mark it clean
    ///
    /// Dirty names no longer in the repository had their object removed;
    /// their document is deleted.
    ///
    /// # Errors
    /// Returns error on the first failed write; objects saved before stay
    /// clean, the rest stay dirty
    pub fn save_dirty(&self, repository: &Repository) -> Result<SaveReport, PersistError> {
        let ctx = repository.context();
        let mut report = SaveReport::default();
        for name in ctx.dirty_objects() {
            if let Some(object) = repository.get(&name) {
                report.written.push(self.save(object)?);
            } else if let Some(path) = self.locations.write().remove(&name) {
                if path.exists() {
                    fs::remove_file(&path).map_err(|e| PersistError::io(&path, e))?;
                    self.headers.invalidate(&path);
                    report.removed.push(path);
                }
            }
            ctx.mark_clean(&name);
        }
        if !report.is_empty() {
            tracing::info!(
                written = report.written.len(),
                removed = report.removed.len(),
                "saved dirty objects"
            );
        }
        Ok(report)
    }

    /// Read every type file into a registry
    ///
    /// A missing types directory yields an empty registry.
    ///
    /// # Errors
    /// Returns error if a type file cannot be read or parsed, or two files
    /// declare the same type
    pub fn load_types(&self) -> Result<TypeRegistry, PersistError> {
        let mut registry = TypeRegistry::new();
        if !self.config.types_dir.exists() {
            tracing::warn!(dir = %self.config.types_dir.display(), "types directory missing");
            return Ok(registry);
        }
        for path in list_files(&self.config.types_dir)? {
            let format = DocumentFormat::from_path(&path)?;
            let text = fs::read_to_string(&path).map_err(|e| PersistError::io(&path, e))?;
            let product_type: ProductType = format.decode(&text)?;
            registry.register(product_type)?;
        }
        tracing::info!(types = registry.len(), "loaded product types");
        Ok(registry)
    }
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>, PersistError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| PersistError::io(&dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| PersistError::io(&dir, e))?.path();
            if path.is_dir() {
                pending.push(path);
            } else if DocumentFormat::is_document(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}
