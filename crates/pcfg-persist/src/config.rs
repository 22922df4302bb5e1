//! Project configuration
//!
//! Read from a TOML file; every field has a default so an empty file is a
//! valid configuration.

use crate::document::DocumentFormat;
use crate::error::PersistError;
use pcfg_delta::DeltaOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings of one configuration project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ProjectConfig {
    /// Directory of configuration documents
    pub documents_dir: PathBuf,
    /// Directory of product type files
    pub types_dir: PathBuf,
    /// Format new documents are written in
    pub format: DocumentFormat,
    /// Locale for plain/localized conversions
    pub default_locale: String,
    /// Currency for amount-to-money conversions
    pub default_currency: String,
    /// Whether fixes that delete stored data may run
    pub allow_destructive_fixes: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        let options = DeltaOptions::default();
        Self {
            documents_dir: PathBuf::from("documents"),
            types_dir: PathBuf::from("types"),
            format: DocumentFormat::Json,
            default_locale: options.default_locale,
            default_currency: options.default_currency,
            allow_destructive_fixes: false,
        }
    }
}

impl ProjectConfig {
    /// Parse configuration text
    ///
    /// # Errors
    /// Returns error if the text is not valid TOML for this structure
    pub fn from_toml(text: &str) -> Result<Self, PersistError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file, resolving relative directories against
    /// the file's directory
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, PersistError> {
        let text = std::fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
        let config = Self::from_toml(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.relative_to(base))
    }

    /// Resolve relative directories against `base`
    #[must_use]
    pub fn relative_to(mut self, base: &Path) -> Self {
        if self.documents_dir.is_relative() {
            self.documents_dir = base.join(&self.documents_dir);
        }
        if self.types_dir.is_relative() {
            self.types_dir = base.join(&self.types_dir);
        }
        self
    }

    /// Set documents directory
    #[must_use]
    pub fn with_documents_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.documents_dir = dir.into();
        self
    }

    /// Set type files directory
    #[must_use]
    pub fn with_types_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.types_dir = dir.into();
        self
    }

    /// Set document format
    #[must_use]
    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.format = format;
        self
    }

    /// Set default locale
    #[must_use]
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    /// Set default currency
    #[must_use]
    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    /// Allow or forbid destructive fixes
    #[must_use]
    pub fn with_destructive_fixes(mut self, allow: bool) -> Self {
        self.allow_destructive_fixes = allow;
        self
    }

    /// Options for the delta engine
    #[must_use]
    pub fn delta_options(&self) -> DeltaOptions {
        DeltaOptions::default()
            .with_default_locale(self.default_locale.as_str())
            .with_default_currency(self.default_currency.as_str())
    }
}
