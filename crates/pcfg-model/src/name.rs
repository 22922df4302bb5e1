//! Identities of configuration objects and their parts
//!
//! Provides [`QualifiedName`] for addressing configuration objects and
//! [`PartId`] for the stable identity of parts (generations, property
//! values, links) inside one object.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Dot-separated name of a configuration object or product type
///
/// # Examples
/// - `["products", "motor", "Gold"]` → `products.motor.Gold`
/// - `["Gold"]` → `Gold` (default package)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName(Vec<String>);

impl QualifiedName {
    /// Create name from segments
    ///
    /// # Errors
    /// Returns error if there are no segments or a segment is invalid
    pub fn new(segments: Vec<String>) -> Result<Self, NameError> {
        if segments.is_empty() {
            return Err(NameError::Empty);
        }
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self(segments))
    }

    /// Get name segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Name without the package part
    #[inline]
    #[must_use]
    pub fn unqualified_name(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    /// Package part (empty string for the default package)
    #[inline]
    #[must_use]
    pub fn package(&self) -> String {
        self.0[..self.0.len() - 1].join(".")
    }

    /// Sibling name in the same package
    ///
    /// # Errors
    /// Returns error if `name` is not a valid segment
    pub fn sibling(&self, name: &str) -> Result<Self, NameError> {
        validate_segment(name)?;
        let mut segments = self.0.clone();
        if let Some(last) = segments.last_mut() {
            *last = name.to_string();
        }
        Ok(Self(segments))
    }

    /// Join segments with custom separator
    #[inline]
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

fn validate_segment(segment: &str) -> Result<(), NameError> {
    if segment.is_empty() {
        Err(NameError::EmptySegment)
    } else if segment.contains(|c: char| !c.is_alphanumeric() && c != '_' && c != '-') {
        Err(NameError::InvalidSegment(segment.to_string()))
    } else {
        Ok(())
    }
}

impl Display for QualifiedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for QualifiedName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NameError::Empty);
        }
        Self::new(s.split('.').map(str::to_string).collect())
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> Self {
        name.to_string()
    }
}

/// Stable identity of a part within a configuration object
///
/// Preserved across load/save; freshly generated parts get a random id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(String);

impl PartId {
    /// Wrap an existing id (e.g. read from a document)
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Id as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PartId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors related to qualified names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// Name without any segment
    #[error("qualified name is empty")]
    Empty,

    /// Empty segment in name
    #[error("qualified name contains empty segment")]
    EmptySegment,

    /// Invalid segment characters
    #[error("invalid segment: {0} (must be alphanumeric, '_' or '-')")]
    InvalidSegment(String),
}
