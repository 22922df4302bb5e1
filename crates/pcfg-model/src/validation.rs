//! Validation messages
//!
//! Validation never fails an operation; it accumulates [`Message`]s that
//! point at the offending object, container or property.

use crate::container::ContainerRef;
use crate::name::QualifiedName;
use std::fmt::{self, Display, Formatter};

/// Stable message codes reported by model validation
pub mod codes {
    /// Two generations share a `valid_from`
    pub const DUPLICATE_GENERATION_VALID_FROM: &str = "GEN-DUPLICATE-VALID-FROM";
    /// A generation has no `valid_from`
    pub const GENERATION_WITHOUT_VALID_FROM: &str = "GEN-MISSING-VALID-FROM";
    /// A generation starts after the object's `valid_to`
    pub const GENERATION_AFTER_VALID_TO: &str = "GEN-AFTER-VALID-TO";
    /// A changing-over-time object has no generations
    pub const NO_GENERATIONS: &str = "OBJ-NO-GENERATIONS";
    /// An object that is not changing over time holds generations
    pub const UNEXPECTED_GENERATIONS: &str = "OBJ-UNEXPECTED-GENERATIONS";
    /// A link's cardinality range is inconsistent
    pub const INCONSISTENT_CARDINALITY: &str = "LINK-INCONSISTENT-CARDINALITY";
}

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational
    Info,
    /// Suspicious but usable
    Warning,
    /// Invalid state
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Location a message refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidProperty {
    /// Object
    pub object: QualifiedName,
    /// Container within the object, if narrower than the object
    pub container: Option<ContainerRef>,
    /// Property or attribute name, if narrower than the container
    pub property: Option<String>,
}

impl InvalidProperty {
    /// Whole object
    #[inline]
    #[must_use]
    pub fn object(object: &QualifiedName) -> Self {
        Self {
            object: object.clone(),
            container: None,
            property: None,
        }
    }

    /// A named property of the object or one of its containers
    #[inline]
    #[must_use]
    pub fn property(
        object: &QualifiedName,
        container: Option<ContainerRef>,
        property: impl Into<String>,
    ) -> Self {
        Self {
            object: object.clone(),
            container,
            property: Some(property.into()),
        }
    }
}

/// A validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Stable message code
    pub code: &'static str,
    /// Severity
    pub severity: Severity,
    /// Human-readable text
    pub text: String,
    /// Offending locations
    pub invalid: Vec<InvalidProperty>,
}

impl Message {
    /// Create message
    #[inline]
    #[must_use]
    pub fn new(code: &'static str, severity: Severity, text: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            text: text.into(),
            invalid: Vec::new(),
        }
    }

    /// Error message
    #[inline]
    #[must_use]
    pub fn error(code: &'static str, text: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, text)
    }

    /// Warning message
    #[inline]
    #[must_use]
    pub fn warning(code: &'static str, text: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, text)
    }

    /// Attach an offending location
    #[inline]
    #[must_use]
    pub fn at(mut self, location: InvalidProperty) -> Self {
        self.invalid.push(location);
        self
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.text)
    }
}

/// Accumulated validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageList(Vec<Message>);

impl MessageList {
    /// Create empty list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message
    #[inline]
    pub fn add(&mut self, message: Message) {
        self.0.push(message);
    }

    /// Append all messages of another list
    #[inline]
    pub fn extend(&mut self, other: MessageList) {
        self.0.extend(other.0);
    }

    /// Number of messages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no messages
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate messages
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.0.iter()
    }

    /// Highest severity, `None` if empty
    #[inline]
    #[must_use]
    pub fn max_severity(&self) -> Option<Severity> {
        self.0.iter().map(|m| m.severity).max()
    }

    /// Check for at least one error
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.max_severity() == Some(Severity::Error)
    }

    /// Messages with a code
    pub fn by_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Message> {
        self.0.iter().filter(move |m| m.code == code)
    }

    /// Check for a message code
    #[inline]
    #[must_use]
    pub fn contains_code(&self, code: &str) -> bool {
        self.by_code(code).next().is_some()
    }
}

impl IntoIterator for MessageList {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
