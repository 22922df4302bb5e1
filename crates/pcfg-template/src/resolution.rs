//! Outcome of resolving effective content
//!
//! Resolution never fails. A broken template chain degrades to the last
//! locally known content and says so through [`Resolution::Fallback`].

use pcfg_model::QualifiedName;
use std::fmt::{self, Display, Formatter};

/// Where resolved content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Stored on the part itself (`DEFINED`)
    Local,
    /// Empty content of an `UNDEFINED` part
    Undefined,
    /// Defined by a template in the chain
    Template(QualifiedName),
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Undefined => f.write_str("undefined"),
            Self::Template(name) => write!(f, "template {name}"),
        }
    }
}

/// Why the chain could not be followed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// Part is `INHERITED` but the object uses no template
    NoTemplate,
    /// Template reference is dangling
    MissingTemplate(QualifiedName),
    /// Template has no counterpart for the part
    MissingTemplateValue(QualifiedName),
    /// Template chain loops back to the named object
    TemplateCycle(QualifiedName),
}

impl Display for FallbackReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTemplate => f.write_str("object uses no template"),
            Self::MissingTemplate(name) => write!(f, "template {name} not found"),
            Self::MissingTemplateValue(name) => write!(f, "template {name} has no matching value"),
            Self::TemplateCycle(name) => write!(f, "template chain loops at {name}"),
        }
    }
}

/// Effective content of a property value or link
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// Resolved normally
    Resolved {
        /// Effective content
        value: T,
        /// Where it comes from
        origin: Origin,
    },
    /// Degraded to the last locally known content
    Fallback {
        /// Locally retained content
        value: T,
        /// Why the chain could not be followed
        reason: FallbackReason,
    },
    /// The part no longer exists
    NotApplicable,
}

impl<T> Resolution<T> {
    /// Effective content, `None` if not applicable
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Resolved { value, .. } | Self::Fallback { value, .. } => Some(value),
            Self::NotApplicable => None,
        }
    }

    /// Take the effective content
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Resolved { value, .. } | Self::Fallback { value, .. } => Some(value),
            Self::NotApplicable => None,
        }
    }

    /// Check for degraded resolution
    #[inline]
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Map the content, keeping origin or reason
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Self::Resolved { value, origin } => Resolution::Resolved {
                value: f(value),
                origin,
            },
            Self::Fallback { value, reason } => Resolution::Fallback {
                value: f(value),
                reason,
            },
            Self::NotApplicable => Resolution::NotApplicable,
        }
    }
}
