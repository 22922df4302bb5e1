//! Template value status of property values and links

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Where the content of a property value or link comes from
///
/// Documents written before the status existed carry no attribute; those
/// values are read as [`TemplateValueStatus::Defined`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateValueStatus {
    /// Content is set on this part
    #[default]
    Defined,

    /// Content is taken from the template chain
    Inherited,

    /// Content is intentionally left open at this template level
    Undefined,
}

impl TemplateValueStatus {
    /// Next status in the switching cycle
    ///
    /// Objects using a template cycle `DEFINED → INHERITED → UNDEFINED →
    /// DEFINED`. A template has nothing above it to inherit from and
    /// toggles `DEFINED ↔ UNDEFINED`.
    #[inline]
    #[must_use]
    pub fn next(self, is_template: bool) -> Self {
        match (self, is_template) {
            (Self::Defined, false) => Self::Inherited,
            (Self::Defined, true) | (Self::Inherited, _) => Self::Undefined,
            (Self::Undefined, _) => Self::Defined,
        }
    }

    /// Statuses reachable for an object
    #[inline]
    #[must_use]
    pub fn allowed(is_template: bool) -> &'static [Self] {
        if is_template {
            &[Self::Defined, Self::Undefined]
        } else {
            &[Self::Defined, Self::Inherited, Self::Undefined]
        }
    }

    /// Status as written in documents
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Defined => "DEFINED",
            Self::Inherited => "INHERITED",
            Self::Undefined => "UNDEFINED",
        }
    }
}

impl Display for TemplateValueStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
