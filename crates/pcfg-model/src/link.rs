//! Links between configuration objects

use crate::name::{PartId, QualifiedName};
use crate::status::TemplateValueStatus;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Cardinality range of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cardinality {
    /// Minimum number of instances
    pub min: u32,
    /// Maximum number of instances, unbounded if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    /// Default number of instances
    #[serde(default)]
    pub default: u32,
}

impl Cardinality {
    /// Cardinality of an undefined link (`0..0`)
    pub const UNDEFINED: Self = Self {
        min: 0,
        max: Some(0),
        default: 0,
    };

    /// Optional single instance (`0..1`)
    pub const OPTIONAL: Self = Self {
        min: 0,
        max: Some(1),
        default: 0,
    };

    /// Mandatory single instance (`1..1`)
    pub const MANDATORY: Self = Self {
        min: 1,
        max: Some(1),
        default: 1,
    };

    /// Create cardinality
    #[inline]
    #[must_use]
    pub fn new(min: u32, max: Option<u32>, default: u32) -> Self {
        Self { min, max, default }
    }

    /// Check `min <= default <= max`
    #[inline]
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.min <= self.default && self.max.map_or(true, |max| self.default <= max)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::OPTIONAL
    }
}

impl Display for Cardinality {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..*", self.min),
        }
    }
}

/// Structural reference from a container to another configuration object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    id: PartId,
    association: String,
    target: QualifiedName,
    cardinality: Cardinality,
    status: TemplateValueStatus,
}

impl Link {
    /// Create a defined link with a fresh part id
    #[inline]
    #[must_use]
    pub fn new(association: impl Into<String>, target: QualifiedName) -> Self {
        Self::with_id(PartId::generate(), association, target)
    }

    /// Create a defined link with a known part id
    #[inline]
    #[must_use]
    pub fn with_id(id: PartId, association: impl Into<String>, target: QualifiedName) -> Self {
        Self {
            id,
            association: association.into(),
            target,
            cardinality: Cardinality::default(),
            status: TemplateValueStatus::Defined,
        }
    }

    /// Set cardinality
    #[inline]
    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Set template value status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: TemplateValueStatus) -> Self {
        self.status = status;
        self
    }

    /// Part identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> &PartId {
        &self.id
    }

    /// Association name
    #[inline]
    #[must_use]
    pub fn association(&self) -> &str {
        &self.association
    }

    /// Target object
    #[inline]
    #[must_use]
    pub fn target(&self) -> &QualifiedName {
        &self.target
    }

    /// Locally stored cardinality
    #[inline]
    #[must_use]
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Template value status
    #[inline]
    #[must_use]
    pub fn status(&self) -> TemplateValueStatus {
        self.status
    }

    /// Replace cardinality
    #[inline]
    pub fn set_cardinality(&mut self, cardinality: Cardinality) {
        self.cardinality = cardinality;
    }

    /// Replace template value status
    #[inline]
    pub fn set_status(&mut self, status: TemplateValueStatus) {
        self.status = status;
    }

    /// Check if this link points along `association` to `target`
    #[inline]
    #[must_use]
    pub fn matches(&self, association: &str, target: &QualifiedName) -> bool {
        self.association == association && &self.target == target
    }

    /// Structural copy with a fresh part id
    #[inline]
    #[must_use]
    pub fn copy_with_new_id(&self) -> Self {
        Self {
            id: PartId::generate(),
            ..self.clone()
        }
    }
}
