//! Property values
//!
//! A [`PropertyValue`] is the value a container assigns to one property
//! declared by the type definition. The concrete kinds form the closed
//! union [`PropertyValueContent`]; code dispatching on the kind matches
//! exhaustively on it.

use crate::name::PartId;
use crate::status::TemplateValueStatus;
use crate::value::ValueHolder;
use crate::value_set::ValueSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};

/// Concrete kind of a property value
///
/// The declaration order is the iteration order of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValueKind {
    /// Value of a product attribute
    AttributeValue,

    /// Reference to a table content
    TableContentUsage,

    /// Formula expression
    Formula,

    /// Activation of a validation rule
    ValidationRuleConfig,

    /// Default value of a policy attribute
    ConfiguredDefault,

    /// Allowed values of a policy attribute
    ConfiguredValueSet,
}

impl PropertyValueKind {
    /// All kinds in iteration order
    pub const ALL: [Self; 6] = [
        Self::AttributeValue,
        Self::TableContentUsage,
        Self::Formula,
        Self::ValidationRuleConfig,
        Self::ConfiguredDefault,
        Self::ConfiguredValueSet,
    ];

    /// Tag used in documents
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AttributeValue => "attribute_value",
            Self::TableContentUsage => "table_content_usage",
            Self::Formula => "formula",
            Self::ValidationRuleConfig => "validation_rule_config",
            Self::ConfiguredDefault => "configured_default",
            Self::ConfiguredValueSet => "configured_value_set",
        }
    }
}

impl Display for PropertyValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific content of a property value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyValueContent {
    /// Scalar or localized attribute content
    AttributeValue {
        /// Single or multi value
        value: ValueHolder,
    },

    /// Name of the referenced table content
    TableContentUsage {
        /// Table content, unset if absent
        #[serde(default)]
        table_content: Option<String>,
    },

    /// Formula expression
    Formula {
        /// Expression text, empty if not yet written
        #[serde(default)]
        expression: String,
    },

    /// Rule activation
    ValidationRuleConfig {
        /// Whether the rule is active
        active: bool,
    },

    /// Default value override
    ConfiguredDefault {
        /// Default value, `None` for null
        #[serde(default)]
        value: Option<String>,
    },

    /// Allowed-value-set override
    ConfiguredValueSet {
        /// The value set
        value_set: ValueSet,
    },
}

impl PropertyValueContent {
    /// Kind of this content
    #[inline]
    #[must_use]
    pub fn kind(&self) -> PropertyValueKind {
        match self {
            Self::AttributeValue { .. } => PropertyValueKind::AttributeValue,
            Self::TableContentUsage { .. } => PropertyValueKind::TableContentUsage,
            Self::Formula { .. } => PropertyValueKind::Formula,
            Self::ValidationRuleConfig { .. } => PropertyValueKind::ValidationRuleConfig,
            Self::ConfiguredDefault { .. } => PropertyValueKind::ConfiguredDefault,
            Self::ConfiguredValueSet { .. } => PropertyValueKind::ConfiguredValueSet,
        }
    }

    /// Empty content of a kind
    #[must_use]
    pub fn empty(kind: PropertyValueKind) -> Self {
        match kind {
            PropertyValueKind::AttributeValue => Self::AttributeValue {
                value: ValueHolder::empty(false),
            },
            PropertyValueKind::TableContentUsage => Self::TableContentUsage {
                table_content: None,
            },
            PropertyValueKind::Formula => Self::Formula {
                expression: String::new(),
            },
            PropertyValueKind::ValidationRuleConfig => Self::ValidationRuleConfig { active: false },
            PropertyValueKind::ConfiguredDefault => Self::ConfiguredDefault { value: None },
            PropertyValueKind::ConfiguredValueSet => Self::ConfiguredValueSet {
                value_set: ValueSet::Enum { values: Vec::new() },
            },
        }
    }

    /// Empty content of the same kind, keeping the holder shape of attributes
    #[must_use]
    pub fn emptied(&self) -> Self {
        match self {
            Self::AttributeValue { value } => Self::AttributeValue {
                value: ValueHolder::empty(value.is_multi()),
            },
            other => Self::empty(other.kind()),
        }
    }
}

impl Display for PropertyValueContent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttributeValue { value } => write!(f, "{value}"),
            Self::TableContentUsage { table_content } => {
                f.write_str(table_content.as_deref().unwrap_or("<none>"))
            }
            Self::Formula { expression } => f.write_str(expression),
            Self::ValidationRuleConfig { active } => {
                f.write_str(if *active { "active" } else { "inactive" })
            }
            Self::ConfiguredDefault { value } => f.write_str(value.as_deref().unwrap_or("<null>")),
            Self::ConfiguredValueSet { value_set } => write!(f, "{value_set}"),
        }
    }
}

/// Value of one property in a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyValue {
    id: PartId,
    property: String,
    status: TemplateValueStatus,
    content: PropertyValueContent,
}

impl PropertyValue {
    /// Create a defined value with a fresh part id
    #[inline]
    #[must_use]
    pub fn new(property: impl Into<String>, content: PropertyValueContent) -> Self {
        Self::with_id(PartId::generate(), property, content)
    }

    /// Create a defined value with a known part id
    #[inline]
    #[must_use]
    pub fn with_id(id: PartId, property: impl Into<String>, content: PropertyValueContent) -> Self {
        Self {
            id,
            property: property.into(),
            status: TemplateValueStatus::Defined,
            content,
        }
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

    /// Name of the property this value belongs to
    #[inline]
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Concrete kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> PropertyValueKind {
        self.content.kind()
    }

    /// Template value status
    #[inline]
    #[must_use]
    pub fn status(&self) -> TemplateValueStatus {
        self.status
    }

    /// Locally stored content
    ///
    /// This is the effective content only for `DEFINED` values; use the
    /// template resolver for the others.
    #[inline]
    #[must_use]
    pub fn content(&self) -> &PropertyValueContent {
        &self.content
    }

    /// Mutable locally stored content
    #[inline]
    pub fn content_mut(&mut self) -> &mut PropertyValueContent {
        &mut self.content
    }

    /// Replace locally stored content
    #[inline]
    pub fn set_content(&mut self, content: PropertyValueContent) {
        self.content = content;
    }

    /// Replace template value status
    #[inline]
    pub fn set_status(&mut self, status: TemplateValueStatus) {
        self.status = status;
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

    /// Attribute holder, if this is an attribute value
    #[inline]
    #[must_use]
    pub fn value_holder(&self) -> Option<&ValueHolder> {
        match &self.content {
            PropertyValueContent::AttributeValue { value } => Some(value),
            _ => None,
        }
    }
}

/// Structural reference to a declared property
///
/// Implemented by property declarations of the type model. A property may
/// need more than one value kind (a configurable policy attribute has a
/// default and a value set).
pub trait PropertyRef {
    /// Name of the property
    fn property_name(&self) -> &str;

    /// Value kinds this property is stored as
    fn value_kinds(&self) -> SmallVec<[PropertyValueKind; 2]>;

    /// Content of a freshly created value of `kind`
    fn initial_content(&self, kind: PropertyValueKind) -> PropertyValueContent {
        PropertyValueContent::empty(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueHolder;

    #[test]
    fn kind_order_matches_iteration_order() {
        let mut kinds = PropertyValueKind::ALL.to_vec();
        kinds.sort();
        assert_eq!(kinds, PropertyValueKind::ALL.to_vec());
        assert!(PropertyValueKind::AttributeValue < PropertyValueKind::ConfiguredDefault);
    }

    #[test]
    fn content_serde_is_tagged_by_kind() {
        let content = PropertyValueContent::Formula {
            expression: "a + b".to_string(),
        };
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["kind"], "formula");
        assert_eq!(json["expression"], "a + b");

        let attr: PropertyValueContent =
            serde_json::from_str(r#"{"kind":"attribute_value","value":["A","B"]}"#).unwrap();
        assert_eq!(
            attr,
            PropertyValueContent::AttributeValue {
                value: ValueHolder::multi(["A", "B"])
            }
        );
    }

    #[test]
    fn emptied_keeps_holder_shape() {
        let content = PropertyValueContent::AttributeValue {
            value: ValueHolder::multi(["A"]),
        };
        assert_eq!(
            content.emptied(),
            PropertyValueContent::AttributeValue {
                value: ValueHolder::Multi(vec![])
            }
        );
        let formula = PropertyValueContent::Formula {
            expression: "x".into(),
        };
        assert_eq!(formula.emptied().to_string(), "");
    }

    #[test]
    fn copy_gets_new_id() {
        let value = PropertyValue::new("risk", PropertyValueContent::empty(PropertyValueKind::Formula))
            .with_status(TemplateValueStatus::Inherited);
        let copy = value.copy_with_new_id();
        assert_ne!(copy.id(), value.id());
        assert_eq!(copy.property(), "risk");
        assert_eq!(copy.status(), TemplateValueStatus::Inherited);
    }
}
