//! Property and association declarations

use crate::datatype::Datatype;
use pcfg_model::{
    Cardinality, PropertyRef, PropertyValueContent, PropertyValueKind, SingleValue, ValueHolder,
    ValueSet, ValueSetKind,
};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::fmt::{self, Display, Formatter};

fn default_true() -> bool {
    true
}

/// Kind of a declared property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// Attribute configured per product
    ProductAttribute,
    /// Policy attribute with configurable default and value set
    PolicyAttribute,
    /// Usage of a table structure
    TableStructureUsage,
    /// Formula signature
    Formula,
    /// Business validation rule
    ValidationRule,
}

impl PropertyKind {
    /// Value kinds a property of this kind is stored as
    #[must_use]
    pub fn value_kinds(self) -> SmallVec<[PropertyValueKind; 2]> {
        match self {
            Self::ProductAttribute => smallvec![PropertyValueKind::AttributeValue],
            Self::PolicyAttribute => smallvec![
                PropertyValueKind::ConfiguredDefault,
                PropertyValueKind::ConfiguredValueSet
            ],
            Self::TableStructureUsage => smallvec![PropertyValueKind::TableContentUsage],
            Self::Formula => smallvec![PropertyValueKind::Formula],
            Self::ValidationRule => smallvec![PropertyValueKind::ValidationRuleConfig],
        }
    }

    /// Check if values carry attribute content with a datatype
    #[inline]
    #[must_use]
    pub fn is_attribute(self) -> bool {
        matches!(self, Self::ProductAttribute | Self::PolicyAttribute)
    }
}

impl Display for PropertyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ProductAttribute => "product attribute",
            Self::PolicyAttribute => "policy attribute",
            Self::TableStructureUsage => "table structure usage",
            Self::Formula => "formula",
            Self::ValidationRule => "validation rule",
        })
    }
}

/// A property declared by a product type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDeclaration {
    /// Property name
    pub name: String,
    /// Property kind
    pub kind: PropertyKind,
    /// Datatype of attribute content
    #[serde(default = "default_datatype")]
    pub datatype: Datatype,
    /// Allowed values
    #[serde(default)]
    pub value_set: ValueSet,
    /// Whether values live in generations
    #[serde(default = "default_true")]
    pub changing_over_time: bool,
    /// Abstract declarations are never instantiated
    #[serde(default)]
    pub is_abstract: bool,
    /// Hidden attributes always carry the declared default
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Attribute holds a list of values
    #[serde(default)]
    pub multi_value: bool,
    /// Attribute holds localized text
    #[serde(default)]
    pub multilingual: bool,
    /// Default attribute value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Initial activation of a validation rule
    #[serde(default)]
    pub activated_by_default: bool,
}

fn default_datatype() -> Datatype {
    Datatype::String
}

impl PropertyDeclaration {
    /// Declare a property
    #[must_use]
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            datatype: Datatype::String,
            value_set: ValueSet::unrestricted(),
            changing_over_time: true,
            is_abstract: false,
            visible: true,
            multi_value: false,
            multilingual: false,
            default_value: None,
            activated_by_default: false,
        }
    }

    /// Product attribute of a datatype
    #[inline]
    #[must_use]
    pub fn attribute(name: impl Into<String>, datatype: Datatype) -> Self {
        Self::new(name, PropertyKind::ProductAttribute).with_datatype(datatype)
    }

    /// Policy attribute of a datatype
    #[inline]
    #[must_use]
    pub fn policy_attribute(name: impl Into<String>, datatype: Datatype) -> Self {
        Self::new(name, PropertyKind::PolicyAttribute).with_datatype(datatype)
    }

    /// Table structure usage
    #[inline]
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::TableStructureUsage)
    }

    /// Formula
    #[inline]
    #[must_use]
    pub fn formula(name: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::Formula)
    }

    /// Validation rule
    #[inline]
    #[must_use]
    pub fn rule(name: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::ValidationRule)
    }

    /// Set datatype
    #[inline]
    #[must_use]
    pub fn with_datatype(mut self, datatype: Datatype) -> Self {
        self.datatype = datatype;
        self
    }

    /// Set value set
    #[inline]
    #[must_use]
    pub fn with_value_set(mut self, value_set: ValueSet) -> Self {
        self.value_set = value_set;
        self
    }

    /// Set changing-over-time flag
    #[inline]
    #[must_use]
    pub fn with_changing_over_time(mut self, changing_over_time: bool) -> Self {
        self.changing_over_time = changing_over_time;
        self
    }

    /// Mark abstract
    #[inline]
    #[must_use]
    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Mark hidden
    #[inline]
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Set multi-value flag
    #[inline]
    #[must_use]
    pub fn with_multi_value(mut self, multi_value: bool) -> Self {
        self.multi_value = multi_value;
        self
    }

    /// Set multilingual flag
    #[inline]
    #[must_use]
    pub fn with_multilingual(mut self, multilingual: bool) -> Self {
        self.multilingual = multilingual;
        self
    }

    /// Set default value
    #[inline]
    #[must_use]
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// Set rule activation default
    #[inline]
    #[must_use]
    pub fn with_activated_by_default(mut self, active: bool) -> Self {
        self.activated_by_default = active;
        self
    }

    /// Kind of the declared value set
    #[inline]
    #[must_use]
    pub fn value_set_kind(&self) -> ValueSetKind {
        self.value_set.kind()
    }

    /// Attribute holder a hidden attribute must carry
    #[must_use]
    pub fn default_holder(&self) -> ValueHolder {
        let single = match (&self.default_value, self.multilingual) {
            (None, false) => SingleValue::null(),
            (None, true) => SingleValue::International(Default::default()),
            (Some(text), false) => SingleValue::plain(text.as_str()),
            // localized default text is not part of the declaration
            (Some(_), true) => SingleValue::International(Default::default()),
        };
        if self.multi_value {
            if single.is_null() {
                ValueHolder::Multi(Vec::new())
            } else {
                ValueHolder::Multi(vec![single])
            }
        } else {
            ValueHolder::Single(single)
        }
    }
}

impl PropertyRef for PropertyDeclaration {
    fn property_name(&self) -> &str {
        &self.name
    }

    fn value_kinds(&self) -> SmallVec<[PropertyValueKind; 2]> {
        self.kind.value_kinds()
    }

    fn initial_content(&self, kind: PropertyValueKind) -> PropertyValueContent {
        match kind {
            PropertyValueKind::AttributeValue => PropertyValueContent::AttributeValue {
                value: self.default_holder(),
            },
            PropertyValueKind::ConfiguredDefault => PropertyValueContent::ConfiguredDefault {
                value: self.default_value.clone(),
            },
            PropertyValueKind::ConfiguredValueSet => PropertyValueContent::ConfiguredValueSet {
                value_set: self.value_set.clone(),
            },
            PropertyValueKind::ValidationRuleConfig => PropertyValueContent::ValidationRuleConfig {
                active: self.activated_by_default,
            },
            PropertyValueKind::TableContentUsage | PropertyValueKind::Formula => {
                PropertyValueContent::empty(kind)
            }
        }
    }
}

/// An association declared by a product type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationDeclaration {
    /// Association name, used by links
    pub name: String,
    /// Type of link targets
    pub target_type: pcfg_model::QualifiedName,
    /// Whether links live in generations
    #[serde(default = "default_true")]
    pub changing_over_time: bool,
    /// Cardinality of new links
    #[serde(default)]
    pub cardinality: Cardinality,
}

impl AssociationDeclaration {
    /// Declare an association
    #[must_use]
    pub fn new(name: impl Into<String>, target_type: pcfg_model::QualifiedName) -> Self {
        Self {
            name: name.into(),
            target_type,
            changing_over_time: true,
            cardinality: Cardinality::default(),
        }
    }

    /// Set changing-over-time flag
    #[inline]
    #[must_use]
    pub fn with_changing_over_time(mut self, changing_over_time: bool) -> Self {
        self.changing_over_time = changing_over_time;
        self
    }

    /// Set cardinality
    #[inline]
    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }
}
