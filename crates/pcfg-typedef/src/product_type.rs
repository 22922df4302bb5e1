//! Product types and the type definition seam

use crate::declaration::{AssociationDeclaration, PropertyDeclaration};
use pcfg_model::{ContainerInfo, QualifiedName};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Type definition a configuration object is reconciled against
///
/// Implementations answer from the live type model; nothing here is cached
/// by the engine.
pub trait TypeDefinition {
    /// Qualified type name
    fn name(&self) -> &QualifiedName;

    /// Whether instances are time-sliced into generations
    fn is_changing_over_time(&self) -> bool;

    /// Check if the type configures the given container
    fn is_applicable_to(&self, container: &ContainerInfo) -> bool;

    /// Declared properties, supertype declarations first
    fn declared_properties(&self) -> &[PropertyDeclaration];

    /// Declared associations
    fn associations(&self) -> &[AssociationDeclaration];

    /// Property declaration by name
    fn find_property(&self, name: &str) -> Option<&PropertyDeclaration> {
        self.declared_properties().iter().find(|p| p.name == name)
    }

    /// Association declaration by name
    fn find_association(&self, name: &str) -> Option<&AssociationDeclaration> {
        self.associations().iter().find(|a| a.name == name)
    }

    /// Declarations a container holds values for
    fn properties_for(&self, container: &ContainerInfo) -> Vec<&PropertyDeclaration> {
        self.declared_properties()
            .iter()
            .filter(|p| container.is_container_for(p.changing_over_time))
            .collect()
    }
}

/// Product type as written in a type file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductType {
    /// Qualified type name
    pub name: QualifiedName,
    /// Supertype whose declarations are inherited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<QualifiedName>,
    /// Whether instances are time-sliced
    #[serde(default = "default_true")]
    pub changing_over_time: bool,
    /// Own property declarations
    #[serde(default)]
    pub properties: Vec<PropertyDeclaration>,
    /// Own association declarations
    #[serde(default)]
    pub associations: Vec<AssociationDeclaration>,
}

impl ProductType {
    /// Create type without declarations
    #[must_use]
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            supertype: None,
            changing_over_time: true,
            properties: Vec::new(),
            associations: Vec::new(),
        }
    }

    /// Set supertype
    #[inline]
    #[must_use]
    pub fn with_supertype(mut self, supertype: QualifiedName) -> Self {
        self.supertype = Some(supertype);
        self
    }

    /// Set changing-over-time flag
    #[inline]
    #[must_use]
    pub fn with_changing_over_time(mut self, changing_over_time: bool) -> Self {
        self.changing_over_time = changing_over_time;
        self
    }

    /// Add a property declaration
    #[inline]
    #[must_use]
    pub fn with_property(mut self, property: PropertyDeclaration) -> Self {
        self.properties.push(property);
        self
    }

    /// Add an association declaration
    #[inline]
    #[must_use]
    pub fn with_association(mut self, association: AssociationDeclaration) -> Self {
        self.associations.push(association);
        self
    }
}

/// Product type with its supertype chain flattened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub(crate) name: QualifiedName,
    pub(crate) lineage: Vec<QualifiedName>,
    pub(crate) changing_over_time: bool,
    pub(crate) properties: Vec<PropertyDeclaration>,
    pub(crate) associations: Vec<AssociationDeclaration>,
}

impl ResolvedType {
    /// The type followed by its supertypes, nearest first
    #[inline]
    #[must_use]
    pub fn lineage(&self) -> &[QualifiedName] {
        &self.lineage
    }

    /// Check if this type is `other` or one of its subtypes
    #[inline]
    #[must_use]
    pub fn is_subtype_of(&self, other: &QualifiedName) -> bool {
        self.lineage.contains(other)
    }
}

impl TypeDefinition for ResolvedType {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    fn is_changing_over_time(&self) -> bool {
        self.changing_over_time
    }

    fn is_applicable_to(&self, container: &ContainerInfo) -> bool {
        container.type_name == self.name
    }

    fn declared_properties(&self) -> &[PropertyDeclaration] {
        &self.properties
    }

    fn associations(&self) -> &[AssociationDeclaration] {
        &self.associations
    }
}
