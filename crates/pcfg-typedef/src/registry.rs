//! Registry of product types
//!
//! Types reference their supertype by name. Resolution flattens the chain:
//! supertype declarations come first and are replaced in place by subtype
//! declarations of the same name.

use crate::error::TypeError;
use crate::product_type::{ProductType, ResolvedType};
use indexmap::IndexMap;
use pcfg_model::QualifiedName;
use std::collections::HashSet;

/// All known product types
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<QualifiedName, ProductType>,
}

impl TypeRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type
    ///
    /// # Errors
    /// Returns error if a type of the same name is registered
    pub fn register(&mut self, product_type: ProductType) -> Result<(), TypeError> {
        if self.types.contains_key(&product_type.name) {
            return Err(TypeError::DuplicateType(product_type.name));
        }
        tracing::debug!(type_name = %product_type.name, "registered product type");
        self.types.insert(product_type.name.clone(), product_type);
        Ok(())
    }

    /// Register a type, replacing an existing one of the same name
    pub fn replace(&mut self, product_type: ProductType) -> Option<ProductType> {
        self.types.insert(product_type.name.clone(), product_type)
    }

    /// Remove a type
    pub fn remove(&mut self, name: &QualifiedName) -> Option<ProductType> {
        self.types.shift_remove(name)
    }

    /// Type as written
    #[inline]
    #[must_use]
    pub fn get(&self, name: &QualifiedName) -> Option<&ProductType> {
        self.types.get(name)
    }

    /// Check if a type is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.types.contains_key(name)
    }

    /// Number of types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered type names
    pub fn names(&self) -> impl Iterator<Item = &QualifiedName> {
        self.types.keys()
    }

    /// Flatten a type with its supertypes
    ///
    /// # Errors
    /// Returns error if the type or a supertype is unknown, or the
    /// supertype chain has a cycle
    pub fn resolve(&self, name: &QualifiedName) -> Result<ResolvedType, TypeError> {
        let mut chain: Vec<&ProductType> = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self
            .types
            .get(name)
            .ok_or_else(|| TypeError::UnknownType(name.clone()))?;
        loop {
            if !seen.insert(&current.name) {
                return Err(TypeError::SupertypeCycle(current.name.clone()));
            }
            chain.push(current);
            let Some(supertype) = &current.supertype else {
                break;
            };
            current = self
                .types
                .get(supertype)
                .ok_or_else(|| TypeError::UnknownSupertype {
                    type_name: current.name.clone(),
                    supertype: supertype.clone(),
                })?;
        }

        let mut properties = Vec::new();
        let mut associations = Vec::new();
        for product_type in chain.iter().rev() {
            for property in &product_type.properties {
                override_by_name(&mut properties, property.clone(), |p| &p.name);
            }
            for association in &product_type.associations {
                override_by_name(&mut associations, association.clone(), |a| &a.name);
            }
        }

        Ok(ResolvedType {
            name: name.clone(),
            lineage: chain.iter().map(|t| t.name.clone()).collect(),
            changing_over_time: chain[0].changing_over_time,
            properties,
            associations,
        })
    }
}

fn override_by_name<T>(items: &mut Vec<T>, item: T, name: impl Fn(&T) -> &String) {
    match items.iter().position(|existing| name(existing) == name(&item)) {
        Some(pos) => items[pos] = item,
        None => items.push(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::Datatype;
    use crate::declaration::{AssociationDeclaration, PropertyDeclaration};
    use crate::product_type::TypeDefinition;
    use pcfg_model::{ContainerInfo, ContainerKind};
    use pretty_assertions::assert_eq;

    fn qn(s: &str) -> QualifiedName {
        s.parse().unwrap()
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                ProductType::new(qn("base.Product"))
                    .with_property(PropertyDeclaration::attribute("risk", Datatype::String))
                    .with_property(PropertyDeclaration::attribute("rate", Datatype::Integer))
                    .with_association(AssociationDeclaration::new("cover", qn("base.Cover"))),
            )
            .unwrap();
        registry
            .register(
                ProductType::new(qn("motor.Motor"))
                    .with_supertype(qn("base.Product"))
                    .with_property(PropertyDeclaration::attribute("rate", Datatype::Decimal))
                    .with_property(PropertyDeclaration::formula("premium")),
            )
            .unwrap();
        registry
    }

    #[test]
    fn flatten_overrides_in_place() {
        let resolved = registry().resolve(&qn("motor.Motor")).unwrap();
        let names: Vec<&str> = resolved
            .declared_properties()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["risk", "rate", "premium"]);
        assert_eq!(resolved.find_property("rate").unwrap().datatype, Datatype::Decimal);
        assert!(resolved.find_association("cover").is_some());
        assert_eq!(resolved.lineage(), &[qn("motor.Motor"), qn("base.Product")]);
        assert!(resolved.is_subtype_of(&qn("base.Product")));
    }

    #[test]
    fn applicability_and_container_split() {
        let resolved = registry().resolve(&qn("motor.Motor")).unwrap();
        let info = ContainerInfo {
            kind: ContainerKind::Object,
            type_name: qn("motor.Motor"),
            object_changing_over_time: true,
        };
        assert!(resolved.is_applicable_to(&info));
        assert!(resolved.properties_for(&info).is_empty());

        let other = ContainerInfo {
            type_name: qn("base.Product"),
            ..info
        };
        assert!(!resolved.is_applicable_to(&other));
    }

    #[test]
    fn resolution_errors() {
        let mut registry = registry();
        assert_eq!(
            registry.resolve(&qn("x.Missing")),
            Err(TypeError::UnknownType(qn("x.Missing")))
        );
        assert_eq!(
            registry.register(ProductType::new(qn("motor.Motor"))),
            Err(TypeError::DuplicateType(qn("motor.Motor")))
        );

        registry
            .register(ProductType::new(qn("x.Orphan")).with_supertype(qn("x.Gone")))
            .unwrap();
        assert_eq!(
            registry.resolve(&qn("x.Orphan")),
            Err(TypeError::UnknownSupertype {
                type_name: qn("x.Orphan"),
                supertype: qn("x.Gone"),
            })
        );

        registry
            .register(ProductType::new(qn("x.A")).with_supertype(qn("x.B")))
            .unwrap();
        registry
            .register(ProductType::new(qn("x.B")).with_supertype(qn("x.A")))
            .unwrap();
        assert!(matches!(
            registry.resolve(&qn("x.A")),
            Err(TypeError::SupertypeCycle(_))
        ));
    }
}
