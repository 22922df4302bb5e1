//! Property value store
//!
//! Name-indexed, kind-partitioned storage of the property values of one
//! container. Parts are keyed by their [`PartId`]; insertion order is kept
//! for per-kind listings.

use crate::error::ModelError;
use crate::name::PartId;
use crate::property_value::{PropertyRef, PropertyValue, PropertyValueKind};
use indexmap::IndexMap;

/// Property values of one container
///
/// # Invariants
/// - at most one value of a given kind per property name
/// - [`PropertyValueStore::all_values`] is ordered by kind, then property name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyValueStore {
    values: IndexMap<PartId, PropertyValue>,
}

impl PropertyValueStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a kind for a property name
    #[must_use]
    pub fn get(&self, property: &str, kind: PropertyValueKind) -> Option<&PropertyValue> {
        self.values
            .values()
            .find(|v| v.property() == property && v.kind() == kind)
    }

    /// Value of a kind for a declared property
    ///
    /// Resolves the reference to its name; the first match wins.
    #[inline]
    #[must_use]
    pub fn get_for(
        &self,
        property: &dyn PropertyRef,
        kind: PropertyValueKind,
    ) -> Option<&PropertyValue> {
        self.get(property.property_name(), kind)
    }

    /// All values for a property name, any kind
    pub fn values_for<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a PropertyValue> {
        self.values.values().filter(move |v| v.property() == property)
    }

    /// Check if any value exists for a property name
    #[inline]
    #[must_use]
    pub fn contains_property(&self, property: &str) -> bool {
        self.values_for(property).next().is_some()
    }

    /// Value by part id
    #[inline]
    #[must_use]
    pub fn get_by_id(&self, id: &PartId) -> Option<&PropertyValue> {
        self.values.get(id)
    }

    /// Mutable value by part id
    #[inline]
    pub fn get_by_id_mut(&mut self, id: &PartId) -> Option<&mut PropertyValue> {
        self.values.get_mut(id)
    }

    /// Check if a part id is present
    #[inline]
    #[must_use]
    pub fn contains_id(&self, id: &PartId) -> bool {
        self.values.contains_key(id)
    }

    /// Every value of a kind, in insertion order
    pub fn get_all(&self, kind: PropertyValueKind) -> impl Iterator<Item = &PropertyValue> {
        self.values.values().filter(move |v| v.kind() == kind)
    }

    /// Every value in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &PropertyValue> {
        self.values.values()
    }

    /// Every value grouped by kind, then by property name
    #[must_use]
    pub fn all_values(&self) -> Vec<&PropertyValue> {
        let mut all: Vec<&PropertyValue> = self.values.values().collect();
        all.sort_by(|a, b| {
            a.kind()
                .cmp(&b.kind())
                .then_with(|| a.property().cmp(b.property()))
        });
        all
    }

    /// Add a value
    ///
    /// Adding a part that is already present is a no-op and returns
    /// `Ok(false)`.
    ///
    /// # Errors
    /// Returns error if another value of the same kind exists for the property
    pub fn add(&mut self, value: PropertyValue) -> Result<bool, ModelError> {
        if self.values.contains_key(value.id()) {
            return Ok(false);
        }
        if self.get(value.property(), value.kind()).is_some() {
            return Err(ModelError::DuplicatePropertyValue {
                property: value.property().to_string(),
                kind: value.kind(),
            });
        }
        self.values.insert(value.id().clone(), value);
        Ok(true)
    }

    /// Remove a value, `None` if it is not present
    #[inline]
    pub fn remove(&mut self, id: &PartId) -> Option<PropertyValue> {
        self.values.shift_remove(id)
    }

    /// Create a value of `kind` for a declared property
    ///
    /// # Errors
    /// Returns error if the property is not stored as `kind` or a value of
    /// that kind already exists
    pub fn create(
        &mut self,
        property: &dyn PropertyRef,
        kind: PropertyValueKind,
    ) -> Result<PartId, ModelError> {
        if !property.value_kinds().contains(&kind) {
            return Err(ModelError::KindNotApplicable {
                property: property.property_name().to_string(),
                kind,
            });
        }
        let value = PropertyValue::new(property.property_name(), property.initial_content(kind));
        let id = value.id().clone();
        self.add(value)?;
        Ok(id)
    }

    /// Create every missing value kind of a declared property
    ///
    /// Returns the ids of the created values.
    ///
    /// # Errors
    /// Never fails for kinds the property declares; errors are propagated
    /// from [`PropertyValueStore::create`].
    pub fn create_all(&mut self, property: &dyn PropertyRef) -> Result<Vec<PartId>, ModelError> {
        let mut created = Vec::new();
        for kind in property.value_kinds() {
            if self.get(property.property_name(), kind).is_none() {
                created.push(self.create(property, kind)?);
            }
        }
        Ok(created)
    }

    /// Remove every value
    ///
    /// Only used when re-initializing a container from an external
    /// representation.
    #[inline]
    pub fn clear(&mut self) {
        self.values.clear();
    }
}
