//! Arena of configuration objects
//!
//! Objects reference each other (templates, link targets) by
//! [`QualifiedName`] only. A removed object turns every reference to it
//! into a failed lookup.

use crate::context::{ChangeContext, ChangeEvent};
use crate::error::ModelError;
use crate::name::QualifiedName;
use crate::object::ConfigurationObject;
use indexmap::IndexMap;

/// Lookup of template objects by name
pub trait TemplateDirectory {
    /// Object acting as template `name`, `None` if unknown
    fn resolve_template(&self, name: &QualifiedName) -> Option<&ConfigurationObject>;
}

impl TemplateDirectory for IndexMap<QualifiedName, ConfigurationObject> {
    fn resolve_template(&self, name: &QualifiedName) -> Option<&ConfigurationObject> {
        self.get(name)
    }
}

/// Owning collection of configuration objects plus their change context
#[derive(Debug, Default)]
pub struct Repository {
    objects: IndexMap<QualifiedName, ConfigurationObject>,
    context: ChangeContext,
}

impl Repository {
    /// Create empty repository
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create repository around an existing context
    #[inline]
    #[must_use]
    pub fn with_context(context: ChangeContext) -> Self {
        Self {
            objects: IndexMap::new(),
            context,
        }
    }

    /// Change context shared by all objects
    #[inline]
    #[must_use]
    pub fn context(&self) -> &ChangeContext {
        &self.context
    }

    /// Number of objects
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if repository is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Insert a loaded object without raising a change
    ///
    /// Replaces and returns an object of the same name.
    pub fn insert(&mut self, object: ConfigurationObject) -> Option<ConfigurationObject> {
        self.objects.insert(object.name().clone(), object)
    }

    /// Add a new object and mark it dirty
    ///
    /// # Errors
    /// Returns error if the name is taken
    pub fn add(&mut self, object: ConfigurationObject) -> Result<(), ModelError> {
        if self.objects.contains_key(object.name()) {
            return Err(ModelError::ObjectAlreadyExists(object.name().clone()));
        }
        self.context.notify(ChangeEvent::object(object.name()));
        self.objects.insert(object.name().clone(), object);
        Ok(())
    }

    /// Remove an object
    ///
    /// # Errors
    /// Returns error if the object does not exist
    pub fn remove(&mut self, name: &QualifiedName) -> Result<ConfigurationObject, ModelError> {
        let removed = self
            .objects
            .shift_remove(name)
            .ok_or_else(|| ModelError::ObjectNotFound(name.clone()))?;
        self.context.notify(ChangeEvent::object(name));
        Ok(removed)
    }

    /// Object by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &QualifiedName) -> Option<&ConfigurationObject> {
        self.objects.get(name)
    }

    /// Check if an object exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.objects.contains_key(name)
    }

    /// Names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &QualifiedName> {
        self.objects.keys()
    }

    /// Objects in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ConfigurationObject> {
        self.objects.values()
    }

    /// Object and context for a mutation
    ///
    /// # Errors
    /// Returns error if the object does not exist
    pub fn split_mut(
        &mut self,
        name: &QualifiedName,
    ) -> Result<(&mut ConfigurationObject, &ChangeContext), ModelError> {
        let object = self
            .objects
            .get_mut(name)
            .ok_or_else(|| ModelError::ObjectNotFound(name.clone()))?;
        Ok((object, &self.context))
    }

    /// Run a mutation on one object
    ///
    /// # Errors
    /// Returns error if the object does not exist, or the mutation's error
    pub fn edit<R, E>(
        &mut self,
        name: &QualifiedName,
        f: impl FnOnce(&mut ConfigurationObject, &ChangeContext) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<ModelError>,
    {
        let (object, ctx) = self.split_mut(name)?;
        f(object, ctx)
    }

    /// Objects that use `template` directly
    pub fn users_of_template<'a>(
        &'a self,
        template: &'a QualifiedName,
    ) -> impl Iterator<Item = &'a ConfigurationObject> {
        self.objects
            .values()
            .filter(move |o| o.template() == Some(template))
    }

    /// Borrow the objects as a template directory
    #[inline]
    #[must_use]
    pub fn objects(&self) -> &IndexMap<QualifiedName, ConfigurationObject> {
        &self.objects
    }
}

impl TemplateDirectory for Repository {
    fn resolve_template(&self, name: &QualifiedName) -> Option<&ConfigurationObject> {
        self.get(name)
    }
}
