//! Configuration objects
//!
//! A [`ConfigurationObject`] owns its own [`ValueContainer`] and, when it is
//! changing over time, an ordered list of [`Generation`]s. Parts are
//! addressed by [`ContainerRef`] + [`PartId`]; every mutation goes through
//! the object and reports to a [`ChangeContext`].

use crate::container::{ContainerInfo, ContainerKind, ContainerRef, ValueContainer};
use crate::context::{ChangeContext, ChangeEvent, ChangeKind};
use crate::error::ModelError;
use crate::generation::Generation;
use crate::link::Link;
use crate::name::{PartId, QualifiedName};
use crate::property_value::{PropertyRef, PropertyValue, PropertyValueKind};
use chrono::NaiveDate;

/// Versioned, template-capable configuration object (e.g. a product)
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationObject {
    name: QualifiedName,
    type_name: QualifiedName,
    template: Option<QualifiedName>,
    is_template: bool,
    changing_over_time: bool,
    valid_to: Option<NaiveDate>,
    container: ValueContainer,
    /// Sorted by `valid_from`, undated generations first
    pub(crate) generations: Vec<Generation>,
}

impl ConfigurationObject {
    /// Create an empty object that is changing over time
    #[inline]
    #[must_use]
    pub fn new(name: QualifiedName, type_name: QualifiedName) -> Self {
        Self {
            name,
            type_name,
            template: None,
            is_template: false,
            changing_over_time: true,
            valid_to: None,
            container: ValueContainer::new(),
            generations: Vec::new(),
        }
    }

    /// Use another object as template
    #[inline]
    #[must_use]
    pub fn with_template(mut self, template: QualifiedName) -> Self {
        self.template = Some(template);
        self
    }

    /// Mark this object as a template
    #[inline]
    #[must_use]
    pub fn as_template(mut self) -> Self {
        self.is_template = true;
        self
    }

    /// Set whether the object is time-sliced
    #[inline]
    #[must_use]
    pub fn with_changing_over_time(mut self, changing_over_time: bool) -> Self {
        self.changing_over_time = changing_over_time;
        self
    }

    /// Set last valid day
    #[inline]
    #[must_use]
    pub fn with_valid_to(mut self, valid_to: NaiveDate) -> Self {
        self.valid_to = Some(valid_to);
        self
    }

    /// Add a property value to the object container while building
    ///
    /// # Errors
    /// Returns error if a value of the same kind exists for the property
    pub fn with_value(mut self, value: PropertyValue) -> Result<Self, ModelError> {
        self.container.values_mut().add(value)?;
        Ok(self)
    }

    /// Add a link to the object container while building
    #[inline]
    #[must_use]
    pub fn with_link(mut self, link: Link) -> Self {
        self.container.add_link(link);
        self
    }

    /// Add a generation while building
    #[must_use]
    pub fn with_generation(mut self, generation: Generation) -> Self {
        self.insert_generation(generation);
        self
    }

    /// Identity
    #[inline]
    #[must_use]
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Name of the product type this object is configured by
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &QualifiedName {
        &self.type_name
    }

    /// Template this object derives from
    #[inline]
    #[must_use]
    pub fn template(&self) -> Option<&QualifiedName> {
        self.template.as_ref()
    }

    /// Check if this object is a template for others
    #[inline]
    #[must_use]
    pub fn is_template(&self) -> bool {
        self.is_template
    }

    /// Check if the object is time-sliced into generations
    #[inline]
    #[must_use]
    pub fn is_changing_over_time(&self) -> bool {
        self.changing_over_time
    }

    /// Last valid day, open-ended if absent
    #[inline]
    #[must_use]
    pub fn valid_to(&self) -> Option<NaiveDate> {
        self.valid_to
    }

    /// The object's own container
    #[inline]
    #[must_use]
    pub fn container(&self) -> &ValueContainer {
        &self.container
    }

    /// Generations ordered by `valid_from`
    #[inline]
    #[must_use]
    pub fn generations(&self) -> &[Generation] {
        &self.generations
    }

    /// Number of generations
    #[inline]
    #[must_use]
    pub fn generation_count(&self) -> usize {
        self.generations.len()
    }

    /// Generation by position
    ///
    /// # Errors
    /// Returns error if `index` is out of range
    pub fn generation(&self, index: usize) -> Result<&Generation, ModelError> {
        self.generations
            .get(index)
            .ok_or(ModelError::GenerationIndexOutOfRange {
                index,
                len: self.generations.len(),
            })
    }

    /// Generation by part id
    #[inline]
    #[must_use]
    pub fn generation_by_id(&self, id: &PartId) -> Option<&Generation> {
        self.generations.iter().find(|g| g.id() == id)
    }

    /// Generation with the latest `valid_from`
    #[inline]
    #[must_use]
    pub fn latest_generation(&self) -> Option<&Generation> {
        self.generations.last()
    }

    /// Container behind a handle
    #[must_use]
    pub fn container_at(&self, container: &ContainerRef) -> Option<&ValueContainer> {
        match container {
            ContainerRef::Object => Some(&self.container),
            ContainerRef::Generation(id) => self.generation_by_id(id).map(Generation::container),
        }
    }

    fn container_at_mut(
        &mut self,
        container: &ContainerRef,
    ) -> Result<&mut ValueContainer, ModelError> {
        match container {
            ContainerRef::Object => Ok(&mut self.container),
            ContainerRef::Generation(id) => self
                .generations
                .iter_mut()
                .find(|g| g.id() == id)
                .map(Generation::container_mut)
                .ok_or_else(|| ModelError::ContainerNotFound(container.clone())),
        }
    }

    /// Handles of the object container and of every generation
    #[must_use]
    pub fn container_refs(&self) -> Vec<ContainerRef> {
        std::iter::once(ContainerRef::Object)
            .chain(
                self.generations
                    .iter()
                    .map(|g| ContainerRef::Generation(g.id().clone())),
            )
            .collect()
    }

    /// Facts about a container for property applicability
    #[must_use]
    pub fn container_info(&self, container: &ContainerRef) -> ContainerInfo {
        ContainerInfo {
            kind: match container {
                ContainerRef::Object => ContainerKind::Object,
                ContainerRef::Generation(_) => ContainerKind::Generation,
            },
            type_name: self.type_name.clone(),
            object_changing_over_time: self.changing_over_time,
        }
    }

    /// Container holding a part, if any
    #[must_use]
    pub fn find_part(&self, id: &PartId) -> Option<ContainerRef> {
        self.container_refs().into_iter().find(|c| {
            self.container_at(c)
                .is_some_and(|container| container.contains_part(id))
        })
    }

    /// Check if `container` is the latest generation
    #[inline]
    #[must_use]
    pub fn is_latest_generation(&self, container: &ContainerRef) -> bool {
        match container {
            ContainerRef::Object => false,
            ContainerRef::Generation(id) => self.latest_generation().is_some_and(|g| g.id() == id),
        }
    }

    fn notify_part(
        &self,
        ctx: &ChangeContext,
        kind: ChangeKind,
        container: &ContainerRef,
        part: &PartId,
    ) {
        ctx.notify(ChangeEvent::part(kind, &self.name, container, part));
    }

    /// Change last valid day
    pub fn set_valid_to(&mut self, valid_to: Option<NaiveDate>, ctx: &ChangeContext) {
        self.valid_to = valid_to;
        ctx.notify(ChangeEvent::object(&self.name));
    }

    /// Change template reference
    pub fn set_template(&mut self, template: Option<QualifiedName>, ctx: &ChangeContext) {
        self.template = template;
        ctx.notify(ChangeEvent::object(&self.name));
    }

    /// Change whether the object is time-sliced
    pub fn set_changing_over_time(&mut self, changing_over_time: bool, ctx: &ChangeContext) {
        self.changing_over_time = changing_over_time;
        ctx.notify(ChangeEvent::object(&self.name));
    }

    /// Add a property value to a container
    ///
    /// Returns `Ok(false)` if the part is already present.
    ///
    /// # Errors
    /// Returns error if the container does not exist or a value of the same
    /// kind exists for the property
    pub fn add_value(
        &mut self,
        container: &ContainerRef,
        value: PropertyValue,
        ctx: &ChangeContext,
    ) -> Result<bool, ModelError> {
        let id = value.id().clone();
        let added = self.container_at_mut(container)?.values_mut().add(value)?;
        if added {
            self.notify_part(ctx, ChangeKind::PartAdded, container, &id);
        }
        Ok(added)
    }

    /// Create the values of every kind a declared property is stored as
    ///
    /// Kinds that already have a value are skipped.
    ///
    /// # Errors
    /// Returns error if the container does not exist
    pub fn new_property_values(
        &mut self,
        container: &ContainerRef,
        property: &dyn PropertyRef,
        ctx: &ChangeContext,
    ) -> Result<Vec<PartId>, ModelError> {
        let created = self
            .container_at_mut(container)?
            .values_mut()
            .create_all(property)?;
        for id in &created {
            self.notify_part(ctx, ChangeKind::PartAdded, container, id);
        }
        Ok(created)
    }

    /// Create one value of `kind` for a declared property
    ///
    /// # Errors
    /// Returns error if the container does not exist, the property is not
    /// stored as `kind`, or the value already exists
    pub fn new_property_value(
        &mut self,
        container: &ContainerRef,
        property: &dyn PropertyRef,
        kind: PropertyValueKind,
        ctx: &ChangeContext,
    ) -> Result<PartId, ModelError> {
        let id = self
            .container_at_mut(container)?
            .values_mut()
            .create(property, kind)?;
        self.notify_part(ctx, ChangeKind::PartAdded, container, &id);
        Ok(id)
    }

    /// Delete a property value
    ///
    /// # Errors
    /// Returns error if the container or the value does not exist
    pub fn remove_value(
        &mut self,
        container: &ContainerRef,
        id: &PartId,
        ctx: &ChangeContext,
    ) -> Result<PropertyValue, ModelError> {
        let removed = self
            .container_at_mut(container)?
            .values_mut()
            .remove(id)
            .ok_or_else(|| ModelError::PartNotFound(id.clone()))?;
        self.notify_part(ctx, ChangeKind::PartRemoved, container, id);
        Ok(removed)
    }

    /// Mutate a property value in place
    ///
    /// # Errors
    /// Returns error if the container or the value does not exist
    pub fn update_value<R>(
        &mut self,
        container: &ContainerRef,
        id: &PartId,
        ctx: &ChangeContext,
        f: impl FnOnce(&mut PropertyValue) -> R,
    ) -> Result<R, ModelError> {
        let value = self
            .container_at_mut(container)?
            .values_mut()
            .get_by_id_mut(id)
            .ok_or_else(|| ModelError::PartNotFound(id.clone()))?;
        let result = f(value);
        self.notify_part(ctx, ChangeKind::PartChanged, container, id);
        Ok(result)
    }

    /// Add a link to a container
    ///
    /// Returns `Ok(false)` if the part is already present.
    ///
    /// # Errors
    /// Returns error if the container does not exist
    pub fn add_link(
        &mut self,
        container: &ContainerRef,
        link: Link,
        ctx: &ChangeContext,
    ) -> Result<bool, ModelError> {
        let id = link.id().clone();
        let added = self.container_at_mut(container)?.add_link(link);
        if added {
            self.notify_part(ctx, ChangeKind::PartAdded, container, &id);
        }
        Ok(added)
    }

    /// Delete a link
    ///
    /// # Errors
    /// Returns error if the container or the link does not exist
    pub fn remove_link(
        &mut self,
        container: &ContainerRef,
        id: &PartId,
        ctx: &ChangeContext,
    ) -> Result<Link, ModelError> {
        let removed = self
            .container_at_mut(container)?
            .remove_link(id)
            .ok_or_else(|| ModelError::PartNotFound(id.clone()))?;
        self.notify_part(ctx, ChangeKind::PartRemoved, container, id);
        Ok(removed)
    }

    /// Mutate a link in place
    ///
    /// # Errors
    /// Returns error if the container or the link does not exist
    pub fn update_link<R>(
        &mut self,
        container: &ContainerRef,
        id: &PartId,
        ctx: &ChangeContext,
        f: impl FnOnce(&mut Link) -> R,
    ) -> Result<R, ModelError> {
        let link = self
            .container_at_mut(container)?
            .link_mut(id)
            .ok_or_else(|| ModelError::PartNotFound(id.clone()))?;
        let result = f(link);
        self.notify_part(ctx, ChangeKind::PartChanged, container, id);
        Ok(result)
    }

    /// Replace the whole state with `other` (e.g. after re-reading a document)
    ///
    /// The identity of `self` is kept.
    pub fn reinitialize_from(&mut self, other: ConfigurationObject, ctx: &ChangeContext) {
        self.container.clear();
        self.generations.clear();
        let name = std::mem::replace(&mut self.name, other.name.clone());
        *self = other;
        self.name = name;
        ctx.notify(ChangeEvent::object(&self.name));
    }

    pub(crate) fn insert_generation(&mut self, generation: Generation) {
        self.generations.push(generation);
        self.sort_generations();
    }

    pub(crate) fn sort_generations(&mut self) {
        // stable: generations with equal dates keep their insertion order
        self.generations.sort_by(|a, b| a.valid_from().cmp(&b.valid_from()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property_value::PropertyValueContent;
    use crate::status::TemplateValueStatus;
    use crate::value::ValueHolder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn product() -> ConfigurationObject {
        ConfigurationObject::new("products.Gold".parse().unwrap(), "Motor".parse().unwrap())
    }

    fn attr(name: &str, text: &str) -> PropertyValue {
        PropertyValue::new(
            name,
            PropertyValueContent::AttributeValue {
                value: ValueHolder::single(text),
            },
        )
    }

    #[test]
    fn add_update_remove_value_notifies() {
        let ctx = ChangeContext::new();
        let events = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&events);
        ctx.subscribe(Arc::new(move |_: &ChangeEvent| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        let mut object = product();
        let value = attr("risk", "A");
        let id = value.id().clone();
        assert!(object.add_value(&ContainerRef::Object, value, &ctx).unwrap());
        object
            .update_value(&ContainerRef::Object, &id, &ctx, |v| {
                v.set_status(TemplateValueStatus::Undefined);
            })
            .unwrap();
        let removed = object.remove_value(&ContainerRef::Object, &id, &ctx).unwrap();
        assert_eq!(removed.status(), TemplateValueStatus::Undefined);
        assert_eq!(events.load(Ordering::SeqCst), 3);
        assert!(ctx.is_dirty(object.name()));
    }

    #[test]
    fn removing_deleted_part_is_structural_error() {
        let ctx = ChangeContext::new();
        let mut object = product();
        let value = attr("risk", "A");
        let id = value.id().clone();
        object.add_value(&ContainerRef::Object, value, &ctx).unwrap();
        object.remove_value(&ContainerRef::Object, &id, &ctx).unwrap();
        assert_eq!(
            object.remove_value(&ContainerRef::Object, &id, &ctx),
            Err(ModelError::PartNotFound(id))
        );
    }

    #[test]
    fn unknown_generation_container_is_error() {
        let ctx = ChangeContext::new();
        let mut object = product();
        let missing = ContainerRef::Generation(PartId::new("gone"));
        let result = object.add_link(&missing, Link::new("cover", "Fire".parse().unwrap()), &ctx);
        assert_eq!(result, Err(ModelError::ContainerNotFound(missing)));
    }

    #[test]
    fn generation_index_out_of_range() {
        let object = product();
        assert_eq!(
            object.generation(0).unwrap_err(),
            ModelError::GenerationIndexOutOfRange { index: 0, len: 0 }
        );
    }

    #[test]
    fn find_part_locates_container() {
        let generation = Generation::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let gen_id = generation.id().clone();
        let link = Link::new("cover", "Fire".parse().unwrap());
        let link_id = link.id().clone();
        let object = product().with_generation(generation.with_link(link));
        assert_eq!(
            object.find_part(&link_id),
            Some(ContainerRef::Generation(gen_id))
        );
        assert_eq!(object.find_part(&PartId::new("nope")), None);
    }

    #[test]
    fn reinitialize_keeps_identity() {
        let ctx = ChangeContext::new();
        let mut object = product().with_value(attr("risk", "A")).unwrap();
        let replacement = ConfigurationObject::new("other.Name".parse().unwrap(), "Motor".parse().unwrap())
            .with_value(attr("risk", "B"))
            .unwrap();
        object.reinitialize_from(replacement, &ctx);
        assert_eq!(object.name().to_string(), "products.Gold");
        let value = object
            .container()
            .values()
            .get("risk", PropertyValueKind::AttributeValue)
            .unwrap();
        assert_eq!(value.value_holder(), Some(&ValueHolder::single("B")));
    }
}
