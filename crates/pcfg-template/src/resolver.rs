//! Effective content of property values and links

use crate::chain::{matching_container, ChainLookup, TemplateChain};
use crate::resolution::{FallbackReason, Origin, Resolution};
use pcfg_model::{
    Cardinality, ConfigurationObject, ContainerRef, Link, PartId, PropertyValue,
    PropertyValueContent, PropertyValueKind, QualifiedName, TemplateDirectory,
    TemplateValueStatus, ValueContainer,
};

/// Resolves content through template chains
#[derive(Debug)]
pub struct TemplateResolver<'a, D: ?Sized> {
    directory: &'a D,
}

impl<D: ?Sized> Clone for TemplateResolver<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: ?Sized> Copy for TemplateResolver<'_, D> {}

impl<'a, D> TemplateResolver<'a, D>
where
    D: TemplateDirectory + ?Sized,
{
    /// Create resolver over a template directory
    #[inline]
    #[must_use]
    pub fn new(directory: &'a D) -> Self {
        Self { directory }
    }

    /// Template directory in use
    #[inline]
    #[must_use]
    pub fn directory(&self) -> &'a D {
        self.directory
    }

    /// Templates above `object`
    #[inline]
    #[must_use]
    pub fn chain(&self, object: &ConfigurationObject) -> TemplateChain<'a> {
        TemplateChain::walk(self.directory, object)
    }

    /// Direct template of `object`, if it resolves
    #[inline]
    #[must_use]
    pub fn template_of(&self, object: &ConfigurationObject) -> Option<&'a ConfigurationObject> {
        object
            .template()
            .and_then(|name| self.directory.resolve_template(name))
    }

    /// Effective content of the property value `part`
    ///
    /// [`Resolution::NotApplicable`] if the part is not a property value of
    /// the container (e.g. it has been deleted).
    #[must_use]
    pub fn effective_content(
        &self,
        object: &ConfigurationObject,
        container: &ContainerRef,
        part: &PartId,
    ) -> Resolution<PropertyValueContent> {
        match object
            .container_at(container)
            .and_then(|c| c.values().get_by_id(part))
        {
            Some(value) => self.effective_value(object, container, value),
            None => Resolution::NotApplicable,
        }
    }

    /// Effective content of a property value stored in `container`
    #[must_use]
    pub fn effective_value(
        &self,
        object: &ConfigurationObject,
        container: &ContainerRef,
        value: &PropertyValue,
    ) -> Resolution<PropertyValueContent> {
        let mut visited = vec![object.name().clone()];
        let lookup = ChainLookup::of(object, container);
        self.resolve_value(object, lookup, value, &mut visited)
    }

    fn resolve_value(
        &self,
        object: &ConfigurationObject,
        lookup: Option<ChainLookup>,
        value: &PropertyValue,
        visited: &mut Vec<QualifiedName>,
    ) -> Resolution<PropertyValueContent> {
        match value.status() {
            TemplateValueStatus::Defined => Resolution::Resolved {
                value: value.content().clone(),
                origin: Origin::Local,
            },
            TemplateValueStatus::Undefined => Resolution::Resolved {
                value: value.content().emptied(),
                origin: Origin::Undefined,
            },
            TemplateValueStatus::Inherited => {
                let step = self.step(object, visited, |template| {
                    template
                        .container_at(&lookup?.container_in(template)?)?
                        .values()
                        .get(value.property(), value.kind())
                });
                match step {
                    Err(reason) => fallback(value.content().clone(), reason, object, value.property()),
                    Ok((template, template_value)) => {
                        visited.push(template.name().clone());
                        attribute_origin(
                            self.resolve_value(template, lookup, template_value, visited),
                            template,
                        )
                    }
                }
            }
        }
    }

    /// Effective cardinality of the link `part`
    #[must_use]
    pub fn effective_link(
        &self,
        object: &ConfigurationObject,
        container: &ContainerRef,
        part: &PartId,
    ) -> Resolution<Cardinality> {
        match object.container_at(container).and_then(|c| c.link(part)) {
            Some(link) => {
                let mut visited = vec![object.name().clone()];
                let lookup = ChainLookup::of(object, container);
                self.resolve_link(object, lookup, link, &mut visited)
            }
            None => Resolution::NotApplicable,
        }
    }

    fn resolve_link(
        &self,
        object: &ConfigurationObject,
        lookup: Option<ChainLookup>,
        link: &Link,
        visited: &mut Vec<QualifiedName>,
    ) -> Resolution<Cardinality> {
        match link.status() {
            TemplateValueStatus::Defined => Resolution::Resolved {
                value: link.cardinality(),
                origin: Origin::Local,
            },
            TemplateValueStatus::Undefined => Resolution::Resolved {
                value: Cardinality::UNDEFINED,
                origin: Origin::Undefined,
            },
            TemplateValueStatus::Inherited => {
                let step = self.step(object, visited, |template| {
                    template
                        .container_at(&lookup?.container_in(template)?)?
                        .find_link(link.association(), link.target())
                });
                match step {
                    Err(reason) => fallback(link.cardinality(), reason, object, link.association()),
                    Ok((template, template_link)) => {
                        visited.push(template.name().clone());
                        attribute_origin(
                            self.resolve_link(template, lookup, template_link, visited),
                            template,
                        )
                    }
                }
            }
        }
    }

    /// One step up the chain: the template of `object` and what `find`
    /// locates in it
    fn step<T>(
        &self,
        object: &ConfigurationObject,
        visited: &[QualifiedName],
        find: impl FnOnce(&'a ConfigurationObject) -> Option<T>,
    ) -> Result<(&'a ConfigurationObject, T), FallbackReason> {
        let name = object.template().ok_or(FallbackReason::NoTemplate)?;
        if visited.contains(name) {
            return Err(FallbackReason::TemplateCycle(name.clone()));
        }
        let template = self
            .directory
            .resolve_template(name)
            .ok_or_else(|| FallbackReason::MissingTemplate(name.clone()))?;
        let found = find(template).ok_or_else(|| FallbackReason::MissingTemplateValue(name.clone()))?;
        Ok((template, found))
    }

    /// Template value of a property in the container matching `container`
    ///
    /// Searches the whole chain, nearest template first, matching every
    /// template on the date of `container`.
    #[must_use]
    pub fn find_in_chain(
        &self,
        object: &ConfigurationObject,
        container: &ContainerRef,
        property: &str,
        kind: PropertyValueKind,
    ) -> Option<(&'a ConfigurationObject, &'a PropertyValue)> {
        let lookup = ChainLookup::of(object, container)?;
        self.chain(object).templates.into_iter().find_map(|template| {
            let found = template
                .container_at(&lookup.container_in(template)?)?
                .values()
                .get(property, kind)?;
            Some((template, found))
        })
    }

    /// Check if the status cycle applies to a property value
    ///
    /// True for templates, and for objects using a template whose chain
    /// holds a value for the property.
    #[must_use]
    pub fn is_part_of_template_hierarchy(
        &self,
        object: &ConfigurationObject,
        container: &ContainerRef,
        property: &str,
        kind: PropertyValueKind,
    ) -> bool {
        object.is_template()
            || (object.template().is_some()
                && self.find_in_chain(object, container, property, kind).is_some())
    }

    /// Check if the status cycle applies to a link
    #[must_use]
    pub fn is_link_part_of_template_hierarchy(
        &self,
        object: &ConfigurationObject,
        container: &ContainerRef,
        link: &Link,
    ) -> bool {
        if object.is_template() {
            return true;
        }
        let Some(template) = self.template_of(object) else {
            return false;
        };
        matching_container(object, container, template)
            .and_then(|c| template.container_at(&c))
            .is_some_and(|c| c.find_link(link.association(), link.target()).is_some())
    }

    /// Links of the direct template in the container matching `container`
    ///
    /// Empty if the template does not resolve.
    #[must_use]
    pub fn template_links(
        &self,
        object: &ConfigurationObject,
        container: &ContainerRef,
    ) -> &'a [Link] {
        self.template_of(object)
            .and_then(|template| {
                let c = matching_container(object, container, template)?;
                template.container_at(&c)
            })
            .map(ValueContainer::links)
            .unwrap_or(&[])
    }
}

fn fallback<T>(
    value: T,
    reason: FallbackReason,
    object: &ConfigurationObject,
    property: &str,
) -> Resolution<T> {
    tracing::warn!(object = %object.name(), property, %reason, "template resolution fell back to local content");
    Resolution::Fallback { value, reason }
}

fn attribute_origin<T>(resolution: Resolution<T>, template: &ConfigurationObject) -> Resolution<T> {
    match resolution {
        Resolution::Resolved {
            value,
            origin: Origin::Local,
        } => Resolution::Resolved {
            value,
            origin: Origin::Template(template.name().clone()),
        },
        other => other,
    }
}
