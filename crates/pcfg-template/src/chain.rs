//! Walking template chains

use chrono::NaiveDate;
use pcfg_model::{ConfigurationObject, ContainerRef, QualifiedName, TemplateDirectory};

/// How a template chain ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEnd {
    /// Last template uses no template
    Complete,
    /// A template reference is dangling
    Missing(QualifiedName),
    /// A template reference loops back to an object already in the chain
    Cycle(QualifiedName),
}

/// Templates above an object, nearest first
#[derive(Debug)]
pub struct TemplateChain<'a> {
    /// Resolved templates
    pub templates: Vec<&'a ConfigurationObject>,
    /// How the walk ended
    pub end: ChainEnd,
}

impl<'a> TemplateChain<'a> {
    /// Walk the chain above `object`
    pub fn walk<D>(directory: &'a D, object: &ConfigurationObject) -> Self
    where
        D: TemplateDirectory + ?Sized,
    {
        let mut visited = vec![object.name().clone()];
        let mut templates = Vec::new();
        let mut next = object.template().cloned();
        while let Some(name) = next {
            if visited.contains(&name) {
                return Self {
                    templates,
                    end: ChainEnd::Cycle(name),
                };
            }
            let Some(template) = directory.resolve_template(&name) else {
                return Self {
                    templates,
                    end: ChainEnd::Missing(name),
                };
            };
            visited.push(name);
            templates.push(template);
            next = template.template().cloned();
        }
        Self {
            templates,
            end: ChainEnd::Complete,
        }
    }

    /// Check if every reference resolved
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.end == ChainEnd::Complete
    }
}

/// Where a container is looked up in every template of a chain
///
/// Computed once from the container the lookup starts in, so each template
/// is matched on the same date however its own generations are cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainLookup {
    /// Object level container
    Object,
    /// Generation effective on the date
    On(NaiveDate),
}

impl ChainLookup {
    /// Lookup for `container` of `object`
    ///
    /// `None` if the container is an unknown or undated generation.
    #[must_use]
    pub fn of(object: &ConfigurationObject, container: &ContainerRef) -> Option<Self> {
        match container {
            ContainerRef::Object => Some(Self::Object),
            ContainerRef::Generation(id) => object.generation_by_id(id)?.valid_from().map(Self::On),
        }
    }

    /// Container of `template` this lookup selects
    #[must_use]
    pub fn container_in(self, template: &ConfigurationObject) -> Option<ContainerRef> {
        match self {
            Self::Object => Some(ContainerRef::Object),
            Self::On(date) => template.container_effective_on(date),
        }
    }
}

/// Container of `template` that corresponds to `container` of `object`
///
/// Generations are matched by the local generation's `valid_from`.
#[must_use]
pub fn matching_container(
    object: &ConfigurationObject,
    container: &ContainerRef,
    template: &ConfigurationObject,
) -> Option<ContainerRef> {
    ChainLookup::of(object, container)?.container_in(template)
}
