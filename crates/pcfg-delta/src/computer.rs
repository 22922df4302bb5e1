//! Delta computation
//!
//! Compares the containers of a configuration object with the live type
//! definition. Content checks only look at values whose status is
//! `DEFINED`; inherited and undefined values take their content from
//! elsewhere.

use crate::convert::ConverterRegistry;
use crate::delta::Delta;
use crate::entry::{absent_parts, has_multilingual_mismatch, DeltaEntry};
use crate::options::DeltaOptions;
use pcfg_model::{
    ConfigurationObject, ContainerInfo, ContainerRef, PropertyValue, PropertyValueContent,
    PropertyValueKind, SingleValue, TemplateDirectory, TemplateValueStatus, ValueContainer,
};
use pcfg_template::TemplateResolver;
use pcfg_typedef::{PropertyDeclaration, PropertyKind, TypeDefinition};
use std::sync::Arc;

/// Computes deltas against one type definition
pub struct DeltaComputer<'a> {
    type_def: &'a dyn TypeDefinition,
    resolver: TemplateResolver<'a, dyn TemplateDirectory + 'a>,
    converters: Arc<ConverterRegistry>,
    options: Arc<DeltaOptions>,
}

impl<'a> DeltaComputer<'a> {
    /// Create computer with default conversions and options
    #[must_use]
    pub fn new(type_def: &'a dyn TypeDefinition, directory: &'a (dyn TemplateDirectory + 'a)) -> Self {
        Self {
            type_def,
            resolver: TemplateResolver::new(directory),
            converters: Arc::new(ConverterRegistry::with_defaults()),
            options: Arc::new(DeltaOptions::default()),
        }
    }

    /// Use other engine options
    #[must_use]
    pub fn with_options(mut self, options: DeltaOptions) -> Self {
        self.options = Arc::new(options);
        self
    }

    /// Use other conversion strategies
    #[must_use]
    pub fn with_converters(mut self, converters: Arc<ConverterRegistry>) -> Self {
        self.converters = converters;
        self
    }

    /// Engine options in use
    #[inline]
    #[must_use]
    pub fn options(&self) -> &DeltaOptions {
        &self.options
    }

    /// Delta of the whole object: its own container and every generation
    #[must_use]
    pub fn compute_object(&self, object: &ConfigurationObject) -> Delta {
        if !self.is_applicable(object) {
            return Delta::new(object.name().clone(), Vec::new());
        }

        let mut entries = Vec::new();
        let invalid_generations = !self.type_def.is_changing_over_time()
            && (object.is_changing_over_time() || object.generation_count() > 0);
        if invalid_generations {
            entries.push(DeltaEntry::InvalidGenerations {
                container: ContainerRef::Object,
                generations: object.generation_count(),
            });
            // checked as it will look once the latest generation is merged in
            let merged = merged_latest_generation(object);
            self.check_values_of(object, &ContainerRef::Object, &merged, &mut entries);
        } else {
            for container in object.container_refs() {
                self.check_container(object, &container, &mut entries);
            }
        }

        let delta = Delta::new(object.name().clone(), entries);
        tracing::info!(
            object = %object.name(),
            entries = delta.len(),
            "computed delta"
        );
        delta
    }

    /// Delta of one container
    #[must_use]
    pub fn compute(&self, object: &ConfigurationObject, container: &ContainerRef) -> Delta {
        let mut entries = Vec::new();
        if self.is_applicable(object) {
            self.check_container(object, container, &mut entries);
        }
        let delta = Delta::new(object.name().clone(), entries);
        tracing::debug!(
            object = %object.name(),
            %container,
            entries = delta.len(),
            "computed container delta"
        );
        delta
    }

    fn is_applicable(&self, object: &ConfigurationObject) -> bool {
        let applicable = self
            .type_def
            .is_applicable_to(&self.container_info(object, &ContainerRef::Object));
        if !applicable {
            tracing::warn!(
                object = %object.name(),
                object_type = %object.type_name(),
                type_def = %self.type_def.name(),
                "type definition does not apply to object"
            );
        }
        applicable
    }

    fn is_changing_over_time(&self, object: &ConfigurationObject) -> bool {
        object.is_changing_over_time() && self.type_def.is_changing_over_time()
    }

    fn container_info(&self, object: &ConfigurationObject, container: &ContainerRef) -> ContainerInfo {
        let mut info = object.container_info(container);
        info.object_changing_over_time = self.is_changing_over_time(object);
        info
    }

    /// Whether a link of an association belongs into generations
    fn link_in_generations(&self, object: &ConfigurationObject, association_cot: bool) -> bool {
        association_cot && self.is_changing_over_time(object)
    }

    fn check_container(
        &self,
        object: &ConfigurationObject,
        container: &ContainerRef,
        entries: &mut Vec<DeltaEntry>,
    ) {
        let Some(values) = object.container_at(container) else {
            tracing::warn!(object = %object.name(), %container, "container not found");
            return;
        };
        self.check_values_of(object, container, values, entries);
    }

    fn check_values_of(
        &self,
        object: &ConfigurationObject,
        container: &ContainerRef,
        values: &ValueContainer,
        entries: &mut Vec<DeltaEntry>,
    ) {
        let info = self.container_info(object, container);
        let declared: Vec<&PropertyDeclaration> = self
            .type_def
            .properties_for(&info)
            .into_iter()
            .filter(|p| !p.is_abstract)
            .collect();

        self.check_missing_values(object, container, values, &declared, entries);
        self.check_values(container, values, &declared, entries);
        self.check_links(object, container, values, entries);
        self.check_template_links(object, container, values, entries);
        check_missing_rule_configs(container, values, &declared, entries);
    }

    fn check_missing_values(
        &self,
        object: &ConfigurationObject,
        container: &ContainerRef,
        values: &ValueContainer,
        declared: &[&PropertyDeclaration],
        entries: &mut Vec<DeltaEntry>,
    ) {
        for declaration in declared {
            if declaration.kind == PropertyKind::ValidationRule {
                continue;
            }
            for kind in declaration.kind.value_kinds() {
                if values.values().get(&declaration.name, kind).is_some() {
                    continue;
                }
                let inherit = object.template().is_some()
                    && self
                        .resolver
                        .find_in_chain(object, container, &declaration.name, kind)
                        .is_some();
                entries.push(DeltaEntry::MissingPropertyValue {
                    container: container.clone(),
                    declaration: Arc::new((*declaration).clone()),
                    kind,
                    inherit,
                });
            }
        }
    }

    fn check_values(
        &self,
        container: &ContainerRef,
        values: &ValueContainer,
        declared: &[&PropertyDeclaration],
        entries: &mut Vec<DeltaEntry>,
    ) {
        for value in values.values().iter() {
            let declaration = declared.iter().find(|p| p.name == value.property());
            let Some(declaration) = declaration else {
                entries.push(if value.kind() == PropertyValueKind::ValidationRuleConfig {
                    DeltaEntry::ConfigWithoutValidationRule {
                        container: container.clone(),
                        part: value.id().clone(),
                        rule: value.property().to_string(),
                    }
                } else {
                    DeltaEntry::ValueWithoutProperty {
                        container: container.clone(),
                        part: value.id().clone(),
                        property: value.property().to_string(),
                        kind: value.kind(),
                    }
                });
                continue;
            };

            if !declaration.kind.value_kinds().contains(&value.kind()) {
                entries.push(DeltaEntry::PropertyTypeMismatch {
                    container: container.clone(),
                    part: value.id().clone(),
                    property: value.property().to_string(),
                    found: value.kind(),
                    declared: declaration.kind,
                });
                continue;
            }

            if value.status() == TemplateValueStatus::Defined {
                self.check_content(container, value, declaration, entries);
            }
        }
    }

    fn check_content(
        &self,
        container: &ContainerRef,
        value: &PropertyValue,
        declaration: &PropertyDeclaration,
        entries: &mut Vec<DeltaEntry>,
    ) {
        if declaration.kind.is_attribute()
            && stored_texts(value.content())
                .iter()
                .any(|text| !declaration.datatype.is_parsable(text))
        {
            entries.push(DeltaEntry::DatatypeMismatch {
                container: container.clone(),
                part: value.id().clone(),
                property: value.property().to_string(),
                datatype: declaration.datatype,
                converters: Arc::clone(&self.converters),
                options: Arc::clone(&self.options),
            });
        }

        match value.content() {
            PropertyValueContent::ConfiguredValueSet { value_set }
                if value_set.kind() != declaration.value_set_kind() =>
            {
                entries.push(DeltaEntry::ValueSetMismatch {
                    container: container.clone(),
                    part: value.id().clone(),
                    property: value.property().to_string(),
                    found: value_set.kind(),
                    declared: declaration.value_set.clone(),
                });
            }
            PropertyValueContent::AttributeValue { value: holder } => {
                if holder.is_multi() != declaration.multi_value {
                    entries.push(DeltaEntry::ValueHolderMismatch {
                        container: container.clone(),
                        part: value.id().clone(),
                        property: value.property().to_string(),
                        multi_value: declaration.multi_value,
                    });
                }
                if has_multilingual_mismatch(holder, declaration.multilingual) {
                    entries.push(DeltaEntry::MultilingualMismatch {
                        container: container.clone(),
                        part: value.id().clone(),
                        property: value.property().to_string(),
                        multilingual: declaration.multilingual,
                        locale: self.options.default_locale.clone(),
                    });
                }
                if !declaration.visible {
                    let default = declaration.default_holder();
                    if *holder != default {
                        entries.push(DeltaEntry::HiddenAttributeMismatch {
                            container: container.clone(),
                            part: value.id().clone(),
                            property: value.property().to_string(),
                            default,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    fn check_links(
        &self,
        object: &ConfigurationObject,
        container: &ContainerRef,
        values: &ValueContainer,
        entries: &mut Vec<DeltaEntry>,
    ) {
        for link in values.links() {
            let Some(association) = self.type_def.find_association(link.association()) else {
                entries.push(DeltaEntry::LinkWithoutAssociation {
                    container: container.clone(),
                    part: link.id().clone(),
                    association: link.association().to_string(),
                    target: link.target().clone(),
                });
                continue;
            };
            let to_generations = self.link_in_generations(object, association.changing_over_time);
            if to_generations == container.is_generation() {
                continue;
            }
            // Moving into generations needs at least one generation to land in
            if to_generations && object.generation_count() == 0 {
                continue;
            }
            entries.push(DeltaEntry::LinkChangingOverTimeMismatch {
                container: container.clone(),
                part: link.id().clone(),
                association: link.association().to_string(),
                target: link.target().clone(),
                to_generations,
            });
        }
    }

    fn check_template_links(
        &self,
        object: &ConfigurationObject,
        container: &ContainerRef,
        values: &ValueContainer,
        entries: &mut Vec<DeltaEntry>,
    ) {
        let Some(template) = self.resolver.template_of(object) else {
            return;
        };
        let placed_here = |association: &str| {
            self.type_def.find_association(association).is_some_and(|a| {
                self.link_in_generations(object, a.changing_over_time) == container.is_generation()
            })
        };
        let template_links = self.resolver.template_links(object, container);

        for link in template_links {
            if link.status() == TemplateValueStatus::Undefined || !placed_here(link.association()) {
                continue;
            }
            if values.find_link(link.association(), link.target()).is_none() {
                entries.push(DeltaEntry::MissingTemplateLink {
                    container: container.clone(),
                    template: template.name().clone(),
                    association: link.association().to_string(),
                    target: link.target().clone(),
                    cardinality: link.cardinality(),
                });
            }
        }

        for link in values.links() {
            if link.status() == TemplateValueStatus::Defined || !placed_here(link.association()) {
                continue;
            }
            let counterpart = template_links
                .iter()
                .any(|t| t.matches(link.association(), link.target()));
            if !counterpart {
                entries.push(DeltaEntry::RemovedTemplateLink {
                    container: container.clone(),
                    part: link.id().clone(),
                    association: link.association().to_string(),
                    target: link.target().clone(),
                });
            }
        }
    }
}

/// Object container plus the parts of the latest generation it lacks
fn merged_latest_generation(object: &ConfigurationObject) -> ValueContainer {
    let mut merged = object.container().clone();
    let Some(latest) = object.latest_generation() else {
        return merged;
    };
    let (values, links) = absent_parts(object.container(), latest.container());
    for value in values {
        if let Err(err) = merged.values_mut().add(value.clone()) {
            tracing::warn!(object = %object.name(), error = %err, "cannot merge generation value");
        }
    }
    for link in links {
        merged.add_link(link.clone());
    }
    merged
}

fn check_missing_rule_configs(
    container: &ContainerRef,
    values: &ValueContainer,
    declared: &[&PropertyDeclaration],
    entries: &mut Vec<DeltaEntry>,
) {
    for declaration in declared
        .iter()
        .filter(|p| p.kind == PropertyKind::ValidationRule)
    {
        if values
            .values()
            .get(&declaration.name, PropertyValueKind::ValidationRuleConfig)
            .is_none()
        {
            entries.push(DeltaEntry::MissingValidationRuleConfig {
                container: container.clone(),
                declaration: Arc::new((*declaration).clone()),
            });
        }
    }
}

/// Plain texts subject to the datatype check
fn stored_texts(content: &PropertyValueContent) -> Vec<&str> {
    match content {
        PropertyValueContent::AttributeValue { value } => value
            .values()
            .iter()
            .filter_map(SingleValue::as_plain)
            .collect(),
        PropertyValueContent::ConfiguredDefault { value: Some(text) } => vec![text.as_str()],
        _ => Vec::new(),
    }
}

impl std::fmt::Debug for DeltaComputer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeltaComputer")
            .field("type_def", &self.type_def.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
