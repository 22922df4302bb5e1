//! Delta entries and their fixes
//!
//! Every fix re-reads the current state of the object before changing it.
//! A fix whose mismatch is already gone is a no-op, so entries can be fixed
//! in any order and more than once.

use crate::convert::ConverterRegistry;
use crate::delta_type::DeltaType;
use crate::error::DeltaError;
use crate::options::DeltaOptions;
use pcfg_model::{
    Cardinality, ChangeContext, ConfigurationObject, ContainerRef, Link, PartId, PropertyValue,
    PropertyValueContent, PropertyValueKind, QualifiedName, SingleValue, TemplateValueStatus,
    ValueContainer, ValueHolder, ValueSet, ValueSetKind,
};
use pcfg_typedef::{Datatype, PropertyDeclaration, PropertyKind};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Result of fixing one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    /// The object was changed
    Applied,
    /// Nothing left to fix
    NoOp,
    /// No automatic strategy; the text says what is left to do
    ManualActionRequired(String),
}

/// One mismatch between a container and the type definition
#[derive(Debug, Clone)]
pub enum DeltaEntry {
    /// The type is not changing over time but the object holds generations
    InvalidGenerations {
        /// Always the object container
        container: ContainerRef,
        /// Number of generations found
        generations: usize,
    },

    /// A declared property has no value of `kind`
    MissingPropertyValue {
        /// Container lacking the value
        container: ContainerRef,
        /// Declaration used to create the value
        declaration: Arc<PropertyDeclaration>,
        /// Missing value kind
        kind: PropertyValueKind,
        /// Create the value as inherited from the template chain
        inherit: bool,
    },

    /// A value whose property is not declared for the container
    ValueWithoutProperty {
        /// Container of the value
        container: ContainerRef,
        /// Value part
        part: PartId,
        /// Property name
        property: String,
        /// Value kind
        kind: PropertyValueKind,
    },

    /// A value whose kind does not belong to the declared property kind
    PropertyTypeMismatch {
        /// Container of the value
        container: ContainerRef,
        /// Value part
        part: PartId,
        /// Property name
        property: String,
        /// Stored value kind
        found: PropertyValueKind,
        /// Declared property kind
        declared: PropertyKind,
    },

    /// Stored text that does not parse as the declared datatype
    DatatypeMismatch {
        /// Container of the value
        container: ContainerRef,
        /// Value part
        part: PartId,
        /// Property name
        property: String,
        /// Declared datatype
        datatype: Datatype,
        /// Conversion strategies
        converters: Arc<ConverterRegistry>,
        /// Currency and locale for conversions
        options: Arc<DeltaOptions>,
    },

    /// A configured value set of another kind than the declared one
    ValueSetMismatch {
        /// Container of the value
        container: ContainerRef,
        /// Value part
        part: PartId,
        /// Property name
        property: String,
        /// Stored kind
        found: ValueSetKind,
        /// Declared value set
        declared: ValueSet,
    },

    /// Single/multi value shape differs from the declaration
    ValueHolderMismatch {
        /// Container of the value
        container: ContainerRef,
        /// Value part
        part: PartId,
        /// Property name
        property: String,
        /// Declared shape
        multi_value: bool,
    },

    /// Plain/localized shape differs from the declaration
    MultilingualMismatch {
        /// Container of the value
        container: ContainerRef,
        /// Value part
        part: PartId,
        /// Property name
        property: String,
        /// Declared shape
        multilingual: bool,
        /// Locale used for the conversion
        locale: String,
    },

    /// A hidden attribute that deviates from its declared default
    HiddenAttributeMismatch {
        /// Container of the value
        container: ContainerRef,
        /// Value part
        part: PartId,
        /// Property name
        property: String,
        /// Content the attribute must carry
        default: ValueHolder,
    },

    /// A link along an undeclared association
    LinkWithoutAssociation {
        /// Container of the link
        container: ContainerRef,
        /// Link part
        part: PartId,
        /// Association name
        association: String,
        /// Link target
        target: QualifiedName,
    },

    /// A link stored in the wrong container for its association
    LinkChangingOverTimeMismatch {
        /// Container of the link
        container: ContainerRef,
        /// Link part
        part: PartId,
        /// Association name
        association: String,
        /// Link target
        target: QualifiedName,
        /// Whether the link belongs into the generations
        to_generations: bool,
    },

    /// A template link with no local counterpart
    MissingTemplateLink {
        /// Container lacking the link
        container: ContainerRef,
        /// Template holding the link
        template: QualifiedName,
        /// Association name
        association: String,
        /// Link target
        target: QualifiedName,
        /// Cardinality of the template link
        cardinality: Cardinality,
    },

    /// An inherited or undefined link whose template link is gone
    RemovedTemplateLink {
        /// Container of the link
        container: ContainerRef,
        /// Link part
        part: PartId,
        /// Association name
        association: String,
        /// Link target
        target: QualifiedName,
    },

    /// A rule configuration for an undeclared rule
    ConfigWithoutValidationRule {
        /// Container of the configuration
        container: ContainerRef,
        /// Configuration part
        part: PartId,
        /// Rule name
        rule: String,
    },

    /// A declared rule without configuration
    MissingValidationRuleConfig {
        /// Container lacking the configuration
        container: ContainerRef,
        /// Rule declaration
        declaration: Arc<PropertyDeclaration>,
    },
}

impl DeltaEntry {
    /// Category of this entry
    #[must_use]
    pub fn delta_type(&self) -> DeltaType {
        match self {
            Self::InvalidGenerations { .. } => DeltaType::InvalidGenerations,
            Self::MissingPropertyValue { .. } => DeltaType::MissingPropertyValue,
            Self::ValueWithoutProperty { .. } => DeltaType::ValueWithoutProperty,
            Self::PropertyTypeMismatch { .. } => DeltaType::PropertyTypeMismatch,
            Self::DatatypeMismatch { .. } => DeltaType::DatatypeMismatch,
            Self::ValueSetMismatch { .. } => DeltaType::ValueSetMismatch,
            Self::ValueHolderMismatch { .. } => DeltaType::ValueHolderMismatch,
            Self::MultilingualMismatch { .. } => DeltaType::MultilingualMismatch,
            Self::HiddenAttributeMismatch { .. } => DeltaType::HiddenAttributeMismatch,
            Self::LinkWithoutAssociation { .. } => DeltaType::LinkWithoutAssociation,
            Self::LinkChangingOverTimeMismatch { .. } => DeltaType::LinkChangingOverTimeMismatch,
            Self::MissingTemplateLink { .. } => DeltaType::MissingTemplateLink,
            Self::RemovedTemplateLink { .. } => DeltaType::RemovedTemplateLink,
            Self::ConfigWithoutValidationRule { .. } => DeltaType::ConfigWithoutValidationRule,
            Self::MissingValidationRuleConfig { .. } => DeltaType::MissingValidationRuleConfig,
        }
    }

    /// Container the entry refers to
    #[must_use]
    pub fn container(&self) -> &ContainerRef {
        match self {
            Self::InvalidGenerations { container, .. }
            | Self::MissingPropertyValue { container, .. }
            | Self::ValueWithoutProperty { container, .. }
            | Self::PropertyTypeMismatch { container, .. }
            | Self::DatatypeMismatch { container, .. }
            | Self::ValueSetMismatch { container, .. }
            | Self::ValueHolderMismatch { container, .. }
            | Self::MultilingualMismatch { container, .. }
            | Self::HiddenAttributeMismatch { container, .. }
            | Self::LinkWithoutAssociation { container, .. }
            | Self::LinkChangingOverTimeMismatch { container, .. }
            | Self::MissingTemplateLink { container, .. }
            | Self::RemovedTemplateLink { container, .. }
            | Self::ConfigWithoutValidationRule { container, .. }
            | Self::MissingValidationRuleConfig { container, .. } => container,
        }
    }

    /// Existing part the entry refers to
    #[must_use]
    pub fn part(&self) -> Option<&PartId> {
        match self {
            Self::ValueWithoutProperty { part, .. }
            | Self::PropertyTypeMismatch { part, .. }
            | Self::DatatypeMismatch { part, .. }
            | Self::ValueSetMismatch { part, .. }
            | Self::ValueHolderMismatch { part, .. }
            | Self::MultilingualMismatch { part, .. }
            | Self::HiddenAttributeMismatch { part, .. }
            | Self::LinkWithoutAssociation { part, .. }
            | Self::LinkChangingOverTimeMismatch { part, .. }
            | Self::RemovedTemplateLink { part, .. }
            | Self::ConfigWithoutValidationRule { part, .. } => Some(part),
            Self::InvalidGenerations { .. }
            | Self::MissingPropertyValue { .. }
            | Self::MissingTemplateLink { .. }
            | Self::MissingValidationRuleConfig { .. } => None,
        }
    }

    /// Property, association or rule name the entry refers to
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::InvalidGenerations { .. } => None,
            Self::MissingPropertyValue { declaration, .. }
            | Self::MissingValidationRuleConfig { declaration, .. } => Some(&declaration.name),
            Self::ValueWithoutProperty { property, .. }
            | Self::PropertyTypeMismatch { property, .. }
            | Self::DatatypeMismatch { property, .. }
            | Self::ValueSetMismatch { property, .. }
            | Self::ValueHolderMismatch { property, .. }
            | Self::MultilingualMismatch { property, .. }
            | Self::HiddenAttributeMismatch { property, .. } => Some(property),
            Self::LinkWithoutAssociation { association, .. }
            | Self::LinkChangingOverTimeMismatch { association, .. }
            | Self::MissingTemplateLink { association, .. }
            | Self::RemovedTemplateLink { association, .. } => Some(association),
            Self::ConfigWithoutValidationRule { rule, .. } => Some(rule),
        }
    }

    /// Repair the mismatch on `object`
    ///
    /// # Errors
    /// Returns error on a structural model failure
    pub fn fix(
        &self,
        object: &mut ConfigurationObject,
        ctx: &ChangeContext,
    ) -> Result<FixOutcome, DeltaError> {
        let outcome = match self {
            Self::InvalidGenerations { .. } => fix_invalid_generations(object, ctx)?,
            Self::MissingPropertyValue {
                container,
                declaration,
                kind,
                inherit,
            } => create_value(object, container, declaration, *kind, *inherit, ctx)?,
            Self::MissingValidationRuleConfig {
                container,
                declaration,
            } => create_value(
                object,
                container,
                declaration,
                PropertyValueKind::ValidationRuleConfig,
                false,
                ctx,
            )?,
            Self::ValueWithoutProperty {
                container, part, ..
            }
            | Self::PropertyTypeMismatch {
                container, part, ..
            }
            | Self::ConfigWithoutValidationRule {
                container, part, ..
            } => remove_value(object, container, part, ctx)?,
            Self::DatatypeMismatch {
                container,
                part,
                property,
                datatype,
                converters,
                options,
            } => convert_datatype(
                object, container, part, property, *datatype, converters, options, ctx,
            )?,
            Self::ValueSetMismatch {
                container,
                part,
                declared,
                ..
            } => update_content(object, container, part, ctx, |content| match content {
                PropertyValueContent::ConfiguredValueSet { value_set }
                    if value_set.kind() != declared.kind() =>
                {
                    Some(PropertyValueContent::ConfiguredValueSet {
                        value_set: declared.clone(),
                    })
                }
                _ => None,
            })?,
            Self::ValueHolderMismatch {
                container,
                part,
                multi_value,
                ..
            } => update_holder(object, container, part, ctx, |holder| {
                match (holder.is_multi(), *multi_value) {
                    (false, true) => Some(holder.clone().into_multi()),
                    (true, false) => Some(holder.clone().into_single()),
                    _ => None,
                }
            })?,
            Self::MultilingualMismatch {
                container,
                part,
                multilingual,
                locale,
                ..
            } => update_holder(object, container, part, ctx, |holder| {
                if !has_multilingual_mismatch(holder, *multilingual) {
                    return None;
                }
                Some(holder.clone().map_values(|value| {
                    if *multilingual {
                        value.to_international(locale)
                    } else {
                        value.to_plain(locale)
                    }
                }))
            })?,
            Self::HiddenAttributeMismatch {
                container,
                part,
                default,
                ..
            } => update_holder(object, container, part, ctx, |holder| {
                (holder != default).then(|| default.clone())
            })?,
            Self::LinkWithoutAssociation {
                container, part, ..
            }
            | Self::RemovedTemplateLink {
                container, part, ..
            } => remove_link(object, container, part, ctx)?,
            Self::LinkChangingOverTimeMismatch {
                container,
                part,
                to_generations,
                ..
            } => move_link(object, container, part, *to_generations, ctx)?,
            Self::MissingTemplateLink {
                container,
                association,
                target,
                cardinality,
                ..
            } => {
                let missing = object
                    .container_at(container)
                    .is_some_and(|c| c.find_link(association, target).is_none());
                if missing {
                    let link = Link::new(association.as_str(), target.clone())
                        .with_cardinality(*cardinality)
                        .with_status(TemplateValueStatus::Inherited);
                    object.add_link(container, link, ctx)?;
                    FixOutcome::Applied
                } else {
                    FixOutcome::NoOp
                }
            }
        };
        match &outcome {
            FixOutcome::ManualActionRequired(reason) => tracing::warn!(
                object = %object.name(),
                delta_type = %self.delta_type(),
                %reason,
                "fix requires manual action"
            ),
            other => tracing::debug!(
                object = %object.name(),
                delta_type = %self.delta_type(),
                outcome = ?other,
                "fixed delta entry"
            ),
        }
        Ok(outcome)
    }
}

pub(crate) fn has_multilingual_mismatch(holder: &ValueHolder, multilingual: bool) -> bool {
    holder
        .values()
        .iter()
        .any(|v| v.is_international() != multilingual)
}

fn fix_invalid_generations(
    object: &mut ConfigurationObject,
    ctx: &ChangeContext,
) -> Result<FixOutcome, DeltaError> {
    if !object.is_changing_over_time() && object.generation_count() == 0 {
        return Ok(FixOutcome::NoOp);
    }
    if object.is_changing_over_time() {
        object.set_changing_over_time(false, ctx);
    }
    let Some(latest) = object.latest_generation().map(|g| g.id().clone()) else {
        return Ok(FixOutcome::Applied);
    };

    let older: Vec<PartId> = object
        .generations()
        .iter()
        .map(|g| g.id().clone())
        .filter(|id| *id != latest)
        .collect();
    if !older.is_empty() {
        tracing::warn!(
            object = %object.name(),
            count = older.len(),
            "dropping older generations of an object that is not changing over time"
        );
    }
    for id in &older {
        object.delete_generation(id, ctx)?;
    }

    let survivor = object.delete_generation(&latest, ctx)?;
    let (values, links) = absent_parts(object.container(), survivor.container());
    for value in values {
        object.add_value(&ContainerRef::Object, value.clone(), ctx)?;
    }
    for link in links {
        object.add_link(&ContainerRef::Object, link.clone(), ctx)?;
    }
    Ok(FixOutcome::Applied)
}

/// Values and links of `from` that `into` has no counterpart for
///
/// A value counts as present when `into` holds one of the same property
/// and kind, a link when it has one of the same association and target.
pub(crate) fn absent_parts<'c>(
    into: &ValueContainer,
    from: &'c ValueContainer,
) -> (Vec<&'c PropertyValue>, Vec<&'c Link>) {
    let values = from
        .values()
        .iter()
        .filter(|v| into.values().get(v.property(), v.kind()).is_none())
        .collect();
    let links = from
        .links()
        .iter()
        .filter(|l| into.find_link(l.association(), l.target()).is_none())
        .collect();
    (values, links)
}

fn create_value(
    object: &mut ConfigurationObject,
    container: &ContainerRef,
    declaration: &PropertyDeclaration,
    kind: PropertyValueKind,
    inherit: bool,
    ctx: &ChangeContext,
) -> Result<FixOutcome, DeltaError> {
    let missing = object
        .container_at(container)
        .is_some_and(|c| c.values().get(&declaration.name, kind).is_none());
    if !missing {
        return Ok(FixOutcome::NoOp);
    }
    let id = object.new_property_value(container, declaration, kind, ctx)?;
    if inherit {
        object.update_value(container, &id, ctx, |value| {
            value.set_status(TemplateValueStatus::Inherited);
        })?;
    }
    Ok(FixOutcome::Applied)
}

fn remove_value(
    object: &mut ConfigurationObject,
    container: &ContainerRef,
    part: &PartId,
    ctx: &ChangeContext,
) -> Result<FixOutcome, DeltaError> {
    let present = object
        .container_at(container)
        .is_some_and(|c| c.values().contains_id(part));
    if !present {
        return Ok(FixOutcome::NoOp);
    }
    object.remove_value(container, part, ctx)?;
    Ok(FixOutcome::Applied)
}

fn remove_link(
    object: &mut ConfigurationObject,
    container: &ContainerRef,
    part: &PartId,
    ctx: &ChangeContext,
) -> Result<FixOutcome, DeltaError> {
    let present = object
        .container_at(container)
        .is_some_and(|c| c.link(part).is_some());
    if !present {
        return Ok(FixOutcome::NoOp);
    }
    object.remove_link(container, part, ctx)?;
    Ok(FixOutcome::Applied)
}

/// Replace the content of a value if `f` yields new content
fn update_content(
    object: &mut ConfigurationObject,
    container: &ContainerRef,
    part: &PartId,
    ctx: &ChangeContext,
    f: impl FnOnce(&PropertyValueContent) -> Option<PropertyValueContent>,
) -> Result<FixOutcome, DeltaError> {
    let Some(value) = object
        .container_at(container)
        .and_then(|c| c.values().get_by_id(part))
    else {
        return Ok(FixOutcome::NoOp);
    };
    let Some(content) = f(value.content()) else {
        return Ok(FixOutcome::NoOp);
    };
    object.update_value(container, part, ctx, |value| value.set_content(content))?;
    Ok(FixOutcome::Applied)
}

/// Replace the holder of an attribute value if `f` yields a new one
fn update_holder(
    object: &mut ConfigurationObject,
    container: &ContainerRef,
    part: &PartId,
    ctx: &ChangeContext,
    f: impl FnOnce(&ValueHolder) -> Option<ValueHolder>,
) -> Result<FixOutcome, DeltaError> {
    update_content(object, container, part, ctx, |content| match content {
        PropertyValueContent::AttributeValue { value } => {
            f(value).map(|value| PropertyValueContent::AttributeValue { value })
        }
        _ => None,
    })
}

#[allow(clippy::too_many_arguments)]
fn convert_datatype(
    object: &mut ConfigurationObject,
    container: &ContainerRef,
    part: &PartId,
    property: &str,
    datatype: Datatype,
    converters: &ConverterRegistry,
    options: &DeltaOptions,
    ctx: &ChangeContext,
) -> Result<FixOutcome, DeltaError> {
    let mut unconverted = Vec::new();
    let mut convert = |text: &str| -> Option<String> {
        if datatype.is_parsable(text) {
            return None;
        }
        let converted = converters.convert(text, datatype, options);
        if converted.is_none() {
            unconverted.push(text.to_string());
        }
        converted
    };

    let changed = update_content(object, container, part, ctx, |content| match content {
        PropertyValueContent::AttributeValue { value } => {
            let mut holder = value.clone();
            let mut changed = false;
            for single in holder.values_mut() {
                if let SingleValue::Plain(Some(text)) = single {
                    if let Some(converted) = convert(text.as_str()) {
                        *single = SingleValue::Plain(Some(converted));
                        changed = true;
                    }
                }
            }
            changed.then_some(PropertyValueContent::AttributeValue { value: holder })
        }
        PropertyValueContent::ConfiguredDefault { value: Some(text) } => convert(text.as_str())
            .map(|converted| PropertyValueContent::ConfiguredDefault {
                value: Some(converted),
            }),
        _ => None,
    })?;

    if unconverted.is_empty() {
        return Ok(changed);
    }
    Ok(FixOutcome::ManualActionRequired(format!(
        "no conversion to {datatype} for {} of '{property}'",
        unconverted
            .iter()
            .map(|t| format!("\"{t}\""))
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

fn move_link(
    object: &mut ConfigurationObject,
    container: &ContainerRef,
    part: &PartId,
    to_generations: bool,
    ctx: &ChangeContext,
) -> Result<FixOutcome, DeltaError> {
    let Some(link) = object
        .container_at(container)
        .and_then(|c| c.link(part))
        .cloned()
    else {
        return Ok(FixOutcome::NoOp);
    };

    if to_generations {
        let generations: Vec<ContainerRef> = object
            .generations()
            .iter()
            .map(|g| ContainerRef::Generation(g.id().clone()))
            .collect();
        if generations.is_empty() {
            tracing::warn!(
                object = %object.name(),
                association = link.association(),
                "no generation to move changing-over-time link into"
            );
        }
        for generation in &generations {
            let absent = object
                .container_at(generation)
                .is_some_and(|c| c.find_link(link.association(), link.target()).is_none());
            if absent {
                object.add_link(generation, link.copy_with_new_id(), ctx)?;
            }
        }
    } else if object.is_latest_generation(container) {
        if object
            .container()
            .find_link(link.association(), link.target())
            .is_none()
        {
            object.add_link(&ContainerRef::Object, link.copy_with_new_id(), ctx)?;
        }
    } else if container.is_generation() {
        tracing::warn!(
            object = %object.name(),
            %container,
            association = link.association(),
            target = %link.target(),
            "dropping link of an older generation without migrating it"
        );
    }

    object.remove_link(container, part, ctx)?;
    Ok(FixOutcome::Applied)
}

impl Display for DeltaEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGenerations { generations, .. } => write!(
                f,
                "type is not changing over time but the object has {generations} generations"
            ),
            Self::MissingPropertyValue {
                container,
                declaration,
                kind,
                inherit,
            } => write!(
                f,
                "{container}: missing {kind} for {} '{}'{}",
                declaration.kind,
                declaration.name,
                if *inherit { " (inherited)" } else { "" }
            ),
            Self::ValueWithoutProperty {
                container,
                property,
                kind,
                ..
            } => write!(f, "{container}: {kind} '{property}' has no declared property"),
            Self::PropertyTypeMismatch {
                container,
                property,
                found,
                declared,
                ..
            } => write!(
                f,
                "{container}: '{property}' is stored as {found} but declared as {declared}"
            ),
            Self::DatatypeMismatch {
                container,
                property,
                datatype,
                ..
            } => write!(f, "{container}: '{property}' does not parse as {datatype}"),
            Self::ValueSetMismatch {
                container,
                property,
                found,
                declared,
                ..
            } => write!(
                f,
                "{container}: value set of '{property}' is {found}, declared {}",
                declared.kind()
            ),
            Self::ValueHolderMismatch {
                container,
                property,
                multi_value,
                ..
            } => write!(
                f,
                "{container}: '{property}' must be {}",
                if *multi_value { "multi-valued" } else { "single-valued" }
            ),
            Self::MultilingualMismatch {
                container,
                property,
                multilingual,
                ..
            } => write!(
                f,
                "{container}: '{property}' must be {}",
                if *multilingual { "multilingual" } else { "plain text" }
            ),
            Self::HiddenAttributeMismatch {
                container,
                property,
                default,
                ..
            } => write!(
                f,
                "{container}: hidden attribute '{property}' differs from default {default}"
            ),
            Self::LinkWithoutAssociation {
                container,
                association,
                target,
                ..
            } => write!(
                f,
                "{container}: link '{association}' to {target} has no declared association"
            ),
            Self::LinkChangingOverTimeMismatch {
                container,
                association,
                target,
                to_generations,
                ..
            } => write!(
                f,
                "{container}: link '{association}' to {target} belongs to {}",
                if *to_generations { "the generations" } else { "the object" }
            ),
            Self::MissingTemplateLink {
                container,
                template,
                association,
                target,
                ..
            } => write!(
                f,
                "{container}: link '{association}' to {target} of template {template} is missing"
            ),
            Self::RemovedTemplateLink {
                container,
                association,
                target,
                ..
            } => write!(
                f,
                "{container}: link '{association}' to {target} was removed from the template"
            ),
            Self::ConfigWithoutValidationRule {
                container, rule, ..
            } => write!(f, "{container}: configuration of undeclared rule '{rule}'"),
            Self::MissingValidationRuleConfig {
                container,
                declaration,
            } => write!(
                f,
                "{container}: rule '{}' has no configuration",
                declaration.name
            ),
        }
    }
}
