//! Validation of an object against its type and template
//!
//! Extends the model's own checks with the references the model cannot
//! follow: the template chain and the type definition.

use pcfg_model::{
    ConfigurationObject, InvalidProperty, Message, MessageList, TemplateDirectory,
};
use pcfg_template::{ChainEnd, TemplateChain};
use pcfg_typedef::TypeDefinition;

/// Message codes raised here
pub mod codes {
    /// Template reference does not resolve
    pub const TEMPLATE_NOT_FOUND: &str = "TPL-NOT-FOUND";
    /// Template chain loops
    pub const TEMPLATE_CYCLE: &str = "TPL-CYCLE";
    /// Referenced object is not marked as template
    pub const TEMPLATE_NOT_MARKED: &str = "TPL-NOT-A-TEMPLATE";
    /// Template has another type than the object
    pub const TEMPLATE_TYPE_MISMATCH: &str = "TPL-TYPE-MISMATCH";
    /// No type definition for the object's type
    pub const TYPE_NOT_FOUND: &str = "TYPE-NOT-FOUND";
}

/// Validate `object` including its template chain and type
///
/// `type_def` is `None` when the object's type could not be resolved.
#[must_use]
pub fn validate(
    object: &ConfigurationObject,
    type_def: Option<&dyn TypeDefinition>,
    directory: &dyn TemplateDirectory,
) -> MessageList {
    let mut messages = object.validate();
    let here = || InvalidProperty::object(object.name());

    if type_def.is_none() {
        messages.add(
            Message::error(
                codes::TYPE_NOT_FOUND,
                format!("type {} of {} is not defined", object.type_name(), object.name()),
            )
            .at(here()),
        );
    }

    let chain = TemplateChain::walk(directory, object);
    match &chain.end {
        ChainEnd::Complete => {}
        ChainEnd::Missing(name) => messages.add(
            Message::error(
                codes::TEMPLATE_NOT_FOUND,
                format!("template {name} referenced by {} does not exist", object.name()),
            )
            .at(here()),
        ),
        ChainEnd::Cycle(name) => messages.add(
            Message::error(
                codes::TEMPLATE_CYCLE,
                format!("template chain of {} loops at {name}", object.name()),
            )
            .at(here()),
        ),
    }

    if let Some(template) = chain.templates.first() {
        if !template.is_template() {
            messages.add(
                Message::error(
                    codes::TEMPLATE_NOT_MARKED,
                    format!("{} is used as template but not marked as one", template.name()),
                )
                .at(here()),
            );
        }
        if template.type_name() != object.type_name() {
            messages.add(
                Message::warning(
                    codes::TEMPLATE_TYPE_MISMATCH,
                    format!(
                        "template {} has type {}, object has type {}",
                        template.name(),
                        template.type_name(),
                        object.type_name()
                    ),
                )
                .at(here()),
            );
        }
    }

    tracing::debug!(
        object = %object.name(),
        messages = messages.len(),
        "validated object"
    );
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pcfg_model::{QualifiedName, Severity};
    use pcfg_typedef::{ProductType, TypeRegistry};

    fn name(s: &str) -> QualifiedName {
        s.parse().unwrap()
    }

    fn plain(object: &str, type_name: &str) -> ConfigurationObject {
        ConfigurationObject::new(name(object), name(type_name)).with_changing_over_time(false)
    }

    #[test]
    fn dangling_template_and_missing_type() {
        let directory = IndexMap::new();
        let object = plain("Gold", "Motor").with_template(name("Gone"));
        let messages = validate(&object, None, &directory);
        assert!(messages.contains_code(codes::TEMPLATE_NOT_FOUND));
        assert!(messages.contains_code(codes::TYPE_NOT_FOUND));
        assert!(messages.has_errors());
    }

    #[test]
    fn template_cycle_reported() {
        let mut directory = IndexMap::new();
        let a = plain("A", "Motor").as_template().with_template(name("B"));
        let b = plain("B", "Motor").as_template().with_template(name("A"));
        directory.insert(a.name().clone(), a.clone());
        directory.insert(b.name().clone(), b);
        let messages = validate(&a, None, &directory);
        assert!(messages.contains_code(codes::TEMPLATE_CYCLE));
    }

    #[test]
    fn template_must_be_marked_and_typed_alike() {
        let mut registry = TypeRegistry::new();
        registry
            .register(ProductType::new(name("Motor")).with_changing_over_time(false))
            .unwrap();
        let ty = registry.resolve(&name("Motor")).unwrap();

        let mut directory = IndexMap::new();
        let template = plain("T", "Home");
        directory.insert(template.name().clone(), template);
        let object = plain("Gold", "Motor").with_template(name("T"));

        let messages = validate(&object, Some(&ty), &directory);
        assert!(messages.contains_code(codes::TEMPLATE_NOT_MARKED));
        let mismatch = messages
            .by_code(codes::TEMPLATE_TYPE_MISMATCH)
            .next()
            .unwrap();
        assert_eq!(mismatch.severity, Severity::Warning);
    }

    #[test]
    fn valid_object_has_no_messages() {
        let mut directory = IndexMap::new();
        let template = plain("T", "Motor").as_template();
        directory.insert(template.name().clone(), template);
        let object = plain("Gold", "Motor").with_template(name("T"));
        let registry = {
            let mut r = TypeRegistry::new();
            r.register(ProductType::new(name("Motor"))).unwrap();
            r
        };
        let ty = registry.resolve(&name("Motor")).unwrap();
        assert!(validate(&object, Some(&ty), &directory).is_empty());
    }
}
