//! Testing utilities for PCFG workspace
//!
//! Shared fixtures: names, dates, a motor product type and objects built
//! against it.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use chrono::NaiveDate;
use indexmap::IndexMap;
use pcfg_model::{
    ConfigurationObject, Generation, PropertyValue, PropertyValueContent, QualifiedName,
    ValueHolder, ValueSet,
};
use pcfg_typedef::{
    AssociationDeclaration, Datatype, ProductType, PropertyDeclaration, ResolvedType, TypeRegistry,
};

pub const MOTOR: &str = "motor.MotorProduct";

pub fn name(s: &str) -> QualifiedName {
    s.parse().unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Type with one declaration of every property kind and two associations
///
/// `premiumRate`, `sumInsured`, `tariff`, `premium` and the `cover`
/// association change over time; `productCode`, `checkAge` and `fund` do not.
pub fn motor_type() -> ProductType {
    ProductType::new(name(MOTOR))
        .with_property(
            PropertyDeclaration::attribute("productCode", Datatype::String)
                .with_changing_over_time(false),
        )
        .with_property(PropertyDeclaration::attribute("premiumRate", Datatype::Decimal))
        .with_property(
            PropertyDeclaration::policy_attribute("sumInsured", Datatype::Integer)
                .with_value_set(ValueSet::range("0", "1000000")),
        )
        .with_property(PropertyDeclaration::table("tariff"))
        .with_property(PropertyDeclaration::formula("premium"))
        .with_property(
            PropertyDeclaration::rule("checkAge")
                .with_changing_over_time(false)
                .with_activated_by_default(true),
        )
        .with_association(AssociationDeclaration::new("cover", name("motor.Cover")))
        .with_association(
            AssociationDeclaration::new("fund", name("motor.Fund")).with_changing_over_time(false),
        )
}

pub fn resolve(product_type: ProductType) -> ResolvedType {
    let type_name = product_type.name.clone();
    let mut registry = TypeRegistry::new();
    registry.register(product_type).unwrap();
    registry.resolve(&type_name).unwrap()
}

pub fn motor() -> ResolvedType {
    resolve(motor_type())
}

pub fn attribute(property: &str, holder: ValueHolder) -> PropertyValue {
    PropertyValue::new(property, PropertyValueContent::AttributeValue { value: holder })
}

/// Object of the motor type with one empty generation per date
pub fn motor_object(object: &str, dates: &[&str]) -> ConfigurationObject {
    dates.iter().fold(
        ConfigurationObject::new(name(object), name(MOTOR)),
        |object, d| object.with_generation(Generation::new(date(d))),
    )
}

/// Template of the motor type with one empty generation per date
pub fn motor_template(object: &str, dates: &[&str]) -> ConfigurationObject {
    motor_object(object, dates).as_template()
}

pub fn directory(
    objects: impl IntoIterator<Item = ConfigurationObject>,
) -> IndexMap<QualifiedName, ConfigurationObject> {
    objects
        .into_iter()
        .map(|o| (o.name().clone(), o))
        .collect()
}
