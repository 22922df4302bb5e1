//! Fixing a computed delta and recomputing yields an empty delta

use pcfg_delta::{DeltaComputer, DeltaEntry, DeltaType, FixOutcome};
use pcfg_model::{
    ChangeContext, ConfigurationObject, ContainerRef, Generation, Link, PropertyValue,
    PropertyValueContent, PropertyValueKind, QualifiedName, SingleValue, TemplateValueStatus,
    ValueHolder, ValueSet,
};
use pcfg_test_utils::{attribute, date, directory, motor, motor_object, name, resolve};
use pcfg_typedef::{AssociationDeclaration, Datatype, ProductType, PropertyDeclaration, ResolvedType};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeSet;

type Directory = indexmap::IndexMap<QualifiedName, ConfigurationObject>;

/// Static type used by most scenarios
fn static_type(configure: impl FnOnce(ProductType) -> ProductType) -> ResolvedType {
    resolve(configure(
        ProductType::new(name("Motor")).with_changing_over_time(false),
    ))
}

fn static_object() -> ConfigurationObject {
    ConfigurationObject::new(name("Gold"), name("Motor")).with_changing_over_time(false)
}

fn types(ty: &ResolvedType, directory: &Directory, object: &ConfigurationObject) -> Vec<DeltaType> {
    DeltaComputer::new(ty, directory)
        .compute_object(object)
        .iter()
        .map(DeltaEntry::delta_type)
        .collect()
}

/// Fix everything, assert the recomputed delta is empty
fn converge(ty: &ResolvedType, directory: &Directory, object: &mut ConfigurationObject) {
    let ctx = ChangeContext::new();
    let computer = DeltaComputer::new(ty, directory);
    let delta = computer.compute_object(object);
    assert!(!delta.is_empty(), "scenario must produce entries");
    let report = delta.fix_all(object, &ctx).unwrap();
    assert!(report.is_complete(), "manual entries: {:?}", report.manual);
    let again = computer.compute_object(object);
    assert_eq!(
        again.iter().map(ToString::to_string).collect::<Vec<_>>(),
        Vec::<String>::new()
    );
    assert!(ctx.is_dirty(object.name()));
}

#[test]
fn value_holder_example() {
    let ty = static_type(|t| {
        t.with_property(PropertyDeclaration::attribute("risk", Datatype::String).with_multi_value(true))
    });
    let directory = Directory::new();
    let mut object = static_object()
        .with_value(attribute("risk", ValueHolder::single("A")))
        .unwrap();
    assert_eq!(types(&ty, &directory, &object), vec![DeltaType::ValueHolderMismatch]);

    converge(&ty, &directory, &mut object);
    let value = object
        .container()
        .values()
        .get("risk", PropertyValueKind::AttributeValue)
        .unwrap();
    assert_eq!(value.value_holder(), Some(&ValueHolder::multi(["A"])));
}

#[test]
fn missing_template_link_example() {
    let ty = static_type(|t| {
        t.with_association(AssociationDeclaration::new("cover", name("Cover")).with_changing_over_time(false))
    });
    let template = ConfigurationObject::new(name("T"), name("Motor"))
        .with_changing_over_time(false)
        .as_template()
        .with_link(Link::new("cover", name("X")));
    let directory = directory([template]);
    let mut product = static_object().with_template(name("T"));

    assert_eq!(types(&ty, &directory, &product), vec![DeltaType::MissingTemplateLink]);
    converge(&ty, &directory, &mut product);

    let link = product.container().find_link("cover", &name("X")).unwrap();
    assert_eq!(link.status(), TemplateValueStatus::Inherited);
}

#[test]
fn value_without_property_example() {
    let ty = static_type(|t| t);
    let directory = Directory::new();
    let mut object = static_object()
        .with_value(attribute("foo", ValueHolder::single("x")))
        .unwrap();
    assert_eq!(types(&ty, &directory, &object), vec![DeltaType::ValueWithoutProperty]);

    converge(&ty, &directory, &mut object);
    assert!(!object.container().values().contains_property("foo"));
}

#[test]
fn invalid_generations_merge_latest_into_object() {
    let ty = static_type(|t| {
        t.with_property(PropertyDeclaration::attribute("risk", Datatype::String))
            .with_association(AssociationDeclaration::new("cover", name("Cover")).with_changing_over_time(false))
    });
    let directory = Directory::new();
    let mut object = ConfigurationObject::new(name("Gold"), name("Motor"))
        .with_generation(
            Generation::new(date("2024-01-01"))
                .with_value(attribute("risk", ValueHolder::single("old")))
                .unwrap(),
        )
        .with_generation(
            Generation::new(date("2025-01-01"))
                .with_value(attribute("risk", ValueHolder::single("new")))
                .unwrap()
                .with_link(Link::new("cover", name("X"))),
        );
    assert_eq!(types(&ty, &directory, &object), vec![DeltaType::InvalidGenerations]);

    converge(&ty, &directory, &mut object);
    assert!(!object.is_changing_over_time());
    assert_eq!(object.generation_count(), 0);
    let risk = object
        .container()
        .values()
        .get("risk", PropertyValueKind::AttributeValue)
        .unwrap();
    assert_eq!(risk.value_holder(), Some(&ValueHolder::single("new")));
    assert!(object.container().find_link("cover", &name("X")).is_some());
}

#[test]
fn invalid_generations_report_undeclared_leftovers() {
    let ty = static_type(|t| t.with_property(PropertyDeclaration::attribute("risk", Datatype::String)));
    let directory = Directory::new();
    let mut object = ConfigurationObject::new(name("Gold"), name("Motor")).with_generation(
        Generation::new(date("2024-01-01"))
            .with_value(attribute("risk", ValueHolder::single("1")))
            .unwrap()
            .with_value(attribute("foo", ValueHolder::single("x")))
            .unwrap()
            .with_link(Link::new("gone", name("Old"))),
    );
    assert_eq!(
        types(&ty, &directory, &object),
        vec![
            DeltaType::InvalidGenerations,
            DeltaType::ValueWithoutProperty,
            DeltaType::LinkWithoutAssociation
        ]
    );

    converge(&ty, &directory, &mut object);
    let values = object.container().values();
    assert_eq!(
        values.get("risk", PropertyValueKind::AttributeValue).and_then(|v| v.value_holder()),
        Some(&ValueHolder::single("1"))
    );
    assert!(!values.contains_property("foo"));
    assert!(object.container().links().is_empty());
}

#[test]
fn missing_values_created_everywhere() {
    let ty = motor();
    let directory = Directory::new();
    let mut object = motor_object("Gold", &["2024-01-01", "2025-01-01"]);
    converge(&ty, &directory, &mut object);

    let rule = object
        .container()
        .values()
        .get("checkAge", PropertyValueKind::ValidationRuleConfig)
        .unwrap();
    assert_eq!(
        rule.content(),
        &PropertyValueContent::ValidationRuleConfig { active: true }
    );
    for generation in object.generations() {
        let values = generation.container().values();
        assert!(values.get("sumInsured", PropertyValueKind::ConfiguredDefault).is_some());
        assert!(values.get("sumInsured", PropertyValueKind::ConfiguredValueSet).is_some());
        assert!(values.get("premium", PropertyValueKind::Formula).is_some());
        assert!(!values.contains_property("productCode"));
    }
}

#[test]
fn property_type_mismatch_replaces_value() {
    let ty = static_type(|t| t.with_property(PropertyDeclaration::formula("premium")));
    let directory = Directory::new();
    let mut object = static_object()
        .with_value(attribute("premium", ValueHolder::single("12")))
        .unwrap();
    converge(&ty, &directory, &mut object);
    let values: Vec<_> = object.container().values().values_for("premium").map(PropertyValue::kind).collect();
    assert_eq!(values, vec![PropertyValueKind::Formula]);
}

#[test]
fn datatype_mismatch_converted() {
    let ty = static_type(|t| {
        t.with_property(PropertyDeclaration::attribute("rate", Datatype::Money))
            .with_property(PropertyDeclaration::attribute("active", Datatype::Boolean))
            .with_property(PropertyDeclaration::attribute("start", Datatype::Date))
    });
    let directory = Directory::new();
    let mut object = static_object()
        .with_value(attribute("rate", ValueHolder::single("12.50")))
        .unwrap()
        .with_value(attribute("active", ValueHolder::single("yes")))
        .unwrap()
        .with_value(attribute("start", ValueHolder::single("01.02.2024")))
        .unwrap();
    converge(&ty, &directory, &mut object);

    let text = |property: &str| {
        object
            .container()
            .values()
            .get(property, PropertyValueKind::AttributeValue)
            .and_then(PropertyValue::value_holder)
            .map(ToString::to_string)
            .unwrap()
    };
    assert_eq!(text("rate"), ValueHolder::single("12.50 EUR").to_string());
    assert_eq!(text("active"), ValueHolder::single("true").to_string());
    assert_eq!(text("start"), ValueHolder::single("2024-02-01").to_string());
}

#[test]
fn unconvertible_text_needs_manual_action() {
    let ty = static_type(|t| t.with_property(PropertyDeclaration::attribute("count", Datatype::Integer)));
    let directory = Directory::new();
    let mut object = static_object()
        .with_value(attribute("count", ValueHolder::single("many")))
        .unwrap();
    let computer = DeltaComputer::new(&ty, &directory);
    let delta = computer.compute_object(&object);
    let entry = delta.iter().next().unwrap();
    let outcome = entry.fix(&mut object, &ChangeContext::new()).unwrap();
    assert!(matches!(outcome, FixOutcome::ManualActionRequired(_)));
    assert_eq!(
        types(&ty, &directory, &object),
        vec![DeltaType::DatatypeMismatch]
    );
}

#[test]
fn value_set_mismatch_copies_declared_set() {
    let declared = ValueSet::range("0", "100");
    let ty = static_type(|t| {
        t.with_property(
            PropertyDeclaration::policy_attribute("sum", Datatype::Integer).with_value_set(declared.clone()),
        )
    });
    let directory = Directory::new();
    let mut object = static_object()
        .with_value(PropertyValue::new(
            "sum",
            PropertyValueContent::ConfiguredDefault { value: Some("10".into()) },
        ))
        .unwrap()
        .with_value(PropertyValue::new(
            "sum",
            PropertyValueContent::ConfiguredValueSet {
                value_set: ValueSet::enumeration(["10", "20"]),
            },
        ))
        .unwrap();
    converge(&ty, &directory, &mut object);
    let stored = object
        .container()
        .values()
        .get("sum", PropertyValueKind::ConfiguredValueSet)
        .unwrap();
    assert_eq!(
        stored.content(),
        &PropertyValueContent::ConfiguredValueSet { value_set: declared }
    );
}

#[test]
fn multilingual_and_hidden_attributes() {
    let ty = static_type(|t| {
        t.with_property(PropertyDeclaration::attribute("title", Datatype::String).with_multilingual(true))
            .with_property(
                PropertyDeclaration::attribute("code", Datatype::String)
                    .hidden()
                    .with_default("X1"),
            )
    });
    let directory = Directory::new();
    let mut object = static_object()
        .with_value(attribute("title", ValueHolder::single("Gold cover")))
        .unwrap()
        .with_value(attribute("code", ValueHolder::single("Y2")))
        .unwrap();
    assert_eq!(
        types(&ty, &directory, &object),
        vec![DeltaType::MultilingualMismatch, DeltaType::HiddenAttributeMismatch]
    );
    converge(&ty, &directory, &mut object);

    let title = object
        .container()
        .values()
        .get("title", PropertyValueKind::AttributeValue)
        .and_then(PropertyValue::value_holder)
        .unwrap();
    assert_eq!(
        title.values(),
        &[SingleValue::international([("en", "Gold cover")])]
    );
}

#[test]
fn links_moved_between_containers() {
    let ty = resolve(
        ProductType::new(name("Motor"))
            .with_association(AssociationDeclaration::new("cover", name("Cover")))
            .with_association(AssociationDeclaration::new("fund", name("Fund")).with_changing_over_time(false)),
    );
    let directory = Directory::new();
    let mut object = ConfigurationObject::new(name("Gold"), name("Motor"))
        .with_link(Link::new("cover", name("Fire")))
        .with_link(Link::new("gone", name("Old")))
        .with_generation(Generation::new(date("2024-01-01")).with_link(Link::new("fund", name("Legacy"))))
        .with_generation(Generation::new(date("2025-01-01")).with_link(Link::new("fund", name("Main"))));
    assert_eq!(
        types(&ty, &directory, &object),
        vec![
            DeltaType::LinkWithoutAssociation,
            DeltaType::LinkChangingOverTimeMismatch,
            DeltaType::LinkChangingOverTimeMismatch,
            DeltaType::LinkChangingOverTimeMismatch,
        ]
    );
    converge(&ty, &directory, &mut object);

    for generation in object.generations() {
        assert!(generation.container().find_link("cover", &name("Fire")).is_some());
        assert!(generation.container().links_for("fund").next().is_none());
    }
    assert!(object.container().find_link("fund", &name("Main")).is_some());
    // the older generation's link has no migration path
    assert!(object.container().find_link("fund", &name("Legacy")).is_none());
    assert!(object.container().links_for("cover").next().is_none());
}

#[test]
fn removed_template_link_deleted() {
    let ty = static_type(|t| {
        t.with_association(AssociationDeclaration::new("cover", name("Cover")).with_changing_over_time(false))
    });
    let template = ConfigurationObject::new(name("T"), name("Motor"))
        .with_changing_over_time(false)
        .as_template();
    let directory = directory([template]);
    let mut product = static_object()
        .with_template(name("T"))
        .with_link(Link::new("cover", name("X")).with_status(TemplateValueStatus::Undefined))
        .with_link(Link::new("cover", name("Y")));
    assert_eq!(types(&ty, &directory, &product), vec![DeltaType::RemovedTemplateLink]);
    converge(&ty, &directory, &mut product);
    assert!(product.container().find_link("cover", &name("Y")).is_some());
}

#[test]
fn rule_configs_converge() {
    let ty = static_type(|t| t.with_property(PropertyDeclaration::rule("checkAge")));
    let directory = Directory::new();
    let mut object = static_object()
        .with_value(PropertyValue::new(
            "checkName",
            PropertyValueContent::ValidationRuleConfig { active: true },
        ))
        .unwrap();
    assert_eq!(
        types(&ty, &directory, &object),
        vec![
            DeltaType::ConfigWithoutValidationRule,
            DeltaType::MissingValidationRuleConfig
        ]
    );
    converge(&ty, &directory, &mut object);
}

/// Independent defects on one object, each yielding exactly one entry
fn defect_type() -> ResolvedType {
    static_type(|t| {
        t.with_property(PropertyDeclaration::attribute("risk", Datatype::String).with_multi_value(true))
            .with_property(PropertyDeclaration::attribute("rate", Datatype::Money))
            .with_property(
                PropertyDeclaration::attribute("code", Datatype::String)
                    .hidden()
                    .with_default("X1"),
            )
            .with_property(PropertyDeclaration::formula("premium"))
            .with_property(PropertyDeclaration::rule("checkAge"))
            .with_association(AssociationDeclaration::new("cover", name("Cover")).with_changing_over_time(false))
    })
}

const DEFECTS: usize = 8;

fn with_defects(mask: u16) -> ConfigurationObject {
    let has = |i: usize| mask & (1 << i) != 0;
    let mut object = static_object();
    let ctx = ChangeContext::new();
    let mut add = |value: PropertyValue| {
        object.add_value(&ContainerRef::Object, value, &ctx).unwrap();
    };
    add(attribute("risk", if has(0) { ValueHolder::single("A") } else { ValueHolder::multi(["A"]) }));
    add(attribute("rate", ValueHolder::single(if has(1) { "12" } else { "12 EUR" })));
    add(attribute("code", ValueHolder::single(if has(2) { "Y2" } else { "X1" })));
    if !has(3) {
        add(PropertyValue::new(
            "premium",
            PropertyValueContent::Formula { expression: "1".into() },
        ));
    }
    if has(4) {
        add(attribute("foo", ValueHolder::single("x")));
    }
    if !has(5) {
        add(PropertyValue::new(
            "checkAge",
            PropertyValueContent::ValidationRuleConfig { active: false },
        ));
    }
    if has(6) {
        add(PropertyValue::new(
            "oldRule",
            PropertyValueContent::ValidationRuleConfig { active: true },
        ));
    }
    if has(7) {
        object = object.with_link(Link::new("gone", name("Old")));
    }
    object
}

fn keys(ty: &ResolvedType, object: &ConfigurationObject) -> BTreeSet<(DeltaType, String)> {
    let directory = Directory::new();
    DeltaComputer::new(ty, &directory)
        .compute_object(object)
        .iter()
        .map(|e| (e.delta_type(), e.name().unwrap_or_default().to_string()))
        .collect()
}

#[test]
fn every_defect_reports_one_entry() {
    let ty = defect_type();
    assert!(keys(&ty, &with_defects(0)).is_empty());
    for i in 0..DEFECTS {
        assert_eq!(keys(&ty, &with_defects(1 << i)).len(), 1, "defect {i}");
    }
}

/// The defects of [`with_defects`] held by a generation of a static-type object
fn with_defects_in_generation(mask: u16) -> ConfigurationObject {
    let source = with_defects(mask);
    let generation = source
        .container()
        .values()
        .iter()
        .fold(Generation::new(date("2024-01-01")), |g, v| g.with_value(v.clone()).unwrap());
    let generation = source
        .container()
        .links()
        .iter()
        .fold(generation, |g, l| g.with_link(l.clone()));
    ConfigurationObject::new(name("Gold"), name("Motor")).with_generation(generation)
}

proptest! {
    #[test]
    fn defects_in_stray_generation_converge(mask in 0u16..(1 << DEFECTS)) {
        let ty = defect_type();
        let directory = Directory::new();
        let mut object = with_defects_in_generation(mask);
        let computer = DeltaComputer::new(&ty, &directory);
        let delta = computer.compute_object(&object);
        prop_assert_eq!(delta.len(), mask.count_ones() as usize + 1);
        delta.fix_all(&mut object, &ChangeContext::new()).unwrap();
        prop_assert!(computer.compute_object(&object).is_empty());
        prop_assert_eq!(object.generation_count(), 0);
    }

    #[test]
    fn combined_defects_converge(mask in 0u16..(1 << DEFECTS)) {
        let ty = defect_type();
        let directory = Directory::new();
        let mut object = with_defects(mask);
        let computer = DeltaComputer::new(&ty, &directory);
        let delta = computer.compute_object(&object);
        prop_assert_eq!(delta.len(), mask.count_ones() as usize);
        delta.fix_all(&mut object, &ChangeContext::new()).unwrap();
        prop_assert!(computer.compute_object(&object).is_empty());
    }

    #[test]
    fn partial_fix_keeps_unfixed_entries(mask in 0u16..(1 << DEFECTS), pick in any::<u16>()) {
        let ty = defect_type();
        let directory = Directory::new();
        let mut object = with_defects(mask);
        let delta = DeltaComputer::new(&ty, &directory).compute_object(&object);

        let mut unfixed = BTreeSet::new();
        let mut index = 0;
        delta
            .fix_where(&mut object, &ChangeContext::new(), |entry| {
                let fix = pick & (1 << index) != 0;
                index += 1;
                if !fix {
                    unfixed.insert((entry.delta_type(), entry.name().unwrap_or_default().to_string()));
                }
                fix
            })
            .unwrap();
        prop_assert_eq!(keys(&ty, &object), unfixed);
    }
}

#[test]
fn fixing_twice_is_noop() {
    let ty = defect_type();
    let mut object = with_defects((1 << DEFECTS) - 1);
    let directory = Directory::new();
    let delta = DeltaComputer::new(&ty, &directory).compute_object(&object);
    let ctx = ChangeContext::new();
    let first = delta.fix_all(&mut object, &ctx).unwrap();
    assert_eq!(first.applied, DEFECTS);
    let second = delta.fix_all(&mut object, &ctx).unwrap();
    assert_eq!(second.applied, 0);
    assert_eq!(second.no_op, DEFECTS);
}

#[test]
fn container_delta_is_limited_to_container() {
    let ty = motor();
    let directory = Directory::new();
    let object = motor_object("Gold", &["2024-01-01"]);
    let generation = ContainerRef::Generation(object.generations()[0].id().clone());
    let delta = DeltaComputer::new(&ty, &directory).compute(&object, &generation);
    assert!(delta.iter().all(|e| e.container() == &generation));
    assert!(!delta.is_empty());
}
