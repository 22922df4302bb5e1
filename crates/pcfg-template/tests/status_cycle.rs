use pcfg_model::{
    ConfigurationObject, ContainerRef, PartId, PropertyValue, PropertyValueContent,
    QualifiedName, Repository, TemplateValueStatus, ValueHolder,
};
use pcfg_template::{Origin, Resolution, TemplateResolver};
use proptest::prelude::*;

fn qn(s: &str) -> QualifiedName {
    s.parse().unwrap()
}

fn repository(local: &str, inherited: &str) -> (Repository, PartId) {
    let mut repo = Repository::new();
    repo.insert(
        ConfigurationObject::new(qn("base.T"), qn("Motor"))
            .with_changing_over_time(false)
            .as_template()
            .with_value(PropertyValue::new(
                "risk",
                PropertyValueContent::AttributeValue {
                    value: ValueHolder::single(inherited),
                },
            ))
            .unwrap(),
    );
    let value = PropertyValue::new(
        "risk",
        PropertyValueContent::AttributeValue {
            value: ValueHolder::single(local),
        },
    );
    let id = value.id().clone();
    repo.insert(
        ConfigurationObject::new(qn("products.P"), qn("Motor"))
            .with_changing_over_time(false)
            .with_template(qn("base.T"))
            .with_value(value)
            .unwrap(),
    );
    (repo, id)
}

fn effective(repo: &Repository, id: &PartId) -> Resolution<PropertyValueContent> {
    TemplateResolver::new(repo).effective_content(
        repo.get(&qn("products.P")).unwrap(),
        &ContainerRef::Object,
        id,
    )
}

fn switch(repo: &mut Repository, id: &PartId) {
    let change = TemplateResolver::new(&*repo)
        .plan_switch(repo.get(&qn("products.P")).unwrap(), &ContainerRef::Object, id)
        .unwrap();
    let (object, ctx) = repo.split_mut(&qn("products.P")).unwrap();
    change.apply(object, ctx).unwrap();
}

proptest! {
    #[test]
    fn prop_three_switches_restore_content(local in "[a-z]{1,8}", inherited in "[A-Z]{1,8}") {
        let (mut repo, id) = repository(&local, &inherited);
        let before = effective(&repo, &id);
        for _ in 0..3 {
            switch(&mut repo, &id);
        }
        prop_assert_eq!(effective(&repo, &id), before);
        prop_assert!(repo.context().is_dirty(&qn("products.P")));
    }

    #[test]
    fn prop_inherited_shows_template_value(local in "[a-z]{1,8}", inherited in "[A-Z]{1,8}") {
        let (mut repo, id) = repository(&local, &inherited);
        switch(&mut repo, &id);
        prop_assert_eq!(
            effective(&repo, &id),
            Resolution::Resolved {
                value: PropertyValueContent::AttributeValue { value: ValueHolder::single(inherited) },
                origin: Origin::Template(qn("base.T")),
            }
        );
        let status = repo
            .get(&qn("products.P"))
            .unwrap()
            .container()
            .values()
            .get_by_id(&id)
            .unwrap()
            .status();
        prop_assert_eq!(status, TemplateValueStatus::Inherited);
    }
}
