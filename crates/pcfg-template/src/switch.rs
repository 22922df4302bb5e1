//! Template value status switching
//!
//! A switch is planned against an immutable view (the plan may need to
//! resolve content through templates) and then applied to the object.

use crate::error::TemplateError;
use crate::resolver::TemplateResolver;
use pcfg_model::{
    Cardinality, ChangeContext, ConfigurationObject, ContainerRef, PartId, PropertyValueContent,
    TemplateDirectory, TemplateValueStatus,
};

#[derive(Debug, Clone, PartialEq)]
enum Snapshot {
    Content(PropertyValueContent),
    Cardinality(Cardinality),
}

/// Planned status change of one property value or link
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    container: ContainerRef,
    part: PartId,
    from: TemplateValueStatus,
    to: TemplateValueStatus,
    snapshot: Option<Snapshot>,
}

impl StatusChange {
    /// Container of the part
    #[inline]
    #[must_use]
    pub fn container(&self) -> &ContainerRef {
        &self.container
    }

    /// Changed part
    #[inline]
    #[must_use]
    pub fn part(&self) -> &PartId {
        &self.part
    }

    /// Current status
    #[inline]
    #[must_use]
    pub fn from(&self) -> TemplateValueStatus {
        self.from
    }

    /// Status after the change
    #[inline]
    #[must_use]
    pub fn to(&self) -> TemplateValueStatus {
        self.to
    }

    /// Check if applying changes nothing
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.from == self.to && self.snapshot.is_none()
    }

    /// Apply the change
    ///
    /// Entering `DEFINED` from `INHERITED` first stores the content that
    /// was effective when the change was planned.
    ///
    /// # Errors
    /// Returns error if the part no longer exists
    pub fn apply(
        self,
        object: &mut ConfigurationObject,
        ctx: &ChangeContext,
    ) -> Result<(), TemplateError> {
        if self.is_noop() {
            return Ok(());
        }
        tracing::debug!(
            object = %object.name(),
            part = %self.part,
            from = %self.from,
            to = %self.to,
            "switching template value status"
        );
        let is_value = object
            .container_at(&self.container)
            .is_some_and(|c| c.values().contains_id(&self.part));
        let to = self.to;
        if is_value {
            object.update_value(&self.container, &self.part, ctx, |value| {
                if let Some(Snapshot::Content(content)) = self.snapshot {
                    value.set_content(content);
                }
                value.set_status(to);
            })?;
        } else {
            object.update_link(&self.container, &self.part, ctx, |link| {
                if let Some(Snapshot::Cardinality(cardinality)) = self.snapshot {
                    link.set_cardinality(cardinality);
                }
                link.set_status(to);
            })?;
        }
        Ok(())
    }
}

fn is_root_template(object: &ConfigurationObject) -> bool {
    object.is_template() && object.template().is_none()
}

impl<D> TemplateResolver<'_, D>
where
    D: TemplateDirectory + ?Sized,
{
    /// Plan the next status of the status cycle
    ///
    /// Parts outside the template hierarchy always stay `DEFINED`. Only
    /// `INHERITED` to `DEFINED` snapshots the effective content; leaving
    /// `UNDEFINED` for `DEFINED` restores the content the part kept locally.
    ///
    /// # Errors
    /// Returns error if the part does not exist
    pub fn plan_switch(
        &self,
        object: &ConfigurationObject,
        container: &ContainerRef,
        part: &PartId,
    ) -> Result<StatusChange, TemplateError> {
        let values = object
            .container_at(container)
            .ok_or_else(|| pcfg_model::ModelError::ContainerNotFound(container.clone()))?;

        let (status, in_hierarchy) = if let Some(value) = values.values().get_by_id(part) {
            (
                value.status(),
                self.is_part_of_template_hierarchy(
                    object,
                    container,
                    value.property(),
                    value.kind(),
                ),
            )
        } else if let Some(link) = values.link(part) {
            (
                link.status(),
                self.is_link_part_of_template_hierarchy(object, container, link),
            )
        } else {
            return Err(TemplateError::PartNotFound(part.clone()));
        };

        let to = if in_hierarchy {
            status.next(is_root_template(object))
        } else {
            TemplateValueStatus::Defined
        };
        self.plan_status(object, container, part, to)
    }

    /// Plan a change to a given status
    ///
    /// Snapshots the effective content only when going from `INHERITED` to
    /// `DEFINED`.
    ///
    /// # Errors
    /// Returns error if the part does not exist or the status cannot be used
    /// on the object
    pub fn plan_status(
        &self,
        object: &ConfigurationObject,
        container: &ContainerRef,
        part: &PartId,
        to: TemplateValueStatus,
    ) -> Result<StatusChange, TemplateError> {
        let allowed = match to {
            TemplateValueStatus::Defined => true,
            TemplateValueStatus::Inherited => object.template().is_some(),
            TemplateValueStatus::Undefined => {
                object.is_template() || object.template().is_some()
            }
        };
        if !allowed {
            return Err(TemplateError::StatusNotAllowed {
                object: object.name().clone(),
                status: to,
            });
        }

        let values = object
            .container_at(container)
            .ok_or_else(|| pcfg_model::ModelError::ContainerNotFound(container.clone()))?;
        let entering_defined = |from: TemplateValueStatus| {
            from == TemplateValueStatus::Inherited && to == TemplateValueStatus::Defined
        };

        let (from, snapshot) = if let Some(value) = values.values().get_by_id(part) {
            let snapshot = if entering_defined(value.status()) {
                self.effective_value(object, container, value)
                    .into_value()
                    .map(Snapshot::Content)
            } else {
                None
            };
            (value.status(), snapshot)
        } else if let Some(link) = values.link(part) {
            let snapshot = if entering_defined(link.status()) {
                self.effective_link(object, container, part)
                    .into_value()
                    .map(Snapshot::Cardinality)
            } else {
                None
            };
            (link.status(), snapshot)
        } else {
            return Err(TemplateError::PartNotFound(part.clone()));
        };

        Ok(StatusChange {
            container: container.clone(),
            part: part.clone(),
            from,
            to,
            snapshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcfg_model::{Link, PropertyValue, PropertyValueKind, QualifiedName, Repository, ValueHolder};
    use pretty_assertions::assert_eq;

    fn qn(s: &str) -> QualifiedName {
        s.parse().unwrap()
    }

    fn risk(text: &str, status: TemplateValueStatus) -> PropertyValue {
        PropertyValue::new(
            "risk",
            PropertyValueContent::AttributeValue {
                value: ValueHolder::single(text),
            },
        )
        .with_status(status)
    }

    fn setup() -> (Repository, PartId) {
        let mut repo = Repository::new();
        repo.insert(
            ConfigurationObject::new(qn("T"), qn("Motor"))
                .with_changing_over_time(false)
                .as_template()
                .with_value(risk("from template", TemplateValueStatus::Defined))
                .unwrap(),
        );
        let value = risk("mine", TemplateValueStatus::Defined);
        let id = value.id().clone();
        repo.insert(
            ConfigurationObject::new(qn("P"), qn("Motor"))
                .with_changing_over_time(false)
                .with_template(qn("T"))
                .with_value(value)
                .unwrap(),
        );
        (repo, id)
    }

    fn switch(repo: &mut Repository, id: &PartId) -> TemplateValueStatus {
        let change = {
            let resolver = TemplateResolver::new(&*repo);
            let p = repo.get(&qn("P")).unwrap();
            resolver.plan_switch(p, &ContainerRef::Object, id).unwrap()
        };
        let to = change.to();
        let (p, ctx) = repo.split_mut(&qn("P")).unwrap();
        change.apply(p, ctx).unwrap();
        to
    }

    fn effective(repo: &Repository, id: &PartId) -> PropertyValueContent {
        let resolver = TemplateResolver::new(repo);
        resolver
            .effective_content(repo.get(&qn("P")).unwrap(), &ContainerRef::Object, id)
            .into_value()
            .unwrap()
    }

    #[test]
    fn full_cycle_restores_original_content() {
        let (mut repo, id) = setup();
        let before = effective(&repo, &id);

        assert_eq!(switch(&mut repo, &id), TemplateValueStatus::Inherited);
        assert_eq!(
            effective(&repo, &id),
            PropertyValueContent::AttributeValue {
                value: ValueHolder::single("from template")
            }
        );
        assert_eq!(switch(&mut repo, &id), TemplateValueStatus::Undefined);
        assert_eq!(switch(&mut repo, &id), TemplateValueStatus::Defined);
        assert_eq!(effective(&repo, &id), before);
    }

    #[test]
    fn entering_defined_from_inherited_snapshots_effective_content() {
        let (mut repo, id) = setup();
        switch(&mut repo, &id);

        let change = {
            let resolver = TemplateResolver::new(&repo);
            resolver
                .plan_status(
                    repo.get(&qn("P")).unwrap(),
                    &ContainerRef::Object,
                    &id,
                    TemplateValueStatus::Defined,
                )
                .unwrap()
        };
        let (p, ctx) = repo.split_mut(&qn("P")).unwrap();
        change.apply(p, ctx).unwrap();
        assert_eq!(
            effective(&repo, &id),
            PropertyValueContent::AttributeValue {
                value: ValueHolder::single("from template")
            }
        );
    }

    #[test]
    fn leaving_undefined_restores_local_content() {
        let (mut repo, id) = setup();
        let plan = |repo: &Repository, to| {
            TemplateResolver::new(repo)
                .plan_status(repo.get(&qn("P")).unwrap(), &ContainerRef::Object, &id, to)
                .unwrap()
        };

        let change = plan(&repo, TemplateValueStatus::Undefined);
        let (p, ctx) = repo.split_mut(&qn("P")).unwrap();
        change.apply(p, ctx).unwrap();

        let change = plan(&repo, TemplateValueStatus::Defined);
        assert_eq!(change.from(), TemplateValueStatus::Undefined);
        let (p, ctx) = repo.split_mut(&qn("P")).unwrap();
        change.apply(p, ctx).unwrap();
        assert_eq!(
            effective(&repo, &id),
            PropertyValueContent::AttributeValue {
                value: ValueHolder::single("mine")
            }
        );
    }

    #[test]
    fn outside_hierarchy_stays_defined() {
        let mut repo = Repository::new();
        let value = risk("solo", TemplateValueStatus::Defined);
        let id = value.id().clone();
        repo.insert(
            ConfigurationObject::new(qn("P"), qn("Motor"))
                .with_changing_over_time(false)
                .with_value(value)
                .unwrap(),
        );
        let resolver = TemplateResolver::new(&repo);
        let change = resolver
            .plan_switch(repo.get(&qn("P")).unwrap(), &ContainerRef::Object, &id)
            .unwrap();
        assert!(change.is_noop());
        assert_eq!(change.to(), TemplateValueStatus::Defined);
    }

    #[test]
    fn root_template_toggles_defined_undefined() {
        let (mut repo, _) = setup();
        let template = repo.get(&qn("T")).unwrap();
        let id = template
            .container()
            .values()
            .get("risk", PropertyValueKind::AttributeValue)
            .unwrap()
            .id()
            .clone();
        let change = TemplateResolver::new(&repo)
            .plan_switch(template, &ContainerRef::Object, &id)
            .unwrap();
        assert_eq!(change.to(), TemplateValueStatus::Undefined);
        let (t, ctx) = repo.split_mut(&qn("T")).unwrap();
        change.apply(t, ctx).unwrap();

        let template = repo.get(&qn("T")).unwrap();
        let change = TemplateResolver::new(&repo)
            .plan_switch(template, &ContainerRef::Object, &id)
            .unwrap();
        assert_eq!(change.to(), TemplateValueStatus::Defined);

        assert_eq!(
            TemplateResolver::new(&repo)
                .plan_status(template, &ContainerRef::Object, &id, TemplateValueStatus::Inherited)
                .unwrap_err(),
            TemplateError::StatusNotAllowed {
                object: qn("T"),
                status: TemplateValueStatus::Inherited
            }
        );
    }

    #[test]
    fn link_switch_snapshots_cardinality() {
        let mut repo = Repository::new();
        repo.insert(
            ConfigurationObject::new(qn("T"), qn("Motor"))
                .with_changing_over_time(false)
                .as_template()
                .with_link(Link::new("cover", qn("X")).with_cardinality(pcfg_model::Cardinality::MANDATORY)),
        );
        let link = Link::new("cover", qn("X")).with_status(TemplateValueStatus::Inherited);
        let id = link.id().clone();
        repo.insert(
            ConfigurationObject::new(qn("P"), qn("Motor"))
                .with_changing_over_time(false)
                .with_template(qn("T"))
                .with_link(link),
        );
        let change = {
            let resolver = TemplateResolver::new(&repo);
            resolver
                .plan_status(
                    repo.get(&qn("P")).unwrap(),
                    &ContainerRef::Object,
                    &id,
                    TemplateValueStatus::Defined,
                )
                .unwrap()
        };
        let (p, ctx) = repo.split_mut(&qn("P")).unwrap();
        change.apply(p, ctx).unwrap();
        let link = repo.get(&qn("P")).unwrap().container().link(&id).unwrap();
        assert_eq!(link.status(), TemplateValueStatus::Defined);
        assert_eq!(link.cardinality(), pcfg_model::Cardinality::MANDATORY);
    }

    #[test]
    fn unknown_part_is_error() {
        let (repo, _) = setup();
        let resolver = TemplateResolver::new(&repo);
        assert_eq!(
            resolver
                .plan_switch(repo.get(&qn("P")).unwrap(), &ContainerRef::Object, &PartId::new("x"))
                .unwrap_err(),
            TemplateError::PartNotFound(PartId::new("x"))
        );
    }
}
