//! Generation timeline of a configuration object
//!
//! Generations only store their `valid_from`. The effective `valid_to` of a
//! generation is the day before its successor starts, clipped by the
//! object's own `valid_to`.

use crate::container::{ContainerRef, ValueContainer};
use crate::context::{ChangeContext, ChangeEvent, ChangeKind};
use crate::error::ModelError;
use crate::generation::{Generation, GenerationRange};
use crate::name::PartId;
use crate::object::ConfigurationObject;
use crate::validation::{codes, InvalidProperty, Message, MessageList};
use chrono::NaiveDate;
use std::collections::BTreeMap;

fn earlier(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

impl ConfigurationObject {
    /// Effective validity window of every generation, in order
    #[must_use]
    pub fn generation_ranges(&self) -> Vec<GenerationRange> {
        (0..self.generations.len())
            .map(|index| {
                let generation = &self.generations[index];
                GenerationRange {
                    id: generation.id().clone(),
                    valid_from: generation.valid_from(),
                    valid_to: self.valid_to_at(index),
                }
            })
            .collect()
    }

    fn valid_to_at(&self, index: usize) -> Option<NaiveDate> {
        let successor_start = self
            .generations
            .get(index + 1)
            .and_then(Generation::valid_from)
            .and_then(|from| from.pred_opt());
        earlier(successor_start, self.valid_to())
    }

    /// Effective `valid_to` of a generation
    ///
    /// # Errors
    /// Returns error if the generation does not exist
    pub fn generation_valid_to(&self, id: &PartId) -> Result<Option<NaiveDate>, ModelError> {
        let index = self.generation_index(id)?;
        Ok(self.valid_to_at(index))
    }

    fn generation_index(&self, id: &PartId) -> Result<usize, ModelError> {
        self.generations
            .iter()
            .position(|g| g.id() == id)
            .ok_or_else(|| ModelError::PartNotFound(id.clone()))
    }

    /// Generation with the latest `valid_from` on or before `date`
    ///
    /// `None` if `date` precedes the first generation or lies after the
    /// object's `valid_to`.
    #[must_use]
    pub fn generation_effective_on(&self, date: NaiveDate) -> Option<&Generation> {
        if self.valid_to().is_some_and(|to| date > to) {
            return None;
        }
        self.generations
            .iter()
            .rev()
            .find(|g| g.valid_from().map_or(true, |from| from <= date))
    }

    /// Like [`generation_effective_on`](Self::generation_effective_on), but
    /// never `None` while the object has generations
    ///
    /// Falls back to the latest generation for dates after `valid_to` and to
    /// the first generation otherwise.
    #[must_use]
    pub fn best_matching_generation_effective_on(&self, date: NaiveDate) -> Option<&Generation> {
        self.generation_effective_on(date).or_else(|| {
            if self.valid_to().is_some_and(|to| date > to) {
                self.generations.last()
            } else {
                self.generations.first()
            }
        })
    }

    /// Container effective on a date
    ///
    /// Objects that are not changing over time always answer with their own
    /// container.
    #[must_use]
    pub fn container_effective_on(&self, date: NaiveDate) -> Option<ContainerRef> {
        if !self.is_changing_over_time() {
            return Some(ContainerRef::Object);
        }
        self.generation_effective_on(date)
            .map(|g| ContainerRef::Generation(g.id().clone()))
    }

    /// Create a generation starting on `valid_from`
    ///
    /// The new generation starts as a copy (with fresh part ids) of the
    /// generation effective the day before, or empty if there is none.
    ///
    /// # Errors
    /// Returns error if the object is not changing over time
    pub fn new_generation(
        &mut self,
        valid_from: NaiveDate,
        ctx: &ChangeContext,
    ) -> Result<PartId, ModelError> {
        if !self.is_changing_over_time() {
            return Err(ModelError::NotChangingOverTime(self.name().clone()));
        }
        let container = self
            .generations
            .iter()
            .rev()
            .find(|g| g.valid_from().map_or(true, |from| from < valid_from))
            .map_or_else(ValueContainer::new, |g| g.container().copy_with_new_ids());

        let generation = Generation::from_parts(PartId::generate(), Some(valid_from), container);
        let id = generation.id().clone();
        tracing::debug!(object = %self.name(), %valid_from, generation = %id, "new generation");
        self.insert_generation(generation);
        ctx.notify(ChangeEvent::part(
            ChangeKind::PartAdded,
            self.name(),
            &ContainerRef::Object,
            &id,
        ));
        Ok(id)
    }

    /// Delete a generation; other generations keep their dates
    ///
    /// # Errors
    /// Returns error if the generation does not exist
    pub fn delete_generation(
        &mut self,
        id: &PartId,
        ctx: &ChangeContext,
    ) -> Result<Generation, ModelError> {
        let index = self.generation_index(id)?;
        let removed = self.generations.remove(index);
        ctx.notify(ChangeEvent::part(
            ChangeKind::PartRemoved,
            self.name(),
            &ContainerRef::Object,
            id,
        ));
        Ok(removed)
    }

    /// Re-date a generation and restore the order
    ///
    /// # Errors
    /// Returns error if the generation does not exist
    pub fn set_generation_valid_from(
        &mut self,
        id: &PartId,
        valid_from: NaiveDate,
        ctx: &ChangeContext,
    ) -> Result<(), ModelError> {
        let index = self.generation_index(id)?;
        self.generations[index].set_valid_from(Some(valid_from));
        self.sort_generations();
        ctx.notify(ChangeEvent::part(
            ChangeKind::PartChanged,
            self.name(),
            &ContainerRef::Object,
            id,
        ));
        Ok(())
    }

    /// Move the start of the object's validity to `new_date`
    ///
    /// Generations that expired before `new_date` are deleted, the first
    /// remaining one is re-dated to `new_date`. If nothing remains, a
    /// generation copied from the last deleted one is created. An object
    /// `valid_to` before `new_date` is cleared first. Returns the generation
    /// effective on `new_date`.
    ///
    /// # Errors
    /// Returns error if the object is not changing over time
    pub fn reassign_generations(
        &mut self,
        new_date: NaiveDate,
        ctx: &ChangeContext,
    ) -> Result<PartId, ModelError> {
        if !self.is_changing_over_time() {
            return Err(ModelError::NotChangingOverTime(self.name().clone()));
        }
        if self.valid_to().is_some_and(|to| to < new_date) {
            tracing::debug!(object = %self.name(), %new_date, "validity end cleared");
            self.set_valid_to(None, ctx);
        }
        let expired: Vec<PartId> = self
            .generation_ranges()
            .into_iter()
            .filter(|range| range.valid_to.is_some_and(|to| to < new_date))
            .map(|range| range.id)
            .collect();

        let mut last_removed = None;
        for id in &expired {
            last_removed = Some(self.delete_generation(id, ctx)?);
        }

        if self.generations.is_empty() {
            let container = last_removed
                .map_or_else(ValueContainer::new, |g| g.container().copy_with_new_ids());
            let generation = Generation::from_parts(PartId::generate(), Some(new_date), container);
            let id = generation.id().clone();
            self.insert_generation(generation);
            ctx.notify(ChangeEvent::part(
                ChangeKind::PartAdded,
                self.name(),
                &ContainerRef::Object,
                &id,
            ));
            return Ok(id);
        }

        let first = self.generations[0].id().clone();
        self.set_generation_valid_from(&first, new_date, ctx)?;
        Ok(first)
    }

    /// Keep a single generation and re-date it
    ///
    /// The survivor is the generation effective on `old_date`, or the first
    /// generation if none is.
    ///
    /// # Errors
    /// Returns error if the object has no generations
    pub fn retain_only_generation(
        &mut self,
        old_date: NaiveDate,
        new_date: NaiveDate,
        ctx: &ChangeContext,
    ) -> Result<PartId, ModelError> {
        let survivor = self
            .generation_effective_on(old_date)
            .or_else(|| self.generations.first())
            .map(|g| g.id().clone())
            .ok_or_else(|| ModelError::NoGenerations(self.name().clone()))?;

        let others: Vec<PartId> = self
            .generations
            .iter()
            .map(|g| g.id().clone())
            .filter(|id| *id != survivor)
            .collect();
        for id in &others {
            self.delete_generation(id, ctx)?;
        }
        self.set_generation_valid_from(&survivor, new_date, ctx)?;
        Ok(survivor)
    }

    /// Validate timeline and link invariants
    ///
    /// Invalid states are reported, never rejected at mutation time.
    #[must_use]
    pub fn validate(&self) -> MessageList {
        let mut messages = MessageList::new();
        let name = self.name();

        let mut by_date: BTreeMap<NaiveDate, Vec<&PartId>> = BTreeMap::new();
        for generation in self.generations() {
            let location = InvalidProperty::property(
                name,
                Some(ContainerRef::Generation(generation.id().clone())),
                "validFrom",
            );
            match generation.valid_from() {
                None => messages.add(
                    Message::error(
                        codes::GENERATION_WITHOUT_VALID_FROM,
                        format!("generation {} of {name} has no valid-from date", generation.id()),
                    )
                    .at(location),
                ),
                Some(from) => {
                    if let Some(to) = self.valid_to().filter(|to| from > *to) {
                        messages.add(
                            Message::error(
                                codes::GENERATION_AFTER_VALID_TO,
                                format!(
                                    "generation valid from {from} starts after {name} ends on {to}"
                                ),
                            )
                            .at(location),
                        );
                    }
                    by_date.entry(from).or_default().push(generation.id());
                }
            }
        }
        for (date, ids) in by_date.into_iter().filter(|(_, ids)| ids.len() > 1) {
            let mut message = Message::error(
                codes::DUPLICATE_GENERATION_VALID_FROM,
                format!("{} generations of {name} are valid from {date}", ids.len()),
            );
            for id in ids {
                message = message.at(InvalidProperty::property(
                    name,
                    Some(ContainerRef::Generation(id.clone())),
                    "validFrom",
                ));
            }
            messages.add(message);
        }

        if self.is_changing_over_time() && self.generations().is_empty() {
            messages.add(
                Message::warning(
                    codes::NO_GENERATIONS,
                    format!("{name} is changing over time but has no generations"),
                )
                .at(InvalidProperty::object(name)),
            );
        }
        if !self.is_changing_over_time() && !self.generations().is_empty() {
            messages.add(
                Message::warning(
                    codes::UNEXPECTED_GENERATIONS,
                    format!(
                        "{name} is not changing over time but has {} generations",
                        self.generations().len()
                    ),
                )
                .at(InvalidProperty::object(name)),
            );
        }

        for container in self.container_refs() {
            let Some(values) = self.container_at(&container) else {
                continue;
            };
            for link in values.links().iter().filter(|l| !l.cardinality().is_consistent()) {
                messages.add(
                    Message::error(
                        codes::INCONSISTENT_CARDINALITY,
                        format!(
                            "link '{}' to {} has inconsistent cardinality {} (default {})",
                            link.association(),
                            link.target(),
                            link.cardinality(),
                            link.cardinality().default
                        ),
                    )
                    .at(InvalidProperty::property(
                        name,
                        Some(container.clone()),
                        link.association(),
                    )),
                );
            }
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{Cardinality, Link};
    use crate::property_value::{PropertyValue, PropertyValueContent, PropertyValueKind};
    use crate::value::ValueHolder;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn object() -> ConfigurationObject {
        ConfigurationObject::new("products.O".parse().unwrap(), "Motor".parse().unwrap())
    }

    fn two_generations() -> ConfigurationObject {
        object()
            .with_generation(Generation::with_id(PartId::new("g2"), Some(date(2025, 1, 1))))
            .with_generation(Generation::with_id(PartId::new("g1"), Some(date(2024, 1, 1))))
    }

    #[test]
    fn effective_on_examples() {
        let o = two_generations();
        assert_eq!(o.generation_effective_on(date(2024, 6, 1)).unwrap().id().as_str(), "g1");
        assert_eq!(o.generation_effective_on(date(2025, 6, 1)).unwrap().id().as_str(), "g2");
        assert!(o.generation_effective_on(date(2023, 1, 1)).is_none());
    }

    #[test]
    fn effective_on_respects_valid_to() {
        let o = two_generations().with_valid_to(date(2025, 12, 31));
        assert!(o.generation_effective_on(date(2026, 1, 1)).is_none());
        assert_eq!(
            o.best_matching_generation_effective_on(date(2026, 1, 1)).unwrap().id().as_str(),
            "g2"
        );
        assert_eq!(
            o.best_matching_generation_effective_on(date(2020, 1, 1)).unwrap().id().as_str(),
            "g1"
        );
    }

    #[test]
    fn ranges_chain_and_clip() {
        let o = two_generations().with_valid_to(date(2025, 6, 30));
        let ranges = o.generation_ranges();
        assert_eq!(ranges[0].valid_to, Some(date(2024, 12, 31)));
        assert_eq!(ranges[1].valid_to, Some(date(2025, 6, 30)));
        assert_eq!(
            o.generation_valid_to(&PartId::new("g1")).unwrap(),
            Some(date(2024, 12, 31))
        );
        assert!(o.generation_valid_to(&PartId::new("nope")).is_err());
    }

    #[test]
    fn object_valid_to_clips_inner_generation() {
        let o = two_generations().with_valid_to(date(2024, 3, 31));
        assert_eq!(o.generation_ranges()[0].valid_to, Some(date(2024, 3, 31)));
    }

    #[test]
    fn new_generation_copies_predecessor() {
        let ctx = ChangeContext::new();
        let first = Generation::new(date(2024, 1, 1))
            .with_value(PropertyValue::new(
                "risk",
                PropertyValueContent::AttributeValue {
                    value: ValueHolder::single("A"),
                },
            ))
            .unwrap();
        let first_id = first.id().clone();
        let mut o = object().with_generation(first);

        let id = o.new_generation(date(2024, 7, 1), &ctx).unwrap();
        assert_eq!(o.generation_count(), 2);
        let copy = o.generation_by_id(&id).unwrap();
        let value = copy
            .container()
            .values()
            .get("risk", PropertyValueKind::AttributeValue)
            .unwrap();
        assert_eq!(value.value_holder(), Some(&ValueHolder::single("A")));
        let original = o.generation_by_id(&first_id).unwrap();
        assert_ne!(
            value.id(),
            original
                .container()
                .values()
                .get("risk", PropertyValueKind::AttributeValue)
                .unwrap()
                .id()
        );
    }

    #[test]
    fn new_generation_before_first_starts_empty() {
        let ctx = ChangeContext::new();
        let first = Generation::new(date(2024, 1, 1))
            .with_link(Link::new("cover", "Fire".parse().unwrap()));
        let mut o = object().with_generation(first);
        let id = o.new_generation(date(2023, 1, 1), &ctx).unwrap();
        assert_eq!(o.generation(0).unwrap().id(), &id);
        assert!(o.generation(0).unwrap().container().links().is_empty());
    }

    #[test]
    fn new_generation_requires_changing_over_time() {
        let ctx = ChangeContext::new();
        let mut o = object().with_changing_over_time(false);
        assert_eq!(
            o.new_generation(date(2024, 1, 1), &ctx),
            Err(ModelError::NotChangingOverTime(o.name().clone()))
        );
    }

    #[test]
    fn delete_generation_keeps_other_dates() {
        let ctx = ChangeContext::new();
        let mut o = two_generations();
        let removed = o.delete_generation(&PartId::new("g1"), &ctx).unwrap();
        assert_eq!(removed.valid_from(), Some(date(2024, 1, 1)));
        assert_eq!(o.generation(0).unwrap().valid_from(), Some(date(2025, 1, 1)));
        assert_eq!(
            o.delete_generation(&PartId::new("g1"), &ctx),
            Err(ModelError::PartNotFound(PartId::new("g1")))
        );
    }

    #[test]
    fn reassign_drops_expired_and_redates_first() {
        let ctx = ChangeContext::new();
        let mut o = two_generations();
        let id = o.reassign_generations(date(2025, 3, 1), &ctx).unwrap();
        assert_eq!(id.as_str(), "g2");
        assert_eq!(o.generation_count(), 1);
        assert_eq!(o.generation(0).unwrap().valid_from(), Some(date(2025, 3, 1)));
        assert_eq!(
            o.generation_effective_on(date(2025, 3, 1)).unwrap().id().as_str(),
            "g2"
        );
    }

    #[test]
    fn reassign_earlier_moves_first_generation() {
        let ctx = ChangeContext::new();
        let mut o = two_generations();
        let id = o.reassign_generations(date(2023, 6, 1), &ctx).unwrap();
        assert_eq!(id.as_str(), "g1");
        assert_eq!(o.generation_count(), 2);
        assert_eq!(o.generation(0).unwrap().valid_from(), Some(date(2023, 6, 1)));
    }

    #[test]
    fn reassign_creates_generation_when_all_expired() {
        let ctx = ChangeContext::new();
        let mut o = object()
            .with_valid_to(date(2024, 12, 31))
            .with_generation(Generation::with_id(PartId::new("g1"), Some(date(2024, 1, 1))));
        let id = o.reassign_generations(date(2025, 2, 1), &ctx).unwrap();
        assert_ne!(id.as_str(), "g1");
        assert_eq!(o.generation_count(), 1);
        assert_eq!(o.generation(0).unwrap().valid_from(), Some(date(2025, 2, 1)));
    }

    #[test]
    fn retain_only_effective_generation() {
        let ctx = ChangeContext::new();
        let mut o = two_generations();
        let id = o
            .retain_only_generation(date(2025, 6, 1), date(2020, 1, 1), &ctx)
            .unwrap();
        assert_eq!(id.as_str(), "g2");
        assert_eq!(o.generation_count(), 1);
        assert_eq!(o.generation(0).unwrap().valid_from(), Some(date(2020, 1, 1)));

        let mut empty = object();
        assert_eq!(
            empty.retain_only_generation(date(2025, 6, 1), date(2020, 1, 1), &ctx),
            Err(ModelError::NoGenerations(empty.name().clone()))
        );
    }

    #[test]
    fn retain_falls_back_to_first() {
        let ctx = ChangeContext::new();
        let mut o = two_generations();
        let id = o
            .retain_only_generation(date(2000, 1, 1), date(2001, 1, 1), &ctx)
            .unwrap();
        assert_eq!(id.as_str(), "g1");
    }

    #[test]
    fn set_valid_from_resorts() {
        let ctx = ChangeContext::new();
        let mut o = two_generations();
        o.set_generation_valid_from(&PartId::new("g1"), date(2026, 1, 1), &ctx)
            .unwrap();
        assert_eq!(o.generation(0).unwrap().id().as_str(), "g2");
        assert_eq!(o.latest_generation().unwrap().id().as_str(), "g1");
    }

    #[test]
    fn undated_generation_sorts_first() {
        let o = two_generations().with_generation(Generation::with_id(PartId::new("g0"), None));
        assert_eq!(o.generation(0).unwrap().id().as_str(), "g0");
        assert_eq!(o.generation_ranges()[0].valid_to, None);
    }

    #[test]
    fn validation_reports_timeline_problems() {
        let o = two_generations()
            .with_valid_to(date(2024, 6, 30))
            .with_generation(Generation::with_id(PartId::new("dup"), Some(date(2024, 1, 1))))
            .with_generation(Generation::with_id(PartId::new("undated"), None));
        let messages = o.validate();
        assert!(messages.contains_code(codes::DUPLICATE_GENERATION_VALID_FROM));
        assert!(messages.contains_code(codes::GENERATION_WITHOUT_VALID_FROM));
        assert!(messages.contains_code(codes::GENERATION_AFTER_VALID_TO));
        assert_eq!(
            messages
                .by_code(codes::DUPLICATE_GENERATION_VALID_FROM)
                .next()
                .unwrap()
                .invalid
                .len(),
            2
        );
    }

    #[test]
    fn validation_reports_generation_mismatch_and_cardinality() {
        let messages = object().validate();
        assert!(messages.contains_code(codes::NO_GENERATIONS));
        assert!(!messages.has_errors());

        let o = two_generations()
            .with_changing_over_time(false)
            .with_link(
                Link::new("cover", "Fire".parse().unwrap())
                    .with_cardinality(Cardinality::new(2, Some(1), 1)),
            );
        let messages = o.validate();
        assert!(messages.contains_code(codes::UNEXPECTED_GENERATIONS));
        assert!(messages.contains_code(codes::INCONSISTENT_CARDINALITY));
    }

    #[test]
    fn valid_object_has_no_messages() {
        assert!(two_generations().validate().is_empty());
    }
}
