//! Computed deltas and fix reports

use crate::delta_type::DeltaType;
use crate::entry::{DeltaEntry, FixOutcome};
use crate::error::DeltaError;
use pcfg_model::{ChangeContext, ConfigurationObject, QualifiedName};
use std::collections::BTreeMap;

/// Ordered delta entries of one configuration object
///
/// Entries are grouped by [`DeltaType`] in declaration order and keep
/// container order within a group.
#[derive(Debug, Clone)]
pub struct Delta {
    object: QualifiedName,
    entries: Vec<DeltaEntry>,
}

impl Delta {
    /// Create delta, grouping entries by type
    #[must_use]
    pub fn new(object: QualifiedName, mut entries: Vec<DeltaEntry>) -> Self {
        entries.sort_by_key(DeltaEntry::delta_type);
        Self { object, entries }
    }

    /// Object the delta was computed for
    #[inline]
    #[must_use]
    pub fn object(&self) -> &QualifiedName {
        &self.object
    }

    /// Check if the object matches its type
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in grouping order
    pub fn iter(&self) -> impl Iterator<Item = &DeltaEntry> {
        self.entries.iter()
    }

    /// Entries of one type
    pub fn by_type(&self, delta_type: DeltaType) -> impl Iterator<Item = &DeltaEntry> {
        self.entries
            .iter()
            .filter(move |e| e.delta_type() == delta_type)
    }

    /// Entry count per type
    #[must_use]
    pub fn counts(&self) -> BTreeMap<DeltaType, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.delta_type()).or_insert(0) += 1;
        }
        counts
    }

    /// Check if any fix would delete stored data
    #[must_use]
    pub fn has_destructive(&self) -> bool {
        self.entries.iter().any(|e| e.delta_type().is_destructive())
    }

    /// Fix every entry in order
    ///
    /// # Errors
    /// Returns error if `object` is not the object the delta was computed
    /// for, or on a structural model failure
    pub fn fix_all(
        &self,
        object: &mut ConfigurationObject,
        ctx: &ChangeContext,
    ) -> Result<FixReport, DeltaError> {
        self.fix_where(object, ctx, |_| true)
    }

    /// Fix every entry whose fix keeps stored data
    ///
    /// # Errors
    /// See [`Delta::fix_all`]
    pub fn fix_non_destructive(
        &self,
        object: &mut ConfigurationObject,
        ctx: &ChangeContext,
    ) -> Result<FixReport, DeltaError> {
        self.fix_where(object, ctx, |e| !e.delta_type().is_destructive())
    }

    /// Fix the entries accepted by `filter`, skipping the rest
    ///
    /// # Errors
    /// See [`Delta::fix_all`]
    pub fn fix_where(
        &self,
        object: &mut ConfigurationObject,
        ctx: &ChangeContext,
        mut filter: impl FnMut(&DeltaEntry) -> bool,
    ) -> Result<FixReport, DeltaError> {
        if object.name() != &self.object {
            return Err(DeltaError::ObjectMismatch {
                expected: self.object.clone(),
                found: object.name().clone(),
            });
        }

        let mut report = FixReport::default();
        for entry in &self.entries {
            if !filter(entry) {
                report.skipped.push(entry.clone());
                continue;
            }
            match entry.fix(object, ctx)? {
                FixOutcome::Applied => report.applied += 1,
                FixOutcome::NoOp => report.no_op += 1,
                FixOutcome::ManualActionRequired(reason) => {
                    report.manual.push((entry.delta_type(), reason));
                }
            }
        }
        tracing::info!(
            object = %self.object,
            applied = report.applied,
            no_op = report.no_op,
            manual = report.manual.len(),
            skipped = report.skipped.len(),
            "fixed delta"
        );
        Ok(report)
    }
}

impl<'a> IntoIterator for &'a Delta {
    type Item = &'a DeltaEntry;
    type IntoIter = std::slice::Iter<'a, DeltaEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Outcome of fixing a delta
#[derive(Debug, Clone, Default)]
pub struct FixReport {
    /// Entries that changed the object
    pub applied: usize,
    /// Entries with nothing left to fix
    pub no_op: usize,
    /// Entries left for manual action, with the reason
    pub manual: Vec<(DeltaType, String)>,
    /// Entries not attempted
    pub skipped: Vec<DeltaEntry>,
}

impl FixReport {
    /// Check if every attempted entry was resolved
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.manual.is_empty() && self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcfg_model::{ContainerRef, PartId, PropertyValueKind};

    fn name(s: &str) -> QualifiedName {
        s.parse().unwrap()
    }

    fn entry(delta_type: DeltaType) -> DeltaEntry {
        match delta_type {
            DeltaType::InvalidGenerations => DeltaEntry::InvalidGenerations {
                container: ContainerRef::Object,
                generations: 1,
            },
            _ => DeltaEntry::ValueWithoutProperty {
                container: ContainerRef::Object,
                part: PartId::new("p1"),
                property: "foo".to_string(),
                kind: PropertyValueKind::AttributeValue,
            },
        }
    }

    #[test]
    fn entries_grouped_by_type() {
        let delta = Delta::new(
            name("Gold"),
            vec![
                entry(DeltaType::ValueWithoutProperty),
                entry(DeltaType::InvalidGenerations),
            ],
        );
        let types: Vec<_> = delta.iter().map(DeltaEntry::delta_type).collect();
        assert_eq!(
            types,
            vec![DeltaType::InvalidGenerations, DeltaType::ValueWithoutProperty]
        );
        assert_eq!(delta.counts().get(&DeltaType::ValueWithoutProperty), Some(&1));
        assert!(delta.has_destructive());
    }

    #[test]
    fn fix_rejects_other_object() {
        let delta = Delta::new(name("Gold"), Vec::new());
        let mut other = ConfigurationObject::new(name("Silver"), name("Motor"));
        let result = delta.fix_all(&mut other, &ChangeContext::new());
        assert!(matches!(result, Err(DeltaError::ObjectMismatch { .. })));
    }

    #[test]
    fn non_destructive_run_skips_deletions() {
        let delta = Delta::new(name("Gold"), vec![entry(DeltaType::ValueWithoutProperty)]);
        let mut object = ConfigurationObject::new(name("Gold"), name("Motor"));
        let report = delta
            .fix_non_destructive(&mut object, &ChangeContext::new())
            .unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.applied, 0);
        assert!(!report.is_complete());
    }

    #[test]
    fn fixing_a_vanished_part_is_noop() {
        let delta = Delta::new(name("Gold"), vec![entry(DeltaType::ValueWithoutProperty)]);
        let mut object = ConfigurationObject::new(name("Gold"), name("Motor"));
        let report = delta.fix_all(&mut object, &ChangeContext::new()).unwrap();
        assert_eq!(report.no_op, 1);
        assert!(report.is_complete());
    }
}
