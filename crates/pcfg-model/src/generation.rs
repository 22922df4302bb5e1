//! Generations: effective-dated snapshots of a configuration object

use crate::container::ValueContainer;
use crate::error::ModelError;
use crate::link::Link;
use crate::name::PartId;
use crate::property_value::PropertyValue;
use chrono::NaiveDate;

/// One time slice of a configuration object
///
/// A generation only knows where it starts. Where it ends depends on its
/// successor and on the owning object, see
/// [`ConfigurationObject::generation_ranges`](crate::ConfigurationObject::generation_ranges).
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    id: PartId,
    valid_from: Option<NaiveDate>,
    container: ValueContainer,
}

impl Generation {
    /// Create empty generation with a fresh part id
    #[inline]
    #[must_use]
    pub fn new(valid_from: NaiveDate) -> Self {
        Self::with_id(PartId::generate(), Some(valid_from))
    }

    /// Create empty generation with a known part id
    ///
    /// `valid_from` is only absent while a generation is being read from
    /// an incomplete document; validation reports it.
    #[inline]
    #[must_use]
    pub fn with_id(id: PartId, valid_from: Option<NaiveDate>) -> Self {
        Self {
            id,
            valid_from,
            container: ValueContainer::new(),
        }
    }

    pub(crate) fn from_parts(
        id: PartId,
        valid_from: Option<NaiveDate>,
        container: ValueContainer,
    ) -> Self {
        Self {
            id,
            valid_from,
            container,
        }
    }

    /// Add a property value while building the generation
    ///
    /// # Errors
    /// Returns error if a value of the same kind exists for the property
    pub fn with_value(mut self, value: PropertyValue) -> Result<Self, ModelError> {
        self.container.values_mut().add(value)?;
        Ok(self)
    }

    /// Add a link while building the generation
    #[inline]
    #[must_use]
    pub fn with_link(mut self, link: Link) -> Self {
        self.container.add_link(link);
        self
    }

    /// Part identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> &PartId {
        &self.id
    }

    /// First day of validity (inclusive)
    #[inline]
    #[must_use]
    pub fn valid_from(&self) -> Option<NaiveDate> {
        self.valid_from
    }

    /// Values and links of this generation
    #[inline]
    #[must_use]
    pub fn container(&self) -> &ValueContainer {
        &self.container
    }

    pub(crate) fn container_mut(&mut self) -> &mut ValueContainer {
        &mut self.container
    }

    pub(crate) fn set_valid_from(&mut self, valid_from: Option<NaiveDate>) {
        self.valid_from = valid_from;
    }
}

/// Validity window of one generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRange {
    /// Generation id
    pub id: PartId,
    /// First valid day
    pub valid_from: Option<NaiveDate>,
    /// Last valid day, open-ended if absent
    pub valid_to: Option<NaiveDate>,
}

impl GenerationRange {
    /// Check if `date` falls into the range
    #[inline]
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.valid_from.map_or(true, |from| from <= date)
            && self.valid_to.map_or(true, |to| date <= to)
    }
}
