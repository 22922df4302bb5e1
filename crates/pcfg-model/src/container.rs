//! Property value containers
//!
//! A configuration object and each of its generations own a
//! [`ValueContainer`]. Containers are addressed within their object by a
//! [`ContainerRef`] handle.

use crate::link::Link;
use crate::name::{PartId, QualifiedName};
use crate::store::PropertyValueStore;
use std::fmt::{self, Display, Formatter};

/// Handle of a container inside one configuration object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerRef {
    /// The object's own (non time-sliced) container
    Object,

    /// The container of a generation
    Generation(PartId),
}

impl ContainerRef {
    /// Check if this is a generation handle
    #[inline]
    #[must_use]
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }
}

impl Display for ContainerRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => f.write_str("object"),
            Self::Generation(id) => write!(f, "generation {id}"),
        }
    }
}

/// What kind of container a property value lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// The object itself
    Object,
    /// A generation
    Generation,
}

/// Facts about a container needed to decide which properties it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Object or generation
    pub kind: ContainerKind,
    /// Type of the owning object
    pub type_name: QualifiedName,
    /// Whether the owning object is changing over time
    pub object_changing_over_time: bool,
}

impl ContainerInfo {
    /// Check if the container holds properties with the given changing-over-time flag
    ///
    /// Generations hold changing-over-time properties. The object holds the
    /// static ones, and every property if it is not changing over time itself.
    #[inline]
    #[must_use]
    pub fn is_container_for(&self, property_changing_over_time: bool) -> bool {
        match self.kind {
            ContainerKind::Object => !property_changing_over_time || !self.object_changing_over_time,
            ContainerKind::Generation => {
                property_changing_over_time && self.object_changing_over_time
            }
        }
    }
}

/// Property values and links of one container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueContainer {
    values: PropertyValueStore,
    links: Vec<Link>,
}

impl ValueContainer {
    /// Create empty container
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Property values
    #[inline]
    #[must_use]
    pub fn values(&self) -> &PropertyValueStore {
        &self.values
    }

    /// Mutable property values
    #[inline]
    pub fn values_mut(&mut self) -> &mut PropertyValueStore {
        &mut self.values
    }

    /// Links in insertion order
    #[inline]
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Link by part id
    #[inline]
    #[must_use]
    pub fn link(&self, id: &PartId) -> Option<&Link> {
        self.links.iter().find(|l| l.id() == id)
    }

    /// Mutable link by part id
    #[inline]
    pub fn link_mut(&mut self, id: &PartId) -> Option<&mut Link> {
        self.links.iter_mut().find(|l| l.id() == id)
    }

    /// Links of an association
    pub fn links_for<'a>(&'a self, association: &'a str) -> impl Iterator<Item = &'a Link> {
        self.links
            .iter()
            .filter(move |l| l.association() == association)
    }

    /// Link along `association` to `target`
    #[inline]
    #[must_use]
    pub fn find_link(&self, association: &str, target: &QualifiedName) -> Option<&Link> {
        self.links.iter().find(|l| l.matches(association, target))
    }

    /// Add a link, `false` if the part is already present
    #[inline]
    pub fn add_link(&mut self, link: Link) -> bool {
        if self.link(link.id()).is_some() {
            return false;
        }
        self.links.push(link);
        true
    }

    /// Remove a link, `None` if it is not present
    #[inline]
    pub fn remove_link(&mut self, id: &PartId) -> Option<Link> {
        let pos = self.links.iter().position(|l| l.id() == id)?;
        Some(self.links.remove(pos))
    }

    /// Check if the container holds a part
    #[inline]
    #[must_use]
    pub fn contains_part(&self, id: &PartId) -> bool {
        self.values.contains_id(id) || self.link(id).is_some()
    }

    /// Structural copy with fresh part ids
    #[must_use]
    pub fn copy_with_new_ids(&self) -> Self {
        let mut copy = Self::new();
        for value in self.values.iter() {
            // ids are fresh and kinds unique per name in the source store
            let _ = copy.values.add(value.copy_with_new_id());
        }
        copy.links = self.links.iter().map(Link::copy_with_new_id).collect();
        copy
    }

    /// Remove every value and link
    #[inline]
    pub fn clear(&mut self) {
        self.values.clear();
        self.links.clear();
    }
}
