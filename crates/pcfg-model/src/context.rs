//! Change notification and dirty tracking
//!
//! Every mutating model operation takes a [`ChangeContext`]. The context
//! delivers a [`ChangeEvent`] to the registered observers and marks the
//! owning configuration object dirty.

use crate::container::ContainerRef;
use crate::name::{PartId, QualifiedName};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fmt::{self, Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// What happened to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A part was added to a container
    PartAdded,
    /// A part was removed from a container
    PartRemoved,
    /// A part's content or status changed
    PartChanged,
    /// An object-level attribute changed (validity, template, generations order)
    ObjectChanged,
}

/// A single model change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Object that changed
    pub object: QualifiedName,
    /// Container involved, if any
    pub container: Option<ContainerRef>,
    /// Part involved, if any
    pub part: Option<PartId>,
    /// Kind of change
    pub kind: ChangeKind,
}

impl ChangeEvent {
    /// Part-level event
    #[inline]
    #[must_use]
    pub fn part(
        kind: ChangeKind,
        object: &QualifiedName,
        container: &ContainerRef,
        part: &PartId,
    ) -> Self {
        Self {
            object: object.clone(),
            container: Some(container.clone()),
            part: Some(part.clone()),
            kind,
        }
    }

    /// Object-level event
    #[inline]
    #[must_use]
    pub fn object(object: &QualifiedName) -> Self {
        Self {
            object: object.clone(),
            container: None,
            part: None,
            kind: ChangeKind::ObjectChanged,
        }
    }
}

/// Receiver of change events
pub trait ChangeObserver: Send + Sync {
    /// Called synchronously after each change
    fn on_change(&self, event: &ChangeEvent);
}

impl<F> ChangeObserver for F
where
    F: Fn(&ChangeEvent) + Send + Sync,
{
    fn on_change(&self, event: &ChangeEvent) {
        self(event);
    }
}

/// Handle returned by [`ChangeContext::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Observer registry and per-object dirty flags
///
/// The model is single-writer; the locks only make the context shareable
/// and let observers subscribe or unsubscribe while an event is delivered
/// (delivery works on a snapshot of the observer list).
#[derive(Default)]
pub struct ChangeContext {
    observers: Mutex<Vec<(SubscriptionId, Arc<dyn ChangeObserver>)>>,
    dirty: Mutex<BTreeSet<QualifiedName>>,
    next_id: AtomicU64,
}

impl ChangeContext {
    /// Create context without observers
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer
    pub fn subscribe(&self, observer: Arc<dyn ChangeObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.lock().push((id, observer));
        id
    }

    /// Remove an observer, `false` if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    /// Number of registered observers
    #[inline]
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Mark the object dirty and deliver the event
    pub fn notify(&self, event: ChangeEvent) {
        tracing::trace!(object = %event.object, kind = ?event.kind, "model changed");
        self.dirty.lock().insert(event.object.clone());

        let snapshot: Vec<Arc<dyn ChangeObserver>> = self
            .observers
            .lock()
            .iter()
            .map(|(_, o)| Arc::clone(o))
            .collect();
        for observer in snapshot {
            observer.on_change(&event);
        }
    }

    /// Check if an object has unsaved changes
    #[inline]
    #[must_use]
    pub fn is_dirty(&self, object: &QualifiedName) -> bool {
        self.dirty.lock().contains(object)
    }

    /// Objects with unsaved changes, sorted by name
    #[must_use]
    pub fn dirty_objects(&self) -> Vec<QualifiedName> {
        self.dirty.lock().iter().cloned().collect()
    }

    /// Clear the dirty flag of an object (after saving it)
    #[inline]
    pub fn mark_clean(&self, object: &QualifiedName) {
        self.dirty.lock().remove(object);
    }
}

impl Debug for ChangeContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeContext")
            .field("observers", &self.observer_count())
            .field("dirty", &self.dirty_objects())
            .finish()
    }
}
