//! Change notifications for heaps and pools
//!
//! Heaps and pools publish events to registered listeners. A pool installs a
//! forwarding listener on every heap it creates, so pool subscribers see heap
//! changes without holding references to the heaps.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

/// A registered event callback
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Fan-out list of listeners for one event type.
///
/// Clones share the same listener list.
pub struct Notifier<E> {
    listeners: Arc<RwLock<Vec<Listener<E>>>>,
}

impl<E> Notifier<E> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register a listener
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.listeners.write().push(Arc::new(listener));
    }

    /// Deliver an event to every listener, in registration order
    pub fn emit(&self, event: &E) {
        // Listeners may subscribe further listeners; don't hold the lock while calling out.
        let listeners: Vec<Listener<E>> = self.listeners.read().clone();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Clone for Notifier<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Something happened to a single heap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HeapEvent {
    /// Die count changed
    Changed { facets: u32, count: u32 },
    /// Heap was rolled
    Rolled { facets: u32, total: u64 },
    /// Heap asks to be removed from its pool
    RemovalRequested { facets: u32 },
}

/// Something happened to a pool, including bubbled heap events
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PoolEvent {
    /// A heap was added or removed
    PoolChanged,
    /// A heap's die count changed
    HeapChanged { facets: u32 },
    /// A heap asked to be removed
    RemovalRequested { facets: u32 },
    /// Exactly one heap was rolled on its own
    SingleHeapRolled { facets: u32, total: u64 },
    /// Every heap was rolled; `total` is the grand total
    PoolRolled { total: u64 },
}

impl PoolEvent {
    /// Pool-level counterpart of a heap event, if it bubbles.
    ///
    /// Heap rolls don't bubble: the pool reports single-heap rolls itself
    /// and folds roll-all results into one grand total.
    pub fn from_heap(event: &HeapEvent) -> Option<Self> {
        match *event {
            HeapEvent::Changed { facets, .. } => Some(PoolEvent::HeapChanged { facets }),
            HeapEvent::RemovalRequested { facets } => Some(PoolEvent::RemovalRequested { facets }),
            HeapEvent::Rolled { .. } => None,
        }
    }
}
