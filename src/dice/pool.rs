//! A pool: every heap a user is managing at once
//!
//! Heaps are keyed by facet count, so a pool holds at most one heap per die
//! type and always iterates them in ascending facets order. The pool never
//! drops below one heap.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::descriptor::parse_descriptor;
use super::events::{Notifier, PoolEvent};
use super::heap::Heap;
use super::roll::RollEngine;
use crate::error::{DiceError, Result};

/// Serializable view of one heap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeapSnapshot {
    pub facets: u32,
    pub count: u32,
    pub outcomes: Vec<u32>,
    pub total: u64,
    pub description: String,
}

impl From<&Heap> for HeapSnapshot {
    fn from(heap: &Heap) -> Self {
        Self {
            facets: heap.facets(),
            count: heap.count(),
            outcomes: heap.outcomes().to_vec(),
            total: heap.total(),
            description: heap.description(),
        }
    }
}

/// Serializable view of a whole pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub descriptor: String,
    pub last_total: u64,
    pub heaps: Vec<HeapSnapshot>,
}

/// Dice a single heap may hold unless configured otherwise
pub const DEFAULT_MAX_DICE_PER_HEAP: u32 = 1000;

/// Ordered set of heaps, unique by facets
#[derive(Debug)]
pub struct Pool {
    heaps: BTreeMap<u32, Heap>,
    engine: RollEngine,
    events: Notifier<PoolEvent>,
    last_total: u64,
    max_dice_per_heap: u32,
}

impl Pool {
    /// A pool holding one 1d6 heap, rolling with OS entropy
    pub fn new() -> Self {
        Self::with_engine(RollEngine::default())
    }

    /// A pool holding one 1d6 heap, rolling with `engine`
    pub fn with_engine(engine: RollEngine) -> Self {
        let mut pool = Self::empty(engine);
        pool.adopt(Heap::default());
        pool
    }

    /// Build a pool from descriptor notation such as "1d6+2d10".
    ///
    /// Terms with the same facets are merged into one heap.
    pub fn from_descriptor(descriptor: &str, engine: RollEngine) -> Result<Self> {
        Self::from_descriptor_limited(descriptor, engine, DEFAULT_MAX_DICE_PER_HEAP)
    }

    /// Like `from_descriptor`, with an explicit per-heap dice limit
    pub fn from_descriptor_limited(
        descriptor: &str,
        engine: RollEngine,
        max_dice_per_heap: u32,
    ) -> Result<Self> {
        let mut pool = Self::empty(engine).with_max_dice_per_heap(max_dice_per_heap);

        for term in parse_descriptor(descriptor)? {
            match pool.heaps.get_mut(&term.facets) {
                Some(heap) => {
                    let delta = i64::from(term.count);
                    check_limit(heap.facets(), heap.count_after(delta), pool.max_dice_per_heap)?;
                    heap.add_dice(delta);
                }
                None => {
                    check_limit(term.facets, u64::from(term.count), pool.max_dice_per_heap)?;
                    let mut heap = Heap::new(term.facets)?;
                    heap.add_dice(i64::from(term.count) - 1);
                    pool.adopt(heap);
                }
            }
        }

        debug!(pool = %pool, "pool built from descriptor");
        Ok(pool)
    }

    fn empty(engine: RollEngine) -> Self {
        Self {
            heaps: BTreeMap::new(),
            engine,
            events: Notifier::new(),
            last_total: 0,
            max_dice_per_heap: DEFAULT_MAX_DICE_PER_HEAP,
        }
    }

    /// Cap the number of dice any heap may hold (at least 1)
    pub fn with_max_dice_per_heap(mut self, max: u32) -> Self {
        self.max_dice_per_heap = max.max(1);
        self
    }

    pub fn max_dice_per_heap(&self) -> u32 {
        self.max_dice_per_heap
    }

    /// Take ownership of a heap and bubble its events to pool listeners
    fn adopt(&mut self, heap: Heap) {
        let events = self.events.clone();
        heap.subscribe(move |event| {
            if let Some(event) = PoolEvent::from_heap(event) {
                events.emit(&event);
            }
        });
        self.heaps.insert(heap.facets(), heap);
    }

    /// Register a listener for pool events, including bubbled heap events
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&PoolEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener);
    }

    /// Add `count` dice with `facets` sides.
    ///
    /// A new heap is created if none has these facets yet; otherwise the dice
    /// join the existing heap.
    pub fn add_heap(&mut self, count: u32, facets: u32) -> Result<()> {
        if facets < 1 {
            warn!(facets, "rejected heap with no facets");
            return Err(DiceError::InvalidFacets(facets));
        }
        if count < 1 {
            warn!(count, facets, "rejected heap with no dice");
            return Err(DiceError::InvalidCount(count));
        }

        if let Some(heap) = self.heaps.get_mut(&facets) {
            let delta = i64::from(count);
            check_limit(facets, heap.count_after(delta), self.max_dice_per_heap)?;
            heap.add_dice(delta);
            return Ok(());
        }

        check_limit(facets, u64::from(count), self.max_dice_per_heap)?;
        self.adopt(Heap::new(facets)?);
        info!(facets, "heap added");
        self.events.emit(&PoolEvent::PoolChanged);

        // A new heap already holds one die
        self.add_dice(facets, i64::from(count) - 1)?;
        Ok(())
    }

    /// Add (or with a negative `delta`, remove) dice on an existing heap.
    ///
    /// Returns whether the heap's count changed. Fails without touching the
    /// heap if the result would exceed the per-heap limit.
    pub fn add_dice(&mut self, facets: u32, delta: i64) -> Result<bool> {
        match self.heaps.get_mut(&facets) {
            Some(heap) => {
                check_limit(facets, heap.count_after(delta), self.max_dice_per_heap)?;
                Ok(heap.add_dice(delta))
            }
            None => {
                warn!(facets, delta, "no heap to add dice to");
                Err(DiceError::HeapNotFound { facets })
            }
        }
    }

    /// Remove the heap with `facets` sides.
    ///
    /// Does nothing and returns false if that heap is missing or is the last one.
    pub fn remove_heap(&mut self, facets: u32) -> bool {
        if self.heaps.len() <= 1 {
            debug!(facets, "refusing to remove the last heap");
            return false;
        }
        if self.heaps.remove(&facets).is_none() {
            debug!(facets, "no heap to remove");
            return false;
        }

        info!(facets, "heap removed");
        self.events.emit(&PoolEvent::PoolChanged);
        true
    }

    /// Let the heap announce its removal request, then decide on it.
    ///
    /// Returns whether the heap was actually removed.
    pub fn request_removal(&mut self, facets: u32) -> Result<bool> {
        let heap = self
            .heaps
            .get(&facets)
            .ok_or(DiceError::HeapNotFound { facets })?;
        heap.request_removal();
        Ok(self.remove_heap(facets))
    }

    /// Roll every heap, in ascending facets order, and return the grand total
    pub fn roll_all(&mut self) -> u64 {
        let engine = &mut self.engine;
        let total: u64 = self.heaps.values_mut().map(|heap| heap.roll(engine)).sum();
        self.last_total = total;
        info!(pool = %self, total, "pool rolled");
        self.events.emit(&PoolEvent::PoolRolled { total });
        total
    }

    /// Roll one heap on its own and report only its total
    pub fn roll_single_heap(&mut self, facets: u32) -> Result<u64> {
        let heap = self
            .heaps
            .get_mut(&facets)
            .ok_or(DiceError::HeapNotFound { facets })?;
        let total = heap.roll(&mut self.engine);
        self.last_total = total;
        self.events.emit(&PoolEvent::SingleHeapRolled { facets, total });
        Ok(total)
    }

    /// Descriptor of every heap joined by '+', e.g. "1d6+2d10"
    pub fn describe_all(&self) -> String {
        self.to_string()
    }

    pub fn heap(&self, facets: u32) -> Option<&Heap> {
        self.heaps.get(&facets)
    }

    /// Heaps in ascending facets order
    pub fn heaps(&self) -> impl Iterator<Item = &Heap> {
        self.heaps.values()
    }

    /// Facet counts present, ascending
    pub fn facets(&self) -> Vec<u32> {
        self.heaps.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.heaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heaps.is_empty()
    }

    /// Most recently reported total: the grand total of `roll_all`, or a
    /// single heap's total after `roll_single_heap`
    pub fn last_total(&self) -> u64 {
        self.last_total
    }

    pub fn engine(&self) -> &RollEngine {
        &self.engine
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            descriptor: self.describe_all(),
            last_total: self.last_total,
            heaps: self.heaps().map(HeapSnapshot::from).collect(),
        }
    }
}

/// Reject a heap size above `max`
fn check_limit(facets: u32, count: u64, max: u32) -> Result<()> {
    if count > u64::from(max) {
        warn!(facets, count, max, "rejected heap above dice limit");
        return Err(DiceError::TooManyDice { facets, count, max });
    }
    Ok(())
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, heap) in self.heaps.values().enumerate() {
            if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{}", heap)?;
        }
        Ok(())
    }
}
