//! A heap: some number of same-sided dice rolled together

use std::fmt;

use tracing::debug;

use super::events::{HeapEvent, Notifier};
use super::roll::{RollEngine, RollOutcome};
use crate::error::{DiceError, Result};

/// Dice sharing one facet count, with the result of their last roll
#[derive(Debug)]
pub struct Heap {
    facets: u32,
    count: u32,
    last: RollOutcome,
    events: Notifier<HeapEvent>,
}

impl Heap {
    /// Create a heap holding a single die with `facets` sides
    pub fn new(facets: u32) -> Result<Self> {
        if facets < 1 {
            return Err(DiceError::InvalidFacets(facets));
        }

        Ok(Self {
            facets,
            count: 1,
            last: RollOutcome::default(),
            events: Notifier::new(),
        })
    }

    /// Create a heap with a listener already attached
    pub fn with_listener<F>(facets: u32, listener: F) -> Result<Self>
    where
        F: Fn(&HeapEvent) + Send + Sync + 'static,
    {
        let heap = Self::new(facets)?;
        heap.subscribe(listener);
        Ok(heap)
    }

    /// Register a listener for this heap's events
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&HeapEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener);
    }

    pub fn facets(&self) -> u32 {
        self.facets
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Per-die results of the last roll (empty before the first roll)
    pub fn outcomes(&self) -> &[u32] {
        &self.last.outcomes
    }

    /// Sum of the last roll (0 before the first roll)
    pub fn total(&self) -> u64 {
        self.last.total
    }

    /// Last roll's outcomes as display text, e.g. "3, 1, 6"
    pub fn outcome_text(&self) -> String {
        self.last
            .outcomes
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether removing a die would change anything
    pub fn can_remove_die(&self) -> bool {
        self.count > 1
    }

    /// Die count `add_dice(delta)` would aim for, before saturating at `u32::MAX`
    pub fn count_after(&self, delta: i64) -> u64 {
        let target = i64::from(self.count).saturating_add(delta).max(1);
        u64::try_from(target).unwrap_or(1)
    }

    /// Add `delta` dice; negative values remove dice, but one always stays.
    ///
    /// Returns whether the count changed. Listeners hear about it only then.
    pub fn add_dice(&mut self, delta: i64) -> bool {
        let old = self.count;
        self.count = u32::try_from(self.count_after(delta)).unwrap_or(u32::MAX);

        if self.count == old {
            return false;
        }

        debug!(facets = self.facets, old, new = self.count, "heap count changed");
        self.events.emit(&HeapEvent::Changed {
            facets: self.facets,
            count: self.count,
        });
        true
    }

    /// Roll every die in the heap, keep the outcome, and return the total
    pub fn roll(&mut self, engine: &mut RollEngine) -> u64 {
        self.last = engine.roll(self.count, self.facets);
        debug!(
            heap = %self,
            total = self.last.total,
            outcomes = %self.outcome_text(),
            "heap rolled"
        );
        self.events.emit(&HeapEvent::Rolled {
            facets: self.facets,
            total: self.last.total,
        });
        self.last.total
    }

    /// Descriptor like "3d6"
    pub fn description(&self) -> String {
        self.to_string()
    }

    /// Ask whoever owns this heap to remove it. Returns this heap's facets.
    pub fn request_removal(&self) -> u32 {
        self.events.emit(&HeapEvent::RemovalRequested {
            facets: self.facets,
        });
        self.facets
    }
}

impl Default for Heap {
    /// A single six-sided die
    fn default() -> Self {
        Self {
            facets: 6,
            count: 1,
            last: RollOutcome::default(),
            events: Notifier::new(),
        }
    }
}

impl fmt::Display for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.facets)
    }
}
