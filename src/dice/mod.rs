//! Dice pool core
//!
//! Synchronous, single-threaded model of dice heaps and the pool holding them:
//! - Roll engine with an injectable, seedable generator
//! - Heaps of same-sided dice with change notifications
//! - Pools keyed by facets, bubbling heap events to their listeners
//! - Descriptor notation ("3d6", "1d6+2d10")

mod descriptor;
mod events;
mod heap;
mod pool;
mod roll;

pub use descriptor::{parse_descriptor, parse_term, DiceTerm};
pub use events::{HeapEvent, Listener, Notifier, PoolEvent};
pub use heap::Heap;
pub use pool::{HeapSnapshot, Pool, PoolSnapshot, DEFAULT_MAX_DICE_PER_HEAP};
pub use roll::{roll, RollEngine, RollMode, RollOutcome};
