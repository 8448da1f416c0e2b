//! Score-driven cache replacement over a cyclic broadcast
//!
//! The client keeps a fixed number of pages. Each broadcast tick offers one
//! page; the active score table decides whether it displaces the least
//! valuable cached page.

mod simulator;
mod trace;

pub use simulator::{CacheSimulator, SimulationOutcome};
pub use trace::{Admission, TraceEntry, Transition};

use crate::scoring::{ScoreTable, Symbol};
use serde::Serialize;
use std::fmt;
use std::num::NonZeroUsize;

/// Fixed-capacity page cache
///
/// Slots are ordered; an empty slot holds `None`. A symbol never occupies
/// two slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cache {
    slots: Vec<Option<Symbol>>,
}

impl Cache {
    /// Create a cache with `capacity` empty slots
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: vec![None; capacity.get()],
        }
    }

    /// Whether no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Whether `symbol` is cached
    pub fn contains(&self, symbol: Symbol) -> bool {
        self.slots.contains(&Some(symbol))
    }

    /// Slot contents in order
    pub fn slots(&self) -> &[Option<Symbol>] {
        &self.slots
    }

    /// Offer `symbol` to the cache.
    ///
    /// An empty cache takes it at slot 0, a partially filled cache takes it
    /// at the first free slot, and a full cache swaps it for the
    /// lowest-scored page only when `symbol` scores strictly higher.
    pub fn admit(&mut self, symbol: Symbol, scores: &ScoreTable) -> Admission {
        if self.is_empty() {
            self.slots[0] = Some(symbol);
            return Admission::Initial;
        }
        if self.contains(symbol) {
            return Admission::Unchanged;
        }
        if let Some(slot) = self.slots.iter().position(Option::is_none) {
            self.slots[slot] = Some(symbol);
            return Admission::Filled { slot };
        }

        let Some((slot, victim, victim_score)) = self.least_valuable(scores) else {
            return Admission::Unchanged;
        };
        if scores.eviction_key(symbol) > victim_score {
            self.slots[slot] = Some(symbol);
            Admission::Replaced {
                slot,
                evicted: victim,
            }
        } else {
            Admission::Unchanged
        }
    }

    /// Lowest-scored cached page; the earliest slot wins ties
    fn least_valuable(&self, scores: &ScoreTable) -> Option<(usize, Symbol, f64)> {
        let mut least: Option<(usize, Symbol, f64)> = None;
        for (slot, cached) in self.slots.iter().enumerate() {
            let Some(symbol) = *cached else { continue };
            let score = scores.eviction_key(symbol);
            match least {
                Some((_, _, best)) if score >= best => {}
                _ => least = Some((slot, symbol, score)),
            }
        }
        least
    }
}

impl fmt::Display for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", trace::render_slots(&self.slots))
    }
}
