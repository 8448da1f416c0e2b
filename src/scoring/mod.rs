//! Access-probability scoring
//!
//! Two pull-based cache-worthiness metrics over a broadcast cycle:
//! - PIX: share of client demand divided by share of broadcast bandwidth
//! - LIX: recency-weighted access probability divided by broadcast frequency
//!
//! Scores are kept at full `f64` precision. Rounding to two decimals happens
//! only when a table is rendered.

mod frequency;
mod probability;

pub use frequency::{tally, FrequencyTable};
pub use probability::{
    compute_lix, compute_lix_detailed, compute_pix, LixBreakdown, LixRow, LIX_RECENCY_WEIGHT,
};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Single broadcast page identifier
pub type Symbol = char;

/// Symbol → score mapping (PIX or LIX)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreTable {
    scores: BTreeMap<Symbol, f64>,
}

impl ScoreTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the score of `symbol`
    pub fn insert(&mut self, symbol: Symbol, score: f64) {
        self.scores.insert(symbol, score);
    }

    /// Score of `symbol`, if present
    pub fn get(&self, symbol: Symbol) -> Option<f64> {
        self.scores.get(&symbol).copied()
    }

    /// Score used for eviction decisions.
    ///
    /// Symbols without an entry were never requested; their demand share is
    /// zero, so they rank below every scored symbol.
    pub fn eviction_key(&self, symbol: Symbol) -> f64 {
        self.get(symbol).unwrap_or(0.0)
    }

    /// Whether `symbol` has an entry
    pub fn contains(&self, symbol: Symbol) -> bool {
        self.scores.contains_key(&symbol)
    }

    /// Number of scored symbols
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Iterate in symbol order
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, f64)> + '_ {
        self.scores.iter().map(|(&s, &v)| (s, v))
    }

    /// Two-decimal rendering, one `symbol: score` per line
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl FromIterator<(Symbol, f64)> for ScoreTable {
    fn from_iter<I: IntoIterator<Item = (Symbol, f64)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ScoreTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, score) in self.iter() {
            writeln!(f, "{symbol}: {score:.2}")?;
        }
        Ok(())
    }
}
