//! PIX and LIX score computation
//!
//! PIX(s) = P(request = s) / P(broadcast = s)
//!
//! LIX runs a decaying recurrence over broadcast positions t = 1..n:
//!   value(t) = c / (t − t_i) + (1 − c) · p_i
//! committed only where s is broadcast, carried forward elsewhere, then
//! LIX(s) = max value / frequency(s).

use super::{tally, FrequencyTable, ScoreTable, Symbol};
use crate::AircastError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Recency weight `c` of the LIX recurrence
pub const LIX_RECENCY_WEIGHT: f64 = 0.5;

/// Compute PIX for every requested symbol.
///
/// Fails when a requested symbol is never broadcast, or either length is
/// zero while the request table is not empty.
pub fn compute_pix(
    broadcast_freq: &FrequencyTable,
    request_freq: &FrequencyTable,
    broadcast_len: usize,
    request_len: usize,
) -> Result<ScoreTable, AircastError> {
    if request_freq.is_empty() {
        return Ok(ScoreTable::new());
    }
    if broadcast_len == 0 || request_len == 0 {
        return Err(AircastError::configuration(
            "PIX needs non-empty broadcast and request sequences",
        ));
    }

    let mut table = ScoreTable::new();
    for (symbol, requested) in request_freq.iter() {
        let broadcast = broadcast_freq.get(symbol).ok_or_else(|| {
            AircastError::Configuration(format!(
                "requested symbol `{symbol}` has no broadcast frequency"
            ))
        })?;
        let demand_share = requested as f64 / request_len as f64;
        let bandwidth_share = broadcast as f64 / broadcast_len as f64;
        table.insert(symbol, demand_share / bandwidth_share);
    }
    Ok(table)
}

/// Per-position LIX values for one symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LixRow {
    /// Symbol the row tracks
    pub symbol: Symbol,
    /// Value observed at positions 1..=n (index 0 is position 1)
    pub values: Vec<f64>,
}

impl LixRow {
    /// Highest value observed over the cycle
    pub fn peak(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

/// Full LIX computation: probability grid, peak probabilities and scores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LixBreakdown {
    /// One row per distinct symbol, in order of first broadcast
    pub rows: Vec<LixRow>,
    /// Peak access probability per symbol
    pub probabilities: BTreeMap<Symbol, f64>,
    /// Broadcast frequencies used for normalisation
    pub frequencies: FrequencyTable,
    /// Final LIX scores
    pub scores: ScoreTable,
}

/// Compute LIX scores for every distinct broadcast symbol.
pub fn compute_lix(broadcast: &[Symbol]) -> ScoreTable {
    compute_lix_detailed(broadcast).scores
}

/// Compute LIX along with the intermediate probability grid.
pub fn compute_lix_detailed(broadcast: &[Symbol]) -> LixBreakdown {
    let frequencies = tally(broadcast);

    let mut distinct: Vec<Symbol> = Vec::with_capacity(frequencies.distinct());
    for &symbol in broadcast {
        if !distinct.contains(&symbol) {
            distinct.push(symbol);
        }
    }

    let rows: Vec<LixRow> = distinct
        .into_iter()
        .map(|symbol| LixRow {
            symbol,
            values: recurrence(broadcast, symbol),
        })
        .collect();

    let mut probabilities = BTreeMap::new();
    let mut scores = ScoreTable::new();
    for row in &rows {
        let peak = row.peak();
        probabilities.insert(row.symbol, peak);
        // every row symbol occurs at least once
        scores.insert(row.symbol, peak / frequencies.count(row.symbol) as f64);
    }

    LixBreakdown {
        rows,
        probabilities,
        frequencies,
        scores,
    }
}

fn recurrence(broadcast: &[Symbol], symbol: Symbol) -> Vec<f64> {
    let c = LIX_RECENCY_WEIGHT;
    let mut last_access = 0usize;
    let mut last_probability = 0.0f64;
    let mut values = Vec::with_capacity(broadcast.len());

    for (idx, &current) in broadcast.iter().enumerate() {
        let t = idx + 1;
        if current == symbol {
            let value = c / (t - last_access) as f64 + (1.0 - c) * last_probability;
            last_access = t;
            last_probability = value;
        }
        values.push(last_probability);
    }
    values
}
