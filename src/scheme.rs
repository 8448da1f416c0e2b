//! Scheme orchestration
//!
//! CACHING scores the broadcast with PIX and LIX and replays it once per
//! score table. INDEXING resolves the entire path to a destination leaf and,
//! when a replication level is chosen, its control index and partial path.

use crate::cache::{CacheSimulator, SimulationOutcome};
use crate::index::{resolve_partial_path, AddressRange, ControlIndex, FlatTree, PartialPath};
use crate::scoring::{
    compute_lix_detailed, compute_pix, tally, FrequencyTable, LixBreakdown, ScoreTable,
};
use crate::{AircastError, CachingConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// Score family driving cache admission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreKind {
    /// Demand share over bandwidth share
    Pix,
    /// Recency-weighted probability over broadcast frequency
    Lix,
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreKind::Pix => write!(f, "PIX"),
            ScoreKind::Lix => write!(f, "LIX"),
        }
    }
}

/// Scores and replay for one score family
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemeRun {
    /// Score family
    pub kind: ScoreKind,
    /// Score table used for admission
    pub scores: ScoreTable,
    /// Replay result
    pub outcome: SimulationOutcome,
}

/// Everything a CACHING comparison produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachingReport {
    /// Broadcast symbol counts
    pub broadcast_frequencies: FrequencyTable,
    /// Request symbol counts
    pub request_frequencies: FrequencyTable,
    /// PIX-driven run
    pub pix: SchemeRun,
    /// LIX-driven run
    pub lix: SchemeRun,
    /// LIX probability grid and peak probabilities
    pub lix_breakdown: LixBreakdown,
}

impl CachingReport {
    /// Score family with fewer broadcast steps; `None` on a tie
    pub fn preferred(&self) -> Option<ScoreKind> {
        match self.pix.outcome.steps.cmp(&self.lix.outcome.steps) {
            std::cmp::Ordering::Less => Some(ScoreKind::Pix),
            std::cmp::Ordering::Greater => Some(ScoreKind::Lix),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Score the broadcast with PIX and LIX and replay it under each.
pub fn compare_schemes(config: &CachingConfig) -> Result<CachingReport, AircastError> {
    let broadcast_frequencies = tally(config.broadcast());
    let request_frequencies = tally(config.requests());

    let pix_scores = compute_pix(
        &broadcast_frequencies,
        &request_frequencies,
        config.broadcast().len(),
        config.requests().len(),
    )?;
    let pix_outcome = CacheSimulator::new(config, &pix_scores)?.run()?;

    let lix_breakdown = compute_lix_detailed(config.broadcast());
    let lix_scores = lix_breakdown.scores.clone();
    let lix_outcome = CacheSimulator::new(config, &lix_scores)?.run()?;

    info!(
        pix_steps = pix_outcome.steps,
        lix_steps = lix_outcome.steps,
        "caching schemes compared"
    );

    Ok(CachingReport {
        broadcast_frequencies,
        request_frequencies,
        pix: SchemeRun {
            kind: ScoreKind::Pix,
            scores: pix_scores,
            outcome: pix_outcome,
        },
        lix: SchemeRun {
            kind: ScoreKind::Lix,
            scores: lix_scores,
            outcome: lix_outcome,
        },
        lix_breakdown,
    })
}

/// Inputs for an INDEXING run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingQuery {
    /// Address where the client tunes in
    pub entry: Option<u32>,
    /// Destination leaf address of the entire path
    pub destination: u32,
    /// Replication level tag (any node of the level)
    pub level: Option<String>,
    /// Destination of the partial path when it differs from `destination`
    pub partial_destination: Option<u32>,
}

/// Control index and partial path for one replication level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialReport {
    /// Level tag the table was built for
    pub level: String,
    /// Leaf address the partial path leads to
    pub destination: u32,
    /// Control index table
    pub control_index: ControlIndex,
    /// Address span per global index
    pub global_summary: BTreeMap<u32, AddressRange>,
    /// Partial path to the destination
    pub path: PartialPath,
}

/// Everything an INDEXING query produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexingReport {
    /// Entry address, when supplied
    pub entry: Option<u32>,
    /// Destination address
    pub destination: u32,
    /// Root-to-destination node names
    pub entire_path: Vec<String>,
    /// Level-specific results, when a level was chosen
    pub partial: Option<PartialReport>,
}

impl IndexingReport {
    /// Entire path joined with ` -> `
    pub fn entire_path_display(&self) -> String {
        self.entire_path.join(" -> ")
    }
}

/// Resolve an INDEXING query against a flattened tree.
pub fn resolve_indexing(tree: &FlatTree, query: &IndexingQuery) -> Result<IndexingReport, AircastError> {
    if let Some(entry) = query.entry {
        tree.position(&entry.to_string())?;
    }

    // range ownership is checked before the destination is looked up
    let partial = match &query.level {
        Some(level) => {
            let destination = query.partial_destination.unwrap_or(query.destination);
            let (control_index, path) = resolve_partial_path(tree, destination, level)?;
            info!(tag = %level, destination, path = %path, "partial path resolved");
            Some(PartialReport {
                level: level.clone(),
                destination,
                global_summary: control_index.global_summary(),
                control_index,
                path,
            })
        }
        None => None,
    };

    let entire_path = tree.resolve_entire_path(&query.destination.to_string())?;
    info!(
        destination = query.destination,
        path = %entire_path.join(" -> "),
        "entire path resolved"
    );

    Ok(IndexingReport {
        entry: query.entry,
        destination: query.destination,
        entire_path,
        partial,
    })
}
