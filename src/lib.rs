//! # Broadcast Caching and Air-Index Simulation
//!
//! This library simulates two classical mobile-database techniques over a
//! cyclic broadcast channel.
//!
//! ## Components
//!
//! 1. **Frequency tally**: symbol counts over a sequence
//! 2. **Probability scoring**: PIX and LIX cache-worthiness scores
//! 3. **Cache replacement**: replay the broadcast against a request queue
//! 4. **Tree flattening**: nested replication tree → parent-linked list
//! 5. **Path resolution**: entire paths, partial paths and control indexes
//!
//! Every run is synchronous and deterministic: identical inputs always
//! produce identical step counts, traces and paths.
//!
//! ## Usage Example
//!
//! ```
//! use aircast::{scheme, CachingConfig};
//!
//! let config = CachingConfig::new("ABACAD", "ABCBAA", 2)?;
//! let report = scheme::compare_schemes(&config)?;
//! assert_eq!(report.pix.outcome.steps, 4);
//! # Ok::<(), aircast::AircastError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod scoring;    // Frequency tally, PIX and LIX
pub mod cache;      // Score-driven cache replacement simulator
pub mod index;      // Replication tree flattening and path resolution
pub mod scheme;     // CACHING / INDEXING orchestration

pub use cache::{Cache, CacheSimulator, SimulationOutcome};
pub use index::{ControlIndex, ControlIndexEntry, FlatTree, NodeLink, PartialPath, TreeNode};
pub use scheme::{CachingReport, IndexingQuery, IndexingReport, ScoreKind};
pub use scoring::{FrequencyTable, ScoreTable, Symbol};

use std::num::NonZeroUsize;
use thiserror::Error;

/// Errors surfaced by scoring, simulation and path resolution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AircastError {
    /// Inputs that cannot describe a valid scenario
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Node name absent from the flattened tree
    #[error("node `{0}` not found in replication tree")]
    NotFound(String),

    /// Leaf address not owned by any control index row
    #[error("address {address} is not covered by any control index range")]
    OutOfRange {
        /// Requested leaf address
        address: u32,
    },

    /// Iteration exceeded its safety bound
    #[error("cycle detected starting at `{start}` (gave up after {limit} iterations)")]
    CycleDetected {
        /// Node or run where the walk started
        start: String,
        /// Iteration bound that was exceeded
        limit: usize,
    },
}

impl AircastError {
    /// Helper for constructing configuration errors.
    pub fn configuration(msg: impl Into<String>) -> Self {
        AircastError::Configuration(msg.into())
    }
}

/// Validated inputs for a CACHING run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachingConfig {
    broadcast: Vec<Symbol>,
    requests: Vec<Symbol>,
    pages: NonZeroUsize,
}

impl CachingConfig {
    /// Build a configuration, rejecting empty broadcasts, zero pages and
    /// requests the broadcast never serves.
    pub fn new(broadcast: &str, requests: &str, pages: usize) -> Result<Self, AircastError> {
        let pages = NonZeroUsize::new(pages)
            .ok_or_else(|| AircastError::configuration("page count must be > 0"))?;
        let broadcast: Vec<Symbol> = broadcast.chars().collect();
        let requests: Vec<Symbol> = requests.chars().collect();

        if broadcast.is_empty() {
            return Err(AircastError::configuration("broadcast must not be empty"));
        }
        if let Some(missing) = requests.iter().find(|&s| !broadcast.contains(s)) {
            return Err(AircastError::Configuration(format!(
                "requested symbol `{missing}` never appears in the broadcast"
            )));
        }

        Ok(Self {
            broadcast,
            requests,
            pages,
        })
    }

    /// Build from raw text fields, parsing the page count.
    pub fn from_raw(broadcast: &str, requests: &str, pages: &str) -> Result<Self, AircastError> {
        let pages = pages.trim().parse::<usize>().map_err(|_| {
            AircastError::Configuration(format!("page count `{}` is not a positive integer", pages.trim()))
        })?;
        Self::new(broadcast, requests, pages)
    }

    /// Broadcast cycle, repeated indefinitely
    pub fn broadcast(&self) -> &[Symbol] {
        &self.broadcast
    }

    /// Client requests in arrival order
    pub fn requests(&self) -> &[Symbol] {
        &self.requests
    }

    /// Number of cache slots
    pub fn pages(&self) -> NonZeroUsize {
        self.pages
    }

    /// Broadcast cycle length
    pub fn broadcast_len(&self) -> usize {
        self.broadcast.len()
    }

    /// Upper bound on simulator ticks: every tick pops a request or advances
    /// the cursor, and a full cycle never passes without a pop.
    pub fn tick_bound(&self) -> usize {
        self.requests.len().saturating_mul(self.broadcast.len() + 1) + 1
    }
}
