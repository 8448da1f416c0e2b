//! Broadcast replay loop
//!
//! One owned state record is mutated tick by tick until the request queue
//! drains. Each tick either satisfies a request or advances the broadcast,
//! so the loop is bounded by `requests × (broadcast + 1)` ticks.

use super::{Admission, Cache, TraceEntry, Transition};
use crate::scoring::{ScoreTable, Symbol};
use crate::{AircastError, CachingConfig};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Replays a broadcast against a request queue under one score table
#[derive(Debug)]
pub struct CacheSimulator<'a> {
    config: &'a CachingConfig,
    scores: &'a ScoreTable,
}

impl<'a> CacheSimulator<'a> {
    /// Create a simulator; the broadcast must be non-empty and every
    /// requested symbol must be scored.
    pub fn new(config: &'a CachingConfig, scores: &'a ScoreTable) -> Result<Self, AircastError> {
        if config.broadcast.is_empty() {
            return Err(AircastError::configuration("broadcast must not be empty"));
        }
        if let Some(missing) = config.requests.iter().find(|&&s| !scores.contains(s)) {
            return Err(AircastError::Configuration(format!(
                "score table has no entry for requested symbol `{missing}`"
            )));
        }
        Ok(Self { config, scores })
    }

    /// Run to completion.
    pub fn run(&self) -> Result<SimulationOutcome, AircastError> {
        let broadcast = &self.config.broadcast;
        let limit = self.config.tick_bound();
        let mut state = SimulationState::new(self.config);

        while !state.queue.is_empty() {
            if state.trace.len() >= limit {
                return Err(AircastError::CycleDetected {
                    start: "cache replacement loop".to_string(),
                    limit,
                });
            }
            state.tick(broadcast, self.scores);
        }

        info!(
            steps = state.steps,
            ticks = state.trace.len(),
            pages = self.config.pages.get(),
            "simulation complete"
        );

        Ok(SimulationOutcome {
            steps: state.steps,
            trace: state.trace,
            cache: state.cache,
        })
    }
}

/// Mutable replay state, created fresh per run
#[derive(Debug)]
struct SimulationState {
    queue: VecDeque<Symbol>,
    cursor: usize,
    steps: usize,
    cache: Cache,
    trace: Vec<TraceEntry>,
}

impl SimulationState {
    fn new(config: &CachingConfig) -> Self {
        Self {
            queue: config.requests.iter().copied().collect(),
            cursor: 0,
            steps: 0,
            cache: Cache::new(config.pages),
            trace: Vec::new(),
        }
    }

    fn tick(&mut self, broadcast: &[Symbol], scores: &ScoreTable) {
        let Some(&needed) = self.queue.front() else {
            return;
        };
        let serving = broadcast[self.cursor];

        let transition = if self.cache.contains(needed) {
            self.queue.pop_front();
            Transition::Hit
        } else if needed == serving {
            self.queue.pop_front();
            Transition::ServedOnAir {
                advanced: self.queue.front() != Some(&serving),
            }
        } else {
            Transition::Waited
        };
        if transition.advanced() {
            self.advance(broadcast.len());
        }
        let admission = (transition != Transition::Hit).then(|| self.cache.admit(serving, scores));

        debug!(
            tick = self.trace.len(),
            %serving,
            %needed,
            ?transition,
            ?admission,
            steps = self.steps,
            "tick"
        );

        self.trace.push(TraceEntry {
            tick: self.trace.len(),
            serving,
            needed,
            transition,
            admission,
            pending: self.queue.iter().copied().collect(),
            next_serving: broadcast[self.cursor],
            steps: self.steps,
            cache: self.cache.slots().to_vec(),
        });
    }

    fn advance(&mut self, broadcast_len: usize) {
        self.cursor += 1;
        self.steps += 1;
        if self.cursor >= broadcast_len {
            self.cursor = 0;
        }
    }
}

/// Result of one replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    /// Broadcast slots waited in total
    pub steps: usize,
    /// One entry per tick
    pub trace: Vec<TraceEntry>,
    /// Cache contents at the end of the run
    pub cache: Cache,
}

impl SimulationOutcome {
    /// Number of ticks executed
    pub fn ticks(&self) -> usize {
        self.trace.len()
    }

    /// Requests served from the cache
    pub fn hits(&self) -> usize {
        self.trace
            .iter()
            .filter(|entry| entry.transition == Transition::Hit)
            .count()
    }

    /// Pages evicted over the run
    pub fn evictions(&self) -> usize {
        self.trace
            .iter()
            .filter(|entry| matches!(entry.admission, Some(Admission::Replaced { .. })))
            .count()
    }

    /// Full trace as text, ending with the step total
    pub fn trace_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.trace.iter().flat_map(TraceEntry::lines).collect();
        lines.push("-----------------------------------------".to_string());
        lines.push(format!("Total Steps: {}", self.steps));
        lines.push("-----------------------------------------".to_string());
        lines
    }

    /// Hex blake3 digest of the rendered trace
    pub fn fingerprint(&self) -> String {
        let rendered = self.trace_lines().join("\n");
        blake3::hash(rendered.as_bytes()).to_hex().to_string()
    }
}
