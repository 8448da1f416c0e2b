//! Per-tick simulation trace

use crate::scoring::Symbol;
use serde::Serialize;
use std::fmt;

/// How the client's pending request was handled in one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transition {
    /// Served from the cache; broadcast does not move
    Hit,

    /// Served by the page on air
    ServedOnAir {
        /// Whether the broadcast advanced (false when the next request wants
        /// the same page)
        advanced: bool,
    },

    /// Page on air was not the one needed; wait one slot
    Waited,
}

impl Transition {
    /// Whether the tick consumed a broadcast step
    pub fn advanced(&self) -> bool {
        match self {
            Transition::Hit => false,
            Transition::ServedOnAir { advanced } => *advanced,
            Transition::Waited => true,
        }
    }
}

/// Outcome of offering the page on air to the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Admission {
    /// Cache was empty; page placed at slot 0
    Initial,

    /// Page placed in a free slot
    Filled {
        /// Slot that received the page
        slot: usize,
    },

    /// Page displaced the lowest-scored cached page
    Replaced {
        /// Slot that received the page
        slot: usize,
        /// Page that was evicted
        evicted: Symbol,
    },

    /// Cache left as it was
    Unchanged,
}

/// One tick of the replacement loop, with the state after the tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    /// Zero-based tick number
    pub tick: usize,
    /// Page on air when the tick started
    pub serving: Symbol,
    /// Request at the front of the queue when the tick started
    pub needed: Symbol,
    /// How the request was handled
    pub transition: Transition,
    /// Cache decision (absent on hits)
    pub admission: Option<Admission>,
    /// Requests still pending after the tick
    pub pending: Vec<Symbol>,
    /// Page on air for the next tick
    pub next_serving: Symbol,
    /// Cumulative broadcast steps
    pub steps: usize,
    /// Cache slots after the tick
    pub cache: Vec<Option<Symbol>>,
}

impl TraceEntry {
    /// Render as free-text log lines
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Item serving: {}", self.serving),
            format!("Item needed: {}", self.needed),
        ];

        if self.transition == Transition::Hit {
            lines.push(format!("{} found in cache.", self.needed));
            lines.push(format!("Serving {} from cache now.", self.needed));
        }

        match self.admission {
            Some(Admission::Initial) => {
                lines.push(format!("Cache after update (initial): {}", render_slots(&self.cache)));
            }
            Some(Admission::Filled { slot }) => {
                lines.push(format!("Adding {} to cache at index {slot}", self.serving));
                lines.push(format!("Cache after update (general): {}", render_slots(&self.cache)));
            }
            Some(Admission::Replaced { evicted, .. }) => {
                lines.push(format!("Evicting {evicted} for {}", self.serving));
                lines.push(format!("Cache after update based on score: {}", render_slots(&self.cache)));
            }
            Some(Admission::Unchanged) => lines.push("No changes in cache".to_string()),
            None => {}
        }

        let pending: String = self.pending.iter().collect();
        lines.push(format!(
            "State: client request [{pending}] | next broadcast item {} | steps {} | cache {}",
            self.next_serving,
            self.steps,
            render_slots(&self.cache)
        ));
        lines
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

pub(crate) fn render_slots(slots: &[Option<Symbol>]) -> String {
    slots
        .iter()
        .map(|slot| slot.map_or_else(|| "NULL".to_string(), String::from))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_lines() {
        let entry = TraceEntry {
            tick: 4,
            serving: 'A',
            needed: 'B',
            transition: Transition::Hit,
            admission: None,
            pending: vec!['A', 'A'],
            next_serving: 'A',
            steps: 4,
            cache: vec![Some('A'), Some('B')],
        };
        let lines = entry.lines();
        assert_eq!(lines[2], "B found in cache.");
        assert_eq!(
            lines.last().unwrap(),
            "State: client request [AA] | next broadcast item A | steps 4 | cache A,B"
        );
    }

    #[test]
    fn test_transition_advances() {
        assert!(!Transition::Hit.advanced());
        assert!(Transition::Waited.advanced());
        assert!(!Transition::ServedOnAir { advanced: false }.advanced());
    }
}
