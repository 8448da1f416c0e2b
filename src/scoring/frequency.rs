use super::Symbol;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Occurrence counts per symbol, in symbol order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    counts: BTreeMap<Symbol, usize>,
    total: usize,
}

impl FrequencyTable {
    /// Count of `symbol` (zero when absent)
    pub fn count(&self, symbol: Symbol) -> usize {
        self.counts.get(&symbol).copied().unwrap_or(0)
    }

    /// Count of `symbol`, `None` when it never occurred
    pub fn get(&self, symbol: Symbol) -> Option<usize> {
        self.counts.get(&symbol).copied()
    }

    /// Length of the tallied sequence
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct symbols
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Whether the tallied sequence was empty
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate `(symbol, count)` in symbol order
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, usize)> + '_ {
        self.counts.iter().map(|(&s, &c)| (s, c))
    }
}

impl fmt::Display for FrequencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, count) in self.iter() {
            writeln!(f, "{symbol}: {count}")?;
        }
        Ok(())
    }
}

/// Count symbol occurrences in `sequence`
pub fn tally(sequence: &[Symbol]) -> FrequencyTable {
    let mut counts = BTreeMap::new();
    for &symbol in sequence {
        *counts.entry(symbol).or_insert(0) += 1;
    }
    FrequencyTable {
        counts,
        total: sequence.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_broadcast() {
        let broadcast: Vec<char> = "ABACAD".chars().collect();
        let freq = tally(&broadcast);
        assert_eq!(freq.count('A'), 3);
        assert_eq!(freq.count('B'), 1);
        assert_eq!(freq.count('C'), 1);
        assert_eq!(freq.count('D'), 1);
        assert_eq!(freq.count('E'), 0);
        assert_eq!(freq.get('E'), None);
        assert_eq!(freq.total(), 6);
        assert_eq!(freq.distinct(), 4);
    }

    #[test]
    fn test_tally_empty() {
        let freq = tally(&[]);
        assert!(freq.is_empty());
        assert_eq!(freq.total(), 0);
    }

    #[test]
    fn test_display_in_symbol_order() {
        let requests: Vec<char> = "CBA".chars().collect();
        assert_eq!(tally(&requests).to_string(), "A: 1\nB: 1\nC: 1\n");
    }
}
