//! Pattern-keyed count storage for one acquisition.
//!
//! An acquisition produces counts keyed by the subset of channels that
//! fired together. Keys are kept sorted ascending by channel id so that
//! two acquisitions of the same physics compare equal structurally, and
//! the map itself is ordered for deterministic iteration.

use std::collections::BTreeMap;

/// A detection pattern: the set of channels that fired in one event class.
///
/// Contract: channel ids are stored sorted ascending. Construction through
/// [`Pattern::new`] enforces this regardless of input order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pattern(Vec<u8>);

impl Pattern {
    /// Builds a pattern, sorting the channels ascending.
    pub fn new(mut channels: Vec<u8>) -> Self {
        channels.sort_unstable();
        Self(channels)
    }

    /// A single-channel pattern.
    pub fn single(channel: u8) -> Self {
        Self(vec![channel])
    }

    /// A two-channel pattern.
    pub fn pair(a: u8, b: u8) -> Self {
        Self::new(vec![a, b])
    }

    /// The channels in ascending order.
    pub fn channels(&self) -> &[u8] {
        &self.0
    }

    /// True if every channel in `subset` appears in this pattern.
    pub fn contains_all(&self, subset: &[u8]) -> bool {
        subset.iter().all(|ch| self.0.contains(ch))
    }
}

/// Counts from the most recent acquisition.
///
/// Replaced wholesale by each `read`; never merged across acquisitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationMemory {
    counts: BTreeMap<Pattern, u64>,
    duration_s: f64,
}

impl SimulationMemory {
    /// An empty memory with the given acquisition duration.
    pub fn new(duration_s: f64) -> Self {
        Self {
            counts: BTreeMap::new(),
            duration_s,
        }
    }

    /// Adds counts to a pattern.
    pub fn record(&mut self, pattern: Pattern, count: u64) {
        if count > 0 {
            *self.counts.entry(pattern).or_insert(0) += count;
        }
    }

    /// Duration of the acquisition that produced these counts (seconds).
    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    /// Iterates patterns in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pattern, u64)> {
        self.counts.iter().map(|(p, &c)| (p, c))
    }

    /// Number of distinct patterns stored.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no pattern has been recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of counts over all patterns containing every requested channel.
    pub fn superset_sum(&self, channels: &[u8]) -> u64 {
        self.counts
            .iter()
            .filter(|(pattern, _)| pattern.contains_all(channels))
            .map(|(_, &count)| count)
            .sum()
    }

    /// Total events involving a single channel, across all patterns.
    pub fn channel_total(&self, channel: u8) -> u64 {
        self.counts
            .iter()
            .filter(|(pattern, _)| pattern.0.contains(&channel))
            .map(|(_, &count)| count)
            .sum()
    }
}
