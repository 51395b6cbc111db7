//! Sequence-indexed storage for regrets and average strategies.
//!
//! Each player's information sets are laid out contiguously: information set
//! `i` with `n_i` actions owns the flat slots `offset(i)..offset(i) + n_i`.
//! A [`SequenceId`] (information set, action) maps to exactly one slot.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::cfr::numeric::{normalize_into, normalized, uniform_into};

/// An (information set, action) pair, the unit of regret accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceId {
    /// Information set index.
    pub info_set: usize,
    /// Legal rank of the action at that information set.
    pub action: usize,
}

impl SequenceId {
    /// Create a sequence id.
    pub fn new(info_set: usize, action: usize) -> Self {
        Self { info_set, action }
    }
}

/// How one player's sequences are packed into a flat vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceLayout {
    actions: Vec<usize>,
    offsets: Vec<usize>,
    num_sequences: usize,
}

impl SequenceLayout {
    /// Lay out information sets with the given action counts.
    pub fn new(actions: Vec<usize>) -> Self {
        let mut offsets = Vec::with_capacity(actions.len());
        let mut num_sequences = 0;
        for &n in &actions {
            offsets.push(num_sequences);
            num_sequences += n;
        }
        Self {
            actions,
            offsets,
            num_sequences,
        }
    }

    /// Number of information sets.
    pub fn num_info_sets(&self) -> usize {
        self.actions.len()
    }

    /// Number of sequences across all information sets.
    pub fn num_sequences(&self) -> usize {
        self.num_sequences
    }

    /// Action count per information set.
    pub fn actions(&self) -> &[usize] {
        &self.actions
    }

    /// Number of actions at `info_set`, or `None` if it does not exist.
    pub fn num_actions(&self, info_set: usize) -> Option<usize> {
        self.actions.get(info_set).copied()
    }

    /// Flat slots owned by `info_set`.
    ///
    /// # Panics
    /// If `info_set` is out of range.
    pub fn range(&self, info_set: usize) -> Range<usize> {
        let start = self.offsets[info_set];
        start..start + self.actions[info_set]
    }

    /// Flat slot of a sequence.
    ///
    /// # Panics
    /// If the sequence does not exist in this layout.
    pub fn index(&self, seq: SequenceId) -> usize {
        assert!(
            seq.action < self.actions[seq.info_set],
            "action {} out of range at info set {}",
            seq.action,
            seq.info_set
        );
        self.offsets[seq.info_set] + seq.action
    }

    /// Whether `seq` names an existing sequence.
    pub fn contains(&self, seq: SequenceId) -> bool {
        self.num_actions(seq.info_set)
            .is_some_and(|n| seq.action < n)
    }
}

/// Cumulative regret per sequence, all starting at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct RegretTable {
    layout: SequenceLayout,
    regrets: Vec<f64>,
}

impl RegretTable {
    /// Zeroed table over `layout`.
    pub fn new(layout: SequenceLayout) -> Self {
        let regrets = vec![0.0; layout.num_sequences()];
        Self { layout, regrets }
    }

    /// Layout the table was built over.
    pub fn layout(&self) -> &SequenceLayout {
        &self.layout
    }

    /// Stored regret of one sequence.
    pub fn get(&self, seq: SequenceId) -> f64 {
        self.regrets[self.layout.index(seq)]
    }

    /// Stored regrets of every action at `info_set`.
    pub fn regrets(&self, info_set: usize) -> &[f64] {
        &self.regrets[self.layout.range(info_set)]
    }

    /// Add `delta` to a sequence and return the new value.
    pub fn add(&mut self, seq: SequenceId, delta: f64) -> f64 {
        let slot = &mut self.regrets[self.layout.index(seq)];
        *slot += delta;
        *slot
    }

    /// Overwrite the regret of a sequence.
    pub fn set(&mut self, seq: SequenceId, value: f64) {
        let index = self.layout.index(seq);
        self.regrets[index] = value;
    }

    /// Reset every regret to zero.
    pub fn clear(&mut self) {
        self.regrets.iter_mut().for_each(|r| *r = 0.0);
    }
}

/// Reach-weighted action counts whose normalization is the average strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategySums {
    layout: SequenceLayout,
    sums: Vec<f64>,
}

impl StrategySums {
    /// Zeroed accumulator over `layout`.
    pub fn new(layout: SequenceLayout) -> Self {
        let sums = vec![0.0; layout.num_sequences()];
        Self { layout, sums }
    }

    /// Layout the accumulator was built over.
    pub fn layout(&self) -> &SequenceLayout {
        &self.layout
    }

    /// Add `weight` to a sequence.
    pub fn accumulate(&mut self, seq: SequenceId, weight: f64) {
        let index = self.layout.index(seq);
        self.sums[index] += weight;
    }

    /// Raw sums at `info_set`.
    pub fn sums(&self, info_set: usize) -> &[f64] {
        &self.sums[self.layout.range(info_set)]
    }

    /// Average strategy at `info_set`; uniform when nothing was accumulated.
    pub fn average(&self, info_set: usize) -> Vec<f64> {
        normalized(self.sums(info_set))
    }

    /// Average strategy at every information set.
    pub fn averages(&self) -> Vec<Vec<f64>> {
        (0..self.layout.num_info_sets())
            .map(|i| self.average(i))
            .collect()
    }

    /// Reset every sum to zero.
    pub fn clear(&mut self) {
        self.sums.iter_mut().for_each(|s| *s = 0.0);
    }
}

/// A behavioural strategy for every player: `[player][info_set][action]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategyProfile {
    policies: Vec<Vec<Vec<f64>>>,
}

impl StrategyProfile {
    /// Wrap explicit per-player policies.
    pub fn new(policies: Vec<Vec<Vec<f64>>>) -> Self {
        Self { policies }
    }

    /// Uniform play everywhere.
    pub fn uniform(layouts: &[SequenceLayout]) -> Self {
        let policies = layouts
            .iter()
            .map(|layout| {
                layout
                    .actions()
                    .iter()
                    .map(|&n| {
                        let mut p = vec![0.0; n];
                        if n > 0 {
                            uniform_into(&mut p);
                        }
                        p
                    })
                    .collect()
            })
            .collect();
        Self { policies }
    }

    /// Normalized average strategies from per-player accumulators.
    pub fn from_sums(sums: &[StrategySums]) -> Self {
        Self {
            policies: sums.iter().map(StrategySums::averages).collect(),
        }
    }

    /// Number of players covered.
    pub fn num_players(&self) -> usize {
        self.policies.len()
    }

    /// Number of information sets of `player`.
    pub fn num_info_sets(&self, player: usize) -> usize {
        self.policies.get(player).map_or(0, Vec::len)
    }

    /// Distribution of `player` at `info_set`.
    pub fn policy(&self, player: usize, info_set: usize) -> Option<&[f64]> {
        self.policies
            .get(player)
            .and_then(|sets| sets.get(info_set))
            .map(Vec::as_slice)
    }

    /// Probability that `player` plays `action` at `info_set`.
    pub fn probability(&self, player: usize, info_set: usize, action: usize) -> Option<f64> {
        self.policy(player, info_set)
            .and_then(|p| p.get(action).copied())
    }

    /// Per-player policies.
    pub fn policies(&self) -> &[Vec<Vec<f64>>] {
        &self.policies
    }

    /// Renormalize every distribution in place.
    pub fn normalize(&mut self) {
        for dist in self.policies.iter_mut().flatten() {
            let raw = dist.clone();
            normalize_into(&raw, dist);
        }
    }
}
