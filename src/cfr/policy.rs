//! Regret-matching policy generators.
//!
//! A policy generator owns one player's regret table. It turns the regrets
//! of an information set into a distribution over that set's actions and
//! accepts per-sequence regret updates.
//!
//! | Generator | `policy` | `update` |
//! |---|---|---|
//! | [`RegretMatching`] | clip at 0, normalize | `r += δ` |
//! | [`RegretMatchingPlus`] | clip at 0, normalize | `r = max(r + δ, 0)` |
//! | [`PerturbedPolicyRegretMatching`] | `r ± noise`, clip, normalize | `r += δ` |
//! | [`PerturbedTableRegretMatching`] | clip at 0, normalize | `r += δ ± noise` |
//!
//! Every sign is drawn by a fair coin from a generator-owned RNG.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cfr::config::RegretRule;
use crate::cfr::numeric::{flip_coin, regret_matching};
use crate::cfr::storage::{RegretTable, SequenceId, SequenceLayout};

/// Seed used by the perturbed generators unless told otherwise.
pub const DEFAULT_NOISE_SEED: u64 = 63_547_654;

/// Maps an information set to a distribution and absorbs regret updates.
pub trait PolicyGenerator {
    /// Distribution over the actions of `info_set`.
    ///
    /// Takes `&mut self` because perturbed generators draw random numbers.
    fn policy(&mut self, info_set: usize) -> Vec<f64>;

    /// Apply a regret signal to one sequence.
    fn update(&mut self, seq: SequenceId, delta: f64);

    /// The stored regrets.
    fn regret_table(&self) -> &RegretTable;

    /// Zero all regrets and return to the freshly constructed state.
    fn clear(&mut self);

    /// How many perturbed regrets had magnitude below the noise.
    fn noise_sensitive_count(&self) -> u64 {
        0
    }

    /// Reset [`PolicyGenerator::noise_sensitive_count`] to zero.
    fn clear_noise_sensitive_count(&mut self) {}

    /// Restart the random stream from `seed`.
    fn reseed(&mut self, _seed: u64) {}
}

impl<P: PolicyGenerator + ?Sized> PolicyGenerator for Box<P> {
    fn policy(&mut self, info_set: usize) -> Vec<f64> {
        (**self).policy(info_set)
    }

    fn update(&mut self, seq: SequenceId, delta: f64) {
        (**self).update(seq, delta)
    }

    fn regret_table(&self) -> &RegretTable {
        (**self).regret_table()
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn noise_sensitive_count(&self) -> u64 {
        (**self).noise_sensitive_count()
    }

    fn clear_noise_sensitive_count(&mut self) {
        (**self).clear_noise_sensitive_count()
    }

    fn reseed(&mut self, seed: u64) {
        (**self).reseed(seed)
    }
}

/// Plain regret matching.
#[derive(Debug, Clone)]
pub struct RegretMatching {
    table: RegretTable,
}

impl RegretMatching {
    /// Zeroed regrets over `layout`.
    pub fn new(layout: SequenceLayout) -> Self {
        Self {
            table: RegretTable::new(layout),
        }
    }
}

impl PolicyGenerator for RegretMatching {
    fn policy(&mut self, info_set: usize) -> Vec<f64> {
        regret_matching(self.table.regrets(info_set))
    }

    fn update(&mut self, seq: SequenceId, delta: f64) {
        self.table.add(seq, delta);
    }

    fn regret_table(&self) -> &RegretTable {
        &self.table
    }

    fn clear(&mut self) {
        self.table.clear();
    }
}

/// Regret matching plus: cumulative regret never goes below zero.
#[derive(Debug, Clone)]
pub struct RegretMatchingPlus {
    table: RegretTable,
}

impl RegretMatchingPlus {
    /// Zeroed regrets over `layout`.
    pub fn new(layout: SequenceLayout) -> Self {
        Self {
            table: RegretTable::new(layout),
        }
    }
}

impl PolicyGenerator for RegretMatchingPlus {
    fn policy(&mut self, info_set: usize) -> Vec<f64> {
        regret_matching(self.table.regrets(info_set))
    }

    fn update(&mut self, seq: SequenceId, delta: f64) {
        let updated = self.table.get(seq) + delta;
        self.table.set(seq, updated.max(0.0));
    }

    fn regret_table(&self) -> &RegretTable {
        &self.table
    }

    fn clear(&mut self) {
        self.table.clear();
    }
}

/// Regret matching over regrets perturbed by `±noise` at read time.
///
/// Stored regrets are updated exactly as in [`RegretMatching`].
#[derive(Debug, Clone)]
pub struct PerturbedPolicyRegretMatching {
    table: RegretTable,
    noise: f64,
    seed: u64,
    rng: StdRng,
    noise_sensitive: u64,
}

impl PerturbedPolicyRegretMatching {
    /// Zeroed regrets over `layout` with the given noise and seed.
    pub fn new(layout: SequenceLayout, noise: f64, seed: u64) -> Self {
        Self {
            table: RegretTable::new(layout),
            noise,
            seed,
            rng: StdRng::seed_from_u64(seed),
            noise_sensitive: 0,
        }
    }

    /// Noise magnitude.
    pub fn noise(&self) -> f64 {
        self.noise
    }
}

impl PolicyGenerator for PerturbedPolicyRegretMatching {
    fn policy(&mut self, info_set: usize) -> Vec<f64> {
        let perturbed: Vec<f64> = self
            .table
            .regrets(info_set)
            .iter()
            .map(|&r| {
                if self.noise > r.abs() {
                    self.noise_sensitive += 1;
                }
                if flip_coin(0.5, &mut self.rng) {
                    r + self.noise
                } else {
                    r - self.noise
                }
            })
            .collect();
        regret_matching(&perturbed)
    }

    fn update(&mut self, seq: SequenceId, delta: f64) {
        self.table.add(seq, delta);
    }

    fn regret_table(&self) -> &RegretTable {
        &self.table
    }

    fn clear(&mut self) {
        self.table.clear();
        self.noise_sensitive = 0;
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    fn noise_sensitive_count(&self) -> u64 {
        self.noise_sensitive
    }

    fn clear_noise_sensitive_count(&mut self) {
        self.noise_sensitive = 0;
    }

    fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Regret matching whose stored updates carry `±noise`.
#[derive(Debug, Clone)]
pub struct PerturbedTableRegretMatching {
    table: RegretTable,
    noise: f64,
    seed: u64,
    rng: StdRng,
}

impl PerturbedTableRegretMatching {
    /// Zeroed regrets over `layout` with the given noise and seed.
    pub fn new(layout: SequenceLayout, noise: f64, seed: u64) -> Self {
        Self {
            table: RegretTable::new(layout),
            noise,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Noise magnitude.
    pub fn noise(&self) -> f64 {
        self.noise
    }
}

impl PolicyGenerator for PerturbedTableRegretMatching {
    fn policy(&mut self, info_set: usize) -> Vec<f64> {
        regret_matching(self.table.regrets(info_set))
    }

    fn update(&mut self, seq: SequenceId, delta: f64) {
        let noise = if flip_coin(0.5, &mut self.rng) {
            self.noise
        } else {
            -self.noise
        };
        self.table.add(seq, delta + noise);
    }

    fn regret_table(&self) -> &RegretTable {
        &self.table
    }

    fn clear(&mut self) {
        self.table.clear();
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Build the generator selected by `rule`.
///
/// `noise` and `seed` are only used by the perturbed rules.
pub fn build_policy(
    rule: RegretRule,
    layout: SequenceLayout,
    noise: f64,
    seed: u64,
) -> Box<dyn PolicyGenerator> {
    match rule {
        RegretRule::RegretMatching => Box::new(RegretMatching::new(layout)),
        RegretRule::RegretMatchingPlus => Box::new(RegretMatchingPlus::new(layout)),
        RegretRule::PerturbedPolicy => {
            Box::new(PerturbedPolicyRegretMatching::new(layout, noise, seed))
        }
        RegretRule::PerturbedTable => {
            Box::new(PerturbedTableRegretMatching::new(layout, noise, seed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SequenceLayout {
        SequenceLayout::new(vec![2, 3])
    }

    fn seq(info_set: usize, action: usize) -> SequenceId {
        SequenceId::new(info_set, action)
    }

    #[test]
    fn test_regret_matching_uniform_when_nothing_positive() {
        let mut rm = RegretMatching::new(layout());
        assert_eq!(rm.policy(1), vec![1.0 / 3.0; 3]);

        rm.update(seq(1, 0), -2.0);
        rm.update(seq(1, 2), -0.5);
        assert_eq!(rm.policy(1), vec![1.0 / 3.0; 3]);
        assert_eq!(rm.regret_table().get(seq(1, 0)), -2.0);
    }

    #[test]
    fn test_regret_matching_proportional_to_positive_regret() {
        let mut rm = RegretMatching::new(layout());
        rm.update(seq(0, 0), 1.0);
        rm.update(seq(0, 1), 3.0);
        let p = rm.policy(0);
        assert!((p[0] - 0.25).abs() < 1e-12);
        assert!((p[1] - 0.75).abs() < 1e-12);

        rm.update(seq(0, 1), -5.0);
        assert_eq!(rm.policy(0), vec![1.0, 0.0]);
    }

    #[test]
    fn test_regret_matching_plus_never_negative() {
        let mut rmp = RegretMatchingPlus::new(layout());
        rmp.update(seq(0, 0), -1.0);
        assert_eq!(rmp.regret_table().get(seq(0, 0)), 0.0);

        rmp.update(seq(0, 1), 2.0);
        rmp.update(seq(0, 1), -0.5);
        assert_eq!(rmp.regret_table().get(seq(0, 1)), 1.5);
        rmp.update(seq(0, 1), -4.0);
        assert_eq!(rmp.regret_table().get(seq(0, 1)), 0.0);

        for delta in [3.0, -7.0, 0.25, -0.1, 1.0] {
            rmp.update(seq(1, 2), delta);
            assert!(rmp.regret_table().get(seq(1, 2)) >= 0.0);
        }
    }

    #[test]
    fn test_perturbed_policy_counts_small_regrets() {
        let mut gen = PerturbedPolicyRegretMatching::new(layout(), 1.0, DEFAULT_NOISE_SEED);
        gen.update(seq(0, 0), 5.0);
        gen.update(seq(0, 1), 0.5);

        gen.policy(0);
        assert_eq!(gen.noise_sensitive_count(), 1);
        gen.policy(1);
        assert_eq!(gen.noise_sensitive_count(), 4);

        gen.clear_noise_sensitive_count();
        assert_eq!(gen.noise_sensitive_count(), 0);
    }

    #[test]
    fn test_perturbed_policy_leaves_stored_regret_exact() {
        let mut gen = PerturbedPolicyRegretMatching::new(layout(), 10.0, 1);
        gen.update(seq(0, 0), 1.5);
        for _ in 0..10 {
            let p = gen.policy(0);
            assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            assert!(p.iter().all(|&x| x >= 0.0));
        }
        assert_eq!(gen.regret_table().regrets(0), &[1.5, 0.0]);
    }

    #[test]
    fn test_perturbed_policy_reseed_reproduces_stream() {
        let mut gen = PerturbedPolicyRegretMatching::new(layout(), 1.0, 99);
        gen.update(seq(1, 0), 0.5);
        gen.update(seq(1, 1), 0.2);
        let first: Vec<Vec<f64>> = (0..8).map(|_| gen.policy(1)).collect();

        gen.reseed(99);
        let again: Vec<Vec<f64>> = (0..8).map(|_| gen.policy(1)).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn test_perturbed_policy_with_zero_noise_matches_plain() {
        let mut plain = RegretMatching::new(layout());
        let mut perturbed = PerturbedPolicyRegretMatching::new(layout(), 0.0, 3);
        for (s, d) in [(seq(1, 0), 2.0), (seq(1, 1), -1.0), (seq(1, 2), 6.0)] {
            plain.update(s, d);
            perturbed.update(s, d);
        }
        assert_eq!(plain.policy(1), perturbed.policy(1));
    }

    #[test]
    fn test_perturbed_table_offsets_updates_by_noise() {
        let mut gen = PerturbedTableRegretMatching::new(layout(), 0.25, DEFAULT_NOISE_SEED);
        for _ in 0..20 {
            let before = gen.regret_table().get(seq(0, 1));
            gen.update(seq(0, 1), 1.0);
            let step = gen.regret_table().get(seq(0, 1)) - before;
            assert!((step - 1.25).abs() < 1e-12 || (step - 0.75).abs() < 1e-12);
        }
        assert_eq!(gen.noise_sensitive_count(), 0);
    }

    #[test]
    fn test_clear_restores_fresh_state() {
        let mut gen = PerturbedPolicyRegretMatching::new(layout(), 1.0, 5);
        let fresh: Vec<Vec<f64>> = (0..4).map(|_| gen.policy(0)).collect();

        gen.update(seq(0, 0), 3.0);
        gen.clear();
        assert_eq!(gen.noise_sensitive_count(), 0);
        assert_eq!(gen.regret_table().regrets(0), &[0.0, 0.0]);
        let replay: Vec<Vec<f64>> = (0..4).map(|_| gen.policy(0)).collect();
        assert_eq!(fresh, replay);
    }

    #[test]
    fn test_build_policy_dispatches_on_rule() {
        let mut plus = build_policy(RegretRule::RegretMatchingPlus, layout(), 0.0, 0);
        plus.update(seq(0, 0), -1.0);
        assert_eq!(plus.regret_table().get(seq(0, 0)), 0.0);

        let mut plain = build_policy(RegretRule::RegretMatching, layout(), 0.0, 0);
        plain.update(seq(0, 0), -1.0);
        assert_eq!(plain.regret_table().get(seq(0, 0)), -1.0);

        let mut perturbed = build_policy(RegretRule::PerturbedPolicy, layout(), 2.0, 0);
        perturbed.policy(0);
        assert_eq!(perturbed.noise_sensitive_count(), 2);
    }
}
