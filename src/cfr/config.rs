//! Configuration options for the CFR solver.
//!
//! A configuration picks the regret rule (plain regret matching, RM+, or one
//! of the two perturbed variants), its noise and seed, and the stopping
//! criteria used by [`crate::cfr::CfrSolver::train_until`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cfr::policy::DEFAULT_NOISE_SEED;

/// How regrets are stored and turned into a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegretRule {
    /// Regret matching over unclipped cumulative regret.
    #[default]
    RegretMatching,
    /// Regret matching with cumulative regret floored at zero after every update.
    RegretMatchingPlus,
    /// Stored regret is exact; each policy read adds `±noise` per action.
    PerturbedPolicy,
    /// Every stored update carries `±noise`; policy reads are exact.
    PerturbedTable,
}

impl RegretRule {
    /// Whether the rule draws random noise.
    pub fn is_perturbed(self) -> bool {
        matches!(self, Self::PerturbedPolicy | Self::PerturbedTable)
    }
}

/// Configuration for the CFR solver.
///
/// # Example
/// ```
/// use perturbed_cfr::cfr::{CfrConfig, RegretRule};
///
/// let config = CfrConfig::perturbed_policy(0.5).with_seed(7);
/// assert_eq!(config.regret_rule, RegretRule::PerturbedPolicy);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CfrConfig {
    /// Regret rule used by every player's policy generator.
    pub regret_rule: RegretRule,

    /// Magnitude of the `±noise` perturbation. Ignored by the unperturbed rules.
    pub noise: f64,

    /// Seed for the perturbed rules, shared by both players' generators.
    pub seed: u64,

    /// `train_until` stops once average exploitability drops below this.
    pub exploitability_threshold: f64,

    /// Iteration cap for `train_until`; `0` means no cap.
    pub max_iterations: u64,

    /// Iterations between progress reports.
    pub report_interval: u64,
}

impl Default for CfrConfig {
    fn default() -> Self {
        Self {
            regret_rule: RegretRule::RegretMatching,
            noise: 0.0,
            seed: DEFAULT_NOISE_SEED,
            exploitability_threshold: 1e-4,
            max_iterations: 0,
            report_interval: 100_000,
        }
    }
}

impl CfrConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain regret matching.
    pub fn vanilla() -> Self {
        Self::default()
    }

    /// Regret matching plus.
    pub fn plus() -> Self {
        Self {
            regret_rule: RegretRule::RegretMatchingPlus,
            ..Default::default()
        }
    }

    /// Regret matching with `±noise` added to regrets when reading a policy.
    pub fn perturbed_policy(noise: f64) -> Self {
        Self {
            regret_rule: RegretRule::PerturbedPolicy,
            noise,
            ..Default::default()
        }
    }

    /// Regret matching with `±noise` added to every stored update.
    pub fn perturbed_table(noise: f64) -> Self {
        Self {
            regret_rule: RegretRule::PerturbedTable,
            noise,
            ..Default::default()
        }
    }

    /// Builder method: set the regret rule.
    pub fn with_regret_rule(mut self, rule: RegretRule) -> Self {
        self.regret_rule = rule;
        self
    }

    /// Builder method: set the noise magnitude.
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Builder method: set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method: set the exploitability threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.exploitability_threshold = threshold;
        self
    }

    /// Builder method: set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Builder method: set the report interval.
    pub fn with_report_interval(mut self, interval: u64) -> Self {
        self.report_interval = interval;
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.noise.is_finite() || self.noise < 0.0 {
            return Err(ConfigError::InvalidNoise(self.noise));
        }
        if !self.exploitability_threshold.is_finite() || self.exploitability_threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.exploitability_threshold));
        }
        if self.report_interval == 0 {
            return Err(ConfigError::ZeroReportInterval);
        }
        Ok(())
    }
}

/// Errors that can occur when validating CFR configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Noise must be finite and non-negative.
    #[error("noise {0} must be finite and non-negative")]
    InvalidNoise(f64),
    /// Threshold must be finite and positive.
    #[error("exploitability threshold {0} must be finite and positive")]
    InvalidThreshold(f64),
    /// Progress cannot be reported every zero iterations.
    #[error("report interval must be at least 1")]
    ZeroReportInterval,
}

/// Statistics tracked during CFR training.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CfrStats {
    /// Total number of iterations completed.
    pub iterations: u64,

    /// Number of information sets across both players.
    pub info_sets: usize,

    /// Total time spent training (in seconds).
    pub elapsed_seconds: f64,

    /// Iterations per second.
    pub iterations_per_second: f64,

    /// Most recent average exploitability, if measured.
    pub exploitability: Option<f64>,

    /// History of exploitability measurements.
    pub exploitability_history: Vec<ExploitabilityPoint>,

    /// Perturbed regrets whose magnitude was below the noise, summed over players.
    pub noise_sensitive_regrets: u64,
}

/// A single exploitability measurement at a specific iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploitabilityPoint {
    /// Iteration number when this measurement was taken.
    pub iteration: u64,
    /// Average exploitability of the average strategy profile.
    pub exploitability: f64,
}

impl CfrStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update iterations per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = self.iterations as f64 / self.elapsed_seconds;
        }
    }

    /// Record an exploitability measurement.
    pub fn record_exploitability(&mut self, iteration: u64, exploitability: f64) {
        self.exploitability = Some(exploitability);
        self.exploitability_history.push(ExploitabilityPoint {
            iteration,
            exploitability,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CfrConfig::default();
        assert_eq!(config.regret_rule, RegretRule::RegretMatching);
        assert_eq!(config.seed, 63_547_654);
        assert_eq!(config.exploitability_threshold, 1e-4);
        assert_eq!(config.max_iterations, 0);
        assert_eq!(config.report_interval, 100_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert_eq!(CfrConfig::plus().regret_rule, RegretRule::RegretMatchingPlus);
        let table = CfrConfig::perturbed_table(5.0);
        assert_eq!(table.regret_rule, RegretRule::PerturbedTable);
        assert_eq!(table.noise, 5.0);
        assert!(table.regret_rule.is_perturbed());
        assert!(!CfrConfig::vanilla().regret_rule.is_perturbed());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert_eq!(
            CfrConfig::perturbed_policy(-1.0).validate(),
            Err(ConfigError::InvalidNoise(-1.0))
        );
        assert_eq!(
            CfrConfig::new().with_threshold(0.0).validate(),
            Err(ConfigError::InvalidThreshold(0.0))
        );
        assert_eq!(
            CfrConfig::new().with_report_interval(0).validate(),
            Err(ConfigError::ZeroReportInterval)
        );
    }

    #[test]
    fn test_json_round_trip_with_partial_input() {
        let config: CfrConfig =
            serde_json::from_str(r#"{"regret_rule":"perturbed_table","noise":0.5}"#).unwrap();
        assert_eq!(config.regret_rule, RegretRule::PerturbedTable);
        assert_eq!(config.noise, 0.5);
        assert_eq!(config.seed, DEFAULT_NOISE_SEED);

        let text = serde_json::to_string(&config).unwrap();
        let back: CfrConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_stats_record_exploitability() {
        let mut stats = CfrStats::new();
        stats.record_exploitability(10, 0.5);
        stats.record_exploitability(20, 0.25);
        assert_eq!(stats.exploitability, Some(0.25));
        assert_eq!(stats.exploitability_history.len(), 2);

        stats.iterations = 20;
        stats.elapsed_seconds = 2.0;
        stats.update_rate();
        assert_eq!(stats.iterations_per_second, 10.0);
    }
}
