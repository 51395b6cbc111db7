//! Noise-sweep experiments.
//!
//! For each noise magnitude a fresh perturbed solver is trained until the
//! average exploitability of its average profile drops below a threshold.
//! The number of iterations that took is the measure of noise sensitivity.

use serde::{Deserialize, Serialize};

use crate::cfr::config::CfrConfig;
use crate::cfr::error::Result;
use crate::cfr::game::Game;
use crate::cfr::solver::{CfrSolver, ConvergenceStats};

/// One line of a sweep: how long a noise level took to converge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    /// Noise magnitude.
    pub noise: f64,
    /// Iterations run.
    pub iterations: u64,
    /// Exploitability when the run stopped.
    pub exploitability: f64,
    /// Whether the threshold was reached before the iteration cap.
    pub converged: bool,
    /// Perturbed regrets that were smaller than the noise.
    pub noise_sensitive_regrets: u64,
}

/// Noise magnitudes swept by default, in order.
pub fn noise_schedule() -> Vec<f64> {
    vec![0.0, 0.1, 0.5, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0]
}

/// Seed used at a noise level: the noiseless baseline always uses 0.
pub fn seed_for_noise(noise: f64, seed: u64) -> u64 {
    if noise == 0.0 {
        0
    } else {
        seed
    }
}

/// Train a solver for `game` at one noise level.
///
/// The regret rule, threshold, cap and report interval come from `base`;
/// its noise and seed are replaced.
pub fn run_noise_level<G, F>(game: G, base: &CfrConfig, noise: f64, progress: F) -> Result<SweepRow>
where
    G: Game,
    F: FnMut(&ConvergenceStats),
{
    let config = base
        .clone()
        .with_noise(noise)
        .with_seed(seed_for_noise(noise, base.seed));
    let threshold = config.exploitability_threshold;
    let max_iterations = config.max_iterations;

    let mut solver = CfrSolver::from_config(game, config)?;
    let result = solver.train_until(threshold, max_iterations, progress)?;

    Ok(SweepRow {
        noise,
        iterations: result.iterations,
        exploitability: result.exploitability,
        converged: result.converged,
        noise_sensitive_regrets: solver.noise_sensitive_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::MatrixGame;

    fn game() -> MatrixGame {
        MatrixGame::new(vec![vec![2.0, -2.0], vec![-4.0, 3.0]]).unwrap()
    }

    #[test]
    fn test_schedule_starts_noiseless() {
        let schedule = noise_schedule();
        assert_eq!(schedule.first(), Some(&0.0));
        assert_eq!(schedule.len(), 9);
        assert!(schedule.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_seed_for_noise() {
        assert_eq!(seed_for_noise(0.0, 3_839_203_241), 0);
        assert_eq!(seed_for_noise(0.5, 3_839_203_241), 3_839_203_241);
    }

    #[test]
    fn test_noiseless_level_converges() {
        let base = CfrConfig::perturbed_policy(0.0)
            .with_threshold(1e-2)
            .with_max_iterations(100_000);
        let row = run_noise_level(game(), &base, 0.0, |_| {}).unwrap();
        assert!(row.converged);
        assert!(row.exploitability < 1e-2);
        assert_eq!(row.noise, 0.0);
    }

    #[test]
    fn test_cap_is_reported_as_not_converged() {
        let base = CfrConfig::perturbed_table(0.0)
            .with_threshold(1e-12)
            .with_max_iterations(50);
        let row = run_noise_level(game(), &base, 5.0, |_| {}).unwrap();
        assert!(!row.converged);
        assert_eq!(row.iterations, 50);
    }
}
