//! # Perturbed CFR
//!
//! A Counterfactual Regret Minimization (CFR) solver for two-player zero-sum
//! extensive-form games, built to measure how sensitive regret matching is
//! to noise in its regret table.
//!
//! ## Features
//!
//! - **Sequence Games**: Games are alphabets plus a legality rule; the solver
//!   walks one backtrackable history instead of cloning states
//! - **Regret Rules**: Regret matching, regret matching+, and two perturbed
//!   variants that inject seeded ±noise
//! - **Exploitability Calculation**: Exact best responses over the full tree
//! - **Noise Sweeps**: Iterations-to-threshold as a function of noise
//!
//! ## Quick Start
//!
//! ```
//! use perturbed_cfr::{CfrConfig, CfrSolver};
//! use perturbed_cfr::games::MatrixGame;
//!
//! // 1. Describe the game
//! let game = MatrixGame::new(vec![vec![2.0, -2.0], vec![-4.0, 3.0]]).unwrap();
//!
//! // 2. Create a solver
//! let mut solver = CfrSolver::from_config(game, CfrConfig::vanilla()).unwrap();
//!
//! // 3. Train until the average profile is nearly unexploitable
//! let result = solver.train_until(1e-2, 100_000, |_| {}).unwrap();
//! assert!(result.converged);
//!
//! // 4. Read the average strategy
//! let profile = solver.strategy_profile();
//! assert!((profile.probability(0, 0, 0).unwrap() - 7.0 / 11.0).abs() < 0.05);
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: Core CFR algorithm and solver
//! - [`games`]: Example game implementations (matrix games, Kuhn Poker)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         CFR Solver                              │
//! │  - Regret accumulation    - Policy generators                   │
//! │  - Tree value folds       - Exploitability calculation          │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ implements Game trait
//!                               ▼
//!                ┌──────────────┴──────────────┐
//!                │                             │
//!                ▼                             ▼
//!         ┌─────────────┐               ┌─────────────┐
//!         │   Matrix    │               │    Kuhn     │
//!         │   Games     │               │    Poker    │
//!         └─────────────┘               └─────────────┘
//! ```

#![warn(missing_docs)]

/// CFR (Counterfactual Regret Minimization) solver module.
///
/// This is the core module containing the CFR algorithm.
pub mod cfr;

/// Game implementations module.
///
/// Contains matrix games and Kuhn Poker for testing and validation.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use cfr::{
    Actor, BestResponse, CfrConfig, CfrSolver, CfrStats, Game, PolicyGenerator, RegretRule,
    SolverError, StrategyProfile,
};
