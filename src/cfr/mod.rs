//! CFR (Counterfactual Regret Minimization) Solver Module.
//!
//! This module provides a full-traversal implementation of CFR for two-player
//! zero-sum extensive-form games described as symbol sequences.
//!
//! # Overview
//!
//! CFR is an iterative algorithm that converges to Nash equilibrium by:
//! 1. Computing counterfactual regret for each action at each decision point
//! 2. Updating strategies to minimize regret over time
//! 3. Averaging strategies across iterations to converge to equilibrium
//!
//! The pieces are layered:
//!
//! - [`history`]: a backtrackable symbol sequence with a legality rule
//! - [`tree`]: depth-first value folds over every legal continuation
//! - [`policy`]: regret tables turned into policies by regret matching
//! - [`solver`]: the CFR iteration driver
//! - [`best_response`]: best responses, exploitability and profile values
//! - [`sweep`]: noise-sensitivity experiments over perturbed generators
//!
//! # Supported Regret Rules
//!
//! - **Regret matching**: Plain accumulation, positive-part policy
//! - **Regret matching+**: Floors accumulated regrets at zero
//! - **Perturbed policy**: Adds random ±noise to regrets as they are read
//! - **Perturbed table**: Adds random ±noise to every regret update
//!
//! # Example
//!
//! ```
//! use perturbed_cfr::cfr::{CfrConfig, CfrSolver};
//! use perturbed_cfr::games::KuhnPoker;
//!
//! let mut solver = CfrSolver::from_config(KuhnPoker::new(), CfrConfig::vanilla()).unwrap();
//! solver.train(1_000).unwrap();
//!
//! let exploitability = solver.average_exploitability().unwrap();
//! assert!(exploitability < 0.1);
//! ```
//!
//! # Theory
//!
//! **Regret**: The difference between the value of an action and the value of the current strategy.
//! ```text
//! Regret(a) = Value(a) - Value(current_strategy)
//! ```
//!
//! **Regret Matching**: Set strategy proportional to positive regrets.
//! ```text
//! Strategy(a) = max(0, Regret(a)) / sum(max(0, Regret(a')))
//! ```
//!
//! **Convergence**: Average regret decreases as O(1/sqrt(T)), and the average strategy
//! converges to Nash equilibrium.
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Tammelin, O. "Solving Large Imperfect Information Games Using CFR+" (2014)

pub mod best_response;
pub mod config;
pub mod error;
pub mod game;
pub mod history;
pub mod numeric;
pub mod policy;
pub mod reach;
pub mod solver;
pub mod storage;
pub mod sweep;
pub mod tree;

// Re-export main types for convenient access
pub use best_response::{profile_value, BestResponse};
pub use config::{CfrConfig, CfrStats, ConfigError, ExploitabilityPoint, RegretRule};
pub use error::{Result, SolverError};
pub use game::{Actor, Game, NUM_PLAYERS};
pub use history::{History, HistoryError, Sequence};
pub use policy::{
    build_policy, PerturbedPolicyRegretMatching, PerturbedTableRegretMatching, PolicyGenerator,
    RegretMatching, RegretMatchingPlus, DEFAULT_NOISE_SEED,
};
pub use solver::{CfrSolver, ConvergenceResult, ConvergenceStats};
pub use storage::{SequenceId, SequenceLayout, StrategyProfile};
pub use sweep::{noise_schedule, run_noise_level, SweepRow};
pub use tree::{FoldValue, Successor, TreeValue};
