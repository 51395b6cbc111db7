//! Error taxonomy for the solver.
//!
//! Numerical degeneracy (non-positive regret totals, zero reach) is never an
//! error; it is handled by uniform fallback and zero propagation.

use thiserror::Error;

use crate::cfr::config::ConfigError;
use crate::cfr::history::HistoryError;

/// Errors raised while building or running a solver.
///
/// An error aborts the current iteration. The shared history is already
/// restored by the time it reaches the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// A symbol was pushed that the legality rule rejects.
    #[error(transparent)]
    History(#[from] HistoryError),

    /// The game has no payoff for a terminal sequence.
    #[error("no payoff for terminal sequence \"{sequence}\"")]
    MissingPayoff {
        /// The terminal sequence, rendered with `->` separators.
        sequence: String,
    },

    /// The game mapped a prefix to an information set it never declared.
    #[error("player {player} info set {info_set} is out of range ({num_info_sets} declared)")]
    InfoSetOutOfRange {
        /// Acting player.
        player: usize,
        /// Reported information set.
        info_set: usize,
        /// Number of declared information sets.
        num_info_sets: usize,
    },

    /// Declared action count disagrees with the number of legal successors.
    #[error(
        "player {player} info set {info_set} declares {declared} actions but {legal} are legal"
    )]
    ActionCountMismatch {
        /// Acting player.
        player: usize,
        /// Information set.
        info_set: usize,
        /// Actions declared by the game.
        declared: usize,
        /// Legal successors found at the prefix.
        legal: usize,
    },

    /// A chance distribution does not match the number of chance outcomes.
    #[error("chance distribution has {found} entries, expected {expected}")]
    ChanceShape {
        /// Number of legal chance outcomes.
        expected: usize,
        /// Length of the distribution returned by the game.
        found: usize,
    },

    /// The game named a player outside `0..NUM_PLAYERS`.
    #[error("unknown player {0}")]
    UnknownPlayer(usize),

    /// The game definition itself is malformed.
    #[error("invalid game: {0}")]
    InvalidGame(String),

    /// Rejected configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias used across the solver.
pub type Result<T> = std::result::Result<T, SolverError>;
