//! Game definition interface.
//!
//! A game is described entirely in terms of symbol sequences: an ordered
//! alphabet, a legality rule over `(prefix, candidate)`, who acts at a
//! prefix, which information set that prefix belongs to, and the payoff of
//! terminal prefixes. The solver never sees a game state object; it pushes
//! and pops symbols on a single shared history.
//!
//! Payoffs are always reported from player 0's point of view. The games are
//! two-player zero-sum, so player 1 receives the negation.

use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

use crate::cfr::error::{Result, SolverError};
use crate::cfr::history::{History, Sequence};
use crate::cfr::storage::SequenceLayout;

/// Number of players in every supported game.
pub const NUM_PLAYERS: usize = 2;

/// Who decides at a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    /// A strategic player, `0` or `1`.
    Player(usize),
    /// Nature; outcomes follow [`Game::chance_probabilities`].
    Chance,
}

/// A two-player zero-sum extensive-form game over symbol sequences.
///
/// # Contract
/// - `is_legal` must depend only on its arguments.
/// - A prefix with no legal candidate is terminal; `terminal_payoff` is only
///   called on terminal prefixes.
/// - For `Actor::Player(p)` prefixes, `info_set(p, prefix)` must be in
///   `0..info_set_actions(p).len()` and the declared action count must equal
///   the number of legal successors. The legal rank of a successor is the
///   action index.
/// - All prefixes in one information set must have the same legal successors
///   in the same order.
pub trait Game {
    /// Alphabet symbol type.
    type Symbol: Clone + Display + Debug;

    /// Every candidate symbol, in enumeration order.
    fn alphabet(&self) -> Vec<Self::Symbol>;

    /// Whether `candidate` may follow `prefix`.
    fn is_legal(&self, prefix: &[Self::Symbol], candidate: &Self::Symbol) -> bool;

    /// Who acts at a non-terminal `prefix`.
    fn actor(&self, prefix: &[Self::Symbol]) -> Actor;

    /// Information set of `player` at `prefix`, where `player` is the actor.
    fn info_set(&self, player: usize, prefix: &[Self::Symbol]) -> usize;

    /// Number of actions at each of `player`'s information sets.
    fn info_set_actions(&self, player: usize) -> Vec<usize>;

    /// Payoff to player 0 at a terminal prefix.
    fn terminal_payoff(&self, prefix: &[Self::Symbol]) -> Result<f64>;

    /// Outcome probabilities at a chance prefix with `num_outcomes` legal
    /// successors, in legal-rank order. Uniform unless overridden.
    fn chance_probabilities(&self, _prefix: &[Self::Symbol], num_outcomes: usize) -> Vec<f64> {
        vec![1.0 / num_outcomes as f64; num_outcomes]
    }
}

/// Build an empty history whose legality rule is the game's.
pub fn history_of<G: Game + ?Sized>(
    game: &G,
) -> History<G::Symbol, impl Fn(&[G::Symbol], &G::Symbol) -> bool + '_> {
    History::from_fn(game.alphabet(), move |prefix, candidate| {
        game.is_legal(prefix, candidate)
    })
}

/// One sequence layout per player, from the declared action counts.
pub fn layouts_of<G: Game + ?Sized>(game: &G) -> Vec<SequenceLayout> {
    (0..NUM_PLAYERS)
        .map(|p| SequenceLayout::new(game.info_set_actions(p)))
        .collect()
}

/// Render a prefix the way [`History`] displays itself.
pub fn render<S: Display>(prefix: &[S]) -> String {
    prefix
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Check that the acting player's information set exists and declares as
/// many actions as there are legal successors. Returns the information set.
pub(crate) fn checked_info_set<G, H>(
    game: &G,
    layouts: &[SequenceLayout],
    player: usize,
    history: &H,
) -> Result<usize>
where
    G: Game + ?Sized,
    H: Sequence<Symbol = G::Symbol>,
{
    let layout = layouts.get(player).ok_or(SolverError::UnknownPlayer(player))?;
    let info_set = game.info_set(player, history.prefix());
    let declared = layout
        .num_actions(info_set)
        .ok_or(SolverError::InfoSetOutOfRange {
            player,
            info_set,
            num_info_sets: layout.num_info_sets(),
        })?;
    let legal = history.num_successors();
    if declared != legal {
        return Err(SolverError::ActionCountMismatch {
            player,
            info_set,
            declared,
            legal,
        });
    }
    Ok(info_set)
}

/// Chance distribution at the current prefix, checked against the number of
/// legal outcomes.
pub(crate) fn checked_chance<G, H>(game: &G, history: &H) -> Result<Vec<f64>>
where
    G: Game + ?Sized,
    H: Sequence<Symbol = G::Symbol>,
{
    let expected = history.num_successors();
    let probs = game.chance_probabilities(history.prefix(), expected);
    if probs.len() != expected {
        return Err(SolverError::ChanceShape {
            expected,
            found: probs.len(),
        });
    }
    Ok(probs)
}
