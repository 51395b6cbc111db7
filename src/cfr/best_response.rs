//! Best response and exploitability against a frozen strategy profile.
//!
//! For each player the evaluator walks the game with the opponent mixing by
//! the profile and chance by the game's distribution. At the responder's own
//! nodes every action is evaluated, its counterfactual value is added to the
//! action totals of the information set, and the walk continues with the
//! currently chosen action. Choices then switch to a strictly better action
//! wherever one exists, and the walk is repeated until nothing changes.
//! With perfect recall the choices settle after at most one pass per level
//! of the responder's information-set tree.
//!
//! Nothing here touches a regret table.

use log::warn;

use crate::cfr::error::{Result, SolverError};
use crate::cfr::game::{
    checked_chance, checked_info_set, history_of, layouts_of, Actor, Game, NUM_PLAYERS,
};
use crate::cfr::history::Sequence;
use crate::cfr::reach::{with_scaled_reach, ReachHolder, ReachProfile};
use crate::cfr::storage::{SequenceLayout, StrategyProfile};
use crate::cfr::tree::{FoldValue, Successor, TreeValue};

/// Pure best responses of both players to a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct BestResponse {
    values: [f64; NUM_PLAYERS],
    choices: Vec<Vec<usize>>,
    layouts: Vec<SequenceLayout>,
}

impl BestResponse {
    /// Compute each player's best response to `profile`.
    ///
    /// Fails if the profile does not cover an information set the game
    /// reaches, or gives it the wrong number of actions.
    pub fn compute<G: Game + ?Sized>(game: &G, profile: &StrategyProfile) -> Result<Self> {
        let layouts = layouts_of(game);
        let mut values = [0.0; NUM_PLAYERS];
        let mut choices = Vec::with_capacity(NUM_PLAYERS);

        for (player, value) in values.iter_mut().enumerate() {
            let (best, chosen) = respond(game, &layouts, profile, player)?;
            *value = best;
            choices.push(chosen);
        }

        Ok(Self {
            values,
            choices,
            layouts,
        })
    }

    /// Best-response value of `player`, from that player's point of view.
    pub fn value(&self, player: usize) -> f64 {
        self.values[player]
    }

    /// Best-response value of every player.
    pub fn values(&self) -> [f64; NUM_PLAYERS] {
        self.values
    }

    /// Mean best-response value. Never negative in a zero-sum game, and zero
    /// exactly at an equilibrium.
    pub fn average_exploitability(&self) -> f64 {
        self.values.iter().sum::<f64>() / NUM_PLAYERS as f64
    }

    /// Action chosen by `player` at `info_set`.
    pub fn choice(&self, player: usize, info_set: usize) -> Option<usize> {
        self.choices.get(player)?.get(info_set).copied()
    }

    /// The best responses as a degenerate (0/1) strategy profile.
    pub fn strategy_profile(&self) -> StrategyProfile {
        let policies = self
            .choices
            .iter()
            .zip(&self.layouts)
            .map(|(chosen, layout)| {
                chosen
                    .iter()
                    .zip(layout.actions())
                    .map(|(&choice, &n)| {
                        let mut p = vec![0.0; n];
                        if let Some(slot) = p.get_mut(choice) {
                            *slot = 1.0;
                        }
                        p
                    })
                    .collect()
            })
            .collect();
        StrategyProfile::new(policies)
    }
}

/// Iterate one responder's pure choices to a fixed point.
fn respond<G: Game + ?Sized>(
    game: &G,
    layouts: &[SequenceLayout],
    profile: &StrategyProfile,
    player: usize,
) -> Result<(f64, Vec<usize>)> {
    let mut choices = vec![0; layouts[player].num_info_sets()];
    let max_passes = choices.len() + 1;

    for _ in 0..max_passes {
        let (value, totals) = evaluate_choices(game, layouts, profile, player, &choices)?;
        if !improve(&mut choices, &totals) {
            return Ok((value, choices));
        }
    }

    warn!(
        "best response for player {} did not settle after {} passes",
        player, max_passes
    );
    let (value, _) = evaluate_choices(game, layouts, profile, player, &choices)?;
    Ok((value, choices))
}

/// Root value under `choices` and the counterfactual action totals per
/// information set.
fn evaluate_choices<G: Game + ?Sized>(
    game: &G,
    layouts: &[SequenceLayout],
    profile: &StrategyProfile,
    player: usize,
    choices: &[usize],
) -> Result<(f64, Vec<Vec<f64>>)> {
    let mut walk = ResponseWalk {
        game,
        layouts,
        profile,
        player,
        choices,
        totals: layouts[player]
            .actions()
            .iter()
            .map(|&n| vec![0.0; n])
            .collect(),
        reach: ReachProfile::new(),
    };
    let value = walk.value(&mut history_of(game))?;
    Ok((value, walk.totals))
}

/// Switch each choice to a strictly better action. Returns whether any
/// choice changed.
fn improve(choices: &mut [usize], totals: &[Vec<f64>]) -> bool {
    let mut changed = false;
    for (choice, q) in choices.iter_mut().zip(totals) {
        if q.is_empty() {
            continue;
        }
        let mut best = *choice;
        for (action, &v) in q.iter().enumerate() {
            if v > q[best] {
                best = action;
            }
        }
        if best != *choice {
            *choice = best;
            changed = true;
        }
    }
    changed
}

/// Distribution of `player` at `info_set`, checked against the legal count.
fn profile_policy(
    profile: &StrategyProfile,
    player: usize,
    info_set: usize,
    legal: usize,
) -> Result<&[f64]> {
    let policy = profile
        .policy(player, info_set)
        .ok_or(SolverError::InfoSetOutOfRange {
            player,
            info_set,
            num_info_sets: profile.num_info_sets(player),
        })?;
    if policy.len() != legal {
        return Err(SolverError::ActionCountMismatch {
            player,
            info_set,
            declared: policy.len(),
            legal,
        });
    }
    Ok(policy)
}

struct ResponseWalk<'a, G: Game + ?Sized> {
    game: &'a G,
    layouts: &'a [SequenceLayout],
    profile: &'a StrategyProfile,
    player: usize,
    choices: &'a [usize],
    totals: Vec<Vec<f64>>,
    reach: ReachProfile,
}

impl<G: Game + ?Sized> ReachHolder for ResponseWalk<'_, G> {
    fn reach_mut(&mut self) -> &mut ReachProfile {
        &mut self.reach
    }
}

impl<G, H> TreeValue<H> for ResponseWalk<'_, G>
where
    G: Game + ?Sized,
    H: Sequence<Symbol = G::Symbol>,
{
    type Value = f64;
    type Error = SolverError;

    fn terminal_value(&mut self, history: &H) -> Result<f64> {
        let payoff = self.game.terminal_payoff(history.prefix())?;
        let sign = if self.player == 0 { 1.0 } else { -1.0 };
        Ok(sign * self.reach.others(self.player) * payoff)
    }

    fn interior_value(&mut self, history: &mut H) -> Result<f64> {
        let (actor, probs) = match self.game.actor(history.prefix()) {
            Actor::Chance => (Actor::Chance, checked_chance(self.game, history)?),
            Actor::Player(p) if p != self.player => {
                let info_set = checked_info_set(self.game, self.layouts, p, history)?;
                let policy = profile_policy(self.profile, p, info_set, history.num_successors())?;
                (Actor::Player(p), policy.to_vec())
            }
            Actor::Player(p) => {
                let info_set = checked_info_set(self.game, self.layouts, p, history)?;
                let chosen = self.choices[info_set];
                let mut value = 0.0;
                history.each_successor(|h, _, rank| {
                    let child = self.value(h)?;
                    self.totals[info_set][rank] += child;
                    if rank == chosen {
                        value = child;
                    }
                    Ok::<_, SolverError>(false)
                })?;
                return Ok(value);
            }
        };

        let mut value = 0.0;
        history.each_successor(|h, _, rank| {
            value += with_scaled_reach(self, actor, probs[rank], |walk| walk.value(h))?;
            Ok::<_, SolverError>(false)
        })?;
        Ok(value)
    }
}

/// Expected payoff to player 0 when everyone follows `profile`.
pub fn profile_value<G: Game + ?Sized>(game: &G, profile: &StrategyProfile) -> Result<f64> {
    fold_profile(game, &layouts_of(game), profile, &mut history_of(game))
}

fn fold_profile<G, H>(
    game: &G,
    layouts: &[SequenceLayout],
    profile: &StrategyProfile,
    history: &mut H,
) -> Result<f64>
where
    G: Game + ?Sized,
    H: Sequence<Symbol = G::Symbol>,
{
    let mut failure: Option<SolverError> = None;
    let value = FoldValue::new(
        |h: &H| game.terminal_payoff(h.prefix()),
        |acc: f64, h: &H, successor: Successor, child: f64| {
            let prefix = h.prefix();
            let parent = &prefix[..prefix.len() - 1];
            match branch_probability(game, layouts, profile, parent, successor.rank) {
                Ok(p) => acc + p * child,
                Err(err) => {
                    failure.get_or_insert(err);
                    acc
                }
            }
        },
    )
    .value(history)?;

    match failure {
        Some(err) => Err(err),
        None => Ok(value),
    }
}

/// Probability of taking the successor of legal rank `rank` at `parent`.
fn branch_probability<G: Game + ?Sized>(
    game: &G,
    layouts: &[SequenceLayout],
    profile: &StrategyProfile,
    parent: &[G::Symbol],
    rank: usize,
) -> Result<f64> {
    let legal = game
        .alphabet()
        .iter()
        .filter(|s| game.is_legal(parent, s))
        .count();
    match game.actor(parent) {
        Actor::Chance => {
            let probs = game.chance_probabilities(parent, legal);
            if probs.len() != legal {
                return Err(SolverError::ChanceShape {
                    expected: legal,
                    found: probs.len(),
                });
            }
            Ok(probs[rank])
        }
        Actor::Player(player) => {
            let layout = layouts.get(player).ok_or(SolverError::UnknownPlayer(player))?;
            let info_set = game.info_set(player, parent);
            if layout.num_actions(info_set).is_none() {
                return Err(SolverError::InfoSetOutOfRange {
                    player,
                    info_set,
                    num_info_sets: layout.num_info_sets(),
                });
            }
            Ok(profile_policy(profile, player, info_set, legal)?[rank])
        }
    }
}
