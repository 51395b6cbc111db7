//! Kuhn Poker as a symbol-sequence game.
//!
//! Kuhn Poker is a simplified poker game used to validate CFR implementations
//! because it has a known, mathematically proven Nash equilibrium.
//!
//! ## Game Rules
//!
//! - 3 cards: Jack (0), Queen (1), King (2)
//! - 2 players, each antes 1 chip
//! - Each player receives 1 card
//! - Player 1 acts first: Pass or Bet (1 chip)
//! - Player 2 responds based on P1's action
//! - Higher card wins at showdown
//!
//! ## Game Tree
//!
//! A history starts with a single chance symbol dealing both cards, followed
//! by the betting symbols.
//!
//! ```text
//! Deal (chance, 6 outcomes)
//! └── P1
//!     ├── Pass
//!     │   └── P2
//!     │       ├── Pass → Showdown (pot = 2)
//!     │       └── Bet
//!     │           └── P1
//!     │               ├── Pass → P2 wins (pot = 3)
//!     │               └── Bet → Showdown (pot = 4)
//!     └── Bet
//!         └── P2
//!             ├── Pass → P1 wins (pot = 3)
//!             └── Bet → Showdown (pot = 4)
//! ```
//!
//! ## Information Sets
//!
//! Each player has six: their card times the two betting situations they can
//! face. Player 1's are `card * 2` at the root and `card * 2 + 1` after
//! `Pass, Bet`. Player 2's are `card * 2` after `Pass` and `card * 2 + 1`
//! after `Bet`. Action 0 is always Pass and action 1 is Bet.
//!
//! ## Known Nash Equilibrium
//!
//! - **Player 1 with Jack**: Bet with probability α ∈ [0, 1/3]
//! - **Player 1 with Queen**: Always Pass
//! - **Player 1 with King**: Bet with probability 3α
//! - **Player 2 facing Bet with Jack**: Always Fold
//! - **Player 2 facing Bet with Queen**: Call with probability 1/3
//! - **Player 2 facing Bet with King**: Always Call
//!
//! **Expected Value**: Player 1 EV = -1/18 ≈ -0.0556

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cfr::error::{Result, SolverError};
use crate::cfr::game::{render, Actor, Game};

/// Number of cards in the deck.
pub const NUM_CARDS: u8 = 3;

/// Symbols of a Kuhn Poker history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KuhnSymbol {
    /// Chance deals `first` to player 1 and `second` to player 2.
    Deal {
        /// Player 1's card (0=Jack, 1=Queen, 2=King)
        first: u8,
        /// Player 2's card
        second: u8,
    },
    /// Pass (check if no bet, fold if facing bet)
    Pass,
    /// Bet (or call if facing bet)
    Bet,
}

impl fmt::Display for KuhnSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KuhnSymbol::Deal { first, second } => {
                write!(f, "{}{}", card_letter(*first), card_letter(*second))
            }
            KuhnSymbol::Pass => write!(f, "p"),
            KuhnSymbol::Bet => write!(f, "b"),
        }
    }
}

fn card_letter(card: u8) -> &'static str {
    match card {
        0 => "J",
        1 => "Q",
        2 => "K",
        _ => "?",
    }
}

/// Split a prefix into the dealt cards and the betting that followed.
fn split_deal(prefix: &[KuhnSymbol]) -> Option<([u8; 2], &[KuhnSymbol])> {
    match prefix {
        [KuhnSymbol::Deal { first, second }, betting @ ..] => Some(([*first, *second], betting)),
        _ => None,
    }
}

fn betting_is_open(betting: &[KuhnSymbol]) -> bool {
    use KuhnSymbol::{Bet, Pass};
    matches!(betting, [] | [Pass] | [Bet] | [Pass, Bet])
}

/// Kuhn Poker game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KuhnPoker;

impl KuhnPoker {
    /// Create a new Kuhn Poker game.
    pub fn new() -> Self {
        Self
    }

    /// Get card name for display.
    pub fn card_name(card: u8) -> &'static str {
        match card {
            0 => "Jack",
            1 => "Queen",
            2 => "King",
            _ => "Unknown",
        }
    }

    /// Information set of `player` holding `card` in the given betting
    /// situation (0 = first decision, 1 = facing a bet after passing for
    /// player 1 or facing a bet for player 2).
    pub fn info_set_of(card: u8, situation: usize) -> usize {
        usize::from(card) * 2 + situation
    }
}

impl Game for KuhnPoker {
    type Symbol = KuhnSymbol;

    fn alphabet(&self) -> Vec<KuhnSymbol> {
        let mut symbols = Vec::with_capacity(8);
        for first in 0..NUM_CARDS {
            for second in (0..NUM_CARDS).filter(|&c| c != first) {
                symbols.push(KuhnSymbol::Deal { first, second });
            }
        }
        symbols.push(KuhnSymbol::Pass);
        symbols.push(KuhnSymbol::Bet);
        symbols
    }

    fn is_legal(&self, prefix: &[KuhnSymbol], candidate: &KuhnSymbol) -> bool {
        match (split_deal(prefix), candidate) {
            (None, KuhnSymbol::Deal { .. }) => prefix.is_empty(),
            (None, _) | (Some(_), KuhnSymbol::Deal { .. }) => false,
            (Some((_, betting)), _) => betting_is_open(betting),
        }
    }

    fn actor(&self, prefix: &[KuhnSymbol]) -> Actor {
        match split_deal(prefix) {
            None => Actor::Chance,
            Some((_, betting)) => match betting {
                [_] => Actor::Player(1),
                _ => Actor::Player(0),
            },
        }
    }

    fn info_set(&self, player: usize, prefix: &[KuhnSymbol]) -> usize {
        let Some((cards, betting)) = split_deal(prefix) else {
            return 0;
        };
        let situation = if player == 0 {
            usize::from(!betting.is_empty())
        } else {
            usize::from(betting.first() == Some(&KuhnSymbol::Bet))
        };
        Self::info_set_of(cards[player.min(1)], situation)
    }

    fn info_set_actions(&self, player: usize) -> Vec<usize> {
        if player < 2 {
            vec![2; usize::from(NUM_CARDS) * 2]
        } else {
            Vec::new()
        }
    }

    fn terminal_payoff(&self, prefix: &[KuhnSymbol]) -> Result<f64> {
        use KuhnSymbol::{Bet, Pass};

        let missing = || SolverError::MissingPayoff {
            sequence: render(prefix),
        };
        let (cards, betting) = split_deal(prefix).ok_or_else(missing)?;
        let showdown = if cards[0] > cards[1] { 1.0 } else { -1.0 };

        match betting {
            [Pass, Pass] => Ok(showdown),
            [Bet, Pass] => Ok(1.0),
            [Pass, Bet, Pass] => Ok(-1.0),
            [Bet, Bet] | [Pass, Bet, Bet] => Ok(2.0 * showdown),
            _ => Err(missing()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::game::history_of;
    use crate::cfr::history::Sequence;
    use crate::cfr::{profile_value, CfrConfig, CfrSolver};

    const KJ: KuhnSymbol = KuhnSymbol::Deal {
        first: 2,
        second: 0,
    };
    const JK: KuhnSymbol = KuhnSymbol::Deal {
        first: 0,
        second: 2,
    };

    #[test]
    fn test_kuhn_game_tree() {
        let game = KuhnPoker::new();
        let mut h = history_of(&game);

        assert_eq!(game.actor(h.prefix()), Actor::Chance);
        assert_eq!(h.num_successors(), 6);

        h.push(KJ).unwrap();
        assert_eq!(game.actor(h.prefix()), Actor::Player(0));
        assert_eq!(h.num_successors(), 2);
        assert!(h.push(JK).is_err());

        h.push(KuhnSymbol::Pass).unwrap();
        assert_eq!(game.actor(h.prefix()), Actor::Player(1));
        h.push(KuhnSymbol::Bet).unwrap();
        assert_eq!(game.actor(h.prefix()), Actor::Player(0));
        h.push(KuhnSymbol::Bet).unwrap();
        assert!(!h.has_successors());
        assert_eq!(h.to_string(), "KJ -> p -> b -> b");
    }

    #[test]
    fn test_kuhn_terminal_payoffs() {
        use KuhnSymbol::{Bet, Pass};
        let game = KuhnPoker::new();

        assert_eq!(game.terminal_payoff(&[KJ, Pass, Pass]), Ok(1.0));
        assert_eq!(game.terminal_payoff(&[JK, Bet, Pass]), Ok(1.0));
        assert_eq!(game.terminal_payoff(&[KJ, Pass, Bet, Pass]), Ok(-1.0));
        assert_eq!(game.terminal_payoff(&[JK, Bet, Bet]), Ok(-2.0));
        assert_eq!(game.terminal_payoff(&[KJ, Pass, Bet, Bet]), Ok(2.0));
        assert_eq!(
            game.terminal_payoff(&[KJ, Bet]),
            Err(SolverError::MissingPayoff {
                sequence: "KJ -> b".to_string(),
            })
        );
    }

    #[test]
    fn test_kuhn_info_sets() {
        use KuhnSymbol::{Bet, Pass};
        let game = KuhnPoker::new();
        let qk = KuhnSymbol::Deal {
            first: 1,
            second: 2,
        };

        assert_eq!(game.info_set(0, &[qk]), 2);
        assert_eq!(game.info_set(1, &[qk, Pass]), 4);
        assert_eq!(game.info_set(1, &[qk, Bet]), 5);
        assert_eq!(game.info_set(0, &[qk, Pass, Bet]), 3);
        assert_eq!(game.info_set_actions(0), vec![2; 6]);
        assert_eq!(game.info_set_actions(1), vec![2; 6]);
    }

    #[test]
    fn test_kuhn_cfr_convergence() {
        let mut solver = CfrSolver::from_config(KuhnPoker::new(), CfrConfig::vanilla()).unwrap();
        solver.do_iterations(10_000).unwrap();

        let exploitability = solver.average_exploitability().unwrap();
        assert!(exploitability < 0.01, "exploitability {}", exploitability);

        let profile = solver.strategy_profile();
        let value = profile_value(&KuhnPoker::new(), &profile).unwrap();
        assert!((value + 1.0 / 18.0).abs() < 0.02, "value {}", value);

        // P2 folds a Jack and calls with a King when facing a bet.
        let fold_jack = profile.probability(1, KuhnPoker::info_set_of(0, 1), 0).unwrap();
        let call_king = profile.probability(1, KuhnPoker::info_set_of(2, 1), 1).unwrap();
        assert!(fold_jack > 0.95, "P2 Jack fold {}", fold_jack);
        assert!(call_king > 0.95, "P2 King call {}", call_king);

        // P1 with a King always calls after passing.
        let p1_call_king = profile.probability(0, KuhnPoker::info_set_of(2, 1), 1).unwrap();
        assert!(p1_call_king > 0.95, "P1 King call {}", p1_call_king);
    }
}
