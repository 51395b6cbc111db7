//! Reach probabilities and their scoped mutation.
//!
//! A reach profile holds one scalar per player plus one for chance: the
//! probability that each of them plays toward the current prefix. Entries
//! are scaled on the way down a branch and put back on the way up.

use crate::cfr::game::{Actor, NUM_PLAYERS};

/// Probability that each actor plays toward the current prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct ReachProfile {
    players: [f64; NUM_PLAYERS],
    chance: f64,
}

impl Default for ReachProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl ReachProfile {
    /// Everyone reaches the root with probability 1.
    pub fn new() -> Self {
        Self {
            players: [1.0; NUM_PLAYERS],
            chance: 1.0,
        }
    }

    /// Reach contribution of `actor`.
    pub fn get(&self, actor: Actor) -> f64 {
        match actor {
            Actor::Player(p) => self.players[p],
            Actor::Chance => self.chance,
        }
    }

    fn slot(&mut self, actor: Actor) -> &mut f64 {
        match actor {
            Actor::Player(p) => &mut self.players[p],
            Actor::Chance => &mut self.chance,
        }
    }

    /// Product of every entry except `player`'s own.
    ///
    /// This is the counterfactual weight of the prefix for `player`.
    pub fn others(&self, player: usize) -> f64 {
        self.players
            .iter()
            .enumerate()
            .filter(|&(p, _)| p != player)
            .map(|(_, &r)| r)
            .product::<f64>()
            * self.chance
    }
}

/// Something that owns a reach profile and may be passed through a scope.
pub trait ReachHolder {
    /// Mutable access to the owned profile.
    fn reach_mut(&mut self) -> &mut ReachProfile;
}

impl ReachHolder for ReachProfile {
    fn reach_mut(&mut self) -> &mut ReachProfile {
        self
    }
}

/// Multiply `actor`'s reach by `factor`, run `f`, then restore the entry.
///
/// The entry is restored from a saved copy, not by dividing, so a zero
/// factor does not lose information. Restoration also happens when `f`
/// returns an `Err`, since errors travel through the return value.
pub fn with_scaled_reach<T, R>(
    holder: &mut T,
    actor: Actor,
    factor: f64,
    f: impl FnOnce(&mut T) -> R,
) -> R
where
    T: ReachHolder + ?Sized,
{
    let slot = holder.reach_mut().slot(actor);
    let saved = *slot;
    *slot = saved * factor;
    let out = f(holder);
    *holder.reach_mut().slot(actor) = saved;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_is_all_ones() {
        let r = ReachProfile::new();
        assert_eq!(r.get(Actor::Player(0)), 1.0);
        assert_eq!(r.get(Actor::Player(1)), 1.0);
        assert_eq!(r.get(Actor::Chance), 1.0);
        assert_eq!(r.others(0), 1.0);
    }

    #[test]
    fn test_scaling_is_restored_after_nested_scopes() {
        let mut r = ReachProfile::new();
        let inner = with_scaled_reach(&mut r, Actor::Player(1), 0.25, |r| {
            assert_eq!(r.get(Actor::Player(1)), 0.25);
            with_scaled_reach(r, Actor::Chance, 0.5, |r| {
                assert_eq!(r.others(0), 0.125);
                assert_eq!(r.others(1), 0.5);
                r.others(0)
            })
        });
        assert_eq!(inner, 0.125);
        assert_eq!(r, ReachProfile::new());
    }

    #[test]
    fn test_zero_factor_is_restored_exactly() {
        let mut r = ReachProfile::new();
        with_scaled_reach(&mut r, Actor::Player(0), 0.3, |r| {
            with_scaled_reach(r, Actor::Player(0), 0.0, |r| {
                assert_eq!(r.get(Actor::Player(0)), 0.0);
            });
            assert_eq!(r.get(Actor::Player(0)), 0.3);
        });
        assert_eq!(r.get(Actor::Player(0)), 1.0);
    }

    #[test]
    fn test_restores_when_scope_returns_error() {
        let mut r = ReachProfile::new();
        let out: Result<(), &str> =
            with_scaled_reach(&mut r, Actor::Player(1), 0.5, |_| Err("boom"));
        assert!(out.is_err());
        assert_eq!(r.get(Actor::Player(1)), 1.0);
    }
}
