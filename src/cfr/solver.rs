//! Counterfactual Regret Minimization driver.
//!
//! One iteration walks the whole game from the empty history for a single
//! traverser, who alternates 0, 1, 0, ... across iterations:
//! - at an opponent node, the opponent's reach is scaled by its current
//!   policy, the scaled reach is added to its average-strategy sums, and the
//!   child is evaluated;
//! - at a chance node, the chance reach is scaled by the outcome probability;
//! - at a traverser node, every action is evaluated and the regret signal
//!   `v(a) - Σ σ(a) v(a)` is recorded per sequence;
//! - at a terminal, the payoff is signed for the traverser and weighted by
//!   the reach of everyone else.
//!
//! Policies are read from the generators at every interior visit, and a
//! traverser node pushes its regret signals to the traverser's generator as
//! soon as all of its actions have been evaluated. Sequences that are never
//! visited receive no update.

use std::time::Instant;

use log::{debug, info, trace};

use crate::cfr::best_response::{profile_value, BestResponse};
use crate::cfr::config::{CfrConfig, CfrStats};
use crate::cfr::error::{Result, SolverError};
use crate::cfr::game::{checked_chance, checked_info_set, history_of, layouts_of, Actor, Game};
use crate::cfr::history::Sequence;
use crate::cfr::numeric::dot;
use crate::cfr::policy::{build_policy, PolicyGenerator};
use crate::cfr::reach::{with_scaled_reach, ReachHolder, ReachProfile};
use crate::cfr::storage::{SequenceId, SequenceLayout, StrategyProfile, StrategySums};
use crate::cfr::tree::TreeValue;

/// The CFR solver.
///
/// Generic over the game and over the policy generator used for every
/// player. [`CfrSolver::from_config`] picks boxed generators from a
/// [`CfrConfig`]; [`CfrSolver::new`] accepts any factory.
///
/// # Example
/// ```
/// use perturbed_cfr::cfr::{CfrConfig, CfrSolver};
/// use perturbed_cfr::games::MatrixGame;
///
/// let game = MatrixGame::new(vec![vec![1.0, -1.0], vec![-1.0, 1.0]]).unwrap();
/// let mut solver = CfrSolver::from_config(game, CfrConfig::vanilla()).unwrap();
/// solver.do_iterations(10).unwrap();
///
/// let profile = solver.strategy_profile();
/// assert!((profile.probability(0, 0, 0).unwrap() - 0.5).abs() < 1e-9);
/// assert!(solver.average_exploitability().unwrap() < 1e-9);
/// ```
pub struct CfrSolver<G: Game, P: PolicyGenerator = Box<dyn PolicyGenerator>> {
    game: G,
    config: CfrConfig,
    layouts: Vec<SequenceLayout>,
    policies: Vec<P>,
    average: Vec<StrategySums>,
    traverser: usize,
    iteration: u64,
    stats: CfrStats,
}

impl<G: Game> CfrSolver<G> {
    /// Build a solver whose generators follow `config`.
    ///
    /// Every player's perturbed generator is seeded with `config.seed`; each
    /// owns its own random stream.
    pub fn from_config(game: G, config: CfrConfig) -> Result<Self> {
        config.validate()?;
        let rule = config.regret_rule;
        let noise = config.noise;
        let seed = config.seed;
        let mut solver = Self::new(game, |_, layout| {
            build_policy(rule, layout.clone(), noise, seed)
        });
        solver.config = config;
        Ok(solver)
    }
}

impl<G: Game, P: PolicyGenerator> CfrSolver<G, P> {
    /// Build a solver, asking `factory` for one policy generator per player.
    pub fn new<F>(game: G, mut factory: F) -> Self
    where
        F: FnMut(usize, &SequenceLayout) -> P,
    {
        let layouts = layouts_of(&game);
        let policies = layouts
            .iter()
            .enumerate()
            .map(|(player, layout)| factory(player, layout))
            .collect();
        let average = layouts.iter().cloned().map(StrategySums::new).collect();

        Self {
            game,
            config: CfrConfig::default(),
            layouts,
            policies,
            average,
            traverser: 0,
            iteration: 0,
            stats: CfrStats::new(),
        }
    }

    /// Run one iteration for the current traverser, then hand over to the
    /// next player.
    ///
    /// Returns the traverser's counterfactual value at the root. On error the
    /// traverser and iteration count do not change; regret updates and
    /// average-strategy contributions made before the failure are kept.
    pub fn do_iteration(&mut self) -> Result<f64> {
        let traverser = self.traverser;
        let value = {
            let Self {
                game,
                layouts,
                policies,
                average,
                ..
            } = self;

            let mut walk = CfrWalk {
                game: &*game,
                layouts: layouts.as_slice(),
                policies: policies.as_mut_slice(),
                average: average.as_mut_slice(),
                traverser,
                reach: ReachProfile::new(),
            };
            walk.value(&mut history_of(&*game))?
        };

        self.iteration += 1;
        self.traverser = (traverser + 1) % self.layouts.len();
        trace!(
            "iteration {} traverser {} value {:.6}",
            self.iteration,
            traverser,
            value
        );
        Ok(value)
    }

    /// Run `iterations` iterations.
    pub fn do_iterations(&mut self, iterations: u64) -> Result<()> {
        for _ in 0..iterations {
            self.do_iteration()?;
        }
        Ok(())
    }

    /// Train for a number of iterations and return updated statistics.
    pub fn train(&mut self, iterations: u64) -> Result<&CfrStats> {
        let start_time = Instant::now();
        self.do_iterations(iterations)?;
        self.refresh_stats(start_time);
        info!(
            "trained {} iterations over {} info sets in {:.2}s",
            iterations, self.stats.info_sets, self.stats.elapsed_seconds
        );
        Ok(&self.stats)
    }

    /// Train with a callback for progress tracking.
    ///
    /// The callback sees fresh statistics, including the current
    /// exploitability, every `callback_interval` iterations.
    pub fn train_with_callback<F>(
        &mut self,
        iterations: u64,
        callback_interval: u64,
        mut callback: F,
    ) -> Result<&CfrStats>
    where
        F: FnMut(&CfrStats),
    {
        let start_time = Instant::now();
        let interval = callback_interval.max(1);

        for i in 0..iterations {
            self.do_iteration()?;

            if (i + 1) % interval == 0 {
                let exploitability = self.average_exploitability()?;
                self.stats.record_exploitability(self.iteration, exploitability);
                self.refresh_stats(start_time);
                debug!(
                    "iteration {}: exploitability {:.6e}",
                    self.iteration, exploitability
                );
                callback(&self.stats);
            }
        }

        self.refresh_stats(start_time);
        Ok(&self.stats)
    }

    /// Iterate until average exploitability drops below `threshold`.
    ///
    /// Exploitability is measured after every iteration. `max_iterations`
    /// caps the total iteration count (`0` means no cap). The callback
    /// receives progress every `report_interval` iterations of the config.
    pub fn train_until<F>(
        &mut self,
        threshold: f64,
        max_iterations: u64,
        mut callback: F,
    ) -> Result<ConvergenceResult>
    where
        F: FnMut(&ConvergenceStats),
    {
        let start_time = Instant::now();
        let start_iteration = self.iteration;
        let report_interval = self.config.report_interval.max(1);

        loop {
            self.do_iteration()?;
            let exploitability = self.average_exploitability()?;
            let run = self.iteration - start_iteration;

            if run % report_interval == 0 {
                let elapsed = start_time.elapsed().as_secs_f64();
                let stats = ConvergenceStats {
                    iteration: self.iteration,
                    exploitability,
                    elapsed_seconds: elapsed,
                    iterations_per_second: if elapsed > 0.0 {
                        run as f64 / elapsed
                    } else {
                        0.0
                    },
                };
                debug!(
                    "iteration {}: exploitability {:.6e}",
                    stats.iteration, stats.exploitability
                );
                self.stats.record_exploitability(self.iteration, exploitability);
                callback(&stats);
            }

            let converged = exploitability < threshold;
            if converged || (max_iterations > 0 && self.iteration >= max_iterations) {
                self.stats.exploitability = Some(exploitability);
                self.refresh_stats(start_time);
                info!(
                    "{} after {} iterations: exploitability {:.6e}",
                    if converged { "converged" } else { "stopped" },
                    self.iteration,
                    exploitability
                );
                return Ok(ConvergenceResult {
                    converged,
                    exploitability,
                    iterations: self.iteration,
                    elapsed_seconds: start_time.elapsed().as_secs_f64(),
                });
            }
        }
    }

    fn refresh_stats(&mut self, start_time: Instant) {
        self.stats.iterations = self.iteration;
        self.stats.info_sets = self.num_info_sets();
        self.stats.elapsed_seconds = start_time.elapsed().as_secs_f64();
        self.stats.noise_sensitive_regrets = self.noise_sensitive_count();
        self.stats.update_rate();
    }

    /// Normalized average strategy of every player.
    pub fn strategy_profile(&self) -> StrategyProfile {
        StrategyProfile::from_sums(&self.average)
    }

    /// Best responses to the current average profile.
    pub fn best_response(&self) -> Result<BestResponse> {
        BestResponse::compute(&self.game, &self.strategy_profile())
    }

    /// Mean of both players' best-response values against the average
    /// profile. Zero exactly at a Nash equilibrium.
    pub fn average_exploitability(&self) -> Result<f64> {
        Ok(self.best_response()?.average_exploitability())
    }

    /// Expected payoff to player 0 under the average profile.
    pub fn profile_value(&self) -> Result<f64> {
        profile_value(&self.game, &self.strategy_profile())
    }

    /// Perturbed regrets below the noise magnitude, summed over players.
    pub fn noise_sensitive_count(&self) -> u64 {
        self.policies.iter().map(|p| p.noise_sensitive_count()).sum()
    }

    /// Reset every player's noise-sensitivity counter.
    pub fn clear_noise_sensitive_count(&mut self) {
        self.policies
            .iter_mut()
            .for_each(|p| p.clear_noise_sensitive_count());
    }

    /// Reset the solver to its freshly constructed state.
    pub fn reset(&mut self) {
        self.policies.iter_mut().for_each(|p| p.clear());
        self.average.iter_mut().for_each(StrategySums::clear);
        self.traverser = 0;
        self.iteration = 0;
        self.stats = CfrStats::new();
    }

    /// Completed iterations.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Player who traverses on the next iteration.
    pub fn traverser(&self) -> usize {
        self.traverser
    }

    /// Information sets across all players.
    pub fn num_info_sets(&self) -> usize {
        self.layouts.iter().map(SequenceLayout::num_info_sets).sum()
    }

    /// Sequence layout of each player.
    pub fn layouts(&self) -> &[SequenceLayout] {
        &self.layouts
    }

    /// Policy generator of each player.
    pub fn policies(&self) -> &[P] {
        &self.policies
    }

    /// Average-strategy sums of each player.
    pub fn strategy_sums(&self) -> &[StrategySums] {
        &self.average
    }

    /// Current statistics.
    pub fn stats(&self) -> &CfrStats {
        &self.stats
    }

    /// The game being solved.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// The configuration the solver was built from.
    pub fn config(&self) -> &CfrConfig {
        &self.config
    }
}

/// Progress reported by [`CfrSolver::train_until`].
#[derive(Debug, Clone)]
pub struct ConvergenceStats {
    /// Iterations completed.
    pub iteration: u64,
    /// Average exploitability after that iteration.
    pub exploitability: f64,
    /// Elapsed time in seconds.
    pub elapsed_seconds: f64,
    /// Current solve speed.
    pub iterations_per_second: f64,
}

/// Result of [`CfrSolver::train_until`].
#[derive(Debug, Clone)]
pub struct ConvergenceResult {
    /// Whether the threshold was reached.
    pub converged: bool,
    /// Final average exploitability.
    pub exploitability: f64,
    /// Total iterations completed by the solver.
    pub iterations: u64,
    /// Total elapsed time in seconds.
    pub elapsed_seconds: f64,
}

/// State of one CFR walk.
struct CfrWalk<'a, G: Game, P> {
    game: &'a G,
    layouts: &'a [SequenceLayout],
    policies: &'a mut [P],
    average: &'a mut [StrategySums],
    traverser: usize,
    reach: ReachProfile,
}

impl<G: Game, P> ReachHolder for CfrWalk<'_, G, P> {
    fn reach_mut(&mut self) -> &mut ReachProfile {
        &mut self.reach
    }
}

impl<G, P, H> TreeValue<H> for CfrWalk<'_, G, P>
where
    G: Game,
    P: PolicyGenerator,
    H: Sequence<Symbol = G::Symbol>,
{
    type Value = f64;
    type Error = SolverError;

    fn terminal_value(&mut self, history: &H) -> Result<f64> {
        let payoff = self.game.terminal_payoff(history.prefix())?;
        let sign = if self.traverser == 0 { 1.0 } else { -1.0 };
        Ok(sign * self.reach.others(self.traverser) * payoff)
    }

    fn interior_value(&mut self, history: &mut H) -> Result<f64> {
        let player = match self.game.actor(history.prefix()) {
            Actor::Chance => {
                let probs = checked_chance(self.game, history)?;
                let mut value = 0.0;
                history.each_successor(|h, _, rank| {
                    value += with_scaled_reach(self, Actor::Chance, probs[rank], |walk| {
                        walk.value(h)
                    })?;
                    Ok::<_, SolverError>(false)
                })?;
                return Ok(value);
            }
            Actor::Player(player) => player,
        };

        let info_set = checked_info_set(self.game, self.layouts, player, history)?;
        let policy = self.policies[player].policy(info_set);

        if player != self.traverser {
            let actor = Actor::Player(player);
            let mut value = 0.0;
            history.each_successor(|h, _, rank| {
                value += with_scaled_reach(self, actor, policy[rank], |walk| {
                    let reach = walk.reach.get(actor);
                    walk.average[player].accumulate(SequenceId::new(info_set, rank), reach);
                    walk.value(h)
                })?;
                Ok::<_, SolverError>(false)
            })?;
            return Ok(value);
        }

        let mut action_values = vec![0.0; policy.len()];
        history.each_successor(|h, _, rank| {
            action_values[rank] = self.value(h)?;
            Ok::<_, SolverError>(false)
        })?;

        let value = dot(&policy, &action_values);
        let generator = &mut self.policies[player];
        for (action, &action_value) in action_values.iter().enumerate() {
            generator.update(SequenceId::new(info_set, action), action_value - value);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::config::RegretRule;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::cfr::policy::RegretMatching;
    use crate::games::{KuhnPoker, MatrixGame, MatrixMove};

    fn pennies() -> MatrixGame {
        MatrixGame::new(vec![vec![1.0, -1.0], vec![-1.0, 1.0]]).unwrap()
    }

    fn asymmetric() -> MatrixGame {
        MatrixGame::new(vec![vec![2.0, -2.0], vec![-4.0, 3.0]]).unwrap()
    }

    #[test]
    fn test_matching_pennies_stays_uniform() {
        let mut solver = CfrSolver::from_config(pennies(), CfrConfig::vanilla()).unwrap();
        solver.do_iterations(10).unwrap();
        let profile = solver.strategy_profile();
        assert!((profile.probability(0, 0, 0).unwrap() - 0.5).abs() < 1e-9);
        assert!((profile.probability(1, 0, 0).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_traverser_alternates() {
        let mut solver = CfrSolver::new(asymmetric(), |_, layout| RegretMatching::new(layout.clone()));
        assert_eq!(solver.traverser(), 0);
        solver.do_iteration().unwrap();
        assert_eq!(solver.traverser(), 1);
        solver.do_iteration().unwrap();
        assert_eq!(solver.traverser(), 0);
        assert_eq!(solver.iteration(), 2);
    }

    #[test]
    fn test_first_iteration_regrets_and_sums() {
        // Player 1 is uniform, so row values are 0 and -0.5; cfv is -0.25.
        let mut solver = CfrSolver::new(asymmetric(), |_, layout| RegretMatching::new(layout.clone()));
        let value = solver.do_iteration().unwrap();
        assert!((value + 0.25).abs() < 1e-12);

        let table = solver.policies()[0].regret_table();
        assert!((table.get(SequenceId::new(0, 0)) - 0.25).abs() < 1e-12);
        assert!((table.get(SequenceId::new(0, 1)) + 0.25).abs() < 1e-12);

        // Player 1 was the opponent below both rows.
        assert_eq!(solver.strategy_sums()[1].sums(0), &[1.0, 1.0]);
        assert_eq!(solver.strategy_sums()[0].sums(0), &[0.0, 0.0]);
        assert_eq!(solver.policies()[1].regret_table().regrets(0), &[0.0, 0.0]);
    }

    #[test]
    fn test_asymmetric_game_converges() {
        let mut solver = CfrSolver::from_config(asymmetric(), CfrConfig::vanilla()).unwrap();
        solver.do_iterations(50_000).unwrap();

        let profile = solver.strategy_profile();
        assert!((profile.probability(0, 0, 0).unwrap() - 7.0 / 11.0).abs() < 1e-3);
        assert!((profile.probability(1, 0, 0).unwrap() - 5.0 / 11.0).abs() < 1e-3);
        assert!(solver.average_exploitability().unwrap() < 1e-3);
        assert!((solver.profile_value().unwrap() + 2.0 / 11.0).abs() < 1e-2);
    }

    #[test]
    fn test_regret_matching_plus_keeps_regrets_non_negative() {
        let mut solver = CfrSolver::from_config(asymmetric(), CfrConfig::plus()).unwrap();
        solver.do_iterations(2_000).unwrap();
        for policy in solver.policies() {
            assert!(policy.regret_table().regrets(0).iter().all(|&r| r >= 0.0));
        }
        assert!(solver.average_exploitability().unwrap() < 0.05);
    }

    #[test]
    fn test_perturbed_solver_counts_noise_sensitive_regrets() {
        let config = CfrConfig::perturbed_policy(1.0).with_seed(11);
        let mut solver = CfrSolver::from_config(asymmetric(), config).unwrap();
        solver.do_iterations(4).unwrap();
        assert!(solver.noise_sensitive_count() > 0);

        solver.clear_noise_sensitive_count();
        assert_eq!(solver.noise_sensitive_count(), 0);
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let run = || {
            let config = CfrConfig::perturbed_table(0.5).with_seed(42);
            let mut solver = CfrSolver::from_config(asymmetric(), config).unwrap();
            solver.do_iterations(500).unwrap();
            solver.strategy_profile()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_players_share_configured_seed() {
        let config = CfrConfig::perturbed_policy(0.5).with_seed(42);
        let mut configured = CfrSolver::from_config(asymmetric(), config).unwrap();
        let mut shared = CfrSolver::new(asymmetric(), |_, layout| {
            build_policy(RegretRule::PerturbedPolicy, layout.clone(), 0.5, 42)
        });
        configured.do_iterations(200).unwrap();
        shared.do_iterations(200).unwrap();
        assert_eq!(configured.strategy_profile(), shared.strategy_profile());
    }

    #[test]
    fn test_reset_replays_identically() {
        let config = CfrConfig::perturbed_policy(0.5);
        let mut solver = CfrSolver::from_config(asymmetric(), config).unwrap();
        solver.do_iterations(100).unwrap();
        let first = solver.strategy_profile();

        solver.reset();
        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.traverser(), 0);
        solver.do_iterations(100).unwrap();
        assert_eq!(solver.strategy_profile(), first);
    }

    #[test]
    fn test_train_until_reports_convergence() {
        let mut solver = CfrSolver::from_config(
            asymmetric(),
            CfrConfig::vanilla().with_report_interval(10),
        )
        .unwrap();
        let mut reports = 0;
        let result = solver.train_until(1e-2, 100_000, |_| reports += 1).unwrap();
        assert!(result.converged);
        assert!(result.exploitability < 1e-2);
        assert_eq!(result.iterations, solver.iteration());
        assert_eq!(reports as u64, result.iterations / 10);
    }

    #[test]
    fn test_train_until_respects_cap() {
        let mut solver = CfrSolver::from_config(asymmetric(), CfrConfig::vanilla()).unwrap();
        let result = solver.train_until(1e-12, 25, |_| {}).unwrap();
        assert!(!result.converged);
        assert_eq!(result.iterations, 25);
    }

    #[test]
    fn test_train_with_callback_records_history() {
        let mut solver = CfrSolver::from_config(asymmetric(), CfrConfig::vanilla()).unwrap();
        let mut seen = Vec::new();
        let stats = solver
            .train_with_callback(30, 10, |s| seen.push(s.iterations))
            .unwrap();
        assert_eq!(stats.iterations, 30);
        assert_eq!(stats.info_sets, 2);
        assert_eq!(stats.exploitability_history.len(), 3);
        assert_eq!(seen, vec![10, 20, 30]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = CfrSolver::from_config(asymmetric(), CfrConfig::perturbed_policy(-0.5))
            .err()
            .unwrap();
        assert!(matches!(err, SolverError::Config(_)));
    }

    /// A matrix game that declares three rows while only two are legal.
    struct Miscounted(MatrixGame);

    impl Game for Miscounted {
        type Symbol = MatrixMove;

        fn alphabet(&self) -> Vec<MatrixMove> {
            self.0.alphabet()
        }

        fn is_legal(&self, prefix: &[MatrixMove], candidate: &MatrixMove) -> bool {
            self.0.is_legal(prefix, candidate)
        }

        fn actor(&self, prefix: &[MatrixMove]) -> Actor {
            self.0.actor(prefix)
        }

        fn info_set(&self, player: usize, prefix: &[MatrixMove]) -> usize {
            self.0.info_set(player, prefix)
        }

        fn info_set_actions(&self, player: usize) -> Vec<usize> {
            if player == 0 {
                vec![3]
            } else {
                self.0.info_set_actions(player)
            }
        }

        fn terminal_payoff(&self, prefix: &[MatrixMove]) -> Result<f64> {
            self.0.terminal_payoff(prefix)
        }
    }

    #[test]
    fn test_action_count_mismatch_aborts_iteration() {
        let mut solver = CfrSolver::from_config(Miscounted(pennies()), CfrConfig::vanilla()).unwrap();
        let err = solver.do_iteration().unwrap_err();
        assert_eq!(
            err,
            SolverError::ActionCountMismatch {
                player: 0,
                info_set: 0,
                declared: 3,
                legal: 2,
            }
        );
        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.traverser(), 0);
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Event {
        Policy(usize, usize),
        Update(usize, SequenceId),
    }

    /// Regret matching that logs every call it receives.
    struct Recording {
        player: usize,
        inner: RegretMatching,
        log: Rc<RefCell<Vec<Event>>>,
    }

    impl PolicyGenerator for Recording {
        fn policy(&mut self, info_set: usize) -> Vec<f64> {
            self.log.borrow_mut().push(Event::Policy(self.player, info_set));
            self.inner.policy(info_set)
        }

        fn update(&mut self, seq: SequenceId, delta: f64) {
            self.log.borrow_mut().push(Event::Update(self.player, seq));
            self.inner.update(seq, delta);
        }

        fn regret_table(&self) -> &crate::cfr::storage::RegretTable {
            self.inner.regret_table()
        }

        fn clear(&mut self) {
            self.inner.clear();
        }
    }

    #[test]
    fn test_policy_read_and_updated_at_every_visit() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut solver = CfrSolver::new(KuhnPoker::new(), |player, layout| Recording {
            player,
            inner: RegretMatching::new(layout.clone()),
            log: Rc::clone(&log),
        });
        solver.do_iteration().unwrap();

        // Player 0 holding the Jack at the root is reached by the JQ and JK
        // deals; each visit reads the policy and then updates both actions.
        let jack = KuhnPoker::info_set_of(0, 0);
        let events: Vec<Event> = log
            .borrow()
            .iter()
            .copied()
            .filter(|e| match *e {
                Event::Policy(player, info_set) => player == 0 && info_set == jack,
                Event::Update(player, seq) => player == 0 && seq.info_set == jack,
            })
            .collect();
        let pass = SequenceId::new(jack, 0);
        let bet = SequenceId::new(jack, 1);
        assert_eq!(
            events,
            vec![
                Event::Policy(0, jack),
                Event::Update(0, pass),
                Event::Update(0, bet),
                Event::Policy(0, jack),
                Event::Update(0, pass),
                Event::Update(0, bet),
            ]
        );

        // The opponent is read but never updated.
        let log = log.borrow();
        assert!(log.iter().any(|e| matches!(e, Event::Policy(1, _))));
        assert!(!log.iter().any(|e| matches!(e, Event::Update(1, _))));
    }

    #[test]
    fn test_regret_matching_plus_clamps_each_visit() {
        // The JQ visit leaves Jack regrets (0, 1/16), so the JK visit plays Bet
        // outright and adds nothing to it. Summing both visits first would
        // give 1/8.
        let mut solver = CfrSolver::from_config(KuhnPoker::new(), CfrConfig::plus()).unwrap();
        solver.do_iteration().unwrap();
        let jack = KuhnPoker::info_set_of(0, 0);
        let regrets = solver.policies()[0].regret_table().regrets(jack);
        assert_eq!(regrets[0], 0.0);
        assert!((regrets[1] - 1.0 / 16.0).abs() < 1e-12, "bet regret {}", regrets[1]);
    }

    #[test]
    fn test_config_rule_is_kept() {
        let solver =
            CfrSolver::from_config(pennies(), CfrConfig::perturbed_table(0.1)).unwrap();
        assert_eq!(solver.config().regret_rule, RegretRule::PerturbedTable);
        assert_eq!(solver.num_info_sets(), 2);
    }
}
