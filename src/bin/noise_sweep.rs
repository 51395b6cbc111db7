//! Noise sensitivity sweep.
//!
//! Trains a perturbed CFR solver at each noise level and prints how many
//! iterations it took for the average profile's exploitability to drop below
//! the threshold.
//!
//! Usage:
//!   cargo run --release --bin noise_sweep -- [OPTIONS]
//!
//! Examples:
//!   # Default sweep on the 2x2 game {{2, -2}, {-4, 3}}
//!   noise_sweep
//!
//!   # A few noise levels on Kuhn Poker, JSON output
//!   noise_sweep --game kuhn --noise 0 --noise 0.5 --threshold 1e-3 --json

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use perturbed_cfr::cfr::{
    noise_schedule, run_noise_level, CfrConfig, ConvergenceStats, Game, RegretRule, SweepRow,
};
use perturbed_cfr::games::{KuhnPoker, MatrixGame};

#[derive(Parser)]
#[command(name = "noise_sweep")]
#[command(about = "Iterations to reach an exploitability threshold as a function of regret noise")]
struct Cli {
    /// Game to solve
    #[arg(long, value_enum, default_value = "matrix")]
    game: GameArg,
    /// Noise levels to sweep (defaults to 0, 0.1, 0.5, 1, 5, 10, 50, 100, 500)
    #[arg(long)]
    noise: Vec<f64>,
    /// Where the noise is injected [default: policy]
    #[arg(long, value_enum)]
    rule: Option<RuleArg>,
    /// Seed for the noisy runs; the noiseless run always uses 0 [default: 3839203241]
    #[arg(short, long)]
    seed: Option<u64>,
    /// Exploitability threshold [default: 1e-4]
    #[arg(short, long)]
    threshold: Option<f64>,
    /// Iteration cap per noise level, 0 = unlimited [default: 10000000]
    #[arg(long)]
    max_iterations: Option<u64>,
    /// Progress report interval in iterations
    #[arg(long)]
    report_interval: Option<u64>,
    /// Solver configuration JSON file; it replaces the defaults above and
    /// command line options override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print rows as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GameArg {
    /// The 2x2 matrix game {{2, -2}, {-4, 3}}
    Matrix,
    /// Kuhn Poker
    Kuhn,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RuleArg {
    /// Noise added to regrets when the policy is read
    Policy,
    /// Noise added to every regret update
    Table,
}

impl From<RuleArg> for RegretRule {
    fn from(rule: RuleArg) -> Self {
        match rule {
            RuleArg::Policy => RegretRule::PerturbedPolicy,
            RuleArg::Table => RegretRule::PerturbedTable,
        }
    }
}

/// Seed of the noisy runs when neither a config file nor `--seed` sets one.
const SWEEP_SEED: u64 = 3_839_203_241;

/// Iteration cap when neither a config file nor `--max-iterations` sets one.
const SWEEP_MAX_ITERATIONS: u64 = 10_000_000;

/// Configuration used when no file is given.
fn sweep_defaults() -> CfrConfig {
    CfrConfig::perturbed_policy(0.0)
        .with_seed(SWEEP_SEED)
        .with_max_iterations(SWEEP_MAX_ITERATIONS)
}

impl Cli {
    /// Apply the options given on the command line on top of `base`.
    fn merged_config(&self, mut config: CfrConfig) -> CfrConfig {
        if let Some(rule) = self.rule {
            config = config.with_regret_rule(rule.into());
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(threshold) = self.threshold {
            config = config.with_threshold(threshold);
        }
        if let Some(max_iterations) = self.max_iterations {
            config = config.with_max_iterations(max_iterations);
        }
        if let Some(interval) = self.report_interval {
            config = config.with_report_interval(interval);
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            serde_json::from_str::<CfrConfig>(&fs::read_to_string(path)?)?
        }
        None => sweep_defaults(),
    };
    let config = cli.merged_config(base);
    config.validate()?;

    let levels = if cli.noise.is_empty() {
        noise_schedule()
    } else {
        cli.noise.clone()
    };

    let rows = match cli.game {
        GameArg::Matrix => {
            let game = MatrixGame::new(vec![vec![2.0, -2.0], vec![-4.0, 3.0]])?;
            sweep(&game, &config, &levels)?
        }
        GameArg::Kuhn => sweep(&KuhnPoker::new(), &config, &levels)?,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{:>10} {:>12} {:>14} {:>10}", "noise", "iterations", "exploitability", "converged");
        for row in &rows {
            println!(
                "{:>10} {:>12} {:>14.6e} {:>10}",
                row.noise, row.iterations, row.exploitability, row.converged
            );
        }
    }
    Ok(())
}

fn sweep<G: Game + Clone>(
    game: &G,
    config: &CfrConfig,
    levels: &[f64],
) -> Result<Vec<SweepRow>, Box<dyn Error>> {
    let spinner_style = ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?;
    let mut rows = Vec::with_capacity(levels.len());

    for &noise in levels {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style.clone());
        bar.set_message(format!("noise {}", noise));
        bar.enable_steady_tick(Duration::from_millis(200));

        let row = run_noise_level(game.clone(), config, noise, |stats: &ConvergenceStats| {
            bar.set_message(format!(
                "noise {} | iteration {} | exploitability {:.3e} | {:.0} it/s",
                noise, stats.iteration, stats.exploitability, stats.iterations_per_second
            ));
        })?;

        bar.finish_and_clear();
        info!(
            "noise {}: {} iterations, exploitability {:.6e}, {} noise-sensitive regrets",
            row.noise, row.iterations, row.exploitability, row.noise_sensitive_regrets
        );
        rows.push(row);
    }
    Ok(rows)
}
