//! Two-player zero-sum matrix games as sequential games.
//!
//! Player 0 picks a row, then player 1 picks a column without seeing the
//! row. Player 1 therefore has a single information set covering every row.
//! The payoff matrix is from player 0's point of view.
//!
//! ```text
//! root (P0)
//! ├── r0 (P1, info set 0)
//! │   ├── c0 → A[0][0]
//! │   └── c1 → A[0][1]
//! └── r1 (P1, info set 0)
//!     ├── c0 → A[1][0]
//!     └── c1 → A[1][1]
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cfr::error::{Result, SolverError};
use crate::cfr::game::{render, Actor, Game};

/// A row or column choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatrixMove {
    /// Player 0 picks a row.
    Row(usize),
    /// Player 1 picks a column.
    Column(usize),
}

impl fmt::Display for MatrixMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixMove::Row(i) => write!(f, "r{}", i),
            MatrixMove::Column(j) => write!(f, "c{}", j),
        }
    }
}

/// A matrix game with an `m × n` payoff table.
///
/// # Example
/// ```
/// use perturbed_cfr::cfr::Game;
/// use perturbed_cfr::games::{MatrixGame, MatrixMove};
///
/// let game = MatrixGame::new(vec![vec![2.0, -2.0], vec![-4.0, 3.0]]).unwrap();
/// let payoff = game.terminal_payoff(&[MatrixMove::Row(1), MatrixMove::Column(0)]);
/// assert_eq!(payoff, Ok(-4.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixGame {
    payoffs: Vec<Vec<f64>>,
}

impl MatrixGame {
    /// Build a game from a non-empty rectangular payoff matrix.
    pub fn new(payoffs: Vec<Vec<f64>>) -> Result<Self> {
        let columns = payoffs.first().map_or(0, Vec::len);
        if columns == 0 {
            return Err(SolverError::InvalidGame(
                "payoff matrix must have at least one row and one column".to_string(),
            ));
        }
        if let Some(row) = payoffs.iter().position(|r| r.len() != columns) {
            return Err(SolverError::InvalidGame(format!(
                "row {} has {} columns, expected {}",
                row,
                payoffs[row].len(),
                columns
            )));
        }
        Ok(Self { payoffs })
    }

    /// The two-action game `{{1, -1}, {-1, 1}}`.
    pub fn matching_pennies() -> Self {
        Self {
            payoffs: vec![vec![1.0, -1.0], vec![-1.0, 1.0]],
        }
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.payoffs.len()
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.payoffs.first().map_or(0, Vec::len)
    }

    /// The payoff matrix.
    pub fn payoffs(&self) -> &[Vec<f64>] {
        &self.payoffs
    }
}

impl Game for MatrixGame {
    type Symbol = MatrixMove;

    fn alphabet(&self) -> Vec<MatrixMove> {
        (0..self.num_rows())
            .map(MatrixMove::Row)
            .chain((0..self.num_columns()).map(MatrixMove::Column))
            .collect()
    }

    fn is_legal(&self, prefix: &[MatrixMove], candidate: &MatrixMove) -> bool {
        matches!(
            (prefix, candidate),
            ([], MatrixMove::Row(_)) | ([MatrixMove::Row(_)], MatrixMove::Column(_))
        )
    }

    fn actor(&self, prefix: &[MatrixMove]) -> Actor {
        if prefix.is_empty() {
            Actor::Player(0)
        } else {
            Actor::Player(1)
        }
    }

    fn info_set(&self, _player: usize, _prefix: &[MatrixMove]) -> usize {
        0
    }

    fn info_set_actions(&self, player: usize) -> Vec<usize> {
        match player {
            0 => vec![self.num_rows()],
            1 => vec![self.num_columns()],
            _ => Vec::new(),
        }
    }

    fn terminal_payoff(&self, prefix: &[MatrixMove]) -> Result<f64> {
        let payoff = match prefix {
            [MatrixMove::Row(i), MatrixMove::Column(j)] => {
                self.payoffs.get(*i).and_then(|row| row.get(*j)).copied()
            }
            _ => None,
        };
        payoff.ok_or_else(|| SolverError::MissingPayoff {
            sequence: render(prefix),
        })
    }
}
