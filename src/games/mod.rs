//! Game implementations for the CFR solver.
//!
//! These serve as:
//!
//! 1. **Validation**: Games with known Nash equilibria (matrix games, Kuhn
//!    Poker) verify that the CFR implementation is correct.
//!
//! 2. **Examples**: Demonstrate how to describe a game as symbol sequences
//!    through the `Game` trait.
//!
//! 3. **Benchmarks**: Provide standardized games for performance testing.
//!
//! ## Available Games
//!
//! - [`matrix`]: Two-player zero-sum matrix games played as a row move
//!   followed by a hidden column move
//! - [`kuhn`]: Kuhn Poker - A simplified 3-card poker game with known Nash equilibrium
//!
//! ## Adding New Games
//!
//! To add a new game:
//!
//! 1. Create a new module under `src/games/`
//! 2. Define the symbol type and its `Display`
//! 3. Implement the `Game` trait
//! 4. Add tests that verify expected behavior
//!
//! See the [`kuhn`] module for a game with chance and several information sets.

pub mod kuhn;
pub mod matrix;

pub use kuhn::{KuhnPoker, KuhnSymbol};
pub use matrix::{MatrixGame, MatrixMove};
