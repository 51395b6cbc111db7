//! Backtrackable action histories.
//!
//! A history is a stack of symbols drawn from a fixed, ordered alphabet.
//! Whether a symbol may be appended is decided by a legality rule that only
//! looks at the current prefix, so legality can be re-evaluated freely after
//! any push/pop. Traversals never copy a history: they push a candidate,
//! recurse, and pop it again.
//!
//! A prefix with no legal candidate is terminal. There is no other
//! terminality signal.

use std::fmt;

use thiserror::Error;

/// Errors raised by history mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// The candidate symbol is not legal after the current prefix.
    #[error("illegal suffix \"{suffix}\" for prefix \"{prefix}\"")]
    IllegalSuffix {
        /// The rejected symbol.
        suffix: String,
        /// The prefix at the time of the push.
        prefix: String,
    },
}

/// A rule deciding which symbols may follow a prefix.
///
/// Implementations must be pure functions of `prefix` and `candidate`.
pub trait Legality<S> {
    /// Whether `candidate` may be appended to `prefix`.
    fn is_legal(&self, prefix: &[S], candidate: &S) -> bool;
}

impl<S, F> Legality<S> for F
where
    F: Fn(&[S], &S) -> bool,
{
    fn is_legal(&self, prefix: &[S], candidate: &S) -> bool {
        self(prefix, candidate)
    }
}

/// Capability trait for a backtrackable sequence of symbols.
///
/// Implementors provide the alphabet, the prefix, the legality predicate and
/// raw push/pop. Enumeration of suffixes and successors is provided.
///
/// Two indices show up during enumeration:
/// - the *alphabet index* is a symbol's position in [`Sequence::alphabet`];
/// - the *legal rank* counts legal symbols from zero, left to right, at the
///   current prefix. It is the action index used by regret tables and
///   strategy vectors.
pub trait Sequence {
    /// Symbol type of the alphabet.
    type Symbol: Clone + fmt::Display;

    /// All candidate symbols, in enumeration order.
    fn alphabet(&self) -> &[Self::Symbol];

    /// Symbols pushed so far, oldest first.
    fn prefix(&self) -> &[Self::Symbol];

    /// Whether `candidate` may follow the current prefix.
    fn suffix_is_legal(&self, candidate: &Self::Symbol) -> bool;

    /// Append `symbol`, failing if it is not legal after the current prefix.
    fn push(&mut self, symbol: Self::Symbol) -> Result<(), HistoryError>;

    /// Remove and return the most recently pushed symbol.
    fn pop(&mut self) -> Option<Self::Symbol>;

    /// True iff nothing has been pushed.
    fn is_empty(&self) -> bool {
        self.prefix().is_empty()
    }

    /// Number of pushed symbols.
    fn len(&self) -> usize {
        self.prefix().len()
    }

    /// The most recently pushed symbol.
    fn last(&self) -> Option<&Self::Symbol> {
        self.prefix().last()
    }

    /// Visit every alphabet member, legal or not, with its alphabet index.
    ///
    /// Stops and returns `true` as soon as `visit` returns `true`.
    fn each_suffix<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(&Self::Symbol, usize) -> bool,
    {
        self.alphabet()
            .iter()
            .enumerate()
            .any(|(index, symbol)| visit(symbol, index))
    }

    /// Visit the legal suffixes with their alphabet index and legal rank.
    ///
    /// Stops and returns `true` as soon as `visit` returns `true`.
    fn each_legal_suffix<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(&Self::Symbol, usize, usize) -> bool,
    {
        let mut rank = 0;
        self.each_suffix(|symbol, index| {
            if !self.suffix_is_legal(symbol) {
                return false;
            }
            let stop = visit(symbol, index, rank);
            rank += 1;
            stop
        })
    }

    /// True iff at least one symbol is legal after the current prefix.
    fn has_successors(&self) -> bool {
        self.each_legal_suffix(|_, _, _| true)
    }

    /// Number of legal symbols after the current prefix.
    fn num_successors(&self) -> usize {
        let mut count = 0;
        self.each_legal_suffix(|_, _, _| {
            count += 1;
            false
        });
        count
    }

    /// Push each legal suffix in turn, call `visit(history, alphabet_index,
    /// legal_rank)`, then pop.
    ///
    /// The pop happens on every path, including when `visit` asks to stop
    /// (`Ok(true)`) or fails, so the history always ends in the state it
    /// started in. Returns `Ok(true)` if `visit` asked to stop.
    fn each_successor<E, F>(&mut self, mut visit: F) -> Result<bool, E>
    where
        E: From<HistoryError>,
        F: FnMut(&mut Self, usize, usize) -> Result<bool, E>,
    {
        let mut rank = 0;
        for index in 0..self.alphabet().len() {
            let symbol = self.alphabet()[index].clone();
            if !self.suffix_is_legal(&symbol) {
                continue;
            }

            self.push(symbol)?;
            let outcome = visit(self, index, rank);
            self.pop();
            rank += 1;

            if outcome? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// A history over an owned alphabet with an injected legality rule.
///
/// # Example
/// ```
/// use perturbed_cfr::cfr::history::{History, Sequence};
///
/// let mut h = History::from_fn(vec!["a", "b"], |prefix, _| prefix.len() < 2);
/// h.push("a").unwrap();
/// h.push("b").unwrap();
/// assert_eq!(h.to_string(), "a -> b");
/// assert!(!h.has_successors());
/// assert!(h.push("a").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct History<S, L> {
    prefix: Vec<S>,
    alphabet: Vec<S>,
    legality: L,
}

impl<S, L: Legality<S>> History<S, L> {
    /// Create an empty history over `alphabet`.
    pub fn new(alphabet: Vec<S>, legality: L) -> Self {
        Self {
            prefix: Vec::new(),
            alphabet,
            legality,
        }
    }
}

impl<S, F> History<S, F>
where
    F: Fn(&[S], &S) -> bool,
{
    /// Create an empty history whose legality rule is a closure.
    pub fn from_fn(alphabet: Vec<S>, legality: F) -> Self {
        Self::new(alphabet, legality)
    }
}

impl<S, L> Sequence for History<S, L>
where
    S: Clone + fmt::Display,
    L: Legality<S>,
{
    type Symbol = S;

    fn alphabet(&self) -> &[S] {
        &self.alphabet
    }

    fn prefix(&self) -> &[S] {
        &self.prefix
    }

    fn suffix_is_legal(&self, candidate: &S) -> bool {
        self.legality.is_legal(&self.prefix, candidate)
    }

    fn push(&mut self, symbol: S) -> Result<(), HistoryError> {
        if !self.suffix_is_legal(&symbol) {
            return Err(HistoryError::IllegalSuffix {
                suffix: symbol.to_string(),
                prefix: self.to_string(),
            });
        }
        self.prefix.push(symbol);
        Ok(())
    }

    fn pop(&mut self) -> Option<S> {
        self.prefix.pop()
    }
}

impl<S: fmt::Display, L> fmt::Display for History<S, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, symbol) in self.prefix.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}
