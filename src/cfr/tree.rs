//! Recursive value computation over a [`Sequence`].
//!
//! No tree is ever materialized. A node is the current prefix of the shared
//! history; its children are reached by pushing a legal suffix, evaluating,
//! and popping. Side effects an evaluator performs while visiting a child
//! therefore happen exactly once per visit, in enumeration order.
//!
//! Recursion depth equals history length. The evaluator adds no depth bound,
//! so a legality rule that never runs out of legal symbols will not return.

use std::marker::PhantomData;

use crate::cfr::history::{HistoryError, Sequence};

/// Position of a successor relative to its parent prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Successor {
    /// Position of the pushed symbol in the alphabet.
    pub alphabet_index: usize,
    /// Rank of the pushed symbol among the legal symbols at the parent.
    pub rank: usize,
}

/// A value computed by terminal/interior recursion over a history.
///
/// `value` dispatches on terminality: a prefix with no legal successor is
/// evaluated by `terminal_value`, anything else by `interior_value`, which
/// is expected to recurse through [`Sequence::each_successor`].
pub trait TreeValue<H: Sequence> {
    /// Value type produced at every node.
    type Value;
    /// Error type; history errors must convert into it.
    type Error: From<HistoryError>;

    /// Value of a terminal prefix.
    fn terminal_value(&mut self, history: &H) -> Result<Self::Value, Self::Error>;

    /// Value of an interior prefix.
    fn interior_value(&mut self, history: &mut H) -> Result<Self::Value, Self::Error>;

    /// Value of the current prefix.
    fn value(&mut self, history: &mut H) -> Result<Self::Value, Self::Error> {
        if history.has_successors() {
            self.interior_value(history)
        } else {
            self.terminal_value(history)
        }
    }
}

/// A [`TreeValue`] assembled from two closures.
///
/// `terminal` scores terminal prefixes. At interior prefixes the children
/// are folded into an accumulator starting at `V::default()`:
/// `fold(acc, history, successor, child_value)`, where `history` still has
/// the child's symbol pushed.
///
/// # Example
/// ```
/// use perturbed_cfr::cfr::history::{History, HistoryError, Sequence};
/// use perturbed_cfr::cfr::tree::{FoldValue, TreeValue};
///
/// // Two levels of binary choices, each leaf worth 1.
/// let mut h = History::from_fn(vec!['x', 'y'], |prefix, _| prefix.len() < 2);
/// let mut leaves = FoldValue::new(
///     |_: &History<char, _>| Ok::<u32, HistoryError>(1),
///     |acc, _, _, child| acc + child,
/// );
/// assert_eq!(leaves.value(&mut h).unwrap(), 4);
/// assert!(h.is_empty());
/// ```
pub struct FoldValue<T, F, V, E> {
    terminal: T,
    fold: F,
    _marker: PhantomData<fn() -> (V, E)>,
}

impl<T, F, V, E> FoldValue<T, F, V, E> {
    /// Create an evaluator from a terminal scorer and a child fold.
    pub fn new<H>(terminal: T, fold: F) -> Self
    where
        H: Sequence,
        T: FnMut(&H) -> Result<V, E>,
        F: FnMut(V, &H, Successor, V) -> V,
    {
        Self {
            terminal,
            fold,
            _marker: PhantomData,
        }
    }
}

impl<H, T, F, V, E> TreeValue<H> for FoldValue<T, F, V, E>
where
    H: Sequence,
    T: FnMut(&H) -> Result<V, E>,
    F: FnMut(V, &H, Successor, V) -> V,
    V: Default,
    E: From<HistoryError>,
{
    type Value = V;
    type Error = E;

    fn terminal_value(&mut self, history: &H) -> Result<V, E> {
        (self.terminal)(history)
    }

    fn interior_value(&mut self, history: &mut H) -> Result<V, E> {
        let mut acc = Some(V::default());
        history.each_successor(|h, alphabet_index, rank| {
            let child = self.value(h)?;
            let successor = Successor {
                alphabet_index,
                rank,
            };
            acc = acc.take().map(|a| (self.fold)(a, h, successor, child));
            Ok::<_, E>(false)
        })?;
        Ok(acc.unwrap_or_default())
    }
}
