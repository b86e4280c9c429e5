#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
use crate::sat::literal::{Literal, PackedLiteral};
use smallvec::SmallVec;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Literal-indexed watcher sets.
///
/// The list stored under a literal holds the indices of the clauses currently
/// watching that literal; those clauses must be rechecked whenever the
/// literal's negation becomes true.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatchList<L: Literal = PackedLiteral> {
    lists: Vec<SmallVec<[usize; 6]>>,
    _marker: PhantomData<L>,
}

impl<L: Literal> WatchList<L> {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            lists: vec![SmallVec::new(); 2 * (num_vars + 1)],
            _marker: PhantomData,
        }
    }

    /// Registers `clause_idx` as watching `lit`.
    pub fn attach(&mut self, lit: L, clause_idx: usize) {
        self.lists[lit.index()].push(clause_idx);
    }

    /// Moves the watch of `clause_idx` from `old` to `new`. Only the
    /// propagator calls this.
    pub fn replace(&mut self, clause_idx: usize, old: L, new: L) {
        self.lists[old.index()].retain(|&mut i| i != clause_idx);
        self.lists[new.index()].push(clause_idx);
    }
}

impl<L: Literal> Index<L> for WatchList<L> {
    type Output = SmallVec<[usize; 6]>;

    fn index(&self, index: L) -> &Self::Output {
        &self.lists[index.index()]
    }
}

impl<L: Literal> IndexMut<L> for WatchList<L> {
    fn index_mut(&mut self, index: L) -> &mut Self::Output {
        &mut self.lists[index.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(value: i32) -> PackedLiteral {
        PackedLiteral::from_dimacs(value)
    }

    #[test]
    fn test_attach_is_per_polarity() {
        let mut watches: WatchList<PackedLiteral> = WatchList::new(3);
        watches.attach(lit(1), 0);
        watches.attach(lit(-1), 1);

        assert_eq!(watches[lit(1)].as_slice(), &[0]);
        assert_eq!(watches[lit(-1)].as_slice(), &[1]);
    }

    #[test]
    fn test_replace_moves_watcher() {
        let mut watches: WatchList<PackedLiteral> = WatchList::new(3);
        watches.attach(lit(1), 0);
        watches.attach(lit(1), 2);

        watches.replace(0, lit(1), lit(-3));

        assert_eq!(watches[lit(1)].as_slice(), &[2]);
        assert_eq!(watches[lit(-3)].as_slice(), &[0]);
    }
}
