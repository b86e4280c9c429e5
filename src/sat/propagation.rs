#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Boolean constraint propagation over two watched literals.
//!
//! Each clause of length two or more keeps its watched literals at positions
//! 0 and 1. When a literal becomes true, only the clauses watching its
//! negation are rechecked: a satisfied clause is skipped, a clause with a
//! spare non-false literal moves its watch there, and a clause reduced to a
//! single unassigned watch forces that literal. A clause whose watches are
//! both false under the current assignment is the conflict.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, PackedLiteral};
use crate::sat::trail::{Reason, Trail};
use crate::sat::watch::WatchList;
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Propagator<L: Literal = PackedLiteral> {
    watches: WatchList<L>,
    propagations: u64,
}

impl<L: Literal> Propagator<L> {
    #[must_use]
    pub fn new(cnf: &Cnf<L>) -> Self {
        let mut propagator = Self {
            watches: WatchList::new(cnf.num_vars),
            propagations: 0,
        };
        for (i, clause) in cnf.iter().enumerate() {
            propagator.attach_clause(clause, i);
        }
        propagator
    }

    /// Registers a clause's watches: positions 0 and 1, or the sole literal
    /// of a unit clause watching itself.
    pub fn attach_clause(&mut self, clause: &Clause<L>, clause_idx: usize) {
        match clause.len() {
            0 => {}
            1 => self.watches.attach(clause[0], clause_idx),
            _ => {
                self.watches.attach(clause[0], clause_idx);
                self.watches.attach(clause[1], clause_idx);
            }
        }
    }

    #[must_use]
    pub const fn propagations(&self) -> u64 {
        self.propagations
    }

    /// Drives every forced consequence of the literals newly made true since
    /// the last fixpoint. Returns the index of a falsified clause, or `None`
    /// at fixpoint.
    pub fn propagate(
        &mut self,
        cnf: &mut Cnf<L>,
        trail: &mut Trail<L>,
        assignment: &mut Assignment,
    ) -> Option<usize> {
        while let Some(lit) = trail.next() {
            let falsified = lit.negated();
            let watchers: SmallVec<[usize; 6]> = self.watches[falsified].clone();

            for clause_idx in watchers {
                if let Some(conflict) =
                    self.recheck(cnf, trail, assignment, clause_idx, falsified)
                {
                    return Some(conflict);
                }
            }
        }

        None
    }

    fn recheck(
        &mut self,
        cnf: &mut Cnf<L>,
        trail: &mut Trail<L>,
        assignment: &mut Assignment,
        clause_idx: usize,
        falsified: L,
    ) -> Option<usize> {
        let clause = &mut cnf[clause_idx];

        // A self-watching unit clause has just lost its only literal.
        if clause.is_unit() {
            return Some(clause_idx);
        }

        // Keep the falsified watch at position 1.
        if clause[0] == falsified {
            clause.swap(0, 1);
        }
        debug_assert_eq!(clause[1], falsified);

        let other = clause[0];
        if assignment.literal_value(other) == Some(true) {
            return None;
        }

        if let Some(k) =
            (2..clause.len()).find(|&k| assignment.literal_value(clause[k]) != Some(false))
        {
            clause.swap(1, k);
            let new_watch = clause[1];
            self.watches.replace(clause_idx, falsified, new_watch);
            return None;
        }

        match assignment.literal_value(other) {
            None => {
                let level = trail.decision_level();
                trail.push(other, level, Reason::Clause(clause_idx), assignment);
                self.propagations += 1;
                None
            }
            Some(false) => Some(clause_idx),
            Some(true) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::PackedLiteral;

    type TestCnf = Cnf<PackedLiteral>;

    fn lit(value: i32) -> PackedLiteral {
        PackedLiteral::from_dimacs(value)
    }

    fn setup(cnf: &TestCnf) -> (Propagator<PackedLiteral>, Trail<PackedLiteral>, Assignment) {
        (
            Propagator::new(cnf),
            Trail::new(cnf.num_vars),
            Assignment::new(cnf.num_vars),
        )
    }

    #[test]
    fn test_unit_chain_propagates_to_fixpoint() {
        // 1 forces 2, 2 forces 3.
        let mut cnf = TestCnf::new(vec![vec![-1, 2], vec![-2, 3]], 3).unwrap();
        let (mut propagator, mut trail, mut assignment) = setup(&cnf);

        trail.push(lit(1), 1, Reason::Decision, &mut assignment);
        let conflict = propagator.propagate(&mut cnf, &mut trail, &mut assignment);

        assert_eq!(conflict, None);
        assert_eq!(assignment.var_value(2), Some(true));
        assert_eq!(assignment.var_value(3), Some(true));
        assert_eq!(trail.reason_of(2), Reason::Clause(0));
        assert_eq!(trail.level_of(3), 1);
        assert_eq!(propagator.propagations(), 2);
    }

    #[test]
    fn test_conflict_reported_with_clause_index() {
        let mut cnf = TestCnf::new(vec![vec![-1, 2], vec![-1, -2]], 2).unwrap();
        let (mut propagator, mut trail, mut assignment) = setup(&cnf);

        trail.push(lit(1), 1, Reason::Decision, &mut assignment);
        let conflict = propagator.propagate(&mut cnf, &mut trail, &mut assignment);

        assert!(conflict.is_some());
    }

    #[test]
    fn test_watch_moves_to_spare_literal() {
        let mut cnf = TestCnf::new(vec![vec![1, 2, 3]], 3).unwrap();
        let (mut propagator, mut trail, mut assignment) = setup(&cnf);

        trail.push(lit(-1), 1, Reason::Decision, &mut assignment);
        assert_eq!(
            propagator.propagate(&mut cnf, &mut trail, &mut assignment),
            None
        );

        // Nothing forced yet: the clause still has two non-false literals.
        assert!(!assignment.is_assigned(2));
        assert!(!assignment.is_assigned(3));

        trail.push(lit(-3), 1, Reason::Decision, &mut assignment);
        assert_eq!(
            propagator.propagate(&mut cnf, &mut trail, &mut assignment),
            None
        );

        assert_eq!(assignment.var_value(2), Some(true));
    }

    #[test]
    fn test_satisfied_clause_is_skipped() {
        let mut cnf = TestCnf::new(vec![vec![1, 2]], 2).unwrap();
        let (mut propagator, mut trail, mut assignment) = setup(&cnf);

        trail.push(lit(1), 1, Reason::Decision, &mut assignment);
        trail.push(lit(-2), 1, Reason::Decision, &mut assignment);

        assert_eq!(
            propagator.propagate(&mut cnf, &mut trail, &mut assignment),
            None
        );
    }

    #[test]
    fn test_self_watched_unit_clause_conflicts() {
        let mut cnf = TestCnf::new(vec![vec![1]], 1).unwrap();
        let (mut propagator, mut trail, mut assignment) = setup(&cnf);

        trail.push(lit(-1), 1, Reason::Decision, &mut assignment);
        assert_eq!(
            propagator.propagate(&mut cnf, &mut trail, &mut assignment),
            Some(0)
        );
    }
}
