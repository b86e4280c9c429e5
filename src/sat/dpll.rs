#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A DPLL solver over the same trail and propagator as the CDCL driver.
//!
//! Backtracking is chronological: a conflict flips the most recent decision
//! whose other polarity has not been tried, one level at a time, with no
//! clause learning. Kept as a baseline to compare against the CDCL driver;
//! both sit behind the same `Solver` trait and share the resource budget.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::cnf::{Cnf, DecisionLevel};
use crate::sat::literal::{Literal, PackedLiteral};
use crate::sat::propagation::Propagator;
use crate::sat::solver::{Limits, Outcome, Solver, SolverStats};
use crate::sat::trail::{Reason, Trail};
use crate::sat::variable_selection::{VariableSelection, Vsids};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct Dpll<L: Literal = PackedLiteral, V: VariableSelection = Vsids> {
    pub cnf: Cnf<L>,

    pub assignment: Assignment,

    pub trail: Trail<L>,

    pub propagator: Propagator<L>,

    pub selector: V,

    pub decision_level: DecisionLevel,

    /// Decisions in order, with a flag marking those whose second polarity
    /// has already been taken.
    decisions: Vec<(L, bool)>,

    limits: Limits,

    stats: SolverStats,
}

impl<L: Literal, V: VariableSelection> Dpll<L, V> {
    fn seed_units(&mut self) -> Result<(), ()> {
        for i in 0..self.cnf.len() {
            let clause = &self.cnf[i];
            if !clause.is_unit() {
                continue;
            }
            let lit = clause[0];
            match self.assignment.literal_value(lit) {
                Some(true) => {}
                Some(false) => return Err(()),
                None => self
                    .trail
                    .push(lit, 0, Reason::Clause(i), &mut self.assignment),
            }
        }
        Ok(())
    }

    /// Undoes decisions until one can be flipped; `Err(())` when the search
    /// tree is exhausted.
    fn backtrack(&mut self) -> Result<(), ()> {
        loop {
            let Some((lit, flipped)) = self.decisions.pop() else {
                return Err(());
            };

            self.trail
                .backjump_to(self.decisions.len(), &mut self.assignment);
            self.decision_level = self.decisions.len();

            if !flipped {
                self.decision_level += 1;
                self.stats.decisions += 1;
                self.trail.push(
                    lit.negated(),
                    self.decision_level,
                    Reason::Decision,
                    &mut self.assignment,
                );
                self.decisions.push((lit.negated(), true));
                return Ok(());
            }
        }
    }
}

impl<L: Literal, V: VariableSelection> Solver<L> for Dpll<L, V> {
    fn with_limits(cnf: Cnf<L>, limits: Limits) -> Self {
        let occurring: Vec<_> = cnf
            .iter()
            .flat_map(|c| c.iter().map(|l| l.variable()))
            .collect();
        let selector = V::new(cnf.num_vars, &occurring);
        let propagator = Propagator::new(&cnf);

        Self {
            assignment: Assignment::new(cnf.num_vars),
            trail: Trail::new(cnf.num_vars),
            propagator,
            selector,
            decision_level: 0,
            decisions: Vec::new(),
            limits,
            stats: SolverStats::default(),
            cnf,
        }
    }

    fn solve(&mut self) -> Outcome {
        let started = Instant::now();

        if self.cnf.iter().any(Clause::is_empty) {
            return Outcome::Unsat;
        }

        if self.seed_units().is_err() {
            return Outcome::Unsat;
        }

        loop {
            if self
                .propagator
                .propagate(&mut self.cnf, &mut self.trail, &mut self.assignment)
                .is_some()
            {
                self.stats.conflicts += 1;
                if self.backtrack().is_err() {
                    return Outcome::Unsat;
                }
            } else {
                match self.selector.pick(&self.assignment) {
                    None => return Outcome::Sat(self.assignment.model()),
                    Some(var) => {
                        let lit = L::new(var, true);
                        self.decision_level += 1;
                        self.stats.decisions += 1;
                        self.trail.push(
                            lit,
                            self.decision_level,
                            Reason::Decision,
                            &mut self.assignment,
                        );
                        self.decisions.push((lit, false));
                    }
                }
            }

            if self.limits.exceeded(&self.stats, started) {
                return Outcome::Unknown;
            }
        }
    }

    fn stats(&self) -> SolverStats {
        SolverStats {
            propagations: self.propagator.propagations(),
            ..self.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::variable_selection::FixedOrder;

    type TestDpll = Dpll<PackedLiteral, FixedOrder>;

    fn dpll(clauses: Vec<Vec<i32>>, num_vars: usize) -> TestDpll {
        Dpll::new(Cnf::new(clauses, num_vars).unwrap())
    }

    #[test]
    fn test_simple_sat() {
        let mut solver = dpll(vec![vec![1, 2], vec![-1, 2], vec![1, -2]], 2);
        let outcome = solver.solve();

        let solutions = outcome.solutions().expect("expected SAT");
        assert!(solver.cnf.verify(solutions));
    }

    #[test]
    fn test_contradictory_units_unsat() {
        let mut solver = dpll(vec![vec![1], vec![-1]], 1);
        assert_eq!(solver.solve(), Outcome::Unsat);
    }

    #[test]
    fn test_xor_constraints_unsat() {
        let mut solver = dpll(vec![vec![1, 2], vec![-1, -2], vec![1, -2], vec![-1, 2]], 2);
        assert_eq!(solver.solve(), Outcome::Unsat);
    }

    #[test]
    fn test_empty_formula_has_total_model() {
        let mut solver = dpll(vec![], 3);
        let solutions = solver.solve();
        assert_eq!(solutions.solutions().expect("expected SAT").len(), 3);
    }

    #[test]
    fn test_flip_explores_both_polarities() {
        // The positive-first decision on 1 fails; only 1 = false works.
        let mut solver = dpll(vec![vec![-1, 2], vec![-1, -2], vec![-1, 3]], 3);
        let outcome = solver.solve();

        let solutions = outcome.solutions().expect("expected SAT");
        assert!(solutions.check(-1));
        assert!(solver.cnf.verify(solutions));
    }

    #[test]
    fn test_budget_reports_unknown() {
        let cnf = Cnf::new(vec![vec![1, 2], vec![-1, -2]], 2).unwrap();
        let limits = Limits {
            max_decisions: Some(1),
            ..Limits::UNBOUNDED
        };

        let mut solver = TestDpll::with_limits(cnf, limits);
        assert_eq!(solver.solve(), Outcome::Unknown);
    }

    #[test]
    fn test_agrees_with_cdcl() {
        use crate::sat::cdcl::Cdcl;
        use crate::sat::variable_selection::Vsids;

        let instances = vec![
            (vec![vec![1, 2], vec![-1, 2], vec![1, -2]], 2),
            (vec![vec![1, 2], vec![-1, -2], vec![1, -2], vec![-1, 2]], 2),
            (vec![vec![1, -3], vec![2, 3, -1], vec![-2, 3]], 3),
            (vec![vec![1], vec![-1, 2], vec![-2, -1]], 2),
        ];

        for (clauses, num_vars) in instances {
            let mut dpll_solver = dpll(clauses.clone(), num_vars);
            let mut cdcl_solver: Cdcl<PackedLiteral, Vsids> =
                Cdcl::new(Cnf::new(clauses, num_vars).unwrap());

            assert_eq!(
                dpll_solver.solve().is_sat(),
                cdcl_solver.solve().is_sat()
            );
        }
    }
}
