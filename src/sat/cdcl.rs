#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The CDCL driver.
//!
//! The solve loop alternates propagation, conflict analysis with
//! non-chronological backjumping, and activity-guided decisions, starting
//! with level-0 unit propagation and ending at SAT (total assignment), UNSAT
//! (root conflict or empty clause) or Unknown (budget exhausted).

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::cnf::{Cnf, DecisionLevel};
use crate::sat::conflict_analysis::analyse;
use crate::sat::literal::{Literal, PackedLiteral, Variable};
use crate::sat::propagation::Propagator;
use crate::sat::solver::{Limits, Outcome, Solver, SolverStats};
use crate::sat::trail::{Reason, Trail};
use crate::sat::variable_selection::{DEFAULT_DECAY, VariableSelection, Vsids};
use log::debug;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct Cdcl<L: Literal = PackedLiteral, V: VariableSelection = Vsids> {
    pub cnf: Cnf<L>,

    pub assignment: Assignment,

    pub trail: Trail<L>,

    pub propagator: Propagator<L>,

    pub selector: V,

    pub decision_level: DecisionLevel,

    limits: Limits,

    stats: SolverStats,
}

impl<L: Literal, V: VariableSelection> Cdcl<L, V> {
    /// Seeds level 0 with the original unit clauses. A unit literal already
    /// false here is a root conflict.
    fn propagate_initial_units(&mut self) -> Result<(), ()> {
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

    /// Learns the clause for the current conflict and backjumps. Returns
    /// `Err(())` for a conflict at level 0.
    fn resolve_conflict(&mut self, conflict: usize) -> Result<(), ()> {
        self.stats.conflicts += 1;

        if self.decision_level == 0 {
            return Err(());
        }

        let learnt = analyse(&self.cnf, &self.trail, conflict);
        self.selector.bumps(learnt.bumped.iter().copied());
        self.selector.decay(DEFAULT_DECAY);

        let asserting = learnt.clause[0];
        let target = learnt.backjump_level;

        if self.stats.conflicts % 1024 == 0 {
            debug!(
                "conflict {}: learnt clause of length {}, backjumping {} -> {}",
                self.stats.conflicts,
                learnt.clause.len(),
                self.decision_level,
                target
            );
        }

        let clause_idx = self.cnf.add_clause(learnt.clause);
        self.propagator.attach_clause(&self.cnf[clause_idx], clause_idx);
        self.stats.learnt_clauses += 1;

        self.trail.backjump_to(target, &mut self.assignment);
        self.decision_level = target;

        // The learned clause is unit at the backjump level and fires now.
        self.trail
            .push(asserting, target, Reason::Clause(clause_idx), &mut self.assignment);

        Ok(())
    }

    fn decide(&mut self, var: Variable) {
        self.decision_level += 1;
        self.stats.decisions += 1;
        // Decision polarity is fixed positive; no phase saving across calls.
        self.trail.push(
            L::new(var, true),
            self.decision_level,
            Reason::Decision,
            &mut self.assignment,
        );
    }
}

impl<L: Literal, V: VariableSelection> Solver<L> for Cdcl<L, V> {
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
            limits,
            stats: SolverStats::default(),
            cnf,
        }
    }

    fn solve(&mut self) -> Outcome {
        let started = Instant::now();

        // An empty clause in the store is an immediate, certain UNSAT signal.
        if self.cnf.iter().any(Clause::is_empty) {
            return Outcome::Unsat;
        }

        if self.propagate_initial_units().is_err() {
            return Outcome::Unsat;
        }

        loop {
            if let Some(conflict) =
                self.propagator
                    .propagate(&mut self.cnf, &mut self.trail, &mut self.assignment)
            {
                if self.resolve_conflict(conflict).is_err() {
                    return Outcome::Unsat;
                }
            } else {
                match self.selector.pick(&self.assignment) {
                    None => return Outcome::Sat(self.assignment.model()),
                    Some(var) => self.decide(var),
                }
            }

            if self.limits.exceeded(&self.stats, started) {
                debug!(
                    "budget exhausted after {} conflicts and {} decisions",
                    self.stats.conflicts, self.stats.decisions
                );
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
