#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use crate::sat::assignment::Assignment;
use crate::sat::cnf::DecisionLevel;
use crate::sat::literal::{Literal, PackedLiteral, Variable};
use std::ops::Index;

/// Why a variable holds its value: a branching choice, or the clause that
/// became unit and forced it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Copy, Hash, PartialOrd, Ord)]
pub enum Reason {
    #[default]
    Decision,
    Clause(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Step<L: Literal> {
    pub lit: L,
    pub level: DecisionLevel,
    pub reason: Reason,
}

/// Chronological assignment log, partitioned by decision level.
///
/// The trail doubles as the propagation queue: `head` marks the frontier of
/// literals whose consequences have already been driven, and `next` yields the
/// ones newly made true since the last fixpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trail<L: Literal = PackedLiteral> {
    steps: Vec<Step<L>>,
    head: usize,
    level: Vec<DecisionLevel>,
    reason: Vec<Reason>,
}

impl<L: Literal> Trail<L> {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            steps: Vec::with_capacity(num_vars),
            head: 0,
            level: vec![0; num_vars + 1],
            reason: vec![Reason::Decision; num_vars + 1],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step<L>> {
        self.steps.iter()
    }

    /// Level of the most recent step, 0 on an empty trail.
    #[must_use]
    pub fn decision_level(&self) -> DecisionLevel {
        self.steps.last().map_or(0, |step| step.level)
    }

    #[must_use]
    pub fn level_of(&self, var: Variable) -> DecisionLevel {
        self.level[var as usize]
    }

    #[must_use]
    pub fn reason_of(&self, var: Variable) -> Reason {
        self.reason[var as usize]
    }

    /// Records an assignment and sets the variable's truth value from the
    /// literal's sign.
    pub fn push(
        &mut self,
        lit: L,
        level: DecisionLevel,
        reason: Reason,
        assignment: &mut Assignment,
    ) {
        debug_assert!(!assignment.is_assigned(lit.variable()));

        assignment.assign(lit);
        self.level[lit.variable() as usize] = level;
        self.reason[lit.variable() as usize] = reason;
        self.steps.push(Step { lit, level, reason });
    }

    /// Next literal whose consequences have not been propagated yet.
    pub fn next(&mut self) -> Option<L> {
        let step = self.steps.get(self.head)?;
        self.head += 1;
        Some(step.lit)
    }

    /// Undoes assignments LIFO until the most recent level is at most
    /// `target`, resetting each undone variable to unassigned.
    pub fn backjump_to(&mut self, target: DecisionLevel, assignment: &mut Assignment) {
        while let Some(step) = self.steps.last() {
            if step.level <= target {
                break;
            }
            let var = step.lit.variable();
            assignment.unassign(var);
            self.level[var as usize] = 0;
            self.reason[var as usize] = Reason::Decision;
            self.steps.pop();
        }
        self.head = self.steps.len();
    }
}

impl<L: Literal> Index<usize> for Trail<L> {
    type Output = Step<L>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.steps[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::PackedLiteral;

    fn lit(value: i32) -> PackedLiteral {
        PackedLiteral::from_dimacs(value)
    }

    #[test]
    fn test_push_records_assignment() {
        let mut assignment = Assignment::new(3);
        let mut trail: Trail<PackedLiteral> = Trail::new(3);

        trail.push(lit(1), 0, Reason::Clause(0), &mut assignment);
        trail.push(lit(-2), 1, Reason::Decision, &mut assignment);

        assert_eq!(trail.len(), 2);
        assert_eq!(trail.decision_level(), 1);
        assert_eq!(trail.level_of(2), 1);
        assert_eq!(trail.reason_of(1), Reason::Clause(0));
        assert_eq!(assignment.var_value(1), Some(true));
        assert_eq!(assignment.var_value(2), Some(false));
    }

    #[test]
    fn test_next_drains_in_order() {
        let mut assignment = Assignment::new(2);
        let mut trail: Trail<PackedLiteral> = Trail::new(2);

        trail.push(lit(1), 0, Reason::Decision, &mut assignment);
        trail.push(lit(2), 0, Reason::Decision, &mut assignment);

        assert_eq!(trail.next(), Some(lit(1)));
        assert_eq!(trail.next(), Some(lit(2)));
        assert_eq!(trail.next(), None);
    }

    #[test]
    fn test_backjump_clears_above_target() {
        let mut assignment = Assignment::new(4);
        let mut trail: Trail<PackedLiteral> = Trail::new(4);

        trail.push(lit(1), 0, Reason::Clause(0), &mut assignment);
        trail.push(lit(2), 1, Reason::Decision, &mut assignment);
        trail.push(lit(3), 1, Reason::Clause(1), &mut assignment);
        trail.push(lit(4), 2, Reason::Decision, &mut assignment);

        trail.backjump_to(1, &mut assignment);

        assert_eq!(trail.len(), 3);
        assert_eq!(trail.decision_level(), 1);
        assert!(!assignment.is_assigned(4));
        assert!(assignment.is_assigned(3));
        assert_eq!(trail.level_of(4), 0);

        trail.backjump_to(0, &mut assignment);
        assert_eq!(trail.len(), 1);
        assert!(assignment.is_assigned(1));
        assert!(!assignment.is_assigned(2));
    }

    #[test]
    fn test_backjump_resets_queue_head() {
        let mut assignment = Assignment::new(2);
        let mut trail: Trail<PackedLiteral> = Trail::new(2);

        trail.push(lit(1), 1, Reason::Decision, &mut assignment);
        trail.push(lit(2), 1, Reason::Clause(0), &mut assignment);
        assert_eq!(trail.next(), Some(lit(1)));

        trail.backjump_to(0, &mut assignment);
        assert_eq!(trail.next(), None);
    }
}
