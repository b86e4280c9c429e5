#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! First-UIP conflict analysis.
//!
//! Starting from the conflict clause, repeatedly resolve against the reason
//! clause of the most recently trailed contributing variable until exactly
//! one variable of the conflict level remains: the first unique implication
//! point. Its negation asserts the learned clause after backjumping.

use crate::sat::clause::Clause;
use crate::sat::cnf::{Cnf, DecisionLevel};
use crate::sat::literal::{Literal, Variable};
use crate::sat::trail::{Reason, Trail};
use bit_vec::BitVec;
use smallvec::SmallVec;

/// Result of analysing one conflict.
///
/// The asserting literal is at position 0; position 1 holds a literal from
/// the backjump level so both watches stay current after the jump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Learnt<L: Literal> {
    pub clause: Clause<L>,
    pub backjump_level: DecisionLevel,
    pub bumped: Vec<Variable>,
}

/// Derives the first-UIP learned clause for a conflict at a level above 0.
///
/// The backjump level is the second-highest decision level among the learned
/// clause's literals, 0 when the clause is unit with respect to the whole
/// trail. Every variable seen during the derivation is reported in `bumped`
/// for an activity update.
#[must_use]
pub fn analyse<L: Literal>(cnf: &Cnf<L>, trail: &Trail<L>, conflict: usize) -> Learnt<L> {
    let conflict_level = trail.decision_level();
    debug_assert!(conflict_level > 0, "root conflicts are terminal, not analysed");

    let mut seen = BitVec::from_elem(cnf.num_vars + 1, false);
    let mut lower: SmallVec<[L; 8]> = SmallVec::new();
    let mut bumped = Vec::new();
    let mut unresolved = 0usize;
    let mut clause_idx = conflict;
    let mut i = trail.len();

    let asserting = loop {
        for &lit in cnf[clause_idx].iter() {
            let var = lit.variable();
            if seen.get(var as usize).unwrap_or(false) {
                continue;
            }
            seen.set(var as usize, true);
            bumped.push(var);
            if trail.level_of(var) >= conflict_level {
                unresolved += 1;
            } else {
                lower.push(lit);
            }
        }

        // Most recently trailed seen variable: the current-level segment sits
        // on top of the trail, so this always lands on the conflict level.
        loop {
            i -= 1;
            if seen.get(trail[i].lit.variable() as usize).unwrap_or(false) {
                break;
            }
        }

        unresolved -= 1;
        if unresolved == 0 {
            break trail[i].lit.negated();
        }

        clause_idx = match trail[i].reason {
            Reason::Clause(idx) => idx,
            Reason::Decision => unreachable!("only the UIP can be a decision"),
        };
    };

    let mut literals: SmallVec<[L; 8]> = SmallVec::new();
    literals.push(asserting);
    literals.extend(lower);

    let backjump_level = literals
        .iter()
        .skip(1)
        .map(|l| trail.level_of(l.variable()))
        .max()
        .unwrap_or(0);

    if literals.len() > 1 {
        let deepest = literals
            .iter()
            .skip(1)
            .position(|l| trail.level_of(l.variable()) == backjump_level)
            .map_or(1, |p| p + 1);
        literals.swap(1, deepest);
    }

    Learnt {
        clause: Clause::from_literals(literals, true),
        backjump_level,
        bumped,
    }
}
