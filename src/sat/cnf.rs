use crate::sat::assignment::Solutions;
use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, PackedLiteral};
use std::fmt;
use thiserror::Error;

pub type DecisionLevel = usize;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CnfError {
    #[error("literal {literal} in clause {clause} is outside the variable range 1..={num_vars}")]
    VariableOutOfRange {
        literal: i32,
        clause: usize,
        num_vars: usize,
    },
}

/// The clause store: every original and learned clause, in insertion order.
///
/// The store only grows during a solve; `non_learnt_idx` marks the boundary
/// between the input formula and clauses added by conflict analysis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf<L: Literal = PackedLiteral> {
    pub clauses: Vec<Clause<L>>,
    pub num_vars: usize,
    pub non_learnt_idx: usize,
}

impl<L: Literal> Cnf<L> {
    /// Builds a formula over variables `1..=num_vars`, rejecting any literal
    /// with magnitude zero or above `num_vars` before solving begins.
    pub fn new(clauses: Vec<Vec<i32>>, num_vars: usize) -> Result<Self, CnfError> {
        for (i, clause) in clauses.iter().enumerate() {
            for &literal in clause {
                let magnitude = literal.unsigned_abs() as usize;
                if magnitude == 0 || magnitude > num_vars {
                    return Err(CnfError::VariableOutOfRange {
                        literal,
                        clause: i,
                        num_vars,
                    });
                }
            }
        }

        let clauses: Vec<Clause<L>> = clauses.into_iter().map(Clause::new).collect();
        let non_learnt_idx = clauses.len();

        Ok(Self {
            clauses,
            num_vars,
            non_learnt_idx,
        })
    }

    /// Builds a formula whose variable count is the largest magnitude seen.
    pub fn from_clauses(clauses: Vec<Vec<i32>>) -> Result<Self, CnfError> {
        let num_vars = clauses
            .iter()
            .flatten()
            .map(|l| l.unsigned_abs() as usize)
            .max()
            .unwrap_or(0);

        Self::new(clauses, num_vars.max(1))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause<L>> {
        self.clauses.iter()
    }

    /// Appends a clause and returns its index. The store never shrinks.
    pub fn add_clause(&mut self, clause: Clause<L>) -> usize {
        self.clauses.push(clause);
        self.clauses.len() - 1
    }

    #[must_use]
    pub fn num_learnt(&self) -> usize {
        self.clauses.len() - self.non_learnt_idx
    }

    /// Checks a model against the original (non-learnt) clauses: every clause
    /// must contain a literal the model makes true.
    #[must_use]
    pub fn verify(&self, solutions: &Solutions) -> bool {
        self.clauses[..self.non_learnt_idx].iter().all(|clause| {
            clause
                .iter()
                .any(|&lit| solutions.check(lit.to_dimacs()))
        })
    }
}

impl<L: Literal> std::ops::Index<usize> for Cnf<L> {
    type Output = Clause<L>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

impl<L: Literal> std::ops::IndexMut<usize> for Cnf<L> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.clauses[index]
    }
}

/// DIMACS rendering: problem line, then one clause per line with a trailing 0.
impl<L: Literal> fmt::Display for Cnf<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.non_learnt_idx)?;
        for clause in &self.clauses[..self.non_learnt_idx] {
            for lit in clause.iter() {
                write!(f, "{} ", lit.to_dimacs())?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestCnf = Cnf<PackedLiteral>;

    #[test]
    fn test_new_validates_range() {
        assert!(TestCnf::new(vec![vec![1, -2], vec![2]], 2).is_ok());

        assert_eq!(
            TestCnf::new(vec![vec![1, 3]], 2),
            Err(CnfError::VariableOutOfRange {
                literal: 3,
                clause: 0,
                num_vars: 2,
            })
        );

        assert_eq!(
            TestCnf::new(vec![vec![0]], 2),
            Err(CnfError::VariableOutOfRange {
                literal: 0,
                clause: 0,
                num_vars: 2,
            })
        );
    }

    #[test]
    fn test_from_clauses_derives_num_vars() {
        let cnf = TestCnf::from_clauses(vec![vec![1, -5], vec![2]]).unwrap();
        assert_eq!(cnf.num_vars, 5);
    }

    #[test]
    fn test_add_clause_grows_monotonically() {
        let mut cnf = TestCnf::new(vec![vec![1, 2]], 2).unwrap();
        let before = cnf.len();
        let idx = cnf.add_clause(Clause::from_literals([PackedLiteral::new(1, false)], true));
        assert_eq!(idx, before);
        assert_eq!(cnf.len(), before + 1);
        assert_eq!(cnf.num_learnt(), 1);
    }

    #[test]
    fn test_verify() {
        let cnf = TestCnf::new(vec![vec![1, 2], vec![-1, 2]], 2).unwrap();
        assert!(cnf.verify(&Solutions::new(vec![1, 2])));
        assert!(cnf.verify(&Solutions::new(vec![-1, 2])));
        assert!(!cnf.verify(&Solutions::new(vec![1, -2])));
    }

    #[test]
    fn test_display_is_dimacs() {
        let cnf = TestCnf::new(vec![vec![1, -2], vec![2]], 2).unwrap();
        assert_eq!(cnf.to_string(), "p cnf 2 2\n1 -2 0\n2 0\n");
    }
}
