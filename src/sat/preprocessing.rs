use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use rustc_hash::FxHashSet;
use std::fmt::Debug;
use std::sync::Arc;

/// An optional, idempotent clause-set transformation run before solving.
/// Never a dependency of the CDCL core.
pub trait Preprocessor<L: Literal> {
    fn preprocess(&self, cnf: Cnf<L>) -> Cnf<L>;
}

#[derive(Clone, Default)]
pub struct PreprocessorChain<L: Literal> {
    preprocessors: Vec<Arc<dyn Preprocessor<L>>>,
}

impl<L: Literal> Debug for PreprocessorChain<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreprocessorChain").finish()
    }
}

impl<L: Literal> PreprocessorChain<L> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            preprocessors: Vec::new(),
        }
    }

    #[must_use]
    pub fn add_preprocessor<P: Preprocessor<L> + 'static>(mut self, preprocessor: P) -> Self {
        self.preprocessors.push(Arc::new(preprocessor));
        self
    }
}

impl<L: Literal> Preprocessor<L> for PreprocessorChain<L> {
    fn preprocess(&self, cnf: Cnf<L>) -> Cnf<L> {
        self.preprocessors
            .iter()
            .fold(cnf, |cnf, preprocessor| preprocessor.preprocess(cnf))
    }
}

/// Asserts every pure literal with a unit clause.
///
/// A literal whose negation never occurs can be set true without changing
/// satisfiability. Asserting it (rather than deleting the clauses it
/// satisfies) keeps the clause set intact, so SAT models stay total and
/// verifiable, and a second run finds nothing new to add.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct PureLiteralAssignment;

impl PureLiteralAssignment {
    fn find_pures<L: Literal>(cnf: &Cnf<L>) -> Vec<L> {
        let mut positive: FxHashSet<L> = FxHashSet::default();
        let mut negative: FxHashSet<L> = FxHashSet::default();

        for clause in cnf.iter() {
            for &lit in clause.iter() {
                if lit.is_positive() {
                    positive.insert(lit);
                } else {
                    negative.insert(lit.negated());
                }
            }
        }

        let mut pures: Vec<L> = Vec::new();
        for &lit in &positive {
            if !negative.contains(&lit) {
                pures.push(lit);
            }
        }
        for &lit in &negative {
            if !positive.contains(&lit) {
                pures.push(lit.negated());
            }
        }

        pures.sort_unstable_by_key(|l| (l.variable(), l.is_negated()));
        pures
    }
}

impl<L: Literal> Preprocessor<L> for PureLiteralAssignment {
    fn preprocess(&self, mut cnf: Cnf<L>) -> Cnf<L> {
        let existing_units: FxHashSet<L> = cnf
            .iter()
            .filter(|c| c.is_unit())
            .map(|c| c[0])
            .collect();

        for lit in Self::find_pures(&cnf) {
            if existing_units.contains(&lit) {
                continue;
            }
            cnf.add_clause(Clause::from_literals([lit], false));
        }

        cnf.non_learnt_idx = cnf.len();
        cnf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::cdcl::Cdcl;
    use crate::sat::literal::PackedLiteral;
    use crate::sat::solver::Solver;

    type TestCnf = Cnf<PackedLiteral>;

    #[test]
    fn test_pure_literals_get_asserted() {
        // 1 occurs only positively, 3 only negatively; 2 occurs both ways.
        let cnf = TestCnf::new(vec![vec![1, 2], vec![1, -2], vec![-3, 2]], 3).unwrap();
        let processed = PureLiteralAssignment.preprocess(cnf);

        assert_eq!(processed.len(), 5);
        let units: Vec<i32> = processed
            .iter()
            .filter(|c| c.is_unit())
            .map(|c| c[0].to_dimacs())
            .collect();
        assert_eq!(units, vec![1, -3]);
    }

    #[test]
    fn test_idempotent() {
        let cnf = TestCnf::new(vec![vec![1, 2], vec![1, -2]], 2).unwrap();
        let once = PureLiteralAssignment.preprocess(cnf);
        let twice = PureLiteralAssignment.preprocess(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_preserves_satisfiability_and_model() {
        let cnf = TestCnf::new(vec![vec![1, 2], vec![-2, 1], vec![2, 3]], 3).unwrap();
        let processed = PureLiteralAssignment.preprocess(cnf.clone());

        let mut solver: Cdcl<PackedLiteral> = Cdcl::new(processed);
        let outcome = solver.solve();
        let solutions = outcome.solutions().expect("expected SAT");

        // The model satisfies the original clauses too.
        assert!(cnf.verify(solutions));
        assert!(solutions.check(1));
    }

    #[test]
    fn test_chain_applies_in_order() {
        let cnf = TestCnf::new(vec![vec![1, 2], vec![1, -2]], 2).unwrap();
        let chain = PreprocessorChain::new().add_preprocessor(PureLiteralAssignment);
        let processed = chain.preprocess(cnf);
        assert_eq!(processed.len(), 3);
    }
}
