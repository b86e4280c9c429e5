use crate::sat::assignment::Solutions;
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, PackedLiteral};
use std::fmt;
use std::time::{Duration, Instant};

/// Terminal state of a solve call.
///
/// `Unknown` is reserved for an exhausted resource budget and is never used
/// to report unsatisfiability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sat(Solutions),
    Unsat,
    Unknown,
}

impl Outcome {
    #[must_use]
    pub const fn is_sat(&self) -> bool {
        matches!(self, Self::Sat(_))
    }

    #[must_use]
    pub const fn is_unsat(&self) -> bool {
        matches!(self, Self::Unsat)
    }

    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    #[must_use]
    pub const fn solutions(&self) -> Option<&Solutions> {
        match self {
            Self::Sat(solutions) => Some(solutions),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sat(_) => write!(f, "SAT"),
            Self::Unsat => write!(f, "UNSAT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Per-instance search counters, reported alongside the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolverStats {
    pub decisions: u64,
    pub conflicts: u64,
    pub propagations: u64,
    pub learnt_clauses: u64,
}

/// Resource budget for a single solve call. Exceeding any bound makes the
/// driver stop with `Outcome::Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Limits {
    pub max_conflicts: Option<u64>,
    pub max_decisions: Option<u64>,
    pub max_time: Option<Duration>,
}

impl Limits {
    pub const UNBOUNDED: Self = Self {
        max_conflicts: None,
        max_decisions: None,
        max_time: None,
    };

    #[must_use]
    pub fn exceeded(&self, stats: &SolverStats, started: Instant) -> bool {
        self.max_conflicts.is_some_and(|max| stats.conflicts >= max)
            || self.max_decisions.is_some_and(|max| stats.decisions >= max)
            || self.max_time.is_some_and(|max| started.elapsed() >= max)
    }
}

pub trait Solver<L: Literal = PackedLiteral>: Sized {
    fn new(cnf: Cnf<L>) -> Self {
        Self::with_limits(cnf, Limits::UNBOUNDED)
    }

    fn with_limits(cnf: Cnf<L>, limits: Limits) -> Self;

    fn solve(&mut self) -> Outcome;

    fn stats(&self) -> SolverStats;
}
