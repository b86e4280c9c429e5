use crate::sat::literal::{Literal, Variable};
use std::fmt;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    #[default]
    Unassigned,
    Assigned(bool),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    #[must_use]
    pub const fn is_unassigned(&self) -> bool {
        !self.is_assigned()
    }
}

/// The current (partial) truth assignment, indexed by variable id.
///
/// Slot 0 is unused so variables index directly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment(Vec<VarState>);

impl Assignment {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self(vec![VarState::Unassigned; num_vars + 1])
    }

    pub fn assign<L: Literal>(&mut self, lit: L) {
        self.0[lit.variable() as usize] = VarState::Assigned(lit.polarity());
    }

    pub fn unassign(&mut self, var: Variable) {
        self.0[var as usize] = VarState::Unassigned;
    }

    #[must_use]
    pub fn is_assigned(&self, var: Variable) -> bool {
        self.0[var as usize].is_assigned()
    }

    #[must_use]
    pub fn var_value(&self, var: Variable) -> Option<bool> {
        match self.0.get(var as usize) {
            Some(VarState::Assigned(b)) => Some(*b),
            _ => None,
        }
    }

    /// Truth value of a literal under the current assignment, `None` while
    /// its variable is unassigned.
    #[must_use]
    pub fn literal_value<L: Literal>(&self, lit: L) -> Option<bool> {
        self.var_value(lit.variable())
            .map(|b| if lit.polarity() { b } else { !b })
    }

    /// Reads the model off a total assignment. Unassigned variables are
    /// reported negative, which only matters for callers that tolerate
    /// partial models (none of the solvers emit one at a SAT terminal).
    #[must_use]
    pub fn model(&self) -> Solutions {
        let values = self
            .0
            .iter()
            .enumerate()
            .skip(1)
            .map(|(var, state)| {
                let var = var as i32;
                match state {
                    VarState::Assigned(true) => var,
                    _ => -var,
                }
            })
            .collect();
        Solutions(values)
    }
}

impl Index<Variable> for Assignment {
    type Output = VarState;

    fn index(&self, index: Variable) -> &Self::Output {
        &self.0[index as usize]
    }
}

impl IndexMut<Variable> for Assignment {
    fn index_mut(&mut self, index: Variable) -> &mut Self::Output {
        &mut self.0[index as usize]
    }
}

/// A total model: one signed literal per variable, in variable order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Solutions(Vec<i32>);

impl Solutions {
    #[must_use]
    pub fn new(values: Vec<i32>) -> Self {
        Self(values)
    }

    /// True when the model makes `literal` true.
    #[must_use]
    pub fn check(&self, literal: i32) -> bool {
        let var = literal.unsigned_abs() as usize;
        var != 0 && self.0.get(var - 1) == Some(&literal)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &i32> {
        self.0.iter()
    }
}

impl fmt::Display for Solutions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for lit in &self.0 {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{lit}")?;
            first = false;
        }
        Ok(())
    }
}
