#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Reading and writing the DIMACS CNF format.
//!
//! The format: comment lines starting with `c`, a problem line
//! `p cnf <num_vars> <num_clauses>`, clause lines of space-separated signed
//! literals each terminated by `0`, and an optional `%` end-of-data marker
//! (common in competition benchmark sets).
//!
//! When a problem line is present its variable count bounds the literals and
//! out-of-range literals are rejected before solving; without one the
//! variable count is derived from the clauses. An explicit empty clause
//! (a bare `0`) is kept: it is an unsatisfiable input, not a parse error.

use crate::sat::cnf::{Cnf, CnfError};
use crate::sat::literal::Literal;
use itertools::Itertools;
use std::io::{self, BufRead, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("failed to read DIMACS input: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: cannot parse literal {token:?}")]
    BadLiteral { line: usize, token: String },

    #[error("line {line}: malformed problem line (expected `p cnf <vars> <clauses>`)")]
    BadHeader { line: usize },

    #[error(transparent)]
    Cnf(#[from] CnfError),
}

/// Parses DIMACS data from a buffered reader.
pub fn parse_dimacs<R: BufRead, L: Literal>(reader: R) -> Result<Cnf<L>, DimacsError> {
    let mut clauses: Vec<Vec<i32>> = Vec::new();
    let mut current: Vec<i32> = Vec::new();
    let mut declared_vars: Option<usize> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = line_no + 1;
        let trimmed = line.trim_start();

        if trimmed.is_empty() || trimmed.starts_with('c') {
            continue;
        }
        if trimmed.starts_with('%') {
            break;
        }
        if trimmed.starts_with('p') {
            declared_vars = Some(parse_header(trimmed, line_no)?);
            continue;
        }

        for token in trimmed.split_whitespace() {
            let value: i32 = token.parse().map_err(|_| DimacsError::BadLiteral {
                line: line_no,
                token: token.to_string(),
            })?;

            if value == 0 {
                clauses.push(std::mem::take(&mut current));
            } else {
                current.push(value);
            }
        }
    }

    // A final clause without its terminating 0.
    if !current.is_empty() {
        clauses.push(current);
    }

    let cnf = match declared_vars {
        Some(num_vars) => Cnf::new(clauses, num_vars.max(1))?,
        None => Cnf::from_clauses(clauses)?,
    };
    Ok(cnf)
}

fn parse_header(line: &str, line_no: usize) -> Result<usize, DimacsError> {
    let tokens = line.split_whitespace().collect_vec();
    match tokens.as_slice() {
        ["p", "cnf", num_vars, num_clauses] => {
            let num_vars = num_vars.parse::<usize>();
            let num_clauses = num_clauses.parse::<usize>();
            match (num_vars, num_clauses) {
                (Ok(num_vars), Ok(_)) => Ok(num_vars),
                _ => Err(DimacsError::BadHeader { line: line_no }),
            }
        }
        _ => Err(DimacsError::BadHeader { line: line_no }),
    }
}

/// Parses a DIMACS CNF file from a path.
pub fn parse_file<L: Literal>(path: impl AsRef<Path>) -> Result<Cnf<L>, DimacsError> {
    let file = std::fs::File::open(path)?;
    parse_dimacs(io::BufReader::new(file))
}

/// Writes a formula in DIMACS form: problem line, then one clause per line
/// with a trailing 0.
pub fn write_dimacs<W: Write, L: Literal>(writer: &mut W, cnf: &Cnf<L>) -> io::Result<()> {
    write!(writer, "{cnf}")
}
