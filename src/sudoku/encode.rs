//! Grid to CNF translation.
//!
//! Every constraint group is an "exactly one" over a set of cell/value
//! propositions: one at-least-one clause plus pairwise at-most-one clauses.
//! The non-consecutive variant adds binary clauses forbidding a value
//! difference of 1 between orthogonal neighbours.

use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use crate::sudoku::board::{Board, CellVar, Size, Variant};
use itertools::Itertools;

fn var(row: usize, col: usize, value: usize, size: Size) -> i32 {
    i32::try_from(CellVar::new(row, col, value).encode(size))
        .expect("grid variables fit in an i32")
}

fn exactly_one(vars: &[i32], clauses: &mut Vec<Vec<i32>>) {
    clauses.push(vars.to_vec());
    for (&a, &b) in vars.iter().tuple_combinations() {
        clauses.push(vec![-a, -b]);
    }
}

fn cell_clauses(size: Size, clauses: &mut Vec<Vec<i32>>) {
    let n = usize::from(size);
    for row in 0..n {
        for col in 0..n {
            let vars = (1..=n).map(|v| var(row, col, v, size)).collect_vec();
            exactly_one(&vars, clauses);
        }
    }
}

fn row_clauses(size: Size, clauses: &mut Vec<Vec<i32>>) {
    let n = usize::from(size);
    for row in 0..n {
        for value in 1..=n {
            let vars = (0..n).map(|c| var(row, c, value, size)).collect_vec();
            exactly_one(&vars, clauses);
        }
    }
}

fn column_clauses(size: Size, clauses: &mut Vec<Vec<i32>>) {
    let n = usize::from(size);
    for col in 0..n {
        for value in 1..=n {
            let vars = (0..n).map(|r| var(r, col, value, size)).collect_vec();
            exactly_one(&vars, clauses);
        }
    }
}

fn block_clauses(size: Size, clauses: &mut Vec<Vec<i32>>) {
    let n = usize::from(size);
    let block = size.block_size();

    for block_row in (0..n).step_by(block) {
        for block_col in (0..n).step_by(block) {
            for value in 1..=n {
                let vars = (block_row..block_row + block)
                    .cartesian_product(block_col..block_col + block)
                    .map(|(r, c)| var(r, c, value, size))
                    .collect_vec();
                exactly_one(&vars, clauses);
            }
        }
    }
}

/// Orthogonal neighbours never hold consecutive values. Each unordered
/// neighbour pair is visited once (right and down), with both value orders.
fn non_consecutive_clauses(size: Size, clauses: &mut Vec<Vec<i32>>) {
    let n = usize::from(size);

    for row in 0..n {
        for col in 0..n {
            let neighbours = [(row + 1, col), (row, col + 1)];
            for (r2, c2) in neighbours {
                if r2 >= n || c2 >= n {
                    continue;
                }
                for value in 1..n {
                    clauses.push(vec![
                        -var(row, col, value, size),
                        -var(r2, c2, value + 1, size),
                    ]);
                    clauses.push(vec![
                        -var(r2, c2, value, size),
                        -var(row, col, value + 1, size),
                    ]);
                }
            }
        }
    }
}

fn clue_clauses(board: &Board, clauses: &mut Vec<Vec<i32>>) {
    for (row, col, value) in board.clues() {
        clauses.push(vec![var(row, col, value, board.size())]);
    }
}

/// Encodes a puzzle as CNF over `N³` variables.
pub fn to_cnf<L: Literal>(board: &Board, variant: Variant) -> Cnf<L> {
    let size = board.size();
    let n = usize::from(size);
    let mut clauses = Vec::new();

    cell_clauses(size, &mut clauses);
    row_clauses(size, &mut clauses);
    column_clauses(size, &mut clauses);
    block_clauses(size, &mut clauses);
    if variant == Variant::NonConsecutive {
        non_consecutive_clauses(size, &mut clauses);
    }
    clue_clauses(board, &mut clauses);

    Cnf::new(clauses, n * n * n).expect("grid encoding stays within the variable range")
}
