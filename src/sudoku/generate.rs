//! Randomized grid construction for puzzle instances.
//!
//! Grids are completed by backtracking over the empty cells in row-major
//! order with shuffled candidate values, under a step cap so a hopeless
//! branch (or an unsatisfiable seed) gives up instead of churning. All
//! randomness comes from the caller's seeded rng, so generation is
//! reproducible.

use crate::sudoku::board::{Board, PuzzleError, Size, Variant};

const STEP_CAP: usize = 200_000;
const MAX_ATTEMPTS: usize = 32;

fn complete_from(
    board: &mut Board,
    empties: &[(usize, usize)],
    next: usize,
    variant: Variant,
    rng: &mut fastrand::Rng,
    steps: &mut usize,
) -> bool {
    let Some(&(row, col)) = empties.get(next) else {
        return true;
    };

    *steps += 1;
    if *steps > STEP_CAP {
        return false;
    }

    let n = board.n();
    let mut values: Vec<usize> = (1..=n).collect();
    rng.shuffle(&mut values);

    for value in values {
        if !board.is_legal(row, col, value, variant) {
            continue;
        }
        board.set(row, col, value);
        if complete_from(board, empties, next + 1, variant, rng, steps) {
            return true;
        }
        board.set(row, col, 0);
    }

    false
}

/// Fills every empty cell of `board` in place, respecting the variant's
/// rules and the existing clues. Fails when the budget runs out or the
/// clues admit no completion.
pub fn complete(
    board: &mut Board,
    variant: Variant,
    rng: &mut fastrand::Rng,
) -> Result<(), PuzzleError> {
    let n = board.n();
    let empties: Vec<(usize, usize)> = (0..n)
        .flat_map(|r| (0..n).map(move |c| (r, c)))
        .filter(|&(r, c)| board.get(r, c) == 0)
        .collect();

    let snapshot = board.clone();
    for _ in 0..MAX_ATTEMPTS {
        let mut steps = 0;
        if complete_from(board, &empties, 0, variant, rng, &mut steps) {
            return Ok(());
        }
        *board = snapshot.clone();
    }

    Err(PuzzleError::GenerationFailed)
}

/// A fresh, fully filled rule-valid grid.
pub fn full_solution(
    size: Size,
    variant: Variant,
    rng: &mut fastrand::Rng,
) -> Result<Board, PuzzleError> {
    let mut board = Board::empty(size);
    complete(&mut board, variant, rng)?;
    Ok(board)
}

/// Keeps a random subset of a solution's cells as clues: round(filled · N²)
/// of them, clamped to [0, 1].
#[must_use]
pub fn puzzle_from_solution(solution: &Board, filled: f64, rng: &mut fastrand::Rng) -> Board {
    let n = solution.n();
    let filled = filled.clamp(0.0, 1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let target = ((n * n) as f64 * filled).round() as usize;

    let mut cells: Vec<(usize, usize)> = (0..n)
        .flat_map(|r| (0..n).map(move |c| (r, c)))
        .collect();
    rng.shuffle(&mut cells);

    let mut puzzle = Board::empty(solution.size());
    for &(row, col) in cells.iter().take(target) {
        puzzle.set(row, col, solution.get(row, col));
    }
    puzzle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_solution_classic() {
        let mut rng = fastrand::Rng::with_seed(7);
        let board = full_solution(Size::Nine, Variant::Classic, &mut rng).unwrap();
        assert!(board.is_solved(Variant::Classic));
    }

    #[test]
    fn test_full_solution_non_consecutive() {
        let mut rng = fastrand::Rng::with_seed(11);
        let board = full_solution(Size::Nine, Variant::NonConsecutive, &mut rng).unwrap();
        assert!(board.is_solved(Variant::NonConsecutive));
    }

    #[test]
    fn test_generation_is_reproducible() {
        let first = full_solution(Size::Nine, Variant::Classic, &mut fastrand::Rng::with_seed(3))
            .unwrap();
        let second = full_solution(Size::Nine, Variant::Classic, &mut fastrand::Rng::with_seed(3))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_complete_respects_clues() {
        let mut rng = fastrand::Rng::with_seed(5);
        let puzzle: Board = "0 2 0 0\n1 0 0 3\n0 0 4 0\n0 1 0 0\n".parse().unwrap();

        let mut board = puzzle.clone();
        complete(&mut board, Variant::Classic, &mut rng).unwrap();

        assert!(board.is_solved(Variant::Classic));
        assert!(board.is_completion_of(&puzzle));
    }

    #[test]
    fn test_complete_fails_on_unsatisfiable_rules() {
        // No 4x4 grid satisfies the non-consecutive rule.
        let mut rng = fastrand::Rng::with_seed(1);
        let mut board = Board::empty(Size::Four);
        assert_eq!(
            complete(&mut board, Variant::NonConsecutive, &mut rng),
            Err(PuzzleError::GenerationFailed)
        );
    }

    #[test]
    fn test_puzzle_from_solution_keeps_clue_budget() {
        let mut rng = fastrand::Rng::with_seed(9);
        let solution = full_solution(Size::Nine, Variant::Classic, &mut rng).unwrap();

        let puzzle = puzzle_from_solution(&solution, 0.4, &mut rng);
        assert_eq!(puzzle.filled_count(), 32); // round(0.4 * 81)
        assert!(solution.is_completion_of(&puzzle));
    }
}
