//! Overlapping 9x9 puzzle pairs.
//!
//! A TwoDoku is two 9x9 grids that agree on an overlap region: whole blocks
//! of A's bottom-right corner mapped onto B's top-left corner, cell
//! positions preserved within each block. Each grid is still encoded and
//! solved on its own; the overlap is shared through clues.

use crate::sudoku::board::{Board, PuzzleError, Size, Variant};
use crate::sudoku::generate::{complete, full_solution, puzzle_from_solution};
use rustc_hash::FxHashSet;

const BLOCK: usize = 3;

/// Size of the shared region, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Overlap {
    #[default]
    None,
    /// One shared block (9 cells): A(2,2) -> B(0,0).
    OneBlock,
    /// Two shared blocks (18 cells).
    TwoBlocks,
    /// A full shared band (27 cells).
    ThreeBlocks,
    /// A 2x2 block square (36 cells).
    FourBlocks,
}

impl Overlap {
    #[must_use]
    pub const fn cell_count(self) -> usize {
        match self {
            Self::None => 0,
            Self::OneBlock => 9,
            Self::TwoBlocks => 18,
            Self::ThreeBlocks => 27,
            Self::FourBlocks => 36,
        }
    }

    /// Block-coordinate pairs `(block in A, block in B)`, 0-based.
    #[must_use]
    pub const fn block_pairs(self) -> &'static [((usize, usize), (usize, usize))] {
        match self {
            Self::None => &[],
            Self::OneBlock => &[((2, 2), (0, 0))],
            Self::TwoBlocks => &[((2, 1), (0, 0)), ((2, 2), (0, 1))],
            Self::ThreeBlocks => &[((2, 0), (0, 0)), ((2, 1), (0, 1)), ((2, 2), (0, 2))],
            Self::FourBlocks => &[
                ((1, 1), (0, 0)),
                ((1, 2), (0, 1)),
                ((2, 1), (1, 0)),
                ((2, 2), (1, 1)),
            ],
        }
    }

    /// Every shared cell as `((row_a, col_a), (row_b, col_b))`.
    pub fn cell_pairs(self) -> impl Iterator<Item = ((usize, usize), (usize, usize))> {
        self.block_pairs()
            .iter()
            .flat_map(|&((block_row_a, block_col_a), (block_row_b, block_col_b))| {
                (0..BLOCK).flat_map(move |i| {
                    (0..BLOCK).map(move |j| {
                        (
                            (block_row_a * BLOCK + i, block_col_a * BLOCK + j),
                            (block_row_b * BLOCK + i, block_col_b * BLOCK + j),
                        )
                    })
                })
            })
    }
}

impl TryFrom<usize> for Overlap {
    type Error = PuzzleError;

    fn try_from(cells: usize) -> Result<Self, Self::Error> {
        match cells {
            0 => Ok(Self::None),
            9 => Ok(Self::OneBlock),
            18 => Ok(Self::TwoBlocks),
            27 => Ok(Self::ThreeBlocks),
            36 => Ok(Self::FourBlocks),
            _ => Err(PuzzleError::BadOverlap(cells)),
        }
    }
}

/// A generated pair of overlapping puzzles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoDoku {
    pub first: Board,
    pub second: Board,
    pub overlap: Overlap,
}

impl TwoDoku {
    /// Whether the filled cells of both grids agree on the overlap.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.overlap.cell_pairs().all(|((ra, ca), (rb, cb))| {
            let a = self.first.get(ra, ca);
            let b = self.second.get(rb, cb);
            a == 0 || b == 0 || a == b
        })
    }

    /// Generates a pair:
    /// 1. sample puzzle A from a fresh full solution;
    /// 2. seed B with A's clues inside the overlap;
    /// 3. complete B under the same rules;
    /// 4. sample puzzle B from that completion, keeping the seeded clues.
    pub fn generate(
        filled_a: f64,
        filled_b: f64,
        overlap: Overlap,
        variant: Variant,
        rng: &mut fastrand::Rng,
    ) -> Result<Self, PuzzleError> {
        let solution_a = full_solution(Size::Nine, variant, rng)?;
        let first = puzzle_from_solution(&solution_a, filled_a, rng);

        let mut seed = Board::empty(Size::Nine);
        for ((row_a, col_a), (row_b, col_b)) in overlap.cell_pairs() {
            let value = first.get(row_a, col_a);
            if value != 0 {
                seed.set(row_b, col_b, value);
            }
        }

        let mut solution_b = seed.clone();
        complete(&mut solution_b, variant, rng)?;

        let second = Self::sample_second(&seed, &solution_b, filled_b, rng);

        Ok(Self {
            first,
            second,
            overlap,
        })
    }

    /// Puzzle B keeps every seeded overlap clue and tops up with random
    /// cells from the completion until the clue budget is met.
    fn sample_second(
        seed: &Board,
        solution: &Board,
        filled: f64,
        rng: &mut fastrand::Rng,
    ) -> Board {
        let n = solution.n();
        let filled = filled.clamp(0.0, 1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let target = ((n * n) as f64 * filled).round() as usize;

        let seeded: FxHashSet<(usize, usize)> =
            seed.clues().map(|(r, c, _)| (r, c)).collect();

        let mut puzzle = seed.clone();
        let mut count = puzzle.filled_count();

        let mut cells: Vec<(usize, usize)> = (0..n)
            .flat_map(|r| (0..n).map(move |c| (r, c)))
            .filter(|pos| !seeded.contains(pos))
            .collect();
        rng.shuffle(&mut cells);

        for (row, col) in cells {
            if count >= target {
                break;
            }
            puzzle.set(row, col, solution.get(row, col));
            count += 1;
        }

        puzzle
    }
}
