use crate::sat::assignment::Solutions;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("{0} is not a supported grid size (expected 4, 9, 16 or 25)")]
    BadSize(usize),

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("cell ({row}, {col}) holds {value}, outside 0..={max}")]
    BadValue {
        row: usize,
        col: usize,
        value: usize,
        max: usize,
    },

    #[error("line {line}: cannot parse cell {token:?}")]
    BadToken { line: usize, token: String },

    #[error("{0} is not a supported overlap size (expected 0, 9, 18, 27 or 36)")]
    BadOverlap(usize),

    #[error("could not complete a grid within the search budget")]
    GenerationFailed,
}

/// Supported grid sizes; blocks are the square root of the side length.
#[derive(Debug, Clone, PartialEq, Eq, Copy, PartialOrd, Ord, Hash)]
pub enum Size {
    Four = 4,
    Nine = 9,
    Sixteen = 16,
    TwentyFive = 25,
}

impl Size {
    #[must_use]
    pub const fn block_size(self) -> usize {
        match self {
            Self::Four => 2,
            Self::Nine => 3,
            Self::Sixteen => 4,
            Self::TwentyFive => 5,
        }
    }
}

impl TryFrom<usize> for Size {
    type Error = PuzzleError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::Four),
            9 => Ok(Self::Nine),
            16 => Ok(Self::Sixteen),
            25 => Ok(Self::TwentyFive),
            _ => Err(PuzzleError::BadSize(value)),
        }
    }
}

impl From<Size> for usize {
    fn from(size: Size) -> Self {
        size as Self
    }
}

/// Which rule set a grid is played under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Variant {
    #[default]
    Classic,
    /// Classic rules plus: orthogonal neighbours never differ by exactly 1.
    NonConsecutive,
}

/// One cell/value proposition, mapped onto the solver's variable space as
/// `r·N² + c·N + v` with 0-based row/column and 1-based value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellVar {
    pub row: usize,
    pub col: usize,
    pub value: usize,
}

impl CellVar {
    #[must_use]
    pub const fn new(row: usize, col: usize, value: usize) -> Self {
        Self { row, col, value }
    }

    #[must_use]
    pub const fn encode(self, size: Size) -> usize {
        let n = size as usize;
        self.row * n * n + self.col * n + self.value
    }

    #[must_use]
    pub const fn decode(var: usize, size: Size) -> Self {
        let n = size as usize;
        let u = var - 1;
        Self {
            row: u / (n * n),
            col: (u / n) % n,
            value: u % n + 1,
        }
    }
}

/// A (possibly partially filled) grid; 0 marks an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Vec<usize>>,
    size: Size,
}

impl Board {
    pub fn new(cells: Vec<Vec<usize>>) -> Result<Self, PuzzleError> {
        let size = Size::try_from(cells.len())?;
        let n = usize::from(size);

        for (row, cells_in_row) in cells.iter().enumerate() {
            if cells_in_row.len() != n {
                return Err(PuzzleError::RaggedRow {
                    row,
                    found: cells_in_row.len(),
                    expected: n,
                });
            }
            for (col, &value) in cells_in_row.iter().enumerate() {
                if value > n {
                    return Err(PuzzleError::BadValue {
                        row,
                        col,
                        value,
                        max: n,
                    });
                }
            }
        }

        Ok(Self { cells, size })
    }

    #[must_use]
    pub fn empty(size: Size) -> Self {
        let n = usize::from(size);
        Self {
            cells: vec![vec![0; n]; n],
            size,
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub const fn n(&self) -> usize {
        self.size as usize
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> usize {
        self.cells[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: usize) {
        self.cells[row][col] = value;
    }

    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v != 0).count()
    }

    /// The filled cells as `(row, col, value)` triples.
    pub fn clues(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0)
                .map(move |(c, &v)| (r, c, v))
        })
    }

    /// Whether `value` may be placed at `(row, col)` without violating the
    /// row, column, block or (for `NonConsecutive`) adjacency rules against
    /// the currently filled cells.
    #[must_use]
    pub fn is_legal(&self, row: usize, col: usize, value: usize, variant: Variant) -> bool {
        let n = self.n();
        let block = self.size.block_size();

        if (0..n).any(|c| c != col && self.cells[row][c] == value) {
            return false;
        }
        if (0..n).any(|r| r != row && self.cells[r][col] == value) {
            return false;
        }

        let block_row = (row / block) * block;
        let block_col = (col / block) * block;
        for r in block_row..block_row + block {
            for c in block_col..block_col + block {
                if (r, c) != (row, col) && self.cells[r][c] == value {
                    return false;
                }
            }
        }

        if variant == Variant::NonConsecutive {
            let neighbours = [(0i64, 1i64), (0, -1), (1, 0), (-1, 0)];
            for (dr, dc) in neighbours {
                let (r, c) = (row as i64 + dr, col as i64 + dc);
                if r < 0 || c < 0 || r >= n as i64 || c >= n as i64 {
                    continue;
                }
                let neighbour = self.cells[r as usize][c as usize];
                if neighbour != 0 && neighbour.abs_diff(value) == 1 {
                    return false;
                }
            }
        }

        true
    }

    /// Whether every cell is filled and legal under the variant's rules.
    #[must_use]
    pub fn is_solved(&self, variant: Variant) -> bool {
        let n = self.n();
        (0..n).all(|r| {
            (0..n).all(|c| {
                let value = self.cells[r][c];
                value != 0 && self.is_legal(r, c, value, variant)
            })
        })
    }

    /// Whether `other` fills this board's clues in: every clue of `self`
    /// appears unchanged in `other`.
    #[must_use]
    pub fn is_completion_of(&self, other: &Board) -> bool {
        other
            .clues()
            .all(|(r, c, v)| self.cells[r][c] == v)
    }

    /// Reads a solved grid off a SAT model produced from this board's
    /// encoding.
    #[must_use]
    pub fn decode_model(size: Size, solutions: &Solutions) -> Self {
        let n = usize::from(size);
        let mut board = Self::empty(size);

        for row in 0..n {
            for col in 0..n {
                for value in 1..=n {
                    let var = CellVar::new(row, col, value).encode(size);
                    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
                    if solutions.check(var as i32) {
                        board.set(row, col, value);
                    }
                }
            }
        }

        board
    }
}

impl FromStr for Board {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = Vec::new();
        for (line_no, line) in s.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row: Vec<usize> = line
                .split_whitespace()
                .map(|token| {
                    token.parse().map_err(|_| PuzzleError::BadToken {
                        line: line_no + 1,
                        token: token.to_string(),
                    })
                })
                .collect::<Result<_, _>>()?;
            cells.push(row);
        }
        Self::new(cells)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let mut first = true;
            for value in row {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{value}")?;
                first = false;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_var_round_trip() {
        for size in [Size::Four, Size::Nine] {
            let n = usize::from(size);
            for row in 0..n {
                for col in 0..n {
                    for value in 1..=n {
                        let var = CellVar::new(row, col, value).encode(size);
                        assert!(var >= 1 && var <= n * n * n);
                        assert_eq!(
                            CellVar::decode(var, size),
                            CellVar::new(row, col, value)
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_mapping_matches_convention() {
        // r·N² + c·N + v with 0-based coordinates.
        assert_eq!(CellVar::new(0, 0, 1).encode(Size::Nine), 1);
        assert_eq!(CellVar::new(0, 0, 9).encode(Size::Nine), 9);
        assert_eq!(CellVar::new(8, 8, 9).encode(Size::Nine), 729);
        assert_eq!(CellVar::new(1, 2, 3).encode(Size::Nine), 102);
    }

    #[test]
    fn test_parse_display_round_trip() {
        let text = "0 2 0 0\n1 0 0 3\n0 0 4 0\n0 1 0 0\n";
        let board: Board = text.parse().unwrap();

        assert_eq!(board.size(), Size::Four);
        assert_eq!(board.get(1, 0), 1);
        assert_eq!(board.filled_count(), 5);
        assert_eq!(board.to_string(), text);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            "1 2 3\n4 5 6\n7 8 9\n".parse::<Board>(),
            Err(PuzzleError::BadSize(3))
        ));
        assert!(matches!(
            "0 2 0 x\n1 0 0 3\n0 0 4 0\n0 1 0 0\n".parse::<Board>(),
            Err(PuzzleError::BadToken { line: 1, .. })
        ));
        assert!(matches!(
            "0 2 0 9\n1 0 0 3\n0 0 4 0\n0 1 0 0\n".parse::<Board>(),
            Err(PuzzleError::BadValue { value: 9, .. })
        ));
    }

    #[test]
    fn test_is_legal_classic() {
        let mut board = Board::empty(Size::Four);
        board.set(0, 0, 1);

        assert!(!board.is_legal(0, 3, 1, Variant::Classic)); // same row
        assert!(!board.is_legal(3, 0, 1, Variant::Classic)); // same column
        assert!(!board.is_legal(1, 1, 1, Variant::Classic)); // same block
        assert!(board.is_legal(1, 2, 1, Variant::Classic));
        assert!(!board.is_legal(0, 1, 2, Variant::NonConsecutive)); // neighbour differs by 1
        assert!(board.is_legal(0, 1, 3, Variant::NonConsecutive));
    }

    #[test]
    fn test_is_solved() {
        let solved: Board = "1 2 3 4\n3 4 1 2\n2 1 4 3\n4 3 2 1\n".parse().unwrap();
        assert!(solved.is_solved(Variant::Classic));
        assert!(!solved.is_solved(Variant::NonConsecutive));

        let mut broken = solved.clone();
        broken.set(0, 0, 2);
        assert!(!broken.is_solved(Variant::Classic));
    }
}
