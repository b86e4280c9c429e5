//! Encoding and solving of Sudoku-style constraint puzzles via SAT.
//!
//! The `sat` module holds the solving engine: a CDCL solver with two-watched-
//! literal propagation, first-UIP clause learning and non-chronological
//! backjumping, plus a DPLL baseline, DIMACS I/O and optional preprocessing.
//! The `sudoku` module turns grids (classic Sudoku and the non-consecutive
//! TwoDoku variant) into CNF and back, and generates puzzle instances.

/// The SAT solving engine and its supporting types.
pub mod sat;

/// Puzzle boards, CNF encoding, generation and TwoDoku pairing.
pub mod sudoku;
