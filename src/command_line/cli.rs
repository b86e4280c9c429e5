//! Command-line definitions, parsed with `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use twodoku_sat::sat::solver::Limits;
use twodoku_sat::sudoku::board::Variant;

#[derive(Parser, Debug)]
#[command(
    name = "twodoku-sat",
    version,
    about = "Encode and solve Sudoku and non-consecutive TwoDoku puzzles via CDCL SAT"
)]
pub(crate) struct Cli {
    /// An optional global path argument. If provided without a subcommand,
    /// it's treated as the path to a DIMACS .cnf file to solve.
    #[arg(global = true)]
    pub path: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula provided as plain text.
    Text {
        /// Literal CNF input as a string (e.g. "1 -2 0\n2 3 0").
        /// Each line represents a clause, literals are space-separated, and 0 terminates a clause.
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a puzzle file: parse the grid, encode it to CNF, solve, decode.
    Sudoku {
        /// Path to the puzzle file: one line per row, whitespace-separated
        /// values, 0 for an empty cell.
        #[arg(long)]
        path: PathBuf,

        /// Rule set the puzzle is played under.
        #[arg(long, value_enum, default_value_t = VariantArg::Classic)]
        variant: VariantArg,

        /// Print the generated DIMACS CNF and save it next to the puzzle.
        #[arg(short, long, default_value_t = false)]
        export_dimacs: bool,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate a TwoDoku pair and write the grids (and optionally their
    /// DIMACS encodings) to a directory.
    Generate {
        /// Fraction of cells kept as clues in the first grid.
        #[arg(long, default_value_t = 0.4)]
        filled_a: f64,

        /// Fraction of cells kept as clues in the second grid.
        #[arg(long, default_value_t = 0.4)]
        filled_b: f64,

        /// Number of shared cells between the grids: 0, 9, 18, 27 or 36.
        #[arg(long, default_value_t = 9)]
        overlap: usize,

        /// Rule set for both grids.
        #[arg(long, value_enum, default_value_t = VariantArg::NonConsecutive)]
        variant: VariantArg,

        /// Seed for reproducible generation; random when omitted.
        #[arg(long)]
        seed: Option<u64>,

        /// Directory the grid files are written to.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Also write each grid's CNF encoding in DIMACS format.
        #[arg(short, long, default_value_t = false)]
        export_dimacs: bool,
    },

    /// Solve every .cnf file under a directory and write a CSV of results.
    Batch {
        /// Directory searched recursively for .cnf files.
        #[arg(long)]
        dir: PathBuf,

        /// Path of the CSV report to write.
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by every solving command.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CommonOptions {
    /// Enable debug output, providing more verbose logging during the solving process.
    #[arg(short, long, default_value_t = false)]
    pub debug: bool,

    /// Check the found model against the original CNF after solving.
    #[arg(short, long, default_value_t = true)]
    pub verify: bool,

    /// Print performance and problem statistics after solving.
    #[arg(short, long, default_value_t = true)]
    pub stats: bool,

    /// Print the satisfying assignment (model) if the formula is satisfiable.
    #[arg(short, long, default_value_t = false)]
    pub print_solution: bool,

    /// SAT solving algorithm to use.
    #[arg(long, value_enum, default_value_t = SolverType::Cdcl)]
    pub solver: SolverType,

    /// Run the pure-literal pre-pass before solving.
    #[arg(long, default_value_t = false)]
    pub preprocess: bool,

    /// Stop with UNKNOWN after this many conflicts.
    #[arg(long)]
    pub max_conflicts: Option<u64>,

    /// Stop with UNKNOWN after this many decisions.
    #[arg(long)]
    pub max_decisions: Option<u64>,

    /// Stop with UNKNOWN after this many seconds of search.
    #[arg(long)]
    pub time_limit: Option<f64>,
}

impl CommonOptions {
    pub(crate) fn limits(&self) -> Limits {
        Limits {
            max_conflicts: self.max_conflicts,
            max_decisions: self.max_decisions,
            max_time: self.time_limit.map(Duration::from_secs_f64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum SolverType {
    #[default]
    Cdcl,
    Dpll,
}

impl fmt::Display for SolverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cdcl => write!(f, "cdcl"),
            Self::Dpll => write!(f, "dpll"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum VariantArg {
    #[default]
    Classic,
    NonConsecutive,
}

impl fmt::Display for VariantArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classic => write!(f, "classic"),
            Self::NonConsecutive => write!(f, "non-consecutive"),
        }
    }
}

impl From<VariantArg> for Variant {
    fn from(variant: VariantArg) -> Self {
        match variant {
            VariantArg::Classic => Self::Classic,
            VariantArg::NonConsecutive => Self::NonConsecutive,
        }
    }
}
