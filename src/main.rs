//! Command-line entry point.
//!
//! Dispatches the `file`, `text`, `sudoku`, `generate`, `batch` and
//! `completions` subcommands, reports outcome, statistics and memory usage,
//! and optionally verifies models against the input formula.

use clap::{CommandFactory, Parser};
use log::{info, warn};
use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats as memory_stats};
use walkdir::WalkDir;

use twodoku_sat::sat::cdcl::Cdcl;
use twodoku_sat::sat::cnf::Cnf;
use twodoku_sat::sat::dimacs::parse_file;
use twodoku_sat::sat::dpll::Dpll;
use twodoku_sat::sat::literal::PackedLiteral;
use twodoku_sat::sat::preprocessing::{Preprocessor, PureLiteralAssignment};
use twodoku_sat::sat::solver::{Outcome, Solver, SolverStats};
use twodoku_sat::sudoku::board::{Board, Variant};
use twodoku_sat::sudoku::encode::to_cnf;
use twodoku_sat::sudoku::twodoku::{Overlap, TwoDoku};

mod command_line;
use command_line::cli::{Cli, Commands, CommonOptions, SolverType};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

type DefaultCnf = Cnf<PackedLiteral>;

fn main() {
    let cli = Cli::parse();

    let debug = cli.common.debug
        || match &cli.command {
            Some(
                Commands::File { common, .. }
                | Commands::Text { common, .. }
                | Commands::Sudoku { common, .. }
                | Commands::Batch { common, .. },
            ) => common.debug,
            _ => false,
        };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if debug { "debug" } else { "warn" }),
    )
    .init();

    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    // A bare path without a subcommand is shorthand for `file --path`.
    if let Some(path) = cli.path.clone() {
        if cli.command.is_none() {
            return run_file(&path, &cli.common);
        }
    }

    match cli.command {
        Some(Commands::File { path, common }) => run_file(&path, &common),
        Some(Commands::Text { input, common }) => run_text(&input, &common),
        Some(Commands::Sudoku {
            path,
            variant,
            export_dimacs,
            common,
        }) => run_sudoku(&path, variant.into(), export_dimacs, &common),
        Some(Commands::Generate {
            filled_a,
            filled_b,
            overlap,
            variant,
            seed,
            out_dir,
            export_dimacs,
        }) => run_generate(
            filled_a,
            filled_b,
            overlap,
            variant.into(),
            seed,
            &out_dir,
            export_dimacs,
        ),
        Some(Commands::Batch { dir, out, common }) => run_batch(&dir, &out, &common),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "twodoku-sat",
                &mut std::io::stdout(),
            );
            Ok(())
        }
        None => {
            eprintln!("No command provided. Use --help for more information.");
            std::process::exit(1);
        }
    }
}

fn run_file(path: &Path, common: &CommonOptions) -> Result<(), Box<dyn Error>> {
    let started = Instant::now();
    let cnf: DefaultCnf = parse_file(path)?;
    let parse_time = started.elapsed();

    println!("Solving: {}", path.display());
    solve_and_report(cnf, common, parse_time);
    Ok(())
}

fn run_text(input: &str, common: &CommonOptions) -> Result<(), Box<dyn Error>> {
    let started = Instant::now();
    let clauses = parse_textual_cnf(input)?;
    let cnf = DefaultCnf::from_clauses(clauses)?;
    let parse_time = started.elapsed();

    solve_and_report(cnf, common, parse_time);
    Ok(())
}

fn run_sudoku(
    path: &Path,
    variant: Variant,
    export_dimacs: bool,
    common: &CommonOptions,
) -> Result<(), Box<dyn Error>> {
    let started = Instant::now();
    let board: Board = fs::read_to_string(path)?.parse()?;
    println!("Parsed puzzle:\n{board}");

    let cnf: DefaultCnf = to_cnf(&board, variant);
    let parse_time = started.elapsed();

    if export_dimacs {
        let dimacs_path = path.with_extension("cnf");
        fs::write(&dimacs_path, cnf.to_string())?;
        println!("DIMACS written to: {}", dimacs_path.display());
    }

    let outcome = solve_and_report(cnf, common, parse_time);

    match outcome.solutions() {
        Some(solutions) => {
            let solved = Board::decode_model(board.size(), solutions);
            println!("Solution:\n{solved}");
        }
        None => println!("No solution found"),
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_generate(
    filled_a: f64,
    filled_b: f64,
    overlap: usize,
    variant: Variant,
    seed: Option<u64>,
    out_dir: &Path,
    export_dimacs: bool,
) -> Result<(), Box<dyn Error>> {
    let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let overlap = Overlap::try_from(overlap)?;

    let pair = TwoDoku::generate(filled_a, filled_b, overlap, variant, &mut rng)?;
    debug_assert!(pair.is_consistent());

    fs::create_dir_all(out_dir)?;
    for (name, board) in [("grid_a", &pair.first), ("grid_b", &pair.second)] {
        let grid_path = out_dir.join(format!("{name}.txt"));
        fs::write(&grid_path, board.to_string())?;
        println!("Wrote {}", grid_path.display());

        if export_dimacs {
            let cnf: DefaultCnf = to_cnf(board, variant);
            let cnf_path = out_dir.join(format!("{name}.cnf"));
            fs::write(&cnf_path, cnf.to_string())?;
            println!("Wrote {}", cnf_path.display());
        }
    }

    println!(
        "Generated a pair with {} shared cells ({} and {} clues)",
        overlap.cell_count(),
        pair.first.filled_count(),
        pair.second.filled_count(),
    );
    Ok(())
}

fn run_batch(dir: &Path, out: &Path, common: &CommonOptions) -> Result<(), Box<dyn Error>> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "cnf"))
        .collect();
    paths.sort();

    let mut csv = fs::File::create(out)?;
    writeln!(
        csv,
        "file,status,variables,clauses,decisions,conflicts,propagations,learnt,time_sec"
    )?;

    for path in &paths {
        let cnf: DefaultCnf = match parse_file(path) {
            Ok(cnf) => cnf,
            Err(error) => {
                warn!("skipping {}: {error}", path.display());
                continue;
            }
        };
        let (num_vars, num_clauses) = (cnf.num_vars, cnf.len());

        info!("solving {}", path.display());
        let (outcome, elapsed, stats) = solve_cnf(cnf, common);

        writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{:.6}",
            path.display(),
            outcome,
            num_vars,
            num_clauses,
            stats.decisions,
            stats.conflicts,
            stats.propagations,
            stats.learnt_clauses,
            elapsed.as_secs_f64(),
        )?;
    }

    println!("Wrote {} results to {}", paths.len(), out.display());
    Ok(())
}

/// Runs the configured solver on a formula.
fn solve_cnf(cnf: DefaultCnf, common: &CommonOptions) -> (Outcome, Duration, SolverStats) {
    let cnf = if common.preprocess {
        PureLiteralAssignment.preprocess(cnf)
    } else {
        cnf
    };
    let limits = common.limits();

    let started = Instant::now();
    let (outcome, stats) = match common.solver {
        SolverType::Cdcl => {
            let mut solver: Cdcl<PackedLiteral> = Cdcl::with_limits(cnf, limits);
            (solver.solve(), solver.stats())
        }
        SolverType::Dpll => {
            let mut solver: Dpll<PackedLiteral> = Dpll::with_limits(cnf, limits);
            (solver.solve(), solver.stats())
        }
    };

    (outcome, started.elapsed(), stats)
}

/// Solves, optionally verifies, and prints the stats table.
fn solve_and_report(cnf: DefaultCnf, common: &CommonOptions, parse_time: Duration) -> Outcome {
    let original = cnf.clone();
    let (outcome, elapsed, stats) = solve_cnf(cnf, common);

    if common.verify {
        match outcome.solutions() {
            Some(solutions) => {
                let ok = original.verify(solutions);
                println!("Verified: {ok}");
                assert!(ok, "model failed verification");
            }
            None => println!("Nothing to verify: {outcome}"),
        }
    }

    if common.stats {
        print_stats(parse_time, elapsed, &original, &stats, common, &outcome);
    }

    match outcome {
        Outcome::Sat(_) => println!("\nSATISFIABLE"),
        Outcome::Unsat => println!("\nUNSATISFIABLE"),
        Outcome::Unknown => println!("\nUNKNOWN"),
    }

    outcome
}

/// Parses clauses from plain text: one clause per line, space-separated
/// literals, 0 terminating each clause. `c` and `p` lines are ignored.
fn parse_textual_cnf(input: &str) -> Result<Vec<Vec<i32>>, Box<dyn Error>> {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with('c') && !trimmed.starts_with('p')
        })
        .map(|line| {
            line.split_whitespace()
                .map(str::parse::<i32>)
                .take_while(|res| *res != Ok(0))
                .map(|res| res.map_err(|e| -> Box<dyn Error> { format!("bad literal: {e}").into() }))
                .collect()
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn read_memory_mib() -> Option<(f64, f64)> {
    epoch::advance().ok()?;
    let allocated = memory_stats::allocated::mib().ok()?.read().ok()?;
    let resident = memory_stats::resident::mib().ok()?.read().ok()?;
    Some((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

fn stat_line_with_rate(label: &str, value: u64, elapsed: f64) {
    #[allow(clippy::cast_precision_loss)]
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    cnf: &DefaultCnf,
    stats: &SolverStats,
    common: &CommonOptions,
    outcome: &Outcome,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars);
    stat_line("Clauses (original)", cnf.non_learnt_idx);

    println!("========================[ Search Statistics ]========================");
    stat_line("Learnt clauses", stats.learnt_clauses);
    stat_line_with_rate("Conflicts", stats.conflicts, elapsed_secs);
    stat_line_with_rate("Decisions", stats.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", stats.propagations, elapsed_secs);
    if let Some((allocated, resident)) = read_memory_mib() {
        stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
        stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    }
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");

    if common.print_solution {
        if let Some(solutions) = outcome.solutions() {
            println!("Solutions: {solutions}");
        }
    }
}
