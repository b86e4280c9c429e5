use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use twodoku_sat::sat::cdcl::Cdcl;
use twodoku_sat::sat::cnf::Cnf;
use twodoku_sat::sat::dpll::Dpll;
use twodoku_sat::sat::literal::PackedLiteral;
use twodoku_sat::sat::solver::Solver;
use twodoku_sat::sudoku::board::{Board, Size, Variant};
use twodoku_sat::sudoku::encode::to_cnf;
use twodoku_sat::sudoku::twodoku::{Overlap, TwoDoku};

const CLASSIC_NINE: &str = "5 3 0 0 7 0 0 0 0\n\
                            6 0 0 1 9 5 0 0 0\n\
                            0 9 8 0 0 0 0 6 0\n\
                            8 0 0 0 6 0 0 0 3\n\
                            4 0 0 8 0 3 0 0 1\n\
                            7 0 0 0 2 0 0 0 6\n\
                            0 6 0 0 0 0 2 8 0\n\
                            0 0 0 4 1 9 0 0 5\n\
                            0 0 0 0 8 0 0 7 9\n";

fn classic_cnf() -> Cnf<PackedLiteral> {
    let board: Board = CLASSIC_NINE.parse().unwrap();
    to_cnf(&board, Variant::Classic)
}

fn bench_cdcl_classic(c: &mut Criterion) {
    let cnf = classic_cnf();
    c.bench_function("cdcl classic 9x9", |b| {
        b.iter(|| {
            let mut solver: Cdcl<PackedLiteral> = Cdcl::new(black_box(cnf.clone()));
            black_box(solver.solve())
        });
    });
}

fn bench_dpll_classic(c: &mut Criterion) {
    let cnf = classic_cnf();
    c.bench_function("dpll classic 9x9", |b| {
        b.iter(|| {
            let mut solver: Dpll<PackedLiteral> = Dpll::new(black_box(cnf.clone()));
            black_box(solver.solve())
        });
    });
}

fn bench_cdcl_non_consecutive(c: &mut Criterion) {
    let board = Board::empty(Size::Nine);
    let cnf: Cnf<PackedLiteral> = to_cnf(&board, Variant::NonConsecutive);
    c.bench_function("cdcl non-consecutive empty 9x9", |b| {
        b.iter(|| {
            let mut solver: Cdcl<PackedLiteral> = Cdcl::new(black_box(cnf.clone()));
            black_box(solver.solve())
        });
    });
}

fn bench_encode(c: &mut Criterion) {
    let board: Board = CLASSIC_NINE.parse().unwrap();
    c.bench_function("encode 9x9 to cnf", |b| {
        b.iter(|| black_box(to_cnf::<PackedLiteral>(black_box(&board), Variant::Classic)));
    });
}

fn bench_generate_pair(c: &mut Criterion) {
    c.bench_function("generate twodoku pair", |b| {
        let mut rng = fastrand::Rng::with_seed(17);
        b.iter(|| {
            black_box(
                TwoDoku::generate(0.4, 0.4, Overlap::OneBlock, Variant::Classic, &mut rng)
                    .unwrap(),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_cdcl_classic,
    bench_dpll_classic,
    bench_cdcl_non_consecutive,
    bench_encode,
    bench_generate_pair
);
criterion_main!(benches);
