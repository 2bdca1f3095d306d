//! Subcommand bodies. Each loads its inputs, runs one library operation and
//! prints the result as text or JSON.

use std::path::Path;
use std::time::Instant;

use dense_linalg::matrix::mul::multiply_with;
use dense_linalg::{ComputeConfig, GaussSystem, LinalgError, Matrix, MulStrategy, SystemState};
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn emit<S: Serialize>(&self, value: &S, text: impl FnOnce() -> String) -> Result<(), LinalgError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }

    fn matrix(&self, m: &Matrix) -> Result<(), LinalgError> {
        self.emit(m, || m.to_string())
    }
}

#[derive(Serialize)]
struct ShowReport<'a> {
    rows: usize,
    cols: usize,
    nonzeros: usize,
    matrix: &'a Matrix,
}

#[derive(Serialize)]
struct DetReport {
    order: usize,
    det: f64,
}

#[derive(Serialize)]
struct SolveReport<'a> {
    order: usize,
    state: SystemState,
    x: &'a [f64],
}

fn load(path: &Path) -> Result<Matrix, LinalgError> {
    let m = Matrix::from_file(path)?;
    log::info!("loaded {}x{} matrix from {}", m.rows(), m.cols(), path.display());
    Ok(m)
}

pub fn show(file: &Path, out: Output) -> Result<(), LinalgError> {
    let m = load(file)?;
    let report = ShowReport {
        rows: m.rows(),
        cols: m.cols(),
        nonzeros: m.nonzeros(),
        matrix: &m,
    };
    out.emit(&report, || {
        format!(
            "{}x{} matrix, {} nonzeros\n{}",
            report.rows, report.cols, report.nonzeros, m
        )
    })
}

pub fn minor(file: &Path, row: usize, col: usize, out: Output) -> Result<(), LinalgError> {
    let m = load(file)?.minor(row, col)?;
    out.matrix(&m)
}

pub fn det(file: &Path, out: Output) -> Result<(), LinalgError> {
    let m = load(file)?;
    let start = Instant::now();
    let det = m.det()?;
    log::debug!("determinant of order {} in {:?}", m.rows(), start.elapsed());

    let report = DetReport {
        order: m.rows(),
        det,
    };
    out.emit(&report, || format!("{}\n", det))
}

pub fn add(a: &Path, b: &Path, out: Output) -> Result<(), LinalgError> {
    let sum = load(a)?.try_add(&load(b)?)?;
    out.matrix(&sum)
}

pub fn sub(a: &Path, b: &Path, out: Output) -> Result<(), LinalgError> {
    let diff = load(a)?.try_sub(&load(b)?)?;
    out.matrix(&diff)
}

pub fn multiply(a: &Path, b: &Path, strategy: MulStrategy, out: Output) -> Result<(), LinalgError> {
    let (a, b) = (load(a)?, load(b)?);
    let start = Instant::now();
    let product = multiply_with(&a, &b, strategy)?;
    log::info!("{:?} product computed in {:?}", strategy, start.elapsed());
    out.matrix(&product)
}

pub fn solve(
    a: &Path,
    b: &Path,
    config: &ComputeConfig,
    show_elimination: bool,
    out: Output,
) -> Result<(), LinalgError> {
    let matrix = load(a)?;
    let rhs = dense_linalg::io::read_vector(b)?;
    let mut system = GaussSystem::with_config(matrix, rhs, config)?;

    let start = Instant::now();
    system.eliminate()?;
    if show_elimination && !out.json {
        println!("Eliminated system:\n{}", system);
    }
    let x = system.solve()?.to_vec();
    log::info!("system of order {} solved in {:?}", system.order(), start.elapsed());

    let report = SolveReport {
        order: system.order(),
        state: system.state(),
        x: &x,
    };
    out.emit(&report, || {
        x.iter()
            .enumerate()
            .map(|(i, value)| format!("x{} = {:.6}\n", i + 1, value))
            .collect()
    })
}
