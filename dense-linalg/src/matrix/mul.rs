//! Matrix products: the standard row-by-column product, the Strassen
//! divide-and-conquer product and the matrix-vector product.

use rayon::prelude::*;

use crate::errors::LinalgError;
use crate::matrix::ops::zip_map;
use crate::matrix::{Matrix, Scalar};

/// Which multiplication algorithm [`multiply_with`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MulStrategy {
    /// Row-by-column product, O(n³).
    Standard,
    /// Strassen recursion down to blocks of order `leaf_size`, O(n^2.807).
    Strassen { leaf_size: usize },
}

fn ensure_conformant<T>(a: &Matrix<T>, b: &Matrix<T>) -> Result<(), LinalgError> {
    if a.cols() != b.rows() {
        return Err(LinalgError::DimensionMismatch(format!(
            "Inner dimensions must match for matrix multiplication ({}x{} vs {}x{})",
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    Ok(())
}

/// Computes the product `C = AB` with the standard algorithm.
///
/// Rows of `C` are computed in parallel; each cell is an ordered reduction
/// over the shared dimension.
///
/// # Errors
///
/// Returns `LinalgError::DimensionMismatch` if `A.cols != B.rows`.
pub fn multiply<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
    ensure_conformant(a, b)?;
    Ok(multiply_unchecked(a, b))
}

fn multiply_unchecked<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>) -> Matrix<T> {
    let (n, m, p) = (a.rows(), a.cols(), b.cols());
    let mut c = Matrix::zeros(n, p);
    if p == 0 {
        return c;
    }

    let (a_data, b_data) = (a.as_slice(), b.as_slice());
    c.as_mut_slice()
        .par_chunks_mut(p)
        .enumerate()
        .for_each(|(i, c_row)| {
            let a_row = &a_data[i * m..(i + 1) * m];
            for (j, cell) in c_row.iter_mut().enumerate() {
                *cell = a_row
                    .iter()
                    .enumerate()
                    .fold(T::zero(), |acc, (k, &a_ik)| acc + a_ik * b_data[k * p + j]);
            }
        });
    c
}

/// Computes the product `C = AB` with Strassen's algorithm.
///
/// Both operands are zero-padded to a square order that halves evenly down to
/// blocks of order `<= leaf_size`; those blocks are multiplied directly. The
/// result is cropped back to `A.rows x B.cols`. A `leaf_size` of zero acts
/// as one.
///
/// # Errors
///
/// Returns `LinalgError::DimensionMismatch` if `A.cols != B.rows`.
pub fn strassen<T: Scalar>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    leaf_size: usize,
) -> Result<Matrix<T>, LinalgError> {
    ensure_conformant(a, b)?;
    let (n, m, p) = (a.rows(), a.cols(), b.cols());
    if n == 0 || m == 0 || p == 0 {
        return Ok(Matrix::zeros(n, p));
    }

    let leaf = leaf_size.max(1);
    let order = padded_order(n.max(m).max(p), leaf);
    log::trace!(
        "strassen: {}x{} * {}x{} padded to order {} (leaf {})",
        n,
        m,
        m,
        p,
        order,
        leaf
    );

    let c = strassen_square(&pad(a, order), &pad(b, order), leaf);
    Ok(crop(&c, n, p))
}

/// Smallest order `q * 2^k >= dim` where halving `k` times gives `q <= leaf`.
pub(crate) fn padded_order(dim: usize, leaf: usize) -> usize {
    let mut block = dim;
    let mut halvings = 0;
    while block > leaf {
        block = block.div_ceil(2);
        halvings += 1;
    }
    block << halvings
}

fn pad<T: Scalar>(src: &Matrix<T>, order: usize) -> Matrix<T> {
    if src.shape() == (order, order) {
        return src.clone();
    }
    let mut out = Matrix::zeros(order, order);
    for (i, row) in src.row_iter().enumerate() {
        out.as_mut_slice()[i * order..i * order + row.len()].copy_from_slice(row);
    }
    out
}

fn crop<T: Scalar>(src: &Matrix<T>, rows: usize, cols: usize) -> Matrix<T> {
    if src.shape() == (rows, cols) {
        return src.clone();
    }
    let data = (1..=rows)
        .flat_map(|i| src.row(i)[..cols].iter().copied())
        .collect();
    Matrix::from_parts(rows, cols, data)
}

/// Square block of order `h` whose top-left corner is at zero-based `(r0, c0)`.
fn block<T: Scalar>(src: &Matrix<T>, r0: usize, c0: usize, h: usize) -> Matrix<T> {
    let data = (r0 + 1..=r0 + h)
        .flat_map(|i| src.row(i)[c0..c0 + h].iter().copied())
        .collect();
    Matrix::from_parts(h, h, data)
}

fn quadrants<T: Scalar>(src: &Matrix<T>, h: usize) -> [Matrix<T>; 4] {
    [
        block(src, 0, 0, h),
        block(src, 0, h, h),
        block(src, h, 0, h),
        block(src, h, h, h),
    ]
}

fn assemble<T: Scalar>(
    c11: &Matrix<T>,
    c12: &Matrix<T>,
    c21: &Matrix<T>,
    c22: &Matrix<T>,
) -> Matrix<T> {
    let h = c11.rows();
    let mut data = Vec::with_capacity(4 * h * h);
    for (left, right) in [(c11, c12), (c21, c22)] {
        for i in 1..=h {
            data.extend_from_slice(left.row(i));
            data.extend_from_slice(right.row(i));
        }
    }
    Matrix::from_parts(2 * h, 2 * h, data)
}

fn plus<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>) -> Matrix<T> {
    zip_map(a, b, |x, y| x + y)
}

fn minus<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>) -> Matrix<T> {
    zip_map(a, b, |x, y| x - y)
}

fn strassen_square<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>, leaf: usize) -> Matrix<T> {
    let n = a.rows();
    if n <= leaf || n % 2 == 1 {
        return multiply_unchecked(a, b);
    }

    let h = n / 2;
    let [a11, a12, a21, a22] = quadrants(a, h);
    let [b11, b12, b21, b22] = quadrants(b, h);

    let m1 = strassen_square(&plus(&a11, &a22), &plus(&b11, &b22), leaf);
    let m2 = strassen_square(&plus(&a21, &a22), &b11, leaf);
    let m3 = strassen_square(&a11, &minus(&b12, &b22), leaf);
    let m4 = strassen_square(&a22, &minus(&b21, &b11), leaf);
    let m5 = strassen_square(&plus(&a11, &a12), &b22, leaf);
    let m6 = strassen_square(&minus(&a21, &a11), &plus(&b11, &b12), leaf);
    let m7 = strassen_square(&minus(&a12, &a22), &plus(&b21, &b22), leaf);

    let c11 = plus(&minus(&plus(&m1, &m4), &m5), &m7);
    let c12 = plus(&m3, &m5);
    let c21 = plus(&m2, &m4);
    let c22 = plus(&plus(&minus(&m1, &m2), &m3), &m6);

    assemble(&c11, &c12, &c21, &c22)
}

/// Multiplies with the chosen strategy.
pub fn multiply_with<T: Scalar>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    strategy: MulStrategy,
) -> Result<Matrix<T>, LinalgError> {
    match strategy {
        MulStrategy::Standard => multiply(a, b),
        MulStrategy::Strassen { leaf_size } => strassen(a, b, leaf_size),
    }
}

/// A·x where A is an m×n matrix and x is a length–n vector.
/// Returns an m‐vector.
pub fn mat_vec<T: Scalar>(a: &Matrix<T>, x: &[T]) -> Result<Vec<T>, LinalgError> {
    if a.cols() != x.len() {
        return Err(LinalgError::DimensionMismatch(format!(
            "Matrix columns ({}) must match vector length ({})",
            a.cols(),
            x.len()
        )));
    }
    Ok((1..=a.rows())
        .into_par_iter()
        .map(|i| a.row(i).iter().zip(x).map(|(&a_ij, &x_j)| a_ij * x_j).sum())
        .collect())
}

impl<T: Scalar> Matrix<T> {
    /// Method form of [`multiply`].
    pub fn matmul(&self, rhs: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
        multiply(self, rhs)
    }

    /// Method form of [`strassen`].
    pub fn strassen(&self, rhs: &Matrix<T>, leaf_size: usize) -> Result<Matrix<T>, LinalgError> {
        strassen(self, rhs, leaf_size)
    }
}
