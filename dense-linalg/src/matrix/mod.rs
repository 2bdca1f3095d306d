//! # Matrix Module
//!
//! Provides the dense, row-major [`Matrix`] type together with the arithmetic,
//! product, minor and determinant operations built on top of it.
//!
//! Indices are 1-based throughout: `m[(1, 1)]` is the top-left entry.

pub mod det;
pub mod minor;
pub mod mul;
pub mod ops;
pub mod random;

use std::fmt;
use std::iter::Sum;
use std::ops::{Index, IndexMut};
use std::path::Path;
use std::str::FromStr;

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::errors::LinalgError;

/// Numeric element type a [`Matrix`] can hold.
pub trait Scalar:
    Float + Sum + FromStr + fmt::Debug + fmt::Display + Default + Send + Sync + 'static
{
}

impl<T> Scalar for T where
    T: Float + Sum + FromStr + fmt::Debug + fmt::Display + Default + Send + Sync + 'static
{
}

/// Converts an `f64` constant into the scalar type.
pub(crate) fn cast<T: Scalar>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::zero)
}

/// Entries with a smaller magnitude are printed as zero.
const DISPLAY_CUTOFF: f64 = 1.0e-14;

/// Dense matrix stored in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix<T>")]
pub struct Matrix<T = f64> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

/// Unchecked serialized form, validated on the way into [`Matrix`].
#[derive(Deserialize)]
struct RawMatrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> TryFrom<RawMatrix<T>> for Matrix<T> {
    type Error = LinalgError;

    fn try_from(raw: RawMatrix<T>) -> Result<Self, Self::Error> {
        check_len(raw.rows, raw.cols, raw.data.len())?;
        Ok(Matrix {
            rows: raw.rows,
            cols: raw.cols,
            data: raw.data,
        })
    }
}

fn check_len(rows: usize, cols: usize, len: usize) -> Result<(), LinalgError> {
    if rows.checked_mul(cols) != Some(len) {
        return Err(LinalgError::DimensionMismatch(format!(
            "A {}x{} matrix needs {} entries, got {}",
            rows,
            cols,
            rows.saturating_mul(cols),
            len
        )));
    }
    Ok(())
}

impl<T> Matrix<T> {
    /// Builds a matrix from parts whose lengths are already known to agree.
    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Matrix { rows, cols, data }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of stored entries, `rows * cols`.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        debug_assert!(
            i >= 1 && i <= self.rows && j >= 1 && j <= self.cols,
            "index ({}, {}) outside {}x{} matrix",
            i,
            j,
            self.rows,
            self.cols
        );
        (i - 1) * self.cols + (j - 1)
    }

    /// Reference to entry `(i, j)`, 1-based.
    ///
    /// The caller guarantees `1 <= i <= rows` and `1 <= j <= cols`; only debug
    /// builds check it.
    #[inline]
    pub fn at(&self, i: usize, j: usize) -> &T {
        &self.data[self.offset(i, j)]
    }

    /// Mutable reference to entry `(i, j)`, 1-based. Same contract as [`Matrix::at`].
    #[inline]
    pub fn at_mut(&mut self, i: usize, j: usize) -> &mut T {
        let offset = self.offset(i, j);
        &mut self.data[offset]
    }

    /// Checked read of entry `(i, j)`, 1-based.
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i == 0 || i > self.rows || j == 0 || j > self.cols {
            return None;
        }
        self.data.get((i - 1) * self.cols + (j - 1))
    }

    /// The whole buffer in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Row `i` (1-based) as a slice.
    pub fn row(&self, i: usize) -> &[T] {
        debug_assert!(i >= 1 && i <= self.rows);
        &self.data[(i - 1) * self.cols..i * self.cols]
    }

    /// Iterates over the rows, top to bottom.
    pub fn row_iter(&self) -> impl Iterator<Item = &[T]> + '_ {
        (1..=self.rows).map(move |i| self.row(i))
    }

    /// Read-only row-major traversal yielding `(i, j, &value)` with 1-based indices.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        let cols = self.cols;
        self.data
            .iter()
            .enumerate()
            .map(move |(k, value)| (k / cols + 1, k % cols + 1, value))
    }

    /// Swaps rows `r1` and `r2` (1-based).
    pub fn swap_rows(&mut self, r1: usize, r2: usize) {
        if r1 == r2 {
            return;
        }
        let (lo, hi) = (r1.min(r2), r1.max(r2));
        let cols = self.cols;
        let (head, tail) = self.data.split_at_mut((hi - 1) * cols);
        head[(lo - 1) * cols..lo * cols].swap_with_slice(&mut tail[..cols]);
    }

    /// Consumes the matrix, returning its row-major buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: Scalar> Matrix<T> {
    /// Creates a `rows x cols` matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    /// Creates the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut identity = Self::zeros(n, n);
        for i in 1..=n {
            identity[(i, i)] = T::one();
        }
        identity
    }

    /// Creates a matrix from nested rows.
    ///
    /// The row count is the outer length and the column count is the length of
    /// the first row.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::DimensionMismatch` if the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, LinalgError> {
        let n = rows.len();
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(LinalgError::DimensionMismatch(format!(
                    "Row {} has length {} but expected {}",
                    i + 1,
                    row.len(),
                    cols
                )));
            }
            data.extend(row);
        }
        Ok(Self::from_parts(n, cols, data))
    }

    /// Creates a matrix from a row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::DimensionMismatch` if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, LinalgError> {
        check_len(rows, cols, data.len())?;
        Ok(Self::from_parts(rows, cols, data))
    }

    /// Reads a matrix from a text file; `.mtx` files use the coordinate format,
    /// everything else the dense format. See [`crate::io`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LinalgError> {
        crate::io::read_matrix(path)
    }

    /// Number of entries different from zero, counted on demand.
    pub fn nonzeros(&self) -> usize {
        self.data.iter().filter(|v| !v.is_zero()).count()
    }

    /// Main diagonal of a square matrix.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::NotSquare` for a rectangular matrix.
    pub fn diag(&self) -> Result<Vec<T>, LinalgError> {
        if !self.is_square() {
            return Err(LinalgError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok((1..=self.rows).map(|i| self[(i, i)]).collect())
    }

    /// Largest absolute entry, zero for an empty matrix.
    pub fn max_abs(&self) -> T {
        self.data
            .iter()
            .fold(T::zero(), |acc, value| acc.max(value.abs()))
    }

    /// `true` when both matrices have the same shape and every pair of
    /// entries differs by at most `tolerance`.
    pub fn approx_eq(&self, other: &Matrix<T>, tolerance: T) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (*a - *b).abs() <= tolerance)
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        self.at(i, j)
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        self.at_mut(i, j)
    }
}

impl<T: Scalar> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cutoff: T = cast(DISPLAY_CUTOFF);
        for row in self.row_iter() {
            for &value in row {
                let shown = if value.abs() > cutoff { value } else { T::zero() };
                write!(f, "{:>12.6} ", shown)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
