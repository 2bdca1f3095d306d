//! Seeded generators for test and benchmark inputs.

use rand::prelude::{Rng, SeedableRng, StdRng};

use crate::matrix::{Matrix, Scalar, cast};

/// Vector of `n` values drawn uniformly from `[-1, 1)`.
pub fn random_vector<T: Scalar>(n: usize, seed: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| cast(rng.random_range(-1.0..1.0))).collect()
}

impl<T: Scalar> Matrix<T> {
    /// `rows x cols` matrix with entries drawn uniformly from `[-1, 1)`.
    /// The same seed always yields the same matrix.
    pub fn random(rows: usize, cols: usize, seed: u64) -> Self {
        Matrix::from_parts(rows, cols, random_vector(rows * cols, seed))
    }

    /// Strictly diagonally dominant `n x n` matrix, hence non-singular and
    /// well conditioned for Gauss elimination.
    pub fn diagonally_dominant(n: usize, seed: u64) -> Self {
        let mut m = Self::random(n, n, seed);
        for i in 1..=n {
            let off_diagonal = m
                .row(i)
                .iter()
                .enumerate()
                .filter(|&(k, _)| k + 1 != i)
                .fold(T::zero(), |acc, (_, v)| acc + v.abs());
            m[(i, i)] = off_diagonal + T::one();
        }
        m
    }
}
