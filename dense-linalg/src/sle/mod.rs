//! # Linear system solver
//!
//! Solves `A·x = b` for a square `A` by Gauss elimination with partial
//! pivoting followed by back substitution.
//!
//! A [`GaussSystem`] session moves through
//! `Constructed -> Eliminated -> Solved`. Elimination overwrites `A` and `b`,
//! so a session handles one right-hand side; [`GaussSystem::reset`] installs a
//! fresh system.

use std::fmt;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ComputeConfig;
use crate::errors::LinalgError;
use crate::matrix::{Matrix, Scalar, cast};

/// What the solver needs from a coefficient matrix. Indices are 1-based.
pub trait SquareSystem<T: Scalar>: Sized {
    /// `(rows, cols)`.
    fn shape(&self) -> (usize, usize);

    fn entry(&self, i: usize, j: usize) -> T;

    fn entry_mut(&mut self, i: usize, j: usize) -> &mut T;

    /// Loads a coefficient matrix from a file.
    fn from_source(path: &Path) -> Result<Self, LinalgError>;

    fn order(&self) -> usize {
        self.shape().0
    }

    fn swap_rows(&mut self, r1: usize, r2: usize) {
        for j in 1..=self.shape().1 {
            let upper = self.entry(r1, j);
            *self.entry_mut(r1, j) = self.entry(r2, j);
            *self.entry_mut(r2, j) = upper;
        }
    }

    /// Zeroes column `i` below the pivot `A(i, i)`, applying each row factor to
    /// the same row of `rhs`. `parallel` is a hint that rows may be updated
    /// concurrently.
    fn eliminate_below(&mut self, i: usize, rhs: &mut [T], _parallel: bool) {
        let n = self.order();
        let pivot = self.entry(i, i);
        for j in i + 1..=n {
            let factor = self.entry(j, i) / pivot;
            *self.entry_mut(j, i) = T::zero();
            for k in i + 1..=n {
                let updated = self.entry(j, k) - factor * self.entry(i, k);
                *self.entry_mut(j, k) = updated;
            }
            rhs[j - 1] = rhs[j - 1] - factor * rhs[i - 1];
        }
    }
}

impl<T: Scalar> SquareSystem<T> for Matrix<T> {
    fn shape(&self) -> (usize, usize) {
        Matrix::shape(self)
    }

    fn entry(&self, i: usize, j: usize) -> T {
        self[(i, j)]
    }

    fn entry_mut(&mut self, i: usize, j: usize) -> &mut T {
        &mut self[(i, j)]
    }

    fn from_source(path: &Path) -> Result<Self, LinalgError> {
        crate::io::read_matrix(path)
    }

    fn swap_rows(&mut self, r1: usize, r2: usize) {
        Matrix::swap_rows(self, r1, r2);
    }

    fn eliminate_below(&mut self, i: usize, rhs: &mut [T], parallel: bool) {
        let n = self.cols();
        let (head, tail) = self.as_mut_slice().split_at_mut(i * n);
        let pivot_row: &[T] = &head[(i - 1) * n..];
        let pivot = pivot_row[i - 1];
        let (rhs_head, rhs_tail) = rhs.split_at_mut(i);
        let rhs_pivot = rhs_head[i - 1];

        let update = |(row, rhs_j): (&mut [T], &mut T)| {
            let factor = row[i - 1] / pivot;
            row[i - 1] = T::zero();
            for (a_jk, &a_ik) in row[i..].iter_mut().zip(&pivot_row[i..]) {
                *a_jk = *a_jk - factor * a_ik;
            }
            *rhs_j = *rhs_j - factor * rhs_pivot;
        };

        if parallel {
            tail.par_chunks_mut(n)
                .zip(rhs_tail.par_iter_mut())
                .for_each(update);
        } else {
            tail.chunks_mut(n).zip(rhs_tail.iter_mut()).for_each(update);
        }
    }
}

/// Lifecycle of a [`GaussSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemState {
    Constructed,
    Eliminated,
    Solved,
    /// Elimination stopped on a zero pivot; only [`GaussSystem::reset`] helps.
    Singular,
}

/// A square system `A·x = b` being solved by Gauss elimination.
#[derive(Debug, Clone)]
pub struct GaussSystem<M, T> {
    A: M,
    b: Vec<T>,
    x: Vec<T>,
    state: SystemState,
    config: ComputeConfig,
}

fn check_system<T: Scalar, M: SquareSystem<T>>(A: &M, b: &[T]) -> Result<usize, LinalgError> {
    let (rows, cols) = A.shape();
    if rows != cols {
        return Err(LinalgError::NotSquare { rows, cols });
    }
    if b.len() != rows {
        return Err(LinalgError::DimensionMismatch(format!(
            "Right-hand side has length {} but the system has order {}",
            b.len(),
            rows
        )));
    }
    Ok(rows)
}

impl<T: Scalar, M: SquareSystem<T>> GaussSystem<M, T> {
    /// Creates a session with the default [`ComputeConfig`].
    ///
    /// # Errors
    ///
    /// `NotSquare` if `A` is not square, `DimensionMismatch` if `b` does not
    /// match the order of `A`.
    pub fn new(A: M, b: Vec<T>) -> Result<Self, LinalgError> {
        Self::with_config(A, b, &ComputeConfig::default())
    }

    pub fn with_config(A: M, b: Vec<T>, config: &ComputeConfig) -> Result<Self, LinalgError> {
        let n = check_system(&A, &b)?;
        Ok(Self {
            A,
            b,
            x: vec![T::zero(); n],
            state: SystemState::Constructed,
            config: *config,
        })
    }

    /// Loads `A` with [`SquareSystem::from_source`] and `b` as a dense vector.
    pub fn from_files(
        a_path: impl AsRef<Path>,
        b_path: impl AsRef<Path>,
    ) -> Result<Self, LinalgError> {
        let A = M::from_source(a_path.as_ref())?;
        let b = crate::io::read_vector(b_path)?;
        Self::new(A, b)
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    pub fn order(&self) -> usize {
        self.b.len()
    }

    /// Coefficient matrix; upper triangular once eliminated.
    pub fn matrix(&self) -> &M {
        &self.A
    }

    /// Right-hand side; transformed alongside `A` by elimination.
    pub fn rhs(&self) -> &[T] {
        &self.b
    }

    /// The solution, available once the session is solved.
    pub fn solution(&self) -> Option<&[T]> {
        match self.state {
            SystemState::Solved => Some(&self.x),
            _ => None,
        }
    }

    pub fn config(&self) -> &ComputeConfig {
        &self.config
    }

    /// Replaces the right-hand side before elimination.
    pub fn set_rhs(&mut self, b: Vec<T>) -> Result<(), LinalgError> {
        if self.state != SystemState::Constructed {
            return Err(LinalgError::InvalidState(format!(
                "right-hand side can only be replaced before elimination (state {:?})",
                self.state
            )));
        }
        check_system(&self.A, &b)?;
        self.b = b;
        Ok(())
    }

    /// Installs a fresh system and returns to `Constructed`.
    pub fn reset(&mut self, A: M, b: Vec<T>) -> Result<(), LinalgError> {
        let n = check_system(&A, &b)?;
        self.A = A;
        self.b = b;
        self.x = vec![T::zero(); n];
        self.state = SystemState::Constructed;
        log::debug!("system reset to order {}", n);
        Ok(())
    }

    /// Largest-magnitude candidate in column `i` among rows `i..=n`.
    fn find_pivot(&self, i: usize) -> (usize, T) {
        (i + 1..=self.A.order()).fold((i, self.A.entry(i, i)), |best, j| {
            let candidate = self.A.entry(j, i);
            if candidate.abs() > best.1.abs() {
                (j, candidate)
            } else {
                best
            }
        })
    }

    /// Zero unless a positive `pivot_tolerance` is configured, in which case
    /// it scales with the order and the largest entry of `A`.
    fn singularity_threshold(&self, n: usize) -> T {
        if self.config.pivot_tolerance <= 0.0 {
            return T::zero();
        }
        let mut scale = T::zero();
        for i in 1..=n {
            for j in 1..=n {
                scale = scale.max(self.A.entry(i, j).abs());
            }
        }
        cast::<T>(self.config.pivot_tolerance) * cast(n as f64) * scale
    }

    /// Reduces `A` to upper triangular form, carrying `b` along.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the session is freshly constructed;
    /// `SingularMatrix` when no usable pivot exists for a column, after which
    /// the session is `Singular`.
    pub fn eliminate(&mut self) -> Result<(), LinalgError> {
        if self.state != SystemState::Constructed {
            return Err(LinalgError::InvalidState(format!(
                "elimination needs a freshly constructed system (state {:?})",
                self.state
            )));
        }

        let n = self.A.order();
        let threshold = self.singularity_threshold(n);
        for i in 1..=n {
            let (pivot_row, pivot) = self.find_pivot(i);
            log::trace!("column {}: pivot {} from row {}", i, pivot, pivot_row);

            // NaN pivots fail the comparison as well.
            if !pivot.is_finite() || !(pivot.abs() > threshold) {
                log::warn!(
                    "zero pivot in column {} (|{}| <= {})",
                    i,
                    pivot,
                    threshold
                );
                self.state = SystemState::Singular;
                return Err(LinalgError::SingularMatrix { column: i });
            }

            if pivot_row != i {
                log::debug!("swapping rows {} and {}", i, pivot_row);
                self.A.swap_rows(i, pivot_row);
                self.b.swap(i - 1, pivot_row - 1);
            }

            let parallel = n - i >= self.config.parallel_threshold;
            self.A.eliminate_below(i, &mut self.b, parallel);
        }

        self.state = SystemState::Eliminated;
        log::debug!("system of order {} eliminated", n);
        Ok(())
    }

    /// Back substitution on the eliminated system.
    ///
    /// A solved session returns its cached solution.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the session was not eliminated or is singular.
    pub fn solve(&mut self) -> Result<&[T], LinalgError> {
        match self.state {
            SystemState::Constructed => Err(LinalgError::InvalidState(
                "back substitution needs an eliminated system".to_string(),
            )),
            SystemState::Singular => Err(LinalgError::InvalidState(
                "system is singular; reset it with a fresh matrix".to_string(),
            )),
            SystemState::Solved => Ok(&self.x),
            SystemState::Eliminated => {
                self.back_substitute();
                self.state = SystemState::Solved;
                log::debug!("system of order {} solved", self.x.len());
                Ok(&self.x)
            }
        }
    }

    fn back_substitute(&mut self) {
        let n = self.A.order();
        for i in (1..=n).rev() {
            let known = (i + 1..=n).fold(T::zero(), |acc, j| {
                acc + self.A.entry(i, j) * self.x[j - 1]
            });
            self.x[i - 1] = (self.b[i - 1] - known) / self.A.entry(i, i);
        }
    }

    /// Runs [`GaussSystem::eliminate`] and [`GaussSystem::solve`].
    pub fn eliminate_and_solve(&mut self) -> Result<Vec<T>, LinalgError> {
        self.eliminate()?;
        Ok(self.solve()?.to_vec())
    }

    /// Gives back `(A, b, x)`; `x` is `Some` only for a solved session.
    pub fn into_parts(self) -> (M, Vec<T>, Option<Vec<T>>) {
        let x = match self.state {
            SystemState::Solved => Some(self.x),
            _ => None,
        };
        (self.A, self.b, x)
    }
}

impl<T: Scalar, M: SquareSystem<T>> fmt::Display for GaussSystem<M, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.A.order();
        for i in 1..=n {
            for j in 1..=n {
                write!(f, "{:>12.6} ", self.A.entry(i, j))?;
            }
            write!(f, "| x{} = {:>12.6}", i, self.b[i - 1])?;
            if self.state == SystemState::Solved {
                write!(f, "   [x{} = {:.6}]", i, self.x[i - 1])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One-shot solve of `A·x = b`; `A` is left untouched.
pub fn solve<T: Scalar>(A: &Matrix<T>, b: &[T]) -> Result<Vec<T>, LinalgError> {
    GaussSystem::new(A.clone(), b.to_vec())?.eliminate_and_solve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::mul::mat_vec;

    fn assert_close(got: &[f64], expected: &[f64], tolerance: f64) {
        assert_eq!(got.len(), expected.len());
        for (g, e) in got.iter().zip(expected) {
            assert!((g - e).abs() <= tolerance, "{:?} vs {:?}", got, expected);
        }
    }

    #[test]
    fn test_diagonal_system() -> Result<(), LinalgError> {
        let A = Matrix::from_rows(vec![vec![2.0, 0.0], vec![0.0, 2.0]])?;
        let mut system = GaussSystem::new(A, vec![4.0, 6.0])?;
        assert_eq!(system.state(), SystemState::Constructed);
        system.eliminate()?;
        assert_eq!(system.state(), SystemState::Eliminated);
        assert_eq!(system.solve()?, &[2.0, 3.0]);
        assert_eq!(system.state(), SystemState::Solved);
        assert_eq!(system.solution(), Some(&[2.0, 3.0][..]));
        Ok(())
    }

    #[test]
    fn test_needs_pivoting() -> Result<(), LinalgError> {
        // A(1,1) = 0 forces a row swap.
        let A = Matrix::from_rows(vec![
            vec![0.0, 2.0, 1.0],
            vec![1.0, 1.0, 1.0],
            vec![2.0, 1.0, 3.0],
        ])?;
        let x_true = [1.0, -2.0, 3.0];
        let b = mat_vec(&A, &x_true)?;
        let x = solve(&A, &b)?;
        assert_close(&x, &x_true, 1e-12);
        Ok(())
    }

    #[test]
    fn test_pivot_is_largest_in_column() -> Result<(), LinalgError> {
        let A = Matrix::from_rows(vec![
            vec![1.0, 5.0, 0.0],
            vec![3.0, 1.0, 1.0],
            vec![-7.0, 2.0, 1.0],
        ])?;
        let mut system = GaussSystem::new(A, vec![1.0, 2.0, 3.0])?;
        system.eliminate()?;
        // Row 3 holds the largest |A(j,1)| and is moved to the top.
        assert_eq!(system.matrix().row(1), &[-7.0, 2.0, 1.0]);
        assert_eq!(system.rhs()[0], 3.0);
        // Everything below the diagonal is zero after elimination.
        for i in 2..=3 {
            for j in 1..i {
                assert_eq!(system.matrix()[(i, j)], 0.0);
            }
        }
        Ok(())
    }

    #[test]
    fn test_last_column_fully_eliminated() -> Result<(), LinalgError> {
        let A: Matrix = Matrix::diagonally_dominant(4, 9);
        let x_true = [0.5, -1.0, 2.0, 4.0];
        let b = mat_vec(&A, &x_true)?;
        let mut system = GaussSystem::new(A, b)?;
        let x = system.eliminate_and_solve()?;
        assert_close(&x, &x_true, 1e-10);
        Ok(())
    }

    #[test]
    fn test_parallel_elimination_matches_sequential() -> Result<(), LinalgError> {
        let A: Matrix = Matrix::diagonally_dominant(12, 5);
        let b: Vec<f64> = crate::matrix::random::random_vector(12, 6);

        let sequential = ComputeConfig::try_with(64, usize::MAX, f64::EPSILON)?;
        let parallel = ComputeConfig::try_with(64, 0, f64::EPSILON)?;

        let x_seq = GaussSystem::with_config(A.clone(), b.clone(), &sequential)?.eliminate_and_solve()?;
        let x_par = GaussSystem::with_config(A, b, &parallel)?.eliminate_and_solve()?;
        assert_eq!(x_seq, x_par);
        Ok(())
    }

    #[test]
    fn test_singular_matrix() -> Result<(), LinalgError> {
        let A = Matrix::from_rows(vec![
            vec![2.0, 4.0, 6.0],
            vec![1.0, 2.0, 3.0],
            vec![0.0, 1.0, 1.0],
        ])?;
        let mut system = GaussSystem::new(A, vec![1.0, 1.0, 1.0])?;
        assert!(matches!(
            system.eliminate(),
            Err(LinalgError::SingularMatrix { column: 3 })
        ));
        assert_eq!(system.state(), SystemState::Singular);
        assert!(matches!(system.solve(), Err(LinalgError::InvalidState(_))));
        assert!(matches!(system.eliminate(), Err(LinalgError::InvalidState(_))));
        Ok(())
    }

    #[test]
    fn test_badly_scaled_system_is_not_singular() -> Result<(), LinalgError> {
        let A = Matrix::from_rows(vec![vec![1e10, 0.0], vec![0.0, 1e-7]])?;
        let mut system = GaussSystem::new(A, vec![1e10, 1e-7])?;
        assert_close(&system.eliminate_and_solve()?, &[1.0, 1.0], 1e-12);

        let A = Matrix::from_rows(vec![
            vec![1e12, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1e-12],
        ])?;
        assert_close(&solve(&A, &[2e12, 3.0, 4e-12])?, &[2.0, 3.0, 4.0], 1e-12);
        Ok(())
    }

    #[test]
    fn test_configured_tolerance_rejects_tiny_pivot() -> Result<(), LinalgError> {
        let A = Matrix::from_rows(vec![vec![1e10, 0.0], vec![0.0, 1e-7]])?;
        let strict = ComputeConfig::try_with(64, 64, 1e-12)?;
        let mut system = GaussSystem::with_config(A, vec![1.0, 1.0], &strict)?;
        assert!(matches!(
            system.eliminate(),
            Err(LinalgError::SingularMatrix { column: 2 })
        ));
        Ok(())
    }

    #[test]
    fn test_non_finite_pivot_is_singular() -> Result<(), LinalgError> {
        let A = Matrix::from_rows(vec![vec![f64::NAN, 1.0], vec![1.0, 1.0]])?;
        let mut system = GaussSystem::new(A, vec![1.0, 1.0])?;
        assert!(matches!(
            system.eliminate(),
            Err(LinalgError::SingularMatrix { column: 1 })
        ));
        Ok(())
    }

    #[test]
    fn test_zero_matrix_is_singular() -> Result<(), LinalgError> {
        let A: Matrix = Matrix::zeros(2, 2);
        let mut system = GaussSystem::new(A, vec![1.0, 1.0])?;
        assert!(matches!(
            system.eliminate(),
            Err(LinalgError::SingularMatrix { column: 1 })
        ));
        Ok(())
    }

    #[test]
    fn test_state_machine_guards() -> Result<(), LinalgError> {
        let A: Matrix = Matrix::identity(2);
        let mut system = GaussSystem::new(A, vec![1.0, 2.0])?;
        assert!(matches!(system.solve(), Err(LinalgError::InvalidState(_))));
        assert_eq!(system.solution(), None);

        system.set_rhs(vec![3.0, 4.0])?;
        system.eliminate()?;
        assert!(matches!(system.eliminate(), Err(LinalgError::InvalidState(_))));
        assert!(matches!(
            system.set_rhs(vec![0.0, 0.0]),
            Err(LinalgError::InvalidState(_))
        ));

        assert_eq!(system.solve()?, &[3.0, 4.0]);
        // Solving again returns the cached solution.
        assert_eq!(system.solve()?, &[3.0, 4.0]);
        Ok(())
    }

    #[test]
    fn test_reset_allows_new_rhs() -> Result<(), LinalgError> {
        let A = Matrix::from_rows(vec![vec![4.0, 1.0], vec![2.0, 3.0]])?;
        let mut system = GaussSystem::new(A.clone(), vec![5.0, 5.0])?;
        assert_close(&system.eliminate_and_solve()?, &[1.0, 1.0], 1e-12);

        system.reset(A, vec![9.0, 8.0])?;
        assert_eq!(system.state(), SystemState::Constructed);
        assert_close(&system.eliminate_and_solve()?, &[1.9, 1.4], 1e-12);
        Ok(())
    }

    #[test]
    fn test_construction_errors() {
        let rect: Matrix = Matrix::zeros(2, 3);
        assert!(matches!(
            GaussSystem::new(rect, vec![0.0, 0.0]),
            Err(LinalgError::NotSquare { rows: 2, cols: 3 })
        ));
        let square: Matrix = Matrix::identity(3);
        assert!(matches!(
            GaussSystem::new(square, vec![0.0, 0.0]),
            Err(LinalgError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_into_parts_and_display() -> Result<(), LinalgError> {
        let A = Matrix::from_rows(vec![vec![2.0, 0.0], vec![0.0, 2.0]])?;
        let mut system = GaussSystem::new(A, vec![4.0, 6.0])?;
        system.eliminate_and_solve()?;
        let shown = system.to_string();
        assert_eq!(shown.lines().count(), 2);
        assert!(shown.contains("| x2 ="));
        assert!(!shown.contains('*'));

        let (A, b, x) = system.into_parts();
        assert_eq!(A.diag()?, vec![2.0, 2.0]);
        assert_eq!(b, vec![4.0, 6.0]);
        assert_eq!(x, Some(vec![2.0, 3.0]));
        Ok(())
    }

    /// Same elimination through the trait's default methods.
    #[derive(Debug)]
    struct Nested(Vec<Vec<f64>>);

    impl SquareSystem<f64> for Nested {
        fn shape(&self) -> (usize, usize) {
            (self.0.len(), self.0.first().map_or(0, Vec::len))
        }

        fn entry(&self, i: usize, j: usize) -> f64 {
            self.0[i - 1][j - 1]
        }

        fn entry_mut(&mut self, i: usize, j: usize) -> &mut f64 {
            &mut self.0[i - 1][j - 1]
        }

        fn from_source(path: &Path) -> Result<Self, LinalgError> {
            let m: Matrix = crate::io::read_matrix(path)?;
            Ok(Nested(m.row_iter().map(<[f64]>::to_vec).collect()))
        }
    }

    #[test]
    fn test_generic_container() -> Result<(), LinalgError> {
        let A = Nested(vec![vec![0.0, 1.0], vec![3.0, 1.0]]);
        let mut system = GaussSystem::new(A, vec![2.0, 5.0])?;
        let x = system.eliminate_and_solve()?;
        assert_close(&x, &[1.0, 2.0], 1e-12);
        Ok(())
    }
}
