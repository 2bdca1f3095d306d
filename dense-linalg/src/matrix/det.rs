//! Determinant by recursive cofactor expansion.
//!
//! The cost is O(n!), which makes this a reference for small matrices rather
//! than a fast path.

use crate::errors::LinalgError;
use crate::matrix::minor::minor_unchecked;
use crate::matrix::{Matrix, Scalar};

fn ensure_square<T>(a: &Matrix<T>) -> Result<usize, LinalgError> {
    if !a.is_square() {
        return Err(LinalgError::NotSquare {
            rows: a.rows(),
            cols: a.cols(),
        });
    }
    Ok(a.rows())
}

/// Computes `det(A)`, expanding along the first row for orders of three and up.
///
/// The empty matrix has determinant one.
///
/// # Errors
///
/// Returns `LinalgError::NotSquare` unless `rows == cols`.
pub fn determinant<T: Scalar>(a: &Matrix<T>) -> Result<T, LinalgError> {
    ensure_square(a)?;
    Ok(cofactor_det(a))
}

/// Computes `det(A)` with the outermost expansion taken along row `r`
/// (1-based). Deeper levels expand along their first row.
///
/// # Errors
///
/// Returns `LinalgError::NotSquare` unless `rows == cols` and
/// `LinalgError::IndexOutOfRange` if `r` is not in `[1, rows]`.
pub fn determinant_along_row<T: Scalar>(a: &Matrix<T>, r: usize) -> Result<T, LinalgError> {
    let n = ensure_square(a)?;
    if r == 0 || r > n {
        return Err(LinalgError::IndexOutOfRange(format!(
            "Expansion row {} outside a matrix of order {}",
            r, n
        )));
    }
    Ok(expand_along_row(a, r))
}

fn cofactor_det<T: Scalar>(a: &Matrix<T>) -> T {
    match a.rows() {
        0 => T::one(),
        1 => a[(1, 1)],
        2 => a[(1, 1)] * a[(2, 2)] - a[(2, 1)] * a[(1, 2)],
        _ => expand_along_row(a, 1),
    }
}

fn expand_along_row<T: Scalar>(a: &Matrix<T>, r: usize) -> T {
    (1..=a.cols()).fold(T::zero(), |acc, c| {
        let entry = a[(r, c)];
        if entry.is_zero() {
            return acc;
        }
        let sign = if (r + c) % 2 == 0 { T::one() } else { -T::one() };
        acc + sign * entry * cofactor_det(&minor_unchecked(a, r, c))
    })
}

impl<T: Scalar> Matrix<T> {
    /// Method form of [`determinant`].
    pub fn det(&self) -> Result<T, LinalgError> {
        determinant(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_det_identity() -> Result<(), LinalgError> {
        let id: Matrix = Matrix::identity(3);
        assert_eq!(id.det()?, 1.0);
        Ok(())
    }

    #[test]
    fn test_det_closed_forms() -> Result<(), LinalgError> {
        let one = Matrix::from_rows(vec![vec![-4.5]])?;
        assert_eq!(determinant(&one)?, -4.5);

        let two = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]])?;
        assert_eq!(determinant(&two)?, -2.0);
        Ok(())
    }

    #[test]
    fn test_det_three_by_three() -> Result<(), LinalgError> {
        let a: Matrix = Matrix::from_rows(vec![
            vec![2.0, -3.0, 1.0],
            vec![2.0, 0.0, -1.0],
            vec![1.0, 4.0, 5.0],
        ])?;
        assert!((a.det()? - 49.0).abs() < 1e-12);

        let singular: Matrix = Matrix::from_rows(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ])?;
        assert!(singular.det()?.abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_det_four_by_four() -> Result<(), LinalgError> {
        // Upper triangular: product of the diagonal.
        let a: Matrix = Matrix::from_rows(vec![
            vec![2.0, 1.0, 7.0, 3.0],
            vec![0.0, 3.0, 2.0, 1.0],
            vec![0.0, 0.0, -1.0, 4.0],
            vec![0.0, 0.0, 0.0, 5.0],
        ])?;
        assert!((a.det()? + 30.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_det_along_any_row() -> Result<(), LinalgError> {
        let a: Matrix = Matrix::random(5, 5, 42);
        let reference = a.det()?;
        for r in 1..=5 {
            assert!((determinant_along_row(&a, r)? - reference).abs() < 1e-10);
        }
        assert!(determinant_along_row(&a, 6).is_err());
        Ok(())
    }

    #[test]
    fn test_det_not_square() {
        let a: Matrix = Matrix::zeros(2, 3);
        assert!(matches!(
            a.det(),
            Err(LinalgError::NotSquare { rows: 2, cols: 3 })
        ));
    }

    #[test]
    fn test_det_empty() -> Result<(), LinalgError> {
        let a: Matrix = Matrix::zeros(0, 0);
        assert_eq!(a.det()?, 1.0);
        Ok(())
    }
}
