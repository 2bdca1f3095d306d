use crate::errors::LinalgError;
use crate::matrix::{Matrix, Scalar};

/// Returns the `(rows-1) x (cols-1)` matrix left after deleting row `r` and
/// column `c` (both 1-based).
///
/// # Errors
///
/// Returns `LinalgError::IndexOutOfRange` if `r` is not in `[1, rows]` or `c`
/// is not in `[1, cols]`.
pub fn minor<T: Scalar>(a: &Matrix<T>, r: usize, c: usize) -> Result<Matrix<T>, LinalgError> {
    if r == 0 || r > a.rows() || c == 0 || c > a.cols() {
        return Err(LinalgError::IndexOutOfRange(format!(
            "Minor ({}, {}) requested from a {}x{} matrix",
            r,
            c,
            a.rows(),
            a.cols()
        )));
    }
    Ok(minor_unchecked(a, r, c))
}

/// [`minor`] without the range check; `r` and `c` must be valid.
pub(crate) fn minor_unchecked<T: Scalar>(a: &Matrix<T>, r: usize, c: usize) -> Matrix<T> {
    let data = a
        .entries()
        .filter(|&(i, j, _)| i != r && j != c)
        .map(|(_, _, value)| *value)
        .collect();
    Matrix::from_parts(a.rows() - 1, a.cols() - 1, data)
}

impl<T: Scalar> Matrix<T> {
    /// Method form of [`minor`].
    pub fn minor(&self, r: usize, c: usize) -> Result<Matrix<T>, LinalgError> {
        minor(self, r, c)
    }
}
