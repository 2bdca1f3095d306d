//! Elementwise arithmetic over [`Matrix`].
//!
//! Every output cell depends only on the matching input cells, so all of these
//! run over rayon parallel iterators.

use std::ops::{Div, DivAssign, Mul, MulAssign, Neg};

use rayon::prelude::*;

use crate::errors::LinalgError;
use crate::matrix::{Matrix, Scalar};

fn ensure_same_shape<T>(a: &Matrix<T>, b: &Matrix<T>, op: &str) -> Result<(), LinalgError> {
    if a.shape() != b.shape() {
        return Err(LinalgError::DimensionMismatch(format!(
            "Matrix dimensions must match for {} ({}x{} vs {}x{})",
            op,
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    Ok(())
}

/// Combines two equally shaped matrices cell by cell. Shapes are not checked.
pub(crate) fn zip_map<T, F>(a: &Matrix<T>, b: &Matrix<T>, f: F) -> Matrix<T>
where
    T: Scalar,
    F: Fn(T, T) -> T + Sync + Send,
{
    let data: Vec<T> = a
        .as_slice()
        .par_iter()
        .zip(b.as_slice().par_iter())
        .map(|(&x, &y)| f(x, y))
        .collect();
    Matrix::from_parts(a.rows(), a.cols(), data)
}

fn map<T, F>(a: &Matrix<T>, f: F) -> Matrix<T>
where
    T: Scalar,
    F: Fn(T) -> T + Sync + Send,
{
    let data: Vec<T> = a.as_slice().par_iter().map(|&x| f(x)).collect();
    Matrix::from_parts(a.rows(), a.cols(), data)
}

fn zip_apply<T, F>(a: &mut Matrix<T>, b: &Matrix<T>, f: F)
where
    T: Scalar,
    F: Fn(T, T) -> T + Sync + Send,
{
    a.as_mut_slice()
        .par_iter_mut()
        .zip(b.as_slice().par_iter())
        .for_each(|(x, &y)| *x = f(*x, y));
}

fn apply<T, F>(a: &mut Matrix<T>, f: F)
where
    T: Scalar,
    F: Fn(T) -> T + Sync + Send,
{
    a.as_mut_slice().par_iter_mut().for_each(|x| *x = f(*x));
}

/// Computes `A + B`.
///
/// # Errors
///
/// Returns `LinalgError::DimensionMismatch` if the shapes differ.
pub fn add<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
    ensure_same_shape(a, b, "addition")?;
    Ok(zip_map(a, b, |x, y| x + y))
}

/// Computes `A - B`.
///
/// # Errors
///
/// Returns `LinalgError::DimensionMismatch` if the shapes differ.
pub fn sub<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
    ensure_same_shape(a, b, "subtraction")?;
    Ok(zip_map(a, b, |x, y| x - y))
}

/// Computes `s * A`.
pub fn scale<T: Scalar>(a: &Matrix<T>, s: T) -> Matrix<T> {
    map(a, move |x| x * s)
}

/// Computes `A / s`. Division by zero follows the float rules (infinity or NaN).
pub fn divide<T: Scalar>(a: &Matrix<T>, s: T) -> Matrix<T> {
    map(a, move |x| x / s)
}

/// Computes `-A`.
pub fn negate<T: Scalar>(a: &Matrix<T>) -> Matrix<T> {
    map(a, |x| -x)
}

/// `A += B` in place. `A` is left untouched on error.
pub fn add_assign<T: Scalar>(a: &mut Matrix<T>, b: &Matrix<T>) -> Result<(), LinalgError> {
    ensure_same_shape(a, b, "addition")?;
    zip_apply(a, b, |x, y| x + y);
    Ok(())
}

/// `A -= B` in place. `A` is left untouched on error.
pub fn sub_assign<T: Scalar>(a: &mut Matrix<T>, b: &Matrix<T>) -> Result<(), LinalgError> {
    ensure_same_shape(a, b, "subtraction")?;
    zip_apply(a, b, |x, y| x - y);
    Ok(())
}

pub fn scale_assign<T: Scalar>(a: &mut Matrix<T>, s: T) {
    apply(a, move |x| x * s);
}

pub fn divide_assign<T: Scalar>(a: &mut Matrix<T>, s: T) {
    apply(a, move |x| x / s);
}

impl<T: Scalar> Matrix<T> {
    /// Method form of [`add`].
    pub fn try_add(&self, rhs: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
        add(self, rhs)
    }

    /// Method form of [`sub`].
    pub fn try_sub(&self, rhs: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
        sub(self, rhs)
    }
}

impl<T: Scalar> Mul<T> for &Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: T) -> Matrix<T> {
        scale(self, rhs)
    }
}

impl<T: Scalar> Mul<T> for Matrix<T> {
    type Output = Matrix<T>;

    fn mul(mut self, rhs: T) -> Matrix<T> {
        scale_assign(&mut self, rhs);
        self
    }
}

impl<T: Scalar> Div<T> for &Matrix<T> {
    type Output = Matrix<T>;

    fn div(self, rhs: T) -> Matrix<T> {
        divide(self, rhs)
    }
}

impl<T: Scalar> Div<T> for Matrix<T> {
    type Output = Matrix<T>;

    fn div(mut self, rhs: T) -> Matrix<T> {
        divide_assign(&mut self, rhs);
        self
    }
}

impl<T: Scalar> Neg for &Matrix<T> {
    type Output = Matrix<T>;

    fn neg(self) -> Matrix<T> {
        negate(self)
    }
}

impl<T: Scalar> Neg for Matrix<T> {
    type Output = Matrix<T>;

    fn neg(mut self) -> Matrix<T> {
        apply(&mut self, |x| -x);
        self
    }
}

impl<T: Scalar> MulAssign<T> for Matrix<T> {
    fn mul_assign(&mut self, rhs: T) {
        scale_assign(self, rhs);
    }
}

impl<T: Scalar> DivAssign<T> for Matrix<T> {
    fn div_assign(&mut self, rhs: T) {
        divide_assign(self, rhs);
    }
}
