#![allow(non_snake_case)] // Allow matrix names like `A`

//! Dense matrices for numeric prototyping: storage with 1-based indexing,
//! elementwise and product arithmetic (standard and Strassen), minors,
//! cofactor determinants, and a Gauss-elimination solver.

pub mod config;
pub mod errors;
pub mod io;
pub mod matrix;
pub mod sle;

pub use config::ComputeConfig;
pub use errors::LinalgError;
pub use matrix::mul::MulStrategy;
pub use matrix::{Matrix, Scalar};
pub use sle::{GaussSystem, SquareSystem, SystemState};
