//! # Text readers
//!
//! Two matrix formats are understood:
//!
//! * **Coordinate** (`.mtx`): the first line is a header and is skipped, the
//!   next data line holds `rows cols nonzeros`, every following line holds a
//!   1-based `row col value` triple. Cells that are not listed are zero.
//!   Blank lines and `%` comment lines are ignored.
//! * **Dense** (anything else): one line per row, whitespace-separated
//!   values. The first row fixes the column count.
//!
//! Right-hand-side vectors use the dense layout; all values are read in order.

use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

use itertools::Itertools;

use crate::errors::LinalgError;
use crate::matrix::{Matrix, Scalar};

/// On-disk matrix layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Coordinate,
    Dense,
}

impl Format {
    /// `.mtx` files are read as coordinate lists, everything else as dense rows.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("mtx") => Format::Coordinate,
            _ => Format::Dense,
        }
    }
}

/// Reads a whole file, mapping a missing file to `LinalgError::FileNotFound`.
pub(crate) fn read_source(path: &Path) -> Result<String, LinalgError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LinalgError::FileNotFound(path.display().to_string()),
        _ => LinalgError::Io(e),
    })
}

fn parse_token<V: FromStr>(token: &str, line: usize) -> Result<V, LinalgError> {
    token.parse().map_err(|_| LinalgError::InvalidFormat {
        line,
        reason: format!("cannot parse '{}' as a number", token),
    })
}

/// Reads a matrix file, picking the format from the extension.
///
/// # Errors
///
/// `FileNotFound` for a missing file, `Io` for other read failures, and the
/// parse errors of [`parse_coordinate`] / [`parse_dense`].
pub fn read_matrix<T: Scalar>(path: impl AsRef<Path>) -> Result<Matrix<T>, LinalgError> {
    let path = path.as_ref();
    let text = read_source(path)?;
    let format = Format::detect(path);
    log::debug!("reading {} as {:?}", path.display(), format);

    match format {
        Format::Coordinate => parse_coordinate(&text),
        Format::Dense => parse_dense(&text),
    }
}

/// Parses the coordinate format.
///
/// # Errors
///
/// `InvalidFormat` for a missing size line or a malformed entry,
/// `IndexOutOfRange` for an entry outside the declared shape.
pub fn parse_coordinate<T: Scalar>(text: &str) -> Result<Matrix<T>, LinalgError> {
    let mut lines = text
        .lines()
        .enumerate()
        .skip(1)
        .map(|(k, line)| (k + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('%'));

    let (size_line, size) = lines.next().ok_or_else(|| LinalgError::InvalidFormat {
        line: 2,
        reason: "missing `rows cols nonzeros` line".to_string(),
    })?;
    let (rows, cols, declared) = size.split_whitespace().collect_tuple().ok_or_else(|| {
        LinalgError::InvalidFormat {
            line: size_line,
            reason: "expected `rows cols nonzeros`".to_string(),
        }
    })?;
    let rows: usize = parse_token(rows, size_line)?;
    let cols: usize = parse_token(cols, size_line)?;
    let declared: usize = parse_token(declared, size_line)?;
    if rows.checked_mul(cols).is_none() {
        return Err(LinalgError::InvalidFormat {
            line: size_line,
            reason: format!("a {}x{} matrix has too many entries", rows, cols),
        });
    }

    let mut matrix = Matrix::zeros(rows, cols);
    let mut listed = 0;
    for (line, content) in lines {
        let (r, c, value) = content.split_whitespace().collect_tuple().ok_or_else(|| {
            LinalgError::InvalidFormat {
                line,
                reason: "expected `row col value`".to_string(),
            }
        })?;
        let r: usize = parse_token(r, line)?;
        let c: usize = parse_token(c, line)?;
        let value: T = parse_token(value, line)?;

        if r == 0 || r > rows || c == 0 || c > cols {
            return Err(LinalgError::IndexOutOfRange(format!(
                "line {}: entry ({}, {}) outside a {}x{} matrix",
                line, r, c, rows, cols
            )));
        }
        matrix[(r, c)] = value;
        listed += 1;
    }

    if listed != declared {
        log::warn!(
            "coordinate header declares {} entries but {} were listed",
            declared,
            listed
        );
    }
    Ok(matrix)
}

/// Parses the dense format.
///
/// # Errors
///
/// `InvalidFormat` for a token that is not a number, `DimensionMismatch` when a
/// row's length differs from the first row's.
pub fn parse_dense<T: Scalar>(text: &str) -> Result<Matrix<T>, LinalgError> {
    let mut data: Vec<T> = Vec::new();
    let mut rows = 0;
    let mut cols = 0;

    for (k, line) in text.lines().enumerate() {
        let before = data.len();
        for token in line.split_whitespace() {
            data.push(parse_token(token, k + 1)?);
        }
        let width = data.len() - before;
        if width == 0 {
            continue;
        }

        if rows == 0 {
            cols = width;
        } else if width != cols {
            return Err(LinalgError::DimensionMismatch(format!(
                "line {} has {} entries but the first row has {}",
                k + 1,
                width,
                cols
            )));
        }
        rows += 1;
    }

    Matrix::from_vec(rows, cols, data)
}

/// Parses a right-hand-side vector: every value in reading order.
pub fn parse_vector<T: Scalar>(text: &str) -> Result<Vec<T>, LinalgError> {
    let mut values = Vec::new();
    for (k, line) in text.lines().enumerate() {
        for token in line.split_whitespace() {
            values.push(parse_token(token, k + 1)?);
        }
    }
    Ok(values)
}

/// Reads a right-hand-side vector file.
pub fn read_vector<T: Scalar>(path: impl AsRef<Path>) -> Result<Vec<T>, LinalgError> {
    let path = path.as_ref();
    let values = parse_vector(&read_source(path)?)?;
    log::debug!("read {} values from {}", values.len(), path.display());
    Ok(values)
}
