#[derive(thiserror::Error, Debug)]
pub enum LinalgError {
    /// The input file for a matrix or a right-hand side could not be found.
    #[error("FileNotFound: {0}")]
    FileNotFound(String),
    /// Operand shapes are not compatible with the requested operation.
    #[error("DimensionMismatch: {0}")]
    DimensionMismatch(String),
    /// The operation is only defined for square matrices.
    #[error("NotSquare: matrix is {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    /// A 1-based row or column index fell outside the matrix.
    #[error("IndexOutOfRange: {0}")]
    IndexOutOfRange(String),
    /// Gauss elimination met a zero pivot.
    #[error("SingularMatrix: no usable pivot in column {column}")]
    SingularMatrix { column: usize },

    #[error("InvalidFormat: line {line}: {reason}")]
    InvalidFormat { line: usize, reason: String },
    #[error("InvalidState: {0}")]
    InvalidState(String),
    #[error("InvalidParameters: {0}")]
    InvalidParameters(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Data serialization: {0}")]
    SerializationError(#[from] serde_json::Error),
}
