use crate::algebra::SparseFormatError;
use crate::symbolic::{FactorizationKind, SymbolicError};
use thiserror::Error;

/// Error codes returnable from numeric factorization and solve operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactorError {
    #[error("Matrix must be square, found {m} x {n}")]
    NotSquare { m: usize, n: usize },
    #[error("Symbolic analysis failed: {0}")]
    Symbolic(#[from] SymbolicError),
    #[error("Matrix is not positive definite (pivot {0})")]
    NotPositiveDefinite(usize),
    #[error("Matrix factorization produced a zero pivot in column {0}")]
    ZeroPivot(usize),
    #[error("Matrix is singular (no usable pivot in column {0})")]
    Singular(usize),
    #[error("Rank-1 modification leaves the matrix indefinite (column {0})")]
    UpdateNotPositiveDefinite(usize),
    #[error("Unable to allocate storage for {0} factor entries")]
    OutOfMemory(usize),
    #[error("Factor storage exceeded the reallocation limit at column {0}")]
    GrowthLimitExceeded(usize),
    #[error("Pattern of the rank-1 modification is not contained in the factor")]
    UpdatePatternMismatch,
    #[error("Vector dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Pivot tolerance {0} is outside [0,1]")]
    InvalidPivotTolerance(f64),
    #[error("Symbolic analysis was computed for a different matrix or factorization")]
    SymbolicMismatch { expected: FactorizationKind },
    #[error(transparent)]
    Format(#[from] SparseFormatError),
}

/// Coarse classification of a [`FactorError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// non-square input or an ordering unsuitable for the factorization
    Shape,
    /// breakdown of the numeric factorization
    Numerical,
    /// storage for the factors could not be obtained
    Resource,
    /// bad arguments to a factorization or solve
    Argument,
}

impl FactorError {
    /// The error class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FactorError::NotSquare { .. } => ErrorKind::Shape,
            FactorError::Symbolic(e) => match e {
                SymbolicError::NotSquare { .. } | SymbolicError::UnsupportedOrdering { .. } => {
                    ErrorKind::Shape
                }
                SymbolicError::OrderingFailed => ErrorKind::Resource,
                SymbolicError::Format(_) => ErrorKind::Argument,
            },
            FactorError::NotPositiveDefinite(_)
            | FactorError::ZeroPivot(_)
            | FactorError::Singular(_)
            | FactorError::UpdateNotPositiveDefinite(_) => ErrorKind::Numerical,
            FactorError::OutOfMemory(_) | FactorError::GrowthLimitExceeded(_) => ErrorKind::Resource,
            FactorError::DimensionMismatch { .. }
            | FactorError::UpdatePatternMismatch
            | FactorError::InvalidPivotTolerance(_)
            | FactorError::SymbolicMismatch { .. }
            | FactorError::Format(_) => ErrorKind::Argument,
        }
    }
}

// check that a vector has the expected length
pub(crate) fn check_dimension(expected: usize, found: usize) -> Result<(), FactorError> {
    if expected != found {
        return Err(FactorError::DimensionMismatch { expected, found });
    }
    Ok(())
}
