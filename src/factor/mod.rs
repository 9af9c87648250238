//! Numeric factorizations and solves.
//!
//! Each factorization owns its [`SymbolicFactorization`] together with the
//! numeric factors, and implements [`SparseFactorization`] for solves and
//! refactoring.

#![allow(non_snake_case)]

use crate::algebra::{CscMatrix, FloatT};
use crate::symbolic::{FactorizationKind, SymbolicFactorization};

mod cholesky;
mod error;
mod kernels;
mod ldl;
mod lu;
mod qr;
mod traits;

pub use cholesky::*;
pub use error::*;
pub(crate) use kernels::*;
pub use ldl::*;
pub use lu::*;
pub use qr::*;
pub use traits::*;

// the numeric phase requires an analysis of the right kind
// done on a matrix with exactly the analyzed pattern
pub(crate) fn check_symbolic<T: FloatT>(
    A: &CscMatrix<T>,
    symbolic: &SymbolicFactorization,
    kind: FactorizationKind,
) -> Result<(), FactorError> {
    if !symbolic.matches(A, kind) {
        return Err(FactorError::SymbolicMismatch { expected: kind });
    }
    Ok(())
}

#[path = "test.rs"]
#[cfg(test)]
mod test;
