#![allow(non_snake_case)]

use super::FactorError;
use crate::algebra::{CscMatrix, FloatT};
use crate::symbolic::SymbolicFactorization;
use enum_dispatch::*;

/// Common interface of the numeric factorizations.
///
/// A finished factorization is read-only for `solve`, so concurrent solves
/// with distinct right hand sides are safe.  Workspace is allocated per call.
#[enum_dispatch]
pub trait SparseFactorization<T>
where
    T: FloatT,
{
    /// dimensions (rows, columns) of the factored matrix
    fn size(&self) -> (usize, usize);

    /// number of stored entries in the factors
    fn nnz(&self) -> usize;

    /// the symbolic analysis the factors were computed from
    fn symbolic(&self) -> &SymbolicFactorization;

    /// Solve in place.  `b` must have length `max(m, n)`: on entry its
    /// first `m` entries hold the right hand side, on exit its first
    /// `n` entries hold the solution.
    fn solve(&self, b: &mut [T]) -> Result<(), FactorError>;

    /// Solve with `b` of length `m` into `x` of length `n`.
    fn solve_into(&self, b: &[T], x: &mut [T]) -> Result<(), FactorError>;

    /// Recompute the numeric factors for a matrix with the same
    /// nonzero pattern, reusing the symbolic analysis.
    fn refactor(&mut self, A: &CscMatrix<T>) -> Result<(), FactorError>;
}

// out of place solve for square factorizations, by copying b into x
pub(crate) fn solve_into_square<T, F>(factors: &F, b: &[T], x: &mut [T]) -> Result<(), FactorError>
where
    T: FloatT,
    F: SparseFactorization<T> + ?Sized,
{
    let (m, n) = factors.size();
    super::check_dimension(m, b.len())?;
    super::check_dimension(n, x.len())?;
    x.copy_from_slice(b);
    factors.solve(x)
}
