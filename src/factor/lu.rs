#![allow(non_snake_case)]

use super::*;
use crate::algebra::{permutation, CscMatrix, FloatT};
use crate::symbolic::{
    ColumnOrdering, FactorizationKind, ReachWorkspace, SymbolicFactorization, NO_PARENT,
};

/// Default limit on the number of times the storage of L or U may be
/// enlarged during one factorization
pub const DEFAULT_MAX_REALLOCATIONS: usize = 32;

/// Sparse LU factorization P*A*Q = L*U with threshold partial pivoting.
///
/// L is unit lower triangular with its (explicit) unit diagonal stored
/// first in each column.  U is upper triangular with its diagonal stored
/// last in each column.  Row indices of both factors are sorted.
///
/// The pivot tolerance `tol` in [0,1] controls the preference for
/// diagonal pivots: the diagonal entry is chosen whenever its magnitude
/// is at least `tol` times the largest candidate.  `tol = 1` gives
/// classic partial pivoting, `tol = 0` keeps the diagonal whenever it is
/// nonzero.
#[derive(Debug, Clone)]
pub struct LuFactorization<T = f64> {
    symbolic: SymbolicFactorization,
    L: CscMatrix<T>,
    U: CscMatrix<T>,
    // row permutation from pivoting: row i of A is row pinv[i] of P*A
    pinv: Vec<usize>,
    tol: T,
    max_reallocations: usize,
}

impl<T> LuFactorization<T>
where
    T: FloatT,
{
    /// Symbolic analysis with the given column ordering, then numeric factorization
    pub fn new(A: &CscMatrix<T>, ordering: ColumnOrdering, tol: T) -> Result<Self, FactorError> {
        let symbolic = SymbolicFactorization::lu(A, ordering)?;
        Self::with_symbolic(A, symbolic, tol)
    }

    /// Numeric factorization from an existing analysis of A's pattern
    pub fn with_symbolic(
        A: &CscMatrix<T>,
        symbolic: SymbolicFactorization,
        tol: T,
    ) -> Result<Self, FactorError> {
        Self::with_reallocation_limit(A, symbolic, tol, DEFAULT_MAX_REALLOCATIONS)
    }

    /// As [`with_symbolic`](LuFactorization::with_symbolic), failing with
    /// [`GrowthLimitExceeded`](FactorError::GrowthLimitExceeded) if the
    /// factor storage has to grow more than `max_reallocations` times.
    pub fn with_reallocation_limit(
        A: &CscMatrix<T>,
        symbolic: SymbolicFactorization,
        tol: T,
        max_reallocations: usize,
    ) -> Result<Self, FactorError> {
        if !(tol >= T::zero() && tol <= T::one()) {
            return Err(FactorError::InvalidPivotTolerance(
                tol.to_f64().unwrap_or(f64::NAN),
            ));
        }
        check_symbolic(A, &symbolic, FactorizationKind::Lu)?;
        let (L, U, pinv) = factor(A, &symbolic, tol, max_reallocations)?;
        log::debug!(
            target: "spfactor::lu",
            "factored n = {}, nnz(L) = {}, nnz(U) = {}",
            A.n,
            L.nnz(),
            U.nnz()
        );
        Ok(Self {
            symbolic,
            L,
            U,
            pinv,
            tol,
            max_reallocations,
        })
    }

    /// the unit lower triangular factor L
    pub fn l(&self) -> &CscMatrix<T> {
        &self.L
    }

    /// the upper triangular factor U
    pub fn u(&self) -> &CscMatrix<T> {
        &self.U
    }

    /// inverse row permutation found by pivoting
    pub fn pinv(&self) -> &[usize] {
        &self.pinv
    }

    /// the pivot tolerance
    pub fn tol(&self) -> T {
        self.tol
    }
}

impl<T> SparseFactorization<T> for LuFactorization<T>
where
    T: FloatT,
{
    fn size(&self) -> (usize, usize) {
        (self.L.n, self.L.n)
    }

    fn nnz(&self) -> usize {
        self.L.nnz() + self.U.nnz()
    }

    fn symbolic(&self) -> &SymbolicFactorization {
        &self.symbolic
    }

    fn solve(&self, b: &mut [T]) -> Result<(), FactorError> {
        check_dimension(self.L.n, b.len())?;
        let mut x = vec![T::zero(); b.len()];
        permutation::ipermute(&mut x, b, &self.pinv);
        lsolve(&self.L, &mut x);
        usolve(&self.U, &mut x);
        permutation::ipermute(b, &x, &self.symbolic.q);
        Ok(())
    }

    fn solve_into(&self, b: &[T], x: &mut [T]) -> Result<(), FactorError> {
        solve_into_square(self, b, x)
    }

    fn refactor(&mut self, A: &CscMatrix<T>) -> Result<(), FactorError> {
        check_symbolic(A, &self.symbolic, FactorizationKind::Lu)?;
        let (L, U, pinv) = factor(A, &self.symbolic, self.tol, self.max_reallocations)?;
        (self.L, self.U, self.pinv) = (L, U, pinv);
        Ok(())
    }
}

// Factor storage that grows on demand.  rowval and nzval are kept
// at their full capacity, as in a freshly allocated matrix.
struct GrowableFactor<T> {
    colptr: Vec<usize>,
    rowval: Vec<usize>,
    nzval: Vec<T>,
    nz: usize,
}

impl<T> GrowableFactor<T>
where
    T: FloatT,
{
    fn new(n: usize, cap: usize) -> Self {
        Self {
            colptr: vec![0; n + 1],
            rowval: vec![0; cap],
            nzval: vec![T::zero(); cap],
            nz: 0,
        }
    }

    fn push(&mut self, i: usize, v: T) {
        self.rowval[self.nz] = i;
        self.nzval[self.nz] = v;
        self.nz += 1;
    }

    // make room for n more entries, doubling the storage if needed.
    // Returns true if the storage was enlarged.
    fn reserve(&mut self, n: usize) -> Result<bool, FactorError> {
        let cap = self.rowval.len();
        if self.nz + n <= cap {
            return Ok(false);
        }
        let newcap = usize::min(2 * cap + n, n * n + n).max(self.nz + n);
        let extra = newcap - cap;
        self.rowval
            .try_reserve_exact(extra)
            .map_err(|_| FactorError::OutOfMemory(newcap))?;
        self.nzval
            .try_reserve_exact(extra)
            .map_err(|_| FactorError::OutOfMemory(newcap))?;
        self.rowval.resize(newcap, 0);
        self.nzval.resize(newcap, T::zero());
        Ok(true)
    }

    fn finish(mut self, n: usize) -> CscMatrix<T> {
        self.colptr[n] = self.nz;
        self.rowval.truncate(self.nz);
        self.nzval.truncate(self.nz);
        CscMatrix::new(n, n, self.colptr, self.rowval, self.nzval)
    }
}

// left-looking LU, one column of L and U per step
fn factor<T: FloatT>(
    A: &CscMatrix<T>,
    S: &SymbolicFactorization,
    tol: T,
    max_reallocations: usize,
) -> Result<(CscMatrix<T>, CscMatrix<T>, Vec<usize>), FactorError> {
    let n = A.n;
    let q = &S.q;

    let mut L = GrowableFactor::new(n, S.lnz);
    let mut U = GrowableFactor::new(n, S.unz);
    let mut reallocations = 0;

    let mut pinv = vec![NO_PARENT; n];
    let mut x = vec![T::zero(); n];
    let mut xi = vec![0; n];
    let mut reach = ReachWorkspace::new(n);

    for k in 0..n {
        L.colptr[k] = L.nz;
        U.colptr[k] = U.nz;

        // column k of L and U can hold at most n entries each
        for F in [&mut L, &mut U] {
            if F.reserve(n)? {
                reallocations += 1;
                log::debug!(
                    target: "spfactor::lu",
                    "column {}: factor storage grown to {} entries",
                    k,
                    F.rowval.len()
                );
                if reallocations > max_reallocations {
                    return Err(FactorError::GrowthLimitExceeded(k));
                }
            }
        }

        // x = L \ A(:,col), over the pattern xi[top..n]
        let col = q[k];
        let starts = &A.rowval[A.colptr[col]..A.colptr[col + 1]];
        let top = reach.reach(&L.colptr, &L.rowval, starts, &pinv, k, &mut xi);

        for &i in &xi[top..] {
            x[i] = T::zero();
        }
        for p in A.colptr[col]..A.colptr[col + 1] {
            x[A.rowval[p]] += A.nzval[p];
        }
        for &j in &xi[top..] {
            let J = pinv[j];
            if J == NO_PARENT {
                continue;
            }
            x[j] /= L.nzval[L.colptr[J]];
            let xj = x[j];
            for p in (L.colptr[J] + 1)..L.colptr[J + 1] {
                x[L.rowval[p]] -= L.nzval[p] * xj;
            }
        }

        // the largest candidate pivot, with pivoted rows moved to U
        let mut ipiv = NO_PARENT;
        let mut a = -T::one();
        for &i in &xi[top..] {
            if pinv[i] == NO_PARENT {
                let t = x[i].abs();
                if t > a {
                    a = t;
                    ipiv = i;
                }
            } else {
                U.push(pinv[i], x[i]);
            }
        }
        if ipiv == NO_PARENT || !(a > T::zero()) {
            return Err(FactorError::Singular(k));
        }

        // prefer the diagonal when it is large enough
        if pinv[col] == NO_PARENT && x[col] != T::zero() && x[col].abs() >= a * tol {
            ipiv = col;
        }

        let pivot = x[ipiv];
        U.push(k, pivot);
        pinv[ipiv] = k;
        L.push(ipiv, T::one());
        for &i in &xi[top..] {
            if pinv[i] == NO_PARENT {
                L.push(i, x[i] / pivot);
            }
            x[i] = T::zero();
        }
    }

    // rows of L in their final pivoted order
    L.rowval[0..L.nz].iter_mut().for_each(|i| *i = pinv[*i]);

    let mut L = L.finish(n);
    let mut U = U.finish(n);
    L.sort_indices();
    U.sort_indices();
    Ok((L, U, pinv))
}
