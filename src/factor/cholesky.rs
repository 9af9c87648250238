#![allow(non_snake_case)]

use super::*;
use crate::algebra::{permutation, CscMatrix, FloatT};
use crate::symbolic::{
    etree_reach, ColumnOrdering, FactorizationKind, SymbolicFactorization, NO_PARENT,
};

/// Sparse Cholesky factorization P*A*P' = L*L' of a symmetric positive
/// definite matrix.  Only the upper triangle of A is read.
///
/// The factor L stores its diagonal as the first entry of each column,
/// with row indices sorted.
///
/// # Example
/// ```
/// use spfactor::algebra::CscMatrix;
/// use spfactor::factor::{CholeskyFactorization, SparseFactorization};
/// use spfactor::symbolic::ColumnOrdering;
///
/// let A = CscMatrix::from(&[
///     [4., 12., -16.],
///     [12., 37., -43.],
///     [-16., -43., 98.],
/// ]);
/// let chol = CholeskyFactorization::new(&A, ColumnOrdering::Natural).unwrap();
/// let mut b = vec![1., 2., 3.];
/// chol.solve(&mut b).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CholeskyFactorization<T = f64> {
    symbolic: SymbolicFactorization,
    L: CscMatrix<T>,
}

impl<T> CholeskyFactorization<T>
where
    T: FloatT,
{
    /// Symbolic analysis with the given ordering, then numeric factorization
    pub fn new(A: &CscMatrix<T>, ordering: ColumnOrdering) -> Result<Self, FactorError> {
        let symbolic = SymbolicFactorization::cholesky(A, ordering)?;
        Self::with_symbolic(A, symbolic)
    }

    /// Numeric factorization from an existing analysis of A's pattern
    pub fn with_symbolic(
        A: &CscMatrix<T>,
        symbolic: SymbolicFactorization,
    ) -> Result<Self, FactorError> {
        check_symbolic(A, &symbolic, FactorizationKind::Cholesky)?;
        let L = factor(A, &symbolic)?;
        log::debug!(target: "spfactor::cholesky", "factored n = {}, nnz(L) = {}", L.n, L.nnz());
        Ok(Self { symbolic, L })
    }

    /// the factor L of the permuted matrix
    pub fn l(&self) -> &CscMatrix<T> {
        &self.L
    }

    /// Rank-1 update: the factors of A become those of A + w*w'.
    ///
    /// `w` is an n x 1 sparse column in the original ordering of A.  Its
    /// permuted pattern must lie inside the pattern of column f of L,
    /// where f is its smallest permuted row index.
    pub fn update(&mut self, w: &CscMatrix<T>) -> Result<(), FactorError> {
        self.updown(w, T::one())
    }

    /// Rank-1 downdate: the factors of A become those of A - w*w'.
    ///
    /// Fails with [`UpdateNotPositiveDefinite`](FactorError::UpdateNotPositiveDefinite)
    /// if A - w*w' is not positive definite, in which case the factors are
    /// left unchanged.
    pub fn downdate(&mut self, w: &CscMatrix<T>) -> Result<(), FactorError> {
        self.updown(w, -T::one())
    }

    fn updown(&mut self, w: &CscMatrix<T>, sigma: T) -> Result<(), FactorError> {
        let n = self.L.n;
        check_dimension(n, w.m)?;
        check_dimension(1, w.n)?;
        w.check_format()?;

        let pinv = &self.symbolic.pinv;
        let parent = &self.symbolic.parent;
        let (Lp, Li) = (&self.L.colptr, &self.L.rowval);

        let rows = &w.rowval[w.colptr[0]..w.colptr[1]];
        let vals = &w.nzval[w.colptr[0]..w.colptr[1]];
        let f = match rows.iter().map(|&i| pinv[i]).min() {
            Some(f) => f,
            None => return Ok(()),
        };

        // the update must not create fill outside column f of L
        let colf = &Li[Lp[f]..Lp[f + 1]];
        if rows.iter().any(|&i| colf.binary_search(&pinv[i]).is_err()) {
            return Err(FactorError::UpdatePatternMismatch);
        }

        // path from f to the root, and the values it will overwrite
        let mut path = Vec::new();
        let mut j = f;
        while j != NO_PARENT {
            path.push(j);
            j = parent[j];
        }
        let saved: Vec<T> = path
            .iter()
            .flat_map(|&j| self.L.nzval[Lp[j]..Lp[j + 1]].iter().copied())
            .collect();

        let mut x = vec![T::zero(); n];
        for (&i, &v) in rows.iter().zip(vals) {
            x[pinv[i]] = v;
        }

        let Lx = &mut self.L.nzval;
        let mut beta = T::one();
        for &j in &path {
            let mut p = Lp[j];
            let alpha = x[j] / Lx[p];
            let beta2 = beta * beta + sigma * alpha * alpha;
            if !(beta2 > T::zero()) {
                // restore the path columns
                let mut src = saved.iter();
                for &c in &path {
                    for (v, s) in Lx[Lp[c]..Lp[c + 1]].iter_mut().zip(&mut src) {
                        *v = *s;
                    }
                }
                return Err(FactorError::UpdateNotPositiveDefinite(j));
            }
            let beta2 = beta2.sqrt();
            let up = sigma > T::zero();
            let delta = if up { beta / beta2 } else { beta2 / beta };
            let gamma = sigma * alpha / (beta2 * beta);
            Lx[p] = delta * Lx[p] + if up { gamma * x[j] } else { T::zero() };
            beta = beta2;

            p += 1;
            while p < Lp[j + 1] {
                let w1 = x[Li[p]];
                let w2 = w1 - alpha * Lx[p];
                x[Li[p]] = w2;
                Lx[p] = delta * Lx[p] + gamma * if up { w1 } else { w2 };
                p += 1;
            }
        }
        Ok(())
    }
}

impl<T> SparseFactorization<T> for CholeskyFactorization<T>
where
    T: FloatT,
{
    fn size(&self) -> (usize, usize) {
        (self.L.n, self.L.n)
    }

    fn nnz(&self) -> usize {
        self.L.nnz()
    }

    fn symbolic(&self) -> &SymbolicFactorization {
        &self.symbolic
    }

    fn solve(&self, b: &mut [T]) -> Result<(), FactorError> {
        check_dimension(self.L.n, b.len())?;
        let mut x = vec![T::zero(); b.len()];
        permutation::ipermute(&mut x, b, &self.symbolic.pinv);
        lsolve(&self.L, &mut x);
        ltsolve(&self.L, &mut x);
        permutation::permute(b, &x, &self.symbolic.pinv);
        Ok(())
    }

    fn solve_into(&self, b: &[T], x: &mut [T]) -> Result<(), FactorError> {
        solve_into_square(self, b, x)
    }

    fn refactor(&mut self, A: &CscMatrix<T>) -> Result<(), FactorError> {
        check_symbolic(A, &self.symbolic, FactorizationKind::Cholesky)?;
        self.L = factor(A, &self.symbolic)?;
        Ok(())
    }
}

// up-looking numeric factorization, one row of L per step
fn factor<T: FloatT>(
    A: &CscMatrix<T>,
    S: &SymbolicFactorization,
) -> Result<CscMatrix<T>, FactorError> {
    let n = A.n;
    let (C, _) = A.permute_symmetric(&S.pinv);
    let parent = &S.parent;

    let mut L = CscMatrix::spalloc(n, n, S.cp[n]);
    L.colptr.copy_from_slice(&S.cp);

    // next free slot in each column of L
    let mut next = S.cp[0..n].to_vec();
    let mut s = vec![0; n];
    let mut flag = vec![NO_PARENT; n];
    let mut x = vec![T::zero(); n];

    for k in 0..n {
        // nonzero pattern of row k of L
        let top = etree_reach(&C.colptr, &C.rowval, k, parent, &mut s, &mut flag);

        // x = full(triu(C(:,k)))
        x[k] = T::zero();
        for p in C.colptr[k]..C.colptr[k + 1] {
            if C.rowval[p] <= k {
                x[C.rowval[p]] += C.nzval[p];
            }
        }
        let mut d = x[k];
        x[k] = T::zero();

        // triangular solve for row k
        for &i in &s[top..n] {
            let lki = x[i] / L.nzval[L.colptr[i]];
            x[i] = T::zero();
            for p in (L.colptr[i] + 1)..next[i] {
                x[L.rowval[p]] -= L.nzval[p] * lki;
            }
            d -= lki * lki;
            let p = next[i];
            if p >= S.cp[i + 1] {
                return Err(pattern_overflow());
            }
            next[i] += 1;
            L.rowval[p] = k;
            L.nzval[p] = lki;
        }

        if !(d > T::zero()) {
            return Err(FactorError::NotPositiveDefinite(k));
        }
        let p = next[k];
        if p >= S.cp[k + 1] {
            return Err(pattern_overflow());
        }
        next[k] += 1;
        L.rowval[p] = k;
        L.nzval[p] = d.sqrt();
    }
    Ok(L)
}

// row k of L reaches outside the analyzed column counts
fn pattern_overflow() -> FactorError {
    FactorError::SymbolicMismatch {
        expected: FactorizationKind::Cholesky,
    }
}
