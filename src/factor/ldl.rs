#![allow(non_snake_case)]

use super::*;
use crate::algebra::{permutation, CscMatrix, FloatT};
use crate::symbolic::{ColumnOrdering, FactorizationKind, SymbolicFactorization, NO_PARENT};
use std::iter::zip;

/// Sparse factorization P*A*P' = L*D*L' of a symmetric matrix, with L
/// unit lower triangular and D diagonal.  No pivoting is done, so any
/// symmetric matrix whose leading principal minors are nonsingular in
/// the chosen ordering can be factored.  Only the upper triangle of A
/// is read.
///
/// The unit diagonal of L is implicit: [`l`](LdlFactorization::l)
/// returns the strictly lower triangular part.
#[derive(Debug, Clone)]
pub struct LdlFactorization<T = f64> {
    symbolic: SymbolicFactorization,
    // strictly lower triangular factor
    L: CscMatrix<T>,
    // D and its inverse for A = LDL^T
    D: Vec<T>,
    Dinv: Vec<T>,
}

impl<T> LdlFactorization<T>
where
    T: FloatT,
{
    /// Symbolic analysis with the given ordering, then numeric factorization
    pub fn new(A: &CscMatrix<T>, ordering: ColumnOrdering) -> Result<Self, FactorError> {
        let symbolic = SymbolicFactorization::ldl(A, ordering)?;
        Self::with_symbolic(A, symbolic)
    }

    /// Numeric factorization from an existing analysis of A's pattern
    pub fn with_symbolic(
        A: &CscMatrix<T>,
        symbolic: SymbolicFactorization,
    ) -> Result<Self, FactorError> {
        check_symbolic(A, &symbolic, FactorizationKind::Ldl)?;
        let n = A.n;
        let mut factors = Self {
            L: CscMatrix::spalloc(n, n, symbolic.cp[n]),
            D: vec![T::zero(); n],
            Dinv: vec![T::zero(); n],
            symbolic,
        };
        factors.factor(A)?;
        log::debug!(target: "spfactor::ldl", "factored n = {}, nnz(L) = {}", n, factors.L.nnz());
        Ok(factors)
    }

    /// the strictly lower triangular part of L
    pub fn l(&self) -> &CscMatrix<T> {
        &self.L
    }

    /// the diagonal D
    pub fn d(&self) -> &[T] {
        &self.D
    }

    // Factor into the existing storage.  On error the contents of
    // L and D are not meaningful.
    fn factor(&mut self, A: &CscMatrix<T>) -> Result<(), FactorError> {
        let n = A.n;
        let (C, _) = A.permute_symmetric(&self.symbolic.pinv);
        let (Ap, Ai, Ax) = (&C.colptr, &C.rowval, &C.nzval);
        let etree = &self.symbolic.parent;

        let L = &mut self.L;
        L.colptr.copy_from_slice(&self.symbolic.cp);
        let (Lp, Li, Lx) = (&L.colptr, &mut L.rowval, &mut L.nzval);
        let (D, Dinv) = (&mut self.D, &mut self.Dinv);

        let mut y_markers = vec![false; n];
        let mut y_vals = vec![T::zero(); n];
        let mut y_idx = vec![0; n];
        let mut elim_buffer = vec![0; n];
        // in each column of L, the next available space
        let mut next_colspace = Lp[0..n].to_vec();

        D.fill(T::zero());

        for k in 0..n {
            // For each k we compute a solution to y = L(0:k-1,0:k-1)\b,
            // where b is the part of column k of A above the diagonal.
            // y is then the kth row of L, with an implied 1 on the diagonal.
            let mut nnz_y = 0;

            // find where the nonzeros of row k of L go, without
            // computing values
            for i in Ap[k]..Ap[k + 1] {
                let bidx = Ai[i];

                // the diagonal initializes D[k] and takes no
                // part in the elimination
                if bidx == k {
                    D[k] += Ax[i];
                    continue;
                }
                y_vals[bidx] += Ax[i];

                if y_markers[bidx] {
                    continue;
                }

                // walk the elimination tree from bidx, buffering the
                // part of the path not yet visited
                y_markers[bidx] = true;
                elim_buffer[0] = bidx;
                let mut nnz_e = 1;

                let mut next_idx = etree[bidx];
                while next_idx != NO_PARENT && next_idx < k {
                    if y_markers[next_idx] {
                        break;
                    }
                    y_markers[next_idx] = true;
                    elim_buffer[nnz_e] = next_idx;
                    next_idx = etree[next_idx];
                    nnz_e += 1;
                }

                // append the path to the row pattern in reverse order
                while nnz_e != 0 {
                    nnz_e -= 1;
                    y_idx[nnz_y] = elim_buffer[nnz_e];
                    nnz_y += 1;
                }
            }

            // compute the values of row k of L
            for &cidx in y_idx[0..nnz_y].iter().rev() {
                let tmp_idx = next_colspace[cidx];
                if tmp_idx >= Lp[cidx + 1] {
                    return Err(FactorError::SymbolicMismatch {
                        expected: FactorizationKind::Ldl,
                    });
                }
                let y_vals_cidx = y_vals[cidx];

                let (f, l) = (Lp[cidx], tmp_idx);
                for (&Lij, &Lxj) in zip(&Li[f..l], &Lx[f..l]) {
                    y_vals[Lij] -= Lxj * y_vals_cidx;
                }

                // the cidx^th element of y = L\b gives L(k,cidx)
                Lx[tmp_idx] = y_vals_cidx * Dinv[cidx];
                D[k] -= y_vals_cidx * Lx[tmp_idx];

                Li[tmp_idx] = k;
                next_colspace[cidx] += 1;

                y_vals[cidx] = T::zero();
                y_markers[cidx] = false;
            }

            if D[k] == T::zero() {
                return Err(FactorError::ZeroPivot(k));
            }
            Dinv[k] = T::recip(D[k]);
        }
        Ok(())
    }
}

impl<T> SparseFactorization<T> for LdlFactorization<T>
where
    T: FloatT,
{
    fn size(&self) -> (usize, usize) {
        (self.L.n, self.L.n)
    }

    fn nnz(&self) -> usize {
        self.L.nnz() + self.D.len()
    }

    fn symbolic(&self) -> &SymbolicFactorization {
        &self.symbolic
    }

    fn solve(&self, b: &mut [T]) -> Result<(), FactorError> {
        check_dimension(self.D.len(), b.len())?;

        let perm = &self.symbolic.q;
        let mut x = vec![T::zero(); b.len()];
        permutation::permute(&mut x, b, perm);

        lsolve_unit(&self.L, &mut x);
        zip(x.iter_mut(), &self.Dinv).for_each(|(x, d)| *x *= *d);
        ltsolve_unit(&self.L, &mut x);

        permutation::ipermute(b, &x, perm);
        Ok(())
    }

    fn solve_into(&self, b: &[T], x: &mut [T]) -> Result<(), FactorError> {
        solve_into_square(self, b, x)
    }

    fn refactor(&mut self, A: &CscMatrix<T>) -> Result<(), FactorError> {
        check_symbolic(A, &self.symbolic, FactorizationKind::Ldl)?;
        self.factor(A)
    }
}
