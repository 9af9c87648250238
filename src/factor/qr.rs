#![allow(non_snake_case)]

use super::*;
use crate::algebra::{CscMatrix, FloatT};
use crate::symbolic::{ColumnOrdering, FactorizationKind, SymbolicFactorization};

/// Sparse Householder QR factorization of a rectangular matrix.
///
/// For an m x n matrix with m >= n, computes Q*R = P*A*Q' where Q is the
/// product of the Householder reflections `I - beta[k]*V(:,k)*V(:,k)'`.
/// The row permutation may pad A with fictitious empty rows, so V and R
/// have `m2 >= m` rows.  Solves give the least squares solution.
///
/// When m < n the factorization is of A' and solves give the minimum norm
/// solution of the underdetermined system.
///
/// R holds its diagonal last in each column.  The first entry of each
/// column of V is the pivot row of that column.
///
/// A rank deficient matrix still factors, but when some `R(k,k)` is
/// exactly zero the triangular solve with R breaks down, so solves fail
/// with [`Singular(k)`](FactorError::Singular) instead.  This always
/// happens for a structurally rank deficient matrix, such as one with an
/// empty column.  Nearly singular R is not detected.
#[derive(Debug, Clone)]
pub struct QrFactorization<T = f64> {
    symbolic: SymbolicFactorization,
    V: CscMatrix<T>,
    R: CscMatrix<T>,
    beta: Vec<T>,
}

impl<T> QrFactorization<T>
where
    T: FloatT,
{
    /// Symbolic analysis with the given column ordering, then numeric factorization
    pub fn new(A: &CscMatrix<T>, ordering: ColumnOrdering) -> Result<Self, FactorError> {
        let symbolic = SymbolicFactorization::qr(A, ordering)?;
        Self::with_symbolic(A, symbolic)
    }

    /// Numeric factorization from an existing analysis of A's pattern
    pub fn with_symbolic(
        A: &CscMatrix<T>,
        symbolic: SymbolicFactorization,
    ) -> Result<Self, FactorError> {
        check_symbolic(A, &symbolic, FactorizationKind::Qr)?;
        let (V, R, beta) = factor_maybe_transposed(A, &symbolic)?;
        log::debug!(
            target: "spfactor::qr",
            "factored {} x {}, nnz(V) = {}, nnz(R) = {}",
            A.m,
            A.n,
            V.nnz(),
            R.nnz()
        );
        Ok(Self {
            symbolic,
            V,
            R,
            beta,
        })
    }

    /// the Householder vectors, one per column
    pub fn v(&self) -> &CscMatrix<T> {
        &self.V
    }

    /// the upper triangular factor R
    pub fn r(&self) -> &CscMatrix<T> {
        &self.R
    }

    /// the Householder coefficients
    pub fn beta(&self) -> &[T] {
        &self.beta
    }

    // least squares solve with the factors of A itself
    fn solve_least_squares(&self, b: &[T], out: &mut [T]) {
        let S = &self.symbolic;
        let mut x = vec![T::zero(); S.m2];
        for (k, &bk) in b.iter().enumerate() {
            x[S.pinv[k]] = bk;
        }
        for k in 0..S.n {
            self.apply_reflection(k, &mut x);
        }
        usolve(&self.R, &mut x);
        for (k, &qk) in S.q.iter().enumerate() {
            out[qk] = x[k];
        }
    }

    // minimum norm solve with the factors of A'
    fn solve_min_norm(&self, b: &[T], out: &mut [T]) {
        let S = &self.symbolic;
        let mut x = vec![T::zero(); S.m2];
        for (k, &qk) in S.q.iter().enumerate() {
            x[k] = b[qk];
        }
        utsolve(&self.R, &mut x);
        for k in (0..S.n).rev() {
            self.apply_reflection(k, &mut x);
        }
        for (k, o) in out.iter_mut().enumerate() {
            *o = x[S.pinv[k]];
        }
    }

    // first column of R with a zero diagonal
    fn zero_diagonal(&self) -> Option<usize> {
        let R = &self.R;
        (0..R.n).find(|&k| {
            let last = R.colptr[k + 1];
            last == R.colptr[k] || R.rowval[last - 1] != k || R.nzval[last - 1] == T::zero()
        })
    }

    fn apply_reflection(&self, k: usize, x: &mut [T]) {
        let (f, l) = (self.V.colptr[k], self.V.colptr[k + 1]);
        happly(&self.V.rowval[f..l], &self.V.nzval[f..l], self.beta[k], x);
    }
}

impl<T> SparseFactorization<T> for QrFactorization<T>
where
    T: FloatT,
{
    /// dimensions of the original, possibly wide, matrix
    fn size(&self) -> (usize, usize) {
        let (m, n) = self.symbolic.size();
        if self.symbolic.is_transposed() {
            (n, m)
        } else {
            (m, n)
        }
    }

    fn nnz(&self) -> usize {
        self.V.nnz() + self.R.nnz()
    }

    fn symbolic(&self) -> &SymbolicFactorization {
        &self.symbolic
    }

    fn solve(&self, b: &mut [T]) -> Result<(), FactorError> {
        let (m, n) = self.size();
        check_dimension(usize::max(m, n), b.len())?;
        let rhs = b[0..m].to_vec();
        self.solve_into(&rhs, &mut b[0..n])
    }

    fn solve_into(&self, b: &[T], x: &mut [T]) -> Result<(), FactorError> {
        let (m, n) = self.size();
        check_dimension(m, b.len())?;
        check_dimension(n, x.len())?;
        if let Some(k) = self.zero_diagonal() {
            return Err(FactorError::Singular(k));
        }
        if self.symbolic.is_transposed() {
            self.solve_min_norm(b, x);
        } else {
            self.solve_least_squares(b, x);
        }
        Ok(())
    }

    fn refactor(&mut self, A: &CscMatrix<T>) -> Result<(), FactorError> {
        check_symbolic(A, &self.symbolic, FactorizationKind::Qr)?;
        (self.V, self.R, self.beta) = factor_maybe_transposed(A, &self.symbolic)?;
        Ok(())
    }
}

type QrFactors<T> = (CscMatrix<T>, CscMatrix<T>, Vec<T>);

fn factor_maybe_transposed<T: FloatT>(
    A: &CscMatrix<T>,
    S: &SymbolicFactorization,
) -> Result<QrFactors<T>, FactorError> {
    if S.transposed {
        factor(&A.transpose(), S)
    } else {
        factor(A, S)
    }
}

// Left-looking Householder QR.  For each column k, the pattern of R(:,k)
// is found by walking the elimination tree from the leftmost column of
// each row of A(:,k), and the pattern of V(:,k) merges the rows of A(:,k)
// below k with those of the children of k.
fn factor<T: FloatT>(A: &CscMatrix<T>, S: &SymbolicFactorization) -> Result<QrFactors<T>, FactorError> {
    let n = A.n;
    let (m2, parent, leftmost, pinv) = (S.m2, &S.parent, &S.leftmost, &S.pinv);

    let mut Vp = vec![0; n + 1];
    let mut Vi = Vec::with_capacity(S.lnz);
    let mut Vx = Vec::with_capacity(S.lnz);
    let mut Rp = vec![0; n + 1];
    let mut Ri = Vec::with_capacity(S.unz);
    let mut Rx = Vec::with_capacity(S.unz);
    let mut beta = vec![T::zero(); n];

    // w marks both tree nodes and rows of V with the current column
    let mut w = vec![-1isize; m2];
    let mut s = vec![0; n];
    let mut x = vec![T::zero(); m2];

    for k in 0..n {
        let mark = k as isize;
        Rp[k] = Ri.len();
        Vp[k] = Vi.len();
        let p1 = Vi.len();

        // row k is the first entry of V(:,k)
        w[k] = mark;
        Vi.push(k);

        let col = S.q[k];
        let mut top = n;
        for p in A.colptr[col]..A.colptr[col + 1] {
            // path from the leftmost column of this row up to k
            let mut i = leftmost[A.rowval[p]];
            let mut len = 0;
            while i <= k && w[i] != mark {
                s[len] = i;
                len += 1;
                w[i] = mark;
                i = parent[i];
            }
            // the path must end at k in the analyzed tree
            if i > k {
                return Err(FactorError::SymbolicMismatch {
                    expected: FactorizationKind::Qr,
                });
            }
            while len > 0 {
                top -= 1;
                len -= 1;
                s[top] = s[len];
            }

            let i = pinv[A.rowval[p]];
            x[i] = A.nzval[p];
            if i > k && w[i] < mark {
                Vi.push(i);
                w[i] = mark;
            }
        }

        for &i in &s[top..n] {
            let (f, l) = (Vp[i], Vp[i + 1]);
            happly(&Vi[f..l], &Vx[f..l], beta[i], &mut x);
            Ri.push(i);
            Rx.push(x[i]);
            x[i] = T::zero();

            // V(:,k) inherits the pattern of its children
            if parent[i] == k {
                for p in f..l {
                    let row = Vi[p];
                    if w[row] < mark {
                        w[row] = mark;
                        Vi.push(row);
                    }
                }
            }
        }

        for p in p1..Vi.len() {
            Vx.push(x[Vi[p]]);
            x[Vi[p]] = T::zero();
        }
        Vp[k + 1] = Vi.len();

        let (b, rkk) = house(&mut Vx[p1..]);
        beta[k] = b;
        Ri.push(k);
        Rx.push(rkk);
    }
    Rp[n] = Ri.len();

    let mut V = CscMatrix::new(m2, n, Vp, Vi, Vx);
    let mut R = CscMatrix::new(m2, n, Rp, Ri, Rx);
    V.sort_indices();
    R.sort_indices();
    Ok((V, R, beta))
}
