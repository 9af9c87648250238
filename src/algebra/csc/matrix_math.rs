use super::utils::scatter;
use crate::algebra::*;
use std::iter::zip;

impl<T: FloatT> MatrixVectorMultiply for CscMatrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_N(self, y, x, a, b);
    }
}

impl<T: FloatT> MatrixVectorMultiply for Adjoint<'_, CscMatrix<T>> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_T(self.src, y, x, a, b);
    }
}

impl<T: FloatT> MatrixMath for CscMatrix<T> {
    type T = T;

    fn scale(&mut self, c: T) {
        self.nzval.scale(c);
    }

    fn negate(&mut self) {
        self.nzval.negate();
    }

    fn norm_one(&self) -> T {
        self.colptr
            .windows(2)
            .map(|c| self.nzval[c[0]..c[1]].norm_one())
            .fold(T::zero(), T::max)
    }

    fn norm_inf(&self) -> T {
        let mut rowsums = vec![T::zero(); self.m];
        for (&row, &val) in zip(&self.rowval, &self.nzval) {
            rowsums[row] += T::abs(val);
        }
        rowsums.norm_inf()
    }
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// Allocates C = alpha*A + beta*B.
    ///
    /// # Panics
    /// Panics if A and B have different dimensions.
    pub fn add(alpha: T, A: &CscMatrix<T>, beta: T, B: &CscMatrix<T>) -> Self {
        assert_eq!(A.size(), B.size());
        let (m, n) = A.size();

        let mut w = vec![0; m];
        let mut x = vec![T::zero(); m];
        let mut colptr = vec![0; n + 1];
        let mut rowval = Vec::with_capacity(A.nnz() + B.nnz());
        let mut nzval = Vec::with_capacity(A.nnz() + B.nnz());

        for j in 0..n {
            let first = rowval.len();
            // mark j+1 so that the zeroed workspace is never mistaken
            scatter(A, j, alpha, &mut w, &mut x, j + 1, &mut rowval);
            scatter(B, j, beta, &mut w, &mut x, j + 1, &mut rowval);
            nzval.extend(rowval[first..].iter().map(|&i| x[i]));
            colptr[j + 1] = rowval.len();
        }

        let mut C = CscMatrix::new(m, n, colptr, rowval, nzval);
        C.sort_indices();
        C
    }

    /// Allocates the product C = A*B.
    ///
    /// # Panics
    /// Panics if the inner dimensions of A and B are incompatible.
    pub fn multiply(A: &CscMatrix<T>, B: &CscMatrix<T>) -> Self {
        assert_eq!(A.n, B.m);
        let (m, n) = (A.m, B.n);

        let mut w = vec![0; m];
        let mut x = vec![T::zero(); m];
        let mut colptr = vec![0; n + 1];
        let mut rowval = Vec::with_capacity(A.nnz() + B.nnz());
        let mut nzval = Vec::with_capacity(A.nnz() + B.nnz());

        for j in 0..n {
            let first = rowval.len();
            for p in B.colptr[j]..B.colptr[j + 1] {
                scatter(A, B.rowval[p], B.nzval[p], &mut w, &mut x, j + 1, &mut rowval);
            }
            nzval.extend(rowval[first..].iter().map(|&i| x[i]));
            colptr[j + 1] = rowval.len();
        }

        let mut C = CscMatrix::new(m, n, colptr, rowval, nzval);
        C.sort_indices();
        C
    }
}

// sparse matrix-vector multiply, no transpose
#[allow(non_snake_case)]
fn _csc_axpby_N<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    //first do the b*y part
    if b == T::zero() {
        y.fill(T::zero());
    } else if b == T::one() {
    } else if b == -T::one() {
        y.negate();
    } else {
        y.scale(b);
    }

    // if a is zero, we're done
    if a == T::zero() {
        return;
    }

    assert_eq!(x.len(), A.n);
    assert_eq!(y.len(), A.m);

    //y += a*A*x
    for (j, &xj) in x.iter().enumerate() {
        let axj = a * xj;
        for i in A.colptr[j]..A.colptr[j + 1] {
            y[A.rowval[i]] += A.nzval[i] * axj;
        }
    }
}

// sparse matrix-vector multiply, transposed
#[allow(non_snake_case)]
fn _csc_axpby_T<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    //first do the b*y part
    if b == T::zero() {
        y.fill(T::zero());
    } else if b == T::one() {
    } else if b == -T::one() {
        y.negate();
    } else {
        y.scale(b);
    }

    // if a is zero, we're done
    if a == T::zero() {
        return;
    }

    assert_eq!(x.len(), A.m);
    assert_eq!(y.len(), A.n);

    //y += a*A'*x
    for (j, yj) in y.iter_mut().enumerate() {
        let mut s = T::zero();
        for k in A.colptr[j]..A.colptr[j + 1] {
            s += A.nzval[k] * x[A.rowval[k]];
        }
        *yj += a * s;
    }
}
