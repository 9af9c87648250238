use crate::algebra::{CscMatrix, FloatT};
use core::cmp::{max, min};
use std::iter::zip;

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// Allocates C = P*A*Q, where the row permutation is given through
    /// its inverse `pinv` (row i of A becomes row `pinv[i]` of C) and
    /// column k of C is column `q[k]` of A.  Either may be omitted for
    /// the identity.  Row indices of the result are sorted.
    pub fn permute(&self, pinv: Option<&[usize]>, q: Option<&[usize]>) -> Self {
        let mut C = CscMatrix::spalloc(self.m, self.n, self.nnz());
        let mut nz = 0;

        for k in 0..self.n {
            C.colptr[k] = nz;
            let j = q.map_or(k, |q| q[k]);
            for p in self.colptr[j]..self.colptr[j + 1] {
                C.rowval[nz] = pinv.map_or(self.rowval[p], |pinv| pinv[self.rowval[p]]);
                C.nzval[nz] = self.nzval[p];
                nz += 1;
            }
        }
        C.colptr[self.n] = nz;

        if pinv.is_some() {
            C.sort_indices();
        }
        C
    }

    /// Permute rows in place: an entry in row i moves to row `perm[i]`.
    pub fn permute_rows(&mut self, perm: &[usize]) {
        assert_eq!(perm.len(), self.m);
        self.rowval.iter_mut().for_each(|r| *r = perm[*r]);
        self.sort_indices();
    }

    /// Permute columns in place: column i moves to column `perm[i]`.
    pub fn permute_columns(&mut self, perm: &[usize]) {
        assert_eq!(perm.len(), self.n);

        // column lengths at their destinations
        let mut colptr = vec![0; self.n + 1];
        for (i, &k) in perm.iter().enumerate() {
            colptr[k + 1] = self.colptr[i + 1] - self.colptr[i];
        }
        for k in 0..self.n {
            colptr[k + 1] += colptr[k];
        }

        let mut rowval = vec![0; self.nnz()];
        let mut nzval = vec![T::zero(); self.nnz()];
        for (i, &k) in perm.iter().enumerate() {
            let (src, dst) = (self.colptr[i]..self.colptr[i + 1], colptr[k]);
            let len = src.len();
            rowval[dst..dst + len].copy_from_slice(&self.rowval[src.clone()]);
            nzval[dst..dst + len].copy_from_slice(&self.nzval[src]);
        }

        self.colptr = colptr;
        self.rowval = rowval;
        self.nzval = nzval;
        self.sort_indices();
    }

    /// Given a symmetric matrix of which only the upper triangle is read,
    /// return the upper triangle of P*A*P' for the inverse permutation
    /// `pinv`, together with a map from the entries of A to the entries of
    /// the result (`usize::MAX` for entries below the diagonal of A).
    ///
    /// Row indices within each column of the result are not sorted.
    pub fn permute_symmetric(&self, pinv: &[usize]) -> (CscMatrix<T>, Vec<usize>) {
        assert_eq!(self.m, self.n);
        assert_eq!(pinv.len(), self.n);
        let n = self.n;
        let (Ar, Ac, Av) = (&self.rowval, &self.colptr, &self.nzval);

        // count the number of upper-triangle entries in columns of P,
        // keeping in mind the row permutation
        let mut num_entries = vec![0; n];
        for colA in 0..n {
            let colP = pinv[colA];
            for &rowA in &Ar[Ac[colA]..Ac[colA + 1]] {
                if rowA <= colA {
                    num_entries[max(pinv[rowA], colP)] += 1;
                }
            }
        }

        let mut P = CscMatrix::spalloc(n, n, num_entries.iter().sum());
        let mut acc = 0;
        for (Pckp1, ne) in zip(&mut P.colptr[1..], &num_entries) {
            *Pckp1 = acc + ne;
            acc = *Pckp1;
        }
        // next free location in each column
        let mut row_starts = num_entries;
        row_starts.copy_from_slice(&P.colptr[0..n]);

        let mut AtoPAPt = vec![usize::MAX; self.nnz()];
        for colA in 0..n {
            let colP = pinv[colA];
            for rowA_idx in Ac[colA]..Ac[colA + 1] {
                let rowA = Ar[rowA_idx];
                if rowA <= colA {
                    let rowP = pinv[rowA];
                    let col_idx = max(colP, rowP);
                    let rowP_idx = row_starts[col_idx];

                    P.rowval[rowP_idx] = min(colP, rowP);
                    P.nzval[rowP_idx] = Av[rowA_idx];
                    AtoPAPt[rowA_idx] = rowP_idx;

                    row_starts[col_idx] += 1;
                }
            }
        }
        (P, AtoPAPt)
    }
}
