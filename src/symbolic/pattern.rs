#![allow(non_snake_case)]

use crate::algebra::{CscMatrix, FloatT, MatrixShape, ShapedMatrix, SparseFormatError};

/// Structure-only compressed column matrix.
///
/// Holds the column pointers and row indices of a sparse matrix with no
/// values attached.  Patterns are what the graph algorithms (elimination
/// tree, column counts, reachability, ordering) operate on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicPattern {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// column pointers, length `n+1`
    pub colptr: Vec<usize>,
    /// row indices, length `colptr[n]`
    pub rowval: Vec<usize>,
}

impl<T: FloatT> From<&CscMatrix<T>> for SymbolicPattern {
    fn from(A: &CscMatrix<T>) -> Self {
        SymbolicPattern {
            m: A.m,
            n: A.n,
            colptr: A.colptr.clone(),
            rowval: A.rowval.clone(),
        }
    }
}

impl SymbolicPattern {
    /// Pattern constructor.
    ///
    /// # Panics
    /// Panics if `colptr` has the wrong length or disagrees with `rowval`.
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>) -> Self {
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        SymbolicPattern {
            m,
            n,
            colptr,
            rowval,
        }
    }

    /// number of structural nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// row indices of column `j`
    pub fn column(&self, j: usize) -> &[usize] {
        &self.rowval[self.colptr[j]..self.colptr[j + 1]]
    }

    /// Check that the pattern is correctly formatted, with strictly
    /// increasing row indices within each column.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.colptr.len() != self.n + 1 || self.colptr[self.n] != self.rowval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }
        if self.colptr[0] != 0 || self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }
        if self.rowval.iter().any(|&r| r >= self.m) {
            return Err(SparseFormatError::BadRowval);
        }
        if (0..self.n).any(|j| self.column(j).windows(2).any(|r| r[0] >= r[1])) {
            return Err(SparseFormatError::BadRowOrdering);
        }
        Ok(())
    }

    /// Pattern of the transpose.  Row indices of the result are sorted.
    pub fn transpose(&self) -> Self {
        let mut colptr = vec![0; self.m + 1];
        for &row in &self.rowval {
            colptr[row + 1] += 1;
        }
        for i in 0..self.m {
            colptr[i + 1] += colptr[i];
        }

        let mut next = colptr.clone();
        let mut rowval = vec![0; self.nnz()];
        for col in 0..self.n {
            for &row in self.column(col) {
                rowval[next[row]] = col;
                next[row] += 1;
            }
        }
        SymbolicPattern::new(self.n, self.m, colptr, rowval)
    }

    /// Pattern of P*A*Q, where row i of A becomes row `pinv[i]` and column
    /// k of the result is column `q[k]` of A.   Row indices of the result
    /// are sorted.
    pub fn permute(&self, pinv: Option<&[usize]>, q: Option<&[usize]>) -> Self {
        let mut colptr = vec![0; self.n + 1];
        let mut rowval = Vec::with_capacity(self.nnz());

        for k in 0..self.n {
            let j = q.map_or(k, |q| q[k]);
            let first = rowval.len();
            rowval.extend(
                self.column(j)
                    .iter()
                    .map(|&i| pinv.map_or(i, |pinv| pinv[i])),
            );
            if pinv.is_some() {
                rowval[first..].sort_unstable();
            }
            colptr[k + 1] = rowval.len();
        }
        SymbolicPattern::new(self.m, self.n, colptr, rowval)
    }

    /// Pattern of A + B (structural union).
    ///
    /// # Panics
    /// Panics if the dimensions differ.
    pub fn add(&self, B: &SymbolicPattern) -> Self {
        assert_eq!(self.size(), B.size());
        let mut mark = vec![usize::MAX; self.m];
        let mut colptr = vec![0; self.n + 1];
        let mut rowval = Vec::with_capacity(self.nnz() + B.nnz());

        for j in 0..self.n {
            let first = rowval.len();
            for &i in self.column(j).iter().chain(B.column(j)) {
                if mark[i] != j {
                    mark[i] = j;
                    rowval.push(i);
                }
            }
            rowval[first..].sort_unstable();
            colptr[j + 1] = rowval.len();
        }
        SymbolicPattern::new(self.m, self.n, colptr, rowval)
    }

    /// Pattern of the product A*B.
    ///
    /// # Panics
    /// Panics if the inner dimensions differ.
    pub fn multiply(&self, B: &SymbolicPattern) -> Self {
        assert_eq!(self.n, B.m);
        let mut mark = vec![usize::MAX; self.m];
        let mut colptr = vec![0; B.n + 1];
        let mut rowval = Vec::with_capacity(self.nnz() + B.nnz());

        for j in 0..B.n {
            let first = rowval.len();
            for &k in B.column(j) {
                for &i in self.column(k) {
                    if mark[i] != j {
                        mark[i] = j;
                        rowval.push(i);
                    }
                }
            }
            rowval[first..].sort_unstable();
            colptr[j + 1] = rowval.len();
        }
        SymbolicPattern::new(self.m, B.n, colptr, rowval)
    }

    /// Drop every entry for which `fkeep(row, col)` is false.
    pub fn keep<F>(&mut self, mut fkeep: F)
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut nz = 0;
        for j in 0..self.n {
            let (first, last) = (self.colptr[j], self.colptr[j + 1]);
            self.colptr[j] = nz;
            for p in first..last {
                if fkeep(self.rowval[p], j) {
                    self.rowval[nz] = self.rowval[p];
                    nz += 1;
                }
            }
        }
        self.colptr[self.n] = nz;
        self.rowval.truncate(nz);
    }

    /// Remove all diagonal entries
    pub fn drop_diagonal(&mut self) {
        self.keep(|i, j| i != j);
    }

    /// Pattern of the upper triangle, diagonal included
    pub fn triu(&self) -> Self {
        let mut U = self.clone();
        U.keep(|i, j| i <= j);
        U
    }
}

impl ShapedMatrix for SymbolicPattern {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::N
    }
}
