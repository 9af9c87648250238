use crate::algebra::{CscMatrix, FloatT, SparseFormatError};

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// Allocates a new matrix holding the transpose.
    ///
    /// Uses a counting sort over the row indices, so the result has
    /// sorted row indices within each column regardless of the input.
    pub fn transpose(&self) -> Self {
        let (m, n) = (self.m, self.n);
        let mut At = CscMatrix::spalloc(n, m, self.nnz());

        //count entries in each row of self, i.e. each column of At
        At.colptr.fill(0);
        for &row in &self.rowval {
            At.colptr[row] += 1;
        }
        At.colptr_from_counts();

        //colptr is used as the next free slot in each column
        for col in 0..n {
            for p in self.colptr[col]..self.colptr[col + 1] {
                let dest = At.colptr[self.rowval[p]];
                At.rowval[dest] = col;
                At.nzval[dest] = self.nzval[p];
                At.colptr[self.rowval[p]] += 1;
            }
        }
        At.backshift_colptrs();
        At
    }

    // colptr[0..n] holds counts, colptr[n] is overwritten
    fn colptr_from_counts(&mut self) {
        let n = self.n;
        self.colptr[n] = 0;
        self.colcount_to_colptr();
    }

    /// Sort row indices (and their values) in ascending order within
    /// every column.
    pub fn sort_indices(&mut self) {
        let mut buffer: Vec<(usize, T)> = Vec::new();
        for col in 0..self.n {
            let (first, last) = (self.colptr[col], self.colptr[col + 1]);
            let rows = &self.rowval[first..last];

            if rows.windows(2).all(|r| r[0] < r[1]) {
                continue;
            }

            buffer.clear();
            buffer.extend(rows.iter().copied().zip(self.nzval[first..last].iter().copied()));
            buffer.sort_unstable_by_key(|&(row, _)| row);

            for (p, (row, val)) in (first..last).zip(buffer.iter()) {
                self.rowval[p] = *row;
                self.nzval[p] = *val;
            }
        }
    }

    /// Locate the diagonal entry of each of the first `min(m,n)` columns.
    ///
    /// Returns the index into `rowval` / `nzval` of each diagonal entry, or
    /// `None` where it is not structurally present.   If `require` is set, a
    /// missing diagonal entry is reported as an error instead.  Row indices
    /// must be sorted.
    pub fn find_diagonal_indices(
        &self,
        require: bool,
    ) -> Result<Vec<Option<usize>>, SparseFormatError> {
        let ndiag = usize::min(self.m, self.n);
        let mut diag = Vec::with_capacity(ndiag);

        for col in 0..ndiag {
            let first = self.colptr[col];
            let rows = &self.rowval[first..self.colptr[col + 1]];
            match rows.binary_search(&col) {
                Ok(idx) => diag.push(Some(first + idx)),
                Err(_) if require => return Err(SparseFormatError::MissingDiagonal(col)),
                Err(_) => diag.push(None),
            }
        }
        Ok(diag)
    }

    /// Drop every entry for which `fkeep(row, col, value)` is false,
    /// compacting storage in place.  Returns the number of entries kept.
    pub fn keep<F>(&mut self, mut fkeep: F) -> usize
    where
        F: FnMut(usize, usize, T) -> bool,
    {
        let mut nz = 0;
        for col in 0..self.n {
            let (first, last) = (self.colptr[col], self.colptr[col + 1]);
            self.colptr[col] = nz;
            for p in first..last {
                if fkeep(self.rowval[p], col, self.nzval[p]) {
                    self.rowval[nz] = self.rowval[p];
                    self.nzval[nz] = self.nzval[p];
                    nz += 1;
                }
            }
        }
        self.colptr[self.n] = nz;
        self.rowval.truncate(nz);
        self.nzval.truncate(nz);
        nz
    }

    /// Remove explicitly stored zeros.  Returns the number of entries removed.
    pub fn drop_zeros(&mut self) -> usize {
        let before = self.nnz();
        before - self.keep(|_, _, v| v != T::zero())
    }
}
