use crate::algebra::{CooMatrix, CscMatrix, FloatT, SparseFormatError};

impl<T> CooMatrix<T>
where
    T: FloatT,
{
    /// Empty `m x n` triplet matrix
    pub fn new(m: usize, n: usize) -> Self {
        Self::with_capacity(m, n, 0)
    }

    /// Empty `m x n` triplet matrix with room for `nnz` entries
    pub fn with_capacity(m: usize, n: usize, nnz: usize) -> Self {
        CooMatrix {
            m,
            n,
            rows: Vec::with_capacity(nnz),
            cols: Vec::with_capacity(nnz),
            vals: Vec::with_capacity(nnz),
        }
    }

    /// number of stored triplets, counting duplicates
    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    /// Append the entry `(i, j, v)`.
    ///
    /// Exact zeros are silently dropped.   Repeated `(i, j)` pairs are
    /// kept as separate triplets until conversion.
    pub fn push(&mut self, i: usize, j: usize, v: T) -> Result<(), SparseFormatError> {
        if i >= self.m {
            return Err(SparseFormatError::BadRowval);
        }
        if j >= self.n {
            return Err(SparseFormatError::BadColval);
        }
        if v == T::zero() {
            return Ok(());
        }
        self.rows.push(i);
        self.cols.push(j);
        self.vals.push(v);
        Ok(())
    }

    /// Iterator over stored `(row, col, value)` triplets
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.rows
            .iter()
            .zip(self.cols.iter())
            .zip(self.vals.iter())
            .map(|((&i, &j), &v)| (i, j, v))
    }

    /// Compress into CSC format with sorted row indices.   When
    /// `sum_duplicates` is set, entries sharing a position are summed
    /// into one; otherwise they are kept as separate structural entries.
    pub fn to_csc(&self, sum_duplicates: bool) -> CscMatrix<T> {
        let nnz = self.nnz();
        let mut A = CscMatrix::spalloc(self.m, self.n, nnz);

        // count entries in each column
        A.colptr.fill(0);
        for &j in &self.cols {
            A.colptr[j] += 1;
        }
        A.colcount_to_colptr();

        // scatter, with colptr used as the next free slot
        for (i, j, v) in self.triplets() {
            let dest = A.colptr[j];
            A.rowval[dest] = i;
            A.nzval[dest] = v;
            A.colptr[j] += 1;
        }
        A.backshift_colptrs();

        if sum_duplicates {
            sum_duplicate_entries(&mut A);
        }
        A.sort_indices();
        A
    }
}

impl<T: FloatT> From<&CooMatrix<T>> for CscMatrix<T> {
    fn from(coo: &CooMatrix<T>) -> Self {
        coo.to_csc(true)
    }
}

// merge entries with equal row index within each column,
// compacting storage in place
fn sum_duplicate_entries<T: FloatT>(A: &mut CscMatrix<T>) {
    // position of row i within the current column, if seen
    let mut w = vec![usize::MAX; A.m];
    let mut nz = 0;

    for j in 0..A.n {
        let first = nz;
        let (start, stop) = (A.colptr[j], A.colptr[j + 1]);
        A.colptr[j] = nz;
        for p in start..stop {
            let i = A.rowval[p];
            if w[i] != usize::MAX && w[i] >= first {
                let v = A.nzval[p];
                A.nzval[w[i]] += v;
            } else {
                w[i] = nz;
                A.rowval[nz] = i;
                A.nzval[nz] = A.nzval[p];
                nz += 1;
            }
        }
    }
    A.colptr[A.n] = nz;
    A.rowval.truncate(nz);
    A.nzval.truncate(nz);
}
