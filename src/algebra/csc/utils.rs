//---------------------------------------------------------
// low-level internal utilities for counting / filling entries
// of compressed column matrices.
//---------------------------------------------------------

use crate::algebra::{CscMatrix, FloatT};

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    // convert per-column counts held in colptr[0..n] into
    // column pointers.  colptr[n] must hold zero on entry.
    pub(crate) fn colcount_to_colptr(&mut self) {
        let mut currentptr = 0;
        for p in &mut self.colptr {
            let count = *p;
            *p = currentptr;
            currentptr += count;
        }
    }

    // after filling using colptr as a "next free slot" marker,
    // the pointers are shifted one column to the right
    pub(crate) fn backshift_colptrs(&mut self) {
        self.colptr.rotate_right(1);
        self.colptr[0] = 0;
    }
}

/// Column pointers from a vector of per-column counts.
/// The result has length `counts.len() + 1`.
pub(crate) fn counts_to_colptr(counts: &[usize]) -> Vec<usize> {
    let mut colptr = Vec::with_capacity(counts.len() + 1);
    let mut acc = 0;
    colptr.push(0);
    for c in counts {
        acc += c;
        colptr.push(acc);
    }
    colptr
}

// x += beta * A(:,j), appending newly touched rows of the
// output column to `rows`.  A row i is considered already
// present in the current output column when w[i] == mark.
pub(crate) fn scatter<T: FloatT>(
    A: &CscMatrix<T>,
    j: usize,
    beta: T,
    w: &mut [usize],
    x: &mut [T],
    mark: usize,
    rows: &mut Vec<usize>,
) {
    for p in A.colptr[j]..A.colptr[j + 1] {
        let i = A.rowval[p];
        if w[i] != mark {
            w[i] = mark;
            rows.push(i);
            x[i] = beta * A.nzval[p];
        } else {
            x[i] += beta * A.nzval[p];
        }
    }
}
