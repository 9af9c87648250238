#![allow(non_snake_case)]

use super::{SymbolicError, SymbolicPattern};
use crate::algebra::{permutation, CscMatrix, FloatT, ShapedMatrix};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fill-reducing ordering strategy.
///
/// Every ordering yields a column permutation `q`, applied uniformly by the
/// symbolic and numeric phases.  Symmetric factorizations apply it to rows
/// and columns alike.  Orderings only affect performance: every
/// factorization is correct under [`Natural`](ColumnOrdering::Natural).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColumnOrdering {
    /// identity ordering
    Natural,
    /// approximate minimum degree on A + A'
    #[default]
    MinimumDegreeAtPlusA,
    /// approximate minimum degree on S'S, where S is A with dense rows removed
    MinimumDegreeStS,
    /// approximate minimum degree on A'A
    MinimumDegreeAtA,
}

impl std::fmt::Display for ColumnOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColumnOrdering::Natural => "natural",
            ColumnOrdering::MinimumDegreeAtPlusA => "amd(A+A')",
            ColumnOrdering::MinimumDegreeStS => "amd(S'S)",
            ColumnOrdering::MinimumDegreeAtA => "amd(A'A)",
        };
        write!(f, "{}", s)
    }
}

impl ColumnOrdering {
    /// True for orderings applicable to a symmetric factorization
    pub fn is_symmetric(&self) -> bool {
        matches!(
            self,
            ColumnOrdering::Natural | ColumnOrdering::MinimumDegreeAtPlusA
        )
    }

    /// Compute the permutation `q` for the matrix A.
    ///
    /// `MinimumDegreeAtPlusA` requires a square matrix.  Structurally the
    /// diagonal is ignored by every minimum degree variant.
    pub fn permutation<T: FloatT>(&self, A: &CscMatrix<T>) -> Result<Vec<usize>, SymbolicError> {
        let n = A.ncols();
        if *self == ColumnOrdering::Natural || n == 0 {
            return Ok(permutation::identity_permutation(n));
        }

        let pattern = SymbolicPattern::from(A);
        let mut C = match self {
            ColumnOrdering::MinimumDegreeAtPlusA => {
                if !A.is_square() {
                    return Err(SymbolicError::NotSquare { m: A.m, n: A.n });
                }
                pattern.add(&pattern.transpose())
            }
            ColumnOrdering::MinimumDegreeStS => {
                let S = drop_dense_rows(&pattern);
                S.transpose().multiply(&S)
            }
            ColumnOrdering::MinimumDegreeAtA => pattern.transpose().multiply(&pattern),
            ColumnOrdering::Natural => unreachable!(),
        };
        C.drop_diagonal();

        let control = amd::Control::default();
        let (perm, _iperm, _info) = amd::order(n, &C.colptr, &C.rowval, &control)
            .map_err(|_| SymbolicError::OrderingFailed)?;

        log::debug!(
            target: "spfactor::ordering",
            "{} ordering of {} columns, nnz(C) = {}",
            self,
            n,
            C.nnz()
        );

        if !permutation::is_permutation(&perm) {
            return Err(SymbolicError::OrderingFailed);
        }
        Ok(perm)
    }
}

// Remove rows with more than max(16, 10*sqrt(n)) entries, capped at n-2.
// Dense rows would make S'S nearly full and the ordering meaningless.
fn drop_dense_rows(A: &SymbolicPattern) -> SymbolicPattern {
    let n = A.n;
    let dense = usize::max(16, (10.0 * (n as f64).sqrt()) as usize);
    let dense = usize::min(n.saturating_sub(2), dense);

    let AT = A.transpose();
    let mut keep = AT.clone();
    keep.keep(|_, row| AT.column(row).len() <= dense);

    // drop the emptied rows entirely
    let mut S = keep.transpose();
    let mut newrow = vec![usize::MAX; S.m];
    let mut m2 = 0;
    for (i, slot) in newrow.iter_mut().enumerate() {
        if AT.column(i).len() <= dense {
            *slot = m2;
            m2 += 1;
        }
    }
    S.rowval.iter_mut().for_each(|r| *r = newrow[*r]);
    S.m = m2;
    S
}
