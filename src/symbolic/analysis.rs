#![allow(non_snake_case)]

use super::*;
use crate::algebra::{permutation, CscMatrix, FloatT, ShapedMatrix, SparseFormatError};
use crate::algebra::counts_to_colptr;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Error codes returnable from symbolic analysis
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolicError {
    #[error("Matrix must be square, found {m} x {n}")]
    NotSquare { m: usize, n: usize },
    #[error("Ordering {ordering} is not supported by the {kind} factorization")]
    UnsupportedOrdering {
        ordering: ColumnOrdering,
        kind: FactorizationKind,
    },
    #[error("Minimum degree ordering failed")]
    OrderingFailed,
    #[error(transparent)]
    Format(#[from] SparseFormatError),
}

/// The four supported factorizations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FactorizationKind {
    /// A = L*L', A symmetric positive definite
    #[default]
    Cholesky,
    /// A = L*D*L', A symmetric with nonzero pivots
    Ldl,
    /// P*A*Q = L*U with partial pivoting
    Lu,
    /// Householder QR for least squares / minimum norm problems
    Qr,
}

impl std::fmt::Display for FactorizationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FactorizationKind::Cholesky => "Cholesky",
            FactorizationKind::Ldl => "LDL'",
            FactorizationKind::Lu => "LU",
            FactorizationKind::Qr => "QR",
        };
        write!(f, "{}", s)
    }
}

/// Result of the symbolic phase of a factorization.
///
/// Built once from the nonzero pattern of a matrix and an ordering choice,
/// and reusable for any matrix sharing that pattern.  Which fields are
/// meaningful depends on the [kind](SymbolicFactorization::kind):
///
/// * Cholesky / LDL': `q` is the symmetric permutation and `pinv` its
///   inverse; `parent` is the elimination tree of P*A*P' and `cp` the column
///   pointers of L.
/// * LU: only `q` (column ordering) and the initial guesses `lnz`, `unz`
///   are set.  The row permutation comes from pivoting in the numeric phase.
/// * QR: `q` is the column ordering, `pinv` the row permutation over
///   `m2 >= m` rows, `parent` the elimination tree of A'A, `leftmost` the
///   leftmost column of each row and `cp` the column counts of R.
///   When the input has fewer rows than columns, all of the above describe
///   its transpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicFactorization {
    pub(crate) kind: FactorizationKind,
    pub(crate) ordering: ColumnOrdering,
    pub(crate) m: usize,
    pub(crate) n: usize,
    pub(crate) pattern: SymbolicPattern,
    pub(crate) pinv: Vec<usize>,
    pub(crate) q: Vec<usize>,
    pub(crate) parent: Vec<usize>,
    pub(crate) cp: Vec<usize>,
    pub(crate) leftmost: Vec<usize>,
    pub(crate) m2: usize,
    pub(crate) lnz: usize,
    pub(crate) unz: usize,
    pub(crate) transposed: bool,
}

impl SymbolicFactorization {
    fn empty<T: FloatT>(kind: FactorizationKind, ordering: ColumnOrdering, A: &CscMatrix<T>) -> Self {
        let (m, n) = A.size();
        SymbolicFactorization {
            kind,
            ordering,
            m,
            n,
            pattern: SymbolicPattern::from(A),
            pinv: Vec::new(),
            q: Vec::new(),
            parent: Vec::new(),
            cp: Vec::new(),
            leftmost: Vec::new(),
            m2: m,
            lnz: 0,
            unz: 0,
            transposed: false,
        }
    }

    /// Symbolic Cholesky analysis.  Only the upper triangle of A is read.
    pub fn cholesky<T: FloatT>(
        A: &CscMatrix<T>,
        ordering: ColumnOrdering,
    ) -> Result<Self, SymbolicError> {
        let mut S = Self::symmetric_ordering(A, ordering, FactorizationKind::Cholesky)?;

        let (C, _) = A.permute_symmetric(&S.pinv);
        let C = SymbolicPattern::from(&C);
        S.parent = etree(&C, false);
        let post = postorder(&S.parent);
        let counts = column_counts(&C, &S.parent, &post, false);
        S.cp = counts_to_colptr(&counts);
        S.lnz = S.cp[S.n];
        S.unz = S.lnz;

        log::debug!(target: "spfactor::symbolic", "cholesky analysis: n = {}, nnz(L) = {}", S.n, S.lnz);
        Ok(S)
    }

    /// Symbolic LDL' analysis.  Only the upper triangle of A is read.
    /// The counts in `cp` exclude the unit diagonal of L.
    pub fn ldl<T: FloatT>(A: &CscMatrix<T>, ordering: ColumnOrdering) -> Result<Self, SymbolicError> {
        let mut S = Self::symmetric_ordering(A, ordering, FactorizationKind::Ldl)?;

        let (C, _) = A.permute_symmetric(&S.pinv);
        let (parent, Lnz) = etree_with_counts(&SymbolicPattern::from(&C));
        S.parent = parent;
        S.cp = counts_to_colptr(&Lnz);
        S.lnz = S.cp[S.n];
        S.unz = S.lnz;

        log::debug!(target: "spfactor::symbolic", "ldl analysis: n = {}, nnz(L) = {}", S.n, S.lnz);
        Ok(S)
    }

    /// Symbolic LU analysis: a column ordering and initial storage guesses.
    pub fn lu<T: FloatT>(A: &CscMatrix<T>, ordering: ColumnOrdering) -> Result<Self, SymbolicError> {
        let (m, n) = A.size();
        if m != n {
            return Err(SymbolicError::NotSquare { m, n });
        }
        let mut S = Self::empty(FactorizationKind::Lu, ordering, A);
        S.q = ordering.permutation(A)?;
        S.unz = 4 * A.nnz() + n;
        S.lnz = S.unz;

        log::debug!(target: "spfactor::symbolic", "lu analysis: n = {}, initial nnz(L) = {}", n, S.lnz);
        Ok(S)
    }

    /// Symbolic QR analysis.  When A has fewer rows than columns, the
    /// analysis is of A' and [`is_transposed`](SymbolicFactorization::is_transposed)
    /// is set.
    pub fn qr<T: FloatT>(A: &CscMatrix<T>, ordering: ColumnOrdering) -> Result<Self, SymbolicError> {
        if A.m < A.n {
            let mut S = Self::qr_inner(&A.transpose(), ordering)?;
            S.pattern = SymbolicPattern::from(A);
            S.transposed = true;
            return Ok(S);
        }
        Self::qr_inner(A, ordering)
    }

    fn qr_inner<T: FloatT>(A: &CscMatrix<T>, ordering: ColumnOrdering) -> Result<Self, SymbolicError> {
        let (m, n) = A.size();
        if ordering == ColumnOrdering::MinimumDegreeAtPlusA && m != n {
            return Err(SymbolicError::UnsupportedOrdering {
                ordering,
                kind: FactorizationKind::Qr,
            });
        }
        let mut S = Self::empty(FactorizationKind::Qr, ordering, A);
        S.q = ordering.permutation(A)?;

        let C = SymbolicPattern::from(A).permute(None, Some(&S.q));
        S.parent = etree(&C, true);
        let post = postorder(&S.parent);
        let counts = column_counts(&C, &S.parent, &post, true);
        S.cp = counts_to_colptr(&counts);
        S.unz = S.cp[n];

        let (pinv, leftmost, m2, vnz) = row_counts(&C, &S.parent);
        S.pinv = pinv;
        S.leftmost = leftmost;
        S.m2 = m2;
        S.lnz = vnz;

        log::debug!(
            target: "spfactor::symbolic",
            "qr analysis: {} x {}, m2 = {}, nnz(V) = {}, nnz(R) = {}",
            m, n, S.m2, S.lnz, S.unz
        );
        Ok(S)
    }

    // ordering and inverse for the symmetric factorizations
    fn symmetric_ordering<T: FloatT>(
        A: &CscMatrix<T>,
        ordering: ColumnOrdering,
        kind: FactorizationKind,
    ) -> Result<Self, SymbolicError> {
        let (m, n) = A.size();
        if m != n {
            return Err(SymbolicError::NotSquare { m, n });
        }
        if !ordering.is_symmetric() {
            return Err(SymbolicError::UnsupportedOrdering { ordering, kind });
        }
        let mut S = Self::empty(kind, ordering, A);
        S.q = ordering.permutation(A)?;
        S.pinv = permutation::invperm(&S.q)?;
        Ok(S)
    }

    /// the factorization this analysis was computed for
    pub fn kind(&self) -> FactorizationKind {
        self.kind
    }
    /// the ordering strategy used
    pub fn ordering(&self) -> ColumnOrdering {
        self.ordering
    }
    /// inverse row permutation (see the type documentation)
    pub fn pinv(&self) -> &[usize] {
        &self.pinv
    }
    /// column permutation
    pub fn q(&self) -> &[usize] {
        &self.q
    }
    /// elimination tree, with [`NO_PARENT`] marking roots
    pub fn parent(&self) -> &[usize] {
        &self.parent
    }
    /// predicted column pointers of the factor
    pub fn cp(&self) -> &[usize] {
        &self.cp
    }
    /// leftmost nonzero column of each row (QR only)
    pub fn leftmost(&self) -> &[usize] {
        &self.leftmost
    }
    /// number of rows after padding with fictitious rows (QR only)
    pub fn m2(&self) -> usize {
        self.m2
    }
    /// predicted nonzeros of L (or V for QR)
    pub fn lnz(&self) -> usize {
        self.lnz
    }
    /// predicted nonzeros of U (or R for QR)
    pub fn unz(&self) -> usize {
        self.unz
    }
    /// dimensions of the analyzed matrix (after transposition for QR)
    pub fn size(&self) -> (usize, usize) {
        (self.m, self.n)
    }
    /// true if a QR analysis was done on the transpose
    pub fn is_transposed(&self) -> bool {
        self.transposed
    }
    /// nonzero pattern of the analyzed matrix, as it was given
    pub fn pattern(&self) -> &SymbolicPattern {
        &self.pattern
    }

    // true if A has exactly the analyzed pattern.  Entries are compared
    // as stored, so a reordered or padded column counts as a new pattern.
    pub(crate) fn matches<T: FloatT>(&self, A: &CscMatrix<T>, kind: FactorizationKind) -> bool {
        let P = &self.pattern;
        self.kind == kind
            && (A.m, A.n) == (P.m, P.n)
            && A.colptr == P.colptr
            && A.rowval == P.rowval
    }
}

// Row permutation and Householder vector counts for QR.
//
// Each row is queued on its leftmost column.  Column k takes the first
// queued row as its pivot row, or a new fictitious row when its queue is
// empty, and passes the remaining rows on to its parent.  Returns
// (pinv, leftmost, m2, nnz(V)).
fn row_counts(A: &SymbolicPattern, parent: &[usize]) -> (Vec<usize>, Vec<usize>, usize, usize) {
    let (m, n) = (A.m, A.n);
    let mut pinv = vec![NO_PARENT; m + n];
    let mut leftmost = vec![NO_PARENT; m];
    let mut next = vec![NO_PARENT; m];
    let mut head = vec![NO_PARENT; n];
    let mut tail = vec![NO_PARENT; n];
    let mut nque = vec![0isize; n];

    for k in (0..n).rev() {
        for &i in A.column(k) {
            leftmost[i] = k;
        }
    }

    // queue each row on its leftmost column
    for i in (0..m).rev() {
        let k = leftmost[i];
        if k == NO_PARENT {
            continue;
        }
        if nque[k] == 0 {
            tail[k] = i;
        }
        nque[k] += 1;
        next[i] = head[k];
        head[k] = i;
    }

    let mut lnz = 0;
    let mut m2 = m;
    for k in 0..n {
        // pivot row of column k, or a fictitious row
        let mut i = head[k];
        lnz += 1;
        if i == NO_PARENT {
            i = m2;
            m2 += 1;
        }
        pinv[i] = k;

        nque[k] -= 1;
        if nque[k] <= 0 {
            continue;
        }
        lnz += nque[k] as usize;

        // move the remaining rows to the parent's queue
        let pa = parent[k];
        if pa != NO_PARENT {
            if nque[pa] == 0 {
                tail[pa] = tail[k];
            }
            next[tail[k]] = head[pa];
            head[pa] = next[i];
            nque[pa] += nque[k];
        }
    }

    // rows never chosen as pivots follow the columns
    let mut k = n;
    for slot in pinv.iter_mut().take(m) {
        if *slot == NO_PARENT {
            *slot = k;
            k += 1;
        }
    }
    pinv.truncate(m2);
    (pinv, leftmost, m2, lnz)
}
