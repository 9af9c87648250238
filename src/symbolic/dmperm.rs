#![allow(non_snake_case)]

// Maximum transversal, strongly connected components and the
// Dulmage-Mendelsohn block triangular form.  All of it works on the
// bipartite row/column graph of a pattern and never looks at values.

use super::{ReachWorkspace, SymbolicPattern, NO_PARENT};
use crate::algebra::permutation;

/// A maximum matching between the rows and columns of a pattern.
///
/// Every matched pair `(i, j)` is a structural nonzero of the matrix,
/// and no row or column is matched twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matching {
    /// column matched to each row, or [`NO_PARENT`] if unmatched
    pub row_match: Vec<usize>,
    /// row matched to each column, or [`NO_PARENT`] if unmatched
    pub col_match: Vec<usize>,
}

impl Matching {
    /// number of matched pairs
    pub fn len(&self) -> usize {
        self.col_match.iter().filter(|&&i| i != NO_PARENT).count()
    }

    /// true if nothing is matched
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Maximum transversal of A.
///
/// Columns are augmented in natural order with a depth-first search for
/// alternating paths, trying a cheap assignment to an unmatched row first.
/// The search runs on the transpose when A has fewer nonempty rows than
/// nonempty columns.
pub fn maximum_matching(A: &SymbolicPattern) -> Matching {
    let (m, n) = (A.m, A.n);

    // quick return when the diagonal is already zero-free
    let ndiag = (0..n.min(m))
        .filter(|&j| A.column(j).contains(&j))
        .count();
    if ndiag == m.min(n) {
        let diagonal = |len: usize| -> Vec<usize> {
            (0..len)
                .map(|k| if k < ndiag { k } else { NO_PARENT })
                .collect()
        };
        return Matching {
            row_match: diagonal(m),
            col_match: diagonal(n),
        };
    }

    let ncols = (0..n).filter(|&j| !A.column(j).is_empty()).count();
    let mut row_used = vec![false; m];
    A.rowval.iter().for_each(|&i| row_used[i] = true);
    let nrows = row_used.iter().filter(|&&used| used).count();

    if nrows < ncols {
        let Matching {
            row_match,
            col_match,
        } = augment_all(&A.transpose());
        Matching {
            row_match: col_match,
            col_match: row_match,
        }
    } else {
        augment_all(A)
    }
}

/// Structural rank of A, the size of a maximum matching.  An upper bound
/// on the numerical rank.
pub fn structural_rank(A: &SymbolicPattern) -> usize {
    maximum_matching(A).len()
}

fn augment_all(C: &SymbolicPattern) -> Matching {
    let (m, n) = (C.m, C.n);
    let mut row_match = vec![NO_PARENT; m];
    let mut work = AugmentWorkspace {
        cheap: C.colptr[0..n].to_vec(),
        visited: vec![NO_PARENT; n],
        js: vec![0; n],
        is: vec![0; n],
        ps: vec![0; n],
    };
    for k in 0..n {
        work.augment(k, C, &mut row_match);
    }

    let mut col_match = vec![NO_PARENT; n];
    for (i, &j) in row_match.iter().enumerate() {
        if j != NO_PARENT {
            col_match[j] = i;
        }
    }
    Matching {
        row_match,
        col_match,
    }
}

struct AugmentWorkspace {
    // next row to try for a cheap assignment in each column
    cheap: Vec<usize>,
    // last augmenting search that visited each column
    visited: Vec<usize>,
    // column, row and scan position on each level of the search stack
    js: Vec<usize>,
    is: Vec<usize>,
    ps: Vec<usize>,
}

impl AugmentWorkspace {
    // find an augmenting path from column k and flip it into the matching
    fn augment(&mut self, k: usize, C: &SymbolicPattern, row_match: &mut [usize]) {
        let (Cp, Ci) = (&C.colptr, &C.rowval);
        let mut found = false;
        let mut len = 1;
        self.js[0] = k;

        while len > 0 {
            let head = len - 1;
            let j = self.js[head];

            if self.visited[j] != k {
                self.visited[j] = k;
                let mut p = self.cheap[j];
                while p < Cp[j + 1] && !found {
                    let i = Ci[p];
                    found = row_match[i] == NO_PARENT;
                    if found {
                        self.is[head] = i;
                    }
                    p += 1;
                }
                self.cheap[j] = p;
                if found {
                    break;
                }
                self.ps[head] = Cp[j];
            }

            // every row of column j is matched by now, so each one
            // leads on to its matched column
            let end = Cp[j + 1];
            let mut p = self.ps[head];
            while p < end {
                let i = Ci[p];
                if self.visited[row_match[i]] == k {
                    p += 1;
                    continue;
                }
                self.ps[head] = p + 1;
                self.is[head] = i;
                self.js[head + 1] = row_match[i];
                len += 1;
                break;
            }
            if p == end {
                len -= 1;
            }
        }

        if found {
            for p in 0..len {
                row_match[self.is[p]] = self.js[p];
            }
        }
    }
}

/// Strongly connected components of the directed graph of a square
/// pattern, with an edge j -> i for every entry A(i,j).
///
/// Returns `(p, r)`: A(p,p) is block upper triangular with block b in
/// rows and columns `r[b]..r[b+1]`, and nodes within a block in
/// increasing order.
///
/// # Panics
/// Panics if A is not square.
pub fn strongly_connected_components(A: &SymbolicPattern) -> (Vec<usize>, Vec<usize>) {
    assert_eq!(A.m, A.n);
    let n = A.n;
    let At = A.transpose();
    let identity = permutation::identity_permutation(n);
    let mut work = ReachWorkspace::new(n);

    // nodes in decreasing order of finish time in a search of A
    let mut order = vec![0; n];
    work.reach(&A.colptr, &A.rowval, &identity, &identity, 0, &mut order);

    // each search of A' from an unvisited node collects one component,
    // filling p from the back
    let mut p = vec![0; n];
    let mut ends = vec![n];
    let mut top = n;
    for &i in &order {
        if work.is_visited(i, 1) {
            continue;
        }
        top = work.dfs(i, &At.colptr, &At.rowval, top, &identity, 1, &mut p);
        ends.push(top);
    }
    ends.reverse();
    let r = ends;
    let nb = r.len() - 1;

    // sort each block into natural order
    let mut block = vec![0; n];
    for b in 0..nb {
        for &i in &p[r[b]..r[b + 1]] {
            block[i] = b;
        }
    }
    let mut next = r[0..nb].to_vec();
    for (i, &b) in block.iter().enumerate() {
        p[next[b]] = i;
        next[b] += 1;
    }
    (p, r)
}

/// Dulmage-Mendelsohn decomposition of a rectangular pattern.
///
/// A(p,q) is block upper triangular.  The coarse decomposition splits the
/// rows into sets R1, R2, R3, R0 and the columns into C0, C1, C2, C3:
///
/// * `A(R1, C0 ∪ C1)` is the underdetermined part, with C0 the unmatched
///   columns;
/// * `A(R2, C2)` is square with a zero-free diagonal;
/// * `A(R3 ∪ R0, C3)` is the overdetermined part, with R0 the unmatched
///   rows.
///
/// The square part is further split into its strongly connected
/// components, giving the fine blocks: block b holds rows `r[b]..r[b+1]`
/// and columns `s[b]..s[b+1]` of A(p,q).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DulmageMendelsohn {
    p: Vec<usize>,
    q: Vec<usize>,
    r: Vec<usize>,
    s: Vec<usize>,
    rr: [usize; 5],
    cc: [usize; 5],
}

impl DulmageMendelsohn {
    /// Compute the coarse and then the fine decomposition of A.
    pub fn new(A: &SymbolicPattern) -> Self {
        let (m, n) = (A.m, A.n);
        let matching = maximum_matching(A);
        let (row_match, col_match) = (&matching.row_match, &matching.col_match);

        let mut p = vec![0; m];
        let mut q = vec![0; n];
        let mut rr = [0; 5];
        let mut cc = [0; 5];

        // coarse decomposition: C1 and R1 are reached from the unmatched
        // columns C0, C3 and R3 from the unmatched rows R0
        let mut wi = vec![UNMARKED; m];
        let mut wj = vec![UNMARKED; n];
        bfs(A, &mut wi, &mut wj, &mut q, col_match, row_match, 1);
        bfs(&A.transpose(), &mut wj, &mut wi, &mut p, row_match, col_match, 3);

        // C0
        let mut kc = 0;
        for j in (0..n).filter(|&j| wj[j] == 0) {
            q[kc] = j;
            kc += 1;
        }
        cc[1] = kc;

        // (R1, C1), (R2, C2) and (R3, C3) in turn
        let mut kr = 0;
        for (set, mark) in [(1, 1), (2, UNMARKED), (3, 3)] {
            for j in (0..n).filter(|&j| wj[j] == mark) {
                p[kr] = col_match[j];
                q[kc] = j;
                kr += 1;
                kc += 1;
            }
            cc[set + 1] = kc;
            rr[set] = kr;
        }

        // R0
        for i in (0..m).filter(|&i| wi[i] == 0) {
            p[kr] = i;
            kr += 1;
        }
        rr[4] = kr;

        // fine decomposition of A(R2, C2)
        let nc = cc[3] - cc[2];
        let (ps, rs) = if nc > 0 {
            let pinv = invert(&p);
            let C = A.permute(Some(&pinv), Some(&q));
            let mut colptr = vec![0; nc + 1];
            let mut rowval = Vec::new();
            for k in 0..nc {
                rowval.extend(
                    C.column(cc[2] + k)
                        .iter()
                        .filter(|&&i| (rr[1]..rr[2]).contains(&i))
                        .map(|&i| i - rr[1]),
                );
                colptr[k + 1] = rowval.len();
            }
            strongly_connected_components(&SymbolicPattern::new(nc, nc, colptr, rowval))
        } else {
            (Vec::new(), vec![0])
        };

        let qc: Vec<usize> = ps.iter().map(|&k| q[cc[2] + k]).collect();
        q[cc[2]..cc[3]].copy_from_slice(&qc);
        let pr: Vec<usize> = ps.iter().map(|&k| p[rr[1] + k]).collect();
        p[rr[1]..rr[2]].copy_from_slice(&pr);

        // fine blocks: the leading coarse block, the components of
        // A(R2, C2), then the trailing coarse block
        let nb1 = rs.len() - 1;
        let mut r = Vec::with_capacity(nb1 + 3);
        let mut s = Vec::with_capacity(nb1 + 3);
        if cc[2] > 0 {
            r.push(0);
            s.push(0);
        }
        for &b in &rs[0..nb1] {
            r.push(b + rr[1]);
            s.push(b + cc[2]);
        }
        if rr[2] < m {
            r.push(rr[2]);
            s.push(cc[3]);
        }
        r.push(m);
        s.push(n);

        log::debug!(
            target: "spfactor::symbolic",
            "dmperm: {} x {}, structural rank {}, {} blocks",
            m, n, rr[3], r.len() - 1
        );
        DulmageMendelsohn { p, q, r, s, rr, cc }
    }

    /// row permutation p
    pub fn p(&self) -> &[usize] {
        &self.p
    }
    /// column permutation q
    pub fn q(&self) -> &[usize] {
        &self.q
    }
    /// row boundaries of the fine blocks, length `nblocks()+1`
    pub fn r(&self) -> &[usize] {
        &self.r
    }
    /// column boundaries of the fine blocks, length `nblocks()+1`
    pub fn s(&self) -> &[usize] {
        &self.s
    }
    /// coarse row boundaries: R1, R2, R3 and R0 are `rr[0..1]`,
    /// `rr[1..2]`, `rr[2..3]` and `rr[3..4]` as ranges into p
    pub fn coarse_rows(&self) -> &[usize; 5] {
        &self.rr
    }
    /// coarse column boundaries: C0, C1, C2 and C3 are `cc[0..1]`,
    /// `cc[1..2]`, `cc[2..3]` and `cc[3..4]` as ranges into q
    pub fn coarse_columns(&self) -> &[usize; 5] {
        &self.cc
    }
    /// number of fine blocks
    pub fn nblocks(&self) -> usize {
        self.r.len() - 1
    }
    /// number of matched rows
    pub fn structural_rank(&self) -> usize {
        self.rr[3]
    }
    /// number of 1 x 1 fine blocks
    pub fn singletons(&self) -> usize {
        self.r
            .windows(2)
            .zip(self.s.windows(2))
            .filter(|(r, s)| r[1] == r[0] + 1 && s[1] == s[0] + 1)
            .count()
    }
}

const UNMARKED: isize = -1;

// Breadth-first search along alternating paths from the unmatched
// columns of A.  Unmatched columns get mark 0; rows reached and the
// columns they are matched to get `mark`.
fn bfs(
    A: &SymbolicPattern,
    wi: &mut [isize],
    wj: &mut [isize],
    queue: &mut [usize],
    col_match: &[usize],
    row_match: &[usize],
    mark: isize,
) {
    let mut tail = 0;
    for j in (0..A.n).filter(|&j| col_match[j] == NO_PARENT) {
        wj[j] = 0;
        queue[tail] = j;
        tail += 1;
    }

    let mut head = 0;
    while head < tail {
        let j = queue[head];
        head += 1;
        for &i in A.column(j) {
            if wi[i] >= 0 {
                continue;
            }
            wi[i] = mark;
            let j2 = row_match[i];
            if j2 == NO_PARENT || wj[j2] >= 0 {
                continue;
            }
            wj[j2] = mark;
            queue[tail] = j2;
            tail += 1;
        }
    }
}

// inverse of a permutation built here, so known to be valid
fn invert(p: &[usize]) -> Vec<usize> {
    let mut pinv = vec![0; p.len()];
    permutation::ipermute(&mut pinv, &permutation::identity_permutation(p.len()), p);
    pinv
}
