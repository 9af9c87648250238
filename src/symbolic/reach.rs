#![allow(non_snake_case)]

// Reachability queries used by the numeric phases to find the
// nonzero pattern of a sparse triangular solve.  Visited nodes are
// marked with an epoch stamp, so the marker arrays never need to be
// cleared between columns as long as each query uses a fresh stamp.

use super::NO_PARENT;

/// Pattern of row k of the Cholesky factor L, from the elimination tree.
///
/// `colptr` / `rowval` describe the upper triangle of the permuted matrix;
/// only the entries with row index <= k in column k are read.   The
/// pattern is written to `s[top..n]` in topological order and `top` is
/// returned.   `flag` must not hold `k` for any node on entry.
pub fn etree_reach(
    colptr: &[usize],
    rowval: &[usize],
    k: usize,
    parent: &[usize],
    s: &mut [usize],
    flag: &mut [usize],
) -> usize {
    let n = parent.len();
    let mut top = n;

    // mark node k as visited
    flag[k] = k;
    for &row in &rowval[colptr[k]..colptr[k + 1]] {
        if row > k {
            continue;
        }

        // walk up the tree from row to the first flagged node,
        // collecting the path at the bottom of s
        let mut i = row;
        let mut len = 0;
        while i != NO_PARENT && flag[i] != k {
            s[len] = i;
            len += 1;
            flag[i] = k;
            i = parent[i];
        }

        // push the path onto the stack at the top of s
        while len > 0 {
            top -= 1;
            len -= 1;
            s[top] = s[len];
        }
    }
    top
}

/// Workspace for depth-first reachability over a partially
/// built lower triangular factor.
#[derive(Debug)]
pub(crate) struct ReachWorkspace {
    stack: Vec<usize>,
    pstack: Vec<usize>,
    visited: Vec<usize>,
}

impl ReachWorkspace {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            stack: vec![0; n],
            pstack: vec![0; n],
            visited: vec![usize::MAX; n],
        }
    }

    /// Nodes reachable in the graph of G from the nodes in `starts`.
    ///
    /// Column `pinv[j]` of G holds the out-edges of node j, while nodes with
    /// `pinv[j] == NO_PARENT` have no out-edges.  The reachable set is
    /// written to `xi[top..n]` in topological order and `top` is returned.
    /// `stamp` must differ from every stamp used on this workspace before.
    pub(crate) fn reach(
        &mut self,
        gp: &[usize],
        gi: &[usize],
        starts: &[usize],
        pinv: &[usize],
        stamp: usize,
        xi: &mut [usize],
    ) -> usize {
        let mut top = xi.len();
        for &j in starts {
            if self.visited[j] != stamp {
                top = self.dfs(j, gp, gi, top, pinv, stamp, xi);
            }
        }
        top
    }

    /// true if node j was visited under `stamp`
    pub(crate) fn is_visited(&self, j: usize, stamp: usize) -> bool {
        self.visited[j] == stamp
    }

    /// Nonrecursive depth-first search from node j.  Nodes are written
    /// to `xi` below `top` as they finish, and the new top is returned.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn dfs(
        &mut self,
        j: usize,
        gp: &[usize],
        gi: &[usize],
        mut top: usize,
        pinv: &[usize],
        stamp: usize,
        xi: &mut [usize],
    ) -> usize {
        let (stack, pstack, visited) = (&mut self.stack, &mut self.pstack, &mut self.visited);
        let mut head = 0;
        stack[0] = j;

        loop {
            let j = stack[head];
            let jnew = pinv[j];

            // edges of j are gi[gp[jnew]..gp[jnew+1]], none if unpivoted
            let (first, last) = if jnew == NO_PARENT {
                (0, 0)
            } else {
                (gp[jnew], gp[jnew + 1])
            };

            if visited[j] != stamp {
                visited[j] = stamp;
                pstack[head] = first;
            }

            let mut done = true;
            for p in pstack[head]..last {
                let i = gi[p];
                if visited[i] == stamp {
                    continue;
                }
                // pause the scan of j and descend into i
                pstack[head] = p;
                head += 1;
                stack[head] = i;
                done = false;
                break;
            }

            if done {
                top -= 1;
                xi[top] = j;
                if head == 0 {
                    break;
                }
                head -= 1;
            }
        }
        top
    }
}
