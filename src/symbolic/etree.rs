#![allow(non_snake_case)]

// Elimination tree, postordering and column counts.
// Trees are stored as parent arrays, with roots marked by NO_PARENT.

use super::SymbolicPattern;

/// Parent marker for the roots of an elimination forest
pub const NO_PARENT: usize = usize::MAX;

/// Elimination tree of the matrix with pattern `A`.
///
/// With `ata == false`, `A` is read as the upper triangle of a symmetric
/// matrix and entries below the diagonal are ignored.   With `ata == true`
/// the tree is that of A'*A, computed without forming the product.
///
/// The result satisfies `parent[i] == NO_PARENT || parent[i] > i`.
pub fn etree(A: &SymbolicPattern, ata: bool) -> Vec<usize> {
    let (m, n) = (A.m, A.n);
    let mut parent = vec![NO_PARENT; n];
    let mut ancestor = vec![NO_PARENT; n];

    // most recent column seen in each row, for the A'A case
    let mut prev = if ata { vec![NO_PARENT; m] } else { Vec::new() };

    for k in 0..n {
        for &row in A.column(k) {
            let mut i = if ata { prev[row] } else { row };

            // traverse from i to the root, compressing the path to k.
            // NO_PARENT is never less than k.
            while i < k {
                let inext = ancestor[i];
                ancestor[i] = k;
                if inext == NO_PARENT {
                    parent[i] = k;
                }
                i = inext;
            }
            if ata {
                prev[row] = k;
            }
        }
    }
    parent
}

/// Postorder of the forest given by `parent`, visiting children before
/// their parents.   `post[k]` is the node numbered k in postorder.
pub fn postorder(parent: &[usize]) -> Vec<usize> {
    let n = parent.len();
    let mut head = vec![NO_PARENT; n];
    let mut next = vec![NO_PARENT; n];
    let mut post = Vec::with_capacity(n);
    let mut stack = Vec::with_capacity(n);

    // build linked lists of children, in reverse so that
    // children are traversed in increasing order
    for j in (0..n).rev() {
        let p = parent[j];
        if p != NO_PARENT {
            next[j] = head[p];
            head[p] = j;
        }
    }

    for root in (0..n).filter(|&j| parent[j] == NO_PARENT) {
        depth_first(root, &mut head, &next, &mut stack, &mut post);
    }
    post
}

// nonrecursive depth-first search of the tree rooted at `root`.
// Consumes the child lists in `head`.
fn depth_first(
    root: usize,
    head: &mut [usize],
    next: &[usize],
    stack: &mut Vec<usize>,
    post: &mut Vec<usize>,
) {
    stack.push(root);
    while let Some(&p) = stack.last() {
        let child = head[p];
        if child == NO_PARENT {
            stack.pop();
            post.push(p);
        } else {
            head[p] = next[child];
            stack.push(child);
        }
    }
}

/// Number of nonzeros in each column of the Cholesky factor L of A
/// (`ata == false`, with A read as its upper triangle) or of A'*A
/// (`ata == true`), including the diagonal.  Requires the elimination
/// tree and a postorder of it.
pub fn column_counts(A: &SymbolicPattern, parent: &[usize], post: &[usize], ata: bool) -> Vec<usize> {
    let n = A.n;
    let AT = A.transpose();

    let mut ancestor: Vec<usize> = (0..n).collect();
    let mut maxfirst = vec![-1isize; n];
    let mut prevleaf = vec![-1isize; n];
    let mut first = vec![-1isize; n];
    let mut delta = vec![0isize; n];

    // first[j] is the postorder index of the first descendant of j.
    // delta[j] starts at 1 for leaves
    for (k, &node) in post.iter().enumerate() {
        let mut j = node;
        delta[j] = if first[j] == -1 { 1 } else { 0 };
        while j != NO_PARENT && first[j] == -1 {
            first[j] = k as isize;
            j = parent[j];
        }
    }

    // for A'A, each row of A is attached to the column with the
    // smallest postorder index among its nonzeros
    let (head, next) = if ata {
        rows_by_first_column(&AT, post)
    } else {
        (Vec::new(), Vec::new())
    };

    let mut rows = Vec::new();
    for (k, &j) in post.iter().enumerate() {
        if parent[j] != NO_PARENT {
            delta[parent[j]] -= 1;
        }

        // rows of the transpose contributing to node j
        rows.clear();
        if ata {
            let mut J = head[k];
            while J != NO_PARENT {
                rows.push(J);
                J = next[J];
            }
        } else {
            rows.push(j);
        }

        for &J in &rows {
            for &i in AT.column(J) {
                match leaf(i, j, &first, &mut maxfirst, &mut prevleaf, &mut ancestor) {
                    Leaf::None => {}
                    Leaf::First => delta[j] += 1,
                    Leaf::Subsequent(q) => {
                        delta[j] += 1;
                        delta[q] -= 1;
                    }
                }
            }
        }
        if parent[j] != NO_PARENT {
            ancestor[j] = parent[j];
        }
    }

    // sum up the deltas of each subtree
    for j in 0..n {
        if parent[j] != NO_PARENT {
            delta[parent[j]] += delta[j];
        }
    }
    delta.into_iter().map(|c| c.max(0) as usize).collect()
}

// classification of node j relative to the row subtree of i
enum Leaf {
    // j is not a leaf of the i-th row subtree
    None,
    // j is the first leaf
    First,
    // j is a subsequent leaf, with the least common
    // ancestor of j and the previous leaf
    Subsequent(usize),
}

fn leaf(
    i: usize,
    j: usize,
    first: &[isize],
    maxfirst: &mut [isize],
    prevleaf: &mut [isize],
    ancestor: &mut [usize],
) -> Leaf {
    if i <= j || first[j] <= maxfirst[i] {
        return Leaf::None;
    }
    maxfirst[i] = first[j];
    let jprev = prevleaf[i];
    prevleaf[i] = j as isize;

    if jprev == -1 {
        return Leaf::First;
    }

    // find the root q of the set containing jprev,
    // then compress the path from jprev to q
    let jprev = jprev as usize;
    let mut q = jprev;
    while q != ancestor[q] {
        q = ancestor[q];
    }
    let mut s = jprev;
    while s != q {
        let sparent = ancestor[s];
        ancestor[s] = q;
        s = sparent;
    }
    Leaf::Subsequent(q)
}

// linked lists of the rows of A (columns of AT), keyed by
// the smallest postorder index of the columns in each row.
// Empty rows land on the extra list n.
fn rows_by_first_column(AT: &SymbolicPattern, post: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let n = AT.m;
    let m = AT.n;
    let mut ipost = vec![0; n];
    for (k, &j) in post.iter().enumerate() {
        ipost[j] = k;
    }

    let mut head = vec![NO_PARENT; n + 1];
    let mut next = vec![NO_PARENT; m];
    for i in 0..m {
        let k = AT.column(i).iter().map(|&j| ipost[j]).min().unwrap_or(n);
        next[i] = head[k];
        head[k] = i;
    }
    (head, next)
}

/// Nonzero counts per column of the factor from an elimination tree
/// computed alongside it: the pattern of each row of L is the union of
/// tree paths, so walking them gives counts without a postorder.
/// `A` is read as the upper triangle of a symmetric matrix.
/// Counts exclude the diagonal.
pub fn etree_with_counts(A: &SymbolicPattern) -> (Vec<usize>, Vec<usize>) {
    let n = A.n;
    let mut parent = vec![NO_PARENT; n];
    let mut Lnz = vec![0; n];
    let mut flag = vec![NO_PARENT; n];

    for j in 0..n {
        flag[j] = j;
        for &row in A.column(j) {
            let mut i = row;
            if i > j {
                continue;
            }
            while flag[i] != j {
                if parent[i] == NO_PARENT {
                    parent[i] = j;
                }
                Lnz[i] += 1;
                flag[i] = j;
                i = parent[i];
            }
        }
    }
    (parent, Lnz)
}
