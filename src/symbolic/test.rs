#![allow(non_snake_case)]

use super::*;
use crate::algebra::{permutation, CscMatrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn test_matrix_3x3() -> CscMatrix<f64> {
    // A =
    //[  4.0   12.0  -16.0]
    //[ 12.0   37.0  -43.0]
    //[-16.0  -43.0   98.0]
    CscMatrix::from(&[
        [4., 12., -16.], //
        [12., 37., -43.], //
        [-16., -43., 98.], //
    ])
}

fn test_arrow_5x5() -> CscMatrix<f64> {
    // arrow matrix with a dense first row/column.  Eliminating
    // column 0 first fills in everything
    //[ 5  1  1  1  1 ]
    //[ 1  5  ⋅  ⋅  ⋅ ]
    //[ 1  ⋅  5  ⋅  ⋅ ]
    //[ 1  ⋅  ⋅  5  ⋅ ]
    //[ 1  ⋅  ⋅  ⋅  5 ]
    CscMatrix::from(&[
        [5., 1., 1., 1., 1.],
        [1., 5., 0., 0., 0.],
        [1., 0., 5., 0., 0.],
        [1., 0., 0., 5., 0.],
        [1., 0., 0., 0., 5.],
    ])
}

// random structurally symmetric pattern with a full diagonal
fn random_symmetric_pattern(n: usize, density: f64, rng: &mut StdRng) -> SymbolicPattern {
    let mut dense = vec![vec![false; n]; n];
    for i in 0..n {
        dense[i][i] = true;
        for j in (i + 1)..n {
            if rng.gen::<f64>() < density {
                dense[i][j] = true;
                dense[j][i] = true;
            }
        }
    }
    dense_to_pattern(&dense)
}

fn dense_to_pattern(dense: &[Vec<bool>]) -> SymbolicPattern {
    let m = dense.len();
    let n = if m == 0 { 0 } else { dense[0].len() };
    let mut colptr = vec![0];
    let mut rowval = vec![];
    for j in 0..n {
        for (i, row) in dense.iter().enumerate() {
            if row[j] {
                rowval.push(i);
            }
        }
        colptr.push(rowval.len());
    }
    SymbolicPattern::new(m, n, colptr, rowval)
}

// per-column counts of L (diagonal included) by dense
// symbolic elimination of a symmetric pattern
fn brute_force_counts(A: &SymbolicPattern) -> Vec<usize> {
    let n = A.n;
    let mut L = vec![vec![false; n]; n];
    for j in 0..n {
        for &i in A.column(j) {
            L[i][j] = true;
            L[j][i] = true;
        }
    }
    for k in 0..n {
        let rows: Vec<usize> = ((k + 1)..n).filter(|&i| L[i][k]).collect();
        for &i in &rows {
            for &j in &rows {
                L[i][j] = true;
            }
        }
    }
    (0..n)
        .map(|j| (j..n).filter(|&i| L[i][j]).count())
        .collect()
}

#[test]
fn test_etree_dense() {
    let A = SymbolicPattern::from(&test_matrix_3x3());
    let parent = etree(&A, false);
    assert_eq!(parent, vec![1, 2, NO_PARENT]);
}

#[test]
fn test_etree_arrow() {
    let A = SymbolicPattern::from(&test_arrow_5x5());
    let parent = etree(&A, false);
    assert_eq!(parent, vec![1, 2, 3, 4, NO_PARENT]);

    // reversing the order makes the tree a star
    let p: Vec<usize> = (0..5).rev().collect();
    let C = A.permute(Some(&p), Some(&p));
    let parent = etree(&C, false);
    assert_eq!(parent, vec![4, 4, 4, 4, NO_PARENT]);
}

#[test]
fn test_etree_parent_order() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..10 {
        let A = random_symmetric_pattern(30, 0.1, &mut rng);
        let parent = etree(&A, false);
        for (i, &p) in parent.iter().enumerate() {
            assert!(p == NO_PARENT || p > i);
        }
    }
}

#[test]
fn test_postorder() {
    //      4
    //    / | \
    //   1  2  3
    //   |
    //   0
    let parent = vec![1, 4, 4, 4, NO_PARENT];
    let post = postorder(&parent);
    assert_eq!(post, vec![0, 1, 2, 3, 4]);
    assert!(permutation::is_permutation(&post));

    // children appear before parents in a forest
    let parent = vec![3, NO_PARENT, 3, NO_PARENT, 1];
    let post = postorder(&parent);
    assert!(permutation::is_permutation(&post));
    let ipost = permutation::invperm(&post).unwrap();
    for (i, &p) in parent.iter().enumerate() {
        if p != NO_PARENT {
            assert!(ipost[i] < ipost[p]);
        }
    }
}

#[test]
fn test_column_counts_arrow() {
    let A = SymbolicPattern::from(&test_arrow_5x5());
    let parent = etree(&A, false);
    let post = postorder(&parent);
    let counts = column_counts(&A, &parent, &post, false);
    assert_eq!(counts, vec![5, 4, 3, 2, 1]);
}

#[test]
fn test_column_counts_random() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..10 {
        let A = random_symmetric_pattern(25, 0.15, &mut rng);
        let parent = etree(&A, false);
        let post = postorder(&parent);

        // only the upper triangle is read
        let counts = column_counts(&A.triu(), &parent, &post, false);
        assert_eq!(counts, brute_force_counts(&A));
        assert_eq!(column_counts(&A, &parent, &post, false), counts);

        // etree_with_counts excludes the diagonal
        let (parent2, Lnz) = etree_with_counts(&A.triu());
        assert_eq!(parent2, parent);
        let expected: Vec<usize> = counts.iter().map(|c| c - 1).collect();
        assert_eq!(Lnz, expected);
    }
}

#[test]
fn test_column_counts_ata() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..10 {
        let (m, n) = (20, 12);
        let mut dense = vec![vec![false; n]; m];
        for (i, row) in dense.iter_mut().enumerate() {
            row[i % n] = true;
            for x in row.iter_mut() {
                if rng.gen::<f64>() < 0.15 {
                    *x = true;
                }
            }
        }
        let A = dense_to_pattern(&dense);

        // the implicit A'A computations agree with explicit ones
        let AtA = A.transpose().multiply(&A);
        let parent = etree(&A, true);
        assert_eq!(parent, etree(&AtA, false));

        let post = postorder(&parent);
        let counts = column_counts(&A, &parent, &post, true);
        assert_eq!(counts, brute_force_counts(&AtA));
    }
}

#[test]
fn test_etree_reach() {
    let A = SymbolicPattern::from(&test_arrow_5x5());
    let parent = etree(&A, false);
    let n = A.n;
    let mut s = vec![0; n];
    let mut flag = vec![NO_PARENT; n];

    // row 0 of L has no off-diagonal entries
    let top = etree_reach(&A.colptr, &A.rowval, 0, &parent, &mut s, &mut flag);
    assert_eq!(top, n);

    // row 3 of L is [x x x x ⋅] after fill
    let top = etree_reach(&A.colptr, &A.rowval, 3, &parent, &mut s, &mut flag);
    let mut pattern = s[top..].to_vec();
    pattern.sort();
    assert_eq!(pattern, vec![0, 1, 2]);
}

#[test]
fn test_reach_workspace() {
    // lower triangular pattern
    //[ x  ⋅  ⋅  ⋅ ]
    //[ x  x  ⋅  ⋅ ]
    //[ ⋅  ⋅  x  ⋅ ]
    //[ ⋅  x  ⋅  x ]
    let gp = vec![0, 2, 4, 5, 6];
    let gi = vec![0, 1, 1, 3, 2, 3];
    let pinv = permutation::identity_permutation(4);
    let mut ws = ReachWorkspace::new(4);
    let mut xi = vec![0; 4];

    let top = ws.reach(&gp, &gi, &[0], &pinv, 0, &mut xi);
    assert_eq!(&xi[top..], &[0, 1, 3]);

    let top = ws.reach(&gp, &gi, &[2], &pinv, 1, &mut xi);
    assert_eq!(&xi[top..], &[2]);

    // unpivoted nodes have no out-edges
    let pinv = vec![0, NO_PARENT, 2, 3];
    let top = ws.reach(&gp, &gi, &[0], &pinv, 2, &mut xi);
    assert_eq!(&xi[top..], &[0, 1]);
}

#[test]
fn test_orderings_are_permutations() {
    let mut rng = StdRng::seed_from_u64(4);
    let P = random_symmetric_pattern(40, 0.08, &mut rng);
    let A = CscMatrix::new(P.m, P.n, P.colptr.clone(), P.rowval.clone(), vec![1.0; P.nnz()]);

    for ordering in [
        ColumnOrdering::Natural,
        ColumnOrdering::MinimumDegreeAtPlusA,
        ColumnOrdering::MinimumDegreeStS,
        ColumnOrdering::MinimumDegreeAtA,
    ] {
        let q = ordering.permutation(&A).unwrap();
        assert_eq!(q.len(), 40);
        assert!(permutation::is_permutation(&q));
    }
}

#[test]
fn test_ordering_reduces_fill() {
    let A = test_arrow_5x5();
    let q = ColumnOrdering::MinimumDegreeAtPlusA.permutation(&A).unwrap();
    let S = SymbolicFactorization::cholesky(&A, ColumnOrdering::MinimumDegreeAtPlusA).unwrap();
    assert_eq!(S.q(), &q[..]);

    // no fill at all once the dense node is ordered last
    assert_eq!(S.lnz(), 9);
    let S = SymbolicFactorization::cholesky(&A, ColumnOrdering::Natural).unwrap();
    assert_eq!(S.lnz(), 15);
}

#[test]
fn test_ordering_rectangular() {
    let A = CscMatrix::from(&[
        [1., 0., 2.], //
        [0., 3., 0.], //
        [4., 0., 0.], //
        [0., 5., 6.], //
    ]);
    assert!(matches!(
        ColumnOrdering::MinimumDegreeAtPlusA.permutation(&A),
        Err(SymbolicError::NotSquare { m: 4, n: 3 })
    ));
    let q = ColumnOrdering::MinimumDegreeAtA.permutation(&A).unwrap();
    assert!(permutation::is_permutation(&q));

    // empty matrix
    let E = CscMatrix::<f64>::spalloc(0, 0, 0);
    assert!(ColumnOrdering::MinimumDegreeAtA.permutation(&E).unwrap().is_empty());
}

#[test]
fn test_symbolic_cholesky() {
    let A = test_matrix_3x3();
    let S = SymbolicFactorization::cholesky(&A, ColumnOrdering::Natural).unwrap();
    assert_eq!(S.kind(), FactorizationKind::Cholesky);
    assert_eq!(S.parent(), &[1, 2, NO_PARENT]);
    assert_eq!(S.cp(), &[0, 3, 5, 6]);
    assert_eq!(S.lnz(), 6);
    assert_eq!(S.pinv(), &[0, 1, 2]);

    // same result from the upper triangle only
    let S2 = SymbolicFactorization::cholesky(&A.to_triu(), ColumnOrdering::Natural).unwrap();
    assert_eq!(S2.cp(), S.cp());
}

#[test]
fn test_symbolic_rejects_bad_ordering() {
    let A = test_matrix_3x3();
    for ordering in [ColumnOrdering::MinimumDegreeStS, ColumnOrdering::MinimumDegreeAtA] {
        assert!(matches!(
            SymbolicFactorization::cholesky(&A, ordering),
            Err(SymbolicError::UnsupportedOrdering { .. })
        ));
        assert!(matches!(
            SymbolicFactorization::ldl(&A, ordering),
            Err(SymbolicError::UnsupportedOrdering { .. })
        ));
    }

    let B = CscMatrix::from(&[[1., 2., 3.], [4., 5., 6.]]);
    assert!(matches!(
        SymbolicFactorization::cholesky(&B, ColumnOrdering::Natural),
        Err(SymbolicError::NotSquare { m: 2, n: 3 })
    ));
    assert!(matches!(
        SymbolicFactorization::lu(&B, ColumnOrdering::Natural),
        Err(SymbolicError::NotSquare { m: 2, n: 3 })
    ));
}

#[test]
fn test_symbolic_ldl() {
    let A = test_arrow_5x5();
    let S = SymbolicFactorization::ldl(&A, ColumnOrdering::Natural).unwrap();
    assert_eq!(S.kind(), FactorizationKind::Ldl);
    // strictly lower part of the filled factor
    assert_eq!(S.cp(), &[0, 4, 7, 9, 10, 10]);
}

#[test]
fn test_symbolic_lu() {
    let A = test_arrow_5x5();
    let S = SymbolicFactorization::lu(&A, ColumnOrdering::MinimumDegreeAtA).unwrap();
    assert!(permutation::is_permutation(S.q()));
    assert_eq!(S.lnz(), 4 * A.nnz() + 5);
    assert_eq!(S.unz(), S.lnz());
}

#[test]
fn test_symbolic_qr() {
    let A = CscMatrix::from(&[
        [1., 0., 2.], //
        [0., 3., 0.], //
        [4., 0., 0.], //
        [0., 5., 6.], //
        [0., 0., 7.], //
    ]);
    let S = SymbolicFactorization::qr(&A, ColumnOrdering::Natural).unwrap();
    assert!(!S.is_transposed());
    assert_eq!(S.size(), (5, 3));
    assert!(S.m2() >= 5);
    assert!(permutation::is_permutation(S.pinv()));
    assert_eq!(S.pinv().len(), S.m2());

    // R is at most upper triangular dense
    assert!(S.unz() <= 6);
    for (i, &p) in S.parent().iter().enumerate() {
        assert!(p == NO_PARENT || p > i);
    }

    // a wide matrix is analyzed through its transpose
    let B = A.transpose();
    let S = SymbolicFactorization::qr(&B, ColumnOrdering::Natural).unwrap();
    assert!(S.is_transposed());
    assert_eq!(S.size(), (5, 3));
}

#[test]
fn test_symbolic_qr_fictitious_rows() {
    // column 1 has no pivot row of its own
    //[ 1  1 ]
    //[ 1  1 ]
    //[ 1  1 ]
    let A = CscMatrix::from(&[
        [1., 1.], //
        [1., 1.], //
        [1., 1.], //
    ]);
    let S = SymbolicFactorization::qr(&A, ColumnOrdering::Natural).unwrap();
    assert_eq!(S.m2(), 3);
    assert_eq!(S.leftmost(), &[0, 0, 0]);

    // structurally empty first column needs a fictitious row
    let B = CscMatrix::new(2, 2, vec![0, 0, 2], vec![0, 1], vec![1.0, 1.0]);
    let S = SymbolicFactorization::qr(&B, ColumnOrdering::Natural).unwrap();
    assert_eq!(S.m2(), 3);
    assert!(permutation::is_permutation(S.pinv()));
}

fn random_pattern(m: usize, n: usize, density: f64, rng: &mut StdRng) -> SymbolicPattern {
    let dense: Vec<Vec<bool>> = (0..m)
        .map(|_| (0..n).map(|_| rng.gen::<f64>() < density).collect())
        .collect();
    dense_to_pattern(&dense)
}

// size of a maximum matching by simple augmenting paths
fn brute_force_matching(A: &SymbolicPattern) -> usize {
    fn augment(j: usize, A: &SymbolicPattern, seen: &mut [bool], col_of: &mut [usize]) -> bool {
        for &i in A.column(j) {
            if seen[i] {
                continue;
            }
            seen[i] = true;
            if col_of[i] == NO_PARENT || augment(col_of[i], A, seen, col_of) {
                col_of[i] = j;
                return true;
            }
        }
        false
    }
    let mut col_of = vec![NO_PARENT; A.m];
    (0..A.n)
        .filter(|&j| augment(j, A, &mut vec![false; A.m], &mut col_of))
        .count()
}

// block index of each position, given block boundaries
fn block_of(bounds: &[usize]) -> Vec<usize> {
    let mut block = vec![0; bounds[bounds.len() - 1]];
    for b in 0..bounds.len() - 1 {
        block[bounds[b]..bounds[b + 1]].fill(b);
    }
    block
}

fn check_dmperm(A: &SymbolicPattern, D: &DulmageMendelsohn) {
    assert!(permutation::is_permutation(D.p()));
    assert!(permutation::is_permutation(D.q()));
    assert_eq!(D.r().len(), D.nblocks() + 1);
    assert_eq!(D.s().len(), D.nblocks() + 1);
    assert_eq!((D.r()[0], D.s()[0]), (0, 0));
    assert_eq!((D.r()[D.nblocks()], D.s()[D.nblocks()]), (A.m, A.n));

    // A(p,q) is block upper triangular
    let pinv = permutation::invperm(D.p()).unwrap();
    let C = A.permute(Some(&pinv), Some(D.q()));
    let (rblock, sblock) = (block_of(D.r()), block_of(D.s()));
    for j in 0..C.n {
        for &i in C.column(j) {
            assert!(rblock[i] <= sblock[j], "entry ({}, {}) below the diagonal blocks", i, j);
        }
    }

    // the square coarse block has a zero-free diagonal
    let (rr, cc) = (D.coarse_rows(), D.coarse_columns());
    assert_eq!(rr[2] - rr[1], cc[3] - cc[2]);
    for k in 0..(rr[2] - rr[1]) {
        assert!(C.column(cc[2] + k).contains(&(rr[1] + k)));
    }
    assert_eq!(D.structural_rank(), brute_force_matching(A));
}

#[test]
fn test_matching_zero_free_diagonal() {
    let A = SymbolicPattern::from(&test_matrix_3x3());
    let M = maximum_matching(&A);
    assert_eq!(M.col_match, vec![0, 1, 2]);
    assert_eq!(M.row_match, vec![0, 1, 2]);
    assert_eq!(M.len(), 3);

    let D = DulmageMendelsohn::new(&A);
    assert_eq!(D.nblocks(), 1);
    assert_eq!(D.singletons(), 0);
    check_dmperm(&A, &D);
}

#[test]
fn test_matching_off_diagonal() {
    //[ ⋅  1 ]
    //[ 1  ⋅ ]
    let A = SymbolicPattern::new(2, 2, vec![0, 1, 2], vec![1, 0]);
    let M = maximum_matching(&A);
    assert_eq!(M.col_match, vec![1, 0]);
    assert_eq!(M.row_match, vec![1, 0]);
    assert_eq!(structural_rank(&A), 2);

    // each entry is its own block
    let D = DulmageMendelsohn::new(&A);
    assert_eq!(D.nblocks(), 2);
    assert_eq!(D.singletons(), 2);
    check_dmperm(&A, &D);
}

#[test]
fn test_strongly_connected_components() {
    //[ 1  1  ⋅ ]
    //[ 1  1  ⋅ ]
    //[ 1  1  1 ]
    let A = dense_to_pattern(&[
        vec![true, true, false],
        vec![true, true, false],
        vec![true, true, true],
    ]);
    let (p, r) = strongly_connected_components(&A);
    assert_eq!(p, vec![2, 0, 1]);
    assert_eq!(r, vec![0, 1, 3]);

    // a cycle through every node is a single component
    let C = SymbolicPattern::new(3, 3, vec![0, 1, 2, 3], vec![1, 2, 0]);
    let (p, r) = strongly_connected_components(&C);
    assert_eq!(p, vec![0, 1, 2]);
    assert_eq!(r, vec![0, 3]);
}

#[test]
fn test_dmperm_structurally_singular() {
    // empty column 1 and empty row 1
    //[ 1  ⋅  1 ]
    //[ ⋅  ⋅  ⋅ ]
    //[ 1  ⋅  1 ]
    let A = dense_to_pattern(&[
        vec![true, false, true],
        vec![false, false, false],
        vec![true, false, true],
    ]);
    assert_eq!(structural_rank(&A), 2);

    let D = DulmageMendelsohn::new(&A);
    assert_eq!(D.structural_rank(), 2);
    assert_eq!(D.p(), &[0, 2, 1]);
    assert_eq!(D.q(), &[1, 0, 2]);
    assert_eq!(D.coarse_rows(), &[0, 0, 2, 2, 3]);
    assert_eq!(D.coarse_columns(), &[0, 1, 1, 3, 3]);
    assert_eq!(D.r(), &[0, 0, 2, 3]);
    assert_eq!(D.s(), &[0, 1, 3, 3]);
    check_dmperm(&A, &D);
}

#[test]
fn test_dmperm_rectangular() {
    // more rows than columns: the extra row is unmatched
    let A = dense_to_pattern(&[vec![true, true], vec![true, false], vec![true, false]]);
    let D = DulmageMendelsohn::new(&A);
    assert_eq!(D.structural_rank(), 2);
    check_dmperm(&A, &D);

    // and the transpose leaves a column unmatched
    let At = A.transpose();
    let D = DulmageMendelsohn::new(&At);
    assert_eq!(D.structural_rank(), 2);
    assert_eq!(D.coarse_columns()[1], 1);
    check_dmperm(&At, &D);
}

#[test]
fn test_dmperm_random() {
    let mut rng = StdRng::seed_from_u64(31);
    for (m, n, density) in [(12, 12, 0.15), (15, 9, 0.2), (8, 14, 0.2), (20, 20, 0.05)] {
        for _ in 0..5 {
            let A = random_pattern(m, n, density, &mut rng);
            let M = maximum_matching(&A);
            for (j, &i) in M.col_match.iter().enumerate() {
                if i != NO_PARENT {
                    assert!(A.column(j).contains(&i));
                    assert_eq!(M.row_match[i], j);
                }
            }
            check_dmperm(&A, &DulmageMendelsohn::new(&A));
        }
    }
}
