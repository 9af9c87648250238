#![allow(non_snake_case)]

use super::*;
use crate::algebra::{CscMatrix, MatrixVectorMultiply, VectorMath};
use crate::symbolic::{ColumnOrdering, FactorizationKind, SymbolicFactorization, SymbolicPattern};

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

fn test_matrix_4x4() -> CscMatrix<f64> {
    // nonsymmetric, with a small entry on the diagonal
    //[ 0.1   2.0    ⋅    1.0]
    //[ 3.0   1.0   -1.0   ⋅ ]
    //[  ⋅    1.0    4.0  2.0]
    //[ 1.0    ⋅     2.0  5.0]
    CscMatrix::from(&[
        [0.1, 2., 0., 1.],
        [3., 1., -1., 0.],
        [0., 1., 4., 2.],
        [1., 0., 2., 5.],
    ])
}

fn residual(A: &CscMatrix<f64>, x: &[f64], b: &[f64]) -> f64 {
    let mut r = b.to_vec();
    A.gemv(&mut r, x, 1.0, -1.0);
    r.norm_inf()
}

fn dense_lower_solve(L: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let mut x = b.to_vec();
    for j in 0..x.len() {
        x[j] /= L[j][j];
        for i in (j + 1)..x.len() {
            x[i] -= L[i][j] * x[j];
        }
    }
    x
}

#[test]
fn test_triangular_solves() {
    //L =
    //[2.0   ⋅ ]
    //[1.0  4.0]
    let L = CscMatrix::from(&[[2., 0.], [1., 4.]]);
    let mut x = vec![2., 9.];
    lsolve(&L, &mut x);
    assert_eq!(x, vec![1., 2.]);

    // L' x = [4, 8]
    let mut x = vec![4., 8.];
    ltsolve(&L, &mut x);
    assert_eq!(x, vec![1., 2.]);

    // U = L' with the diagonal stored last
    let U = L.transpose();
    let mut x = vec![4., 8.];
    usolve(&U, &mut x);
    assert_eq!(x, vec![1., 2.]);

    let mut x = vec![2., 9.];
    utsolve(&U, &mut x);
    assert_eq!(x, vec![1., 2.]);
}

#[test]
fn test_unit_triangular_solves() {
    //L =
    //[ ⋅    ⋅     ⋅    ⋅ ]
    //[1.0   ⋅     ⋅    ⋅ ]
    //[2.0  1.0    ⋅    ⋅ ]
    //[ ⋅   7.0  -3.0   ⋅ ]
    let L = CscMatrix::new(
        4,
        4,
        vec![0, 2, 4, 5, 5],
        vec![1, 2, 2, 3, 3],
        vec![1., 2., 1., 7., -3.],
    );
    let x = vec![-3., 2., 1., 4.];

    // b = (L+I)x
    let mut b = x.clone();
    L.gemv(&mut b, &x, 1.0, 1.0);
    lsolve_unit(&L, &mut b);
    assert!(b.norm_inf_diff(&x) <= 1e-12);

    // b = (L+I)'x
    let mut b = x.clone();
    L.t().gemv(&mut b, &x, 1.0, 1.0);
    ltsolve_unit(&L, &mut b);
    assert!(b.norm_inf_diff(&x) <= 1e-12);
}

#[test]
fn test_householder() {
    let mut x: Vec<f64> = vec![3., 4.];
    let (beta, s) = house(&mut x);
    assert!((s - 5.) <= 1e-14);
    assert!((beta - 0.1).abs() <= 1e-14);

    // the reflection maps [3,4] to [5,0]
    let mut y = vec![3., 4.];
    happly(&[0, 1], &x, beta, &mut y);
    assert!(y.norm_inf_diff(&[5., 0.]) <= 1e-14);

    // a negative scalar is reflected to its magnitude
    let mut x = vec![-3.];
    let (beta, s) = house(&mut x);
    assert_eq!((beta, s), (2., 3.));
    let mut y = vec![-3.];
    happly(&[0], &x, beta, &mut y);
    assert_eq!(y, vec![3.]);
}

#[test]
fn test_cholesky_3x3() {
    let A = test_matrix_3x3();
    let chol = CholeskyFactorization::new(&A, ColumnOrdering::Natural).unwrap();

    //L =
    //[ 2.0   ⋅    ⋅ ]
    //[ 6.0  1.0   ⋅ ]
    //[-8.0  5.0  3.0]
    assert_eq!(chol.l().colptr, vec![0, 3, 5, 6]);
    assert_eq!(chol.l().rowval, vec![0, 1, 2, 1, 2, 2]);
    assert!(chol.l().nzval.norm_inf_diff(&[2., 6., -8., 1., 5., 3.]) <= 1e-12);

    let b = vec![1., 2., 3.];
    let mut x = b.clone();
    chol.solve(&mut x).unwrap();
    assert!(residual(&A, &x, &b) <= 1e-9);

    // upper triangle only gives the same factor
    let chol2 = CholeskyFactorization::new(&A.to_triu(), ColumnOrdering::Natural).unwrap();
    assert!(chol2.l().nzval.norm_inf_diff(&chol.l().nzval) <= 1e-14);
}

#[test]
fn test_cholesky_not_positive_definite() {
    let mut A = test_matrix_3x3();
    let last = A.nnz() - 1;
    A.nzval[last] = -98.;
    let err = CholeskyFactorization::new(&A, ColumnOrdering::Natural).unwrap_err();
    assert_eq!(err, FactorError::NotPositiveDefinite(2));
    assert_eq!(err.kind(), ErrorKind::Numerical);
}

#[test]
fn test_cholesky_bad_ordering() {
    let A = test_matrix_3x3();
    let err = CholeskyFactorization::new(&A, ColumnOrdering::MinimumDegreeAtA).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);
}

#[test]
fn test_cholesky_update_downdate() {
    let A = test_matrix_3x3();
    let mut chol = CholeskyFactorization::new(&A, ColumnOrdering::Natural).unwrap();
    let L0 = chol.l().clone();

    // w = [1, 0, 2]
    let w = CscMatrix::new(3, 1, vec![0, 2], vec![0, 2], vec![1., 2.]);
    chol.update(&w).unwrap();

    // compare against a fresh factorization of A + w*w'
    let Aw = CscMatrix::from(&[
        [5., 12., -14.], //
        [12., 37., -43.], //
        [-14., -43., 102.], //
    ]);
    let fresh = CholeskyFactorization::new(&Aw, ColumnOrdering::Natural).unwrap();
    assert!(chol.l().nzval.norm_inf_diff(&fresh.l().nzval) <= 1e-12);

    chol.downdate(&w).unwrap();
    assert!(chol.l().nzval.norm_inf_diff(&L0.nzval) <= 1e-12);
}

#[test]
fn test_cholesky_downdate_failure() {
    let A = test_matrix_3x3();
    let mut chol = CholeskyFactorization::new(&A, ColumnOrdering::Natural).unwrap();
    let L0 = chol.l().clone();

    let w = CscMatrix::new(3, 1, vec![0, 1], vec![2], vec![20.]);
    let err = chol.downdate(&w).unwrap_err();
    assert_eq!(err, FactorError::UpdateNotPositiveDefinite(2));

    // factors are left untouched
    assert_eq!(chol.l(), &L0);
}

#[test]
fn test_cholesky_update_errors() {
    // diagonal L has no room for coupling entries
    let A = CscMatrix::from(&[[1., 0., 0.], [0., 2., 0.], [0., 0., 3.]]);
    let mut chol = CholeskyFactorization::new(&A, ColumnOrdering::Natural).unwrap();
    let w = CscMatrix::new(3, 1, vec![0, 2], vec![0, 1], vec![1., 1.]);
    assert_eq!(chol.update(&w), Err(FactorError::UpdatePatternMismatch));

    let w = CscMatrix::new(2, 1, vec![0, 1], vec![0], vec![1.]);
    assert!(matches!(
        chol.update(&w),
        Err(FactorError::DimensionMismatch {
            expected: 3,
            found: 2
        })
    ));

    // an empty update changes nothing
    let w = CscMatrix::<f64>::spalloc(3, 1, 0);
    assert!(chol.update(&w).is_ok());
}

#[test]
fn test_ldl_matches_cholesky() {
    let A = test_matrix_3x3();
    let ldl = LdlFactorization::new(&A, ColumnOrdering::MinimumDegreeAtPlusA).unwrap();
    assert!(ldl.d().iter().all(|&d| d > 0.));

    let chol = CholeskyFactorization::new(&A, ColumnOrdering::MinimumDegreeAtPlusA).unwrap();

    let b = vec![1., 2., 3.];
    let (mut x1, mut x2) = (b.clone(), b.clone());
    ldl.solve(&mut x1).unwrap();
    chol.solve(&mut x2).unwrap();
    assert!(x1.norm_inf_diff(&x2) <= 1e-9);
    assert!(residual(&A, &x1, &b) <= 1e-9);
}

#[test]
fn test_ldl_indefinite() {
    // quasidefinite, with a negative pivot
    //[ 4.0  1.0   ⋅ ]
    //[ 1.0 -3.0  2.0]
    //[  ⋅   2.0  1.0]
    let A = CscMatrix::from(&[[4., 1., 0.], [1., -3., 2.], [0., 2., 1.]]);
    let ldl = LdlFactorization::new(&A.to_triu(), ColumnOrdering::Natural).unwrap();
    assert!(ldl.d()[1] < 0.);

    let b = vec![1., -1., 2.];
    let mut x = vec![0.; 3];
    ldl.solve_into(&b, &mut x).unwrap();
    assert!(residual(&A, &x, &b) <= 1e-12);
}

#[test]
fn test_ldl_zero_pivot() {
    let A = CscMatrix::from(&[[0., 1.], [1., 0.]]);
    let err = LdlFactorization::new(&A, ColumnOrdering::Natural).unwrap_err();
    assert_eq!(err, FactorError::ZeroPivot(0));
}

#[test]
fn test_lu_pivoting() {
    let A = test_matrix_4x4();
    let b = vec![1., 2., 3., 4.];

    for tol in [1.0, 0.5, 0.0] {
        let lu = LuFactorization::new(&A, ColumnOrdering::Natural, tol).unwrap();
        let mut x = b.clone();
        lu.solve(&mut x).unwrap();
        assert!(residual(&A, &x, &b) <= 1e-12);

        // L has a unit diagonal, stored first
        let L = lu.l();
        for j in 0..4 {
            assert_eq!(L.rowval[L.colptr[j]], j);
            assert_eq!(L.nzval[L.colptr[j]], 1.);
        }
    }

    // partial pivoting rejects the small diagonal, tol = 0 keeps it
    let lu = LuFactorization::new(&A, ColumnOrdering::Natural, 1.0).unwrap();
    assert_eq!(lu.pinv()[1], 0);
    let lu = LuFactorization::new(&A, ColumnOrdering::Natural, 0.0).unwrap();
    assert_eq!(lu.pinv()[0], 0);
}

#[test]
fn test_lu_factors() {
    let A = test_matrix_4x4();
    let lu = LuFactorization::new(&A, ColumnOrdering::MinimumDegreeAtA, 1.0).unwrap();
    let (L, U) = (lu.l().to_dense(), lu.u().to_dense());
    let q = lu.symbolic().q();
    let pinv = lu.pinv();
    let Ad = A.to_dense();

    // P*A*Q = L*U
    for i in 0..4 {
        for j in 0..4 {
            let lu_ij: f64 = (0..4).map(|k| L[pinv[i]][k] * U[k][j]).sum();
            assert!((lu_ij - Ad[i][q[j]]).abs() <= 1e-12);
        }
    }

    // U is upper triangular, diagonal last
    let U = lu.u();
    for j in 0..4 {
        assert_eq!(U.rowval[U.colptr[j + 1] - 1], j);
    }
}

#[test]
fn test_lu_singular() {
    let A = CscMatrix::from(&[[1., 1.], [1., 1.]]);
    let err = LuFactorization::new(&A, ColumnOrdering::Natural, 1.0).unwrap_err();
    assert_eq!(err, FactorError::Singular(1));
    assert_eq!(err.kind(), ErrorKind::Numerical);

    // structurally empty column
    let A = CscMatrix::new(2, 2, vec![0, 1, 1], vec![0], vec![1.]);
    let err = LuFactorization::new(&A, ColumnOrdering::Natural, 1.0).unwrap_err();
    assert_eq!(err, FactorError::Singular(1));
}

#[test]
fn test_lu_bad_tolerance() {
    let A = test_matrix_4x4();
    let err = LuFactorization::new(&A, ColumnOrdering::Natural, 1.5).unwrap_err();
    assert_eq!(err, FactorError::InvalidPivotTolerance(1.5));
    assert_eq!(err.kind(), ErrorKind::Argument);
}

#[test]
fn test_lu_storage_growth() {
    let A = test_matrix_4x4();

    // start from almost no storage
    let mut S = SymbolicFactorization::lu(&A, ColumnOrdering::Natural).unwrap();
    S.lnz = 1;
    S.unz = 1;

    let err = LuFactorization::with_reallocation_limit(&A, S.clone(), 1.0, 0).unwrap_err();
    assert_eq!(err, FactorError::GrowthLimitExceeded(0));
    assert_eq!(err.kind(), ErrorKind::Resource);

    let lu = LuFactorization::with_reallocation_limit(&A, S, 1.0, 32).unwrap();
    let b = vec![1., 0., -1., 2.];
    let mut x = b.clone();
    lu.solve(&mut x).unwrap();
    assert!(residual(&A, &x, &b) <= 1e-12);
}

#[test]
fn test_lu_dense_lower_factor() {
    // L from a factorization solves like a dense lower triangle
    let A = test_matrix_4x4();
    let lu = LuFactorization::new(&A, ColumnOrdering::Natural, 1.0).unwrap();
    let b = vec![1., 2., 3., 4.];
    let mut x = b.clone();
    lsolve(lu.l(), &mut x);
    let y = dense_lower_solve(&lu.l().to_dense(), &b);
    assert!(x.norm_inf_diff(&y) <= 1e-12);
}

#[test]
fn test_qr_square() {
    let A = test_matrix_4x4();
    let qr = QrFactorization::new(&A, ColumnOrdering::MinimumDegreeAtA).unwrap();
    let b = vec![1., 2., 3., 4.];
    let mut x = b.clone();
    qr.solve(&mut x).unwrap();
    assert!(residual(&A, &x, &b) <= 1e-12);
}

#[test]
fn test_qr_least_squares() {
    // fit a line through 4 points
    //[1.0  0.0]
    //[1.0  1.0]
    //[1.0  2.0]
    //[1.0  3.0]
    let A = CscMatrix::from(&[[1., 0.], [1., 1.], [1., 2.], [1., 3.]]);
    let b = vec![1., 3., 5., 7.5];
    let qr = QrFactorization::new(&A, ColumnOrdering::Natural).unwrap();
    assert_eq!(qr.size(), (4, 2));

    let mut x = vec![0.; 2];
    qr.solve_into(&b, &mut x).unwrap();

    // normal equations A'A x = A'b
    let mut r = b.clone();
    A.gemv(&mut r, &x, -1.0, 1.0);
    let mut g = vec![0.; 2];
    A.t().gemv(&mut g, &r, 1.0, 0.0);
    assert!(g.norm_inf() <= 1e-12);
}

#[test]
fn test_qr_underdetermined() {
    // minimum norm solution of x1 + x2 = 2
    let A = CscMatrix::from(&[[1., 1.]]);
    let qr = QrFactorization::new(&A, ColumnOrdering::Natural).unwrap();
    assert!(qr.symbolic().is_transposed());
    assert_eq!(qr.size(), (1, 2));

    let mut x = vec![2., 0.];
    qr.solve(&mut x).unwrap();
    assert!(x.norm_inf_diff(&[1., 1.]) <= 1e-12);

    // wrong buffer length
    let mut x = vec![2.];
    assert!(matches!(
        qr.solve(&mut x),
        Err(FactorError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_qr_rank_deficient_solve() {
    // empty first column
    //[ ⋅  1 ]
    //[ ⋅  ⋅ ]
    //[ ⋅  1 ]
    let B = CscMatrix::new(3, 2, vec![0, 0, 2], vec![0, 2], vec![1., 1.]);
    let qr = QrFactorization::new(&B, ColumnOrdering::Natural).unwrap();
    assert_eq!(qr.symbolic().m2(), 4);

    let mut x = vec![0.; 2];
    let err = qr.solve_into(&[1., 0., 1.], &mut x).unwrap_err();
    assert_eq!(err, FactorError::Singular(0));
    assert_eq!(err.kind(), ErrorKind::Numerical);

    // the wide problem goes through the same R
    let qr = QrFactorization::new(&B.transpose(), ColumnOrdering::Natural).unwrap();
    let mut x = vec![1., 1., 0.];
    assert_eq!(qr.solve(&mut x), Err(FactorError::Singular(0)));
}

#[test]
fn test_refactor_same_pattern() {
    let A = test_matrix_3x3();
    let mut B = A.clone();
    B.nzval.iter_mut().for_each(|v| *v *= 2.);
    let b = vec![1., 2., 3.];

    let mut chol = CholeskyFactorization::new(&A, ColumnOrdering::Natural).unwrap();
    chol.refactor(&B).unwrap();
    let mut x = b.clone();
    chol.solve(&mut x).unwrap();
    assert!(residual(&B, &x, &b) <= 1e-9);

    let mut lu = LuFactorization::new(&A, ColumnOrdering::Natural, 1.0).unwrap();
    lu.refactor(&B).unwrap();
    let mut x = b.clone();
    lu.solve(&mut x).unwrap();
    assert!(residual(&B, &x, &b) <= 1e-9);

    // a matrix of another shape is rejected
    let C = CscMatrix::<f64>::identity(4);
    assert_eq!(
        chol.refactor(&C),
        Err(FactorError::SymbolicMismatch {
            expected: FactorizationKind::Cholesky
        })
    );
}

fn same_size_same_nnz() -> (CscMatrix<f64>, CscMatrix<f64>) {
    // the off-diagonal pair moves from (0,1) to (1,2)
    let A1 = CscMatrix::from(&[
        [4., 1., 0.], //
        [1., 4., 0.], //
        [0., 0., 4.], //
    ]);
    let A2 = CscMatrix::from(&[
        [4., 0., 0.], //
        [0., 4., 1.], //
        [0., 1., 4.], //
    ]);
    (A1, A2)
}

#[test]
fn test_refactor_rejects_new_pattern() {
    let (A1, A2) = same_size_same_nnz();
    assert_eq!(A1.nnz(), A2.nnz());
    let ord = ColumnOrdering::Natural;
    let mismatch = |kind| FactorError::SymbolicMismatch { expected: kind };

    let mut chol = CholeskyFactorization::new(&A1, ord).unwrap();
    let err = chol.refactor(&A2).unwrap_err();
    assert_eq!(err, mismatch(FactorizationKind::Cholesky));
    assert_eq!(err.kind(), ErrorKind::Argument);

    // the factors of A1 are untouched
    let mut x = vec![5., 5., 4.];
    chol.solve(&mut x).unwrap();
    assert!(x.norm_inf_diff(&[1., 1., 1.]) <= 1e-12);

    let mut ldl = LdlFactorization::new(&A1, ord).unwrap();
    assert_eq!(ldl.refactor(&A2), Err(mismatch(FactorizationKind::Ldl)));

    let mut lu = LuFactorization::new(&A1, ord, 1.0).unwrap();
    assert_eq!(lu.refactor(&A2), Err(mismatch(FactorizationKind::Lu)));

    let mut qr = QrFactorization::new(&A1, ord).unwrap();
    assert_eq!(qr.refactor(&A2), Err(mismatch(FactorizationKind::Qr)));
}

#[test]
fn test_with_symbolic_rejects_new_pattern() {
    let (A1, A2) = same_size_same_nnz();
    let ord = ColumnOrdering::Natural;

    let S = SymbolicFactorization::cholesky(&A1, ord).unwrap();
    assert!(CholeskyFactorization::with_symbolic(&A2, S).is_err());

    let S = SymbolicFactorization::ldl(&A1, ord).unwrap();
    assert!(LdlFactorization::with_symbolic(&A2, S).is_err());

    let S = SymbolicFactorization::lu(&A1, ord).unwrap();
    assert!(LuFactorization::with_symbolic(&A2, S, 1.0).is_err());

    let S = SymbolicFactorization::qr(&A1, ord).unwrap();
    assert!(QrFactorization::with_symbolic(&A2, S).is_err());

    // a wide matrix is compared as given, not as its transpose
    let W = CscMatrix::from(&[[1., 1., 0.], [0., 1., 1.]]);
    let S = SymbolicFactorization::qr(&W, ord).unwrap();
    assert!(S.is_transposed());
    assert_eq!(S.pattern(), &SymbolicPattern::from(&W));
    assert!(QrFactorization::with_symbolic(&W, S.clone()).is_ok());
    assert!(QrFactorization::with_symbolic(&W.transpose(), S).is_err());
}

#[test]
fn test_numeric_phase_bounded_by_analysis() {
    // an analysis of A1 carrying the pattern of A2 gets past the pattern
    // comparison, so the numeric phase itself must stop at the analyzed
    // column counts
    let (A1, A2) = same_size_same_nnz();
    let ord = ColumnOrdering::Natural;
    let relabel = |mut S: SymbolicFactorization| {
        S.pattern = SymbolicPattern::from(&A2);
        S
    };

    let S = relabel(SymbolicFactorization::cholesky(&A1, ord).unwrap());
    assert_eq!(
        CholeskyFactorization::with_symbolic(&A2, S).unwrap_err(),
        FactorError::SymbolicMismatch {
            expected: FactorizationKind::Cholesky
        }
    );

    let S = relabel(SymbolicFactorization::ldl(&A1, ord).unwrap());
    assert_eq!(
        LdlFactorization::with_symbolic(&A2, S).unwrap_err(),
        FactorError::SymbolicMismatch {
            expected: FactorizationKind::Ldl
        }
    );

    let S = relabel(SymbolicFactorization::qr(&A1, ord).unwrap());
    assert_eq!(
        QrFactorization::with_symbolic(&A2, S).unwrap_err(),
        FactorError::SymbolicMismatch {
            expected: FactorizationKind::Qr
        }
    );
}

#[test]
fn test_with_symbolic_wrong_kind() {
    let A = test_matrix_3x3();
    let S = SymbolicFactorization::ldl(&A, ColumnOrdering::Natural).unwrap();
    assert!(matches!(
        CholeskyFactorization::with_symbolic(&A, S),
        Err(FactorError::SymbolicMismatch { .. })
    ));
}
