#![allow(non_snake_case)]

mod common;
use common::*;
use rand::Rng;
use spfactor::algebra::*;
use spfactor::factor::*;
use spfactor::symbolic::*;

#[test]
fn test_cholesky_random_spd() {
    let mut rng = rng(1234);

    for (n, density) in [(1, 1.0), (10, 0.3), (50, 0.05), (120, 0.02)] {
        let A = random_spd(n, density, &mut rng);
        let xsol = random_vector(n, &mut rng);
        let mut b = vec![0.; n];
        A.gemv(&mut b, &xsol, 1.0, 0.0);

        for ordering in [ColumnOrdering::Natural, ColumnOrdering::MinimumDegreeAtPlusA] {
            let F = CholeskyFactorization::new(&A, ordering).unwrap();

            // symbolic column counts predict the factor exactly
            assert_eq!(F.l().nnz(), F.symbolic().cp()[n]);
            assert_eq!(F.nnz(), F.l().nnz());

            let mut x = b.clone();
            F.solve(&mut x).unwrap();
            assert!(residual(&A, &x, &b) <= 1e-10 * b.norm_inf().max(1.));
            assert!(x.norm_inf_diff(&xsol) <= 1e-10);
        }
    }
}

#[test]
fn test_cholesky_triu_only() {
    // the lower triangle is never read
    let mut rng = rng(7);
    let A = random_spd(30, 0.1, &mut rng);
    let Au = A.to_triu();

    let F = CholeskyFactorization::new(&A, ColumnOrdering::default()).unwrap();
    let Fu = CholeskyFactorization::new(&Au, ColumnOrdering::default()).unwrap();
    assert_eq!(F.l(), Fu.l());
}

#[test]
fn test_cholesky_refactor() {
    let mut rng = rng(99);
    let A = random_spd(40, 0.1, &mut rng);
    let mut F = CholeskyFactorization::new(&A, ColumnOrdering::default()).unwrap();

    let mut A2 = A.clone();
    A2.scale(4.);
    F.refactor(&A2).unwrap();

    let b = random_vector(40, &mut rng);
    let mut x = vec![0.; 40];
    F.solve_into(&b, &mut x).unwrap();
    assert!(residual(&A2, &x, &b) <= 1e-10);

    // wrong length
    let mut y = vec![0.; 39];
    assert_eq!(
        F.solve(&mut y).unwrap_err().kind(),
        ErrorKind::Argument
    );
}

#[test]
fn test_cholesky_update_downdate_roundtrip() {
    let mut rng = rng(2024);
    let n = 60;
    let A = random_spd(n, 0.08, &mut rng);
    let mut F = CholeskyFactorization::new(&A, ColumnOrdering::Natural).unwrap();
    let L0 = F.l().clone();

    // w takes the pattern of a column of A, which lies inside the
    // pattern of the corresponding column of L
    let j = 5;
    let rows: Vec<usize> = A.rowval[A.colptr[j]..A.colptr[j + 1]]
        .iter()
        .copied()
        .filter(|&i| i >= j)
        .collect();
    let vals: Vec<f64> = rows.iter().map(|_| rng.gen_range(0.5..1.0)).collect();
    let w = CscMatrix::new(n, 1, vec![0, rows.len()], rows, vals);

    F.update(&w).unwrap();

    // compare against a fresh factorization of A + w*w'
    let Aup = CscMatrix::add(1., &A, 1., &CscMatrix::multiply(&w, &w.transpose()));
    let b = random_vector(n, &mut rng);
    let mut x = b.clone();
    F.solve(&mut x).unwrap();
    assert!(residual(&Aup, &x, &b) <= 1e-10);

    F.downdate(&w).unwrap();
    let L1 = F.l();
    assert_eq!(L1.colptr, L0.colptr);
    assert_eq!(L1.rowval, L0.rowval);
    assert!(L1.nzval.norm_inf_diff(&L0.nzval) <= 1e-10);
}

#[test]
fn test_cholesky_not_positive_definite() {
    let mut rng = rng(3);
    let mut A = random_spd(20, 0.2, &mut rng);
    // flip the sign of one diagonal entry
    let diag = A.find_diagonal_indices(true).unwrap();
    let k = diag[7].unwrap();
    A.nzval[k] = -A.nzval[k];

    let err = CholeskyFactorization::new(&A, ColumnOrdering::Natural).unwrap_err();
    assert!(matches!(err, FactorError::NotPositiveDefinite(_)));
    assert_eq!(err.kind(), ErrorKind::Numerical);
}

